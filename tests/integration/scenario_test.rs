use anyhow::Result;

use algwalk::algebra::{Expr, Op};
use algwalk::common::Var;
use algwalk::walker::{self, Transformer, Walker};

#[path = "../common/mod.rs"]
mod common;

use common::filter_project_scan;

#[test]
fn test_collect_variables_then_retarget_scan() -> Result<()> {
    let plan = filter_project_scan("T");

    // Project's variable list is not an expression, so only the filter's ?x shows up
    let mut vars: Vec<Var> = Vec::new();
    let mut on_expr = |expr: &Expr| -> walker::Result<()> {
        if let Some(var) = expr.as_var() {
            vars.push(var.clone());
        }
        Ok(())
    };
    Walker::new().expr_visitor(&mut on_expr).walk_op(&plan)?;
    assert_eq!(vars, vec![Var::new("x")]);

    let mut retarget = |_: &Op, rebuilt: Op| -> walker::Result<Op> {
        Ok(match rebuilt {
            Op::Scan { table, alias } if table == "T" => Op::Scan { table: "T2".to_string(), alias },
            other => other,
        })
    };
    let rewritten = Transformer::new().op_transform(&mut retarget).transform_op(&plan)?;

    assert_eq!(rewritten, filter_project_scan("T2"));
    assert_eq!(plan, filter_project_scan("T"));
    Ok(())
}

#[test]
fn test_subquery_in_filter_condition_is_visited() -> Result<()> {
    let plan = Op::filter(Expr::exists(Op::scan("S")), Op::scan("T"));

    let mut scans = Vec::new();
    let mut on_op = |op: &Op| -> walker::Result<()> {
        if let Op::Scan { table, .. } = op {
            scans.push(table.clone());
        }
        Ok(())
    };
    walker::visit_ops(Some(&plan), Some(&mut on_op))?;

    // The condition is walked before the filter's input
    assert_eq!(scans, vec!["S".to_string(), "T".to_string()]);
    Ok(())
}
