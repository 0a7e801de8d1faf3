use std::cell::RefCell;
use std::collections::HashSet;

use anyhow::Result;
use thiserror::Error;

use algwalk::algebra::{AggFunc, Expr, ExprList, Func, Op, SortCondition, VarExprList};
use algwalk::common::Var;
use algwalk::walker::config::DEFAULT_MAX_DEPTH;
use algwalk::walker::{self, WalkError, Walker, WalkerConfig};

#[path = "../common/mod.rs"]
mod common;

use common::{
    MIXED_TREE_EXPRS, MIXED_TREE_OPS, TreeGen, distinct_chain, exists_chain, mixed_tree,
    on_test_stack,
};

#[derive(Debug)]
enum Event {
    Before(String),
    After(String),
    Op(String),
    Expr(String),
}

// Records every callback of a walk, hooks included, in firing order
fn record_walk(plan: &Op) -> walker::Result<Vec<Event>> {
    let events = RefCell::new(Vec::new());
    let mut on_op = |op: &Op| -> walker::Result<()> {
        events.borrow_mut().push(Event::Op(op.to_string()));
        Ok(())
    };
    let mut on_expr = |expr: &Expr| -> walker::Result<()> {
        events.borrow_mut().push(Event::Expr(expr.to_string()));
        Ok(())
    };
    let mut before = |op: &Op| -> walker::Result<()> {
        events.borrow_mut().push(Event::Before(op.to_string()));
        Ok(())
    };
    let mut after = |op: &Op| -> walker::Result<()> {
        events.borrow_mut().push(Event::After(op.to_string()));
        Ok(())
    };
    Walker::new()
        .op_visitor(&mut on_op)
        .expr_visitor(&mut on_expr)
        .before(&mut before)
        .after(&mut after)
        .walk_op(plan)?;
    Ok(events.into_inner())
}

#[test]
fn test_completeness_on_known_tree() -> Result<()> {
    let plan = mixed_tree();
    let mut op_count = 0;
    let mut expr_count = 0;
    let mut on_op = |_: &Op| -> walker::Result<()> {
        op_count += 1;
        Ok(())
    };
    let mut on_expr = |_: &Expr| -> walker::Result<()> {
        expr_count += 1;
        Ok(())
    };
    let mut walker = Walker::new().op_visitor(&mut on_op).expr_visitor(&mut on_expr);
    walker.walk_op(&plan)?;
    let stats = walker.stats();
    drop(walker);

    assert_eq!(op_count, MIXED_TREE_OPS);
    assert_eq!(expr_count, MIXED_TREE_EXPRS);
    assert_eq!(stats.ops, MIXED_TREE_OPS);
    assert_eq!(stats.exprs, MIXED_TREE_EXPRS);
    Ok(())
}

#[test]
fn test_completeness_on_random_trees() -> Result<()> {
    for seed in 0..25 {
        let mut generator = TreeGen::new(seed);
        let plan = generator.op(4);

        let mut tables = Vec::new();
        let mut expr_count = 0;
        let mut on_op = |op: &Op| -> walker::Result<()> {
            if let Op::Scan { table, .. } = op {
                tables.push(table.clone());
            }
            Ok(())
        };
        let mut on_expr = |_: &Expr| -> walker::Result<()> {
            expr_count += 1;
            Ok(())
        };
        let mut walker = Walker::new().op_visitor(&mut on_op).expr_visitor(&mut on_expr);
        walker.walk_op(&plan)?;
        let stats = walker.stats();
        drop(walker);

        assert_eq!(stats.ops, generator.ops, "operator count for seed {}", seed);
        assert_eq!(expr_count, generator.exprs, "expression count for seed {}", seed);
        assert_eq!(tables.len(), generator.scans, "scan count for seed {}", seed);
        let unique: HashSet<&String> = tables.iter().collect();
        assert_eq!(unique.len(), tables.len(), "a scan was visited twice for seed {}", seed);
    }
    Ok(())
}

#[test]
fn test_nary_children_in_order() -> Result<()> {
    let plan = Op::sequence(vec![Op::scan("c0"), Op::scan("c1"), Op::scan("c2")]);
    let mut seen = Vec::new();
    let mut on_op = |op: &Op| -> walker::Result<()> {
        seen.push(op.to_string());
        Ok(())
    };
    Walker::new().op_visitor(&mut on_op).walk_op(&plan)?;

    assert_eq!(
        seen,
        vec!["(scan c0)", "(scan c1)", "(scan c2)", "(sequence (scan c0) (scan c1) (scan c2))"]
    );
    Ok(())
}

#[test]
fn test_function_args_in_order() -> Result<()> {
    let expr = Expr::call(Func::Coalesce, vec![Expr::var("c0"), Expr::var("c1"), Expr::var("c2")]);
    let mut seen = Vec::new();
    let mut on_expr = |e: &Expr| -> walker::Result<()> {
        seen.push(e.to_string());
        Ok(())
    };
    Walker::new().expr_visitor(&mut on_expr).walk_expr(&expr)?;

    assert_eq!(seen, vec!["?c0", "?c1", "?c2", "(coalesce ?c0 ?c1 ?c2)"]);
    Ok(())
}

#[test]
fn test_extend_visits_expressions_not_variables() -> Result<()> {
    let bindings = VarExprList::from_pairs(vec![
        (Var::new("first"), Expr::var("a")),
        (Var::new("second"), Expr::int(2)),
    ])?;
    let plan = Op::extend(bindings, Op::scan("T"));

    let events = record_walk(&plan)?;
    let rendered: Vec<String> = events
        .iter()
        .map(|e| match e {
            Event::Before(s) => format!("before {}", s),
            Event::After(s) => format!("after {}", s),
            Event::Op(s) => format!("op {}", s),
            Event::Expr(s) => format!("expr {}", s),
        })
        .collect();

    let text = plan.to_string();
    assert_eq!(
        rendered,
        vec![
            format!("before {}", text),
            "expr ?a".to_string(),
            "expr 2".to_string(),
            "op (scan T)".to_string(),
            format!("op {}", text),
            format!("after {}", text),
        ]
    );
    Ok(())
}

#[test]
fn test_exists_subquery_reached_from_expression() -> Result<()> {
    let expr = Expr::not_exists(Op::filter(
        Expr::equals(Expr::var("o"), Expr::var("id")),
        Op::scan("S"),
    ));
    let mut ops = Vec::new();
    let mut exprs = Vec::new();
    let mut on_op = |op: &Op| -> walker::Result<()> {
        ops.push(op.name());
        Ok(())
    };
    let mut on_expr = |e: &Expr| -> walker::Result<()> {
        exprs.push(e.name());
        Ok(())
    };
    Walker::new()
        .op_visitor(&mut on_op)
        .expr_visitor(&mut on_expr)
        .walk_expr(&expr)?;

    assert_eq!(ops, vec!["scan", "filter"]);
    assert_eq!(exprs, vec!["var", "var", "function", "exists"]);
    Ok(())
}

#[test]
fn test_scope_hooks_bracket_descendants() -> Result<()> {
    for seed in 0..15 {
        let plan = TreeGen::new(seed).op(4);
        let events = record_walk(&plan)?;

        let mut stack: Vec<String> = Vec::new();
        let mut befores = 0;
        for event in &events {
            match event {
                Event::Before(node) => {
                    for open in &stack {
                        assert!(open.contains(node.as_str()), "{} entered outside its parent", node);
                    }
                    stack.push(node.clone());
                    befores += 1;
                }
                Event::After(node) => {
                    let open = stack.pop().expect("after without before");
                    assert_eq!(&open, node);
                }
                Event::Op(node) | Event::Expr(node) => {
                    for open in &stack {
                        assert!(open.contains(node.as_str()), "{} visited outside {}", node, open);
                    }
                }
            }
        }
        assert!(stack.is_empty(), "unclosed scopes for seed {}", seed);

        let mut composites = 0;
        let mut count = |op: &Op| -> walker::Result<()> {
            if op.is_composite() {
                composites += 1;
            }
            Ok(())
        };
        Walker::new().op_visitor(&mut count).walk_op(&plan)?;
        assert_eq!(befores, composites, "hook count for seed {}", seed);
    }
    Ok(())
}

#[test]
fn test_leaves_get_no_hooks() -> Result<()> {
    let mut hooks = 0;
    let mut before = |_: &Op| -> walker::Result<()> {
        hooks += 1;
        Ok(())
    };
    Walker::new().before(&mut before).walk_op(&Op::scan("T"))?;
    assert_eq!(hooks, 0);
    Ok(())
}

#[derive(Error, Debug)]
#[error("refusing to read table {0}")]
struct Forbidden(String);

#[test]
fn test_callback_failure_propagates_unchanged() {
    let plan = Op::union(Op::scan("A"), Op::union(Op::scan("B"), Op::scan("C")));
    let mut seen = Vec::new();
    let mut on_op = |op: &Op| -> walker::Result<()> {
        if let Op::Scan { table, .. } = op {
            if table == "B" {
                return Err(WalkError::callback(Forbidden(table.clone())));
            }
            seen.push(table.clone());
        }
        Ok(())
    };
    let result = Walker::new().op_visitor(&mut on_op).walk_op(&plan);

    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "refusing to read table B");
    match err {
        WalkError::Callback(inner) => {
            let forbidden = inner.downcast_ref::<Forbidden>().expect("original error type");
            assert_eq!(forbidden.0, "B");
        }
        other => panic!("Expected callback error, got {:?}", other),
    }
    assert_eq!(seen, vec!["A".to_string()]);
}

#[test]
fn test_malformed_group_stops_before_children() {
    let keys = VarExprList::from_pairs(vec![(Var::new("k"), Expr::var("k"))]).unwrap();
    let aggregates = VarExprList::from_pairs(vec![(Var::new("n"), Expr::var("x"))]).unwrap();
    let plan = Op::group(keys, aggregates, Op::scan("T"));

    let mut visited = 0;
    let mut on_op = |_: &Op| -> walker::Result<()> {
        visited += 1;
        Ok(())
    };
    let result = Walker::new().op_visitor(&mut on_op).walk_op(&plan);
    assert!(matches!(result, Err(WalkError::MalformedTree { .. })));
    assert_eq!(visited, 0);
}

#[test]
fn test_malformed_function_inside_filter() {
    let plan = Op::filter(
        Expr::call(Func::If, vec![Expr::var("a"), Expr::var("b")]),
        Op::scan("T"),
    );
    let err = Walker::new().walk_op(&plan).unwrap_err();
    assert_eq!(err.to_string(), "Malformed function node: if expects 3 arguments, got 2");
}

#[test]
fn test_depth_limit_through_subqueries() {
    let mut expr = Expr::exists(Op::scan("T"));
    for _ in 0..20 {
        expr = Expr::exists(Op::filter(expr, Op::Empty));
    }

    let mut walker = Walker::new().config(WalkerConfig::with_max_depth(10));
    assert!(matches!(walker.walk_expr(&expr), Err(WalkError::DepthExceeded(10))));

    let mut walker = Walker::new().config(WalkerConfig::unbounded());
    assert!(walker.walk_expr(&expr).is_ok());
    assert_eq!(walker.stats().max_depth, 42);
}

#[test]
fn test_unbounded_deep_plan() -> Result<()> {
    let mut plan = Op::scan("T");
    for _ in 0..300 {
        plan = Op::distinct(plan);
    }
    let mut walker = Walker::new().config(WalkerConfig::unbounded());
    walker.walk_op(&plan)?;
    assert_eq!(walker.stats().ops, 301);
    assert_eq!(walker.stats().max_depth, 301);
    Ok(())
}

// Operator names and rendered expressions in visiting order
fn visit_order(plan: &Op) -> walker::Result<Vec<String>> {
    let events = RefCell::new(Vec::new());
    let mut on_op = |op: &Op| -> walker::Result<()> {
        events.borrow_mut().push(op.name().to_string());
        Ok(())
    };
    let mut on_expr = |expr: &Expr| -> walker::Result<()> {
        events.borrow_mut().push(expr.to_string());
        Ok(())
    };
    Walker::new()
        .op_visitor(&mut on_op)
        .expr_visitor(&mut on_expr)
        .walk_op(plan)?;
    Ok(events.into_inner())
}

#[test]
fn test_left_join_condition_after_both_inputs() -> Result<()> {
    let plan = Op::left_join(
        Op::scan("A"),
        Op::scan("B"),
        ExprList::from(vec![Expr::equals(Expr::var("a"), Expr::var("b"))]),
    );
    assert_eq!(
        visit_order(&plan)?,
        vec!["scan", "scan", "?a", "?b", "(= ?a ?b)", "leftjoin"]
    );
    Ok(())
}

#[test]
fn test_group_keys_then_aggregates_then_input() -> Result<()> {
    let keys = VarExprList::from_pairs(vec![(Var::new("d"), Expr::var("dept"))])?;
    let aggregates = VarExprList::from_pairs(vec![
        (Var::new("n"), Expr::count_all()),
        (Var::new("s"), Expr::aggregate(AggFunc::Sum, Expr::var("sal"))),
    ])?;
    let plan = Op::group(keys, aggregates, Op::scan("T"));
    assert_eq!(
        visit_order(&plan)?,
        vec!["?dept", "(count *)", "?sal", "(sum ?sal)", "scan", "group"]
    );
    Ok(())
}

#[test]
fn test_order_conditions_before_input() -> Result<()> {
    let plan = Op::order(
        vec![
            SortCondition::desc(Expr::var("x")),
            SortCondition::asc(Expr::binary(Func::Plus, Expr::var("y"), Expr::int(1))),
        ],
        Op::scan("T"),
    );
    assert_eq!(
        visit_order(&plan)?,
        vec!["?x", "?y", "1", "(+ ?y 1)", "scan", "order"]
    );
    Ok(())
}

#[test]
fn test_malformed_group_opens_no_scope() {
    let aggregates = VarExprList::from_pairs(vec![(Var::new("n"), Expr::int(1))]).unwrap();
    let plan = Op::distinct(Op::group(VarExprList::new(), aggregates, Op::scan("T")));

    let opened = RefCell::new(Vec::new());
    let mut before = |op: &Op| -> walker::Result<()> {
        opened.borrow_mut().push(op.name());
        Ok(())
    };
    let result = Walker::new().before(&mut before).walk_op(&plan);

    assert!(matches!(result, Err(WalkError::MalformedTree { .. })));
    assert_eq!(opened.into_inner(), vec!["distinct"]);
}

#[test]
fn test_default_depth_limit_fits_test_stack() -> Result<()> {
    on_test_stack(|| {
        let plan = distinct_chain(DEFAULT_MAX_DEPTH);
        let mut walker = Walker::new();
        walker.walk_op(&plan)?;
        assert_eq!(walker.stats().ops, DEFAULT_MAX_DEPTH);
        assert_eq!(walker.stats().max_depth, DEFAULT_MAX_DEPTH);

        let expr = exists_chain(DEFAULT_MAX_DEPTH);
        let mut walker = Walker::new();
        walker.walk_expr(&expr)?;
        assert_eq!(walker.stats().max_depth, DEFAULT_MAX_DEPTH);
        Ok(())
    })?;

    on_test_stack(|| walker::walk_op(Some(&distinct_chain(DEFAULT_MAX_DEPTH)), None, None))?;
    Ok(())
}

#[test]
fn test_default_depth_limit_exceeded_by_one() {
    let result = on_test_stack(|| {
        let plan = distinct_chain(DEFAULT_MAX_DEPTH + 1);
        walker::walk_op(Some(&plan), None, None)
    });
    assert!(matches!(result, Err(WalkError::DepthExceeded(DEFAULT_MAX_DEPTH))));
}
