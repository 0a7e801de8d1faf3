// Structural checks applied when a node is reached, before its children.

use log::warn;

use crate::algebra::expr::{Expr, Func};
use crate::algebra::op::Op;
use crate::algebra::var_expr::VarExprList;
use crate::walker::error::{Result, WalkError};

/// Checks run when an operator is reached, before its hooks and children
pub(crate) fn check_op(op: &Op) -> Result<()> {
    match op {
        Op::Group { aggregates, .. } => check_aggregates(aggregates),
        _ => Ok(()),
    }
}

pub(crate) fn check_expr(expr: &Expr) -> Result<()> {
    match expr {
        Expr::Function { func, args } => check_function(func, args),
        _ => Ok(()),
    }
}

/// Reject function applications whose argument count the function does not accept
pub(crate) fn check_function(func: &Func, args: &[Expr]) -> Result<()> {
    let arity = func.arity();
    if arity.accepts(args.len()) {
        return Ok(());
    }
    warn!("Function {} applied to {} arguments, expected {}", func.symbol(), args.len(), arity);
    Err(WalkError::malformed(
        "function",
        format!("{} expects {} arguments, got {}", func.symbol(), arity, args.len()),
    ))
}

/// Every aggregate binding of a group operator must be an aggregate expression
pub(crate) fn check_aggregates(aggregates: &VarExprList) -> Result<()> {
    for (var, expr) in aggregates.iter() {
        if !matches!(expr, Expr::Aggregate { .. }) {
            warn!("Group binding {} is a {} expression, not an aggregate", var, expr.name());
            return Err(WalkError::malformed(
                "group",
                format!("binding {} is not an aggregate: {}", var, expr),
            ));
        }
    }
    Ok(())
}

/// Enter one level deeper, failing once the configured limit is crossed
pub(crate) fn descend(depth: usize, max_depth: Option<usize>) -> Result<usize> {
    let next = depth + 1;
    match max_depth {
        Some(max) if next > max => {
            warn!("Walk depth limit of {} exceeded", max);
            Err(WalkError::DepthExceeded(max))
        }
        _ => Ok(next),
    }
}
