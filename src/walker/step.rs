// Work Stack Scheduling
//
// Walks and transforms run off an explicit stack of steps instead of native
// recursion, so nesting depth costs heap rather than thread stack. Entering
// a node schedules its `Leave*` step and then its children; children are
// pushed in reverse so they pop in walk order.

use crate::algebra::expr::Expr;
use crate::algebra::op::Op;

/// One unit of pending work; `usize` is the depth of the parent node
#[derive(Debug, Clone, Copy)]
pub(crate) enum Step<'t> {
    EnterOp(&'t Op, usize),
    EnterExpr(&'t Expr, usize),
    LeaveOp(&'t Op),
    LeaveExpr(&'t Expr),
}

/// Schedule the owned expressions and child operators of `op`.
///
/// Unary operators walk their expressions before their input, `LeftJoin`
/// walks its expressions after both inputs, and `Group` walks keys, then
/// aggregates, then input.
pub(crate) fn push_op_children<'t>(op: &'t Op, depth: usize, stack: &mut Vec<Step<'t>>) {
    let mark = stack.len();
    match op {
        Op::Scan { .. } | Op::Empty => {}
        Op::Filter { exprs, input } => {
            stack.extend(exprs.iter().map(|e| Step::EnterExpr(e, depth)));
            stack.push(Step::EnterOp(input, depth));
        }
        Op::Order { conditions, input } => {
            stack.extend(conditions.iter().map(|c| Step::EnterExpr(&c.expr, depth)));
            stack.push(Step::EnterOp(input, depth));
        }
        Op::Extend { bindings, input } => {
            stack.extend(bindings.exprs().map(|e| Step::EnterExpr(e, depth)));
            stack.push(Step::EnterOp(input, depth));
        }
        Op::Group { keys, aggregates, input } => {
            stack.extend(keys.exprs().map(|e| Step::EnterExpr(e, depth)));
            stack.extend(aggregates.exprs().map(|e| Step::EnterExpr(e, depth)));
            stack.push(Step::EnterOp(input, depth));
        }
        Op::Project { input, .. } | Op::Distinct { input } | Op::Slice { input, .. } => {
            stack.push(Step::EnterOp(input, depth));
        }
        Op::Join { left, right, .. } | Op::Union { left, right } | Op::Minus { left, right } => {
            stack.push(Step::EnterOp(left, depth));
            stack.push(Step::EnterOp(right, depth));
        }
        Op::LeftJoin { left, right, exprs } => {
            stack.push(Step::EnterOp(left, depth));
            stack.push(Step::EnterOp(right, depth));
            stack.extend(exprs.iter().map(|e| Step::EnterExpr(e, depth)));
        }
        Op::Sequence { ops } | Op::Disjunction { ops } => {
            stack.extend(ops.iter().map(|child| Step::EnterOp(child, depth)));
        }
    }
    stack[mark..].reverse();
}

/// Schedule the sub-expressions of `expr`, or the operator of an `Exists`
pub(crate) fn push_expr_children<'t>(expr: &'t Expr, depth: usize, stack: &mut Vec<Step<'t>>) {
    match expr {
        Expr::Constant(_) | Expr::Var(_) => {}
        Expr::Function { args, .. } => {
            stack.extend(args.iter().rev().map(|arg| Step::EnterExpr(arg, depth)));
        }
        Expr::Aggregate { arg, .. } => {
            if let Some(arg) = arg {
                stack.push(Step::EnterExpr(arg, depth));
            }
        }
        Expr::Exists { op, .. } => stack.push(Step::EnterOp(op, depth)),
    }
}
