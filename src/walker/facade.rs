// Walker Entry Points
//
// One-call helpers that bind caller callbacks to a `Walker` or `Transformer`
// and run it. Absent callbacks fall back to the no-op and identity defaults;
// an absent root makes a walk a no-op and a transform return `None`.

use log::debug;

use crate::algebra::expr::{Expr, ExprList};
use crate::algebra::op::Op;
use crate::algebra::var_expr::VarExprList;
use crate::walker::apply::Transformer;
use crate::walker::error::{Result, WalkError};
use crate::walker::transform::{ExprTransform, OpTransform};
use crate::walker::visitor::{ExprVisitor, OpVisitor};
use crate::walker::walk::Walker;

/// Build a walker from optional visitors and hooks
pub fn create_walker<'a>(
    op_visitor: Option<&'a mut dyn OpVisitor>,
    expr_visitor: Option<&'a mut dyn ExprVisitor>,
    before: Option<&'a mut dyn OpVisitor>,
    after: Option<&'a mut dyn OpVisitor>,
) -> Walker<'a> {
    let mut walker = Walker::new();
    if let Some(visitor) = op_visitor {
        walker = walker.op_visitor(visitor);
    }
    if let Some(visitor) = expr_visitor {
        walker = walker.expr_visitor(visitor);
    }
    if let Some(hook) = before {
        walker = walker.before(hook);
    }
    if let Some(hook) = after {
        walker = walker.after(hook);
    }
    walker
}

/// Build a transformer from optional transforms and hooks
pub fn create_transformer<'a>(
    op_transform: Option<&'a mut dyn OpTransform>,
    expr_transform: Option<&'a mut dyn ExprTransform>,
    before: Option<&'a mut dyn OpVisitor>,
    after: Option<&'a mut dyn OpVisitor>,
) -> Transformer<'a> {
    let mut transformer = Transformer::new();
    if let Some(transform) = op_transform {
        transformer = transformer.op_transform(transform);
    }
    if let Some(transform) = expr_transform {
        transformer = transformer.expr_transform(transform);
    }
    if let Some(hook) = before {
        transformer = transformer.before(hook);
    }
    if let Some(hook) = after {
        transformer = transformer.after(hook);
    }
    transformer
}

/// Visit every operator with `op_visitor`, including operators inside expressions.
///
/// The visitor is required: `None` is rejected before anything is walked.
pub fn visit_ops<'a>(op: Option<&Op>, op_visitor: Option<&'a mut dyn OpVisitor>) -> Result<()> {
    let Some(op_visitor) = op_visitor else {
        return Err(WalkError::InvalidArgument("an operator visitor is required".to_string()));
    };
    walk_op(op, Some(op_visitor), None)
}

/// Visit every expression with `expr_visitor`, including expressions inside nested operators.
///
/// The visitor is required: `None` is rejected before anything is walked.
pub fn visit_exprs<'a>(
    expr: Option<&Expr>,
    expr_visitor: Option<&'a mut dyn ExprVisitor>,
) -> Result<()> {
    let Some(expr_visitor) = expr_visitor else {
        return Err(WalkError::InvalidArgument("an expression visitor is required".to_string()));
    };
    walk_expr(expr, None, Some(expr_visitor))
}

/// Walk every operator and expression, starting from an operator
pub fn walk_op<'a>(
    op: Option<&Op>,
    op_visitor: Option<&'a mut dyn OpVisitor>,
    expr_visitor: Option<&'a mut dyn ExprVisitor>,
) -> Result<()> {
    walk_op_with_hooks(op, op_visitor, expr_visitor, None, None)
}

pub fn walk_op_with_hooks<'a>(
    op: Option<&Op>,
    op_visitor: Option<&'a mut dyn OpVisitor>,
    expr_visitor: Option<&'a mut dyn ExprVisitor>,
    before: Option<&'a mut dyn OpVisitor>,
    after: Option<&'a mut dyn OpVisitor>,
) -> Result<()> {
    let Some(op) = op else {
        return Ok(());
    };
    debug!("Walking operator tree rooted at {}", op.name());
    create_walker(op_visitor, expr_visitor, before, after).walk_op(op)
}

/// Walk every operator and expression, starting from an expression
pub fn walk_expr<'a>(
    expr: Option<&Expr>,
    op_visitor: Option<&'a mut dyn OpVisitor>,
    expr_visitor: Option<&'a mut dyn ExprVisitor>,
) -> Result<()> {
    walk_expr_with_hooks(expr, op_visitor, expr_visitor, None, None)
}

pub fn walk_expr_with_hooks<'a>(
    expr: Option<&Expr>,
    op_visitor: Option<&'a mut dyn OpVisitor>,
    expr_visitor: Option<&'a mut dyn ExprVisitor>,
    before: Option<&'a mut dyn OpVisitor>,
    after: Option<&'a mut dyn OpVisitor>,
) -> Result<()> {
    let Some(expr) = expr else {
        return Ok(());
    };
    debug!("Walking expression tree rooted at {}", expr.name());
    create_walker(op_visitor, expr_visitor, before, after).walk_expr(expr)
}

/// Walk each expression of an ordered list in turn
pub fn walk_expr_list<'a>(
    exprs: Option<&ExprList>,
    op_visitor: Option<&'a mut dyn OpVisitor>,
    expr_visitor: Option<&'a mut dyn ExprVisitor>,
) -> Result<()> {
    walk_expr_list_with_hooks(exprs, op_visitor, expr_visitor, None, None)
}

pub fn walk_expr_list_with_hooks<'a>(
    exprs: Option<&ExprList>,
    op_visitor: Option<&'a mut dyn OpVisitor>,
    expr_visitor: Option<&'a mut dyn ExprVisitor>,
    before: Option<&'a mut dyn OpVisitor>,
    after: Option<&'a mut dyn OpVisitor>,
) -> Result<()> {
    let Some(exprs) = exprs else {
        return Ok(());
    };
    debug!("Walking list of {} expressions", exprs.len());
    create_walker(op_visitor, expr_visitor, before, after).walk_expr_list(exprs)
}

/// Walk each bound expression of a variable-expression list in binding order
pub fn walk_var_expr_list<'a>(
    bindings: Option<&VarExprList>,
    op_visitor: Option<&'a mut dyn OpVisitor>,
    expr_visitor: Option<&'a mut dyn ExprVisitor>,
) -> Result<()> {
    walk_var_expr_list_with_hooks(bindings, op_visitor, expr_visitor, None, None)
}

pub fn walk_var_expr_list_with_hooks<'a>(
    bindings: Option<&VarExprList>,
    op_visitor: Option<&'a mut dyn OpVisitor>,
    expr_visitor: Option<&'a mut dyn ExprVisitor>,
    before: Option<&'a mut dyn OpVisitor>,
    after: Option<&'a mut dyn OpVisitor>,
) -> Result<()> {
    let Some(bindings) = bindings else {
        return Ok(());
    };
    debug!("Walking {} variable bindings", bindings.len());
    create_walker(op_visitor, expr_visitor, before, after).walk_var_expr_list(bindings)
}

/// Transform an operator tree bottom-up
pub fn transform_op<'a>(
    op: Option<&Op>,
    op_transform: Option<&'a mut dyn OpTransform>,
    expr_transform: Option<&'a mut dyn ExprTransform>,
) -> Result<Option<Op>> {
    transform_op_with_hooks(op, op_transform, expr_transform, None, None)
}

pub fn transform_op_with_hooks<'a>(
    op: Option<&Op>,
    op_transform: Option<&'a mut dyn OpTransform>,
    expr_transform: Option<&'a mut dyn ExprTransform>,
    before: Option<&'a mut dyn OpVisitor>,
    after: Option<&'a mut dyn OpVisitor>,
) -> Result<Option<Op>> {
    let Some(op) = op else {
        return Ok(None);
    };
    debug!("Transforming operator tree rooted at {}", op.name());
    create_transformer(op_transform, expr_transform, before, after)
        .transform_op(op)
        .map(Some)
}

/// Transform an expression tree bottom-up
pub fn transform_expr<'a>(
    expr: Option<&Expr>,
    op_transform: Option<&'a mut dyn OpTransform>,
    expr_transform: Option<&'a mut dyn ExprTransform>,
) -> Result<Option<Expr>> {
    transform_expr_with_hooks(expr, op_transform, expr_transform, None, None)
}

pub fn transform_expr_with_hooks<'a>(
    expr: Option<&Expr>,
    op_transform: Option<&'a mut dyn OpTransform>,
    expr_transform: Option<&'a mut dyn ExprTransform>,
    before: Option<&'a mut dyn OpVisitor>,
    after: Option<&'a mut dyn OpVisitor>,
) -> Result<Option<Expr>> {
    let Some(expr) = expr else {
        return Ok(None);
    };
    debug!("Transforming expression tree rooted at {}", expr.name());
    create_transformer(op_transform, expr_transform, before, after)
        .transform_expr(expr)
        .map(Some)
}

/// Transform each expression of an ordered list, keeping positions
pub fn transform_expr_list<'a>(
    exprs: Option<&ExprList>,
    op_transform: Option<&'a mut dyn OpTransform>,
    expr_transform: Option<&'a mut dyn ExprTransform>,
) -> Result<Option<ExprList>> {
    transform_expr_list_with_hooks(exprs, op_transform, expr_transform, None, None)
}

pub fn transform_expr_list_with_hooks<'a>(
    exprs: Option<&ExprList>,
    op_transform: Option<&'a mut dyn OpTransform>,
    expr_transform: Option<&'a mut dyn ExprTransform>,
    before: Option<&'a mut dyn OpVisitor>,
    after: Option<&'a mut dyn OpVisitor>,
) -> Result<Option<ExprList>> {
    let Some(exprs) = exprs else {
        return Ok(None);
    };
    debug!("Transforming list of {} expressions", exprs.len());
    create_transformer(op_transform, expr_transform, before, after)
        .transform_expr_list(exprs)
        .map(Some)
}

/// Transform each bound expression, keeping variables and binding order
pub fn transform_var_expr_list<'a>(
    bindings: Option<&VarExprList>,
    op_transform: Option<&'a mut dyn OpTransform>,
    expr_transform: Option<&'a mut dyn ExprTransform>,
) -> Result<Option<VarExprList>> {
    transform_var_expr_list_with_hooks(bindings, op_transform, expr_transform, None, None)
}

pub fn transform_var_expr_list_with_hooks<'a>(
    bindings: Option<&VarExprList>,
    op_transform: Option<&'a mut dyn OpTransform>,
    expr_transform: Option<&'a mut dyn ExprTransform>,
    before: Option<&'a mut dyn OpVisitor>,
    after: Option<&'a mut dyn OpVisitor>,
) -> Result<Option<VarExprList>> {
    let Some(bindings) = bindings else {
        return Ok(None);
    };
    debug!("Transforming {} variable bindings", bindings.len());
    create_transformer(op_transform, expr_transform, before, after)
        .transform_var_expr_list(bindings)
        .map(Some)
}
