// Visitor Callbacks
//
// Read-only callbacks invoked by the walker, one per node sort. Both traits
// default to doing nothing, and any closure of the right shape implements
// them.

use crate::algebra::expr::Expr;
use crate::algebra::op::Op;
use crate::walker::error::Result;

/// Callback invoked once for every operator reached by a walk.
///
/// The same trait is used for the `before` and `after` scope hooks, which
/// fire only on composite operators.
pub trait OpVisitor {
    fn visit_op(&mut self, op: &Op) -> Result<()> {
        let _ = op;
        Ok(())
    }
}

/// Callback invoked once for every expression reached by a walk
pub trait ExprVisitor {
    fn visit_expr(&mut self, expr: &Expr) -> Result<()> {
        let _ = expr;
        Ok(())
    }
}

impl<F> OpVisitor for F
where
    F: FnMut(&Op) -> Result<()>,
{
    fn visit_op(&mut self, op: &Op) -> Result<()> {
        self(op)
    }
}

impl<F> ExprVisitor for F
where
    F: FnMut(&Expr) -> Result<()>,
{
    fn visit_expr(&mut self, expr: &Expr) -> Result<()> {
        self(expr)
    }
}

/// Operator visitor with no effect, used when none is supplied
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOpVisitor;

impl OpVisitor for NoopOpVisitor {}

/// Expression visitor with no effect, used when none is supplied
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopExprVisitor;

impl ExprVisitor for NoopExprVisitor {}
