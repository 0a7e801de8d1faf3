// Transform Callbacks
//
// Rewrite callbacks invoked bottom-up by the transformer. Each receives the
// original node and a rebuilt copy whose children are already final, and
// returns the node to use in its place.

use crate::algebra::expr::Expr;
use crate::algebra::op::Op;
use crate::walker::error::Result;

/// Operator rewrite.
///
/// `rebuilt` has the same variant and attributes as `original` with every
/// child operator and owned expression already transformed. Return it as is
/// to keep the rebuild, return `original.clone()` to discard changes below,
/// or return any other operator to replace the node.
///
/// Aggregate bindings of a rebuilt `Group` are checked before this runs, so
/// an expression transform that turns one into a non-aggregate fails with
/// `WalkError::MalformedTree`.
pub trait OpTransform {
    fn transform_op(&mut self, original: &Op, rebuilt: Op) -> Result<Op> {
        let _ = original;
        Ok(rebuilt)
    }
}

/// Expression rewrite, same contract as `OpTransform`
pub trait ExprTransform {
    fn transform_expr(&mut self, original: &Expr, rebuilt: Expr) -> Result<Expr> {
        let _ = original;
        Ok(rebuilt)
    }
}

impl<F> OpTransform for F
where
    F: FnMut(&Op, Op) -> Result<Op>,
{
    fn transform_op(&mut self, original: &Op, rebuilt: Op) -> Result<Op> {
        self(original, rebuilt)
    }
}

impl<F> ExprTransform for F
where
    F: FnMut(&Expr, Expr) -> Result<Expr>,
{
    fn transform_expr(&mut self, original: &Expr, rebuilt: Expr) -> Result<Expr> {
        self(original, rebuilt)
    }
}

/// Keeps every rebuilt operator
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityOpTransform;

impl OpTransform for IdentityOpTransform {}

/// Keeps every rebuilt expression
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityExprTransform;

impl ExprTransform for IdentityExprTransform {}
