// Algebra Module
//
// The two-sorted node model: operator trees and expression trees, plus the
// ordered expression containers they own.

pub mod error;
pub mod expr;
pub mod op;
pub mod var_expr;

pub use self::error::AlgebraError;
pub use self::expr::{AggFunc, Arity, Expr, ExprList, Func};
pub use self::op::{JoinAlgorithm, Op, OpShape, SortCondition, SortDirection};
pub use self::var_expr::VarExprList;
