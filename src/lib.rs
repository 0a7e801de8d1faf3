// algwalk: traversal and rewrite engine for query algebra trees
//
// Operator trees and expression trees nest inside each other; the walker
// visits both sorts and the transformer rebuilds them bottom-up.

pub mod algebra;
pub mod common;
pub mod walker;

// Re-export key items for convenient access
pub use algebra::{Expr, ExprList, Op, VarExprList};
pub use common::{Value, Var};
pub use walker::{Transformer, WalkError, Walker, WalkerConfig};
