// Common Module
//
// Scalar types shared by the operator and expression trees.

pub mod types;

pub use self::types::{Value, Var};
