use thiserror::Error;

use crate::common::types::Var;

/// Errors raised while building algebra nodes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlgebraError {
    #[error("Duplicate variable {0} in variable-expression list")]
    DuplicateVariable(Var),
}

/// Result type for algebra construction
pub type Result<T> = std::result::Result<T, AlgebraError>;
