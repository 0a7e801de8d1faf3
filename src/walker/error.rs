use thiserror::Error;

use crate::algebra::error::AlgebraError;

/// Error type for walk and transform operations
#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Malformed {node} node: {detail}")]
    MalformedTree {
        node: String,
        detail: String,
    },

    #[error("Maximum walk depth of {0} exceeded")]
    DepthExceeded(usize),

    #[error("Algebra error: {0}")]
    Algebra(#[from] AlgebraError),

    /// Failure raised by a caller-supplied callback, passed through as is
    #[error(transparent)]
    Callback(#[from] anyhow::Error),
}

impl WalkError {
    /// Wrap an arbitrary callback error so it can cross the walker
    pub fn callback<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        WalkError::Callback(anyhow::Error::new(err))
    }

    pub fn malformed(node: impl Into<String>, detail: impl Into<String>) -> Self {
        WalkError::MalformedTree {
            node: node.into(),
            detail: detail.into(),
        }
    }
}

/// Result type for walk and transform operations
pub type Result<T> = std::result::Result<T, WalkError>;
