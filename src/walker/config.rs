/// Default bound on nesting depth, counted over operator and expression nodes
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Configuration for walkers and transformers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkerConfig {
    /// Deepest nesting allowed before failing with `DepthExceeded`;
    /// `None` walks without a limit
    pub max_depth: Option<usize>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}

impl WalkerConfig {
    /// No depth limit; the work stack grows on the heap as needed
    pub fn unbounded() -> Self {
        Self { max_depth: None }
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
        }
    }
}
