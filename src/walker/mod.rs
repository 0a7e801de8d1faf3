// Walker Module
//
// Generic traversal and bottom-up transformation over operator and
// expression trees. Passes are written as callback sets plugged into a
// `Walker` (read-only) or a `Transformer` (rewrite), either through the
// builders directly or through the entry points in `facade`.

pub mod apply;
mod check;
pub mod config;
pub mod error;
pub mod facade;
mod step;
pub mod transform;
pub mod visitor;
pub mod walk;

pub use self::apply::Transformer;
pub use self::config::WalkerConfig;
pub use self::error::{Result, WalkError};
pub use self::facade::*;
pub use self::transform::{ExprTransform, IdentityExprTransform, IdentityOpTransform, OpTransform};
pub use self::visitor::{ExprVisitor, NoopExprVisitor, NoopOpVisitor, OpVisitor};
pub use self::walk::{WalkStats, Walker};
