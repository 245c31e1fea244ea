//! AST module: node types and traversal.

pub mod types;
pub mod walk;

pub use types::*;
pub use walk::{walk, NodeRef};
