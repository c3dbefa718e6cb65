//! Syntax tree for the dtsgen inference engine.
//!
//! This crate provides the tree the constraint generator walks:
//! - An arena of nodes addressed by stable [`AstId`] handles
//! - Operator enums parsed from their source tokens
//! - Parent links for scope queries (`Ast::is_within`)
//! - `add_*` creation methods for building trees in code

mod arena;
mod error;
mod node;
pub mod ops;

pub use arena::Ast;
pub use error::AstError;
pub use node::{AstId, NodeKind, ObjectProperty, SwitchCase};
pub use ops::{BinaryOp, UnaryOp};
