//! Trace-guided type inference.
//!
//! This crate turns a syntax tree plus a recorded heap snapshot into a solved
//! node graph:
//! - [`ProgramPoints`] memoize one node per (closure, syntax node)
//! - [`ConstraintVisitor`] emits unions and includes edges per construct
//! - Lazy resolvers for member access, calls, `new` and shared fields
//! - [`TypeAnalysis`] drains resolver and closure-walk queues to a fixed point
//! - [`InferenceResult`] exposes the frozen graph and its read-offs

mod analysis;
mod context;
mod error;
pub mod heap_bridge;
mod options;
mod program_point;
pub mod resolvers;
mod result;
mod visitor;

pub use analysis::TypeAnalysis;
pub use context::{ClassNodes, ClosureInfo, InferenceContext};
pub use error::InferError;
pub use heap_bridge::HeapValueFactory;
pub use options::{ClassOptions, InferenceOptions};
pub use program_point::{ProgramPoint, ProgramPoints};
pub use result::InferenceResult;
pub use visitor::{ConstraintVisitor, WalkScope};
