//! Node/feature graph for the dtsgen inference engine.
//!
//! This crate provides the union-find substrate inference runs on:
//! - Nodes partitioned with `ena`, each partition owning one [`Feature`]
//! - Monotonic evidence merges, with shared slots unified from a work list
//! - A directed includes relation, separate from equality
//! - Resolver watch lists and a pending-resolver queue for the driver to drain
//! - [`SolvedGraph`], the frozen read-only result

mod feature;
mod primitive;
mod solved;
mod solver;

pub use feature::{Feature, FunctionShape};
pub use primitive::PrimitiveSet;
pub use solved::SolvedGraph;
pub use solver::{NodeId, NodeValue, ResolverId, Solver, SolverStats};
