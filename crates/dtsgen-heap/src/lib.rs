//! Heap snapshot model for the dtsgen inference engine.
//!
//! This crate provides the recorded runtime state inference starts from:
//! - Objects, properties and prototype/environment links in one arena
//! - Function records: user closures, natives with declared signatures, bound functions
//! - Library class extraction keyed by prototype object

pub mod classes;
mod error;
pub mod signature;
mod snapshot;
mod value;

pub use classes::{ClassHierarchyExtractor, ClassRegistry, LibraryClass};
pub use error::SnapshotError;
pub use signature::{DeclaredProperty, DeclaredType, Signature};
pub use snapshot::Snapshot;
pub use value::{FunctionRecord, HeapObject, ObjId, PrimitiveKind, Property, Value};
