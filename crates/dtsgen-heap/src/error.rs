use crate::ObjId;

/// Malformed heap-snapshot input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SnapshotError {
    /// A link (property value, prototype, environment, bound target) that
    /// points outside the arena.
    DanglingObject { from: ObjId, to: ObjId },
    /// The snapshot names a global object it does not contain.
    MissingGlobal(ObjId),
    /// The snapshot could not be decoded at all.
    Decode(String),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::DanglingObject { from, to } => {
                write!(f, "object {} references missing object {}", from.0, to.0)
            }
            SnapshotError::MissingGlobal(id) => write!(f, "global object {} is missing", id.0),
            SnapshotError::Decode(message) => write!(f, "failed to decode heap snapshot: {message}"),
        }
    }
}

impl std::error::Error for SnapshotError {}
