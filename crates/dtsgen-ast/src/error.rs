use crate::AstId;

/// Malformed syntax-tree input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AstError {
    /// An operator token with no known semantics.
    UnknownOperator(String),
    /// A child reference pointing outside the arena.
    DanglingChild { parent: AstId, child: AstId },
    /// A node listed as the child of two different parents.
    SharedChild {
        child: AstId,
        first: AstId,
        second: AstId,
    },
    /// A node that is its own ancestor.
    Cycle(AstId),
    /// The tree could not be decoded at all.
    Decode(String),
}

impl std::fmt::Display for AstError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AstError::UnknownOperator(token) => write!(f, "unknown operator `{token}`"),
            AstError::DanglingChild { parent, child } => {
                write!(f, "node {} references missing child {}", parent.0, child.0)
            }
            AstError::SharedChild {
                child,
                first,
                second,
            } => write!(
                f,
                "node {} is a child of both node {} and node {}",
                child.0, first.0, second.0
            ),
            AstError::Cycle(node) => write!(f, "node {} is its own ancestor", node.0),
            AstError::Decode(message) => write!(f, "failed to decode syntax tree: {message}"),
        }
    }
}

impl std::error::Error for AstError {}
