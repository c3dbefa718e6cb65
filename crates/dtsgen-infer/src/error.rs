use dtsgen_ast::{AstError, AstId};
use dtsgen_heap::{ObjId, SnapshotError};

/// Fatal inference errors. Any of these aborts the run for the current entry point.
#[derive(Clone, Debug, PartialEq)]
pub enum InferError {
    /// An identifier the parser never bound to a declaration.
    MissingDeclaration { name: String, at: AstId },
    /// A required child id that is not in the tree.
    MissingSubExpression { parent: AstId, child: AstId },
    /// A node kind with no meaning in the position it was found.
    UnsupportedConstruct { kind: &'static str, at: AstId },
    /// A closure whose recorded syntax is not a function node.
    ClosureMismatch { closure: ObjId, ast: AstId },
    /// The closure handle is not a user or bound function.
    NotAClosure(ObjId),
    Ast(AstError),
    Snapshot(SnapshotError),
}

impl std::fmt::Display for InferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferError::MissingDeclaration { name, at } => {
                write!(f, "identifier `{name}` (node {}) has no declaration", at.0)
            }
            InferError::MissingSubExpression { parent, child } => write!(
                f,
                "node {} refers to missing sub-expression {}",
                parent.0, child.0
            ),
            InferError::UnsupportedConstruct { kind, at } => {
                write!(f, "unsupported construct {kind} at node {}", at.0)
            }
            InferError::ClosureMismatch { closure, ast } => write!(
                f,
                "closure {} points at node {}, which is not a function",
                closure.0, ast.0
            ),
            InferError::NotAClosure(obj) => {
                write!(f, "object {} is not a user or bound closure", obj.0)
            }
            InferError::Ast(err) => write!(f, "{err}"),
            InferError::Snapshot(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for InferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InferError::Ast(err) => Some(err),
            InferError::Snapshot(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AstError> for InferError {
    fn from(err: AstError) -> Self {
        InferError::Ast(err)
    }
}

impl From<SnapshotError> for InferError {
    fn from(err: SnapshotError) -> Self {
        InferError::Snapshot(err)
    }
}
