//! Declared signatures of native functions.
//!
//! Built-ins have no syntax to walk, so the snapshot carries what their
//! declarations say about arguments, return value and receiver.

use crate::value::{ObjId, PrimitiveKind};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DeclaredType {
    Any,
    Void,
    Primitive { kind: PrimitiveKind },
    Object { properties: Vec<DeclaredProperty> },
    /// An instance of the class whose prototype object is `prototype`.
    Instance { prototype: ObjId },
    Function { signature: Box<Signature> },
    /// The receiver of the call.
    This,
    Union { types: Vec<DeclaredType> },
}

impl DeclaredType {
    pub fn primitive(kind: PrimitiveKind) -> DeclaredType {
        DeclaredType::Primitive { kind }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeclaredProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: DeclaredType,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub params: Vec<DeclaredType>,
    #[serde(default)]
    pub rest: Option<DeclaredType>,
    pub returns: DeclaredType,
}

impl Signature {
    pub fn new(params: Vec<DeclaredType>, returns: DeclaredType) -> Signature {
        Signature {
            params,
            rest: None,
            returns,
        }
    }

    /// Declared type of the argument at `index`, falling back to the rest parameter.
    pub fn param(&self, index: usize) -> Option<&DeclaredType> {
        self.params.get(index).or(self.rest.as_ref())
    }
}
