//! Recorded runtime values.

use crate::signature::Signature;
use dtsgen_ast::AstId;
use serde::{Deserialize, Serialize};

/// Stable handle of a heap object, assigned when the snapshot is loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjId(pub u32);

impl ObjId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The primitive kinds a recorded value can have.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
    Null,
    Undefined,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Object(ObjId),
}

impl Value {
    /// `None` for object references.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            Value::Undefined => Some(PrimitiveKind::Undefined),
            Value::Null => Some(PrimitiveKind::Null),
            Value::Boolean(_) => Some(PrimitiveKind::Boolean),
            Value::Number(_) => Some(PrimitiveKind::Number),
            Value::String(_) => Some(PrimitiveKind::String),
            Value::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<ObjId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: Value,
}

/// What the snapshot knows about a function object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FunctionRecord {
    /// A closure over user code; `ast` is its `Function` syntax node.
    User { ast: AstId, params: Vec<String> },
    /// A built-in with declared signatures.
    Native {
        #[serde(default)]
        call_signatures: Vec<Signature>,
        #[serde(default)]
        construct_signatures: Vec<Signature>,
    },
    /// The result of `target.bind(this_arg, ...args)`.
    Bound {
        target: ObjId,
        this_arg: Value,
        #[serde(default)]
        args: Vec<Value>,
    },
    Unknown,
}

impl FunctionRecord {
    pub fn tag(&self) -> &'static str {
        match self {
            FunctionRecord::User { .. } => "user",
            FunctionRecord::Native { .. } => "native",
            FunctionRecord::Bound { .. } => "bound",
            FunctionRecord::Unknown => "unknown",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HeapObject {
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub prototype: Option<ObjId>,
    /// Environment record a closure captured; its own `env` is the enclosing scope.
    #[serde(default)]
    pub env: Option<ObjId>,
    #[serde(default)]
    pub function: Option<FunctionRecord>,
}

impl HeapObject {
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|prop| prop.name == name)
    }

    pub fn is_function(&self) -> bool {
        self.function.is_some()
    }
}
