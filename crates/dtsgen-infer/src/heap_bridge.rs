//! Heap values and native signatures as solver nodes.
//!
//! Heap objects get one memoized node each, so every place a recorded object
//! flows into shares its evidence. Primitive values and declared types get
//! fresh nodes on every request.

use dtsgen_heap::{DeclaredType, ObjId, Signature, Snapshot, Value};
use dtsgen_solver::{FunctionShape, NodeId, PrimitiveSet, Solver};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

#[derive(Debug, Default)]
pub struct HeapValueFactory {
    objects: FxHashMap<ObjId, NodeId>,
}

impl HeapValueFactory {
    pub fn new() -> HeapValueFactory {
        HeapValueFactory::default()
    }

    /// Node holding the recorded object `obj`.
    pub fn object_node(&mut self, solver: &mut Solver, snapshot: &Snapshot, obj: ObjId) -> NodeId {
        if let Some(node) = self.objects.get(&obj) {
            return *node;
        }
        let prototype = snapshot.get(obj).and_then(|object| object.prototype);
        let node = solver.heap_object(obj, prototype);
        self.objects.insert(obj, node);
        node
    }

    pub fn value_node(&mut self, solver: &mut Solver, snapshot: &Snapshot, value: &Value) -> NodeId {
        match value {
            Value::Object(obj) => self.object_node(solver, snapshot, *obj),
            primitive => match primitive.primitive_kind() {
                Some(kind) => solver.primitive(PrimitiveSet::from(kind)),
                None => solver.new_node(),
            },
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// A function node for one declared signature, sized to at least `arg_count` arguments.
///
/// For construct signatures the declared return type is also the receiver.
pub fn signature_node(
    solver: &mut Solver,
    signature: &Signature,
    arg_count: usize,
    constructor: bool,
) -> NodeId {
    let this = solver.new_node();
    let arity = signature.params.len().max(arg_count);
    let mut args: SmallVec<[NodeId; 4]> = SmallVec::with_capacity(arity);
    for index in 0..arity {
        let arg = match signature.param(index) {
            Some(ty) => declared_type_node(solver, ty, this),
            None => solver.new_node(),
        };
        args.push(arg);
    }
    let ret = declared_type_node(solver, &signature.returns, this);
    if constructor {
        solver.union(ret, this);
    }
    solver.function(FunctionShape { args, ret, this })
}

/// Node for a declared type; `this` is the receiver `DeclaredType::This` refers to.
pub fn declared_type_node(solver: &mut Solver, ty: &DeclaredType, this: NodeId) -> NodeId {
    match ty {
        DeclaredType::Any => solver.new_node(),
        DeclaredType::Void => solver.primitive(PrimitiveSet::UNDEFINED),
        DeclaredType::Primitive { kind } => solver.primitive(PrimitiveSet::from(*kind)),
        DeclaredType::Object { properties } => {
            let mut fields = IndexMap::new();
            for prop in properties {
                let node = declared_type_node(solver, &prop.ty, this);
                fields.insert(prop.name.clone(), node);
            }
            solver.object_with_fields(fields)
        }
        DeclaredType::Instance { prototype } => solver.has_prototype(*prototype),
        DeclaredType::Function { signature } => signature_node(solver, signature, 0, false),
        DeclaredType::This => this,
        DeclaredType::Union { types } => {
            let node = solver.new_node();
            for member in types {
                let member = declared_type_node(solver, member, this);
                solver.union(node, member);
            }
            node
        }
    }
}

#[cfg(test)]
#[path = "../tests/heap_bridge_tests.rs"]
mod tests;
