//! Snapshot arena.
//!
//! Every recorded object lives in one `Vec` owned by the snapshot; prototype
//! links, environments and bound targets are plain [`ObjId`] indices.

use crate::error::SnapshotError;
use crate::signature::Signature;
use crate::value::{FunctionRecord, HeapObject, ObjId, Property, Value};
use dtsgen_ast::AstId;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    objects: Vec<HeapObject>,
    global: ObjId,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl Snapshot {
    /// A snapshot holding only an empty global object.
    pub fn new() -> Snapshot {
        Snapshot {
            objects: vec![HeapObject::default()],
            global: ObjId(0),
        }
    }

    pub fn from_json_str(source: &str) -> Result<Snapshot, SnapshotError> {
        let snapshot: Snapshot =
            serde_json::from_str(source).map_err(|err| SnapshotError::Decode(err.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Reject links that point outside the arena.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.global.index() >= self.objects.len() {
            return Err(SnapshotError::MissingGlobal(self.global));
        }
        for (from, object) in self.iter() {
            let mut links: Vec<ObjId> = object
                .properties
                .iter()
                .filter_map(|prop| prop.value.as_object())
                .collect();
            links.extend(object.prototype);
            links.extend(object.env);
            if let Some(FunctionRecord::Bound {
                target,
                this_arg,
                args,
            }) = &object.function
            {
                links.push(*target);
                links.extend(this_arg.as_object());
                links.extend(args.iter().filter_map(Value::as_object));
            }
            if let Some(to) = links.into_iter().find(|to| to.index() >= self.objects.len()) {
                return Err(SnapshotError::DanglingObject { from, to });
            }
        }
        Ok(())
    }

    #[inline]
    pub fn global(&self) -> ObjId {
        self.global
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    #[inline]
    pub fn get(&self, id: ObjId) -> Option<&HeapObject> {
        self.objects.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjId, &HeapObject)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(index, object)| (ObjId(index as u32), object))
    }

    pub fn function(&self, id: ObjId) -> Option<&FunctionRecord> {
        self.get(id)?.function.as_ref()
    }

    /// Own property only.
    pub fn property(&self, id: ObjId, name: &str) -> Option<&Property> {
        self.get(id)?.property(name)
    }

    /// Own property, then up the prototype chain.
    pub fn lookup_property(&self, id: ObjId, name: &str) -> Option<&Property> {
        let mut seen = FxHashSet::default();
        let mut current = Some(id);
        while let Some(obj) = current {
            if !seen.insert(obj) {
                return None;
            }
            let object = self.get(obj)?;
            if let Some(prop) = object.property(name) {
                return Some(prop);
            }
            current = object.prototype;
        }
        None
    }

    /// Object stored in the `prototype` property of a function.
    pub fn prototype_property(&self, id: ObjId) -> Option<ObjId> {
        self.property(id, "prototype")?.value.as_object()
    }

    /// Resolve a free variable through an environment chain, ending at the global object.
    pub fn lookup_variable(&self, env: Option<ObjId>, name: &str) -> Option<&Value> {
        let mut seen = FxHashSet::default();
        let mut current = env;
        while let Some(scope) = current {
            if !seen.insert(scope) {
                break;
            }
            let object = self.get(scope)?;
            if let Some(prop) = object.property(name) {
                return Some(&prop.value);
            }
            current = object.env;
        }
        self.lookup_property(self.global, name).map(|prop| &prop.value)
    }

    /// Every object reachable from the global object, in breadth-first order.
    pub fn reachable_objects(&self) -> Vec<ObjId> {
        let mut seen = FxHashSet::default();
        let mut order = Vec::new();
        let mut queue = VecDeque::from([self.global]);
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            let Some(object) = self.get(id) else {
                continue;
            };
            order.push(id);
            queue.extend(
                object
                    .properties
                    .iter()
                    .filter_map(|prop| prop.value.as_object()),
            );
            queue.extend(object.prototype);
            queue.extend(object.env);
            if let Some(FunctionRecord::Bound {
                target,
                this_arg,
                args,
            }) = &object.function
            {
                queue.push_back(*target);
                queue.extend(this_arg.as_object());
                queue.extend(args.iter().filter_map(Value::as_object));
            }
        }
        order
    }

    // Creation methods, used by loaders and tests.

    pub fn add_object(&mut self, object: HeapObject) -> ObjId {
        let id = ObjId(self.objects.len() as u32);
        self.objects.push(object);
        id
    }

    pub fn add_plain(&mut self, prototype: Option<ObjId>) -> ObjId {
        self.add_object(HeapObject {
            prototype,
            ..HeapObject::default()
        })
    }

    pub fn add_user_function(&mut self, ast: AstId, params: &[&str], env: Option<ObjId>) -> ObjId {
        self.add_object(HeapObject {
            env,
            function: Some(FunctionRecord::User {
                ast,
                params: params.iter().map(|p| p.to_string()).collect(),
            }),
            ..HeapObject::default()
        })
    }

    pub fn add_native_function(
        &mut self,
        call_signatures: Vec<Signature>,
        construct_signatures: Vec<Signature>,
    ) -> ObjId {
        self.add_object(HeapObject {
            function: Some(FunctionRecord::Native {
                call_signatures,
                construct_signatures,
            }),
            ..HeapObject::default()
        })
    }

    pub fn add_bound_function(&mut self, target: ObjId, this_arg: Value, args: Vec<Value>) -> ObjId {
        self.add_object(HeapObject {
            function: Some(FunctionRecord::Bound {
                target,
                this_arg,
                args,
            }),
            ..HeapObject::default()
        })
    }

    /// Append a property; does nothing for a missing object.
    pub fn set_property(&mut self, id: ObjId, name: &str, value: Value) {
        if let Some(object) = self.objects.get_mut(id.index()) {
            match object.properties.iter_mut().find(|prop| prop.name == name) {
                Some(prop) => prop.value = value,
                None => object.properties.push(Property {
                    name: name.to_string(),
                    value,
                }),
            }
        }
    }

    pub fn set_prototype(&mut self, id: ObjId, prototype: Option<ObjId>) {
        if let Some(object) = self.objects.get_mut(id.index()) {
            object.prototype = prototype;
        }
    }

    pub fn set_env(&mut self, id: ObjId, env: Option<ObjId>) {
        if let Some(object) = self.objects.get_mut(id.index()) {
            object.env = env;
        }
    }
}

#[cfg(test)]
#[path = "../tests/snapshot_tests.rs"]
mod tests;
