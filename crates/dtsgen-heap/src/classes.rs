//! Library class extraction.
//!
//! A "library class" is keyed by a prototype object found in the snapshot.
//! Any function with an object-valued `prototype` property introduces one,
//! unless that prototype is a root of the prototype graph (`Object.prototype`).
//!
//! Class names are access paths from the global object (`window.Foo`). Closure
//! environments are walked in a second pass (`[ENV].name`) so that global
//! paths win whenever both exist.

use crate::snapshot::Snapshot;
use crate::value::{ObjId, Value};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LibraryClass {
    /// First access path the class was found under.
    pub name: String,
    /// Further paths reaching the same constructor.
    pub aliases: Vec<String>,
    pub prototype: ObjId,
    pub constructors: Vec<ObjId>,
    /// Prototype key of the super-class.
    pub super_class: Option<ObjId>,
    pub instances: Vec<ObjId>,
    /// Has a real constructor/instance pattern rather than being a namespace.
    pub is_used_as_class: bool,
    /// Some constructor stored on another class's prototype builds this class.
    pub prototype_method: bool,
}

impl LibraryClass {
    fn new(name: String, prototype: ObjId) -> LibraryClass {
        LibraryClass {
            name,
            aliases: Vec::new(),
            prototype,
            constructors: Vec::new(),
            super_class: None,
            instances: Vec::new(),
            is_used_as_class: false,
            prototype_method: false,
        }
    }
}

/// Classes keyed by prototype object, in discovery order.
#[derive(Clone, Debug, Default)]
pub struct ClassRegistry {
    classes: IndexMap<ObjId, LibraryClass>,
}

impl ClassRegistry {
    pub fn new() -> ClassRegistry {
        ClassRegistry::default()
    }

    pub fn get(&self, prototype: ObjId) -> Option<&LibraryClass> {
        self.classes.get(&prototype)
    }

    pub fn contains(&self, prototype: ObjId) -> bool {
        self.classes.contains_key(&prototype)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LibraryClass> {
        self.classes.values()
    }

    /// Register a class by hand; used by drivers that extract classes elsewhere.
    pub fn insert(&mut self, class: LibraryClass) {
        self.classes.insert(class.prototype, class);
    }

    /// Walk `prototype` and its super-classes.
    pub fn chain(&self, prototype: ObjId) -> Vec<&LibraryClass> {
        let mut out: Vec<&LibraryClass> = Vec::new();
        let mut current = self.get(prototype);
        while let Some(class) = current {
            if out.iter().any(|seen| seen.prototype == class.prototype) {
                break;
            }
            out.push(class);
            current = class.super_class.and_then(|proto| self.get(proto));
        }
        out
    }
}

pub struct ClassHierarchyExtractor<'a> {
    snapshot: &'a Snapshot,
    classes: IndexMap<ObjId, LibraryClass>,
    seen: FxHashSet<ObjId>,
}

impl<'a> ClassHierarchyExtractor<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot,
            classes: IndexMap::new(),
            seen: FxHashSet::default(),
        }
    }

    pub fn extract(mut self) -> ClassRegistry {
        let global = self.snapshot.global();
        let envs = self.walk("window", global);

        for env in envs {
            let Some(object) = self.snapshot.get(env) else {
                continue;
            };
            for prop in &object.properties {
                if let Value::Object(value) = prop.value {
                    self.walk(&format!("[ENV].{}", prop.name), value);
                }
            }
        }

        self.collect_instances();
        self.mark_prototype_methods();
        self.mark_instances_with_state();
        self.propagate_used_as_class();

        debug!(classes = self.classes.len(), "extracted library classes");
        ClassRegistry {
            classes: self.classes,
        }
    }

    /// Returns environments met on the way, to be walked in the second pass.
    fn walk(&mut self, path: &str, obj: ObjId) -> Vec<ObjId> {
        let snapshot = self.snapshot;
        let Some(object) = snapshot.get(obj) else {
            return Vec::new();
        };

        if !self.seen.insert(obj) {
            if let Some(proto) = snapshot.prototype_property(obj) {
                if let Some(class) = self.classes.get_mut(&proto) {
                    if class.name != path && !class.aliases.iter().any(|a| a == path) {
                        class.aliases.push(path.to_string());
                    }
                }
            }
            return Vec::new();
        }

        let mut envs = Vec::new();
        if object.is_function() {
            if let Some(proto) = snapshot.prototype_property(obj) {
                if !self.classes.contains_key(&proto) {
                    if self.class_for_prototype(path, proto).is_some() {
                        if let Some(class) = self.classes.get_mut(&proto) {
                            class.constructors.push(obj);
                        }
                    }
                } else if let Some(class) = self.classes.get_mut(&proto) {
                    if !class.constructors.contains(&obj) {
                        class.constructors.push(obj);
                    }
                }
            }
        }

        for prop in &object.properties {
            if let Value::Object(value) = prop.value {
                envs.extend(self.walk(&format!("{path}.{}", prop.name), value));
            }
        }

        if let Some(proto) = object.prototype.and_then(|p| snapshot.get(p)) {
            for prop in &proto.properties {
                if let Value::Object(value) = prop.value {
                    envs.extend(self.walk(&format!("{path}.[prototype].{}", prop.name), value));
                }
            }
        }

        envs.extend(object.env);
        envs
    }

    fn class_for_prototype(&mut self, path: &str, prototype: ObjId) -> Option<ObjId> {
        let object = self.snapshot.get(prototype)?;
        // Object.prototype has no super-class and is never a class.
        let parent = object.prototype?;
        if self.classes.contains_key(&prototype) {
            return Some(prototype);
        }
        let mut class = LibraryClass::new(path.to_string(), prototype);
        class.is_used_as_class = object.properties.len() > 1;
        self.classes.insert(prototype, class);

        let super_class = self.class_for_prototype(&format!("{path}.[proto]"), parent);
        if let Some(class) = self.classes.get_mut(&prototype) {
            class.super_class = super_class;
        }
        Some(prototype)
    }

    fn collect_instances(&mut self) {
        for obj in self.snapshot.reachable_objects() {
            let Some(proto) = self.snapshot.get(obj).and_then(|o| o.prototype) else {
                continue;
            };
            if let Some(class) = self.classes.get_mut(&proto) {
                class.is_used_as_class = true;
                class.instances.push(obj);
            }
        }
    }

    fn mark_prototype_methods(&mut self) {
        let mut targets = Vec::new();
        for class in self.classes.values() {
            let Some(prototype) = self.snapshot.get(class.prototype) else {
                continue;
            };
            for prop in &prototype.properties {
                if prop.name == "constructor" {
                    continue;
                }
                let Value::Object(value) = prop.value else {
                    continue;
                };
                if self.snapshot.get(value).is_some_and(|o| o.is_function()) {
                    targets.extend(self.snapshot.prototype_property(value));
                }
            }
        }
        for target in targets {
            if let Some(class) = self.classes.get_mut(&target) {
                class.prototype_method = true;
            }
        }
    }

    /// An instance carrying its own state means the prototype is used as a class.
    fn mark_instances_with_state(&mut self) {
        let snapshot = self.snapshot;
        for class in self.classes.values_mut() {
            let has_state = class.instances.iter().any(|inst| {
                snapshot
                    .get(*inst)
                    .is_some_and(|o| !o.properties.is_empty())
            });
            if has_state {
                class.is_used_as_class = true;
            }
        }
    }

    /// If any class in a super-class chain is used as a class, all of them are.
    fn propagate_used_as_class(&mut self) {
        let mut changed = true;
        while changed {
            changed = false;
            let keys: Vec<ObjId> = self.classes.keys().copied().collect();
            for key in keys {
                let mut chain = Vec::new();
                let mut used = false;
                let mut current = Some(key);
                while let Some(proto) = current {
                    if chain.contains(&proto) {
                        break;
                    }
                    let Some(class) = self.classes.get(&proto) else {
                        break;
                    };
                    used |= class.is_used_as_class;
                    chain.push(proto);
                    current = class.super_class;
                }
                if !used {
                    continue;
                }
                for proto in chain {
                    if let Some(class) = self.classes.get_mut(&proto) {
                        if !class.is_used_as_class {
                            class.is_used_as_class = true;
                            changed = true;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/classes_tests.rs"]
mod tests;
