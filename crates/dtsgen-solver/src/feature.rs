//! Evidence attached to a union-find representative.
//!
//! Merging never removes information: every set in the result is the union
//! of the inputs. Slots present on both sides (shared fields, function
//! arguments/return/this, index values) are not merged here; the pairs are
//! handed back so the solver can union them from its work list.

use crate::primitive::PrimitiveSet;
use crate::solver::NodeId;
use dtsgen_heap::ObjId;
use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;

/// Argument, return and receiver slots of a function-shaped node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionShape {
    pub args: SmallVec<[NodeId; 4]>,
    pub ret: NodeId,
    pub this: NodeId,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Feature {
    pub kinds: PrimitiveSet,
    /// Open field map; `Some` marks the node as object-shaped.
    pub fields: Option<IndexMap<String, NodeId>>,
    pub function: Option<FunctionShape>,
    /// Value slot shared by every computed `o[k]` access.
    pub index_value: Option<NodeId>,
    pub heap_values: IndexSet<ObjId>,
    pub prototypes: IndexSet<ObjId>,
    /// Partitions whose evidence is visible here (`self ⊇ source`).
    pub includes: Vec<NodeId>,
    /// Partitions that include this one.
    pub included_by: Vec<NodeId>,
}

impl Feature {
    pub fn with_kinds(kinds: PrimitiveSet) -> Feature {
        Feature {
            kinds,
            ..Feature::default()
        }
    }

    pub fn is_object(&self) -> bool {
        self.fields.is_some() || self.function.is_some() || !self.heap_values.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<NodeId> {
        self.fields.as_ref()?.get(name).copied()
    }

    /// Size of the evidence; strictly grows whenever a merge adds anything.
    pub fn weight(&self) -> usize {
        self.kinds.bits().count_ones() as usize
            + self.fields.as_ref().map_or(0, |fields| 1 + fields.len())
            + self.function.as_ref().map_or(0, |shape| 1 + shape.args.len())
            + usize::from(self.index_value.is_some())
            + self.heap_values.len()
            + self.prototypes.len()
            + self.includes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weight() == 0
    }

    /// Fold `other` into `self`, pushing slot pairs that must be unified onto `pending`.
    pub fn merge_from(&mut self, other: Feature, pending: &mut Vec<(NodeId, NodeId)>) {
        self.kinds |= other.kinds;

        if let Some(theirs) = other.fields {
            let mine = self.fields.get_or_insert_with(IndexMap::new);
            for (name, node) in theirs {
                match mine.get(&name) {
                    Some(existing) => pending.push((*existing, node)),
                    None => {
                        mine.insert(name, node);
                    }
                }
            }
        }

        if let Some(theirs) = other.function {
            match &mut self.function {
                Some(mine) => {
                    for (index, arg) in theirs.args.iter().enumerate() {
                        match mine.args.get(index) {
                            Some(existing) => pending.push((*existing, *arg)),
                            None => mine.args.push(*arg),
                        }
                    }
                    pending.push((mine.ret, theirs.ret));
                    pending.push((mine.this, theirs.this));
                }
                None => self.function = Some(theirs),
            }
        }

        match (self.index_value, other.index_value) {
            (Some(mine), Some(theirs)) => pending.push((mine, theirs)),
            (None, Some(theirs)) => self.index_value = Some(theirs),
            _ => {}
        }

        self.heap_values.extend(other.heap_values);
        self.prototypes.extend(other.prototypes);
        for node in other.includes {
            if !self.includes.contains(&node) {
                self.includes.push(node);
            }
        }
        for node in other.included_by {
            if !self.included_by.contains(&node) {
                self.included_by.push(node);
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/feature_tests.rs"]
mod tests;
