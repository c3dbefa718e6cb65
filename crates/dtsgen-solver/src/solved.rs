//! Read-only view of a finished graph.

use crate::feature::{Feature, FunctionShape};
use crate::primitive::PrimitiveSet;
use crate::solver::{NodeId, reachable_roots};
use dtsgen_heap::ObjId;
use indexmap::IndexSet;

/// A solved graph. Lookups take `&self`; representatives were fixed by
/// [`crate::Solver::into_solved`].
#[derive(Clone, Debug)]
pub struct SolvedGraph {
    roots: Vec<NodeId>,
    features: Vec<Feature>,
}

impl SolvedGraph {
    pub(crate) fn new(roots: Vec<NodeId>, features: Vec<Feature>) -> SolvedGraph {
        SolvedGraph { roots, features }
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    #[inline]
    pub fn find(&self, node: NodeId) -> NodeId {
        self.roots.get(node.index()).copied().unwrap_or(node)
    }

    pub fn same(&self, a: NodeId, b: NodeId) -> bool {
        self.find(a) == self.find(b)
    }

    /// Own evidence of `node`'s partition, not counting includes.
    pub fn feature(&self, node: NodeId) -> Option<&Feature> {
        self.features.get(self.find(node).index())
    }

    pub fn reachable(&self, node: NodeId) -> Vec<NodeId> {
        if node.index() >= self.roots.len() {
            return Vec::new();
        }
        reachable_roots(node, |n| self.find(n), &self.features)
    }

    fn visible_set(&self, node: NodeId) -> PrimitiveSet {
        self.reachable(node)
            .into_iter()
            .fold(PrimitiveSet::empty(), |acc, root| {
                acc | self.features[root.index()].kinds
            })
    }

    /// Primitive kinds visible at `node`, hints stripped.
    pub fn kinds(&self, node: NodeId) -> PrimitiveSet {
        self.visible_set(node).kinds()
    }

    pub fn hints(&self, node: NodeId) -> PrimitiveSet {
        self.visible_set(node).hints()
    }

    /// Own fields of the partition, values resolved to representatives.
    pub fn fields(&self, node: NodeId) -> Vec<(&str, NodeId)> {
        self.feature(node)
            .and_then(|feature| feature.fields.as_ref())
            .into_iter()
            .flatten()
            .map(|(name, value)| (name.as_str(), self.find(*value)))
            .collect()
    }

    pub fn field(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.feature(node)?.field(name).map(|value| self.find(value))
    }

    pub fn is_object(&self, node: NodeId) -> bool {
        self.feature(node).is_some_and(Feature::is_object)
    }

    pub fn function_shape(&self, node: NodeId) -> Option<FunctionShape> {
        let shape = self.feature(node)?.function.as_ref()?;
        Some(FunctionShape {
            args: shape.args.iter().map(|arg| self.find(*arg)).collect(),
            ret: self.find(shape.ret),
            this: self.find(shape.this),
        })
    }

    pub fn index_value(&self, node: NodeId) -> Option<NodeId> {
        self.feature(node)?.index_value.map(|value| self.find(value))
    }

    pub fn heap_values(&self, node: NodeId) -> IndexSet<ObjId> {
        self.reachable(node)
            .into_iter()
            .flat_map(|root| self.features[root.index()].heap_values.iter().copied())
            .collect()
    }

    pub fn prototypes(&self, node: NodeId) -> IndexSet<ObjId> {
        self.reachable(node)
            .into_iter()
            .flat_map(|root| self.features[root.index()].prototypes.iter().copied())
            .collect()
    }

    /// Distinct representatives, in node order.
    pub fn representatives(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.roots
            .iter()
            .enumerate()
            .filter(|(index, root)| root.index() == *index)
            .map(|(_, root)| *root)
    }
}
