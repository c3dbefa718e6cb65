//! Union-find solver over evidence nodes.
//!
//! Partitions live in an `ena` unification table; the evidence of each
//! partition lives in a side table indexed by node and is only authoritative
//! at the representative, the same layout as an inference context keeping
//! constraint sets next to its variables.
//!
//! The solver never runs resolvers. Any operation that makes a watched
//! partition's evidence grow queues the watching resolver ids, and the owner
//! drains them with [`Solver::pop_pending_resolver`].

use crate::feature::{Feature, FunctionShape};
use crate::primitive::PrimitiveSet;
use crate::solved::SolvedGraph;
use dtsgen_heap::ObjId;
use ena::unify::{InPlaceUnificationTable, NoError, UnifyKey, UnifyValue};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::collections::VecDeque;
use tracing::trace;

/// A union-find element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Unit value for the unification table; evidence is kept on the side.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NodeValue;

impl UnifyKey for NodeId {
    type Value = NodeValue;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        NodeId(u)
    }

    fn tag() -> &'static str {
        "NodeId"
    }
}

impl UnifyValue for NodeValue {
    type Error = NoError;

    fn unify_values(_a: &Self, _b: &Self) -> Result<Self, Self::Error> {
        Ok(NodeValue)
    }
}

/// Handle of a resolver owned by the caller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolverId(pub u32);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolverStats {
    pub nodes: usize,
    pub merges: usize,
    pub includes: usize,
    pub resolver_triggers: usize,
}

pub struct Solver {
    table: InPlaceUnificationTable<NodeId>,
    features: Vec<Feature>,
    watchers: Vec<SmallVec<[ResolverId; 2]>>,
    pending: VecDeque<ResolverId>,
    queued: FxHashSet<ResolverId>,
    stats: SolverStats,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    pub fn new() -> Self {
        Solver {
            table: InPlaceUnificationTable::new(),
            features: Vec::new(),
            watchers: Vec::new(),
            pending: VecDeque::new(),
            queued: FxHashSet::default(),
            stats: SolverStats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn stats(&self) -> SolverStats {
        self.stats
    }

    // =========================================================================
    // Node creation
    // =========================================================================

    pub fn add_node(&mut self, feature: Feature) -> NodeId {
        let node = self.table.new_key(NodeValue);
        debug_assert_eq!(node.index(), self.features.len());
        self.features.push(feature);
        self.watchers.push(SmallVec::new());
        self.stats.nodes += 1;
        node
    }

    /// A node with no evidence yet.
    pub fn new_node(&mut self) -> NodeId {
        self.add_node(Feature::default())
    }

    pub fn primitive(&mut self, kinds: PrimitiveSet) -> NodeId {
        self.add_node(Feature::with_kinds(kinds))
    }

    /// An object shape with no known fields.
    pub fn empty_object(&mut self) -> NodeId {
        self.add_node(Feature {
            fields: Some(IndexMap::new()),
            ..Feature::default()
        })
    }

    /// An object shape known to have field `name` holding `value`.
    pub fn object_with_field(&mut self, name: &str, value: NodeId) -> NodeId {
        let mut fields = IndexMap::new();
        fields.insert(name.to_string(), value);
        self.add_node(Feature {
            fields: Some(fields),
            ..Feature::default()
        })
    }

    pub fn object_with_fields(&mut self, fields: IndexMap<String, NodeId>) -> NodeId {
        self.add_node(Feature {
            fields: Some(fields),
            ..Feature::default()
        })
    }

    pub fn function(&mut self, shape: FunctionShape) -> NodeId {
        self.add_node(Feature {
            function: Some(shape),
            ..Feature::default()
        })
    }

    /// A function node with fresh argument, return and receiver slots.
    pub fn new_function(&mut self, arity: usize) -> NodeId {
        let args = (0..arity).map(|_| self.new_node()).collect();
        let ret = self.new_node();
        let this = self.new_node();
        self.function(FunctionShape { args, ret, this })
    }

    /// Marker for values whose prototype chain starts at `prototype`.
    pub fn has_prototype(&mut self, prototype: ObjId) -> NodeId {
        let mut prototypes = IndexSet::new();
        prototypes.insert(prototype);
        self.add_node(Feature {
            prototypes,
            ..Feature::default()
        })
    }

    /// A node observed holding the heap object `obj`.
    pub fn heap_object(&mut self, obj: ObjId, prototype: Option<ObjId>) -> NodeId {
        let mut heap_values = IndexSet::new();
        heap_values.insert(obj);
        self.add_node(Feature {
            heap_values,
            prototypes: prototype.into_iter().collect(),
            ..Feature::default()
        })
    }

    /// A node whose computed-access values are unified with `value`.
    pub fn index_holder(&mut self, value: NodeId) -> NodeId {
        self.add_node(Feature {
            index_value: Some(value),
            ..Feature::default()
        })
    }

    /// A fresh node that includes `source`.
    pub fn new_include(&mut self, source: NodeId) -> NodeId {
        let node = self.new_node();
        self.include(node, source);
        node
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[inline]
    pub fn find(&mut self, node: NodeId) -> NodeId {
        self.table.find(node)
    }

    pub fn same(&mut self, a: NodeId, b: NodeId) -> bool {
        self.find(a) == self.find(b)
    }

    /// Evidence of the partition containing `node`.
    pub fn feature(&mut self, node: NodeId) -> &Feature {
        let root = self.find(node);
        &self.features[root.index()]
    }

    pub fn kinds(&mut self, node: NodeId) -> PrimitiveSet {
        self.feature(node).kinds
    }

    pub fn field(&mut self, node: NodeId, name: &str) -> Option<NodeId> {
        self.feature(node).field(name)
    }

    pub fn fields(&mut self, node: NodeId) -> Vec<(String, NodeId)> {
        self.feature(node)
            .fields
            .iter()
            .flatten()
            .map(|(name, node)| (name.clone(), *node))
            .collect()
    }

    pub fn function_shape(&mut self, node: NodeId) -> Option<FunctionShape> {
        self.feature(node).function.clone()
    }

    /// Representatives visible from `node` over includes edges, `node`'s own first.
    pub fn reachable(&mut self, node: NodeId) -> Vec<NodeId> {
        let table = &mut self.table;
        reachable_roots(node, |n| table.find(n), &self.features)
    }

    /// Heap values seen anywhere reachable from `node`.
    pub fn reachable_heap_values(&mut self, node: NodeId) -> IndexSet<ObjId> {
        self.reachable(node)
            .into_iter()
            .flat_map(|root| self.features[root.index()].heap_values.iter().copied())
            .collect()
    }

    pub fn reachable_prototypes(&mut self, node: NodeId) -> IndexSet<ObjId> {
        self.reachable(node)
            .into_iter()
            .flat_map(|root| self.features[root.index()].prototypes.iter().copied())
            .collect()
    }

    // =========================================================================
    // Constraints
    // =========================================================================

    /// Add kinds to a node's partition.
    pub fn add_kinds(&mut self, node: NodeId, kinds: PrimitiveSet) {
        let root = self.find(node);
        let feature = &mut self.features[root.index()];
        if feature.kinds.contains(kinds) {
            return;
        }
        feature.kinds |= kinds;
        self.notify(root);
    }

    /// Merge the partitions of `a` and `b`, then every slot pair the merge exposes.
    pub fn union(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let mut work = vec![(a, b)];
        while let Some((a, b)) = work.pop() {
            self.merge_roots(a, b, &mut work);
        }
        self.find(a)
    }

    pub fn union_all(&mut self, nodes: &[NodeId]) -> Option<NodeId> {
        let (first, rest) = nodes.split_first()?;
        for node in rest {
            self.union(*first, *node);
        }
        Some(self.find(*first))
    }

    fn merge_roots(&mut self, a: NodeId, b: NodeId, work: &mut Vec<(NodeId, NodeId)>) {
        let root_a = self.table.find(a);
        let root_b = self.table.find(b);
        if root_a == root_b {
            return;
        }

        let feature_a = std::mem::take(&mut self.features[root_a.index()]);
        let feature_b = std::mem::take(&mut self.features[root_b.index()]);
        let weight_a = feature_a.weight();
        let weight_b = feature_b.weight();

        // unify_var_var cannot fail: NodeValue's error type is NoError
        let _ = self.table.unify_var_var(root_a, root_b);
        let new_root = self.table.find(root_a);
        debug_assert!(new_root == root_a || new_root == root_b);

        let mut merged = feature_a;
        merged.merge_from(feature_b, work);
        let weight = merged.weight();
        self.features[new_root.index()] = merged;

        let mut watchers_a = std::mem::take(&mut self.watchers[root_a.index()]);
        let watchers_b = std::mem::take(&mut self.watchers[root_b.index()]);
        self.stats.merges += 1;
        trace!(?root_a, ?root_b, ?new_root, weight, "union");

        if weight > weight_a {
            self.enqueue_all(&watchers_a);
        }
        if weight > weight_b {
            self.enqueue_all(&watchers_b);
        }
        for id in watchers_b {
            if !watchers_a.contains(&id) {
                watchers_a.push(id);
            }
        }
        self.watchers[new_root.index()] = watchers_a;

        if weight > weight_a.min(weight_b) {
            self.notify_includers(new_root);
        }
    }

    /// Record `target ⊇ source`: evidence of `source` becomes visible from `target`.
    pub fn include(&mut self, target: NodeId, source: NodeId) {
        let target = self.find(target);
        let source = self.find(source);
        if target == source {
            return;
        }
        let known = self.features[target.index()].includes.clone();
        if known.into_iter().any(|node| self.table.find(node) == source) {
            return;
        }
        self.features[target.index()].includes.push(source);
        self.features[source.index()].included_by.push(target);
        self.stats.includes += 1;
        trace!(?target, ?source, "include");
        self.notify(target);
    }

    // =========================================================================
    // Resolver dispatch
    // =========================================================================

    /// Watch `node`'s partition; queues `resolver` right away if evidence already exists.
    pub fn run_when_changed(&mut self, node: NodeId, resolver: ResolverId) {
        let root = self.find(node);
        if !self.watchers[root.index()].contains(&resolver) {
            self.watchers[root.index()].push(resolver);
        }
        let has_evidence = self
            .reachable(root)
            .into_iter()
            .any(|r| !self.features[r.index()].is_empty());
        if has_evidence {
            self.enqueue(resolver);
        }
    }

    pub fn pop_pending_resolver(&mut self) -> Option<ResolverId> {
        let id = self.pending.pop_front()?;
        self.queued.remove(&id);
        Some(id)
    }

    pub fn has_pending_resolvers(&self) -> bool {
        !self.pending.is_empty()
    }

    fn enqueue(&mut self, resolver: ResolverId) {
        if self.queued.insert(resolver) {
            self.pending.push_back(resolver);
            self.stats.resolver_triggers += 1;
        }
    }

    fn enqueue_all(&mut self, resolvers: &[ResolverId]) {
        for id in resolvers {
            self.enqueue(*id);
        }
    }

    /// `root` grew: wake its own watchers and everything that includes it.
    fn notify(&mut self, root: NodeId) {
        let watchers = self.watchers[root.index()].clone();
        self.enqueue_all(&watchers);
        self.notify_includers(root);
    }

    fn notify_includers(&mut self, root: NodeId) {
        let mut seen = FxHashSet::default();
        seen.insert(root);
        let mut stack: Vec<NodeId> = self.features[root.index()].included_by.clone();
        while let Some(node) = stack.pop() {
            let includer = self.table.find(node);
            if !seen.insert(includer) {
                continue;
            }
            let watchers = self.watchers[includer.index()].clone();
            self.enqueue_all(&watchers);
            stack.extend(self.features[includer.index()].included_by.iter().copied());
        }
    }

    /// Freeze the graph: every node is mapped to its representative once.
    pub fn into_solved(mut self) -> SolvedGraph {
        let roots = (0..self.features.len() as u32)
            .map(|index| self.table.find(NodeId(index)))
            .collect();
        SolvedGraph::new(roots, self.features)
    }
}

/// Depth-first walk over includes edges; shared by the live and frozen graphs.
pub(crate) fn reachable_roots(
    start: NodeId,
    mut find: impl FnMut(NodeId) -> NodeId,
    features: &[Feature],
) -> Vec<NodeId> {
    let mut seen = FxHashSet::default();
    let mut order = Vec::new();
    let mut stack = vec![find(start)];
    while let Some(node) = stack.pop() {
        let root = find(node);
        if !seen.insert(root) {
            continue;
        }
        order.push(root);
        stack.extend(features[root.index()].includes.iter().rev().copied());
    }
    order
}

#[cfg(test)]
#[path = "../tests/solver_tests.rs"]
mod tests;
