//! The finished graph handed to type combination and printing.

use crate::context::{ClassNodes, InferenceContext};
use crate::program_point::{ProgramPoint, ProgramPoints};
use dtsgen_ast::AstId;
use dtsgen_heap::ObjId;
use dtsgen_solver::{FunctionShape, NodeId, PrimitiveSet, SolvedGraph, SolverStats};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;

#[derive(Clone, Debug)]
pub struct InferenceResult {
    graph: SolvedGraph,
    points: ProgramPoints,
    function_nodes: IndexMap<ObjId, NodeId>,
    entered: IndexSet<ObjId>,
    walk_counts: FxHashMap<ObjId, usize>,
    class_nodes: IndexMap<ObjId, ClassNodes>,
    stats: SolverStats,
}

impl InferenceResult {
    pub(crate) fn from_context(cx: InferenceContext<'_>) -> InferenceResult {
        let stats = cx.solver.stats();
        InferenceResult {
            graph: cx.solver.into_solved(),
            points: cx.points,
            function_nodes: cx.function_nodes,
            entered: cx.entered,
            walk_counts: cx.walk_counts,
            class_nodes: cx.class_nodes,
            stats,
        }
    }

    pub fn graph(&self) -> &SolvedGraph {
        &self.graph
    }

    pub fn stats(&self) -> SolverStats {
        self.stats
    }

    /// Node of `ast` as walked under `closure`, if that point was visited.
    pub fn node_at(&self, closure: ObjId, ast: AstId) -> Option<NodeId> {
        self.points
            .get(ProgramPoint::new(closure, ast))
            .map(|node| self.graph.find(node))
    }

    pub fn program_points(&self) -> &ProgramPoints {
        &self.points
    }

    pub fn function_node(&self, closure: ObjId) -> Option<NodeId> {
        self.function_nodes
            .get(&closure)
            .map(|node| self.graph.find(*node))
    }

    pub fn function_nodes(&self) -> impl Iterator<Item = (ObjId, NodeId)> + '_ {
        self.function_nodes
            .iter()
            .map(|(closure, node)| (*closure, self.graph.find(*node)))
    }

    pub fn entered_closures(&self) -> &IndexSet<ObjId> {
        &self.entered
    }

    /// How many times the closure's body was walked: 1 once entered, else 0.
    pub fn walk_count(&self, closure: ObjId) -> usize {
        self.walk_counts.get(&closure).copied().unwrap_or(0)
    }

    pub fn class_nodes(&self, prototype: ObjId) -> Option<ClassNodes> {
        self.class_nodes.get(&prototype).map(|nodes| ClassNodes {
            new_this: self.graph.find(nodes.new_this),
            constructor: self.graph.find(nodes.constructor),
        })
    }

    // Read-offs, forwarded to the solved graph.

    pub fn kinds(&self, node: NodeId) -> PrimitiveSet {
        self.graph.kinds(node)
    }

    pub fn hints(&self, node: NodeId) -> PrimitiveSet {
        self.graph.hints(node)
    }

    pub fn fields(&self, node: NodeId) -> Vec<(&str, NodeId)> {
        self.graph.fields(node)
    }

    pub fn field(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.graph.field(node, name)
    }

    pub fn function_shape(&self, node: NodeId) -> Option<FunctionShape> {
        self.graph.function_shape(node)
    }

    pub fn heap_values(&self, node: NodeId) -> IndexSet<ObjId> {
        self.graph.heap_values(node)
    }

    pub fn prototypes(&self, node: NodeId) -> IndexSet<ObjId> {
        self.graph.prototypes(node)
    }

    pub fn index_value(&self, node: NodeId) -> Option<NodeId> {
        self.graph.index_value(node)
    }
}
