//! Program-point index.
//!
//! A program point is a syntax node seen under one executing closure. The
//! same node walked under two closures gets two nodes; two visits under the
//! same closure always get the same one.

use dtsgen_ast::AstId;
use dtsgen_heap::ObjId;
use dtsgen_solver::{NodeId, Solver};
use rustc_hash::FxHashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramPoint {
    pub closure: ObjId,
    pub ast: AstId,
}

impl ProgramPoint {
    pub fn new(closure: ObjId, ast: AstId) -> ProgramPoint {
        ProgramPoint { closure, ast }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ProgramPoints {
    nodes: FxHashMap<ProgramPoint, NodeId>,
}

impl ProgramPoints {
    pub fn new() -> ProgramPoints {
        ProgramPoints::default()
    }

    /// The node for `point`, created empty on first use.
    pub fn get_or_create(&mut self, solver: &mut Solver, point: ProgramPoint) -> NodeId {
        *self
            .nodes
            .entry(point)
            .or_insert_with(|| solver.new_node())
    }

    pub fn get(&self, point: ProgramPoint) -> Option<NodeId> {
        self.nodes.get(&point).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProgramPoint, NodeId)> + '_ {
        self.nodes.iter().map(|(point, node)| (*point, *node))
    }
}
