//! State shared by the visitor, the resolvers and the driver for one run.

use crate::error::InferError;
use crate::heap_bridge::HeapValueFactory;
use crate::options::InferenceOptions;
use crate::program_point::{ProgramPoint, ProgramPoints};
use crate::resolvers::ResolverKind;
use dtsgen_ast::{Ast, AstId};
use dtsgen_heap::{ClassRegistry, FunctionRecord, ObjId, Snapshot, Value};
use dtsgen_solver::{NodeId, ResolverId, Solver};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use tracing::trace;

/// Nodes synthesized for a library class, created on first use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassNodes {
    /// Receiver of every `new` on the class.
    pub new_this: NodeId,
    /// Every callee observed constructing the class.
    pub constructor: NodeId,
}

/// A user closure, or a chain of `bind` calls ending in one, flattened.
#[derive(Clone, Debug, PartialEq)]
pub struct ClosureInfo {
    pub ast: AstId,
    pub params: usize,
    pub env: Option<ObjId>,
    pub bound_this: Option<Value>,
    pub bound_args: Vec<Value>,
}

impl ClosureInfo {
    /// Arguments left for callers to supply.
    pub fn arity(&self) -> usize {
        self.params.saturating_sub(self.bound_args.len())
    }
}

pub struct InferenceContext<'a> {
    pub ast: &'a Ast,
    pub snapshot: &'a Snapshot,
    pub classes: &'a ClassRegistry,
    pub options: &'a InferenceOptions,
    pub solver: Solver,
    pub points: ProgramPoints,
    pub heap: HeapValueFactory,
    pub function_nodes: IndexMap<ObjId, NodeId>,
    pub entered: IndexSet<ObjId>,
    pub walk_counts: FxHashMap<ObjId, usize>,
    pub pending_walks: VecDeque<(ObjId, NodeId)>,
    pub seeded: FxHashSet<ProgramPoint>,
    pub class_nodes: IndexMap<ObjId, ClassNodes>,
    resolvers: Vec<Option<ResolverKind>>,
}

impl<'a> InferenceContext<'a> {
    pub fn new(
        ast: &'a Ast,
        snapshot: &'a Snapshot,
        classes: &'a ClassRegistry,
        options: &'a InferenceOptions,
    ) -> Self {
        InferenceContext {
            ast,
            snapshot,
            classes,
            options,
            solver: Solver::new(),
            points: ProgramPoints::new(),
            heap: HeapValueFactory::new(),
            function_nodes: IndexMap::new(),
            entered: IndexSet::new(),
            walk_counts: FxHashMap::default(),
            pending_walks: VecDeque::new(),
            seeded: FxHashSet::default(),
            class_nodes: IndexMap::new(),
            resolvers: Vec::new(),
        }
    }

    pub fn point(&mut self, closure: ObjId, ast: AstId) -> NodeId {
        self.points
            .get_or_create(&mut self.solver, ProgramPoint::new(closure, ast))
    }

    pub fn value_node(&mut self, value: &Value) -> NodeId {
        self.heap.value_node(&mut self.solver, self.snapshot, value)
    }

    pub fn object_node(&mut self, obj: ObjId) -> NodeId {
        self.heap.object_node(&mut self.solver, self.snapshot, obj)
    }

    /// Resolve `obj` to the user closure it runs, following `bind` chains.
    pub fn closure_info(&self, obj: ObjId) -> Option<ClosureInfo> {
        let mut chain: Vec<(&Value, &[Value])> = Vec::new();
        let mut current = obj;
        for _ in 0..=self.snapshot.len() {
            let object = self.snapshot.get(current)?;
            match object.function.as_ref()? {
                FunctionRecord::User { ast, params } => {
                    let mut info = ClosureInfo {
                        ast: *ast,
                        params: params.len(),
                        env: object.env,
                        bound_this: None,
                        bound_args: Vec::new(),
                    };
                    // Innermost bind fixes the receiver; outer binds append arguments.
                    for (this_arg, args) in chain.into_iter().rev() {
                        info.bound_this.get_or_insert_with(|| this_arg.clone());
                        info.bound_args.extend(args.iter().cloned());
                    }
                    return Some(info);
                }
                FunctionRecord::Bound {
                    target,
                    this_arg,
                    args,
                } => {
                    chain.push((this_arg, args.as_slice()));
                    current = *target;
                }
                FunctionRecord::Native { .. } | FunctionRecord::Unknown => return None,
            }
        }
        None
    }

    /// The memoized function node of a user or bound closure.
    pub fn function_node(&mut self, closure: ObjId) -> Result<NodeId, InferError> {
        if let Some(node) = self.function_nodes.get(&closure) {
            return Ok(*node);
        }
        let info = self
            .closure_info(closure)
            .ok_or(InferError::NotAClosure(closure))?;
        let node = self.solver.new_function(info.arity());
        self.function_nodes.insert(closure, node);
        trace!(closure = closure.0, ?node, arity = info.arity(), "function node");
        Ok(node)
    }

    /// Mark `closure` entered and queue its body; false if it was entered before.
    pub fn enter(&mut self, closure: ObjId, function: NodeId) -> bool {
        if !self.entered.insert(closure) {
            return false;
        }
        self.pending_walks.push_back((closure, function));
        true
    }

    pub fn class_nodes(&mut self, prototype: ObjId) -> ClassNodes {
        if let Some(nodes) = self.class_nodes.get(&prototype) {
            return *nodes;
        }
        let nodes = ClassNodes {
            new_this: self.solver.new_node(),
            constructor: self.solver.new_node(),
        };
        self.class_nodes.insert(prototype, nodes);
        nodes
    }

    // =========================================================================
    // Resolvers
    // =========================================================================

    /// Store `resolver` and run it whenever `node`'s evidence grows.
    pub fn watch(&mut self, node: NodeId, resolver: ResolverKind) -> ResolverId {
        let id = ResolverId(self.resolvers.len() as u32);
        self.resolvers.push(Some(resolver));
        self.solver.run_when_changed(node, id);
        id
    }

    /// Watch one more node with an existing resolver.
    pub fn watch_again(&mut self, node: NodeId, id: ResolverId) {
        self.solver.run_when_changed(node, id);
    }

    pub fn resolver_count(&self) -> usize {
        self.resolvers.len()
    }

    pub fn run_resolver(&mut self, id: ResolverId) -> Result<(), InferError> {
        let Some(mut resolver) = self
            .resolvers
            .get_mut(id.0 as usize)
            .and_then(Option::take)
        else {
            return Ok(());
        };
        let result = resolver.run(self);
        self.resolvers[id.0 as usize] = Some(resolver);
        result
    }
}
