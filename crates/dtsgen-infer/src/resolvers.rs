//! Lazy resolvers.
//!
//! Each resolver watches one or more nodes and is re-run by the driver
//! whenever their evidence grows. Evidence is never complete on any given
//! run, so every resolver keeps a seen-set and only handles what is new.
//!
//! - [`MemberResolver`] looks `o.name` up through the prototype chains of
//!   every heap object `o` may hold
//! - [`CallGraphResolver`] discovers call targets and enters user closures
//! - [`NewCallResolver`] adds constructor semantics on top of a call
//! - [`IncludesWithFieldsResolver`] shares field evidence with included shapes

use crate::context::InferenceContext;
use crate::error::InferError;
use crate::heap_bridge::signature_node;
use dtsgen_heap::{FunctionRecord, ObjId};
use dtsgen_solver::{NodeId, PrimitiveSet};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::trace;

#[derive(Debug)]
pub enum ResolverKind {
    Member(MemberResolver),
    CallGraph(CallGraphResolver),
    NewCall(NewCallResolver),
    IncludesWithFields(IncludesWithFieldsResolver),
}

impl ResolverKind {
    pub fn run(&mut self, cx: &mut InferenceContext<'_>) -> Result<(), InferError> {
        match self {
            ResolverKind::Member(resolver) => resolver.run(cx),
            ResolverKind::CallGraph(resolver) => resolver.run(cx),
            ResolverKind::NewCall(resolver) => resolver.run(cx),
            ResolverKind::IncludesWithFields(resolver) => resolver.run(cx),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResolverKind::Member(_) => "member",
            ResolverKind::CallGraph(_) => "call-graph",
            ResolverKind::NewCall(_) => "new-call",
            ResolverKind::IncludesWithFields(_) => "includes-with-fields",
        }
    }
}

/// Function-valued heap objects visible from `node` that are not in `seen` yet.
fn new_closures(cx: &mut InferenceContext<'_>, node: NodeId, seen: &mut FxHashSet<ObjId>) -> Vec<ObjId> {
    let snapshot = cx.snapshot;
    cx.solver
        .reachable_heap_values(node)
        .into_iter()
        .filter(|obj| snapshot.function(*obj).is_some())
        .filter(|obj| seen.insert(*obj))
        .collect()
}

// =============================================================================
// Member access
// =============================================================================

#[derive(Debug)]
pub struct MemberResolver {
    object: NodeId,
    result: NodeId,
    property: String,
    seen: FxHashSet<ObjId>,
}

impl MemberResolver {
    pub fn new(object: NodeId, result: NodeId, property: &str) -> Self {
        MemberResolver {
            object,
            result,
            property: property.to_string(),
            seen: FxHashSet::default(),
        }
    }

    fn run(&mut self, cx: &mut InferenceContext<'_>) -> Result<(), InferError> {
        let mut starts = cx.solver.reachable_heap_values(self.object);
        starts.extend(cx.solver.reachable_prototypes(self.object));

        let snapshot = cx.snapshot;
        for start in starts {
            if !self.seen.insert(start) {
                continue;
            }
            let Some(prop) = snapshot.lookup_property(start, &self.property) else {
                continue;
            };
            let value = cx.value_node(&prop.value);
            trace!(property = %self.property, start = start.0, "member resolved");
            cx.solver.union(self.result, value);
        }
        Ok(())
    }
}

// =============================================================================
// Calls
// =============================================================================

#[derive(Debug)]
pub struct CallGraphResolver {
    /// Call-site function node, unified with the callee.
    site: NodeId,
    arg_count: usize,
    constructor_calls: bool,
    seen: FxHashSet<ObjId>,
}

impl CallGraphResolver {
    /// Build the call-site function node and tie it to `callee`, `args`, `ret` and `this`.
    pub fn new(
        cx: &mut InferenceContext<'_>,
        callee: NodeId,
        args: &[NodeId],
        ret: NodeId,
        this: NodeId,
        constructor_calls: bool,
    ) -> Self {
        let site = cx.solver.new_function(args.len());
        cx.solver.union(callee, site);
        if let Some(shape) = cx.solver.function_shape(site) {
            for (slot, arg) in shape.args.iter().zip(args) {
                cx.solver.union(*slot, *arg);
                cx.solver.add_kinds(*arg, PrimitiveSet::NON_VOID);
            }
            cx.solver.union(shape.ret, ret);
            cx.solver.union(shape.this, this);
        }
        CallGraphResolver {
            site,
            arg_count: args.len(),
            constructor_calls,
            seen: FxHashSet::default(),
        }
    }

    fn run(&mut self, cx: &mut InferenceContext<'_>) -> Result<(), InferError> {
        let snapshot = cx.snapshot;
        for closure in new_closures(cx, self.site, &mut self.seen) {
            let Some(record) = snapshot.function(closure) else {
                continue;
            };
            match record {
                FunctionRecord::User { .. } | FunctionRecord::Bound { .. } => {
                    if cx.closure_info(closure).is_none() {
                        // A bound native or unknown function: nothing to walk.
                        continue;
                    }
                    let function = cx.function_node(closure)?;
                    cx.solver.union(function, self.site);
                    if cx.enter(closure, function) {
                        trace!(closure = closure.0, "closure discovered");
                    }
                }
                FunctionRecord::Native {
                    call_signatures,
                    construct_signatures,
                } => {
                    let signatures = if self.constructor_calls {
                        construct_signatures
                    } else {
                        call_signatures
                    };
                    for signature in signatures {
                        let node = signature_node(
                            &mut cx.solver,
                            signature,
                            self.arg_count,
                            self.constructor_calls,
                        );
                        cx.solver.union(self.site, node);
                    }
                }
                FunctionRecord::Unknown => {}
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct NewCallResolver {
    callee: NodeId,
    this: NodeId,
    call: CallGraphResolver,
    seen: FxHashSet<ObjId>,
}

impl NewCallResolver {
    pub fn new(cx: &mut InferenceContext<'_>, callee: NodeId, args: &[NodeId], this: NodeId) -> Self {
        let ret = cx.solver.new_node();
        let call = CallGraphResolver::new(cx, callee, args, ret, this, true);
        NewCallResolver {
            callee,
            this,
            call,
            seen: FxHashSet::default(),
        }
    }

    fn run(&mut self, cx: &mut InferenceContext<'_>) -> Result<(), InferError> {
        let snapshot = cx.snapshot;
        for closure in new_closures(cx, self.callee, &mut self.seen) {
            let Some(record) = snapshot.function(closure) else {
                continue;
            };
            // Bound functions construct through their target's prototype.
            let constructor = match record {
                FunctionRecord::Bound { target, .. } => *target,
                FunctionRecord::Unknown => continue,
                _ => closure,
            };
            let Some(prototype) = snapshot.prototype_property(constructor) else {
                continue;
            };
            let marker = cx.solver.has_prototype(prototype);
            cx.solver.union(self.this, marker);

            if matches!(record, FunctionRecord::Native { .. }) || !cx.classes.contains(prototype) {
                continue;
            }
            let class = cx.class_nodes(prototype);
            if cx.options.class_options.use_this_object_usages {
                cx.solver.union(self.this, class.new_this);
            }
            if cx.options.class_options.use_constructor_usages {
                cx.solver.union(class.constructor, self.callee);
            }
            trace!(prototype = prototype.0, "library class constructed");
        }
        self.call.run(cx)
    }
}

// =============================================================================
// Structural cross-propagation
// =============================================================================

#[derive(Debug)]
pub struct IncludesWithFieldsResolver {
    node: NodeId,
}

impl IncludesWithFieldsResolver {
    pub fn new(node: NodeId) -> Self {
        IncludesWithFieldsResolver { node }
    }

    fn run(&mut self, cx: &mut InferenceContext<'_>) -> Result<(), InferError> {
        let mine = cx.solver.find(self.node);
        if cx.solver.feature(mine).fields.is_none() {
            return Ok(());
        }
        let my_fields = cx.solver.fields(mine);
        let peers: SmallVec<[NodeId; 4]> = cx
            .solver
            .reachable(mine)
            .into_iter()
            .filter(|peer| *peer != mine)
            .collect();

        for peer in peers {
            for (name, my_field) in &my_fields {
                if let Some(other_field) = cx.solver.field(peer, name) {
                    cx.solver.include(*my_field, other_field);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/resolvers_tests.rs"]
mod tests;
