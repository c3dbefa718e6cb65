//! Inference driver.
//!
//! Walks entry closures and drains the two work queues to a fixed point:
//! resolvers whose watched evidence grew, then closures discovered by call
//! resolution. Every closure is entered at most once per run.

use crate::context::InferenceContext;
use crate::error::InferError;
use crate::options::InferenceOptions;
use crate::result::InferenceResult;
use crate::visitor::{ConstraintVisitor, WalkScope};
use dtsgen_ast::{Ast, AstId};
use dtsgen_heap::{ClassRegistry, ObjId, Snapshot};
use dtsgen_solver::NodeId;
use tracing::{debug, trace};

pub struct TypeAnalysis<'a> {
    cx: InferenceContext<'a>,
}

impl<'a> TypeAnalysis<'a> {
    pub fn new(
        ast: &'a Ast,
        snapshot: &'a Snapshot,
        classes: &'a ClassRegistry,
        options: &'a InferenceOptions,
    ) -> Self {
        TypeAnalysis {
            cx: InferenceContext::new(ast, snapshot, classes, options),
        }
    }

    /// Analyse a user or bound closure and everything it reaches.
    ///
    /// Returns the closure's function node.
    #[tracing::instrument(level = "debug", skip(self, closure), fields(closure = closure.0))]
    pub fn analyse_closure(&mut self, closure: ObjId) -> Result<NodeId, InferError> {
        let function = self.cx.function_node(closure)?;
        self.cx.enter(closure, function);
        self.run_to_fixed_point()?;
        Ok(function)
    }

    /// Walk top-level code as if it ran in the global object's scope.
    #[tracing::instrument(level = "debug", skip(self, program), fields(program = program.0))]
    pub fn analyse_program(&mut self, program: AstId) -> Result<NodeId, InferError> {
        let global = self.cx.snapshot.global();
        let function = self.cx.solver.new_function(0);
        if let Some(shape) = self.cx.solver.function_shape(function) {
            let receiver = self.cx.object_node(global);
            self.cx.solver.union(shape.this, receiver);
        }
        let scope = WalkScope::for_program(global, program);
        let mut visitor = ConstraintVisitor::new(&mut self.cx, &scope, function)?;
        visitor.visit_node(program, program)?;
        self.run_to_fixed_point()?;
        Ok(function)
    }

    /// Analyse every user or bound closure reachable from the global object.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn analyse_reachable_closures(&mut self) -> Result<usize, InferError> {
        let snapshot = self.cx.snapshot;
        let mut count = 0;
        for obj in snapshot.reachable_objects() {
            if self.cx.closure_info(obj).is_none() {
                continue;
            }
            self.analyse_closure(obj)?;
            count += 1;
        }
        debug!(count, "analysed reachable closures");
        Ok(count)
    }

    fn run_to_fixed_point(&mut self) -> Result<(), InferError> {
        loop {
            if let Some(id) = self.cx.solver.pop_pending_resolver() {
                self.cx.run_resolver(id)?;
                continue;
            }
            if let Some((closure, function)) = self.cx.pending_walks.pop_front() {
                self.walk_closure(closure, function)?;
                continue;
            }
            break;
        }
        let stats = self.cx.solver.stats();
        debug!(
            nodes = stats.nodes,
            merges = stats.merges,
            resolvers = self.cx.resolver_count(),
            triggers = stats.resolver_triggers,
            "fixed point reached"
        );
        Ok(())
    }

    fn walk_closure(&mut self, closure: ObjId, function: NodeId) -> Result<(), InferError> {
        let info = self
            .cx
            .closure_info(closure)
            .ok_or(InferError::NotAClosure(closure))?;
        let ast = self.cx.ast;
        if !matches!(ast.get(info.ast), Some(dtsgen_ast::NodeKind::Function { .. })) {
            return Err(InferError::ClosureMismatch {
                closure,
                ast: info.ast,
            });
        }

        let walks = self.cx.walk_counts.entry(closure).or_insert(0);
        *walks += 1;
        debug_assert!(*walks <= 1, "closure {} walked twice", closure.0);
        trace!(closure = closure.0, function = info.ast.0, "walking closure");

        let syntax = info.ast;
        let scope = WalkScope::for_closure(closure, info);
        let mut visitor = ConstraintVisitor::new(&mut self.cx, &scope, function)?;
        visitor.visit_expr(syntax, syntax)?;
        Ok(())
    }

    pub fn finish(self) -> InferenceResult {
        InferenceResult::from_context(self.cx)
    }
}

#[cfg(test)]
#[path = "../tests/analysis_tests.rs"]
mod tests;
