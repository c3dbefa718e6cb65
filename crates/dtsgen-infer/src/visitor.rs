//! Constraint generation.
//!
//! A [`ConstraintVisitor`] walks syntax under one executing closure and one
//! function node, turning each construct into unions, includes edges and
//! resolver registrations. Function literals other than the closure's own
//! syntax get a fresh function node and a nested visitor over the same
//! closure key.

use crate::context::{ClosureInfo, InferenceContext};
use crate::error::InferError;
use crate::program_point::ProgramPoint;
use crate::resolvers::{
    CallGraphResolver, IncludesWithFieldsResolver, MemberResolver, NewCallResolver, ResolverKind,
};
use dtsgen_ast::{AstId, BinaryOp, NodeKind, UnaryOp};
use dtsgen_heap::{ObjId, Value};
use dtsgen_solver::{FunctionShape, NodeId, PrimitiveSet};
use indexmap::IndexMap;
use tracing::trace;

/// What the walk is scoped to.
#[derive(Clone, Debug)]
pub struct WalkScope {
    /// Program-point key for every node created by this walk.
    pub closure: ObjId,
    /// Syntax of the closure; declarations outside it are free variables.
    pub syntax: AstId,
    /// Environment free variables are seeded from.
    pub env: Option<ObjId>,
    /// Receiver and leading arguments fixed by `bind`.
    pub bound_this: Option<Value>,
    pub bound_args: Vec<Value>,
}

impl WalkScope {
    pub fn for_closure(closure: ObjId, info: ClosureInfo) -> WalkScope {
        WalkScope {
            closure,
            syntax: info.ast,
            env: info.env,
            bound_this: info.bound_this,
            bound_args: info.bound_args,
        }
    }

    /// Top-level code, keyed by the global object.
    pub fn for_program(global: ObjId, program: AstId) -> WalkScope {
        WalkScope {
            closure: global,
            syntax: program,
            env: None,
            bound_this: None,
            bound_args: Vec::new(),
        }
    }
}

pub struct ConstraintVisitor<'v, 'a> {
    cx: &'v mut InferenceContext<'a>,
    scope: &'v WalkScope,
    function: NodeId,
    shape: FunctionShape,
}

impl<'v, 'a> ConstraintVisitor<'v, 'a> {
    pub fn new(
        cx: &'v mut InferenceContext<'a>,
        scope: &'v WalkScope,
        function: NodeId,
    ) -> Result<Self, InferError> {
        let shape = cx
            .solver
            .function_shape(function)
            .ok_or(InferError::NotAClosure(scope.closure))?;
        Ok(ConstraintVisitor {
            cx,
            scope,
            function,
            shape,
        })
    }

    fn get(&mut self, ast: AstId) -> NodeId {
        self.cx.point(self.scope.closure, ast)
    }

    fn kind(&self, parent: AstId, id: AstId) -> Result<&'a NodeKind, InferError> {
        let ast = self.cx.ast;
        ast.get(id)
            .ok_or(InferError::MissingSubExpression { parent, child: id })
    }

    fn prim(&mut self, kinds: PrimitiveSet) -> NodeId {
        self.cx.solver.primitive(kinds)
    }

    fn union(&mut self, a: NodeId, b: NodeId) -> NodeId {
        self.cx.solver.union(a, b)
    }

    fn union_kind(&mut self, node: NodeId, kinds: PrimitiveSet) {
        let kind = self.prim(kinds);
        self.union(node, kind);
    }

    fn hint(&mut self, node: NodeId, hints: PrimitiveSet) {
        self.cx.solver.add_kinds(node, hints);
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Visit a node in statement position; expressions are evaluated and dropped.
    pub fn visit_node(&mut self, parent: AstId, id: AstId) -> Result<(), InferError> {
        if self.kind(parent, id)?.is_statement() {
            self.visit_stmt(parent, id)
        } else {
            self.visit_expr(parent, id).map(|_| ())
        }
    }

    fn visit_stmt(&mut self, parent: AstId, id: AstId) -> Result<(), InferError> {
        match self.kind(parent, id)? {
            NodeKind::Program { body } | NodeKind::Block { body } => {
                for stmt in body {
                    self.visit_node(id, *stmt)?;
                }
            }
            NodeKind::ExpressionStatement { expression } => {
                self.visit_expr(id, *expression)?;
            }
            NodeKind::VariableDeclaration { name, init } => {
                let name = self.visit_expr(id, *name)?;
                if let Some(init) = init {
                    let init = self.visit_expr(id, *init)?;
                    self.union(name, init);
                }
            }
            NodeKind::Return { argument } => match argument {
                Some(argument) => {
                    let value = self.visit_expr(id, *argument)?;
                    self.hint(value, PrimitiveSet::NON_VOID);
                    self.union(value, self.shape.ret);
                }
                None => {
                    let ret = self.shape.ret;
                    self.union_kind(ret, PrimitiveSet::UNDEFINED);
                }
            },
            NodeKind::If {
                test,
                consequent,
                alternate,
            } => {
                self.visit_expr(id, *test)?;
                self.visit_node(id, *consequent)?;
                if let Some(alternate) = alternate {
                    self.visit_node(id, *alternate)?;
                }
            }
            NodeKind::While { test, body } | NodeKind::DoWhile { body, test } => {
                self.visit_expr(id, *test)?;
                self.visit_node(id, *body)?;
            }
            NodeKind::For {
                init,
                test,
                update,
                body,
            } => {
                if let Some(init) = init {
                    self.visit_node(id, *init)?;
                }
                if let Some(test) = test {
                    self.visit_expr(id, *test)?;
                }
                if let Some(update) = update {
                    self.visit_expr(id, *update)?;
                }
                self.visit_node(id, *body)?;
            }
            NodeKind::ForIn {
                binding,
                collection,
                body,
            } => {
                let key = match self.kind(id, *binding)? {
                    NodeKind::VariableDeclaration { name, .. } => {
                        self.visit_stmt(id, *binding)?;
                        self.get(*name)
                    }
                    _ => self.visit_expr(id, *binding)?,
                };
                self.union_kind(key, PrimitiveSet::STRING);
                let collection = self.visit_expr(id, *collection)?;
                let shape = self.cx.solver.empty_object();
                self.union(collection, shape);
                self.visit_node(id, *body)?;
            }
            NodeKind::Switch {
                discriminant,
                cases,
            } => {
                let discriminant = self.visit_expr(id, *discriminant)?;
                self.hint(discriminant, PrimitiveSet::STRING_OR_NUMBER);
                for case in cases {
                    if let Some(test) = case.test {
                        self.visit_expr(id, test)?;
                    }
                    for stmt in &case.body {
                        self.visit_node(id, *stmt)?;
                    }
                }
            }
            NodeKind::Throw { argument } => {
                self.visit_expr(id, *argument)?;
            }
            NodeKind::Try {
                block,
                param,
                handler,
                finalizer,
            } => {
                self.visit_node(id, *block)?;
                if let Some(param) = param {
                    self.visit_expr(id, *param)?;
                }
                if let Some(handler) = handler {
                    self.visit_node(id, *handler)?;
                }
                if let Some(finalizer) = finalizer {
                    self.visit_node(id, *finalizer)?;
                }
            }
            NodeKind::Break | NodeKind::Continue | NodeKind::Empty => {}
            other => {
                return Err(InferError::UnsupportedConstruct {
                    kind: other.name(),
                    at: id,
                });
            }
        }
        Ok(())
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Visit an expression and return its program-point node.
    pub fn visit_expr(&mut self, parent: AstId, id: AstId) -> Result<NodeId, InferError> {
        let kind = self.kind(parent, id)?;
        let node = self.get(id);
        match kind {
            NodeKind::StringLiteral { .. } => self.union_kind(node, PrimitiveSet::STRING),
            NodeKind::NumberLiteral { .. } => self.union_kind(node, PrimitiveSet::NUMBER),
            NodeKind::BooleanLiteral { .. } => self.union_kind(node, PrimitiveSet::BOOLEAN),
            NodeKind::NullLiteral => self.union_kind(node, PrimitiveSet::NULL),
            NodeKind::UndefinedLiteral => self.union_kind(node, PrimitiveSet::UNDEFINED),
            NodeKind::Identifier { name, declaration } => {
                let Some(declaration) = declaration else {
                    return Err(InferError::MissingDeclaration {
                        name: name.clone(),
                        at: id,
                    });
                };
                self.seed_free_variable(*declaration, name);
                let declared = self.get(*declaration);
                self.union(node, declared);
            }
            NodeKind::This => {
                let this = self.shape.this;
                self.union(node, this);
            }
            NodeKind::Binary { op, lhs, rhs } => self.visit_binary(id, node, *op, *lhs, *rhs)?,
            NodeKind::Unary { op, operand } => self.visit_unary(id, node, *op, *operand)?,
            NodeKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.visit_expr(id, *test)?;
                let consequent = self.visit_expr(id, *consequent)?;
                let alternate = self.visit_expr(id, *alternate)?;
                self.union(consequent, alternate);
                self.union(node, consequent);
            }
            NodeKind::Comma { expressions } => {
                let mut last = None;
                for expression in expressions {
                    last = Some(self.visit_expr(id, *expression)?);
                }
                if let Some(last) = last {
                    self.union(node, last);
                }
            }
            NodeKind::Member { object, property } => {
                self.visit_member(id, node, *object, property)?;
            }
            NodeKind::DynamicAccess { object, key } => {
                let key = self.visit_expr(id, *key)?;
                self.hint(key, PrimitiveSet::STRING_OR_NUMBER);
                let object = self.visit_expr(id, *object)?;
                let holder = self.cx.solver.index_holder(node);
                self.union(object, holder);
                self.cx.watch(
                    object,
                    ResolverKind::IncludesWithFields(IncludesWithFieldsResolver::new(object)),
                );
            }
            NodeKind::Call { callee, args } => {
                let args = self.visit_args(id, args)?;
                let callee = self.visit_expr(id, *callee)?;
                let this = self.shape.this;
                self.visit_call(node, callee, &args, this);
            }
            NodeKind::MethodCall { member, args } => {
                let args = self.visit_args(id, args)?;
                let callee = self.visit_expr(id, *member)?;
                let NodeKind::Member { object, .. } = self.kind(id, *member)? else {
                    return Err(InferError::UnsupportedConstruct {
                        kind: self.kind(id, *member)?.name(),
                        at: *member,
                    });
                };
                let this = self.get(*object);
                self.visit_call(node, callee, &args, this);
            }
            NodeKind::New { callee, args } => {
                let args = self.visit_args(id, args)?;
                let callee = self.visit_expr(id, *callee)?;
                self.watch_includes(callee);
                let resolver = NewCallResolver::new(self.cx, callee, &args, node);
                self.cx.watch(callee, ResolverKind::NewCall(resolver));
            }
            NodeKind::Function { name, params, body } => {
                if id == self.scope.syntax {
                    self.visit_own_function(id, *name, params, *body)?;
                } else {
                    self.visit_nested_function(id, node, *name, params, *body)?;
                }
            }
            NodeKind::ObjectLiteral { properties } => {
                let mut fields = IndexMap::new();
                for prop in properties {
                    let value = self.visit_expr(id, prop.value)?;
                    self.hint(value, PrimitiveSet::NON_VOID);
                    fields.insert(prop.key.clone(), value);
                }
                let object = self.cx.solver.object_with_fields(fields);
                self.union(node, object);
            }
            other => {
                return Err(InferError::UnsupportedConstruct {
                    kind: other.name(),
                    at: id,
                });
            }
        }
        Ok(node)
    }

    fn visit_args(&mut self, parent: AstId, args: &[AstId]) -> Result<Vec<NodeId>, InferError> {
        args.iter().map(|arg| self.visit_expr(parent, *arg)).collect()
    }

    fn visit_binary(
        &mut self,
        id: AstId,
        node: NodeId,
        op: BinaryOp,
        lhs: AstId,
        rhs: AstId,
    ) -> Result<(), InferError> {
        let lhs = self.visit_expr(id, lhs)?;
        let rhs = self.visit_expr(id, rhs)?;
        self.hint(lhs, PrimitiveSet::NON_VOID);
        self.hint(rhs, PrimitiveSet::NON_VOID);

        match op {
            BinaryOp::Plus => {
                self.hint(lhs, PrimitiveSet::STRING_OR_NUMBER);
                self.hint(rhs, PrimitiveSet::STRING_OR_NUMBER);
                let string_or_number = self.prim(PrimitiveSet::STRING_OR_NUMBER);
                self.cx.solver.include(node, lhs);
                self.cx.solver.include(node, rhs);
                self.cx.solver.include(node, string_or_number);
            }
            BinaryOp::Assign => {
                self.union(lhs, rhs);
                self.union(node, lhs);
            }
            BinaryOp::PlusAssign => {
                self.union(lhs, rhs);
                self.union_kind(lhs, PrimitiveSet::STRING_OR_NUMBER);
                self.union(node, lhs);
            }
            op if op.is_numeric_assignment() => {
                self.union_kind(lhs, PrimitiveSet::NUMBER);
                self.hint(rhs, PrimitiveSet::STRING_OR_NUMBER);
                self.union(node, lhs);
            }
            BinaryOp::Minus
            | BinaryOp::Mult
            | BinaryOp::Div
            | BinaryOp::Mod
            | BinaryOp::BitwiseAnd
            | BinaryOp::BitwiseOr
            | BinaryOp::BitwiseXor
            | BinaryOp::LeftShift
            | BinaryOp::RightShift
            | BinaryOp::UnsignedRightShift => {
                self.hint(lhs, PrimitiveSet::STRING_OR_NUMBER);
                self.hint(rhs, PrimitiveSet::STRING_OR_NUMBER);
                self.union_kind(node, PrimitiveSet::NUMBER);
            }
            BinaryOp::Equal
            | BinaryOp::NotEqual
            | BinaryOp::StrictEqual
            | BinaryOp::StrictNotEqual
            | BinaryOp::LessThan
            | BinaryOp::LessThanEqual
            | BinaryOp::GreaterThan
            | BinaryOp::GreaterThanEqual => {
                self.union(lhs, rhs);
                self.union_kind(node, PrimitiveSet::BOOLEAN);
            }
            BinaryOp::And | BinaryOp::Or => {
                self.cx.solver.include(node, lhs);
                self.cx.solver.include(node, rhs);
            }
            BinaryOp::InstanceOf => self.union_kind(node, PrimitiveSet::BOOLEAN),
            BinaryOp::In => {
                self.union_kind(lhs, PrimitiveSet::STRING);
                let shape = self.cx.solver.empty_object();
                self.union(rhs, shape);
                self.union_kind(node, PrimitiveSet::BOOLEAN);
            }
            other => {
                return Err(InferError::UnsupportedConstruct {
                    kind: other.token(),
                    at: id,
                });
            }
        }
        Ok(())
    }

    fn visit_unary(
        &mut self,
        id: AstId,
        node: NodeId,
        op: UnaryOp,
        operand: AstId,
    ) -> Result<(), InferError> {
        let operand = self.visit_expr(id, operand)?;
        self.hint(operand, PrimitiveSet::NON_VOID);
        let result = match op {
            UnaryOp::Minus
            | UnaryOp::Plus
            | UnaryOp::Increment
            | UnaryOp::Decrement
            | UnaryOp::BitwiseNot => {
                self.union_kind(operand, PrimitiveSet::NUMBER);
                PrimitiveSet::NUMBER
            }
            UnaryOp::Not | UnaryOp::Delete => PrimitiveSet::BOOLEAN,
            UnaryOp::TypeOf => PrimitiveSet::STRING,
            UnaryOp::Void => PrimitiveSet::UNDEFINED,
        };
        self.union_kind(node, result);
        Ok(())
    }

    fn visit_member(
        &mut self,
        id: AstId,
        node: NodeId,
        object: AstId,
        property: &str,
    ) -> Result<(), InferError> {
        let object = self.visit_expr(id, object)?;
        let shape = self.cx.solver.object_with_field(property, node);
        self.union(shape, object);
        self.hint(node, PrimitiveSet::NON_VOID);
        self.cx.watch(
            object,
            ResolverKind::Member(MemberResolver::new(object, node, property)),
        );
        self.watch_includes(object);
        Ok(())
    }

    fn visit_call(&mut self, node: NodeId, callee: NodeId, args: &[NodeId], this: NodeId) {
        let ret = self.cx.solver.new_node();
        self.watch_includes(callee);
        let resolver = CallGraphResolver::new(self.cx, callee, args, ret, this, false);
        self.cx.watch(callee, ResolverKind::CallGraph(resolver));
        self.union(node, ret);
    }

    fn watch_includes(&mut self, node: NodeId) {
        self.cx.watch(
            node,
            ResolverKind::IncludesWithFields(IncludesWithFieldsResolver::new(node)),
        );
    }

    /// The closure's own syntax: walk the body in place against its function node.
    fn visit_own_function(
        &mut self,
        id: AstId,
        name: Option<AstId>,
        params: &[AstId],
        body: AstId,
    ) -> Result<(), InferError> {
        if let Some(name) = name {
            let name = self.visit_expr(id, name)?;
            let closure = self.cx.object_node(self.scope.closure);
            self.union(name, closure);
        }

        let mut nodes = Vec::with_capacity(params.len());
        for param in params {
            let node = self.visit_expr(id, *param)?;
            self.hint(node, PrimitiveSet::NON_VOID);
            nodes.push(node);
        }

        let scope = self.scope;
        let bound = scope.bound_args.len().min(nodes.len());
        for (index, value) in scope.bound_args.iter().take(bound).enumerate() {
            let value = self.cx.value_node(value);
            self.union(nodes[index], value);
        }
        for (slot, param) in self.shape.args.clone().iter().zip(&nodes[bound..]) {
            self.union(*slot, *param);
        }
        if let Some(this_arg) = &scope.bound_this {
            let value = self.cx.value_node(this_arg);
            self.union(self.shape.this, value);
        }

        self.visit_node(id, body)
    }

    /// A function literal inside the walked code: fresh function node, nested walk.
    fn visit_nested_function(
        &mut self,
        id: AstId,
        node: NodeId,
        name: Option<AstId>,
        params: &[AstId],
        body: AstId,
    ) -> Result<(), InferError> {
        let function = self.cx.solver.new_function(params.len());
        if let Some(name) = name {
            let name = self.visit_expr(id, name)?;
            self.union(name, function);
        }

        trace!(closure = self.scope.closure.0, function = id.0, "nested function");
        let mut nested = ConstraintVisitor::new(self.cx, self.scope, function)?;
        let args = nested.shape.args.clone();
        for (slot, param) in args.iter().zip(params) {
            let param = nested.visit_expr(id, *param)?;
            nested.union(param, *slot);
            nested.hint(param, PrimitiveSet::NON_VOID);
        }
        nested.visit_node(id, body)?;

        self.union(node, function);
        Ok(())
    }

    /// Seed a declaration outside the closure's syntax from the recorded environment.
    fn seed_free_variable(&mut self, declaration: AstId, name: &str) {
        if !self.cx.options.seed_environment || self.cx.ast.is_within(declaration, self.scope.syntax) {
            return;
        }
        let point = ProgramPoint::new(self.scope.closure, declaration);
        if !self.cx.seeded.insert(point) {
            return;
        }
        let snapshot = self.cx.snapshot;
        let Some(value) = snapshot.lookup_variable(self.scope.env, name) else {
            return;
        };
        let value = self.cx.value_node(value);
        let declared = self.get(declaration);
        trace!(closure = self.scope.closure.0, %name, "seeded free variable");
        self.union(declared, value);
    }

    pub fn function(&self) -> NodeId {
        self.function
    }
}

#[cfg(test)]
#[path = "../tests/visitor_tests.rs"]
mod tests;
