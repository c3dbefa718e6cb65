//! Ast arena and its creation methods (`add_*`).
//!
//! Trees are built bottom-up: children are added before the node that owns
//! them, so parent links can be filled in as each node is pushed. Trees
//! decoded from JSON get their parent links from [`Ast::link`].

use crate::error::AstError;
use crate::node::{AstId, NodeKind, ObjectProperty, SwitchCase};
use crate::ops::{BinaryOp, UnaryOp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Ast {
    nodes: Vec<NodeKind>,
    #[serde(skip)]
    parents: Vec<Option<AstId>>,
}

impl Ast {
    pub fn new() -> Ast {
        Ast::default()
    }

    /// Decode a tree from its JSON form and link parents.
    pub fn from_json_str(source: &str) -> Result<Ast, AstError> {
        let mut ast: Ast =
            serde_json::from_str(source).map_err(|err| AstError::Decode(err.to_string()))?;
        ast.link()?;
        Ok(ast)
    }

    /// Validate child references and recompute every parent link.
    ///
    /// Every node may have at most one parent and no node may be its own
    /// ancestor.
    pub fn link(&mut self) -> Result<(), AstError> {
        self.parents = vec![None; self.nodes.len()];
        for (index, kind) in self.nodes.iter().enumerate() {
            let parent = AstId(index as u32);
            for child in kind.children() {
                let Some(slot) = self.parents.get_mut(child.index()) else {
                    return Err(AstError::DanglingChild { parent, child });
                };
                if let Some(first) = *slot {
                    return Err(AstError::SharedChild {
                        child,
                        first,
                        second: parent,
                    });
                }
                *slot = Some(parent);
            }
            if let NodeKind::Identifier {
                declaration: Some(decl),
                ..
            } = kind
            {
                if decl.index() >= self.nodes.len() {
                    return Err(AstError::DanglingChild {
                        parent,
                        child: *decl,
                    });
                }
            }
        }
        self.check_acyclic()
    }

    /// Walk parent links from every node; with single parents a cycle is
    /// the only way to revisit a node on the current path.
    fn check_acyclic(&self) -> Result<(), AstError> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Unseen,
            OnPath,
            Rooted,
        }

        let mut marks = vec![Mark::Unseen; self.parents.len()];
        let mut path = Vec::new();
        for start in 0..self.parents.len() {
            let mut current = Some(start);
            while let Some(index) = current {
                match marks[index] {
                    Mark::Rooted => break,
                    Mark::OnPath => return Err(AstError::Cycle(AstId(index as u32))),
                    Mark::Unseen => {}
                }
                marks[index] = Mark::OnPath;
                path.push(index);
                current = self.parents[index].map(AstId::index);
            }
            for index in path.drain(..) {
                marks[index] = Mark::Rooted;
            }
        }
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn get(&self, id: AstId) -> Option<&NodeKind> {
        self.nodes.get(id.index())
    }

    #[inline]
    pub fn parent(&self, id: AstId) -> Option<AstId> {
        self.parents.get(id.index()).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AstId, &NodeKind)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, kind)| (AstId(index as u32), kind))
    }

    /// True when `node` is `ancestor` or lies somewhere below it.
    pub fn is_within(&self, node: AstId, ancestor: AstId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Parameter identifiers of a `Function` node.
    pub fn function_params(&self, id: AstId) -> Option<&[AstId]> {
        match self.get(id)? {
            NodeKind::Function { params, .. } => Some(params.as_slice()),
            _ => None,
        }
    }

    pub fn identifier_name(&self, id: AstId) -> Option<&str> {
        match self.get(id)? {
            NodeKind::Identifier { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Push a node whose children are already in the arena.
    pub fn add(&mut self, kind: NodeKind) -> AstId {
        let id = AstId(self.nodes.len() as u32);
        self.parents.push(None);
        for child in kind.children() {
            if let Some(slot) = self.parents.get_mut(child.index()) {
                *slot = Some(id);
            }
        }
        self.nodes.push(kind);
        id
    }

    // Literals

    pub fn add_string(&mut self, value: &str) -> AstId {
        self.add(NodeKind::StringLiteral {
            value: value.to_string(),
        })
    }

    pub fn add_number(&mut self, value: f64) -> AstId {
        self.add(NodeKind::NumberLiteral { value })
    }

    pub fn add_bool(&mut self, value: bool) -> AstId {
        self.add(NodeKind::BooleanLiteral { value })
    }

    pub fn add_null(&mut self) -> AstId {
        self.add(NodeKind::NullLiteral)
    }

    pub fn add_undefined(&mut self) -> AstId {
        self.add(NodeKind::UndefinedLiteral)
    }

    // Identifiers

    /// A declaring identifier (parameter, variable or function name).
    pub fn add_declaration(&mut self, name: &str) -> AstId {
        let id = AstId(self.nodes.len() as u32);
        self.add(NodeKind::Identifier {
            name: name.to_string(),
            declaration: Some(id),
        })
    }

    pub fn add_reference(&mut self, name: &str, declaration: AstId) -> AstId {
        self.add(NodeKind::Identifier {
            name: name.to_string(),
            declaration: Some(declaration),
        })
    }

    /// An identifier the parser could not bind.
    pub fn add_unresolved(&mut self, name: &str) -> AstId {
        self.add(NodeKind::Identifier {
            name: name.to_string(),
            declaration: None,
        })
    }

    // Expressions

    pub fn add_this(&mut self) -> AstId {
        self.add(NodeKind::This)
    }

    pub fn add_binary(&mut self, op: BinaryOp, lhs: AstId, rhs: AstId) -> AstId {
        self.add(NodeKind::Binary { op, lhs, rhs })
    }

    pub fn add_unary(&mut self, op: UnaryOp, operand: AstId) -> AstId {
        self.add(NodeKind::Unary { op, operand })
    }

    pub fn add_conditional(&mut self, test: AstId, consequent: AstId, alternate: AstId) -> AstId {
        self.add(NodeKind::Conditional {
            test,
            consequent,
            alternate,
        })
    }

    pub fn add_comma(&mut self, expressions: Vec<AstId>) -> AstId {
        self.add(NodeKind::Comma { expressions })
    }

    pub fn add_member(&mut self, object: AstId, property: &str) -> AstId {
        self.add(NodeKind::Member {
            object,
            property: property.to_string(),
        })
    }

    pub fn add_dynamic_access(&mut self, object: AstId, key: AstId) -> AstId {
        self.add(NodeKind::DynamicAccess { object, key })
    }

    pub fn add_call(&mut self, callee: AstId, args: Vec<AstId>) -> AstId {
        self.add(NodeKind::Call { callee, args })
    }

    pub fn add_method_call(&mut self, member: AstId, args: Vec<AstId>) -> AstId {
        self.add(NodeKind::MethodCall { member, args })
    }

    pub fn add_new(&mut self, callee: AstId, args: Vec<AstId>) -> AstId {
        self.add(NodeKind::New { callee, args })
    }

    pub fn add_function(&mut self, name: Option<AstId>, params: Vec<AstId>, body: AstId) -> AstId {
        self.add(NodeKind::Function { name, params, body })
    }

    pub fn add_object(&mut self, properties: Vec<(&str, AstId)>) -> AstId {
        let properties = properties
            .into_iter()
            .map(|(key, value)| ObjectProperty {
                key: key.to_string(),
                value,
            })
            .collect();
        self.add(NodeKind::ObjectLiteral { properties })
    }

    // Statements

    pub fn add_program(&mut self, body: Vec<AstId>) -> AstId {
        self.add(NodeKind::Program { body })
    }

    pub fn add_block(&mut self, body: Vec<AstId>) -> AstId {
        self.add(NodeKind::Block { body })
    }

    pub fn add_expression_statement(&mut self, expression: AstId) -> AstId {
        self.add(NodeKind::ExpressionStatement { expression })
    }

    pub fn add_var(&mut self, name: AstId, init: Option<AstId>) -> AstId {
        self.add(NodeKind::VariableDeclaration { name, init })
    }

    pub fn add_return(&mut self, argument: Option<AstId>) -> AstId {
        self.add(NodeKind::Return { argument })
    }

    pub fn add_if(&mut self, test: AstId, consequent: AstId, alternate: Option<AstId>) -> AstId {
        self.add(NodeKind::If {
            test,
            consequent,
            alternate,
        })
    }

    pub fn add_while(&mut self, test: AstId, body: AstId) -> AstId {
        self.add(NodeKind::While { test, body })
    }

    pub fn add_for(
        &mut self,
        init: Option<AstId>,
        test: Option<AstId>,
        update: Option<AstId>,
        body: AstId,
    ) -> AstId {
        self.add(NodeKind::For {
            init,
            test,
            update,
            body,
        })
    }

    pub fn add_for_in(&mut self, binding: AstId, collection: AstId, body: AstId) -> AstId {
        self.add(NodeKind::ForIn {
            binding,
            collection,
            body,
        })
    }

    pub fn add_switch(&mut self, discriminant: AstId, cases: Vec<SwitchCase>) -> AstId {
        self.add(NodeKind::Switch {
            discriminant,
            cases,
        })
    }

    pub fn add_throw(&mut self, argument: AstId) -> AstId {
        self.add(NodeKind::Throw { argument })
    }

    pub fn add_try(
        &mut self,
        block: AstId,
        param: Option<AstId>,
        handler: Option<AstId>,
        finalizer: Option<AstId>,
    ) -> AstId {
        self.add(NodeKind::Try {
            block,
            param,
            handler,
            finalizer,
        })
    }
}

#[cfg(test)]
#[path = "../tests/arena_tests.rs"]
mod tests;
