//! Node kinds of the syntax tree.
//!
//! Every node lives in the [`Ast`](crate::Ast) arena and is addressed by an
//! [`AstId`]. Child links are plain ids, never ownership.

use crate::ops::{BinaryOp, UnaryOp};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Stable handle of a syntax node, assigned when the tree is built or loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AstId(pub u32);

impl AstId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One `case`/`default` arm of a `switch`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    /// `None` for `default:`.
    pub test: Option<AstId>,
    pub body: Vec<AstId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectProperty {
    pub key: String,
    pub value: AstId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    // Statements
    Program {
        body: Vec<AstId>,
    },
    Block {
        body: Vec<AstId>,
    },
    ExpressionStatement {
        expression: AstId,
    },
    VariableDeclaration {
        name: AstId,
        init: Option<AstId>,
    },
    Return {
        argument: Option<AstId>,
    },
    If {
        test: AstId,
        consequent: AstId,
        alternate: Option<AstId>,
    },
    While {
        test: AstId,
        body: AstId,
    },
    DoWhile {
        body: AstId,
        test: AstId,
    },
    For {
        init: Option<AstId>,
        test: Option<AstId>,
        update: Option<AstId>,
        body: AstId,
    },
    ForIn {
        binding: AstId,
        collection: AstId,
        body: AstId,
    },
    Switch {
        discriminant: AstId,
        cases: Vec<SwitchCase>,
    },
    Throw {
        argument: AstId,
    },
    Try {
        block: AstId,
        param: Option<AstId>,
        handler: Option<AstId>,
        finalizer: Option<AstId>,
    },
    Break,
    Continue,
    Empty,

    // Expressions
    StringLiteral {
        value: String,
    },
    NumberLiteral {
        value: f64,
    },
    BooleanLiteral {
        value: bool,
    },
    NullLiteral,
    UndefinedLiteral,
    Identifier {
        name: String,
        /// The declaring identifier; a declaration points at itself.
        declaration: Option<AstId>,
    },
    This,
    Binary {
        op: BinaryOp,
        lhs: AstId,
        rhs: AstId,
    },
    Unary {
        op: UnaryOp,
        operand: AstId,
    },
    Conditional {
        test: AstId,
        consequent: AstId,
        alternate: AstId,
    },
    Comma {
        expressions: Vec<AstId>,
    },
    Member {
        object: AstId,
        property: String,
    },
    DynamicAccess {
        object: AstId,
        key: AstId,
    },
    Call {
        callee: AstId,
        args: Vec<AstId>,
    },
    MethodCall {
        /// Always a `Member` node.
        member: AstId,
        args: Vec<AstId>,
    },
    New {
        callee: AstId,
        args: Vec<AstId>,
    },
    Function {
        name: Option<AstId>,
        params: Vec<AstId>,
        body: AstId,
    },
    ObjectLiteral {
        properties: Vec<ObjectProperty>,
    },
}

impl NodeKind {
    /// Direct children in source order.
    pub fn children(&self) -> SmallVec<[AstId; 4]> {
        let mut out = SmallVec::new();
        match self {
            NodeKind::Program { body } | NodeKind::Block { body } => out.extend(body.iter().copied()),
            NodeKind::ExpressionStatement { expression } => out.push(*expression),
            NodeKind::VariableDeclaration { name, init } => {
                out.push(*name);
                out.extend(*init);
            }
            NodeKind::Return { argument } => out.extend(*argument),
            NodeKind::If {
                test,
                consequent,
                alternate,
            } => {
                out.push(*test);
                out.push(*consequent);
                out.extend(*alternate);
            }
            NodeKind::While { test, body } => {
                out.push(*test);
                out.push(*body);
            }
            NodeKind::DoWhile { body, test } => {
                out.push(*body);
                out.push(*test);
            }
            NodeKind::For {
                init,
                test,
                update,
                body,
            } => {
                out.extend(*init);
                out.extend(*test);
                out.extend(*update);
                out.push(*body);
            }
            NodeKind::ForIn {
                binding,
                collection,
                body,
            } => {
                out.push(*binding);
                out.push(*collection);
                out.push(*body);
            }
            NodeKind::Switch {
                discriminant,
                cases,
            } => {
                out.push(*discriminant);
                for case in cases {
                    out.extend(case.test);
                    out.extend(case.body.iter().copied());
                }
            }
            NodeKind::Throw { argument } => out.push(*argument),
            NodeKind::Try {
                block,
                param,
                handler,
                finalizer,
            } => {
                out.push(*block);
                out.extend(*param);
                out.extend(*handler);
                out.extend(*finalizer);
            }
            NodeKind::Binary { lhs, rhs, .. } => {
                out.push(*lhs);
                out.push(*rhs);
            }
            NodeKind::Unary { operand, .. } => out.push(*operand),
            NodeKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                out.push(*test);
                out.push(*consequent);
                out.push(*alternate);
            }
            NodeKind::Comma { expressions } => out.extend(expressions.iter().copied()),
            NodeKind::Member { object, .. } => out.push(*object),
            NodeKind::DynamicAccess { object, key } => {
                out.push(*object);
                out.push(*key);
            }
            NodeKind::Call { callee, args } | NodeKind::New { callee, args } => {
                out.push(*callee);
                out.extend(args.iter().copied());
            }
            NodeKind::MethodCall { member, args } => {
                out.push(*member);
                out.extend(args.iter().copied());
            }
            NodeKind::Function { name, params, body } => {
                out.extend(*name);
                out.extend(params.iter().copied());
                out.push(*body);
            }
            NodeKind::ObjectLiteral { properties } => {
                out.extend(properties.iter().map(|prop| prop.value));
            }
            NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Empty
            | NodeKind::StringLiteral { .. }
            | NodeKind::NumberLiteral { .. }
            | NodeKind::BooleanLiteral { .. }
            | NodeKind::NullLiteral
            | NodeKind::UndefinedLiteral
            | NodeKind::Identifier { .. }
            | NodeKind::This => {}
        }
        out
    }

    /// Short kind name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Program { .. } => "Program",
            NodeKind::Block { .. } => "Block",
            NodeKind::ExpressionStatement { .. } => "ExpressionStatement",
            NodeKind::VariableDeclaration { .. } => "VariableDeclaration",
            NodeKind::Return { .. } => "Return",
            NodeKind::If { .. } => "If",
            NodeKind::While { .. } => "While",
            NodeKind::DoWhile { .. } => "DoWhile",
            NodeKind::For { .. } => "For",
            NodeKind::ForIn { .. } => "ForIn",
            NodeKind::Switch { .. } => "Switch",
            NodeKind::Throw { .. } => "Throw",
            NodeKind::Try { .. } => "Try",
            NodeKind::Break => "Break",
            NodeKind::Continue => "Continue",
            NodeKind::Empty => "Empty",
            NodeKind::StringLiteral { .. } => "StringLiteral",
            NodeKind::NumberLiteral { .. } => "NumberLiteral",
            NodeKind::BooleanLiteral { .. } => "BooleanLiteral",
            NodeKind::NullLiteral => "NullLiteral",
            NodeKind::UndefinedLiteral => "UndefinedLiteral",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::This => "This",
            NodeKind::Binary { .. } => "Binary",
            NodeKind::Unary { .. } => "Unary",
            NodeKind::Conditional { .. } => "Conditional",
            NodeKind::Comma { .. } => "Comma",
            NodeKind::Member { .. } => "Member",
            NodeKind::DynamicAccess { .. } => "DynamicAccess",
            NodeKind::Call { .. } => "Call",
            NodeKind::MethodCall { .. } => "MethodCall",
            NodeKind::New { .. } => "New",
            NodeKind::Function { .. } => "Function",
            NodeKind::ObjectLiteral { .. } => "ObjectLiteral",
        }
    }

    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::Program { .. }
                | NodeKind::Block { .. }
                | NodeKind::ExpressionStatement { .. }
                | NodeKind::VariableDeclaration { .. }
                | NodeKind::Return { .. }
                | NodeKind::If { .. }
                | NodeKind::While { .. }
                | NodeKind::DoWhile { .. }
                | NodeKind::For { .. }
                | NodeKind::ForIn { .. }
                | NodeKind::Switch { .. }
                | NodeKind::Throw { .. }
                | NodeKind::Try { .. }
                | NodeKind::Break
                | NodeKind::Continue
                | NodeKind::Empty
        )
    }
}
