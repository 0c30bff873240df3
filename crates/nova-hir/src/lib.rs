//! Java syntax tree consumed by Nova's semantic analysis.
//!
//! Nodes live in per-unit arenas and are addressed by typed ids. Every
//! expression, statement and type node carries a slot for its resolved
//! [`nova_types::SymbolType`] and a link to its parent. Trees are produced
//! by a front end or assembled with [`AstBuilder`].

#![forbid(unsafe_code)]

mod arena;
mod ast;
mod builder;
mod render;
mod visit;

pub use crate::arena::{Arena, ArenaId, ExprId, StmtId, TypeDeclId, TypeRefId};
pub use crate::ast::{
    Ast, BinaryOp, CatchClause, EnumConstant, Expr, FieldDecl, ImportDecl, LambdaBody,
    LambdaParam, LiteralKind, Member, MethodDecl, MethodRefTarget, Modifiers, Node, NodeRef,
    Param, Stmt, SwitchCase, TypeDecl, TypeParam, TypeRef, UnaryOp, VarDeclarator,
    WildcardBound,
};
pub use crate::builder::{AstBuilder, TypeTextError};
pub use crate::render::{render_expr, render_stmt, render_type_ref};
pub use crate::visit::{visit, walk, walk_unit, Visitor};
