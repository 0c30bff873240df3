//! Read-only traversal.
//!
//! Implementors override the `visit_*` hooks they care about and call the
//! matching `walk_*` function to continue into children.

use crate::arena::{ExprId, StmtId, TypeDeclId, TypeRefId};
use crate::ast::{Ast, NodeRef};

pub trait Visitor {
    fn visit_decl(&mut self, ast: &Ast, id: TypeDeclId) {
        walk(self, ast, NodeRef::Decl(id));
    }

    fn visit_stmt(&mut self, ast: &Ast, id: StmtId) {
        walk(self, ast, NodeRef::Stmt(id));
    }

    fn visit_expr(&mut self, ast: &Ast, id: ExprId) {
        walk(self, ast, NodeRef::Expr(id));
    }

    fn visit_type_ref(&mut self, ast: &Ast, id: TypeRefId) {
        walk(self, ast, NodeRef::TypeRef(id));
    }
}

/// Visits every child of `node` in source order.
pub fn walk<V: Visitor + ?Sized>(visitor: &mut V, ast: &Ast, node: NodeRef) {
    for child in ast.children(node) {
        visit(visitor, ast, child);
    }
}

pub fn visit<V: Visitor + ?Sized>(visitor: &mut V, ast: &Ast, node: NodeRef) {
    match node {
        NodeRef::Expr(id) => visitor.visit_expr(ast, id),
        NodeRef::Stmt(id) => visitor.visit_stmt(ast, id),
        NodeRef::TypeRef(id) => visitor.visit_type_ref(ast, id),
        NodeRef::Decl(id) => visitor.visit_decl(ast, id),
    }
}

/// Visits every top-level declaration of the unit.
pub fn walk_unit<V: Visitor + ?Sized>(visitor: &mut V, ast: &Ast) {
    for id in &ast.types {
        visitor.visit_decl(ast, *id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, Expr, Member, Modifiers, TypeDecl};
    use crate::builder::AstBuilder;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Names(Vec<String>);

    impl Visitor for Names {
        fn visit_expr(&mut self, ast: &Ast, id: ExprId) {
            if let Expr::Name(name) = ast.expr(id) {
                self.0.push(name.to_string());
            }
            walk(self, ast, NodeRef::Expr(id));
        }
    }

    #[test]
    fn visits_expressions_in_source_order() {
        let mut b = AstBuilder::new();
        let a = b.name("a");
        let c = b.name("c");
        let sum = b.binary(BinaryOp::Add, a, c);
        let ret = b.ret(Some(sum));
        let d = b.name("d");
        let field = b.field_decl(Modifiers::default(), "int", "x", Some(d));
        let method = b.method_decl(Modifiers::default(), "int", "f", &[], Some(vec![ret]));
        b.top_level(
            TypeDecl::class("A")
                .with_member(field)
                .with_member(Member::Method(method)),
        );
        let ast = b.finish();

        let mut names = Names::default();
        walk_unit(&mut names, &ast);
        assert_eq!(names.0, vec!["d", "a", "c"]);
    }
}
