use nova_hir::{AstBuilder, Member, Modifiers, NodeRef, TypeDecl};
use pretty_assertions::assert_eq;

#[test]
fn anonymous_body_is_enclosed_by_its_creation_site() {
    let mut b = AstBuilder::new();

    let hello = b.string("hello");
    let ret = b.ret(Some(hello));
    let to_string = b.method_decl(Modifiers::public(), "String", "toString", &[], Some(vec![ret]));
    let runnable = b.ty("Runnable");
    let anon = b.new_anonymous(runnable, Vec::new(), TypeDecl::anonymous().with_method(to_string));
    let local = b.local("Runnable", "r", Some(anon));
    let run = b.method_decl(Modifiers::default(), "void", "run", &[], Some(vec![local]));
    let outer = b.top_level(TypeDecl::class("Outer").with_member(Member::Method(run)));
    let ast = b.finish();

    assert_eq!(ast.types, vec![outer]);
    assert_eq!(ast.enclosing_decl(NodeRef::Expr(anon)), Some(outer));

    let nova_hir::Expr::New { body: Some(body), .. } = ast.expr(anon) else {
        panic!("expected anonymous class creation");
    };
    assert!(ast.decl(*body).is_anonymous());
    assert_eq!(ast.enclosing_decl(NodeRef::Expr(hello)), Some(*body));
    assert_eq!(ast.decl(outer).methods().count(), 1);
}
