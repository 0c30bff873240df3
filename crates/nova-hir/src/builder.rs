//! Programmatic construction of [`Ast`]s.
//!
//! Nodes are allocated bottom-up: children first, then the node that owns
//! them. Allocating a parent records it as the parent of its children.

use std::fmt;

use nova_core::{Name, PackageName, QualifiedName, Span};
use nova_types::{ClassKind, Primitive};

use crate::arena::{ExprId, StmtId, TypeDeclId, TypeRefId};
use crate::ast::{
    Ast, BinaryOp, Expr, FieldDecl, ImportDecl, LambdaBody, LambdaParam, LiteralKind, Member,
    MethodDecl, MethodRefTarget, Modifiers, Node, NodeRef, Param, Stmt, TypeDecl, TypeParam,
    TypeRef, UnaryOp, VarDeclarator, WildcardBound,
};

/// Error from [`AstBuilder::parse_type`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeTextError {
    pub text: String,
    pub offset: usize,
    pub message: &'static str,
}

impl fmt::Display for TypeTextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid type `{}` at offset {}: {}",
            self.text, self.offset, self.message
        )
    }
}

impl std::error::Error for TypeTextError {}

#[derive(Debug, Default)]
pub struct AstBuilder {
    ast: Ast,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> Ast {
        self.ast
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn package(&mut self, dotted: &str) -> &mut Self {
        self.ast.package = Some(PackageName::from_dotted(dotted));
        self
    }

    /// Adds an import written as in source, without `import` and `;`:
    /// `java.util.List`, `java.util.*`, `static java.lang.Math.max`.
    pub fn import(&mut self, text: &str) -> &mut Self {
        let text = text.trim();
        let (is_static, path) = match text.strip_prefix("static ") {
            Some(rest) => (true, rest.trim()),
            None => (false, text),
        };
        let (path, on_demand) = match path.strip_suffix(".*") {
            Some(prefix) => (prefix, true),
            None => (path, false),
        };
        let name = QualifiedName::from_dotted(path);
        let import = match (is_static, on_demand) {
            (false, false) => ImportDecl::Single(name),
            (false, true) => ImportDecl::OnDemand(name),
            (true, true) => ImportDecl::StaticOnDemand(name),
            (true, false) => {
                let member = name.last().cloned().unwrap_or_else(|| Name::new(""));
                ImportDecl::StaticSingle {
                    ty: name.parent().unwrap_or_default(),
                    member,
                }
            }
        };
        self.ast.imports.push(import);
        self
    }

    // Types

    pub fn type_ref(&mut self, kind: TypeRef) -> TypeRefId {
        let id = self.ast.type_refs.alloc(Node::new(kind, Span::default()));
        self.ast.link_children(NodeRef::TypeRef(id));
        id
    }

    /// Allocates the type written as `text`.
    ///
    /// # Panics
    ///
    /// Panics if `text` is not a well-formed type; see [`Self::parse_type`]
    /// for the fallible variant.
    pub fn ty(&mut self, text: &str) -> TypeRefId {
        self.parse_type(text).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Parses a Java type: `int`, `String[]`, `java.util.Map<K, ? super V>`,
    /// `List<>` (diamond), `var`, `void`.
    pub fn parse_type(&mut self, text: &str) -> Result<TypeRefId, TypeTextError> {
        let mut parser = TypeTextParser {
            text,
            pos: 0,
            builder: self,
        };
        let id = parser.parse_type()?;
        parser.skip_ws();
        if parser.pos != text.len() {
            return Err(parser.error("trailing input"));
        }
        Ok(id)
    }

    pub fn type_param(&mut self, name: &str, bounds: &[&str]) -> TypeParam {
        TypeParam {
            name: Name::from(name),
            bounds: bounds.iter().map(|b| self.ty(b)).collect(),
        }
    }

    // Expressions

    pub fn expr(&mut self, kind: Expr) -> ExprId {
        self.expr_at(kind, Span::default())
    }

    pub fn expr_at(&mut self, kind: Expr, span: Span) -> ExprId {
        let id = self.ast.exprs.alloc(Node::new(kind, span));
        self.ast.link_children(NodeRef::Expr(id));
        id
    }

    pub fn literal(&mut self, kind: LiteralKind, text: &str) -> ExprId {
        self.expr(Expr::Literal {
            kind,
            text: text.to_string(),
        })
    }

    pub fn int(&mut self, value: i32) -> ExprId {
        self.literal(LiteralKind::Int, &value.to_string())
    }

    pub fn long(&mut self, value: i64) -> ExprId {
        self.literal(LiteralKind::Long, &format!("{value}L"))
    }

    pub fn double(&mut self, value: f64) -> ExprId {
        self.literal(LiteralKind::Double, &format!("{value:?}"))
    }

    pub fn float(&mut self, value: f32) -> ExprId {
        self.literal(LiteralKind::Float, &format!("{value:?}f"))
    }

    pub fn char_lit(&mut self, value: char) -> ExprId {
        self.literal(LiteralKind::Char, &format!("'{value}'"))
    }

    pub fn string(&mut self, value: &str) -> ExprId {
        self.literal(LiteralKind::String, &format!("{value:?}"))
    }

    pub fn boolean(&mut self, value: bool) -> ExprId {
        self.literal(LiteralKind::Boolean, if value { "true" } else { "false" })
    }

    pub fn null(&mut self) -> ExprId {
        self.literal(LiteralKind::Null, "null")
    }

    pub fn name(&mut self, name: &str) -> ExprId {
        self.expr(Expr::Name(Name::from(name)))
    }

    /// A dotted name as a chain of field accesses (`a.b.c`).
    pub fn path(&mut self, dotted: &str) -> ExprId {
        let mut segments = dotted.split('.');
        let first = segments.next().unwrap_or_default();
        let mut expr = self.name(first);
        for segment in segments {
            expr = self.field(expr, segment);
        }
        expr
    }

    pub fn field(&mut self, receiver: ExprId, name: &str) -> ExprId {
        self.expr(Expr::FieldAccess {
            receiver,
            name: Name::from(name),
        })
    }

    pub fn call(&mut self, receiver: Option<ExprId>, name: &str, args: Vec<ExprId>) -> ExprId {
        self.expr(Expr::MethodCall {
            receiver,
            type_args: Vec::new(),
            name: Name::from(name),
            args,
        })
    }

    /// A call with explicit type arguments (`recv.<String>name(args)`).
    pub fn call_with_witness(
        &mut self,
        receiver: Option<ExprId>,
        type_args: Vec<TypeRefId>,
        name: &str,
        args: Vec<ExprId>,
    ) -> ExprId {
        self.expr(Expr::MethodCall {
            receiver,
            type_args,
            name: Name::from(name),
            args,
        })
    }

    pub fn new_object(&mut self, ty: TypeRefId, args: Vec<ExprId>) -> ExprId {
        self.expr(Expr::New {
            outer: None,
            ty,
            args,
            body: None,
        })
    }

    pub fn new_anonymous(&mut self, ty: TypeRefId, args: Vec<ExprId>, body: TypeDecl) -> ExprId {
        let body = self.decl(body);
        self.expr(Expr::New {
            outer: None,
            ty,
            args,
            body: Some(body),
        })
    }

    pub fn new_array(&mut self, element: TypeRefId, dims: Vec<ExprId>, extra_dims: u32) -> ExprId {
        self.expr(Expr::NewArray {
            element,
            dims,
            extra_dims,
            init: None,
        })
    }

    pub fn array_init(&mut self, elements: Vec<ExprId>) -> ExprId {
        self.expr(Expr::ArrayInit(elements))
    }

    pub fn index(&mut self, array: ExprId, index: ExprId) -> ExprId {
        self.expr(Expr::ArrayAccess { array, index })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        self.expr(Expr::Unary { op, operand })
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.expr(Expr::Binary { op, lhs, rhs })
    }

    pub fn assign(&mut self, target: ExprId, value: ExprId) -> ExprId {
        self.expr(Expr::Assign {
            op: None,
            target,
            value,
        })
    }

    pub fn compound_assign(&mut self, op: BinaryOp, target: ExprId, value: ExprId) -> ExprId {
        self.expr(Expr::Assign {
            op: Some(op),
            target,
            value,
        })
    }

    pub fn conditional(&mut self, condition: ExprId, then_expr: ExprId, else_expr: ExprId) -> ExprId {
        self.expr(Expr::Conditional {
            condition,
            then_expr,
            else_expr,
        })
    }

    pub fn cast(&mut self, ty: TypeRefId, expr: ExprId) -> ExprId {
        self.expr(Expr::Cast { ty, expr })
    }

    pub fn instance_of(&mut self, expr: ExprId, ty: TypeRefId) -> ExprId {
        self.expr(Expr::InstanceOf { expr, ty })
    }

    /// A lambda with implicitly typed parameters and an expression body.
    pub fn lambda(&mut self, params: &[&str], body: ExprId) -> ExprId {
        let params = params
            .iter()
            .map(|name| LambdaParam {
                name: Name::from(*name),
                ty: None,
            })
            .collect();
        self.expr(Expr::Lambda {
            params,
            body: LambdaBody::Expr(body),
        })
    }

    /// A lambda with explicitly typed parameters (`(int x) -> ...`).
    pub fn typed_lambda(&mut self, params: &[(&str, &str)], body: LambdaBody) -> ExprId {
        let params = params
            .iter()
            .map(|(ty, name)| LambdaParam {
                name: Name::from(*name),
                ty: Some(self.ty(ty)),
            })
            .collect();
        self.expr(Expr::Lambda { params, body })
    }

    pub fn block_lambda(&mut self, params: &[&str], body: StmtId) -> ExprId {
        let params = params
            .iter()
            .map(|name| LambdaParam {
                name: Name::from(*name),
                ty: None,
            })
            .collect();
        self.expr(Expr::Lambda {
            params,
            body: LambdaBody::Block(body),
        })
    }

    pub fn method_ref(&mut self, target: MethodRefTarget, name: &str) -> ExprId {
        self.expr(Expr::MethodRef {
            target,
            type_args: Vec::new(),
            name: Name::from(name),
        })
    }

    pub fn this(&mut self) -> ExprId {
        self.expr(Expr::This { qualifier: None })
    }

    pub fn qualified_this(&mut self, qualifier: &str) -> ExprId {
        self.expr(Expr::This {
            qualifier: Some(QualifiedName::from_dotted(qualifier)),
        })
    }

    pub fn super_expr(&mut self) -> ExprId {
        self.expr(Expr::Super)
    }

    pub fn class_literal(&mut self, ty: TypeRefId) -> ExprId {
        self.expr(Expr::ClassLiteral(ty))
    }

    // Statements

    pub fn stmt(&mut self, kind: Stmt) -> StmtId {
        self.stmt_at(kind, Span::default())
    }

    pub fn stmt_at(&mut self, kind: Stmt, span: Span) -> StmtId {
        let id = self.ast.stmts.alloc(Node::new(kind, span));
        self.ast.link_children(NodeRef::Stmt(id));
        id
    }

    pub fn block(&mut self, stmts: Vec<StmtId>) -> StmtId {
        self.stmt(Stmt::Block(stmts))
    }

    pub fn expr_stmt(&mut self, expr: ExprId) -> StmtId {
        self.stmt(Stmt::Expr(expr))
    }

    /// `ty name = init;`
    pub fn local(&mut self, ty: &str, name: &str, init: Option<ExprId>) -> StmtId {
        let ty = self.ty(ty);
        self.stmt(Stmt::LocalVar {
            ty,
            declarators: vec![VarDeclarator {
                name: Name::from(name),
                dims: 0,
                init,
            }],
        })
    }

    pub fn local_class(&mut self, decl: TypeDecl) -> StmtId {
        let decl = self.decl(decl);
        self.stmt(Stmt::LocalClass(decl))
    }

    pub fn ret(&mut self, expr: Option<ExprId>) -> StmtId {
        self.stmt(Stmt::Return(expr))
    }

    pub fn if_stmt(&mut self, condition: ExprId, then_branch: StmtId, else_branch: Option<StmtId>) -> StmtId {
        self.stmt(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    pub fn for_each(&mut self, ty: &str, name: &str, iterable: ExprId, body: StmtId) -> StmtId {
        let ty = self.ty(ty);
        self.stmt(Stmt::ForEach {
            ty,
            name: Name::from(name),
            iterable,
            body,
        })
    }

    // Declarations

    /// Allocates a declaration (and links its members) without adding it
    /// to the unit's top-level types.
    pub fn decl(&mut self, decl: TypeDecl) -> TypeDeclId {
        let id = self.ast.decls.alloc(decl);
        self.ast.link_children(NodeRef::Decl(id));
        id
    }

    /// Allocates a top-level declaration.
    pub fn top_level(&mut self, decl: TypeDecl) -> TypeDeclId {
        let id = self.decl(decl);
        self.ast.types.push(id);
        id
    }

    /// Allocates a member class of `outer`.
    pub fn nested(&mut self, outer: &mut TypeDecl, decl: TypeDecl) -> TypeDeclId {
        let id = self.decl(decl);
        outer.members.push(Member::Type(id));
        id
    }

    /// `ty name = init;` as a class member.
    pub fn field_decl(&mut self, modifiers: Modifiers, ty: &str, name: &str, init: Option<ExprId>) -> Member {
        Member::Field(FieldDecl {
            modifiers,
            ty: self.ty(ty),
            declarators: vec![VarDeclarator {
                name: Name::from(name),
                dims: 0,
                init,
            }],
        })
    }

    /// A method whose body is a block of `body`; `None` for abstract
    /// methods.
    pub fn method_decl(
        &mut self,
        modifiers: Modifiers,
        return_ty: &str,
        name: &str,
        params: &[(&str, &str)],
        body: Option<Vec<StmtId>>,
    ) -> MethodDecl {
        let return_ty = self.ty(return_ty);
        let params = self.params(params);
        let body = body.map(|stmts| self.block(stmts));
        MethodDecl {
            modifiers,
            type_params: Vec::new(),
            return_ty: Some(return_ty),
            name: Name::from(name),
            params,
            body,
        }
    }

    pub fn constructor_decl(
        &mut self,
        modifiers: Modifiers,
        name: &str,
        params: &[(&str, &str)],
        body: Vec<StmtId>,
    ) -> MethodDecl {
        let params = self.params(params);
        let body = self.block(body);
        MethodDecl {
            modifiers,
            type_params: Vec::new(),
            return_ty: None,
            name: Name::from(name),
            params,
            body: Some(body),
        }
    }

    /// Parameters written as `(type, name)`; a type ending in `...` makes
    /// the parameter varargs.
    pub fn params(&mut self, params: &[(&str, &str)]) -> Vec<Param> {
        params
            .iter()
            .map(|(ty, name)| {
                let (ty, is_varargs) = match ty.strip_suffix("...") {
                    Some(element) => (format!("{}[]", element.trim_end()), true),
                    None => (ty.to_string(), false),
                };
                Param {
                    name: Name::from(*name),
                    ty: self.ty(&ty),
                    is_varargs,
                }
            })
            .collect()
    }
}

impl TypeDecl {
    pub fn class(name: &str) -> Self {
        Self::new(name, ClassKind::Class)
    }

    pub fn interface(name: &str) -> Self {
        Self::new(name, ClassKind::Interface)
    }

    /// An anonymous class body.
    pub fn anonymous() -> Self {
        Self::new("", ClassKind::Class)
    }

    #[must_use]
    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    #[must_use]
    pub fn with_method(self, method: MethodDecl) -> Self {
        self.with_member(Member::Method(method))
    }
}

impl Modifiers {
    pub fn public() -> Self {
        Self {
            is_public: true,
            ..Self::default()
        }
    }

    pub fn static_() -> Self {
        Self {
            is_static: true,
            ..Self::default()
        }
    }

    pub fn abstract_() -> Self {
        Self {
            is_abstract: true,
            ..Self::default()
        }
    }
}

struct TypeTextParser<'a, 'b> {
    text: &'a str,
    pos: usize,
    builder: &'b mut AstBuilder,
}

impl TypeTextParser<'_, '_> {
    fn error(&self, message: &'static str) -> TypeTextError {
        TypeTextError {
            text: self.text.to_string(),
            offset: self.pos,
            message,
        }
    }

    fn rest(&self) -> &str {
        &self.text[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.text.len() - trimmed.len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        self.skip_ws();
        let matched = self.rest().strip_prefix(keyword).is_some_and(|after| {
            after.chars().next().map_or(true, |c| !is_ident_char(c))
        });
        if matched {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Result<&str, TypeTextError> {
        self.skip_ws();
        let start = self.pos;
        let len = self
            .rest()
            .char_indices()
            .find(|(_, c)| !is_ident_char(*c))
            .map_or(self.rest().len(), |(i, _)| i);
        if len == 0 {
            return Err(self.error("expected identifier"));
        }
        self.pos += len;
        Ok(&self.text[start..self.pos])
    }

    fn parse_type(&mut self) -> Result<TypeRefId, TypeTextError> {
        if self.eat("?") {
            let bound = if self.eat_keyword("extends") {
                WildcardBound::Extends(self.parse_type()?)
            } else if self.eat_keyword("super") {
                WildcardBound::Super(self.parse_type()?)
            } else {
                WildcardBound::Unbounded
            };
            return Ok(self.builder.type_ref(TypeRef::Wildcard(bound)));
        }

        let first = self.ident()?.to_string();
        let element = match first.as_str() {
            "void" => self.builder.type_ref(TypeRef::Void),
            "var" => self.builder.type_ref(TypeRef::Var),
            keyword => match Primitive::from_keyword(keyword) {
                Some(p) => self.builder.type_ref(TypeRef::Primitive(p)),
                None => {
                    let mut name = QualifiedName::from_dotted(&first);
                    while self.eat(".") {
                        let segment = self.ident()?;
                        name.push(Name::from(segment));
                    }
                    let args = if self.eat("<") {
                        let mut args = Vec::new();
                        if !self.eat(">") {
                            loop {
                                args.push(self.parse_type()?);
                                if self.eat(">") {
                                    break;
                                }
                                if !self.eat(",") {
                                    return Err(self.error("expected `,` or `>`"));
                                }
                            }
                        }
                        Some(args)
                    } else {
                        None
                    };
                    self.builder.type_ref(TypeRef::Named { name, args })
                }
            },
        };

        let mut dims = 0;
        while self.eat("[") {
            if !self.eat("]") {
                return Err(self.error("expected `]`"));
            }
            dims += 1;
        }
        if dims == 0 {
            return Ok(element);
        }
        Ok(self.builder.type_ref(TypeRef::Array { element, dims }))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn named(ast: &Ast, id: TypeRefId) -> (String, Option<usize>) {
        match ast.type_ref(id) {
            TypeRef::Named { name, args } => (name.to_dotted(), args.as_ref().map(Vec::len)),
            other => panic!("expected named type, got {other:?}"),
        }
    }

    #[test]
    fn parses_nested_generics_and_arrays() {
        let mut b = AstBuilder::new();
        let id = b.ty("java.util.Map<String, ? extends List<int[]>>[][]");
        let ast = b.finish();

        let TypeRef::Array { element, dims } = ast.type_ref(id).clone() else {
            panic!("expected array");
        };
        assert_eq!(dims, 2);
        assert_eq!(named(&ast, element), ("java.util.Map".to_string(), Some(2)));

        let TypeRef::Named { args: Some(args), .. } = ast.type_ref(element) else {
            panic!("expected arguments");
        };
        let TypeRef::Wildcard(WildcardBound::Extends(list)) = ast.type_ref(args[1]) else {
            panic!("expected bounded wildcard");
        };
        assert_eq!(named(&ast, *list), ("List".to_string(), Some(1)));
        assert_eq!(ast.parent(NodeRef::TypeRef(*list)), Some(NodeRef::TypeRef(args[1])));
    }

    #[test]
    fn diamond_and_keywords() {
        let mut b = AstBuilder::new();
        let diamond = b.ty("ArrayList<>");
        let var = b.ty("var");
        let int = b.ty("int");
        let ast = b.finish();
        assert_eq!(named(&ast, diamond), ("ArrayList".to_string(), Some(0)));
        assert_eq!(ast.type_ref(var), &TypeRef::Var);
        assert_eq!(ast.type_ref(int), &TypeRef::Primitive(Primitive::Int));
    }

    #[test]
    fn malformed_type_text_is_rejected() {
        let mut b = AstBuilder::new();
        let err = b.parse_type("List<String").unwrap_err();
        assert_eq!(err.message, "expected `,` or `>`");
        assert!(b.parse_type("int]").is_err());
    }

    #[test]
    fn parents_are_linked_bottom_up() {
        let mut b = AstBuilder::new();
        let a = b.name("a");
        let one = b.int(1);
        let sum = b.binary(BinaryOp::Add, a, one);
        let stmt = b.expr_stmt(sum);
        let body = b.block(vec![stmt]);
        let ast = b.finish();

        assert_eq!(ast.parent(NodeRef::Expr(a)), Some(NodeRef::Expr(sum)));
        assert_eq!(ast.parent(NodeRef::Expr(sum)), Some(NodeRef::Stmt(stmt)));
        assert_eq!(ast.parent(NodeRef::Stmt(stmt)), Some(NodeRef::Stmt(body)));
        assert_eq!(ast.parent(NodeRef::Stmt(body)), None);
    }

    #[test]
    fn imports_are_classified() {
        let mut b = AstBuilder::new();
        b.import("java.util.List")
            .import("java.util.*")
            .import("static java.lang.Math.max")
            .import("static java.util.Collections.*");
        let ast = b.finish();
        assert_eq!(
            ast.imports,
            vec![
                ImportDecl::Single(QualifiedName::from_dotted("java.util.List")),
                ImportDecl::OnDemand(QualifiedName::from_dotted("java.util")),
                ImportDecl::StaticSingle {
                    ty: QualifiedName::from_dotted("java.lang.Math"),
                    member: Name::from("max"),
                },
                ImportDecl::StaticOnDemand(QualifiedName::from_dotted("java.util.Collections")),
            ]
        );
    }

    #[test]
    fn varargs_parameters() {
        let mut b = AstBuilder::new();
        let method = b.method_decl(Modifiers::static_(), "void", "log", &[("String", "fmt"), ("Object...", "args")], Some(Vec::new()));
        let ast = b.ast();
        assert!(method.is_varargs());
        assert!(matches!(
            ast.type_ref(method.params[1].ty),
            TypeRef::Array { dims: 1, .. }
        ));
    }
}
