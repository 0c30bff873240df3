use nova_core::{Name, PackageName, QualifiedName, Span};
use nova_types::{ClassKind, Primitive, SymbolType};

use crate::arena::{Arena, ExprId, StmtId, TypeDeclId, TypeRefId};

/// Any node that can be a parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Expr(ExprId),
    Stmt(StmtId),
    TypeRef(TypeRefId),
    Decl(TypeDeclId),
}

/// A tree node with its source span, resolved-type slot and parent link.
#[derive(Clone, Debug, PartialEq)]
pub struct Node<T> {
    pub kind: T,
    pub span: Span,
    /// Written by analysis.
    pub ty: Option<SymbolType>,
    pub parent: Option<NodeRef>,
}

impl<T> Node<T> {
    pub fn new(kind: T, span: Span) -> Self {
        Self {
            kind,
            span,
            ty: None,
            parent: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WildcardBound {
    Unbounded,
    Extends(TypeRefId),
    Super(TypeRefId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeRef {
    Primitive(Primitive),
    Void,
    /// `var` in a local variable or lambda parameter.
    Var,
    /// A possibly qualified class name. `args` is `None` for raw or
    /// non-generic uses and `Some(vec![])` for the diamond `<>`.
    Named {
        name: QualifiedName,
        args: Option<Vec<TypeRefId>>,
    },
    Array {
        element: TypeRefId,
        dims: u32,
    },
    Wildcard(WildcardBound),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    Boolean,
    Null,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::PreInc | UnaryOp::PostInc => "++",
            UnaryOp::PreDec | UnaryOp::PostDec => "--",
        }
    }

    pub fn is_postfix(self) -> bool {
        matches!(self, UnaryOp::PostInc | UnaryOp::PostDec)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    UShr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem
        )
    }

    pub fn is_shift(self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr)
    }

    pub fn is_relational(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge | BinaryOp::Eq | BinaryOp::Ne
        )
    }

    pub fn is_bitwise(self) -> bool {
        matches!(self, BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LambdaParam {
    pub name: Name,
    /// `None` for implicitly typed parameters.
    pub ty: Option<TypeRefId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LambdaBody {
    Expr(ExprId),
    Block(StmtId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodRefTarget {
    /// `expr::name`, including names that later turn out to denote types.
    Expr(ExprId),
    /// `Type::name`, `Type::new`, `int[]::new`.
    Type(TypeRefId),
    /// `super::name`.
    Super,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Literal {
        kind: LiteralKind,
        text: String,
    },
    /// A bare identifier: a variable, a type or the first segment of a
    /// package name.
    Name(Name),
    FieldAccess {
        receiver: ExprId,
        name: Name,
    },
    MethodCall {
        receiver: Option<ExprId>,
        type_args: Vec<TypeRefId>,
        name: Name,
        args: Vec<ExprId>,
    },
    New {
        /// Qualifying instance for inner-class creation (`outer.new Inner()`).
        outer: Option<ExprId>,
        ty: TypeRefId,
        args: Vec<ExprId>,
        /// Body of an anonymous class.
        body: Option<TypeDeclId>,
    },
    NewArray {
        element: TypeRefId,
        dims: Vec<ExprId>,
        /// Trailing `[]` without a size.
        extra_dims: u32,
        init: Option<ExprId>,
    },
    ArrayInit(Vec<ExprId>),
    ArrayAccess {
        array: ExprId,
        index: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Assign {
        /// `Some` for compound assignments (`+=`).
        op: Option<BinaryOp>,
        target: ExprId,
        value: ExprId,
    },
    Conditional {
        condition: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
    },
    Cast {
        ty: TypeRefId,
        expr: ExprId,
    },
    InstanceOf {
        expr: ExprId,
        ty: TypeRefId,
    },
    Lambda {
        params: Vec<LambdaParam>,
        body: LambdaBody,
    },
    MethodRef {
        target: MethodRefTarget,
        type_args: Vec<TypeRefId>,
        /// `new` for constructor references.
        name: Name,
    },
    This {
        /// `Outer.this`
        qualifier: Option<QualifiedName>,
    },
    Super,
    ClassLiteral(TypeRefId),
}

impl Expr {
    /// Direct children in evaluation order.
    pub fn children(&self) -> Vec<NodeRef> {
        let mut out = Vec::new();
        let e = |out: &mut Vec<NodeRef>, id: ExprId| out.push(NodeRef::Expr(id));
        let t = |out: &mut Vec<NodeRef>, id: TypeRefId| out.push(NodeRef::TypeRef(id));
        match self {
            Expr::Literal { .. } | Expr::Name(_) | Expr::This { .. } | Expr::Super => {}
            Expr::FieldAccess { receiver, .. } => e(&mut out, *receiver),
            Expr::MethodCall {
                receiver,
                type_args,
                args,
                ..
            } => {
                if let Some(r) = receiver {
                    e(&mut out, *r);
                }
                type_args.iter().for_each(|id| t(&mut out, *id));
                args.iter().for_each(|id| e(&mut out, *id));
            }
            Expr::New {
                outer,
                ty,
                args,
                body,
            } => {
                if let Some(o) = outer {
                    e(&mut out, *o);
                }
                t(&mut out, *ty);
                args.iter().for_each(|id| e(&mut out, *id));
                if let Some(body) = body {
                    out.push(NodeRef::Decl(*body));
                }
            }
            Expr::NewArray {
                element, dims, init, ..
            } => {
                t(&mut out, *element);
                dims.iter().for_each(|id| e(&mut out, *id));
                if let Some(init) = init {
                    e(&mut out, *init);
                }
            }
            Expr::ArrayInit(elements) => elements.iter().for_each(|id| e(&mut out, *id)),
            Expr::ArrayAccess { array, index } => {
                e(&mut out, *array);
                e(&mut out, *index);
            }
            Expr::Unary { operand, .. } => e(&mut out, *operand),
            Expr::Binary { lhs, rhs, .. } => {
                e(&mut out, *lhs);
                e(&mut out, *rhs);
            }
            Expr::Assign { target, value, .. } => {
                e(&mut out, *target);
                e(&mut out, *value);
            }
            Expr::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                e(&mut out, *condition);
                e(&mut out, *then_expr);
                e(&mut out, *else_expr);
            }
            Expr::Cast { ty, expr } => {
                t(&mut out, *ty);
                e(&mut out, *expr);
            }
            Expr::InstanceOf { expr, ty } => {
                e(&mut out, *expr);
                t(&mut out, *ty);
            }
            Expr::Lambda { params, body } => {
                params
                    .iter()
                    .filter_map(|p| p.ty)
                    .for_each(|id| t(&mut out, id));
                match body {
                    LambdaBody::Expr(id) => e(&mut out, *id),
                    LambdaBody::Block(id) => out.push(NodeRef::Stmt(*id)),
                }
            }
            Expr::MethodRef {
                target, type_args, ..
            } => {
                match target {
                    MethodRefTarget::Expr(id) => e(&mut out, *id),
                    MethodRefTarget::Type(id) => t(&mut out, *id),
                    MethodRefTarget::Super => {}
                }
                type_args.iter().for_each(|id| t(&mut out, *id));
            }
            Expr::ClassLiteral(ty) => t(&mut out, *ty),
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VarDeclarator {
    pub name: Name,
    /// Extra `[]` after the name (`int a[]`).
    pub dims: u32,
    pub init: Option<ExprId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwitchCase {
    /// Empty for `default`.
    pub labels: Vec<ExprId>,
    pub body: Vec<StmtId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatchClause {
    /// More than one for multi-catch.
    pub types: Vec<TypeRefId>,
    pub name: Name,
    pub body: StmtId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stmt {
    Block(Vec<StmtId>),
    LocalVar {
        ty: TypeRefId,
        declarators: Vec<VarDeclarator>,
    },
    LocalClass(TypeDeclId),
    Expr(ExprId),
    If {
        condition: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    },
    While {
        condition: ExprId,
        body: StmtId,
    },
    DoWhile {
        body: StmtId,
        condition: ExprId,
    },
    For {
        init: Vec<StmtId>,
        condition: Option<ExprId>,
        update: Vec<ExprId>,
        body: StmtId,
    },
    ForEach {
        ty: TypeRefId,
        name: Name,
        iterable: ExprId,
        body: StmtId,
    },
    Switch {
        selector: ExprId,
        cases: Vec<SwitchCase>,
    },
    Return(Option<ExprId>),
    Break(Option<Name>),
    Continue(Option<Name>),
    Throw(ExprId),
    Try {
        /// Resource declarations (`try (var in = open())`).
        resources: Vec<StmtId>,
        body: StmtId,
        catches: Vec<CatchClause>,
        finally: Option<StmtId>,
    },
    Labeled {
        label: Name,
        body: StmtId,
    },
    Empty,
}

impl Stmt {
    pub fn children(&self) -> Vec<NodeRef> {
        let mut out = Vec::new();
        let s = |out: &mut Vec<NodeRef>, id: StmtId| out.push(NodeRef::Stmt(id));
        let e = |out: &mut Vec<NodeRef>, id: ExprId| out.push(NodeRef::Expr(id));
        match self {
            Stmt::Block(stmts) => stmts.iter().for_each(|id| s(&mut out, *id)),
            Stmt::LocalVar { ty, declarators } => {
                out.push(NodeRef::TypeRef(*ty));
                declarators
                    .iter()
                    .filter_map(|d| d.init)
                    .for_each(|id| e(&mut out, id));
            }
            Stmt::LocalClass(decl) => out.push(NodeRef::Decl(*decl)),
            Stmt::Expr(id) | Stmt::Throw(id) => e(&mut out, *id),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                e(&mut out, *condition);
                s(&mut out, *then_branch);
                if let Some(id) = else_branch {
                    s(&mut out, *id);
                }
            }
            Stmt::While { condition, body } => {
                e(&mut out, *condition);
                s(&mut out, *body);
            }
            Stmt::DoWhile { body, condition } => {
                s(&mut out, *body);
                e(&mut out, *condition);
            }
            Stmt::For {
                init,
                condition,
                update,
                body,
            } => {
                init.iter().for_each(|id| s(&mut out, *id));
                if let Some(id) = condition {
                    e(&mut out, *id);
                }
                update.iter().for_each(|id| e(&mut out, *id));
                s(&mut out, *body);
            }
            Stmt::ForEach {
                ty, iterable, body, ..
            } => {
                out.push(NodeRef::TypeRef(*ty));
                e(&mut out, *iterable);
                s(&mut out, *body);
            }
            Stmt::Switch { selector, cases } => {
                e(&mut out, *selector);
                for case in cases {
                    case.labels.iter().for_each(|id| e(&mut out, *id));
                    case.body.iter().for_each(|id| s(&mut out, *id));
                }
            }
            Stmt::Return(expr) => {
                if let Some(id) = expr {
                    e(&mut out, *id);
                }
            }
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty => {}
            Stmt::Try {
                resources,
                body,
                catches,
                finally,
            } => {
                resources.iter().for_each(|id| s(&mut out, *id));
                s(&mut out, *body);
                for catch in catches {
                    catch
                        .types
                        .iter()
                        .for_each(|id| out.push(NodeRef::TypeRef(*id)));
                    s(&mut out, catch.body);
                }
                if let Some(id) = finally {
                    s(&mut out, *id);
                }
            }
            Stmt::Labeled { body, .. } => s(&mut out, *body),
        }
        out
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub is_public: bool,
    pub is_private: bool,
    pub is_protected: bool,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub is_default: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParam {
    pub name: Name,
    pub bounds: Vec<TypeRefId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: Name,
    pub ty: TypeRefId,
    pub is_varargs: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDecl {
    pub modifiers: Modifiers,
    pub ty: TypeRefId,
    pub declarators: Vec<VarDeclarator>,
}

/// A method, or a constructor when `return_ty` is `None`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDecl {
    pub modifiers: Modifiers,
    pub type_params: Vec<TypeParam>,
    pub return_ty: Option<TypeRefId>,
    pub name: Name,
    pub params: Vec<Param>,
    pub body: Option<StmtId>,
}

impl MethodDecl {
    pub fn is_constructor(&self) -> bool {
        self.return_ty.is_none()
    }

    pub fn is_varargs(&self) -> bool {
        self.params.last().is_some_and(|p| p.is_varargs)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumConstant {
    pub name: Name,
    pub args: Vec<ExprId>,
    pub body: Option<TypeDeclId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
    Initializer { is_static: bool, body: StmtId },
    Type(TypeDeclId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeDecl {
    /// Empty for anonymous classes.
    pub name: Name,
    pub kind: ClassKind,
    pub modifiers: Modifiers,
    pub type_params: Vec<TypeParam>,
    pub extends: Option<TypeRefId>,
    /// `implements` for classes, `extends` for interfaces.
    pub implements: Vec<TypeRefId>,
    pub enum_constants: Vec<EnumConstant>,
    pub members: Vec<Member>,
    pub span: Span,
    pub parent: Option<NodeRef>,
    /// The declared class type, written by analysis.
    pub ty: Option<SymbolType>,
}

impl TypeDecl {
    pub fn new(name: impl Into<Name>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            modifiers: Modifiers::default(),
            type_params: Vec::new(),
            extends: None,
            implements: Vec::new(),
            enum_constants: Vec::new(),
            members: Vec::new(),
            span: Span::default(),
            parent: None,
            ty: None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.as_str().is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Field(f) => Some(f),
            _ => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(m) if !m.is_constructor() => Some(m),
            _ => None,
        })
    }

    pub fn constructors(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(m) if m.is_constructor() => Some(m),
            _ => None,
        })
    }

    pub fn nested_types(&self) -> impl Iterator<Item = TypeDeclId> + '_ {
        self.members.iter().filter_map(|m| match m {
            Member::Type(id) => Some(*id),
            _ => None,
        })
    }

    /// Children other than nested declarations' own contents.
    pub fn children(&self) -> Vec<NodeRef> {
        let mut out = Vec::new();
        let type_params = |out: &mut Vec<NodeRef>, params: &[TypeParam]| {
            for tp in params {
                out.extend(tp.bounds.iter().map(|id| NodeRef::TypeRef(*id)));
            }
        };
        type_params(&mut out, &self.type_params);
        out.extend(self.extends.iter().map(|id| NodeRef::TypeRef(*id)));
        out.extend(self.implements.iter().map(|id| NodeRef::TypeRef(*id)));
        for constant in &self.enum_constants {
            out.extend(constant.args.iter().map(|id| NodeRef::Expr(*id)));
            out.extend(constant.body.iter().map(|id| NodeRef::Decl(*id)));
        }
        for member in &self.members {
            match member {
                Member::Field(field) => {
                    out.push(NodeRef::TypeRef(field.ty));
                    out.extend(
                        field
                            .declarators
                            .iter()
                            .filter_map(|d| d.init)
                            .map(NodeRef::Expr),
                    );
                }
                Member::Method(method) => {
                    type_params(&mut out, &method.type_params);
                    out.extend(method.return_ty.iter().map(|id| NodeRef::TypeRef(*id)));
                    out.extend(method.params.iter().map(|p| NodeRef::TypeRef(p.ty)));
                    out.extend(method.body.iter().map(|id| NodeRef::Stmt(*id)));
                }
                Member::Initializer { body, .. } => out.push(NodeRef::Stmt(*body)),
                Member::Type(id) => out.push(NodeRef::Decl(*id)),
            }
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportDecl {
    /// `import a.b.C;`
    Single(QualifiedName),
    /// `import a.b.*;`
    OnDemand(QualifiedName),
    /// `import static a.b.C.member;`
    StaticSingle { ty: QualifiedName, member: Name },
    /// `import static a.b.C.*;`
    StaticOnDemand(QualifiedName),
}

/// A compilation unit and the arenas holding all of its nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ast {
    pub package: Option<PackageName>,
    pub imports: Vec<ImportDecl>,
    /// Top-level declarations in source order.
    pub types: Vec<TypeDeclId>,
    pub exprs: Arena<ExprId, Node<Expr>>,
    pub stmts: Arena<StmtId, Node<Stmt>>,
    pub type_refs: Arena<TypeRefId, Node<TypeRef>>,
    pub decls: Arena<TypeDeclId, TypeDecl>,
}

impl Ast {
    pub fn package_name(&self) -> PackageName {
        self.package.clone().unwrap_or_default()
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id].kind
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id].kind
    }

    pub fn type_ref(&self, id: TypeRefId) -> &TypeRef {
        &self.type_refs[id].kind
    }

    pub fn decl(&self, id: TypeDeclId) -> &TypeDecl {
        &self.decls[id]
    }

    pub fn expr_ty(&self, id: ExprId) -> Option<&SymbolType> {
        self.exprs[id].ty.as_ref()
    }

    pub fn stmt_ty(&self, id: StmtId) -> Option<&SymbolType> {
        self.stmts[id].ty.as_ref()
    }

    pub fn type_ref_ty(&self, id: TypeRefId) -> Option<&SymbolType> {
        self.type_refs[id].ty.as_ref()
    }

    pub fn set_expr_ty(&mut self, id: ExprId, ty: SymbolType) {
        self.exprs[id].ty = Some(ty);
    }

    pub fn set_stmt_ty(&mut self, id: StmtId, ty: SymbolType) {
        self.stmts[id].ty = Some(ty);
    }

    pub fn set_type_ref_ty(&mut self, id: TypeRefId, ty: SymbolType) {
        self.type_refs[id].ty = Some(ty);
    }

    pub fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        match node {
            NodeRef::Expr(id) => self.exprs[id].parent,
            NodeRef::Stmt(id) => self.stmts[id].parent,
            NodeRef::TypeRef(id) => self.type_refs[id].parent,
            NodeRef::Decl(id) => self.decls[id].parent,
        }
    }

    pub fn children(&self, node: NodeRef) -> Vec<NodeRef> {
        match node {
            NodeRef::Expr(id) => self.expr(id).children(),
            NodeRef::Stmt(id) => self.stmt(id).children(),
            NodeRef::TypeRef(id) => match self.type_ref(id) {
                TypeRef::Named { args, .. } => args
                    .iter()
                    .flatten()
                    .map(|id| NodeRef::TypeRef(*id))
                    .collect(),
                TypeRef::Array { element, .. } => vec![NodeRef::TypeRef(*element)],
                TypeRef::Wildcard(WildcardBound::Extends(id) | WildcardBound::Super(id)) => {
                    vec![NodeRef::TypeRef(*id)]
                }
                _ => Vec::new(),
            },
            NodeRef::Decl(id) => self.decl(id).children(),
        }
    }

    /// The innermost type declaration enclosing `node`.
    pub fn enclosing_decl(&self, node: NodeRef) -> Option<TypeDeclId> {
        let mut current = self.parent(node);
        while let Some(node) = current {
            if let NodeRef::Decl(id) = node {
                return Some(id);
            }
            current = self.parent(node);
        }
        None
    }

    /// Records `parent` as the parent of each of its children.
    pub fn link_children(&mut self, parent: NodeRef) {
        for child in self.children(parent) {
            match child {
                NodeRef::Expr(id) => self.exprs[id].parent = Some(parent),
                NodeRef::Stmt(id) => self.stmts[id].parent = Some(parent),
                NodeRef::TypeRef(id) => self.type_refs[id].parent = Some(parent),
                NodeRef::Decl(id) => self.decls[id].parent = Some(parent),
            }
        }
    }
}
