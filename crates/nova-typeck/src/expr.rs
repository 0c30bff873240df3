//! Expression typing.
//!
//! Every visited expression gets its type recorded in the tree. A bare
//! name is tried as a variable in scope, then as a type, then as a field
//! visible through `this` or a static import, and finally as a package
//! prefix when it qualifies something else.

use nova_core::Name;
use nova_hir::{BinaryOp, Expr, ExprId, LiteralKind, NodeRef, TypeDeclId, TypeRef, TypeRefId, UnaryOp};
use nova_resolve::{load_canonical, RefKind, ResolveError};
use nova_types::{
    constructors_of, find_field, function_type, methods_named, ClassDef, ClassKind, MemberRef,
    MethodCandidate, Nesting, Primitive, SymbolType, TypeEnv,
};

use crate::context::AnalysisContext;
use crate::error::Result;
use crate::overload::{self, Applicable, Arg, CallSite};

const CLASS: &str = "java.lang.Class";
const VOID: &str = "java.lang.Void";

/// What a name in qualifier position denotes.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Resolved {
    Value(SymbolType),
    /// Dotted package prefix; the expression keeps no type.
    Package(String),
}

impl AnalysisContext<'_> {
    /// Types `id`, records the result and returns it. `expected` is the
    /// type the context asks for, used to type lambdas, method references,
    /// array initializers and diamond instantiations.
    pub(crate) fn check_expr(&mut self, id: ExprId, expected: Option<&SymbolType>) -> Result<SymbolType> {
        let ty = self.type_of(id, expected)?;
        self.ast.set_expr_ty(id, ty.clone());
        Ok(ty)
    }

    fn type_of(&mut self, id: ExprId, expected: Option<&SymbolType>) -> Result<SymbolType> {
        match self.ast.expr(id).clone() {
            Expr::Literal { kind, .. } => Ok(literal_type(kind)),
            Expr::Name(name) => match self.resolve_name(id, &name, false)? {
                Resolved::Value(ty) => Ok(ty),
                Resolved::Package(package) => Err(self.expr_error(id, ResolveError::symbol(package))),
            },
            Expr::FieldAccess { receiver, name } => match self.resolve_field_access(id, receiver, &name, false)? {
                Resolved::Value(ty) => Ok(ty),
                Resolved::Package(package) => Err(self.expr_error(id, ResolveError::class_not_found(package))),
            },
            Expr::MethodCall {
                receiver,
                type_args,
                name,
                args,
            } => self.check_call(id, receiver, &type_args, name.as_str(), &args),
            Expr::New { outer, ty, args, body } => self.check_new(id, outer, ty, &args, body, expected),
            Expr::NewArray {
                element,
                dims,
                extra_dims,
                init,
            } => {
                let element = self.resolve_type_ref(element)?;
                for dim in &dims {
                    self.check_expr(*dim, Some(&SymbolType::int()))?;
                }
                let depth = u32::try_from(dims.len()).unwrap_or(u32::MAX).saturating_add(extra_dims);
                let ty = element.array_of(depth);
                if let Some(init) = init {
                    self.check_expr(init, Some(&ty))?;
                }
                Ok(ty)
            }
            Expr::ArrayInit(elements) => self.check_array_init(&elements, expected),
            Expr::ArrayAccess { array, index } => {
                let array_ty = self.check_expr(array, None)?;
                let index_ty = self.check_expr(index, Some(&SymbolType::int()))?;
                array_ty.component_type().ok_or_else(|| {
                    self.expr_error(id, ResolveError::overload("operator", "[]", &[array_ty.clone(), index_ty]))
                })
            }
            Expr::Unary { op, operand } => self.check_unary(id, op, operand),
            Expr::Binary { op, lhs, rhs } => {
                let left = self.check_expr(lhs, None)?;
                let right = self.check_expr(rhs, None)?;
                binary_type(op, &left, &right)
                    .ok_or_else(|| self.expr_error(id, ResolveError::overload("operator", op.symbol(), &[left, right])))
            }
            Expr::Assign { op, target, value } => self.check_assign(id, op, target, value),
            Expr::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                self.check_expr(condition, Some(&SymbolType::boolean()))?;
                let then_ty = self.check_expr(then_expr, expected)?;
                let else_ty = self.check_expr(else_expr, expected)?;
                Ok(then_ty.merge(&else_ty, &self.env))
            }
            Expr::Cast { ty, expr } => {
                let target = self.resolve_type_ref(ty)?;
                let functional = matches!(self.ast.expr(expr), Expr::Lambda { .. } | Expr::MethodRef { .. });
                self.check_expr(expr, functional.then_some(&target))?;
                Ok(target)
            }
            Expr::InstanceOf { expr, ty } => {
                self.check_expr(expr, None)?;
                self.resolve_type_ref(ty)?;
                Ok(SymbolType::boolean())
            }
            Expr::Lambda { .. } | Expr::MethodRef { .. } => match expected {
                Some(target) => Ok(self.check_functional(id, target)?.interface),
                None => {
                    let what = if matches!(self.ast.expr(id), Expr::Lambda { .. }) {
                        "lambda"
                    } else {
                        "method reference"
                    };
                    Err(self.expr_error(id, ResolveError::overload(what, "<no target type>", &[])))
                }
            },
            Expr::This { qualifier: None } => self.current_class_type().map_err(|err| self.expr_error(id, err)),
            Expr::This { qualifier: Some(qualifier) } => {
                let outer = self
                    .resolve_type_name(&qualifier)
                    .ok_or_else(|| self.expr_error(id, ResolveError::class_not_found(qualifier.to_dotted())))?;
                if !self.table.enclosing_classes().contains(&outer.name()) {
                    return Err(self.expr_error(id, ResolveError::symbol(format!("{qualifier}.this"))));
                }
                let def = self.class_def(outer.name()).map_err(|err| self.expr_error(id, err))?;
                Ok(def.as_type())
            }
            Expr::Super => self.current_super_type().map_err(|err| self.expr_error(id, err)),
            Expr::ClassLiteral(ty) => {
                let ty = self.resolve_type_ref(ty)?;
                let arg = if ty.is_void() {
                    SymbolType::class(VOID)
                } else {
                    ty.boxed()
                };
                Ok(SymbolType::parameterized(CLASS, vec![arg]))
            }
        }
    }

    // Names

    /// Resolves the qualifier of a field access or method call, which may
    /// also name a type or a package.
    fn check_qualifier(&mut self, id: ExprId) -> Result<Resolved> {
        let resolved = match self.ast.expr(id).clone() {
            Expr::Name(name) => self.resolve_name(id, &name, true)?,
            Expr::FieldAccess { receiver, name } => self.resolve_field_access(id, receiver, &name, true)?,
            _ => return self.check_expr(id, None).map(Resolved::Value),
        };
        if let Resolved::Value(ty) = &resolved {
            self.ast.set_expr_ty(id, ty.clone());
        }
        Ok(resolved)
    }

    fn resolve_name(&mut self, id: ExprId, name: &Name, qualifier: bool) -> Result<Resolved> {
        let simple = name.as_str();
        for kind in [RefKind::Variable, RefKind::EnumLiteral] {
            let found = self
                .table
                .lookup_for_read(simple, kind)
                .map_err(|err| self.expr_error(id, err))?;
            if let Some(symbol) = found {
                return Ok(Resolved::Value(symbol.ty().clone()));
            }
        }

        if let Some(ty) = self.resolve_simple_type(simple) {
            self.type_exprs.insert(id);
            return Ok(Resolved::Value(ty));
        }

        if self.config.resolve_implicit_this {
            if let Some(ty) = self.implicit_this_field(id, simple)? {
                return Ok(Resolved::Value(ty));
            }
        }

        for owner in self.catalog.static_import_owners(simple) {
            let field = find_field(&self.env, &SymbolType::class(owner), simple).filter(|f| f.def.is_static);
            if let Some(field) = field {
                return Ok(Resolved::Value(field.def.ty.read_type().with_member(field.member)));
            }
        }
        if qualifier {
            return Ok(Resolved::Package(simple.to_string()));
        }
        Err(self.expr_error(id, ResolveError::symbol(simple)))
    }

    /// A field inherited by one of the enclosing classes, innermost first.
    fn implicit_this_field(&self, id: ExprId, simple: &str) -> Result<Option<SymbolType>> {
        for owner in self.table.enclosing_classes() {
            let receiver = self.class_def(owner).map_err(|err| self.expr_error(id, err))?.as_type();
            if let Some(field) = find_field(&self.env, &receiver, simple) {
                return Ok(Some(field.def.ty.read_type().with_member(field.member)));
            }
        }
        Ok(None)
    }

    fn resolve_field_access(&mut self, id: ExprId, receiver: ExprId, name: &Name, qualifier: bool) -> Result<Resolved> {
        let name = name.as_str();
        let receiver_ty = match self.check_qualifier(receiver)? {
            Resolved::Package(package) => {
                let dotted = format!("{package}.{name}");
                if let Some(binary) = load_canonical(&self.env, &dotted) {
                    self.type_exprs.insert(id);
                    return Ok(Resolved::Value(SymbolType::class(binary)));
                }
                if qualifier {
                    return Ok(Resolved::Package(dotted));
                }
                return Err(self.expr_error(id, ResolveError::class_not_found(dotted)));
            }
            Resolved::Value(ty) => ty,
        };

        if self.type_exprs.contains(&receiver) {
            let field = find_field(&self.env, &receiver_ty, name).filter(|f| f.def.is_static);
            if let Some(field) = field {
                return Ok(Resolved::Value(field.def.ty.read_type().with_member(field.member)));
            }
            if let Some(member) = self.catalog.member_class(&self.env, receiver_ty.name(), name) {
                self.type_exprs.insert(id);
                return Ok(Resolved::Value(SymbolType::class(member)));
            }
            return Err(self.expr_error(id, ResolveError::symbol(name)));
        }

        if receiver_ty.is_array() && name == "length" {
            return Ok(Resolved::Value(SymbolType::int()));
        }
        match find_field(&self.env, &receiver_ty, name) {
            Some(field) => Ok(Resolved::Value(field.def.ty.read_type().with_member(field.member))),
            None => Err(self.expr_error(id, ResolveError::symbol(name))),
        }
    }

    // Invocations

    fn check_call(
        &mut self,
        id: ExprId,
        receiver: Option<ExprId>,
        type_args: &[TypeRefId],
        name: &str,
        args: &[ExprId],
    ) -> Result<SymbolType> {
        let witnesses = type_args
            .iter()
            .map(|t| self.resolve_type_ref(*t))
            .collect::<Result<Vec<_>>>()?;

        let candidates = match receiver {
            None => self.unqualified_methods(id, name)?,
            Some(receiver) => {
                let receiver_ty = match self.check_qualifier(receiver)? {
                    Resolved::Value(ty) => ty,
                    Resolved::Package(package) => {
                        return Err(self.expr_error(id, ResolveError::class_not_found(package)));
                    }
                };
                if receiver_ty.is_primitive() || receiver_ty.is_void() || receiver_ty.is_null() {
                    return Err(self.expr_error(id, ResolveError::symbol(name)));
                }
                if receiver_ty.is_array() && name == "clone" && args.is_empty() {
                    return Ok(receiver_ty);
                }
                let found = methods_named(&self.env, &receiver_ty, name);
                if self.type_exprs.contains(&receiver) {
                    found.into_iter().filter(|c| c.def.is_static).collect()
                } else {
                    found
                }
            }
        };

        let classified = self.classify_args(args)?;
        let site = CallSite {
            name,
            args: &classified,
            witnesses: &witnesses,
            extra_vars: &[],
            max_depth: self.config.max_inference_depth,
        };
        let ranked = overload::ranked(&self.env, &site, candidates);
        let Some(app) = self.complete_best(args, ranked)? else {
            let shown: Vec<SymbolType> = classified.iter().map(Arg::display_type).collect();
            return Err(self.expr_error(id, ResolveError::overload("method", name, &shown)));
        };
        self.record_call(NodeRef::Expr(id), &app.candidate)?;
        Ok(app.return_type())
    }

    /// Methods visible without a receiver: members of the innermost
    /// enclosing class declaring the name, then static imports.
    fn unqualified_methods(&self, id: ExprId, name: &str) -> Result<Vec<MethodCandidate>> {
        for owner in self.table.enclosing_classes() {
            let receiver = self.class_def(owner).map_err(|err| self.expr_error(id, err))?.as_type();
            let found = methods_named(&self.env, &receiver, name);
            if !found.is_empty() {
                return Ok(found);
            }
        }
        let mut out = Vec::new();
        for owner in self.catalog.static_import_owners(name) {
            out.extend(
                methods_named(&self.env, &SymbolType::class(owner), name)
                    .into_iter()
                    .filter(|c| c.def.is_static),
            );
        }
        Ok(out)
    }

    /// Types the arguments that do not need a target type; lambdas and
    /// method references wait for the chosen candidate.
    pub(crate) fn classify_args(&mut self, args: &[ExprId]) -> Result<Vec<Arg>> {
        let mut out = Vec::with_capacity(args.len());
        for arg in args {
            let classified = match self.ast.expr(*arg).clone() {
                Expr::Lambda { params, body } => Arg::Lambda(self.lambda_shape(&params, body)?),
                Expr::MethodRef { .. } => Arg::MethodRef(self.method_ref_shape(*arg)?),
                _ => Arg::Typed(self.check_expr(*arg, None)?),
            };
            out.push(classified);
        }
        Ok(out)
    }

    /// Types the lambda and method reference arguments against the
    /// parameters of the chosen candidate. What their bodies produce feeds
    /// back into inference before the return type is read.
    pub(crate) fn complete_call(&mut self, args: &[ExprId], app: &mut Applicable) -> Result<()> {
        let formals = app.formals.clone();
        for (arg, formal) in args.iter().zip(&formals) {
            if !matches!(self.ast.expr(*arg), Expr::Lambda { .. } | Expr::MethodRef { .. }) {
                continue;
            }
            let target = app.inference.apply(formal, false);
            let outcome = self.check_functional(*arg, &target)?;
            if let Some(body) = &outcome.body {
                app.inference.unify(&self.env, &outcome.sam_return, &body.boxed());
            }
            let settled = app.inference.apply(formal, true);
            if let Some(ft) = function_type(&self.env, &settled) {
                self.ast.set_expr_ty(*arg, ft.interface);
            }
        }
        Ok(())
    }

    /// Completes the first of the `ranked` candidates whose lambda and
    /// method reference arguments type-check against it.
    ///
    /// A candidate rejected by a functional argument leaves no scopes or
    /// call counts behind. When every candidate is rejected, the error of
    /// the best one is returned.
    pub(crate) fn complete_best(&mut self, args: &[ExprId], ranked: Vec<Applicable>) -> Result<Option<Applicable>> {
        let mut rejected = None;
        for mut app in ranked {
            let (depth, calls) = (self.table.depth(), self.resolved_calls);
            match self.complete_call(args, &mut app) {
                Ok(()) => {
                    if rejected.is_some() {
                        tracing::debug!(
                            target: "nova.typeck",
                            name = %app.candidate.def.name,
                            owner = app.candidate.owner(),
                            "fell back to a lower-ranked overload"
                        );
                    }
                    return Ok(Some(app));
                }
                Err(err) if err.is_overload_failure() => {
                    tracing::trace!(target: "nova.typeck", error = %err, "functional argument rejected overload");
                    self.unwind_scopes(depth)?;
                    self.resolved_calls = calls;
                    rejected.get_or_insert(err);
                }
                Err(err) => return Err(err),
            }
        }
        match rejected {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }

    /// Counts a resolved invocation and reports a read of the matching
    /// method symbol when the callee is declared in an enclosing scope.
    pub(crate) fn record_call(&mut self, node: NodeRef, candidate: &MethodCandidate) -> Result<()> {
        self.resolved_calls += 1;
        let declared = match &candidate.member {
            MemberRef::Method { owner, index } => self
                .env
                .class(owner)
                .ok()
                .and_then(|def| def.methods.get(*index).cloned()),
            MemberRef::Constructor { owner, index } => self
                .env
                .class(owner)
                .ok()
                .and_then(|def| def.constructors.get(*index).cloned()),
            MemberRef::Field { .. } => None,
        };
        if let Some(def) = declared {
            self.table
                .lookup_method_for_read(&def.name, &def.params)
                .map_err(|err| self.node_error(node, err))?;
        }
        Ok(())
    }

    // Instance creation

    fn check_new(
        &mut self,
        id: ExprId,
        outer: Option<ExprId>,
        ty: TypeRefId,
        args: &[ExprId],
        body: Option<TypeDeclId>,
        expected: Option<&SymbolType>,
    ) -> Result<SymbolType> {
        let (class_ty, diamond) = self.instantiated_type(id, outer, ty)?;
        let def = self.class_def(class_ty.name()).map_err(|err| self.expr_error(id, err))?;
        if body.is_none() && def.is_abstract {
            return Err(self.expr_error(id, ResolveError::overload("constructor", class_ty.to_string(), &[])));
        }

        let classified = self.classify_args(args)?;
        let generic = def.as_type();
        let (candidates, extra_vars) = if body.is_some() && def.is_interface() {
            (constructors_of(&self.env, &SymbolType::object()), Vec::new())
        } else if diamond {
            (constructors_of(&self.env, &generic), def.type_params.clone())
        } else {
            (constructors_of(&self.env, &class_ty), Vec::new())
        };
        let site = CallSite {
            name: "<init>",
            args: &classified,
            witnesses: &[],
            extra_vars: &extra_vars,
            max_depth: self.config.max_inference_depth,
        };
        let mut ranked = overload::ranked(&self.env, &site, candidates);
        if diamond {
            if let Some(expected) = expected {
                for app in &mut ranked {
                    app.inference.unify_target(&self.env, &generic, expected);
                }
            }
        }
        let Some(app) = self.complete_best(args, ranked)? else {
            let shown: Vec<SymbolType> = classified.iter().map(Arg::display_type).collect();
            return Err(self.expr_error(id, ResolveError::overload("constructor", class_ty.name(), &shown)));
        };
        self.record_call(NodeRef::Expr(id), &app.candidate)?;

        let created = if diamond {
            let inferred = app.inference.apply(&generic, true);
            self.ast.set_type_ref_ty(ty, inferred.clone());
            inferred
        } else {
            class_ty
        };
        match body {
            Some(body) => self.check_anonymous(NodeRef::Expr(id), body, &created),
            None => Ok(created),
        }
    }

    /// The class named by `new`, and whether it uses the diamond.
    fn instantiated_type(&mut self, id: ExprId, outer: Option<ExprId>, ty: TypeRefId) -> Result<(SymbolType, bool)> {
        let TypeRef::Named { name, args } = self.ast.type_ref(ty).clone() else {
            return Err(self.type_error(ty, ResolveError::class_not_found(nova_hir::render_type_ref(&*self.ast, ty))));
        };
        let diamond = args.as_ref().is_some_and(Vec::is_empty);

        let base = match outer {
            Some(outer) => {
                let outer_ty = self.check_expr(outer, None)?;
                let simple = name.last().map(Name::as_str).unwrap_or_default();
                let binary = self
                    .catalog
                    .member_class(&self.env, outer_ty.name(), simple)
                    .ok_or_else(|| self.expr_error(id, ResolveError::class_not_found(format!("{}.{simple}", outer_ty.name()))))?;
                SymbolType::class(binary)
            }
            None => self
                .resolve_type_name(&name)
                .ok_or_else(|| self.type_error(ty, ResolveError::class_not_found(name.to_dotted())))?,
        };

        let resolved = match args {
            Some(args) if !args.is_empty() => {
                let args = args
                    .iter()
                    .map(|arg| self.resolve_type_ref(*arg))
                    .collect::<Result<Vec<_>>>()?;
                base.with_type_args(Some(args))
            }
            _ => base,
        };
        self.ast.set_type_ref_ty(ty, resolved.clone());
        Ok((resolved, diamond))
    }

    /// Declares and checks the body of an anonymous class extending or
    /// implementing `base`.
    pub(crate) fn check_anonymous(&mut self, node: NodeRef, body: TypeDeclId, base: &SymbolType) -> Result<SymbolType> {
        let enclosing = self
            .table
            .innermost_class()
            .map(str::to_string)
            .ok_or_else(|| self.node_error(node, ResolveError::UnbalancedScope("no enclosing class")))?;
        let binary = self.catalog.register_local_class(body, &enclosing, None);
        self.catalog.register_nested_types(&*self.ast, body);
        tracing::debug!(target: "nova.typeck", class = %binary, base = %base, "declaring anonymous class");

        let base_def = self.class_def(base.name()).map_err(|err| self.node_error(node, err))?;
        let mut header = ClassDef::new(binary.as_str(), ClassKind::Class);
        header.nesting = Nesting::Anonymous;
        header.enclosing = Some(enclosing);
        if base_def.is_interface() {
            header.interfaces = vec![base.clone()];
        } else {
            header.super_class = Some(base.clone());
        }
        header.member_classes = self
            .ast
            .decl(body)
            .nested_types()
            .filter_map(|nested| self.catalog.binary_name_of(nested).map(str::to_string))
            .collect();
        self.ast.decls[body].ty = Some(header.as_type());

        self.declare_nested_headers(body, header)?;
        self.declare_members(body)?;
        self.check_decl(body)?;
        Ok(SymbolType::class(binary))
    }

    // Operators

    fn check_array_init(&mut self, elements: &[ExprId], expected: Option<&SymbolType>) -> Result<SymbolType> {
        if let Some(array) = expected.filter(|t| t.is_array()) {
            let component = array.component_type();
            for element in elements {
                self.check_expr(*element, component.as_ref())?;
            }
            return Ok(array.clone());
        }
        let mut merged: Option<SymbolType> = None;
        for element in elements {
            let ty = self.check_expr(*element, None)?;
            merged = Some(match merged {
                Some(acc) => acc.merge(&ty, &self.env),
                None => ty,
            });
        }
        Ok(merged.unwrap_or_else(SymbolType::object).array_of(1))
    }

    fn check_unary(&mut self, id: ExprId, op: UnaryOp, operand: ExprId) -> Result<SymbolType> {
        let ty = self.check_expr(operand, None)?;
        let invalid = |cx: &Self| cx.expr_error(id, ResolveError::overload("operator", op.symbol(), &[ty.clone()]));
        match op {
            UnaryOp::Not => match ty.unboxed() {
                Some(Primitive::Boolean) => Ok(SymbolType::boolean()),
                _ => Err(invalid(self)),
            },
            UnaryOp::Plus | UnaryOp::Minus | UnaryOp::BitNot => match ty.unboxed() {
                Some(p) if p.is_numeric() => Ok(SymbolType::primitive(p)),
                _ => Err(invalid(self)),
            },
            UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec => {
                let Some(p) = ty.unboxed().filter(|p| p.is_numeric()) else {
                    return Err(invalid(self));
                };
                self.record_write(operand)?;
                Ok(SymbolType::primitive(p))
            }
        }
    }

    fn check_assign(&mut self, id: ExprId, op: Option<BinaryOp>, target: ExprId, value: ExprId) -> Result<SymbolType> {
        let target_ty = match (self.ast.expr(target).clone(), op) {
            (Expr::Name(name), None) => {
                let found = self
                    .table
                    .lookup_for_write(name.as_str(), RefKind::Variable)
                    .map_err(|err| self.expr_error(target, err))?;
                match found {
                    Some(symbol) => {
                        let ty = symbol.ty().clone();
                        self.ast.set_expr_ty(target, ty.clone());
                        ty
                    }
                    None => self.check_expr(target, None)?,
                }
            }
            (Expr::Name(_), Some(_)) => {
                let ty = self.check_expr(target, None)?;
                self.record_write(target)?;
                ty
            }
            _ => self.check_expr(target, None)?,
        };

        let value_ty = self.check_expr(value, Some(&target_ty))?;
        if let Some(op) = op {
            if binary_type(op, &target_ty, &value_ty).is_none() {
                return Err(self.expr_error(id, ResolveError::overload("operator", op.symbol(), &[target_ty, value_ty])));
            }
        }
        Ok(target_ty)
    }

    /// Reports a write to the variable named by `target`, if it is one.
    fn record_write(&mut self, target: ExprId) -> Result<()> {
        if let Expr::Name(name) = self.ast.expr(target) {
            let name = name.clone();
            self.table
                .lookup_for_write(name.as_str(), RefKind::Variable)
                .map_err(|err| self.expr_error(target, err))?;
        }
        Ok(())
    }
}

fn literal_type(kind: LiteralKind) -> SymbolType {
    match kind {
        LiteralKind::Int => SymbolType::int(),
        LiteralKind::Long => SymbolType::primitive(Primitive::Long),
        LiteralKind::Float => SymbolType::primitive(Primitive::Float),
        LiteralKind::Double => SymbolType::primitive(Primitive::Double),
        LiteralKind::Char => SymbolType::primitive(Primitive::Char),
        LiteralKind::String => SymbolType::string(),
        LiteralKind::Boolean => SymbolType::boolean(),
        LiteralKind::Null => SymbolType::null(),
    }
}

/// Result type of a binary operator, `None` when the operands do not fit.
/// Boxed operands are unboxed first.
pub(crate) fn binary_type(op: BinaryOp, left: &SymbolType, right: &SymbolType) -> Option<SymbolType> {
    if op == BinaryOp::Add && (left.is_string() || right.is_string()) {
        return Some(SymbolType::string());
    }
    let (l, r) = (left.unboxed(), right.unboxed());
    let numeric = |p: Option<Primitive>| p.filter(|p| p.is_numeric());
    let boolean = |p: Option<Primitive>| p == Some(Primitive::Boolean);

    if op.is_logical() {
        return (boolean(l) && boolean(r)).then(SymbolType::boolean);
    }
    if matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
        let comparable = (numeric(l).is_some() && numeric(r).is_some())
            || (boolean(l) && boolean(r))
            || (left.is_reference() && right.is_reference());
        return comparable.then(SymbolType::boolean);
    }
    if op.is_relational() {
        return (numeric(l).is_some() && numeric(r).is_some()).then(SymbolType::boolean);
    }
    if op.is_bitwise() && boolean(l) && boolean(r) {
        return Some(SymbolType::boolean());
    }

    let (a, b) = (numeric(l)?, numeric(r)?);
    if op.is_shift() {
        let integral = |p: Primitive| matches!(p, Primitive::Byte | Primitive::Short | Primitive::Char | Primitive::Int | Primitive::Long);
        return (integral(a) && integral(b)).then(|| SymbolType::primitive(a));
    }
    if op.is_bitwise() && (a > Primitive::Long || b > Primitive::Long) {
        return None;
    }
    Some(SymbolType::primitive(a.wider(b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn prim(p: Primitive) -> SymbolType {
        SymbolType::primitive(p)
    }

    #[test]
    fn arithmetic_promotes_to_the_wider_operand() {
        assert_eq!(binary_type(BinaryOp::Add, &SymbolType::int(), &prim(Primitive::Double)), Some(prim(Primitive::Double)));
        assert_eq!(binary_type(BinaryOp::Mul, &prim(Primitive::Byte), &prim(Primitive::Short)), Some(prim(Primitive::Short)));
        assert_eq!(
            binary_type(BinaryOp::Sub, &SymbolType::class("java.lang.Long"), &SymbolType::int()),
            Some(prim(Primitive::Long))
        );
    }

    #[test]
    fn string_concatenation_wins_over_arithmetic() {
        assert_eq!(binary_type(BinaryOp::Add, &SymbolType::string(), &SymbolType::int()), Some(SymbolType::string()));
        assert_eq!(binary_type(BinaryOp::Add, &SymbolType::object(), &SymbolType::string()), Some(SymbolType::string()));
        assert_eq!(binary_type(BinaryOp::Sub, &SymbolType::string(), &SymbolType::int()), None);
    }

    #[test]
    fn comparisons_and_logic_yield_boolean() {
        assert_eq!(binary_type(BinaryOp::Lt, &SymbolType::int(), &prim(Primitive::Char)), Some(SymbolType::boolean()));
        assert_eq!(binary_type(BinaryOp::Eq, &SymbolType::string(), &SymbolType::null()), Some(SymbolType::boolean()));
        assert_eq!(binary_type(BinaryOp::And, &SymbolType::boolean(), &SymbolType::class("java.lang.Boolean")), Some(SymbolType::boolean()));
        assert_eq!(binary_type(BinaryOp::Or, &SymbolType::int(), &SymbolType::boolean()), None);
        assert_eq!(binary_type(BinaryOp::BitXor, &SymbolType::boolean(), &SymbolType::boolean()), Some(SymbolType::boolean()));
    }

    #[test]
    fn shifts_keep_the_left_operand() {
        assert_eq!(binary_type(BinaryOp::Shl, &prim(Primitive::Long), &SymbolType::int()), Some(prim(Primitive::Long)));
        assert_eq!(binary_type(BinaryOp::Shr, &prim(Primitive::Short), &prim(Primitive::Long)), Some(prim(Primitive::Short)));
        assert_eq!(binary_type(BinaryOp::UShr, &prim(Primitive::Double), &SymbolType::int()), None);
    }
}
