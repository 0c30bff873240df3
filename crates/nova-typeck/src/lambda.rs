//! Lambdas and method references checked against a functional interface.

use nova_hir::{
    Ast, Expr, ExprId, LambdaBody, LambdaParam, MethodRefTarget, NodeRef, Stmt, StmtId, TypeDeclId, TypeRef, UnaryOp,
    Visitor,
};
use nova_resolve::{RefKind, ResolveError, Symbol};
use nova_types::{function_type, FunctionType, SymbolType, TypeBindings};

use crate::context::{AnalysisContext, Frame};
use crate::error::Result;
use crate::overload::{self, LambdaShape, MethodRefShape};

/// Result of typing a lambda or method reference.
#[derive(Clone, Debug)]
pub(crate) struct FunctionalOutcome {
    /// The functional interface, wildcards replaced by their bounds.
    pub interface: SymbolType,
    /// Type produced by the body or referenced method; `None` when it
    /// produces no value.
    pub body: Option<SymbolType>,
    /// Return type of the single abstract method before open type variables
    /// are erased.
    pub sam_return: SymbolType,
}

impl AnalysisContext<'_> {
    /// Types the lambda or method reference `id` against `target`.
    pub(crate) fn check_functional(&mut self, id: ExprId, target: &SymbolType) -> Result<FunctionalOutcome> {
        let expr = self.ast.expr(id).clone();
        let what = match expr {
            Expr::Lambda { .. } => "lambda",
            _ => "method reference",
        };
        let ft = function_type(&self.env, target).ok_or_else(|| {
            self.expr_error(id, ResolveError::overload(what, target.to_string(), &[]))
        })?;
        let outcome = match expr {
            Expr::Lambda { params, body } => self.check_lambda(id, &ft, &params, body)?,
            Expr::MethodRef { .. } => self.check_method_ref(id, &ft)?,
            _ => {
                return Err(self.expr_error(id, ResolveError::overload(what, target.to_string(), &[])));
            }
        };
        self.ast.set_expr_ty(id, outcome.interface.clone());
        Ok(outcome)
    }

    fn check_lambda(
        &mut self,
        id: ExprId,
        ft: &FunctionType,
        params: &[LambdaParam],
        body: LambdaBody,
    ) -> Result<FunctionalOutcome> {
        let sam_params: Vec<SymbolType> = ft.params().iter().map(|p| self.erase_open(p)).collect();
        if params.len() != sam_params.len() {
            return Err(self.expr_error(id, ResolveError::overload("lambda", ft.interface.to_string(), &sam_params)));
        }

        let expected = self.erase_open(ft.return_type());
        self.push_block(NodeRef::Expr(id));
        let produced = self.lambda_body(id, ft, params, &sam_params, body, &expected);
        let popped = self.pop_block(NodeRef::Expr(id));
        let produced = produced?;
        popped?;

        if !expected.is_void() {
            let fits = produced
                .as_ref()
                .is_some_and(|ty| expected.is_compatible(ty, &self.env));
            if !fits {
                let found = produced.clone().unwrap_or_else(SymbolType::void);
                tracing::debug!(target: "nova.typeck", expected = %expected, found = %found, "lambda body does not fit");
                return Err(self.expr_error(id, ResolveError::overload("lambda", ft.interface.to_string(), &[found])));
            }
        }
        Ok(FunctionalOutcome {
            interface: ft.interface.clone(),
            body: produced,
            sam_return: ft.return_type().clone(),
        })
    }

    fn lambda_body(
        &mut self,
        id: ExprId,
        ft: &FunctionType,
        params: &[LambdaParam],
        sam_params: &[SymbolType],
        body: LambdaBody,
        expected: &SymbolType,
    ) -> Result<Option<SymbolType>> {
        for (param, sam_param) in params.iter().zip(sam_params) {
            let ty = match param.ty {
                Some(ty_ref) if matches!(self.ast.type_ref(ty_ref), TypeRef::Var) => {
                    self.ast.set_type_ref_ty(ty_ref, sam_param.clone());
                    sam_param.clone()
                }
                Some(ty_ref) => {
                    let declared = self.resolve_type_ref(ty_ref)?;
                    if !sam_param.mentions_type_variables()
                        && declared.erasure() != sam_param.read_type().erasure()
                    {
                        return Err(self.expr_error(
                            id,
                            ResolveError::overload("lambda", ft.interface.to_string(), sam_params),
                        ));
                    }
                    declared
                }
                None => sam_param.read_type(),
            };
            let symbol = Symbol::new(param.name.clone(), RefKind::Variable, ty).with_location(NodeRef::Expr(id));
            self.table
                .push_symbol(symbol)
                .map_err(|err| self.expr_error(id, err))?;
        }

        match body {
            LambdaBody::Expr(body) => {
                let target = (!expected.is_void()).then_some(expected);
                let ty = self.check_expr(body, target)?;
                Ok((!ty.is_void()).then_some(ty))
            }
            LambdaBody::Block(body) => {
                self.frames.push(Frame::Lambda {
                    expected: expected.clone(),
                    returns: Vec::new(),
                });
                let checked = self.check_stmt(body);
                let frame = self.frames.pop();
                checked?;
                Ok(match frame {
                    Some(Frame::Lambda { returns, .. }) => returns
                        .into_iter()
                        .reduce(|acc, ty| acc.merge(&ty, &self.env)),
                    _ => None,
                })
            }
        }
    }

    fn check_method_ref(&mut self, id: ExprId, ft: &FunctionType) -> Result<FunctionalOutcome> {
        let shape = self.method_ref_shape(id)?;
        let sam_params: Vec<SymbolType> = ft.params().iter().map(|p| self.erase_open(p)).collect();
        let failure = |cx: &Self| {
            cx.expr_error(id, ResolveError::overload("method reference", shape.name.as_str(), &sam_params))
        };

        let target = overload::resolve_method_ref(&self.env, &shape, &sam_params, self.config.max_inference_depth)
            .ok_or_else(|| failure(self))?;
        if let Some(app) = &target.app {
            self.record_call(NodeRef::Expr(id), &app.candidate)?;
        }

        let expected = self.erase_open(ft.return_type());
        if !expected.is_void() {
            let fits = target
                .produced
                .as_ref()
                .is_some_and(|ty| expected.is_compatible(ty, &self.env));
            if !fits {
                return Err(failure(self));
            }
        }
        Ok(FunctionalOutcome {
            interface: ft.interface.clone(),
            body: target.produced,
            sam_return: ft.return_type().clone(),
        })
    }

    /// The qualifier and name of the method reference `id`. A value
    /// qualifier already typed while classifying call arguments is not
    /// checked again.
    pub(crate) fn method_ref_shape(&mut self, id: ExprId) -> Result<MethodRefShape> {
        let Expr::MethodRef { target, type_args, name } = self.ast.expr(id).clone() else {
            return Err(self.expr_error(id, ResolveError::overload("method reference", "?", &[])));
        };
        let witnesses = type_args
            .iter()
            .map(|t| self.resolve_type_ref(*t))
            .collect::<Result<Vec<_>>>()?;
        let (receiver, is_type) = match target {
            MethodRefTarget::Type(ty_ref) => (self.resolve_type_ref(ty_ref)?, true),
            MethodRefTarget::Expr(expr) => {
                let ty = match self.ast.expr_ty(expr) {
                    Some(ty) => ty.clone(),
                    None => self.check_expr(expr, None)?,
                };
                (ty, self.type_exprs.contains(&expr))
            }
            MethodRefTarget::Super => {
                let ty = self.current_super_type().map_err(|err| self.expr_error(id, err))?;
                (ty, false)
            }
        };
        Ok(MethodRefShape {
            receiver,
            is_type,
            name: name.to_string(),
            witnesses,
        })
    }

    /// `ty` with every type variable not declared in an enclosing scope
    /// replaced by its erasure.
    pub(crate) fn erase_open(&self, ty: &SymbolType) -> SymbolType {
        let mut open = TypeBindings::new();
        self.collect_open(ty, &mut open);
        ty.refactor(&open, false)
    }

    fn collect_open(&self, ty: &SymbolType, open: &mut TypeBindings) {
        if let Some(var) = ty.template_variable().filter(|_| ty.is_type_variable()) {
            let in_scope = self
                .table
                .find_symbol(var, RefKind::TypeParam)
                .is_some_and(|symbol| symbol.ty().template_variable() == Some(var));
            if !in_scope {
                open.insert(var.to_string(), ty.element_type().erasure());
            }
            return;
        }
        for arg in ty.type_args().into_iter().flatten() {
            self.collect_open(arg, open);
        }
        if ty.is_wildcard() {
            for bound in ty.upper_bounds().iter().chain(ty.lower_bounds()) {
                self.collect_open(bound, open);
            }
        }
    }

    /// The shape of a lambda argument as seen before overload resolution.
    pub(crate) fn lambda_shape(&mut self, params: &[LambdaParam], body: LambdaBody) -> Result<LambdaShape> {
        let explicit = if !params.is_empty()
            && params.iter().all(|p| {
                p.ty.is_some_and(|t| !matches!(self.ast.type_ref(t), TypeRef::Var))
            }) {
            let mut types = Vec::with_capacity(params.len());
            for ty in params.iter().filter_map(|p| p.ty) {
                types.push(self.resolve_type_ref(ty)?);
            }
            Some(types)
        } else {
            None
        };
        let (value_compatible, void_compatible) = match body {
            LambdaBody::Expr(expr) => {
                let statement_like = matches!(
                    self.ast.expr(expr),
                    Expr::MethodCall { .. }
                        | Expr::New { .. }
                        | Expr::Assign { .. }
                        | Expr::Unary {
                            op: UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec,
                            ..
                        }
                );
                (true, statement_like)
            }
            LambdaBody::Block(block) => {
                let mut scan = ReturnScan::default();
                scan.visit_stmt(&*self.ast, block);
                (scan.with_value, !scan.with_value)
            }
        };
        Ok(LambdaShape {
            arity: params.len(),
            explicit,
            value_compatible,
            void_compatible,
        })
    }
}

/// Finds the `return` statements of a lambda body, skipping nested lambdas
/// and class bodies.
#[derive(Default)]
struct ReturnScan {
    with_value: bool,
}

impl Visitor for ReturnScan {
    fn visit_decl(&mut self, _ast: &Ast, _id: TypeDeclId) {}

    fn visit_stmt(&mut self, ast: &Ast, id: StmtId) {
        if let Stmt::Return(Some(_)) = ast.stmt(id) {
            self.with_value = true;
        }
        nova_hir::walk(self, ast, NodeRef::Stmt(id));
    }

    fn visit_expr(&mut self, ast: &Ast, id: ExprId) {
        if !matches!(ast.expr(id), Expr::Lambda { .. }) {
            nova_hir::walk(self, ast, NodeRef::Expr(id));
        }
    }
}
