//! Statement typing.
//!
//! A statement's type is what control flow carries out of it: expression
//! statements their expression, blocks their last statement, branching
//! statements the merge of their branches and loops their body.

use nova_hir::{CatchClause, Expr, ExprId, NodeRef, Stmt, StmtId, SwitchCase, TypeDeclId, TypeRef, TypeRefId, VarDeclarator};
use nova_resolve::{RefKind, ResolveError, Symbol};
use nova_types::{find_field, instantiate_as_supertype, Nesting, SymbolType};

use crate::context::{AnalysisContext, Frame};
use crate::error::Result;

const ITERABLE: &str = "java.lang.Iterable";

impl AnalysisContext<'_> {
    /// Types `id`, records the result and returns it.
    pub(crate) fn check_stmt(&mut self, id: StmtId) -> Result<SymbolType> {
        let ty = self.stmt_type(id)?;
        self.ast.set_stmt_ty(id, ty.clone());
        Ok(ty)
    }

    fn stmt_type(&mut self, id: StmtId) -> Result<SymbolType> {
        match self.ast.stmt(id).clone() {
            Stmt::Block(stmts) => self.scoped(id, |cx| cx.check_sequence(&stmts)),
            Stmt::LocalVar { ty, declarators } => self.check_local_var(id, ty, &declarators),
            Stmt::LocalClass(decl) => {
                self.check_local_class(id, decl)?;
                Ok(SymbolType::void())
            }
            Stmt::Expr(expr) => self.check_expr(expr, None),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_expr(condition, Some(&SymbolType::boolean()))?;
                let then_ty = self.check_stmt(then_branch)?;
                match else_branch {
                    Some(else_branch) => {
                        let else_ty = self.check_stmt(else_branch)?;
                        Ok(then_ty.merge(&else_ty, &self.env))
                    }
                    None => Ok(then_ty),
                }
            }
            Stmt::While { condition, body } => {
                self.check_expr(condition, Some(&SymbolType::boolean()))?;
                self.check_stmt(body)
            }
            Stmt::DoWhile { body, condition } => {
                let ty = self.check_stmt(body)?;
                self.check_expr(condition, Some(&SymbolType::boolean()))?;
                Ok(ty)
            }
            Stmt::For {
                init,
                condition,
                update,
                body,
            } => self.scoped(id, |cx| {
                for stmt in &init {
                    cx.check_stmt(*stmt)?;
                }
                if let Some(condition) = condition {
                    cx.check_expr(condition, Some(&SymbolType::boolean()))?;
                }
                for expr in &update {
                    cx.check_expr(*expr, None)?;
                }
                cx.check_stmt(body)
            }),
            Stmt::ForEach {
                ty,
                name,
                iterable,
                body,
            } => self.scoped(id, |cx| {
                let source = cx.check_expr(iterable, None)?;
                let element = cx.element_type(id, &source)?;
                let var_ty = if matches!(cx.ast.type_ref(ty), TypeRef::Var) {
                    cx.ast.set_type_ref_ty(ty, element.clone());
                    element
                } else {
                    cx.resolve_type_ref(ty)?
                };
                let symbol = Symbol::new(name.clone(), RefKind::Variable, var_ty)
                    .with_location(NodeRef::Stmt(id))
                    .with_actions(cx.actions_for(NodeRef::Stmt(id)));
                cx.table.push_symbol(symbol).map_err(|err| cx.stmt_error(id, err))?;
                cx.check_stmt(body)
            }),
            Stmt::Switch { selector, cases } => self.check_switch(id, selector, &cases),
            Stmt::Return(value) => self.check_return(value),
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty => Ok(SymbolType::void()),
            Stmt::Throw(expr) => {
                self.check_expr(expr, None)?;
                Ok(SymbolType::void())
            }
            Stmt::Try {
                resources,
                body,
                catches,
                finally,
            } => self.check_try(id, &resources, body, &catches, finally),
            Stmt::Labeled { body, .. } => self.check_stmt(body),
        }
    }

    /// Runs `f` inside a block scope owned by `id`. The scope is closed
    /// even when `f` fails.
    fn scoped<T>(&mut self, id: StmtId, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.push_block(NodeRef::Stmt(id));
        let result = f(self);
        let popped = self.pop_block(NodeRef::Stmt(id));
        let value = result?;
        popped?;
        Ok(value)
    }

    fn check_sequence(&mut self, stmts: &[StmtId]) -> Result<SymbolType> {
        let mut last = SymbolType::void();
        for stmt in stmts {
            last = self.check_stmt(*stmt)?;
        }
        Ok(last)
    }

    fn check_local_var(&mut self, id: StmtId, ty: TypeRefId, declarators: &[VarDeclarator]) -> Result<SymbolType> {
        let is_var = matches!(self.ast.type_ref(ty), TypeRef::Var);
        let base = if is_var {
            None
        } else {
            Some(self.resolve_type_ref(ty)?)
        };

        let mut last = SymbolType::void();
        for declarator in declarators {
            let malformed = || ResolveError::MalformedSymbol {
                name: declarator.name.to_string(),
            };
            let var_ty = match (base.as_ref(), declarator.init) {
                (Some(base), init) => {
                    let declared = base.array_of(declarator.dims);
                    if let Some(init) = init {
                        self.check_expr(init, Some(&declared))?;
                    }
                    declared
                }
                (None, Some(init)) => {
                    let inferred = self.check_expr(init, None)?.without_member();
                    if inferred.is_null() || inferred.is_void() {
                        return Err(self.stmt_error(id, malformed()));
                    }
                    self.ast.set_type_ref_ty(ty, inferred.clone());
                    inferred
                }
                (None, None) => return Err(self.stmt_error(id, malformed())),
            };
            let symbol = Symbol::new(declarator.name.clone(), RefKind::Variable, var_ty.clone())
                .with_location(NodeRef::Stmt(id))
                .with_actions(self.actions_for(NodeRef::Stmt(id)));
            self.table
                .push_symbol(symbol)
                .map_err(|err| self.stmt_error(id, err))?;
            last = var_ty;
        }
        Ok(last)
    }

    /// Declares a class written inside a method body. Its name becomes
    /// visible in the enclosing block before the body is checked, so the
    /// class may refer to itself.
    fn check_local_class(&mut self, id: StmtId, decl: TypeDeclId) -> Result<()> {
        let enclosing = self
            .table
            .innermost_class()
            .map(str::to_string)
            .ok_or_else(|| self.stmt_error(id, ResolveError::UnbalancedScope("no enclosing class")))?;
        let simple = self.ast.decl(decl).name.clone();
        let binary = self
            .catalog
            .register_local_class(decl, &enclosing, Some(simple.as_str()));
        self.catalog.register_nested_types(&*self.ast, decl);
        tracing::debug!(target: "nova.typeck", class = %binary, "declaring local class");

        let symbol = Symbol::new(simple, RefKind::Type, SymbolType::class(binary.clone()))
            .with_location(NodeRef::Decl(decl))
            .with_actions(self.actions_for(NodeRef::Stmt(id)));
        self.table
            .push_symbol(symbol)
            .map_err(|err| self.stmt_error(id, err))?;

        let header = self.class_header(decl, &binary, Nesting::Local, Some(enclosing))?;
        self.declare_nested_headers(decl, header)?;
        self.declare_members(decl)?;
        self.check_decl(decl)
    }

    /// Element type produced by iterating over `source`.
    fn element_type(&self, id: StmtId, source: &SymbolType) -> Result<SymbolType> {
        if let Some(component) = source.component_type() {
            return Ok(component);
        }
        let Some(iterable) = instantiate_as_supertype(&self.env, source, ITERABLE) else {
            return Err(self.stmt_error(id, ResolveError::overload("for-each", source.to_string(), &[])));
        };
        Ok(iterable
            .type_args()
            .and_then(<[SymbolType]>::first)
            .map_or_else(SymbolType::object, SymbolType::read_type))
    }

    fn check_switch(&mut self, id: StmtId, selector: ExprId, cases: &[SwitchCase]) -> Result<SymbolType> {
        let selector_ty = self.check_expr(selector, None)?;
        let mut merged: Option<SymbolType> = None;
        self.scoped(id, |cx| {
            for case in cases {
                for label in &case.labels {
                    cx.check_case_label(*label, &selector_ty)?;
                }
                let ty = cx.check_sequence(&case.body)?;
                merged = Some(match merged.take() {
                    Some(acc) => acc.merge(&ty, &cx.env),
                    None => ty,
                });
            }
            Ok(())
        })?;
        Ok(merged.unwrap_or_else(SymbolType::void))
    }

    /// Enum switch labels are bare constant names resolved against the
    /// selector's type.
    fn check_case_label(&mut self, label: ExprId, selector: &SymbolType) -> Result<()> {
        if let Expr::Name(name) = self.ast.expr(label).clone() {
            let constant = find_field(&self.env, selector, name.as_str()).filter(|f| f.def.is_static);
            if let Some(constant) = constant {
                let ty = constant.def.ty.with_member(constant.member);
                self.ast.set_expr_ty(label, ty);
                return Ok(());
            }
        }
        self.check_expr(label, Some(selector))?;
        Ok(())
    }

    fn check_return(&mut self, value: Option<ExprId>) -> Result<SymbolType> {
        let Some(value) = value else {
            return Ok(SymbolType::void());
        };
        let expected = self.return_target();
        let ty = self.check_expr(value, expected.as_ref())?;
        if let Some(Frame::Lambda { returns, .. }) = self.frames.last_mut() {
            returns.push(ty.clone());
        }
        Ok(ty)
    }

    fn check_try(
        &mut self,
        id: StmtId,
        resources: &[StmtId],
        body: StmtId,
        catches: &[CatchClause],
        finally: Option<StmtId>,
    ) -> Result<SymbolType> {
        let mut merged = self.scoped(id, |cx| {
            for resource in resources {
                cx.check_stmt(*resource)?;
            }
            cx.check_stmt(body)
        })?;

        for clause in catches {
            let mut caught: Option<SymbolType> = None;
            for ty in &clause.types {
                let ty = self.resolve_type_ref(*ty)?;
                caught = Some(match caught {
                    Some(acc) => acc.merge(&ty, &self.env),
                    None => ty,
                });
            }
            let caught = caught.unwrap_or_else(|| SymbolType::class("java.lang.Throwable"));
            let ty = self.scoped(clause.body, |cx| {
                let symbol = Symbol::new(clause.name.clone(), RefKind::Variable, caught)
                    .with_location(NodeRef::Stmt(clause.body));
                cx.table
                    .push_symbol(symbol)
                    .map_err(|err| cx.stmt_error(clause.body, err))?;
                cx.check_stmt(clause.body)
            })?;
            merged = merged.merge(&ty, &self.env);
        }

        if let Some(finally) = finally {
            self.check_stmt(finally)?;
        }
        Ok(merged)
    }
}
