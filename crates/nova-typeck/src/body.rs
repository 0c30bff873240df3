//! Class bodies: member symbols, field initializers, method and
//! initializer bodies, enum constants and nested classes.

use nova_hir::{EnumConstant, FieldDecl, Member, MethodDecl, NodeRef, StmtId, TypeDeclId};
use nova_resolve::{RefKind, ResolveError, ScopeKind, Symbol, SymbolTable};
use nova_types::{constructors_of, ClassDef, MemberRef, SymbolType, TypeParamDef};

use crate::context::{AnalysisContext, Frame};
use crate::error::{AnalysisError, Result};
use crate::overload::{self, Arg, CallSite};

impl AnalysisContext<'_> {
    /// Checks every top-level class of the unit against a fresh symbol
    /// table carrying the unit-wide hooks.
    pub(crate) fn check_unit(&mut self) -> Result<()> {
        self.table = match self.provider.unit_actions(&*self.ast) {
            Some(actions) => SymbolTable::with_actions(actions),
            None => SymbolTable::new(),
        };
        let unit_error = |cx: &Self, err: ResolveError| AnalysisError::new(cx.ast.package_name().to_string(), err);

        self.table.push_scope(ScopeKind::Block, None);
        self.catalog
            .populate(&mut self.table)
            .map_err(|err| unit_error(self, err))?;
        for id in self.ast.types.clone() {
            self.check_decl(id)?;
        }
        self.table.pop_scope().map_err(|err| unit_error(self, err))?;
        Ok(())
    }

    /// Checks the body of class `id` inside its class scope. On exit the
    /// scope is attached to the class's type symbol.
    pub(crate) fn check_decl(&mut self, id: TypeDeclId) -> Result<()> {
        let binary = self.binary_of(id)?;
        tracing::debug!(target: "nova.typeck", class = %binary, "checking class body");
        self.enter_class(id, &binary, true)?;
        let result = self.check_class_body(id, &binary);
        let left = self.leave_class(id, true);
        result?;
        left
    }

    fn check_class_body(&mut self, id: TypeDeclId, binary: &str) -> Result<()> {
        let decl = self.ast.decl(id).clone();
        let def = self.class_def(binary).map_err(|err| self.decl_error(id, err))?;
        self.declare_member_symbols(id, &def, &decl.enum_constants, &decl.members)?;

        for constant in &decl.enum_constants {
            self.check_enum_constant(id, &def, constant)?;
        }
        for member in &decl.members {
            match member {
                Member::Field(field) => self.check_field_inits(&def, field)?,
                Member::Method(method) => self.check_method(id, method)?,
                Member::Initializer { body, .. } => {
                    self.frames.push(Frame::Initializer);
                    let checked = self.check_stmt(*body);
                    self.frames.pop();
                    checked?;
                }
                Member::Type(nested) => self.check_decl(*nested)?,
            }
        }
        Ok(())
    }

    /// Binds enum constants, fields, methods and constructors of the class
    /// in its body scope.
    fn declare_member_symbols(
        &mut self,
        id: TypeDeclId,
        def: &ClassDef,
        constants: &[EnumConstant],
        members: &[Member],
    ) -> Result<()> {
        let owner = def.name.clone();
        let mut symbols = Vec::new();

        for constant in constants {
            symbols.push(
                Symbol::new(constant.name.clone(), RefKind::EnumLiteral, SymbolType::class(owner.clone()))
                    .with_location(NodeRef::Decl(id)),
            );
        }
        for field in members.iter().filter_map(|m| match m {
            Member::Field(field) => Some(field),
            _ => None,
        }) {
            for declarator in &field.declarators {
                let Some(resolved) = def.field(declarator.name.as_str()) else {
                    continue;
                };
                let ty = resolved.ty.clone().with_member(MemberRef::Field {
                    owner: owner.clone(),
                    name: resolved.name.clone(),
                });
                symbols.push(
                    Symbol::new(declarator.name.clone(), RefKind::Variable, ty)
                        .with_location(NodeRef::TypeRef(field.ty))
                        .with_actions(self.actions_for(NodeRef::TypeRef(field.ty))),
                );
            }
        }
        for (index, method) in def.methods.iter().enumerate() {
            let ret = method.return_type.clone().with_member(MemberRef::Method {
                owner: owner.clone(),
                index,
            });
            symbols.push(
                Symbol::method(method.name.as_str(), ret, method.params.clone())
                    .with_varargs(method.is_varargs)
                    .with_location(NodeRef::Decl(id)),
            );
        }
        for (index, ctor) in def.constructors.iter().enumerate() {
            let ret = SymbolType::void().with_member(MemberRef::Constructor {
                owner: owner.clone(),
                index,
            });
            symbols.push(
                Symbol::method(ctor.name.as_str(), ret, ctor.params.clone())
                    .with_varargs(ctor.is_varargs)
                    .with_location(NodeRef::Decl(id)),
            );
        }

        for symbol in symbols {
            self.table
                .push_symbol(symbol)
                .map_err(|err| self.decl_error(id, err))?;
        }
        Ok(())
    }

    /// Resolves the constructor an enum constant invokes and checks its
    /// class body, if any.
    fn check_enum_constant(&mut self, id: TypeDeclId, def: &ClassDef, constant: &EnumConstant) -> Result<()> {
        let self_type = SymbolType::class(def.name.clone());
        let classified = self.classify_args(&constant.args)?;
        let site = CallSite {
            name: "<init>",
            args: &classified,
            witnesses: &[],
            extra_vars: &[],
            max_depth: self.config.max_inference_depth,
        };
        let ranked = overload::ranked(&self.env, &site, constructors_of(&self.env, &self_type));
        let Some(app) = self.complete_best(&constant.args, ranked)? else {
            let shown: Vec<SymbolType> = classified.iter().map(Arg::display_type).collect();
            return Err(AnalysisError::new(
                constant.name.to_string(),
                ResolveError::overload("constructor", def.name.clone(), &shown),
            ));
        };
        self.record_call(NodeRef::Decl(id), &app.candidate)?;

        if let Some(body) = constant.body {
            self.check_anonymous(NodeRef::Decl(id), body, &self_type)?;
        }
        Ok(())
    }

    fn check_field_inits(&mut self, def: &ClassDef, field: &FieldDecl) -> Result<()> {
        for declarator in &field.declarators {
            let Some(init) = declarator.init else {
                continue;
            };
            let expected = def.field(declarator.name.as_str()).map(|f| f.ty.clone());
            self.frames.push(Frame::Initializer);
            let checked = self.check_expr(init, expected.as_ref());
            self.frames.pop();
            checked?;
        }
        Ok(())
    }

    /// Checks a method or constructor body with its type parameters and
    /// parameters in scope.
    fn check_method(&mut self, id: TypeDeclId, method: &MethodDecl) -> Result<()> {
        let Some(body) = method.body else {
            return Ok(());
        };
        tracing::trace!(target: "nova.typeck", method = %method.name, "checking method body");
        let type_params = self.type_param_defs(&method.type_params)?;

        self.table.push_scope(ScopeKind::Block, None);
        let result = self.check_method_in_scope(method, &type_params, body);
        let popped = self.table.pop_scope().map_err(|err| self.decl_error(id, err));
        result?;
        popped?;
        Ok(())
    }

    fn check_method_in_scope(
        &mut self,
        method: &MethodDecl,
        type_params: &[TypeParamDef],
        body: StmtId,
    ) -> Result<()> {
        self.bind_type_params(type_params)
            .map_err(|err| AnalysisError::new(method.name.to_string(), err))?;
        for param in &method.params {
            let ty = self.resolve_type_ref(param.ty)?;
            let symbol = Symbol::new(param.name.clone(), RefKind::Variable, ty)
                .with_location(NodeRef::TypeRef(param.ty))
                .with_actions(self.actions_for(NodeRef::TypeRef(param.ty)));
            self.table
                .push_symbol(symbol)
                .map_err(|err| AnalysisError::new(param.name.to_string(), err))?;
        }
        let return_type = match method.return_ty {
            Some(ty) => self.resolve_type_ref(ty)?,
            None => SymbolType::void(),
        };

        self.frames.push(Frame::Method(return_type));
        let checked = self.check_stmt(body);
        self.frames.pop();
        checked.map(|_| ())
    }
}
