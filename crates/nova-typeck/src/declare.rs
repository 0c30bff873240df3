//! Class definitions for the types declared in the unit.
//!
//! Member-level classes are declared up front in two rounds: headers
//! (type parameters and supertypes) for every class, then fields, methods
//! and constructors, so member signatures may name any class of the unit
//! together with the member types it inherits. Local and anonymous classes
//! are declared when the body walk reaches them.

use nova_hir::{Member, MethodDecl, NodeRef, TypeDeclId};
use nova_resolve::{RefKind, ScopeKind, Symbol, SymbolTable};
use nova_types::{ClassDef, ClassKind, FieldDef, MethodDef, Nesting, SymbolType, TypeParamDef};

use crate::context::AnalysisContext;
use crate::error::{AnalysisError, Result};

const ENUM: &str = "java.lang.Enum";

impl AnalysisContext<'_> {
    /// Declares every member-level class of the unit.
    ///
    /// Runs against a scratch symbol table so that no hooks observe the
    /// scopes it opens.
    pub(crate) fn declare_unit(&mut self) -> Result<()> {
        let saved = std::mem::replace(&mut self.table, SymbolTable::new());
        let result = self.declare_unit_inner();
        self.table = saved;
        result
    }

    fn declare_unit_inner(&mut self) -> Result<()> {
        self.table.push_scope(ScopeKind::Block, None);
        self.catalog
            .populate(&mut self.table)
            .map_err(|err| AnalysisError::new(self.ast.package_name().to_string(), err))?;
        let types = self.ast.types.clone();
        for id in &types {
            self.declare_headers(*id, Nesting::TopLevel, None)?;
        }
        for id in &types {
            self.declare_members(*id)?;
        }
        Ok(())
    }

    /// Declares the header of `id` and, inside its scope, the headers of
    /// its member types.
    pub(crate) fn declare_headers(
        &mut self,
        id: TypeDeclId,
        nesting: Nesting,
        enclosing: Option<String>,
    ) -> Result<()> {
        let binary = self.binary_of(id)?;
        let header = self.class_header(id, &binary, nesting, enclosing)?;
        self.declare_nested_headers(id, header)
    }

    /// Declares `header` for `id`, then the headers of the member types of
    /// `id` inside its scope.
    pub(crate) fn declare_nested_headers(&mut self, id: TypeDeclId, header: ClassDef) -> Result<()> {
        let binary = header.name.clone();
        let is_interface = header.is_interface();
        self.env.declare(header);

        self.enter_class(id, &binary, false)?;
        let nested: Vec<TypeDeclId> = self.ast.decl(id).nested_types().collect();
        for member in nested {
            let decl = self.ast.decl(member);
            let is_static = decl.modifiers.is_static || decl.kind != ClassKind::Class || is_interface;
            self.declare_headers(member, Nesting::Member { is_static }, Some(binary.clone()))?;
        }
        self.leave_class(id, false)
    }

    /// Completes the definitions of `id` and its member types with their
    /// fields, methods and constructors.
    pub(crate) fn declare_members(&mut self, id: TypeDeclId) -> Result<()> {
        let binary = self.binary_of(id)?;
        self.enter_class(id, &binary, false)?;
        let header = self
            .class_def(&binary)
            .map_err(|err| self.decl_error(id, err))?;
        let def = self.class_members(id, (*header).clone())?;
        self.env.declare(def);
        let nested: Vec<TypeDeclId> = self.ast.decl(id).nested_types().collect();
        for member in nested {
            self.declare_members(member)?;
        }
        self.leave_class(id, false)
    }

    /// Type parameters, superclass and interfaces of `id`, resolved in the
    /// current scope.
    pub(crate) fn class_header(
        &mut self,
        id: TypeDeclId,
        binary: &str,
        nesting: Nesting,
        enclosing: Option<String>,
    ) -> Result<ClassDef> {
        let decl = self.ast.decl(id).clone();
        let mut def = ClassDef::new(binary, decl.kind);
        def.nesting = nesting;
        def.enclosing = enclosing;
        def.type_params = self.type_param_defs(&decl.type_params)?;

        self.table.push_scope(ScopeKind::Block, None);
        self.bind_type_params(&def.type_params)
            .map_err(|err| self.decl_error(id, err))?;
        let extends = decl.extends.map(|t| self.resolve_type_ref(t)).transpose()?;
        let implements = decl
            .implements
            .iter()
            .map(|t| self.resolve_type_ref(*t))
            .collect::<Result<Vec<_>>>()?;
        self.table.pop_scope().map_err(|err| self.decl_error(id, err))?;

        match decl.kind {
            ClassKind::Interface | ClassKind::Annotation => {
                def.super_class = None;
                def.interfaces = extends.into_iter().chain(implements).collect();
            }
            ClassKind::Enum => {
                def.super_class = Some(SymbolType::parameterized(ENUM, vec![SymbolType::class(binary)]));
                def.interfaces = implements;
            }
            ClassKind::Class => {
                if let Some(extends) = extends {
                    def.super_class = Some(extends);
                }
                def.interfaces = implements;
            }
        }
        def.is_abstract = decl.modifiers.is_abstract || def.is_interface();
        def.member_classes = decl
            .nested_types()
            .filter_map(|nested| self.catalog.binary_name_of(nested).map(str::to_string))
            .collect();

        self.ast.decls[id].ty = Some(def.as_type());
        Ok(def)
    }

    /// `def` completed with the members declared by `id`. Expects the
    /// class scope of `id` to be open.
    pub(crate) fn class_members(&mut self, id: TypeDeclId, mut def: ClassDef) -> Result<ClassDef> {
        let decl = self.ast.decl(id).clone();
        let is_interface = def.is_interface();

        for constant in &decl.enum_constants {
            def.fields.push(FieldDef {
                name: constant.name.to_string(),
                ty: SymbolType::class(def.name.clone()),
                is_static: true,
            });
        }

        for member in &decl.members {
            match member {
                Member::Field(field) => {
                    let base = self.resolve_type_ref(field.ty)?;
                    for declarator in &field.declarators {
                        def.fields.push(FieldDef {
                            name: declarator.name.to_string(),
                            ty: base.array_of(declarator.dims),
                            is_static: field.modifiers.is_static || is_interface,
                        });
                    }
                }
                Member::Method(method) => {
                    let resolved = self.method_def(method, is_interface)?;
                    if method.is_constructor() {
                        def.constructors.push(resolved);
                    } else {
                        def.methods.push(resolved);
                    }
                }
                Member::Initializer { .. } | Member::Type(_) => {}
            }
        }

        if decl.kind == ClassKind::Enum {
            let self_type = SymbolType::class(def.name.clone());
            def.methods.push(MethodDef {
                is_static: true,
                ..MethodDef::new("values", Vec::new(), self_type.array_of(1))
            });
            def.methods.push(MethodDef {
                is_static: true,
                ..MethodDef::new("valueOf", vec![SymbolType::string()], self_type)
            });
        }
        if def.constructors.is_empty() && !is_interface {
            def.constructors
                .push(MethodDef::new("<init>", Vec::new(), SymbolType::void()));
        }
        Ok(def)
    }

    /// Signature of a method or constructor, with its own type parameters
    /// in scope while the parameter and return types resolve.
    pub(crate) fn method_def(&mut self, method: &MethodDecl, in_interface: bool) -> Result<MethodDef> {
        let type_params = self.type_param_defs(&method.type_params)?;
        self.table.push_scope(ScopeKind::Block, None);
        let signature = self.method_signature(method, &type_params);
        let popped = self.table.pop_scope();
        let (params, return_type) = signature?;
        if let Err(err) = popped {
            return Err(AnalysisError::new(method.name.to_string(), err));
        }

        let modifiers = method.modifiers;
        let name = if method.is_constructor() {
            "<init>".to_string()
        } else {
            method.name.to_string()
        };
        Ok(MethodDef {
            name,
            type_params,
            params,
            return_type,
            is_static: modifiers.is_static,
            is_varargs: method.is_varargs(),
            is_abstract: modifiers.is_abstract
                || (in_interface && method.body.is_none() && !modifiers.is_static && !modifiers.is_default),
            is_bridge: false,
            is_synthetic: false,
        })
    }

    fn method_signature(
        &mut self,
        method: &MethodDecl,
        type_params: &[TypeParamDef],
    ) -> Result<(Vec<SymbolType>, SymbolType)> {
        self.bind_type_params(type_params)
            .map_err(|err| AnalysisError::new(method.name.to_string(), err))?;
        let params = method
            .params
            .iter()
            .map(|p| self.resolve_type_ref(p.ty))
            .collect::<Result<Vec<_>>>()?;
        let return_type = match method.return_ty {
            Some(ty) => self.resolve_type_ref(ty)?,
            None => SymbolType::void(),
        };
        Ok((params, return_type))
    }

    /// Opens the body scope of `id`: its type parameters and member types
    /// become visible by simple name.
    pub(crate) fn enter_class(&mut self, id: TypeDeclId, binary: &str, hooks: bool) -> Result<()> {
        let actions = if hooks {
            self.actions_for(NodeRef::Decl(id))
        } else {
            None
        };
        self.table.push_class_scope(binary, actions);
        let def = self
            .class_def(binary)
            .map_err(|err| self.decl_error(id, err))?;
        self.bind_type_params(&def.type_params)
            .map_err(|err| self.decl_error(id, err))?;
        for nested in def.member_classes.clone() {
            let simple = nested.rsplit('$').next().unwrap_or(&nested).to_string();
            let symbol = Symbol::new(simple, RefKind::Type, SymbolType::class(nested.clone()));
            self.table
                .push_symbol(symbol)
                .map_err(|err| self.decl_error(id, err))?;
        }
        Ok(())
    }

    /// Closes the body scope of `id`. With `hooks`, the scope is attached
    /// to the class's type symbol.
    pub(crate) fn leave_class(&mut self, id: TypeDeclId, hooks: bool) -> Result<()> {
        let scope = self
            .table
            .pop_scope()
            .map_err(|err| self.decl_error(id, err))?;
        if hooks {
            let name = self.ast.decl(id).name.clone();
            if let Some(symbol) = self.table.find_symbol(name.as_str(), RefKind::Type) {
                if Some(symbol.ty().name()) == scope.owner() {
                    symbol.attach_members(scope);
                }
            }
        }
        Ok(())
    }
}
