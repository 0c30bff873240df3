//! Resolution of type references written in source.

use nova_core::QualifiedName;
use nova_hir::{TypeParam, TypeRef, TypeRefId, WildcardBound};
use nova_resolve::{load_canonical, RefKind, ResolveError, ScopeKind, Symbol};
use nova_types::{SymbolType, TypeParamDef};

use crate::context::AnalysisContext;
use crate::error::{AnalysisError, Result};

impl AnalysisContext<'_> {
    /// Resolves `id` and records the result in its slot.
    ///
    /// `var` has no type of its own; callers fill its slot once the
    /// initializer is known.
    pub(crate) fn resolve_type_ref(&mut self, id: TypeRefId) -> Result<SymbolType> {
        let ty = match self.ast.type_ref(id).clone() {
            TypeRef::Primitive(p) => SymbolType::primitive(p),
            TypeRef::Void => SymbolType::void(),
            TypeRef::Var => {
                return Err(self.type_error(id, ResolveError::symbol("var")));
            }
            TypeRef::Named { name, args } => {
                let base = self
                    .resolve_type_name(&name)
                    .ok_or_else(|| self.type_error(id, ResolveError::class_not_found(name.to_dotted())))?;
                match args {
                    None => base,
                    Some(args) => {
                        let args = args
                            .iter()
                            .map(|arg| self.resolve_type_ref(*arg))
                            .collect::<Result<Vec<_>>>()?;
                        base.with_type_args(Some(args))
                    }
                }
            }
            TypeRef::Array { element, dims } => self.resolve_type_ref(element)?.array_of(dims),
            TypeRef::Wildcard(bound) => match bound {
                WildcardBound::Unbounded => SymbolType::wildcard(),
                WildcardBound::Extends(b) => SymbolType::wildcard_extends(self.resolve_type_ref(b)?),
                WildcardBound::Super(b) => SymbolType::wildcard_super(self.resolve_type_ref(b)?),
            },
        };
        self.ast.set_type_ref_ty(id, ty.clone());
        Ok(ty)
    }

    /// A possibly qualified type name as seen from the current scope.
    pub(crate) fn resolve_type_name(&self, name: &QualifiedName) -> Option<SymbolType> {
        let (first, rest) = name.segments().split_first()?;
        match self.resolve_simple_type(first.as_str()) {
            Some(head) if rest.is_empty() => Some(head),
            Some(head) if head.is_type_variable() => None,
            Some(head) => {
                let mut current = head.name().to_string();
                for segment in rest {
                    current = self
                        .catalog
                        .member_class(&self.env, &current, segment.as_str())?;
                }
                Some(SymbolType::class(current))
            }
            None if rest.is_empty() => None,
            None => load_canonical(&self.env, &name.to_dotted()).map(SymbolType::class),
        }
    }

    /// Type variables and local or member types bound in the symbol table
    /// shadow member types of the enclosing classes, which shadow the
    /// unit-level names of the catalog.
    pub(crate) fn resolve_simple_type(&self, simple: &str) -> Option<SymbolType> {
        for scope in self.table.scopes() {
            if let Some(var) = scope.find(simple, RefKind::TypeParam) {
                return Some(var.ty().clone());
            }
            if let Some(ty) = scope.find(simple, RefKind::Type) {
                return Some(ty.ty().clone());
            }
        }
        for owner in self.table.enclosing_classes() {
            if let Some(member) = self.catalog.member_class(&self.env, owner, simple) {
                return Some(SymbolType::class(member));
            }
        }
        self.catalog.resolve(&self.env, simple).map(SymbolType::class)
    }

    /// Declares `params`, whose bounds may mention each other
    /// (`<T extends Comparable<T>>`).
    pub(crate) fn type_param_defs(&mut self, params: &[TypeParam]) -> Result<Vec<TypeParamDef>> {
        if params.is_empty() {
            return Ok(Vec::new());
        }
        self.table.push_scope(ScopeKind::Block, None);
        for param in params {
            let provisional = SymbolType::type_variable(param.name.as_str(), vec![SymbolType::object()]);
            let symbol = Symbol::new(param.name.clone(), RefKind::TypeParam, provisional);
            self.table
                .push_symbol(symbol)
                .map_err(|err| self.type_param_error(param, err))?;
        }
        let defs = params
            .iter()
            .map(|param| {
                let bounds = param
                    .bounds
                    .iter()
                    .map(|b| self.resolve_type_ref(*b))
                    .collect::<Result<Vec<_>>>()?;
                Ok(TypeParamDef::new(param.name.as_str(), bounds))
            })
            .collect::<Result<Vec<_>>>();
        self.table
            .pop_scope()
            .map_err(|err| self.type_param_error(&params[0], err))?;
        defs
    }

    /// Binds declared type parameters in the innermost scope.
    pub(crate) fn bind_type_params(&mut self, defs: &[TypeParamDef]) -> Result<(), ResolveError> {
        for def in defs {
            self.table
                .push_symbol(Symbol::new(def.name.as_str(), RefKind::TypeParam, def.as_type()))?;
        }
        Ok(())
    }

    fn type_param_error(&self, param: &TypeParam, source: ResolveError) -> AnalysisError {
        AnalysisError::new(param.name.to_string(), source)
    }
}
