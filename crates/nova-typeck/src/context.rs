use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

use nova_config::AnalysisConfig;
use nova_core::TypeIndex;
use nova_hir::{render_expr, render_stmt, render_type_ref, Ast, ExprId, NodeRef, StmtId, TypeDeclId, TypeRefId};
use nova_resolve::{ActionProvider, ResolveError, Scope, ScopeKind, SymbolActions, SymbolTable, TypeCatalog};
use nova_types::{ClassDef, ClassLoadError, ClassSource, SymbolType, TypeEnv, TypeStore};

use crate::error::{AnalysisError, Result};

/// Classes declared in the unit layered over an external class source.
///
/// Source declarations win over classpath entries with the same binary
/// name.
pub struct UnitEnv<'a> {
    local: TypeStore,
    external: &'a dyn ClassSource,
}

impl<'a> UnitEnv<'a> {
    pub fn new(external: &'a dyn ClassSource) -> Self {
        Self {
            local: TypeStore::new(),
            external,
        }
    }

    /// Adds or replaces a class declared in source.
    pub fn declare(&mut self, class: ClassDef) {
        tracing::trace!(target: "nova.typeck", class = %class.name, "declaring source class");
        self.local.insert(class);
    }

    pub fn local(&self) -> &TypeStore {
        &self.local
    }
}

impl TypeEnv for UnitEnv<'_> {
    fn class(&self, binary_name: &str) -> Result<Arc<ClassDef>, ClassLoadError> {
        match self.local.get(binary_name) {
            Some(def) => Ok(def.clone()),
            None => self.external.class(binary_name),
        }
    }
}

impl TypeIndex for UnitEnv<'_> {
    fn class_exists(&self, binary_name: &str) -> bool {
        self.local.contains(binary_name) || self.external.class_exists(binary_name)
    }

    fn package_classes(&self, package: &str) -> Vec<String> {
        let mut out = self.local.package_classes(package);
        out.extend(self.external.package_classes(package));
        out.sort();
        out.dedup();
        out
    }

    fn package_exists(&self, package: &str) -> bool {
        !self.local.package_classes(package).is_empty() || self.external.package_exists(package)
    }
}

/// Where `return` statements report to.
#[derive(Debug)]
pub(crate) enum Frame {
    Method(SymbolType),
    Initializer,
    Lambda {
        expected: SymbolType,
        returns: Vec<SymbolType>,
    },
}

/// Counts gathered over one analysis run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnalysisSummary {
    /// Classes declared in the unit, local and anonymous ones included.
    pub classes: usize,
    pub typed_expressions: usize,
    /// Expressions left without a type: package-name segments.
    pub untyped_expressions: usize,
    pub statements: usize,
    /// Method and constructor invocations resolved to a declaration.
    pub resolved_calls: usize,
}

/// State of one analysis run over a compilation unit.
pub struct AnalysisContext<'a> {
    pub(crate) ast: &'a mut Ast,
    pub(crate) env: UnitEnv<'a>,
    pub(crate) catalog: TypeCatalog,
    pub(crate) table: SymbolTable,
    pub(crate) config: AnalysisConfig,
    pub(crate) provider: &'a dyn ActionProvider,
    pub(crate) frames: Vec<Frame>,
    /// Expressions that name a type rather than a value (`Math` in
    /// `Math.max(a, b)`).
    pub(crate) type_exprs: HashSet<ExprId>,
    pub(crate) resolved_calls: usize,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        ast: &'a mut Ast,
        external: &'a dyn ClassSource,
        config: &AnalysisConfig,
        provider: &'a dyn ActionProvider,
    ) -> Self {
        let env = UnitEnv::new(external);
        let mut catalog = TypeCatalog::new(config.implicit_java_lang);
        catalog.register_compilation_unit(&env, ast);
        Self {
            ast,
            env,
            catalog,
            table: SymbolTable::new(),
            config: config.clone(),
            provider,
            frames: Vec::new(),
            type_exprs: HashSet::new(),
            resolved_calls: 0,
        }
    }

    pub fn ast(&self) -> &Ast {
        &*self.ast
    }

    pub fn env(&self) -> &UnitEnv<'a> {
        &self.env
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    // Errors

    pub(crate) fn expr_error(&self, id: ExprId, source: ResolveError) -> AnalysisError {
        AnalysisError::new(render_expr(&*self.ast, id), source)
    }

    pub(crate) fn stmt_error(&self, id: StmtId, source: ResolveError) -> AnalysisError {
        AnalysisError::new(render_stmt(&*self.ast, id), source)
    }

    pub(crate) fn type_error(&self, id: TypeRefId, source: ResolveError) -> AnalysisError {
        AnalysisError::new(render_type_ref(&*self.ast, id), source)
    }

    pub(crate) fn decl_error(&self, id: TypeDeclId, source: ResolveError) -> AnalysisError {
        let decl = self.ast.decl(id);
        let name = if decl.is_anonymous() {
            "<anonymous>".to_string()
        } else {
            decl.name.to_string()
        };
        AnalysisError::new(name, source)
    }

    // Scopes and hooks

    pub(crate) fn actions_for(&self, node: NodeRef) -> Option<Rc<dyn SymbolActions>> {
        self.provider.actions_for(&*self.ast, node)
    }

    /// Opens a block scope whose hooks come from `node`.
    pub(crate) fn push_block(&mut self, node: NodeRef) {
        let actions = self.actions_for(node);
        self.table.push_scope(ScopeKind::Block, actions);
    }

    pub(crate) fn pop_block(&mut self, node: NodeRef) -> Result<Rc<Scope>> {
        self.table.pop_scope().map_err(|err| self.node_error(node, err))
    }

    /// Pops scopes until `depth` remain.
    pub(crate) fn unwind_scopes(&mut self, depth: usize) -> Result<()> {
        while self.table.depth() > depth {
            self.table
                .pop_scope()
                .map_err(|err| AnalysisError::new("<scope>", err))?;
        }
        Ok(())
    }

    pub(crate) fn node_error(&self, node: NodeRef, source: ResolveError) -> AnalysisError {
        match node {
            NodeRef::Expr(id) => self.expr_error(id, source),
            NodeRef::Stmt(id) => self.stmt_error(id, source),
            NodeRef::TypeRef(id) => self.type_error(id, source),
            NodeRef::Decl(id) => self.decl_error(id, source),
        }
    }

    // Classes

    pub(crate) fn binary_of(&self, id: TypeDeclId) -> Result<String> {
        self.catalog
            .binary_name_of(id)
            .map(str::to_string)
            .ok_or_else(|| {
                let name = self.ast.decl(id).name.to_string();
                self.decl_error(id, ResolveError::class_not_found(name))
            })
    }

    pub(crate) fn class_def(&self, binary: &str) -> Result<Arc<ClassDef>, ResolveError> {
        Ok(self.env.class(binary)?)
    }

    /// The generic self type of the innermost enclosing class.
    pub(crate) fn current_class_type(&self) -> Result<SymbolType, ResolveError> {
        let binary = self
            .table
            .innermost_class()
            .ok_or(ResolveError::UnbalancedScope("no enclosing class"))?;
        Ok(self.class_def(binary)?.as_type())
    }

    pub(crate) fn current_super_type(&self) -> Result<SymbolType, ResolveError> {
        let binary = self
            .table
            .innermost_class()
            .ok_or(ResolveError::UnbalancedScope("no enclosing class"))?;
        let def = self.class_def(binary)?;
        Ok(def.super_class.clone().unwrap_or_else(SymbolType::object))
    }

    /// Expected type for a `return` in the innermost method or lambda.
    pub(crate) fn return_target(&self) -> Option<SymbolType> {
        self.frames.iter().rev().find_map(|frame| match frame {
            Frame::Method(ty) => Some(ty.clone()),
            Frame::Lambda { expected, .. } => Some(expected.clone()),
            Frame::Initializer => None,
        })
        .filter(|ty| !ty.is_void())
    }

    pub(crate) fn finish(self) -> AnalysisSummary {
        let mut counter = crate::SlotCounter::default();
        nova_hir::walk_unit(&mut counter, &*self.ast);
        AnalysisSummary {
            classes: self.env.local().len(),
            typed_expressions: counter.typed,
            untyped_expressions: counter.untyped,
            statements: counter.statements,
            resolved_calls: self.resolved_calls,
        }
    }
}
