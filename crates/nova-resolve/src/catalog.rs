//! Per-unit mapping from simple and qualified type names to binary names.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

use nova_core::{Name, PackageName, QualifiedName};
use nova_hir::{Ast, TypeDeclId};
use nova_types::{find_member_class, ClassLoadError, ClassSource, SymbolType, TypeEnv};

use crate::error::ResolveError;
use crate::import_map::ImportMap;
use crate::scope::SymbolTable;
use crate::symbol::{RefKind, Symbol};

const JAVA_LANG: &str = "java.lang";

/// Resolves type names visible in one compilation unit.
///
/// Lookups consult, in order: types declared in the unit (member types
/// included), single-type imports, the unit's package, on-demand imports
/// and finally `java.lang`. On-demand packages are listed the first time a
/// lookup reaches them.
#[derive(Debug, Default)]
pub struct TypeCatalog {
    package: PackageName,
    implicit_java_lang: bool,
    imports: ImportMap,
    declared: HashMap<String, String>,
    declared_binaries: HashSet<String>,
    decl_names: HashMap<TypeDeclId, String>,
    single: HashMap<String, String>,
    static_single: Vec<(String, Name)>,
    static_star: Vec<String>,
    local_counters: HashMap<String, u32>,
    star_listings: RefCell<HashMap<String, Vec<String>>>,
    star_types: RefCell<HashMap<String, Option<String>>>,
    cache: RefCell<HashMap<String, Option<String>>>,
}

impl TypeCatalog {
    pub fn new(implicit_java_lang: bool) -> Self {
        Self {
            implicit_java_lang,
            ..Self::default()
        }
    }

    /// Clears any previous unit and registers the package, imports and
    /// declared types of `ast`.
    pub fn register_compilation_unit(&mut self, env: &dyn ClassSource, ast: &Ast) {
        *self = Self::new(self.implicit_java_lang);
        self.package = ast.package_name();
        self.imports = ImportMap::from_imports(&ast.imports);

        let mut queue: VecDeque<(TypeDeclId, String)> = ast
            .types
            .iter()
            .map(|id| (*id, self.package.qualify(ast.decl(*id).name.as_str())))
            .collect();
        while let Some((id, binary)) = queue.pop_front() {
            let decl = ast.decl(id);
            for nested in decl.nested_types() {
                let nested_name = format!("{binary}${}", ast.decl(nested).name);
                queue.push_back((nested, nested_name));
            }
            self.declared
                .entry(decl.name.to_string())
                .or_insert_with(|| binary.clone());
            self.declared_binaries.insert(binary.clone());
            self.decl_names.insert(id, binary);
        }

        for import in &self.imports.type_single {
            let dotted = import.path.to_dotted();
            match load_canonical(&env, &dotted) {
                Some(binary) => {
                    self.single
                        .entry(import.imported.to_string())
                        .or_insert(binary);
                }
                None => {
                    tracing::debug!(target: "nova.resolve", import = %dotted, "unresolved single-type import");
                }
            }
        }

        for import in &self.imports.static_single {
            let dotted = import.ty.to_dotted();
            match load_canonical(&env, &dotted) {
                Some(owner) => self.static_single.push((owner, import.member.clone())),
                None => {
                    tracing::debug!(target: "nova.resolve", import = %dotted, member = %import.member, "unresolved static import");
                }
            }
        }

        for import in &self.imports.static_star {
            let dotted = import.ty.to_dotted();
            match load_canonical(&env, &dotted) {
                Some(owner) => self.static_star.push(owner),
                None => {
                    tracing::debug!(target: "nova.resolve", import = %dotted, "unresolved static on-demand import");
                }
            }
        }

        tracing::debug!(
            target: "nova.resolve",
            package = %self.package,
            declared = self.decl_names.len(),
            imports = self.single.len(),
            on_demand = self.imports.type_star.len(),
            "registered compilation unit"
        );
    }

    pub fn package(&self) -> &PackageName {
        &self.package
    }

    pub fn imports(&self) -> &ImportMap {
        &self.imports
    }

    /// Binary name of a declaration in the unit, including local and
    /// anonymous classes registered so far.
    pub fn binary_name_of(&self, decl: TypeDeclId) -> Option<&str> {
        self.decl_names.get(&decl).map(String::as_str)
    }

    pub fn is_declared(&self, binary_name: &str) -> bool {
        self.declared_binaries.contains(binary_name)
    }

    /// Assigns the next binary name for a local (`Outer$1Local`) or
    /// anonymous (`Outer$1`) class inside `enclosing`.
    pub fn register_local_class(
        &mut self,
        decl: TypeDeclId,
        enclosing: &str,
        simple: Option<&str>,
    ) -> String {
        let counter = self.local_counters.entry(enclosing.to_string()).or_insert(0);
        *counter += 1;
        let binary = format!("{enclosing}${counter}{}", simple.unwrap_or_default());
        self.declared_binaries.insert(binary.clone());
        self.decl_names.insert(decl, binary.clone());
        binary
    }

    /// Names the member types of a registered local or anonymous class
    /// (`Outer$1Local$Inner`), recursively.
    pub fn register_nested_types(&mut self, ast: &Ast, outer: TypeDeclId) {
        let Some(outer_binary) = self.decl_names.get(&outer).cloned() else {
            return;
        };
        for nested in ast.decl(outer).nested_types() {
            let binary = format!("{outer_binary}${}", ast.decl(nested).name);
            self.declared_binaries.insert(binary.clone());
            self.decl_names.insert(nested, binary);
            self.register_nested_types(ast, nested);
        }
    }

    /// Binds the declared and single-imported simple names as type symbols
    /// in the innermost scope of `table`.
    pub fn populate(&self, table: &mut SymbolTable) -> Result<(), ResolveError> {
        let mut declared: Vec<(&String, &String)> = self.declared.iter().collect();
        declared.sort();
        let mut imported: Vec<(&String, &String)> = self
            .single
            .iter()
            .filter(|(simple, _)| !self.declared.contains_key(*simple))
            .collect();
        imported.sort();

        for (simple, binary) in declared.into_iter().chain(imported) {
            let ty = SymbolType::class(binary.as_str());
            table.push_symbol(Symbol::new(simple.as_str(), RefKind::Type, ty))?;
        }
        Ok(())
    }

    /// Binary name of the type `simple` refers to in this unit.
    pub fn resolve(&self, env: &dyn ClassSource, simple: &str) -> Option<String> {
        if let Some(hit) = self.cache.borrow().get(simple) {
            return hit.clone();
        }
        let resolved = self.resolve_uncached(env, simple);
        tracing::trace!(target: "nova.resolve", name = simple, resolved = ?resolved, "catalog lookup");
        self.cache
            .borrow_mut()
            .insert(simple.to_string(), resolved.clone());
        resolved
    }

    fn resolve_uncached(&self, env: &dyn ClassSource, simple: &str) -> Option<String> {
        if let Some(binary) = self.declared.get(simple).or_else(|| self.single.get(simple)) {
            return Some(binary.clone());
        }

        let same_package = self.package.qualify(simple);
        if env.class_exists(&same_package) {
            return Some(same_package);
        }

        for import in &self.imports.type_star {
            let prefix = import.path.to_dotted();
            if self.package_listing(env, &prefix).iter().any(|c| c == simple) {
                return Some(format!("{prefix}.{simple}"));
            }
            if let Some(owner) = self.star_type(env, &prefix) {
                if let Some(member) = self.member_class(env, &owner, simple) {
                    return Some(member);
                }
            }
        }

        if self.implicit_java_lang {
            let lang = format!("{JAVA_LANG}.{simple}");
            if env.class_exists(&lang) {
                return Some(lang);
            }
        }
        None
    }

    fn package_listing(&self, env: &dyn ClassSource, package: &str) -> Vec<String> {
        self.star_listings
            .borrow_mut()
            .entry(package.to_string())
            .or_insert_with(|| {
                tracing::trace!(target: "nova.resolve", package, "listing on-demand import");
                env.package_classes(package)
            })
            .clone()
    }

    fn star_type(&self, env: &dyn ClassSource, dotted: &str) -> Option<String> {
        if let Some(hit) = self.star_types.borrow().get(dotted) {
            return hit.clone();
        }
        let resolved = load_canonical(&env, dotted);
        self.star_types
            .borrow_mut()
            .insert(dotted.to_string(), resolved.clone());
        resolved
    }

    /// Binary name of member class `simple` of `owner`, declared or
    /// inherited.
    pub fn member_class(&self, env: &dyn ClassSource, owner: &str, simple: &str) -> Option<String> {
        let direct = format!("{owner}${simple}");
        if self.declared_binaries.contains(&direct) || env.class_exists(&direct) {
            return Some(direct);
        }
        find_member_class(&env, owner, simple)
    }

    /// Resolves a possibly qualified type name (`Map.Entry`,
    /// `java.util.Map.Entry`, `Outer.Inner.Deeper`).
    ///
    /// The first segment is tried as a visible type whose member types the
    /// remaining segments name. Failing that, the whole name is taken as
    /// canonical.
    pub fn resolve_qualified(&self, env: &dyn ClassSource, name: &QualifiedName) -> Option<String> {
        let (first, rest) = name.segments().split_first()?;
        if let Some(head) = self.resolve(env, first.as_str()) {
            let mut current = head;
            for segment in rest {
                current = self.member_class(env, &current, segment.as_str())?;
            }
            return Some(current);
        }
        if rest.is_empty() {
            return None;
        }
        load_canonical(&env, &name.to_dotted())
    }

    /// Classes whose static member `name` is visible through static
    /// imports; single imports first.
    pub fn static_import_owners(&self, name: &str) -> Vec<String> {
        let mut out: Vec<String> = self
            .static_single
            .iter()
            .filter(|(_, member)| member == name)
            .map(|(owner, _)| owner.clone())
            .collect();
        for owner in &self.static_star {
            if !out.contains(owner) {
                out.push(owner.clone());
            }
        }
        out
    }
}

/// Loads `dotted` as a canonical class name.
///
/// When the class cannot be found, or the class file found declares a
/// different class, the name is retried with its trailing segments taken
/// as nested classes: `a.b.C.D` becomes `a.b.C$D`, then `a.b$C$D`.
pub fn load_canonical(env: &dyn TypeEnv, dotted: &str) -> Option<String> {
    let segments: Vec<&str> = dotted.split('.').filter(|s| !s.is_empty()).collect();
    for split in (1..=segments.len()).rev() {
        let mut binary = segments[..split].join(".");
        for nested in &segments[split..] {
            binary.push('$');
            binary.push_str(nested);
        }
        match env.class(&binary) {
            Ok(def) => return Some(def.name.clone()),
            Err(err @ (ClassLoadError::NotFound(_) | ClassLoadError::IncompatibleClassChange { .. })) => {
                tracing::trace!(target: "nova.resolve", candidate = %binary, error = %err, "retrying as nested class");
            }
            Err(err) => {
                tracing::debug!(target: "nova.resolve", candidate = %binary, error = %err, "class failed to load");
                return None;
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_hir::{AstBuilder, TypeDecl};
    use nova_types::TypeStore;
    use pretty_assertions::assert_eq;

    fn unit(imports: &[&str]) -> Ast {
        let mut b = AstBuilder::new();
        b.package("p");
        for import in imports {
            b.import(import);
        }
        let mut outer = TypeDecl::class("A");
        let mut inner = TypeDecl::class("B");
        b.nested(&mut inner, TypeDecl::class("C"));
        b.nested(&mut outer, inner);
        b.top_level(outer);
        b.finish()
    }

    #[test]
    fn declared_types_shadow_imports() {
        let env = TypeStore::with_minimal_jdk();
        let ast = unit(&["java.util.List", "java.util.*"]);
        let mut catalog = TypeCatalog::new(true);
        catalog.register_compilation_unit(&env, &ast);

        assert_eq!(catalog.resolve(&env, "A").as_deref(), Some("p.A"));
        assert_eq!(catalog.resolve(&env, "B").as_deref(), Some("p.A$B"));
        assert_eq!(catalog.resolve(&env, "C").as_deref(), Some("p.A$B$C"));
        assert_eq!(catalog.resolve(&env, "List").as_deref(), Some("java.util.List"));
        assert_eq!(catalog.resolve(&env, "HashMap").as_deref(), Some("java.util.HashMap"));
        assert_eq!(catalog.resolve(&env, "String").as_deref(), Some("java.lang.String"));
        assert_eq!(catalog.resolve(&env, "Nope"), None);
    }

    #[test]
    fn qualified_names_walk_member_classes() {
        let env = TypeStore::with_minimal_jdk();
        let ast = unit(&["java.util.Map"]);
        let mut catalog = TypeCatalog::new(true);
        catalog.register_compilation_unit(&env, &ast);

        let resolve = |dotted: &str| catalog.resolve_qualified(&env, &QualifiedName::from_dotted(dotted));
        assert_eq!(resolve("Map.Entry").as_deref(), Some("java.util.Map$Entry"));
        assert_eq!(resolve("java.util.Map.Entry").as_deref(), Some("java.util.Map$Entry"));
        assert_eq!(resolve("A.B.C").as_deref(), Some("p.A$B$C"));
        assert_eq!(resolve("java.util.Nope"), None);
    }

    #[test]
    fn without_implicit_java_lang() {
        let env = TypeStore::with_minimal_jdk();
        let ast = unit(&[]);
        let mut catalog = TypeCatalog::new(false);
        catalog.register_compilation_unit(&env, &ast);
        assert_eq!(catalog.resolve(&env, "String"), None);
    }

    #[test]
    fn on_demand_type_imports_expose_member_classes() {
        let env = TypeStore::with_minimal_jdk();
        let ast = unit(&["java.util.Map.*", "static java.lang.Math.*", "static java.lang.Integer.MAX_VALUE"]);
        let mut catalog = TypeCatalog::new(true);
        catalog.register_compilation_unit(&env, &ast);

        assert_eq!(catalog.resolve(&env, "Entry").as_deref(), Some("java.util.Map$Entry"));
        assert_eq!(
            catalog.static_import_owners("MAX_VALUE"),
            vec!["java.lang.Integer".to_string(), "java.lang.Math".to_string()]
        );
        assert_eq!(catalog.static_import_owners("max"), vec!["java.lang.Math".to_string()]);
    }

    #[test]
    fn local_classes_are_numbered_per_enclosing_class() {
        let mut b = AstBuilder::new();
        let first = b.decl(TypeDecl::anonymous());

        let mut local = TypeDecl::class("Local");
        let inner = b.nested(&mut local, TypeDecl::class("Inner"));
        let second = b.decl(local);
        let ast = b.finish();
        let mut catalog = TypeCatalog::new(true);

        assert_eq!(catalog.register_local_class(first, "p.A", None), "p.A$1");
        assert_eq!(catalog.register_local_class(second, "p.A", Some("Local")), "p.A$2Local");
        assert_eq!(catalog.binary_name_of(second), Some("p.A$2Local"));
        assert!(catalog.is_declared("p.A$1"));

        catalog.register_nested_types(&ast, second);
        assert_eq!(catalog.binary_name_of(inner), Some("p.A$2Local$Inner"));
    }
}
