use std::sync::Arc;

use thiserror::Error;

use nova_core::TypeIndex;

use crate::symbol_type::{SymbolType, TypeBindings};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassLoadError {
    #[error("class not found: {0}")]
    NotFound(String),
    /// The class file found for `requested` declares a different class.
    /// Typically `a.B.C` was looked up where `a.B$C` was meant.
    #[error("incompatible class change: requested {requested}, found {found}")]
    IncompatibleClassChange { requested: String, found: String },
    #[error("malformed class {name}: {message}")]
    Malformed { name: String, message: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Nesting {
    TopLevel,
    Member { is_static: bool },
    Local,
    Anonymous,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParamDef {
    pub name: String,
    /// Never empty; defaults to `Object`.
    pub bounds: Vec<SymbolType>,
}

impl TypeParamDef {
    pub fn new(name: impl Into<String>, bounds: Vec<SymbolType>) -> Self {
        let bounds = if bounds.is_empty() {
            vec![SymbolType::object()]
        } else {
            bounds
        };
        Self {
            name: name.into(),
            bounds,
        }
    }

    pub fn as_type(&self) -> SymbolType {
        SymbolType::type_variable(self.name.clone(), self.bounds.clone())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: SymbolType,
    pub is_static: bool,
}

/// A method or constructor. Constructors are named `<init>` and return
/// `void`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDef {
    pub name: String,
    pub type_params: Vec<TypeParamDef>,
    pub params: Vec<SymbolType>,
    pub return_type: SymbolType,
    pub is_static: bool,
    pub is_varargs: bool,
    pub is_abstract: bool,
    pub is_bridge: bool,
    pub is_synthetic: bool,
}

impl MethodDef {
    pub fn new(name: impl Into<String>, params: Vec<SymbolType>, return_type: SymbolType) -> Self {
        Self {
            name: name.into(),
            type_params: Vec::new(),
            params,
            return_type,
            is_static: false,
            is_varargs: false,
            is_abstract: false,
            is_bridge: false,
            is_synthetic: false,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Number of parameters before the trailing varargs array, if any.
    pub fn fixed_arity(&self) -> usize {
        if self.is_varargs {
            self.params.len().saturating_sub(1)
        } else {
            self.params.len()
        }
    }

    /// Element type of the trailing varargs parameter.
    pub fn varargs_component(&self) -> Option<SymbolType> {
        if !self.is_varargs {
            return None;
        }
        self.params.last().and_then(SymbolType::component_type)
    }

    /// Applies `bindings` to the parameter and return types.
    #[must_use]
    pub fn substituted(&self, bindings: &TypeBindings) -> MethodDef {
        MethodDef {
            params: self
                .params
                .iter()
                .map(|p| p.refactor(bindings, false))
                .collect(),
            return_type: self.return_type.refactor(bindings, false),
            ..self.clone()
        }
    }

    /// Parameter lists equal after erasure.
    pub fn same_erased_params(&self, other: &MethodDef) -> bool {
        self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| a.erasure() == b.erasure())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDef {
    /// Binary name (`java.util.Map$Entry`).
    pub name: String,
    pub kind: ClassKind,
    pub nesting: Nesting,
    /// Binary name of the lexically enclosing class for nested classes.
    pub enclosing: Option<String>,
    pub type_params: Vec<TypeParamDef>,
    pub super_class: Option<SymbolType>,
    pub interfaces: Vec<SymbolType>,
    pub fields: Vec<FieldDef>,
    pub constructors: Vec<MethodDef>,
    pub methods: Vec<MethodDef>,
    /// Binary names of member classes.
    pub member_classes: Vec<String>,
    pub is_abstract: bool,
}

impl ClassDef {
    /// An empty top-level class extending `Object`.
    pub fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        let name = name.into();
        let super_class = (kind != ClassKind::Interface && name != crate::OBJECT)
            .then(SymbolType::object);
        Self {
            name,
            kind,
            nesting: Nesting::TopLevel,
            enclosing: None,
            type_params: Vec::new(),
            super_class,
            interfaces: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            member_classes: Vec::new(),
            is_abstract: kind == ClassKind::Interface,
        }
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, ClassKind::Interface | ClassKind::Annotation)
    }

    pub fn simple_name(&self) -> &str {
        let tail = self.name.rsplit('.').next().unwrap_or(&self.name);
        tail.rsplit('$').next().unwrap_or(tail)
    }

    /// The generic self type (`Box<T>`), or the plain class for non-generic
    /// classes.
    pub fn as_type(&self) -> SymbolType {
        if self.type_params.is_empty() {
            SymbolType::class(self.name.clone())
        } else {
            SymbolType::parameterized(
                self.name.clone(),
                self.type_params.iter().map(TypeParamDef::as_type).collect(),
            )
        }
    }

    /// Direct supertypes: superclass first, then interfaces. Interfaces
    /// implicitly report `Object`.
    pub fn direct_supertypes(&self) -> Vec<SymbolType> {
        let mut out = Vec::with_capacity(self.interfaces.len() + 1);
        match &self.super_class {
            Some(sc) => out.push(sc.clone()),
            None if self.is_interface() => out.push(SymbolType::object()),
            None => {}
        }
        out.extend(self.interfaces.iter().cloned());
        out
    }

    /// Bindings of this class's type parameters for the instantiation `ty`.
    /// Raw or mismatched instantiations bind nothing.
    pub fn bindings_for(&self, ty: &SymbolType) -> TypeBindings {
        let mut out = TypeBindings::new();
        if let Some(args) = ty.type_args() {
            if args.len() == self.type_params.len() {
                for (param, arg) in self.type_params.iter().zip(args) {
                    out.insert(param.name.clone(), arg.clone());
                }
            }
        }
        out
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn member_class(&self, simple: &str) -> Option<&str> {
        self.member_classes
            .iter()
            .map(String::as_str)
            .find(|nested| nested.rsplit('$').next() == Some(simple))
    }
}

/// Reflective access to classes by binary name.
pub trait TypeEnv {
    fn class(&self, binary_name: &str) -> Result<Arc<ClassDef>, ClassLoadError>;
}

impl<T: TypeEnv + ?Sized> TypeEnv for &T {
    fn class(&self, binary_name: &str) -> Result<Arc<ClassDef>, ClassLoadError> {
        (**self).class(binary_name)
    }
}

impl<T: TypeEnv + ?Sized> TypeEnv for Arc<T> {
    fn class(&self, binary_name: &str) -> Result<Arc<ClassDef>, ClassLoadError> {
        (**self).class(binary_name)
    }
}

/// A backend answering both reflective and name-level queries.
pub trait ClassSource: TypeEnv + TypeIndex {}

impl<T: TypeEnv + TypeIndex + ?Sized> ClassSource for T {}

/// Consults each layer in order; the first layer that knows a class wins.
#[derive(Default)]
pub struct LayeredEnv {
    layers: Vec<Box<dyn ClassSource + Send + Sync>>,
}

impl LayeredEnv {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_layer(mut self, layer: impl ClassSource + Send + Sync + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl std::fmt::Debug for LayeredEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayeredEnv")
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl TypeEnv for LayeredEnv {
    fn class(&self, binary_name: &str) -> Result<Arc<ClassDef>, ClassLoadError> {
        for layer in &self.layers {
            match layer.class(binary_name) {
                Err(ClassLoadError::NotFound(_)) => continue,
                other => return other,
            }
        }
        Err(ClassLoadError::NotFound(binary_name.to_string()))
    }
}

impl TypeIndex for LayeredEnv {
    fn class_exists(&self, binary_name: &str) -> bool {
        self.layers.iter().any(|layer| layer.class_exists(binary_name))
    }

    fn package_classes(&self, package: &str) -> Vec<String> {
        let mut out: Vec<String> = self
            .layers
            .iter()
            .flat_map(|layer| layer.package_classes(package))
            .collect();
        out.sort();
        out.dedup();
        out
    }

    fn package_exists(&self, package: &str) -> bool {
        self.layers.iter().any(|layer| layer.package_exists(package))
    }
}
