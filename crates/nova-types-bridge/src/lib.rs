//! Class-file backed [`TypeEnv`].
//!
//! Classes are read lazily from a [`ClasspathIndex`], converted into
//! [`ClassDef`]s once and cached for the lifetime of the environment.

#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use nova_classfile::{access, ClassFile, ClassMember};
use nova_classpath::ClasspathIndex;
use nova_core::TypeIndex;
use nova_types::{
    field_def, internal_to_binary, method_def, parse_class_header, ClassDef, ClassKind,
    ClassLoadError, MethodDef, Nesting, SymbolType, TypeEnv, TypeVarScope,
};

/// Reflection over the class files reachable through a classpath index.
#[derive(Debug)]
pub struct ClasspathTypeEnv {
    index: Arc<ClasspathIndex>,
    cache: Mutex<HashMap<String, Arc<ClassDef>>>,
}

impl ClasspathTypeEnv {
    pub fn new(index: Arc<ClasspathIndex>) -> Self {
        Self {
            index,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn index(&self) -> &Arc<ClasspathIndex> {
        &self.index
    }

    /// Number of classes converted so far.
    pub fn cached_classes(&self) -> usize {
        self.cache.lock().len()
    }

    fn load(&self, binary_name: &str) -> Result<ClassDef, ClassLoadError> {
        let bytes = self
            .index
            .read_class(binary_name)
            .map_err(|err| ClassLoadError::Malformed {
                name: binary_name.to_string(),
                message: err.to_string(),
            })?
            .ok_or_else(|| ClassLoadError::NotFound(binary_name.to_string()))?;

        let class = ClassFile::parse(&bytes).map_err(|err| ClassLoadError::Malformed {
            name: binary_name.to_string(),
            message: err.to_string(),
        })?;

        let declared = internal_to_binary(&class.this_class);
        if declared != binary_name {
            return Err(ClassLoadError::IncompatibleClassChange {
                requested: binary_name.to_string(),
                found: declared,
            });
        }

        class_def_from_classfile(&class).map_err(|err| ClassLoadError::Malformed {
            name: binary_name.to_string(),
            message: err.to_string(),
        })
    }
}

impl TypeEnv for ClasspathTypeEnv {
    fn class(&self, binary_name: &str) -> Result<Arc<ClassDef>, ClassLoadError> {
        if let Some(def) = self.cache.lock().get(binary_name) {
            return Ok(def.clone());
        }

        let def = Arc::new(self.load(binary_name)?);
        tracing::trace!(target: "nova.types", class = binary_name, "loaded class file");
        Ok(self
            .cache
            .lock()
            .entry(binary_name.to_string())
            .or_insert(def)
            .clone())
    }
}

impl TypeIndex for ClasspathTypeEnv {
    fn class_exists(&self, binary_name: &str) -> bool {
        self.index.class_exists(binary_name)
    }

    fn package_classes(&self, package: &str) -> Vec<String> {
        self.index.package_classes(package)
    }

    fn package_exists(&self, package: &str) -> bool {
        self.index.package_exists(package)
    }
}

fn class_kind(flags: u16) -> ClassKind {
    if flags & access::ACC_ANNOTATION != 0 {
        ClassKind::Annotation
    } else if flags & access::ACC_INTERFACE != 0 {
        ClassKind::Interface
    } else if flags & access::ACC_ENUM != 0 {
        ClassKind::Enum
    } else {
        ClassKind::Class
    }
}

fn nesting(class: &ClassFile) -> (Nesting, Option<String>) {
    let Some(info) = class.own_inner_class_info() else {
        return (Nesting::TopLevel, None);
    };
    match (&info.outer_class, &info.inner_name) {
        (Some(outer), Some(_)) => (
            Nesting::Member {
                is_static: info.access_flags & access::ACC_STATIC != 0,
            },
            Some(internal_to_binary(outer)),
        ),
        (_, name) => {
            // Local and anonymous classes have no outer entry; their
            // enclosing class is the binary-name prefix.
            let binary = internal_to_binary(&class.this_class);
            let enclosing = binary.rsplit_once('$').map(|(outer, _)| outer.to_string());
            let kind = if name.is_some() {
                Nesting::Local
            } else {
                Nesting::Anonymous
            };
            (kind, enclosing)
        }
    }
}

/// Converts a parsed class file into a [`ClassDef`].
///
/// Generic signatures are preferred over erased descriptors; a class
/// signature that fails to parse falls back to the erased header.
pub fn class_def_from_classfile(class: &ClassFile) -> nova_classfile::Result<ClassDef> {
    let name = internal_to_binary(&class.this_class);
    let kind = class_kind(class.access_flags);
    let mut def = ClassDef::new(name.clone(), kind);
    def.is_abstract = class.has_flag(access::ACC_ABSTRACT);

    let header = class.signature.as_deref().and_then(|sig| match parse_class_header(sig) {
        Ok(header) => Some(header),
        Err(err) => {
            tracing::debug!(target: "nova.types", class = %name, error = %err, "ignoring class signature");
            None
        }
    });

    let scope = match header {
        Some(header) => {
            def.type_params = header.type_params;
            def.super_class = Some(header.super_class);
            def.interfaces = header.interfaces;
            header.scope
        }
        None => {
            def.super_class = class
                .super_class
                .as_deref()
                .map(|sc| SymbolType::class(internal_to_binary(sc)));
            def.interfaces = class
                .interfaces
                .iter()
                .map(|i| SymbolType::class(internal_to_binary(i)))
                .collect();
            TypeVarScope::new()
        }
    };
    if def.is_interface() || class.super_class.is_none() {
        def.super_class = None;
    }

    let (nesting, enclosing) = nesting(class);
    def.nesting = nesting;
    def.enclosing = enclosing;
    def.member_classes = class.member_classes().map(internal_to_binary).collect();

    for field in &class.fields {
        if field.has_flag(access::ACC_SYNTHETIC) {
            continue;
        }
        def.fields.push(field_def(
            &field.name,
            field.access_flags,
            &field.descriptor,
            field.signature.as_deref(),
            &scope,
        )?);
    }

    for method in &class.methods {
        match method.name.as_str() {
            "<clinit>" => {}
            "<init>" => def.constructors.push(convert_method(method, &scope)?),
            _ if method.has_flag(access::ACC_SYNTHETIC) && !method.has_flag(access::ACC_BRIDGE) => {}
            _ => def.methods.push(convert_method(method, &scope)?),
        }
    }

    Ok(def)
}

fn convert_method(method: &ClassMember, scope: &TypeVarScope) -> nova_classfile::Result<MethodDef> {
    method_def(
        &method.name,
        method.access_flags,
        &method.descriptor,
        method.signature.as_deref(),
        scope,
    )
}
