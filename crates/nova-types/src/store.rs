use std::collections::HashMap;
use std::sync::Arc;

use nova_core::TypeIndex;

use crate::env::{ClassDef, ClassLoadError, TypeEnv};

/// In-memory class table keyed by binary name.
///
/// Used for classes declared in source and for the built-in JDK model.
#[derive(Clone, Debug, Default)]
pub struct TypeStore {
    classes: HashMap<String, Arc<ClassDef>>,
}

impl TypeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with the commonly used parts of `java.lang`,
    /// `java.util`, `java.util.function` and `java.util.stream`.
    pub fn with_minimal_jdk() -> Self {
        let mut store = Self::new();
        for class in crate::jdk::minimal_jdk() {
            store.insert(class);
        }
        store
    }

    /// Adds or replaces a class, returning the previous definition.
    pub fn insert(&mut self, class: ClassDef) -> Option<Arc<ClassDef>> {
        self.classes.insert(class.name.clone(), Arc::new(class))
    }

    pub fn get(&self, binary_name: &str) -> Option<&Arc<ClassDef>> {
        self.classes.get(binary_name)
    }

    pub fn contains(&self, binary_name: &str) -> bool {
        self.classes.contains_key(binary_name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Binary names in sorted order.
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, binary_name: &str) -> Result<Arc<ClassDef>, ClassLoadError> {
        self.classes
            .get(binary_name)
            .cloned()
            .ok_or_else(|| ClassLoadError::NotFound(binary_name.to_string()))
    }
}

impl TypeIndex for TypeStore {
    fn class_exists(&self, binary_name: &str) -> bool {
        self.contains(binary_name)
    }

    fn package_classes(&self, package: &str) -> Vec<String> {
        let mut out: Vec<String> = self
            .classes
            .keys()
            .filter_map(|name| {
                let (pkg, simple) = name.rsplit_once('.').unwrap_or(("", name.as_str()));
                (pkg == package).then(|| simple.to_string())
            })
            .collect();
        out.sort();
        out
    }
}
