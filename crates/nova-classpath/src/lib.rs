//! Lazily built index over an ordered classpath.
//!
//! Entries are scanned one at a time, and only when a lookup misses in what
//! has been indexed so far. A workspace that only ever touches `java.lang`
//! and its own output directory never pays for walking the rest of the
//! classpath.

mod trie;

use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use nova_core::{TypeIndex, TypeName};

use crate::trie::PathTrie;

#[derive(Debug, Error)]
pub enum ClasspathError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("zip error in {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

impl ClasspathError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        ClasspathError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn zip(path: &Path, source: zip::result::ZipError) -> Self {
        ClasspathError::Zip {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T, E = ClasspathError> = std::result::Result<T, E>;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClasspathEntry {
    ClassDir(PathBuf),
    Jar(PathBuf),
}

impl ClasspathEntry {
    /// Classifies `path` by extension: `.jar`/`.zip` archives, anything else
    /// is treated as a class directory.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_archive = path
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| ext.eq_ignore_ascii_case("jar") || ext.eq_ignore_ascii_case("zip"));
        if is_archive {
            ClasspathEntry::Jar(path)
        } else {
            ClasspathEntry::ClassDir(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ClasspathEntry::ClassDir(p) | ClasspathEntry::Jar(p) => p,
        }
    }

    /// Relative paths (`/`-separated) of every file in this entry.
    fn list_files(&self) -> Result<Vec<String>> {
        match self {
            ClasspathEntry::ClassDir(dir) => list_class_dir(dir),
            ClasspathEntry::Jar(path) => list_jar(path),
        }
    }

    fn read(&self, relative: &str) -> Result<Vec<u8>> {
        match self {
            ClasspathEntry::ClassDir(dir) => {
                let path = dir.join(relative);
                std::fs::read(&path).map_err(|err| ClasspathError::io(&path, err))
            }
            ClasspathEntry::Jar(path) => {
                let file = std::fs::File::open(path).map_err(|err| ClasspathError::io(path, err))?;
                let mut archive =
                    zip::ZipArchive::new(file).map_err(|err| ClasspathError::zip(path, err))?;
                let mut entry = archive
                    .by_name(relative)
                    .map_err(|err| ClasspathError::zip(path, err))?;
                let mut bytes = Vec::with_capacity(entry.size() as usize);
                entry
                    .read_to_end(&mut bytes)
                    .map_err(|err| ClasspathError::io(path, err))?;
                Ok(bytes)
            }
        }
    }
}

/// Where a resource was found: the owning entry and the entry-relative path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceLocation {
    pub entry: ClasspathEntry,
    pub path: String,
}

#[derive(Debug, Default)]
struct IndexState {
    trie: PathTrie,
    /// Entries `[0, next_entry)` have been scanned.
    next_entry: usize,
}

/// Ordered classpath with an optional parent consulted first.
#[derive(Debug)]
pub struct ClasspathIndex {
    entries: Vec<ClasspathEntry>,
    parent: Option<Arc<ClasspathIndex>>,
    state: Mutex<IndexState>,
}

impl ClasspathIndex {
    pub fn new(entries: Vec<ClasspathEntry>) -> Self {
        Self {
            entries,
            parent: None,
            state: Mutex::new(IndexState::default()),
        }
    }

    /// Resources are looked up in `parent` before this index's own entries.
    #[must_use]
    pub fn with_parent(mut self, parent: Arc<ClasspathIndex>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn entries(&self) -> &[ClasspathEntry] {
        &self.entries
    }

    /// Number of this index's own entries scanned so far.
    pub fn indexed_entries(&self) -> usize {
        self.state.lock().next_entry
    }

    /// Number of resources recorded by this index's own entries.
    pub fn len(&self) -> usize {
        self.state.lock().trie.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finds the entry owning `path` (e.g. `java/util/List.class`).
    ///
    /// Entries are scanned in order until one of them contains the resource,
    /// so a hit costs at most as much indexing as the position of its owner.
    pub fn find_resource(&self, path: &str) -> Result<Option<ResourceLocation>> {
        if let Some(parent) = &self.parent {
            if let Some(found) = parent.find_resource(path)? {
                return Ok(Some(found));
            }
        }

        let path = normalize_path(path);
        let mut state = self.state.lock();
        loop {
            if let Some(owner) = state.trie.owner(&path) {
                return Ok(Some(ResourceLocation {
                    entry: self.entries[owner].clone(),
                    path,
                }));
            }
            if !self.index_next(&mut state)? {
                return Ok(None);
            }
        }
    }

    /// Names of the resources directly inside `package` (`java/util` or
    /// `java.util`), sorted and deduplicated across the parent chain.
    ///
    /// Any entry may contribute to a package, so this scans every remaining
    /// entry.
    pub fn list_package_contents(&self, package: &str) -> Result<Vec<String>> {
        let mut out = match &self.parent {
            Some(parent) => parent.list_package_contents(package)?,
            None => Vec::new(),
        };

        let dir = normalize_path(&package.replace('.', "/"));
        let mut state = self.state.lock();
        while self.index_next(&mut state)? {}
        out.extend(state.trie.files_in(&dir));
        drop(state);

        out.sort();
        out.dedup();
        Ok(out)
    }

    pub fn read_resource(&self, location: &ResourceLocation) -> Result<Vec<u8>> {
        location.entry.read(&location.path)
    }

    /// Reads the class file for `binary_name` (`java.util.Map$Entry`), if any
    /// entry has it.
    pub fn read_class(&self, binary_name: &str) -> Result<Option<Vec<u8>>> {
        let path = TypeName::new(binary_name).to_class_file_path();
        match self.find_resource(&path)? {
            Some(location) => self.read_resource(&location).map(Some),
            None => Ok(None),
        }
    }

    /// Scans the next unscanned entry. Returns `false` once every entry has
    /// been indexed.
    fn index_next(&self, state: &mut IndexState) -> Result<bool> {
        let idx = state.next_entry;
        let Some(entry) = self.entries.get(idx) else {
            return Ok(false);
        };
        // Marked before listing so a failing entry is not retried.
        state.next_entry += 1;

        if !entry.path().exists() {
            tracing::warn!(
                target: "nova.classpath",
                path = %entry.path().display(),
                "classpath entry does not exist; skipping"
            );
            return Ok(true);
        }

        let files = entry.list_files()?;
        let mut inserted = 0usize;
        for file in &files {
            if state.trie.insert(file, idx) {
                inserted += 1;
            }
        }
        tracing::debug!(
            target: "nova.classpath",
            path = %entry.path().display(),
            files = files.len(),
            inserted,
            "indexed classpath entry"
        );
        Ok(true)
    }
}

impl TypeIndex for ClasspathIndex {
    fn class_exists(&self, binary_name: &str) -> bool {
        let path = TypeName::new(binary_name).to_class_file_path();
        match self.find_resource(&path) {
            Ok(found) => found.is_some(),
            Err(err) => {
                tracing::warn!(target: "nova.classpath", %binary_name, error = %err, "class lookup failed");
                false
            }
        }
    }

    fn package_classes(&self, package: &str) -> Vec<String> {
        match self.list_package_contents(package) {
            Ok(files) => files
                .iter()
                .filter_map(|file| file.strip_suffix(".class"))
                .filter(|name| !is_ignored_class(name))
                .map(str::to_string)
                .collect(),
            Err(err) => {
                tracing::warn!(target: "nova.classpath", %package, error = %err, "package listing failed");
                Vec::new()
            }
        }
    }

    fn package_exists(&self, package: &str) -> bool {
        if self
            .parent
            .as_ref()
            .is_some_and(|parent| parent.package_exists(package))
        {
            return true;
        }
        let dir = normalize_path(&package.replace('.', "/"));
        let mut state = self.state.lock();
        loop {
            if state.trie.contains_dir(&dir) {
                return true;
            }
            match self.index_next(&mut state) {
                Ok(true) => continue,
                Ok(false) => return false,
                Err(err) => {
                    tracing::warn!(target: "nova.classpath", %package, error = %err, "package probe failed");
                }
            }
        }
    }
}

fn normalize_path(path: &str) -> String {
    path.replace('\\', "/").trim_matches('/').to_string()
}

fn is_ignored_class(simple: &str) -> bool {
    simple == "module-info" || simple == "package-info"
}

fn list_class_dir(dir: &Path) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for entry in walkdir::WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(dir).to_path_buf();
            ClasspathError::Io {
                path,
                source: err.into(),
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(dir) else {
            continue;
        };
        let rel: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        out.push(rel.join("/"));
    }
    Ok(out)
}

fn list_jar(path: &Path) -> Result<Vec<String>> {
    let file = std::fs::File::open(path).map_err(|err| ClasspathError::io(path, err))?;
    let archive = zip::ZipArchive::new(file).map_err(|err| ClasspathError::zip(path, err))?;
    Ok(archive
        .file_names()
        .filter(|name| !name.ends_with('/'))
        .map(str::to_string)
        .collect())
}
