//! Name resolution for Java compilation units.
//!
//! [`TypeCatalog`] maps the type names visible in a unit to binary names;
//! [`SymbolTable`] tracks lexically scoped bindings and reports their
//! lifecycle to pluggable [`SymbolActions`].

#![forbid(unsafe_code)]

mod catalog;
mod error;
mod import_map;
mod scope;
mod symbol;

pub use crate::catalog::{load_canonical, TypeCatalog};
pub use crate::error::ResolveError;
pub use crate::import_map::{
    ImportMap, StaticSingleImport, StaticStarImport, TypeSingleImport, TypeStarImport,
};
pub use crate::scope::{Scope, ScopeKind, SymbolTable};
pub use crate::symbol::{ActionProvider, NoActions, RefKind, Symbol, SymbolActions, SymbolEvent};
