//! Java type model used by Nova's semantic analysis.
//!
//! [`SymbolType`] describes a type as it appears in source: an erased binary
//! name plus type arguments, array dimensions, bounds and type-variable
//! identity. Class members come from a [`TypeEnv`], which is backed either by
//! class files (`nova-types-bridge`) or by the in-memory [`TypeStore`].

#![forbid(unsafe_code)]

mod compat;
mod env;
mod helpers;
mod jdk;
mod signature;
mod store;
mod symbol_type;

pub use crate::compat::{hierarchy_depth, is_subclass};
pub use crate::env::{
    ClassDef, ClassKind, ClassLoadError, ClassSource, FieldDef, LayeredEnv, MethodDef, Nesting,
    TypeEnv, TypeParamDef,
};
pub use crate::helpers::{
    constructors_of, find_field, find_member_class, function_type, instantiate_as_supertype,
    methods_named, supertype_closure, FieldCandidate, FunctionType, Instantiation,
    MethodCandidate,
};
pub use crate::signature::{
    class_header, class_type_from_signature, field_def, internal_to_binary, method_def,
    method_from_signature, parse_class_header, primitive_from_base, type_from_descriptor,
    type_from_signature, ClassHeader, TypeVarScope,
};
pub use crate::store::TypeStore;
pub use crate::symbol_type::{
    Binding, MemberRef, Primitive, SymbolType, TypeBindings, CLONEABLE, OBJECT, SERIALIZABLE,
    STRING,
};
