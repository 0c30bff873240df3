//! Minimal JVM class-file reader.
//!
//! Only the parts needed to build a reflective model of a class are decoded:
//! the constant pool, class/member headers, generic `Signature` attributes and
//! `InnerClasses`. Code, annotations and debug attributes are skipped.

#![forbid(unsafe_code)]

mod classfile;
mod constant_pool;
mod descriptor;
mod error;
mod reader;
mod signature;

pub use crate::classfile::{access, ClassFile, ClassMember, InnerClassInfo};
pub use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};
pub use crate::descriptor::{BaseType, FieldType, MethodDescriptor, ReturnType};
pub use crate::error::{Error, Result};
pub use crate::signature::{
    parse_class_signature, parse_field_signature, parse_method_signature, ClassSignature,
    ClassTypeSignature, MethodSignature, SimpleClassTypeSignature, TypeArgument, TypeParameter,
    TypeSignature,
};
