//! Conversion from class-file descriptors and generic signatures.

use nova_classfile::{
    access, parse_class_signature, parse_field_descriptor, parse_field_signature,
    parse_method_descriptor, parse_method_signature, ClassSignature, ClassTypeSignature,
    FieldType, MethodSignature, ReturnType, TypeArgument, TypeParameter, TypeSignature,
};

use crate::env::{FieldDef, MethodDef, TypeParamDef};
use crate::symbol_type::{Primitive, SymbolType};

/// Type variables visible while converting a signature, innermost last.
#[derive(Clone, Debug, Default)]
pub struct TypeVarScope {
    vars: Vec<TypeParamDef>,
}

impl TypeVarScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_params(params: &[TypeParamDef]) -> Self {
        Self {
            vars: params.to_vec(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&TypeParamDef> {
        self.vars.iter().rev().find(|tp| tp.name == name)
    }

    fn variable(&self, name: &str) -> SymbolType {
        match self.lookup(name) {
            Some(tp) => tp.as_type(),
            None => SymbolType::type_variable(name, Vec::new()),
        }
    }

    /// Declares `params` in a child scope and converts their bounds.
    ///
    /// Bounds may mention the variables being declared
    /// (`T extends Comparable<T>`); those occurrences see an `Object`-bounded
    /// placeholder.
    pub fn declare(&self, params: &[TypeParameter]) -> (Vec<TypeParamDef>, TypeVarScope) {
        let mut placeholder = self.clone();
        placeholder
            .vars
            .extend(params.iter().map(|p| TypeParamDef::new(p.name.clone(), Vec::new())));

        let defs: Vec<TypeParamDef> = params
            .iter()
            .map(|p| {
                let bounds = p
                    .bounds()
                    .map(|b| type_from_signature(b, &placeholder))
                    .collect();
                TypeParamDef::new(p.name.clone(), bounds)
            })
            .collect();

        let mut scope = self.clone();
        scope.vars.extend(defs.iter().cloned());
        (defs, scope)
    }
}

pub fn primitive_from_base(base: nova_classfile::BaseType) -> Primitive {
    use nova_classfile::BaseType;
    match base {
        BaseType::Byte => Primitive::Byte,
        BaseType::Char => Primitive::Char,
        BaseType::Double => Primitive::Double,
        BaseType::Float => Primitive::Float,
        BaseType::Int => Primitive::Int,
        BaseType::Long => Primitive::Long,
        BaseType::Short => Primitive::Short,
        BaseType::Boolean => Primitive::Boolean,
    }
}

pub fn internal_to_binary(internal: &str) -> String {
    internal.replace('/', ".")
}

pub fn type_from_descriptor(ty: &FieldType) -> SymbolType {
    match ty {
        FieldType::Base(base) => SymbolType::primitive(primitive_from_base(*base)),
        FieldType::Object(internal) => SymbolType::class(internal_to_binary(internal)),
        FieldType::Array(inner) => type_from_descriptor(inner).array_of(1),
    }
}

pub fn type_from_signature(sig: &TypeSignature, scope: &TypeVarScope) -> SymbolType {
    match sig {
        TypeSignature::Base(base) => SymbolType::primitive(primitive_from_base(*base)),
        TypeSignature::Class(class) => class_type_from_signature(class, scope),
        TypeSignature::TypeVariable(name) => scope.variable(name),
        TypeSignature::Array(inner) => type_from_signature(inner, scope).array_of(1),
    }
}

pub fn class_type_from_signature(sig: &ClassTypeSignature, scope: &TypeVarScope) -> SymbolType {
    let name = sig.binary_name();
    let args = sig.type_arguments();
    if args.is_empty() {
        return SymbolType::class(name);
    }
    let args = args
        .iter()
        .map(|arg| match arg {
            TypeArgument::Any => SymbolType::wildcard(),
            TypeArgument::Exact(t) => type_from_signature(t, scope),
            TypeArgument::Extends(t) => SymbolType::wildcard_extends(type_from_signature(t, scope)),
            TypeArgument::Super(t) => SymbolType::wildcard_super(type_from_signature(t, scope)),
        })
        .collect();
    SymbolType::parameterized(name, args)
}

/// Header of a class: its type parameters and supertypes.
#[derive(Debug, Clone)]
pub struct ClassHeader {
    pub type_params: Vec<TypeParamDef>,
    pub super_class: SymbolType,
    pub interfaces: Vec<SymbolType>,
    pub scope: TypeVarScope,
}

pub fn class_header(sig: &ClassSignature) -> ClassHeader {
    let (type_params, scope) = TypeVarScope::new().declare(&sig.type_parameters);
    ClassHeader {
        super_class: class_type_from_signature(&sig.super_class, &scope),
        interfaces: sig
            .interfaces
            .iter()
            .map(|i| class_type_from_signature(i, &scope))
            .collect(),
        type_params,
        scope,
    }
}

pub fn parse_class_header(signature: &str) -> nova_classfile::Result<ClassHeader> {
    Ok(class_header(&parse_class_signature(signature)?))
}

/// Builds a method from its erased descriptor and optional generic
/// signature, in the scope of the declaring class's type variables.
pub fn method_def(
    name: &str,
    access_flags: u16,
    descriptor: &str,
    signature: Option<&str>,
    class_scope: &TypeVarScope,
) -> nova_classfile::Result<MethodDef> {
    let descriptor = parse_method_descriptor(descriptor)?;
    let erased_params: Vec<SymbolType> = descriptor.params.iter().map(type_from_descriptor).collect();
    let erased_return = match &descriptor.return_type {
        ReturnType::Void => SymbolType::void(),
        ReturnType::Type(t) => type_from_descriptor(t),
    };

    let generic = match signature {
        Some(sig) => Some(parse_method_signature(sig)?),
        None => None,
    };

    // Signatures of inner-class and enum constructors omit synthetic
    // parameters; trust the descriptor when the counts disagree.
    if let Some(sig) = generic.filter(|sig| sig.parameters.len() == erased_params.len()) {
        return Ok(method_from_signature(name, access_flags, &sig, class_scope));
    }

    let mut def = MethodDef::new(name, erased_params, erased_return);
    apply_method_flags(&mut def, access_flags);
    Ok(def)
}

/// Builds a method from a parsed generic signature alone.
pub fn method_from_signature(
    name: &str,
    access_flags: u16,
    sig: &MethodSignature,
    class_scope: &TypeVarScope,
) -> MethodDef {
    let (type_params, scope) = class_scope.declare(&sig.type_parameters);
    let params = sig
        .parameters
        .iter()
        .map(|p| type_from_signature(p, &scope))
        .collect();
    let return_type = match &sig.return_type {
        Some(t) => type_from_signature(t, &scope),
        None => SymbolType::void(),
    };
    let mut def = MethodDef::new(name, params, return_type);
    def.type_params = type_params;
    apply_method_flags(&mut def, access_flags);
    def
}

fn apply_method_flags(def: &mut MethodDef, access_flags: u16) {
    def.is_static = access_flags & access::ACC_STATIC != 0;
    def.is_varargs = access_flags & access::ACC_VARARGS != 0;
    def.is_abstract = access_flags & access::ACC_ABSTRACT != 0;
    def.is_bridge = access_flags & access::ACC_BRIDGE != 0;
    def.is_synthetic = access_flags & access::ACC_SYNTHETIC != 0;
}

pub fn field_def(
    name: &str,
    access_flags: u16,
    descriptor: &str,
    signature: Option<&str>,
    class_scope: &TypeVarScope,
) -> nova_classfile::Result<FieldDef> {
    let ty = match signature {
        Some(sig) => type_from_signature(&parse_field_signature(sig)?, class_scope),
        None => type_from_descriptor(&parse_field_descriptor(descriptor)?),
    };
    Ok(FieldDef {
        name: name.to_string(),
        ty,
        is_static: access_flags & access::ACC_STATIC != 0,
    })
}
