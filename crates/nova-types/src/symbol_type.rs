use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

pub const OBJECT: &str = "java.lang.Object";
pub const STRING: &str = "java.lang.String";
pub const CLONEABLE: &str = "java.lang.Cloneable";
pub const SERIALIZABLE: &str = "java.io.Serializable";

const VOID: &str = "void";
const NULL: &str = "null";

/// Substitution from type-variable name to the type bound to it.
pub type TypeBindings = HashMap<String, SymbolType>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primitive {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl Primitive {
    pub const ALL: [Primitive; 8] = [
        Primitive::Boolean,
        Primitive::Byte,
        Primitive::Short,
        Primitive::Char,
        Primitive::Int,
        Primitive::Long,
        Primitive::Float,
        Primitive::Double,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Char => "char",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Primitive::ALL.into_iter().find(|p| p.keyword() == keyword)
    }

    /// Binary name of the wrapper class.
    pub fn box_name(self) -> &'static str {
        match self {
            Primitive::Boolean => "java.lang.Boolean",
            Primitive::Byte => "java.lang.Byte",
            Primitive::Short => "java.lang.Short",
            Primitive::Char => "java.lang.Character",
            Primitive::Int => "java.lang.Integer",
            Primitive::Long => "java.lang.Long",
            Primitive::Float => "java.lang.Float",
            Primitive::Double => "java.lang.Double",
        }
    }

    pub fn from_box_name(name: &str) -> Option<Self> {
        Primitive::ALL.into_iter().find(|p| p.box_name() == name)
    }

    /// Position in `byte < short < char < int < long < float < double`.
    /// `None` for `boolean`.
    pub fn numeric_rank(self) -> Option<u8> {
        match self {
            Primitive::Boolean => None,
            Primitive::Byte => Some(0),
            Primitive::Short => Some(1),
            Primitive::Char => Some(2),
            Primitive::Int => Some(3),
            Primitive::Long => Some(4),
            Primitive::Float => Some(5),
            Primitive::Double => Some(6),
        }
    }

    pub fn is_numeric(self) -> bool {
        self.numeric_rank().is_some()
    }

    /// The operand highest in the numeric order.
    pub fn wider(self, other: Primitive) -> Primitive {
        match (self.numeric_rank(), other.numeric_rank()) {
            (Some(a), Some(b)) if b > a => other,
            _ => self,
        }
    }

    /// Identity or widening primitive conversion from `self` to `target`.
    pub fn widens_to(self, target: Primitive) -> bool {
        use Primitive::*;
        if self == target {
            return true;
        }
        match self {
            Byte => matches!(target, Short | Int | Long | Float | Double),
            Short | Char => matches!(target, Int | Long | Float | Double),
            Int => matches!(target, Long | Float | Double),
            Long => matches!(target, Float | Double),
            Float => target == Double,
            Double | Boolean => false,
        }
    }
}

/// How a type came to be associated with a type variable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Binding {
    /// Written in a declaration or produced by ordinary resolution.
    #[default]
    Declared,
    /// Supplied as an explicit type argument (`Foo.<String>bar()`). Later
    /// occurrences of the variable may not widen it.
    Explicit,
    /// Inferred from argument usage; may still widen through merging.
    Inferred,
}

/// The member whose resolution produced a type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MemberRef {
    Field { owner: String, name: String },
    /// Index into the owner's `ClassDef::methods`.
    Method { owner: String, index: usize },
    /// Index into the owner's `ClassDef::constructors`.
    Constructor { owner: String, index: usize },
}

impl MemberRef {
    pub fn owner(&self) -> &str {
        match self {
            MemberRef::Field { owner, .. }
            | MemberRef::Method { owner, .. }
            | MemberRef::Constructor { owner, .. } => owner,
        }
    }
}

/// A Java type as seen by semantic analysis.
///
/// `name` is always the erasure's binary name (`java.util.Map$Entry`), a
/// primitive keyword, `void` or `null`. A type variable keeps its erasure in
/// `name` and its identity in `template`; wildcards do the same with
/// `wildcard` set.
///
/// Equality ignores `binding` and `member`.
#[derive(Clone, Debug)]
pub struct SymbolType {
    name: String,
    args: Option<Vec<SymbolType>>,
    dims: u32,
    upper_bounds: Vec<SymbolType>,
    lower_bounds: Vec<SymbolType>,
    template: Option<String>,
    wildcard: bool,
    unresolved: bool,
    binding: Binding,
    member: Option<MemberRef>,
}

impl SymbolType {
    fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: None,
            dims: 0,
            upper_bounds: Vec::new(),
            lower_bounds: Vec::new(),
            template: None,
            wildcard: false,
            unresolved: false,
            binding: Binding::Declared,
            member: None,
        }
    }

    pub fn primitive(p: Primitive) -> Self {
        Self::named(p.keyword())
    }

    pub fn int() -> Self {
        Self::primitive(Primitive::Int)
    }

    pub fn boolean() -> Self {
        Self::primitive(Primitive::Boolean)
    }

    /// A raw or non-generic class type.
    pub fn class(binary_name: impl Into<String>) -> Self {
        Self::named(binary_name)
    }

    pub fn parameterized(binary_name: impl Into<String>, args: Vec<SymbolType>) -> Self {
        Self {
            args: Some(args),
            ..Self::named(binary_name)
        }
    }

    pub fn object() -> Self {
        Self::class(OBJECT)
    }

    pub fn string() -> Self {
        Self::class(STRING)
    }

    pub fn void() -> Self {
        Self::named(VOID)
    }

    /// The type of the `null` literal.
    pub fn null() -> Self {
        Self::named(NULL)
    }

    /// A type variable; an empty `bounds` defaults to `Object`.
    pub fn type_variable(name: impl Into<String>, bounds: Vec<SymbolType>) -> Self {
        let bounds = if bounds.is_empty() {
            vec![Self::object()]
        } else {
            bounds
        };
        Self {
            template: Some(name.into()),
            upper_bounds: bounds.clone(),
            ..bounds[0].erasure()
        }
    }

    /// `?`
    pub fn wildcard() -> Self {
        Self {
            wildcard: true,
            upper_bounds: vec![Self::object()],
            ..Self::object()
        }
    }

    /// `? extends bound`
    pub fn wildcard_extends(bound: SymbolType) -> Self {
        Self {
            wildcard: true,
            upper_bounds: vec![bound.clone()],
            ..bound.erasure()
        }
    }

    /// `? super bound`
    pub fn wildcard_super(bound: SymbolType) -> Self {
        Self {
            wildcard: true,
            upper_bounds: vec![Self::object()],
            lower_bounds: vec![bound],
            ..Self::object()
        }
    }

    /// A name that could not be resolved. Never compatible with anything.
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            unresolved: true,
            ..Self::named(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type arguments; `None` for raw and non-generic types.
    pub fn type_args(&self) -> Option<&[SymbolType]> {
        self.args.as_deref()
    }

    pub fn dims(&self) -> u32 {
        self.dims
    }

    pub fn upper_bounds(&self) -> &[SymbolType] {
        &self.upper_bounds
    }

    pub fn lower_bounds(&self) -> &[SymbolType] {
        &self.lower_bounds
    }

    /// Name of the type variable this type stands for, if any.
    pub fn template_variable(&self) -> Option<&str> {
        self.template.as_deref()
    }

    pub fn binding(&self) -> Binding {
        self.binding
    }

    pub fn member(&self) -> Option<&MemberRef> {
        self.member.as_ref()
    }

    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    pub fn is_type_variable(&self) -> bool {
        self.template.is_some() && !self.wildcard
    }

    pub fn is_unresolved(&self) -> bool {
        self.unresolved
    }

    pub fn is_void(&self) -> bool {
        self.dims == 0 && self.name == VOID && self.template.is_none()
    }

    pub fn is_null(&self) -> bool {
        self.dims == 0 && self.name == NULL && self.template.is_none()
    }

    pub fn is_array(&self) -> bool {
        self.dims > 0
    }

    /// The primitive this type denotes, if it is a non-array primitive.
    pub fn as_primitive(&self) -> Option<Primitive> {
        if self.dims > 0 || self.template.is_some() || self.wildcard {
            return None;
        }
        Primitive::from_keyword(&self.name)
    }

    pub fn is_primitive(&self) -> bool {
        self.as_primitive().is_some()
    }

    /// Any type a reference can hold: classes, arrays, type variables,
    /// wildcards and `null`.
    pub fn is_reference(&self) -> bool {
        !self.is_primitive() && !self.is_void() && !self.unresolved
    }

    pub fn is_object(&self) -> bool {
        self.dims == 0 && self.name == OBJECT && !self.wildcard && self.template.is_none()
    }

    pub fn is_string(&self) -> bool {
        self.dims == 0 && self.name == STRING && self.template.is_none()
    }

    /// The primitive behind a wrapper class (`Integer` -> `int`), or the
    /// primitive itself.
    pub fn unboxed(&self) -> Option<Primitive> {
        if let Some(p) = self.as_primitive() {
            return Some(p);
        }
        if self.dims > 0 || self.wildcard {
            return None;
        }
        Primitive::from_box_name(&self.name)
    }

    /// Wrapper class for a primitive; other types are returned unchanged.
    #[must_use]
    pub fn boxed(&self) -> SymbolType {
        match self.as_primitive() {
            Some(p) => SymbolType {
                member: self.member.clone(),
                binding: self.binding,
                ..SymbolType::class(p.box_name())
            },
            None => self.clone(),
        }
    }

    /// The raw class with the same array dimensions.
    #[must_use]
    pub fn erasure(&self) -> SymbolType {
        SymbolType {
            dims: self.dims,
            unresolved: self.unresolved,
            ..Self::named(self.name.clone())
        }
    }

    /// This type with `n` more array dimensions.
    #[must_use]
    pub fn array_of(&self, n: u32) -> SymbolType {
        SymbolType {
            dims: self.dims + n,
            member: None,
            ..self.clone()
        }
    }

    /// The component type of an array (`int[][]` -> `int[]`).
    pub fn component_type(&self) -> Option<SymbolType> {
        (self.dims > 0).then(|| SymbolType {
            dims: self.dims - 1,
            member: None,
            ..self.clone()
        })
    }

    /// The non-array element type.
    #[must_use]
    pub fn element_type(&self) -> SymbolType {
        SymbolType {
            dims: 0,
            member: None,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_member(mut self, member: MemberRef) -> Self {
        self.member = Some(member);
        self
    }

    #[must_use]
    pub fn without_member(mut self) -> Self {
        self.member = None;
        self
    }

    #[must_use]
    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = binding;
        self
    }

    #[must_use]
    pub fn with_type_args(mut self, args: Option<Vec<SymbolType>>) -> Self {
        self.args = args;
        self
    }

    /// A copy marked as standing for type variable `name`, keeping this type
    /// as the variable's bound.
    #[must_use]
    pub fn clone_as_type_variable(&self, name: impl Into<String>) -> SymbolType {
        SymbolType {
            template: Some(name.into()),
            wildcard: false,
            upper_bounds: vec![SymbolType {
                template: None,
                wildcard: false,
                upper_bounds: Vec::new(),
                lower_bounds: Vec::new(),
                member: None,
                ..self.clone()
            }],
            lower_bounds: Vec::new(),
            ..self.clone()
        }
    }

    /// Whether any type variable occurs in this type.
    pub fn mentions_type_variables(&self) -> bool {
        self.is_type_variable()
            || self
                .args
                .iter()
                .flatten()
                .chain(self.upper_bounds.iter().filter(|_| self.wildcard))
                .chain(self.lower_bounds.iter())
                .any(SymbolType::mentions_type_variables)
    }

    /// Substitutes bound type variables.
    ///
    /// Variables missing from `bindings` are kept, or replaced by their
    /// erasure when `drop_unresolved` is set. Generic arrays keep their
    /// dimensions (`T[]` with `T = String` becomes `String[]`).
    #[must_use]
    pub fn refactor(&self, bindings: &TypeBindings, drop_unresolved: bool) -> SymbolType {
        if self.is_type_variable() {
            let var = self.template.as_deref().unwrap_or_default();
            return match bindings.get(var) {
                Some(bound) => SymbolType {
                    dims: bound.dims + self.dims,
                    member: self.member.clone().or_else(|| bound.member.clone()),
                    ..bound.clone()
                },
                None if drop_unresolved => SymbolType {
                    member: self.member.clone(),
                    ..self.erasure()
                },
                None => self.clone(),
            };
        }

        if self.wildcard {
            let upper: Vec<_> = self
                .upper_bounds
                .iter()
                .map(|b| b.refactor(bindings, drop_unresolved))
                .collect();
            let lower: Vec<_> = self
                .lower_bounds
                .iter()
                .map(|b| b.refactor(bindings, drop_unresolved))
                .collect();
            let erased = upper
                .first()
                .map(SymbolType::erasure)
                .unwrap_or_else(SymbolType::object);
            return SymbolType {
                wildcard: true,
                upper_bounds: upper,
                lower_bounds: lower,
                ..erased
            };
        }

        SymbolType {
            args: self.args.as_ref().map(|args| {
                args.iter()
                    .map(|a| a.refactor(bindings, drop_unresolved))
                    .collect()
            }),
            ..self.clone()
        }
    }

    /// Collapses a wildcard to the type a value read from it has: its upper
    /// bound. Other types are returned unchanged.
    #[must_use]
    pub fn read_type(&self) -> SymbolType {
        if self.wildcard {
            return self
                .upper_bounds
                .first()
                .cloned()
                .unwrap_or_else(SymbolType::object);
        }
        self.clone()
    }

    /// Collapses a wildcard to the type a value written into it must have:
    /// its lower bound when present, otherwise its upper bound.
    #[must_use]
    pub fn write_type(&self) -> SymbolType {
        if self.wildcard {
            if let Some(lower) = self.lower_bounds.first() {
                return lower.clone();
            }
        }
        self.read_type()
    }
}

impl PartialEq for SymbolType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.dims == other.dims
            && self.args == other.args
            && self.template == other.template
            && self.wildcard == other.wildcard
            && self.unresolved == other.unresolved
            && self.lower_bounds == other.lower_bounds
            && (!self.wildcard || self.upper_bounds == other.upper_bounds)
    }
}

impl Eq for SymbolType {}

impl Hash for SymbolType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.dims.hash(state);
        self.args.hash(state);
        self.template.hash(state);
        self.wildcard.hash(state);
    }
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.wildcard {
            f.write_str("?")?;
            if let Some(lower) = self.lower_bounds.first() {
                write!(f, " super {lower}")?;
            } else if let Some(upper) = self.upper_bounds.first().filter(|b| !b.is_object()) {
                write!(f, " extends {upper}")?;
            }
            return Ok(());
        }

        match &self.template {
            Some(var) => f.write_str(var)?,
            None => {
                f.write_str(&self.name)?;
                if let Some(args) = &self.args {
                    f.write_str("<")?;
                    for (idx, arg) in args.iter().enumerate() {
                        if idx > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
            }
        }
        for _ in 0..self.dims {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn type_variable_defaults_to_object_bound() {
        let t = SymbolType::type_variable("T", vec![]);
        assert_eq!(t.name(), OBJECT);
        assert_eq!(t.upper_bounds(), &[SymbolType::object()]);
        assert!(t.is_type_variable());
        assert!(t.is_reference());
        assert_eq!(t.to_string(), "T");
    }

    #[test]
    fn refactor_substitutes_nested_and_array_variables() {
        let t = SymbolType::type_variable("T", vec![]);
        let list_t_arr = SymbolType::parameterized("java.util.List", vec![t.array_of(1)]);

        let mut bindings = TypeBindings::new();
        bindings.insert("T".into(), SymbolType::string());

        let refactored = list_t_arr.refactor(&bindings, false);
        assert_eq!(
            refactored,
            SymbolType::parameterized("java.util.List", vec![SymbolType::string().array_of(1)])
        );
        assert_eq!(refactored.to_string(), "java.util.List<java.lang.String[]>");
    }

    #[test]
    fn refactor_drops_unresolved_to_erasure() {
        let bounded = SymbolType::type_variable("N", vec![SymbolType::class("java.lang.Number")]);
        assert_eq!(
            bounded.refactor(&TypeBindings::new(), true),
            SymbolType::class("java.lang.Number")
        );
        assert!(bounded.refactor(&TypeBindings::new(), false).is_type_variable());
    }

    #[test]
    fn refactor_does_not_mutate_shared_instance() {
        let t = SymbolType::type_variable("T", vec![]);
        let mut bindings = TypeBindings::new();
        bindings.insert("T".into(), SymbolType::int().boxed());
        let _ = t.refactor(&bindings, false);
        assert!(t.is_type_variable());
    }

    #[test]
    fn clone_as_type_variable_keeps_bound() {
        let s = SymbolType::string().clone_as_type_variable("T");
        assert_eq!(s.template_variable(), Some("T"));
        assert_eq!(s.upper_bounds(), &[SymbolType::string()]);
        assert_eq!(s.name(), STRING);
    }

    #[test]
    fn wildcards_display_and_collapse() {
        let ext = SymbolType::wildcard_extends(SymbolType::class("p.A"));
        assert_eq!(ext.to_string(), "? extends p.A");
        assert_eq!(ext.read_type(), SymbolType::class("p.A"));

        let sup = SymbolType::wildcard_super(SymbolType::string());
        assert_eq!(sup.to_string(), "? super java.lang.String");
        assert_eq!(sup.write_type(), SymbolType::string());
        assert_eq!(sup.read_type(), SymbolType::object());
    }

    #[test]
    fn equality_ignores_member_and_binding() {
        let plain = SymbolType::string();
        let tagged = SymbolType::string()
            .with_binding(Binding::Explicit)
            .with_member(MemberRef::Field {
                owner: "p.A".into(),
                name: "s".into(),
            });
        assert_eq!(plain, tagged);
        assert_ne!(
            SymbolType::class("java.util.List"),
            SymbolType::parameterized("java.util.List", vec![])
        );
    }

    #[test]
    fn boxing_round_trips_through_wrappers() {
        assert_eq!(SymbolType::int().boxed(), SymbolType::class("java.lang.Integer"));
        assert_eq!(SymbolType::class("java.lang.Character").unboxed(), Some(Primitive::Char));
        assert_eq!(SymbolType::string().unboxed(), None);
    }

    #[test]
    fn widening_lattice() {
        assert!(Primitive::Byte.widens_to(Primitive::Double));
        assert!(Primitive::Char.widens_to(Primitive::Int));
        assert!(!Primitive::Short.widens_to(Primitive::Char));
        assert!(!Primitive::Boolean.widens_to(Primitive::Int));
        assert_eq!(Primitive::Char.wider(Primitive::Short), Primitive::Char);
        assert_eq!(Primitive::Int.wider(Primitive::Float), Primitive::Float);
    }
}
