use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use crate::env::{ClassDef, FieldDef, MethodDef, TypeEnv};
use crate::symbol_type::{MemberRef, SymbolType, TypeBindings, CLONEABLE, OBJECT, SERIALIZABLE};

/// One class reached while walking the supertypes of a type, together with
/// the instantiation it was reached through.
#[derive(Clone, Debug)]
pub struct Instantiation {
    pub ty: SymbolType,
    pub def: Arc<ClassDef>,
    /// Bindings of `def`'s type parameters for `ty`. Raw instantiations bind
    /// every parameter to its erased bound.
    pub bindings: TypeBindings,
}

fn starting_points(ty: &SymbolType) -> Vec<SymbolType> {
    let ty = ty.read_type();
    if ty.is_array() {
        return [OBJECT, CLONEABLE, SERIALIZABLE]
            .into_iter()
            .map(SymbolType::class)
            .collect();
    }
    if ty.is_type_variable() {
        return ty.upper_bounds().to_vec();
    }
    if ty.is_primitive() || ty.is_null() || ty.is_void() || ty.is_unresolved() {
        return Vec::new();
    }
    vec![ty]
}

/// Breadth-first walk over `ty` and all of its supertypes, superclass before
/// interfaces, each class visited once.
///
/// Type arguments are substituted along the way, so walking
/// `ArrayList<String>` reaches `List<String>` and `Collection<String>`.
/// Classes that fail to load are skipped.
pub fn supertype_closure(env: &dyn TypeEnv, ty: &SymbolType) -> Vec<Instantiation> {
    let mut out = Vec::new();
    let mut queue: VecDeque<SymbolType> = starting_points(ty).into();
    let mut seen = HashSet::new();

    while let Some(current) = queue.pop_front() {
        if current.is_type_variable() {
            queue.extend(current.upper_bounds().iter().cloned());
            continue;
        }
        if !seen.insert(current.name().to_string()) {
            continue;
        }
        let def = match env.class(current.name()) {
            Ok(def) => def,
            Err(err) => {
                tracing::trace!(target: "nova.types", class = %current.name(), error = %err, "skipping supertype");
                continue;
            }
        };

        let raw = current.type_args().is_none() && !def.type_params.is_empty();
        let bindings = if raw {
            def.type_params
                .iter()
                .map(|tp| {
                    let erased = tp
                        .bounds
                        .first()
                        .map_or_else(SymbolType::object, SymbolType::erasure);
                    (tp.name.clone(), erased)
                })
                .collect()
        } else {
            def.bindings_for(&current)
        };

        for st in def.direct_supertypes() {
            if raw {
                queue.push_back(st.erasure());
            } else {
                queue.push_back(st.refactor(&bindings, false));
            }
        }
        out.push(Instantiation {
            ty: current,
            def,
            bindings,
        });
    }
    out
}

/// `ty` viewed as its supertype `target`, with type arguments substituted.
///
/// `ArrayList<String>` instantiated as `java.util.List` is `List<String>`;
/// raw types stay raw. Returns `None` when `target` is not a supertype.
pub fn instantiate_as_supertype(
    env: &dyn TypeEnv,
    ty: &SymbolType,
    target: &str,
) -> Option<SymbolType> {
    supertype_closure(env, ty)
        .into_iter()
        .find(|inst| inst.def.name == target)
        .map(|inst| inst.ty)
}

/// A method visible on some receiver type, with the receiver's type
/// arguments applied.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodCandidate {
    pub member: MemberRef,
    pub def: MethodDef,
}

impl MethodCandidate {
    pub fn owner(&self) -> &str {
        self.member.owner()
    }
}

/// Methods named `name` visible on `receiver`, nearest declarations first.
///
/// A method overridden lower in the hierarchy (same erased parameter list)
/// hides the inherited one.
pub fn methods_named(env: &dyn TypeEnv, receiver: &SymbolType, name: &str) -> Vec<MethodCandidate> {
    let mut out: Vec<MethodCandidate> = Vec::new();
    for inst in supertype_closure(env, receiver) {
        for (index, method) in inst.def.methods.iter().enumerate() {
            if method.name != name {
                continue;
            }
            let def = method.substituted(&inst.bindings);
            if out.iter().any(|c| c.def.same_erased_params(&def)) {
                continue;
            }
            out.push(MethodCandidate {
                member: MemberRef::Method {
                    owner: inst.def.name.clone(),
                    index,
                },
                def,
            });
        }
    }
    out
}

/// Constructors of `ty`'s class with its type arguments applied.
pub fn constructors_of(env: &dyn TypeEnv, ty: &SymbolType) -> Vec<MethodCandidate> {
    let Ok(def) = env.class(ty.name()) else {
        return Vec::new();
    };
    let bindings = def.bindings_for(ty);
    def.constructors
        .iter()
        .enumerate()
        .map(|(index, ctor)| MethodCandidate {
            member: MemberRef::Constructor {
                owner: def.name.clone(),
                index,
            },
            def: ctor.substituted(&bindings),
        })
        .collect()
}

/// A field visible on some receiver type.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldCandidate {
    pub member: MemberRef,
    pub def: FieldDef,
}

/// The nearest field named `name` on `receiver` or its supertypes.
pub fn find_field(env: &dyn TypeEnv, receiver: &SymbolType, name: &str) -> Option<FieldCandidate> {
    supertype_closure(env, receiver).into_iter().find_map(|inst| {
        inst.def.field(name).map(|field| FieldCandidate {
            member: MemberRef::Field {
                owner: inst.def.name.clone(),
                name: field.name.clone(),
            },
            def: FieldDef {
                ty: field.ty.refactor(&inst.bindings, false),
                ..field.clone()
            },
        })
    })
}

/// Binary name of the member class `simple` declared in `owner` or
/// inherited from one of its supertypes.
pub fn find_member_class(env: &dyn TypeEnv, owner: &str, simple: &str) -> Option<String> {
    supertype_closure(env, &SymbolType::class(owner))
        .into_iter()
        .find_map(|inst| inst.def.member_class(simple).map(str::to_string))
}

fn is_object_method(method: &MethodDef) -> bool {
    match (method.name.as_str(), method.params.as_slice()) {
        ("equals", [param]) => param.is_object(),
        ("hashCode" | "toString", []) => true,
        _ => false,
    }
}

/// The function type of a functional interface instantiation.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionType {
    /// The interface, with wildcard arguments replaced by their bounds.
    pub interface: SymbolType,
    /// The single abstract method, with the interface's arguments applied.
    pub method: MethodCandidate,
}

impl FunctionType {
    pub fn params(&self) -> &[SymbolType] {
        &self.method.def.params
    }

    pub fn return_type(&self) -> &SymbolType {
        &self.method.def.return_type
    }
}

/// Replaces wildcard arguments by the type a function parameter sees:
/// `? super L` becomes `L`, `? extends U` becomes `U`, `?` the bound.
fn without_wildcards(ty: &SymbolType) -> SymbolType {
    match ty.type_args() {
        Some(args) => ty
            .clone()
            .with_type_args(Some(args.iter().map(SymbolType::write_type).collect())),
        None => ty.clone(),
    }
}

/// The single abstract method of `target` if it names a functional
/// interface.
///
/// Abstract methods are collected across superinterfaces; methods matching
/// a public `Object` method and abstract methods overridden by a default
/// method do not count.
pub fn function_type(env: &dyn TypeEnv, target: &SymbolType) -> Option<FunctionType> {
    if target.is_array() || target.is_primitive() {
        return None;
    }
    let def = env.class(target.name()).ok()?;
    if !def.is_interface() {
        return None;
    }
    let interface = without_wildcards(target);

    let mut seen: Vec<MethodDef> = Vec::new();
    let mut abstracts: Vec<MethodCandidate> = Vec::new();
    for inst in supertype_closure(env, &interface) {
        if inst.def.name == OBJECT {
            continue;
        }
        for (index, method) in inst.def.methods.iter().enumerate() {
            if method.is_static || method.is_bridge || method.is_synthetic {
                continue;
            }
            let substituted = method.substituted(&inst.bindings);
            let overridden = seen
                .iter()
                .any(|m| m.name == substituted.name && m.same_erased_params(&substituted));
            if overridden {
                continue;
            }
            seen.push(substituted.clone());
            if method.is_abstract && !is_object_method(method) {
                abstracts.push(MethodCandidate {
                    member: MemberRef::Method {
                        owner: inst.def.name.clone(),
                        index,
                    },
                    def: substituted,
                });
            }
        }
    }

    if abstracts.len() != 1 {
        tracing::trace!(
            target: "nova.types",
            interface = %target,
            abstract_methods = abstracts.len(),
            "not a functional interface"
        );
        return None;
    }
    Some(FunctionType {
        interface,
        method: abstracts.remove(0),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::env::{ClassKind, TypeParamDef};
    use crate::TypeStore;

    fn list_of(arg: SymbolType) -> SymbolType {
        SymbolType::parameterized("java.util.List", vec![arg])
    }

    #[test]
    fn array_list_viewed_as_collection() {
        let env = TypeStore::with_minimal_jdk();
        let ty = SymbolType::parameterized("java.util.ArrayList", vec![SymbolType::string()]);
        assert_eq!(
            instantiate_as_supertype(&env, &ty, "java.util.Collection"),
            Some(SymbolType::parameterized(
                "java.util.Collection",
                vec![SymbolType::string()]
            ))
        );
        assert_eq!(
            instantiate_as_supertype(&env, &SymbolType::class("java.util.ArrayList"), "java.lang.Iterable"),
            Some(SymbolType::class("java.lang.Iterable"))
        );
        assert_eq!(instantiate_as_supertype(&env, &ty, "java.util.Map"), None);
    }

    #[test]
    fn inherited_method_sees_receiver_arguments() {
        let env = TypeStore::with_minimal_jdk();
        let methods = methods_named(&env, &list_of(SymbolType::string()), "iterator");
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].owner(), "java.lang.Iterable");
        assert_eq!(
            methods[0].def.return_type,
            SymbolType::parameterized("java.util.Iterator", vec![SymbolType::string()])
        );
    }

    #[test]
    fn raw_receiver_erases_class_variables() {
        let env = TypeStore::with_minimal_jdk();
        let methods = methods_named(&env, &SymbolType::class("java.util.List"), "get");
        assert_eq!(methods[0].def.return_type, SymbolType::object());
    }

    #[test]
    fn overriding_hides_inherited() {
        let env = TypeStore::with_minimal_jdk();
        let ty = SymbolType::parameterized("java.util.ArrayList", vec![SymbolType::string()]);
        let adds = methods_named(&env, &ty, "add");
        let owners: Vec<_> = adds.iter().map(|m| (m.owner(), m.def.arity())).collect();
        assert_eq!(owners, vec![("java.util.ArrayList", 1), ("java.util.List", 2)]);
    }

    #[test]
    fn fields_found_on_supertypes() {
        let mut env = TypeStore::with_minimal_jdk();
        let mut base = ClassDef::new("p.Base", ClassKind::Class);
        base.type_params = vec![TypeParamDef::new("T", Vec::new())];
        base.fields.push(FieldDef {
            name: "value".into(),
            ty: SymbolType::type_variable("T", Vec::new()),
            is_static: false,
        });
        env.insert(base);
        let mut sub = ClassDef::new("p.Sub", ClassKind::Class);
        sub.super_class = Some(SymbolType::parameterized("p.Base", vec![SymbolType::string()]));
        env.insert(sub);

        let field = find_field(&env, &SymbolType::class("p.Sub"), "value").unwrap();
        assert_eq!(field.def.ty, SymbolType::string());
        assert_eq!(field.member.owner(), "p.Base");
    }

    #[test]
    fn function_type_through_inheritance() {
        let env = TypeStore::with_minimal_jdk();
        let unary = SymbolType::parameterized(
            "java.util.function.UnaryOperator",
            vec![SymbolType::string()],
        );
        let ft = function_type(&env, &unary).unwrap();
        assert_eq!(ft.method.def.name, "apply");
        assert_eq!(ft.params(), &[SymbolType::string()]);
        assert_eq!(ft.return_type(), &SymbolType::string());
    }

    #[test]
    fn comparator_equals_does_not_count() {
        let env = TypeStore::with_minimal_jdk();
        let ft = function_type(&env, &SymbolType::class("java.util.Comparator")).unwrap();
        assert_eq!(ft.method.def.name, "compare");
        assert_eq!(ft.params(), &[SymbolType::object(), SymbolType::object()]);
    }

    #[test]
    fn wildcards_collapse_for_function_type() {
        let env = TypeStore::with_minimal_jdk();
        let target = SymbolType::parameterized(
            "java.util.function.Function",
            vec![
                SymbolType::wildcard_super(SymbolType::string()),
                SymbolType::wildcard_extends(SymbolType::class("java.lang.Integer")),
            ],
        );
        let ft = function_type(&env, &target).unwrap();
        assert_eq!(ft.params(), &[SymbolType::string()]);
        assert_eq!(ft.return_type(), &SymbolType::class("java.lang.Integer"));
    }

    #[test]
    fn non_functional_types() {
        let env = TypeStore::with_minimal_jdk();
        assert!(function_type(&env, &SymbolType::class("java.util.List")).is_none());
        assert!(function_type(&env, &SymbolType::string()).is_none());
        assert!(function_type(&env, &SymbolType::class("java.io.Serializable")).is_none());
    }

    #[test]
    fn default_method_overrides_abstract() {
        let mut env = TypeStore::with_minimal_jdk();
        let mut a = ClassDef::new("p.A", ClassKind::Interface);
        let mut f = MethodDef::new("f", Vec::new(), SymbolType::void());
        f.is_abstract = true;
        a.methods.push(f);
        let mut g = MethodDef::new("g", Vec::new(), SymbolType::int());
        g.is_abstract = true;
        a.methods.push(g);
        env.insert(a);
        let mut b = ClassDef::new("p.B", ClassKind::Interface);
        b.interfaces.push(SymbolType::class("p.A"));
        b.methods.push(MethodDef::new("f", Vec::new(), SymbolType::void()));
        env.insert(b);

        assert!(function_type(&env, &SymbolType::class("p.A")).is_none());
        let ft = function_type(&env, &SymbolType::class("p.B")).unwrap();
        assert_eq!(ft.method.def.name, "g");
    }

    #[test]
    fn member_classes_are_inherited() {
        let env = TypeStore::with_minimal_jdk();
        assert_eq!(
            find_member_class(&env, "java.util.HashMap", "Entry").as_deref(),
            Some("java.util.Map$Entry")
        );
        assert_eq!(find_member_class(&env, "java.util.HashMap", "Missing"), None);
    }
}
