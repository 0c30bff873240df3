//! Assignability, nearest-common-type and class-hierarchy queries.

use std::collections::{HashSet, VecDeque};

use crate::env::TypeEnv;
use crate::symbol_type::{Primitive, SymbolType, CLONEABLE, OBJECT, SERIALIZABLE};

/// Whether `sub` names `sup` or one of its (transitive) supertypes.
///
/// Classes that fail to load end that branch of the walk.
pub fn is_subclass(env: &dyn TypeEnv, sub: &str, sup: &str) -> bool {
    if sub == sup || sup == OBJECT {
        return true;
    }
    let mut queue = VecDeque::from([sub.to_string()]);
    let mut seen = HashSet::new();
    while let Some(current) = queue.pop_front() {
        if !seen.insert(current.clone()) {
            continue;
        }
        let def = match env.class(&current) {
            Ok(def) => def,
            Err(err) => {
                tracing::trace!(target: "nova.types", class = %current, error = %err, "hierarchy walk stopped");
                continue;
            }
        };
        for st in def.direct_supertypes() {
            if st.name() == sup {
                return true;
            }
            queue.push_back(st.name().to_string());
        }
    }
    false
}

/// Length of the superclass chain (`Object` is 0). Interfaces count one
/// more than their deepest superinterface.
pub fn hierarchy_depth(env: &dyn TypeEnv, name: &str) -> usize {
    fn inner(env: &dyn TypeEnv, name: &str, seen: &mut HashSet<String>) -> usize {
        if name == OBJECT || !seen.insert(name.to_string()) {
            return 0;
        }
        let Ok(def) = env.class(name) else {
            return 1;
        };
        let depth = if def.is_interface() {
            def.interfaces
                .iter()
                .map(|i| inner(env, i.name(), seen))
                .max()
                .unwrap_or(0)
        } else {
            def.super_class
                .as_ref()
                .map_or(0, |sc| inner(env, sc.name(), seen))
        };
        depth + 1
    }
    inner(env, name, &mut HashSet::new())
}

fn is_array_supertype(name: &str) -> bool {
    name == OBJECT || name == CLONEABLE || name == SERIALIZABLE
}

impl SymbolType {
    /// Whether a value of type `value` may be assigned to `self`.
    ///
    /// Primitive widening and boxing follow the fixed lattice; reference
    /// types are checked by walking the class hierarchy on erasures. Type
    /// arguments are not compared.
    pub fn is_compatible(&self, value: &SymbolType, env: &dyn TypeEnv) -> bool {
        if self.is_unresolved() || value.is_unresolved() {
            return false;
        }
        if self.is_void() || value.is_void() {
            return self.is_void() && value.is_void();
        }
        if value.is_null() {
            return self.is_reference();
        }

        if self.is_wildcard() || self.is_type_variable() {
            if let Some(lower) = self.lower_bounds().first() {
                return lower.is_compatible(value, env) || value.is_compatible(lower, env);
            }
            // A variable standing for a concrete binding compares by that binding.
            return self
                .upper_bounds()
                .iter()
                .all(|bound| bound.array_of(self.dims()).is_compatible(value, env));
        }
        if value.is_wildcard() || value.is_type_variable() {
            let bounds = value.upper_bounds();
            if bounds.is_empty() {
                return self.is_object();
            }
            return bounds
                .iter()
                .any(|bound| self.is_compatible(&bound.array_of(value.dims()), env));
        }

        if self.is_array() || value.is_array() {
            return array_compatible(self, value, env);
        }

        match (self.as_primitive(), value.as_primitive()) {
            (Some(target), Some(source)) => return source.widens_to(target),
            (Some(target), None) => {
                return Primitive::from_box_name(value.name())
                    .is_some_and(|source| source.widens_to(target));
            }
            (None, Some(_)) => return self.is_compatible(&value.boxed(), env),
            (None, None) => {}
        }

        if self.name() == OBJECT || self.name() == value.name() {
            return true;
        }
        is_subclass(env, value.name(), self.name())
    }

    /// Nearest common type of `self` and `other`, used where two branches
    /// meet (conditional expressions, `if`/`else`, `switch` arms).
    #[must_use]
    pub fn merge(&self, other: &SymbolType, env: &dyn TypeEnv) -> SymbolType {
        if self == other {
            return self.clone();
        }
        if self.is_null() {
            return other.clone();
        }
        if other.is_null() {
            return self.clone();
        }
        if self.is_void() || other.is_void() {
            return if self.is_void() { other.clone() } else { self.clone() };
        }

        let left = self.read_type();
        let right = other.read_type();

        if !left.is_array() && !right.is_array() {
            if let (Some(a), Some(b)) = (left.unboxed(), right.unboxed()) {
                if left.is_primitive() || right.is_primitive() || a == b {
                    if a.is_numeric() && b.is_numeric() {
                        return SymbolType::primitive(a.wider(b));
                    }
                    if a == b {
                        return SymbolType::primitive(a);
                    }
                }
            }
            if left.is_primitive() || right.is_primitive() {
                return left.boxed().merge(&right.boxed(), env);
            }
        }

        if left.is_array() && right.is_array() {
            if left.dims() == right.dims() {
                let (le, re) = (left.element_type(), right.element_type());
                if le.is_primitive() || re.is_primitive() {
                    return if le == re {
                        left.clone()
                    } else {
                        SymbolType::object()
                    };
                }
                return le.merge(&re, env).array_of(left.dims());
            }
            return SymbolType::object();
        }
        if left.is_array() || right.is_array() {
            return SymbolType::object();
        }

        if left.name() == right.name() {
            return match (left.type_args(), right.type_args()) {
                (Some(a), Some(b)) if a.len() == b.len() => SymbolType::parameterized(
                    left.name(),
                    a.iter().zip(b).map(|(x, y)| x.merge(y, env)).collect(),
                ),
                _ => left.erasure(),
            };
        }
        if left.is_compatible(&right, env) {
            return left;
        }
        if right.is_compatible(&left, env) {
            return right;
        }

        // First common superclass, then first common interface.
        let mut current = env.class(left.name()).ok().and_then(|d| d.super_class.clone());
        let mut guard = HashSet::new();
        while let Some(sc) = current {
            if sc.name() == OBJECT || !guard.insert(sc.name().to_string()) {
                break;
            }
            if is_subclass(env, right.name(), sc.name()) {
                return sc.erasure();
            }
            current = env.class(sc.name()).ok().and_then(|d| d.super_class.clone());
        }

        let mut queue = VecDeque::from([left.name().to_string()]);
        let mut seen = HashSet::new();
        while let Some(name) = queue.pop_front() {
            if !seen.insert(name.clone()) {
                continue;
            }
            let Ok(def) = env.class(&name) else {
                continue;
            };
            for st in def.direct_supertypes() {
                if st.name() == OBJECT {
                    continue;
                }
                let is_iface = env.class(st.name()).is_ok_and(|d| d.is_interface());
                if is_iface && is_subclass(env, right.name(), st.name()) {
                    return st.erasure();
                }
                queue.push_back(st.name().to_string());
            }
        }

        SymbolType::object()
    }
}

fn array_compatible(target: &SymbolType, value: &SymbolType, env: &dyn TypeEnv) -> bool {
    if !value.is_array() {
        return false;
    }
    if !target.is_array() {
        return is_array_supertype(target.name()) && target.type_args().is_none();
    }
    if value.dims() == target.dims() {
        let (te, ve) = (target.element_type(), value.element_type());
        if te.is_primitive() || ve.is_primitive() {
            return te == ve;
        }
        return te.is_compatible(&ve, env);
    }
    if value.dims() > target.dims() {
        // `Object[] o = new String[1][]` holds; the target element must be an
        // array supertype.
        let te = target.element_type();
        return !te.is_primitive() && is_array_supertype(te.name());
    }
    false
}
