//! Type-variable bindings for one generic invocation.

use std::collections::HashSet;

use nova_types::{instantiate_as_supertype, Binding, SymbolType, TypeBindings, TypeEnv, TypeParamDef};

/// Bindings inferred for the type variables of a single call.
///
/// Owned by the candidate being checked and handed back with it, so each
/// overload attempt starts from a clean slate.
#[derive(Clone, Debug)]
pub(crate) struct InferenceContext {
    variables: HashSet<String>,
    bindings: TypeBindings,
    max_depth: usize,
}

impl InferenceContext {
    pub(crate) fn new<'p>(params: impl IntoIterator<Item = &'p TypeParamDef>, max_depth: usize) -> Self {
        Self {
            variables: params.into_iter().map(|p| p.name.clone()).collect(),
            bindings: TypeBindings::new(),
            max_depth,
        }
    }

    /// Binds explicit type arguments (`Foo.<String>bar()`) positionally.
    /// A witness list of the wrong length is ignored.
    pub(crate) fn bind_witnesses(&mut self, params: &[TypeParamDef], witnesses: &[SymbolType]) {
        if witnesses.len() != params.len() {
            return;
        }
        for (param, witness) in params.iter().zip(witnesses) {
            self.bindings.insert(
                param.name.clone(),
                witness.boxed().with_binding(Binding::Explicit),
            );
        }
    }

    /// Unifies a declared parameter type with the type of the argument
    /// passed for it.
    pub(crate) fn unify(&mut self, env: &dyn TypeEnv, formal: &SymbolType, actual: &SymbolType) {
        self.unify_at(env, formal, actual, 0);
    }

    /// Unifies the generic type being instantiated (`ArrayList<E>`) with the
    /// type the result is assigned to (`List<String>`). Only variables the
    /// arguments left open are bound.
    pub(crate) fn unify_target(&mut self, env: &dyn TypeEnv, generic: &SymbolType, expected: &SymbolType) {
        if !expected.is_reference() || expected.is_null() {
            return;
        }
        let expected = expected.read_type();
        let Some(view) = instantiate_as_supertype(env, generic, expected.name()) else {
            return;
        };
        let mut scratch = Self {
            variables: self.variables.clone(),
            bindings: TypeBindings::new(),
            max_depth: self.max_depth,
        };
        scratch.unify(env, &view, &expected);
        for (var, ty) in scratch.bindings {
            self.bindings.entry(var).or_insert(ty);
        }
    }

    /// `ty` with the inferred bindings applied. With `drop_unresolved`,
    /// variables still open fall back to their erasure.
    pub(crate) fn apply(&self, ty: &SymbolType, drop_unresolved: bool) -> SymbolType {
        ty.refactor(&self.bindings, drop_unresolved)
    }

    pub(crate) fn bindings(&self) -> &TypeBindings {
        &self.bindings
    }

    fn unify_at(&mut self, env: &dyn TypeEnv, formal: &SymbolType, actual: &SymbolType, depth: usize) {
        if depth > self.max_depth {
            tracing::trace!(target: "nova.typeck", %formal, %actual, depth, "inference depth exceeded");
            return;
        }
        if actual.is_null() || actual.is_void() || actual.is_unresolved() {
            return;
        }

        if formal.is_type_variable() {
            let Some(var) = formal.template_variable() else {
                return;
            };
            if !self.variables.contains(var) {
                return;
            }
            if let Some(value) = strip_dims(actual, formal.dims()) {
                self.bind(env, var, value.read_type().boxed());
            }
            return;
        }

        if formal.is_wildcard() {
            let bound = formal
                .lower_bounds()
                .first()
                .or_else(|| formal.upper_bounds().first())
                .cloned();
            if let Some(bound) = bound {
                self.unify_at(env, &bound, actual, depth + 1);
            }
            return;
        }

        if formal.is_array() {
            if let (Some(f), Some(a)) = (formal.component_type(), actual.component_type()) {
                self.unify_at(env, &f, &a, depth + 1);
            }
            return;
        }

        let Some(formal_args) = formal.type_args() else {
            return;
        };
        let actual = actual.read_type().boxed();
        let Some(view) = instantiate_as_supertype(env, &actual, formal.name()) else {
            return;
        };
        let Some(actual_args) = view.type_args() else {
            return;
        };
        if formal_args.len() != actual_args.len() {
            return;
        }
        for (f, a) in formal_args.iter().zip(actual_args) {
            self.unify_at(env, f, a, depth + 1);
        }
    }

    /// Explicit bindings stay; repeated inferences merge towards a common
    /// supertype.
    fn bind(&mut self, env: &dyn TypeEnv, var: &str, value: SymbolType) {
        let merged = match self.bindings.get(var) {
            Some(existing) if existing.binding() == Binding::Explicit => return,
            Some(existing) => existing.merge(&value, env),
            None => value,
        };
        tracing::trace!(target: "nova.typeck", var, bound = %merged, "inferred type variable");
        self.bindings
            .insert(var.to_string(), merged.without_member().with_binding(Binding::Inferred));
    }
}

fn strip_dims(ty: &SymbolType, dims: u32) -> Option<SymbolType> {
    let mut current = ty.clone();
    for _ in 0..dims {
        current = current.component_type()?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_types::{Primitive, TypeStore};
    use pretty_assertions::assert_eq;

    fn var(name: &str) -> SymbolType {
        SymbolType::type_variable(name, Vec::new())
    }

    fn params(names: &[&str]) -> Vec<TypeParamDef> {
        names.iter().map(|n| TypeParamDef::new(*n, Vec::new())).collect()
    }

    #[test]
    fn repeated_occurrences_merge() {
        let env = TypeStore::with_minimal_jdk();
        let tps = params(&["T"]);
        let mut cx = InferenceContext::new(&tps, 32);
        cx.unify(&env, &var("T"), &SymbolType::int());
        cx.unify(&env, &var("T"), &SymbolType::primitive(Primitive::Double));

        let bound = cx.apply(&var("T"), false);
        assert_eq!(bound, SymbolType::class("java.lang.Number"));
        assert_eq!(bound.binding(), Binding::Inferred);
    }

    #[test]
    fn explicit_witness_is_not_widened() {
        let env = TypeStore::with_minimal_jdk();
        let tps = params(&["T"]);
        let mut cx = InferenceContext::new(&tps, 32);
        cx.bind_witnesses(&tps, &[SymbolType::string()]);
        cx.unify(&env, &var("T"), &SymbolType::object());

        assert_eq!(cx.apply(&var("T"), false), SymbolType::string());
    }

    #[test]
    fn parameterized_formals_destructure_supertypes() {
        let env = TypeStore::with_minimal_jdk();
        let tps = params(&["E"]);
        let mut cx = InferenceContext::new(&tps, 32);
        let formal = SymbolType::parameterized("java.util.Collection", vec![SymbolType::wildcard_extends(var("E"))]);
        let actual = SymbolType::parameterized("java.util.ArrayList", vec![SymbolType::string()]);
        cx.unify(&env, &formal, &actual);

        assert_eq!(cx.bindings().get("E"), Some(&SymbolType::string()));
    }

    #[test]
    fn generic_arrays_peel_dimensions() {
        let env = TypeStore::with_minimal_jdk();
        let tps = params(&["T"]);
        let mut cx = InferenceContext::new(&tps, 32);
        cx.unify(&env, &var("T").array_of(1), &SymbolType::string().array_of(2));

        assert_eq!(cx.apply(&var("T"), true), SymbolType::string().array_of(1));
    }

    #[test]
    fn open_variables_drop_to_their_bound() {
        let tps = params(&["T"]);
        let cx = InferenceContext::new(&tps, 32);
        assert_eq!(cx.apply(&var("T"), true), SymbolType::object());
        assert!(cx.apply(&var("T"), false).is_type_variable());
    }

    #[test]
    fn target_typing_fills_open_variables_only() {
        let env = TypeStore::with_minimal_jdk();
        let tps = params(&["E"]);
        let mut cx = InferenceContext::new(&tps, 32);
        let generic = SymbolType::parameterized("java.util.ArrayList", vec![var("E")]);
        let target = SymbolType::parameterized("java.util.List", vec![SymbolType::string()]);
        cx.unify_target(&env, &generic, &target);

        assert_eq!(
            cx.apply(&generic, true),
            SymbolType::parameterized("java.util.ArrayList", vec![SymbolType::string()])
        );
    }
}
