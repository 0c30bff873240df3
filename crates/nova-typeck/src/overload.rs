//! Applicability filtering and ranking of method and constructor
//! candidates.
//!
//! Candidates flow through a fixed chain of filters: name, bridge and
//! synthetic exclusion, arity, then per-argument compatibility. Lambdas are
//! matched on their shape and method references on the method they resolve
//! to. Survivors are ordered by [`compare`].

use std::cmp::Ordering;

use nova_types::{
    constructors_of, function_type, hierarchy_depth, methods_named, MethodCandidate, MethodDef, SymbolType,
    TypeBindings, TypeEnv, TypeParamDef,
};

use crate::infer::InferenceContext;

/// What is known about an argument before the candidate is chosen.
#[derive(Clone, Debug)]
pub(crate) enum Arg {
    Typed(SymbolType),
    /// Lambdas are typed against the chosen parameter afterwards.
    Lambda(LambdaShape),
    MethodRef(MethodRefShape),
}

impl Arg {
    /// Stand-in type used when reporting the argument list.
    pub(crate) fn display_type(&self) -> SymbolType {
        match self {
            Arg::Typed(ty) => ty.clone(),
            Arg::Lambda(_) => SymbolType::unresolved("<lambda>"),
            Arg::MethodRef(_) => SymbolType::unresolved("<method reference>"),
        }
    }
}

/// The parts of a lambda visible without a target type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct LambdaShape {
    pub arity: usize,
    /// Declared parameter types when every parameter has one.
    pub explicit: Option<Vec<SymbolType>>,
    pub value_compatible: bool,
    pub void_compatible: bool,
}

/// The qualifier and name of a method reference, known before the
/// functional interface is.
#[derive(Clone, Debug)]
pub(crate) struct MethodRefShape {
    pub receiver: SymbolType,
    /// The qualifier names a type rather than a value.
    pub is_type: bool,
    /// `new` for constructor references.
    pub name: String,
    pub witnesses: Vec<SymbolType>,
}

/// What a method reference resolves to for one list of interface method
/// parameters.
#[derive(Clone, Debug)]
pub(crate) struct RefTarget {
    /// `None` for array constructors.
    pub app: Option<Applicable>,
    /// `None` when the referenced method returns `void`.
    pub produced: Option<SymbolType>,
}

/// One invocation being resolved.
pub(crate) struct CallSite<'s> {
    /// `<init>` for constructors.
    pub name: &'s str,
    pub args: &'s [Arg],
    /// Explicit type arguments.
    pub witnesses: &'s [SymbolType],
    /// Type variables inferred alongside the method's own, such as the
    /// class parameters of a diamond instantiation.
    pub extra_vars: &'s [TypeParamDef],
    pub max_depth: usize,
}

/// A candidate that passed every filter.
#[derive(Clone, Debug)]
pub(crate) struct Applicable {
    pub candidate: MethodCandidate,
    /// Declared type of the parameter each argument is passed to.
    pub formals: Vec<SymbolType>,
    pub inference: InferenceContext,
    /// Whether the varargs parameter was spread over trailing arguments.
    pub expanded: bool,
}

impl Applicable {
    pub(crate) fn return_type(&self) -> SymbolType {
        self.inference
            .apply(&self.candidate.def.return_type, true)
            .read_type()
            .with_member(self.candidate.member.clone())
    }
}

/// The best applicable candidate under [`compare`]. Ties keep the earlier
/// declaration.
pub(crate) fn select(
    env: &dyn TypeEnv,
    site: &CallSite<'_>,
    candidates: Vec<MethodCandidate>,
) -> Option<Applicable> {
    let best = ranked(env, site, candidates).into_iter().next();
    if let Some(app) = &best {
        tracing::debug!(
            target: "nova.typeck",
            name = site.name,
            owner = app.candidate.owner(),
            arity = app.candidate.def.arity(),
            expanded = app.expanded,
            inferred = app.inference.bindings().len(),
            "selected overload"
        );
    }
    best
}

/// Every applicable candidate, best first under [`compare`]. Candidates
/// that compare equal stay in declaration order.
pub(crate) fn ranked(
    env: &dyn TypeEnv,
    site: &CallSite<'_>,
    candidates: Vec<MethodCandidate>,
) -> Vec<Applicable> {
    let mut pending: Vec<Applicable> = applicable(env, site, candidates).collect();
    let mut out = Vec::with_capacity(pending.len());
    while !pending.is_empty() {
        let best = (1..pending.len()).fold(0, |best, i| {
            if compare(env, &pending[i], &pending[best]) == Ordering::Less {
                i
            } else {
                best
            }
        });
        out.push(pending.remove(best));
    }
    out
}

fn applicable<'s>(
    env: &'s dyn TypeEnv,
    site: &'s CallSite<'s>,
    candidates: Vec<MethodCandidate>,
) -> impl Iterator<Item = Applicable> + 's {
    candidates
        .into_iter()
        .filter(move |c| c.def.name == site.name)
        .filter(|c| !c.def.is_bridge && !c.def.is_synthetic)
        .filter(move |c| arity_matches(&c.def, site.args.len()))
        .filter_map(move |c| check_arguments(env, site, c))
}

fn arity_matches(def: &MethodDef, args: usize) -> bool {
    if def.is_varargs {
        args >= def.fixed_arity()
    } else {
        args == def.arity()
    }
}

/// Tries the declared form first; a varargs method then gets a second
/// chance with its trailing arguments spread over the component type.
fn check_arguments(env: &dyn TypeEnv, site: &CallSite<'_>, candidate: MethodCandidate) -> Option<Applicable> {
    let def = &candidate.def;
    if site.args.len() == def.arity() {
        if let Some(inference) = try_form(env, site, def, &def.params, false) {
            return Some(Applicable {
                formals: def.params.clone(),
                candidate,
                inference,
                expanded: false,
            });
        }
    }
    let component = def.varargs_component()?;
    let fixed = def.fixed_arity();
    let mut formals = def.params[..fixed].to_vec();
    formals.extend(std::iter::repeat(component).take(site.args.len() - fixed));
    let inference = try_form(env, site, def, &formals, true)?;
    Some(Applicable {
        candidate,
        formals,
        inference,
        expanded: true,
    })
}

fn try_form(
    env: &dyn TypeEnv,
    site: &CallSite<'_>,
    def: &MethodDef,
    formals: &[SymbolType],
    expanded: bool,
) -> Option<InferenceContext> {
    let mut inference = InferenceContext::new(def.type_params.iter().chain(site.extra_vars), site.max_depth);
    inference.bind_witnesses(&def.type_params, site.witnesses);

    let fixed = if expanded { def.fixed_arity() } else { formals.len() };
    for (formal, arg) in formals.iter().zip(site.args).take(fixed) {
        if let Arg::Typed(actual) = arg {
            inference.unify(env, formal, actual);
        }
    }
    if expanded {
        // Trailing arguments unify as one array against the varargs type.
        if let (Some(varargs), Some(component)) = (def.params.last(), def.varargs_component()) {
            let trailing = site.args[fixed..].iter().filter_map(|arg| match arg {
                Arg::Typed(ty) if component.is_reference() => Some(ty.boxed()),
                Arg::Typed(ty) => Some(ty.clone()),
                _ => None,
            });
            let merged = trailing.reduce(|acc, ty| acc.merge(&ty, env));
            if let Some(element) = merged {
                inference.unify(env, varargs, &element.array_of(1));
            }
        }
    }

    for (index, (formal, arg)) in formals.iter().zip(site.args).enumerate() {
        let fits = match arg {
            Arg::Typed(actual) => inference.apply(formal, true).is_compatible(actual, env),
            Arg::Lambda(shape) => lambda_fits(env, &inference.apply(formal, false), shape),
            Arg::MethodRef(shape) => method_ref_fits(env, &inference.apply(formal, false), shape, site.max_depth),
        };
        if !fits {
            tracing::trace!(
                target: "nova.typeck",
                name = %def.name,
                index,
                formal = %formal,
                argument = %arg.display_type(),
                "argument not applicable"
            );
            return None;
        }
    }
    Some(inference)
}

/// Whether a lambda of `shape` could implement the functional interface
/// `formal`.
pub(crate) fn lambda_fits(env: &dyn TypeEnv, formal: &SymbolType, shape: &LambdaShape) -> bool {
    let Some(ft) = function_type(env, formal) else {
        return false;
    };
    if ft.params().len() != shape.arity {
        return false;
    }
    if let Some(explicit) = &shape.explicit {
        let matches = explicit.iter().zip(ft.params()).all(|(declared, param)| {
            param.mentions_type_variables() || declared.erasure() == param.read_type().erasure()
        });
        if !matches {
            return false;
        }
    }
    if ft.return_type().is_void() {
        shape.void_compatible
    } else {
        shape.value_compatible
    }
}

/// Whether a method reference of `shape` resolves against the single
/// abstract method of `formal` and produces what it returns.
pub(crate) fn method_ref_fits(env: &dyn TypeEnv, formal: &SymbolType, shape: &MethodRefShape, max_depth: usize) -> bool {
    let Some(ft) = function_type(env, formal) else {
        return false;
    };
    // Parameters still open are settled once the candidate is chosen.
    if ft.params().iter().any(SymbolType::mentions_type_variables) {
        return true;
    }
    let Some(target) = resolve_method_ref(env, shape, ft.params(), max_depth) else {
        return false;
    };
    let expected = ft.return_type();
    expected.is_void()
        || expected.mentions_type_variables()
        || target
            .produced
            .is_some_and(|ty| expected.is_compatible(&ty, env))
}

/// Picks the method or constructor a reference of `shape` names when the
/// interface method takes `sam_params`.
///
/// A type qualifier tries static methods with every parameter first, then
/// instance methods with the first parameter as the receiver. A value
/// qualifier only sees instance methods.
pub(crate) fn resolve_method_ref(
    env: &dyn TypeEnv,
    shape: &MethodRefShape,
    sam_params: &[SymbolType],
    max_depth: usize,
) -> Option<RefTarget> {
    let typed = |params: &[SymbolType]| params.iter().cloned().map(Arg::Typed).collect::<Vec<_>>();
    if shape.name == "new" {
        if !shape.is_type {
            return None;
        }
        if shape.receiver.is_array() {
            return Some(RefTarget {
                app: None,
                produced: Some(shape.receiver.clone()),
            });
        }
        let args = typed(sam_params);
        let app = select(env, &ref_site("<init>", &args, shape, max_depth), constructors_of(env, &shape.receiver))?;
        return Some(RefTarget {
            app: Some(app),
            produced: Some(shape.receiver.clone()),
        });
    }

    let (statics, instance): (Vec<MethodCandidate>, Vec<MethodCandidate>) = methods_named(env, &shape.receiver, &shape.name)
        .into_iter()
        .partition(|c| c.def.is_static);
    let all = typed(sam_params);
    let app = if shape.is_type {
        select(env, &ref_site(&shape.name, &all, shape, max_depth), statics).or_else(|| {
            // Unbound receiver: the first parameter is the object the
            // method is invoked on.
            let (first, rest) = sam_params.split_first()?;
            if !shape.receiver.is_compatible(first, env) {
                return None;
            }
            let rest = typed(rest);
            select(env, &ref_site(&shape.name, &rest, shape, max_depth), instance)
        })
    } else {
        select(env, &ref_site(&shape.name, &all, shape, max_depth), instance)
    }?;
    let ret = app.return_type().without_member();
    Some(RefTarget {
        produced: (!ret.is_void()).then_some(ret),
        app: Some(app),
    })
}

fn ref_site<'s>(name: &'s str, args: &'s [Arg], shape: &'s MethodRefShape, max_depth: usize) -> CallSite<'s> {
    CallSite {
        name,
        args,
        witnesses: &shape.witnesses,
        extra_vars: &[],
        max_depth,
    }
}

/// Ranks two applicable candidates: fixed arity before varargs, fewer
/// parameters first, then the more specific parameter list.
pub(crate) fn compare(env: &dyn TypeEnv, a: &Applicable, b: &Applicable) -> Ordering {
    a.candidate
        .def
        .is_varargs
        .cmp(&b.candidate.def.is_varargs)
        .then_with(|| a.candidate.def.arity().cmp(&b.candidate.def.arity()))
        .then_with(|| specificity(env, a, b))
}

fn specificity(env: &dyn TypeEnv, a: &Applicable, b: &Applicable) -> Ordering {
    let open = TypeBindings::new();
    let (mut a_wins, mut b_wins) = (false, false);
    for (fa, fb) in a.formals.iter().zip(&b.formals) {
        let fa = fa.refactor(&open, true);
        let fb = fb.refactor(&open, true);
        match (fb.is_compatible(&fa, env), fa.is_compatible(&fb, env)) {
            (true, false) => a_wins = true,
            (false, true) => b_wins = true,
            (true, true) if fa.is_reference() && fb.is_reference() && fa.name() != fb.name() => {
                match hierarchy_depth(env, fa.name()).cmp(&hierarchy_depth(env, fb.name())) {
                    Ordering::Greater => a_wins = true,
                    Ordering::Less => b_wins = true,
                    Ordering::Equal => {}
                }
            }
            _ => {}
        }
    }
    match (a_wins, b_wins) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_types::{MemberRef, TypeStore};
    use pretty_assertions::assert_eq;

    fn candidate(index: usize, def: MethodDef) -> MethodCandidate {
        MethodCandidate {
            member: MemberRef::Method {
                owner: "p.A".to_string(),
                index,
            },
            def,
        }
    }

    fn site<'s>(args: &'s [Arg]) -> CallSite<'s> {
        CallSite {
            name: "m",
            args,
            witnesses: &[],
            extra_vars: &[],
            max_depth: 32,
        }
    }

    fn varargs(def: MethodDef) -> MethodDef {
        MethodDef {
            is_varargs: true,
            ..def
        }
    }

    fn selected_index(app: &Applicable) -> usize {
        match app.candidate.member {
            MemberRef::Method { index, .. } => index,
            _ => usize::MAX,
        }
    }

    #[test]
    fn arity_follows_varargs_minimum() {
        let env = TypeStore::with_minimal_jdk();
        let fixed = candidate(0, MethodDef::new("m", vec![SymbolType::int(), SymbolType::int()], SymbolType::void()));
        let spread = candidate(
            1,
            varargs(MethodDef::new(
                "m",
                vec![SymbolType::string(), SymbolType::int().array_of(1)],
                SymbolType::void(),
            )),
        );

        let one = [Arg::Typed(SymbolType::string())];
        let app = select(&env, &site(&one), vec![fixed.clone(), spread.clone()]).unwrap();
        assert_eq!(selected_index(&app), 1);
        assert!(app.expanded);

        let three = [
            Arg::Typed(SymbolType::string()),
            Arg::Typed(SymbolType::int()),
            Arg::Typed(SymbolType::int()),
        ];
        let app = select(&env, &site(&three), vec![fixed.clone(), spread.clone()]).unwrap();
        assert_eq!(app.formals.len(), 3);

        let none: [Arg; 0] = [];
        assert!(select(&env, &site(&none), vec![fixed, spread]).is_none());
    }

    #[test]
    fn fixed_arity_beats_varargs() {
        let env = TypeStore::with_minimal_jdk();
        let spread = candidate(0, varargs(MethodDef::new("m", vec![SymbolType::int().array_of(1)], SymbolType::void())));
        let fixed = candidate(1, MethodDef::new("m", vec![SymbolType::int()], SymbolType::void()));

        let args = [Arg::Typed(SymbolType::int())];
        let app = select(&env, &site(&args), vec![spread.clone(), fixed.clone()]).unwrap();
        assert_eq!(selected_index(&app), 1);

        let order: Vec<usize> = ranked(&env, &site(&args), vec![spread, fixed])
            .iter()
            .map(selected_index)
            .collect();
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn equally_ranked_candidates_keep_declaration_order() {
        let env = TypeStore::with_minimal_jdk();
        let runnable = candidate(0, MethodDef::new("m", vec![SymbolType::class("java.lang.Runnable")], SymbolType::void()));
        let function = candidate(
            1,
            MethodDef::new(
                "m",
                vec![SymbolType::parameterized(
                    "java.util.function.Function",
                    vec![SymbolType::string(), SymbolType::int().boxed()],
                )],
                SymbolType::int(),
            ),
        );
        let args = [Arg::Typed(SymbolType::null())];
        let order: Vec<usize> = ranked(&env, &site(&args), vec![runnable, function])
            .iter()
            .map(selected_index)
            .collect();
        assert_eq!(order, vec![0, 1]);
    }

    #[test]
    fn more_specific_reference_parameter_wins() {
        let env = TypeStore::with_minimal_jdk();
        let general = candidate(0, MethodDef::new("m", vec![SymbolType::object()], SymbolType::void()));
        let specific = candidate(1, MethodDef::new("m", vec![SymbolType::string()], SymbolType::void()));

        let args = [Arg::Typed(SymbolType::string())];
        let app = select(&env, &site(&args), vec![general, specific]).unwrap();
        assert_eq!(selected_index(&app), 1);
    }

    #[test]
    fn bridges_and_wrong_names_are_filtered() {
        let env = TypeStore::with_minimal_jdk();
        let bridge = candidate(
            0,
            MethodDef {
                is_bridge: true,
                ..MethodDef::new("m", vec![SymbolType::object()], SymbolType::void())
            },
        );
        let other = candidate(1, MethodDef::new("n", vec![SymbolType::object()], SymbolType::void()));

        let args = [Arg::Typed(SymbolType::string())];
        assert!(select(&env, &site(&args), vec![bridge, other]).is_none());
    }

    #[test]
    fn generic_varargs_infer_from_merged_trailing_arguments() {
        let env = TypeStore::with_minimal_jdk();
        let t = TypeParamDef::new("T", Vec::new());
        let def = MethodDef {
            type_params: vec![t.clone()],
            ..varargs(MethodDef::new(
                "m",
                vec![t.as_type().array_of(1)],
                SymbolType::parameterized("java.util.List", vec![t.as_type()]),
            ))
        };
        let args = [Arg::Typed(SymbolType::int()), Arg::Typed(SymbolType::int())];
        let app = select(&env, &site(&args), vec![candidate(0, def)]).unwrap();

        assert_eq!(
            app.return_type(),
            SymbolType::parameterized("java.util.List", vec![SymbolType::class("java.lang.Integer")])
        );
    }

    #[test]
    fn lambda_shape_must_match_the_function_type() {
        let env = TypeStore::with_minimal_jdk();
        let function = SymbolType::parameterized(
            "java.util.function.Function",
            vec![SymbolType::string(), SymbolType::int().boxed()],
        );
        let unary = LambdaShape {
            arity: 1,
            explicit: None,
            value_compatible: true,
            void_compatible: false,
        };
        assert!(lambda_fits(&env, &function, &unary));
        assert!(!lambda_fits(&env, &function, &LambdaShape { arity: 2, ..unary.clone() }));

        let runnable = SymbolType::class("java.lang.Runnable");
        assert!(!lambda_fits(&env, &runnable, &LambdaShape { arity: 0, ..unary }));
    }

    fn string_ref(name: &str) -> MethodRefShape {
        MethodRefShape {
            receiver: SymbolType::string(),
            is_type: true,
            name: name.to_string(),
            witnesses: Vec::new(),
        }
    }

    #[test]
    fn method_ref_must_resolve_against_the_function_type() {
        let env = TypeStore::with_minimal_jdk();
        let runnable = SymbolType::class("java.lang.Runnable");
        let function = SymbolType::parameterized(
            "java.util.function.Function",
            vec![SymbolType::string(), SymbolType::int().boxed()],
        );
        let length = string_ref("length");

        // `String::length` needs a receiver; `run()` supplies none.
        assert!(!method_ref_fits(&env, &runnable, &length, 32));
        assert!(method_ref_fits(&env, &function, &length, 32));
        assert!(!method_ref_fits(&env, &function, &string_ref("missing"), 32));
        assert!(!method_ref_fits(&env, &SymbolType::string(), &length, 32));
    }

    #[test]
    fn unbound_receiver_reference_produces_the_method_return() {
        let env = TypeStore::with_minimal_jdk();
        let target = resolve_method_ref(&env, &string_ref("length"), &[SymbolType::string()], 32).unwrap();
        assert_eq!(target.produced, Some(SymbolType::int()));
        assert!(target.app.is_some());

        assert!(resolve_method_ref(&env, &string_ref("length"), &[SymbolType::int()], 32).is_none());
    }

    #[test]
    fn constructor_references_need_a_type_qualifier() {
        let env = TypeStore::with_minimal_jdk();
        let list = MethodRefShape {
            receiver: SymbolType::class("java.util.ArrayList"),
            is_type: true,
            name: "new".to_string(),
            witnesses: Vec::new(),
        };
        let target = resolve_method_ref(&env, &list, &[], 32).unwrap();
        assert_eq!(target.produced, Some(SymbolType::class("java.util.ArrayList")));

        let array = MethodRefShape {
            receiver: SymbolType::int().array_of(1),
            ..list.clone()
        };
        let target = resolve_method_ref(&env, &array, &[SymbolType::int()], 32).unwrap();
        assert!(target.app.is_none());

        let value = MethodRefShape { is_type: false, ..list };
        assert!(resolve_method_ref(&env, &value, &[], 32).is_none());
    }
}
