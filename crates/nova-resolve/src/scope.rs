use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use nova_core::Name;
use nova_types::{SymbolType, TypeEnv};

use crate::error::ResolveError;
use crate::symbol::{RefKind, Symbol, SymbolActions, SymbolEvent};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    ClassBody,
    Block,
}

/// One level of the symbol table: a multimap from names to symbols.
pub struct Scope {
    kind: ScopeKind,
    /// Binary name of the class whose body this is.
    owner: Option<String>,
    by_name: HashMap<Name, Vec<Rc<Symbol>>>,
    order: Vec<Rc<Symbol>>,
    actions: Option<Rc<dyn SymbolActions>>,
}

impl Scope {
    fn new(kind: ScopeKind, owner: Option<String>, actions: Option<Rc<dyn SymbolActions>>) -> Self {
        Self {
            kind,
            owner,
            by_name: HashMap::new(),
            order: Vec::new(),
            actions,
        }
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// All symbols bound to `name`, in push order.
    pub fn get(&self, name: &str) -> &[Rc<Symbol>] {
        self.by_name
            .get(&Name::from(name))
            .map_or(&[], Vec::as_slice)
    }

    pub fn find(&self, name: &str, kind: RefKind) -> Option<&Rc<Symbol>> {
        self.get(name).iter().find(|s| s.kind() == kind)
    }

    /// Symbols in push order.
    pub fn symbols(&self) -> impl Iterator<Item = &Rc<Symbol>> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn insert(&mut self, symbol: Rc<Symbol>) {
        self.by_name
            .entry(symbol.name().clone())
            .or_default()
            .push(symbol.clone());
        self.order.push(symbol);
    }

    /// Moves `old` under the placeholder's name, keeping its position.
    fn replace_with_placeholder(&mut self, old: &Rc<Symbol>, placeholder: Rc<Symbol>) {
        if let Some(list) = self.by_name.get_mut(old.name()) {
            list.retain(|s| !Rc::ptr_eq(s, old));
            if list.is_empty() {
                self.by_name.remove(old.name());
            }
        }
        if let Some(slot) = self.order.iter_mut().find(|s| Rc::ptr_eq(s, old)) {
            *slot = placeholder.clone();
        }
        self.by_name
            .entry(placeholder.name().clone())
            .or_default()
            .push(placeholder);
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("kind", &self.kind)
            .field("owner", &self.owner)
            .field("symbols", &self.order)
            .finish_non_exhaustive()
    }
}

/// A stack of scopes with innermost-first lookup.
///
/// Events reach table-wide hooks first, then the hooks of the scope that
/// holds the symbol, then the symbol's own hooks.
#[derive(Default)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    actions: Option<Rc<dyn SymbolActions>>,
    fresh: u32,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actions(actions: Rc<dyn SymbolActions>) -> Self {
        Self {
            actions: Some(actions),
            ..Self::default()
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Scopes from innermost to outermost.
    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter().rev()
    }

    pub fn push_scope(&mut self, kind: ScopeKind, actions: Option<Rc<dyn SymbolActions>>) {
        self.scopes.push(Scope::new(kind, None, actions));
    }

    /// Enters the body of class `owner`.
    pub fn push_class_scope(&mut self, owner: impl Into<String>, actions: Option<Rc<dyn SymbolActions>>) {
        self.scopes
            .push(Scope::new(ScopeKind::ClassBody, Some(owner.into()), actions));
    }

    /// Leaves the innermost scope, delivering `Pop` for each of its symbols.
    pub fn pop_scope(&mut self) -> Result<Rc<Scope>, ResolveError> {
        let scope = self
            .scopes
            .pop()
            .ok_or(ResolveError::UnbalancedScope("pop without a matching push"))?;
        for symbol in &scope.order {
            self.dispatch(SymbolEvent::Pop, scope.actions.as_ref(), symbol)?;
        }
        Ok(Rc::new(scope))
    }

    /// Binds `symbol` in the innermost scope.
    ///
    /// An existing binding of the same name and kind (for methods: the same
    /// erased signature) is not overwritten: it is first moved to a
    /// synthetic placeholder with a fresh name, which stays in the scope
    /// until it is popped.
    pub fn push_symbol(&mut self, symbol: Symbol) -> Result<Rc<Symbol>, ResolveError> {
        if symbol.ty().is_unresolved() {
            return Err(ResolveError::MalformedSymbol {
                name: symbol.name().to_string(),
            });
        }
        let depth = self.scopes.len();
        let Some(scope) = self.scopes.last_mut() else {
            return Err(ResolveError::UnbalancedScope("symbol pushed outside any scope"));
        };

        let existing = scope
            .get(symbol.name().as_str())
            .iter()
            .find(|s| s.same_binding(&symbol))
            .cloned();
        let mut placeholder = None;
        if let Some(old) = existing {
            self.fresh += 1;
            let fresh = Name::from(format!("{}#{}", old.name(), self.fresh));
            let shadow = Rc::new(old.placeholder(fresh));
            tracing::trace!(target: "nova.resolve", name = %old.name(), placeholder = %shadow.name(), depth, "shadowing binding");
            scope.replace_with_placeholder(&old, shadow.clone());
            placeholder = Some(shadow);
        }

        let symbol = Rc::new(symbol);
        scope.insert(symbol.clone());
        let scope_actions = scope.actions.clone();
        if let Some(shadow) = placeholder {
            self.dispatch(SymbolEvent::Push, scope_actions.as_ref(), &shadow)?;
        }
        self.dispatch(SymbolEvent::Push, scope_actions.as_ref(), &symbol)?;
        Ok(symbol)
    }

    /// Innermost symbol named `name` of `kind`.
    pub fn find_symbol(&self, name: &str, kind: RefKind) -> Option<Rc<Symbol>> {
        self.locate(name, kind, None).map(|(_, s)| s)
    }

    /// Like [`Self::find_symbol`], restricted to scopes of `scope_kind`.
    pub fn find_symbol_in(&self, name: &str, kind: RefKind, scope_kind: ScopeKind) -> Option<Rc<Symbol>> {
        self.locate(name, kind, Some(scope_kind)).map(|(_, s)| s)
    }

    /// Innermost method symbol named `name` applicable to `args`.
    pub fn find_method(&self, name: &str, args: &[SymbolType], env: &dyn TypeEnv) -> Option<Rc<Symbol>> {
        self.scopes.iter().rev().find_map(|scope| {
            scope
                .get(name)
                .iter()
                .filter(|s| s.kind() == RefKind::Method)
                .find(|s| accepts(s, args, env))
                .cloned()
        })
    }

    /// [`Self::find_symbol`] followed by a `Read` event.
    pub fn lookup_for_read(&self, name: &str, kind: RefKind) -> Result<Option<Rc<Symbol>>, ResolveError> {
        self.lookup_with(name, kind, SymbolEvent::Read)
    }

    /// [`Self::find_symbol`] followed by a `Write` event.
    pub fn lookup_for_write(&self, name: &str, kind: RefKind) -> Result<Option<Rc<Symbol>>, ResolveError> {
        self.lookup_with(name, kind, SymbolEvent::Write)
    }

    /// The innermost method symbol `name` whose erased parameters equal
    /// `params`, followed by a `Read` event.
    pub fn lookup_method_for_read(
        &self,
        name: &str,
        params: &[SymbolType],
    ) -> Result<Option<Rc<Symbol>>, ResolveError> {
        let probe = Symbol::method(name, SymbolType::void(), params.to_vec());
        let found = self.scopes.iter().enumerate().rev().find_map(|(depth, scope)| {
            scope
                .get(name)
                .iter()
                .find(|s| s.same_binding(&probe))
                .map(|s| (depth, s.clone()))
        });
        let Some((depth, symbol)) = found else {
            return Ok(None);
        };
        self.dispatch(SymbolEvent::Read, self.scopes[depth].actions.as_ref(), &symbol)?;
        Ok(Some(symbol))
    }

    /// Binary name of the innermost enclosing class body.
    pub fn innermost_class(&self) -> Option<&str> {
        self.scopes.iter().rev().find_map(Scope::owner)
    }

    /// Binary names of the enclosing classes, innermost first.
    pub fn enclosing_classes(&self) -> Vec<&str> {
        self.scopes.iter().rev().filter_map(Scope::owner).collect()
    }

    fn lookup_with(
        &self,
        name: &str,
        kind: RefKind,
        event: SymbolEvent,
    ) -> Result<Option<Rc<Symbol>>, ResolveError> {
        let Some((depth, symbol)) = self.locate(name, kind, None) else {
            return Ok(None);
        };
        let scope_actions = self.scopes[depth].actions.as_ref();
        self.dispatch(event, scope_actions, &symbol)?;
        Ok(Some(symbol))
    }

    fn locate(&self, name: &str, kind: RefKind, scope_kind: Option<ScopeKind>) -> Option<(usize, Rc<Symbol>)> {
        self.scopes
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, scope)| scope_kind.map_or(true, |k| scope.kind == k))
            .find_map(|(depth, scope)| scope.find(name, kind).map(|s| (depth, s.clone())))
    }

    fn dispatch(
        &self,
        event: SymbolEvent,
        scope_actions: Option<&Rc<dyn SymbolActions>>,
        symbol: &Symbol,
    ) -> Result<(), ResolveError> {
        if let Some(actions) = &self.actions {
            actions.on_event(event, symbol)?;
        }
        if let Some(actions) = scope_actions {
            actions.on_event(event, symbol)?;
        }
        symbol.dispatch(event)?;
        Ok(())
    }
}

impl fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolTable")
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

fn accepts(symbol: &Symbol, args: &[SymbolType], env: &dyn TypeEnv) -> bool {
    let params = symbol.params();
    let exact = params.len() == args.len()
        && params.iter().zip(args).all(|(p, a)| p.is_compatible(a, env));
    if exact || !symbol.is_varargs() {
        return exact;
    }
    let Some((last, fixed)) = params.split_last() else {
        return false;
    };
    let Some(component) = last.component_type() else {
        return false;
    };
    args.len() >= fixed.len()
        && fixed.iter().zip(args).all(|(p, a)| p.is_compatible(a, env))
        && args[fixed.len()..].iter().all(|a| component.is_compatible(a, env))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use nova_types::TypeStore;
    use pretty_assertions::assert_eq;

    fn int_var(name: &str) -> Symbol {
        Symbol::new(name, RefKind::Variable, SymbolType::int())
    }

    #[test]
    fn inner_binding_is_dropped_on_pop() {
        let mut table = SymbolTable::new();
        table.push_scope(ScopeKind::Block, None);
        let outer = table.push_symbol(int_var("a")).unwrap();

        table.push_scope(ScopeKind::Block, None);
        let inner = table
            .push_symbol(Symbol::new("a", RefKind::Variable, SymbolType::string()))
            .unwrap();
        let found = table.find_symbol("a", RefKind::Variable).unwrap();
        assert!(Rc::ptr_eq(&found, &inner));

        table.pop_scope().unwrap();
        let found = table.find_symbol("a", RefKind::Variable).unwrap();
        assert!(Rc::ptr_eq(&found, &outer));
        assert_eq!(found.ty(), &SymbolType::int());
    }

    #[test]
    fn rebinding_keeps_old_symbol_under_fresh_name() {
        let mut table = SymbolTable::new();
        table.push_scope(ScopeKind::Block, None);
        let first = table.push_symbol(int_var("a")).unwrap();
        let second = table
            .push_symbol(Symbol::new("a", RefKind::Variable, SymbolType::string()))
            .unwrap();

        let scope = table.scopes().next().unwrap();
        assert_eq!(scope.len(), 2);
        assert_eq!(scope.get("a").len(), 1);
        assert!(Rc::ptr_eq(&scope.get("a")[0], &second));

        let placeholder = scope.symbols().next().unwrap();
        assert!(placeholder.is_synthetic());
        assert_eq!(placeholder.shadows().map(Name::as_str), Some("a"));
        assert_ne!(placeholder.name(), first.name());
        assert_eq!(placeholder.ty(), first.ty());
        assert!(scope.get(placeholder.name().as_str()).len() == 1);
    }

    #[test]
    fn same_name_different_kind_coexist() {
        let mut table = SymbolTable::new();
        table.push_scope(ScopeKind::ClassBody, None);
        table.push_symbol(int_var("x")).unwrap();
        table
            .push_symbol(Symbol::new("x", RefKind::Type, SymbolType::class("p.x")))
            .unwrap();
        let scope = table.scopes().next().unwrap();
        assert_eq!(scope.get("x").len(), 2);
        assert!(scope.symbols().all(|s| !s.is_synthetic()));
    }

    #[test]
    fn overloads_coexist_and_are_selected_by_arguments() {
        let env = TypeStore::with_minimal_jdk();
        let mut table = SymbolTable::new();
        table.push_class_scope("p.A", None);
        table
            .push_symbol(Symbol::method("f", SymbolType::void(), vec![SymbolType::int()]))
            .unwrap();
        table
            .push_symbol(Symbol::method("f", SymbolType::string(), vec![SymbolType::string()]))
            .unwrap();
        table
            .push_symbol(
                Symbol::method("f", SymbolType::int(), vec![SymbolType::int().array_of(1)])
                    .with_varargs(true),
            )
            .unwrap();

        let pick = |args: &[SymbolType]| table.find_method("f", args, &env).map(|s| s.ty().clone());
        assert_eq!(pick(&[SymbolType::int()]), Some(SymbolType::void()));
        assert_eq!(pick(&[SymbolType::string()]), Some(SymbolType::string()));
        assert_eq!(pick(&[SymbolType::int(), SymbolType::int()]), Some(SymbolType::int()));
        assert_eq!(pick(&[]), Some(SymbolType::int()));
        assert_eq!(pick(&[SymbolType::boolean()]), None);
        assert_eq!(table.innermost_class(), Some("p.A"));
    }

    #[test]
    fn method_reads_pick_the_exact_overload() {
        let reads: Rc<RefCell<Vec<String>>> = Rc::default();
        let log = reads.clone();
        let hook: Rc<dyn SymbolActions> = Rc::new(move |event: SymbolEvent, symbol: &Symbol| -> anyhow::Result<()> {
            if event == SymbolEvent::Read {
                log.borrow_mut().push(symbol.ty().to_string());
            }
            Ok(())
        });
        let mut table = SymbolTable::new();
        table.push_class_scope("p.A", Some(hook));
        table
            .push_symbol(Symbol::method("f", SymbolType::int(), vec![SymbolType::int()]))
            .unwrap();
        table
            .push_symbol(Symbol::method("f", SymbolType::string(), vec![SymbolType::string()]))
            .unwrap();

        let hit = table
            .lookup_method_for_read("f", &[SymbolType::string()])
            .unwrap()
            .unwrap();
        assert_eq!(hit.ty(), &SymbolType::string());
        assert!(table
            .lookup_method_for_read("f", &[SymbolType::boolean()])
            .unwrap()
            .is_none());
        assert_eq!(*reads.borrow(), vec!["java.lang.String".to_string()]);
    }

    #[test]
    fn unbalanced_pop_and_unresolved_symbols_fail() {
        let mut table = SymbolTable::new();
        assert!(matches!(table.pop_scope(), Err(ResolveError::UnbalancedScope(_))));
        assert!(matches!(
            table.push_symbol(int_var("a")),
            Err(ResolveError::UnbalancedScope(_))
        ));

        table.push_scope(ScopeKind::Block, None);
        let err = table
            .push_symbol(Symbol::new("a", RefKind::Variable, SymbolType::unresolved("Nope")))
            .unwrap_err();
        assert!(matches!(err, ResolveError::MalformedSymbol { name } if name == "a"));
    }

    #[test]
    fn events_reach_table_scope_and_symbol_hooks_in_order() {
        let log: Rc<RefCell<Vec<String>>> = Rc::default();
        let hook = |tag: &'static str| -> Rc<dyn SymbolActions> {
            let log = log.clone();
            Rc::new(move |event: SymbolEvent, symbol: &Symbol| -> anyhow::Result<()> {
                log.borrow_mut().push(format!("{tag}:{event:?}:{}", symbol.name()));
                Ok(())
            })
        };

        let mut table = SymbolTable::with_actions(hook("table"));
        table.push_scope(ScopeKind::Block, Some(hook("scope")));
        table
            .push_symbol(int_var("a").with_actions(Some(hook("symbol"))))
            .unwrap();
        table.lookup_for_read("a", RefKind::Variable).unwrap();
        table.lookup_for_write("a", RefKind::Variable).unwrap();
        assert!(table.lookup_for_read("b", RefKind::Variable).unwrap().is_none());
        table.pop_scope().unwrap();

        let expected: Vec<String> = ["Push", "Read", "Write", "Pop"]
            .iter()
            .flat_map(|event| {
                ["table", "scope", "symbol"]
                    .iter()
                    .map(move |tag| format!("{tag}:{event}:a"))
            })
            .collect();
        assert_eq!(*log.borrow(), expected);
    }

    #[test]
    fn hook_failures_propagate() {
        let failing: Rc<dyn SymbolActions> =
            Rc::new(|_: SymbolEvent, _: &Symbol| -> anyhow::Result<()> {
                Err(anyhow::anyhow!("unused variable"))
            });
        let mut table = SymbolTable::new();
        table.push_scope(ScopeKind::Block, Some(failing));
        let err = table.push_symbol(int_var("a")).unwrap_err();
        assert!(matches!(err, ResolveError::Action(_)));
    }

    #[test]
    fn members_attach_once() {
        let mut table = SymbolTable::new();
        table.push_scope(ScopeKind::Block, None);
        let ty = table
            .push_symbol(Symbol::new("A", RefKind::Type, SymbolType::class("p.A")))
            .unwrap();
        table.push_class_scope("p.A", None);
        table.push_symbol(int_var("x")).unwrap();
        let body = table.pop_scope().unwrap();

        assert!(ty.attach_members(body.clone()));
        assert!(!ty.attach_members(body));
        let members = ty.members().unwrap();
        assert_eq!(members.owner(), Some("p.A"));
        assert!(members.find("x", RefKind::Variable).is_some());
    }
}
