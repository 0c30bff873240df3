use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use nova_core::Name;
use nova_hir::{Ast, NodeRef};
use nova_types::SymbolType;

use crate::scope::Scope;

/// What a symbol names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefKind {
    Variable,
    Method,
    Type,
    TypeParam,
    EnumLiteral,
}

/// Lifecycle events delivered to [`SymbolActions`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolEvent {
    Push,
    Pop,
    Read,
    Write,
}

/// Hook observing symbol lifecycle events. Failures abort analysis.
pub trait SymbolActions {
    fn on_event(&self, event: SymbolEvent, symbol: &Symbol) -> anyhow::Result<()>;
}

impl<F> SymbolActions for F
where
    F: Fn(SymbolEvent, &Symbol) -> anyhow::Result<()>,
{
    fn on_event(&self, event: SymbolEvent, symbol: &Symbol) -> anyhow::Result<()> {
        self(event, symbol)
    }
}

/// Supplies hooks for the symbols and scopes introduced by a node.
pub trait ActionProvider {
    fn actions_for(&self, ast: &Ast, node: NodeRef) -> Option<Rc<dyn SymbolActions>>;

    /// Hooks that observe every symbol of the unit.
    fn unit_actions(&self, _ast: &Ast) -> Option<Rc<dyn SymbolActions>> {
        None
    }
}

/// Provides no hooks.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoActions;

impl ActionProvider for NoActions {
    fn actions_for(&self, _ast: &Ast, _node: NodeRef) -> Option<Rc<dyn SymbolActions>> {
        None
    }
}

/// A named binding in a [`Scope`].
#[derive(Clone)]
pub struct Symbol {
    name: Name,
    kind: RefKind,
    ty: SymbolType,
    params: Vec<SymbolType>,
    is_varargs: bool,
    location: Option<NodeRef>,
    members: OnceCell<Rc<Scope>>,
    actions: Option<Rc<dyn SymbolActions>>,
    shadows: Option<Name>,
}

impl Symbol {
    pub fn new(name: impl Into<Name>, kind: RefKind, ty: SymbolType) -> Self {
        Self {
            name: name.into(),
            kind,
            ty,
            params: Vec::new(),
            is_varargs: false,
            location: None,
            members: OnceCell::new(),
            actions: None,
            shadows: None,
        }
    }

    /// A method symbol; `ty` is the return type.
    pub fn method(name: impl Into<Name>, return_type: SymbolType, params: Vec<SymbolType>) -> Self {
        Self {
            params,
            ..Self::new(name, RefKind::Method, return_type)
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: NodeRef) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn with_actions(mut self, actions: Option<Rc<dyn SymbolActions>>) -> Self {
        self.actions = actions;
        self
    }

    #[must_use]
    pub fn with_varargs(mut self, is_varargs: bool) -> Self {
        self.is_varargs = is_varargs;
        self
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn kind(&self) -> RefKind {
        self.kind
    }

    pub fn ty(&self) -> &SymbolType {
        &self.ty
    }

    /// Parameter types of a method symbol.
    pub fn params(&self) -> &[SymbolType] {
        &self.params
    }

    pub fn is_varargs(&self) -> bool {
        self.is_varargs
    }

    pub fn location(&self) -> Option<NodeRef> {
        self.location
    }

    pub fn actions(&self) -> Option<&Rc<dyn SymbolActions>> {
        self.actions.as_ref()
    }

    /// For a shadow placeholder, the name of the binding it preserves.
    pub fn shadows(&self) -> Option<&Name> {
        self.shadows.as_ref()
    }

    pub fn is_synthetic(&self) -> bool {
        self.shadows.is_some()
    }

    /// The body scope of a type symbol, once its declaration was left.
    pub fn members(&self) -> Option<&Rc<Scope>> {
        self.members.get()
    }

    /// Attaches the body scope of a type symbol. Only the first call has
    /// an effect.
    pub fn attach_members(&self, scope: Rc<Scope>) -> bool {
        self.members.set(scope).is_ok()
    }

    /// Same name and kind; methods additionally need equal erased
    /// parameter lists.
    pub(crate) fn same_binding(&self, other: &Symbol) -> bool {
        if self.name != other.name || self.kind != other.kind {
            return false;
        }
        if self.kind != RefKind::Method {
            return true;
        }
        self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| a.erasure() == b.erasure())
    }

    /// The placeholder that keeps `self` reachable under `fresh_name`.
    pub(crate) fn placeholder(&self, fresh_name: Name) -> Symbol {
        Symbol {
            name: fresh_name,
            shadows: Some(self.name.clone()),
            ..self.clone()
        }
    }

    pub(crate) fn dispatch(&self, event: SymbolEvent) -> anyhow::Result<()> {
        match &self.actions {
            Some(actions) => actions.on_event(event, self),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Symbol")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("ty", &self.ty.to_string())
            .field("location", &self.location)
            .field("shadows", &self.shadows)
            .finish_non_exhaustive()
    }
}
