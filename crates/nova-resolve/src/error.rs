use thiserror::Error;

use nova_types::{ClassLoadError, SymbolType};

/// Failures raised while resolving names, symbols and calls.
///
/// None of these are retried: analysis of a compilation unit stops at the
/// first one.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A type name matched nothing on the classpath or in the unit.
    #[error("cannot resolve class: {0}")]
    ClassResolution(#[from] ClassLoadError),
    /// A name, field or method with no lexical binding and no member to
    /// fall back to.
    #[error("cannot resolve symbol `{name}`")]
    SymbolResolution { name: String },
    /// No candidate survived the applicability filters.
    #[error("no applicable {what} for `{name}({args})`")]
    OverloadResolution {
        /// `method`, `constructor`, `lambda`, `method reference` or
        /// `operator`.
        what: &'static str,
        name: String,
        /// Argument types as written in the message.
        args: String,
    },
    /// A symbol was pushed with an unresolved type.
    #[error("symbol `{name}` has no resolved type")]
    MalformedSymbol { name: String },
    #[error("unbalanced scope stack: {0}")]
    UnbalancedScope(&'static str),
    #[error("symbol action failed")]
    Action(#[from] anyhow::Error),
}

impl ResolveError {
    pub fn class_not_found(name: impl Into<String>) -> Self {
        ResolveError::ClassResolution(ClassLoadError::NotFound(name.into()))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        ResolveError::SymbolResolution { name: name.into() }
    }

    pub fn overload(what: &'static str, name: impl Into<String>, args: &[SymbolType]) -> Self {
        let args = args
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        ResolveError::OverloadResolution {
            what,
            name: name.into(),
            args,
        }
    }
}
