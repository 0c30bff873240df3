use nova_resolve::ResolveError;
use thiserror::Error;

/// Analysis of a unit stopped at `expression`.
///
/// `expression` is the Java-like rendering of the innermost node whose
/// resolution failed; `source` says why.
#[derive(Debug, Error)]
#[error("cannot analyze `{expression}`: {source}")]
pub struct AnalysisError {
    pub expression: String,
    #[source]
    pub source: ResolveError,
}

impl AnalysisError {
    pub fn new(expression: impl Into<String>, source: ResolveError) -> Self {
        Self {
            expression: expression.into(),
            source,
        }
    }

    pub fn is_overload_failure(&self) -> bool {
        matches!(self.source, ResolveError::OverloadResolution { .. })
    }

    pub fn is_symbol_failure(&self) -> bool {
        matches!(self.source, ResolveError::SymbolResolution { .. })
    }

    pub fn is_class_failure(&self) -> bool {
        matches!(self.source, ResolveError::ClassResolution(_))
    }
}

pub(crate) type Result<T, E = AnalysisError> = std::result::Result<T, E>;
