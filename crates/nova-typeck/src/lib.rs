//! Semantic analysis of a Java compilation unit.
//!
//! [`analyze`] resolves the static type of every expression, statement and
//! type reference in an [`Ast`] and writes it into the node's slot. Along
//! the way it selects method and constructor overloads, infers the type
//! arguments of generic invocations and types lambdas and method
//! references against their functional interface. Symbol lifecycle events
//! are reported to the hooks an [`ActionProvider`] supplies.
//!
//! The run works in two passes. Classes declared at member level are
//! declared first, so bodies can refer to any of them; bodies are then
//! walked in source order, declaring local and anonymous classes as they
//! appear.

#![forbid(unsafe_code)]

mod body;
mod context;
mod declare;
mod error;
mod expr;
mod infer;
mod lambda;
mod overload;
mod stmt;
mod types;

use nova_config::AnalysisConfig;
use nova_hir::{Ast, ExprId, NodeRef, StmtId, Visitor};
use nova_resolve::ActionProvider;
use nova_types::ClassSource;

pub use crate::context::{AnalysisContext, AnalysisSummary, UnitEnv};
pub use crate::error::AnalysisError;

/// Analyzes `unit` against the classes of `env`.
///
/// Stops at the first expression that cannot be resolved; slots written
/// before the failure are kept.
pub fn analyze(
    unit: &mut Ast,
    env: &dyn ClassSource,
    config: &AnalysisConfig,
    actions: &dyn ActionProvider,
) -> Result<AnalysisSummary, AnalysisError> {
    let package = unit.package_name().to_string();
    let span = tracing::debug_span!(target: "nova.typeck", "analyze", package = %package);
    let _guard = span.enter();

    let mut cx = AnalysisContext::new(unit, env, config, actions);
    cx.declare_unit()?;
    cx.check_unit()?;
    let summary = cx.finish();
    tracing::debug!(
        target: "nova.typeck",
        classes = summary.classes,
        typed = summary.typed_expressions,
        calls = summary.resolved_calls,
        "analysis finished"
    );
    Ok(summary)
}

/// Counts filled and empty slots.
#[derive(Default)]
pub(crate) struct SlotCounter {
    pub typed: usize,
    pub untyped: usize,
    pub statements: usize,
}

impl Visitor for SlotCounter {
    fn visit_stmt(&mut self, ast: &Ast, id: StmtId) {
        self.statements += 1;
        nova_hir::walk(self, ast, NodeRef::Stmt(id));
    }

    fn visit_expr(&mut self, ast: &Ast, id: ExprId) {
        if ast.expr_ty(id).is_some() {
            self.typed += 1;
        } else {
            self.untyped += 1;
        }
        nova_hir::walk(self, ast, NodeRef::Expr(id));
    }
}
