//! Handler tables.
//!
//! Each rule contributes a partial `Visitor` keyed by the statement kinds it
//! cares about. Partial visitors are merged by concatenating handler lists per
//! kind, so at any node every rule runs in the order it was registered and
//! sees the mutations of the rules before it.

use std::collections::HashMap;

use swc_common::Spanned;
use swc_ecma_ast::*;

use crate::method::Method;
use crate::path::StmtPath;
use crate::report::{Rewrite, RewriteReport, Shape};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    ExpressionStatement,
    VariableDeclaration,
}

impl NodeKind {
    pub fn of(stmt: &Stmt) -> Option<NodeKind> {
        match stmt {
            Stmt::Expr(_) => Some(NodeKind::ExpressionStatement),
            Stmt::Decl(Decl::Var(_)) => Some(NodeKind::VariableDeclaration),
            _ => None,
        }
    }
}

/// Mutable state threaded through every handler call of one pass.
#[derive(Debug, Default)]
pub struct RewriteState {
    pub report: RewriteReport,
}

impl RewriteState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note a rule firing on the statement at `path`. Must be called before
    /// the statement is replaced, while its span is still the original one.
    pub fn record(&mut self, path: &StmtPath<'_>, method: Method, shape: Shape) {
        let offset = path.node().span().lo.0;
        log::debug!("rewriting {} ({}) at byte {}", method, shape, offset);
        self.report.push(Rewrite {
            method,
            shape,
            offset,
        });
    }

    pub fn into_report(self) -> RewriteReport {
        self.report
    }
}

pub type Handler = Box<dyn Fn(&mut StmtPath<'_>, &mut RewriteState)>;

#[derive(Default)]
pub struct Visitor {
    handlers: HashMap<NodeKind, Vec<Handler>>,
}

impl Visitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one node kind.
    pub fn on<F>(mut self, kind: NodeKind, handler: F) -> Self
    where
        F: Fn(&mut StmtPath<'_>, &mut RewriteState) + 'static,
    {
        self.handlers.entry(kind).or_default().push(Box::new(handler));
        self
    }

    /// Append `other`'s handlers after this visitor's, per kind.
    pub fn merge(mut self, other: Visitor) -> Self {
        for (kind, handlers) in other.handlers {
            self.handlers.entry(kind).or_default().extend(handlers);
        }
        self
    }

    pub fn merge_all(visitors: impl IntoIterator<Item = Visitor>) -> Self {
        visitors.into_iter().fold(Visitor::new(), Visitor::merge)
    }

    pub fn handlers(&self, kind: NodeKind) -> &[Handler] {
        self.handlers.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.values().all(Vec::is_empty)
    }
}

impl std::fmt::Debug for Visitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (kind, handlers) in &self.handlers {
            map.entry(kind, &handlers.len());
        }
        map.finish()
    }
}
