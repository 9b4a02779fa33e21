//! Array method to loop rewriting for Loopify
//!
//! This crate rewrites higher-order array method calls (`forEach`, `map`,
//! `filter`, `reduce`, `reduceRight`, `some`, `every`) found in a few
//! statement shapes into equivalent `for` loops:
//! - Pattern matchers that recognize the supported shapes
//! - Hoisting helpers that keep every operand evaluated exactly once
//! - One rule module per method, merged into a single visitor
//! - A traversal driver that runs the merged visitor in document order

pub mod builder;
pub mod config;
pub mod hygiene;
pub mod matchers;
pub mod method;
pub mod path;
pub mod report;
pub mod rules;
pub mod scope;
pub mod traverse;
pub mod visitor;

#[cfg(test)]
mod test_utils;

use swc_ecma_ast::Program;

pub use config::RuleConfig;
pub use method::{Arity, Method};
pub use report::{Rewrite, RewriteReport, Shape};
pub use traverse::traverse;
pub use visitor::{Handler, NodeKind, RewriteState, Visitor};

/// Merge the visitors of every enabled rule, in `Method::ALL` order.
pub fn plugin(config: &RuleConfig) -> Visitor {
    Visitor::merge_all(config.enabled_methods().into_iter().map(rules::visitor_for))
}

/// Rewrite every supported call site in `program` and report what changed.
pub fn optimize(program: &mut Program, config: &RuleConfig) -> RewriteReport {
    let visitor = plugin(config);
    let mut state = RewriteState::new();
    traverse(program, &visitor, &mut state);
    let report = state.into_report();
    log::debug!("{} call site(s) rewritten", report.len());
    report
}
