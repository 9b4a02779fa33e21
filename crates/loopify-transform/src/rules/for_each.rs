//! `xs.forEach(f);` becomes a plain counting loop.

use crate::builder::{expr_stmt, num};
use crate::hygiene::{invoke, LoopDescriptor};
use crate::matchers::match_statement_call;
use crate::method::Method;
use crate::path::StmtPath;
use crate::report::Shape;
use crate::rules::hoist_operands;
use crate::visitor::{NodeKind, RewriteState, Visitor};

pub fn visitor() -> Visitor {
    Visitor::new().on(NodeKind::ExpressionStatement, rewrite_statement)
}

fn rewrite_statement(path: &mut StmtPath<'_>, state: &mut RewriteState) {
    let Some(call) = match_statement_call(path.node(), Method::ForEach) else {
        return;
    };
    state.record(path, Method::ForEach, Shape::Statement);

    let operands = hoist_operands(path, call, None);
    let loop_ = LoopDescriptor::forward(path.scope(), &operands.array, num(0.0));
    let body = vec![expr_stmt(invoke(&operands.func, None, &operands.array, &loop_.index))];
    path.replace(loop_.with_body(body).into_stmt());
}
