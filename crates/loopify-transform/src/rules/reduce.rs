//! `reduce` and `reduceRight` fold into a fresh accumulator.
//!
//! Both shapes emit everything before the original statement and leave it
//! reading the accumulator, so the target is written exactly once, after the
//! fold, just like the native call.

use swc_ecma_ast::*;

use crate::builder::{self, assign, binary, expr_stmt, ident_expr, if_stmt, let_stmt, num};
use crate::hygiene::{array_member, invoke, length, length_minus, LoopDescriptor};
use crate::matchers::{match_assigned_call, match_declared_call, BoundCall, MethodCall};
use crate::method::Method;
use crate::path::{ExprKey, StmtPath};
use crate::report::Shape;
use crate::rules::hoist_operands;
use crate::visitor::{NodeKind, RewriteState, Visitor};

const EMPTY_REDUCE: &str = "Reduce of empty array with no initial value";

/// Visitor for `Method::Reduce` or `Method::ReduceRight`.
pub fn visitor(method: Method) -> Visitor {
    debug_assert!(matches!(method, Method::Reduce | Method::ReduceRight));
    Visitor::new()
        .on(NodeKind::ExpressionStatement, move |path, state| {
            rewrite_assignment(path, state, method)
        })
        .on(NodeKind::VariableDeclaration, move |path, state| {
            rewrite_declaration(path, state, method)
        })
}

/// Emit the fold before the path and return the accumulator.
fn fold(path: &mut StmtPath<'_>, call: MethodCall) -> Ident {
    let from_end = call.method == Method::ReduceRight;
    let operands = hoist_operands(path, call, None);
    let array = &operands.array;

    let mut setup = Vec::with_capacity(3);
    let (init, skip) = match operands.seed {
        Some(seed) => (seed, 0),
        None => {
            setup.push(if_stmt(
                binary(BinaryOp::EqEqEq, length(array), num(0.0)),
                builder::throw_new("TypeError", EMPTY_REDUCE),
            ));
            (array_member(array, 0, from_end), 1)
        }
    };
    let acc = path.scope().fresh_ident("acc");
    setup.push(let_stmt(&acc, init));

    let loop_ = if from_end {
        LoopDescriptor::backward(path.scope(), length_minus(array, 1 + skip))
    } else {
        LoopDescriptor::forward(path.scope(), array, num(skip as f64))
    };
    let step = invoke(&operands.func, Some(&acc), array, &loop_.index);
    let body = vec![expr_stmt(assign(&acc, step))];
    setup.push(loop_.with_body(body).into_stmt());

    path.insert_before(setup);
    acc
}

fn rewrite_assignment(path: &mut StmtPath<'_>, state: &mut RewriteState, method: Method) {
    let Some(BoundCall { target, call }) = match_assigned_call(path.node(), method) else {
        return;
    };
    state.record(path, method, Shape::Assignment);

    let acc = fold(path, call);
    path.replace(expr_stmt(assign(&target, ident_expr(&acc))));
}

fn rewrite_declaration(path: &mut StmtPath<'_>, state: &mut RewriteState, method: Method) {
    let Some(BoundCall { call, .. }) = match_declared_call(path.node(), method) else {
        return;
    };
    state.record(path, method, Shape::Declaration);

    let acc = fold(path, call);
    if let Some(init) = path.get_mut(ExprKey::DeclInit) {
        *init = ident_expr(&acc);
    }
}
