//! `some` and `every` as short-circuiting searches.
//!
//! `some` starts from `false` and stops at the first truthy callback result;
//! `every` starts from `true` and stops at the first falsy one.

use swc_ecma_ast::*;

use crate::builder::{assign, block, bool_lit, break_stmt, expr_stmt, ident_expr, if_stmt, let_stmt, not, num};
use crate::hygiene::{invoke, LoopDescriptor};
use crate::matchers::{match_assigned_call, match_declared_call, BoundCall};
use crate::method::Method;
use crate::path::{ExprKey, StmtPath};
use crate::report::Shape;
use crate::rules::{hoist_operands, Operands};
use crate::scope::Scope;
use crate::visitor::{NodeKind, RewriteState, Visitor};

/// Visitor for `Method::Some` or `Method::Every`.
pub fn visitor(method: Method) -> Visitor {
    debug_assert!(matches!(method, Method::Some | Method::Every));
    Visitor::new()
        .on(NodeKind::ExpressionStatement, move |path, state| {
            rewrite_assignment(path, state, method)
        })
        .on(NodeKind::VariableDeclaration, move |path, state| {
            rewrite_declaration(path, state, method)
        })
}

/// Result before any element decides it.
fn initial(method: Method) -> bool {
    method == Method::Every
}

fn search_loop(scope: &mut Scope, result: &Ident, operands: &Operands, method: Method) -> Stmt {
    let loop_ = LoopDescriptor::forward(scope, &operands.array, num(0.0));
    let outcome = invoke(&operands.func, None, &operands.array, &loop_.index);
    let test = if method == Method::Some {
        outcome
    } else {
        not(outcome)
    };
    let decided = Stmt::Block(block(vec![
        expr_stmt(assign(result, bool_lit(!initial(method)))),
        break_stmt(),
    ]));
    loop_.with_body(vec![if_stmt(test, decided)]).into_stmt()
}

fn rewrite_assignment(path: &mut StmtPath<'_>, state: &mut RewriteState, method: Method) {
    let Some(BoundCall { target, call }) = match_assigned_call(path.node(), method) else {
        return;
    };
    state.record(path, method, Shape::Assignment);

    let operands = hoist_operands(path, call, Some(&target));
    path.insert_before([expr_stmt(assign(&target, bool_lit(initial(method))))]);
    let stmt = search_loop(path.scope(), &target, &operands, method);
    path.replace(stmt);
}

fn rewrite_declaration(path: &mut StmtPath<'_>, state: &mut RewriteState, method: Method) {
    let Some(BoundCall { call, .. }) = match_declared_call(path.node(), method) else {
        return;
    };
    state.record(path, method, Shape::Declaration);

    // The declared name is only bound after the loop, so nothing can alias it.
    let operands = hoist_operands(path, call, None);
    let result = path.scope().fresh_ident("result");
    let search = search_loop(path.scope(), &result, &operands, method);
    path.insert_before([let_stmt(&result, bool_lit(initial(method))), search]);
    if let Some(init) = path.get_mut(ExprKey::DeclInit) {
        *init = ident_expr(&result);
    }
}
