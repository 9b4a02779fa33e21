//! `filter` appends the elements whose callback result is truthy.

use swc_ecma_ast::*;

use crate::builder::{assign, call, const_stmt, empty_array, expr_stmt, ident_expr, if_stmt, member, num};
use crate::hygiene::{element, LoopDescriptor};
use crate::matchers::{match_assigned_call, match_declared_call, BoundCall};
use crate::method::Method;
use crate::path::{ExprKey, StmtPath};
use crate::report::Shape;
use crate::rules::{hoist_operands, Operands};
use crate::scope::Scope;
use crate::visitor::{NodeKind, RewriteState, Visitor};

pub fn visitor() -> Visitor {
    Visitor::new()
        .on(NodeKind::ExpressionStatement, rewrite_assignment)
        .on(NodeKind::VariableDeclaration, rewrite_declaration)
}

/// The element is read once per iteration and the pushed value is the one
/// the callback was given, even if the callback writes to the array.
fn select_loop(scope: &mut Scope, out: &Ident, operands: &Operands) -> Stmt {
    let loop_ = LoopDescriptor::forward(scope, &operands.array, num(0.0));
    let item = scope.fresh_ident("item");
    let test = call(
        ident_expr(&operands.func),
        vec![ident_expr(&item), ident_expr(&loop_.index), ident_expr(&operands.array)],
    );
    let push = expr_stmt(call(member(ident_expr(out), "push"), vec![ident_expr(&item)]));
    let body = vec![
        const_stmt(&item, element(&operands.array, &loop_.index)),
        if_stmt(test, push),
    ];
    loop_.with_body(body).into_stmt()
}

fn rewrite_assignment(path: &mut StmtPath<'_>, state: &mut RewriteState) {
    let Some(BoundCall { target, call }) = match_assigned_call(path.node(), Method::Filter) else {
        return;
    };
    state.record(path, Method::Filter, Shape::Assignment);

    let operands = hoist_operands(path, call, Some(&target));
    path.insert_before([expr_stmt(assign(&target, empty_array()))]);
    let stmt = select_loop(path.scope(), &target, &operands);
    path.replace(stmt);
}

fn rewrite_declaration(path: &mut StmtPath<'_>, state: &mut RewriteState) {
    let Some(BoundCall { target, call }) = match_declared_call(path.node(), Method::Filter) else {
        return;
    };
    state.record(path, Method::Filter, Shape::Declaration);

    let operands = hoist_operands(path, call, Some(&target));
    if let Some(init) = path.get_mut(ExprKey::DeclInit) {
        *init = empty_array();
    }
    let stmt = select_loop(path.scope(), &target, &operands);
    path.insert_after([stmt]);
}
