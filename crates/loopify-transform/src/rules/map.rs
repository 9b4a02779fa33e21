//! `map` fills a pre-sized array by index.

use swc_ecma_ast::*;

use crate::builder::{assign, assign_index, expr_stmt, new_expr, num};
use crate::hygiene::{invoke, length, LoopDescriptor};
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

/// `new Array(arr.length)`
fn presized(array: &Ident) -> Box<Expr> {
    new_expr("Array", vec![length(array)])
}

fn fill_loop(scope: &mut Scope, out: &Ident, operands: &Operands) -> Stmt {
    let loop_ = LoopDescriptor::forward(scope, &operands.array, num(0.0));
    let value = invoke(&operands.func, None, &operands.array, &loop_.index);
    let body = vec![expr_stmt(assign_index(out, &loop_.index, value))];
    loop_.with_body(body).into_stmt()
}

fn rewrite_assignment(path: &mut StmtPath<'_>, state: &mut RewriteState) {
    let Some(BoundCall { target, call }) = match_assigned_call(path.node(), Method::Map) else {
        return;
    };
    state.record(path, Method::Map, Shape::Assignment);

    let operands = hoist_operands(path, call, Some(&target));
    path.insert_before([expr_stmt(assign(&target, presized(&operands.array)))]);
    let stmt = fill_loop(path.scope(), &target, &operands);
    path.replace(stmt);
}

fn rewrite_declaration(path: &mut StmtPath<'_>, state: &mut RewriteState) {
    let Some(BoundCall { target, call }) = match_declared_call(path.node(), Method::Map) else {
        return;
    };
    state.record(path, Method::Map, Shape::Declaration);

    // `var xs = xs.map(f)` redeclares in place, so the alias guard applies here too
    let operands = hoist_operands(path, call, Some(&target));
    if let Some(init) = path.get_mut(ExprKey::DeclInit) {
        *init = presized(&operands.array);
    }
    let stmt = fill_loop(path.scope(), &target, &operands);
    path.insert_after([stmt]);
}
