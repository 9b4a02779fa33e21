//! Hoisting and loop construction shared by every rule.
//!
//! Rewritten loops refer to the receiver and the callback many times, so both
//! are bound to names first. Hoisted bindings are `const` declarations
//! inserted immediately before the statement being rewritten, which is exactly
//! where the original call evaluated them.

use swc_ecma_ast::*;

use crate::builder::{self, ident_expr, num};
use crate::path::StmtPath;
use crate::scope::Scope;

/// Return `expr` itself if it is an identifier; otherwise bind it to a fresh
/// `const` before the path and return the new name.
pub fn materialize_if_needed(path: &mut StmtPath<'_>, expr: Box<Expr>, hint: &str) -> Ident {
    let expr = match *expr {
        Expr::Ident(id) => return id,
        other => Box::new(other),
    };
    let id = path.scope().fresh_ident(hint);
    path.insert_before([builder::const_stmt(&id, expr)]);
    id
}

/// Bind the callback to a name unless it already is one.
///
/// Function literals are the common case. Member expressions and calls are
/// hoisted too: they must be evaluated once, and calling `obj.fn(...)` in the
/// loop would pass `obj` as `this` where the native method passes `undefined`.
pub fn materialize_callback_if_needed(path: &mut StmtPath<'_>, callback: Box<Expr>, hint: &str) -> Ident {
    if is_function_literal(&callback) {
        log::trace!("hoisting inline callback");
    }
    materialize_if_needed(path, callback, hint)
}

pub fn is_function_literal(expr: &Expr) -> bool {
    match expr {
        Expr::Arrow(_) | Expr::Fn(_) => true,
        Expr::Paren(paren) => is_function_literal(&paren.expr),
        _ => false,
    }
}

/// Snapshot an operand that names the identifier the result is about to be
/// written to (`arr = arr.filter(f)`), so the loop keeps reading the value
/// the call would have seen.
pub fn snapshot_if_aliased(path: &mut StmtPath<'_>, target: &Ident, operand: Box<Expr>, hint: &str) -> Box<Expr> {
    match &*operand {
        Expr::Ident(id) if id.sym == target.sym => {
            let snapshot = path.scope().fresh_ident(hint);
            path.insert_before([builder::const_stmt(&snapshot, operand)]);
            ident_expr(&snapshot)
        }
        _ => operand,
    }
}

/// `arr.length`
pub fn length(array: &Ident) -> Box<Expr> {
    builder::member(ident_expr(array), "length")
}

/// `arr.length - n`
pub fn length_minus(array: &Ident, n: usize) -> Box<Expr> {
    builder::binary(BinaryOp::Sub, length(array), num(n as f64))
}

/// `arr[i]`
pub fn element(array: &Ident, index: &Ident) -> Box<Expr> {
    builder::computed(ident_expr(array), ident_expr(index))
}

/// `arr[n]`, or `arr[arr.length - 1 - n]` counting from the end.
pub fn array_member(array: &Ident, n: usize, from_end: bool) -> Box<Expr> {
    let index = if from_end {
        length_minus(array, n + 1)
    } else {
        num(n as f64)
    };
    builder::computed(ident_expr(array), index)
}

/// `func(...leading, arr[i], i, arr)`
pub fn invoke(func: &Ident, leading: Option<&Ident>, array: &Ident, index: &Ident) -> Box<Expr> {
    let mut args = Vec::with_capacity(4);
    if let Some(leading) = leading {
        args.push(ident_expr(leading));
    }
    args.push(element(array, index));
    args.push(ident_expr(index));
    args.push(ident_expr(array));
    builder::call(ident_expr(func), args)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone)]
pub enum LoopBound {
    /// `i < len`, with `len = arr.length` declared next to the index
    Length { array: Ident, len: Ident },
    /// `i >= 0`
    Zero,
}

/// Plan for one synthesized `for` loop.
#[derive(Debug, Clone)]
pub struct LoopDescriptor {
    pub index: Ident,
    pub start: Box<Expr>,
    pub bound: LoopBound,
    pub direction: Direction,
    pub body: Vec<Stmt>,
}

impl LoopDescriptor {
    /// `for (let i = start, len = arr.length; i < len; i++)`
    pub fn forward(scope: &mut Scope, array: &Ident, start: Box<Expr>) -> Self {
        let index = scope.fresh_ident("i");
        let len = scope.fresh_ident("len");
        Self {
            index,
            start,
            bound: LoopBound::Length {
                array: array.clone(),
                len,
            },
            direction: Direction::Forward,
            body: Vec::new(),
        }
    }

    /// `for (let i = start; i >= 0; i--)`
    pub fn backward(scope: &mut Scope, start: Box<Expr>) -> Self {
        Self {
            index: scope.fresh_ident("i"),
            start,
            bound: LoopBound::Zero,
            direction: Direction::Backward,
            body: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: Vec<Stmt>) -> Self {
        self.body = body;
        self
    }

    pub fn into_stmt(self) -> Stmt {
        let mut decls = vec![builder::declarator(&self.index, self.start)];
        let test = match &self.bound {
            LoopBound::Length { array, len } => {
                decls.push(builder::declarator(len, length(array)));
                builder::binary(BinaryOp::Lt, ident_expr(&self.index), ident_expr(len))
            }
            LoopBound::Zero => builder::binary(BinaryOp::GtEq, ident_expr(&self.index), num(0.0)),
        };
        let step = match self.direction {
            Direction::Forward => UpdateOp::PlusPlus,
            Direction::Backward => UpdateOp::MinusMinus,
        };
        builder::for_stmt(
            builder::var_decl(VarDeclKind::Let, decls),
            test,
            builder::update(&self.index, step),
            self.body,
        )
    }
}
