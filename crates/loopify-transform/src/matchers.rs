//! Statement and expression shape predicates.
//!
//! A failed match is not an error: the rule asking simply leaves the
//! statement alone.

use swc_ecma_ast::*;

use crate::method::{Arity, Method};

/// A recognized `receiver.method(callback[, seed])` call, detached from the
/// tree so the rule can take it apart while editing around it.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub receiver: Box<Expr>,
    pub method: Method,
    pub callback: Box<Expr>,
    /// Second argument, only present for methods whose arity allows it
    pub seed: Option<Box<Expr>>,
}

impl MethodCall {
    pub fn arity(&self) -> usize {
        if self.seed.is_some() {
            2
        } else {
            1
        }
    }
}

/// A method call whose result is bound to a single identifier.
#[derive(Debug, Clone)]
pub struct BoundCall {
    pub target: Ident,
    pub call: MethodCall,
}

/// `ident = <expr>;` with the plain `=` operator.
pub fn is_identifier_assignment(stmt: &Stmt) -> bool {
    identifier_assignment(stmt).is_some()
}

fn identifier_assignment(stmt: &Stmt) -> Option<(&Ident, &Expr)> {
    let Stmt::Expr(expr_stmt) = stmt else {
        return None;
    };
    let Expr::Assign(assign) = &*expr_stmt.expr else {
        return None;
    };
    if assign.op != AssignOp::Assign {
        return None;
    }
    match &assign.left {
        AssignTarget::Simple(SimpleAssignTarget::Ident(binding)) => Some((&binding.id, &assign.right)),
        _ => None,
    }
}

/// A declaration with exactly one declarator, binding a plain identifier
/// to an initializer.
pub fn is_single_declaration(stmt: &Stmt) -> bool {
    single_declaration(stmt).is_some()
}

fn single_declaration(stmt: &Stmt) -> Option<(&Ident, &Expr)> {
    let Stmt::Decl(Decl::Var(var_decl)) = stmt else {
        return None;
    };
    if var_decl.declare {
        return None;
    }
    let [declarator] = var_decl.decls.as_slice() else {
        return None;
    };
    let Pat::Ident(binding) = &declarator.name else {
        return None;
    };
    declarator.init.as_deref().map(|init| (&binding.id, init))
}

/// `<any expr>.method(args)` where the argument count satisfies `arity`.
pub fn is_method_call(expr: &Expr, method: Method, arity: Arity) -> bool {
    method_call_parts(expr, method, arity).is_some()
}

fn method_call_parts(expr: &Expr, method: Method, arity: Arity) -> Option<(&Expr, &[ExprOrSpread])> {
    let Expr::Call(call) = expr else {
        return None;
    };
    let Callee::Expr(callee) = &call.callee else {
        return None;
    };
    let Expr::Member(member) = &**callee else {
        return None;
    };
    let MemberProp::Ident(prop) = &member.prop else {
        return None;
    };
    if &*prop.sym != method.name() {
        return None;
    }
    if !arity.accepts(call.args.len()) || call.args.iter().any(|arg| arg.spread.is_some()) {
        return None;
    }
    Some((&member.obj, &call.args))
}

/// Structured form of `is_method_call`, using the method's own arity policy.
pub fn match_method_call(expr: &Expr, method: Method) -> Option<MethodCall> {
    let (receiver, args) = method_call_parts(expr, method, method.arity())?;
    let (callback, seed) = match args {
        [callback] => (callback.expr.clone(), None),
        [callback, seed] => (callback.expr.clone(), Some(seed.expr.clone())),
        _ => return None,
    };
    Some(MethodCall {
        receiver: Box::new(receiver.clone()),
        method,
        callback,
        seed,
    })
}

/// `target = receiver.method(...);`
pub fn match_assigned_call(stmt: &Stmt, method: Method) -> Option<BoundCall> {
    let (target, right) = identifier_assignment(stmt)?;
    let call = match_method_call(right, method)?;
    Some(BoundCall {
        target: target.clone(),
        call,
    })
}

/// `const target = receiver.method(...);` (any declaration kind)
pub fn match_declared_call(stmt: &Stmt, method: Method) -> Option<BoundCall> {
    let (target, init) = single_declaration(stmt)?;
    let call = match_method_call(init, method)?;
    Some(BoundCall {
        target: target.clone(),
        call,
    })
}

/// `receiver.method(...);` as a bare expression statement.
pub fn match_statement_call(stmt: &Stmt, method: Method) -> Option<MethodCall> {
    let Stmt::Expr(expr_stmt) = stmt else {
        return None;
    };
    match_method_call(&expr_stmt.expr, method)
}
