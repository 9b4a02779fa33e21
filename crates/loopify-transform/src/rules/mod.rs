//! Per-method rewrite rules.
//!
//! Every rule follows the same emission order: hoisted operands, the result
//! or accumulator initialization, one loop, and finally the original
//! statement rewritten so the target ends up bound to the result.

use swc_ecma_ast::*;

use crate::hygiene::{materialize_callback_if_needed, materialize_if_needed, snapshot_if_aliased};
use crate::matchers::MethodCall;
use crate::method::Method;
use crate::path::StmtPath;
use crate::visitor::Visitor;

pub mod filter;
pub mod for_each;
pub mod map;
pub mod reduce;
pub mod some_every;

/// The partial visitor for one method.
pub fn visitor_for(method: Method) -> Visitor {
    match method {
        Method::ForEach => for_each::visitor(),
        Method::Map => map::visitor(),
        Method::Filter => filter::visitor(),
        Method::Reduce => reduce::visitor(Method::Reduce),
        Method::ReduceRight => reduce::visitor(Method::ReduceRight),
        Method::Some => some_every::visitor(Method::Some),
        Method::Every => some_every::visitor(Method::Every),
    }
}

/// Call operands bound to identifiers, ready to be referenced from a loop.
pub(crate) struct Operands {
    pub array: Ident,
    pub func: Ident,
    pub seed: Option<Box<Expr>>,
}

/// Hoist the receiver and the callback in evaluation order.
///
/// With an `alias_target`, operands naming that identifier are snapshotted
/// first, because the target is written before the loop runs.
pub(crate) fn hoist_operands(path: &mut StmtPath<'_>, call: MethodCall, alias_target: Option<&Ident>) -> Operands {
    let MethodCall {
        receiver,
        callback,
        seed,
        ..
    } = call;

    let receiver = match alias_target {
        Some(target) => snapshot_if_aliased(path, target, receiver, "arr"),
        None => receiver,
    };
    let array = materialize_if_needed(path, receiver, "arr");

    let callback = match alias_target {
        Some(target) => snapshot_if_aliased(path, target, callback, "f"),
        None => callback,
    };
    let func = materialize_callback_if_needed(path, callback, "f");

    Operands { array, func, seed }
}
