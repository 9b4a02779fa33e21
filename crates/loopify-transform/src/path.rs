//! Statement handles.
//!
//! A `StmtPath` is the mutation interface rules work through: it borrows the
//! statement list that contains the node being visited, so every edit is a
//! local splice of that list and never touches ancestors.

use swc_ecma_ast::*;

use crate::scope::Scope;

/// Named expression children of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprKey {
    /// The expression of an expression statement
    Expression,
    /// The right-hand side of an `ident = <expr>` expression statement
    AssignRight,
    /// The initializer of a declaration's only declarator
    DeclInit,
}

pub struct StmtPath<'a> {
    stmts: &'a mut Vec<Stmt>,
    index: usize,
    scope: &'a mut Scope,
}

impl<'a> StmtPath<'a> {
    /// Handle for `stmts[index]`. The index must be in bounds.
    pub fn new(stmts: &'a mut Vec<Stmt>, index: usize, scope: &'a mut Scope) -> Self {
        debug_assert!(index < stmts.len());
        Self {
            stmts,
            index,
            scope,
        }
    }

    /// Current position of the node in its statement list.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn node(&self) -> &Stmt {
        &self.stmts[self.index]
    }

    pub fn scope(&mut self) -> &mut Scope {
        &mut *self.scope
    }

    /// Overwrite the node.
    pub fn replace(&mut self, stmt: Stmt) {
        self.stmts[self.index] = stmt;
    }

    /// Insert statements immediately before the node. The handle keeps
    /// pointing at the same node.
    pub fn insert_before(&mut self, stmts: impl IntoIterator<Item = Stmt>) {
        let before = self.stmts.len();
        self.stmts.splice(self.index..self.index, stmts);
        self.index += self.stmts.len() - before;
    }

    /// Insert statements immediately after the node.
    pub fn insert_after(&mut self, stmts: impl IntoIterator<Item = Stmt>) {
        let at = self.index + 1;
        self.stmts.splice(at..at, stmts);
    }

    pub fn get(&self, key: ExprKey) -> Option<&Expr> {
        let node = &self.stmts[self.index];
        match key {
            ExprKey::Expression => match node {
                Stmt::Expr(expr_stmt) => Some(&expr_stmt.expr),
                _ => None,
            },
            ExprKey::AssignRight => match node {
                Stmt::Expr(expr_stmt) => match &*expr_stmt.expr {
                    Expr::Assign(assign) => Some(&assign.right),
                    _ => None,
                },
                _ => None,
            },
            ExprKey::DeclInit => match node {
                Stmt::Decl(Decl::Var(var_decl)) => match var_decl.decls.as_slice() {
                    [declarator] => declarator.init.as_deref(),
                    _ => None,
                },
                _ => None,
            },
        }
    }

    pub fn get_mut(&mut self, key: ExprKey) -> Option<&mut Box<Expr>> {
        let node = &mut self.stmts[self.index];
        match key {
            ExprKey::Expression => match node {
                Stmt::Expr(expr_stmt) => Some(&mut expr_stmt.expr),
                _ => None,
            },
            ExprKey::AssignRight => match node {
                Stmt::Expr(expr_stmt) => match &mut *expr_stmt.expr {
                    Expr::Assign(assign) => Some(&mut assign.right),
                    _ => None,
                },
                _ => None,
            },
            ExprKey::DeclInit => match node {
                Stmt::Decl(Decl::Var(var_decl)) => match var_decl.decls.as_mut_slice() {
                    [declarator] => declarator.init.as_mut(),
                    _ => None,
                },
                _ => None,
            },
        }
    }
}
