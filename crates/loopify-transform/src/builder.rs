//! Node construction helpers.
//!
//! Every synthesized node goes through these functions so that rule modules
//! read as a description of the code they emit. All nodes carry `DUMMY_SP`
//! and an empty syntax context.

use swc_common::{SyntaxContext, DUMMY_SP};
use swc_ecma_ast::*;

pub fn ident(name: &str) -> Ident {
    Ident {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        sym: name.into(),
        optional: false,
    }
}

pub fn ident_expr(id: &Ident) -> Box<Expr> {
    Box::new(Expr::Ident(id.clone()))
}

pub fn num(value: f64) -> Box<Expr> {
    Box::new(Expr::Lit(Lit::Num(Number {
        span: DUMMY_SP,
        value,
        raw: None,
    })))
}

pub fn bool_lit(value: bool) -> Box<Expr> {
    Box::new(Expr::Lit(Lit::Bool(Bool {
        span: DUMMY_SP,
        value,
    })))
}

pub fn str_lit(value: &str) -> Box<Expr> {
    Box::new(Expr::Lit(Lit::Str(Str {
        span: DUMMY_SP,
        value: value.into(),
        raw: Some(format!("{:?}", value).into()),
    })))
}

/// `[]`
pub fn empty_array() -> Box<Expr> {
    Box::new(Expr::Array(ArrayLit {
        span: DUMMY_SP,
        elems: Vec::new(),
    }))
}

/// `new Ctor(args...)`
pub fn new_expr(ctor: &str, args: Vec<Box<Expr>>) -> Box<Expr> {
    Box::new(Expr::New(NewExpr {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        callee: ident_expr(&ident(ctor)),
        args: Some(args.into_iter().map(arg).collect()),
        type_args: None,
    }))
}

/// `obj.prop`
pub fn member(obj: Box<Expr>, prop: &str) -> Box<Expr> {
    Box::new(Expr::Member(MemberExpr {
        span: DUMMY_SP,
        obj,
        prop: MemberProp::Ident(IdentName {
            span: DUMMY_SP,
            sym: prop.into(),
        }),
    }))
}

/// `obj[index]`
pub fn computed(obj: Box<Expr>, index: Box<Expr>) -> Box<Expr> {
    Box::new(Expr::Member(MemberExpr {
        span: DUMMY_SP,
        obj,
        prop: MemberProp::Computed(ComputedPropName {
            span: DUMMY_SP,
            expr: index,
        }),
    }))
}

fn arg(expr: Box<Expr>) -> ExprOrSpread {
    ExprOrSpread { spread: None, expr }
}

/// `callee(args...)`
pub fn call(callee: Box<Expr>, args: Vec<Box<Expr>>) -> Box<Expr> {
    Box::new(Expr::Call(CallExpr {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        callee: Callee::Expr(callee),
        args: args.into_iter().map(arg).collect(),
        type_args: None,
    }))
}

pub fn binary(op: BinaryOp, left: Box<Expr>, right: Box<Expr>) -> Box<Expr> {
    Box::new(Expr::Bin(BinExpr {
        span: DUMMY_SP,
        op,
        left,
        right,
    }))
}

/// `!expr`
pub fn not(expr: Box<Expr>) -> Box<Expr> {
    Box::new(Expr::Unary(UnaryExpr {
        span: DUMMY_SP,
        op: UnaryOp::Bang,
        arg: expr,
    }))
}

/// `id++` or `id--`
pub fn update(id: &Ident, op: UpdateOp) -> Box<Expr> {
    Box::new(Expr::Update(UpdateExpr {
        span: DUMMY_SP,
        op,
        prefix: false,
        arg: ident_expr(id),
    }))
}

/// `id = value`
pub fn assign(id: &Ident, value: Box<Expr>) -> Box<Expr> {
    Box::new(Expr::Assign(AssignExpr {
        span: DUMMY_SP,
        op: AssignOp::Assign,
        left: AssignTarget::Simple(SimpleAssignTarget::Ident(BindingIdent {
            id: id.clone(),
            type_ann: None,
        })),
        right: value,
    }))
}

/// `obj[index] = value`
pub fn assign_index(obj: &Ident, index: &Ident, value: Box<Expr>) -> Box<Expr> {
    Box::new(Expr::Assign(AssignExpr {
        span: DUMMY_SP,
        op: AssignOp::Assign,
        left: AssignTarget::Simple(SimpleAssignTarget::Member(MemberExpr {
            span: DUMMY_SP,
            obj: ident_expr(obj),
            prop: MemberProp::Computed(ComputedPropName {
                span: DUMMY_SP,
                expr: ident_expr(index),
            }),
        })),
        right: value,
    }))
}

pub fn expr_stmt(expr: Box<Expr>) -> Stmt {
    Stmt::Expr(ExprStmt {
        span: DUMMY_SP,
        expr,
    })
}

pub fn declarator(id: &Ident, init: Box<Expr>) -> VarDeclarator {
    VarDeclarator {
        span: DUMMY_SP,
        name: Pat::Ident(BindingIdent {
            id: id.clone(),
            type_ann: None,
        }),
        init: Some(init),
        definite: false,
    }
}

pub fn var_decl(kind: VarDeclKind, decls: Vec<VarDeclarator>) -> Box<VarDecl> {
    Box::new(VarDecl {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        kind,
        declare: false,
        decls,
    })
}

/// `const id = init;`
pub fn const_stmt(id: &Ident, init: Box<Expr>) -> Stmt {
    Stmt::Decl(Decl::Var(var_decl(
        VarDeclKind::Const,
        vec![declarator(id, init)],
    )))
}

/// `let id = init;`
pub fn let_stmt(id: &Ident, init: Box<Expr>) -> Stmt {
    Stmt::Decl(Decl::Var(var_decl(
        VarDeclKind::Let,
        vec![declarator(id, init)],
    )))
}

pub fn block(stmts: Vec<Stmt>) -> BlockStmt {
    BlockStmt {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        stmts,
    }
}

/// `if (test) cons`
pub fn if_stmt(test: Box<Expr>, cons: Stmt) -> Stmt {
    Stmt::If(IfStmt {
        span: DUMMY_SP,
        test,
        cons: Box::new(cons),
        alt: None,
    })
}

pub fn break_stmt() -> Stmt {
    Stmt::Break(BreakStmt {
        span: DUMMY_SP,
        label: None,
    })
}

/// `throw new Ctor("message");`
pub fn throw_new(ctor: &str, message: &str) -> Stmt {
    Stmt::Throw(ThrowStmt {
        span: DUMMY_SP,
        arg: new_expr(ctor, vec![str_lit(message)]),
    })
}

pub fn for_stmt(init: Box<VarDecl>, test: Box<Expr>, update: Box<Expr>, body: Vec<Stmt>) -> Stmt {
    Stmt::For(ForStmt {
        span: DUMMY_SP,
        init: Some(VarDeclOrExpr::VarDecl(init)),
        test: Some(test),
        update: Some(update),
        body: Box::new(Stmt::Block(block(body))),
    })
}
