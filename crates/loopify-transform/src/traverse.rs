//! Document-order traversal driving a `Visitor`.
//!
//! Handlers only ever run on statements that sit in a statement list, because
//! that is where `StmtPath` can insert. Single-statement bodies (`if (c) s;`)
//! are lifted into a one-element list for the visit and wrapped in a block if
//! they grew.

use swc_common::DUMMY_SP;
use swc_ecma_ast::*;

use crate::builder;
use crate::path::StmtPath;
use crate::scope::Scope;
use crate::visitor::{NodeKind, RewriteState, Visitor};

/// Run `visitor` over every statement of `program`.
pub fn traverse(program: &mut Program, visitor: &Visitor, state: &mut RewriteState) {
    let mut scope = Scope::for_program(program);
    let mut traversal = Traversal {
        visitor,
        scope: &mut scope,
        state,
    };
    match program {
        Program::Module(module) => traversal.module(module),
        Program::Script(script) => traversal.stmts(&mut script.body),
    }
}

struct Traversal<'a> {
    visitor: &'a Visitor,
    scope: &'a mut Scope,
    state: &'a mut RewriteState,
}

impl Traversal<'_> {
    fn module(&mut self, module: &mut Module) {
        let items = std::mem::take(&mut module.body);
        let mut body = Vec::with_capacity(items.len());
        let mut run = Vec::new();
        for item in items {
            match item {
                ModuleItem::Stmt(stmt) => run.push(stmt),
                ModuleItem::ModuleDecl(mut decl) => {
                    self.flush(&mut run, &mut body);
                    self.module_decl(&mut decl);
                    body.push(ModuleItem::ModuleDecl(decl));
                }
            }
        }
        self.flush(&mut run, &mut body);
        module.body = body;
    }

    /// Visit a run of plain statements between module declarations.
    fn flush(&mut self, run: &mut Vec<Stmt>, body: &mut Vec<ModuleItem>) {
        if run.is_empty() {
            return;
        }
        self.stmts(run);
        body.extend(run.drain(..).map(ModuleItem::Stmt));
    }

    fn module_decl(&mut self, decl: &mut ModuleDecl) {
        match decl {
            ModuleDecl::ExportDecl(export) => self.decl(&mut export.decl),
            ModuleDecl::ExportDefaultDecl(export) => match &mut export.decl {
                DefaultDecl::Fn(fn_expr) => self.function(&mut fn_expr.function),
                DefaultDecl::Class(class_expr) => self.class(&mut class_expr.class),
                _ => {}
            },
            ModuleDecl::ExportDefaultExpr(export) => self.expr(&mut export.expr),
            _ => {}
        }
    }

    fn stmts(&mut self, stmts: &mut Vec<Stmt>) {
        let mut index = 0;
        while index < stmts.len() {
            index = self.visit_at(stmts, index) + 1;
        }
    }

    /// Visit `stmts[index]` and everything hoisted in front of it. Returns
    /// the node's final position.
    fn visit_at(&mut self, stmts: &mut Vec<Stmt>, index: usize) -> usize {
        let mut node = self.dispatch(stmts, index);

        let mut at = index;
        while at < node {
            let len = stmts.len();
            at = self.visit_at(stmts, at) + 1;
            node += stmts.len() - len;
        }

        self.children(&mut stmts[node]);
        node
    }

    fn dispatch(&mut self, stmts: &mut Vec<Stmt>, index: usize) -> usize {
        let Some(kind) = NodeKind::of(&stmts[index]) else {
            return index;
        };
        let visitor = self.visitor;
        let handlers = visitor.handlers(kind);
        if handlers.is_empty() {
            return index;
        }
        let mut path = StmtPath::new(stmts, index, &mut *self.scope);
        for handler in handlers {
            handler(&mut path, &mut *self.state);
        }
        path.index()
    }

    /// Visit a single-statement body.
    fn body(&mut self, body: &mut Stmt) {
        if let Stmt::Block(block) = body {
            self.stmts(&mut block.stmts);
            return;
        }
        let stmt = std::mem::replace(body, Stmt::Empty(EmptyStmt { span: DUMMY_SP }));
        let mut stmts = vec![stmt];
        self.stmts(&mut stmts);
        *body = match stmts.len() {
            1 => stmts.remove(0),
            _ => Stmt::Block(builder::block(stmts)),
        };
    }

    fn children(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Block(block) => self.stmts(&mut block.stmts),
            Stmt::Expr(expr_stmt) => self.expr(&mut expr_stmt.expr),
            Stmt::Decl(decl) => self.decl(decl),
            Stmt::Return(ret) => {
                if let Some(arg) = &mut ret.arg {
                    self.expr(arg);
                }
            }
            Stmt::Throw(throw) => self.expr(&mut throw.arg),
            Stmt::If(if_stmt) => {
                self.expr(&mut if_stmt.test);
                self.body(&mut if_stmt.cons);
                if let Some(alt) = &mut if_stmt.alt {
                    self.body(alt);
                }
            }
            Stmt::While(while_stmt) => {
                self.expr(&mut while_stmt.test);
                self.body(&mut while_stmt.body);
            }
            Stmt::DoWhile(do_while) => {
                self.body(&mut do_while.body);
                self.expr(&mut do_while.test);
            }
            Stmt::For(for_stmt) => {
                match &mut for_stmt.init {
                    Some(VarDeclOrExpr::VarDecl(var_decl)) => self.var_decl(var_decl),
                    Some(VarDeclOrExpr::Expr(expr)) => self.expr(expr),
                    None => {}
                }
                if let Some(test) = &mut for_stmt.test {
                    self.expr(test);
                }
                if let Some(update) = &mut for_stmt.update {
                    self.expr(update);
                }
                self.body(&mut for_stmt.body);
            }
            Stmt::ForIn(for_in) => {
                self.expr(&mut for_in.right);
                self.body(&mut for_in.body);
            }
            Stmt::ForOf(for_of) => {
                self.expr(&mut for_of.right);
                self.body(&mut for_of.body);
            }
            Stmt::Labeled(labeled) => self.body(&mut labeled.body),
            Stmt::Switch(switch) => {
                self.expr(&mut switch.discriminant);
                for case in &mut switch.cases {
                    if let Some(test) = &mut case.test {
                        self.expr(test);
                    }
                    self.stmts(&mut case.cons);
                }
            }
            Stmt::Try(try_stmt) => {
                self.stmts(&mut try_stmt.block.stmts);
                if let Some(handler) = &mut try_stmt.handler {
                    self.stmts(&mut handler.body.stmts);
                }
                if let Some(finalizer) = &mut try_stmt.finalizer {
                    self.stmts(&mut finalizer.stmts);
                }
            }
            Stmt::With(with) => {
                self.expr(&mut with.obj);
                self.body(&mut with.body);
            }
            _ => {}
        }
    }

    fn decl(&mut self, decl: &mut Decl) {
        match decl {
            Decl::Var(var_decl) => self.var_decl(var_decl),
            Decl::Fn(fn_decl) => self.function(&mut fn_decl.function),
            Decl::Class(class_decl) => self.class(&mut class_decl.class),
            _ => {}
        }
    }

    fn var_decl(&mut self, var_decl: &mut VarDecl) {
        for declarator in &mut var_decl.decls {
            self.pat(&mut declarator.name);
            if let Some(init) = &mut declarator.init {
                self.expr(init);
            }
        }
    }

    fn function(&mut self, function: &mut Function) {
        for param in &mut function.params {
            self.pat(&mut param.pat);
        }
        if let Some(body) = &mut function.body {
            self.stmts(&mut body.stmts);
        }
    }

    fn class(&mut self, class: &mut Class) {
        if let Some(super_class) = &mut class.super_class {
            self.expr(super_class);
        }
        for member in &mut class.body {
            match member {
                ClassMember::Method(method) => self.function(&mut method.function),
                ClassMember::PrivateMethod(method) => self.function(&mut method.function),
                ClassMember::Constructor(constructor) => {
                    if let Some(body) = &mut constructor.body {
                        self.stmts(&mut body.stmts);
                    }
                }
                ClassMember::ClassProp(prop) => {
                    if let Some(value) = &mut prop.value {
                        self.expr(value);
                    }
                }
                ClassMember::PrivateProp(prop) => {
                    if let Some(value) = &mut prop.value {
                        self.expr(value);
                    }
                }
                ClassMember::StaticBlock(block) => self.stmts(&mut block.body.stmts),
                _ => {}
            }
        }
    }

    /// Default values in patterns can hold function literals.
    fn pat(&mut self, pat: &mut Pat) {
        match pat {
            Pat::Array(array) => {
                for elem in array.elems.iter_mut().flatten() {
                    self.pat(elem);
                }
            }
            Pat::Object(object) => {
                for prop in &mut object.props {
                    match prop {
                        ObjectPatProp::KeyValue(kv) => self.pat(&mut kv.value),
                        ObjectPatProp::Assign(assign) => {
                            if let Some(value) = &mut assign.value {
                                self.expr(value);
                            }
                        }
                        ObjectPatProp::Rest(rest) => self.pat(&mut rest.arg),
                    }
                }
            }
            Pat::Rest(rest) => self.pat(&mut rest.arg),
            Pat::Assign(assign) => {
                self.pat(&mut assign.left);
                self.expr(&mut assign.right);
            }
            _ => {}
        }
    }

    fn args(&mut self, args: &mut [ExprOrSpread]) {
        for arg in args {
            self.expr(&mut arg.expr);
        }
    }

    fn prop(&mut self, prop: &mut Prop) {
        match prop {
            Prop::KeyValue(kv) => {
                self.prop_name(&mut kv.key);
                self.expr(&mut kv.value);
            }
            Prop::Assign(assign) => self.expr(&mut assign.value),
            Prop::Getter(getter) => {
                self.prop_name(&mut getter.key);
                if let Some(body) = &mut getter.body {
                    self.stmts(&mut body.stmts);
                }
            }
            Prop::Setter(setter) => {
                self.prop_name(&mut setter.key);
                if let Some(body) = &mut setter.body {
                    self.stmts(&mut body.stmts);
                }
            }
            Prop::Method(method) => {
                self.prop_name(&mut method.key);
                self.function(&mut method.function);
            }
            _ => {}
        }
    }

    fn prop_name(&mut self, key: &mut PropName) {
        if let PropName::Computed(computed) = key {
            self.expr(&mut computed.expr);
        }
    }

    /// Walk an expression looking for nested bodies.
    fn expr(&mut self, expr: &mut Expr) {
        match expr {
            Expr::Fn(fn_expr) => self.function(&mut fn_expr.function),
            Expr::Arrow(arrow) => {
                for param in &mut arrow.params {
                    self.pat(param);
                }
                match &mut *arrow.body {
                    BlockStmtOrExpr::BlockStmt(block) => self.stmts(&mut block.stmts),
                    BlockStmtOrExpr::Expr(body) => self.expr(body),
                }
            }
            Expr::Class(class_expr) => self.class(&mut class_expr.class),
            Expr::Array(array) => {
                for elem in array.elems.iter_mut().flatten() {
                    self.expr(&mut elem.expr);
                }
            }
            Expr::Object(object) => {
                for prop in &mut object.props {
                    match prop {
                        PropOrSpread::Spread(spread) => self.expr(&mut spread.expr),
                        PropOrSpread::Prop(prop) => self.prop(prop),
                    }
                }
            }
            Expr::Call(call) => {
                if let Callee::Expr(callee) = &mut call.callee {
                    self.expr(callee);
                }
                self.args(&mut call.args);
            }
            Expr::New(new) => {
                self.expr(&mut new.callee);
                if let Some(args) = &mut new.args {
                    self.args(args);
                }
            }
            Expr::Member(member) => {
                self.expr(&mut member.obj);
                if let MemberProp::Computed(computed) = &mut member.prop {
                    self.expr(&mut computed.expr);
                }
            }
            Expr::SuperProp(super_prop) => {
                if let SuperProp::Computed(computed) = &mut super_prop.prop {
                    self.expr(&mut computed.expr);
                }
            }
            Expr::Unary(unary) => self.expr(&mut unary.arg),
            Expr::Update(update) => self.expr(&mut update.arg),
            Expr::Bin(bin) => {
                self.expr(&mut bin.left);
                self.expr(&mut bin.right);
            }
            Expr::Assign(assign) => {
                if let AssignTarget::Simple(SimpleAssignTarget::Member(member)) = &mut assign.left {
                    self.expr(&mut member.obj);
                    if let MemberProp::Computed(computed) = &mut member.prop {
                        self.expr(&mut computed.expr);
                    }
                }
                self.expr(&mut assign.right);
            }
            Expr::Cond(cond) => {
                self.expr(&mut cond.test);
                self.expr(&mut cond.cons);
                self.expr(&mut cond.alt);
            }
            Expr::Seq(seq) => {
                for expr in &mut seq.exprs {
                    self.expr(expr);
                }
            }
            Expr::Paren(paren) => self.expr(&mut paren.expr),
            Expr::Tpl(tpl) => {
                for expr in &mut tpl.exprs {
                    self.expr(expr);
                }
            }
            Expr::TaggedTpl(tagged) => {
                self.expr(&mut tagged.tag);
                for expr in &mut tagged.tpl.exprs {
                    self.expr(expr);
                }
            }
            Expr::Await(await_expr) => self.expr(&mut await_expr.arg),
            Expr::Yield(yield_expr) => {
                if let Some(arg) = &mut yield_expr.arg {
                    self.expr(arg);
                }
            }
            Expr::OptChain(chain) => match &mut *chain.base {
                OptChainBase::Member(member) => self.expr(&mut member.obj),
                OptChainBase::Call(call) => {
                    self.expr(&mut call.callee);
                    self.args(&mut call.args);
                }
            },
            Expr::TsAs(ts) => self.expr(&mut ts.expr),
            Expr::TsNonNull(ts) => self.expr(&mut ts.expr),
            Expr::TsTypeAssertion(ts) => self.expr(&mut ts.expr),
            Expr::TsConstAssertion(ts) => self.expr(&mut ts.expr),
            Expr::TsSatisfies(ts) => self.expr(&mut ts.expr),
            Expr::TsInstantiation(ts) => self.expr(&mut ts.expr),
            Expr::JSXElement(element) => self.jsx_element(element),
            Expr::JSXFragment(fragment) => self.jsx_children(&mut fragment.children),
            _ => {}
        }
    }

    fn jsx_element(&mut self, element: &mut JSXElement) {
        for attr in &mut element.opening.attrs {
            match attr {
                JSXAttrOrSpread::SpreadElement(spread) => self.expr(&mut spread.expr),
                JSXAttrOrSpread::JSXAttr(attr) => match &mut attr.value {
                    Some(JSXAttrValue::JSXExprContainer(container)) => self.jsx_container(container),
                    Some(JSXAttrValue::JSXElement(nested)) => self.jsx_element(nested),
                    Some(JSXAttrValue::JSXFragment(fragment)) => self.jsx_children(&mut fragment.children),
                    _ => {}
                },
            }
        }
        self.jsx_children(&mut element.children);
    }

    fn jsx_children(&mut self, children: &mut [JSXElementChild]) {
        for child in children {
            match child {
                JSXElementChild::JSXExprContainer(container) => self.jsx_container(container),
                JSXElementChild::JSXSpreadChild(spread) => self.expr(&mut spread.expr),
                JSXElementChild::JSXElement(nested) => self.jsx_element(nested),
                JSXElementChild::JSXFragment(fragment) => self.jsx_children(&mut fragment.children),
                JSXElementChild::JSXText(_) => {}
            }
        }
    }

    fn jsx_container(&mut self, container: &mut JSXExprContainer) {
        if let JSXExpr::Expr(expr) = &mut container.expr {
            self.expr(expr);
        }
    }
}
