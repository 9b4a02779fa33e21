//! Fresh identifier generation.
//!
//! A `Scope` is built once per program from every identifier that appears in
//! it. Generated names are reserved as they are handed out, so a name is never
//! produced twice and never shadows or captures a user binding, whatever
//! lexical scope it ends up in.

use std::collections::HashSet;

use swc_ecma_ast::*;

use crate::builder;

#[derive(Debug, Default, Clone)]
pub struct Scope {
    taken: HashSet<String>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scope that knows every identifier used in `program`.
    pub fn for_program(program: &Program) -> Self {
        let mut collector = NameCollector::default();
        match program {
            Program::Module(module) => {
                for item in &module.body {
                    match item {
                        ModuleItem::Stmt(stmt) => collector.stmt(stmt),
                        ModuleItem::ModuleDecl(decl) => collector.module_decl(decl),
                    }
                }
            }
            Program::Script(script) => collector.stmts(&script.body),
        }
        Self {
            taken: collector.names,
        }
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Generate `_hint`, or `_hint2`, `_hint3`, ... if that is taken.
    pub fn fresh_name(&mut self, hint: &str) -> String {
        let base = format!("_{}", hint.trim_start_matches('_'));
        let mut candidate = base.clone();
        let mut counter = 1;
        while self.taken.contains(&candidate) {
            counter += 1;
            candidate = format!("{}{}", base, counter);
        }
        self.taken.insert(candidate.clone());
        candidate
    }

    pub fn fresh_ident(&mut self, hint: &str) -> Ident {
        builder::ident(&self.fresh_name(hint))
    }
}

/// Collects every identifier name, binding or reference, in a tree.
#[derive(Default)]
struct NameCollector {
    names: HashSet<String>,
}

impl NameCollector {
    fn ident(&mut self, ident: &Ident) {
        self.names.insert(ident.sym.to_string());
    }

    fn stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn module_decl(&mut self, decl: &ModuleDecl) {
        match decl {
            ModuleDecl::Import(import) => {
                for specifier in &import.specifiers {
                    match specifier {
                        ImportSpecifier::Named(named) => self.ident(&named.local),
                        ImportSpecifier::Default(default) => self.ident(&default.local),
                        ImportSpecifier::Namespace(ns) => self.ident(&ns.local),
                    }
                }
            }
            ModuleDecl::ExportDecl(export) => self.decl(&export.decl),
            ModuleDecl::ExportDefaultDecl(export) => match &export.decl {
                DefaultDecl::Fn(fn_expr) => {
                    if let Some(ident) = &fn_expr.ident {
                        self.ident(ident);
                    }
                    self.function(&fn_expr.function);
                }
                DefaultDecl::Class(class_expr) => {
                    if let Some(ident) = &class_expr.ident {
                        self.ident(ident);
                    }
                    self.class(&class_expr.class);
                }
                _ => {}
            },
            ModuleDecl::ExportDefaultExpr(export) => self.expr(&export.expr),
            ModuleDecl::ExportNamed(named) => {
                for specifier in &named.specifiers {
                    if let ExportSpecifier::Named(spec) = specifier {
                        if let ModuleExportName::Ident(ident) = &spec.orig {
                            self.ident(ident);
                        }
                    }
                }
            }
            ModuleDecl::TsImportEquals(import) => self.ident(&import.id),
            _ => {}
        }
    }

    fn module_items(&mut self, items: &[ModuleItem]) {
        for item in items {
            match item {
                ModuleItem::Stmt(stmt) => self.stmt(stmt),
                ModuleItem::ModuleDecl(decl) => self.module_decl(decl),
            }
        }
    }

    fn namespace_body(&mut self, body: &TsNamespaceBody) {
        match body {
            TsNamespaceBody::TsModuleBlock(block) => self.module_items(&block.body),
            TsNamespaceBody::TsNamespaceDecl(nested) => {
                self.ident(&nested.id);
                self.namespace_body(&nested.body);
            }
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(block) => self.stmts(&block.stmts),
            Stmt::Expr(expr_stmt) => self.expr(&expr_stmt.expr),
            Stmt::Decl(decl) => self.decl(decl),
            Stmt::Return(ret) => {
                if let Some(arg) = &ret.arg {
                    self.expr(arg);
                }
            }
            Stmt::Throw(throw) => self.expr(&throw.arg),
            Stmt::If(if_stmt) => {
                self.expr(&if_stmt.test);
                self.stmt(&if_stmt.cons);
                if let Some(alt) = &if_stmt.alt {
                    self.stmt(alt);
                }
            }
            Stmt::While(while_stmt) => {
                self.expr(&while_stmt.test);
                self.stmt(&while_stmt.body);
            }
            Stmt::DoWhile(do_while) => {
                self.stmt(&do_while.body);
                self.expr(&do_while.test);
            }
            Stmt::For(for_stmt) => {
                match &for_stmt.init {
                    Some(VarDeclOrExpr::VarDecl(var_decl)) => self.var_decl(var_decl),
                    Some(VarDeclOrExpr::Expr(expr)) => self.expr(expr),
                    None => {}
                }
                if let Some(test) = &for_stmt.test {
                    self.expr(test);
                }
                if let Some(update) = &for_stmt.update {
                    self.expr(update);
                }
                self.stmt(&for_stmt.body);
            }
            Stmt::ForIn(for_in) => {
                self.for_head(&for_in.left);
                self.expr(&for_in.right);
                self.stmt(&for_in.body);
            }
            Stmt::ForOf(for_of) => {
                self.for_head(&for_of.left);
                self.expr(&for_of.right);
                self.stmt(&for_of.body);
            }
            Stmt::Labeled(labeled) => {
                self.ident(&labeled.label);
                self.stmt(&labeled.body);
            }
            Stmt::Switch(switch) => {
                self.expr(&switch.discriminant);
                for case in &switch.cases {
                    if let Some(test) = &case.test {
                        self.expr(test);
                    }
                    self.stmts(&case.cons);
                }
            }
            Stmt::Try(try_stmt) => {
                self.stmts(&try_stmt.block.stmts);
                if let Some(handler) = &try_stmt.handler {
                    if let Some(param) = &handler.param {
                        self.pat(param);
                    }
                    self.stmts(&handler.body.stmts);
                }
                if let Some(finalizer) = &try_stmt.finalizer {
                    self.stmts(&finalizer.stmts);
                }
            }
            Stmt::With(with) => {
                self.expr(&with.obj);
                self.stmt(&with.body);
            }
            _ => {}
        }
    }

    fn for_head(&mut self, head: &ForHead) {
        match head {
            ForHead::VarDecl(var_decl) => self.var_decl(var_decl),
            ForHead::Pat(pat) => self.pat(pat),
            _ => {}
        }
    }

    fn decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Var(var_decl) => self.var_decl(var_decl),
            Decl::Fn(fn_decl) => {
                self.ident(&fn_decl.ident);
                self.function(&fn_decl.function);
            }
            Decl::Class(class_decl) => {
                self.ident(&class_decl.ident);
                self.class(&class_decl.class);
            }
            Decl::Using(using) => {
                for declarator in &using.decls {
                    self.pat(&declarator.name);
                    if let Some(init) = &declarator.init {
                        self.expr(init);
                    }
                }
            }
            Decl::TsEnum(ts_enum) => {
                self.ident(&ts_enum.id);
                for member in &ts_enum.members {
                    if let Some(init) = &member.init {
                        self.expr(init);
                    }
                }
            }
            Decl::TsModule(ts_module) => {
                if let TsModuleName::Ident(id) = &ts_module.id {
                    self.ident(id);
                }
                if let Some(body) = &ts_module.body {
                    self.namespace_body(body);
                }
            }
            Decl::TsInterface(interface) => self.ident(&interface.id),
            Decl::TsTypeAlias(alias) => self.ident(&alias.id),
        }
    }

    fn var_decl(&mut self, var_decl: &VarDecl) {
        for declarator in &var_decl.decls {
            self.pat(&declarator.name);
            if let Some(init) = &declarator.init {
                self.expr(init);
            }
        }
    }

    fn function(&mut self, function: &Function) {
        for param in &function.params {
            self.pat(&param.pat);
        }
        if let Some(body) = &function.body {
            self.stmts(&body.stmts);
        }
    }

    fn class(&mut self, class: &Class) {
        if let Some(super_class) = &class.super_class {
            self.expr(super_class);
        }
        for member in &class.body {
            match member {
                ClassMember::Method(method) => {
                    self.prop_name(&method.key);
                    self.function(&method.function);
                }
                ClassMember::PrivateMethod(method) => self.function(&method.function),
                ClassMember::Constructor(constructor) => {
                    for param in &constructor.params {
                        match param {
                            ParamOrTsParamProp::Param(param) => self.pat(&param.pat),
                            ParamOrTsParamProp::TsParamProp(prop) => match &prop.param {
                                TsParamPropParam::Ident(binding) => self.ident(&binding.id),
                                TsParamPropParam::Assign(assign) => {
                                    self.pat(&assign.left);
                                    self.expr(&assign.right);
                                }
                            },
                        }
                    }
                    if let Some(body) = &constructor.body {
                        self.stmts(&body.stmts);
                    }
                }
                ClassMember::ClassProp(prop) => {
                    self.prop_name(&prop.key);
                    if let Some(value) = &prop.value {
                        self.expr(value);
                    }
                }
                ClassMember::PrivateProp(prop) => {
                    if let Some(value) = &prop.value {
                        self.expr(value);
                    }
                }
                ClassMember::StaticBlock(block) => self.stmts(&block.body.stmts),
                _ => {}
            }
        }
    }

    fn pat(&mut self, pat: &Pat) {
        match pat {
            Pat::Ident(binding) => self.ident(&binding.id),
            Pat::Array(array) => {
                for elem in array.elems.iter().flatten() {
                    self.pat(elem);
                }
            }
            Pat::Rest(rest) => self.pat(&rest.arg),
            Pat::Object(object) => {
                for prop in &object.props {
                    match prop {
                        ObjectPatProp::KeyValue(kv) => {
                            self.prop_name(&kv.key);
                            self.pat(&kv.value);
                        }
                        ObjectPatProp::Assign(assign) => {
                            self.ident(&assign.key);
                            if let Some(value) = &assign.value {
                                self.expr(value);
                            }
                        }
                        ObjectPatProp::Rest(rest) => self.pat(&rest.arg),
                    }
                }
            }
            Pat::Assign(assign) => {
                self.pat(&assign.left);
                self.expr(&assign.right);
            }
            Pat::Expr(expr) => self.expr(expr),
            _ => {}
        }
    }

    fn prop_name(&mut self, key: &PropName) {
        if let PropName::Computed(computed) = key {
            self.expr(&computed.expr);
        }
    }

    fn exprs<'a>(&mut self, exprs: impl IntoIterator<Item = &'a ExprOrSpread>) {
        for expr in exprs {
            self.expr(&expr.expr);
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(ident) => self.ident(ident),
            Expr::Array(array) => self.exprs(array.elems.iter().flatten()),
            Expr::Object(object) => {
                for prop in &object.props {
                    match prop {
                        PropOrSpread::Spread(spread) => self.expr(&spread.expr),
                        PropOrSpread::Prop(prop) => self.prop(prop),
                    }
                }
            }
            Expr::Fn(fn_expr) => {
                if let Some(ident) = &fn_expr.ident {
                    self.ident(ident);
                }
                self.function(&fn_expr.function);
            }
            Expr::Arrow(arrow) => {
                for param in &arrow.params {
                    self.pat(param);
                }
                match &*arrow.body {
                    BlockStmtOrExpr::BlockStmt(block) => self.stmts(&block.stmts),
                    BlockStmtOrExpr::Expr(body) => self.expr(body),
                }
            }
            Expr::Class(class_expr) => {
                if let Some(ident) = &class_expr.ident {
                    self.ident(ident);
                }
                self.class(&class_expr.class);
            }
            Expr::SuperProp(super_prop) => {
                if let SuperProp::Computed(computed) = &super_prop.prop {
                    self.expr(&computed.expr);
                }
            }
            Expr::Unary(unary) => self.expr(&unary.arg),
            Expr::Update(update) => self.expr(&update.arg),
            Expr::Bin(bin) => {
                self.expr(&bin.left);
                self.expr(&bin.right);
            }
            Expr::Assign(assign) => {
                match &assign.left {
                    AssignTarget::Simple(SimpleAssignTarget::Ident(binding)) => {
                        self.ident(&binding.id)
                    }
                    AssignTarget::Simple(SimpleAssignTarget::Member(member)) => {
                        self.member(member)
                    }
                    AssignTarget::Pat(AssignTargetPat::Array(array)) => {
                        for elem in array.elems.iter().flatten() {
                            self.pat(elem);
                        }
                    }
                    AssignTarget::Pat(AssignTargetPat::Object(object)) => {
                        self.pat(&Pat::Object(object.clone()))
                    }
                    _ => {}
                }
                self.expr(&assign.right);
            }
            Expr::Member(member) => self.member(member),
            Expr::Cond(cond) => {
                self.expr(&cond.test);
                self.expr(&cond.cons);
                self.expr(&cond.alt);
            }
            Expr::Call(call) => {
                if let Callee::Expr(callee) = &call.callee {
                    self.expr(callee);
                }
                self.exprs(&call.args);
            }
            Expr::New(new) => {
                self.expr(&new.callee);
                if let Some(args) = &new.args {
                    self.exprs(args);
                }
            }
            Expr::Seq(seq) => {
                for expr in &seq.exprs {
                    self.expr(expr);
                }
            }
            Expr::Tpl(tpl) => {
                for expr in &tpl.exprs {
                    self.expr(expr);
                }
            }
            Expr::TaggedTpl(tagged) => {
                self.expr(&tagged.tag);
                for expr in &tagged.tpl.exprs {
                    self.expr(expr);
                }
            }
            Expr::Yield(yield_expr) => {
                if let Some(arg) = &yield_expr.arg {
                    self.expr(arg);
                }
            }
            Expr::Await(await_expr) => self.expr(&await_expr.arg),
            Expr::Paren(paren) => self.expr(&paren.expr),
            Expr::OptChain(opt_chain) => match &*opt_chain.base {
                OptChainBase::Member(member) => self.member(member),
                OptChainBase::Call(call) => {
                    self.expr(&call.callee);
                    self.exprs(&call.args);
                }
            },
            Expr::TsAs(ts_as) => self.expr(&ts_as.expr),
            Expr::TsNonNull(non_null) => self.expr(&non_null.expr),
            Expr::TsTypeAssertion(assertion) => self.expr(&assertion.expr),
            Expr::TsConstAssertion(assertion) => self.expr(&assertion.expr),
            Expr::TsSatisfies(satisfies) => self.expr(&satisfies.expr),
            Expr::TsInstantiation(instantiation) => self.expr(&instantiation.expr),
            Expr::JSXElement(element) => self.jsx_element(element),
            Expr::JSXFragment(fragment) => self.jsx_children(&fragment.children),
            _ => {}
        }
    }

    fn jsx_element(&mut self, element: &JSXElement) {
        if let JSXElementName::Ident(ident) = &element.opening.name {
            self.ident(ident);
        }
        for attr in &element.opening.attrs {
            match attr {
                JSXAttrOrSpread::SpreadElement(spread) => self.expr(&spread.expr),
                JSXAttrOrSpread::JSXAttr(attr) => match &attr.value {
                    Some(JSXAttrValue::JSXExprContainer(container)) => self.jsx_container(container),
                    Some(JSXAttrValue::JSXElement(nested)) => self.jsx_element(nested),
                    Some(JSXAttrValue::JSXFragment(fragment)) => self.jsx_children(&fragment.children),
                    _ => {}
                },
            }
        }
        self.jsx_children(&element.children);
    }

    fn jsx_children(&mut self, children: &[JSXElementChild]) {
        for child in children {
            match child {
                JSXElementChild::JSXExprContainer(container) => self.jsx_container(container),
                JSXElementChild::JSXSpreadChild(spread) => self.expr(&spread.expr),
                JSXElementChild::JSXElement(nested) => self.jsx_element(nested),
                JSXElementChild::JSXFragment(fragment) => self.jsx_children(&fragment.children),
                JSXElementChild::JSXText(_) => {}
            }
        }
    }

    fn jsx_container(&mut self, container: &JSXExprContainer) {
        if let JSXExpr::Expr(expr) = &container.expr {
            self.expr(expr);
        }
    }

    fn member(&mut self, member: &MemberExpr) {
        self.expr(&member.obj);
        if let MemberProp::Computed(computed) = &member.prop {
            self.expr(&computed.expr);
        }
    }

    fn prop(&mut self, prop: &Prop) {
        match prop {
            Prop::Shorthand(ident) => self.ident(ident),
            Prop::KeyValue(kv) => {
                self.prop_name(&kv.key);
                self.expr(&kv.value);
            }
            Prop::Assign(assign) => {
                self.ident(&assign.key);
                self.expr(&assign.value);
            }
            Prop::Getter(getter) => {
                self.prop_name(&getter.key);
                if let Some(body) = &getter.body {
                    self.stmts(&body.stmts);
                }
            }
            Prop::Setter(setter) => {
                self.prop_name(&setter.key);
                self.pat(&setter.param);
                if let Some(body) = &setter.body {
                    self.stmts(&body.stmts);
                }
            }
            Prop::Method(method) => {
                self.prop_name(&method.key);
                self.function(&method.function);
            }
        }
    }
}
