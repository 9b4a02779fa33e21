//! Test helpers: parsing shortcuts and a small evaluator.
//!
//! The evaluator covers the slice of JavaScript the rule tests are written in
//! plus everything the rules emit. Equivalence tests run a program before and
//! after rewriting and compare the final `results` binding, the uncaught
//! exception if any, and every line written with the global `log` function.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use swc_ecma_ast::*;

use crate::{optimize, RewriteReport, RuleConfig};

pub fn parse(source: &str) -> Program {
    loopify_parser::parse_program(source, "test.js")
        .expect("test source should parse")
        .program
}

pub fn parse_module(source: &str) -> Program {
    let program = loopify_parser::parse_program(source, "test.mjs")
        .expect("test source should parse")
        .program;
    assert!(matches!(program, Program::Module(_)), "expected a module");
    program
}

pub fn parse_stmts(source: &str) -> Vec<Stmt> {
    match parse(source) {
        Program::Script(script) => script.body,
        Program::Module(module) => module
            .body
            .into_iter()
            .filter_map(|item| match item {
                ModuleItem::Stmt(stmt) => Some(stmt),
                ModuleItem::ModuleDecl(_) => None,
            })
            .collect(),
    }
}

pub fn script_body(program: &Program) -> &[Stmt] {
    match program {
        Program::Script(script) => &script.body,
        Program::Module(_) => panic!("expected a script"),
    }
}

/// Parse and rewrite with every rule enabled.
pub fn optimized(source: &str) -> (Program, RewriteReport) {
    let mut program = parse(source);
    let report = optimize(&mut program, &RuleConfig::default());
    (program, report)
}

/// Observable result of running a program.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Rendered value of the top-level `results` binding
    pub results: String,
    pub thrown: Option<String>,
    pub log: Vec<String>,
}

pub fn run_source(source: &str) -> Outcome {
    run(&parse(source))
}

pub fn run(program: &Program) -> Outcome {
    let body: Vec<Stmt> = match program {
        Program::Script(script) => script.body.clone(),
        Program::Module(module) => module
            .body
            .iter()
            .filter_map(|item| match item {
                ModuleItem::Stmt(stmt) => Some(stmt.clone()),
                ModuleItem::ModuleDecl(_) => None,
            })
            .collect(),
    };

    let global = Env::root();
    let mut interpreter = Interpreter::default();
    let thrown = interpreter.exec_block(&body, &global).err().map(|v| v.render());
    let results = global
        .lookup("results")
        .map(|v| v.render())
        .unwrap_or_else(|| "<unset>".to_string());

    Outcome {
        results,
        thrown,
        log: interpreter.log,
    }
}

/// Rewrite `source`, run both versions and require identical outcomes.
pub fn assert_equivalent(source: &str) -> RewriteReport {
    let original = run_source(source);
    let (program, report) = optimized(source);
    assert!(!report.is_empty(), "nothing was rewritten");
    let rewritten = run(&program);
    assert_eq!(rewritten, original, "rewritten program diverged");
    report
}

const STEP_LIMIT: usize = 100_000;

#[derive(Clone)]
enum Value {
    Undefined,
    Null,
    Bool(bool),
    Num(f64),
    Str(Rc<str>),
    Array(Rc<RefCell<Vec<Value>>>),
    Object(Rc<RefCell<Vec<(String, Value)>>>),
    Func(Rc<Closure>),
    Builtin(&'static str),
    Error(Rc<ErrorValue>),
}

struct ErrorValue {
    name: String,
    message: String,
}

struct Closure {
    params: Vec<String>,
    body: Body,
    env: Rc<Env>,
}

enum Body {
    Block(Vec<Stmt>),
    Expr(Box<Expr>),
}

impl Value {
    fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    fn error(name: &str, message: impl Into<String>) -> Value {
        Value::Error(Rc::new(ErrorValue {
            name: name.to_string(),
            message: message.into(),
        }))
    }

    fn truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Num(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Num(n) => *n,
            Value::Str(s) => s.trim().parse().unwrap_or(f64::NAN),
            _ => f64::NAN,
        }
    }

    fn is_numeric_primitive(&self) -> bool {
        matches!(
            self,
            Value::Undefined | Value::Null | Value::Bool(_) | Value::Num(_)
        )
    }

    fn to_js_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Num(n) => format_number(*n),
            Value::Str(s) => s.to_string(),
            Value::Array(items) => items
                .borrow()
                .iter()
                .map(|v| match v {
                    Value::Undefined | Value::Null => String::new(),
                    other => other.to_js_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
            Value::Func(_) | Value::Builtin(_) => "function".to_string(),
            Value::Error(e) => format!("{}: {}", e.name, e.message),
        }
    }

    /// Structural rendering used to compare outcomes.
    fn render(&self) -> String {
        match self {
            Value::Str(s) => format!("{:?}", &**s),
            Value::Array(items) => {
                let items: Vec<String> = items.borrow().iter().map(Value::render).collect();
                format!("[{}]", items.join(","))
            }
            Value::Object(props) => {
                let props: Vec<String> = props
                    .borrow()
                    .iter()
                    .map(|(k, v)| format!("{}:{}", k, v.render()))
                    .collect();
                format!("{{{}}}", props.join(","))
            }
            other => other.to_js_string(),
        }
    }

    fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Num(_) => "number",
            Value::Str(_) => "string",
            Value::Func(_) | Value::Builtin(_) => "function",
            _ => "object",
        }
    }

    fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Func(a), Value::Func(b)) => Rc::ptr_eq(a, b),
            (Value::Error(a), Value::Error(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            _ => false,
        }
    }

    fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
            (Value::Num(_), Value::Str(_)) | (Value::Str(_), Value::Num(_)) => {
                self.to_number() == other.to_number()
            }
            _ => self.strict_eq(other),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn index_of(key: &Value) -> Option<usize> {
    match key {
        Value::Num(n) if *n >= 0.0 && n.fract() == 0.0 => Some(*n as usize),
        _ => None,
    }
}

fn type_error(message: impl Into<String>) -> Value {
    Value::error("TypeError", message)
}

fn string_literal(s: &Str) -> String {
    match &s.raw {
        Some(raw) => {
            let raw: &str = raw;
            raw.get(1..raw.len().saturating_sub(1)).unwrap_or_default().to_string()
        }
        None => String::new(),
    }
}

fn binding_name(pat: &Pat) -> String {
    match pat {
        Pat::Ident(binding) => binding.id.sym.to_string(),
        other => panic!("unsupported binding pattern in test program: {:?}", other),
    }
}

fn prop_key(key: &PropName) -> String {
    match key {
        PropName::Ident(id) => id.sym.to_string(),
        PropName::Str(s) => string_literal(s),
        PropName::Num(n) => format_number(n.value),
        other => panic!("unsupported property key in test program: {:?}", other),
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Value {
    let (l, r) = (left.to_number(), right.to_number());
    match op {
        BinaryOp::Add => {
            if left.is_numeric_primitive() && right.is_numeric_primitive() {
                Value::Num(l + r)
            } else {
                Value::Str(format!("{}{}", left.to_js_string(), right.to_js_string()).into())
            }
        }
        BinaryOp::Sub => Value::Num(l - r),
        BinaryOp::Mul => Value::Num(l * r),
        BinaryOp::Div => Value::Num(l / r),
        BinaryOp::Mod => Value::Num(l % r),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            let ordering = match (left, right) {
                (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
                _ => l.partial_cmp(&r),
            };
            let holds = match ordering {
                Some(ordering) => match op {
                    BinaryOp::Lt => ordering.is_lt(),
                    BinaryOp::LtEq => ordering.is_le(),
                    BinaryOp::Gt => ordering.is_gt(),
                    _ => ordering.is_ge(),
                },
                None => false,
            };
            Value::Bool(holds)
        }
        BinaryOp::EqEqEq => Value::Bool(left.strict_eq(right)),
        BinaryOp::NotEqEq => Value::Bool(!left.strict_eq(right)),
        BinaryOp::EqEq => Value::Bool(left.loose_eq(right)),
        BinaryOp::NotEq => Value::Bool(!left.loose_eq(right)),
        other => panic!("unsupported operator in test program: {:?}", other),
    }
}

fn compound(op: AssignOp) -> BinaryOp {
    match op {
        AssignOp::AddAssign => BinaryOp::Add,
        AssignOp::SubAssign => BinaryOp::Sub,
        AssignOp::MulAssign => BinaryOp::Mul,
        AssignOp::DivAssign => BinaryOp::Div,
        AssignOp::ModAssign => BinaryOp::Mod,
        other => panic!("unsupported assignment operator in test program: {:?}", other),
    }
}

#[derive(Default)]
struct Env {
    vars: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Env>>,
}

impl Env {
    fn root() -> Rc<Env> {
        let env = Rc::new(Env::default());
        env.declare("log", Value::Builtin("log"));
        env
    }

    fn child(parent: &Rc<Env>) -> Rc<Env> {
        Rc::new(Env {
            vars: RefCell::default(),
            parent: Some(Rc::clone(parent)),
        })
    }

    fn declare(&self, name: &str, value: Value) {
        self.vars.borrow_mut().insert(name.to_string(), value);
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.vars.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|parent| parent.lookup(name))
    }

    fn assign(&self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.vars.borrow_mut().get_mut(name) {
            *slot = value;
            return true;
        }
        match &self.parent {
            Some(parent) => parent.assign(name, value),
            None => false,
        }
    }
}

enum Flow {
    Normal,
    Return(Value),
    Break,
    Continue,
}

/// `Err` carries a thrown JavaScript value.
type Eval<T> = Result<T, Value>;

#[derive(Default)]
struct Interpreter {
    log: Vec<String>,
    steps: usize,
}

impl Interpreter {
    fn tick(&mut self) {
        self.steps += 1;
        assert!(self.steps < STEP_LIMIT, "test program did not terminate");
    }

    fn exec_block(&mut self, stmts: &[Stmt], env: &Rc<Env>) -> Eval<Flow> {
        for stmt in stmts {
            if let Stmt::Decl(Decl::Fn(fn_decl)) = stmt {
                let func = self.closure(&fn_decl.function, env);
                env.declare(&fn_decl.ident.sym, func);
            }
        }
        for stmt in stmts {
            match self.exec(stmt, env)? {
                Flow::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec(&mut self, stmt: &Stmt, env: &Rc<Env>) -> Eval<Flow> {
        self.tick();
        match stmt {
            Stmt::Empty(_) | Stmt::Decl(Decl::Fn(_)) => Ok(Flow::Normal),
            Stmt::Expr(expr_stmt) => {
                self.eval(&expr_stmt.expr, env)?;
                Ok(Flow::Normal)
            }
            Stmt::Decl(Decl::Var(var_decl)) => {
                self.declare_vars(var_decl, env)?;
                Ok(Flow::Normal)
            }
            Stmt::Block(block) => self.exec_block(&block.stmts, &Env::child(env)),
            Stmt::If(if_stmt) => {
                if self.eval(&if_stmt.test, env)?.truthy() {
                    self.exec(&if_stmt.cons, env)
                } else if let Some(alt) = &if_stmt.alt {
                    self.exec(alt, env)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::For(for_stmt) => {
                let scope = Env::child(env);
                match &for_stmt.init {
                    Some(VarDeclOrExpr::VarDecl(var_decl)) => self.declare_vars(var_decl, &scope)?,
                    Some(VarDeclOrExpr::Expr(expr)) => {
                        self.eval(expr, &scope)?;
                    }
                    None => {}
                }
                loop {
                    if let Some(test) = &for_stmt.test {
                        if !self.eval(test, &scope)?.truthy() {
                            break;
                        }
                    }
                    match self.exec(&for_stmt.body, &scope)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                    if let Some(update) = &for_stmt.update {
                        self.eval(update, &scope)?;
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::While(while_stmt) => {
                while self.eval(&while_stmt.test, env)?.truthy() {
                    match self.exec(&while_stmt.body, env)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Return(ret) => {
                let value = match &ret.arg {
                    Some(arg) => self.eval(arg, env)?,
                    None => Value::Undefined,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Break(_) => Ok(Flow::Break),
            Stmt::Continue(_) => Ok(Flow::Continue),
            Stmt::Throw(throw) => Err(self.eval(&throw.arg, env)?),
            Stmt::Try(try_stmt) => {
                let result = self.exec_block(&try_stmt.block.stmts, &Env::child(env));
                let result = match (result, &try_stmt.handler) {
                    (Err(thrown), Some(handler)) => {
                        let scope = Env::child(env);
                        if let Some(param) = &handler.param {
                            scope.declare(&binding_name(param), thrown);
                        }
                        self.exec_block(&handler.body.stmts, &scope)
                    }
                    (result, _) => result,
                };
                if let Some(finalizer) = &try_stmt.finalizer {
                    match self.exec_block(&finalizer.stmts, &Env::child(env))? {
                        Flow::Normal => {}
                        other => return Ok(other),
                    }
                }
                result
            }
            other => panic!("unsupported statement in test program: {:?}", other),
        }
    }

    fn declare_vars(&mut self, var_decl: &VarDecl, env: &Rc<Env>) -> Eval<()> {
        for declarator in &var_decl.decls {
            let value = match &declarator.init {
                Some(init) => self.eval(init, env)?,
                None => Value::Undefined,
            };
            env.declare(&binding_name(&declarator.name), value);
        }
        Ok(())
    }

    fn closure(&self, function: &Function, env: &Rc<Env>) -> Value {
        let body = function
            .body
            .as_ref()
            .map(|body| body.stmts.clone())
            .unwrap_or_default();
        Value::Func(Rc::new(Closure {
            params: function.params.iter().map(|p| binding_name(&p.pat)).collect(),
            body: Body::Block(body),
            env: Rc::clone(env),
        }))
    }

    fn lookup(&self, name: &str, env: &Rc<Env>) -> Eval<Value> {
        if name == "undefined" {
            return Ok(Value::Undefined);
        }
        env.lookup(name)
            .ok_or_else(|| Value::error("ReferenceError", format!("{} is not defined", name)))
    }

    fn eval(&mut self, expr: &Expr, env: &Rc<Env>) -> Eval<Value> {
        self.tick();
        match expr {
            Expr::Lit(lit) => Ok(match lit {
                Lit::Num(n) => Value::Num(n.value),
                Lit::Bool(b) => Value::Bool(b.value),
                Lit::Null(_) => Value::Null,
                Lit::Str(s) => Value::Str(string_literal(s).into()),
                other => panic!("unsupported literal in test program: {:?}", other),
            }),
            Expr::Ident(id) => self.lookup(&id.sym, env),
            Expr::This(_) => Ok(Value::Undefined),
            Expr::Paren(paren) => self.eval(&paren.expr, env),
            Expr::Seq(seq) => {
                let mut last = Value::Undefined;
                for expr in &seq.exprs {
                    last = self.eval(expr, env)?;
                }
                Ok(last)
            }
            Expr::Array(array) => {
                let mut items = Vec::with_capacity(array.elems.len());
                for elem in &array.elems {
                    match elem {
                        Some(elem) if elem.spread.is_none() => items.push(self.eval(&elem.expr, env)?),
                        Some(_) => panic!("spread is not supported in test programs"),
                        None => items.push(Value::Undefined),
                    }
                }
                Ok(Value::array(items))
            }
            Expr::Object(object) => {
                let mut props = Vec::with_capacity(object.props.len());
                for prop in &object.props {
                    let PropOrSpread::Prop(prop) = prop else {
                        panic!("spread is not supported in test programs");
                    };
                    match &**prop {
                        Prop::KeyValue(kv) => props.push((prop_key(&kv.key), self.eval(&kv.value, env)?)),
                        Prop::Shorthand(id) => props.push((id.sym.to_string(), self.lookup(&id.sym, env)?)),
                        Prop::Method(method) => {
                            props.push((prop_key(&method.key), self.closure(&method.function, env)))
                        }
                        other => panic!("unsupported property in test program: {:?}", other),
                    }
                }
                Ok(Value::Object(Rc::new(RefCell::new(props))))
            }
            Expr::Arrow(arrow) => {
                let body = match &*arrow.body {
                    BlockStmtOrExpr::BlockStmt(block) => Body::Block(block.stmts.clone()),
                    BlockStmtOrExpr::Expr(expr) => Body::Expr(expr.clone()),
                };
                Ok(Value::Func(Rc::new(Closure {
                    params: arrow.params.iter().map(binding_name).collect(),
                    body,
                    env: Rc::clone(env),
                })))
            }
            Expr::Fn(fn_expr) => Ok(self.closure(&fn_expr.function, env)),
            Expr::Call(call) => self.eval_call(call, env),
            Expr::New(new) => self.eval_new(new, env),
            Expr::Member(member) => {
                let obj = self.eval(&member.obj, env)?;
                let key = self.member_key(&member.prop, env)?;
                self.get(&obj, &key)
            }
            Expr::Assign(assign) => self.eval_assign(assign, env),
            Expr::Update(update) => self.eval_update(update, env),
            Expr::Bin(bin) => match bin.op {
                BinaryOp::LogicalAnd => {
                    let left = self.eval(&bin.left, env)?;
                    if left.truthy() {
                        self.eval(&bin.right, env)
                    } else {
                        Ok(left)
                    }
                }
                BinaryOp::LogicalOr => {
                    let left = self.eval(&bin.left, env)?;
                    if left.truthy() {
                        Ok(left)
                    } else {
                        self.eval(&bin.right, env)
                    }
                }
                op => {
                    let left = self.eval(&bin.left, env)?;
                    let right = self.eval(&bin.right, env)?;
                    Ok(arithmetic(op, &left, &right))
                }
            },
            Expr::Unary(unary) => {
                let value = self.eval(&unary.arg, env)?;
                Ok(match unary.op {
                    UnaryOp::Bang => Value::Bool(!value.truthy()),
                    UnaryOp::Minus => Value::Num(-value.to_number()),
                    UnaryOp::Plus => Value::Num(value.to_number()),
                    UnaryOp::Void => Value::Undefined,
                    UnaryOp::TypeOf => Value::Str(value.type_of().into()),
                    other => panic!("unsupported unary operator in test program: {:?}", other),
                })
            }
            Expr::Cond(cond) => {
                if self.eval(&cond.test, env)?.truthy() {
                    self.eval(&cond.cons, env)
                } else {
                    self.eval(&cond.alt, env)
                }
            }
            other => panic!("unsupported expression in test program: {:?}", other),
        }
    }

    fn eval_args(&mut self, args: &[ExprOrSpread], env: &Rc<Env>) -> Eval<Vec<Value>> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            assert!(arg.spread.is_none(), "spread is not supported in test programs");
            values.push(self.eval(&arg.expr, env)?);
        }
        Ok(values)
    }

    fn member_key(&mut self, prop: &MemberProp, env: &Rc<Env>) -> Eval<Value> {
        match prop {
            MemberProp::Ident(name) => Ok(Value::Str(name.sym.to_string().into())),
            MemberProp::Computed(computed) => self.eval(&computed.expr, env),
            MemberProp::PrivateName(_) => panic!("private names are not supported in test programs"),
        }
    }

    fn get(&self, obj: &Value, key: &Value) -> Eval<Value> {
        let name = key.to_js_string();
        match obj {
            Value::Array(items) => match index_of(key) {
                Some(index) => Ok(items.borrow().get(index).cloned().unwrap_or(Value::Undefined)),
                None if name == "length" => Ok(Value::Num(items.borrow().len() as f64)),
                None => Ok(Value::Undefined),
            },
            Value::Str(s) if name == "length" => Ok(Value::Num(s.chars().count() as f64)),
            Value::Object(props) => Ok(props
                .borrow()
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.clone())
                .unwrap_or(Value::Undefined)),
            Value::Error(error) => Ok(match name.as_str() {
                "name" => Value::Str(error.name.as_str().into()),
                "message" => Value::Str(error.message.as_str().into()),
                _ => Value::Undefined,
            }),
            Value::Undefined | Value::Null => Err(type_error(format!(
                "Cannot read properties of {} (reading '{}')",
                obj.to_js_string(),
                name
            ))),
            _ => Ok(Value::Undefined),
        }
    }

    fn set(&self, obj: &Value, key: &Value, value: Value) -> Eval<()> {
        match obj {
            Value::Array(items) => {
                let mut items = items.borrow_mut();
                match index_of(key) {
                    Some(index) => {
                        if index >= items.len() {
                            items.resize(index + 1, Value::Undefined);
                        }
                        items[index] = value;
                    }
                    None if key.to_js_string() == "length" => {
                        let len = index_of(&value).ok_or_else(|| Value::error("RangeError", "Invalid array length"))?;
                        items.resize(len, Value::Undefined);
                    }
                    None => panic!("named array properties are not supported in test programs"),
                }
                Ok(())
            }
            Value::Object(props) => {
                let name = key.to_js_string();
                let mut props = props.borrow_mut();
                match props.iter_mut().find(|(k, _)| *k == name) {
                    Some((_, slot)) => *slot = value,
                    None => props.push((name, value)),
                }
                Ok(())
            }
            other => Err(type_error(format!(
                "Cannot set properties of {}",
                other.to_js_string()
            ))),
        }
    }

    fn eval_assign(&mut self, assign: &AssignExpr, env: &Rc<Env>) -> Eval<Value> {
        match &assign.left {
            AssignTarget::Simple(SimpleAssignTarget::Ident(binding)) => {
                let name: &str = &binding.id.sym;
                let value = if assign.op == AssignOp::Assign {
                    self.eval(&assign.right, env)?
                } else {
                    let current = self.lookup(name, env)?;
                    let right = self.eval(&assign.right, env)?;
                    arithmetic(compound(assign.op), &current, &right)
                };
                if !env.assign(name, value.clone()) {
                    return Err(Value::error("ReferenceError", format!("{} is not defined", name)));
                }
                Ok(value)
            }
            AssignTarget::Simple(SimpleAssignTarget::Member(member)) => {
                let obj = self.eval(&member.obj, env)?;
                let key = self.member_key(&member.prop, env)?;
                let value = if assign.op == AssignOp::Assign {
                    self.eval(&assign.right, env)?
                } else {
                    let current = self.get(&obj, &key)?;
                    let right = self.eval(&assign.right, env)?;
                    arithmetic(compound(assign.op), &current, &right)
                };
                self.set(&obj, &key, value.clone())?;
                Ok(value)
            }
            _ => panic!("unsupported assignment target in test program"),
        }
    }

    fn eval_update(&mut self, update: &UpdateExpr, env: &Rc<Env>) -> Eval<Value> {
        let delta = match update.op {
            UpdateOp::PlusPlus => 1.0,
            UpdateOp::MinusMinus => -1.0,
        };
        let old = match &*update.arg {
            Expr::Ident(id) => {
                let old = self.lookup(&id.sym, env)?.to_number();
                if !env.assign(&id.sym, Value::Num(old + delta)) {
                    return Err(Value::error("ReferenceError", format!("{} is not defined", id.sym)));
                }
                old
            }
            Expr::Member(member) => {
                let obj = self.eval(&member.obj, env)?;
                let key = self.member_key(&member.prop, env)?;
                let old = self.get(&obj, &key)?.to_number();
                self.set(&obj, &key, Value::Num(old + delta))?;
                old
            }
            other => panic!("unsupported update target in test program: {:?}", other),
        };
        Ok(Value::Num(if update.prefix { old + delta } else { old }))
    }

    fn eval_call(&mut self, call: &CallExpr, env: &Rc<Env>) -> Eval<Value> {
        let Callee::Expr(callee) = &call.callee else {
            panic!("unsupported callee in test program");
        };
        if let Expr::Member(member) = &**callee {
            let this = self.eval(&member.obj, env)?;
            let key = self.member_key(&member.prop, env)?;
            let args = self.eval_args(&call.args, env)?;
            return self.call_method(&this, &key, args);
        }
        let func = self.eval(callee, env)?;
        let args = self.eval_args(&call.args, env)?;
        self.call(&func, args)
    }

    fn eval_new(&mut self, new: &NewExpr, env: &Rc<Env>) -> Eval<Value> {
        let Expr::Ident(ctor) = &*new.callee else {
            panic!("unsupported constructor in test program");
        };
        let args = match &new.args {
            Some(args) => self.eval_args(args, env)?,
            None => Vec::new(),
        };
        match &*ctor.sym {
            "Array" => match args.as_slice() {
                [Value::Num(n)] => {
                    let len = index_of(&Value::Num(*n))
                        .ok_or_else(|| Value::error("RangeError", "Invalid array length"))?;
                    Ok(Value::array(vec![Value::Undefined; len]))
                }
                _ => Ok(Value::array(args)),
            },
            name @ ("Error" | "TypeError" | "RangeError") => {
                let message = args.first().map(Value::to_js_string).unwrap_or_default();
                Ok(Value::error(name, message))
            }
            other => panic!("unsupported constructor in test program: {}", other),
        }
    }

    fn call_method(&mut self, this: &Value, key: &Value, args: Vec<Value>) -> Eval<Value> {
        if let (Value::Array(items), Value::Str(name)) = (this, key) {
            let items = Rc::clone(items);
            if let Some(result) = self.array_method(&items, name, args.clone()) {
                return result;
            }
        }
        let func = self.get(this, key)?;
        self.call(&func, args)
    }

    fn call(&mut self, func: &Value, args: Vec<Value>) -> Eval<Value> {
        match func {
            Value::Func(closure) => {
                let scope = Env::child(&closure.env);
                let mut args = args.into_iter();
                for param in &closure.params {
                    scope.declare(param, args.next().unwrap_or(Value::Undefined));
                }
                match &closure.body {
                    Body::Expr(expr) => self.eval(expr, &scope),
                    Body::Block(stmts) => match self.exec_block(stmts, &scope)? {
                        Flow::Return(value) => Ok(value),
                        _ => Ok(Value::Undefined),
                    },
                }
            }
            Value::Builtin("log") => {
                let line: Vec<String> = args.iter().map(Value::to_js_string).collect();
                self.log.push(line.join(" "));
                Ok(Value::Undefined)
            }
            other => Err(type_error(format!("{} is not a function", other.to_js_string()))),
        }
    }

    /// Built-in array methods, following the native algorithms: the length
    /// is read once up front and indices past the current end are skipped.
    fn array_method(&mut self, items: &Rc<RefCell<Vec<Value>>>, name: &str, args: Vec<Value>) -> Option<Eval<Value>> {
        let this = Value::Array(Rc::clone(items));
        let callback = args.first().cloned().unwrap_or(Value::Undefined);
        let result = match name {
            "push" => {
                let mut items = items.borrow_mut();
                items.extend(args);
                Ok(Value::Num(items.len() as f64))
            }
            "concat" => {
                let mut out = items.borrow().clone();
                for arg in args {
                    match arg {
                        Value::Array(other) => out.extend(other.borrow().iter().cloned()),
                        other => out.push(other),
                    }
                }
                Ok(Value::array(out))
            }
            "forEach" | "map" | "filter" | "some" | "every" => self.iterate(name, &this, items, &callback),
            "reduce" => self.fold(false, &this, items, &args),
            "reduceRight" => self.fold(true, &this, items, &args),
            _ => return None,
        };
        Some(result)
    }

    fn iterate(&mut self, name: &str, this: &Value, items: &Rc<RefCell<Vec<Value>>>, callback: &Value) -> Eval<Value> {
        let len = items.borrow().len();
        let mut mapped = vec![Value::Undefined; len];
        let mut kept = Vec::new();
        for index in 0..len {
            let value = items.borrow().get(index).cloned();
            let Some(value) = value else {
                continue;
            };
            let result = self.call(callback, vec![value.clone(), Value::Num(index as f64), this.clone()])?;
            match name {
                "map" => mapped[index] = result,
                "filter" => {
                    if result.truthy() {
                        kept.push(value);
                    }
                }
                "some" => {
                    if result.truthy() {
                        return Ok(Value::Bool(true));
                    }
                }
                "every" => {
                    if !result.truthy() {
                        return Ok(Value::Bool(false));
                    }
                }
                _ => {}
            }
        }
        Ok(match name {
            "map" => Value::array(mapped),
            "filter" => Value::array(kept),
            "some" => Value::Bool(false),
            "every" => Value::Bool(true),
            _ => Value::Undefined,
        })
    }

    fn fold(&mut self, from_end: bool, this: &Value, items: &Rc<RefCell<Vec<Value>>>, args: &[Value]) -> Eval<Value> {
        let callback = args.first().cloned().unwrap_or(Value::Undefined);
        let len = items.borrow().len();
        let mut order: Vec<usize> = (0..len).collect();
        if from_end {
            order.reverse();
        }
        let mut order = order.into_iter();
        let mut acc = match args.get(1) {
            Some(seed) => seed.clone(),
            None => match order.next() {
                Some(first) => items.borrow()[first].clone(),
                None => return Err(type_error("Reduce of empty array with no initial value")),
            },
        };
        for index in order {
            let value = items.borrow().get(index).cloned();
            let Some(value) = value else {
                continue;
            };
            acc = self.call(&callback, vec![acc, value, Value::Num(index as f64), this.clone()])?;
        }
        Ok(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluator_basics() {
        let outcome = run_source(
            r#"
            function add(a, b) { return a + b; }
            let xs = [1, 2];
            xs.push(add(1, 2));
            let total = 0;
            for (let i = 0; i < xs.length; i++) { total += xs[i]; }
            log("total", total);
            let results = [xs, total, "s", xs.length === 3];
            "#,
        );
        assert_eq!(outcome.results, r#"[[1,2,3],6,"s",true]"#);
        assert_eq!(outcome.log, ["total 6"]);
        assert_eq!(outcome.thrown, None);
    }

    #[test]
    fn test_native_methods() {
        let outcome = run_source(
            r#"
            let xs = [1, 2, 3];
            let results = [
                xs.map(x => x * 2),
                xs.filter(x => x !== 2),
                xs.reduce((a, b) => a + b),
                xs.reduceRight((a, b) => a + "" + b, ""),
                xs.some(x => x > 2),
                xs.every(x => x > 2)
            ];
            "#,
        );
        assert_eq!(outcome.results, r#"[[2,4,6],[1,3],6,"321",true,false]"#);
    }

    #[test]
    fn test_uncaught_error() {
        let outcome = run_source("let results = 1;\nthrow new TypeError(\"boom\");");
        assert_eq!(outcome.results, "1");
        assert_eq!(outcome.thrown.as_deref(), Some("TypeError: boom"));
    }
}
