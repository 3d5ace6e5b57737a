//! The tree-walking evaluator.
//!
//! Evaluation is a function of (AST node, scope stack) to a boxed value,
//! threaded through a [`Flow`] sum so that `return` and `break` propagate as
//! signals rather than errors. Signals are matched precisely at their
//! construct: `return` at function invocation, `break` at the loop head.
//! Every operator application, call, and container construction goes through
//! the engine's overload registry.

use std::rc::Rc;

use smallvec::SmallVec;

use crate::{
    dispatch::{CallContext, dispatch_error},
    engine::Engine,
    exception::{Exception, RunResult},
    expressions::{Ast, Identifier, Node, NodeLoc, Span},
    function::{FnValue, ScriptFn},
    intern::StringId,
    io::PrintWriter,
    pod::PodView,
    scope::ScopeStack,
    value::BoxedValue,
};

/// Argument lists; most calls pass at most a handful of values.
pub(crate) type Args = SmallVec<[BoxedValue; 4]>;

/// Result of evaluating one node: a value, or a control-flow signal that is
/// still travelling to its matching construct.
#[derive(Debug)]
pub(crate) enum Flow {
    Normal(BoxedValue),
    Return(BoxedValue, Span),
    Break(Span),
}

pub(crate) type EvalResult = Result<Flow, Exception>;

/// Extracts the value of an expression-position node, forwarding control
/// signals (a `return` inside a function body travelling outward) to the
/// caller.
macro_rules! value {
    ($self:ident, $node:expr) => {
        match $self.eval($node)? {
            Flow::Normal(value) => value,
            flow => return Ok(flow),
        }
    };
}

/// One evaluation activation: an engine handle, the active print writer, the
/// scope stack, and the script-call depth for the recursion guard.
pub(crate) struct Interp<'e> {
    engine: &'e Engine,
    print: &'e mut dyn PrintWriter,
    scopes: ScopeStack,
    depth: usize,
}

impl<'e> Interp<'e> {
    pub fn new(engine: &'e Engine, print: &'e mut dyn PrintWriter, scopes: ScopeStack) -> Self {
        Self::nested(engine, print, scopes, 0)
    }

    pub fn nested(engine: &'e Engine, print: &'e mut dyn PrintWriter, scopes: ScopeStack, depth: usize) -> Self {
        Self {
            engine,
            print,
            scopes,
            depth,
        }
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.depth()
    }

    /// Evaluates top-level statements in the bottom (global) frame.
    ///
    /// The script result is the last statement's value, or the value carried
    /// by a top-level `return`. A `break` with no enclosing loop is an error.
    pub fn eval_file(&mut self, ast: &Ast) -> RunResult<BoxedValue> {
        let mut last = BoxedValue::void();
        for statement in &ast.body {
            match self.eval(statement)? {
                Flow::Normal(value) => last = value,
                Flow::Return(value, _) => return Ok(value),
                Flow::Break(span) => return Err(Exception::eval_at("Non-loop break", span)),
            }
        }
        Ok(last)
    }

    pub fn eval(&mut self, node: &NodeLoc) -> EvalResult {
        let span = node.span;
        match &node.node {
            Node::Int(value) => Ok(Flow::Normal(BoxedValue::new(*value))),
            Node::Float(value) => Ok(Flow::Normal(BoxedValue::new(*value))),
            Node::Bool(value) => Ok(Flow::Normal(BoxedValue::new(*value))),
            Node::Char(value) => Ok(Flow::Normal(BoxedValue::new(*value))),
            Node::Str(value) => Ok(Flow::Normal(BoxedValue::new(value.clone()))),
            Node::Id(id) => match self.scopes.lookup(id.name) {
                Some(value) => Ok(Flow::Normal(value)),
                None => Err(self.unbound(id.name, id.span)),
            },
            Node::VarDecl(id) => {
                let value = BoxedValue::void();
                self.scopes.declare(id.name, value.clone());
                Ok(Flow::Normal(value))
            }
            Node::Assign { target, op, value } => self.eval_assign(target, *op, value, span),
            Node::Binary { left, op, right } => {
                let lhs = value!(self, left);
                let rhs = value!(self, right);
                let result = self.call_registry(*op, &[lhs, rhs], span)?;
                Ok(Flow::Normal(result))
            }
            Node::Unary { op, operand } => {
                let value = value!(self, operand);
                let result = self.call_registry(*op, &[value], span)?;
                Ok(Flow::Normal(result))
            }
            Node::Call { name, args } => {
                let mut values = Args::new();
                for arg in args {
                    values.push(value!(self, arg));
                }
                self.eval_call(*name, &values, span).map(Flow::Normal)
            }
            Node::MethodCall { object, name, args } => {
                let mut values = Args::new();
                values.push(value!(self, object));
                for arg in args {
                    values.push(value!(self, arg));
                }
                let result = self.call_registry(name.name, &values, span)?;
                Ok(Flow::Normal(result))
            }
            Node::FieldAccess { object, name } => {
                let value = value!(self, object);
                let result = self.call_registry(name.name, &[value], span)?;
                Ok(Flow::Normal(result))
            }
            Node::Index { object, index } => {
                let container = value!(self, object);
                let index = value!(self, index);
                let id = self.engine.ids().index;
                let result = self.call_registry(id, &[container, index], span)?;
                Ok(Flow::Normal(result))
            }
            Node::Array(elements) => {
                let ids = *self.engine.ids();
                let vector = self.call_registry(ids.vector, &[], span)?;
                for element in elements {
                    let value = value!(self, element);
                    self.call_registry(ids.push_back, &[vector.clone(), value], element.span)?;
                }
                Ok(Flow::Normal(vector))
            }
            Node::MapLit(pairs) => {
                let ids = *self.engine.ids();
                let map = self.call_registry(ids.map, &[], span)?;
                for (key, value) in pairs {
                    let key_value = value!(self, key);
                    let pair_value = value!(self, value);
                    self.call_registry(ids.insert, &[map.clone(), key_value, pair_value], key.span)?;
                }
                Ok(Flow::Normal(map))
            }
            Node::Range { lo, hi } => {
                let lo_value = value!(self, lo);
                let hi_value = value!(self, hi);
                let id = self.engine.ids().range;
                let result = self.call_registry(id, &[lo_value, hi_value], span)?;
                Ok(Flow::Normal(result))
            }
            Node::Lambda { params, body } => {
                let function = ScriptFn::new(
                    None,
                    params.iter().map(|p| p.name).collect(),
                    body.clone(),
                    self.scopes.capture(),
                );
                Ok(Flow::Normal(BoxedValue::new(FnValue::new(Rc::new(function)))))
            }
            Node::Def { name, params, body } => {
                let function = ScriptFn::new(
                    Some(name.name),
                    params.iter().map(|p| p.name).collect(),
                    body.clone(),
                    self.scopes.capture(),
                );
                self.engine.registry().register(name.name, Rc::new(function));
                Ok(Flow::Normal(BoxedValue::void()))
            }
            Node::Block(statements) => {
                self.scopes.push_frame();
                let result = self.eval_block(statements);
                self.scopes.pop_frame();
                result
            }
            Node::If {
                cond,
                then_block,
                else_block,
            } => {
                let cond_value = value!(self, cond);
                if self.truthy(&cond_value, cond.span)? {
                    self.eval(then_block)
                } else if let Some(else_block) = else_block {
                    self.eval(else_block)
                } else {
                    Ok(Flow::Normal(BoxedValue::void()))
                }
            }
            Node::While { cond, body } => {
                loop {
                    let cond_value = value!(self, cond);
                    if !self.truthy(&cond_value, cond.span)? {
                        break;
                    }
                    match self.eval(body)? {
                        Flow::Normal(_) => {}
                        Flow::Break(_) => break,
                        flow @ Flow::Return(..) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal(BoxedValue::void()))
            }
            Node::For { init, cond, step, body } => {
                // The init declaration lives in its own frame so the loop
                // variable does not leak into the enclosing scope.
                self.scopes.push_frame();
                let result = self.eval_for(init.as_deref(), cond.as_deref(), step.as_deref(), body);
                self.scopes.pop_frame();
                result
            }
            Node::Return(value) => {
                let result = match value {
                    Some(value) => value!(self, value),
                    None => BoxedValue::void(),
                };
                Ok(Flow::Return(result, span))
            }
            Node::Break => Ok(Flow::Break(span)),
        }
    }

    fn eval_block(&mut self, statements: &[NodeLoc]) -> EvalResult {
        let mut last = BoxedValue::void();
        for statement in statements {
            match self.eval(statement)? {
                Flow::Normal(value) => last = value,
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal(last))
    }

    fn eval_for(
        &mut self,
        init: Option<&NodeLoc>,
        cond: Option<&NodeLoc>,
        step: Option<&NodeLoc>,
        body: &NodeLoc,
    ) -> EvalResult {
        if let Some(init) = init {
            value!(self, init);
        }
        loop {
            if let Some(cond) = cond {
                let cond_value = value!(self, cond);
                if !self.truthy(&cond_value, cond.span)? {
                    break;
                }
            }
            match self.eval(body)? {
                Flow::Normal(_) => {}
                Flow::Break(_) => break,
                flow @ Flow::Return(..) => return Ok(flow),
            }
            if let Some(step) = step {
                value!(self, step);
            }
        }
        Ok(Flow::Normal(BoxedValue::void()))
    }

    /// Assignment, with the peephole for simple targets: identifier and
    /// `var` targets rebind the scope cell; any other target evaluates to a
    /// boxed lvalue aliasing its container cell and the named operator is
    /// dispatched with (L, R). Yields R either way.
    fn eval_assign(&mut self, target: &NodeLoc, op: StringId, value: &NodeLoc, span: Span) -> EvalResult {
        let rhs = value!(self, value);
        let is_rebind = op == self.engine.ids().assign;
        match &target.node {
            Node::VarDecl(id) if is_rebind => {
                let stored = self.store_copy(&rhs, span)?;
                self.scopes.declare(id.name, stored);
            }
            Node::VarDecl(_) => {
                return Err(Exception::eval_at("compound assignment to a fresh declaration", span));
            }
            Node::Id(id) if is_rebind => {
                let stored = self.store_copy(&rhs, span)?;
                if !self.scopes.assign(id.name, stored) {
                    return Err(self.unbound(id.name, id.span));
                }
            }
            Node::Id(id) => {
                let lhs = self
                    .scopes
                    .lookup(id.name)
                    .ok_or_else(|| self.unbound(id.name, id.span))?;
                self.call_registry(op, &[lhs, rhs.clone()], span)?;
            }
            _ => {
                let lhs = value!(self, target);
                self.call_registry(op, &[lhs, rhs.clone()], span)?;
            }
        }
        Ok(Flow::Normal(rhs))
    }

    /// A call through an identifier: a bound function value takes
    /// precedence; otherwise the name selects a registry overload set.
    fn eval_call(&mut self, name: Identifier, args: &[BoxedValue], span: Span) -> RunResult<BoxedValue> {
        match self.scopes.lookup(name.name) {
            Some(bound) if bound.is::<FnValue>() => {
                let function = bound.clone_as::<FnValue>()?;
                self.call_fn_value(&function, name.name, args, span)
            }
            Some(_) => Err(Exception::eval_at(
                format!("'{}' is not a function", self.engine.name_of(name.name)),
                name.span,
            )),
            None => self.call_registry(name.name, args, span),
        }
    }

    fn call_fn_value(
        &mut self,
        function: &FnValue,
        name: StringId,
        args: &[BoxedValue],
        span: Span,
    ) -> RunResult<BoxedValue> {
        if function.arity() != args.len() {
            return Err(Exception::eval_at(
                format!(
                    "function '{}' expects {} arguments, got {}",
                    self.engine.name_of(name),
                    function.arity(),
                    args.len()
                ),
                span,
            ));
        }
        let callable = function.callable().clone();
        if !callable.matches(args) {
            return Err(dispatch_error(self.engine, name, args).with_span(span));
        }
        let mut ctx = CallContext::new(self.engine, &mut *self.print, self.depth);
        callable.invoke(&mut ctx, args).map_err(|e| e.with_span(span))
    }

    pub(crate) fn call_registry(&mut self, name: StringId, args: &[BoxedValue], span: Span) -> RunResult<BoxedValue> {
        let mut ctx = CallContext::new(self.engine, &mut *self.print, self.depth);
        self.engine
            .registry()
            .call(name, args, &mut ctx)
            .map_err(|e| e.with_span(span))
    }

    /// Copies a value for storage in a scope cell, consulting the `clone`
    /// overload set. Values with no clone overload are stored shared.
    fn store_copy(&mut self, value: &BoxedValue, span: Span) -> RunResult<BoxedValue> {
        let clone_id = self.engine.ids().clone_;
        let args = [value.clone()];
        if self.engine.registry().find(clone_id, &args).is_some() {
            self.call_registry(clone_id, &args, span)
        } else {
            Ok(value.clone())
        }
    }

    fn truthy(&self, value: &BoxedValue, span: Span) -> RunResult<bool> {
        PodView::from_boxed(value)
            .map(PodView::truthy)
            .map_err(|_| Exception::eval_at("condition is not a boolean or numeric value", span))
    }

    fn unbound(&self, name: StringId, span: Span) -> Exception {
        Exception::eval_at(
            format!("Can not find object: '{}'", self.engine.name_of(name)),
            span,
        )
    }
}
