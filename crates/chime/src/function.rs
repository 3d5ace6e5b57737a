//! Script-defined callables: `def` functions and `fun` lambdas.

use std::{fmt, rc::Rc};

use crate::{
    dispatch::{CallContext, Callable},
    eval::{Flow, Interp},
    exception::Exception,
    expressions::NodeLoc,
    intern::StringId,
    scope::ScopeStack,
    value::{BoxedValue, TypeInfo},
};

/// A callable built from script source.
///
/// Closes over the scope stack at its definition site by shared ownership,
/// so the captured frames stay alive as long as the function does. Parameter
/// types are all void: a script function accepts any argument types of the
/// right count.
pub(crate) struct ScriptFn {
    name: Option<StringId>,
    params: Vec<StringId>,
    param_types: Vec<TypeInfo>,
    body: Rc<NodeLoc>,
    captured: ScopeStack,
}

impl ScriptFn {
    pub fn new(name: Option<StringId>, params: Vec<StringId>, body: Rc<NodeLoc>, captured: ScopeStack) -> Self {
        let param_types = vec![TypeInfo::void(); params.len()];
        Self {
            name,
            params,
            param_types,
            body,
            captured,
        }
    }
}

impl Callable for ScriptFn {
    fn arity(&self) -> usize {
        self.params.len()
    }

    fn param_types(&self) -> &[TypeInfo] {
        &self.param_types
    }

    /// Pushes a frame binding parameters to arguments, evaluates the body,
    /// and catches the return signal at this boundary.
    ///
    /// Fall-through yields the body's value (the last statement of the
    /// block), or void for an empty body. A break signal escaping the
    /// function is an evaluation error.
    fn invoke(&self, ctx: &mut CallContext<'_>, args: &[BoxedValue]) -> Result<BoxedValue, Exception> {
        ctx.engine.check_depth(ctx.depth)?;

        let mut scopes = self.captured.capture();
        scopes.push_frame();
        for (param, arg) in self.params.iter().zip(args) {
            scopes.declare(*param, arg.clone());
        }

        let mut interp = Interp::nested(ctx.engine, &mut *ctx.print, scopes, ctx.depth + 1);
        match interp.eval(&self.body)? {
            Flow::Normal(value) | Flow::Return(value, _) => Ok(value),
            Flow::Break(span) => Err(Exception::eval_at("Non-loop break", span)),
        }
    }
}

impl fmt::Debug for ScriptFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptFn")
            .field("name", &self.name)
            .field("arity", &self.params.len())
            .finish()
    }
}

/// A first-class boxed function value, produced by `fun(...) { ... }` or
/// handed in by the host.
///
/// Cloning shares the underlying callable.
#[derive(Clone)]
pub struct FnValue(Rc<dyn Callable>);

impl FnValue {
    pub fn new(callable: Rc<dyn Callable>) -> Self {
        Self(callable)
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.0.arity()
    }

    pub(crate) fn callable(&self) -> &Rc<dyn Callable> {
        &self.0
    }
}

impl fmt::Debug for FnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FnValue(arity {})", self.0.arity())
    }
}
