//! The function registry and overload dispatcher.
//!
//! Every operator application and function call in script flows through
//! [`Registry::call`]: a name selects an insertion-ordered overload list, the
//! first overload whose arity and parameter types match the boxed arguments
//! is invoked, and a miss is a structured dispatch error carrying the name
//! and the observed argument types.

use std::{cell::RefCell, fmt, rc::Rc};

use ahash::RandomState;
use indexmap::IndexMap;

use crate::{
    engine::Engine,
    exception::{ErrorKind, Exception, RunResult},
    intern::StringId,
    io::PrintWriter,
    value::{BoxedValue, TypeInfo},
};

/// One concrete callable registered under a name.
///
/// An overload declares its arity and per-parameter type identities; a void
/// parameter type accepts any argument. Hosts implement this directly or use
/// the [`NativeFn`] adapter.
pub trait Callable {
    /// Number of parameters.
    fn arity(&self) -> usize;

    /// Expected type identity per parameter; void entries accept anything.
    fn param_types(&self) -> &[TypeInfo];

    /// Whether this overload accepts the given argument list.
    fn matches(&self, args: &[BoxedValue]) -> bool {
        args.len() == self.arity()
            && self
                .param_types()
                .iter()
                .zip(args)
                .all(|(param, arg)| param.is_void() || *param == arg.type_info())
    }

    /// Applies the overload. Only called after `matches` succeeded.
    fn invoke(&self, ctx: &mut CallContext<'_>, args: &[BoxedValue]) -> Result<BoxedValue, Exception>;
}

/// Execution context handed to every overload invocation.
///
/// Gives callables access to the owning engine (registry, type names) and to
/// the active print writer, and carries the script-call depth used by the
/// recursion guard.
pub struct CallContext<'a> {
    pub(crate) engine: &'a Engine,
    pub(crate) print: &'a mut dyn PrintWriter,
    pub(crate) depth: usize,
}

impl<'a> CallContext<'a> {
    pub(crate) fn new(engine: &'a Engine, print: &'a mut dyn PrintWriter, depth: usize) -> Self {
        Self { engine, print, depth }
    }

    #[must_use]
    pub fn engine(&self) -> &Engine {
        self.engine
    }

    /// Writes text through the active print writer.
    pub fn write(&mut self, output: &str) {
        self.print.write(output);
    }

    /// Writes a single character through the active print writer.
    pub fn push(&mut self, end: char) {
        self.print.push(end);
    }
}

/// Adapter wrapping a plain closure as an overload.
///
/// The closure receives the call context and the full boxed argument list;
/// parameter types drive matching exactly as for any other overload.
pub struct NativeFn<F> {
    params: Vec<TypeInfo>,
    func: F,
}

impl<F> NativeFn<F>
where
    F: Fn(&mut CallContext<'_>, &[BoxedValue]) -> Result<BoxedValue, Exception>,
{
    pub fn new(params: Vec<TypeInfo>, func: F) -> Self {
        Self { params, func }
    }
}

impl<F> Callable for NativeFn<F>
where
    F: Fn(&mut CallContext<'_>, &[BoxedValue]) -> Result<BoxedValue, Exception>,
{
    fn arity(&self) -> usize {
        self.params.len()
    }

    fn param_types(&self) -> &[TypeInfo] {
        &self.params
    }

    fn invoke(&self, ctx: &mut CallContext<'_>, args: &[BoxedValue]) -> Result<BoxedValue, Exception> {
        (self.func)(ctx, args)
    }
}

/// Name-keyed collection of overload lists.
///
/// Registration order is dispatch order, so earlier registrations take
/// precedence. Registering an overload whose signature (arity plus parameter
/// type list) exactly matches an existing one replaces it in place, which is
/// how a script `def` redefinition takes effect without disturbing
/// differently-typed overloads of the same name.
#[derive(Default)]
pub(crate) struct Registry {
    table: RefCell<IndexMap<StringId, Vec<Rc<dyn Callable>>, RandomState>>,
}

impl Registry {
    pub fn register(&self, name: StringId, overload: Rc<dyn Callable>) {
        let mut table = self.table.borrow_mut();
        let list = table.entry(name).or_default();
        let existing = list
            .iter()
            .position(|candidate| candidate.param_types() == overload.param_types());
        if let Some(index) = existing {
            list[index] = overload;
        } else {
            list.push(overload);
        }
    }

    /// First registered overload accepting the argument list, if any.
    ///
    /// Clones the handle out so the table borrow is released before the
    /// caller invokes — overloads may themselves register (a nested `def`).
    pub fn find(&self, name: StringId, args: &[BoxedValue]) -> Option<Rc<dyn Callable>> {
        let table = self.table.borrow();
        let list = table.get(&name)?;
        list.iter().find(|overload| overload.matches(args)).cloned()
    }

    /// Resolves and applies exactly one overload.
    pub fn call(&self, name: StringId, args: &[BoxedValue], ctx: &mut CallContext<'_>) -> RunResult<BoxedValue> {
        match self.find(name, args) {
            Some(overload) => overload.invoke(ctx, args),
            None => Err(dispatch_error(ctx.engine, name, args)),
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.borrow();
        f.debug_struct("Registry").field("names", &table.len()).finish()
    }
}

/// Builds the no-matching-overload error: name plus observed argument types.
pub(crate) fn dispatch_error(engine: &Engine, name: StringId, args: &[BoxedValue]) -> Exception {
    let name = engine.name_of(name);
    let types = args
        .iter()
        .map(|arg| engine.type_display(arg.type_info()))
        .collect::<Vec<_>>()
        .join(", ");
    Exception::new(
        ErrorKind::DispatchError,
        format!("no matching overload for '{name}' with argument types ({types})"),
    )
}
