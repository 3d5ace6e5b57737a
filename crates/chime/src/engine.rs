//! Public interface for embedding and running chime code.

use std::{
    any::Any,
    cell::RefCell,
    fmt, fs,
    path::Path,
    rc::Rc,
};

use crate::{
    builtins,
    dispatch::{Callable, Registry},
    eval::Interp,
    exception::{Exception, RunResult},
    intern::{Interner, StringId},
    io::{PrintWriter, StdPrint},
    parse::parse,
    scope::{Frame, ScopeStack},
    value::{BoxedValue, TypeInfo, ValueCache},
};

/// Default limit on script-call depth before an evaluation error is raised
/// instead of overflowing the host stack.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 128;

/// Operator and constructor names the evaluator dispatches directly.
///
/// Interned once at engine construction so evaluation never hashes these
/// strings.
#[derive(Debug, Clone, Copy)]
pub(crate) struct KnownIds {
    pub assign: StringId,
    pub clone_: StringId,
    pub vector: StringId,
    pub map: StringId,
    pub range: StringId,
    pub push_back: StringId,
    pub insert: StringId,
    pub index: StringId,
}

impl KnownIds {
    fn intern(interner: &mut Interner) -> Self {
        Self {
            assign: interner.intern("="),
            clone_: interner.intern("clone"),
            vector: interner.intern("Vector"),
            map: interner.intern("Map"),
            range: interner.intern("Range"),
            push_back: interner.intern("push_back"),
            insert: interner.intern("insert"),
            index: interner.intern("[]"),
        }
    }
}

/// An embedded chime interpreter.
///
/// Owns the overload registry, the string interner, the script-visible type
/// names, the value cache, and the persistent global scope frame. Globals
/// and registered overloads (including script `def`s) survive across
/// `eval_*` calls on the same engine.
///
/// The engine is single-threaded by construction (`Rc` sharing throughout);
/// a host wanting cross-thread use must serialise access externally.
///
/// # Example
/// ```
/// use chime::Engine;
///
/// let engine = Engine::new();
/// let result = engine.eval_string("var x = 1 + 2 * 3; x;").unwrap();
/// assert_eq!(result.clone_as::<i64>().unwrap(), 7);
/// ```
pub struct Engine {
    registry: Registry,
    interner: RefCell<Interner>,
    types: RefCell<Vec<(StringId, TypeInfo)>>,
    cache: RefCell<ValueCache>,
    globals: Rc<RefCell<Frame>>,
    ids: KnownIds,
    max_depth: usize,
}

impl Engine {
    /// Constructs an engine seeded with the bootstrap bindings: arithmetic
    /// and comparison over the numeric primitives, boolean operators, string
    /// operations, the assignment family, `Vector`/`Map`/`Range`, and
    /// `print`.
    #[must_use]
    pub fn new() -> Self {
        let mut interner = Interner::new();
        let ids = KnownIds::intern(&mut interner);
        let engine = Self {
            registry: Registry::default(),
            interner: RefCell::new(interner),
            types: RefCell::new(Vec::new()),
            cache: RefCell::new(ValueCache::default()),
            globals: Rc::new(RefCell::new(Frame::default())),
            ids,
            max_depth: DEFAULT_MAX_CALL_DEPTH,
        };
        builtins::install(&engine);
        engine.add_type("int", TypeInfo::of::<i64>());
        engine.add_type("float", TypeInfo::of::<f64>());
        engine.add_type("bool", TypeInfo::of::<bool>());
        engine.add_type("char", TypeInfo::of::<char>());
        engine.add_type("String", TypeInfo::of::<String>());
        engine.add_type("Vector", TypeInfo::of::<builtins::vector::Vector>());
        engine.add_type("Map", TypeInfo::of::<builtins::map::Map>());
        engine.add_type("Range", TypeInfo::of::<builtins::range::Range>());
        engine.add_type("Function", TypeInfo::of::<crate::function::FnValue>());
        engine
    }

    /// Parses and evaluates a source string, printing to stdout.
    ///
    /// The result is the value of the script's last top-level statement (or
    /// of a top-level `return`), void for an empty script.
    pub fn eval_string(&self, source: &str) -> Result<BoxedValue, Exception> {
        self.eval_string_as(source, "<eval>", &mut StdPrint)
    }

    /// Parses and evaluates a source string under an explicit script name,
    /// with print output routed to the given writer.
    pub fn eval_string_as(
        &self,
        source: &str,
        script_name: &str,
        print: &mut impl PrintWriter,
    ) -> Result<BoxedValue, Exception> {
        let ast = {
            let mut interner = self.interner.borrow_mut();
            parse(source, script_name, &mut interner)?
        };
        let script = self.name_of(ast.file);
        let scopes = ScopeStack::with_global(self.globals.clone());
        let print: &mut dyn PrintWriter = print;
        let mut interp = Interp::new(self, print, scopes);
        let result = interp.eval_file(&ast).map_err(|e| e.with_file(&script));
        // Scope discipline: every frame pushed during evaluation was popped,
        // on success and failure alike.
        debug_assert_eq!(interp.scope_depth(), 1);
        result
    }

    /// Reads a UTF-8 script file and evaluates it. The path appears as the
    /// script name in error locations.
    pub fn eval_file(&self, path: impl AsRef<Path>) -> Result<BoxedValue, Exception> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .map_err(|err| Exception::eval(format!("can not read '{}': {err}", path.display())))?;
        self.eval_string_as(&source, &path.to_string_lossy(), &mut StdPrint)
    }

    /// Registers a host callable under a script-visible name.
    ///
    /// Overloads dispatch in registration order; an overload whose parameter
    /// signature exactly matches an existing one replaces it.
    pub fn add_overload(&self, name: &str, overload: impl Callable + 'static) {
        let id = self.intern(name);
        self.registry.register(id, Rc::new(overload));
    }

    /// Names a host type for script use; the name shows up in dispatch
    /// errors and display output in place of the Rust type path.
    pub fn add_type(&self, name: &str, info: TypeInfo) {
        let id = self.intern(name);
        self.types.borrow_mut().push((id, info));
    }

    /// Looks up a type identity previously registered with `add_type`.
    #[must_use]
    pub fn type_named(&self, name: &str) -> Option<TypeInfo> {
        let id = self.interner.borrow().get(name)?;
        self.types
            .borrow()
            .iter()
            .find(|(type_name, _)| *type_name == id)
            .map(|(_, info)| *info)
    }

    /// Binds a value in the persistent global frame.
    pub fn set_global(&self, name: &str, value: BoxedValue) {
        let id = self.intern(name);
        self.globals.borrow_mut().insert(id, value);
    }

    /// Reads a binding from the persistent global frame.
    #[must_use]
    pub fn get_global(&self, name: &str) -> Option<BoxedValue> {
        let id = self.interner.borrow().get(name)?;
        self.globals.borrow().get(&id).cloned()
    }

    /// Boxes a shared host object through the value cache, preserving
    /// identity: boxing the same object twice yields the same record.
    pub fn wrap_shared<T: Any>(&self, shared: Rc<RefCell<T>>) -> BoxedValue {
        self.cache.borrow_mut().observe(BoxedValue::from_shared(shared))
    }

    /// Drops value-cache entries whose only remaining holder is the cache.
    pub fn cull_cache(&self) {
        self.cache.borrow_mut().cull();
    }

    /// Number of live value-cache entries.
    #[must_use]
    pub fn cache_size(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Renders a boxed value with the same rules `print` uses.
    #[must_use]
    pub fn display(&self, value: &BoxedValue) -> String {
        builtins::display_value(value, self)
    }

    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn ids(&self) -> &KnownIds {
        &self.ids
    }

    pub(crate) fn intern(&self, name: &str) -> StringId {
        self.interner.borrow_mut().intern(name)
    }

    pub(crate) fn name_of(&self, id: StringId) -> String {
        self.interner.borrow().resolve(id).to_owned()
    }

    /// Script-facing name for a type: the `add_type` name when registered,
    /// the Rust type name otherwise.
    pub(crate) fn type_display(&self, info: TypeInfo) -> String {
        if info.is_void() {
            return "void".to_owned();
        }
        let types = self.types.borrow();
        match types.iter().find(|(_, candidate)| *candidate == info) {
            Some((name, _)) => self.name_of(*name),
            None => info.short_name().to_owned(),
        }
    }

    pub(crate) fn check_depth(&self, depth: usize) -> RunResult<()> {
        if depth >= self.max_depth {
            Err(Exception::eval(format!(
                "maximum call depth exceeded ({})",
                self.max_depth
            )))
        } else {
            Ok(())
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.registry)
            .field("globals", &self.globals.borrow().len())
            .finish_non_exhaustive()
    }
}
