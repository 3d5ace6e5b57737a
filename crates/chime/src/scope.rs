//! The stack of lexical scope frames used by the evaluator.
//!
//! Frames are shared (`Rc<RefCell<_>>`) rather than owned by the stack:
//! script closures capture the stack by cloning the frame handles, so a
//! captured frame outlives the block or call that created it for as long as
//! any closure survives. The bottom frame is the engine's persistent global
//! frame.

use std::{cell::RefCell, rc::Rc};

use ahash::AHashMap;

use crate::{intern::StringId, value::BoxedValue};

/// One layer of identifier-to-value bindings.
pub(crate) type Frame = AHashMap<StringId, BoxedValue>;

/// Ordered stack of scope frames. Lookups search top-to-bottom; declarations
/// bind in the top frame; assignments rebind the nearest enclosing binding.
#[derive(Debug, Clone)]
pub(crate) struct ScopeStack {
    frames: Vec<Rc<RefCell<Frame>>>,
}

impl ScopeStack {
    /// Creates a stack whose bottom frame is the given (shared) global frame.
    pub fn with_global(global: Rc<RefCell<Frame>>) -> Self {
        Self { frames: vec![global] }
    }

    pub fn push_frame(&mut self) {
        self.frames.push(Rc::new(RefCell::new(Frame::default())));
    }

    /// # Panics
    /// Panics if only the global frame remains; the evaluator pairs every
    /// push with exactly one pop.
    pub fn pop_frame(&mut self) {
        assert!(self.frames.len() > 1, "attempted to pop the global frame");
        self.frames.pop();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Binds a name in the top frame. Redeclaration in the same frame
    /// silently rebinds.
    pub fn declare(&self, name: StringId, value: BoxedValue) {
        self.frames
            .last()
            .expect("scope stack always has the global frame")
            .borrow_mut()
            .insert(name, value);
    }

    /// Finds the nearest binding for a name, searching top-to-bottom.
    pub fn lookup(&self, name: StringId) -> Option<BoxedValue> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.borrow().get(&name).cloned())
    }

    /// Rebinds the nearest enclosing binding. Returns false when the name is
    /// not bound in any frame.
    pub fn assign(&self, name: StringId, value: BoxedValue) -> bool {
        for frame in self.frames.iter().rev() {
            let mut frame = frame.borrow_mut();
            if let Some(slot) = frame.get_mut(&name) {
                *slot = value;
                return true;
            }
        }
        false
    }

    /// Snapshot of the current frame handles, for closure capture.
    ///
    /// The frames themselves are shared: mutations through either stack are
    /// visible to the other.
    pub fn capture(&self) -> Self {
        Self {
            frames: self.frames.clone(),
        }
    }
}
