//! The boxed-value kernel: runtime type identity, the uniform value
//! container, and the identity-preserving value cache.
//!
//! A [`BoxedValue`] carries any host value together with its [`TypeInfo`].
//! Payloads are either owned (shared via `Rc<RefCell<_>>`), borrowed
//! (a non-owning `Weak` observation of a host-held object), or the
//! distinguished void. Cloning a `BoxedValue` shares the payload; rebinding
//! a scope cell replaces the whole record.

use std::{
    any::{Any, TypeId, type_name},
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use ahash::AHashMap;

use crate::exception::{ErrorKind, Exception};

/// Private payload type backing void boxed values.
struct Void;

/// Runtime identity of a host type.
///
/// Two identities compare equal iff they name the same host type (or are both
/// void). Obtained through [`TypeInfo::of`], which resolves at compile time
/// via `std::any::TypeId`.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
    is_void: bool,
}

impl TypeInfo {
    /// The identity of host type `T`.
    #[must_use]
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            is_void: false,
        }
    }

    /// The distinguished void/unknown identity.
    ///
    /// As an overload parameter type, void means "accepts anything".
    #[must_use]
    pub fn void() -> Self {
        Self {
            id: TypeId::of::<Void>(),
            name: "void",
            is_void: true,
        }
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        self.is_void
    }

    /// The full Rust path of the type, e.g. `alloc::string::String`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The trailing path segment, e.g. `String`. Used in messages when the
    /// engine has no registered script name for the type.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }

    pub(crate) fn id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.is_void == other.is_void
    }
}

impl Eq for TypeInfo {}

impl std::hash::Hash for TypeInfo {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.is_void.hash(state);
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_void {
            write!(f, "TypeInfo(void)")
        } else {
            write!(f, "TypeInfo({})", self.short_name())
        }
    }
}

/// Failure to extract a value of the requested type from a boxed value.
///
/// Carries the stored and the requested type identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastError {
    pub from: TypeInfo,
    pub to: TypeInfo,
}

impl fmt::Display for CastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot cast {} to {}",
            self.from.short_name(),
            self.to.short_name()
        )
    }
}

impl From<CastError> for Exception {
    fn from(err: CastError) -> Self {
        Self::new(ErrorKind::BadBoxedCast, err.to_string())
    }
}

/// What a boxed value actually holds.
///
/// The concrete type behind `dyn Any` is always `RefCell<T>` for the `T`
/// named by the record's `TypeInfo`; every cast re-verifies the identity
/// before downcasting.
#[derive(Clone)]
enum Payload {
    Void,
    Owned(Rc<dyn Any>),
    Borrowed(Weak<dyn Any>),
}

/// A value of any host type together with its runtime type identity.
///
/// Cloning shares the payload: two clones observe each other's mutations.
/// This is what lets container element views write through to the container
/// cell, and what makes scope-cell rebinding (replacing the record) distinct
/// from assignment through the record.
#[derive(Clone)]
pub struct BoxedValue {
    info: TypeInfo,
    payload: Payload,
}

impl BoxedValue {
    /// Boxes a fresh host value, taking ownership.
    #[must_use]
    pub fn new<T: Any>(value: T) -> Self {
        Self::from_shared(Rc::new(RefCell::new(value)))
    }

    /// The void boxed value.
    #[must_use]
    pub fn void() -> Self {
        Self {
            info: TypeInfo::void(),
            payload: Payload::Void,
        }
    }

    /// Boxes an already-shared host object without cloning it.
    #[must_use]
    pub fn from_shared<T: Any>(shared: Rc<RefCell<T>>) -> Self {
        let data: Rc<dyn Any> = shared;
        Self {
            info: TypeInfo::of::<T>(),
            payload: Payload::Owned(data),
        }
    }

    /// Boxes a non-owning reference to a host-held object.
    ///
    /// The resulting value reports `is_ref() == true` and fails casts once
    /// the host drops the object.
    #[must_use]
    pub fn from_ref<T: Any>(shared: &Rc<RefCell<T>>) -> Self {
        let shared: Rc<dyn Any> = shared.clone();
        let data: Weak<dyn Any> = Rc::downgrade(&shared);
        Self {
            info: TypeInfo::of::<T>(),
            payload: Payload::Borrowed(data),
        }
    }

    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        self.info
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        self.info.is_void
    }

    /// True iff the payload is a non-owning reference.
    #[must_use]
    pub fn is_ref(&self) -> bool {
        matches!(self.payload, Payload::Borrowed(_))
    }

    /// True iff the stored type is `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        !self.info.is_void && self.info.id == TypeId::of::<T>()
    }

    /// Address of the underlying storage; 0 for void.
    ///
    /// Two boxed values share identity iff their addresses are equal.
    #[must_use]
    pub fn data_address(&self) -> usize {
        match &self.payload {
            Payload::Void => 0,
            Payload::Owned(data) => Rc::as_ptr(data).cast::<()>() as usize,
            Payload::Borrowed(data) => data.as_ptr().cast::<()>() as usize,
        }
    }

    /// Number of strong holders of the underlying storage; 0 for void and
    /// for dangling borrowed payloads.
    pub(crate) fn strong_holders(&self) -> usize {
        match &self.payload {
            Payload::Void => 0,
            Payload::Owned(data) => Rc::strong_count(data),
            Payload::Borrowed(data) => data.strong_count(),
        }
    }

    fn cast_error<T: Any>(&self) -> Exception {
        CastError {
            from: self.info,
            to: TypeInfo::of::<T>(),
        }
        .into()
    }

    /// Verifies the stored type is `T` and produces a strong handle to the
    /// storage cell.
    fn cell<T: Any>(&self) -> Result<Rc<dyn Any>, Exception> {
        if !self.is::<T>() {
            return Err(self.cast_error::<T>());
        }
        match &self.payload {
            Payload::Void => Err(self.cast_error::<T>()),
            Payload::Owned(data) => Ok(data.clone()),
            Payload::Borrowed(data) => data
                .upgrade()
                .ok_or_else(|| Exception::eval("borrowed host object is no longer alive")),
        }
    }

    /// Runs `f` with a shared borrow of the stored `T`.
    ///
    /// Fails with a bad-cast error if the stored type is not `T`, and with an
    /// evaluation error if the value is currently mutably borrowed (self-
    /// referential operations like `v.push_back(v)` hit this).
    pub fn with_ref<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, Exception> {
        let data = self.cell::<T>()?;
        let cell = data
            .downcast_ref::<RefCell<T>>()
            .expect("payload type verified by cell()");
        let guard = cell
            .try_borrow()
            .map_err(|_| Exception::eval("value is already mutably borrowed"))?;
        Ok(f(&guard))
    }

    /// Runs `f` with an exclusive borrow of the stored `T`.
    pub fn with_mut<T: Any, R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, Exception> {
        let data = self.cell::<T>()?;
        let cell = data
            .downcast_ref::<RefCell<T>>()
            .expect("payload type verified by cell()");
        let mut guard = cell
            .try_borrow_mut()
            .map_err(|_| Exception::eval("value is already borrowed"))?;
        Ok(f(&mut guard))
    }

    /// Extracts a copy of the stored `T`.
    pub fn clone_as<T: Any + Clone>(&self) -> Result<T, Exception> {
        self.with_ref(T::clone)
    }

    /// Recovers shared ownership of the stored `T`.
    ///
    /// Legal only when the storage is owned; borrowed payloads fail because
    /// ownership cannot be conjured from an observation.
    pub fn as_shared<T: Any>(&self) -> Result<Rc<RefCell<T>>, Exception> {
        if !self.is::<T>() {
            return Err(self.cast_error::<T>());
        }
        match &self.payload {
            Payload::Owned(data) => data
                .clone()
                .downcast::<RefCell<T>>()
                .map_err(|_| self.cast_error::<T>()),
            Payload::Void => Err(self.cast_error::<T>()),
            Payload::Borrowed(_) => Err(Exception::eval(
                "cannot take shared ownership of a borrowed value",
            )),
        }
    }
}

impl fmt::Debug for BoxedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_void() {
            write!(f, "BoxedValue(void)")
        } else if self.is_ref() {
            write!(f, "BoxedValue(&{})", self.info.short_name())
        } else {
            write!(f, "BoxedValue({})", self.info.short_name())
        }
    }
}

/// Identity-preserving registry of boxed shared objects.
///
/// Maps the address of an underlying host object to the latest boxed record
/// observed for it, so boxing the same shared object twice yields records
/// that share identity. Entries whose only remaining holder is the cache
/// itself are dropped by [`ValueCache::cull`].
#[derive(Default)]
pub(crate) struct ValueCache {
    entries: AHashMap<usize, BoxedValue>,
}

impl ValueCache {
    /// Returns the cached record for the value's address, registering the
    /// value if the address is new. Void values pass through untouched.
    pub fn observe(&mut self, value: BoxedValue) -> BoxedValue {
        let address = value.data_address();
        if address == 0 {
            return value;
        }
        if let Some(existing) = self.entries.get(&address) {
            return existing.clone();
        }
        self.entries.insert(address, value.clone());
        value
    }

    /// Drops entries that only the cache still holds.
    pub fn cull(&mut self) {
        self.entries.retain(|_, value| value.strong_holders() > 1);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
