//! Reference-counted type-erased values.
//!
//! A [`SharedAny`] owns one handle to a heap allocation holding the value.
//! Cloning the handle is shallow: every clone sees the same value, and
//! mutations through one handle are visible through all of them. An
//! independent copy is made explicitly with [`SharedAny::deep_clone`].
//!
//! Access is borrow-checked at runtime, like [`RefCell`](core::cell::RefCell):
//! [`SharedAny::get_mut`] fails with [`AnyError::Borrowed`] while any other
//! handle holds a borrow of the value.
//!
//! Handles are neither [`Send`] nor [`Sync`]. There are no weak handles, so
//! a value that (indirectly) holds a handle to itself is never freed.
//!
//! # Examples
//!
//! ```
//! use cuf::SharedAny;
//!
//! let first = SharedAny::new(vec![1, 2, 3]);
//! let second = first.clone();
//! second.get_mut::<Vec<i32>>().unwrap().push(4);
//! assert_eq!(first.get::<Vec<i32>>().unwrap().len(), 4);
//!
//! let copy = first.deep_clone().unwrap();
//! copy.get_mut::<Vec<i32>>().unwrap().clear();
//! assert_eq!(first.get::<Vec<i32>>().unwrap().len(), 4);
//! ```

use core::{
    any::TypeId,
    cell::{Ref, RefCell, RefMut},
};

use cuf_internals::{CloneFailure, RawShared};
use rootcause::Report;

use crate::{
    error::{AnyError, EMPTY_TYPE_NAME, Result},
    handlers::{self, ValueHandler},
};

/// A shared, reference-counted, type-erased value.
///
/// The container is either empty or one of the handles to a value. See the
/// [module documentation](self) for the sharing semantics.
#[derive(Clone, Default)]
pub struct SharedAny {
    /// The handle, or `None` when empty
    raw: Option<RawShared>,
}

impl SharedAny {
    /// Creates an empty container.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self { raw: None }
    }

    /// Moves `value` into a new allocation, copyable with [`Clone`].
    #[must_use]
    pub fn new<T>(value: T) -> Self
    where
        T: Clone + 'static,
    {
        Self::new_custom::<handlers::Clone, T>(value)
    }

    /// Moves `value` into a new allocation, copied and formatted by `H`.
    #[must_use]
    pub fn new_custom<H, T>(value: T) -> Self
    where
        T: 'static,
        H: ValueHandler<T>,
    {
        Self {
            raw: Some(RawShared::new::<T, H>(value)),
        }
    }

    /// Moves `value` into a new allocation. The value refuses to be copied
    /// by [`SharedAny::deep_clone`].
    #[must_use]
    pub fn new_opaque<T: 'static>(value: T) -> Self {
        Self::new_custom::<handlers::Opaque, T>(value)
    }

    /// Releases this handle, leaving the container empty.
    ///
    /// The value is dropped if this was its last handle.
    #[inline]
    pub fn reset(&mut self) {
        self.raw = None;
    }

    /// Whether the container holds no value.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_none()
    }

    /// Returns the number of handles to the value, or 0 if empty.
    #[inline]
    #[must_use]
    pub fn ref_count(&self) -> usize {
        self.raw
            .as_ref()
            .map_or(0, |raw| raw.as_ref().strong_count())
    }

    /// Whether both containers are handles to the same value.
    ///
    /// Two empty containers are equal.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.raw, &other.raw) {
            (Some(left), Some(right)) => left.as_ref().ptr_eq(right.as_ref()),
            (None, None) => true,
            _ => false,
        }
    }

    /// Whether the container holds a value of exactly the type `T`.
    #[inline]
    #[must_use]
    pub fn holds<T: 'static>(&self) -> bool {
        self.type_id() == Some(TypeId::of::<T>())
    }

    /// Returns the [`TypeId`] of the value, or `None` if empty.
    #[inline]
    #[must_use]
    pub fn type_id(&self) -> Option<TypeId> {
        self.raw.as_ref().map(|raw| raw.as_ref().type_id())
    }

    /// Returns the [`core::any::type_name`] of the value, or `None` if empty.
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> Option<&'static str> {
        self.raw.as_ref().map(|raw| raw.as_ref().type_name())
    }

    /// Returns the value as a `RefCell<T>`, checking the type.
    #[track_caller]
    fn cell<T: 'static>(&self) -> Result<&RefCell<T>> {
        match &self.raw {
            Some(raw) if raw.as_ref().type_id() == TypeId::of::<T>() => {
                // SAFETY: The stored type is `T`, checked above.
                Ok(unsafe { raw.as_ref().value_downcast_unchecked::<T>() })
            }
            _ => Err(AnyError::type_mismatch::<T>(self.type_name())),
        }
    }

    /// Borrows the value.
    ///
    /// # Errors
    ///
    /// - [`AnyError::TypeMismatch`] if the container does not hold a `T`.
    /// - [`AnyError::Borrowed`] if the value is mutably borrowed through any
    ///   handle.
    #[track_caller]
    pub fn get<T: 'static>(&self) -> Result<Ref<'_, T>> {
        self.cell::<T>()?
            .try_borrow()
            .map_err(|_| AnyError::borrowed(core::any::type_name::<T>()))
    }

    /// Mutably borrows the value. The change is visible through every handle.
    ///
    /// # Errors
    ///
    /// - [`AnyError::TypeMismatch`] if the container does not hold a `T`.
    /// - [`AnyError::Borrowed`] if the value is borrowed through any handle.
    #[track_caller]
    pub fn get_mut<T: 'static>(&self) -> Result<RefMut<'_, T>> {
        self.cell::<T>()?
            .try_borrow_mut()
            .map_err(|_| AnyError::borrowed(core::any::type_name::<T>()))
    }

    /// Copies the value into a new allocation with a single handle, using the
    /// handler chosen when the value was stored. Copying an empty container
    /// succeeds.
    ///
    /// # Errors
    ///
    /// - [`AnyError::NotCopyable`] if the handler refuses to copy the value.
    /// - [`AnyError::Borrowed`] if the value is mutably borrowed.
    #[track_caller]
    pub fn deep_clone(&self) -> Result<Self> {
        let Some(raw) = &self.raw else {
            return Ok(Self::empty());
        };
        let raw = raw.as_ref();
        tracing::trace!(
            type_name = raw.type_name(),
            ref_count = raw.strong_count(),
            "deep-cloning shared value"
        );
        match raw.deep_clone() {
            Ok(copy) => Ok(Self { raw: Some(copy) }),
            Err(CloneFailure::NotCopyable) => Err(AnyError::not_copyable(Some(raw.type_name()))),
            Err(CloneFailure::Borrowed) => Err(AnyError::borrowed(raw.type_name())),
        }
    }

    /// Moves the value out if this is its last handle.
    ///
    /// # Errors
    ///
    /// Returns the container unchanged, together with the report, if it does
    /// not hold a `T` ([`AnyError::TypeMismatch`]) or other handles exist
    /// ([`AnyError::StillShared`]).
    #[track_caller]
    pub fn try_unwrap<T: 'static>(self) -> core::result::Result<T, (Self, Report<AnyError>)> {
        if !self.holds::<T>() {
            let report = AnyError::type_mismatch::<T>(self.type_name());
            return Err((self, report));
        }
        let Some(raw) = self.raw else {
            // `holds` is false for empty containers.
            let report = AnyError::type_mismatch::<T>(None);
            return Err((Self::empty(), report));
        };
        // SAFETY: The stored type is `T`, checked above.
        match unsafe { raw.try_into_inner::<T>() } {
            Ok(value) => Ok(value),
            Err(raw) => {
                let shared = raw.as_ref();
                let report = AnyError::still_shared(shared.type_name(), shared.strong_count());
                Err((Self { raw: Some(raw) }, report))
            }
        }
    }
}

impl core::fmt::Debug for SharedAny {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SharedAny(")?;
        match &self.raw {
            Some(raw) => raw.as_ref().debug(f)?,
            None => f.write_str(EMPTY_TYPE_NAME)?,
        }
        f.write_str(")")
    }
}
