//! Non-owning type-erased references.
//!
//! An [`AnyURef`] erases the type of a borrowed value, or of a small [`Copy`]
//! value stored inline, without allocating. The reference lives in a buffer
//! of [`REF_CAPACITY`] bytes next to a pointer to its vtable.
//!
//! The lifetime `'a` ties the reference to the borrowed value, so the value
//! always outlives the view.
//!
//! # Bindings
//!
//! | Constructed from | [`Binding`]            | Copyable | Mutable |
//! |------------------|------------------------|----------|---------|
//! | `&'a T`          | [`Binding::Shared`]    | yes      | no      |
//! | `&'a mut T`      | [`Binding::Exclusive`] | no       | yes     |
//! | [`ByValue<T>`]   | [`Binding::Copied`]    | yes      | yes, the copy |
//!
//! The kind parameter `K` restricts the accepted bindings at compile time:
//! [`AnyRef`] only accepts `&mut T`, [`AnyCRef`] only `&T`, and [`AnyRRef`]
//! only values. All of them convert into the universal [`AnyURef`].
//!
//! # Rebinding
//!
//! [`AnyURef::rebind`] overwrites the current binding. Bindings never own
//! anything with drop glue, so no destructor of the previous binding runs.
//!
//! # Examples
//!
//! ```
//! use cuf::refs::{AnyURef, Binding, ByValue};
//!
//! let mut total = 10_u32;
//! let mut slot = AnyURef::from_mut(&mut total);
//! *slot.get_mut::<u32>().unwrap() += 5;
//! assert_eq!(slot.binding(), Some(Binding::Exclusive));
//!
//! slot.rebind(ByValue(1.5_f64));
//! assert_eq!(slot.get::<f64>().unwrap(), 1.5);
//! assert_eq!(total, 15);
//! ```
//!
//! Values larger than [`REF_CAPACITY`] are rejected at compile time:
//!
//! ```compile_fail
//! use cuf::refs::AnyRRef;
//!
//! let value = AnyRRef::new([0_u64; 3]);
//! ```

use core::{any::TypeId, marker::PhantomData, ptr::NonNull};

use cuf_internals::{CellLayout, RawCell};

use crate::{
    error::{AnyError, Result},
    handlers,
    markers::{Align8, Copied, Exclusive, RefKind, Shared, Universal},
};

/// Size in bytes of the buffer of an [`AnyURef`]. The buffer is 8-byte
/// aligned.
pub const REF_CAPACITY: usize = 16;

/// How an [`AnyURef`] is bound to its value.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum Binding {
    /// Bound to a `&T`.
    Shared,
    /// Bound to a `&mut T`.
    Exclusive,
    /// Holds its own copy of the value.
    Copied,
}

/// Wraps a value that should be bound by copy rather than by reference.
///
/// Used to build an [`AnyURef`] or a [`Generics`](crate::generics::Generics)
/// slot from a value.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct ByValue<T>(pub T);

/// A type-erased reference accepting the bindings of the kind `K`.
///
/// See the [module documentation](self) for the available bindings.
pub struct AnyURef<'a, K: RefKind = Universal> {
    /// The bound pointer or copied value
    cell: RawCell<REF_CAPACITY, Align8>,
    /// Ties the reference to `'a` and to its kind
    _marker: PhantomData<(&'a (), K)>,
}

/// A type-erased reference bound to a `&mut T`.
pub type AnyRef<'a> = AnyURef<'a, Exclusive>;

/// A type-erased reference bound to a `&T`.
pub type AnyCRef<'a> = AnyURef<'a, Shared>;

/// A type-erased copy of a small [`Copy`] value.
pub type AnyRRef = AnyURef<'static, Copied>;

impl<'a, K: RefKind> AnyURef<'a, K> {
    /// Creates a reference bound to nothing.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self::from_cell(RawCell::new())
    }

    #[inline]
    const fn from_cell(cell: RawCell<REF_CAPACITY, Align8>) -> Self {
        Self {
            cell,
            _marker: PhantomData,
        }
    }

    fn bind_shared<T: 'static>(value: &'a T) -> Self {
        let mut cell = RawCell::new();
        cell.bind_shared(NonNull::from(value));
        Self::from_cell(cell)
    }

    fn bind_exclusive<T: 'static>(value: &'a mut T) -> Self {
        let mut cell = RawCell::new();
        cell.bind_exclusive(NonNull::from(value));
        Self::from_cell(cell)
    }

    fn bind_copied<T: Copy + 'static>(value: T) -> Self {
        let mut cell = RawCell::new();
        cell.emplace_inline::<T, handlers::Clone>(value);
        Self::from_cell(cell)
    }

    /// Whether the reference is bound to nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cell.is_empty()
    }

    /// Returns how the reference is bound, or `None` if empty.
    #[must_use]
    pub fn binding(&self) -> Option<Binding> {
        self.cell.layout().map(|layout| match layout {
            CellLayout::Shared => Binding::Shared,
            CellLayout::Exclusive => Binding::Exclusive,
            CellLayout::Inline | CellLayout::Boxed => Binding::Copied,
        })
    }

    /// Whether the bound value is of exactly the type `T`.
    #[inline]
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.cell.is::<T>()
    }

    /// Returns the [`TypeId`] of the bound value, or `None` if empty.
    #[inline]
    #[must_use]
    pub fn type_id(&self) -> Option<TypeId> {
        self.cell.type_id()
    }

    /// Returns the [`core::any::type_name`] of the bound value, or `None` if
    /// empty.
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> Option<&'static str> {
        self.cell.type_name()
    }

    /// Returns a reference to the bound value.
    ///
    /// # Errors
    ///
    /// [`AnyError::TypeMismatch`] if the bound value is not a `T`.
    #[track_caller]
    pub fn get_ref<T: 'static>(&self) -> Result<&T> {
        if !self.is::<T>() {
            return Err(AnyError::type_mismatch::<T>(self.type_name()));
        }
        // SAFETY:
        // 1. The cell holds a `T`, checked above.
        // 2. Borrowed values outlive `'a`, which outlives `&self`. Exclusive
        //    borrows are only reachable through `self`.
        Ok(unsafe { self.cell.downcast_unchecked::<T>() })
    }

    /// Returns a copy of the bound value.
    ///
    /// # Errors
    ///
    /// [`AnyError::TypeMismatch`] if the bound value is not a `T`.
    #[track_caller]
    pub fn get<T: Clone + 'static>(&self) -> Result<T> {
        self.get_ref::<T>().map(T::clone)
    }

    /// Returns a mutable reference to the bound value. For copied values,
    /// this is the copy held by the reference.
    ///
    /// # Errors
    ///
    /// - [`AnyError::TypeMismatch`] if the bound value is not a `T`.
    /// - [`AnyError::ReadOnly`] if the reference is bound to a `&T`.
    #[track_caller]
    pub fn get_mut<T: 'static>(&mut self) -> Result<&mut T> {
        if !self.is::<T>() {
            return Err(AnyError::type_mismatch::<T>(self.type_name()));
        }
        if self.binding() == Some(Binding::Shared) {
            return Err(AnyError::read_only(core::any::type_name::<T>()));
        }
        // SAFETY:
        // 1. The cell holds a `T`, checked above.
        // 2. The layout is not `Shared`, checked above.
        // 3. Exclusive borrows are only reachable through `self`, which is
        //    borrowed mutably for the lifetime of the result.
        Ok(unsafe { self.cell.downcast_unchecked_mut::<T>() })
    }

    /// Returns a reference to the bound value without checking its type.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The bound value is a `T`.
    #[inline]
    pub(crate) unsafe fn get_unchecked<T: 'static>(&self) -> &T {
        // SAFETY: The cell holds a `T` (guaranteed by the caller). Borrowed
        // values outlive `&self`.
        unsafe { self.cell.downcast_unchecked::<T>() }
    }

    /// Returns a mutable reference to the bound value without checking its
    /// type.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The bound value is a `T`.
    /// 2. The reference is not bound to a `&T`.
    #[inline]
    pub(crate) unsafe fn get_unchecked_mut<T: 'static>(&mut self) -> &mut T {
        // SAFETY: The cell holds a `T` and is not a shared binding
        // (guaranteed by the caller). Exclusive borrows are only reachable
        // through `self`.
        unsafe { self.cell.downcast_unchecked_mut::<T>() }
    }

    /// Copies the reference. Shared bindings copy the pointer, copied values
    /// are copied again.
    ///
    /// # Errors
    ///
    /// [`AnyError::NotCopyable`] if the reference is bound to a `&mut T`.
    #[track_caller]
    pub fn try_copy(&self) -> Result<Self> {
        match self.cell.try_clone() {
            Some(cell) => Ok(Self::from_cell(cell)),
            None => Err(AnyError::not_copyable(self.type_name())),
        }
    }

    /// Creates a shorter-lived reference to the same value.
    ///
    /// Unlike [`AnyURef::try_copy`], this also works for exclusive bindings,
    /// and a copied value is borrowed exclusively instead of copied again, so
    /// writes through the result reach this reference. The original is
    /// unusable while the result is alive.
    #[must_use]
    pub fn reborrow(&mut self) -> AnyURef<'_, K::Reborrowed> {
        // SAFETY:
        // 1. The result borrows `self` mutably, so `self` is neither moved,
        //    modified nor dropped while it lives.
        // 2. For the same reason the value is not accessed through `self`.
        AnyURef::from_cell(unsafe { self.cell.reborrow() })
    }

    /// Binds the reference to `target`, overwriting the previous binding.
    pub fn rebind(&mut self, target: impl Into<Self>) {
        let mut target = target.into();
        self.cell.move_from(&mut target.cell);
    }

    /// Converts into a reference accepting any binding.
    #[inline]
    #[must_use]
    pub fn into_universal(self) -> AnyURef<'a> {
        AnyURef::from_cell(self.cell)
    }
}

impl<'a> AnyURef<'a> {
    /// Binds a reference to a `&T`.
    #[must_use]
    pub fn from_ref<T: 'static>(value: &'a T) -> Self {
        Self::bind_shared(value)
    }

    /// Binds a reference to a `&mut T`.
    #[must_use]
    pub fn from_mut<T: 'static>(value: &'a mut T) -> Self {
        Self::bind_exclusive(value)
    }

    /// Binds a reference to a copy of `value`.
    ///
    /// Fails to compile if `T` does not fit in [`REF_CAPACITY`] bytes with an
    /// alignment of 8.
    #[must_use]
    pub fn from_copy<T: Copy + 'static>(value: T) -> Self {
        Self::bind_copied(value)
    }
}

impl<'a> AnyURef<'a, Exclusive> {
    /// Binds a reference to a `&mut T`.
    #[must_use]
    pub fn new<T: 'static>(value: &'a mut T) -> Self {
        Self::bind_exclusive(value)
    }
}

impl<'a> AnyURef<'a, Shared> {
    /// Binds a reference to a `&T`.
    #[must_use]
    pub fn new<T: 'static>(value: &'a T) -> Self {
        Self::bind_shared(value)
    }
}

impl AnyURef<'static, Copied> {
    /// Stores a copy of `value`.
    ///
    /// Fails to compile if `T` does not fit in [`REF_CAPACITY`] bytes with an
    /// alignment of 8.
    #[must_use]
    pub fn new<T: Copy + 'static>(value: T) -> Self {
        Self::bind_copied(value)
    }
}

impl<K: RefKind> Default for AnyURef<'_, K> {
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}

impl Clone for AnyURef<'_, Shared> {
    fn clone(&self) -> Self {
        // Shared bindings always copy.
        Self::from_cell(self.cell.try_clone().unwrap_or_default())
    }
}

impl Clone for AnyURef<'_, Copied> {
    fn clone(&self) -> Self {
        // Copied values always use a copying handler.
        Self::from_cell(self.cell.try_clone().unwrap_or_default())
    }
}

impl<'a, T: 'static> From<&'a T> for AnyURef<'a> {
    fn from(value: &'a T) -> Self {
        Self::bind_shared(value)
    }
}

impl<'a, T: 'static> From<&'a mut T> for AnyURef<'a> {
    fn from(value: &'a mut T) -> Self {
        Self::bind_exclusive(value)
    }
}

impl<T: Copy + 'static> From<ByValue<T>> for AnyURef<'_> {
    fn from(value: ByValue<T>) -> Self {
        Self::bind_copied(value.0)
    }
}

impl<'a, T: 'static> From<&'a T> for AnyURef<'a, Shared> {
    fn from(value: &'a T) -> Self {
        Self::bind_shared(value)
    }
}

impl<'a, T: 'static> From<&'a mut T> for AnyURef<'a, Exclusive> {
    fn from(value: &'a mut T) -> Self {
        Self::bind_exclusive(value)
    }
}

impl<T: Copy + 'static> From<ByValue<T>> for AnyURef<'_, Copied> {
    fn from(value: ByValue<T>) -> Self {
        Self::bind_copied(value.0)
    }
}

impl<'a> From<AnyURef<'a, Exclusive>> for AnyURef<'a> {
    fn from(reference: AnyURef<'a, Exclusive>) -> Self {
        reference.into_universal()
    }
}

impl<'a> From<AnyURef<'a, Shared>> for AnyURef<'a> {
    fn from(reference: AnyURef<'a, Shared>) -> Self {
        reference.into_universal()
    }
}

impl<'a> From<AnyURef<'a, Copied>> for AnyURef<'a> {
    fn from(reference: AnyURef<'a, Copied>) -> Self {
        reference.into_universal()
    }
}

impl<K: RefKind> core::fmt::Debug for AnyURef<'_, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("AnyURef(")?;
        self.cell.debug(f)?;
        f.write_str(")")
    }
}
