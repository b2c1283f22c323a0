//! This module encapsulates the fields of the [`SharedData`]. Since this is
//! the only place they are visible, the type of the [`SharedVtable`] is
//! guaranteed to always be in sync with the type of the actual value. They
//! are in sync when created and the API offers no way to change either
//! afterwards.

use core::{cell::RefCell, ptr::NonNull};

use crate::{
    handlers::ValueHandler,
    shared::{
        raw::{RawShared, RawSharedRef},
        vtable::SharedVtable,
    },
    util::Erased,
};

/// Type-erased shared value with vtable-based dispatch.
///
/// This struct uses `#[repr(C)]` so that the vtable can be read through a
/// pointer to `SharedData<Erased>` without knowing the value type.
#[repr(C)]
pub(crate) struct SharedData<T: 'static> {
    /// Reference to the vtable of this value
    vtable: &'static SharedVtable,
    /// The value, borrow-checked at runtime since every handle may reach it
    value: RefCell<T>,
}

impl<T: 'static> SharedData<T> {
    /// Creates a new [`SharedData`] pairing `value` with the vtable for `T`
    /// and `H`.
    pub(super) fn new<H: ValueHandler<T>>(value: T) -> Self {
        Self {
            vtable: SharedVtable::new::<T, H>(),
            value: RefCell::new(value),
        }
    }

    /// Returns the runtime-borrow-checked value.
    pub(super) fn value(&self) -> &RefCell<T> {
        &self.value
    }
}

impl RawShared {
    /// Moves the value out if this is the only handle to it.
    ///
    /// Returns the handle unchanged if other handles exist.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The type `T` matches the actual value type stored in the
    ///    [`SharedData`].
    pub unsafe fn try_into_inner<T: 'static>(self) -> Result<T, Self> {
        debug_assert_eq!(self.as_ref().type_id(), core::any::TypeId::of::<T>());

        let ptr: NonNull<SharedData<Erased>> = self.into_non_null();
        let ptr: *const SharedData<T> = ptr.cast::<SharedData<T>>().as_ptr();

        // SAFETY:
        // 1. The pointer came from `Arc::into_raw` (guaranteed by the
        //    invariants of `RawShared`) with the type `SharedData<T>`
        //    (guaranteed by the caller).
        // 2. Ownership of the strong reference moved out of `self` above, so
        //    it is not released twice.
        let arc: triomphe::Arc<SharedData<T>> = unsafe { triomphe::Arc::from_raw(ptr) };

        match triomphe::Arc::try_unique(arc) {
            Ok(unique) => Ok(triomphe::UniqueArc::into_inner(unique).value.into_inner()),
            Err(arc) => Err(RawShared::from_arc(arc)),
        }
    }
}

impl<'a> RawSharedRef<'a> {
    /// Returns a reference to the [`SharedVtable`] of the [`SharedData`]
    /// instance.
    pub(super) fn vtable(self) -> &'static SharedVtable {
        let ptr = self.as_ptr();
        // SAFETY: We don't know the actual value type, but we do know that
        // the pointer refers to a `SharedData<T>` for some specific `T`.
        // Since `SharedData<T>` is `#[repr(C)]`, the fields before the value
        // can be accessed without creating a reference to the whole struct.
        let vtable_ptr: *const &'static SharedVtable = unsafe { &raw const (*ptr).vtable };

        // SAFETY: Reading the `&'static SharedVtable` is valid for the same
        // reasons.
        unsafe { *vtable_ptr }
    }

    /// Accesses the value as a [`RefCell`] of the specified type.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The type `T` matches the actual value type stored in the
    ///    [`SharedData`].
    #[inline]
    pub unsafe fn value_downcast_unchecked<T: 'static>(self) -> &'a RefCell<T> {
        // SAFETY: The type matches (guaranteed by the caller).
        let this = unsafe { self.cast_inner::<T>() };
        &this.value
    }
}
