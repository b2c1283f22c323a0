//! Type-erased shared value pointer types.
//!
//! This module encapsulates the `ptr` field of [`RawShared`] and
//! [`RawSharedRef`], ensuring it is only visible within this module. This
//! visibility restriction guarantees the safety invariant: **the pointer always
//! comes from `Arc<SharedData<T>>`**.
//!
//! # Safety Invariant
//!
//! Since the `ptr` field can only be set via [`RawShared::new`] or
//! [`RawShared::from_arc`] (which create it from `Arc::into_raw`), and cannot
//! be modified afterward, the pointer provenance remains valid throughout the
//! value's lifetime.
//!
//! # Type Erasure
//!
//! The concrete type parameter `T` is erased by casting to
//! `SharedData<Erased>`. The vtable stored within the `SharedData` provides the
//! runtime type information needed to downcast, copy and format the value.
//!
//! # Thread Safety
//!
//! Although [`triomphe::Arc`] counts atomically, neither handle is [`Send`] or
//! [`Sync`]: the value sits behind a [`RefCell`](core::cell::RefCell) and may
//! itself be neither.

use core::{any::TypeId, ptr::NonNull};

use crate::{
    handlers::ValueHandler,
    shared::{CloneFailure, data::SharedData},
    util::Erased,
};

/// A pointer to a [`SharedData`] that is guaranteed to point to an initialized
/// instance of a [`SharedData<T>`] for some specific `T`, though we do not know
/// which actual `T` it is.
///
/// However, the pointer is allowed to transition into a non-initialized state
/// inside the [`RawShared::drop`] method.
///
/// We cannot use a [`triomphe::Arc<SharedData<T>>`] directly, because that
/// does not allow us to type-erase the `T`.
#[repr(transparent)]
pub struct RawShared {
    /// Pointer to the inner shared data
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The pointer must have been created from a
    ///    `triomphe::Arc<SharedData<T>>` for some `T` using
    ///    `triomphe::Arc::into_raw`.
    /// 2. This struct owns one strong reference.
    /// 3. The pointer will point to the same `SharedData<T>` for the entire
    ///    lifetime of this object.
    ptr: NonNull<SharedData<Erased>>,
}

impl RawShared {
    /// Creates a new [`RawShared`] from a [`triomphe::Arc<SharedData<T>>`].
    #[inline]
    pub(super) fn from_arc<T: 'static>(data: triomphe::Arc<SharedData<T>>) -> Self {
        let ptr: *const SharedData<T> = triomphe::Arc::into_raw(data);
        let ptr: *mut SharedData<Erased> = ptr.cast::<SharedData<Erased>>().cast_mut();

        // SAFETY:
        // 1. Triomphe guarantees that `Arc::into_raw` returns a non-null pointer.
        let ptr: NonNull<SharedData<Erased>> = unsafe { NonNull::new_unchecked(ptr) };

        Self { ptr }
    }

    /// Consumes the [`RawShared`] without decrementing the reference count
    /// and returns the inner pointer.
    #[inline]
    pub(super) fn into_non_null(self) -> NonNull<SharedData<Erased>> {
        let ptr = self.ptr;
        core::mem::forget(self);
        ptr
    }

    /// Moves `value` into a new allocation with a strong count of 1.
    ///
    /// The value will use the handler `H` for all copies and formatting.
    #[inline]
    pub fn new<T, H>(value: T) -> Self
    where
        T: 'static,
        H: ValueHandler<T>,
    {
        Self::from_arc(triomphe::Arc::new(SharedData::new::<H>(value)))
    }

    /// Returns a reference to the [`SharedData`] instance.
    #[inline]
    pub fn as_ref(&self) -> RawSharedRef<'_> {
        RawSharedRef {
            ptr: self.ptr,
            _marker: core::marker::PhantomData,
        }
    }
}

impl Clone for RawShared {
    /// Adds a handle to the same value.
    #[inline]
    fn clone(&self) -> Self {
        self.as_ref().clone_arc()
    }
}

impl core::ops::Drop for RawShared {
    #[inline]
    fn drop(&mut self) {
        let vtable = self.as_ref().vtable();

        // SAFETY:
        // 1. The pointer comes from `Arc::into_raw` (guaranteed by
        //    `RawShared::from_arc`)
        // 2. The vtable returned by `self.as_ref().vtable()` is guaranteed to
        //    match the data in the `SharedData`.
        // 3. The pointer is not used after this call (we're in the drop
        //    function)
        unsafe {
            vtable.drop(self.ptr);
        }
    }
}

/// A lifetime-bound pointer to a [`SharedData`] that is guaranteed to point
/// to an initialized instance of a [`SharedData<T>`] for some specific `T`,
/// though we do not know which actual `T` it is.
///
/// We cannot use a [`&'a SharedData<T>`] directly, because that would require
/// us to know the actual type of the value, which we do not.
///
/// [`&'a SharedData<T>`]: SharedData
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct RawSharedRef<'a> {
    /// Pointer to the inner shared data
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The pointer must have been created from a
    ///    `triomphe::Arc<SharedData<T>>` for some `T` using
    ///    `triomphe::Arc::into_raw`.
    /// 2. The allocation is kept alive by a [`RawShared`] for at least `'a`.
    ptr: NonNull<SharedData<Erased>>,

    /// Marker to tell the compiler that we should
    /// behave the same as a `&'a SharedData<Erased>`
    _marker: core::marker::PhantomData<&'a SharedData<Erased>>,
}

impl<'a> RawSharedRef<'a> {
    /// Casts the [`RawSharedRef`] to a [`SharedData<T>`] reference.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The type `T` matches the actual value type stored in the
    ///    [`SharedData`]
    #[inline]
    pub(super) unsafe fn cast_inner<T: 'static>(self) -> &'a SharedData<T> {
        // Debug assertion to catch type mismatches in case of bugs
        debug_assert_eq!(self.vtable().type_id(), TypeId::of::<T>());

        let this = self.ptr.cast::<SharedData<T>>();
        // SAFETY:
        // 1. The pointer is non-null, aligned and dereferenceable for `'a`
        //    (guaranteed by the invariants of this type).
        // 2. The type `T` matches the stored value (guaranteed by caller).
        // 3. Only shared access is handed out; mutation goes through the
        //    `RefCell`.
        unsafe { this.as_ref() }
    }

    /// Returns a raw pointer to the [`SharedData`] instance.
    #[inline]
    pub(super) fn as_ptr(self) -> *const SharedData<Erased> {
        self.ptr.as_ptr()
    }

    /// Returns the [`TypeId`] of the value.
    #[inline]
    pub fn type_id(self) -> TypeId {
        self.vtable().type_id()
    }

    /// Returns the [`core::any::type_name`] of the value.
    #[inline]
    pub fn type_name(self) -> &'static str {
        self.vtable().type_name()
    }

    /// Returns the number of [`RawShared`] handles to the value.
    #[inline]
    pub fn strong_count(self) -> usize {
        let vtable = self.vtable();
        // SAFETY:
        // 1. The pointer comes from `Arc::into_raw` (guaranteed by the
        //    invariants of this type).
        // 2. The vtable returned by `self.vtable()` matches the data.
        unsafe { vtable.strong_count(self.ptr) }
    }

    /// Clones the inner [`triomphe::Arc`] and returns a new [`RawShared`]
    /// pointing to the same data.
    #[inline]
    pub fn clone_arc(self) -> RawShared {
        let vtable = self.vtable();
        // SAFETY:
        // 1. The pointer comes from `Arc::into_raw` (guaranteed by the
        //    invariants of this type).
        // 2. The vtable returned by `self.vtable()` matches the data.
        unsafe { vtable.clone_arc(self.ptr) }
    }

    /// Copies the value into a new allocation using the handler chosen when
    /// it was stored.
    #[inline]
    pub fn deep_clone(self) -> Result<RawShared, CloneFailure> {
        let vtable = self.vtable();
        // SAFETY:
        // 1. The vtable returned by `self.vtable()` matches the data.
        unsafe { vtable.deep_clone(self) }
    }

    /// Whether both references point to the same allocation.
    #[inline]
    pub fn ptr_eq(self, other: RawSharedRef<'_>) -> bool {
        self.ptr == other.ptr
    }

    /// Formats the value using the handler chosen when it was stored.
    #[inline]
    pub fn debug(self, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let vtable = self.vtable();
        // SAFETY:
        // 1. The vtable returned by `self.vtable()` matches the data.
        unsafe { vtable.debug(self, formatter) }
    }
}
