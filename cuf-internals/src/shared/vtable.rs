//! Vtable for type-erased shared value operations.
//!
//! This module contains the [`SharedVtable`] which enables calling handler
//! methods on shared values when their concrete type `T` and handler type `H`
//! have been erased. The vtable is stored in each [`SharedData`] and provides
//! dispatch to the correct typed functions.
//!
//! The fields of [`SharedVtable`] are private to this module. This visibility
//! restriction guarantees the safety invariant: **the vtable's type parameters
//! must match the actual value type and handler stored in the
//! [`SharedData`]**.

use core::{any::TypeId, ptr::NonNull};

use crate::{
    handlers::ValueHandler,
    shared::{
        CloneFailure,
        data::SharedData,
        raw::{RawShared, RawSharedRef},
    },
    util::Erased,
};

/// Vtable for type-erased shared value operations.
///
/// # Safety Invariant
///
/// The fields `drop`, `clone_arc`, `strong_count`, `deep_clone` and `debug`
/// all point to the functions defined below instantiated with the value type
/// `T` and handler `H` used to create this [`SharedVtable`].
pub(crate) struct SharedVtable {
    /// Gets the [`TypeId`] of the value type.
    type_id: fn() -> TypeId,
    /// Gets the [`core::any::type_name`] of the value type.
    type_name: fn() -> &'static str,
    /// Method to drop the [`triomphe::Arc<SharedData<T>>`] instance pointed to
    /// by this pointer.
    drop: unsafe fn(NonNull<SharedData<Erased>>),
    /// Method to clone the [`triomphe::Arc<SharedData<T>>`] pointed to by this
    /// pointer.
    clone_arc: unsafe fn(NonNull<SharedData<Erased>>) -> RawShared,
    /// Gets the strong count of the [`triomphe::Arc<SharedData<T>>`].
    strong_count: unsafe fn(NonNull<SharedData<Erased>>) -> usize,
    /// Copies the value into a new allocation using the handler.
    deep_clone: unsafe fn(RawSharedRef<'_>) -> Result<RawShared, CloneFailure>,
    /// Formats the value using the `debug` method on the handler.
    debug: unsafe fn(RawSharedRef<'_>, &mut core::fmt::Formatter<'_>) -> core::fmt::Result,
}

impl SharedVtable {
    /// Creates a new [`SharedVtable`] for the value type `T` and the handler
    /// type `H`.
    pub(super) const fn new<T: 'static, H: ValueHandler<T>>() -> &'static Self {
        const {
            &Self {
                type_id: TypeId::of::<T>,
                type_name: core::any::type_name::<T>,
                drop: drop::<T>,
                clone_arc: clone_arc::<T>,
                strong_count: strong_count::<T>,
                deep_clone: deep_clone::<T, H>,
                debug: debug::<T, H>,
            }
        }
    }

    /// Gets the [`TypeId`] of the value type that was used to create this
    /// [`SharedVtable`].
    #[inline]
    pub(super) fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Gets the name of the value type.
    #[inline]
    pub(super) fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Drops the `triomphe::Arc<SharedData<T>>` instance pointed to by this
    /// pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The pointer comes from a [`triomphe::Arc<SharedData<T>>`] turned into
    ///    a pointer via [`triomphe::Arc::into_raw`]
    /// 2. This [`SharedVtable`] must be a vtable for the value type stored in
    ///    the [`SharedData`].
    /// 3. The pointer is not used after calling this method.
    #[inline]
    pub(super) unsafe fn drop(&self, ptr: NonNull<SharedData<Erased>>) {
        // SAFETY: `self.drop` points to `drop::<T>` below, whose requirements
        // are guaranteed by the caller.
        unsafe { (self.drop)(ptr) }
    }

    /// Clones the `triomphe::Arc<SharedData<T>>` pointed to by this pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The pointer comes from a [`triomphe::Arc<SharedData<T>>`] turned into
    ///    a pointer via [`triomphe::Arc::into_raw`]
    /// 2. This [`SharedVtable`] must be a vtable for the value type stored in
    ///    the [`SharedData`].
    #[inline]
    pub(super) unsafe fn clone_arc(&self, ptr: NonNull<SharedData<Erased>>) -> RawShared {
        // SAFETY: `self.clone_arc` points to `clone_arc::<T>` below, whose
        // requirements are guaranteed by the caller.
        unsafe { (self.clone_arc)(ptr) }
    }

    /// Gets the strong count of the `triomphe::Arc<SharedData<T>>` pointed to
    /// by this pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The pointer comes from a [`triomphe::Arc<SharedData<T>>`] turned into
    ///    a pointer via [`triomphe::Arc::into_raw`]
    /// 2. This [`SharedVtable`] must be a vtable for the value type stored in
    ///    the [`SharedData`].
    #[inline]
    pub(super) unsafe fn strong_count(&self, ptr: NonNull<SharedData<Erased>>) -> usize {
        // SAFETY: `self.strong_count` points to `strong_count::<T>` below,
        // whose requirements are guaranteed by the caller.
        unsafe { (self.strong_count)(ptr) }
    }

    /// Copies the value into a new, independent allocation.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This [`SharedVtable`] must be a vtable for the value type stored in
    ///    the [`RawSharedRef`].
    #[inline]
    pub(super) unsafe fn deep_clone(
        &self,
        ptr: RawSharedRef<'_>,
    ) -> Result<RawShared, CloneFailure> {
        // SAFETY: `self.deep_clone` points to `deep_clone::<T, H>` below,
        // whose requirements are guaranteed by the caller.
        unsafe { (self.deep_clone)(ptr) }
    }

    /// Formats the value using the handler.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This [`SharedVtable`] must be a vtable for the value type stored in
    ///    the [`RawSharedRef`].
    #[inline]
    pub(super) unsafe fn debug(
        &self,
        ptr: RawSharedRef<'_>,
        formatter: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        // SAFETY: `self.debug` points to `debug::<T, H>` below, whose
        // requirements are guaranteed by the caller.
        unsafe { (self.debug)(ptr, formatter) }
    }
}

/// Drops the [`triomphe::Arc<SharedData<T>>`] instance pointed to by this
/// pointer.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The pointer comes from [`triomphe::Arc<SharedData<T>>`] via
///    [`triomphe::Arc::into_raw`]
/// 2. The value type `T` matches the actual value type stored in the
///    [`SharedData`]
/// 3. The pointer is not used after calling this method.
unsafe fn drop<T: 'static>(ptr: NonNull<SharedData<Erased>>) {
    let ptr: *const SharedData<T> = ptr.cast::<SharedData<T>>().as_ptr();
    // SAFETY:
    // 1. The pointer has the correct type and came from `Arc::into_raw`
    //    (guaranteed by caller)
    // 2. After `from_raw`, the pointer is consumed and not accessed again
    let arc = unsafe { triomphe::Arc::from_raw(ptr) };
    core::mem::drop(arc);
}

/// Clones the [`triomphe::Arc<SharedData<T>>`] pointed to by this pointer.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The pointer comes from [`triomphe::Arc<SharedData<T>>`] via
///    [`triomphe::Arc::into_raw`]
/// 2. The value type `T` matches the actual value type stored in the
///    [`SharedData`]
unsafe fn clone_arc<T: 'static>(ptr: NonNull<SharedData<Erased>>) -> RawShared {
    let ptr: *const SharedData<T> = ptr.cast::<SharedData<T>>().as_ptr();

    // SAFETY: The pointer is valid and came from `Arc::into_raw` with the
    // correct type (guaranteed by the caller), which fulfills the requirements
    // for `ArcBorrow::from_ptr`.
    let arc_borrow = unsafe { triomphe::ArcBorrow::from_ptr(ptr) };

    RawShared::from_arc(arc_borrow.clone_arc())
}

/// Gets the strong count of the [`triomphe::Arc<SharedData<T>>`] pointed to
/// by this pointer.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The pointer comes from [`triomphe::Arc<SharedData<T>>`] via
///    [`triomphe::Arc::into_raw`]
/// 2. The value type `T` matches the actual value type stored in the
///    [`SharedData`]
unsafe fn strong_count<T: 'static>(ptr: NonNull<SharedData<Erased>>) -> usize {
    let ptr: *const SharedData<T> = ptr.cast::<SharedData<T>>().as_ptr();

    // SAFETY: The pointer is valid and came from `Arc::into_raw` with the
    // correct type (guaranteed by the caller), which fulfills the requirements
    // for `ArcBorrow::from_ptr`.
    let arc_borrow = unsafe { triomphe::ArcBorrow::from_ptr(ptr) };

    triomphe::ArcBorrow::strong_count(&arc_borrow)
}

/// Copies the value using `H` and moves the copy into a new allocation.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The value type `T` matches the actual value type stored in the
///    [`SharedData`]
unsafe fn deep_clone<T: 'static, H: ValueHandler<T>>(
    ptr: RawSharedRef<'_>,
) -> Result<RawShared, CloneFailure> {
    // SAFETY: The value type matches (guaranteed by the caller).
    let data = unsafe { ptr.cast_inner::<T>() };
    let value = data
        .value()
        .try_borrow()
        .map_err(|_| CloneFailure::Borrowed)?;
    let copy = H::try_clone(&value).ok_or(CloneFailure::NotCopyable)?;
    Ok(RawShared::new::<T, H>(copy))
}

/// Formats the value using `H`, or writes `<borrowed>` while it is mutably
/// borrowed.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The value type `T` matches the actual value type stored in the
///    [`SharedData`]
unsafe fn debug<T: 'static, H: ValueHandler<T>>(
    ptr: RawSharedRef<'_>,
    formatter: &mut core::fmt::Formatter<'_>,
) -> core::fmt::Result {
    // SAFETY: The value type matches (guaranteed by the caller).
    let data = unsafe { ptr.cast_inner::<T>() };
    match data.value().try_borrow() {
        Ok(value) => H::debug(&value, formatter),
        Err(_) => formatter.write_str("<borrowed>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Copyable;
    impl<T: Clone> ValueHandler<T> for Copyable {
        fn try_clone(value: &T) -> Option<T> {
            Some(value.clone())
        }
    }

    #[test]
    fn test_shared_vtable_eq() {
        let vtable1 = SharedVtable::new::<i32, Copyable>();
        let vtable2 = SharedVtable::new::<i32, Copyable>();
        assert!(core::ptr::eq(vtable1, vtable2));
    }

    #[test]
    fn test_shared_type_id() {
        let vtable = SharedVtable::new::<i32, Copyable>();
        assert_eq!(vtable.type_id(), TypeId::of::<i32>());
        assert_eq!(vtable.type_name(), "i32");
    }
}
