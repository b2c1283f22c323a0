//! Vtable for type-erased cell operations.
//!
//! This module contains the [`CellVtable`] which enables dropping, copying and
//! formatting the value held by a [`RawCell`] when its concrete type `T` and
//! handler type `H` have been erased.
//!
//! The fields of [`CellVtable`] are private to this module. This visibility
//! restriction guarantees the safety invariant: **the vtable's type parameters
//! and layout match the bytes stored in the [`RawCell`] that points to it**.
//!
//! # Safety Invariant
//!
//! Vtables are only created as `&'static` references via the constructors
//! below, each of which pairs its function pointers with one specific type,
//! handler and [`CellLayout`] at compile time.
//!
//! For the indirect layouts the buffer holds a `NonNull<T>`. Buffers may be
//! aligned to less than a pointer, so those pointers are always accessed with
//! unaligned reads and writes.
//!
//! [`RawCell`]: super::RawCell

use alloc::boxed::Box;
use core::{any::TypeId, ptr::NonNull};

use crate::handlers::ValueHandler;

/// Where the value described by a [`CellVtable`] lives.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum CellLayout {
    /// The value is stored directly in the cell buffer.
    Inline,
    /// The value lives in its own heap allocation, owned by the cell. The
    /// buffer holds the pointer.
    Boxed,
    /// The buffer holds a pointer to a value borrowed for shared access.
    Shared,
    /// The buffer holds a pointer to a value borrowed for exclusive access.
    Exclusive,
}

impl CellLayout {
    /// Whether the buffer holds a pointer rather than the value itself.
    #[inline]
    pub const fn is_indirect(self) -> bool {
        !matches!(self, Self::Inline)
    }

    /// Whether the cell owns the value, as opposed to borrowing it.
    #[inline]
    pub const fn is_owned(self) -> bool {
        matches!(self, Self::Inline | Self::Boxed)
    }
}

/// Vtable for type-erased cell operations.
///
/// # Safety Invariant
///
/// The fields `drop`, `clone_into` and `debug` point to the functions defined
/// below instantiated with the value type `T` and handler `H` used to create
/// this [`CellVtable`], and with the functions matching `layout`.
pub(crate) struct CellVtable {
    /// Gets the [`TypeId`] of the value type.
    type_id: fn() -> TypeId,
    /// Gets the [`core::any::type_name`] of the value type.
    type_name: fn() -> &'static str,
    /// Where the value lives relative to the buffer.
    layout: CellLayout,
    /// Releases whatever the buffer owns.
    drop: unsafe fn(*mut u8),
    /// Writes a copy of the source buffer into the destination buffer.
    clone_into: unsafe fn(*const u8, *mut u8) -> bool,
    /// Formats the value pointed to.
    debug: unsafe fn(*const u8, &mut core::fmt::Formatter<'_>) -> core::fmt::Result,
    /// Gets the vtable of an exclusive borrow of the same type.
    exclusive_borrow: fn() -> &'static CellVtable,
}

impl CellVtable {
    /// Creates the vtable for a `T` stored inline, handled by `H`.
    pub(super) const fn inline<T: 'static, H: ValueHandler<T>>() -> &'static Self {
        const {
            &Self {
                type_id: TypeId::of::<T>,
                type_name: core::any::type_name::<T>,
                layout: CellLayout::Inline,
                drop: drop_inline::<T>,
                clone_into: clone_inline::<T, H>,
                debug: debug_value::<T, H>,
                exclusive_borrow: Self::exclusive::<T>,
            }
        }
    }

    /// Creates the vtable for a `T` stored in a heap allocation, handled by
    /// `H`.
    pub(super) const fn boxed<T: 'static, H: ValueHandler<T>>() -> &'static Self {
        const {
            &Self {
                type_id: TypeId::of::<T>,
                type_name: core::any::type_name::<T>,
                layout: CellLayout::Boxed,
                drop: drop_boxed::<T>,
                clone_into: clone_boxed::<T, H>,
                debug: debug_value::<T, H>,
                exclusive_borrow: Self::exclusive::<T>,
            }
        }
    }

    /// Creates the vtable for a shared borrow of a `T`.
    pub(super) const fn shared<T: 'static>() -> &'static Self {
        const {
            &Self {
                type_id: TypeId::of::<T>,
                type_name: core::any::type_name::<T>,
                layout: CellLayout::Shared,
                drop: drop_borrowed,
                clone_into: clone_pointer,
                debug: debug_type_name::<T>,
                exclusive_borrow: Self::exclusive::<T>,
            }
        }
    }

    /// Creates the vtable for an exclusive borrow of a `T`.
    pub(super) const fn exclusive<T: 'static>() -> &'static Self {
        const {
            &Self {
                type_id: TypeId::of::<T>,
                type_name: core::any::type_name::<T>,
                layout: CellLayout::Exclusive,
                drop: drop_borrowed,
                clone_into: clone_refused,
                debug: debug_type_name::<T>,
                exclusive_borrow: Self::exclusive::<T>,
            }
        }
    }

    /// Gets the [`TypeId`] of the value type.
    #[inline]
    pub(super) fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Gets the name of the value type.
    #[inline]
    pub(super) fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Gets the layout of the value.
    #[inline]
    pub(super) fn layout(&self) -> CellLayout {
        self.layout
    }

    /// Gets the vtable of an exclusive borrow of the same type.
    #[inline]
    pub(super) fn exclusive_borrow(&self) -> &'static Self {
        (self.exclusive_borrow)()
    }

    /// Releases whatever the buffer owns.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `storage` points to a buffer initialized according to this vtable.
    /// 2. The buffer is treated as uninitialized afterwards.
    #[inline]
    pub(super) unsafe fn drop(&self, storage: *mut u8) {
        // SAFETY: `self.drop` matches this vtable's type and layout; the
        // remaining requirements are guaranteed by the caller.
        unsafe { (self.drop)(storage) }
    }

    /// Writes a copy of `source` into `target`. Returns `false`, leaving
    /// `target` uninitialized, if the value cannot be copied.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `source` points to a buffer initialized according to this vtable.
    /// 2. `target` points to a buffer of at least the same size and
    ///    alignment, which holds no live value.
    #[inline]
    pub(super) unsafe fn clone_into(&self, source: *const u8, target: *mut u8) -> bool {
        // SAFETY: `self.clone_into` matches this vtable's type and layout; the
        // remaining requirements are guaranteed by the caller.
        unsafe { (self.clone_into)(source, target) }
    }

    /// Formats the value.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `value` points to a live value of the type this vtable was created
    ///    for.
    #[inline]
    pub(super) unsafe fn debug(
        &self,
        value: *const u8,
        formatter: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        // SAFETY: `self.debug` matches this vtable's type; the pointer is
        // guaranteed valid by the caller.
        unsafe { (self.debug)(value, formatter) }
    }
}

/// Drops a `T` stored inline.
///
/// # Safety
///
/// `storage` must point to a live, properly aligned `T`.
unsafe fn drop_inline<T>(storage: *mut u8) {
    // SAFETY: Guaranteed by the caller.
    unsafe { core::ptr::drop_in_place(storage.cast::<T>()) }
}

/// Drops a `T` whose buffer holds a pointer obtained from [`Box::into_raw`].
///
/// # Safety
///
/// `storage` must hold a `NonNull<T>` created from [`Box::into_raw`] that has
/// not been freed.
unsafe fn drop_boxed<T>(storage: *mut u8) {
    // SAFETY: The buffer holds an initialized `NonNull<T>`.
    let ptr = unsafe { storage.cast::<NonNull<T>>().read_unaligned() };
    // SAFETY: The pointer came from `Box::into_raw` and ownership is
    // transferred back here exactly once.
    let boxed = unsafe { Box::from_raw(ptr.as_ptr()) };
    core::mem::drop(boxed);
}

/// Borrowed pointers own nothing.
unsafe fn drop_borrowed(_storage: *mut u8) {}

/// Copies an inline `T` using `H`.
///
/// # Safety
///
/// `source` must point to a live `T`; `target` must be valid for writing a
/// `T`.
unsafe fn clone_inline<T, H: ValueHandler<T>>(source: *const u8, target: *mut u8) -> bool {
    // SAFETY: Guaranteed by the caller.
    let value: &T = unsafe { &*source.cast::<T>() };
    match H::try_clone(value) {
        Some(copy) => {
            // SAFETY: Guaranteed by the caller.
            unsafe { target.cast::<T>().write(copy) };
            true
        }
        None => false,
    }
}

/// Copies a boxed `T` into a fresh allocation using `H`.
///
/// # Safety
///
/// `source` must hold a `NonNull<T>` to a live `T`; `target` must be valid for
/// writing a `NonNull<T>`.
unsafe fn clone_boxed<T, H: ValueHandler<T>>(source: *const u8, target: *mut u8) -> bool {
    // SAFETY: The buffer holds an initialized `NonNull<T>`.
    let ptr = unsafe { source.cast::<NonNull<T>>().read_unaligned() };
    // SAFETY: The pointee is alive for as long as the source cell is.
    let value: &T = unsafe { ptr.as_ref() };
    match H::try_clone(value) {
        Some(copy) => {
            let copy = NonNull::from(Box::leak(Box::new(copy)));
            // SAFETY: Guaranteed by the caller.
            unsafe { target.cast::<NonNull<T>>().write_unaligned(copy) };
            true
        }
        None => false,
    }
}

/// Shared borrows are copied by copying the pointer.
///
/// # Safety
///
/// `source` must hold a pointer; `target` must be valid for writing one.
unsafe fn clone_pointer(source: *const u8, target: *mut u8) -> bool {
    // SAFETY: Guaranteed by the caller.
    unsafe {
        target
            .cast::<NonNull<u8>>()
            .write_unaligned(source.cast::<NonNull<u8>>().read_unaligned());
    }
    true
}

/// Exclusive borrows cannot be duplicated.
unsafe fn clone_refused(_source: *const u8, _target: *mut u8) -> bool {
    false
}

/// Formats a `T` using `H`.
///
/// # Safety
///
/// `value` must point to a live `T`.
unsafe fn debug_value<T, H: ValueHandler<T>>(
    value: *const u8,
    formatter: &mut core::fmt::Formatter<'_>,
) -> core::fmt::Result {
    // SAFETY: Guaranteed by the caller.
    let value: &T = unsafe { &*value.cast::<T>() };
    H::debug(value, formatter)
}

/// Formats a borrowed `T` as `&TypeName`.
unsafe fn debug_type_name<T>(
    _value: *const u8,
    formatter: &mut core::fmt::Formatter<'_>,
) -> core::fmt::Result {
    write!(formatter, "&{}", core::any::type_name::<T>())
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
    fn test_cell_vtable_eq() {
        let vtable1 = CellVtable::inline::<i32, Copyable>();
        let vtable2 = CellVtable::inline::<i32, Copyable>();
        assert!(core::ptr::eq(vtable1, vtable2));

        let boxed = CellVtable::boxed::<i32, Copyable>();
        assert!(!core::ptr::eq(vtable1, boxed));
    }

    #[test]
    fn test_cell_vtable_type_info() {
        let vtable = CellVtable::shared::<u64>();
        assert_eq!(vtable.type_id(), TypeId::of::<u64>());
        assert_eq!(vtable.type_name(), "u64");
        assert_eq!(vtable.layout(), CellLayout::Shared);
        assert_eq!(
            CellVtable::exclusive::<u64>().layout(),
            CellLayout::Exclusive
        );
    }

    #[test]
    fn test_cell_vtable_exclusive_borrow() {
        for vtable in [
            CellVtable::inline::<u64, Copyable>(),
            CellVtable::boxed::<u64, Copyable>(),
            CellVtable::exclusive::<u64>(),
        ] {
            let borrow = vtable.exclusive_borrow();
            assert_eq!(borrow.layout(), CellLayout::Exclusive);
            assert_eq!(borrow.type_id(), TypeId::of::<u64>());
        }
    }

    #[test]
    fn test_cell_layout_predicates() {
        assert!(!CellLayout::Inline.is_indirect());
        assert!(CellLayout::Boxed.is_indirect());
        assert!(CellLayout::Boxed.is_owned());
        assert!(!CellLayout::Shared.is_owned());
        assert!(!CellLayout::Exclusive.is_owned());
    }
}
