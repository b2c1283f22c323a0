//! Type-erased fixed-capacity cell.
//!
//! This module encapsulates the `vtable` and `storage` fields of [`RawCell`],
//! ensuring they are only visible within this module. This visibility
//! restriction guarantees the safety invariant: **if `vtable` is `Some`, the
//! storage is initialized exactly as that vtable describes**.
//!
//! # Safety Invariant
//!
//! Both fields are only written together, by the `emplace_*` and `bind_*`
//! methods, after a compile-time assertion proved that the value (or the
//! pointer to it) fits in the buffer. Every path that releases the contents
//! resets `vtable` to `None` first.
//!
//! # Moving
//!
//! A [`RawCell`] is moved like any other Rust value, by copying its bytes.
//! This is sound for inline values because Rust values never depend on their
//! own address.

use alloc::boxed::Box;
use core::{any::TypeId, marker::PhantomData, ptr::NonNull};

use crate::{
    cell::{
        storage::{Alignment, Storage},
        vtable::{CellLayout, CellVtable},
    },
    handlers::ValueHandler,
    util::EMPTY_TYPE_NAME,
};

/// An aligned buffer of `N` bytes holding at most one value of any type.
///
/// The value is either stored inline, moved into a heap allocation owned by
/// the cell, or borrowed through a pointer. See [`CellLayout`].
///
/// The cell is neither [`Send`] nor [`Sync`], since it may hold values that
/// are neither.
pub struct RawCell<const N: usize, A: Alignment> {
    /// Describes the contents of `storage`, or `None` when empty
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. If this is `Some(vtable)` for a vtable created for the type `T`
    ///    with layout `Inline`, `storage` holds a live `T`.
    /// 2. If the layout is `Boxed`, `storage` holds a `NonNull<T>` created by
    ///    [`Box::into_raw`] and owned by this cell.
    /// 3. If the layout is `Shared` or `Exclusive`, `storage` holds a
    ///    `NonNull<T>` supplied by the caller of the binding method.
    vtable: Option<&'static CellVtable>,

    /// The bytes of the value or of the pointer to it
    storage: Storage<N, A>,

    /// Opts out of `Send` and `Sync`
    _marker: PhantomData<*mut u8>,
}

impl<const N: usize, A: Alignment> RawCell<N, A> {
    /// Creates an empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self {
            vtable: None,
            storage: Storage::uninit(),
            _marker: PhantomData,
        }
    }

    /// Whether a `T` can be stored inline in this cell.
    #[inline]
    pub const fn fits<T>() -> bool {
        Storage::<N, A>::fits::<T>()
    }

    /// Whether a pointer can be stored in this cell, which is required for
    /// every layout but [`CellLayout::Inline`].
    #[inline]
    pub const fn fits_pointer() -> bool {
        core::mem::size_of::<NonNull<u8>>() <= N
    }

    /// Stores `value` inline if it fits, and on the heap otherwise, dropping
    /// the previous contents. Returns the layout that was chosen.
    ///
    /// The choice only depends on `T`, so it is resolved at compile time.
    /// Fails to compile if `T` fits neither inline nor behind a pointer.
    #[inline]
    pub fn emplace<T, H>(&mut self, value: T) -> CellLayout
    where
        T: 'static,
        H: ValueHandler<T>,
    {
        const {
            assert!(
                Self::fits::<T>() || Self::fits_pointer(),
                "the cell can hold neither the value nor a pointer to it"
            );
        }

        if Self::fits::<T>() {
            // SAFETY: `T` fits, as checked above.
            unsafe { self.write_inline::<T, H>(value) };
            CellLayout::Inline
        } else {
            // SAFETY: A pointer fits, as asserted above.
            unsafe { self.write_boxed::<T, H>(value) };
            CellLayout::Boxed
        }
    }

    /// Stores `value` inline, dropping the previous contents.
    ///
    /// Fails to compile if `T` does not fit in the cell.
    #[inline]
    pub fn emplace_inline<T, H>(&mut self, value: T)
    where
        T: 'static,
        H: ValueHandler<T>,
    {
        const {
            assert!(
                Self::fits::<T>(),
                "the value type is too large or too strictly aligned for this cell"
            );
        }

        // SAFETY: `T` fits, as asserted above.
        unsafe { self.write_inline::<T, H>(value) };
    }

    /// Moves `value` to the heap and stores the pointer, dropping the
    /// previous contents.
    ///
    /// Fails to compile if the cell is smaller than a pointer.
    #[inline]
    pub fn emplace_boxed<T, H>(&mut self, value: T)
    where
        T: 'static,
        H: ValueHandler<T>,
    {
        const {
            assert!(
                Self::fits_pointer(),
                "the cell is too small to hold a pointer"
            );
        }

        // SAFETY: A pointer fits, as asserted above.
        unsafe { self.write_boxed::<T, H>(value) };
    }

    /// Replaces the contents with `value`, stored inline.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `Self::fits::<T>()` holds.
    #[inline]
    unsafe fn write_inline<T, H>(&mut self, value: T)
    where
        T: 'static,
        H: ValueHandler<T>,
    {
        self.destroy();

        // SAFETY:
        // 1. A `T` can be written at the start of the buffer (guaranteed by
        //    the caller).
        // 2. The buffer holds no live value after `destroy`.
        unsafe {
            self.storage.as_mut_ptr().cast::<T>().write(value);
        }
        self.vtable = Some(CellVtable::inline::<T, H>());
    }

    /// Replaces the contents with a pointer to `value`, moved to the heap.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `Self::fits_pointer()` holds.
    #[inline]
    unsafe fn write_boxed<T, H>(&mut self, value: T)
    where
        T: 'static,
        H: ValueHandler<T>,
    {
        let ptr: NonNull<T> = NonNull::from(Box::leak(Box::new(value)));
        self.destroy();

        // SAFETY: A pointer fits (guaranteed by the caller). The write is
        // unaligned, matching how `CellVtable` reads it back.
        unsafe {
            self.storage
                .as_mut_ptr()
                .cast::<NonNull<T>>()
                .write_unaligned(ptr);
        }
        self.vtable = Some(CellVtable::boxed::<T, H>());
    }

    /// Stores a pointer to a value borrowed for shared access, dropping the
    /// previous contents.
    ///
    /// Copies of the cell copy the pointer.
    #[inline]
    pub fn bind_shared<T: 'static>(&mut self, ptr: NonNull<T>) {
        self.bind(ptr, CellVtable::shared::<T>());
    }

    /// Stores a pointer to a value borrowed for exclusive access, dropping
    /// the previous contents.
    ///
    /// The cell refuses to be copied while it holds such a pointer.
    #[inline]
    pub fn bind_exclusive<T: 'static>(&mut self, ptr: NonNull<T>) {
        self.bind(ptr, CellVtable::exclusive::<T>());
    }

    /// Shared implementation of the binding methods.
    #[inline]
    fn bind<T>(&mut self, ptr: NonNull<T>, vtable: &'static CellVtable) {
        const {
            assert!(
                Self::fits_pointer(),
                "the cell is too small to hold a pointer"
            );
        }

        self.destroy();

        // SAFETY: The assertion above guarantees that a pointer fits.
        unsafe {
            self.storage
                .as_mut_ptr()
                .cast::<NonNull<T>>()
                .write_unaligned(ptr);
        }
        self.vtable = Some(vtable);
    }

    /// Drops the contents, leaving the cell empty.
    ///
    /// Does nothing on an empty cell. Borrowed values are not dropped.
    #[inline]
    pub fn destroy(&mut self) {
        if let Some(vtable) = self.vtable.take() {
            // SAFETY:
            // 1. The vtable describes the contents of the storage (guaranteed
            //    by the invariants of this type).
            // 2. The vtable has been reset to `None` above, so the contents
            //    are not observed again, even if the drop panics.
            unsafe { vtable.drop(self.storage.as_mut_ptr()) }
        }
    }

    /// Copies the cell using the handler chosen when the value was stored.
    ///
    /// Shared bindings copy the pointer. Returns `None` if the handler
    /// refuses, or if the cell holds an exclusive binding.
    pub fn try_clone(&self) -> Option<Self> {
        let mut copy = Self::new();
        if let Some(vtable) = self.vtable {
            // SAFETY:
            // 1. The vtable describes the contents of `self.storage`.
            // 2. `copy.storage` has the same size and alignment and is empty.
            let copied =
                unsafe { vtable.clone_into(self.storage.as_ptr(), copy.storage.as_mut_ptr()) };
            if !copied {
                return None;
            }
            copy.vtable = Some(vtable);
        }
        Some(copy)
    }

    /// Replaces the contents with a copy of `source`.
    ///
    /// Returns `false`, leaving this cell unchanged, if `source` cannot be
    /// copied.
    pub fn copy_from(&mut self, source: &Self) -> bool {
        match source.try_clone() {
            Some(copy) => {
                *self = copy;
                true
            }
            None => false,
        }
    }

    /// Replaces the contents with those of `source`, leaving `source` empty.
    #[inline]
    pub fn move_from(&mut self, source: &mut Self) {
        *self = source.take();
    }

    /// Moves the contents out, leaving this cell empty.
    #[inline]
    pub fn take(&mut self) -> Self {
        core::mem::replace(self, Self::new())
    }

    /// Creates a cell borrowing the contents of this one.
    ///
    /// Shared bindings are copied. Every other value, owned or exclusively
    /// borrowed, is bound exclusively, so writes through the returned cell
    /// reach the value held by `self`. An empty cell yields an empty cell.
    ///
    /// Fails to compile if the cell is smaller than a pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The returned cell is not used after `self` is moved, modified or
    ///    dropped.
    /// 2. The value is not accessed through `self` while the returned cell is
    ///    alive.
    pub unsafe fn reborrow(&mut self) -> Self {
        const {
            assert!(
                Self::fits_pointer(),
                "the cell is too small to hold a pointer"
            );
        }

        let mut copy = Self::new();
        let Some(vtable) = self.vtable else {
            return copy;
        };
        let borrow = match vtable.layout() {
            CellLayout::Shared => vtable,
            CellLayout::Inline | CellLayout::Boxed | CellLayout::Exclusive => {
                vtable.exclusive_borrow()
            }
        };

        // SAFETY: The cell is not empty.
        let ptr = unsafe { self.value_mut_ptr(vtable) };
        // SAFETY: The pointer is either the address of `self.storage` or a
        // pointer read from it, neither of which is null.
        let ptr = unsafe { NonNull::new_unchecked(ptr) };

        // SAFETY: A pointer fits, as asserted above. The write is unaligned,
        // matching how `CellVtable` reads it back.
        unsafe {
            copy.storage
                .as_mut_ptr()
                .cast::<NonNull<u8>>()
                .write_unaligned(ptr);
        }
        copy.vtable = Some(borrow);
        copy
    }

    /// Whether the cell holds nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vtable.is_none()
    }

    /// Returns the [`TypeId`] of the value, if any.
    #[inline]
    pub fn type_id(&self) -> Option<TypeId> {
        self.vtable.map(CellVtable::type_id)
    }

    /// Returns the [`core::any::type_name`] of the value, if any.
    #[inline]
    pub fn type_name(&self) -> Option<&'static str> {
        self.vtable.map(CellVtable::type_name)
    }

    /// Returns where the value lives, if any.
    #[inline]
    pub fn layout(&self) -> Option<CellLayout> {
        self.vtable.map(CellVtable::layout)
    }

    /// Whether the cell holds a value of type `T`.
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id() == Some(TypeId::of::<T>())
    }

    /// Returns a pointer to the value itself.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The cell is not empty.
    #[inline]
    unsafe fn value_ptr(&self, vtable: &CellVtable) -> *const u8 {
        if vtable.layout().is_indirect() {
            // SAFETY: Indirect layouts store an initialized pointer.
            unsafe {
                self.storage
                    .as_ptr()
                    .cast::<NonNull<u8>>()
                    .read_unaligned()
                    .as_ptr()
            }
        } else {
            self.storage.as_ptr()
        }
    }

    /// Returns a mutable pointer to the value itself.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The cell is not empty.
    #[inline]
    unsafe fn value_mut_ptr(&mut self, vtable: &CellVtable) -> *mut u8 {
        if vtable.layout().is_indirect() {
            // SAFETY: Indirect layouts store an initialized pointer.
            unsafe {
                self.storage
                    .as_ptr()
                    .cast::<NonNull<u8>>()
                    .read_unaligned()
                    .as_ptr()
            }
        } else {
            self.storage.as_mut_ptr()
        }
    }

    /// Returns a reference to the value as a `T`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The cell holds a value of type `T`.
    /// 2. If the value is borrowed, the pointee is still alive and not
    ///    mutably aliased for the lifetime of the returned reference.
    #[inline]
    pub unsafe fn downcast_unchecked<T: 'static>(&self) -> &T {
        debug_assert_eq!(self.type_id(), Some(TypeId::of::<T>()));

        let Some(vtable) = self.vtable else {
            // SAFETY: The cell is not empty (guaranteed by the caller).
            unsafe { core::hint::unreachable_unchecked() }
        };
        // SAFETY:
        // 1. The cell is not empty, and holds a `T` (guaranteed by the
        //    caller), so the pointer is valid and properly aligned.
        // 2. Borrowed pointees are alive (guaranteed by the caller).
        unsafe { &*self.value_ptr(vtable).cast::<T>() }
    }

    /// Returns a mutable reference to the value as a `T`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The cell holds a value of type `T`.
    /// 2. The layout is not [`CellLayout::Shared`].
    /// 3. If the value is borrowed, the pointee is still alive and not
    ///    otherwise accessed for the lifetime of the returned reference.
    #[inline]
    pub unsafe fn downcast_unchecked_mut<T: 'static>(&mut self) -> &mut T {
        debug_assert_eq!(self.type_id(), Some(TypeId::of::<T>()));
        debug_assert_ne!(self.layout(), Some(CellLayout::Shared));

        let Some(vtable) = self.vtable else {
            // SAFETY: The cell is not empty (guaranteed by the caller).
            unsafe { core::hint::unreachable_unchecked() }
        };
        // SAFETY:
        // 1. The cell holds a `T` (guaranteed by the caller).
        // 2. Owned values are exclusively borrowed through `&mut self`.
        //    Exclusive bindings are not aliased (guaranteed by the caller).
        unsafe { &mut *self.value_mut_ptr(vtable).cast::<T>() }
    }

    /// Moves the value out as a `T`, leaving the cell empty.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The cell holds a value of type `T`.
    /// 2. The layout is [`CellLayout::Inline`] or [`CellLayout::Boxed`].
    pub unsafe fn take_unchecked<T: 'static>(&mut self) -> T {
        debug_assert_eq!(self.type_id(), Some(TypeId::of::<T>()));

        let Some(vtable) = self.vtable.take() else {
            // SAFETY: The cell is not empty (guaranteed by the caller).
            unsafe { core::hint::unreachable_unchecked() }
        };
        match vtable.layout() {
            // SAFETY: The storage holds a live `T`. The vtable has been reset,
            // so it is not dropped again.
            CellLayout::Inline => unsafe { self.storage.as_ptr().cast::<T>().read() },
            CellLayout::Boxed => {
                // SAFETY: The storage holds a pointer from `Box::into_raw`,
                // owned by this cell and released exactly once here.
                let boxed = unsafe {
                    let ptr = self.storage.as_ptr().cast::<NonNull<T>>().read_unaligned();
                    Box::from_raw(ptr.as_ptr())
                };
                *boxed
            }
            // SAFETY: Borrowed layouts are excluded by the caller.
            CellLayout::Shared | CellLayout::Exclusive => unsafe {
                core::hint::unreachable_unchecked()
            },
        }
    }

    /// Formats the value using the handler chosen when it was stored.
    ///
    /// Empty cells are written as `<empty>` and borrowed values as `&` followed
    /// by the type name.
    pub fn debug(&self, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.vtable {
            None => formatter.write_str(EMPTY_TYPE_NAME),
            // SAFETY:
            // 1. The cell is not empty.
            // 2. Owned values are alive as long as the cell is. Borrowed
            //    values are formatted without reading the pointee.
            Some(vtable) => unsafe { vtable.debug(self.value_ptr(vtable), formatter) },
        }
    }
}

impl<const N: usize, A: Alignment> Default for RawCell<N, A> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, A: Alignment> Drop for RawCell<N, A> {
    #[inline]
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::String, vec, vec::Vec};
    use core::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::cell::storage::{Align1, Align2, Align8};

    struct Copyable;
    impl<T: Clone> ValueHandler<T> for Copyable {
        fn try_clone(value: &T) -> Option<T> {
            Some(value.clone())
        }
    }

    struct Refuse;
    impl<T> ValueHandler<T> for Refuse {
        fn try_clone(_value: &T) -> Option<T> {
            None
        }
    }

    static DROPS: AtomicUsize = AtomicUsize::new(0);

    struct CountDrops;
    impl Drop for CountDrops {
        fn drop(&mut self) {
            DROPS.fetch_add(1, Ordering::Relaxed);
        }
    }

    static_assertions::assert_not_impl_any!(RawCell<16, Align8>: Send, Sync);

    #[test]
    fn test_raw_cell_size() {
        assert_eq!(
            core::mem::size_of::<RawCell<16, Align8>>(),
            core::mem::size_of::<usize>() + 16
        );
        assert_eq!(core::mem::align_of::<RawCell<3, Align1>>(), core::mem::align_of::<usize>());
    }

    #[test]
    fn test_raw_cell_inline() {
        let mut cell = RawCell::<24, Align8>::new();
        assert!(cell.is_empty());
        assert_eq!(cell.type_id(), None);

        cell.emplace_inline::<u64, Copyable>(42);
        assert!(cell.is::<u64>());
        assert!(!cell.is::<u32>());
        assert_eq!(cell.layout(), Some(CellLayout::Inline));
        assert_eq!(cell.type_name(), Some("u64"));
        assert_eq!(unsafe { *cell.downcast_unchecked::<u64>() }, 42);

        unsafe { *cell.downcast_unchecked_mut::<u64>() += 1 };
        let copy = cell.try_clone().unwrap();
        assert_eq!(unsafe { *copy.downcast_unchecked::<u64>() }, 43);

        assert_eq!(unsafe { cell.take_unchecked::<u64>() }, 43);
        assert!(cell.is_empty());
    }

    #[test]
    fn test_raw_cell_emplace_chooses_layout() {
        let mut cell = RawCell::<8, Align8>::new();
        assert_eq!(cell.emplace::<u64, Copyable>(1), CellLayout::Inline);
        assert_eq!(cell.emplace::<[u64; 4], Copyable>([2; 4]), CellLayout::Boxed);
        assert_eq!(unsafe { cell.downcast_unchecked::<[u64; 4]>() }, &[2; 4]);

        let mut tiny = RawCell::<2, Align2>::new();
        assert_eq!(tiny.emplace::<u16, Copyable>(3), CellLayout::Inline);
    }

    #[test]
    fn test_raw_cell_boxed() {
        let mut cell = RawCell::<8, Align1>::new();
        cell.emplace_boxed::<Vec<u32>, Copyable>(vec![1, 2, 3]);
        assert_eq!(cell.layout(), Some(CellLayout::Boxed));

        let mut copy = cell.try_clone().unwrap();
        unsafe { copy.downcast_unchecked_mut::<Vec<u32>>().push(4) };
        assert_eq!(unsafe { cell.downcast_unchecked::<Vec<u32>>() }, &[1, 2, 3]);
        assert_eq!(
            unsafe { copy.take_unchecked::<Vec<u32>>() },
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn test_raw_cell_drop_counts() {
        {
            let mut cell = RawCell::<16, Align8>::new();
            cell.emplace_inline::<CountDrops, Refuse>(CountDrops);
            cell.emplace_boxed::<CountDrops, Refuse>(CountDrops);
            assert_eq!(DROPS.load(Ordering::Relaxed), 1);
            assert!(cell.try_clone().is_none());
            cell.destroy();
            assert_eq!(DROPS.load(Ordering::Relaxed), 2);
            cell.destroy();
            assert_eq!(DROPS.load(Ordering::Relaxed), 2);
            cell.emplace_inline::<CountDrops, Refuse>(CountDrops);
        }
        assert_eq!(DROPS.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_raw_cell_copy_and_move_from() {
        let mut source = RawCell::<16, Align8>::new();
        source.emplace_inline::<u32, Copyable>(9);

        let mut target = RawCell::<16, Align8>::new();
        assert!(target.copy_from(&source));
        assert_eq!(unsafe { *target.downcast_unchecked::<u32>() }, 9);

        source.emplace_inline::<u16, Refuse>(1);
        assert!(!target.copy_from(&source));
        assert!(target.is::<u32>());

        target.move_from(&mut source);
        assert!(source.is_empty());
        assert!(target.is::<u16>());
    }

    #[test]
    fn test_raw_cell_bindings() {
        let mut value = String::from("hello");
        let mut cell = RawCell::<16, Align8>::new();

        cell.bind_shared(NonNull::from(&value));
        assert_eq!(cell.layout(), Some(CellLayout::Shared));
        let copy = cell.try_clone().unwrap();
        assert_eq!(unsafe { copy.downcast_unchecked::<String>() }, "hello");
        drop(copy);

        cell.bind_exclusive(NonNull::from(&mut value));
        assert!(cell.try_clone().is_none());
        let mut reborrowed = unsafe { cell.reborrow() };
        assert_eq!(reborrowed.layout(), Some(CellLayout::Exclusive));
        unsafe { reborrowed.downcast_unchecked_mut::<String>().push('?') };
        drop(reborrowed);
        unsafe { cell.downcast_unchecked_mut::<String>().push('!') };
        cell.destroy();
        assert_eq!(value, "hello?!");
    }

    #[test]
    fn test_raw_cell_reborrow_owned() {
        let mut cell = RawCell::<16, Align8>::new();
        cell.emplace_inline::<u64, Copyable>(3);
        let mut reborrowed = unsafe { cell.reborrow() };
        assert_eq!(reborrowed.layout(), Some(CellLayout::Exclusive));
        assert!(reborrowed.is::<u64>());
        unsafe { *reborrowed.downcast_unchecked_mut::<u64>() = 9 };
        drop(reborrowed);
        assert_eq!(cell.layout(), Some(CellLayout::Inline));
        assert_eq!(unsafe { *cell.downcast_unchecked::<u64>() }, 9);

        cell.emplace_boxed::<String, Copyable>(String::from("boxed"));
        let mut reborrowed = unsafe { cell.reborrow() };
        unsafe { reborrowed.downcast_unchecked_mut::<String>().push('!') };
        drop(reborrowed);
        assert_eq!(unsafe { cell.downcast_unchecked::<String>() }, "boxed!");

        let value = 1_u8;
        cell.bind_shared(NonNull::from(&value));
        let reborrowed = unsafe { cell.reborrow() };
        assert_eq!(reborrowed.layout(), Some(CellLayout::Shared));
        assert_eq!(unsafe { *reborrowed.downcast_unchecked::<u8>() }, 1);

        cell.destroy();
        assert!(unsafe { cell.reborrow() }.is_empty());
    }

    #[test]
    fn test_raw_cell_debug() {
        struct Show<'a>(&'a RawCell<16, Align8>);
        impl core::fmt::Display for Show<'_> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                self.0.debug(f)
            }
        }

        let mut cell = RawCell::<16, Align8>::new();
        assert_eq!(alloc::format!("{}", Show(&cell)), "<empty>");
        cell.emplace_inline::<u8, Refuse>(1);
        assert_eq!(alloc::format!("{}", Show(&cell)), "u8");
        let value = 5u8;
        cell.bind_shared(NonNull::from(&value));
        assert_eq!(alloc::format!("{}", Show(&cell)), "&u8");
    }
}
