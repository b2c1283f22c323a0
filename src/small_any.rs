//! Exclusively owned type-erased values with small-buffer storage.
//!
//! A [`SmallAny`] stores any `'static` value in an inline buffer of `N` bytes
//! when the value fits, and moves it to the heap otherwise. Whether a type
//! fits is a property of the type alone and is decided at compile time, so
//! there is no runtime branch on the size of the value.
//!
//! The storage policy `P` decides what happens to values that do not fit:
//! [`Spill`] moves them to the heap, [`InlineOnly`] rejects them at compile
//! time. [`StaticAny`] is the inline-only variant.
//!
//! # Examples
//!
//! ```
//! use cuf::{AnyError, SmallAny};
//!
//! let mut value: SmallAny = SmallAny::new(42_i32);
//! assert_eq!(value.get::<i32>().ok(), Some(&42));
//! assert!(value.get::<f64>().is_err());
//!
//! value.emplace(String::from("hello"));
//! assert_eq!(value.get::<String>().unwrap(), "hello");
//! assert!(matches!(
//!     value.get::<i32>().unwrap_err().current_context(),
//!     AnyError::TypeMismatch { .. }
//! ));
//! ```
//!
//! [`Spill`]: crate::markers::Spill
//! [`InlineOnly`]: crate::markers::InlineOnly

use core::{any::TypeId, marker::PhantomData};

use cuf_internals::{CellLayout, RawCell};

use crate::{
    error::{AnyError, Result},
    handlers::{self, ValueHandler},
    markers::{Align8, Alignment, InlineOnly, Spill, StoragePolicy},
};

/// Inline capacity of a [`SmallAny`] when none is given: three machine words.
pub const DEFAULT_CAPACITY: usize = 3 * core::mem::size_of::<usize>();

/// An exclusively owned, type-erased value.
///
/// - `N` is the size of the inline buffer in bytes.
/// - `A` is the alignment of the inline buffer, see [`markers`](crate::markers).
/// - `P` decides whether values that do not fit inline may be moved to the
///   heap.
///
/// The container is either empty or holds exactly one value. Copying goes
/// through the [handler](crate::handlers) chosen when the value was stored,
/// see [`SmallAny::try_clone`]. Moving out of a container with
/// [`core::mem::take`] leaves it empty.
///
/// Spilling requires room for a pointer in the inline buffer. A
/// `SmallAny<N, A, Spill>` with `N` smaller than a pointer only accepts values
/// that fit inline.
pub struct SmallAny<
    const N: usize = DEFAULT_CAPACITY,
    A: Alignment = Align8,
    P: StoragePolicy = Spill,
> {
    /// The storage of the value
    cell: RawCell<N, A>,
    /// The storage policy, only present at the type level
    _policy: PhantomData<P>,
}

/// A [`SmallAny`] that never allocates.
///
/// Storing a value that does not fit in `N` bytes with alignment `A` fails to
/// compile.
///
/// ```compile_fail
/// use cuf::StaticAny;
///
/// let value = StaticAny::<16>::new([0_u64; 4]);
/// ```
pub type StaticAny<const N: usize = DEFAULT_CAPACITY, A = Align8> = SmallAny<N, A, InlineOnly>;

impl<const N: usize, A: Alignment, P: StoragePolicy> SmallAny<N, A, P> {
    /// Creates an empty container.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            cell: RawCell::new(),
            _policy: PhantomData,
        }
    }

    /// Creates a container holding `value`, copyable with [`Clone`].
    #[must_use]
    pub fn new<T>(value: T) -> Self
    where
        T: Clone + 'static,
    {
        Self::new_custom::<handlers::Clone, T>(value)
    }

    /// Creates a container holding `value`, copied and formatted by `H`.
    #[must_use]
    pub fn new_custom<H, T>(value: T) -> Self
    where
        T: 'static,
        H: ValueHandler<T>,
    {
        let mut this = Self::empty();
        this.emplace_custom::<H, T>(value);
        this
    }

    /// Creates a container holding `value`, which refuses to be copied.
    #[must_use]
    pub fn new_opaque<T: 'static>(value: T) -> Self {
        Self::new_custom::<handlers::Opaque, T>(value)
    }

    /// Whether a `T` is stored inline rather than on the heap.
    #[inline]
    #[must_use]
    pub const fn fits<T>() -> bool {
        RawCell::<N, A>::fits::<T>()
    }

    /// Replaces the contents with `value`, copyable with [`Clone`], and
    /// returns a reference to it.
    ///
    /// The previous value is dropped first.
    pub fn emplace<T>(&mut self, value: T) -> &mut T
    where
        T: Clone + 'static,
    {
        self.emplace_custom::<handlers::Clone, T>(value)
    }

    /// Replaces the contents with `value`, copied and formatted by `H`, and
    /// returns a reference to it.
    ///
    /// The previous value is dropped first.
    pub fn emplace_custom<H, T>(&mut self, value: T) -> &mut T
    where
        T: 'static,
        H: ValueHandler<T>,
    {
        const {
            assert!(
                P::ALLOW_BIG_OBJECTS || RawCell::<N, A>::fits::<T>(),
                "the value does not fit inline and this container never allocates"
            );
        }

        if self.cell.emplace::<T, H>(value) == CellLayout::Boxed {
            tracing::trace!(
                type_name = core::any::type_name::<T>(),
                size = core::mem::size_of::<T>(),
                align = core::mem::align_of::<T>(),
                capacity = N,
                "value spilled to the heap"
            );
        }

        // SAFETY: The cell holds the `T` stored above.
        unsafe { self.cell.downcast_unchecked_mut::<T>() }
    }

    /// Replaces the contents with `value`, which refuses to be copied, and
    /// returns a reference to it.
    pub fn emplace_opaque<T: 'static>(&mut self, value: T) -> &mut T {
        self.emplace_custom::<handlers::Opaque, T>(value)
    }

    /// Drops the value, leaving the container empty.
    #[inline]
    pub fn reset(&mut self) {
        self.cell.destroy();
    }

    /// Whether the container holds no value.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cell.is_empty()
    }

    /// Whether the container holds a value of exactly the type `T`.
    #[inline]
    #[must_use]
    pub fn holds<T: 'static>(&self) -> bool {
        self.cell.is::<T>()
    }

    /// Returns the [`TypeId`] of the value, or `None` if empty.
    #[inline]
    #[must_use]
    pub fn type_id(&self) -> Option<TypeId> {
        self.cell.type_id()
    }

    /// Returns the [`core::any::type_name`] of the value, or `None` if empty.
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> Option<&'static str> {
        self.cell.type_name()
    }

    /// Whether the value is stored in the inline buffer. Returns `false` if
    /// the container is empty.
    #[inline]
    #[must_use]
    pub fn is_inline(&self) -> bool {
        self.cell.layout() == Some(CellLayout::Inline)
    }

    /// Returns a reference to the value.
    ///
    /// # Errors
    ///
    /// [`AnyError::TypeMismatch`] if the container does not hold a `T`.
    #[track_caller]
    pub fn get<T: 'static>(&self) -> Result<&T> {
        if !self.holds::<T>() {
            return Err(AnyError::type_mismatch::<T>(self.type_name()));
        }
        // SAFETY: The container holds a `T`, checked above.
        Ok(unsafe { self.cell.downcast_unchecked::<T>() })
    }

    /// Returns a mutable reference to the value.
    ///
    /// # Errors
    ///
    /// [`AnyError::TypeMismatch`] if the container does not hold a `T`.
    #[track_caller]
    pub fn get_mut<T: 'static>(&mut self) -> Result<&mut T> {
        if !self.holds::<T>() {
            return Err(AnyError::type_mismatch::<T>(self.type_name()));
        }
        // SAFETY: The container holds an owned `T`, checked above.
        Ok(unsafe { self.cell.downcast_unchecked_mut::<T>() })
    }

    /// Moves the value out, leaving the container empty.
    ///
    /// # Errors
    ///
    /// [`AnyError::TypeMismatch`] if the container does not hold a `T`. The
    /// container is left unchanged.
    #[track_caller]
    pub fn take<T: 'static>(&mut self) -> Result<T> {
        if !self.holds::<T>() {
            return Err(AnyError::type_mismatch::<T>(self.type_name()));
        }
        // SAFETY: The container holds an owned `T`, checked above. Values in
        // a `SmallAny` are never borrowed.
        Ok(unsafe { self.cell.take_unchecked::<T>() })
    }

    /// Returns a reference to the value without checking its type.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The container holds a value of type `T`.
    #[inline]
    #[must_use]
    pub unsafe fn get_unchecked<T: 'static>(&self) -> &T {
        // SAFETY: The container holds a `T` (guaranteed by the caller).
        unsafe { self.cell.downcast_unchecked::<T>() }
    }

    /// Returns a mutable reference to the value without checking its type.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The container holds a value of type `T`.
    #[inline]
    #[must_use]
    pub unsafe fn get_unchecked_mut<T: 'static>(&mut self) -> &mut T {
        // SAFETY: The container holds an owned `T` (guaranteed by the
        // caller).
        unsafe { self.cell.downcast_unchecked_mut::<T>() }
    }

    /// Creates an independent copy using the handler chosen when the value
    /// was stored. Copying an empty container succeeds.
    ///
    /// # Errors
    ///
    /// [`AnyError::NotCopyable`] if the handler refuses to copy the value.
    #[track_caller]
    pub fn try_clone(&self) -> Result<Self> {
        match self.cell.try_clone() {
            Some(cell) => Ok(Self {
                cell,
                _policy: PhantomData,
            }),
            None => Err(AnyError::not_copyable(self.type_name())),
        }
    }

    /// Replaces the contents with a copy of `source`.
    ///
    /// # Errors
    ///
    /// [`AnyError::NotCopyable`] if the handler of `source` refuses to copy
    /// its value. The container is left unchanged.
    #[track_caller]
    pub fn try_clone_from(&mut self, source: &Self) -> Result<()> {
        if self.cell.copy_from(&source.cell) {
            Ok(())
        } else {
            Err(AnyError::not_copyable(source.type_name()))
        }
    }
}

impl<const N: usize, A: Alignment, P: StoragePolicy> Default for SmallAny<N, A, P> {
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}

impl<const N: usize, A: Alignment, P: StoragePolicy> core::fmt::Debug for SmallAny<N, A, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SmallAny(")?;
        self.cell.debug(f)?;
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, rc::Rc, string::String, vec, vec::Vec};
    use core::cell::Cell;

    use super::*;
    use crate::markers::{Align1, Align16};

    /// Counts drops through a shared counter.
    #[derive(Clone)]
    struct Tracked(Rc<Cell<usize>>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    static_assertions::assert_not_impl_any!(SmallAny: Send, Sync, Clone);

    #[test]
    fn test_small_any_scenario() {
        let mut value: SmallAny = SmallAny::new(42_i32);
        assert_eq!(*value.get::<i32>().unwrap(), 42);
        assert_eq!(
            *value.get::<f64>().unwrap_err().current_context(),
            AnyError::TypeMismatch {
                expected: "f64",
                found: "i32"
            }
        );

        value.emplace(String::from("hello"));
        assert_eq!(value.get::<String>().unwrap(), "hello");
        assert!(value.get::<i32>().is_err());
        assert!(value.holds::<String>());
        assert!(!value.holds::<&str>());
    }

    #[test]
    fn test_small_any_empty() {
        let value: SmallAny = SmallAny::default();
        assert!(value.is_empty());
        assert!(!value.is_inline());
        assert_eq!(value.type_id(), None);
        assert_eq!(
            *value.get::<()>().unwrap_err().current_context(),
            AnyError::TypeMismatch {
                expected: "()",
                found: "<empty>"
            }
        );

        let copy = value.try_clone().unwrap();
        assert!(copy.is_empty());
    }

    #[test]
    fn test_small_any_empty_differs_from_unit() {
        let unit: SmallAny = SmallAny::new(());
        assert!(!unit.is_empty());
        assert!(unit.holds::<()>());
    }

    #[test]
    fn test_small_any_move_leaves_source_empty() {
        let mut source: SmallAny = SmallAny::new(vec![1_u8, 2, 3]);
        let target = core::mem::take(&mut source);
        assert!(source.is_empty());
        assert_eq!(target.get::<Vec<u8>>().unwrap(), &[1, 2, 3]);
    }

    #[test]
    fn test_small_any_spill() {
        type Small = SmallAny<8, Align8>;

        assert!(Small::fits::<u64>());
        assert!(!Small::fits::<[u64; 4]>());
        assert!(!SmallAny::<16, Align1>::fits::<u32>());

        let mut value = Small::new([7_u64; 4]);
        assert!(!value.is_inline());
        let mut copy = value.try_clone().unwrap();
        copy.get_mut::<[u64; 4]>().unwrap()[0] = 0;
        assert_eq!(value.get::<[u64; 4]>().unwrap()[0], 7);
        assert_eq!(copy.take::<[u64; 4]>().unwrap(), [0, 7, 7, 7]);
        assert!(copy.is_empty());

        value.emplace(1_u64);
        assert!(value.is_inline());
    }

    #[test]
    fn test_static_any() {
        let mut value = StaticAny::<16, Align16>::new(1_u128);
        assert!(value.is_inline());
        value.emplace([1_u32; 4]);
        assert_eq!(value.get::<[u32; 4]>().unwrap(), &[1; 4]);
    }

    #[test]
    fn test_small_any_not_copyable() {
        let mut target: SmallAny = SmallAny::new(5_u8);
        let source: SmallAny = SmallAny::new_opaque(String::from("secret"));

        assert_eq!(
            *source.try_clone().unwrap_err().current_context(),
            AnyError::NotCopyable {
                type_name: core::any::type_name::<String>()
            }
        );
        assert!(target.try_clone_from(&source).is_err());
        assert_eq!(*target.get::<u8>().unwrap(), 5);

        let copyable: SmallAny = SmallAny::new(String::from("open"));
        target.try_clone_from(&copyable).unwrap();
        assert_eq!(target.get::<String>().unwrap(), "open");
    }

    #[test]
    fn test_small_any_take_mismatch_keeps_value() {
        let mut value: SmallAny = SmallAny::new(3_i64);
        assert!(value.take::<i32>().is_err());
        assert_eq!(value.take::<i64>().unwrap(), 3);
        assert!(value.is_empty());
    }

    #[test]
    fn test_small_any_drops_exactly_once() {
        let drops = Rc::new(Cell::new(0));
        {
            let mut value: SmallAny = SmallAny::new(Tracked(Rc::clone(&drops)));
            let copy = value.try_clone().unwrap();
            value.emplace(1_u8);
            assert_eq!(drops.get(), 1);
            drop(copy);
            assert_eq!(drops.get(), 2);

            let mut big = SmallAny::<8>::new(vec![Tracked(Rc::clone(&drops)); 1]);
            assert!(!big.is_inline());
            big.reset();
            assert_eq!(drops.get(), 3);
            big.emplace_opaque(Tracked(Rc::clone(&drops)));
        }
        assert_eq!(drops.get(), 4);
    }

    #[test]
    fn test_small_any_debug() {
        let value: SmallAny = SmallAny::new_custom::<handlers::Debug, _>(Some(3));
        assert_eq!(format!("{value:?}"), "SmallAny(Some(3))");

        let value: SmallAny = SmallAny::new(1_u8);
        assert_eq!(format!("{value:?}"), "SmallAny(u8)");

        let value: SmallAny = SmallAny::empty();
        assert_eq!(format!("{value:?}"), "SmallAny(<empty>)");
    }

    #[test]
    fn test_small_any_unchecked() {
        let mut value: SmallAny = SmallAny::new(10_u16);
        // SAFETY: The container holds a `u16`.
        unsafe { *value.get_unchecked_mut::<u16>() += 1 };
        // SAFETY: The container holds a `u16`.
        assert_eq!(unsafe { *value.get_unchecked::<u16>() }, 11);
    }
}
