//! Aligned, uninitialized byte storage of a fixed capacity.
//!
//! The alignment of a [`Storage`] cannot be written as a const generic, since
//! `#[repr(align(..))]` only accepts literals. It is instead carried by a
//! zero-sized marker type implementing [`Alignment`], embedded as a zero-length
//! array in front of the bytes.

use core::mem::MaybeUninit;

/// Seals [`Alignment`] so that only the markers below implement it.
mod sealed_alignment {
    /// Supertrait of [`Alignment`](super::Alignment).
    pub trait Sealed {}
}

/// Marker trait for the zero-sized types fixing the alignment of a
/// [`RawCell`] buffer.
///
/// This trait is sealed; the provided markers cover every power of two from 1
/// to 64.
///
/// [`RawCell`]: crate::RawCell
pub trait Alignment: sealed_alignment::Sealed + Copy + 'static {}

/// Declares one alignment marker.
macro_rules! alignment_marker {
    ($name:ident, $align:literal) => {
        #[doc = concat!("Aligns a buffer to ", stringify!($align), " byte(s).")]
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
        #[repr(align($align))]
        pub struct $name;

        impl sealed_alignment::Sealed for $name {}
        impl Alignment for $name {}
    };
}

alignment_marker!(Align1, 1);
alignment_marker!(Align2, 2);
alignment_marker!(Align4, 4);
alignment_marker!(Align8, 8);
alignment_marker!(Align16, 16);
alignment_marker!(Align32, 32);
alignment_marker!(Align64, 64);

/// `N` bytes of uninitialized memory, aligned like `A`.
#[repr(C)]
pub(super) struct Storage<const N: usize, A: Alignment> {
    /// Zero-sized field giving the struct the alignment of `A`
    _align: [A; 0],
    /// The actual bytes
    bytes: [MaybeUninit<u8>; N],
}

impl<const N: usize, A: Alignment> Storage<N, A> {
    /// Creates uninitialized storage.
    #[inline]
    pub(super) const fn uninit() -> Self {
        Self {
            _align: [],
            bytes: [MaybeUninit::uninit(); N],
        }
    }

    /// Whether a `T` can be written at the start of this storage.
    #[inline]
    pub(super) const fn fits<T>() -> bool {
        core::mem::size_of::<T>() <= N && core::mem::align_of::<T>() <= core::mem::align_of::<A>()
    }

    /// Pointer to the first byte.
    #[inline]
    pub(super) fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr().cast::<u8>()
    }

    /// Mutable pointer to the first byte.
    #[inline]
    pub(super) fn as_mut_ptr(&mut self) -> *mut u8 {
        self.bytes.as_mut_ptr().cast::<u8>()
    }
}
