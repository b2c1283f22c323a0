//! Marker types configuring the layout of [`SmallAny`](crate::SmallAny) and
//! the accepted bindings of [`AnyURef`](crate::refs::AnyURef).
//!
//! All configuration is static: it is part of the container type, and every
//! decision that depends on it is made at compile time.
//!
//! # Alignment Markers
//!
//! [`Align1`] through [`Align64`] fix the alignment of the inline buffer. A
//! value is only stored inline if its own alignment does not exceed the
//! buffer's.
//!
//! # Storage Policies
//!
//! - [`Spill`]: values that do not fit inline are moved to the heap. This
//!   needs room for a pointer, so a buffer smaller than a pointer still
//!   rejects values that do not fit at compile time.
//! - [`InlineOnly`]: storing a value that does not fit inline is a compile
//!   error.
//!
//! ```compile_fail
//! use cuf::StaticAny;
//!
//! // 64 bytes never fit in 8.
//! let value = StaticAny::<8>::new([0_u8; 64]);
//! ```
//!
//! ```compile_fail
//! use cuf::{SmallAny, markers::Align2};
//!
//! // Neither the value nor a pointer to it fit in 2 bytes.
//! let value = SmallAny::<2, Align2>::new([0_u64; 4]);
//! ```
//!
//! The same buffer still holds values that fit:
//!
//! ```
//! use cuf::{SmallAny, markers::Align2};
//!
//! let value = SmallAny::<2, Align2>::new(7_u16);
//! assert!(value.is_inline());
//! ```

pub use cuf_internals::{Align1, Align2, Align4, Align8, Align16, Align32, Align64, Alignment};

/// Seals [`StoragePolicy`].
mod sealed_policy {
    pub trait Sealed {}
}

/// Decides what happens to values that do not fit in the inline buffer.
///
/// This trait is sealed and implemented by [`Spill`] and [`InlineOnly`].
pub trait StoragePolicy: sealed_policy::Sealed + Copy + 'static {
    /// Whether oversized values may be moved to the heap.
    const ALLOW_BIG_OBJECTS: bool;
}

/// Move values that do not fit inline to the heap.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct Spill;

impl sealed_policy::Sealed for Spill {}
impl StoragePolicy for Spill {
    const ALLOW_BIG_OBJECTS: bool = true;
}

/// Reject values that do not fit inline at compile time.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct InlineOnly;

impl sealed_policy::Sealed for InlineOnly {}
impl StoragePolicy for InlineOnly {
    const ALLOW_BIG_OBJECTS: bool = false;
}

/// Seals [`RefKind`].
mod sealed_kind {
    pub trait Sealed {}
}

/// Restricts what an [`AnyURef`](crate::refs::AnyURef) may be bound to.
///
/// This trait is sealed. The kinds mirror the runtime
/// [`Binding`](crate::refs::Binding) of a reference:
///
/// - [`Universal`]: any binding ([`AnyURef`](crate::refs::AnyURef)).
/// - [`Exclusive`]: `&mut T` only ([`AnyRef`](crate::refs::AnyRef)).
/// - [`Shared`]: `&T` only ([`AnyCRef`](crate::refs::AnyCRef)).
/// - [`Copied`]: small `Copy` values only ([`AnyRRef`](crate::refs::AnyRRef)).
pub trait RefKind: sealed_kind::Sealed + Copy + 'static {
    /// The kind of a reference created by
    /// [`AnyURef::reborrow`](crate::refs::AnyURef::reborrow).
    ///
    /// Reborrowing a copied value borrows the copy exclusively.
    type Reborrowed: RefKind;
}

/// Marker for references accepting any binding.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct Universal;

/// Marker for references bound to `&mut T`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct Exclusive;

/// Marker for references bound to `&T`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct Shared;

/// Marker for references holding a copy of a small value.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct Copied;

impl sealed_kind::Sealed for Universal {}
impl sealed_kind::Sealed for Exclusive {}
impl sealed_kind::Sealed for Shared {}
impl sealed_kind::Sealed for Copied {}
impl RefKind for Universal {
    type Reborrowed = Universal;
}
impl RefKind for Exclusive {
    type Reborrowed = Exclusive;
}
impl RefKind for Shared {
    type Reborrowed = Shared;
}
impl RefKind for Copied {
    type Reborrowed = Exclusive;
}
