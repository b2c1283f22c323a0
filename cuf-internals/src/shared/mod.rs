//! Reference-counted storage for a single type-erased value.
//!
//! A [`RawShared`] owns one strong reference to a [`triomphe::Arc`] holding a
//! [`SharedData`]. Copying the handle shares the value. Copying the value
//! itself goes through the handler chosen when it was stored.
//!
//! [`SharedData`]: data::SharedData

pub(crate) mod data;
mod raw;
mod vtable;

pub use raw::{RawShared, RawSharedRef};

/// Reasons a shared value could not be copied.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum CloneFailure {
    /// The handler refused to copy the value.
    NotCopyable,
    /// The value is currently mutably borrowed.
    Borrowed,
}
