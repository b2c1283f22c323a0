//! Fixed-capacity, exclusively owned storage for a single type-erased value.
//!
//! A [`RawCell`] is an aligned byte buffer together with an optional pointer
//! to a [`CellVtable`]. The vtable records the type of the stored value, where
//! it lives (see [`CellLayout`]) and how to drop, copy and format it.
//!
//! [`CellVtable`]: vtable::CellVtable

mod raw;
mod storage;
pub(crate) mod vtable;

pub use self::{
    raw::RawCell,
    storage::{Align1, Align2, Align4, Align8, Align16, Align32, Align64, Alignment},
    vtable::CellLayout,
};
