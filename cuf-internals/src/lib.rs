#![no_std]
#![forbid(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::missing_docs_in_private_items,
    clippy::undocumented_unsafe_blocks,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`cuf`].
//!
//! # Overview
//!
//! This crate contains the low-level, type-erased storage primitives and
//! unsafe operations that power the [`cuf`] containers. Every value stored by
//! `cuf` ends up in one of the two raw containers defined here, and every
//! operation on it is dispatched through a `&'static` vtable built once per
//! concrete type.
//!
//! **This crate is an implementation detail.** No semantic versioning guarantees
//! are provided. Users should depend on the [`cuf`] crate, not this one.
//!
//! # Architecture
//!
//! - **[`cell`]**: Fixed-capacity, exclusively owned storage
//!   - [`RawCell`]: An aligned byte buffer plus an optional [`CellVtable`]
//!   - [`CellLayout`]: Whether the value lives inline, on the heap, or is
//!     only borrowed
//!   - [`Alignment`]: Marker types fixing the buffer alignment
//!
//! - **[`shared`]**: Reference-counted storage
//!   - [`RawShared`]: Owned handle to a [`triomphe::Arc`] allocation
//!   - [`RawSharedRef`]: Borrowed view of the same allocation
//!   - [`SharedData`]: `#[repr(C)]` wrapper enabling field access on erased
//!     types
//!
//! - **[`handlers`]**: The [`ValueHandler`] trait deciding how a stored value
//!   is copied and formatted
//!
//! # Safety Strategy
//!
//! - **Module-based encapsulation**: the vtable pointer and the storage it
//!   describes are private to a single module each, so the invariant "the
//!   vtable matches the bytes" can be checked locally.
//! - **`#[repr(C)]` layout**: the vtable of a [`SharedData`] can be read
//!   without knowing the value type.
//! - **Compile-time capacity checks**: a value is only ever written into a
//!   buffer after a `const` assertion proved that it fits.
//!
//! [`cuf`]: https://docs.rs/cuf/latest/cuf/
//! [`cell`]: crate::cell
//! [`shared`]: crate::shared
//! [`CellVtable`]: cell::vtable::CellVtable
//! [`SharedData`]: shared::data::SharedData
//! [`ValueHandler`]: handlers::ValueHandler
//! [`triomphe::Arc`]: triomphe::Arc

extern crate alloc;

mod cell;
pub mod handlers;
mod shared;
mod util;

pub use cell::{
    Align1, Align2, Align4, Align8, Align16, Align32, Align64, Alignment, CellLayout, RawCell,
};
pub use shared::{CloneFailure, RawShared, RawSharedRef};
pub use util::EMPTY_TYPE_NAME;
