#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::as_ptr_cast_mut,
    clippy::ptr_as_ptr,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Type-erased value containers with small-buffer storage, shared ownership
//! and static capability dispatch.
//!
//! ## Overview
//!
//! This crate stores values whose type is only known at runtime, without
//! requiring the values to implement any trait beyond `'static`. Copying and
//! formatting go through a [handler](crate::handlers) chosen when the value
//! is stored, so a container holding a non-copyable value only fails at the
//! point where a copy is attempted.
//!
//! ## Quick Example
//!
//! ```
//! use cuf::{AnyError, any};
//!
//! let mut value = any!(String::from("hello"));
//! value.get_mut::<String>().unwrap().push('!');
//! assert_eq!(value.get::<String>().unwrap(), "hello!");
//!
//! let report = value.get::<u8>().unwrap_err();
//! assert!(matches!(
//!     report.current_context(),
//!     AnyError::TypeMismatch { .. }
//! ));
//! ```
//!
//! ## Containers
//!
//! - **[`SmallAny`]** exclusively owns its value. Values up to
//!   [`DEFAULT_CAPACITY`] bytes are stored inline, larger ones on the heap.
//!   [`StaticAny`] never allocates and rejects values that do not fit at
//!   compile time.
//! - **[`SharedAny`]** shares one heap-allocated value between all of its
//!   clones. Cloning is shallow; [`SharedAny::deep_clone`] creates an
//!   independent copy.
//! - **[`AnyURef`]** is a non-owning view of a borrowed value, or an inline
//!   copy of a small `Copy` value. [`AnyRef`], [`AnyCRef`] and [`AnyRRef`]
//!   restrict the accepted bindings.
//! - **[`Generics`]** binds a fixed tuple of slots to a fixed set of
//!   [visitors](crate::generics::Visitor), and calls any of them on the
//!   concretely typed slots by index, through a dispatch table built once per
//!   combination of types.
//!
//! For the raw storage and vtables, see the [`cuf-internals`] crate.
//!
//! [`cuf-internals`]: cuf_internals
//!
//! ## Errors
//!
//! Every runtime failure is a [`Report<AnyError>`](rootcause::Report), see
//! [`AnyError`] for the possible kinds. Failures that can be detected from the
//! types alone, such as a value that does not fit a [`StaticAny`] or a
//! visitor index past the end of the set, fail to compile instead.
//!
//! ## Thread Safety
//!
//! None of the containers are `Send` or `Sync`. All handles to one
//! [`SharedAny`] value stay on the thread that created it.
//!
//! ## Logging
//!
//! Failed accesses are logged at `DEBUG` level with [`tracing`]. Heap
//! allocations caused by values that do not fit inline, deep clones and the
//! creation of dispatchers are logged at `TRACE` level.

extern crate alloc;

mod error;
pub mod generics;
pub mod handlers;
mod macros;
pub mod markers;
pub mod prelude;
pub mod refs;
mod shared_any;
mod small_any;

pub use self::{
    error::{AnyError, Result},
    generics::Generics,
    refs::{AnyCRef, AnyRRef, AnyRef, AnyURef},
    shared_any::SharedAny,
    small_any::{DEFAULT_CAPACITY, SmallAny, StaticAny},
};

// Not public API. Referenced by macro-generated code.
#[doc(hidden)]
pub mod __private {
    #[doc(hidden)]
    pub mod kind {
        use crate::{SharedAny, SmallAny, handlers};

        #[doc(hidden)]
        pub struct Wrap<'a, T>(pub &'a T);

        #[doc(hidden)]
        pub trait HandlerDebugKind {
            #[inline(always)]
            fn handler(&self) -> handlers::Debug {
                handlers::Debug
            }
        }

        impl<T> HandlerDebugKind for &&&Wrap<'_, T> where handlers::Debug: handlers::ValueHandler<T> {}

        #[doc(hidden)]
        pub trait HandlerCloneKind {
            #[inline(always)]
            fn handler(&self) -> handlers::Clone {
                handlers::Clone
            }
        }

        impl<T> HandlerCloneKind for &&Wrap<'_, T> where handlers::Clone: handlers::ValueHandler<T> {}

        #[doc(hidden)]
        pub trait HandlerInspectKind {
            #[inline(always)]
            fn handler(&self) -> handlers::Inspect {
                handlers::Inspect
            }
        }

        impl<T> HandlerInspectKind for &Wrap<'_, T> where handlers::Inspect: handlers::ValueHandler<T> {}

        #[doc(hidden)]
        pub trait HandlerOpaqueKind {
            #[inline(always)]
            fn handler(&self) -> handlers::Opaque {
                handlers::Opaque
            }
        }

        impl<T> HandlerOpaqueKind for Wrap<'_, T> where handlers::Opaque: handlers::ValueHandler<T> {}

        #[doc(hidden)]
        #[must_use]
        pub fn macro_helper_small_any<H, T>(_handler: H, value: T) -> SmallAny
        where
            H: handlers::ValueHandler<T>,
            T: 'static,
        {
            SmallAny::new_custom::<H, T>(value)
        }

        #[doc(hidden)]
        #[must_use]
        pub fn macro_helper_shared_any<H, T>(_handler: H, value: T) -> SharedAny
        where
            H: handlers::ValueHandler<T>,
            T: 'static,
        {
            SharedAny::new_custom::<H, T>(value)
        }
    }
}
