//! Handlers that decide how a stored value is copied and formatted.
//!
//! None of the containers in this crate require their values to implement
//! [`Clone`](core::clone::Clone) or [`Debug`](core::fmt::Debug). Instead, a
//! handler is chosen when a value is stored, and its behaviour is recorded
//! together with the erased type. Copying a container whose handler refuses
//! fails with [`AnyError::NotCopyable`](crate::AnyError::NotCopyable) at the
//! point of the copy, never at the point of storage.
//!
//! # Built-in Handlers
//!
//! | Handler        | Requires        | Copies | Formats with    |
//! |----------------|-----------------|--------|-----------------|
//! | [`struct@Debug`] | `Clone + Debug` | yes    | `Debug`         |
//! | [`struct@Clone`] | `Clone`         | yes    | type name       |
//! | [`Inspect`]    | `Debug`         | no     | `Debug`         |
//! | [`Opaque`]     | nothing         | no     | type name       |
//!
//! # When Handlers Are Selected
//!
//! The [`any!`](crate::any!) and [`shared_any!`](crate::shared_any!) macros
//! pick the most capable handler from the table above based on the traits the
//! value implements. The `new` constructors use [`struct@Clone`], the
//! `new_opaque` constructors use [`Opaque`], and the `new_custom`
//! constructors accept any handler, including your own.
//!
//! # Examples
//!
//! ```
//! use cuf::{AnyError, SmallAny, handlers};
//!
//! struct Socket(u16);
//!
//! let socket: SmallAny = SmallAny::new_custom::<handlers::Opaque, _>(Socket(80));
//! let report = socket.try_clone().unwrap_err();
//! assert!(matches!(
//!     report.current_context(),
//!     AnyError::NotCopyable { .. }
//! ));
//! ```

pub use cuf_internals::handlers::ValueHandler;

/// Handler for types implementing [`Clone`](core::clone::Clone) and
/// [`Debug`](core::fmt::Debug).
///
/// Copies with `Clone` and formats with `Debug`. This is the handler the
/// [`any!`](crate::any!) macro picks whenever both traits are available.
///
/// # Example
///
/// ```
/// use cuf::{SmallAny, handlers};
///
/// let value: SmallAny = SmallAny::new_custom::<handlers::Debug, _>(vec![1, 2]);
/// assert_eq!(format!("{value:?}"), "SmallAny([1, 2])");
/// ```
#[derive(Copy, Clone)]
pub struct Debug;

impl<T> ValueHandler<T> for Debug
where
    T: core::clone::Clone + core::fmt::Debug,
{
    fn try_clone(value: &T) -> Option<T> {
        Some(value.clone())
    }

    fn debug(value: &T, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(value, formatter)
    }
}

/// Handler for types implementing [`Clone`](core::clone::Clone).
///
/// Copies with `Clone`. Formatting only shows the type name.
#[derive(Copy, Clone)]
pub struct Clone;

impl<T> ValueHandler<T> for Clone
where
    T: core::clone::Clone,
{
    fn try_clone(value: &T) -> Option<T> {
        Some(value.clone())
    }
}

/// Handler for types implementing [`Debug`](core::fmt::Debug) but not
/// [`Clone`](core::clone::Clone).
///
/// Formats with `Debug` and refuses every copy.
#[derive(Copy, Clone)]
pub struct Inspect;

impl<T> ValueHandler<T> for Inspect
where
    T: core::fmt::Debug,
{
    fn try_clone(_value: &T) -> Option<T> {
        None
    }

    fn debug(value: &T, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(value, formatter)
    }
}

/// Handler for any type, regardless of implemented traits.
///
/// Refuses every copy and formats as the type name. Use it explicitly to keep
/// a value from being duplicated even if it implements `Clone`.
///
/// # Example
///
/// ```
/// use cuf::{SharedAny, handlers};
///
/// let token = SharedAny::new_custom::<handlers::Opaque, _>(String::from("secret"));
/// assert!(token.deep_clone().is_err());
/// assert!(!format!("{token:?}").contains("secret"));
/// ```
#[derive(Copy, Clone)]
pub struct Opaque;

impl<T> ValueHandler<T> for Opaque {
    fn try_clone(_value: &T) -> Option<T> {
        None
    }
}
