//! Errors reported by the containers in this crate.
//!
//! Every fallible operation returns a [`Report<AnyError>`], which records the
//! location of the failing call in addition to the [`AnyError`] itself. Use
//! [`Report::current_context`] to match on the kind of failure.
//!
//! Storing a type that does not fit a fixed-capacity container and naming a
//! visitor or slot index beyond the declared arity are not runtime errors:
//! both fail to compile.
//!
//! # Examples
//!
//! ```
//! use cuf::{AnyError, SmallAny};
//!
//! let value: SmallAny = SmallAny::new(42_i32);
//! let report = value.get::<f64>().unwrap_err();
//! assert_eq!(
//!     *report.current_context(),
//!     AnyError::TypeMismatch {
//!         expected: "f64",
//!         found: "i32"
//!     }
//! );
//! ```

pub(crate) use cuf_internals::EMPTY_TYPE_NAME;
use derive_more::{Display, Error};
use rootcause::Report;


/// The kinds of failure of a type-erased access.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Display, Error)]
pub enum AnyError {
    /// The container holds a different type than the one requested, or is
    /// empty.
    #[display("bad cast: expected `{expected}`, found `{found}`")]
    TypeMismatch {
        /// The requested type.
        expected: &'static str,
        /// The held type, or `<empty>`.
        found: &'static str,
    },
    /// The value cannot be copied, either because its handler refuses or
    /// because it is an exclusive borrow.
    #[display("not copyable: `{type_name}`")]
    NotCopyable {
        /// The held type.
        type_name: &'static str,
    },
    /// The shared value is currently mutably borrowed through another handle.
    #[display("already borrowed: `{type_name}`")]
    Borrowed {
        /// The held type.
        type_name: &'static str,
    },
    /// Ownership of a shared value was requested while other handles to it
    /// exist.
    #[display("still shared: `{type_name}` has {ref_count} handles")]
    StillShared {
        /// The held type.
        type_name: &'static str,
        /// The number of handles, including the one that failed.
        ref_count: usize,
    },
    /// Mutable access was requested through a shared borrow.
    #[display("read-only binding: `{type_name}`")]
    ReadOnly {
        /// The held type.
        type_name: &'static str,
    },
}

/// A [`Result`](core::result::Result) whose error is a [`Report<AnyError>`].
pub type Result<T> = core::result::Result<T, Report<AnyError>>;

impl AnyError {
    /// Reports a request for `T` against a container holding `found`.
    #[cold]
    #[must_use]
    #[track_caller]
    pub(crate) fn type_mismatch<T: ?Sized>(found: Option<&'static str>) -> Report<Self> {
        Self::TypeMismatch {
            expected: core::any::type_name::<T>(),
            found: found.unwrap_or(EMPTY_TYPE_NAME),
        }
        .into_report()
    }

    /// Reports a refused copy of a `type_name`.
    #[cold]
    #[must_use]
    #[track_caller]
    pub(crate) fn not_copyable(type_name: Option<&'static str>) -> Report<Self> {
        Self::NotCopyable {
            type_name: type_name.unwrap_or(EMPTY_TYPE_NAME),
        }
        .into_report()
    }

    /// Reports a borrow conflict on a shared `type_name`.
    #[cold]
    #[must_use]
    #[track_caller]
    pub(crate) fn borrowed(type_name: &'static str) -> Report<Self> {
        Self::Borrowed { type_name }.into_report()
    }

    /// Reports a request for ownership of a `type_name` with `ref_count`
    /// handles.
    #[cold]
    #[must_use]
    #[track_caller]
    pub(crate) fn still_shared(type_name: &'static str, ref_count: usize) -> Report<Self> {
        Self::StillShared {
            type_name,
            ref_count,
        }
        .into_report()
    }

    /// Reports mutable access through a shared borrow of a `type_name`.
    #[cold]
    #[must_use]
    #[track_caller]
    pub(crate) fn read_only(type_name: &'static str) -> Report<Self> {
        Self::ReadOnly { type_name }.into_report()
    }

    #[track_caller]
    fn into_report(self) -> Report<Self> {
        tracing::debug!(error = %self, "type-erased access failed");
        Report::new(self)
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, string::ToString};

    use super::*;
    use crate::{SharedAny, SmallAny};

    #[test]
    fn test_error_messages() {
        let report = AnyError::type_mismatch::<u8>(None);
        assert_eq!(
            *report.current_context(),
            AnyError::TypeMismatch {
                expected: "u8",
                found: "<empty>"
            }
        );
        assert_eq!(
            report.current_context().to_string(),
            "bad cast: expected `u8`, found `<empty>`"
        );

        assert_eq!(
            AnyError::not_copyable(Some("Foo")).current_context().to_string(),
            "not copyable: `Foo`"
        );
        assert_eq!(
            AnyError::borrowed("Foo").current_context().to_string(),
            "already borrowed: `Foo`"
        );
        assert_eq!(
            AnyError::still_shared("Foo", 2)
                .current_context()
                .to_string(),
            "still shared: `Foo` has 2 handles"
        );
        assert_eq!(
            AnyError::read_only("Foo").current_context().to_string(),
            "read-only binding: `Foo`"
        );
    }

    #[test]
    fn test_empty_type_name_matches_debug() {
        let empty: SmallAny = SmallAny::empty();
        let report = empty.get::<u8>().unwrap_err();
        let AnyError::TypeMismatch { found, .. } = *report.current_context() else {
            panic!("unexpected error kind");
        };
        assert_eq!(format!("{empty:?}"), format!("SmallAny({found})"));
        assert_eq!(format!("{:?}", SharedAny::empty()), format!("SharedAny({found})"));
    }

    static_assertions::assert_impl_all!(AnyError: Send, Sync, core::error::Error);
}
