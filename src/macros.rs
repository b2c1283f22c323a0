/// Creates a [`SmallAny`](crate::SmallAny) with the most capable handler
/// for the value.
///
/// The handler is chosen from the traits the value implements:
///
/// | Implements      | Handler                                  |
/// |-----------------|------------------------------------------|
/// | `Clone + Debug` | [`handlers::Debug`](crate::handlers::Debug) |
/// | `Clone`         | [`handlers::Clone`](crate::handlers::Clone) |
/// | `Debug`         | [`handlers::Inspect`](crate::handlers::Inspect) |
/// | neither         | [`handlers::Opaque`](crate::handlers::Opaque) |
///
/// The container has the default capacity, alignment and storage policy.
///
/// # Examples
///
/// ```
/// use cuf::any;
///
/// let numbers = any!(vec![1, 2, 3]);
/// assert_eq!(format!("{numbers:?}"), "SmallAny([1, 2, 3])");
/// assert!(numbers.try_clone().is_ok());
///
/// struct Handle(u32);
///
/// let handle = any!(Handle(7));
/// assert!(handle.try_clone().is_err());
/// assert_eq!(handle.get::<Handle>().unwrap().0, 7);
/// ```
#[macro_export]
macro_rules! any {
    ($value:expr $(,)?) => {{
        use $crate::__private::kind::*;
        let value = $value;
        let handler = (&&&&Wrap(&value)).handler();
        macro_helper_small_any(handler, value)
    }};
}

/// Creates a [`SharedAny`](crate::SharedAny) with the most capable handler
/// for the value.
///
/// The handler is chosen like in [`any!`].
///
/// # Examples
///
/// ```
/// use cuf::shared_any;
///
/// #[derive(Debug)]
/// struct Connection(u16);
///
/// let connection = shared_any!(Connection(443));
/// let alias = connection.clone();
/// assert_eq!(alias.ref_count(), 2);
/// assert_eq!(format!("{alias:?}"), "SharedAny(Connection(443))");
/// assert!(connection.deep_clone().is_err());
/// ```
#[macro_export]
macro_rules! shared_any {
    ($value:expr $(,)?) => {{
        use $crate::__private::kind::*;
        let value = $value;
        let handler = (&&&&Wrap(&value)).handler();
        macro_helper_shared_any(handler, value)
    }};
}

#[cfg(test)]
mod tests {
    use alloc::{format, string::String};

    use crate::AnyError;

    #[derive(Clone)]
    struct Secret(String);

    #[derive(Debug)]
    struct Id(u8);

    struct Plain;

    #[test]
    fn test_any_picks_debug_handler() {
        let value = any!(Some(1_u8));
        assert_eq!(format!("{value:?}"), "SmallAny(Some(1))");
        assert!(value.try_clone().is_ok());
    }

    #[test]
    fn test_any_picks_clone_handler() {
        let value = any!(Secret(String::from("hidden")));
        let copy = value.try_clone().unwrap();
        assert_eq!(copy.get::<Secret>().unwrap().0, "hidden");
        assert!(!format!("{value:?}").contains("hidden"));
    }

    #[test]
    fn test_any_picks_inspect_handler() {
        let value = any!(Id(3));
        assert_eq!(format!("{value:?}"), "SmallAny(Id(3))");
        assert!(matches!(
            value.try_clone().unwrap_err().current_context(),
            AnyError::NotCopyable { .. }
        ));
    }

    #[test]
    fn test_any_picks_opaque_handler() {
        let value = any!(Plain);
        assert!(value.holds::<Plain>());
        assert!(value.try_clone().is_err());
    }

    #[test]
    fn test_shared_any_macro() {
        let value = shared_any!(String::from("text"));
        assert_eq!(format!("{value:?}"), "SharedAny(\"text\")");
        let copy = value.deep_clone().unwrap();
        assert!(!copy.ptr_eq(&value));

        let opaque = shared_any!(Plain);
        assert!(opaque.deep_clone().is_err());
    }
}
