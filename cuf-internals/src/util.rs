//! Internal utility types.

/// Stand-in for the value type of an erased [`SharedData`].
///
/// [`SharedData`]: crate::shared::data::SharedData
pub(crate) struct Erased;

/// Type name reported for an empty container.
pub const EMPTY_TYPE_NAME: &str = "<empty>";
