//! Handlers that define how a type-erased value is copied and formatted.
//!
//! A container in this crate never requires its value type to implement
//! [`Clone`] or [`Debug`]. Instead, the behaviour is picked once, when the value
//! is stored, by choosing a handler type. The handler's functions are then
//! baked into the vtable together with the value type.
//!
//! [`Debug`]: core::fmt::Debug

/// Trait for implementing copy and formatting behaviour for stored values.
///
/// Copying a container whose handler refuses to clone fails at the point of
/// the copy attempt, not when the value is stored. This allows non-copyable
/// types to live in the same containers as copyable ones.
///
/// # Examples
///
/// ```
/// use cuf_internals::{Align8, RawCell, handlers::ValueHandler};
///
/// struct Ticket(u32);
///
/// // Tickets may be copied, but only while they are still valid.
/// struct TicketHandler;
///
/// impl ValueHandler<Ticket> for TicketHandler {
///     fn try_clone(value: &Ticket) -> Option<Ticket> {
///         (value.0 != 0).then(|| Ticket(value.0))
///     }
/// }
///
/// let mut cell = RawCell::<16, Align8>::new();
/// cell.emplace_inline::<Ticket, TicketHandler>(Ticket(7));
/// assert!(cell.try_clone().is_some());
///
/// cell.emplace_inline::<Ticket, TicketHandler>(Ticket(0));
/// assert!(cell.try_clone().is_none());
/// ```
pub trait ValueHandler<T>: 'static {
    /// Produces an independent copy of the value, or `None` if the value
    /// cannot be copied.
    fn try_clone(value: &T) -> Option<T>;

    /// Formats the value for debug output.
    ///
    /// The default implementation only writes the name of the type.
    fn debug(value: &T, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let _ = value;
        formatter.write_str(core::any::type_name::<T>())
    }
}
