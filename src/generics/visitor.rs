//! Visitors and the dispatch tables built for them.
//!
//! A dispatch table holds one [`Entry`] per visitor of a set. Each entry is a
//! pair of function pointers instantiated for the slot types the
//! [`Generics`](super::Generics) was built with, so calling a visitor costs a
//! single indirect call and no type checks.

use crate::{generics::slots::SlotTypes, refs::AnyURef};

/// An operation that can be invoked on the slots of a
/// [`Generics`](super::Generics).
///
/// The slot types the operation supports are given by implementations of
/// [`Visit`].
pub trait Visitor: 'static {
    /// The extra arguments of a call, use a tuple for several.
    type Args;
    /// The result of a call.
    type Output;
}

/// Implementation of a [`Visitor`] for the slot types `S`.
///
/// A generic implementation covers every slot tuple satisfying its bounds.
///
/// # Examples
///
/// ```
/// use core::fmt::Display;
///
/// use cuf::generics::{Visit, Visitor};
///
/// struct Join;
///
/// impl Visitor for Join {
///     type Args = &'static str;
///     type Output = String;
/// }
///
/// impl<A: Display + 'static, B: Display + 'static> Visit<(A, B)> for Join {
///     fn visit(&self, (a, b): (&A, &B), separator: &'static str) -> String {
///         format!("{a}{separator}{b}")
///     }
/// }
/// ```
pub trait Visit<S: SlotTypes>: Visitor {
    /// Invokes the operation with shared access to the slots.
    fn visit(&self, slots: S::Refs<'_>, args: Self::Args) -> Self::Output;

    /// Invokes the operation with exclusive access to the slots.
    ///
    /// Delegates to [`Visit::visit`] unless overridden.
    fn visit_mut(&self, slots: S::Muts<'_>, args: Self::Args) -> Self::Output {
        self.visit(S::downgrade(slots), args)
    }
}

/// The dispatch table entry of one visitor.
///
/// Both function pointers are instantiated for one specific slot tuple.
pub struct Entry<V: Visitor> {
    /// Calls [`Visit::visit`] on recovered slots
    visit: unsafe fn(&V, &[AnyURef<'_>], V::Args) -> V::Output,
    /// Calls [`Visit::visit_mut`] on recovered slots
    visit_mut: unsafe fn(&V, &mut [AnyURef<'_>], V::Args) -> V::Output,
}

impl<V: Visitor> Entry<V> {
    /// Creates the entry of `V` for the slot types `S`.
    #[must_use]
    pub const fn of<S>() -> Self
    where
        S: SlotTypes,
        V: Visit<S>,
    {
        Self {
            visit: visit_erased::<V, S>,
            visit_mut: visit_mut_erased::<V, S>,
        }
    }

    /// Calls the visitor with shared access to `slots`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `slots` are bound to exactly the types this entry was created for.
    #[inline]
    pub(crate) unsafe fn visit(
        &self,
        visitor: &V,
        slots: &[AnyURef<'_>],
        args: V::Args,
    ) -> V::Output {
        // SAFETY: The slot types match (guaranteed by the caller).
        unsafe { (self.visit)(visitor, slots, args) }
    }

    /// Calls the visitor with exclusive access to `slots`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `slots` are bound to exactly the types this entry was created for.
    /// 2. No slot is a shared binding.
    #[inline]
    pub(crate) unsafe fn visit_mut(
        &self,
        visitor: &V,
        slots: &mut [AnyURef<'_>],
        args: V::Args,
    ) -> V::Output {
        // SAFETY: The slot types match and none is shared (guaranteed by the
        // caller).
        unsafe { (self.visit_mut)(visitor, slots, args) }
    }
}

/// # Safety
///
/// The caller must ensure:
///
/// 1. `slots` are bound to exactly the types in `S`.
unsafe fn visit_erased<V, S>(visitor: &V, slots: &[AnyURef<'_>], args: V::Args) -> V::Output
where
    S: SlotTypes,
    V: Visit<S>,
{
    // SAFETY: The slot types match (guaranteed by the caller).
    let slots = unsafe { S::refs(slots) };
    visitor.visit(slots, args)
}

/// # Safety
///
/// The caller must ensure:
///
/// 1. `slots` are bound to exactly the types in `S`.
/// 2. No slot is a shared binding.
unsafe fn visit_mut_erased<V, S>(
    visitor: &V,
    slots: &mut [AnyURef<'_>],
    args: V::Args,
) -> V::Output
where
    S: SlotTypes,
    V: Visit<S>,
{
    // SAFETY: The slot types match and none is shared (guaranteed by the
    // caller).
    let slots = unsafe { S::muts(slots) };
    visitor.visit_mut(slots, args)
}

/// A tuple of 1 to 6 [`Visitor`]s.
pub trait VisitorSet: Sized + 'static {
    /// The dispatch table: one [`Entry`] per visitor.
    type Table: 'static;
}

/// A [`VisitorSet`] whose visitors all support the slot types `S`.
pub trait DispatchFor<S: SlotTypes>: VisitorSet {
    /// The dispatch table for `S`, shared by every
    /// [`Generics`](super::Generics) built for it.
    const TABLE: &'static Self::Table;
}

/// Compile-time indexing into a [`VisitorSet`].
///
/// Implemented for every index below the arity of the set, so naming an
/// index past the end fails to compile.
pub trait VisitorAt<const I: usize>: VisitorSet {
    /// The visitor at index `I`.
    type Visitor: Visitor;

    /// Returns the visitor at index `I`.
    fn visitor(&self) -> &Self::Visitor;

    /// Returns the table entry at index `I`.
    #[doc(hidden)]
    fn entry(table: &Self::Table) -> &Entry<Self::Visitor>;
}

macro_rules! impl_visitor_set {
    (@set [$($V:ident),+]) => {
        impl<$($V: Visitor),+> VisitorSet for ($($V,)+) {
            type Table = ($(Entry<$V>,)+);
        }

        impl<S: SlotTypes, $($V: Visit<S>),+> DispatchFor<S> for ($($V,)+) {
            const TABLE: &'static Self::Table = &($(Entry::<$V>::of::<S>(),)+);
        }
    };
    (@at [$($V:ident),+] $idx:tt $At:ident) => {
        impl<$($V: Visitor),+> VisitorAt<$idx> for ($($V,)+) {
            type Visitor = $At;

            #[inline]
            fn visitor(&self) -> &$At {
                &self.$idx
            }

            #[inline]
            fn entry(table: &Self::Table) -> &Entry<$At> {
                &table.$idx
            }
        }
    };
    ($all:tt; $($idx:tt $At:ident),+) => {
        impl_visitor_set!(@set $all);
        $(
            impl_visitor_set!(@at $all $idx $At);
        )+
    };
}

impl_visitor_set!([V0]; 0 V0);
impl_visitor_set!([V0, V1]; 0 V0, 1 V1);
impl_visitor_set!([V0, V1, V2]; 0 V0, 1 V1, 2 V2);
impl_visitor_set!([V0, V1, V2, V3]; 0 V0, 1 V1, 2 V2, 3 V3);
impl_visitor_set!([V0, V1, V2, V3, V4]; 0 V0, 1 V1, 2 V2, 3 V3, 4 V4);
impl_visitor_set!([V0, V1, V2, V3, V4, V5]; 0 V0, 1 V1, 2 V2, 3 V3, 4 V4, 5 V5);
