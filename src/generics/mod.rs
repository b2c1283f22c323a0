//! Allocation-free dispatch of a fixed set of operations over a fixed set of
//! type-erased slots.
//!
//! A [`Generics`] is built from a tuple of [visitors](Visitor) and a tuple of
//! slots. The slot types are captured once, on construction, in a `&'static`
//! dispatch table holding one entry per visitor. Afterwards the slot types
//! are only known to that table: [`Generics::visit`] picks the visitor by its
//! position and calls it with the slots recovered as their concrete types.
//!
//! A slot is bound like an [`AnyURef`]: `&T` shares the value, `&mut T`
//! borrows it exclusively, and [`ByValue<T>`] copies a small value into the
//! slot. The binding of a slot never changes.
//!
//! # Examples
//!
//! ```
//! use cuf::generics::{Generics, Visit, Visitor};
//!
//! struct Score;
//!
//! impl Visitor for Score {
//!     type Args = i64;
//!     type Output = i64;
//! }
//!
//! impl Visit<(i32, String)> for Score {
//!     fn visit(&self, (base, name): (&i32, &String), bonus: i64) -> i64 {
//!         bonus + i64::from(*base) + name.len() as i64
//!     }
//! }
//!
//! let base = 40_i32;
//! let name = String::from("ab");
//! let generics: Generics<'_, _, 2> = Generics::new((Score,), (&base, &name));
//! assert_eq!(generics.visit::<0>(1), 43);
//! ```
//!
//! Visitor indices are checked at compile time:
//!
//! ```compile_fail
//! # use cuf::generics::{Generics, Visit, Visitor};
//! # struct Score;
//! # impl Visitor for Score {
//! #     type Args = ();
//! #     type Output = i32;
//! # }
//! # impl Visit<(i32,)> for Score {
//! #     fn visit(&self, (base,): (&i32,), (): ()) -> i32 {
//! #         *base
//! #     }
//! # }
//! let generics: Generics<'_, _, 1> = Generics::new((Score,), (&1_i32,));
//! generics.visit::<1>(());
//! ```
//!
//! So are slot indices:
//!
//! ```compile_fail
//! # use cuf::generics::{Generics, Visit, Visitor};
//! # struct Sum;
//! # impl Visitor for Sum {
//! #     type Args = ();
//! #     type Output = i32;
//! # }
//! # impl Visit<(i32, i32)> for Sum {
//! #     fn visit(&self, (a, b): (&i32, &i32), (): ()) -> i32 {
//! #         a + b
//! #     }
//! # }
//! let generics: Generics<'_, _, 2> = Generics::new((Sum,), (&1_i32, &2_i32));
//! let _ = generics.slot::<2>();
//! ```
//!
//! ```compile_fail
//! # use cuf::generics::{ByValue, Generics, Visit, Visitor};
//! # struct Sum;
//! # impl Visitor for Sum {
//! #     type Args = ();
//! #     type Output = i32;
//! # }
//! # impl Visit<(i32, i32)> for Sum {
//! #     fn visit(&self, (a, b): (&i32, &i32), (): ()) -> i32 {
//! #         a + b
//! #     }
//! # }
//! let mut generics: Generics<'_, _, 2> = Generics::new((Sum,), (ByValue(1_i32), ByValue(2_i32)));
//! let _ = generics.get_mut::<2, i32>();
//! ```

mod slots;
mod visitor;

pub use self::{
    slots::{IntoSlot, IntoSlots, SlotTypes},
    visitor::{DispatchFor, Entry, Visit, Visitor, VisitorAt, VisitorSet},
};
pub use crate::refs::ByValue;
use crate::{
    error::{AnyError, EMPTY_TYPE_NAME, Result},
    refs::{AnyURef, Binding},
};

/// The arguments of the visitor at index `I` of `VS`.
pub type ArgsOf<VS, const I: usize> = <<VS as VisitorAt<I>>::Visitor as Visitor>::Args;

/// The result of the visitor at index `I` of `VS`.
pub type OutputOf<VS, const I: usize> = <<VS as VisitorAt<I>>::Visitor as Visitor>::Output;

/// A set of visitors bound to `N` type-erased slots.
///
/// See the [module documentation](self) for an overview.
pub struct Generics<'a, VS: VisitorSet, const N: usize> {
    /// The operations
    visitors: VS,
    /// The erased slots
    ///
    /// # Safety
    ///
    /// The slots are bound to the types `table` was built for, and are never
    /// rebound.
    slots: [AnyURef<'a>; N],
    /// The dispatch table built for the slot types
    table: &'static VS::Table,
}

impl<'a, VS: VisitorSet, const N: usize> Generics<'a, VS, N> {
    /// Binds `visitors` to `slots`.
    ///
    /// Every visitor must implement [`Visit`] for the slot types. Each slot
    /// is a `&T`, `&mut T` or [`ByValue<T>`].
    #[must_use]
    pub fn new<S>(visitors: VS, slots: S) -> Self
    where
        S: IntoSlots<'a, N>,
        VS: DispatchFor<S::Types>,
    {
        tracing::trace!(
            visitors = core::any::type_name::<VS>(),
            slots = core::any::type_name::<S::Types>(),
            "binding dispatch table"
        );
        Self {
            visitors,
            slots: slots.into_slots(),
            table: <VS as DispatchFor<S::Types>>::TABLE,
        }
    }

    /// Calls the visitor at index `I` with shared access to the slots.
    ///
    /// Fails to compile if `I` is not below the number of visitors.
    pub fn visit<const I: usize>(&self, args: ArgsOf<VS, I>) -> OutputOf<VS, I>
    where
        VS: VisitorAt<I>,
    {
        let entry = <VS as VisitorAt<I>>::entry(self.table);
        let visitor = <VS as VisitorAt<I>>::visitor(&self.visitors);
        // SAFETY: The table was built for the slot types, and the slots are
        // never rebound.
        unsafe { entry.visit(visitor, &self.slots, args) }
    }

    /// Calls the visitor at index `I` with exclusive access to the slots.
    ///
    /// Fails to compile if `I` is not below the number of visitors.
    ///
    /// # Errors
    ///
    /// [`AnyError::ReadOnly`] if any slot is bound to a `&T`.
    #[track_caller]
    pub fn visit_mut<const I: usize>(&mut self, args: ArgsOf<VS, I>) -> Result<OutputOf<VS, I>>
    where
        VS: VisitorAt<I>,
    {
        if let Some(slot) = self
            .slots
            .iter()
            .find(|slot| slot.binding() == Some(Binding::Shared))
        {
            return Err(AnyError::read_only(
                slot.type_name().unwrap_or(EMPTY_TYPE_NAME),
            ));
        }

        let entry = <VS as VisitorAt<I>>::entry(self.table);
        let visitor = <VS as VisitorAt<I>>::visitor(&self.visitors);
        // SAFETY:
        // 1. The table was built for the slot types, and the slots are never
        //    rebound.
        // 2. No slot is a shared binding, checked above.
        Ok(unsafe { entry.visit_mut(visitor, &mut self.slots, args) })
    }

    /// Returns the slot at index `I`.
    ///
    /// Fails to compile if `I` is not below `N`.
    #[inline]
    #[must_use]
    pub fn slot<const I: usize>(&self) -> &AnyURef<'a> {
        const {
            assert!(I < N, "slot index out of range");
        }
        &self.slots[I]
    }

    /// Returns a copy of the value in the slot at index `I`.
    ///
    /// Fails to compile if `I` is not below `N`.
    ///
    /// # Errors
    ///
    /// [`AnyError::TypeMismatch`] if the slot does not hold a `T`.
    #[track_caller]
    pub fn get<const I: usize, T: Clone + 'static>(&self) -> Result<T> {
        self.slot::<I>().get::<T>()
    }

    /// Returns a reference to the value in the slot at index `I`.
    ///
    /// Fails to compile if `I` is not below `N`.
    ///
    /// # Errors
    ///
    /// [`AnyError::TypeMismatch`] if the slot does not hold a `T`.
    #[track_caller]
    pub fn get_ref<const I: usize, T: 'static>(&self) -> Result<&T> {
        self.slot::<I>().get_ref::<T>()
    }

    /// Returns a mutable reference to the value in the slot at index `I`.
    ///
    /// Fails to compile if `I` is not below `N`.
    ///
    /// # Errors
    ///
    /// - [`AnyError::TypeMismatch`] if the slot does not hold a `T`.
    /// - [`AnyError::ReadOnly`] if the slot is bound to a `&T`.
    #[track_caller]
    pub fn get_mut<const I: usize, T: 'static>(&mut self) -> Result<&mut T> {
        const {
            assert!(I < N, "slot index out of range");
        }
        self.slots[I].get_mut::<T>()
    }

    /// Returns the visitors.
    #[inline]
    #[must_use]
    pub fn visitors(&self) -> &VS {
        &self.visitors
    }

    /// Copies the visitors and every slot. The copy shares the dispatch
    /// table.
    ///
    /// # Errors
    ///
    /// [`AnyError::NotCopyable`] if any slot is bound to a `&mut T`.
    #[track_caller]
    pub fn try_clone(&self) -> Result<Self>
    where
        VS: Clone,
    {
        let mut slots: [AnyURef<'a>; N] = core::array::from_fn(|_| AnyURef::empty());
        for (copy, slot) in slots.iter_mut().zip(&self.slots) {
            *copy = slot.try_copy()?;
        }
        Ok(Self {
            visitors: self.visitors.clone(),
            slots,
            table: self.table,
        })
    }

    /// Creates a shorter-lived copy that reborrows every slot, including
    /// exclusive ones. Slots holding a [`ByValue`] are borrowed exclusively,
    /// so writes through the result reach this instance. The original is
    /// unusable while the result is alive.
    #[must_use]
    pub fn reborrow(&mut self) -> Generics<'_, VS, N>
    where
        VS: Clone,
    {
        let mut slots = self.slots.iter_mut();
        Generics {
            visitors: self.visitors.clone(),
            slots: core::array::from_fn(|_| {
                slots.next().map(AnyURef::reborrow).unwrap_or_default()
            }),
            table: self.table,
        }
    }
}

impl<VS: VisitorSet, const N: usize> core::fmt::Debug for Generics<'_, VS, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Generics")
            .field("visitors", &core::any::type_name::<VS>())
            .field("slots", &self.slots)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, string::String};
    use core::fmt::Debug;

    use super::*;

    /// Adds the extra argument, the number and the length of the text.
    #[derive(Copy, Clone)]
    struct SumLen;

    impl Visitor for SumLen {
        type Args = i64;
        type Output = i64;
    }

    impl Visit<(i32, String)> for SumLen {
        fn visit(&self, (number, text): (&i32, &String), extra: i64) -> i64 {
            extra + i64::from(*number) + i64::try_from(text.len()).unwrap_or(i64::MAX)
        }
    }

    /// Formats every slot, for any slot types.
    #[derive(Copy, Clone)]
    struct Describe;

    impl Visitor for Describe {
        type Args = ();
        type Output = String;
    }

    impl<A: Debug + 'static, B: Debug + 'static> Visit<(A, B)> for Describe {
        fn visit(&self, (a, b): (&A, &B), (): ()) -> String {
            format!("{a:?} {b:?}")
        }
    }

    /// Increments the number and extends the text.
    #[derive(Copy, Clone)]
    struct Bump;

    impl Visitor for Bump {
        type Args = i32;
        type Output = ();
    }

    impl Visit<(i32, String)> for Bump {
        fn visit(&self, _slots: (&i32, &String), _by: i32) {}

        fn visit_mut(&self, (number, text): (&mut i32, &mut String), by: i32) {
            *number += by;
            text.push('!');
        }
    }

    #[test]
    fn test_dispatch_matches_direct_call() {
        let number = 40_i32;
        let text = String::from("abc");
        let expected = SumLen.visit((&number, &text), 2);

        let generics: Generics<'_, _, 2> = Generics::new((Describe, SumLen), (&number, &text));
        assert_eq!(generics.visit::<1>(2), expected);
        assert_eq!(generics.visit::<0>(()), "40 \"abc\"");

        let copy = generics.try_clone().unwrap();
        drop(generics);
        assert_eq!(copy.visit::<1>(2), expected);
        assert_eq!(copy.visit::<0>(()), "40 \"abc\"");
    }

    #[test]
    fn test_visit_mut() {
        let mut number = 1_i32;
        let mut text = String::from("hi");
        {
            let mut generics: Generics<'_, _, 2> =
                Generics::new((Bump, SumLen), (&mut number, &mut text));
            generics.visit_mut::<0>(4).unwrap();
            assert_eq!(generics.visit::<1>(0), 8);
            assert!(matches!(
                generics.try_clone().unwrap_err().current_context(),
                AnyError::NotCopyable { .. }
            ));

            let mut reborrowed = generics.reborrow();
            reborrowed.visit_mut::<0>(1).unwrap();
            drop(reborrowed);
            assert_eq!(*generics.get_ref::<0, i32>().unwrap(), 6);
        }
        assert_eq!((number, text.as_str()), (6, "hi!!"));
    }

    #[test]
    fn test_reborrow_by_value_slot() {
        let mut text = String::new();
        {
            let mut generics: Generics<'_, _, 2> =
                Generics::new((Bump, SumLen), (ByValue(1_i32), &mut text));
            generics.reborrow().visit_mut::<0>(5).unwrap();
            assert_eq!(generics.get::<0, i32>().unwrap(), 6);
            assert_eq!(generics.slot::<0>().binding(), Some(Binding::Copied));

            *generics.reborrow().get_mut::<0, i32>().unwrap() += 1;
            assert_eq!(generics.visit::<1>(0), 8);
        }
        assert_eq!(text, "!");
    }

    #[test]
    fn test_visit_mut_read_only() {
        let number = 1_i32;
        let mut text = String::new();
        let mut generics: Generics<'_, _, 2> = Generics::new((Bump,), (&number, &mut text));
        assert_eq!(
            *generics.visit_mut::<0>(1).unwrap_err().current_context(),
            AnyError::ReadOnly { type_name: "i32" }
        );
        generics.visit::<0>(1);
    }

    #[test]
    fn test_by_value_slots() {
        let text = String::from("x");
        let mut generics: Generics<'_, _, 2> =
            Generics::new((Bump, SumLen), (ByValue(10_i32), &text));
        assert_eq!(generics.slot::<0>().binding(), Some(Binding::Copied));
        assert_eq!(generics.get::<0, i32>().unwrap(), 10);

        *generics.get_mut::<0, i32>().unwrap() = 20;
        assert_eq!(generics.visit::<1>(0), 21);
        assert!(matches!(
            generics.get_mut::<1, String>().unwrap_err().current_context(),
            AnyError::ReadOnly { .. }
        ));
        assert!(matches!(
            generics.get::<1, u8>().unwrap_err().current_context(),
            AnyError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn test_debug() {
        let generics: Generics<'_, _, 2> =
            Generics::new((Describe,), (ByValue(1_i32), ByValue('c')));
        assert_eq!(generics.visit::<0>(()), "1 'c'");

        let debug = format!("{generics:?}");
        assert!(debug.starts_with("Generics { visitors: "));
        assert!(debug.ends_with("slots: [AnyURef(i32), AnyURef(char)] }"));
    }
}
