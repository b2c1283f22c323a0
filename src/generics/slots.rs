//! Slot tuples of a [`Generics`](super::Generics).
//!
//! On construction every slot is erased into an [`AnyURef`]. The slot types
//! are remembered only by the dispatch table, which recovers them with
//! [`SlotTypes`].

use crate::refs::{AnyURef, ByValue};

/// A value that can be bound to a slot.
///
/// Implemented for `&T` (shared binding), `&mut T` (exclusive binding) and
/// [`ByValue<T>`] (copied binding).
pub trait IntoSlot<'a> {
    /// The type visitors see in this slot.
    type Target: 'static;

    /// Erases the binding.
    fn into_slot(self) -> AnyURef<'a>;
}

impl<'a, T: 'static> IntoSlot<'a> for &'a T {
    type Target = T;

    fn into_slot(self) -> AnyURef<'a> {
        AnyURef::from_ref(self)
    }
}

impl<'a, T: 'static> IntoSlot<'a> for &'a mut T {
    type Target = T;

    fn into_slot(self) -> AnyURef<'a> {
        AnyURef::from_mut(self)
    }
}

impl<'a, T: Copy + 'static> IntoSlot<'a> for ByValue<T> {
    type Target = T;

    fn into_slot(self) -> AnyURef<'a> {
        AnyURef::from_copy(self.0)
    }
}

/// A tuple of 1 to 6 [`IntoSlot`] values.
pub trait IntoSlots<'a, const N: usize> {
    /// The tuple of slot types, as seen by visitors.
    type Types: SlotTypes;

    /// Erases every binding.
    fn into_slots(self) -> [AnyURef<'a>; N];
}

/// A tuple of slot types, recovered from erased slots.
///
/// Implemented for tuples of 1 to 6 `'static` types.
pub trait SlotTypes: 'static {
    /// Shared references to every slot, e.g. `(&A, &B)`.
    type Refs<'s>;

    /// Exclusive references to every slot, e.g. `(&mut A, &mut B)`.
    type Muts<'s>;

    /// Recovers shared references to the slots.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `slots` has exactly one element per type of `Self`.
    /// 2. Each slot is bound to a value of the matching type.
    #[doc(hidden)]
    unsafe fn refs<'s>(slots: &'s [AnyURef<'_>]) -> Self::Refs<'s>;

    /// Recovers exclusive references to the slots.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `slots` has exactly one element per type of `Self`.
    /// 2. Each slot is bound to a value of the matching type.
    /// 3. No slot is a shared binding.
    #[doc(hidden)]
    unsafe fn muts<'s>(slots: &'s mut [AnyURef<'_>]) -> Self::Muts<'s>;

    /// Turns exclusive references into shared ones.
    fn downgrade<'s>(muts: Self::Muts<'s>) -> Self::Refs<'s>
    where
        Self: 's;
}

macro_rules! impl_slots {
    ($n:literal; $(($T:ident $X:ident $s:ident)),+) => {
        impl<'a, $($X: IntoSlot<'a>),+> IntoSlots<'a, $n> for ($($X,)+) {
            type Types = ($($X::Target,)+);

            fn into_slots(self) -> [AnyURef<'a>; $n] {
                let ($($s,)+) = self;
                [$($s.into_slot()),+]
            }
        }

        impl<$($T: 'static),+> SlotTypes for ($($T,)+) {
            type Refs<'s> = ($(&'s $T,)+);
            type Muts<'s> = ($(&'s mut $T,)+);

            unsafe fn refs<'s>(slots: &'s [AnyURef<'_>]) -> Self::Refs<'s> {
                let [$($s),+] = slots else {
                    // SAFETY: The arity matches (guaranteed by the caller).
                    unsafe { core::hint::unreachable_unchecked() }
                };
                (
                    $(
                        // SAFETY: The slot is bound to the matching type
                        // (guaranteed by the caller).
                        unsafe { $s.get_unchecked::<$T>() },
                    )+
                )
            }

            unsafe fn muts<'s>(slots: &'s mut [AnyURef<'_>]) -> Self::Muts<'s> {
                let [$($s),+] = slots else {
                    // SAFETY: The arity matches (guaranteed by the caller).
                    unsafe { core::hint::unreachable_unchecked() }
                };
                (
                    $(
                        // SAFETY: The slot is bound to the matching type and
                        // not shared (guaranteed by the caller).
                        unsafe { $s.get_unchecked_mut::<$T>() },
                    )+
                )
            }

            fn downgrade<'s>(muts: Self::Muts<'s>) -> Self::Refs<'s>
            where
                Self: 's,
            {
                let ($($s,)+) = muts;
                ($(&*$s,)+)
            }
        }
    };
}

impl_slots!(1; (A X0 a));
impl_slots!(2; (A X0 a), (B X1 b));
impl_slots!(3; (A X0 a), (B X1 b), (C X2 c));
impl_slots!(4; (A X0 a), (B X1 b), (C X2 c), (D X3 d));
impl_slots!(5; (A X0 a), (B X1 b), (C X2 c), (D X3 d), (E X4 e));
impl_slots!(6; (A X0 a), (B X1 b), (C X2 c), (D X3 d), (E X4 e), (F X5 f));

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;
    use crate::refs::Binding;

    #[test]
    fn test_into_slots() {
        let count = 3_u8;
        let mut name = String::from("slot");
        let slots = (&count, &mut name, ByValue(1.5_f32)).into_slots();
        assert_eq!(slots[0].binding(), Some(Binding::Shared));
        assert_eq!(slots[1].binding(), Some(Binding::Exclusive));
        assert_eq!(slots[2].binding(), Some(Binding::Copied));
        assert!(slots[1].is::<String>());
    }

    #[test]
    fn test_recover_slots() {
        let mut total = 1_i64;
        let mut slots = (&mut total, ByValue('x')).into_slots();

        // SAFETY: The slots are an `i64` and a `char`, neither shared.
        let (number, letter) = unsafe { <(i64, char)>::muts(&mut slots) };
        *number += 1;
        let (number, letter) = <(i64, char)>::downgrade((number, letter));
        assert_eq!((*number, *letter), (2, 'x'));

        // SAFETY: The slots are an `i64` and a `char`.
        let (number, _) = unsafe { <(i64, char)>::refs(&slots) };
        assert_eq!(*number, 2);
        drop(slots);
        assert_eq!(total, 2);
    }
}
