//! Commonly used items for convenient importing.
//!
//! # Usage
//!
//! ```rust
//! use cuf::prelude::*;
//!
//! let mut count = 2_u32;
//! let slot = AnyURef::from_mut(&mut count);
//! assert!(slot.is::<u32>());
//!
//! let shared = shared_any!(vec![1_u8, 2, 3]);
//! assert_eq!(shared.get::<Vec<u8>>().unwrap().len(), 3);
//! ```
//!
//! # What's Included
//!
//! - **[`SmallAny`]**, **[`SharedAny`]** and the [`AnyURef`] family
//! - **[`Generics`]** together with [`Visitor`] and [`Visit`]
//! - **[`any!`]** and **[`shared_any!`]**
//! - **[`handlers`]** and **[`markers`]**
//! - **[`AnyError`]**

pub use crate::{
    AnyCRef, AnyError, AnyRRef, AnyRef, AnyURef, Generics, SharedAny, SmallAny, StaticAny, any,
    generics::{Visit, Visitor},
    handlers, markers,
    refs::ByValue,
    shared_any,
};
