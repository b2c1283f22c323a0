//! Integration tests for the cuf-internals crate.
//!
//! ## Cell Tests
//! - `test_cell_inline_and_boxed_lifecycle`: values dropped exactly once across
//!   replacement, copying and destruction
//! - `test_cell_custom_handler`: handler-driven copying and formatting
//! - `test_cell_borrowed_values`: shared and exclusive bindings never drop or
//!   copy the pointee
//! - `test_cell_moves`: moving a cell moves the value without copying it
//!
//! ## Shared Tests
//! - `test_shared_lifecycle`: value dropped once, after the last handle
//! - `test_shared_deep_clone_independence`: deep copies do not alias
//! - `test_shared_custom_handler`: handler-driven formatting and refusal
//!
//! ## Consistency Tests
//! - `test_type_id_consistency`: type information agrees across containers

use std::{
    any::TypeId,
    fmt,
    rc::Rc,
    sync::atomic::{AtomicUsize, Ordering},
};

use cuf_internals::{
    Align8, Align16, CellLayout, CloneFailure, RawCell, RawShared, handlers::ValueHandler,
};

/// Copies with [`Clone`] and formats with [`fmt::Debug`].
struct Standard;

impl<T: Clone + fmt::Debug> ValueHandler<T> for Standard {
    fn try_clone(value: &T) -> Option<T> {
        Some(value.clone())
    }

    fn debug(value: &T, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(value, formatter)
    }
}

/// Refuses to copy and only prints the type name.
struct Opaque;

impl<T> ValueHandler<T> for Opaque {
    fn try_clone(_value: &T) -> Option<T> {
        None
    }
}

/// Counts its drops through a shared counter.
#[derive(Clone)]
struct Tracked {
    id: u32,
    drops: Rc<AtomicUsize>,
}

impl Tracked {
    fn new(id: u32, drops: &Rc<AtomicUsize>) -> Self {
        Self {
            id,
            drops: Rc::clone(drops),
        }
    }
}

impl fmt::Debug for Tracked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tracked({})", self.id)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Formats through a cell's `debug` method.
struct ShowCell<'a, const N: usize>(&'a RawCell<N, Align8>);

impl<const N: usize> fmt::Display for ShowCell<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.debug(f)
    }
}

/// Formats through a shared handle's `debug` method.
struct ShowShared<'a>(&'a RawShared);

impl fmt::Display for ShowShared<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.as_ref().debug(f)
    }
}

#[test]
fn test_cell_inline_and_boxed_lifecycle() {
    let drops = Rc::new(AtomicUsize::new(0));

    {
        let mut cell = RawCell::<24, Align8>::new();
        cell.emplace_inline::<Tracked, Standard>(Tracked::new(1, &drops));
        assert_eq!(cell.layout(), Some(CellLayout::Inline));

        let copy = cell.try_clone().unwrap();
        assert_eq!(drops.load(Ordering::SeqCst), 0);
        drop(copy);
        assert_eq!(drops.load(Ordering::SeqCst), 1);

        // Replacing drops the previous value first.
        cell.emplace_boxed::<Tracked, Standard>(Tracked::new(2, &drops));
        assert_eq!(drops.load(Ordering::SeqCst), 2);
        assert_eq!(cell.layout(), Some(CellLayout::Boxed));

        let copy = cell.try_clone().unwrap();
        // SAFETY: Both cells hold a `Tracked`.
        unsafe {
            assert_eq!(copy.downcast_unchecked::<Tracked>().id, 2);
            assert!(!std::ptr::eq(
                copy.downcast_unchecked::<Tracked>(),
                cell.downcast_unchecked::<Tracked>()
            ));
        }
        drop(copy);
        assert_eq!(drops.load(Ordering::SeqCst), 3);

        // SAFETY: The cell holds an owned `Tracked`.
        let taken = unsafe { cell.take_unchecked::<Tracked>() };
        assert!(cell.is_empty());
        assert_eq!(drops.load(Ordering::SeqCst), 3);
        drop(taken);
        assert_eq!(drops.load(Ordering::SeqCst), 4);

        cell.emplace_inline::<Tracked, Standard>(Tracked::new(3, &drops));
    }

    assert_eq!(drops.load(Ordering::SeqCst), 5);
}

#[test]
fn test_cell_custom_handler() {
    let mut cell = RawCell::<24, Align8>::new();
    assert_eq!(ShowCell(&cell).to_string(), "<empty>");

    cell.emplace_inline::<Vec<u8>, Standard>(vec![1, 2]);
    assert_eq!(ShowCell(&cell).to_string(), "[1, 2]");
    assert!(cell.try_clone().is_some());

    cell.emplace_inline::<Vec<u8>, Opaque>(vec![1, 2]);
    assert_eq!(
        ShowCell(&cell).to_string(),
        std::any::type_name::<Vec<u8>>()
    );
    assert!(cell.try_clone().is_none());
}

#[test]
fn test_cell_borrowed_values() {
    let drops = Rc::new(AtomicUsize::new(0));
    let mut value = Tracked::new(7, &drops);

    {
        let mut cell = RawCell::<16, Align8>::new();
        cell.bind_shared(std::ptr::NonNull::from(&value));
        assert_eq!(cell.layout(), Some(CellLayout::Shared));
        assert_eq!(
            ShowCell(&cell).to_string(),
            format!("&{}", std::any::type_name::<Tracked>())
        );

        let copy = cell.try_clone().unwrap();
        // SAFETY: `value` outlives both cells and is not mutated meanwhile.
        unsafe {
            assert!(std::ptr::eq(copy.downcast_unchecked::<Tracked>(), &value));
        }
        drop(copy);

        cell.bind_exclusive(std::ptr::NonNull::from(&mut value));
        assert!(cell.try_clone().is_none());
        // SAFETY: `value` is only reached through the cell here.
        unsafe { cell.downcast_unchecked_mut::<Tracked>().id = 8 };
    }

    assert_eq!(drops.load(Ordering::SeqCst), 0);
    assert_eq!(value.id, 8);
}

#[test]
fn test_cell_moves() {
    let drops = Rc::new(AtomicUsize::new(0));
    let mut cells = Vec::new();

    for id in 0..8 {
        let mut cell = RawCell::<32, Align16>::new();
        cell.emplace_inline::<Tracked, Standard>(Tracked::new(id, &drops));
        cells.push(cell);
    }
    // Growing the vector moved the cells around.
    cells.shrink_to_fit();

    let mut moved = cells.remove(3);
    let emptied = moved.take();
    assert!(moved.is_empty());
    // SAFETY: The cell holds a `Tracked`.
    assert_eq!(unsafe { emptied.downcast_unchecked::<Tracked>() }.id, 3);
    assert_eq!(drops.load(Ordering::SeqCst), 0);

    drop(cells);
    drop(emptied);
    assert_eq!(drops.load(Ordering::SeqCst), 8);
}

#[test]
fn test_shared_lifecycle() {
    let drops = Rc::new(AtomicUsize::new(0));

    let shared = RawShared::new::<Tracked, Standard>(Tracked::new(1, &drops));
    let handles: Vec<RawShared> = (0..10).map(|_| shared.clone()).collect();
    assert_eq!(shared.as_ref().strong_count(), 11);

    drop(shared);
    assert_eq!(drops.load(Ordering::SeqCst), 0);
    assert_eq!(handles[0].as_ref().strong_count(), 10);

    drop(handles);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_shared_deep_clone_independence() {
    let shared = RawShared::new::<Vec<i32>, Standard>(vec![1, 2, 3]);
    let deep = shared.as_ref().deep_clone().unwrap();

    // SAFETY: Both handles hold a `Vec<i32>`.
    unsafe {
        deep.as_ref()
            .value_downcast_unchecked::<Vec<i32>>()
            .borrow_mut()
            .push(4);
        assert_eq!(
            *shared.as_ref().value_downcast_unchecked::<Vec<i32>>().borrow(),
            [1, 2, 3]
        );
    }
    assert_eq!(ShowShared(&deep).to_string(), "[1, 2, 3, 4]");
}

#[test]
fn test_shared_custom_handler() {
    let shared = RawShared::new::<Vec<i32>, Opaque>(vec![1]);
    assert_eq!(
        ShowShared(&shared).to_string(),
        std::any::type_name::<Vec<i32>>()
    );
    assert_eq!(
        shared.as_ref().deep_clone().err(),
        Some(CloneFailure::NotCopyable)
    );

    let standard = RawShared::new::<Vec<i32>, Standard>(vec![1]);
    // SAFETY: The handle holds a `Vec<i32>`.
    let cell = unsafe { standard.as_ref().value_downcast_unchecked::<Vec<i32>>() };
    let guard = cell.borrow_mut();
    assert_eq!(ShowShared(&standard).to_string(), "<borrowed>");
    drop(guard);
    assert_eq!(ShowShared(&standard).to_string(), "[1]");
}

#[test]
fn test_type_id_consistency() {
    let mut cell = RawCell::<16, Align8>::new();
    cell.emplace_inline::<u32, Standard>(5);
    let shared = RawShared::new::<u32, Standard>(5);

    assert_eq!(cell.type_id(), Some(TypeId::of::<u32>()));
    assert_eq!(shared.as_ref().type_id(), TypeId::of::<u32>());
    assert_eq!(cell.type_name(), Some(shared.as_ref().type_name()));

    let value = 5u32;
    cell.bind_shared(std::ptr::NonNull::from(&value));
    assert_eq!(cell.type_id(), Some(TypeId::of::<u32>()));
    assert!(cell.is::<u32>());
    assert!(!cell.is::<i32>());
}
