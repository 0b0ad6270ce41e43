//! Host-supplied resource bags.
//!
//! A [`Resources`] value carries the objects a host injects into system
//! execution: an input queue, a rendering surface, a sync client, frame
//! statistics. It is a plain by-`TypeId` bag constructed by the host and
//! passed explicitly through every system's context; there is no ambient
//! global registry anywhere in the crate.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;

/// A typed bag of host-supplied values, keyed by type.
///
/// One value per type; inserting a second value of the same type replaces
/// the first.
#[derive(Default)]
pub struct Resources {
    values: HashMap<TypeId, Box<dyn Any>>,
}

impl Resources {
    /// An empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous value of that type if any.
    pub fn insert<T: 'static>(&mut self, value: T) -> Option<T> {
        self.values
            .insert(TypeId::of::<T>(), Box::new(value))
            .map(|old| *old.downcast::<T>().expect("bag is keyed by TypeId"))
    }

    /// Borrow the value of type `T`, if present.
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
    }

    /// Mutably borrow the value of type `T`, if present.
    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.values
            .get_mut(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_mut::<T>())
    }

    /// Remove and return the value of type `T`, if present.
    pub fn remove<T: 'static>(&mut self) -> Option<T> {
        self.values
            .remove(&TypeId::of::<T>())
            .map(|boxed| *boxed.downcast::<T>().expect("bag is keyed by TypeId"))
    }

    /// Whether a value of type `T` is present.
    pub fn contains<T: 'static>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }

    /// Borrow the value of type `T`, panicking with the type name if absent.
    ///
    /// For systems whose wiring guarantees the resource was inserted at
    /// setup; prefer [`Resources::get`] when absence is a real possibility.
    pub fn expect<T: 'static>(&self) -> &T {
        match self.get::<T>() {
            Some(value) => value,
            None => panic!("resource `{}` was never inserted", type_name::<T>()),
        }
    }

    /// Mutable counterpart of [`Resources::expect`].
    pub fn expect_mut<T: 'static>(&mut self) -> &mut T {
        match self.values.get_mut(&TypeId::of::<T>()) {
            Some(boxed) => boxed
                .downcast_mut::<T>()
                .expect("bag is keyed by TypeId"),
            None => panic!("resource `{}` was never inserted", type_name::<T>()),
        }
    }

    /// Number of values in the bag.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the bag holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FrameBudget(u32);
    struct Label(String);

    #[test]
    fn insert_and_get_by_type() {
        // Given
        let mut resources = Resources::new();

        // When
        resources.insert(FrameBudget(16));
        resources.insert(Label("canvas".into()));

        // Then
        assert_eq!(resources.get::<FrameBudget>().unwrap().0, 16);
        assert_eq!(resources.get::<Label>().unwrap().0, "canvas");
        assert_eq!(resources.len(), 2);
    }

    #[test]
    fn insert_replaces_and_returns_previous() {
        // Given
        let mut resources = Resources::new();
        resources.insert(FrameBudget(16));

        // When
        let previous = resources.insert(FrameBudget(33));

        // Then
        assert_eq!(previous.unwrap().0, 16);
        assert_eq!(resources.get::<FrameBudget>().unwrap().0, 33);
        assert_eq!(resources.len(), 1);
    }

    #[test]
    fn get_mut_mutates_in_place() {
        // Given
        let mut resources = Resources::new();
        resources.insert(FrameBudget(16));

        // When
        resources.get_mut::<FrameBudget>().unwrap().0 = 8;

        // Then
        assert_eq!(resources.get::<FrameBudget>().unwrap().0, 8);
    }

    #[test]
    fn remove_takes_ownership() {
        // Given
        let mut resources = Resources::new();
        resources.insert(Label("gone".into()));

        // When
        let taken = resources.remove::<Label>();

        // Then
        assert_eq!(taken.unwrap().0, "gone");
        assert!(!resources.contains::<Label>());
        assert!(resources.is_empty());
    }

    #[test]
    fn missing_type_is_none() {
        let resources = Resources::new();
        assert!(resources.get::<FrameBudget>().is_none());
        assert!(!resources.contains::<FrameBudget>());
    }

    #[test]
    #[should_panic(expected = "was never inserted")]
    fn expect_panics_on_missing() {
        let resources = Resources::new();
        resources.expect::<FrameBudget>();
    }
}
