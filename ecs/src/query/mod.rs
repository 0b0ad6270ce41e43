//! Declarative entity queries with per-tick delta tracking.
//!
//! A [`Query`] describes a predicate over entity bitmasks: components that
//! must be present (`with`), components that must be absent (`without`), and
//! components whose writes should be observed (`track`). Registering it with
//! the world compiles the description to masks and allocates the four result
//! sets; the returned [`QueryHandle`] is then used each tick to open a
//! [`QueryView`] over the prepared sets.
//!
//! # Delta lifecycle
//!
//! `added`, `removed`, and `changed` are valid only for the tick in which
//! they were prepared and are cleared and recomputed by the next tick's
//! prepare pass. Callers must not cache them across ticks. `current`
//! persists and is adjusted incrementally.
//!
//! ```ignore
//! let movable = world.register_query(
//!     Query::new().with(position).with(velocity).track(position),
//! )?;
//!
//! world.tick();
//! for entity in world.query(movable).iter() {
//!     // every entity with Position and Velocity
//! }
//! for entity in world.query(movable).changed() {
//!     // matching entities whose Position was written last tick
//! }
//! ```

pub(crate) mod state;

use fixedbitset::FixedBitSet;

use crate::component::Component;
use crate::entity::{Allocator, Entity, Id};
use crate::mask::Mask;
use state::QueryState;

/// A query description: required, excluded, and tracked component sets.
#[derive(Debug, Clone, Default)]
pub struct Query {
    required: Vec<Component>,
    excluded: Vec<Component>,
    tracked: Vec<Component>,
}

impl Query {
    /// Start an empty query. With no `with` clauses it matches every live
    /// entity, which is permitted but rarely what a system wants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `component` to be present.
    pub fn with(mut self, component: Component) -> Self {
        self.required.push(component);
        self
    }

    /// Require `component` to be absent.
    pub fn without(mut self, component: Component) -> Self {
        self.excluded.push(component);
        self
    }

    /// Observe writes to `component` through the `changed` set.
    pub fn track(mut self, component: Component) -> Self {
        self.tracked.push(component);
        self
    }

    /// Compile the description into `(required, excluded, tracked)` masks.
    pub(crate) fn compile(&self) -> (Mask, Mask, Mask) {
        let mut required = Mask::EMPTY;
        for component in &self.required {
            required.insert(component.bit());
        }
        let mut excluded = Mask::EMPTY;
        for component in &self.excluded {
            excluded.insert(component.bit());
        }
        let mut tracked = Mask::EMPTY;
        for component in &self.tracked {
            tracked.insert(component.bit());
        }
        (required, excluded, tracked)
    }

    /// Number of clauses, for registration logging.
    pub(crate) fn clause_count(&self) -> usize {
        self.required.len() + self.excluded.len() + self.tracked.len()
    }
}

/// An opaque handle to a registered query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryHandle(u16);

impl QueryHandle {
    /// Most queries a world can register; indices are stored as `u16` and
    /// registration rejects anything past this.
    pub(crate) const MAX: usize = u16::MAX as usize;

    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index < Self::MAX);
        Self(index as u16)
    }

    #[inline]
    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A read view over one query's prepared result sets.
///
/// Borrowed from the world; all iterators yield entities in ascending id
/// order.
pub struct QueryView<'w> {
    state: &'w QueryState,
    allocator: &'w Allocator,
}

impl<'w> QueryView<'w> {
    #[inline]
    pub(crate) fn new(state: &'w QueryState, allocator: &'w Allocator) -> Self {
        Self { state, allocator }
    }

    fn handle_for(&self, index: usize) -> Entity {
        let id = Id::from(index as u32);
        Entity::new_with_generation(id, self.allocator.generation_of(id))
    }

    /// All entities currently matching.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.state.current().ones().map(|index| self.handle_for(index))
    }

    /// Entities that matched this tick but not last.
    pub fn added(&self) -> impl Iterator<Item = Entity> + '_ {
        self.state.added().ones().map(|index| self.handle_for(index))
    }

    /// Entities with a tracked write since last tick that currently match.
    pub fn changed(&self) -> impl Iterator<Item = Entity> + '_ {
        self.state.changed().ones().map(|index| self.handle_for(index))
    }

    /// Ids that matched last tick but not this. Yields raw ids because the
    /// occupant may already be destroyed.
    pub fn removed(&self) -> impl Iterator<Item = Id> + '_ {
        self.state.removed().ones().map(|index| Id::from(index as u32))
    }

    /// Whether a live entity currently matches.
    pub fn contains(&self, entity: Entity) -> bool {
        self.allocator.contains(entity) && self.state.current().contains(entity.index())
    }

    /// Number of entities currently matching.
    #[inline]
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Whether no entity currently matches.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collect the current matches into a `Vec`.
    ///
    /// Handy for loops that mutate the world per entity, which cannot hold
    /// this view across the mutation.
    pub fn entities(&self) -> Vec<Entity> {
        self.iter().collect()
    }

    /// Raw current-set bitset, for set-algebra consumers.
    pub fn bits(&self) -> &FixedBitSet {
        self.state.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_builds_three_masks() {
        // Given
        let a = Component::new(0);
        let b = Component::new(3);
        let c = Component::new(5);
        let query = Query::new().with(a).with(b).without(c).track(b);

        // When
        let (required, excluded, tracked) = query.compile();

        // Then
        assert!(required.contains(0));
        assert!(required.contains(3));
        assert_eq!(required.len(), 2);
        assert!(excluded.contains(5));
        assert_eq!(excluded.len(), 1);
        assert!(tracked.contains(3));
        assert_eq!(tracked.len(), 1);
        assert_eq!(query.clause_count(), 4);
    }

    #[test]
    fn empty_query_compiles_to_empty_masks() {
        // Given
        let (required, excluded, tracked) = Query::new().compile();

        // Then
        assert!(required.is_empty());
        assert!(excluded.is_empty());
        assert!(tracked.is_empty());
    }
}
