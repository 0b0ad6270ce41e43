//! World construction and capacity configuration.
//!
//! A [`WorldConfig`] is the only input a world consumes at construction time:
//! an initial entity capacity, a hard maximum, and whether storage may grow
//! between the two. Validation happens at [`WorldConfig::build`], so a
//! misconfigured world never exists.

use crate::error::{EcsError, Result};
use crate::world::World;

/// Builder-style configuration for a [`World`].
///
/// ```ignore
/// let world = WorldConfig::new()
///     .initial_capacity(256)
///     .max_entities(1 << 16)
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct WorldConfig {
    initial_capacity: usize,
    max_entities: usize,
    grow: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 64,
            max_entities: 1 << 20,
            grow: true,
        }
    }
}

impl WorldConfig {
    /// Start from the defaults: 64 initial slots, a hard cap of `1 << 20`
    /// entities, doubling growth enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entity slots allocated up front.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Hard upper bound on entity slots. Growth clamps here, and exhausting
    /// it fails `create` with `CapacityExceeded`.
    pub fn max_entities(mut self, max: usize) -> Self {
        self.max_entities = max;
        self
    }

    /// Whether storage doubles when the initial capacity is exhausted. With
    /// growth off, `initial_capacity` is the effective limit.
    pub fn grow(mut self, grow: bool) -> Self {
        self.grow = grow;
        self
    }

    /// Validate and construct the world.
    pub fn build(self) -> Result<World> {
        if self.initial_capacity == 0 {
            return Err(EcsError::CapacityExceeded {
                requested: 0,
                limit: self.max_entities,
            });
        }
        if self.initial_capacity > self.max_entities {
            return Err(EcsError::CapacityExceeded {
                requested: self.initial_capacity,
                limit: self.max_entities,
            });
        }
        Ok(World::from_config(self))
    }

    #[inline]
    pub(crate) fn initial(&self) -> usize {
        self.initial_capacity
    }

    #[inline]
    pub(crate) fn max(&self) -> usize {
        self.max_entities
    }

    #[inline]
    pub(crate) fn growable(&self) -> bool {
        self.grow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        // When
        let world = WorldConfig::new().build();

        // Then
        assert!(world.is_ok());
        assert_eq!(world.unwrap().capacity(), 64);
    }

    #[test]
    fn zero_initial_capacity_rejected() {
        // When
        let result = WorldConfig::new().initial_capacity(0).build();

        // Then
        assert!(matches!(
            result,
            Err(EcsError::CapacityExceeded { requested: 0, .. })
        ));
    }

    #[test]
    fn initial_above_max_rejected() {
        // When
        let result = WorldConfig::new()
            .initial_capacity(1024)
            .max_entities(512)
            .build();

        // Then
        assert!(matches!(
            result,
            Err(EcsError::CapacityExceeded {
                requested: 1024,
                limit: 512
            })
        ));
    }

    #[test]
    fn initial_equal_to_max_allowed() {
        // When
        let world = WorldConfig::new()
            .initial_capacity(512)
            .max_entities(512)
            .build();

        // Then
        assert!(world.is_ok());
    }
}
