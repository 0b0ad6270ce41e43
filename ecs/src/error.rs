//! Error types for the ECS core.
//!
//! Configuration-time errors ([`EcsError::CyclicSchedule`],
//! [`EcsError::InvalidFieldConfiguration`]) indicate a programming error in the
//! host application and should be surfaced immediately at setup. Per-tick
//! runtime errors ([`EcsError::InvalidEntity`], [`EcsError::ComponentNotPresent`],
//! [`EcsError::CapacityExceeded`]) are recoverable at the call site: the
//! operation fails deterministically and leaves storage untouched.

use thiserror::Error;

use crate::component::Component;
use crate::entity::Entity;

/// Errors that can occur in the ECS core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// An operation referenced an entity that is out of range, currently free,
    /// or carries a stale generation.
    #[error("invalid entity {entity:?}: out of range, freed, or stale")]
    InvalidEntity {
        /// The offending entity handle.
        entity: Entity,
    },

    /// `entry`/`entry_mut` was called for a component whose bit is not set on
    /// the target entity.
    #[error("component {component:?} not present on entity {entity:?}")]
    ComponentNotPresent {
        /// The entity that was accessed.
        entity: Entity,
        /// The component that was missing.
        component: Component,
    },

    /// Entity or storage capacity limit reached and growth is disabled or
    /// impossible.
    #[error("capacity exceeded: requested {requested}, limit {limit}")]
    CapacityExceeded {
        /// The capacity that was asked for.
        requested: usize,
        /// The hard limit in effect.
        limit: usize,
    },

    /// Phase ordering constraints form a cycle. Detected at schedule build
    /// time, never at runtime.
    #[error("schedule ordering cycle through phase `{phase}`")]
    CyclicSchedule {
        /// Name of a phase participating in the cycle.
        phase: &'static str,
    },

    /// Malformed field or schema definition, detected at component
    /// registration.
    #[error("invalid field configuration: {reason}")]
    InvalidFieldConfiguration {
        /// Human-readable description of what is wrong with the schema.
        reason: String,
    },
}

/// Result type for ECS operations.
pub type Result<T> = std::result::Result<T, EcsError>;
