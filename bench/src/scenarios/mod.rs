//! Realistic scenario benchmarks.
//!
//! Scenarios simulate whole-frame workloads with representative entity
//! counts and per-tick churn, driven through the scheduler the way a real
//! host would drive it.

pub mod particles;

pub use particles::{ParticleConfig, ParticleScenario};

/// Common trait for benchmark scenarios.
pub trait Scenario {
    /// Human-readable name of the scenario.
    fn name(&self) -> &'static str;

    /// Number of entities the scenario maintains.
    fn entity_count(&self) -> usize;

    /// Spawn entities and initialize state.
    fn setup(&mut self);

    /// Run one frame.
    fn update(&mut self);
}
