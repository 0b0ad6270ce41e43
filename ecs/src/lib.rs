//! A columnar entity-component-system with schema-defined components and
//! per-tick query deltas.
//!
//! The crate is built in four layers, each depending only on the ones below:
//!
//! - **Fields and storage** ([`field`]): typed flat-buffer columns. A field
//!   is a named scalar, fixed-capacity string, or fixed-length blob; a
//!   column holds one field's value for every entity slot.
//! - **Components** ([`component`]): a [`Schema`] names an ordered set of
//!   fields; registering it with the world allocates its columns and yields
//!   an opaque [`Component`] handle plus typed field keys.
//! - **Entities** ([`entity`], [`world`]): dense reusable ids with
//!   generations, and a per-entity bitmask recording which components are
//!   attached. The bitmask is the only thing queries consult.
//! - **Queries and systems** ([`query`], [`schedule`], [`system`]):
//!   declarative bitmask predicates with `current`/`added`/`removed`/
//!   `changed` sets recomputed once per [`World::tick`], and a phase-ordered
//!   scheduler that drives local and worker systems over them.
//!
//! ```ignore
//! let mut world = WorldConfig::new().build()?;
//! let position = world.register_component(Schema::new("Position").f32("x").f32("y"))?;
//! let x = world.field::<f32>(position, "x")?;
//!
//! let movable = world.register_query(Query::new().with(position))?;
//! let entity = world.create()?;
//! world.attach_with(entity, position, |entry| entry.set(x, 1.0))?;
//!
//! world.tick();
//! for entity in world.query(movable).iter() {
//!     let value = world.get(entity, x)?;
//! }
//! ```
//!
//! The world is single-threaded by contract. Parallelism happens only
//! through worker systems, which exchange owned messages with a thread pool
//! and never touch the world off the scheduling thread.

pub mod component;
pub mod config;
pub mod entity;
pub mod error;
pub mod field;
pub mod mask;
pub mod query;
pub mod resources;
pub mod schedule;
pub mod storable;
pub mod system;
pub mod world;

pub use component::{BytesField, Component, Entry, EntryMut, Field, Schema, StrField};
pub use config::WorldConfig;
pub use entity::{Entity, Generation, Id};
pub use error::{EcsError, Result};
pub use field::{FieldKind, Scalar};
pub use mask::Mask;
pub use query::{Query, QueryHandle, QueryView};
pub use resources::Resources;
pub use schedule::{Label, Schedule, ScheduleBuilder};
pub use storable::Storable;
pub use system::{Context, System};
pub use world::World;
