//! Phase-ordered system scheduling.
//!
//! Systems are grouped into phases identified by zero-sized label types
//! (declare them with [`define_phase!`]). A [`ScheduleBuilder`] collects
//! phases, before/after edges between them, and systems within them;
//! [`ScheduleBuilder::build`] topologically sorts the phases and freezes
//! the result into a [`Schedule`]. A cycle in the ordering graph is a
//! configuration error surfaced at build time, never at runtime.
//!
//! # Execution model
//!
//! One call to [`Schedule::run`] is one tick: the world's prepare pass
//! first, then every phase in sorted order, systems within a phase in
//! declaration order. Execution is synchronous on the calling thread with
//! one exception: worker systems are dispatched to the executor pool when
//! reached and joined at the end of their phase, their outputs applied in
//! declaration order. The phase boundary is therefore a barrier — any
//! system in a later phase observes every earlier worker's results.
//!
//! A system returning an error is logged and skipped for the tick;
//! independent systems keep running.
//!
//! ```ignore
//! define_phase!(Input, Update, Render);
//!
//! let mut schedule = ScheduleBuilder::new()
//!     .order(Input, Update)
//!     .order(Update, Render)
//!     .add_system(Update, System::local("integrate", integrate))
//!     .build()?;
//!
//! loop {
//!     schedule.run(&mut world, &mut resources);
//! }
//! ```

mod graph;

use std::any::TypeId;

use log::{debug, warn};

use crate::error::{EcsError, Result};
use crate::resources::Resources;
use crate::system::worker::Executor;
use crate::system::{Context, Mode, System};
use crate::world::World;

/// Opaque phase identifier derived from a label type.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Id(TypeId);

impl Id {
    /// The id of a label type.
    #[inline]
    pub fn new<L: Label>() -> Self {
        Self(TypeId::of::<L>())
    }
}

/// A marker trait for phase labels: zero-sized types naming an execution
/// stage. Declare them with [`define_phase!`].
pub trait Label: 'static {
    /// Human-readable phase name for diagnostics.
    fn name() -> &'static str;

    /// The phase id for this label.
    fn id(self) -> Id
    where
        Self: Sized,
    {
        Id::new::<Self>()
    }
}

/// Declares one or more phase label types.
///
/// ```ignore
/// define_phase!(Input, Capture, Update, Render);
/// ```
#[macro_export]
macro_rules! define_phase {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
            pub struct $name;

            impl $crate::schedule::Label for $name {
                #[inline]
                fn name() -> &'static str {
                    stringify!($name)
                }
            }
        )*
    };
}

struct PhaseSlot {
    id: Id,
    name: &'static str,
    systems: Vec<System>,
}

/// Collects phases, ordering edges, and systems, then builds a
/// [`Schedule`].
pub struct ScheduleBuilder {
    phases: Vec<PhaseSlot>,
    edges: Vec<(Id, Id)>,
    worker_threads: usize,
}

impl Default for ScheduleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleBuilder {
    /// An empty builder. Worker systems run on a two-thread pool unless
    /// [`worker_threads`](Self::worker_threads) says otherwise.
    pub fn new() -> Self {
        Self {
            phases: Vec::new(),
            edges: Vec::new(),
            worker_threads: 2,
        }
    }

    /// Declare a phase. Redundant for phases already mentioned by
    /// [`order`](Self::order) or [`add_system`](Self::add_system), but
    /// useful to pin a declaration-order position for an unconstrained
    /// phase.
    pub fn phase<L: Label>(mut self, label: L) -> Self {
        self.ensure_phase(label);
        self
    }

    /// Declare that every system of `before` runs ahead of every system of
    /// `after`, registering both phases if needed.
    pub fn order<A: Label, B: Label>(mut self, before: A, after: B) -> Self {
        self.ensure_phase(before);
        self.ensure_phase(after);
        self.edges.push((Id::new::<A>(), Id::new::<B>()));
        self
    }

    /// Append a system to a phase. Within a phase, systems execute in the
    /// order they were added.
    pub fn add_system<L: Label>(mut self, label: L, system: System) -> Self {
        let position = self.ensure_phase(label);
        self.phases[position].systems.push(system);
        self
    }

    /// Size of the executor pool backing worker systems.
    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    /// Topologically sort the phases and freeze the schedule.
    ///
    /// Fails with `CyclicSchedule` naming a participating phase if the
    /// before/after edges form a cycle. The executor pool is only created
    /// when at least one worker system was added.
    pub fn build(self) -> Result<Schedule> {
        let ids: Vec<Id> = self.phases.iter().map(|slot| slot.id).collect();
        let order = graph::topological_sort(&ids, &self.edges).map_err(|stuck| {
            let phase = self
                .phases
                .iter()
                .find(|slot| stuck.contains(&slot.id))
                .map(|slot| slot.name)
                .unwrap_or("<unknown>");
            EcsError::CyclicSchedule { phase }
        })?;

        let mut slots = self.phases;
        let mut phases = Vec::with_capacity(slots.len());
        for id in order {
            if let Some(position) = slots.iter().position(|slot| slot.id == id) {
                phases.push(slots.remove(position));
            }
        }

        let has_workers = phases
            .iter()
            .any(|slot| slot.systems.iter().any(System::is_worker));
        let executor = has_workers.then(|| Executor::new(self.worker_threads));

        debug!(
            "built schedule: {} phases, {} systems{}",
            phases.len(),
            phases.iter().map(|slot| slot.systems.len()).sum::<usize>(),
            if has_workers { ", worker pool on" } else { "" }
        );
        Ok(Schedule { phases, executor })
    }

    fn ensure_phase<L: Label>(&mut self, _label: L) -> usize {
        let id = Id::new::<L>();
        if let Some(position) = self.phases.iter().position(|slot| slot.id == id) {
            position
        } else {
            self.phases.push(PhaseSlot {
                id,
                name: L::name(),
                systems: Vec::new(),
            });
            self.phases.len() - 1
        }
    }
}

/// A frozen, topologically-ordered set of phases. Built once at setup and
/// driven once per frame with [`run`](Self::run).
pub struct Schedule {
    phases: Vec<PhaseSlot>,
    executor: Option<Executor>,
}

impl Schedule {
    /// Execute one tick: prepare all queries, then run every phase in
    /// sorted order.
    ///
    /// Returns the world's new tick number. Failing systems are logged via
    /// `warn!` and do not stop the tick.
    pub fn run(&mut self, world: &mut World, resources: &mut Resources) -> u64 {
        let tick = world.tick();
        let executor = self.executor.as_ref();

        for slot in &mut self.phases {
            let mut ctx = Context {
                world: &mut *world,
                resources: &mut *resources,
            };

            for system in &mut slot.systems {
                match &mut system.mode {
                    Mode::Local(run) => {
                        if let Err(error) = run(&mut ctx) {
                            warn!(
                                "system `{}` failed in phase `{}`: {error}",
                                system.name(),
                                slot.name
                            );
                        }
                    }
                    Mode::Worker(run) => {
                        let Some(executor) = executor else {
                            // Unreachable by construction; build() creates the
                            // pool whenever a worker system exists.
                            warn!("no executor for worker system `{}`", system.name());
                            continue;
                        };
                        if let Err(error) = run.dispatch(&mut ctx, executor) {
                            warn!(
                                "worker system `{}` failed to extract in phase `{}`: {error}",
                                system.name(),
                                slot.name
                            );
                        }
                    }
                }
            }

            // Phase barrier: join this phase's workers in declaration order
            // before the next phase observes the world.
            for system in &mut slot.systems {
                if let Mode::Worker(run) = &mut system.mode {
                    if let Err(error) = run.join(&mut ctx) {
                        warn!(
                            "worker system `{}` failed to apply in phase `{}`: {error}",
                            system.name(),
                            slot.name
                        );
                    }
                }
            }
        }

        tick
    }

    /// Number of phases in sorted order.
    #[inline]
    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    /// Total number of systems across all phases.
    pub fn system_count(&self) -> usize {
        self.phases.iter().map(|slot| slot.systems.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Schema;
    use crate::config::WorldConfig;
    use crate::entity::Entity;
    use crate::query::Query;

    define_phase!(Input, Update, Render);

    #[derive(Default)]
    struct Trace(Vec<&'static str>);

    fn fixture() -> (World, Resources) {
        let world = WorldConfig::new().build().unwrap();
        let mut resources = Resources::new();
        resources.insert(Trace::default());
        (world, resources)
    }

    fn tracer(name: &'static str) -> System {
        System::local(name, move |ctx| {
            ctx.resources.expect_mut::<Trace>().0.push(name);
            Ok(())
        })
    }

    #[test]
    fn phases_run_in_topological_order() {
        // Given - edges declared against declaration order
        let (mut world, mut resources) = fixture();
        let mut schedule = ScheduleBuilder::new()
            .add_system(Render, tracer("draw"))
            .add_system(Input, tracer("poll"))
            .add_system(Update, tracer("integrate"))
            .order(Input, Update)
            .order(Update, Render)
            .build()
            .unwrap();

        // When
        schedule.run(&mut world, &mut resources);

        // Then
        assert_eq!(
            resources.expect::<Trace>().0,
            vec!["poll", "integrate", "draw"]
        );
    }

    #[test]
    fn systems_within_a_phase_keep_declaration_order() {
        // Given
        let (mut world, mut resources) = fixture();
        let mut schedule = ScheduleBuilder::new()
            .add_system(Update, tracer("first"))
            .add_system(Update, tracer("second"))
            .add_system(Update, tracer("third"))
            .build()
            .unwrap();

        // When
        schedule.run(&mut world, &mut resources);
        schedule.run(&mut world, &mut resources);

        // Then
        assert_eq!(
            resources.expect::<Trace>().0,
            vec!["first", "second", "third", "first", "second", "third"]
        );
    }

    #[test]
    fn cycle_is_a_build_error() {
        // Given
        let result = ScheduleBuilder::new()
            .order(Input, Update)
            .order(Update, Render)
            .order(Render, Input)
            .build();

        // Then
        assert!(matches!(result, Err(EcsError::CyclicSchedule { .. })));
    }

    #[test]
    fn failing_system_does_not_stop_the_tick() {
        // Given - a system that always fails between two healthy ones
        let (mut world, mut resources) = fixture();
        let broken = System::local("broken", |ctx| {
            Err(crate::error::EcsError::InvalidEntity {
                entity: doomed_handle(ctx.world),
            })
        });
        let mut schedule = ScheduleBuilder::new()
            .add_system(Update, tracer("before"))
            .add_system(Update, broken)
            .add_system(Update, tracer("after"))
            .build()
            .unwrap();

        // When
        schedule.run(&mut world, &mut resources);

        // Then - both healthy systems ran
        assert_eq!(resources.expect::<Trace>().0, vec!["before", "after"]);
    }

    fn doomed_handle(world: &mut World) -> Entity {
        let entity = world.create().unwrap();
        world.destroy(entity).unwrap();
        entity
    }

    #[test]
    fn run_advances_the_world_tick() {
        // Given
        let (mut world, mut resources) = fixture();
        let mut schedule = ScheduleBuilder::new()
            .add_system(Update, tracer("noop"))
            .build()
            .unwrap();

        // When / Then
        assert_eq!(schedule.run(&mut world, &mut resources), 1);
        assert_eq!(schedule.run(&mut world, &mut resources), 2);
        assert_eq!(world.tick_count(), 2);
    }

    #[test]
    fn later_phase_observes_worker_output() {
        // A worker computes off-thread; the barrier at its phase's end means
        // the Render-phase system always sees the result.
        struct Sum(u64);
        let (mut world, mut resources) = fixture();
        resources.insert(Sum(0));

        let worker = System::worker(
            "sum",
            |_: &mut Context<'_>| Ok((1..=100u64).collect::<Vec<_>>()),
            |values: Vec<u64>| values.iter().sum::<u64>(),
            |ctx, total: u64| {
                ctx.resources.expect_mut::<Sum>().0 = total;
                Ok(())
            },
        );
        let check = System::local("check", |ctx| {
            assert_eq!(ctx.resources.expect::<Sum>().0, 5050);
            ctx.resources.expect_mut::<Trace>().0.push("checked");
            Ok(())
        });

        let mut schedule = ScheduleBuilder::new()
            .order(Update, Render)
            .add_system(Update, worker)
            .add_system(Render, check)
            .build()
            .unwrap();

        // When
        schedule.run(&mut world, &mut resources);

        // Then
        assert_eq!(resources.expect::<Trace>().0, vec!["checked"]);
    }

    #[test]
    fn writer_then_changed_reader_across_ticks() {
        // Lazy discipline: system A writes Position on tick N; system B's
        // changed query observes the entity on tick N+1's prepare.
        struct Fixture {
            entity: Entity,
            seen: Vec<Entity>,
        }

        let mut world = WorldConfig::new().build().unwrap();
        let position = world
            .register_component(Schema::new("Position").f32("x").f32("y"))
            .unwrap();
        let x = world.field::<f32>(position, "x").unwrap();
        let tracked = world
            .register_query(Query::new().with(position).track(position))
            .unwrap();
        let entity = world.create().unwrap();
        world.attach(entity, position).unwrap();

        let mut resources = Resources::new();
        resources.insert(Fixture {
            entity,
            seen: Vec::new(),
        });

        let writer = System::local("nudge", move |ctx| {
            let entity = ctx.resources.expect::<Fixture>().entity;
            let current = ctx.world.get(entity, x)?;
            ctx.world.set(entity, x, current + 1.0)
        });
        let reader = System::local("observe", move |ctx| {
            let changed: Vec<_> = ctx.world.query(tracked).changed().collect();
            ctx.resources.expect_mut::<Fixture>().seen.extend(changed);
            Ok(())
        });

        let mut schedule = ScheduleBuilder::new()
            .order(Update, Render)
            .add_system(Update, writer)
            .add_system(Render, reader)
            .build()
            .unwrap();

        // Tick 1: A writes; the delta is not prepared yet, B sees nothing.
        schedule.run(&mut world, &mut resources);
        assert!(resources.expect::<Fixture>().seen.is_empty());

        // Tick 2: prepare folds the write in; B observes the entity.
        schedule.run(&mut world, &mut resources);
        assert_eq!(resources.expect::<Fixture>().seen, vec![entity]);
    }

    #[test]
    fn builder_counts_phases_and_systems() {
        // Given
        let schedule = ScheduleBuilder::new()
            .phase(Input)
            .add_system(Update, tracer("a"))
            .add_system(Update, tracer("b"))
            .add_system(Render, tracer("c"))
            .build()
            .unwrap();

        // Then
        assert_eq!(schedule.phase_count(), 3);
        assert_eq!(schedule.system_count(), 3);
    }
}
