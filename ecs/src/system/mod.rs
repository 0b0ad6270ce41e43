//! Systems: named units of query-driven logic.
//!
//! A [`System`] pairs a name with a run mode. Local systems are closures
//! invoked synchronously on the scheduling thread with a [`Context`] over
//! the world and the resource bag. Worker systems split into three steps:
//!
//! 1. **extract** — runs on the scheduling thread, serializing whatever the
//!    job needs into an owned `Send` message;
//! 2. **job** — runs on the executor pool, a pure function of the message;
//! 3. **apply** — runs back on the scheduling thread, writing the job's
//!    output into the world.
//!
//! No shared-memory mutation crosses the thread boundary: the world never
//! leaves the scheduling thread, only messages do. The scheduler joins all
//! of a phase's workers before the next phase starts, so systems in later
//! phases always observe worker results.
//!
//! Systems do not own entities or components; there is no cross-system
//! cancellation. Multi-frame logic (a drag gesture, say) belongs in an
//! explicit state machine advanced once per tick by an ordinary local
//! system.

pub mod worker;

use std::sync::Arc;

use log::warn;

use crate::error::Result;
use crate::resources::Resources;
use crate::world::World;
use worker::{Executor, TaskFuture};

/// Everything a system sees when it runs: the world and the host's
/// resource bag, both borrowed for the duration of the call.
pub struct Context<'a> {
    /// The world being ticked.
    pub world: &'a mut World,
    /// Host-supplied resources.
    pub resources: &'a mut Resources,
}

type LocalFn = Box<dyn FnMut(&mut Context<'_>) -> Result<()>>;

/// A named, schedulable unit of logic.
pub struct System {
    name: &'static str,
    pub(crate) mode: Mode,
}

pub(crate) enum Mode {
    /// Runs synchronously on the scheduling thread.
    Local(LocalFn),
    /// Extract/job/apply triple run through the executor pool.
    Worker(Box<dyn WorkerRun>),
}

impl System {
    /// A local system: a closure run synchronously once per tick.
    pub fn local(
        name: &'static str,
        run: impl FnMut(&mut Context<'_>) -> Result<()> + 'static,
    ) -> Self {
        Self {
            name,
            mode: Mode::Local(Box::new(run)),
        }
    }

    /// A worker system.
    ///
    /// `extract` builds the job's owned input message on the scheduling
    /// thread; `job` computes on the pool; `apply` writes the output back.
    /// An `extract` error skips dispatch for the tick.
    pub fn worker<M, O>(
        name: &'static str,
        extract: impl FnMut(&mut Context<'_>) -> Result<M> + 'static,
        job: impl Fn(M) -> O + Send + Sync + 'static,
        apply: impl FnMut(&mut Context<'_>, O) -> Result<()> + 'static,
    ) -> Self
    where
        M: Send + 'static,
        O: Send + 'static,
    {
        Self {
            name,
            mode: Mode::Worker(Box::new(WorkerSystem {
                name,
                extract: Box::new(extract),
                job: Arc::new(job),
                apply: Box::new(apply),
                pending: None,
            })),
        }
    }

    /// The system's name, used in scheduling diagnostics.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this system runs on the executor pool.
    #[inline]
    pub fn is_worker(&self) -> bool {
        matches!(self.mode, Mode::Worker(_))
    }
}

/// Type-erased driver for one worker system; the scheduler calls
/// `dispatch` when it reaches the system and `join` at the phase barrier.
pub(crate) trait WorkerRun {
    fn dispatch(&mut self, ctx: &mut Context<'_>, executor: &Executor) -> Result<()>;
    fn join(&mut self, ctx: &mut Context<'_>) -> Result<()>;
}

struct WorkerSystem<M, O> {
    name: &'static str,
    extract: Box<dyn FnMut(&mut Context<'_>) -> Result<M>>,
    job: Arc<dyn Fn(M) -> O + Send + Sync>,
    apply: Box<dyn FnMut(&mut Context<'_>, O) -> Result<()>>,
    pending: Option<TaskFuture<O>>,
}

impl<M, O> WorkerRun for WorkerSystem<M, O>
where
    M: Send + 'static,
    O: Send + 'static,
{
    fn dispatch(&mut self, ctx: &mut Context<'_>, executor: &Executor) -> Result<()> {
        let message = (self.extract)(ctx)?;
        let job = Arc::clone(&self.job);
        self.pending = Some(executor.spawn(move || job(message)));
        Ok(())
    }

    fn join(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        let Some(future) = self.pending.take() else {
            // Extract failed this tick; nothing to apply.
            return Ok(());
        };
        match future.wait() {
            Ok(output) => (self.apply)(ctx, output),
            Err(_) => {
                warn!("worker system `{}` lost its job result", self.name);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;

    struct Counter(u32);

    fn context_fixture() -> (World, Resources) {
        let world = WorldConfig::new().build().unwrap();
        let mut resources = Resources::new();
        resources.insert(Counter(0));
        (world, resources)
    }

    #[test]
    fn local_system_runs_against_context() {
        // Given
        let (mut world, mut resources) = context_fixture();
        let mut system = System::local("count", |ctx| {
            ctx.resources.expect_mut::<Counter>().0 += 1;
            Ok(())
        });
        assert_eq!(system.name(), "count");
        assert!(!system.is_worker());

        // When
        let mut ctx = Context {
            world: &mut world,
            resources: &mut resources,
        };
        if let Mode::Local(run) = &mut system.mode {
            run(&mut ctx).unwrap();
            run(&mut ctx).unwrap();
        }

        // Then
        assert_eq!(resources.get::<Counter>().unwrap().0, 2);
    }

    #[test]
    fn worker_system_roundtrips_through_pool() {
        // Given - extract reads the counter, job doubles it, apply stores it
        let (mut world, mut resources) = context_fixture();
        resources.expect_mut::<Counter>().0 = 21;
        let executor = Executor::single_threaded();
        let mut system = System::worker(
            "double",
            |ctx: &mut Context<'_>| Ok(ctx.resources.expect::<Counter>().0),
            |input: u32| input * 2,
            |ctx, output: u32| {
                ctx.resources.expect_mut::<Counter>().0 = output;
                Ok(())
            },
        );
        assert!(system.is_worker());

        // When
        let mut ctx = Context {
            world: &mut world,
            resources: &mut resources,
        };
        if let Mode::Worker(run) = &mut system.mode {
            run.dispatch(&mut ctx, &executor).unwrap();
            run.join(&mut ctx).unwrap();
        }

        // Then
        assert_eq!(resources.get::<Counter>().unwrap().0, 42);
    }

    #[test]
    fn worker_join_without_dispatch_is_a_no_op() {
        // Given
        let (mut world, mut resources) = context_fixture();
        let mut system = System::worker(
            "idle",
            |_: &mut Context<'_>| Ok(0u32),
            |input: u32| input,
            |ctx, _| {
                ctx.resources.expect_mut::<Counter>().0 += 1;
                Ok(())
            },
        );

        // When - join with no pending future
        let mut ctx = Context {
            world: &mut world,
            resources: &mut resources,
        };
        if let Mode::Worker(run) = &mut system.mode {
            run.join(&mut ctx).unwrap();
        }

        // Then - apply never ran
        assert_eq!(resources.get::<Counter>().unwrap().0, 0);
    }
}
