//! Particle system scenario.
//!
//! A high-volume particle pool: every particle carries Position, Velocity,
//! Lifetime, Color, and Size; each frame integrates movement, decays
//! lifetimes, and respawns expired particles, keeping the population
//! constant. Exercises query preparation under steady structural churn plus
//! bulk field access.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use easel_ecs::{
    Entity, Query, QueryHandle, Resources, Result, Schedule, ScheduleBuilder, System, World,
    WorldConfig, define_phase,
};

use crate::components::{Color, Lifetime, Position, Size, Velocity};
use crate::scenarios::Scenario;

define_phase!(Simulate);

/// Configuration for the particle scenario.
pub struct ParticleConfig {
    /// Number of particles to maintain.
    pub particle_count: usize,
    /// Simulated delta time per frame.
    pub delta_time: f32,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            particle_count: 10_000,
            delta_time: 1.0 / 60.0,
            seed: 12345,
        }
    }
}

/// Resource: per-frame delta time.
struct DeltaTime(f32);

/// Resource: seeded generator for particle respawns.
struct Emitter(ChaCha8Rng);

#[derive(Clone, Copy)]
struct Fixtures {
    position: Position,
    velocity: Velocity,
    lifetime: Lifetime,
    color: Color,
    size: Size,
    particles: QueryHandle,
}

pub struct ParticleScenario {
    config: ParticleConfig,
    world: World,
    resources: Resources,
    schedule: Schedule,
    fixtures: Fixtures,
}

impl ParticleScenario {
    pub fn new(config: ParticleConfig) -> Result<Self> {
        let mut world = WorldConfig::new()
            .initial_capacity(config.particle_count.max(64))
            .build()?;

        let position = Position::register(&mut world)?;
        let velocity = Velocity::register(&mut world)?;
        let lifetime = Lifetime::register(&mut world)?;
        let color = Color::register(&mut world)?;
        let size = Size::register(&mut world)?;
        let particles = world.register_query(
            Query::new()
                .with(position.component)
                .with(velocity.component)
                .with(lifetime.component),
        )?;
        let fixtures = Fixtures {
            position,
            velocity,
            lifetime,
            color,
            size,
            particles,
        };

        let mut resources = Resources::new();
        resources.insert(DeltaTime(config.delta_time));
        resources.insert(Emitter(ChaCha8Rng::seed_from_u64(config.seed)));

        let integrate = System::local("integrate", move |ctx| {
            let dt = ctx.resources.expect::<DeltaTime>().0;
            for entity in ctx.world.query(fixtures.particles).entities() {
                let dx = ctx.world.get(entity, fixtures.velocity.dx)?;
                let dy = ctx.world.get(entity, fixtures.velocity.dy)?;
                let mut entry = ctx.world.entry_mut(entity, fixtures.position.component)?;
                let x = entry.get(fixtures.position.x);
                let y = entry.get(fixtures.position.y);
                entry.set(fixtures.position.x, x + dx * dt);
                entry.set(fixtures.position.y, y + dy * dt);
            }
            Ok(())
        });

        let age = System::local("age_and_respawn", move |ctx| {
            let dt = ctx.resources.expect::<DeltaTime>().0;
            let emitter = ctx.resources.expect_mut::<Emitter>();
            for entity in ctx.world.query(fixtures.particles).entities() {
                let remaining = ctx.world.get(entity, fixtures.lifetime.remaining)? - dt;
                if remaining > 0.0 {
                    ctx.world.set(entity, fixtures.lifetime.remaining, remaining)?;
                } else {
                    ctx.world.destroy(entity)?;
                    spawn_particle(ctx.world, &mut emitter.0, fixtures)?;
                }
            }
            Ok(())
        });

        let schedule = ScheduleBuilder::new()
            .add_system(Simulate, integrate)
            .add_system(Simulate, age)
            .build()?;

        Ok(Self {
            config,
            world,
            resources,
            schedule,
            fixtures,
        })
    }

    /// Live particle population.
    pub fn population(&self) -> usize {
        self.world.len()
    }
}

impl Scenario for ParticleScenario {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn entity_count(&self) -> usize {
        self.config.particle_count
    }

    fn setup(&mut self) {
        let fixtures = self.fixtures;
        let emitter = &mut self
            .resources
            .expect_mut::<Emitter>()
            .0;
        for _ in 0..self.config.particle_count {
            if spawn_particle(&mut self.world, emitter, fixtures).is_err() {
                break;
            }
        }
        self.world.tick();
    }

    fn update(&mut self) {
        self.schedule.run(&mut self.world, &mut self.resources);
    }
}

fn spawn_particle(world: &mut World, rng: &mut ChaCha8Rng, fixtures: Fixtures) -> Result<Entity> {
    let entity = world.create()?;

    let (x, y) = (rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0));
    world.attach_with(entity, fixtures.position.component, |entry| {
        entry.set(fixtures.position.x, x);
        entry.set(fixtures.position.y, y);
    })?;

    let (dx, dy) = (rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0));
    world.attach_with(entity, fixtures.velocity.component, |entry| {
        entry.set(fixtures.velocity.dx, dx);
        entry.set(fixtures.velocity.dy, dy);
    })?;

    let remaining = rng.gen_range(1.0..5.0);
    world.attach_with(entity, fixtures.lifetime.component, |entry| {
        entry.set(fixtures.lifetime.remaining, remaining);
        entry.set(fixtures.lifetime.total, 5.0);
    })?;

    let (r, g, b) = (
        rng.gen_range(0.0..1.0),
        rng.gen_range(0.0..1.0),
        rng.gen_range(0.0..1.0),
    );
    world.attach_with(entity, fixtures.color.component, |entry| {
        entry.set(fixtures.color.r, r);
        entry.set(fixtures.color.g, g);
        entry.set(fixtures.color.b, b);
        entry.set(fixtures.color.a, 1.0);
    })?;

    let (width, height) = (rng.gen_range(0.1..2.0), rng.gen_range(0.1..2.0));
    world.attach_with(entity, fixtures.size.component, |entry| {
        entry.set(fixtures.size.width, width);
        entry.set(fixtures.size.height, height);
    })?;

    Ok(entity)
}
