//! Common component fixtures used across benchmarks.
//!
//! Schemas are registered per world, so each fixture bundles the component
//! handle with its resolved field keys. Sizes are representative of real
//! canvas/game components.

use easel_ecs::{Component, Field, Result, Schema, World};

/// 2D position (8 bytes per entity).
#[derive(Clone, Copy)]
pub struct Position {
    pub component: Component,
    pub x: Field<f32>,
    pub y: Field<f32>,
}

impl Position {
    pub fn register(world: &mut World) -> Result<Self> {
        let component = world.register_component(Schema::new("Position").f32("x").f32("y"))?;
        Ok(Self {
            component,
            x: world.field(component, "x")?,
            y: world.field(component, "y")?,
        })
    }
}

/// 2D velocity (8 bytes per entity).
#[derive(Clone, Copy)]
pub struct Velocity {
    pub component: Component,
    pub dx: Field<f32>,
    pub dy: Field<f32>,
}

impl Velocity {
    pub fn register(world: &mut World) -> Result<Self> {
        let component = world.register_component(Schema::new("Velocity").f32("dx").f32("dy"))?;
        Ok(Self {
            component,
            dx: world.field(component, "dx")?,
            dy: world.field(component, "dy")?,
        })
    }
}

/// Remaining/total lifetime (8 bytes per entity).
#[derive(Clone, Copy)]
pub struct Lifetime {
    pub component: Component,
    pub remaining: Field<f32>,
    pub total: Field<f32>,
}

impl Lifetime {
    pub fn register(world: &mut World) -> Result<Self> {
        let component =
            world.register_component(Schema::new("Lifetime").f32("remaining").f32("total"))?;
        Ok(Self {
            component,
            remaining: world.field(component, "remaining")?,
            total: world.field(component, "total")?,
        })
    }
}

/// RGBA color (16 bytes per entity).
#[derive(Clone, Copy)]
pub struct Color {
    pub component: Component,
    pub r: Field<f32>,
    pub g: Field<f32>,
    pub b: Field<f32>,
    pub a: Field<f32>,
}

impl Color {
    pub fn register(world: &mut World) -> Result<Self> {
        let component = world
            .register_component(Schema::new("Color").f32("r").f32("g").f32("b").f32("a"))?;
        Ok(Self {
            component,
            r: world.field(component, "r")?,
            g: world.field(component, "g")?,
            b: world.field(component, "b")?,
            a: world.field(component, "a")?,
        })
    }
}

/// Width/height extent (8 bytes per entity).
#[derive(Clone, Copy)]
pub struct Size {
    pub component: Component,
    pub width: Field<f32>,
    pub height: Field<f32>,
}

impl Size {
    pub fn register(world: &mut World) -> Result<Self> {
        let component =
            world.register_component(Schema::new("Size").f32("width").f32("height"))?;
        Ok(Self {
            component,
            width: world.field(component, "width")?,
            height: world.field(component, "height")?,
        })
    }
}

/// Current/max health (8 bytes per entity), for churn benchmarks.
#[derive(Clone, Copy)]
pub struct Health {
    pub component: Component,
    pub current: Field<f32>,
    pub max: Field<f32>,
}

impl Health {
    pub fn register(world: &mut World) -> Result<Self> {
        let component =
            world.register_component(Schema::new("Health").f32("current").f32("max"))?;
        Ok(Self {
            component,
            current: world.field(component, "current")?,
            max: world.field(component, "max")?,
        })
    }
}
