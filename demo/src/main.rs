//! Canvas simulation demo.
//!
//! A headless run of the engine over a small box-canvas: scripted pointer
//! input drives a drag gesture that moves a box, while a worker system
//! computes the scene's bounding rectangle off-thread each tick. The
//! schedule runs four phases:
//!
//! ```text
//! Input   - queue this tick's scripted pointer events
//! Capture - advance the drag-gesture state machine
//! Update  - worker: recompute scene bounds from box extents
//! Render  - report the frame
//! ```

mod gesture;
mod logger;

use log::{debug, error, info};

use easel_ecs::{
    Context, Query, Resources, Schema, ScheduleBuilder, Storable, System, WorldConfig,
    define_phase,
};

use gesture::{GestureMachine, PointerEvent, PointerQueue};
use logger::StdoutLogger;

define_phase!(Input, Capture, Update, Render);

/// Resource: the bounding rectangle of every box, refreshed per tick.
#[derive(Debug, Clone, Copy, Default)]
struct SceneBounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

/// Resource: pointer events per tick, consumed front to back.
struct Script(Vec<Vec<PointerEvent>>);

fn main() {
    if StdoutLogger::install().is_err() {
        eprintln!("logger already installed");
    }
    if let Err(error) = run() {
        error!("demo failed: {error}");
        std::process::exit(1);
    }
}

fn run() -> easel_ecs::Result<()> {
    let mut world = WorldConfig::new().initial_capacity(16).build()?;

    // One component holds a box's full rectangle; a second marks identity
    // for boxes that would be saved.
    let rect = world.register_component(Schema::new("Rect").f32("x").f32("y").f32("w").f32("h"))?;
    let x = world.field::<f32>(rect, "x")?;
    let y = world.field::<f32>(rect, "y")?;
    let w = world.field::<f32>(rect, "w")?;
    let h = world.field::<f32>(rect, "h")?;
    let storable = Storable::register(&mut world)?;
    let boxes = world.register_query(Query::new().with(rect))?;

    for (index, origin) in [(10.0, 10.0), (60.0, 20.0), (30.0, 60.0)].iter().enumerate() {
        let entity = world.create()?;
        world.attach_with(entity, rect, |entry| {
            entry.set(x, origin.0);
            entry.set(y, origin.1);
            entry.set(w, 20.0);
            entry.set(h, 15.0);
        })?;
        let id = storable.attach(&mut world, entity)?;
        info!("box {index} at ({}, {}) is {id}", origin.0, origin.1);
    }

    let mut resources = Resources::new();
    resources.insert(PointerQueue::default());
    resources.insert(GestureMachine::new(boxes, x, y, w, h));
    resources.insert(SceneBounds::default());
    resources.insert(Script(script()));

    let pump = System::local("pump_input", |ctx| {
        let script = ctx.resources.expect_mut::<Script>();
        let events = if script.0.is_empty() {
            Vec::new()
        } else {
            script.0.remove(0)
        };
        let queue = ctx.resources.expect_mut::<PointerQueue>();
        for event in events {
            queue.push(event);
        }
        Ok(())
    });

    let drag = System::local("drag_gesture", |ctx| {
        let events = ctx.resources.expect_mut::<PointerQueue>().drain();
        let machine = ctx.resources.expect_mut::<GestureMachine>();
        machine.advance(ctx.world, &events)
    });

    let bounds = System::worker(
        "scene_bounds",
        move |ctx: &mut Context<'_>| {
            let mut rects = Vec::new();
            for entity in ctx.world.query(boxes).iter() {
                rects.push((
                    ctx.world.get(entity, x)?,
                    ctx.world.get(entity, y)?,
                    ctx.world.get(entity, w)?,
                    ctx.world.get(entity, h)?,
                ));
            }
            Ok(rects)
        },
        compute_bounds,
        |ctx, bounds: Option<SceneBounds>| {
            if let Some(bounds) = bounds {
                ctx.resources.insert(bounds);
            }
            Ok(())
        },
    );

    let report = System::local("report", |ctx| {
        let bounds = ctx.resources.expect::<SceneBounds>();
        let state = ctx.resources.expect::<GestureMachine>().state();
        debug!(
            "tick {}: bounds ({}, {})..({}, {}), gesture {state:?}",
            ctx.world.tick_count(),
            bounds.min_x,
            bounds.min_y,
            bounds.max_x,
            bounds.max_y,
        );
        Ok(())
    });

    let mut schedule = ScheduleBuilder::new()
        .order(Input, Capture)
        .order(Capture, Update)
        .order(Update, Render)
        .add_system(Input, pump)
        .add_system(Capture, drag)
        .add_system(Update, bounds)
        .add_system(Render, report)
        .build()?;

    for _ in 0..8 {
        schedule.run(&mut world, &mut resources);
    }

    let machine = resources.expect::<GestureMachine>();
    info!(
        "finished after {} ticks: {} drag(s), {} click(s)",
        world.tick_count(),
        machine.drags_completed(),
        machine.clicks(),
    );
    for entity in world.query(boxes).entities() {
        let id = storable.uuid_of(&world, entity)?;
        info!(
            "box {id} ended at ({}, {})",
            world.get(entity, x)?,
            world.get(entity, y)?,
        );
    }
    Ok(())
}

/// Pointer script: click the first box, then drag the second to the right.
fn script() -> Vec<Vec<PointerEvent>> {
    vec![
        vec![],
        vec![PointerEvent::Down { x: 15.0, y: 15.0 }],
        vec![PointerEvent::Up],
        vec![PointerEvent::Down { x: 70.0, y: 25.0 }],
        vec![
            PointerEvent::Move { x: 80.0, y: 25.0 },
            PointerEvent::Move { x: 95.0, y: 30.0 },
        ],
        vec![PointerEvent::Up],
        vec![],
    ]
}

/// Bounding rectangle of a set of boxes; `None` for an empty scene.
fn compute_bounds(rects: Vec<(f32, f32, f32, f32)>) -> Option<SceneBounds> {
    let mut rects = rects.into_iter();
    let (x, y, w, h) = rects.next()?;
    let mut bounds = SceneBounds {
        min_x: x,
        min_y: y,
        max_x: x + w,
        max_y: y + h,
    };
    for (x, y, w, h) in rects {
        bounds.min_x = bounds.min_x.min(x);
        bounds.min_y = bounds.min_y.min(y);
        bounds.max_x = bounds.max_x.max(x + w);
        bounds.max_y = bounds.max_y.max(y + h);
    }
    Some(bounds)
}
