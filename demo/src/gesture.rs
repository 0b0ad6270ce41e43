//! Drag-gesture state machine.
//!
//! Multi-frame interactions are not hidden inside systems; they are an
//! explicit state machine advanced once per tick by an ordinary local
//! system. The machine here implements click-and-drag over canvas boxes:
//!
//! ```text
//! Idle --Down over box--> Pressed --Move past threshold--> Dragging
//! Pressed --Up--> Idle (click)        Dragging --Up--> Idle (drop)
//! ```
//!
//! Every transition is observable and the state survives between ticks in
//! the machine itself, stored in the resource bag.

use std::collections::VecDeque;

use log::{debug, trace};

use easel_ecs::{Entity, Field, QueryHandle, Result, World};

/// Pointer movement past this distance turns a press into a drag.
pub const DRAG_THRESHOLD: f32 = 4.0;

/// One pointer event, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up,
}

/// Resource: pointer events queued for the current tick.
#[derive(Debug, Default)]
pub struct PointerQueue {
    events: VecDeque<PointerEvent>,
}

impl PointerQueue {
    pub fn push(&mut self, event: PointerEvent) {
        self.events.push_back(event);
    }

    /// Take every queued event, oldest first.
    pub fn drain(&mut self) -> Vec<PointerEvent> {
        self.events.drain(..).collect()
    }
}

/// The machine's current state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// No button held.
    Idle,
    /// Button down over a box, movement still under the drag threshold.
    Pressed {
        target: Entity,
        press_x: f32,
        press_y: f32,
        grab_x: f32,
        grab_y: f32,
    },
    /// Moving a box; its origin follows the pointer minus the grab offset.
    Dragging {
        target: Entity,
        grab_x: f32,
        grab_y: f32,
    },
}

/// Advances the drag gesture over the boxes matched by a query.
pub struct GestureMachine {
    boxes: QueryHandle,
    x: Field<f32>,
    y: Field<f32>,
    width: Field<f32>,
    height: Field<f32>,
    state: Gesture,
    drags_completed: u32,
    clicks: u32,
}

impl GestureMachine {
    pub fn new(
        boxes: QueryHandle,
        x: Field<f32>,
        y: Field<f32>,
        width: Field<f32>,
        height: Field<f32>,
    ) -> Self {
        Self {
            boxes,
            x,
            y,
            width,
            height,
            state: Gesture::Idle,
            drags_completed: 0,
            clicks: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> Gesture {
        self.state
    }

    #[inline]
    pub fn drags_completed(&self) -> u32 {
        self.drags_completed
    }

    #[inline]
    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    /// Fold this tick's pointer events into the machine, moving the dragged
    /// box as a side effect.
    pub fn advance(&mut self, world: &mut World, events: &[PointerEvent]) -> Result<()> {
        for &event in events {
            self.step(world, event)?;
        }
        Ok(())
    }

    fn step(&mut self, world: &mut World, event: PointerEvent) -> Result<()> {
        self.state = match (self.state, event) {
            (Gesture::Idle, PointerEvent::Down { x, y }) => match self.hit_test(world, x, y)? {
                Some(target) => {
                    debug!("pressed {target:?} at ({x}, {y})");
                    Gesture::Pressed {
                        target,
                        press_x: x,
                        press_y: y,
                        grab_x: x - world.get(target, self.x)?,
                        grab_y: y - world.get(target, self.y)?,
                    }
                }
                None => {
                    trace!("press at ({x}, {y}) hit nothing");
                    Gesture::Idle
                }
            },

            (
                Gesture::Pressed {
                    target,
                    press_x,
                    press_y,
                    grab_x,
                    grab_y,
                },
                PointerEvent::Move { x, y },
            ) => {
                let distance = ((x - press_x).powi(2) + (y - press_y).powi(2)).sqrt();
                if distance > DRAG_THRESHOLD {
                    debug!("drag started on {target:?}");
                    world.set(target, self.x, x - grab_x)?;
                    world.set(target, self.y, y - grab_y)?;
                    Gesture::Dragging {
                        target,
                        grab_x,
                        grab_y,
                    }
                } else {
                    self.state
                }
            }

            (Gesture::Pressed { target, .. }, PointerEvent::Up) => {
                debug!("clicked {target:?}");
                self.clicks += 1;
                Gesture::Idle
            }

            (
                Gesture::Dragging {
                    target,
                    grab_x,
                    grab_y,
                },
                PointerEvent::Move { x, y },
            ) => {
                world.set(target, self.x, x - grab_x)?;
                world.set(target, self.y, y - grab_y)?;
                Gesture::Dragging {
                    target,
                    grab_x,
                    grab_y,
                }
            }

            (Gesture::Dragging { target, .. }, PointerEvent::Up) => {
                debug!("dropped {target:?}");
                self.drags_completed += 1;
                Gesture::Idle
            }

            // Redundant Down while held, or Move/Up while idle.
            (state, event) => {
                trace!("ignoring {event:?} in {state:?}");
                state
            }
        };
        Ok(())
    }

    /// Topmost box containing the point; later-created boxes win ties.
    fn hit_test(&self, world: &World, px: f32, py: f32) -> Result<Option<Entity>> {
        let mut hit = None;
        for entity in world.query(self.boxes).iter() {
            let x = world.get(entity, self.x)?;
            let y = world.get(entity, self.y)?;
            let w = world.get(entity, self.width)?;
            let h = world.get(entity, self.height)?;
            if px >= x && px <= x + w && py >= y && py <= y + h {
                hit = Some(entity);
            }
        }
        Ok(hit)
    }
}
