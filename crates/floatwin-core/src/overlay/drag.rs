//! Pointer-drag tracking for a draggable overlay.
//!
//! The tracker never touches the surface itself. Each pointer event produces
//! a [`DragOutcome`] saying whether the event was consumed (hidden from the
//! overlay content) and which side effect, if any, the owner should apply.

use serde::Deserialize;

use crate::overlay::config::Position;

/// Movement (in pixels, either axis) separating a tap from a drag.
pub const DEFAULT_DRAG_THRESHOLD: f32 = 5.0;

/// Raw pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up { x: f32, y: f32 },
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEffect {
    None,
    MoveSurface(Position),
    DragEnded(Position),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragOutcome {
    pub consumed: bool,
    pub effect: DragEffect,
}

impl DragOutcome {
    const PASS: DragOutcome = DragOutcome {
        consumed: false,
        effect: DragEffect::None,
    };

    fn consume(effect: DragEffect) -> Self {
        Self {
            consumed: true,
            effect,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Armed,
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragSession {
    start_x: f32,
    start_y: f32,
    origin: Position,
    current: Position,
    is_dragging: bool,
}

impl DragSession {
    fn position_for(&self, x: f32, y: f32) -> Position {
        Position::new(
            self.origin.x.saturating_add((x - self.start_x) as i32),
            self.origin.y.saturating_add((y - self.start_y) as i32),
        )
    }
}

#[derive(Debug, Clone)]
pub struct DragTracker {
    threshold: f32,
    session: Option<DragSession>,
}

impl Default for DragTracker {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_THRESHOLD)
    }
}

impl DragTracker {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.max(0.0),
            session: None,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn state(&self) -> DragState {
        match self.session {
            None => DragState::Idle,
            Some(DragSession {
                is_dragging: false, ..
            }) => DragState::Armed,
            Some(_) => DragState::Dragging,
        }
    }

    /// Drops any gesture in progress.
    pub fn reset(&mut self) {
        self.session = None;
    }

    /// Feed one pointer event. `surface` is the surface position right now;
    /// it is only read on pointer-down.
    pub fn handle(&mut self, event: PointerEvent, surface: Position) -> DragOutcome {
        match event {
            PointerEvent::Down { x, y } => {
                self.session = Some(DragSession {
                    start_x: x,
                    start_y: y,
                    origin: surface,
                    current: surface,
                    is_dragging: false,
                });
                DragOutcome::PASS
            }
            PointerEvent::Move { x, y } => {
                let Some(session) = self.session.as_mut() else {
                    return DragOutcome::PASS;
                };
                if !session.is_dragging {
                    let dx = (x - session.start_x).abs();
                    let dy = (y - session.start_y).abs();
                    if dx <= self.threshold && dy <= self.threshold {
                        return DragOutcome::PASS;
                    }
                    session.is_dragging = true;
                }
                session.current = session.position_for(x, y);
                DragOutcome::consume(DragEffect::MoveSurface(session.current))
            }
            PointerEvent::Up { .. } => match self.session.take() {
                Some(session) if session.is_dragging => {
                    DragOutcome::consume(DragEffect::DragEnded(session.current))
                }
                _ => DragOutcome::PASS,
            },
            PointerEvent::Cancel => {
                self.session = None;
                DragOutcome::PASS
            }
        }
    }
}
