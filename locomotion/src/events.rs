//! Typed notifications emitted during a tick.
//!
//! Collaborators (camera, UI, audio) read these through
//! [`CharacterController::drain_events`](crate::CharacterController::drain_events)
//! after each update. Nothing is broadcast globally.

use crate::{
    ability::{AbilityIndex, AbilityKind},
    animation::{AnimationLayer, StateId},
    geometry::PlatformId,
    scheduler::TimerKey,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// Grounded state changed. `fall_height` is zero when leaving the ground.
    Grounded { grounded: bool, fall_height: f32 },
    AbilityActive {
        index: AbilityIndex,
        kind: AbilityKind,
        active: bool,
    },
    /// An ability's indicator (prompt/icon state) changed.
    IndicatorChanged { index: AbilityIndex },
    StateRequested {
        layer: AnimationLayer,
        state: StateId,
    },
    ColliderResized { height: f32 },
    /// Attached to (`Some`) or detached from (`None`) a moving platform.
    PlatformChanged { platform: Option<PlatformId> },
    /// An ownerless timer fired.
    TimerFired { key: TimerKey },
    /// A recoverable configuration or contract problem.
    Diagnostic(String),
}

#[derive(Debug, Default)]
pub struct EventQueue {
    pending: Vec<ControllerEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: ControllerEvent) {
        self.pending.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControllerEvent> {
        self.pending.iter()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = ControllerEvent> + '_ {
        self.pending.drain(..)
    }
}
