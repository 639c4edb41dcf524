//! Collaborator traits at the animation boundary.

use crate::{
    ability::AbilityIndex,
    animation::{AnimationLayer, Crossfade, StateId, StateRequest},
    math::{Quat, Vec3},
};

/// Parameters pushed to the animation player every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnimatorParameters {
    pub horizontal: f32,
    pub forward: f32,
    /// Planar speed (m/s).
    pub speed: f32,
    /// Heading (radians).
    pub yaw: f32,
    pub moving: bool,
    pub grounded: bool,
    pub aiming: bool,
    /// Highest-priority active exclusive ability, if any.
    pub ability_index: Option<AbilityIndex>,
    pub ability_int_data: i32,
    /// Current collider height (meters).
    pub height: f32,
}

/// Root-motion deltas produced by the player since the previous tick.
///
/// `position` is a world-space displacement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootMotion {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for RootMotion {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
        }
    }
}

/// The animation player (state machine + clip playback) driven by the resolver.
pub trait AnimationPlayer {
    /// Whether `state` exists on `layer`.
    fn has_state(&self, layer: AnimationLayer, state: StateId) -> bool;

    /// Length (seconds) of the state currently playing on `layer`.
    fn state_length(&self, layer: AnimationLayer) -> f32;

    /// Playback position of the state currently playing on `layer`, in cycles.
    fn normalized_time(&self, layer: AnimationLayer) -> f32;

    fn crossfade(&mut self, transition: Crossfade);

    fn set_parameters(&mut self, parameters: &AnimatorParameters);

    fn root_motion(&self) -> RootMotion;
}

/// The inventory/item collaborator.
///
/// High-priority states (fire, reload) pre-empt abilities; low-priority states (item idle
/// and movement poses) only apply when no ability owns the layer.
pub trait ItemStates {
    fn high_priority_state(&self, layer: AnimationLayer) -> Option<StateRequest>;

    fn low_priority_state(&self, layer: AnimationLayer) -> Option<StateRequest>;

    fn can_interact(&self) -> bool {
        true
    }

    fn can_use(&self) -> bool {
        true
    }
}

/// No equipped items.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoItems;

impl ItemStates for NoItems {
    fn high_priority_state(&self, _: AnimationLayer) -> Option<StateRequest> {
        None
    }

    fn low_priority_state(&self, _: AnimationLayer) -> Option<StateRequest> {
        None
    }
}
