use crate::{
    animation::{AnimationLayer, StateId},
    constants::DEFAULT_TRANSITION_DURATION,
};

/// A source's wish for one layer this tick.
///
/// An empty `state` means "no change requested".
#[derive(Clone, Debug, PartialEq)]
pub struct StateRequest {
    pub layer: AnimationLayer,
    pub state: String,
    /// Crossfade duration in seconds.
    pub transition_duration: f32,
    /// When false, re-requesting the cached state is suppressed.
    pub replayable: bool,
    pub speed_multiplier: f32,
    pub start_normalized_time: f32,
}

impl StateRequest {
    pub fn new(layer: AnimationLayer, state: impl Into<String>) -> Self {
        Self {
            layer,
            state: state.into(),
            transition_duration: DEFAULT_TRANSITION_DURATION,
            replayable: false,
            speed_multiplier: 1.0,
            start_normalized_time: 0.0,
        }
    }

    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.transition_duration = seconds;
        self
    }

    pub fn replayable(mut self, replayable: bool) -> Self {
        self.replayable = replayable;
        self
    }

    pub fn with_speed(mut self, speed_multiplier: f32) -> Self {
        self.speed_multiplier = speed_multiplier;
        self
    }

    pub fn starting_at(mut self, normalized_time: f32) -> Self {
        self.start_normalized_time = normalized_time;
        self
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }
}

/// A transition handed to the [`AnimationPlayer`](crate::animation::AnimationPlayer).
#[derive(Clone, Debug, PartialEq)]
pub struct Crossfade {
    pub layer: AnimationLayer,
    pub state: StateId,
    pub name: String,
    /// Duration in normalized time of the state currently playing on the layer.
    pub normalized_duration: f32,
    pub start_normalized_time: f32,
    pub speed: f32,
}
