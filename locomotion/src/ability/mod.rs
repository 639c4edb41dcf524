/*!
Ability contract and arbitration.

An ability is a pluggable override (jump, cover, roll, ...) that may take over
any pipeline stage or animation layer while it is active. Abilities are
registered once, in priority order: the registration index is the priority
index, and a lower index always wins.

- context:    [`AbilityContext`] (mutable access handed to hooks) and
              [`CharacterView`] (read-only access for predicates)
- arbitrator: [`AbilityArbitrator`], the start/stop algorithm and the
              per-stage claim scan

Hooks return [`HookResult`]: `Ok(true)` claims the stage, `Ok(false)` passes,
and `Err` reports a contract violation handled by the configured
[`FaultPolicy`](crate::FaultPolicy).
*/

pub mod arbitrator;
pub mod context;

pub use arbitrator::AbilityArbitrator;
pub use context::{AbilityContext, CharacterView};

use crate::{
    animation::{AnimationLayer, LayerMask, StateRequest},
    constants::DEFAULT_TRANSITION_DURATION,
    error::AbilityError,
    scheduler::TimerKey,
};

/// Priority index of a registered ability. Lower is higher precedence.
pub type AbilityIndex = usize;

/// `Ok(true)` when the hook claimed the stage.
pub type HookResult = Result<bool, AbilityError>;

/// What an ability is, for collaborators (UI, camera, audio) that care.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AbilityKind {
    Jump,
    Climb,
    Cover,
    Vault,
    Swim,
    Push,
    Roll,
    HeightChange,
    SpeedChange,
    Interact,
    Custom(&'static str),
}

impl AbilityKind {
    pub fn label(&self) -> &'static str {
        match self {
            AbilityKind::Jump => "Jump",
            AbilityKind::Climb => "Climb",
            AbilityKind::Cover => "Cover",
            AbilityKind::Vault => "Vault",
            AbilityKind::Swim => "Swim",
            AbilityKind::Push => "Push",
            AbilityKind::Roll => "Roll",
            AbilityKind::HeightChange => "HeightChange",
            AbilityKind::SpeedChange => "SpeedChange",
            AbilityKind::Interact => "Interact",
            AbilityKind::Custom(label) => label,
        }
    }
}

/// How the input collaborator may request a start or stop.
///
/// Only `Automatic` matters to the engine: automatic starts are attempted after the
/// stage sequence, automatic stops are polled through [`Ability::should_stop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Trigger {
    #[default]
    None,
    ButtonDown,
    ButtonUp,
    ButtonToggle,
    DoublePress,
    Automatic,
}

/// The contract every ability implements.
///
/// Everything has a default except [`kind`](Ability::kind), so a minimal ability only
/// overrides the predicates and hooks it cares about.
pub trait Ability {
    fn kind(&self) -> AbilityKind;

    fn name(&self) -> &str {
        self.kind().label()
    }

    /// Concurrent abilities run alongside other concurrent abilities and at most one
    /// exclusive ability.
    fn is_concurrent(&self) -> bool {
        false
    }

    fn start_trigger(&self) -> Trigger {
        Trigger::None
    }

    fn stop_trigger(&self) -> Trigger {
        Trigger::None
    }

    // ---------------------------------------------------------------------
    // Predicates. These must not mutate state.
    // ---------------------------------------------------------------------

    fn can_start(&self, _view: &CharacterView<'_>) -> bool {
        true
    }

    /// Veto hook, asked of every other active ability when `candidate` wants to start.
    fn allows_start_of(&self, _candidate: &dyn Ability) -> bool {
        true
    }

    /// Polled every tick while active when the stop trigger is `Automatic`.
    fn should_stop(&self, _view: &CharacterView<'_>) -> bool {
        false
    }

    /// Whether items may be aimed or interacted with while this ability runs.
    fn can_interact_item(&self) -> bool {
        true
    }

    fn can_use_item(&self) -> bool {
        true
    }

    // ---------------------------------------------------------------------
    // Lifecycle.
    // ---------------------------------------------------------------------

    /// Indicator refresh, called on every ability each tick. Returns whether the
    /// indicator changed.
    fn update(&mut self, _view: &CharacterView<'_>) -> bool {
        false
    }

    fn on_start(&mut self, _ctx: &mut AbilityContext<'_>) {}

    fn on_stop(&mut self, _ctx: &mut AbilityContext<'_>) {}

    fn on_timer(&mut self, _key: TimerKey, _ctx: &mut AbilityContext<'_>) {}

    /// A move-towards request started by this ability reached its target.
    fn on_arrived(&mut self, _ctx: &mut AbilityContext<'_>) {}

    // ---------------------------------------------------------------------
    // Per-tick hooks. Claiming skips the default and every lower-priority ability.
    // ---------------------------------------------------------------------

    /// May rewrite [`AbilityContext::input_mut`]. Claiming skips the whole stage sequence.
    fn on_move(&mut self, _ctx: &mut AbilityContext<'_>) -> HookResult {
        Ok(false)
    }

    fn check_ground(&mut self, _ctx: &mut AbilityContext<'_>) -> HookResult {
        Ok(false)
    }

    fn check_external_forces(&mut self, _ctx: &mut AbilityContext<'_>) -> HookResult {
        Ok(false)
    }

    fn check_movement(&mut self, _ctx: &mut AbilityContext<'_>) -> HookResult {
        Ok(false)
    }

    fn set_surface_material(&mut self, _ctx: &mut AbilityContext<'_>) -> HookResult {
        Ok(false)
    }

    fn update_velocity(&mut self, _ctx: &mut AbilityContext<'_>) -> HookResult {
        Ok(false)
    }

    fn update_platform(&mut self, _ctx: &mut AbilityContext<'_>) -> HookResult {
        Ok(false)
    }

    fn update_rotation(&mut self, _ctx: &mut AbilityContext<'_>) -> HookResult {
        Ok(false)
    }

    fn push_animator_parameters(&mut self, _ctx: &mut AbilityContext<'_>) -> HookResult {
        Ok(false)
    }

    fn apply_animator_root_motion(&mut self, _ctx: &mut AbilityContext<'_>) -> HookResult {
        Ok(false)
    }

    fn update_collider(&mut self, _ctx: &mut AbilityContext<'_>) -> HookResult {
        Ok(false)
    }

    // ---------------------------------------------------------------------
    // Animation.
    // ---------------------------------------------------------------------

    /// Layers this ability owns while active. Owning a layer keeps item idle poses and
    /// engine defaults off it even when no state is requested.
    fn animator_layers(&self) -> LayerMask {
        LayerMask::empty()
    }

    fn has_animator_control(&self, layer: AnimationLayer) -> bool {
        self.animator_layers().contains(layer)
    }

    fn destination_state_name(&self, _layer: AnimationLayer) -> Option<&str> {
        None
    }

    fn transition_duration(&self) -> f32 {
        DEFAULT_TRANSITION_DURATION
    }

    fn can_replay(&self) -> bool {
        false
    }

    fn speed_multiplier(&self) -> f32 {
        1.0
    }

    fn destination_state(&self, layer: AnimationLayer) -> Option<StateRequest> {
        let name = self.destination_state_name(layer)?;
        Some(
            StateRequest::new(layer, name)
                .with_duration(self.transition_duration())
                .replayable(self.can_replay())
                .with_speed(self.speed_multiplier()),
        )
    }

    /// Whether the upper body should be phase-locked to the lower body when this
    /// ability drives it. Opt out when the upper-body state has no lower-body partner.
    fn sync_upper_body(&self) -> bool {
        true
    }

    /// Free-form integer pushed to the animator alongside the ability index.
    fn ability_int_data(&self) -> i32 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Wave;

    impl Ability for Wave {
        fn kind(&self) -> AbilityKind {
            AbilityKind::Custom("Wave")
        }

        fn animator_layers(&self) -> LayerMask {
            LayerMask::empty().with(AnimationLayer::RightArm)
        }

        fn destination_state_name(&self, layer: AnimationLayer) -> Option<&str> {
            (layer == AnimationLayer::RightArm).then_some("Wave")
        }

        fn can_replay(&self) -> bool {
            true
        }
    }

    #[test]
    fn defaults_build_requests_from_names() {
        let wave = Wave;
        assert_eq!(wave.name(), "Wave");
        assert!(!wave.is_concurrent());
        assert!(wave.has_animator_control(AnimationLayer::RightArm));
        assert!(!wave.has_animator_control(AnimationLayer::LeftArm));

        let request = wave.destination_state(AnimationLayer::RightArm).unwrap();
        assert_eq!(request.state, "Wave");
        assert!(request.replayable);
        assert_eq!(request.transition_duration, DEFAULT_TRANSITION_DURATION);
        assert!(wave.destination_state(AnimationLayer::LowerBody).is_none());
    }

    #[test]
    fn kind_labels() {
        assert_eq!(AbilityKind::HeightChange.label(), "HeightChange");
        assert_eq!(AbilityKind::Custom("Dance").label(), "Dance");
    }
}
