/*!
Controller settings.

A single settings value configures one character: collider dimensions, probe
tolerances, speeds, and the animation defaults used when neither an ability nor
an item requests a state. Hosts usually deserialize it from their own data files;
every field has a default so partial documents are accepted.

Notes
- Distances are in meters, time in seconds, angles in degrees (converted at use).
- [`ControllerSettings::validate`] is called by the controller constructor; nothing
  downstream re-checks ranges.
*/

use serde::{Deserialize, Serialize};

use crate::{
    animation::AnimationLayer,
    constants::*,
    error::{ConfigError, FaultPolicy},
    geometry::SurfaceMask,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    pub collider_radius: f32,
    /// Standing collider height. Abilities may override it while active.
    pub collider_height: f32,
    pub skin_width: f32,
    /// Extra ground-probe reach while attached to a moving platform.
    pub platform_stickiness: f32,
    pub max_slope_deg: f32,
    pub max_step_height: f32,
    pub step_probe_height: f32,
    pub step_impulse_scale: f32,
    pub ground_speed: f32,
    pub air_speed: f32,
    /// Gravity magnitude (positive).
    pub gravity: f32,
    pub external_force_damping: f32,
    pub rotation_speed_deg: f32,
    pub moving_threshold: f32,
    /// Drive lateral velocity from animation root motion instead of input.
    pub use_root_motion: bool,
    /// Surface layers considered by ground and obstacle probes.
    pub surface_mask: SurfaceMask,
    pub fault_policy: FaultPolicy,
    pub animation: AnimationDefaults,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            collider_radius: DEFAULT_COLLIDER_RADIUS,
            collider_height: DEFAULT_COLLIDER_HEIGHT,
            skin_width: DEFAULT_SKIN_WIDTH,
            platform_stickiness: DEFAULT_PLATFORM_STICKINESS,
            max_slope_deg: DEFAULT_MAX_SLOPE_DEG,
            max_step_height: DEFAULT_MAX_STEP_HEIGHT,
            step_probe_height: DEFAULT_STEP_PROBE_HEIGHT,
            step_impulse_scale: DEFAULT_STEP_IMPULSE_SCALE,
            ground_speed: DEFAULT_GROUND_SPEED,
            air_speed: DEFAULT_AIR_SPEED,
            gravity: GRAVITY_MPS2,
            external_force_damping: DEFAULT_EXTERNAL_FORCE_DAMPING,
            rotation_speed_deg: DEFAULT_ROTATION_SPEED_DEG,
            moving_threshold: DEFAULT_MOVING_THRESHOLD,
            use_root_motion: false,
            surface_mask: SurfaceMask::all(),
            fault_policy: FaultPolicy::default(),
            animation: AnimationDefaults::default(),
        }
    }
}

impl ControllerSettings {
    /// Rejects non-finite or out-of-range values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("collider_radius", self.collider_radius),
            ("collider_height", self.collider_height),
            ("skin_width", self.skin_width),
            ("platform_stickiness", self.platform_stickiness),
            ("max_slope_deg", self.max_slope_deg),
            ("max_step_height", self.max_step_height),
            ("step_probe_height", self.step_probe_height),
            ("step_impulse_scale", self.step_impulse_scale),
            ("ground_speed", self.ground_speed),
            ("air_speed", self.air_speed),
            ("gravity", self.gravity),
            ("external_force_damping", self.external_force_damping),
            ("rotation_speed_deg", self.rotation_speed_deg),
            ("moving_threshold", self.moving_threshold),
            (
                "animation.transition_duration",
                self.animation.transition_duration,
            ),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(invalid(name, "must be finite"));
            }
            if value < 0.0 {
                return Err(invalid(name, "must not be negative"));
            }
        }

        if self.collider_radius <= 0.0 {
            return Err(invalid("collider_radius", "must be positive"));
        }
        if self.collider_height < 2.0 * self.collider_radius {
            return Err(invalid(
                "collider_height",
                "must be at least twice the collider radius",
            ));
        }
        if self.max_slope_deg >= 90.0 {
            return Err(invalid("max_slope_deg", "must be below 90 degrees"));
        }
        if self.max_step_height >= self.collider_height {
            return Err(invalid(
                "max_step_height",
                "must be lower than the collider height",
            ));
        }
        if self.step_probe_height > self.max_step_height {
            return Err(invalid(
                "step_probe_height",
                "must not exceed max_step_height",
            ));
        }

        self.animation.validate()
    }
}

fn invalid(name: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidSetting {
        name,
        reason: reason.to_string(),
    }
}

/// Fallback animation states, used when no ability or item requests one.
///
/// Lower and upper body pick between idle and movement; arm and additive layers
/// have a single fixed default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationDefaults {
    pub lower_body_idle: String,
    pub lower_body_movement: String,
    pub upper_body_idle: String,
    pub upper_body_movement: String,
    pub left_arm: String,
    pub right_arm: String,
    pub additive: String,
    pub transition_duration: f32,
}

impl Default for AnimationDefaults {
    fn default() -> Self {
        Self {
            lower_body_idle: DEFAULT_IDLE_STATE.to_string(),
            lower_body_movement: DEFAULT_MOVEMENT_STATE.to_string(),
            upper_body_idle: DEFAULT_IDLE_STATE.to_string(),
            upper_body_movement: DEFAULT_MOVEMENT_STATE.to_string(),
            left_arm: DEFAULT_EMPTY_STATE.to_string(),
            right_arm: DEFAULT_EMPTY_STATE.to_string(),
            additive: DEFAULT_EMPTY_STATE.to_string(),
            transition_duration: DEFAULT_TRANSITION_DURATION,
        }
    }
}

impl AnimationDefaults {
    /// Default state name for `layer` given whether the character is moving.
    pub fn state_for(&self, layer: AnimationLayer, moving: bool) -> &str {
        match (layer, moving) {
            (AnimationLayer::LowerBody, false) => &self.lower_body_idle,
            (AnimationLayer::LowerBody, true) => &self.lower_body_movement,
            (AnimationLayer::UpperBody, false) => &self.upper_body_idle,
            (AnimationLayer::UpperBody, true) => &self.upper_body_movement,
            (AnimationLayer::LeftArm, _) => &self.left_arm,
            (AnimationLayer::RightArm, _) => &self.right_arm,
            (AnimationLayer::Additive, _) => &self.additive,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for layer in AnimationLayer::ALL {
            for moving in [false, true] {
                if self.state_for(layer, moving).is_empty() {
                    return Err(ConfigError::InvalidSetting {
                        name: "animation",
                        reason: format!("default state for {layer:?} is empty"),
                    });
                }
            }
        }
        Ok(())
    }
}
