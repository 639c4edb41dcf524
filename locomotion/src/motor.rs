//! Physical state of the character, owned by the controller and mutated by pipeline stages.

use crate::{
    ability::AbilityIndex,
    config::ControllerSettings,
    geometry::{PlatformId, SurfaceLayer},
    math::{Quat, Vec3, planar, yaw_rotation},
};

/// Per-tick movement input from the input collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveInput {
    /// Strafe input in [-1, 1].
    pub horizontal: f32,
    /// Forward input in [-1, 1].
    pub forward: f32,
    /// Camera/look rotation. Only its heading steers movement.
    pub look_rotation: Quat,
}

impl Default for MoveInput {
    fn default() -> Self {
        Self::idle(Quat::identity())
    }
}

impl MoveInput {
    pub fn new(horizontal: f32, forward: f32, look_rotation: Quat) -> Self {
        Self {
            horizontal: horizontal.clamp(-1.0, 1.0),
            forward: forward.clamp(-1.0, 1.0),
            look_rotation,
        }
    }

    pub fn idle(look_rotation: Quat) -> Self {
        Self {
            horizontal: 0.0,
            forward: 0.0,
            look_rotation,
        }
    }

    /// Input magnitude, capped at 1.
    pub fn magnitude(&self) -> f32 {
        (self.horizontal * self.horizontal + self.forward * self.forward)
            .sqrt()
            .min(1.0)
    }

    /// World-space planar direction scaled by [`magnitude`](Self::magnitude).
    pub fn world_direction(&self) -> Vec3 {
        let local = Vec3::new(self.horizontal, 0.0, self.forward);
        let len = local.norm();
        if len <= f32::EPSILON {
            return Vec3::zeros();
        }
        let scaled = local * (self.magnitude() / len);
        planar(yaw_rotation(&self.look_rotation) * scaled)
    }
}

/// Friction profile the physics collaborator should apply to the collider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SurfaceMaterial {
    /// Grounded and still: high friction so the character doesn't slide.
    #[default]
    Idle,
    /// Grounded and moving: frictionless so velocity is not fought.
    Moving,
    Airborne,
}

/// Where the character stands on a moving platform, in the platform's frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlatformAttachment {
    pub id: PlatformId,
    pub local_position: Vec3,
    pub local_rotation: Quat,
}

/// Motor settings an active ability has taken over.
///
/// Each override records its owner so that stopping the ability reverts it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotorOverrides {
    pub root_motion: Option<AbilityIndex>,
    pub kinematic: Option<AbilityIndex>,
    pub collider_height: Option<(AbilityIndex, f32)>,
}

impl MotorOverrides {
    /// Drops every override owned by `owner`. Returns whether anything was released.
    pub fn release(&mut self, owner: AbilityIndex) -> bool {
        let mut released = false;
        if self.root_motion == Some(owner) {
            self.root_motion = None;
            released = true;
        }
        if self.kinematic == Some(owner) {
            self.kinematic = None;
            released = true;
        }
        if matches!(self.collider_height, Some((o, _)) if o == owner) {
            self.collider_height = None;
            released = true;
        }
        released
    }

    pub fn collider_height(&self) -> Option<f32> {
        self.collider_height.map(|(_, h)| h)
    }

    pub fn is_empty(&self) -> bool {
        *self == MotorOverrides::default()
    }
}

#[derive(Clone, Debug)]
pub struct Motor {
    /// Feet position (bottom of the collider), world space.
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,

    pub grounded: bool,
    pub ground_normal: Vec3,
    pub ground_layer: Option<SurfaceLayer>,
    pub ground_platform: Option<PlatformId>,

    pub moving: bool,
    pub aiming: bool,
    /// Set while climbing a detected step; the step impulse fires on the rising edge.
    pub stepping: bool,

    /// World-space planar input direction for this tick (magnitude <= 1).
    pub move_direction: Vec3,

    /// Host-controlled kinematic flag (e.g. during a cinematic).
    pub kinematic: bool,
    pub overrides: MotorOverrides,

    pub collider_height: f32,
    pub surface_material: SurfaceMaterial,

    /// Lateral velocity not produced by input or root motion (pushes, explosions).
    pub external_velocity: Vec3,
    /// Forces queued since the last tick, applied as an instantaneous velocity change.
    pub pending_force: Vec3,
    /// Fractions of the lateral velocity along X and Z that came from the drive last tick.
    pub drive_fraction: (f32, f32),
    /// Lateral velocity contributed by input or root motion last tick.
    pub drive_velocity: Vec3,

    pub root_motion_velocity: Vec3,
    pub root_motion_delta: Vec3,
    pub prev_root_motion_delta: Vec3,
    pub root_motion_rotation: Quat,

    /// Highest point reached since leaving the ground.
    pub max_height: f32,
    pub last_fall_height: f32,

    pub platform: Option<PlatformAttachment>,
}

impl Motor {
    /// A motor standing at `position`.
    pub fn new(position: Vec3, rotation: Quat, settings: &ControllerSettings) -> Self {
        Self {
            position,
            rotation,
            velocity: Vec3::zeros(),
            grounded: true,
            ground_normal: Vec3::y(),
            ground_layer: None,
            ground_platform: None,
            moving: false,
            aiming: false,
            stepping: false,
            move_direction: Vec3::zeros(),
            kinematic: false,
            overrides: MotorOverrides::default(),
            collider_height: settings.collider_height,
            surface_material: SurfaceMaterial::Idle,
            external_velocity: Vec3::zeros(),
            pending_force: Vec3::zeros(),
            drive_fraction: (1.0, 1.0),
            drive_velocity: Vec3::zeros(),
            root_motion_velocity: Vec3::zeros(),
            root_motion_delta: Vec3::zeros(),
            prev_root_motion_delta: Vec3::zeros(),
            root_motion_rotation: Quat::identity(),
            max_height: position.y,
            last_fall_height: 0.0,
            platform: None,
        }
    }

    pub fn uses_root_motion(&self, settings: &ControllerSettings) -> bool {
        settings.use_root_motion || self.overrides.root_motion.is_some()
    }

    pub fn is_kinematic(&self) -> bool {
        self.kinematic || self.overrides.kinematic.is_some()
    }

    pub fn planar_speed(&self) -> f32 {
        planar(self.velocity).norm()
    }

    pub fn add_force(&mut self, force: Vec3) {
        self.pending_force += force;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_direction_follows_look_heading() {
        let look = Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2);
        let dir = MoveInput::new(0.0, 1.0, look).world_direction();
        assert!((dir - Vec3::x()).norm() < 1.0e-5);

        // Pitch doesn't tilt the movement plane.
        let pitched = look * Quat::from_axis_angle(&Vec3::x_axis(), 0.5);
        let dir = MoveInput::new(0.0, 1.0, pitched).world_direction();
        assert!(dir.y.abs() < 1.0e-5);
        assert!((dir.norm() - 1.0).abs() < 1.0e-5);
    }

    #[test]
    fn diagonal_input_is_capped_at_unit_length() {
        let input = MoveInput::new(1.0, 1.0, Quat::identity());
        assert!((input.magnitude() - 1.0).abs() < 1.0e-6);
        assert!((input.world_direction().norm() - 1.0).abs() < 1.0e-5);
        assert_eq!(MoveInput::new(3.0, -2.0, Quat::identity()).forward, -1.0);
    }

    #[test]
    fn releasing_overrides_only_touches_the_owner() {
        let mut overrides = MotorOverrides {
            root_motion: Some(1),
            kinematic: Some(2),
            collider_height: Some((1, 1.0)),
        };
        assert!(overrides.release(1));
        assert_eq!(overrides.root_motion, None);
        assert_eq!(overrides.collider_height(), None);
        assert_eq!(overrides.kinematic, Some(2));
        assert!(!overrides.release(1));
        assert!(overrides.release(2));
        assert!(overrides.is_empty());
    }
}
