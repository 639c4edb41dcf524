//! Multi-tick "walk to a spot, then face a direction" helper used by abilities such as
//! cover, vault and interact.
//!
//! A [`MoveTowards`] is an explicit state machine polled once per tick by the controller
//! before the Move hooks run. While steering it replaces the tick input; once within
//! acceptance it turns in place; when done the owner's `on_arrived` hook fires.

use crate::{
    ability::AbilityIndex,
    config::ControllerSettings,
    constants::{DEFAULT_MOVE_TOWARDS_ACCEPTANCE, DIST_EPS, MOVE_TOWARDS_FACING_TOLERANCE_DEG},
    math::{Quat, Vec3, planar, rotate_towards},
    motor::{Motor, MoveInput},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovePhase {
    /// Still outside the acceptance radius.
    Moving,
    /// Inside the acceptance radius, turning toward the requested facing.
    Turning,
    Arrived,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveTowards {
    pub owner: AbilityIndex,
    /// Target feet position. Only the planar part is steered toward.
    pub target: Vec3,
    /// Facing to reach before arriving, if any.
    pub rotation: Option<Quat>,
    /// Travel speed (m/s), capped by the configured ground/air speed.
    pub speed: f32,
    /// Planar acceptance radius (meters).
    pub acceptance: f32,
    pub phase: MovePhase,
}

/// Result of one poll.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MovePoll {
    /// Use this input instead of the player's this tick.
    Steer(MoveInput),
    /// Stand still; the motor was rotated directly.
    Turn,
    Arrived,
}

/// Planar step toward a target, clamped to the acceptance boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanarStep {
    pub translation: Vec3,
    /// Within acceptance after applying `translation`.
    pub finished: bool,
    pub distance: f32,
}

/// Computes this tick's planar translation toward `target`, stopping on the acceptance
/// circle rather than at its center.
pub fn planar_step(
    current: Vec3,
    target: Vec3,
    speed: f32,
    dt: f32,
    acceptance: f32,
) -> PlanarStep {
    let delta = planar(target - current);
    let dist = delta.norm();
    let acc = acceptance.max(0.0);

    if dist <= acc + DIST_EPS {
        return PlanarStep {
            translation: Vec3::zeros(),
            finished: true,
            distance: dist,
        };
    }

    let max_step = speed.max(0.0) * dt.max(0.0);
    if max_step <= DIST_EPS {
        return PlanarStep {
            translation: Vec3::zeros(),
            finished: false,
            distance: dist,
        };
    }

    let to_boundary = (dist - acc).max(0.0);
    let step = to_boundary.min(max_step);
    PlanarStep {
        translation: delta / dist * step,
        finished: (to_boundary - step).abs() <= DIST_EPS,
        distance: dist,
    }
}

impl MoveTowards {
    pub fn new(owner: AbilityIndex, target: Vec3, speed: f32) -> Self {
        Self {
            owner,
            target,
            rotation: None,
            speed,
            acceptance: DEFAULT_MOVE_TOWARDS_ACCEPTANCE,
            phase: MovePhase::Moving,
        }
    }

    pub fn facing(mut self, rotation: Quat) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn with_acceptance(mut self, acceptance: f32) -> Self {
        self.acceptance = acceptance;
        self
    }

    pub fn poll(&mut self, motor: &mut Motor, settings: &ControllerSettings, dt: f32) -> MovePoll {
        if self.phase == MovePhase::Moving {
            let drive_speed = if motor.grounded {
                settings.ground_speed
            } else {
                settings.air_speed
            };
            let speed = self.speed.min(drive_speed);
            let step = planar_step(motor.position, self.target, speed, dt, self.acceptance);
            if step.distance <= self.acceptance.max(0.0) + DIST_EPS {
                self.phase = MovePhase::Turning;
            } else {
                let full = drive_speed * dt;
                let magnitude = if full > DIST_EPS {
                    (step.translation.norm() / full).min(1.0)
                } else {
                    1.0
                };
                let dir = step
                    .translation
                    .try_normalize(DIST_EPS)
                    .unwrap_or_else(Vec3::zeros)
                    * magnitude;
                // Identity look rotation makes (horizontal, forward) world X and Z.
                return MovePoll::Steer(MoveInput::new(dir.x, dir.z, Quat::identity()));
            }
        }

        if self.phase == MovePhase::Turning {
            let Some(rotation) = self.rotation else {
                self.phase = MovePhase::Arrived;
                return MovePoll::Arrived;
            };
            let max = settings.rotation_speed_deg.to_radians() * dt;
            motor.rotation = rotate_towards(&motor.rotation, &rotation, max);
            if motor.rotation.angle_to(&rotation) <= MOVE_TOWARDS_FACING_TOLERANCE_DEG.to_radians()
            {
                self.phase = MovePhase::Arrived;
                return MovePoll::Arrived;
            }
            return MovePoll::Turn;
        }

        MovePoll::Arrived
    }
}
