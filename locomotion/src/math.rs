//! Math aliases and small planar helpers.
//!
//! Conventions: +Y is up, local forward is +Z and local right is +X.

use nalgebra as na;

use crate::constants::DIST_EPS;

pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

#[inline]
pub fn up() -> Vec3 {
    Vec3::y()
}

/// Drops the vertical component.
#[inline]
pub fn planar(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Yaw (radians about +Y) of a rotation's forward axis.
#[inline]
pub fn yaw_of(rotation: &Quat) -> f32 {
    let forward = rotation * Vec3::z();
    forward.x.atan2(forward.z)
}

/// Yaw-only rotation that keeps only the heading of `rotation`.
#[inline]
pub fn yaw_rotation(rotation: &Quat) -> Quat {
    Quat::from_axis_angle(&Vec3::y_axis(), yaw_of(rotation))
}

/// Yaw-only rotation facing the planar direction `delta`.
///
/// Returns `None` if the planar part of `delta` is too small to define a heading.
#[inline]
pub fn facing_from_planar(delta: Vec3) -> Option<Quat> {
    let flat = planar(delta);
    if flat.norm_squared() <= DIST_EPS * DIST_EPS {
        return None;
    }
    let yaw = flat.x.atan2(flat.z);
    Some(Quat::from_axis_angle(&Vec3::y_axis(), yaw))
}

/// Angle (degrees) between a surface normal and +Y.
#[inline]
pub fn slope_deg(normal: &Vec3) -> f32 {
    let len = normal.norm();
    if len <= DIST_EPS {
        return 90.0;
    }
    (normal.y / len).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Rotates `from` toward `to` by at most `max_radians`.
#[inline]
pub fn rotate_towards(from: &Quat, to: &Quat, max_radians: f32) -> Quat {
    let angle = from.angle_to(to);
    if angle <= max_radians.max(0.0) || angle <= f32::EPSILON {
        return *to;
    }
    from.slerp(to, max_radians.max(0.0) / angle)
}
