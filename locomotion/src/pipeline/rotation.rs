use crate::{
    ability::AbilityContext,
    math::{facing_from_planar, rotate_towards, yaw_rotation},
};

/// Default `UpdateRotation`.
///
/// Applies the root-motion rotation when root motion drives the character, then turns
/// toward the look heading while aiming or toward the move direction otherwise, limited by
/// the configured rotation speed.
pub fn update_rotation(ctx: &mut AbilityContext<'_>) {
    let s = ctx.settings;
    let look = ctx.input.look_rotation;
    let max = s.rotation_speed_deg.to_radians() * ctx.dt.max(0.0);
    let motor = &mut *ctx.motor;

    if motor.uses_root_motion(s) {
        motor.rotation = motor.root_motion_rotation * motor.rotation;
    }

    let target = if motor.aiming {
        Some(yaw_rotation(&look))
    } else {
        facing_from_planar(motor.move_direction)
    };
    if let Some(target) = target {
        motor.rotation = rotate_towards(&motor.rotation, &target, max);
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;
    use crate::{
        math::{Quat, Vec3, yaw_of},
        motor::MoveInput,
        testing::Harness,
    };

    #[test]
    fn turns_toward_movement_at_limited_speed() {
        let mut h = Harness::new();
        h.motor.move_direction = Vec3::x();
        update_rotation(&mut h.ctx());
        let step = h.settings.rotation_speed_deg.to_radians() * h.dt;
        assert!((yaw_of(&h.motor.rotation) - step).abs() < 1.0e-4);

        for _ in 0..60 {
            update_rotation(&mut h.ctx());
        }
        assert!((yaw_of(&h.motor.rotation) - FRAC_PI_2).abs() < 1.0e-4);
    }

    #[test]
    fn aiming_faces_the_look_heading() {
        let mut h = Harness::new();
        h.motor.aiming = true;
        h.motor.move_direction = Vec3::x();
        let look = Quat::from_axis_angle(&Vec3::y_axis(), -0.1)
            * Quat::from_axis_angle(&Vec3::x_axis(), 0.4);
        h.input = MoveInput::idle(look);
        update_rotation(&mut h.ctx());
        assert!((yaw_of(&h.motor.rotation) + 0.1).abs() < 1.0e-4);
    }

    #[test]
    fn root_motion_rotation_is_applied() {
        let mut h = Harness::new();
        h.settings.use_root_motion = true;
        h.motor.root_motion_rotation = Quat::from_axis_angle(&Vec3::y_axis(), 0.05);
        update_rotation(&mut h.ctx());
        assert!((yaw_of(&h.motor.rotation) - 0.05).abs() < 1.0e-5);
    }
}
