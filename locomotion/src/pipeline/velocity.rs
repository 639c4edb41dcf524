use crate::{
    ability::AbilityContext,
    math::{Vec3, planar},
};

/// Default `UpdateVelocity`.
///
/// Lateral velocity is the surviving external velocity plus the drive: root motion when
/// enabled (by settings or by an active ability), input times ground/air speed otherwise.
/// Root-motion velocity is updated from the change in per-tick delta, so a constant-speed
/// clip yields constant velocity. Vertical velocity is zeroed on the ground and
/// integrates gravity in the air.
pub fn update_velocity(ctx: &mut AbilityContext<'_>) {
    let s = ctx.settings;
    let dt = ctx.dt;
    let motor = &mut *ctx.motor;

    let drive = if motor.uses_root_motion(s) {
        if dt > 0.0 {
            motor.root_motion_velocity +=
                planar(motor.root_motion_delta - motor.prev_root_motion_delta) / dt;
        }
        // Each delta change is applied once, even if the root-motion pull is claimed.
        motor.prev_root_motion_delta = motor.root_motion_delta;
        motor.root_motion_velocity
    } else {
        // Track the clip so switching root motion on later starts from the right speed.
        if dt > 0.0 {
            motor.root_motion_velocity = planar(motor.root_motion_delta) / dt;
        }
        motor.prev_root_motion_delta = motor.root_motion_delta;
        let speed = if motor.grounded {
            s.ground_speed
        } else {
            s.air_speed
        };
        planar(motor.move_direction) * speed
    };
    motor.drive_velocity = drive;

    let lateral = motor.external_velocity + drive;
    let vertical = if motor.grounded && motor.velocity.y <= 0.0 {
        0.0
    } else {
        motor.velocity.y - s.gravity * dt
    };
    motor.velocity = Vec3::new(lateral.x, vertical, lateral.z);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;

    #[test]
    fn manual_drive_uses_ground_and_air_speed() {
        let mut h = Harness::new();
        h.motor.move_direction = Vec3::new(0.0, 0.0, 0.5);
        update_velocity(&mut h.ctx());
        assert_eq!(h.motor.velocity, Vec3::new(0.0, 0.0, 2.0));
        assert_eq!(h.motor.drive_velocity, Vec3::new(0.0, 0.0, 2.0));

        h.motor.grounded = false;
        h.motor.velocity.y = 0.0;
        update_velocity(&mut h.ctx());
        assert!((h.motor.velocity.z - 0.75).abs() < 1.0e-6);
        assert!(h.motor.velocity.y < 0.0);
    }

    #[test]
    fn constant_root_motion_gives_constant_velocity() {
        let mut h = Harness::new();
        h.settings.use_root_motion = true;
        let per_tick = Vec3::new(0.0, 0.0, 0.05);

        let mut speeds = Vec::new();
        for _ in 0..4 {
            h.motor.prev_root_motion_delta = h.motor.root_motion_delta;
            h.motor.root_motion_delta = per_tick;
            update_velocity(&mut h.ctx());
            speeds.push(h.motor.velocity.z);
        }
        let expected = 0.05 / h.dt;
        for speed in speeds {
            assert!((speed - expected).abs() < 1.0e-3);
        }
    }

    #[test]
    fn unchanged_root_motion_delta_adds_nothing() {
        let mut h = Harness::new();
        h.settings.use_root_motion = true;
        h.motor.root_motion_delta = Vec3::new(0.0, 0.0, 0.05);
        update_velocity(&mut h.ctx());
        let first = h.motor.velocity.z;

        // No pull in between: the same delta is seen again.
        for _ in 0..5 {
            update_velocity(&mut h.ctx());
            assert!((h.motor.velocity.z - first).abs() < 1.0e-4);
        }
        assert_eq!(h.motor.prev_root_motion_delta, h.motor.root_motion_delta);
    }

    #[test]
    fn external_velocity_adds_to_the_drive() {
        let mut h = Harness::new();
        h.motor.external_velocity = Vec3::new(3.0, 0.0, 0.0);
        h.motor.move_direction = Vec3::z();
        update_velocity(&mut h.ctx());
        assert_eq!(h.motor.velocity, Vec3::new(3.0, 0.0, 4.0));
        assert_eq!(h.motor.drive_velocity, Vec3::new(0.0, 0.0, 4.0));
    }

    #[test]
    fn upward_velocity_survives_on_the_ground() {
        let mut h = Harness::new();
        h.motor.velocity.y = 2.0;
        update_velocity(&mut h.ctx());
        assert!(h.motor.velocity.y > 1.8 && h.motor.velocity.y < 2.0);
    }
}
