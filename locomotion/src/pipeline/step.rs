use crate::{
    ability::AbilityContext,
    constants::DIST_EPS,
    math::{Vec3, planar, slope_deg, up},
};

/// What lies directly ahead of the feet along the move direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Obstacle {
    None,
    /// Walkable incline; ground snapping handles it.
    Ramp,
    /// Climbable ledge of the given height above the feet.
    Step(f32),
    /// Steep surface. Carries the blocking normal.
    Wall(Vec3),
    /// Taller than the max step height. Carries the blocking normal.
    TooTall(Vec3),
}

/// Forward probe at ankle height, then a probe down from above the contact.
pub fn classify_obstacle(ctx: &AbilityContext<'_>) -> Obstacle {
    let s = ctx.settings;
    let motor = &*ctx.motor;
    let Some(dir) = planar(motor.move_direction).try_normalize(DIST_EPS) else {
        return Obstacle::None;
    };

    let speed = if motor.grounded {
        s.ground_speed
    } else {
        s.air_speed
    };
    let reach = s.collider_radius + s.skin_width + speed * ctx.dt.max(0.0);
    let ankle = motor.position + up() * s.step_probe_height;
    let Some(front) = ctx.geometry.cast_ray(ankle, dir, reach, s.surface_mask) else {
        return Obstacle::None;
    };
    if slope_deg(&front.normal) <= s.max_slope_deg {
        return Obstacle::Ramp;
    }

    let probe_top = motor.position.y + s.max_step_height + s.skin_width;
    let past_edge = front.point + dir * (2.0 * s.skin_width);
    let above = Vec3::new(past_edge.x, probe_top, past_edge.z);
    let drop = s.max_step_height + s.skin_width;
    match ctx.geometry.cast_ray(above, -up(), drop, s.surface_mask) {
        Some(top) if slope_deg(&top.normal) <= s.max_slope_deg => {
            let height = top.point.y - motor.position.y;
            if height <= s.max_step_height {
                Obstacle::Step(height.max(0.0))
            } else {
                Obstacle::TooTall(front.normal)
            }
        }
        Some(_) => Obstacle::Wall(front.normal),
        None => Obstacle::TooTall(front.normal),
    }
}

/// Removes the part of `direction` that pushes into a surface with `normal`.
pub fn block_direction(direction: Vec3, normal: Vec3) -> Vec3 {
    let Some(n) = planar(normal).try_normalize(DIST_EPS) else {
        return Vec3::zeros();
    };
    let into = direction.dot(&n);
    if into < 0.0 {
        direction - n * into
    } else {
        direction
    }
}

/// Default `CheckMovement`: blocks input into walls and applies a vertical impulse on the
/// first tick a step is detected.
pub fn check_movement(ctx: &mut AbilityContext<'_>) {
    let obstacle = classify_obstacle(ctx);
    let s = ctx.settings;
    let motor = &mut *ctx.motor;

    match obstacle {
        Obstacle::Step(height) => {
            if !motor.stepping && motor.grounded {
                let impulse = (2.0 * s.gravity * height).sqrt() * s.step_impulse_scale;
                motor.velocity.y = motor.velocity.y.max(0.0) + impulse;
                log::debug!("stepping up {height:.3} m");
            }
            motor.stepping = true;
        }
        Obstacle::Wall(normal) | Obstacle::TooTall(normal) => {
            motor.move_direction = block_direction(motor.move_direction, normal);
            motor.stepping = false;
        }
        Obstacle::None | Obstacle::Ramp => motor.stepping = false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Harness, ScriptedGeometry, TestWorld};

    fn facing_box(h: &mut Harness, height: f32) {
        h.world = TestWorld::flat(0.0).with_box(
            Vec3::new(-1.0, 0.0, 0.3),
            Vec3::new(1.0, height, 2.0),
        );
        h.motor.move_direction = Vec3::z();
    }

    #[test]
    fn low_ledge_is_a_step_with_a_single_impulse() {
        let mut h = Harness::new();
        facing_box(&mut h, 0.2);
        assert!(matches!(classify_obstacle(&h.ctx()), Obstacle::Step(height) if (height - 0.2).abs() < 1.0e-4));

        check_movement(&mut h.ctx());
        assert!(h.motor.stepping);
        let expected = (2.0 * h.settings.gravity * 0.2).sqrt();
        assert!((h.motor.velocity.y - expected).abs() < 1.0e-3);

        // Still in front of the step next tick: no second impulse.
        h.motor.velocity.y = 0.0;
        check_movement(&mut h.ctx());
        assert!(h.motor.stepping);
        assert_eq!(h.motor.velocity.y, 0.0);
    }

    #[test]
    fn tall_obstacles_block_input() {
        let mut h = Harness::new();
        facing_box(&mut h, 1.5);
        h.motor.move_direction = Vec3::new(0.6, 0.0, 0.8);
        assert!(matches!(classify_obstacle(&h.ctx()), Obstacle::TooTall(_)));

        check_movement(&mut h.ctx());
        assert!(!h.motor.stepping);
        assert!(h.motor.move_direction.z.abs() < 1.0e-5);
        assert!((h.motor.move_direction.x - 0.6).abs() < 1.0e-5);
    }

    #[test]
    fn steep_tops_are_walls() {
        let mut h = Harness::new();
        h.world = TestWorld::empty();
        h.motor.move_direction = Vec3::z();
        h.scripted = Some(
            ScriptedGeometry::default()
                .ray_hit(0.5, -Vec3::z())
                .ray_hit(0.2, Vec3::new(0.0, 0.3, -1.0).normalize()),
        );
        assert!(matches!(classify_obstacle(&h.ctx()), Obstacle::Wall(_)));
    }

    #[test]
    fn nothing_ahead_or_no_input() {
        let mut h = Harness::new();
        h.motor.move_direction = Vec3::z();
        assert_eq!(classify_obstacle(&h.ctx()), Obstacle::None);

        facing_box(&mut h, 0.2);
        h.motor.move_direction = Vec3::zeros();
        assert_eq!(classify_obstacle(&h.ctx()), Obstacle::None);
    }

    #[test]
    fn moving_away_from_a_wall_is_not_blocked() {
        let away = block_direction(Vec3::z(), Vec3::z());
        assert_eq!(away, Vec3::z());
        let into = block_direction(Vec3::z(), -Vec3::z());
        assert!(into.norm() < 1.0e-6);
    }
}
