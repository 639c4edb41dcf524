use crate::{
    ability::AbilityContext,
    constants::GROUNDING_VERTICAL_SPEED,
    events::ControllerEvent,
    geometry::ProbeHit,
    math::{Vec3, slope_deg, up},
};

/// Result of the downward ground probe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundProbe {
    /// Feet height above the contact (negative when sunk into the surface).
    pub gap: f32,
    pub normal: Vec3,
    pub walkable: bool,
    pub hit: ProbeHit,
}

/// Sphere-casts down from above the collider footprint.
///
/// The probe starts high enough to catch ground the body sank into during the last
/// integration and reaches `skin_width` (plus platform stickiness while attached) below
/// the feet.
pub fn probe_ground(ctx: &AbilityContext<'_>) -> Option<GroundProbe> {
    let s = ctx.settings;
    let motor = &*ctx.motor;
    let fall = (-motor.velocity.y * ctx.dt).max(0.0);
    let lift = s.skin_width + fall;
    let stick = if motor.platform.is_some() {
        s.platform_stickiness
    } else {
        0.0
    };

    let origin = motor.position + up() * (s.collider_radius + lift);
    let max_dist = lift + s.skin_width + stick;
    let hit = ctx
        .geometry
        .cast_sphere(origin, s.collider_radius, -up(), max_dist, s.surface_mask)?;

    Some(GroundProbe {
        gap: hit.distance - lift,
        normal: hit.normal,
        walkable: slope_deg(&hit.normal) <= s.max_slope_deg,
        hit,
    })
}

/// Default `CheckGround`: updates grounded state, snaps onto walkable ground and tracks
/// fall height. Events fire only when the grounded state changes.
pub fn check_ground(ctx: &mut AbilityContext<'_>) {
    let probe = probe_ground(ctx);
    let rising = ctx.motor.velocity.y > GROUNDING_VERTICAL_SPEED;
    let grounded = !rising && probe.is_some_and(|p| p.walkable);

    let motor = &mut *ctx.motor;
    match probe {
        Some(p) if grounded => {
            motor.position.y -= p.gap;
            motor.ground_normal = p.normal;
            motor.ground_layer = Some(p.hit.layer);
            motor.ground_platform = p.hit.platform;
        }
        _ => {
            motor.ground_normal = up();
            motor.ground_layer = None;
            motor.ground_platform = None;
        }
    }

    if grounded == motor.grounded {
        if !grounded {
            motor.max_height = motor.max_height.max(motor.position.y);
        }
        return;
    }

    motor.grounded = grounded;
    let fall_height = if grounded {
        let fall = (motor.max_height - motor.position.y).max(0.0);
        motor.last_fall_height = fall;
        log::debug!("landed after falling {fall:.3} m");
        fall
    } else {
        motor.max_height = motor.position.y;
        log::debug!("left the ground at y={:.3}", motor.position.y);
        0.0
    };
    ctx.emit(ControllerEvent::Grounded {
        grounded,
        fall_height,
    });
}
