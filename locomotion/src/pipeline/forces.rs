use crate::{
    ability::AbilityContext,
    constants::DIST_EPS,
    math::{Vec3, planar},
};

/// Share of `total` that `drive` accounts for along one axis, in [0, 1].
///
/// With no velocity on the axis everything counts as drive, so nothing survives as an
/// external push.
#[inline]
pub fn drive_fraction(drive: f32, total: f32) -> f32 {
    if total.abs() <= DIST_EPS {
        return 1.0;
    }
    (drive / total).clamp(0.0, 1.0)
}

/// Default `CheckExternalForces`.
///
/// Splits last tick's lateral velocity into the part that came from input/root motion
/// (`xPercent`, `zPercent`) and the rest, which survives as external velocity after
/// damping. Queued forces are added on top: their vertical part goes straight into
/// vertical velocity.
pub fn check_external_forces(ctx: &mut AbilityContext<'_>) {
    let damping = ctx.settings.external_force_damping;
    let dt = ctx.dt;
    let motor = &mut *ctx.motor;

    let lateral = planar(motor.velocity);
    let fx = drive_fraction(motor.drive_velocity.x, lateral.x);
    let fz = drive_fraction(motor.drive_velocity.z, lateral.z);
    motor.drive_fraction = (fx, fz);

    let surviving = Vec3::new(lateral.x * (1.0 - fx), 0.0, lateral.z * (1.0 - fz));
    let pending = std::mem::take(&mut motor.pending_force);
    motor.external_velocity = surviving / (1.0 + damping * dt.max(0.0)) + planar(pending);
    if motor.external_velocity.norm_squared() <= DIST_EPS * DIST_EPS {
        motor.external_velocity = Vec3::zeros();
    }
    motor.velocity.y += pending.y;
}
