use crate::{ability::AbilityContext, motor::SurfaceMaterial};

/// Default `SetSurfaceMaterial`: picks the friction profile from grounded and moving state.
pub fn set_surface_material(ctx: &mut AbilityContext<'_>) {
    let motor = &mut *ctx.motor;
    motor.surface_material = match (motor.grounded, motor.moving) {
        (false, _) => SurfaceMaterial::Airborne,
        (true, true) => SurfaceMaterial::Moving,
        (true, false) => SurfaceMaterial::Idle,
    };
}
