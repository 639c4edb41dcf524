use crate::{ability::AbilityContext, constants::DIST_EPS, events::ControllerEvent};

/// Default `UpdateCollider`: the collider takes the active height override, or the
/// configured standing height when none is set.
pub fn update_collider(ctx: &mut AbilityContext<'_>) {
    let target = ctx
        .motor
        .overrides
        .collider_height()
        .unwrap_or(ctx.settings.collider_height);
    if (ctx.motor.collider_height - target).abs() <= DIST_EPS {
        return;
    }
    ctx.motor.collider_height = target;
    log::debug!("collider resized to {target:.3} m");
    ctx.emit(ControllerEvent::ColliderResized { height: target });
}
