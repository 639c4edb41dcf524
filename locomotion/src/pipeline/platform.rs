use nalgebra as na;

use crate::{
    ability::AbilityContext,
    events::ControllerEvent,
    geometry::PlatformId,
    math::Iso,
    motor::{Motor, PlatformAttachment},
};

/// Default `UpdatePlatform`: carries the character rigidly with the platform it stands on
/// by re-applying the cached platform-local pose to the platform's latest world pose.
pub fn update_platform(ctx: &mut AbilityContext<'_>) {
    let motor = &mut *ctx.motor;
    let Some(attachment) = motor.platform else {
        return;
    };
    let Some(pose) = ctx.platforms.get(attachment.id) else {
        return;
    };
    let world = pose * na::Point3::from(attachment.local_position);
    motor.position = world.coords;
    motor.rotation = pose.rotation * attachment.local_rotation;
}

fn attachment_for(motor: &Motor, id: PlatformId, pose: &Iso) -> PlatformAttachment {
    let local = pose.inverse_transform_point(&na::Point3::from(motor.position));
    PlatformAttachment {
        id,
        local_position: local.coords,
        local_rotation: pose.rotation.inverse() * motor.rotation,
    }
}

/// Recomputes the platform attachment after integration. Attaches while grounded on a
/// platform with a known pose and emits `PlatformChanged` when the platform changes.
pub fn refresh_attachment(ctx: &mut AbilityContext<'_>) {
    let motor = &mut *ctx.motor;
    let target = motor
        .ground_platform
        .filter(|_| motor.grounded)
        .and_then(|id| ctx.platforms.get(id).map(|pose| (id, pose)));

    let previous = motor.platform.map(|a| a.id);
    motor.platform = target.map(|(id, pose)| attachment_for(motor, id, pose));
    let current = motor.platform.map(|a| a.id);

    if previous != current {
        match current {
            Some(id) => log::debug!("attached to platform {id}"),
            None => log::debug!("detached from platform"),
        }
        ctx.emit(ControllerEvent::PlatformChanged { platform: current });
    }
}
