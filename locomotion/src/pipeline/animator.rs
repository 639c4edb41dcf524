use crate::{
    ability::AbilityContext,
    animation::AnimatorParameters,
    math::yaw_of,
};

pub fn parameters(ctx: &AbilityContext<'_>) -> AnimatorParameters {
    let motor = &*ctx.motor;
    AnimatorParameters {
        horizontal: ctx.input.horizontal,
        forward: ctx.input.forward,
        speed: motor.planar_speed(),
        yaw: yaw_of(&motor.rotation),
        moving: motor.moving,
        grounded: motor.grounded,
        aiming: motor.aiming,
        ability_index: ctx.lead.map(|(index, _)| index),
        ability_int_data: ctx.lead.map_or(0, |(_, data)| data),
        height: motor.collider_height,
    }
}

/// Default `PushAnimatorParameters`.
pub fn push_parameters(ctx: &mut AbilityContext<'_>) {
    let parameters = parameters(ctx);
    ctx.animator.set_parameters(&parameters);
}

/// Default `ApplyAnimatorRootMotion`: pulls this tick's root-motion deltas. They drive
/// velocity and rotation on the next tick.
pub fn apply_root_motion(ctx: &mut AbilityContext<'_>) {
    let root_motion = ctx.animator.root_motion();
    let motor = &mut *ctx.motor;
    motor.prev_root_motion_delta = motor.root_motion_delta;
    motor.root_motion_delta = root_motion.position;
    motor.root_motion_rotation = root_motion.rotation;
}
