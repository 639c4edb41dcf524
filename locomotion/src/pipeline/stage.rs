use crate::ability::{Ability, AbilityContext, HookResult};

use super::{animator, collider, forces, ground, platform, rotation, step, surface, velocity};

/// The fixed per-tick stage sequence, in execution order.
///
/// At each stage the active abilities are offered the hook in priority order; the first
/// claim replaces the built-in default for that tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    CheckGround,
    CheckExternalForces,
    CheckMovement,
    SetSurfaceMaterial,
    UpdateVelocity,
    UpdatePlatform,
    UpdateRotation,
    PushAnimatorParameters,
    ApplyAnimatorRootMotion,
    UpdateCollider,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 10] = [
        PipelineStage::CheckGround,
        PipelineStage::CheckExternalForces,
        PipelineStage::CheckMovement,
        PipelineStage::SetSurfaceMaterial,
        PipelineStage::UpdateVelocity,
        PipelineStage::UpdatePlatform,
        PipelineStage::UpdateRotation,
        PipelineStage::PushAnimatorParameters,
        PipelineStage::ApplyAnimatorRootMotion,
        PipelineStage::UpdateCollider,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PipelineStage::CheckGround => "CheckGround",
            PipelineStage::CheckExternalForces => "CheckExternalForces",
            PipelineStage::CheckMovement => "CheckMovement",
            PipelineStage::SetSurfaceMaterial => "SetSurfaceMaterial",
            PipelineStage::UpdateVelocity => "UpdateVelocity",
            PipelineStage::UpdatePlatform => "UpdatePlatform",
            PipelineStage::UpdateRotation => "UpdateRotation",
            PipelineStage::PushAnimatorParameters => "PushAnimatorParameters",
            PipelineStage::ApplyAnimatorRootMotion => "ApplyAnimatorRootMotion",
            PipelineStage::UpdateCollider => "UpdateCollider",
        }
    }

    /// Calls the ability's hook for this stage.
    pub(crate) fn invoke(self, ability: &mut dyn Ability, ctx: &mut AbilityContext<'_>) -> HookResult {
        match self {
            PipelineStage::CheckGround => ability.check_ground(ctx),
            PipelineStage::CheckExternalForces => ability.check_external_forces(ctx),
            PipelineStage::CheckMovement => ability.check_movement(ctx),
            PipelineStage::SetSurfaceMaterial => ability.set_surface_material(ctx),
            PipelineStage::UpdateVelocity => ability.update_velocity(ctx),
            PipelineStage::UpdatePlatform => ability.update_platform(ctx),
            PipelineStage::UpdateRotation => ability.update_rotation(ctx),
            PipelineStage::PushAnimatorParameters => ability.push_animator_parameters(ctx),
            PipelineStage::ApplyAnimatorRootMotion => ability.apply_animator_root_motion(ctx),
            PipelineStage::UpdateCollider => ability.update_collider(ctx),
        }
    }

    /// Built-in behavior when no ability claims the stage.
    pub(crate) fn run_default(self, ctx: &mut AbilityContext<'_>) {
        match self {
            PipelineStage::CheckGround => ground::check_ground(ctx),
            PipelineStage::CheckExternalForces => forces::check_external_forces(ctx),
            PipelineStage::CheckMovement => step::check_movement(ctx),
            PipelineStage::SetSurfaceMaterial => surface::set_surface_material(ctx),
            PipelineStage::UpdateVelocity => velocity::update_velocity(ctx),
            PipelineStage::UpdatePlatform => platform::update_platform(ctx),
            PipelineStage::UpdateRotation => rotation::update_rotation(ctx),
            PipelineStage::PushAnimatorParameters => animator::push_parameters(ctx),
            PipelineStage::ApplyAnimatorRootMotion => animator::apply_root_motion(ctx),
            PipelineStage::UpdateCollider => collider::update_collider(ctx),
        }
    }
}
