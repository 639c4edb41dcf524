pub mod ability;
pub mod animation;
pub mod bitmask_flags;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod geometry;
pub mod math;
pub mod motor;
pub mod move_towards;
pub mod pipeline;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

pub use ability::{
    Ability, AbilityArbitrator, AbilityContext, AbilityIndex, AbilityKind, CharacterView,
    HookResult, Trigger,
};
pub use animation::{
    AnimationLayer, AnimationLayerResolver, AnimationPlayer, AnimatorParameters, Crossfade,
    ItemStates, LayerMask, NoItems, RootMotion, StateId, StateRequest,
};
pub use config::{AnimationDefaults, ControllerSettings};
pub use error::{AbilityError, ConfigError, FaultPolicy, StartRejection};
pub use events::ControllerEvent;
pub use geometry::{
    GeometryQuery, NoGeometry, PlatformId, ProbeHit, RapierGeometry, SurfaceLayer, SurfaceMask,
    WorldStaticDef,
};
pub use math::{Iso, Quat, Vec3};
pub use motor::{Motor, MoveInput, SurfaceMaterial};
pub use pipeline::{CharacterController, Collaborators, PipelineStage};
pub use scheduler::{TimerHandle, TimerKey};
