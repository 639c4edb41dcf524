/*!
Geometry queries consumed by the locomotion pipeline.

The pipeline never talks to a physics engine directly. Ground, step and wall
checks go through the [`GeometryQuery`] trait, which returns plain
[`ProbeHit`]s. Two implementations ship with the crate:

- types:  the trait, hit data, and surface classification (layers + platforms)
- rapier: a static rapier scene built from [`WorldStaticDef`] rows

A probe that finds nothing (including one whose mask matches no layer) is not
an error. Callers run their default branch instead.
*/

pub mod rapier;
pub mod types;

pub use rapier::{ColliderShapeDef, RapierGeometry, WorldStaticDef};
pub use types::{
    GeometryQuery, NoGeometry, PlatformId, PlatformPoses, ProbeHit, SurfaceLayer, SurfaceMask,
};
