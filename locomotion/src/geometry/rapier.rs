//! Rapier-backed [`GeometryQuery`] over a static world.
//!
//! Design goals
//! - Deterministic: given the same inputs (sorted by `id`), build identical in-memory sets.
//! - Query-only: no dynamics are stepped. Platforms are moved explicitly with
//!   [`RapierGeometry::set_pose`].
//!
//! # Surface tags
//! Each collider's `user_data` (u128) carries its classification:
//!
//! - bits 0..=31  : platform id (u32)
//! - bit  32      : set when the collider is a platform
//! - bits 40..=47 : [`SurfaceLayer`] tag (u8)
//! - bits 48..    : reserved (zero)

use fxhash::FxHashMap;
use rapier3d::parry::query::{Ray, ShapeCastOptions};
use rapier3d::parry::shape::Ball;
use rapier3d::prelude::{
    BroadPhaseBvh, Collider, ColliderBuilder, ColliderHandle, ColliderSet, HalfSpace,
    IntegrationParameters, NarrowPhase, QueryFilter, QueryPipeline, RigidBodySet, SharedShape,
};

use super::types::{GeometryQuery, PlatformId, ProbeHit, SurfaceLayer, SurfaceMask};
use crate::math::{Iso, Quat, Vec3};

/// Canonical, schema-agnostic definition of a world collider.
#[derive(Clone, Debug)]
pub struct WorldStaticDef {
    /// Stable unique identifier used to ensure deterministic insertion order.
    pub id: u32,
    /// World-space translation.
    pub translation: Vec3,
    /// World-space rotation.
    pub rotation: Quat,
    pub shape: ColliderShapeDef,
    pub layer: SurfaceLayer,
    /// Marks the collider as a rideable platform.
    pub platform: Option<PlatformId>,
}

impl WorldStaticDef {
    pub fn new(id: u32, translation: Vec3, shape: ColliderShapeDef) -> Self {
        Self {
            id,
            translation,
            rotation: Quat::identity(),
            shape,
            layer: SurfaceLayer::Default,
            platform: None,
        }
    }

    pub fn as_platform(mut self, platform: PlatformId) -> Self {
        self.layer = SurfaceLayer::Platform;
        self.platform = Some(platform);
        self
    }

    fn pose(&self) -> Iso {
        Iso::from_parts(self.translation.into(), self.rotation)
    }
}

/// Supported collider shapes.
#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Infinite plane (half-space). The normal is `rotation * +Y`; the plane passes through
    /// `translation` shifted by `offset_along_normal`.
    Plane { offset_along_normal: f32 },

    /// Oriented cuboid with given half-extents (meters).
    Cuboid { half_extents: Vec3 },

    Sphere { radius: f32 },

    /// Y-aligned capsule (meters).
    CapsuleY { radius: f32, half_height: f32 },

    /// Y-aligned cylinder (meters).
    CylinderY { radius: f32, half_height: f32 },
}

const PLATFORM_FLAG: u128 = 1 << 32;
const LAYER_SHIFT: u32 = 40;

fn pack_surface(layer: SurfaceLayer, platform: Option<PlatformId>) -> u128 {
    let mut data = (layer as u128) << LAYER_SHIFT;
    if let Some(id) = platform {
        data |= id as u128 | PLATFORM_FLAG;
    }
    data
}

fn unpack_layer(data: u128) -> Option<SurfaceLayer> {
    SurfaceLayer::from_tag(((data >> LAYER_SHIFT) & u8::MAX as u128) as u8)
}

fn unpack_platform(data: u128) -> Option<PlatformId> {
    if data & PLATFORM_FLAG == 0 {
        return None;
    }
    Some((data & u32::MAX as u128) as PlatformId)
}

/// Build a Rapier collider (identity local transform) from a definition.
fn collider_from_def(def: &WorldStaticDef) -> Collider {
    let builder = match &def.shape {
        ColliderShapeDef::Plane { .. } => {
            ColliderBuilder::new(SharedShape::new(HalfSpace::new(Vec3::y_axis())))
        }
        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }
        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius),
        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius),
        ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => ColliderBuilder::cylinder(*half_height, *radius),
    };

    builder
        .user_data(pack_surface(def.layer, def.platform))
        .build()
}

fn collider_pose(def: &WorldStaticDef) -> Iso {
    match def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => {
            let normal = def.rotation * Vec3::y();
            Iso::from_parts(
                (def.translation + normal * offset_along_normal).into(),
                def.rotation,
            )
        }
        _ => def.pose(),
    }
}

/// In-memory rapier structures needed for scene queries.
pub struct RapierGeometry {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    handles: FxHashMap<u32, ColliderHandle>,
}

impl RapierGeometry {
    /// Build a query world. Definitions are inserted in ascending `id` order.
    pub fn build(defs: impl IntoIterator<Item = WorldStaticDef>) -> Self {
        let mut defs: Vec<WorldStaticDef> = defs.into_iter().collect();
        defs.sort_by_key(|d| d.id);

        let bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();
        let mut handles = FxHashMap::with_capacity_and_hasher(defs.len(), Default::default());
        let mut modified = Vec::with_capacity(defs.len());

        for def in &defs {
            let mut collider = collider_from_def(def);
            collider.set_position(collider_pose(def));
            let handle = colliders.insert(collider);
            handles.insert(def.id, handle);
            modified.push(handle);
        }

        let mut geometry = Self {
            bodies,
            colliders,
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::default(),
            handles,
        };
        geometry.refresh(&modified);
        geometry
    }

    /// Moves a collider (typically a platform). Returns `false` for an unknown id.
    pub fn set_pose(&mut self, id: u32, pose: Iso) -> bool {
        let Some(&handle) = self.handles.get(&id) else {
            return false;
        };
        let Some(collider) = self.colliders.get_mut(handle) else {
            return false;
        };
        collider.set_position(pose);
        self.refresh(&[handle]);
        true
    }

    fn refresh(&mut self, modified: &[ColliderHandle]) {
        let mut events = Vec::new();
        self.broad_phase.update(
            &IntegrationParameters::default(),
            &self.colliders,
            &self.bodies,
            modified,
            &[],
            &mut events,
        );
    }

    fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }

    fn classify(&self, handle: ColliderHandle) -> (SurfaceLayer, Option<PlatformId>) {
        let data = self
            .colliders
            .get(handle)
            .map(|c| c.user_data)
            .unwrap_or_default();
        (
            unpack_layer(data).unwrap_or(SurfaceLayer::Default),
            unpack_platform(data),
        )
    }
}

fn layer_accepted(mask: SurfaceMask, collider: &Collider) -> bool {
    unpack_layer(collider.user_data).is_some_and(|layer| mask.contains(layer))
}

impl GeometryQuery for RapierGeometry {
    fn cast_ray(
        &self,
        origin: Vec3,
        dir: Vec3,
        max_dist: f32,
        mask: SurfaceMask,
    ) -> Option<ProbeHit> {
        if mask.is_empty() || max_dist <= 0.0 {
            return None;
        }
        let accept = |_: ColliderHandle, collider: &Collider| layer_accepted(mask, collider);
        let pipeline = self.query_pipeline(QueryFilter::default().predicate(&accept));

        let ray = Ray::new(origin.into(), dir);
        let (handle, hit) = pipeline.cast_ray_and_get_normal(&ray, max_dist, true)?;
        let (layer, platform) = self.classify(handle);
        Some(ProbeHit {
            point: origin + dir * hit.time_of_impact,
            normal: hit.normal,
            distance: hit.time_of_impact,
            layer,
            platform,
        })
    }

    fn cast_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        dir: Vec3,
        max_dist: f32,
        mask: SurfaceMask,
    ) -> Option<ProbeHit> {
        if mask.is_empty() || max_dist < 0.0 || radius <= 0.0 {
            return None;
        }
        let accept = |_: ColliderHandle, collider: &Collider| layer_accepted(mask, collider);
        let pipeline = self.query_pipeline(QueryFilter::default().predicate(&accept));

        let ball = Ball::new(radius);
        let pose = Iso::translation(origin.x, origin.y, origin.z);
        let options = ShapeCastOptions::with_max_time_of_impact(max_dist);
        let (handle, hit) = pipeline.cast_shape(&pose, &dir, &ball, options)?;

        // The ball is unrotated, so its local contact normal is also world-space.
        let toward_contact = hit.normal2.into_inner();
        let center = origin + dir * hit.time_of_impact;
        let (layer, platform) = self.classify(handle);
        Some(ProbeHit {
            point: center + toward_contact * radius,
            normal: -toward_contact,
            distance: hit.time_of_impact,
            layer,
            platform,
        })
    }
}
