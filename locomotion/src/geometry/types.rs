//! Probe results and surface classification.

use fxhash::FxHashMap;

use crate::{
    bitmask_flags::{BitmaskFlags, FlagBitmask},
    math::{Iso, Vec3},
};

/// Identifier of a moving platform the character can ride.
pub type PlatformId = u32;

/// Layer classification of a surface. The discriminant is the bit index in a [`SurfaceMask`].
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceLayer {
    Default = 0,
    Platform = 1,
    Water = 2,
    Character = 3,
    Trigger = 4,
}

impl SurfaceLayer {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(SurfaceLayer::Default),
            1 => Some(SurfaceLayer::Platform),
            2 => Some(SurfaceLayer::Water),
            3 => Some(SurfaceLayer::Character),
            4 => Some(SurfaceLayer::Trigger),
            _ => None,
        }
    }
}

impl FlagBitmask for SurfaceLayer {
    type Storage = u32;

    fn bit_index(self) -> u8 {
        self as u8
    }
}

/// Set of surface layers a probe may hit.
pub type SurfaceMask = BitmaskFlags<u32>;

/// A single probe contact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeHit {
    /// World-space contact point.
    pub point: Vec3,
    /// World-space surface normal at the contact, facing the probe.
    pub normal: Vec3,
    /// Distance travelled along the probe direction before contact (meters).
    /// For sphere casts this is the travel of the sphere's center.
    pub distance: f32,
    pub layer: SurfaceLayer,
    /// Set when the surface belongs to a moving platform.
    pub platform: Option<PlatformId>,
}

/// Synchronous ray and sphere casts against the world.
///
/// `dir` is expected to be unit length. Implementations must return `None` rather than
/// fail when nothing matching `mask` is within `max_dist`.
pub trait GeometryQuery {
    fn cast_ray(&self, origin: Vec3, dir: Vec3, max_dist: f32, mask: SurfaceMask)
    -> Option<ProbeHit>;

    fn cast_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        dir: Vec3,
        max_dist: f32,
        mask: SurfaceMask,
    ) -> Option<ProbeHit>;
}

/// Geometry with nothing in it. Every probe misses.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoGeometry;

impl GeometryQuery for NoGeometry {
    fn cast_ray(&self, _: Vec3, _: Vec3, _: f32, _: SurfaceMask) -> Option<ProbeHit> {
        None
    }

    fn cast_sphere(&self, _: Vec3, _: f32, _: Vec3, _: f32, _: SurfaceMask) -> Option<ProbeHit> {
        None
    }
}

/// Latest world pose of every moving platform, keyed by id.
///
/// The host updates these before each fixed tick.
#[derive(Clone, Debug, Default)]
pub struct PlatformPoses {
    poses: FxHashMap<PlatformId, Iso>,
}

impl PlatformPoses {
    pub fn set(&mut self, id: PlatformId, pose: Iso) {
        self.poses.insert(id, pose);
    }

    pub fn remove(&mut self, id: PlatformId) -> Option<Iso> {
        self.poses.remove(&id)
    }

    pub fn get(&self, id: PlatformId) -> Option<&Iso> {
        self.poses.get(&id)
    }
}
