//! Surface trait and the raw hit data it produces.

use crate::{Color, Material};
use whit_math::{Aabb, Interval, Ray, Vec2, Vec3};

/// Raw result of a surface's own intersection test.
///
/// Holds just enough to rebuild shading data later through
/// [`Surface::hit_info`], so the BVH can compare candidates cheaply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Ray parameter of the hit
    pub t: f32,
    /// Triangle that was hit (always 0 for analytic surfaces)
    pub triangle_index: u32,
    /// Barycentric (u, v) inside that triangle
    pub barycentric: Vec2,
}

impl SurfaceHit {
    /// A hit on a surface without triangles.
    pub fn at(t: f32) -> Self {
        Self {
            t,
            triangle_index: 0,
            barycentric: Vec2::ZERO,
        }
    }
}

/// Shading data at a hit point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitInfo {
    /// Geometric outward normal (unit length)
    pub normal: Vec3,
    pub texture_coords: Vec2,
}

/// Trait for everything a ray can hit.
pub trait Surface: Send + Sync {
    /// Get the axis-aligned bounding box of this surface.
    fn bounding_box(&self) -> Aabb;

    /// Nearest hit strictly inside `ray_t`, if any.
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<SurfaceHit>;

    /// Normal and texture coordinates at a hit previously returned by
    /// [`Surface::intersect`].
    fn hit_info(&self, location: Vec3, hit: &SurfaceHit) -> HitInfo;

    fn material(&self) -> &Material;

    /// Albedo at the given texture coordinates.
    fn diffuse_color(&self, texture_coords: Vec2) -> Color {
        self.material().albedo.evaluate(texture_coords)
    }

    /// Point used to order surfaces while building the BVH.
    fn centroid(&self) -> Vec3 {
        self.bounding_box().centroid()
    }
}
