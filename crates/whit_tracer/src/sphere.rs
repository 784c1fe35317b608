//! Sphere primitive.

use crate::surface::{HitInfo, Surface, SurfaceHit};
use crate::Material;
use std::f32::consts::PI;
use whit_math::{Aabb, Interval, Ray, Vec2, Vec3};

/// A sphere primitive.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Material,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: Material) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> Vec2 {
        // theta: angle down from +Y
        // phi: angle around Y axis from +X
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        Vec2::new(phi / (2.0 * PI), theta / PI)
    }
}

impl Surface for Sphere {
    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Only the near root counts: a ray starting inside the sphere leaves it
    /// without reporting a hit.
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<SurfaceHit> {
        let oc = self.center - ray.origin;
        let a = ray.direction.length_squared();
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let root = (h - discriminant.sqrt()) / a;
        if !ray_t.surrounds(root) {
            return None;
        }
        Some(SurfaceHit::at(root))
    }

    fn hit_info(&self, location: Vec3, _hit: &SurfaceHit) -> HitInfo {
        let normal = (location - self.center).normalize_or_zero();
        HitInfo {
            normal,
            texture_coords: Self::get_sphere_uv(normal),
        }
    }

    fn material(&self) -> &Material {
        &self.material
    }
}
