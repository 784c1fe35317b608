//! Intersection record returned by world queries.

use crate::Material;
use whit_math::{Vec2, Vec3};

/// Index of a surface in the world's surface arena.
pub type SurfaceId = usize;

/// Record of the closest ray-surface intersection.
///
/// A query that misses returns `None` instead of a record.
#[derive(Debug, Clone, Copy)]
pub struct Intersection<'a> {
    /// Parameter t where the intersection occurs (finite, > 0)
    pub t: f32,
    /// Point of intersection
    pub location: Vec3,
    /// Geometric outward normal (unit length)
    pub normal: Vec3,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    pub surface: SurfaceId,
    pub material: &'a Material,
    /// Triangle index and barycentric coordinates, for mesh hits
    pub triangle_index: u32,
    pub barycentric: Vec2,
    /// UV texture coordinates
    pub texture_coords: Vec2,
}

impl<'a> Intersection<'a> {
    /// Normal flipped toward the side the incident ray came from.
    pub fn facing_normal(&self) -> Vec3 {
        if self.front_face {
            self.normal
        } else {
            -self.normal
        }
    }
}
