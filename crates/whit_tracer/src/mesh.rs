//! Indexed triangle mesh surface.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::surface::{HitInfo, Surface, SurfaceHit};
use crate::Material;
use thiserror::Error;
use whit_math::{Aabb, Interval, Ray, Vec2, Vec3};

/// Errors raised while assembling a mesh.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Index count {0} is not a multiple of 3")]
    RaggedIndices(usize),

    #[error("Triangle {triangle} references vertex {index}, vertex count: {vertex_count}")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("{attribute} count {found} doesn't match vertex count {expected}")]
    AttributeMismatch {
        attribute: &'static str,
        found: usize,
        expected: usize,
    },
}

pub type GeometryResult<T> = Result<T, GeometryError>;

/// A triangle mesh sharing one material.
///
/// Every three indices form a triangle. Normals and texture coordinates are
/// optional and, when present, given per vertex.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    vertices: Vec<Vec3>,
    indices: Vec<u32>,
    normals: Option<Vec<Vec3>>,
    texture_coords: Option<Vec<Vec2>>,
    material: Material,
    bbox: Aabb,
}

impl TriangleMesh {
    /// Create a mesh from positions and triangle indices.
    pub fn new(vertices: Vec<Vec3>, indices: Vec<u32>, material: Material) -> GeometryResult<Self> {
        Self::with_attributes(vertices, indices, None, None, material)
    }

    /// Create a mesh with optional per-vertex normals and texture coordinates.
    pub fn with_attributes(
        vertices: Vec<Vec3>,
        indices: Vec<u32>,
        normals: Option<Vec<Vec3>>,
        texture_coords: Option<Vec<Vec2>>,
        material: Material,
    ) -> GeometryResult<Self> {
        if indices.len() % 3 != 0 {
            return Err(GeometryError::RaggedIndices(indices.len()));
        }

        let vertex_count = vertices.len();
        if let Some(position) = indices.iter().position(|&i| i as usize >= vertex_count) {
            return Err(GeometryError::IndexOutOfRange {
                triangle: position / 3,
                index: indices[position],
                vertex_count,
            });
        }

        if let Some(normals) = &normals {
            check_attribute("Normal", normals.len(), vertex_count)?;
        }
        if let Some(uvs) = &texture_coords {
            check_attribute("Texture coordinate", uvs.len(), vertex_count)?;
        }

        let bbox = Self::compute_bounds(&vertices);
        Ok(Self {
            vertices,
            indices,
            normals: normals.map(|n| n.into_iter().map(|v| v.normalize_or_zero()).collect()),
            texture_coords,
            material,
            bbox,
        })
    }

    /// Compute axis-aligned bounding box from positions.
    fn compute_bounds(positions: &[Vec3]) -> Aabb {
        if positions.is_empty() {
            return Aabb::empty();
        }

        let (min, max) = positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(lo, hi), p| (lo.min(*p), hi.max(*p)),
        );
        Aabb::from_points(min, max)
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn triangle(&self, index: usize) -> [usize; 3] {
        let base = index * 3;
        [
            self.indices[base] as usize,
            self.indices[base + 1] as usize,
            self.indices[base + 2] as usize,
        ]
    }

    /// Möller-Trumbore test against one triangle. Returns (t, u, v).
    fn intersect_triangle(&self, ray: &Ray, index: usize, ray_t: Interval) -> Option<(f32, f32, f32)> {
        let [i0, i1, i2] = self.triangle(index);
        let v0 = self.vertices[i0];
        let edge1 = self.vertices[i1] - v0;
        let edge2 = self.vertices[i2] - v0;

        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle; relative to the triangle's scale
        if a.abs() <= f32::EPSILON * edge1.length() * edge2.length() * ray.direction.length() {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if !ray_t.surrounds(t) {
            return None;
        }
        Some((t, u, v))
    }
}

fn check_attribute(attribute: &'static str, found: usize, expected: usize) -> GeometryResult<()> {
    if found != expected {
        return Err(GeometryError::AttributeMismatch {
            attribute,
            found,
            expected,
        });
    }
    Ok(())
}

impl Surface for TriangleMesh {
    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<SurfaceHit> {
        let mut closest: Option<SurfaceHit> = None;
        let mut closest_t = ray_t.max;

        for index in 0..self.triangle_count() {
            if let Some((t, u, v)) = self.intersect_triangle(ray, index, ray_t.with_max(closest_t)) {
                closest_t = t;
                closest = Some(SurfaceHit {
                    t,
                    triangle_index: index as u32,
                    barycentric: Vec2::new(u, v),
                });
            }
        }
        closest
    }

    fn hit_info(&self, _location: Vec3, hit: &SurfaceHit) -> HitInfo {
        let [i0, i1, i2] = self.triangle(hit.triangle_index as usize);
        let (u, v) = (hit.barycentric.x, hit.barycentric.y);
        let w = 1.0 - u - v;

        let flat = || {
            let edge1 = self.vertices[i1] - self.vertices[i0];
            let edge2 = self.vertices[i2] - self.vertices[i0];
            edge1.cross(edge2).normalize_or_zero()
        };
        let normal = match &self.normals {
            Some(n) => {
                let smooth = (w * n[i0] + u * n[i1] + v * n[i2]).normalize_or_zero();
                if smooth == Vec3::ZERO {
                    flat()
                } else {
                    smooth
                }
            }
            None => flat(),
        };

        let texture_coords = match &self.texture_coords {
            Some(st) => w * st[i0] + u * st[i1] + v * st[i2],
            None => Vec2::ZERO,
        };

        HitInfo {
            normal,
            texture_coords,
        }
    }

    fn material(&self) -> &Material {
        &self.material
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn grey() -> Material {
        Material::diffuse(Color::splat(0.5))
    }

    /// Triangle in XY plane at z=-1
    fn single_triangle() -> TriangleMesh {
        TriangleMesh::new(
            vec![
                Vec3::new(-1.0, -1.0, -1.0),
                Vec3::new(1.0, -1.0, -1.0),
                Vec3::new(0.0, 1.0, -1.0),
            ],
            vec![0, 1, 2],
            grey(),
        )
        .unwrap()
    }

    /// The floor quad: two triangles at y = -3
    fn floor() -> TriangleMesh {
        TriangleMesh::with_attributes(
            vec![
                Vec3::new(-5.0, -3.0, -6.0),
                Vec3::new(5.0, -3.0, -6.0),
                Vec3::new(5.0, -3.0, -16.0),
                Vec3::new(-5.0, -3.0, -16.0),
            ],
            vec![0, 1, 3, 1, 2, 3],
            None,
            Some(vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ]),
            grey(),
        )
        .unwrap()
    }

    #[test]
    fn test_triangle_hit() {
        let mesh = single_triangle();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let hit = mesh.intersect(&ray, Interval::forward(f32::INFINITY)).unwrap();
        assert!((hit.t - 1.0).abs() < 0.001);
        assert_eq!(hit.triangle_index, 0);

        let info = mesh.hit_info(ray.at(hit.t), &hit);
        // Counter-clockwise winding seen from +Z gives a +Z normal
        assert!((info.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_triangle_miss() {
        let mesh = single_triangle();

        // Ray pointing away
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(mesh.intersect(&ray, Interval::forward(f32::INFINITY)).is_none());

        // Ray passing beside the triangle
        let ray = Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(mesh.intersect(&ray, Interval::forward(f32::INFINITY)).is_none());
    }

    #[test]
    fn test_tiny_triangle_hit() {
        let mesh = TriangleMesh::new(
            vec![
                Vec3::new(0.0, 0.0, -1.0),
                Vec3::new(1e-4, 0.0, -1.0),
                Vec3::new(0.0, 1e-4, -1.0),
            ],
            vec![0, 1, 2],
            grey(),
        )
        .unwrap();

        let ray = Ray::new(Vec3::new(2e-5, 2e-5, 0.0), Vec3::NEG_Z);
        let hit = mesh.intersect(&ray, Interval::forward(f32::INFINITY)).unwrap();
        assert!((hit.t - 1.0).abs() < 1e-4);

        // Still rejects a ray in the triangle's plane
        let ray = Ray::new(Vec3::new(-1.0, 2e-5, -1.0), Vec3::X);
        assert!(mesh.intersect(&ray, Interval::forward(f32::INFINITY)).is_none());
    }

    #[test]
    fn test_closest_triangle_wins() {
        // Two parallel triangles, the far one listed first
        let mesh = TriangleMesh::new(
            vec![
                Vec3::new(-1.0, -1.0, -5.0),
                Vec3::new(1.0, -1.0, -5.0),
                Vec3::new(0.0, 1.0, -5.0),
                Vec3::new(-1.0, -1.0, -2.0),
                Vec3::new(1.0, -1.0, -2.0),
                Vec3::new(0.0, 1.0, -2.0),
            ],
            vec![0, 1, 2, 3, 4, 5],
            grey(),
        )
        .unwrap();

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let hit = mesh.intersect(&ray, Interval::forward(f32::INFINITY)).unwrap();
        assert_eq!(hit.triangle_index, 1);
        assert!((hit.t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_texture_coords_interpolate() {
        let mesh = floor();
        // Straight down onto (2, -3, -8), away from the shared diagonal
        let ray = Ray::new(Vec3::new(2.0, 0.0, -8.0), Vec3::NEG_Y);
        let hit = mesh.intersect(&ray, Interval::forward(f32::INFINITY)).unwrap();
        assert!((hit.t - 3.0).abs() < 1e-5);

        let info = mesh.hit_info(ray.at(hit.t), &hit);
        assert_eq!(hit.triangle_index, 0);
        assert!((info.texture_coords - Vec2::new(0.7, 0.2)).length() < 1e-4);
        assert!((info.normal.abs() - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_smooth_normals_interpolate() {
        let mesh = TriangleMesh::with_attributes(
            vec![Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 1.0)],
            vec![0, 1, 2],
            Some(vec![Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 0.0), Vec3::Y]),
            None,
            grey(),
        )
        .unwrap();

        let hit = SurfaceHit {
            t: 1.0,
            triangle_index: 0,
            barycentric: Vec2::new(0.5, 0.0),
        };
        // Halfway between the first two vertices: their normals average to +Y
        let info = mesh.hit_info(Vec3::new(0.0, 0.0, -1.0), &hit);
        assert!((info.normal - Vec3::Y).length() < 1e-5);
        assert_eq!(info.texture_coords, Vec2::ZERO);
    }

    #[test]
    fn test_mesh_validation() {
        let verts = vec![Vec3::ZERO, Vec3::X, Vec3::Y];

        assert_eq!(
            TriangleMesh::new(verts.clone(), vec![0, 1], grey()).unwrap_err(),
            GeometryError::RaggedIndices(2)
        );
        assert!(matches!(
            TriangleMesh::new(verts.clone(), vec![0, 1, 2, 0, 1, 7], grey()),
            Err(GeometryError::IndexOutOfRange { triangle: 1, index: 7, .. })
        ));
        assert!(matches!(
            TriangleMesh::with_attributes(verts, vec![0, 1, 2], Some(vec![Vec3::Z]), None, grey()),
            Err(GeometryError::AttributeMismatch { found: 1, expected: 3, .. })
        ));
    }

    #[test]
    fn test_bounds() {
        let mesh = floor();
        let bbox = mesh.bounding_box();
        assert_eq!(bbox.x.min, -5.0);
        assert_eq!(bbox.z.min, -16.0);
        // Flat in Y, padded so slab tests work
        assert!(bbox.y.size() > 0.0);
        assert_eq!(mesh.triangle_count(), 2);
    }
}
