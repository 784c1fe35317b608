//! Whitted-style recursive ray tracer.
//!
//! A [`World`] owns surfaces (spheres and triangle meshes) and point lights,
//! accelerates closest-hit and shadow queries with a [`Bvh`], and shades each
//! hit with mirror reflection, Fresnel-weighted refraction, or a local
//! diffuse/specular term with hard shadows. [`FrameBuffer`] drives one ray per
//! pixel over a rayon pool and keeps a running average across frames.

mod bvh;
mod camera;
mod config;
mod frame;
mod intersection;
mod light;
mod material;
mod mesh;
pub mod optics;
mod sphere;
mod surface;
mod world;

pub use bvh::{Bvh, BvhNode, BvhStats, LEAF_MAX_SIZE};
pub use camera::{PinholeCamera, RayGenerator};
pub use config::{ViewportConfig, WorldConfig, MAX_BOUNCE_DEPTH_LIMIT};
pub use frame::{pack_abgr, FrameBuffer};
pub use intersection::{Intersection, SurfaceId};
pub use light::{AreaLight, Light, PointLight};
pub use material::{Albedo, Color, Material, MaterialNature};
pub use mesh::{GeometryError, GeometryResult, TriangleMesh};
pub use optics::{fresnel_reflectance, mirror_reflect, snell_refract};
pub use sphere::Sphere;
pub use surface::{HitInfo, Surface, SurfaceHit};
pub use world::World;

/// Re-export Vec3 and common math types from whit_math
pub use whit_math::{Aabb, Interval, Ray, Vec2, Vec3};
