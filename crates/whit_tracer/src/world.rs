//! The scene aggregate and the recursive Whitted shader.

use crate::bvh::Bvh;
use crate::intersection::{Intersection, SurfaceId};
use crate::optics::{fresnel_reflectance, mirror_reflect, snell_refract};
use crate::surface::Surface;
use crate::{Color, Light, MaterialNature, WorldConfig, MAX_BOUNCE_DEPTH_LIMIT};
use std::time::Instant;
use whit_math::{Interval, Ray, Vec3};

/// A Whitted-style ray-traced world.
///
/// The world owns every surface and light. Surfaces are added one at a time,
/// then [`World::finalize_acceleration`] builds the BVH once; only after that
/// may [`World::cast_ray`] be called.
pub struct World {
    surfaces: Vec<Box<dyn Surface>>,
    lights: Vec<Light>,
    config: WorldConfig,
    bvh: Option<Bvh>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

impl World {
    /// Create an empty world. A `max_bounce_depth` above
    /// [`MAX_BOUNCE_DEPTH_LIMIT`] is clamped to it.
    pub fn new(mut config: WorldConfig) -> Self {
        if config.max_bounce_depth > MAX_BOUNCE_DEPTH_LIMIT {
            log::warn!(
                "max_bounce_depth {} clamped to {}",
                config.max_bounce_depth,
                MAX_BOUNCE_DEPTH_LIMIT
            );
            config.max_bounce_depth = MAX_BOUNCE_DEPTH_LIMIT;
        }
        Self {
            surfaces: Vec::new(),
            lights: Vec::new(),
            config,
            bvh: None,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Add a surface and return its id.
    ///
    /// Adding to a finalized world discards the BVH; finalize again before
    /// rendering.
    pub fn add_surface<S: Surface + 'static>(&mut self, surface: S) -> SurfaceId {
        if self.bvh.take().is_some() {
            log::warn!("Surface added after finalize_acceleration, BVH discarded");
        }
        self.surfaces.push(Box::new(surface));
        self.surfaces.len() - 1
    }

    pub fn add_light(&mut self, light: impl Into<Light>) {
        self.lights.push(light.into());
    }

    pub fn surfaces(&self) -> &[Box<dyn Surface>] {
        &self.surfaces
    }

    pub fn surface(&self, id: SurfaceId) -> &dyn Surface {
        self.surfaces[id].as_ref()
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn is_finalized(&self) -> bool {
        self.bvh.is_some()
    }

    /// Build the BVH over the current surfaces.
    pub fn finalize_acceleration(&mut self) {
        let start = Instant::now();
        let bvh = Bvh::build(&self.surfaces);
        let stats = bvh.stats();
        log::info!(
            "BVH built in {:?}: {} surfaces, {} nodes, {} leaves, depth {}",
            start.elapsed(),
            stats.surfaces,
            stats.nodes,
            stats.leaves,
            stats.max_depth
        );
        if self.lights.is_empty() {
            log::warn!("World has no lights, diffuse surfaces will render black");
        }
        self.bvh = Some(bvh);
    }

    /// Closest intersection along `ray` with t > 0.
    pub fn closest_intersection(&self, ray: &Ray) -> Option<Intersection<'_>> {
        let bvh = self.acceleration()?;
        let (id, hit) = bvh.closest_hit(&self.surfaces, ray, Interval::forward(f32::INFINITY))?;

        let surface = self.surfaces[id].as_ref();
        let location = ray.at(hit.t);
        let info = surface.hit_info(location, &hit);

        Some(Intersection {
            t: hit.t,
            location,
            normal: info.normal,
            front_face: ray.direction.dot(info.normal) < 0.0,
            surface: id,
            material: surface.material(),
            triangle_index: hit.triangle_index,
            barycentric: hit.barycentric,
            texture_coords: info.texture_coords,
        })
    }

    /// True if any surface lies strictly between `origin` and `max_distance`
    /// along the unit `direction`.
    pub fn is_occluded(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> bool {
        self.acceleration()
            .is_some_and(|bvh| bvh.any_hit(&self.surfaces, &Ray::new(origin, direction), max_distance))
    }

    fn acceleration(&self) -> Option<&Bvh> {
        debug_assert!(self.bvh.is_some(), "finalize_acceleration must be called before tracing");
        self.bvh.as_ref()
    }

    /// Radiance arriving along `ray`.
    ///
    /// `depth` counts the bounces taken so far; primary rays pass 0.
    pub fn cast_ray(&self, ray: &Ray, depth: u32) -> Color {
        if depth >= self.config.max_bounce_depth || ray.is_terminated() {
            return Color::ZERO;
        }

        let ray = ray.normalized();
        let Some(hit) = self.closest_intersection(&ray) else {
            return self.config.sky_color;
        };

        match hit.material.nature {
            MaterialNature::Reflective => self.shade_reflective(&ray, &hit, depth),
            MaterialNature::ReflectiveRefractive => self.shade_refractive(&ray, &hit, depth),
            MaterialNature::DiffuseGlossy => self.shade_diffuse(&ray, &hit),
        }
    }

    fn shade_reflective(&self, ray: &Ray, hit: &Intersection, depth: u32) -> Color {
        let ior = hit.material.refractive_index;
        let direction = mirror_reflect(ray.direction, hit.normal).normalize();
        let origin = self.offset_origin(hit.location, hit.normal, direction);

        // Weighted by the reflectance seen along the outgoing direction
        let kr = fresnel_reflectance(direction, hit.normal, ior);
        kr * self.cast_ray(&Ray::new(origin, direction), depth + 1)
    }

    fn shade_refractive(&self, ray: &Ray, hit: &Intersection, depth: u32) -> Color {
        let ior = hit.material.refractive_index;

        let reflect_dir = mirror_reflect(ray.direction, hit.normal).normalize();
        let reflect_origin = self.offset_origin(hit.location, hit.normal, reflect_dir);

        // Zero on total internal reflection; cast_ray returns no light for it
        let refract_dir = snell_refract(ray.direction, hit.normal, ior).normalize_or_zero();
        let refract_origin = self.offset_origin(hit.location, hit.normal, refract_dir);

        let reflected = self.cast_ray(&Ray::new(reflect_origin, reflect_dir), depth + 1);
        let refracted = self.cast_ray(&Ray::new(refract_origin, refract_dir), depth + 1);

        let kr = fresnel_reflectance(ray.direction, hit.normal, ior);
        reflected * kr + refracted * (1.0 - kr)
    }

    fn shade_diffuse(&self, ray: &Ray, hit: &Intersection) -> Color {
        let n = hit.normal;
        let p = hit.location;
        let eps = self.config.intersection_epsilon;
        let shadow_origin = if ray.direction.dot(n) < 0.0 {
            p + n * eps
        } else {
            p - n * eps
        };
        let exponent = hit.material.specular_exponent();

        let mut diffuse = Color::ZERO;
        let mut specular = Color::ZERO;
        for light in &self.lights {
            let to_light = light.position() - p;
            let distance = to_light.length();
            if distance <= 0.0 {
                continue;
            }
            let l = to_light / distance;

            if self.is_occluded(shadow_origin, l, distance) {
                continue;
            }

            let radiance = light.radiance();
            diffuse += radiance * l.dot(n).abs();

            let reflected = mirror_reflect(-l, n);
            specular += radiance * (-reflected.dot(ray.direction)).max(0.0).powf(exponent);
        }

        let albedo = self.surfaces[hit.surface].diffuse_color(hit.texture_coords);
        diffuse * albedo * hit.material.phong_diffuse + specular * hit.material.phong_specular
    }

    /// Nudge `p` off the surface onto the side `direction` heads toward.
    #[inline]
    fn offset_origin(&self, p: Vec3, normal: Vec3, direction: Vec3) -> Vec3 {
        let eps = self.config.intersection_epsilon;
        if direction.dot(normal) < 0.0 {
            p - normal * eps
        } else {
            p + normal * eps
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AreaLight, Material, Sphere, TriangleMesh};

    const TOL: f32 = 1e-4;

    fn assert_color_eq(a: Color, b: Color) {
        assert!((a - b).abs().max_element() < TOL, "{a} != {b}");
    }

    fn single_sphere_world(material: Material) -> World {
        let mut world = World::default();
        world.add_surface(Sphere::new(Vec3::new(0.0, 0.0, -10.0), 2.0, material));
        world.add_light(Light::point(Vec3::new(0.0, 20.0, 0.0), Color::splat(0.5)));
        world.finalize_acceleration();
        world
    }

    fn primary() -> Ray {
        Ray::new(Vec3::ZERO, Vec3::NEG_Z)
    }

    #[test]
    fn test_empty_world_is_sky() {
        let mut world = World::default();
        world.finalize_acceleration();
        assert_eq!(world.cast_ray(&primary(), 0), world.config().sky_color);
    }

    #[test]
    fn test_miss_returns_sky() {
        let world = single_sphere_world(Material::diffuse(Color::ONE));
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        assert_eq!(world.cast_ray(&ray, 0), world.config().sky_color);
    }

    #[test]
    fn test_depth_exhaustion_returns_zero() {
        let world = single_sphere_world(Material::diffuse(Color::ONE));
        let max = world.config().max_bounce_depth;
        assert_eq!(world.cast_ray(&primary(), max), Color::ZERO);
        assert_eq!(world.cast_ray(&primary(), max + 3), Color::ZERO);

        // Misses too: no sky at exhausted depth
        assert_eq!(world.cast_ray(&Ray::new(Vec3::ZERO, Vec3::Y), max), Color::ZERO);
    }

    #[test]
    fn test_terminated_ray_returns_zero() {
        let world = single_sphere_world(Material::diffuse(Color::ONE));
        assert_eq!(world.cast_ray(&Ray::new(Vec3::ZERO, Vec3::ZERO), 0), Color::ZERO);
    }

    #[test]
    fn test_unnormalized_primary_ray() {
        let world = single_sphere_world(Material::diffuse(Color::ONE));
        let a = world.cast_ray(&primary(), 0);
        let b = world.cast_ray(&Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -7.5)), 0);
        assert_color_eq(a, b);
    }

    #[test]
    fn test_closest_intersection_record() {
        let world = single_sphere_world(Material::diffuse(Color::ONE));
        let hit = world.closest_intersection(&primary()).unwrap();
        assert!((hit.t - 8.0).abs() < TOL);
        assert!((hit.location - Vec3::new(0.0, 0.0, -8.0)).length() < TOL);
        assert!((hit.normal - Vec3::Z).length() < TOL);
        assert!(hit.front_face);
        assert_eq!(hit.facing_normal(), hit.normal);
        assert_eq!(hit.surface, 0);
    }

    #[test]
    fn test_diffuse_lit_from_above() {
        let world = single_sphere_world(Material::diffuse(Color::ONE));
        let color = world.cast_ray(&primary(), 0);
        assert!(color.min_element() > 0.0);
        assert!(color.is_finite());
    }

    #[test]
    fn test_diffuse_without_lights_is_black() {
        let mut world = World::default();
        world.add_surface(Sphere::new(Vec3::new(0.0, 0.0, -10.0), 2.0, Material::diffuse(Color::ONE)));
        world.finalize_acceleration();
        assert_eq!(world.cast_ray(&primary(), 0), Color::ZERO);
    }

    #[test]
    fn test_hard_shadow() {
        let material = Material::diffuse(Color::ONE);
        let light_pos = Vec3::new(0.0, 20.0, -8.0);

        // Floor at y = -1 seen from above, light straight over the hit point
        let floor = || {
            TriangleMesh::new(
                vec![
                    Vec3::new(-10.0, -1.0, 0.0),
                    Vec3::new(10.0, -1.0, 0.0),
                    Vec3::new(10.0, -1.0, -20.0),
                    Vec3::new(-10.0, -1.0, -20.0),
                ],
                vec![0, 1, 3, 1, 2, 3],
                material,
            )
            .unwrap()
        };
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -6.0, -8.0));

        let mut lit = World::default();
        lit.add_surface(floor());
        lit.add_light(Light::point(light_pos, Color::ONE));
        lit.finalize_acceleration();
        assert!(lit.cast_ray(&ray, 0).length() > 0.0);

        // Same scene with a sphere hanging between the floor point and the light
        let mut shadowed = World::default();
        shadowed.add_surface(floor());
        shadowed.add_surface(Sphere::new(Vec3::new(0.0, 8.0, -8.0), 1.0, material));
        shadowed.add_light(Light::point(light_pos, Color::ONE));
        shadowed.finalize_acceleration();
        assert_eq!(shadowed.cast_ray(&ray, 0), Color::ZERO);
    }

    #[test]
    fn test_occluder_behind_light_does_not_shadow() {
        let mut world = World::default();
        world.add_surface(Sphere::new(Vec3::new(0.0, 0.0, -10.0), 2.0, Material::diffuse(Color::ONE)));
        // Beyond the light along the shadow ray
        world.add_surface(Sphere::new(Vec3::new(0.0, 30.0, -10.0), 2.0, Material::diffuse(Color::ONE)));
        world.add_light(Light::point(Vec3::new(0.0, 10.0, -10.0), Color::ONE));
        world.finalize_acceleration();

        let ray = Ray::new(Vec3::new(0.0, 10.0, -10.0 + 0.5), Vec3::NEG_Y);
        assert!(world.cast_ray(&ray, 0).length() > 0.0);
        assert!(!world.is_occluded(Vec3::new(0.0, 2.001, -10.0), Vec3::Y, 7.999));
    }

    #[test]
    fn test_mirror_normal_incidence_weighted_by_fresnel() {
        // Head-on mirror sends the ray straight back to the sky
        let world = single_sphere_world(Material::mirror(3.0));
        let expected = ((3.0f32 - 1.0) / (3.0 + 1.0)).powi(2) * world.config().sky_color;
        assert_color_eq(world.cast_ray(&primary(), 0), expected);
    }

    #[test]
    fn test_glass_conserves_sky_at_normal_incidence() {
        // Reflected ray escapes; refracted ray starts inside the sphere, which
        // does not report exiting hits, so it escapes too.
        let world = single_sphere_world(Material::glass(1.5));
        assert_color_eq(world.cast_ray(&primary(), 0), world.config().sky_color);
    }

    #[test]
    fn test_glass_at_max_depth_minus_one_sees_nothing() {
        let world = single_sphere_world(Material::glass(1.5));
        let depth = world.config().max_bounce_depth - 1;
        assert_eq!(world.cast_ray(&primary(), depth), Color::ZERO);
    }

    #[test]
    fn test_facing_mirrors_terminate() {
        let mirror = || {
            TriangleMesh::new(
                vec![Vec3::new(-5.0, -5.0, 0.0), Vec3::new(5.0, -5.0, 0.0), Vec3::new(0.0, 5.0, 0.0)],
                vec![0, 1, 2],
                Material::mirror(50.0),
            )
            .unwrap()
        };
        let shifted = |z: f32| {
            TriangleMesh::new(
                vec![Vec3::new(-5.0, -5.0, z), Vec3::new(5.0, -5.0, z), Vec3::new(0.0, 5.0, z)],
                vec![0, 1, 2],
                Material::mirror(50.0),
            )
            .unwrap()
        };

        for max_bounce_depth in [1, 3, 10] {
            let mut world = World::new(WorldConfig {
                max_bounce_depth,
                ..Default::default()
            });
            world.add_surface(mirror());
            world.add_surface(shifted(-4.0));
            world.finalize_acceleration();

            // Bounces between the mirrors until depth runs out
            let color = world.cast_ray(&Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::Z), 0);
            assert_eq!(color, Color::ZERO);
        }
    }

    #[test]
    fn test_excessive_bounce_depth_is_clamped() {
        let mut world = World::new(WorldConfig {
            max_bounce_depth: 200_000,
            ..Default::default()
        });
        assert_eq!(world.config().max_bounce_depth, MAX_BOUNCE_DEPTH_LIMIT);

        // Facing mirrors bounce until the clamped depth runs out
        for z in [0.0, -4.0] {
            world.add_surface(
                TriangleMesh::new(
                    vec![Vec3::new(-5.0, -5.0, z), Vec3::new(5.0, -5.0, z), Vec3::new(0.0, 5.0, z)],
                    vec![0, 1, 2],
                    Material::mirror(50.0),
                )
                .unwrap(),
            );
        }
        world.finalize_acceleration();
        let color = world.cast_ray(&Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::Z), 0);
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_area_light_shades_from_anchor() {
        let build = |light: Light| {
            let mut world = World::default();
            world.add_surface(Sphere::new(Vec3::new(0.0, 0.0, -10.0), 2.0, Material::diffuse(Color::ONE)));
            world.add_light(light);
            world.finalize_acceleration();
            world
        };
        let anchor = Vec3::new(3.0, 20.0, 0.0);
        let point = build(Light::point(anchor, Color::ONE)).cast_ray(&primary(), 0);
        let area = build(AreaLight::new(anchor, Color::ONE).into()).cast_ray(&primary(), 0);
        assert_color_eq(point, area);
    }

    #[test]
    fn test_add_after_finalize_drops_bvh() {
        let mut world = single_sphere_world(Material::default());
        assert!(world.is_finalized());
        world.add_surface(Sphere::new(Vec3::ZERO, 1.0, Material::default()));
        assert!(!world.is_finalized());
        world.finalize_acceleration();
        assert!(world.is_finalized());
        assert_eq!(world.surfaces().len(), 2);
    }
}
