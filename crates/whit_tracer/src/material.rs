//! Surface materials for Whitted shading.

use whit_math::{Vec2, Vec3};

/// Color type alias (linear RGB, typically 0-1)
pub type Color = Vec3;

/// How a surface interacts with an incoming ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaterialNature {
    /// Local Phong lighting with hard shadows. Terminates recursion.
    #[default]
    DiffuseGlossy,
    /// Perfect mirror, weighted by Fresnel reflectance.
    Reflective,
    /// Dielectric: Fresnel-weighted blend of a reflected and a refracted ray.
    ReflectiveRefractive,
}

/// Diffuse color, either constant or a function of texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Albedo {
    Solid(Color),
    /// Two-color checkerboard over texture space with `scale` squares per unit.
    Checker { scale: f32, even: Color, odd: Color },
}

impl Albedo {
    /// The classic orange/yellow floor pattern.
    pub fn floor_checker() -> Self {
        Albedo::Checker {
            scale: 5.0,
            even: Color::new(0.815, 0.235, 0.031),
            odd: Color::new(0.937, 0.937, 0.231),
        }
    }

    /// Evaluate the albedo at the given texture coordinates.
    pub fn evaluate(&self, texture_coords: Vec2) -> Color {
        match *self {
            Albedo::Solid(color) => color,
            Albedo::Checker { scale, even, odd } => {
                let s = (texture_coords.x * scale).rem_euclid(1.0) > 0.5;
                let t = (texture_coords.y * scale).rem_euclid(1.0) > 0.5;
                if s ^ t {
                    odd
                } else {
                    even
                }
            }
        }
    }
}

/// Optical description of a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub nature: MaterialNature,
    /// Index of refraction for the two specular natures. Diffuse/glossy
    /// surfaces read it as their Phong exponent, see [`Material::specular_exponent`].
    pub refractive_index: f32,
    /// Weight of the diffuse term
    pub phong_diffuse: f32,
    /// Weight of the specular term
    pub phong_specular: f32,
    pub albedo: Albedo,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            nature: MaterialNature::DiffuseGlossy,
            refractive_index: 1.3,
            phong_diffuse: 0.8,
            phong_specular: 0.2,
            albedo: Albedo::Solid(Color::splat(0.2)),
        }
    }
}

impl Material {
    /// A diffuse/glossy material with a solid albedo.
    pub fn diffuse(albedo: Color) -> Self {
        Self {
            albedo: Albedo::Solid(albedo),
            ..Default::default()
        }
    }

    /// A diffuse/glossy material with a procedural albedo.
    pub fn textured(albedo: Albedo) -> Self {
        Self {
            albedo,
            ..Default::default()
        }
    }

    /// A mirror. `refractive_index` still drives the Fresnel weight.
    pub fn mirror(refractive_index: f32) -> Self {
        debug_assert!(refractive_index > 0.0, "refractive index must be positive");
        Self {
            nature: MaterialNature::Reflective,
            refractive_index,
            ..Default::default()
        }
    }

    /// A dielectric (glass, water, ...).
    ///
    /// - `refractive_index`: 1.0 = air, 1.5 = glass, 2.4 = diamond
    pub fn glass(refractive_index: f32) -> Self {
        debug_assert!(refractive_index > 0.0, "refractive index must be positive");
        Self {
            nature: MaterialNature::ReflectiveRefractive,
            refractive_index,
            ..Default::default()
        }
    }

    /// Override the Phong weights.
    pub fn with_phong(mut self, diffuse: f32, specular: f32) -> Self {
        self.phong_diffuse = diffuse;
        self.phong_specular = specular;
        self
    }

    /// Override the refractive index (the Phong exponent on diffuse surfaces).
    pub fn with_refractive_index(mut self, refractive_index: f32) -> Self {
        debug_assert!(refractive_index > 0.0, "refractive index must be positive");
        self.refractive_index = refractive_index;
        self
    }

    /// Phong exponent used for the specular highlight.
    ///
    /// NOTE: this is the refractive index field. Diffuse/glossy surfaces never
    /// refract, so the field carries the exponent instead. Changing a diffuse
    /// material's refractive index changes its highlight.
    #[inline]
    pub fn specular_exponent(&self) -> f32 {
        self.refractive_index
    }
}
