//! Light sources.

use crate::Color;
use rand::Rng;
use whit_math::Vec3;

/// An infinitesimal light at a position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub radiance: Color,
}

impl PointLight {
    pub fn new(position: Vec3, radiance: Color) -> Self {
        Self { position, radiance }
    }
}

/// A parallelogram light spanned by `u` and `v` from its corner `position`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaLight {
    pub position: Vec3,
    pub radiance: Color,
    pub u: Vec3,
    pub v: Vec3,
}

impl AreaLight {
    /// Unit square in the XZ plane anchored at `position`.
    pub fn new(position: Vec3, radiance: Color) -> Self {
        Self::with_extent(position, radiance, Vec3::X, Vec3::Z)
    }

    pub fn with_extent(position: Vec3, radiance: Color, u: Vec3, v: Vec3) -> Self {
        Self {
            position,
            radiance,
            u,
            v,
        }
    }

    /// Uniformly sample a point on the light.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        self.position + rng.gen::<f32>() * self.u + rng.gen::<f32>() * self.v
    }
}

/// Any light the world can hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Point(PointLight),
    Area(AreaLight),
}

impl Light {
    pub fn point(position: Vec3, radiance: Color) -> Self {
        Light::Point(PointLight::new(position, radiance))
    }

    /// Position used by direct lighting.
    ///
    /// Area lights are shaded from their anchor corner; their surface is not
    /// sampled by the shader yet.
    pub fn position(&self) -> Vec3 {
        match self {
            Light::Point(light) => light.position,
            Light::Area(light) => light.position,
        }
    }

    pub fn radiance(&self) -> Color {
        match self {
            Light::Point(light) => light.radiance,
            Light::Area(light) => light.radiance,
        }
    }
}

impl From<PointLight> for Light {
    fn from(light: PointLight) -> Self {
        Light::Point(light)
    }
}

impl From<AreaLight> for Light {
    fn from(light: AreaLight) -> Self {
        Light::Area(light)
    }
}
