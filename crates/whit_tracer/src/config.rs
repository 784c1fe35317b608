//! World and viewport settings.

use crate::Color;
use serde::{Deserialize, Serialize};

/// Deepest recursion a world will trace. `cast_ray` recurses once per
/// bounce on the calling thread's stack, so deeper settings are clamped.
pub const MAX_BOUNCE_DEPTH_LIMIT: u32 = 64;

/// Global shading parameters of a world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Radiance returned by rays that escape the scene
    pub sky_color: Color,
    /// Rays at this recursion depth return no light; at most
    /// [`MAX_BOUNCE_DEPTH_LIMIT`]
    pub max_bounce_depth: u32,
    /// Offset along the normal applied to secondary ray origins
    pub intersection_epsilon: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            sky_color: Color::new(0.235294, 0.67451, 0.843137),
            max_bounce_depth: 5,
            intersection_epsilon: 0.00001,
        }
    }
}

/// Output image size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl ViewportConfig {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}
