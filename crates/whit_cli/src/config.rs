//! Render settings loaded from JSON.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use whit_tracer::{PinholeCamera, Vec3, ViewportConfig, WorldConfig, MAX_BOUNCE_DEPTH_LIMIT};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Camera placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub vfov: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            look_from: Vec3::ZERO,
            look_at: Vec3::NEG_Z,
            up: Vec3::Y,
            vfov: 90.0,
        }
    }
}

impl CameraSettings {
    pub fn build(&self, viewport: ViewportConfig) -> PinholeCamera {
        PinholeCamera::looking_at(
            self.look_from,
            self.look_at,
            self.up,
            viewport.width,
            viewport.height,
            self.vfov,
        )
    }
}

/// Everything the driver needs for one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub world: WorldConfig,
    pub viewport: ViewportConfig,
    pub camera: CameraSettings,
    pub frames: u32,
    pub accumulate: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            viewport: ViewportConfig::default(),
            camera: CameraSettings::default(),
            frames: 1,
            accumulate: false,
        }
    }
}

impl RenderSettings {
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(invalid(
                "viewport",
                format!("{}x{} has no pixels", self.viewport.width, self.viewport.height),
            ));
        }
        let depth = self.world.max_bounce_depth;
        if !(1..=MAX_BOUNCE_DEPTH_LIMIT).contains(&depth) {
            return Err(invalid(
                "world.max_bounce_depth",
                format!("{depth} is outside [1, {MAX_BOUNCE_DEPTH_LIMIT}]"),
            ));
        }
        let eps = self.world.intersection_epsilon;
        if !(eps.is_finite() && eps > 0.0) {
            return Err(invalid("world.intersection_epsilon", format!("{eps} is not positive")));
        }
        if !self.world.sky_color.is_finite() {
            return Err(invalid("world.sky_color", "must be finite".into()));
        }
        if !(self.camera.vfov > 0.0 && self.camera.vfov < 180.0) {
            return Err(invalid("camera.vfov", format!("{} is outside (0, 180)", self.camera.vfov)));
        }
        if (self.camera.look_at - self.camera.look_from).length_squared() == 0.0 {
            return Err(invalid("camera.look_at", "coincides with look_from".into()));
        }
        if self.frames == 0 {
            return Err(invalid("frames", "must be at least 1".into()));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
