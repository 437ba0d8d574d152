use crate::camera::CameraOptions;
use crate::post::PostOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;
use wavefield_common::Rgb;
use wavefield_field::{FieldError, FieldParams};

/// Upper bound of the glow blur loop in the shader.
const MAX_BLUR_RADIUS: u32 = 32;

/// Highest field tick rate accepted.
const MAX_TICK_RATE_HZ: f32 = 1000.0;

/// Errors from loading or validating a scene configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid field parameters: {0}")]
    Field(#[from] FieldError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Background, light and simulation clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneOptions {
    pub clear_color: Rgb,
    pub light_position: [f32; 3],
    pub light_intensity: f32,
    pub specular_power: f32,
    /// Field frames per second; one frame is one wave step.
    pub tick_rate_hz: f32,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            clear_color: Rgb::from_ints(224.0, 255.0, 255.0),
            light_position: [10.0, 10.0, 0.0],
            light_intensity: 1.0,
            specular_power: 64.0,
            tick_rate_hz: 60.0,
        }
    }
}

/// Top-level configuration for the demo.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub field: FieldParams,
    pub scene: SceneOptions,
    pub camera: CameraOptions,
    pub post: PostOptions,
}

impl SceneConfig {
    /// Parse and validate a YAML document. Missing fields use defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        tracing::info!("loaded scene config from {}", path.display());
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write the configuration as YAML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_yaml()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.field.validate()?;

        let cam = &self.camera;
        if cam.presets.is_empty() {
            return Err(ConfigError::Invalid("camera needs at least one preset".into()));
        }
        let target = cam.target;
        if cam.presets.iter().any(|p| *p == target) {
            return Err(ConfigError::Invalid(
                "camera preset coincides with the target".into(),
            ));
        }
        if !(cam.near > 0.0 && cam.near < cam.far) {
            return Err(ConfigError::Invalid(format!(
                "camera clip planes must satisfy 0 < near < far, got near={} far={}",
                cam.near, cam.far
            )));
        }
        if !(cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera fov must be in (0, 180) degrees, got {}",
                cam.fov_degrees
            )));
        }
        if !(cam.min_radius > 0.0 && cam.min_radius <= cam.max_radius) {
            return Err(ConfigError::Invalid(format!(
                "camera radius bounds must satisfy 0 < min <= max, got min={} max={}",
                cam.min_radius, cam.max_radius
            )));
        }
        if !(cam.transition_speed.is_finite() && cam.transition_speed > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "camera transition speed must be positive, got {}",
                cam.transition_speed
            )));
        }
        if !(cam.orbit_sensitivity.is_finite() && cam.zoom_sensitivity.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "camera sensitivities must be finite, got orbit={} zoom={}",
                cam.orbit_sensitivity, cam.zoom_sensitivity
            )));
        }
        if !(self.scene.tick_rate_hz > 0.0 && self.scene.tick_rate_hz <= MAX_TICK_RATE_HZ) {
            return Err(ConfigError::Invalid(format!(
                "tick rate must be in (0, {MAX_TICK_RATE_HZ}] Hz, got {}",
                self.scene.tick_rate_hz
            )));
        }
        if self.post.glow.blur_radius > MAX_BLUR_RADIUS {
            return Err(ConfigError::Invalid(format!(
                "glow blur radius is capped at {MAX_BLUR_RADIUS}, got {}",
                self.post.glow.blur_radius
            )));
        }
        Ok(())
    }
}
