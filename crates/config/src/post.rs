use serde::{Deserialize, Serialize};

/// Darkened screen edges, multiplied over the final image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VignetteOptions {
    pub enabled: bool,
    pub weight: f32,
    /// Pulls the horizontal and vertical falloff toward a circle; values above 1 extrapolate.
    pub stretch: f32,
    /// RGBA; alpha is ignored in multiply mode.
    pub color: [f32; 4],
    /// Reference field of view (radians) the falloff is scaled by.
    pub camera_fov: f32,
}

impl Default for VignetteOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            weight: 0.7,
            stretch: 5.0,
            color: [0.0, 0.0, 0.0, 0.0],
            camera_fov: 0.5,
        }
    }
}

/// Barrel distortion and chromatic aberration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensOptions {
    /// Barrel coefficient; 0 disables distortion.
    pub distortion: f32,
    /// Red/blue channel separation in pixels at the screen edge.
    pub chromatic_aberration: f32,
}

impl Default for LensOptions {
    fn default() -> Self {
        Self {
            distortion: 0.15,
            chromatic_aberration: 5.0,
        }
    }
}

/// Blurred emissive halo added on top of the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlowOptions {
    pub enabled: bool,
    pub intensity: f32,
    /// Gaussian radius in half-resolution texels.
    pub blur_radius: u32,
}

impl Default for GlowOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity: 0.4,
            blur_radius: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostOptions {
    pub vignette: VignetteOptions,
    pub lens: LensOptions,
    pub glow: GlowOptions,
}
