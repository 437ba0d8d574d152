use serde::{Deserialize, Serialize};

/// Camera projection, preset table and control sensitivities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraOptions {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Point every preset looks at.
    pub target: [f32; 3],
    /// Eye positions cycled by tap / click. The first one is the start view.
    pub presets: Vec<[f32; 3]>,
    /// Exponential approach rate toward the active preset, per second.
    pub transition_speed: f32,
    /// Radians of orbit per pixel of drag.
    pub orbit_sensitivity: f32,
    /// Fraction of the radius per wheel line.
    pub zoom_sensitivity: f32,
    pub min_radius: f32,
    pub max_radius: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            target: [0.0, 0.0, 0.0],
            presets: vec![
                [0.0, 3.0, -2.25],
                [0.0, 7.0, -0.5],
                [5.5, 1.6, 0.0],
                [-3.2, 2.2, 3.2],
                [0.0, 0.9, -6.0],
            ],
            transition_speed: 4.0,
            orbit_sensitivity: 0.005,
            zoom_sensitivity: 0.1,
            min_radius: 1.0,
            max_radius: 30.0,
        }
    }
}
