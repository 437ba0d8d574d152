//! Scene configuration with YAML file support.
//!
//! Every section uses `#[serde(default)]`, so a partial file (for example
//! only overriding `post.glow`) loads with the remaining values at their
//! defaults.

mod camera;
mod post;
mod scene;

pub use camera::CameraOptions;
pub use post::{GlowOptions, LensOptions, PostOptions, VignetteOptions};
pub use scene::{ConfigError, SceneConfig, SceneOptions};
