//! wgpu render backend for the box field.
//!
//! Renders the field as instanced cubes lit by a point light, then runs the
//! glow, lens distortion and vignette passes. The camera is an arc-rotate
//! model driven by a preset table that taps cycle through.
//!
//! # Invariants
//! - Renderer never mutates field state.
//! - Camera motion is independent of the field's frame clock.

mod camera;
mod gpu;
mod post;
mod shaders;

pub use camera::{CameraRig, OrbitCamera, Spherical};
pub use gpu::WgpuRenderer;
pub use post::{PostProcessStack, VignetteSettings};
use wavefield_render::RenderView;

impl From<&OrbitCamera> for RenderView {
    fn from(camera: &OrbitCamera) -> Self {
        RenderView {
            eye: camera.position(),
            target: camera.target,
            fov_degrees: camera.fov.to_degrees(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_view_from_camera() {
        let cam = OrbitCamera::default();
        let view = RenderView::from(&cam);
        assert_eq!(view.target, cam.target);
        assert!((view.fov_degrees - 45.0).abs() < 1e-4);
        assert!((view.eye - cam.position()).length() < 1e-6);
    }
}
