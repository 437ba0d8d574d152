use glam::Vec3;
use std::fmt::Write;
use wavefield_field::BoxField;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 3.0, -2.25),
            target: Vec3::ZERO,
            fov_degrees: 45.0,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads field state and a view configuration, then produces
/// output. It never mutates the field.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given field state and view.
    fn render(&self, field: &BoxField, view: &RenderView) -> Self::Output;
}

/// Glyph ramp from trough to crest.
const RAMP: &[u8] = b" .:-=+*#%@";

/// Debug text renderer.
///
/// Prints a header and a top-down ASCII heightmap of the field, one glyph
/// per box, trough to crest along [`RAMP`].
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }

    fn glyph(height: f32, amplitude: f32) -> char {
        let t = ((height / amplitude) * 0.5 + 0.5).clamp(0.0, 1.0);
        let idx = (t * (RAMP.len() - 1) as f32).round() as usize;
        RAMP[idx] as char
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, field: &BoxField, view: &RenderView) -> String {
        let mut out = String::new();
        let (lo, hi) = field.height_range();
        let _ = writeln!(
            out,
            "=== Box Field (frame={}, phase={:.3}, yaw={:.3}) ===",
            field.frame(),
            field.phase(),
            field.root_yaw()
        );
        let _ = writeln!(out, "Boxes: {}  height=[{lo:.3}, {hi:.3}]", field.len());
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            view.eye.x, view.eye.y, view.eye.z, view.target.x, view.target.y, view.target.z,
            view.fov_degrees
        );

        let side = field.params().layout.side as usize;
        let amplitude = field.params().wave.amplitude;
        for row in field.cells().chunks(side) {
            let line: String = row
                .iter()
                .map(|c| Self::glyph(c.height, amplitude))
                .collect();
            out.push_str(&line);
            out.push('\n');
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wavefield_field::{FieldLayout, FieldParams};

    fn field(side: u32) -> BoxField {
        BoxField::new(FieldParams {
            layout: FieldLayout {
                side,
                box_size: 0.4,
            },
            ..FieldParams::default()
        })
        .unwrap()
    }

    #[test]
    fn header_reports_frame_and_count() {
        let field = field(4);
        let output = DebugTextRenderer::new().render(&field, &RenderView::default());
        assert!(output.contains("frame=0"));
        assert!(output.contains("Boxes: 16"));
    }

    #[test]
    fn heightmap_has_one_row_per_grid_row() {
        let field = field(5);
        let output = DebugTextRenderer::new().render(&field, &RenderView::default());
        let rows: Vec<&str> = output.lines().skip(3).collect();
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.chars().count() == 5));
    }

    #[test]
    fn glyph_ramp_endpoints() {
        assert_eq!(DebugTextRenderer::glyph(-0.6, 0.6), ' ');
        assert_eq!(DebugTextRenderer::glyph(0.6, 0.6), '@');
        assert_eq!(DebugTextRenderer::glyph(5.0, 0.6), '@');
    }

    #[test]
    fn render_view_default() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 45.0);
        assert_eq!(view.target, Vec3::ZERO);
    }
}
