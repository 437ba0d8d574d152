use crate::params::{FieldError, FieldParams};
use glam::{Mat4, Quat, Vec3};
use std::f32::consts::TAU;
use wavefield_common::Rgb;

/// One box of the field. `base` is its field-local rest position (y = 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxCell {
    pub base: Vec3,
    pub height: f32,
    /// Drives both the diffuse and the emissive term.
    pub color: Rgb,
}

/// Per-box data handed to renderers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxInstance {
    pub model: Mat4,
    pub color: Rgb,
}

/// The animated box field.
///
/// Animation is frame driven: each [`step`](Self::step) advances the wave
/// phase by `2π / speed` and spins the field root by `spin` radians.
#[derive(Debug, Clone)]
pub struct BoxField {
    params: FieldParams,
    cells: Vec<BoxCell>,
    /// Wave phase, kept in `[0, 2π)`.
    phase: f32,
    frame: u64,
    root_yaw: f32,
}

impl BoxField {
    /// Lay out the grid and color it for phase 0.
    pub fn new(params: FieldParams) -> Result<Self, FieldError> {
        params.validate()?;

        let layout = params.layout;
        let cells = (0..layout.box_count())
            .map(|i| {
                let (x, z) = layout.cell_xz(i);
                BoxCell {
                    base: Vec3::new(x, 0.0, z),
                    height: 0.0,
                    color: params.palette.low,
                }
            })
            .collect();

        let mut field = Self {
            params,
            cells,
            phase: 0.0,
            frame: 0,
            root_yaw: 0.0,
        };
        field.recompute();
        tracing::debug!(
            boxes = field.cells.len(),
            side = layout.side,
            "box field created"
        );
        Ok(field)
    }

    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    pub fn cells(&self) -> &[BoxCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Number of frames stepped since creation or the last reset.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Field root rotation about +Y, radians, wrapped to `[0, 2π)`.
    pub fn root_yaw(&self) -> f32 {
        self.root_yaw
    }

    /// Pure height function of the configured wave.
    pub fn height_at(&self, x: f32, z: f32, phase: f32) -> f32 {
        self.params.wave.height(x, z, phase)
    }

    /// Advance one frame: phase, heights, colors, root spin.
    pub fn step(&mut self) {
        self.phase = (self.phase + self.params.wave.phase_step()).rem_euclid(TAU);
        self.recompute();
        self.root_yaw = (self.root_yaw + self.params.spin).rem_euclid(TAU);
        self.frame += 1;
    }

    /// Step `frames` times.
    pub fn advance(&mut self, frames: u64) {
        for _ in 0..frames {
            self.step();
        }
    }

    /// Back to frame 0 with the root unrotated.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.frame = 0;
        self.root_yaw = 0.0;
        self.recompute();
    }

    /// Lowest and highest box height of the current frame.
    pub fn height_range(&self) -> (f32, f32) {
        self.cells
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), c| {
                (lo.min(c.height), hi.max(c.height))
            })
    }

    /// World transform of the field root.
    pub fn root_transform(&self) -> Mat4 {
        Mat4::from_rotation_y(self.root_yaw)
    }

    /// Instance data for every box in row-major order.
    pub fn instances(&self) -> Vec<BoxInstance> {
        let mut out = Vec::with_capacity(self.cells.len());
        self.write_instances(&mut out);
        out
    }

    /// Fill `out` with instance data, reusing its allocation.
    pub fn write_instances(&self, out: &mut Vec<BoxInstance>) {
        out.clear();
        let rotation = Quat::from_rotation_y(self.root_yaw);
        let scale = Vec3::splat(self.params.layout.box_size);
        out.extend(self.cells.iter().map(|cell| {
            let local = Vec3::new(cell.base.x, cell.height, cell.base.z);
            BoxInstance {
                model: Mat4::from_scale_rotation_translation(scale, rotation, rotation * local),
                color: cell.color,
            }
        }));
    }

    fn recompute(&mut self) {
        let wave = self.params.wave;
        let palette = self.params.palette;
        let phase = self.phase;
        for cell in &mut self.cells {
            cell.height = wave.height(cell.base.x, cell.base.z, phase);
            cell.color = palette.color_for(cell.height, wave.amplitude);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{FieldLayout, WaveParams};

    fn small_params(side: u32) -> FieldParams {
        FieldParams {
            layout: FieldLayout {
                side,
                box_size: 0.4,
            },
            ..FieldParams::default()
        }
    }

    #[test]
    fn default_field_has_576_boxes() {
        let field = BoxField::new(FieldParams::default()).unwrap();
        assert_eq!(field.len(), 576);
        assert_eq!(field.frame(), 0);
    }

    #[test]
    fn grid_is_centered() {
        let field = BoxField::new(FieldParams::default()).unwrap();
        let sum: Vec3 = field.cells().iter().map(|c| c.base).sum();
        assert!(sum.length() < 1e-3);
    }

    #[test]
    fn single_box_sits_at_origin() {
        let field = BoxField::new(small_params(1)).unwrap();
        assert_eq!(field.len(), 1);
        assert_eq!(field.cells()[0].base, Vec3::ZERO);
    }

    #[test]
    fn invalid_params_are_rejected() {
        let mut params = FieldParams::default();
        params.layout.box_size = -1.0;
        assert!(matches!(
            BoxField::new(params),
            Err(FieldError::InvalidBoxSize(_))
        ));
    }

    #[test]
    fn heights_stay_within_amplitude() {
        let mut field = BoxField::new(FieldParams::default()).unwrap();
        for _ in 0..450 {
            field.step();
            let (lo, hi) = field.height_range();
            assert!(lo >= -0.6 - 1e-6);
            assert!(hi <= 0.6 + 1e-6);
        }
    }

    #[test]
    fn step_advances_phase_frame_and_yaw() {
        let mut field = BoxField::new(FieldParams::default()).unwrap();
        field.step();
        assert_eq!(field.frame(), 1);
        assert!((field.phase() - TAU / 200.0).abs() < 1e-6);
        assert!((field.root_yaw() - 0.0025).abs() < 1e-6);
    }

    #[test]
    fn wave_repeats_after_one_cycle() {
        let mut field = BoxField::new(small_params(4)).unwrap();
        let start: Vec<f32> = field.cells().iter().map(|c| c.height).collect();
        field.advance(200);
        for (a, c) in start.iter().zip(field.cells()) {
            assert!((a - c.height).abs() < 1e-3);
        }
        assert!(field.phase() < 1e-3 || (TAU - field.phase()) < 1e-3);
    }

    #[test]
    fn colors_follow_heights() {
        let params = FieldParams::default();
        let field = BoxField::new(params).unwrap();
        for cell in field.cells() {
            let expected = params.palette.color_for(cell.height, params.wave.amplitude);
            assert_eq!(cell.color, expected);
        }
    }

    #[test]
    fn crest_is_high_color() {
        let params = FieldParams {
            layout: FieldLayout {
                side: 1,
                box_size: 1.0,
            },
            wave: WaveParams {
                speed: 4.0,
                ..WaveParams::default()
            },
            ..FieldParams::default()
        };
        let mut field = BoxField::new(params).unwrap();
        // a quarter cycle puts the origin on the crest
        field.step();
        let cell = field.cells()[0];
        assert!((cell.height - 0.6).abs() < 1e-5);
        assert!((cell.color.g - params.palette.high.g).abs() < 1e-4);
    }

    #[test]
    fn instances_carry_root_rotation() {
        let mut field = BoxField::new(small_params(2)).unwrap();
        field.step();
        let instances = field.instances();
        assert_eq!(instances.len(), 4);

        let cell = field.cells()[0];
        let local = Vec3::new(cell.base.x, cell.height, cell.base.z);
        let expected = field.root_transform().transform_point3(local);
        let actual = instances[0].model.transform_point3(Vec3::ZERO);
        assert!((expected - actual).length() < 1e-5);
    }

    #[test]
    fn write_instances_reuses_buffer() {
        let field = BoxField::new(small_params(3)).unwrap();
        let mut buf = Vec::new();
        field.write_instances(&mut buf);
        let cap = buf.capacity();
        field.write_instances(&mut buf);
        assert_eq!(buf.len(), 9);
        assert_eq!(buf.capacity(), cap);
    }

    #[test]
    fn reset_restores_frame_zero() {
        let mut field = BoxField::new(FieldParams::default()).unwrap();
        let first: Vec<BoxCell> = field.cells().to_vec();
        field.advance(37);
        field.reset();
        assert_eq!(field.frame(), 0);
        assert_eq!(field.root_yaw(), 0.0);
        assert_eq!(field.cells(), first.as_slice());
    }
}
