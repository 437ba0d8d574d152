use serde::{Deserialize, Serialize};
use wavefield_common::{Rgb, range_map};

/// Errors from invalid field parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("grid side must be at least 1, got {0}")]
    InvalidSide(u32),
    #[error("box size must be positive and finite, got {0}")]
    InvalidBoxSize(f32),
    #[error("wave amplitude must be positive and finite, got {0}")]
    InvalidAmplitude(f32),
    #[error("wave frequency must be positive and finite, got {0}")]
    InvalidFrequency(f32),
    #[error("wave speed must be positive and finite, got {0}")]
    InvalidSpeed(f32),
    #[error("spin must be finite, got {0}")]
    InvalidSpin(f32),
}

fn positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

/// Square grid layout: `side * side` boxes of edge `box_size`, centered on the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldLayout {
    pub side: u32,
    pub box_size: f32,
}

impl Default for FieldLayout {
    fn default() -> Self {
        Self {
            side: 24,
            box_size: 0.4,
        }
    }
}

impl FieldLayout {
    pub fn box_count(&self) -> usize {
        (self.side as usize) * (self.side as usize)
    }

    /// Distance subtracted from each grid coordinate so the field is centered.
    pub fn middle_offset(&self) -> f32 {
        self.side as f32 * self.box_size / 2.0 - self.box_size / 2.0
    }

    /// Field-local `(x, z)` of box `index` (row-major).
    pub fn cell_xz(&self, index: usize) -> (f32, f32) {
        let side = self.side as usize;
        let offset = self.middle_offset();
        let x = (index % side) as f32 * self.box_size - offset;
        let z = (index / side) as f32 * self.box_size - offset;
        (x, z)
    }
}

/// Traveling radial sine wave.
///
/// `speed` is the number of frames in one full cycle; `frequency` divides
/// the radial distance before it enters the sine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveParams {
    pub amplitude: f32,
    pub frequency: f32,
    pub speed: f32,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            amplitude: 0.6,
            frequency: 1.0,
            speed: 200.0,
        }
    }
}

impl WaveParams {
    /// Phase advance per frame.
    pub fn phase_step(&self) -> f32 {
        std::f32::consts::TAU / self.speed
    }

    /// Height of the wave at field-local `(x, z)` for the given phase.
    pub fn height(&self, x: f32, z: f32, phase: f32) -> f32 {
        let fx = x / self.frequency;
        let fz = z / self.frequency;
        ((fx * fx + fz * fz).sqrt() + phase).sin() * self.amplitude
    }
}

/// Height color ramp: `low` at `-amplitude`, `high` at `+amplitude`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub low: Rgb,
    pub high: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            low: Rgb::from_ints(124.0, 192.0, 162.0),
            high: Rgb::from_ints(206.0, 8.0, 90.0),
        }
    }
}

impl Palette {
    /// Map a height onto the ramp, channel by channel in 0-255 space.
    ///
    /// `±amplitude` land on `high` / `low` up to float rounding from the
    /// 0-255 round trip, not bit-exactly.
    pub fn color_for(&self, height: f32, amplitude: f32) -> Rgb {
        let [lr, lg, lb] = self.low.to_ints();
        let [hr, hg, hb] = self.high.to_ints();
        Rgb::from_ints(
            range_map(height, -amplitude, amplitude, lr, hr),
            range_map(height, -amplitude, amplitude, lg, hg),
            range_map(height, -amplitude, amplitude, lb, hb),
        )
    }
}

/// Everything needed to build and animate a [`BoxField`](crate::BoxField).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldParams {
    pub layout: FieldLayout,
    pub wave: WaveParams,
    pub palette: Palette,
    /// Rotation of the field root about +Y, in radians per frame.
    pub spin: f32,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            layout: FieldLayout::default(),
            wave: WaveParams::default(),
            palette: Palette::default(),
            spin: 0.0025,
        }
    }
}

impl FieldParams {
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.layout.side == 0 {
            return Err(FieldError::InvalidSide(self.layout.side));
        }
        if !positive(self.layout.box_size) {
            return Err(FieldError::InvalidBoxSize(self.layout.box_size));
        }
        if !positive(self.wave.amplitude) {
            return Err(FieldError::InvalidAmplitude(self.wave.amplitude));
        }
        if !positive(self.wave.frequency) {
            return Err(FieldError::InvalidFrequency(self.wave.frequency));
        }
        if !positive(self.wave.speed) {
            return Err(FieldError::InvalidSpeed(self.wave.speed));
        }
        if !self.spin.is_finite() {
            return Err(FieldError::InvalidSpin(self.spin));
        }
        Ok(())
    }
}
