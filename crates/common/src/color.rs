use serde::{Deserialize, Serialize};

/// Linearly remap `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// The result is not clamped, and a degenerate input range yields a
/// non-finite value. Callers guarantee `in_min != in_max`.
pub fn range_map(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    (value - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// RGB color in display (gamma-encoded) space, channels nominally in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build a color from 0-255 channel values. Fractional inputs are kept as-is.
    pub fn from_ints(r: f32, g: f32, b: f32) -> Self {
        Self::new(r / 255.0, g / 255.0, b / 255.0)
    }

    /// Channels scaled back to 0-255.
    pub fn to_ints(self) -> [f32; 3] {
        [self.r * 255.0, self.g * 255.0, self.b * 255.0]
    }

    pub fn lerp(a: Self, b: Self, t: f32) -> Self {
        Self::new(
            a.r + (b.r - a.r) * t,
            a.g + (b.g - a.g) * t,
            a.b + (b.b - a.b) * t,
        )
    }

    /// Decode from sRGB to linear light, per channel.
    pub fn to_linear(self) -> Self {
        fn decode(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        Self::new(decode(self.r), decode(self.g), decode(self.b))
    }

    pub fn to_array4(self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }
}

impl From<[f32; 3]> for Rgb {
    fn from(c: [f32; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}
