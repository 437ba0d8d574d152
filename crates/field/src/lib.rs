//! Box field: grid layout, traveling radial sine wave, height-driven coloring.
//!
//! # Invariants
//! - Box count is fixed at construction (`side * side`).
//! - Every box height stays within `[-amplitude, amplitude]`.
//! - `step()` is the only operation that advances animation state.

pub mod field;
pub mod params;

pub use field::{BoxCell, BoxField, BoxInstance};
pub use params::{FieldError, FieldLayout, FieldParams, Palette, WaveParams};
