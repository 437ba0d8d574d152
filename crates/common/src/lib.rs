//! Shared color and interpolation helpers used across the wavefield crates.

mod color;

pub use color::{Rgb, range_map};
