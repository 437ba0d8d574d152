//! Developer Tooling: field inspector and frame-rate counter.
//!
//! # Invariants
//! - Tools only read the field; they never step or mutate it.

mod fps;
mod inspector;

pub use fps::FpsCounter;
pub use inspector::{BoxInfo, FieldInspector, FieldSummary};
