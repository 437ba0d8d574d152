//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers never mutate the field.
//! - Render output derives only from field state and the view.
//!
//! The GPU backend lives in `wavefield-render-wgpu`; the text renderer here
//! backs the CLI and tests.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};
