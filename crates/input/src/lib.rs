//! Input mapping: raw pointer, touch and wheel events become [`Action`]s.
//!
//! # Invariants
//! - Consumers react to actions, never to raw window events.
//! - A tap (press and release without dragging) cycles the camera preset.

pub mod action;
pub mod gesture;

pub use action::Action;
pub use gesture::{GestureMapper, PointerEvent, PointerId, PointerPhase};
