use glam::Vec2;

/// A high-level action produced from mouse, touch or keyboard input.
///
/// The camera rig and the app loop consume actions, never raw input events,
/// so mouse and touch drive the view identically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Advance to the next camera preset.
    CycleCamera,
    /// Orbit the camera by a screen-space drag delta in pixels.
    Orbit(Vec2),
    /// Zoom by wheel lines; positive moves closer.
    Zoom(f32),
    /// Freeze or resume the field animation.
    TogglePause,
    /// Show or hide the stats overlay.
    ToggleOverlay,
    /// Return to the first camera preset.
    ResetCamera,
    /// No-op (input that maps to nothing).
    Noop,
}

impl Action {
    /// Whether the action changes the camera.
    pub fn affects_camera(&self) -> bool {
        matches!(
            self,
            Self::CycleCamera | Self::Orbit(_) | Self::Zoom(_) | Self::ResetCamera
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_actions() {
        assert!(Action::CycleCamera.affects_camera());
        assert!(Action::Orbit(Vec2::new(1.0, 0.0)).affects_camera());
        assert!(Action::Zoom(1.0).affects_camera());
        assert!(Action::ResetCamera.affects_camera());
    }

    #[test]
    fn non_camera_actions() {
        assert!(!Action::TogglePause.affects_camera());
        assert!(!Action::ToggleOverlay.affects_camera());
        assert!(!Action::Noop.affects_camera());
    }
}
