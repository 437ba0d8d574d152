use glam::{Mat4, Vec3};
use std::f32::consts::{PI, TAU};
use wavefield_config::CameraOptions;
use wavefield_input::Action;

/// Keeps `beta` off the poles where the look-at basis degenerates.
const BETA_EPSILON: f32 = 0.01;

/// Spherical placement around a target: `alpha` is the azimuth in the XZ
/// plane measured from +X toward +Z, `beta` the angle down from +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub alpha: f32,
    pub beta: f32,
    pub radius: f32,
}

impl Spherical {
    /// Spherical coordinates of `position` relative to `target`.
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return Self {
                alpha: 0.0,
                beta: PI / 2.0,
                radius: 0.0,
            };
        }
        Self {
            alpha: offset.z.atan2(offset.x),
            beta: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            radius,
        }
    }

    pub fn to_offset(self) -> Vec3 {
        let (sa, ca) = self.alpha.sin_cos();
        let (sb, cb) = self.beta.sin_cos();
        Vec3::new(ca * sb, cb, sa * sb) * self.radius
    }
}

/// Signed shortest angular distance from `from` to `to`, in `(-π, π]`.
fn shortest_angle(from: f32, to: f32) -> f32 {
    let d = (to - from).rem_euclid(TAU);
    if d > PI { d - TAU } else { d }
}

/// Arc-rotate camera orbiting a fixed target.
/// Camera motion is presentation state; the field never reads it.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub alpha: f32,
    pub beta: f32,
    pub radius: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        let mut cam = Self {
            target: Vec3::ZERO,
            alpha: 0.0,
            beta: PI / 2.0,
            radius: 1.0,
            fov: 45.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
        };
        cam.set_position(Vec3::new(0.0, 3.0, -2.25));
        cam
    }
}

impl OrbitCamera {
    /// Place the eye at `position`, keeping the target.
    pub fn set_position(&mut self, position: Vec3) {
        self.set_spherical(Spherical::from_offset(position - self.target));
    }

    pub fn set_spherical(&mut self, s: Spherical) {
        self.alpha = s.alpha;
        self.beta = s.beta.clamp(BETA_EPSILON, PI - BETA_EPSILON);
        self.radius = s.radius;
    }

    pub fn spherical(&self) -> Spherical {
        Spherical {
            alpha: self.alpha,
            beta: self.beta,
            radius: self.radius,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.target + self.spherical().to_offset()
    }

    /// Orbit by angle deltas in radians.
    pub fn orbit(&mut self, d_alpha: f32, d_beta: f32) {
        self.alpha = (self.alpha + d_alpha).rem_euclid(TAU);
        self.beta = (self.beta + d_beta).clamp(BETA_EPSILON, PI - BETA_EPSILON);
    }

    /// Scale the radius by `factor`, clamped to `[min, max]`.
    pub fn zoom(&mut self, factor: f32, min: f32, max: f32) {
        self.radius = (self.radius * factor).clamp(min, max);
    }

    /// Left-handed: +X is screen right when looking down +Z.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_lh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_lh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Camera preset table with eased transitions and manual override.
///
/// Tapping cycles through the presets; the live camera eases toward the
/// active preset. Orbit and zoom take the camera over until the next cycle
/// or reset.
#[derive(Debug, Clone)]
pub struct CameraRig {
    camera: OrbitCamera,
    presets: Vec<Spherical>,
    index: usize,
    settling: bool,
    transition_speed: f32,
    orbit_sensitivity: f32,
    zoom_sensitivity: f32,
    min_radius: f32,
    max_radius: f32,
}

impl CameraRig {
    /// Build from options, starting exactly on the first preset.
    /// Options are expected to be validated (at least one preset).
    pub fn new(options: &CameraOptions, aspect: f32) -> Self {
        let target = Vec3::from(options.target);
        let mut presets: Vec<Spherical> = options
            .presets
            .iter()
            .map(|p| {
                let mut s = Spherical::from_offset(Vec3::from(*p) - target);
                s.beta = s.beta.clamp(BETA_EPSILON, PI - BETA_EPSILON);
                s
            })
            .collect();
        if presets.is_empty() {
            presets.push(OrbitCamera::default().spherical());
        }

        let mut camera = OrbitCamera {
            target,
            fov: options.fov_degrees.to_radians(),
            aspect,
            near: options.near,
            far: options.far,
            ..OrbitCamera::default()
        };
        camera.set_spherical(presets[0]);

        Self {
            camera,
            presets,
            index: 0,
            settling: false,
            transition_speed: options.transition_speed,
            orbit_sensitivity: options.orbit_sensitivity,
            zoom_sensitivity: options.zoom_sensitivity,
            min_radius: options.min_radius,
            max_radius: options.max_radius,
        }
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn preset_count(&self) -> usize {
        self.presets.len()
    }

    /// Whether the camera is still easing toward its preset.
    pub fn is_settling(&self) -> bool {
        self.settling
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.camera.aspect = aspect;
    }

    /// Move to the next preset, wrapping around.
    pub fn cycle(&mut self) {
        self.index = (self.index + 1) % self.presets.len();
        self.settling = true;
        tracing::debug!(preset = self.index, "camera preset");
    }

    /// Return to the first preset.
    pub fn reset(&mut self) {
        self.index = 0;
        self.settling = true;
    }

    /// Apply a camera action. Returns false for actions the rig ignores.
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::CycleCamera => self.cycle(),
            Action::ResetCamera => self.reset(),
            Action::Orbit(delta) => {
                self.settling = false;
                self.camera.orbit(
                    -delta.x * self.orbit_sensitivity,
                    -delta.y * self.orbit_sensitivity,
                );
            }
            Action::Zoom(lines) => {
                self.settling = false;
                let factor = (1.0 - lines * self.zoom_sensitivity).max(0.1);
                self.camera.zoom(factor, self.min_radius, self.max_radius);
            }
            _ => return false,
        }
        true
    }

    /// Ease the live camera toward the active preset.
    pub fn update(&mut self, dt: f32) {
        if !self.settling {
            return;
        }
        let goal = self.presets[self.index];
        let current = self.camera.spherical();
        let k = 1.0 - (-self.transition_speed * dt.max(0.0)).exp();
        // a non-positive rate can never converge; jump straight to the preset
        if !(self.transition_speed > 0.0) {
            self.camera.set_spherical(goal);
            self.settling = false;
            return;
        }

        let d_alpha = shortest_angle(current.alpha, goal.alpha);
        let d_beta = goal.beta - current.beta;
        let d_radius = goal.radius - current.radius;

        if d_alpha.abs() < 1e-4 && d_beta.abs() < 1e-4 && d_radius.abs() < 1e-4 {
            self.camera.set_spherical(goal);
            self.settling = false;
            return;
        }

        self.camera.set_spherical(Spherical {
            alpha: current.alpha + d_alpha * k,
            beta: current.beta + d_beta * k,
            radius: current.radius + d_radius * k,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn rig() -> CameraRig {
        CameraRig::new(&CameraOptions::default(), 16.0 / 9.0)
    }

    fn settle(rig: &mut CameraRig) {
        for _ in 0..2_000 {
            rig.update(1.0 / 60.0);
            if !rig.is_settling() {
                break;
            }
        }
    }

    #[test]
    fn set_position_round_trips() {
        let mut cam = OrbitCamera::default();
        let p = Vec3::new(0.0, 3.0, -2.25);
        cam.set_position(p);
        assert!((cam.position() - p).length() < 1e-5);
        assert!((cam.radius - 3.75).abs() < 1e-5);
        assert!((cam.alpha + PI / 2.0).abs() < 1e-5);
    }

    #[test]
    fn view_projection_is_finite() {
        let cam = OrbitCamera::default();
        let vp = cam.view_projection();
        assert!(vp.to_cols_array().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn target_projects_to_screen_center() {
        let cam = OrbitCamera::default();
        let clip = cam.view_projection() * cam.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
    }

    #[test]
    fn positive_x_is_screen_right_from_start_view() {
        let cam = OrbitCamera::default();
        let clip = cam.view_projection() * Vec3::X.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x > 0.0, "ndc.x = {}", ndc.x);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn orbit_clamps_beta() {
        let mut cam = OrbitCamera::default();
        cam.orbit(0.0, -10.0);
        assert!(cam.beta >= BETA_EPSILON);
        cam.orbit(0.0, 10.0);
        assert!(cam.beta <= PI - BETA_EPSILON);
    }

    #[test]
    fn zoom_clamps_radius() {
        let mut cam = OrbitCamera::default();
        cam.zoom(0.01, 1.0, 30.0);
        assert_eq!(cam.radius, 1.0);
        cam.zoom(1000.0, 1.0, 30.0);
        assert_eq!(cam.radius, 30.0);
    }

    #[test]
    fn shortest_angle_wraps() {
        assert!((shortest_angle(0.1, TAU - 0.1) + 0.2).abs() < 1e-5);
        assert!((shortest_angle(TAU - 0.1, 0.1) - 0.2).abs() < 1e-5);
    }

    #[test]
    fn rig_starts_on_first_preset() {
        let rig = rig();
        assert_eq!(rig.index(), 0);
        assert!(!rig.is_settling());
        let p = rig.camera().position();
        assert!((p - Vec3::new(0.0, 3.0, -2.25)).length() < 1e-4);
    }

    #[test]
    fn non_positive_transition_speed_snaps_to_preset() {
        for speed in [0.0, -4.0] {
            let options = CameraOptions {
                transition_speed: speed,
                ..CameraOptions::default()
            };
            let mut rig = CameraRig::new(&options, 16.0 / 9.0);
            rig.cycle();
            rig.update(1.0 / 60.0);
            assert!(!rig.is_settling());
            let goal = Vec3::from(options.presets[1]);
            assert!((rig.camera().position() - goal).length() < 1e-3);
        }
    }

    #[test]
    fn cycle_wraps_around_the_table() {
        let mut rig = rig();
        let n = rig.preset_count();
        for _ in 0..n {
            assert!(rig.apply(Action::CycleCamera));
        }
        assert_eq!(rig.index(), 0);
    }

    #[test]
    fn rig_settles_on_the_next_preset() {
        let options = CameraOptions::default();
        let mut rig = CameraRig::new(&options, 1.0);
        rig.cycle();
        settle(&mut rig);
        assert!(!rig.is_settling());
        let expected = Vec3::from(options.presets[1]);
        assert!((rig.camera().position() - expected).length() < 1e-2);
    }

    #[test]
    fn orbit_cancels_transition() {
        let mut rig = rig();
        rig.cycle();
        rig.update(0.01);
        assert!(rig.apply(Action::Orbit(Vec2::new(20.0, 0.0))));
        assert!(!rig.is_settling());
        let before = rig.camera().position();
        rig.update(1.0);
        assert_eq!(rig.camera().position(), before);
    }

    #[test]
    fn zoom_moves_closer() {
        let mut rig = rig();
        let r0 = rig.camera().radius;
        rig.apply(Action::Zoom(1.0));
        assert!(rig.camera().radius < r0);
    }

    #[test]
    fn reset_returns_to_start() {
        let mut rig = rig();
        rig.cycle();
        rig.cycle();
        settle(&mut rig);
        rig.apply(Action::ResetCamera);
        settle(&mut rig);
        assert_eq!(rig.index(), 0);
        let p = rig.camera().position();
        assert!((p - Vec3::new(0.0, 3.0, -2.25)).length() < 1e-2);
    }

    #[test]
    fn non_camera_actions_are_ignored() {
        let mut rig = rig();
        assert!(!rig.apply(Action::TogglePause));
        assert!(!rig.apply(Action::Noop));
    }
}
