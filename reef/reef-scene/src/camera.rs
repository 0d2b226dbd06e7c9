//! Orbit camera and the input events that drive it.

use glam::{Mat4, Vec3};

#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    /// World units per key press.
    pub move_step: f32,
    /// Degrees per key press.
    pub rotate_step: f32,
    /// Degrees per pixel of drag.
    pub drag_sensitivity: f32,
    pub pitch_limit: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub scroll_step: f32,
    pub initial_position: Vec3,
    pub initial_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            move_step: 0.5,
            rotate_step: 5.0,
            drag_sensitivity: 0.2,
            pitch_limit: 89.0,
            min_distance: 2.0,
            max_distance: 50.0,
            scroll_step: 1.0,
            initial_position: Vec3::new(0.0, 0.0, 10.0),
            initial_distance: 10.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    /// Degrees about Y.
    pub yaw: f32,
    /// Degrees about X, within the configured limit.
    pub pitch: f32,
    /// Zoom distance.
    pub distance: f32,
    pub dragging: bool,
    pub last_cursor: (f64, f64),
}

impl CameraState {
    /// Applied to a point in order: zoom translate, position translate, pitch, yaw.
    pub fn view_matrix(&self) -> Mat4 {
        let mut view = Mat4::IDENTITY;
        view = Mat4::from_translation(Vec3::new(0.0, 0.0, -self.distance)) * view;
        view = Mat4::from_translation(-self.position) * view;
        view = Mat4::from_rotation_x(self.pitch.to_radians()) * view;
        Mat4::from_rotation_y(self.yaw.to_radians()) * view
    }
}

/// The two wheel "buttons".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDirection {
    /// Zoom in.
    Up,
    /// Zoom out.
    Down,
}

#[derive(Clone, Debug)]
pub struct CameraController {
    config: CameraConfig,
    state: CameraState,
}

impl CameraController {
    pub fn new(config: CameraConfig) -> Self {
        let state = CameraState {
            position: config.initial_position,
            yaw: 0.0,
            pitch: 0.0,
            distance: config.initial_distance.clamp(config.min_distance, config.max_distance),
            dragging: false,
            last_cursor: (0.0, 0.0),
        };
        Self { config, state }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.state.view_matrix()
    }

    /// w/s move along Z, a/d along X, r/f along Y, q/e turn. Keys are case-sensitive; returns false
    /// for unbound keys.
    pub fn key_press(&mut self, key: char) -> bool {
        let step = self.config.move_step;
        let s = &mut self.state;
        match key {
            'w' => s.position.z -= step,
            's' => s.position.z += step,
            'a' => s.position.x -= step,
            'd' => s.position.x += step,
            'r' => s.position.y += step,
            'f' => s.position.y -= step,
            'q' => s.yaw -= self.config.rotate_step,
            'e' => s.yaw += self.config.rotate_step,
            _ => return false,
        }
        log::debug!("camera at {} yaw {}", s.position, s.yaw);
        true
    }

    /// Left button press or release at cursor `(x, y)`.
    pub fn mouse_button(&mut self, pressed: bool, x: f64, y: f64) {
        self.state.dragging = pressed;
        self.state.last_cursor = (x, y);
    }

    /// Cursor moved; rotates only while dragging.
    pub fn mouse_motion(&mut self, x: f64, y: f64) {
        if !self.state.dragging {
            return;
        }
        let (last_x, last_y) = self.state.last_cursor;
        let dx = (x - last_x) as f32;
        let dy = (y - last_y) as f32;
        let limit = self.config.pitch_limit;
        self.state.yaw += dx * self.config.drag_sensitivity;
        self.state.pitch = (self.state.pitch + dy * self.config.drag_sensitivity).clamp(-limit, limit);
        self.state.last_cursor = (x, y);
    }

    pub fn scroll(&mut self, direction: ScrollDirection) {
        let delta = match direction {
            ScrollDirection::Up => -self.config.scroll_step,
            ScrollDirection::Down => self.config.scroll_step,
        };
        self.state.distance =
            (self.state.distance + delta).clamp(self.config.min_distance, self.config.max_distance);
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn view_composition_order() {
        let state = CameraState {
            position: Vec3::new(1.0, 2.0, 3.0),
            yaw: 30.0,
            pitch: 15.0,
            distance: 10.0,
            dragging: false,
            last_cursor: (0.0, 0.0),
        };
        let expected = Mat4::from_rotation_y(30f32.to_radians())
            * Mat4::from_rotation_x(15f32.to_radians())
            * Mat4::from_translation(Vec3::new(-1.0, -2.0, -3.0))
            * Mat4::from_translation(Vec3::new(0.0, 0.0, -10.0));
        let got = state.view_matrix().to_cols_array();
        for (g, e) in got.iter().zip(expected.to_cols_array()) {
            assert_relative_eq!(*g, e, epsilon = 1e-5);
        }
    }

    #[test]
    fn default_camera_looks_from_twenty_back() {
        let cam = CameraController::default();
        let p = cam.view_matrix().transform_point3(Vec3::ZERO);
        assert_relative_eq!(p.z, -20.0, epsilon = 1e-5);
    }

    #[test]
    fn keys_move_and_turn() {
        let mut cam = CameraController::default();
        assert!(cam.key_press('w'));
        assert!(cam.key_press('d'));
        assert!(cam.key_press('r'));
        assert!(cam.key_press('e'));
        assert!(!cam.key_press('x'));
        // bindings are lowercase only
        assert!(!cam.key_press('W'));
        assert!(!cam.key_press('E'));
        let s = cam.state();
        assert_eq!(s.position, Vec3::new(0.5, 0.5, 9.5));
        assert_eq!(s.yaw, 5.0);
    }

    #[test]
    fn drag_rotates_only_while_pressed() {
        let mut cam = CameraController::default();
        cam.mouse_motion(100.0, 100.0);
        assert_eq!(cam.state().yaw, 0.0);
        cam.mouse_button(true, 100.0, 100.0);
        cam.mouse_motion(110.0, 105.0);
        assert_relative_eq!(cam.state().yaw, 2.0);
        assert_relative_eq!(cam.state().pitch, 1.0);
        cam.mouse_button(false, 110.0, 105.0);
        cam.mouse_motion(500.0, 500.0);
        assert_relative_eq!(cam.state().yaw, 2.0);
    }

    #[test]
    fn pitch_and_zoom_stay_clamped() {
        let mut cam = CameraController::default();
        let mut rng = StdRng::seed_from_u64(11);
        cam.mouse_button(true, 0.0, 0.0);
        let (mut x, mut y) = (0.0, 0.0);
        for _ in 0..500 {
            x += rng.gen_range(-2000.0..2000.0);
            y += rng.gen_range(-2000.0..2000.0);
            cam.mouse_motion(x, y);
            let pitch = cam.state().pitch;
            assert!((-89.0..=89.0).contains(&pitch));

            let dir = if rng.gen_bool(0.5) {
                ScrollDirection::Up
            } else {
                ScrollDirection::Down
            };
            cam.scroll(dir);
            assert!((2.0..=50.0).contains(&cam.state().distance));
        }
        for _ in 0..100 {
            cam.scroll(ScrollDirection::Up);
        }
        assert_eq!(cam.state().distance, 2.0);
        for _ in 0..100 {
            cam.scroll(ScrollDirection::Down);
        }
        assert_eq!(cam.state().distance, 50.0);
    }
}
