//! The free-flying camera that drives the primary view.
//!
//! A [`Camera`] owns a [`Transform`] and derives its optical parameters from
//! the window width: vertical field of view and focal length are kept
//! mutually consistent through `focal_length = width / (2 * tan(fov / 2))`,
//! and setting either recomputes the other.
//!
//! Per-frame input maps onto pose mutations: W/S/A/D translate along the
//! camera's local axes, and cursor movement yaws about the world up axis and
//! pitches about the local right axis.

use glam::{Vec2, Vec3};
use winit::keyboard::KeyCode;

use crate::input::Input;
use crate::transform::{Space, Transform};

/// A free-flying perspective camera.
pub struct Camera {
    transform: Transform,
    fov_y_degrees: f32,
    focal_length: f32,
    near_clip: f32,
    far_clip: f32,
    /// Movement speed in scene units per second.
    pub move_speed: f32,
    /// Degrees of rotation per pixel of cursor travel.
    pub look_sensitivity: f32,
    /// Cursor position seen on the previous call; `None` until the first
    /// input sample arrives, so a fresh camera never interprets the initial
    /// cursor position as movement.
    last_cursor: Option<Vec2>,
}

impl Camera {
    /// Creates a camera with the given vertical field of view for a window
    /// of `window_width` pixels.
    pub fn new(fov_y_degrees: f32, window_width: u32) -> Self {
        let mut camera = Self {
            transform: Transform::new(),
            fov_y_degrees: 0.0,
            focal_length: 0.0,
            near_clip: 0.0,
            far_clip: 100.0,
            move_speed: 15.0,
            look_sensitivity: 0.05,
            last_cursor: None,
        };
        camera.set_fov_y(fov_y_degrees, window_width);
        camera
    }

    /// Sets the vertical field of view in degrees and recomputes the focal
    /// length for the given window width.
    pub fn set_fov_y(&mut self, degrees: f32, window_width: u32) {
        self.fov_y_degrees = degrees;
        self.focal_length = window_width as f32 / (2.0 * (degrees.to_radians() / 2.0).tan());
    }

    /// Sets the focal length in scene units and recomputes the field of view
    /// for the given window width. Exact inverse of [`Camera::set_fov_y`]
    /// for the same width.
    pub fn set_focal_length(&mut self, focal_length: f32, window_width: u32) {
        self.focal_length = focal_length;
        self.fov_y_degrees = (2.0 * (window_width as f32 / (2.0 * focal_length)).atan()).to_degrees();
    }

    /// Clamped to the range `[0, far_clip]`, so the plane pair stays
    /// ordered no matter which plane moved last.
    pub fn set_near_clip(&mut self, near_clip: f32) {
        self.near_clip = near_clip.clamp(0.0, self.far_clip);
    }

    /// Clamped to `>= near_clip`.
    pub fn set_far_clip(&mut self, far_clip: f32) {
        self.far_clip = far_clip.max(self.near_clip);
    }

    pub fn fov_y_degrees(&self) -> f32 {
        self.fov_y_degrees
    }

    pub fn focal_length(&self) -> f32 {
        self.focal_length
    }

    pub fn near_clip(&self) -> f32 {
        self.near_clip
    }

    pub fn far_clip(&self) -> f32 {
        self.far_clip
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Applies one frame of input to the camera pose.
    ///
    /// Held movement keys combine, so forward+right moves diagonally. The
    /// first call only records the cursor baseline; every later call rotates
    /// by the cursor delta since the previous one.
    pub fn process_input(&mut self, input: &Input, delta_time: f32) {
        let step = self.move_speed * delta_time;

        if input.key_down(KeyCode::KeyW) {
            self.transform.translate(Vec3::new(0.0, 0.0, -step), Space::Local);
        }
        if input.key_down(KeyCode::KeyS) {
            self.transform.translate(Vec3::new(0.0, 0.0, step), Space::Local);
        }
        if input.key_down(KeyCode::KeyA) {
            self.transform.translate(Vec3::new(-step, 0.0, 0.0), Space::Local);
        }
        if input.key_down(KeyCode::KeyD) {
            self.transform.translate(Vec3::new(step, 0.0, 0.0), Space::Local);
        }

        let cursor = input.cursor_position();
        if let Some(last) = self.last_cursor {
            let delta = cursor - last;
            self.transform
                .rotate(-delta.x * self.look_sensitivity, Vec3::Y, Space::Global);
            self.transform
                .rotate(-delta.y * self.look_sensitivity, Vec3::X, Space::Local);
        }
        self.last_cursor = Some(cursor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fov_45_at_1920_gives_expected_focal_length() {
        let camera = Camera::new(45.0, 1920);
        let expected = 2318.8;
        assert!((camera.focal_length() - expected).abs() < expected * 0.001);
    }

    #[test]
    fn fov_and_focal_length_are_inverse() {
        let mut camera = Camera::new(60.0, 1280);

        camera.set_focal_length(900.0, 1280);
        let fov = camera.fov_y_degrees();
        camera.set_fov_y(fov, 1280);

        assert!((camera.focal_length() - 900.0).abs() < 1e-2);
    }

    #[test]
    fn clip_planes_stay_ordered() {
        let mut camera = Camera::new(45.0, 800);
        let ordered = |c: &Camera| c.near_clip() >= 0.0 && c.near_clip() <= c.far_clip();

        camera.set_near_clip(-5.0);
        assert_eq!(camera.near_clip(), 0.0);
        assert!(ordered(&camera));

        // Raising near past far pins it to far.
        camera.set_near_clip(200.0);
        assert_eq!(camera.near_clip(), camera.far_clip());
        assert!(ordered(&camera));

        // Dropping far below near drags far up to near.
        camera.set_near_clip(10.0);
        assert!(ordered(&camera));
        camera.set_far_clip(3.0);
        assert!(ordered(&camera));

        // And the other order: shrink far first, then overshoot near.
        camera.set_near_clip(0.0);
        camera.set_far_clip(3.0);
        assert_eq!(camera.far_clip(), 3.0);
        camera.set_near_clip(10.0);
        assert_eq!(camera.near_clip(), 3.0);
        assert!(ordered(&camera));

        camera.set_far_clip(200.0);
        assert_eq!(camera.far_clip(), 200.0);
        assert!(ordered(&camera));
    }

    #[test]
    fn first_input_only_establishes_cursor_baseline() {
        let mut camera = Camera::new(45.0, 800);
        let before = camera.transform().model_matrix();

        let mut input = Input::new();
        input.on_cursor_moved(Vec2::new(640.0, 210.0));
        camera.process_input(&input, 0.016);

        assert_eq!(camera.transform().model_matrix(), before);

        // The second call rotates by the delta from the baseline.
        input.on_cursor_moved(Vec2::new(660.0, 210.0));
        camera.process_input(&input, 0.016);
        assert_ne!(camera.transform().model_matrix(), before);
    }

    #[test]
    fn held_keys_translate_along_local_axes() {
        let mut camera = Camera::new(45.0, 800);
        let mut input = Input::new();
        input.on_key(KeyCode::KeyW, true);
        input.on_key(KeyCode::KeyD, true);

        camera.process_input(&input, 1.0);

        // Forward and right combine; no vertical drift.
        let p = camera.transform().position();
        assert!((p.x - camera.move_speed).abs() < 1e-4);
        assert_eq!(p.y, 0.0);
        assert!((p.z + camera.move_speed).abs() < 1e-4);
    }

    #[test]
    fn yaw_then_forward_moves_along_view_direction() {
        let mut camera = Camera::new(45.0, 800);
        let mut input = Input::new();

        // Establish baseline, then sweep the cursor left by 90° worth.
        input.on_cursor_moved(Vec2::ZERO);
        camera.process_input(&input, 0.0);
        input.on_cursor_moved(Vec2::new(-90.0 / camera.look_sensitivity, 0.0));
        camera.process_input(&input, 0.0);

        input.on_key(KeyCode::KeyW, true);
        camera.process_input(&input, 1.0);

        // Yawed +90° about world up: local -Z now points along world -X.
        let p = camera.transform().position();
        assert!((p.x + camera.move_speed).abs() < 1e-3);
        assert!(p.z.abs() < 1e-3);
    }
}
