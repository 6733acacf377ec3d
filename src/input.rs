use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Tracks keyboard state and the absolute cursor position.
///
/// Events accumulate between frames; [`Input::begin_frame`] clears the
/// per-frame "pressed" set while held keys and the cursor position persist.
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    cursor_position: Vec2,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            keys_down: HashSet::new(),
            keys_pressed: HashSet::new(),
            cursor_position: Vec2::ZERO,
        }
    }
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the start of each frame to reset per-frame state.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.on_key(key, event.state == ElementState::Pressed);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.on_cursor_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            _ => {}
        }
    }

    pub(crate) fn on_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            if !self.keys_down.contains(&key) {
                self.keys_pressed.insert(key);
            }
            self.keys_down.insert(key);
        } else {
            self.keys_down.remove(&key);
        }
    }

    pub(crate) fn on_cursor_moved(&mut self, position: Vec2) {
        self.cursor_position = position;
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Current cursor position in window coordinates.
    pub fn cursor_position(&self) -> Vec2 {
        self.cursor_position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressed_is_cleared_per_frame_but_down_persists() {
        let mut input = Input::new();
        input.on_key(KeyCode::KeyW, true);
        assert!(input.key_pressed(KeyCode::KeyW));
        assert!(input.key_down(KeyCode::KeyW));

        input.begin_frame();
        assert!(!input.key_pressed(KeyCode::KeyW));
        assert!(input.key_down(KeyCode::KeyW));

        input.on_key(KeyCode::KeyW, false);
        assert!(!input.key_down(KeyCode::KeyW));
    }

    #[test]
    fn repeat_presses_do_not_retrigger() {
        let mut input = Input::new();
        input.on_key(KeyCode::Escape, true);
        input.begin_frame();
        // OS key repeat delivers another press while still held.
        input.on_key(KeyCode::Escape, true);
        assert!(!input.key_pressed(KeyCode::Escape));
    }
}
