/*
 * Input Module
 *
 * This module turns held keys into movement intents for the camera and
 * forwards raw window events to egui. Movement is read from the set of
 * keys currently down, so holding a key moves the camera every frame.
 *
 * Keys:
 * - Up / Down: move forward / back
 * - Left / Right: strafe
 * - W / S: move up / down
 * - Q / E: turn left / right
 */

use nannou::prelude::*;

use crate::app::Model;

/// Directions requested for this frame. Opposite keys cancel out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementIntent {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

impl MovementIntent {
    /// Build the intent from a "key held" query.
    pub fn from_held(is_held: impl Fn(Key) -> bool) -> Self {
        Self {
            forward: is_held(Key::Up),
            back: is_held(Key::Down),
            left: is_held(Key::Left),
            right: is_held(Key::Right),
            up: is_held(Key::W),
            down: is_held(Key::S),
            turn_left: is_held(Key::Q),
            turn_right: is_held(Key::E),
        }
    }

    pub fn from_app(app: &App) -> Self {
        Self::from_held(|key| app.keys.down.contains(&key))
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }

    // (right, up, forward) in -1..=1 per axis
    pub fn axes(&self) -> (f32, f32, f32) {
        (
            axis(self.right, self.left),
            axis(self.up, self.down),
            axis(self.forward, self.back),
        )
    }

    pub fn turn(&self) -> f32 {
        axis(self.turn_right, self.turn_left)
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

// Key pressed event handler
pub fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    // Ignore shortcuts while typing into a widget
    if model.egui.ctx().wants_keyboard_input() {
        return;
    }

    match key {
        Key::N => {
            let day = !model.environment.day_night.day_mode;
            model.environment.day_night.set_day_mode(day);
        }
        Key::R => model.environment.reset_camera(),
        Key::Space => model.config.pause_simulation = !model.config.pause_simulation,
        _ => {}
    }
}

// Keep the projection in sync with the window size
pub fn resized(_app: &App, model: &mut Model, size: Vec2) {
    model.environment.camera.set_viewport(size.x, size.y);
}

// Handle raw window events for egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
