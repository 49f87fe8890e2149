/*
 * Environment Module
 *
 * Everything the flock reacts to but does not own: the dome boundary, the
 * camera with the surveyor probe that follows it, the switch props on the
 * dome wall, and the day/night cycle with its easing transition.
 */

use glam::{Mat4, Vec3};

use crate::camera::Camera;
use crate::input::MovementIntent;

pub const DEFAULT_DOME_RADIUS: f32 = 1.5;
/// The camera may roam inside a sphere this many dome radii wide.
pub const CAMERA_BOUND_SCALE: f32 = 2.5;
/// Distance of the surveyor probe in front of the camera.
pub const SURVEYOR_OFFSET: f32 = 0.5;
pub const TRANSITION_STEP: f32 = 0.01;
pub const SWITCH_PROP_COUNT: usize = 4;

const DAY_BACKGROUND: Vec3 = Vec3::new(0.06, 0.03, 0.5);
const NIGHT_BACKGROUND: Vec3 = Vec3::new(0.0, 0.0, 0.1);
const SKY: Vec3 = Vec3::new(0.8, 0.9, 1.0);

/// Day/night flag and the [0, 1] scalar that eases toward it.
#[derive(Debug, Clone, PartialEq)]
pub struct DayNightCycle {
    pub day_mode: bool,
    pub transition: f32,
}

impl DayNightCycle {
    pub fn new(day_mode: bool) -> Self {
        Self {
            day_mode,
            transition: 0.0,
        }
    }

    pub fn set_day_mode(&mut self, day_mode: bool) {
        if self.day_mode != day_mode {
            log::info!("switching to {}", if day_mode { "day" } else { "night" });
        }
        self.day_mode = day_mode;
    }

    /// Move `transition` one step toward 1 (day) or 0 (night).
    pub fn advance(&mut self) {
        let target = if self.day_mode { 1.0 } else { 0.0 };
        if self.transition < target {
            self.transition = (self.transition + TRANSITION_STEP).min(target);
        } else if self.transition > target {
            self.transition = (self.transition - TRANSITION_STEP).max(target);
        }
    }

    pub fn background_color(&self) -> Vec3 {
        let base = if self.day_mode {
            DAY_BACKGROUND
        } else {
            NIGHT_BACKGROUND
        };
        base.lerp(SKY, self.transition)
    }
}

impl Default for DayNightCycle {
    fn default() -> Self {
        Self::new(true)
    }
}

/// A lamp fixed on the dome wall, lit at night.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchProp {
    pub position: Vec3,
    pub lit: bool,
}

impl SwitchProp {
    pub fn model_matrix(&self, size: f32) -> Mat4 {
        Mat4::from_translation(self.position) * Mat4::from_scale(Vec3::splat(size))
    }
}

pub struct EnvironmentModel {
    pub dome_radius: f32,
    pub camera: Camera,
    pub day_night: DayNightCycle,
    pub props: Vec<SwitchProp>,
}

impl EnvironmentModel {
    pub fn new(dome_radius: f32) -> Self {
        let props = (0..SWITCH_PROP_COUNT)
            .map(|i| {
                let angle = i as f32 / SWITCH_PROP_COUNT as f32 * std::f32::consts::TAU;
                SwitchProp {
                    position: Vec3::new(angle.cos(), 0.0, angle.sin()) * dome_radius,
                    lit: false,
                }
            })
            .collect();

        let mut camera = Camera::new();
        camera.position = clamp_to_ball(camera.position, dome_radius * CAMERA_BOUND_SCALE);

        Self {
            dome_radius,
            camera,
            day_night: DayNightCycle::default(),
            props,
        }
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera.position
    }

    /// The probe boids steer away from; it rides ahead of the camera.
    pub fn surveyor_position(&self) -> Vec3 {
        self.camera.position + self.camera.forward() * SURVEYOR_OFFSET
    }

    pub fn camera_bound(&self) -> f32 {
        self.dome_radius * CAMERA_BOUND_SCALE
    }

    /// Back to the default pose, pulled inside the bound for small domes.
    pub fn reset_camera(&mut self) {
        self.camera.reset();
        self.camera.position = clamp_to_ball(self.camera.position, self.camera_bound());
    }

    /// Move and turn the camera from held keys, then keep it in bounds.
    pub fn apply_input(&mut self, intent: &MovementIntent, delta_time: f32) {
        if intent.is_idle() {
            return;
        }

        let (right, up, forward) = intent.axes();
        let step = self.camera.speed * delta_time;
        let translation =
            self.camera.right() * right + Vec3::Y * up + self.camera.forward() * forward;

        self.camera.position += translation * step;
        self.camera.position = clamp_to_ball(self.camera.position, self.camera_bound());
        self.camera.yaw += intent.turn() * self.camera.rotation_speed * delta_time;
    }

    /// Props light up once the sky is more night than day.
    pub fn update_props(&mut self) {
        let lit = self.day_night.transition < 0.5;
        for prop in &mut self.props {
            prop.lit = lit;
        }
    }
}

fn clamp_to_ball(p: Vec3, radius: f32) -> Vec3 {
    if p.length() > radius {
        p.normalize_or_zero() * radius
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_is_clamped_and_monotonic() {
        let mut cycle = DayNightCycle::new(true);
        let mut last = cycle.transition;
        for _ in 0..250 {
            cycle.advance();
            assert!(cycle.transition >= last);
            assert!((0.0..=1.0).contains(&cycle.transition));
            last = cycle.transition;
        }
        assert_eq!(cycle.transition, 1.0);

        cycle.set_day_mode(false);
        for _ in 0..250 {
            cycle.advance();
            assert!(cycle.transition <= last);
            assert!((0.0..=1.0).contains(&cycle.transition));
            last = cycle.transition;
        }
        assert_eq!(cycle.transition, 0.0);
    }

    #[test]
    fn test_background_blends_toward_sky() {
        let mut cycle = DayNightCycle::new(false);
        assert_eq!(cycle.background_color(), NIGHT_BACKGROUND);
        cycle.set_day_mode(true);
        cycle.transition = 1.0;
        assert!((cycle.background_color() - SKY).length() < 1e-6);
    }

    #[test]
    fn test_camera_stays_in_bounds() {
        let mut env = EnvironmentModel::new(1.5);
        let intent = MovementIntent {
            back: true,
            ..Default::default()
        };
        for _ in 0..1000 {
            env.apply_input(&intent, 0.1);
        }
        assert!(env.camera_position().length() <= env.camera_bound() + 1e-4);
    }

    #[test]
    fn test_reset_camera_respects_small_dome() {
        let mut env = EnvironmentModel::new(0.5);
        let intent = MovementIntent {
            left: true,
            ..Default::default()
        };
        env.apply_input(&intent, 0.5);
        env.camera.yaw = 1.0;

        env.reset_camera();
        assert!(env.camera_position().length() <= env.camera_bound() + 1e-4);
        assert!(env.camera_position().length() <= 1.25 + 1e-4);
        assert_eq!(env.camera.yaw, Camera::new().yaw);
    }

    #[test]
    fn test_forward_moves_along_heading() {
        let mut env = EnvironmentModel::new(1.5);
        let start = env.camera_position();
        let intent = MovementIntent {
            forward: true,
            ..Default::default()
        };
        env.apply_input(&intent, 0.1);
        let moved = env.camera_position() - start;
        assert!((moved - Vec3::new(0.0, 0.0, -0.15)).length() < 1e-5);
    }

    #[test]
    fn test_surveyor_follows_camera() {
        let mut env = EnvironmentModel::new(1.5);
        let offset = env.surveyor_position() - env.camera_position();
        assert!((offset.length() - SURVEYOR_OFFSET).abs() < 1e-6);

        env.camera.yaw = std::f32::consts::FRAC_PI_2;
        let offset = env.surveyor_position() - env.camera_position();
        assert!((offset - Vec3::X * SURVEYOR_OFFSET).length() < 1e-5);
    }

    #[test]
    fn test_props_light_at_night() {
        let mut env = EnvironmentModel::new(1.5);
        env.day_night.transition = 1.0;
        env.update_props();
        assert!(env.props.iter().all(|p| !p.lit));
        env.day_night.transition = 0.2;
        env.update_props();
        assert!(env.props.iter().all(|p| p.lit));
        assert_eq!(env.props.len(), SWITCH_PROP_COUNT);
    }
}
