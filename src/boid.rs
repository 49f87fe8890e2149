/*
 * Boid Module
 *
 * This module defines the Boid struct: one firefly's kinematics, its
 * personal behavioral weights drawn at birth, its flicker ("Markov")
 * state with the timer that schedules the next check, and the color
 * derived from that state for rendering.
 */

use glam::{Mat4, Vec3};

use crate::random::RandomModel;

pub const FEMALE_RATIO: f32 = 0.2;
pub const PERSONAL_WEIGHT_MEAN: f32 = 0.75;
pub const PERSONAL_WEIGHT_STDDEV: f32 = 0.1;
pub const INTERACTION_RADIUS_MIN: f32 = 0.2;
pub const INTERACTION_RADIUS_MAX: f32 = 0.6;
/// Rate of the exponential timer between two flicker checks, per second.
pub const MARKOV_LAMBDA: f32 = 1.0;
pub const LIFESPAN_LAMBDA: f32 = 0.05;
/// More neighbors than this turns a boid's light on.
pub const EXCITED_NEIGHBOR_THRESHOLD: usize = 5;

const DAY_FEMALE: Vec3 = Vec3::new(0.0, 1.0, 0.0);
const DAY_OTHER: Vec3 = Vec3::new(1.0, 0.5, 0.2);
const NIGHT_FEMALE: Vec3 = Vec3::new(0.0, 0.5, 0.0);
const NIGHT_OTHER: Vec3 = Vec3::new(1.0, 0.0, 0.1);
const GLOW: Vec3 = Vec3::new(1.0, 0.95, 0.6);
const BLUSH: Vec3 = Vec3::new(1.0, 0.0, 0.0);

/// Binary flicker mode of a boid. Despite the name there is no transition
/// matrix: the state is a threshold on the current neighbor count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkovState {
    #[default]
    Calm,
    Excited,
}

impl MarkovState {
    pub fn from_neighbor_count(count: usize) -> Self {
        if count > EXCITED_NEIGHBOR_THRESHOLD {
            MarkovState::Excited
        } else {
            MarkovState::Calm
        }
    }
}

#[derive(Debug, Clone)]
pub struct Boid {
    pub position: Vec3,
    pub velocity: Vec3,
    pub is_female: bool,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub separation_weight: f32,
    pub interaction_radius: f32,
    pub markov_state: MarkovState,
    /// Simulation time of the next scheduled flicker check.
    pub markov_time: f32,
    // Drawn at birth, never consulted.
    pub lifespan: f32,
    pub color: Vec3,
}

impl Boid {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position,
            velocity,
            is_female: false,
            alignment_weight: PERSONAL_WEIGHT_MEAN,
            cohesion_weight: PERSONAL_WEIGHT_MEAN,
            separation_weight: PERSONAL_WEIGHT_MEAN,
            interaction_radius: INTERACTION_RADIUS_MIN,
            markov_state: MarkovState::Calm,
            markov_time: 0.0,
            lifespan: 0.0,
            color: DAY_OTHER,
        }
    }

    /// A freshly initialized boid somewhere inside the dome, heading in a
    /// random direction at `speed`, first flicker check scheduled after `now`.
    pub fn spawn(random: &mut RandomModel, dome_radius: f32, speed: f32, now: f32) -> Self {
        let position = random.point_in_ball(dome_radius);
        let velocity = random.spherical_rand(speed);

        Self {
            position,
            velocity,
            is_female: random.chance(FEMALE_RATIO),
            alignment_weight: random.approx_normal(PERSONAL_WEIGHT_MEAN, PERSONAL_WEIGHT_STDDEV),
            cohesion_weight: random.approx_normal(PERSONAL_WEIGHT_MEAN, PERSONAL_WEIGHT_STDDEV),
            separation_weight: random.approx_normal(PERSONAL_WEIGHT_MEAN, PERSONAL_WEIGHT_STDDEV),
            interaction_radius: random.uniform(INTERACTION_RADIUS_MIN, INTERACTION_RADIUS_MAX),
            markov_state: MarkovState::Calm,
            markov_time: now + random.exponential(MARKOV_LAMBDA),
            lifespan: random.exponential(LIFESPAN_LAMBDA),
            color: DAY_OTHER,
        }
    }

    pub fn is_excited(&self) -> bool {
        self.markov_state == MarkovState::Excited
    }

    /// Translation to the boid's position, uniform scale of `size`.
    pub fn model_matrix(&self, size: f32) -> Mat4 {
        Mat4::from_translation(self.position) * Mat4::from_scale(Vec3::splat(size))
    }
}

/// Palette color for a boid, before any flicker glow.
pub fn base_color(day_mode: bool, is_female: bool) -> Vec3 {
    match (day_mode, is_female) {
        (true, true) => DAY_FEMALE,
        (true, false) => DAY_OTHER,
        (false, true) => NIGHT_FEMALE,
        (false, false) => NIGHT_OTHER,
    }
}

/// Render color from the boid's state. `blush` in [0, 1] tints females
/// toward red; it has no effect on males.
pub fn boid_color(day_mode: bool, is_female: bool, state: MarkovState, blush: f32) -> Vec3 {
    let mut color = base_color(day_mode, is_female);
    if is_female && blush > 0.0 {
        color = color.lerp(BLUSH, blush.clamp(0.0, 1.0));
    }
    if state == MarkovState::Excited {
        color = color.lerp(GLOW, 0.5);
    }
    color
}
