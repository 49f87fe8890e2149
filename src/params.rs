/*
 * Simulation Config Module
 *
 * This module defines the SimulationConfig struct that contains all the
 * runtime-tunable parameters of the firefly flock. The caller owns it and
 * passes it by reference into every simulator tick; the UI edits it between
 * ticks. It also provides snapshot-based change detection and the slider
 * ranges used by the UI.
 */

use std::fmt;

/// What happens to a boid that leaves the dome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Project the position back onto the dome and mirror the velocity
    /// about the outward normal.
    Reflect,
    /// Project the position back onto the dome, velocity untouched.
    Clamp,
}

impl BoundaryPolicy {
    pub const ALL: [BoundaryPolicy; 2] = [BoundaryPolicy::Reflect, BoundaryPolicy::Clamp];
}

impl fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryPolicy::Reflect => write!(f, "Reflect"),
            BoundaryPolicy::Clamp => write!(f, "Clamp"),
        }
    }
}

// Parameters for the simulation that can be adjusted via UI
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub num_boids: usize,
    pub boid_size: f32,
    pub boid_speed: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    /// Global distance under which two boids push each other apart.
    pub separation_distance: f32,
    pub avoidance_weight: f32,
    pub distance_min_to_camera: f32,
    pub camera_avoidance: bool,
    /// Scale the global weights by each boid's own drawn weights.
    pub personal_weights: bool,
    pub auto_day_night: bool,
    /// Tint females toward red by an exponential-sampled factor.
    pub female_blush: bool,
    pub boundary_policy: BoundaryPolicy,
    /// Target vertex count of the procedural boid mesh.
    pub mesh_vertex_budget: usize,
    pub show_debug: bool,
    pub pause_simulation: bool,

    // Internal state for tracking changes
    previous_values: Option<ConfigSnapshot>,
}

// A snapshot of parameter values used for change detection
#[derive(Debug, Clone, PartialEq)]
struct ConfigSnapshot {
    num_boids: usize,
    boid_size: f32,
    boid_speed: f32,
    alignment_weight: f32,
    cohesion_weight: f32,
    separation_distance: f32,
    avoidance_weight: f32,
    distance_min_to_camera: f32,
    camera_avoidance: bool,
    personal_weights: bool,
    auto_day_night: bool,
    female_blush: bool,
    boundary_policy: BoundaryPolicy,
    mesh_vertex_budget: usize,
    show_debug: bool,
    pause_simulation: bool,
}

/// What changed since the last snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigChanges {
    pub num_boids: bool,
    pub boundary_policy: bool,
    pub mesh_vertex_budget: bool,
    pub any: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_boids: 100,
            boid_size: 0.1,
            boid_speed: 2.5,
            alignment_weight: 0.1,
            cohesion_weight: 0.1,
            separation_distance: 0.1,
            avoidance_weight: 0.2,
            distance_min_to_camera: 0.2,
            camera_avoidance: true,
            personal_weights: false,
            auto_day_night: false,
            female_blush: false,
            boundary_policy: BoundaryPolicy::Reflect,
            mesh_vertex_budget: 768,
            show_debug: false,
            pause_simulation: false,
            previous_values: None,
        }
    }
}

impl SimulationConfig {
    fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            num_boids: self.num_boids,
            boid_size: self.boid_size,
            boid_speed: self.boid_speed,
            alignment_weight: self.alignment_weight,
            cohesion_weight: self.cohesion_weight,
            separation_distance: self.separation_distance,
            avoidance_weight: self.avoidance_weight,
            distance_min_to_camera: self.distance_min_to_camera,
            camera_avoidance: self.camera_avoidance,
            personal_weights: self.personal_weights,
            auto_day_night: self.auto_day_night,
            female_blush: self.female_blush,
            boundary_policy: self.boundary_policy,
            mesh_vertex_budget: self.mesh_vertex_budget,
            show_debug: self.show_debug,
            pause_simulation: self.pause_simulation,
        }
    }

    // Take a snapshot of current parameter values for change detection
    pub fn take_snapshot(&mut self) {
        self.previous_values = Some(self.snapshot());
    }

    // Check if any parameters have changed since the last snapshot
    pub fn detect_changes(&self) -> ConfigChanges {
        let Some(prev) = &self.previous_values else {
            return ConfigChanges::default();
        };

        ConfigChanges {
            num_boids: self.num_boids != prev.num_boids,
            boundary_policy: self.boundary_policy != prev.boundary_policy,
            mesh_vertex_budget: self.mesh_vertex_budget != prev.mesh_vertex_budget,
            any: self.snapshot() != *prev,
        }
    }

    // Get parameter ranges for UI sliders
    pub fn num_boids_range() -> std::ops::RangeInclusive<usize> {
        0..=500
    }

    pub fn boid_size_range() -> std::ops::RangeInclusive<f32> {
        0.1..=1.0
    }

    pub fn boid_speed_range() -> std::ops::RangeInclusive<f32> {
        1.0..=10.0
    }

    pub fn weight_range() -> std::ops::RangeInclusive<f32> {
        0.0..=1.0
    }

    pub fn separation_distance_range() -> std::ops::RangeInclusive<f32> {
        0.1..=2.0
    }

    pub fn camera_distance_range() -> std::ops::RangeInclusive<f32> {
        0.0..=1.0
    }

    pub fn mesh_vertex_budget_range() -> std::ops::RangeInclusive<usize> {
        96..=6144
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_changes_without_snapshot() {
        let mut config = SimulationConfig::default();
        config.num_boids = 3;
        assert_eq!(config.detect_changes(), ConfigChanges::default());
    }

    #[test]
    fn test_detects_population_change() {
        let mut config = SimulationConfig::default();
        config.take_snapshot();
        config.num_boids = 10;
        let changes = config.detect_changes();
        assert!(changes.num_boids);
        assert!(changes.any);
        assert!(!changes.boundary_policy);
    }

    #[test]
    fn test_detects_weight_change_as_generic_change() {
        let mut config = SimulationConfig::default();
        config.take_snapshot();
        config.cohesion_weight = 0.5;
        let changes = config.detect_changes();
        assert!(changes.any);
        assert!(!changes.num_boids);
        assert!(!changes.mesh_vertex_budget);
    }

    #[test]
    fn test_defaults_sit_inside_slider_ranges() {
        let config = SimulationConfig::default();
        assert!(SimulationConfig::num_boids_range().contains(&config.num_boids));
        assert!(SimulationConfig::boid_size_range().contains(&config.boid_size));
        assert!(SimulationConfig::boid_speed_range().contains(&config.boid_speed));
        assert!(SimulationConfig::separation_distance_range().contains(&config.separation_distance));
        assert!(SimulationConfig::mesh_vertex_budget_range().contains(&config.mesh_vertex_budget));
    }
}
