/*
 * Debug Information Module
 *
 * This module defines the DebugInfo struct that contains performance metrics
 * and flock statistics to be displayed in the UI.
 *
 * Includes metrics for:
 * - FPS (frames per second)
 * - Frame time
 * - Simulation ticks and clock
 * - Population and how many boids are excited
 * - Day/night transition
 */

use std::time::Duration;

use crate::environment::DayNightCycle;
use crate::flock::FlockSimulator;

// Debug information to display
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub ticks: u64,
    pub clock: f32,
    pub population: usize,
    pub excited: usize,
    pub transition: f32,
    pub day_mode: bool,
}

impl DebugInfo {
    /// Refresh the flock statistics after a tick.
    pub fn record(&mut self, simulator: &FlockSimulator, day_night: &DayNightCycle) {
        self.ticks = simulator.ticks();
        self.clock = simulator.clock();
        self.population = simulator.boids().len();
        self.excited = simulator.excited_count();
        self.transition = day_night.transition;
        self.day_mode = day_night.day_mode;
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("FPS: {:.1}", self.fps),
            format!("Frame time: {:.2} ms", self.frame_time.as_secs_f64() * 1000.0),
            format!("Ticks: {} ({:.1} s)", self.ticks, self.clock),
            format!("Boids: {} ({} excited)", self.population, self.excited),
            format!(
                "{}: transition {:.2}",
                if self.day_mode { "Day" } else { "Night" },
                self.transition
            ),
        ]
    }
}
