/*
 * Random Model Module
 *
 * This module wraps the single random generator shared by the whole
 * simulation and exposes the draws the flock needs: uniform, approximately
 * normal, spherical, exponential and the Poisson parity used to flip
 * day and night in auto mode.
 */

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of every random draw in the simulation.
///
/// Seed it once at startup with [`RandomModel::from_clock`], or with
/// [`RandomModel::seeded`] when a run has to be reproducible.
pub struct RandomModel {
    rng: StdRng,
    seed: u64,
}

impl RandomModel {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed from the wall clock.
    pub fn from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Self::seeded(seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform draw in `[min, max)`. Returns `min` for an empty range.
    pub fn uniform(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// Irwin-Hall approximation of a normal draw: twelve unit uniforms
    /// summed and recentred. Tails are bounded to `mean ± 6 * stddev`.
    pub fn approx_normal(&mut self, mean: f32, stddev: f32) -> f32 {
        let sum: f32 = (0..12).map(|_| self.rng.gen::<f32>()).sum();
        mean + (sum - 6.0) * stddev
    }

    /// Point on the sphere of the given radius with `theta ~ U(0, 2π)` and
    /// `phi ~ U(0, π)`. Not area-uniform: the poles are oversampled.
    pub fn spherical_rand(&mut self, radius: f32) -> Vec3 {
        let theta = self.uniform(0.0, 2.0 * PI);
        let phi = self.uniform(0.0, PI);
        Vec3::new(
            radius * phi.sin() * theta.cos(),
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
        )
    }

    /// Inverse-CDF exponential draw with rate `lambda`.
    pub fn exponential(&mut self, lambda: f32) -> f32 {
        // gen::<f32>() is in [0, 1) so 1 - u never hits zero
        let u: f32 = self.rng.gen();
        -(1.0 - u).ln() / lambda
    }

    /// Draws a Poisson count by multiplying uniforms until the product
    /// drops under `e^-lambda`, and reports whether that count is even.
    pub fn poisson_switch_parity(&mut self, lambda: f32) -> bool {
        poisson_count(lambda, || self.rng.gen::<f32>()) % 2 == 0
    }

    /// Bernoulli draw.
    pub fn chance(&mut self, probability: f32) -> bool {
        self.rng.gen::<f32>() < probability
    }

    /// Uniform point inside the ball of the given radius (rejection sampled
    /// from the enclosing cube).
    pub fn point_in_ball(&mut self, radius: f32) -> Vec3 {
        if radius <= 0.0 {
            return Vec3::ZERO;
        }
        loop {
            let p = Vec3::new(
                self.uniform(-radius, radius),
                self.uniform(-radius, radius),
                self.uniform(-radius, radius),
            );
            if p.length_squared() <= radius * radius {
                return p;
            }
        }
    }
}

// Knuth's multiplication method, with the uniform source injected so the
// threshold logic can be checked without a generator.
fn poisson_count(lambda: f32, mut next_uniform: impl FnMut() -> f32) -> u32 {
    let threshold = (-lambda).exp();
    let mut product = 1.0;
    let mut count = 0;
    loop {
        product *= next_uniform();
        if product <= threshold {
            return count;
        }
        count += 1;
    }
}
