/*
 * Flock Simulator Module
 *
 * This module owns the boid population and advances it one tick at a time.
 * Each tick runs in a fixed order:
 * 1. Population reconciliation (grow by appending, shrink by truncating)
 * 2. Pairwise interaction pass, O(n²): separation inside a global
 *    distance threshold, alignment and cohesion over the whole flock
 * 3. Force application, Euler integration and dome containment
 * 4. Flicker ("Markov") state from each boid's local neighbor count
 * 5. Colors
 * 6. Day/night transition easing
 *
 * Degenerate vectors (coincident boids, a boid sitting on the flock
 * centroid, a flock of one) contribute nothing instead of producing NaN.
 */

use glam::{Mat4, Vec3};

use crate::boid::{boid_color, Boid, MarkovState, MARKOV_LAMBDA};
use crate::environment::EnvironmentModel;
use crate::frame::{DrawParams, FrameUniforms, RenderableFrame};
use crate::mesh::MeshRef;
use crate::params::{BoundaryPolicy, SimulationConfig};
use crate::random::RandomModel;

/// Below this length a vector has no usable direction.
pub const DEGENERATE_LENGTH: f32 = 1e-6;
/// Poisson rate of the auto day/night switch.
pub const DAY_NIGHT_LAMBDA: f32 = 1.0;
pub const BLUSH_LAMBDA: f32 = 4.0;

const SURVEYOR_SIZE: f32 = 0.05;
const SURVEYOR_COLOR: Vec3 = Vec3::new(0.9, 0.9, 0.9);
const PROP_SIZE: f32 = 0.08;
const PROP_LIT: Vec3 = Vec3::new(1.0, 0.85, 0.3);
const PROP_DARK: Vec3 = Vec3::new(0.3, 0.3, 0.35);
const DOME_COLOR: Vec3 = Vec3::new(0.6, 0.7, 0.9);
const DOME_ALPHA: f32 = 0.15;

/// Mesh handles the simulator stamps on its drawables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneMeshes {
    pub boid: MeshRef,
    pub dome: MeshRef,
    pub prop: MeshRef,
}

/// Raw sums gathered for one boid during the pairwise pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Neighborhood {
    /// Sum of `-normalize(p_j - p_i) / d` over neighbors closer than the
    /// separation distance.
    pub separation: Vec3,
    /// Sum of every other boid's velocity.
    pub velocity_sum: Vec3,
    /// Sum of every other boid's position.
    pub position_sum: Vec3,
}

pub struct FlockSimulator {
    boids: Vec<Boid>,
    random: RandomModel,
    dome_radius: f32,
    clock: f32,
    ticks: u64,
    meshes: SceneMeshes,
}

impl FlockSimulator {
    pub fn new(random: RandomModel, dome_radius: f32, meshes: SceneMeshes) -> Self {
        Self {
            boids: Vec::new(),
            random,
            dome_radius,
            clock: 0.0,
            ticks: 0,
            meshes,
        }
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn dome_radius(&self) -> f32 {
        self.dome_radius
    }

    pub fn meshes(&self) -> SceneMeshes {
        self.meshes
    }

    pub fn set_meshes(&mut self, meshes: SceneMeshes) {
        self.meshes = meshes;
    }

    pub fn excited_count(&self) -> usize {
        self.boids.iter().filter(|b| b.is_excited()).count()
    }

    /// Grow or shrink the population to exactly `target`. New boids are
    /// appended; surplus boids are dropped from the tail.
    pub fn reconcile_population(&mut self, target: usize, speed: f32) {
        let current = self.boids.len();
        if target == current {
            return;
        }

        if target > current {
            let (random, dome_radius, clock) = (&mut self.random, self.dome_radius, self.clock);
            self.boids
                .extend((current..target).map(|_| Boid::spawn(random, dome_radius, speed, clock)));
        } else {
            self.boids.truncate(target);
        }
        log::info!("population {} -> {}", current, target);
    }

    /// Drop every boid and grow a fresh population.
    pub fn restart(&mut self, config: &SimulationConfig) {
        log::info!("restarting flock with {} boids", config.num_boids);
        self.boids.clear();
        self.reconcile_population(config.num_boids, config.boid_speed);
    }

    /// Advance one tick and describe the result for the renderer.
    pub fn update(
        &mut self,
        delta_time: f32,
        config: &SimulationConfig,
        env: &mut EnvironmentModel,
    ) -> RenderableFrame {
        self.step(delta_time, config, env);
        self.frame(config, env)
    }

    pub fn step(&mut self, delta_time: f32, config: &SimulationConfig, env: &mut EnvironmentModel) {
        self.clock += delta_time;
        self.ticks += 1;

        // 1. Population
        self.reconcile_population(config.num_boids, config.boid_speed);

        // 2. Pairwise sums, taken from one consistent snapshot
        let neighborhoods = interaction_pass(&self.boids, config.separation_distance);

        // 3. Forces, integration, containment
        let flock_size = self.boids.len();
        let surveyor = env.surveyor_position();
        let camera = env.camera_position();
        for (boid, neighborhood) in self.boids.iter_mut().zip(&neighborhoods) {
            apply_forces(boid, neighborhood, flock_size, config, surveyor, camera, delta_time);
            boid.position += boid.velocity * delta_time;
            contain(boid, self.dome_radius, config.boundary_policy);
        }

        // 4. Flicker state
        self.update_markov_states(config, env);

        // 5. Colors
        self.update_colors(config, env.day_night.day_mode);

        // 6. Day/night easing
        env.day_night.advance();
        env.update_props();
    }

    fn update_markov_states(&mut self, config: &SimulationConfig, env: &mut EnvironmentModel) {
        let counts: Vec<usize> = (0..self.boids.len())
            .map(|i| count_neighbors(&self.boids, i, self.boids[i].interaction_radius))
            .collect();

        for (boid, count) in self.boids.iter_mut().zip(counts) {
            boid.markov_state = MarkovState::from_neighbor_count(count);

            if self.clock > boid.markov_time {
                boid.markov_time += self.random.exponential(MARKOV_LAMBDA);
                if config.auto_day_night {
                    let day = self.random.poisson_switch_parity(DAY_NIGHT_LAMBDA);
                    if day != env.day_night.day_mode {
                        log::debug!("auto switch to {}", if day { "day" } else { "night" });
                        env.day_night.day_mode = day;
                    }
                }
            }
        }
    }

    fn update_colors(&mut self, config: &SimulationConfig, day_mode: bool) {
        for boid in &mut self.boids {
            let blush = if config.female_blush && boid.is_female {
                self.random.exponential(BLUSH_LAMBDA).min(1.0)
            } else {
                0.0
            };
            boid.color = boid_color(day_mode, boid.is_female, boid.markov_state, blush);
        }
    }

    /// Draw parameters for the current state, without advancing it.
    pub fn frame(&self, config: &SimulationConfig, env: &EnvironmentModel) -> RenderableFrame {
        let uniforms = FrameUniforms {
            projection: env.camera.projection_matrix(),
            view: env.camera.view_matrix(),
            background: env.day_night.background_color(),
        };

        let mut drawables = Vec::with_capacity(self.boids.len() + env.props.len() + 2);
        drawables.extend(
            self.boids
                .iter()
                .map(|b| DrawParams::opaque(self.meshes.boid, b.model_matrix(config.boid_size), b.color)),
        );
        drawables.extend(env.props.iter().map(|prop| {
            let color = if prop.lit { PROP_LIT } else { PROP_DARK };
            DrawParams::opaque(self.meshes.prop, prop.model_matrix(PROP_SIZE), color)
        }));
        drawables.push(DrawParams::opaque(
            self.meshes.boid,
            Mat4::from_translation(env.surveyor_position())
                * Mat4::from_scale(Vec3::splat(SURVEYOR_SIZE)),
            SURVEYOR_COLOR,
        ));
        drawables.push(DrawParams {
            alpha: DOME_ALPHA,
            ..DrawParams::opaque(self.meshes.dome, Mat4::IDENTITY, DOME_COLOR)
        });

        RenderableFrame {
            uniforms,
            drawables,
        }
    }
}

/// Separation, alignment and cohesion sums for every boid.
pub fn interaction_pass(boids: &[Boid], separation_distance: f32) -> Vec<Neighborhood> {
    let mut neighborhoods = vec![Neighborhood::default(); boids.len()];

    for (i, neighborhood) in neighborhoods.iter_mut().enumerate() {
        let me = &boids[i];
        for (j, other) in boids.iter().enumerate() {
            if i == j {
                continue;
            }

            let offset = other.position - me.position;
            let distance = offset.length();
            if distance < separation_distance && distance > DEGENERATE_LENGTH {
                neighborhood.separation -= offset / distance / distance;
            }

            neighborhood.velocity_sum += other.velocity;
            neighborhood.position_sum += other.position;
        }
    }

    neighborhoods
}

/// Steering for one boid, applied to its velocity in place. Ends by
/// rescaling the velocity to the configured speed.
pub fn apply_forces(
    boid: &mut Boid,
    neighborhood: &Neighborhood,
    flock_size: usize,
    config: &SimulationConfig,
    surveyor: Vec3,
    camera: Vec3,
    delta_time: f32,
) {
    let (alignment_weight, cohesion_weight, separation_weight) = if config.personal_weights {
        (
            config.alignment_weight * boid.alignment_weight,
            config.cohesion_weight * boid.cohesion_weight,
            boid.separation_weight,
        )
    } else {
        (config.alignment_weight, config.cohesion_weight, 1.0)
    };

    boid.velocity += neighborhood.separation * separation_weight;

    if flock_size > 1 {
        let others = (flock_size - 1) as f32;

        let average_velocity = neighborhood.velocity_sum / others;
        boid.velocity += (average_velocity - boid.velocity) * alignment_weight;

        let centroid = neighborhood.position_sum / others;
        boid.velocity += direction(centroid - boid.position) * cohesion_weight;
    }

    boid.velocity += direction(boid.position - surveyor) * config.avoidance_weight * delta_time;

    if config.camera_avoidance && boid.position.distance(camera) < config.distance_min_to_camera {
        boid.velocity += direction(boid.position - camera) * config.avoidance_weight;
    }

    let speed = boid.velocity.length();
    if speed > DEGENERATE_LENGTH {
        boid.velocity *= config.boid_speed / speed;
    }
}

/// Bring a boid that left the dome back onto its surface.
pub fn contain(boid: &mut Boid, dome_radius: f32, policy: BoundaryPolicy) {
    let distance = boid.position.length();
    if distance <= dome_radius {
        return;
    }

    let normal = boid.position / distance;
    boid.position = normal * dome_radius;
    if policy == BoundaryPolicy::Reflect {
        boid.velocity -= 2.0 * boid.velocity.dot(normal) * normal;
    }
}

/// Boids other than `index` within `radius` of it.
pub fn count_neighbors(boids: &[Boid], index: usize, radius: f32) -> usize {
    let center = boids[index].position;
    boids
        .iter()
        .enumerate()
        .filter(|&(j, other)| j != index && other.position.distance(center) < radius)
        .count()
}

// Unit vector, or zero when there is no direction
fn direction(v: Vec3) -> Vec3 {
    if v.length() > DEGENERATE_LENGTH {
        v.normalize()
    } else {
        Vec3::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshHandle;

    fn meshes() -> SceneMeshes {
        let r = |id| MeshRef {
            handle: MeshHandle(id),
            vertex_count: 6,
        };
        SceneMeshes {
            boid: r(0),
            dome: r(1),
            prop: r(2),
        }
    }

    fn simulator(seed: u64) -> FlockSimulator {
        FlockSimulator::new(RandomModel::seeded(seed), 1.5, meshes())
    }

    fn config_with(edit: impl FnOnce(&mut SimulationConfig)) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        edit(&mut config);
        config
    }

    fn still(position: Vec3) -> Boid {
        Boid::new(position, Vec3::ZERO)
    }

    #[test]
    fn test_separation_zero_outside_threshold() {
        let boids = vec![still(Vec3::ZERO), still(Vec3::new(0.2, 0.0, 0.0))];
        let sums = interaction_pass(&boids, 0.1);
        assert_eq!(sums[0].separation, Vec3::ZERO);
        assert_eq!(sums[1].separation, Vec3::ZERO);
    }

    #[test]
    fn test_separation_points_away_inside_threshold() {
        let boids = vec![still(Vec3::ZERO), still(Vec3::new(0.05, 0.0, 0.0))];
        let sums = interaction_pass(&boids, 0.1);
        assert!(sums[0].separation.x < 0.0);
        assert!(sums[1].separation.x > 0.0);
        // 1 / d with d = 0.05
        assert!((sums[0].separation.length() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_coincident_boids_do_not_produce_nan() {
        let boids = vec![still(Vec3::ONE), still(Vec3::ONE)];
        let sums = interaction_pass(&boids, 0.1);
        assert_eq!(sums[0].separation, Vec3::ZERO);

        let mut boid = boids[0].clone();
        apply_forces(
            &mut boid,
            &sums[0],
            2,
            &SimulationConfig::default(),
            Vec3::ONE,
            Vec3::ONE,
            0.016,
        );
        assert!(boid.velocity.is_finite());
    }

    #[test]
    fn test_alignment_and_cohesion_ignore_distance() {
        let boids = vec![
            Boid::new(Vec3::ZERO, Vec3::X),
            Boid::new(Vec3::new(100.0, 0.0, 0.0), Vec3::Y),
            Boid::new(Vec3::new(0.0, 100.0, 0.0), Vec3::Z),
        ];
        let sums = interaction_pass(&boids, 0.1);
        assert_eq!(sums[0].velocity_sum, Vec3::Y + Vec3::Z);
        assert_eq!(sums[0].position_sum, Vec3::new(100.0, 100.0, 0.0));
    }

    #[test]
    fn test_flock_of_two_steers_toward_the_other() {
        let boids = vec![
            Boid::new(Vec3::ZERO, Vec3::X),
            Boid::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Z),
        ];
        let sums = interaction_pass(&boids, 0.1);
        assert_eq!(sums[0].velocity_sum / 1.0, boids[1].velocity);
        assert_eq!(sums[0].position_sum / 1.0, boids[1].position);

        let config = config_with(|c| {
            c.alignment_weight = 0.5;
            c.cohesion_weight = 0.5;
            c.avoidance_weight = 0.0;
            c.camera_avoidance = false;
            c.boid_speed = 1.0;
        });
        let mut boid = boids[0].clone();
        apply_forces(&mut boid, &sums[0], 2, &config, Vec3::ZERO, Vec3::ZERO, 0.0);
        // (x + 0.5 * (z - x)) + 0.5 * y, then rescaled to unit speed
        let expected = Vec3::new(0.5, 0.5, 0.5).normalize();
        assert!((boid.velocity - expected).length() < 1e-5);
    }

    #[test]
    fn test_single_boid_has_no_flock_forces() {
        let mut boid = Boid::new(Vec3::new(0.5, 0.0, 0.0), Vec3::new(0.0, 2.5, 0.0));
        let config = config_with(|c| {
            c.avoidance_weight = 0.0;
        });
        apply_forces(&mut boid, &Neighborhood::default(), 1, &config, Vec3::ZERO, Vec3::Z * 3.0, 0.016);
        assert!(boid.velocity.is_finite());
        assert!((boid.velocity - Vec3::new(0.0, 2.5, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_surveyor_pushes_away_continuously() {
        let config = config_with(|c| {
            c.alignment_weight = 0.0;
            c.cohesion_weight = 0.0;
            c.camera_avoidance = false;
            c.avoidance_weight = 1.0;
            c.boid_speed = 1.0;
        });
        let mut boid = Boid::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.0));
        apply_forces(&mut boid, &Neighborhood::default(), 1, &config, Vec3::ZERO, Vec3::Z * 10.0, 0.5);
        assert!((boid.velocity - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_camera_avoidance_only_inside_min_distance() {
        let config = config_with(|c| {
            c.alignment_weight = 0.0;
            c.cohesion_weight = 0.0;
            c.avoidance_weight = 0.2;
            c.distance_min_to_camera = 0.2;
            c.boid_speed = 1.0;
        });
        let far_surveyor = Vec3::new(0.0, -100.0, 0.0);

        let mut near = Boid::new(Vec3::ZERO, Vec3::Y);
        apply_forces(&mut near, &Neighborhood::default(), 1, &config, far_surveyor, Vec3::new(0.1, 0.0, 0.0), 0.0);
        assert!(near.velocity.x < 0.0);

        let mut far = Boid::new(Vec3::ZERO, Vec3::Y);
        apply_forces(&mut far, &Neighborhood::default(), 1, &config, far_surveyor, Vec3::new(0.5, 0.0, 0.0), 0.0);
        assert_eq!(far.velocity.x, 0.0);
    }

    #[test]
    fn test_contain_reflect_and_clamp() {
        let mut reflected = Boid::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.0));
        contain(&mut reflected, 1.5, BoundaryPolicy::Reflect);
        assert!((reflected.position - Vec3::new(1.5, 0.0, 0.0)).length() < 1e-6);
        assert!((reflected.velocity - Vec3::new(-1.0, 1.0, 0.0)).length() < 1e-6);

        let mut clamped = Boid::new(Vec3::new(0.0, 0.0, -3.0), Vec3::new(0.0, 0.0, -1.0));
        contain(&mut clamped, 1.5, BoundaryPolicy::Clamp);
        assert!((clamped.position - Vec3::new(0.0, 0.0, -1.5)).length() < 1e-6);
        assert_eq!(clamped.velocity, Vec3::new(0.0, 0.0, -1.0));

        let mut inside = Boid::new(Vec3::new(0.5, 0.0, 0.0), Vec3::X);
        contain(&mut inside, 1.5, BoundaryPolicy::Reflect);
        assert_eq!(inside.velocity, Vec3::X);
    }

    #[test]
    fn test_count_neighbors_excludes_self() {
        let boids = vec![
            still(Vec3::ZERO),
            still(Vec3::new(0.1, 0.0, 0.0)),
            still(Vec3::new(0.3, 0.0, 0.0)),
        ];
        assert_eq!(count_neighbors(&boids, 0, 0.2), 1);
        assert_eq!(count_neighbors(&boids, 1, 0.25), 2);
    }

    #[test]
    fn test_reconcile_grows_and_truncates() {
        let mut sim = simulator(1);
        sim.reconcile_population(10, 2.5);
        assert_eq!(sim.boids().len(), 10);
        let first_three: Vec<Vec3> = sim.boids()[..3].iter().map(|b| b.position).collect();

        sim.reconcile_population(3, 2.5);
        let kept: Vec<Vec3> = sim.boids().iter().map(|b| b.position).collect();
        assert_eq!(kept, first_three);

        sim.reconcile_population(0, 2.5);
        assert!(sim.boids().is_empty());
    }

    #[test]
    fn test_markov_state_follows_neighbor_count() {
        let mut sim = simulator(2);
        let mut config = SimulationConfig::default();
        config.num_boids = 8;
        config.boid_speed = 1.0;
        config.avoidance_weight = 0.0;
        config.camera_avoidance = false;
        let mut env = EnvironmentModel::new(1.5);

        sim.reconcile_population(8, 1.0);
        for boid in sim.boids.iter_mut() {
            boid.position = Vec3::ZERO;
            boid.velocity = Vec3::X;
            boid.interaction_radius = 0.5;
        }
        sim.step(0.0, &config, &mut env);
        assert!(sim.boids().iter().all(|b| b.markov_state == MarkovState::Excited));
        assert_eq!(sim.excited_count(), 8);

        config.num_boids = 5;
        sim.step(0.0, &config, &mut env);
        assert!(sim.boids().iter().all(|b| b.markov_state == MarkovState::Calm));
    }

    #[test]
    fn test_markov_timer_advances_once_crossed() {
        let mut sim = simulator(3);
        let config = config_with(|c| {
            c.num_boids = 1;
        });
        let mut env = EnvironmentModel::new(1.5);
        sim.reconcile_population(1, config.boid_speed);
        sim.boids[0].markov_time = 0.5;

        sim.step(0.25, &config, &mut env);
        assert_eq!(sim.boids()[0].markov_time, 0.5);

        sim.step(0.5, &config, &mut env);
        assert!(sim.boids()[0].markov_time > 0.5);
    }

    #[test]
    fn test_day_flag_only_redrawn_in_auto_mode() {
        let mut sim = simulator(4);
        let mut config = config_with(|c| {
            c.num_boids = 50;
        });
        let mut env = EnvironmentModel::new(1.5);
        for _ in 0..200 {
            sim.step(0.1, &config, &mut env);
            assert!(env.day_night.day_mode);
        }

        config.auto_day_night = true;
        let mut saw_night = false;
        for _ in 0..200 {
            sim.step(0.1, &config, &mut env);
            saw_night |= !env.day_night.day_mode;
        }
        assert!(saw_night);
    }

    #[test]
    fn test_update_keeps_boids_inside_dome() {
        for policy in BoundaryPolicy::ALL {
            let mut sim = simulator(5);
            let config = config_with(|c| {
                c.num_boids = 60;
                c.boid_speed = 10.0;
                c.boundary_policy = policy;
            });
            let mut env = EnvironmentModel::new(1.5);
            for _ in 0..100 {
                sim.update(0.1, &config, &mut env);
                for boid in sim.boids() {
                    assert!(boid.position.length() <= 1.5 + 1e-4);
                    assert!(boid.position.is_finite() && boid.velocity.is_finite());
                }
            }
        }
    }

    #[test]
    fn test_frame_layout() {
        let mut sim = simulator(6);
        let config = config_with(|c| {
            c.num_boids = 4;
        });
        let mut env = EnvironmentModel::new(1.5);
        let frame = sim.update(0.016, &config, &mut env);

        // boids, props, surveyor, dome
        assert_eq!(frame.drawables.len(), 4 + env.props.len() + 2);
        let dome = frame.drawables.last().unwrap();
        assert!(dome.is_translucent());
        assert_eq!(dome.mesh, meshes().dome);
        assert!(frame.drawables[..frame.drawables.len() - 1]
            .iter()
            .all(|d| !d.is_translucent()));

        let boid = &sim.boids()[0];
        assert_eq!(frame.drawables[0].color, boid.color);
        assert_eq!(frame.drawables[0].model, boid.model_matrix(config.boid_size));
        assert_eq!(frame.uniforms.background, env.day_night.background_color());
    }

    #[test]
    fn test_restart_replaces_population() {
        let mut sim = simulator(7);
        let config = config_with(|c| {
            c.num_boids = 5;
        });
        sim.reconcile_population(5, config.boid_speed);
        let before: Vec<Vec3> = sim.boids().iter().map(|b| b.position).collect();
        sim.restart(&config);
        let after: Vec<Vec3> = sim.boids().iter().map(|b| b.position).collect();
        assert_eq!(after.len(), 5);
        assert_ne!(before, after);
    }
}
