/*
 * Application Module
 *
 * This module defines the nannou application model for the firefly dome.
 * It wires the window, the egui controls and keyboard input to the flock
 * simulator, and keeps the last RenderableFrame around for the view.
 *
 * Per frame:
 * - The UI edits the config and the day/night flag
 * - Held keys move the camera (and the surveyor with it)
 * - The simulator ticks once unless paused
 */

use nannou::prelude::{App, Update};
use nannou_egui::Egui;
use std::sync::OnceLock;

use crate::debug::DebugInfo;
use crate::environment::{EnvironmentModel, DEFAULT_DOME_RADIUS};
use crate::flock::{FlockSimulator, SceneMeshes};
use crate::frame::RenderableFrame;
use crate::input::{self, MovementIntent};
use crate::mesh::{Mesh, MeshLibrary};
use crate::params::{BoundaryPolicy, SimulationConfig};
use crate::random::RandomModel;
use crate::renderer;
use crate::ui;

/// Longest step a single tick may take, so a stalled frame does not fling
/// the flock across the dome.
pub const MAX_TICK_SECONDS: f32 = 0.1;

const DOME_SLICES: u32 = 32;
const DOME_STACKS: u32 = 16;

/// Startup options resolved before the event loop starts.
#[derive(Debug, Clone)]
pub struct Startup {
    pub seed: Option<u64>,
    pub num_boids: usize,
    pub dome_radius: f32,
    pub boundary_policy: BoundaryPolicy,
    /// Scenery mesh for the dome; a sphere of `dome_radius` when absent.
    pub dome_mesh: Option<Mesh>,
}

impl Default for Startup {
    fn default() -> Self {
        Self {
            seed: None,
            num_boids: SimulationConfig::default().num_boids,
            dome_radius: DEFAULT_DOME_RADIUS,
            boundary_policy: BoundaryPolicy::Reflect,
            dome_mesh: None,
        }
    }
}

// nannou builds the model from a plain fn, so startup options go through here
static STARTUP: OnceLock<Startup> = OnceLock::new();

/// Hand the startup options to `model`. Fails if called twice.
pub fn configure(startup: Startup) -> Result<(), Startup> {
    STARTUP.set(startup)
}

// Main model for the application
pub struct Model {
    pub simulator: FlockSimulator,
    pub config: SimulationConfig,
    pub environment: EnvironmentModel,
    pub meshes: MeshLibrary,
    pub egui: Egui,
    pub debug_info: DebugInfo,
    pub last_frame: Option<RenderableFrame>,
}

// Register the boid, dome and prop meshes
pub fn build_scene_meshes(
    library: &mut MeshLibrary,
    config: &SimulationConfig,
    dome_radius: f32,
    dome_mesh: Option<Mesh>,
) -> SceneMeshes {
    let boid = library.register(Mesh::sphere_for_budget("boid", 1.0, config.mesh_vertex_budget));
    let dome = match dome_mesh {
        Some(mesh) => library.register(mesh),
        None => library.register(Mesh::sphere("dome", dome_radius, DOME_SLICES, DOME_STACKS)),
    };
    let prop = library.register(Mesh::sphere("prop", 1.0, 8, 4));
    SceneMeshes { boid, dome, prop }
}

// Initialize the model
pub fn model(app: &App) -> Model {
    let startup = STARTUP.get().cloned().unwrap_or_default();

    // 80% of the primary monitor, or a fixed size when there is none
    let (window_width, window_height) = match app.primary_monitor() {
        Some(monitor) => {
            let size = monitor.size();
            (size.width as f32 * 0.8, size.height as f32 * 0.8)
        }
        None => (1280.0, 720.0),
    };

    let window_id = app
        .new_window()
        .title("Fireflies")
        .size(window_width as u32, window_height as u32)
        .view(renderer::view)
        .key_pressed(input::key_pressed)
        .resized(input::resized)
        .raw_event(input::raw_window_event)
        .build()
        .expect("failed to open the main window");

    let window = app
        .window(window_id)
        .expect("main window closed during startup");
    let egui = Egui::from_window(&window);

    let mut config = SimulationConfig::default();
    config.num_boids = startup.num_boids;
    config.boundary_policy = startup.boundary_policy;

    let mut environment = EnvironmentModel::new(startup.dome_radius);
    environment.camera.set_viewport(window_width, window_height);

    let mut meshes = MeshLibrary::new();
    let scene = build_scene_meshes(&mut meshes, &config, startup.dome_radius, startup.dome_mesh);
    log::info!("registered {} meshes (boid mesh {} vertices)", meshes.len(), scene.boid.vertex_count);

    let random = startup.seed.map(RandomModel::seeded).unwrap_or_else(RandomModel::from_clock);
    log::info!("random seed {}", random.seed());

    let mut simulator = FlockSimulator::new(random, startup.dome_radius, scene);
    simulator.restart(&config);
    let last_frame = Some(simulator.frame(&config, &environment));

    Model {
        simulator,
        config,
        environment,
        meshes,
        egui,
        debug_info: DebugInfo::default(),
        last_frame,
    }
}

// Update the model
pub fn update(app: &App, model: &mut Model, update: Update) {
    // Update debug info
    model.debug_info.fps = app.fps();
    model.debug_info.frame_time = update.since_last;

    let (actions, changes) = ui::update_ui(
        &mut model.egui,
        &mut model.config,
        &mut model.environment.day_night,
        &model.debug_info,
    );

    if changes.boundary_policy {
        log::info!("boundary policy set to {}", model.config.boundary_policy);
    }
    if changes.mesh_vertex_budget {
        rebuild_boid_mesh(model);
    }
    if actions.restart {
        model.simulator.restart(&model.config);
    }
    if actions.reset_camera {
        model.environment.reset_camera();
    }

    let delta_time = update.since_last.as_secs_f32().min(MAX_TICK_SECONDS);

    if !model.egui.ctx().wants_keyboard_input() {
        let intent = MovementIntent::from_app(app);
        model.environment.apply_input(&intent, delta_time);
    }

    let frame = if model.config.pause_simulation {
        model.simulator.frame(&model.config, &model.environment)
    } else {
        model
            .simulator
            .update(delta_time, &model.config, &mut model.environment)
    };
    model.last_frame = Some(frame);

    model.debug_info.record(&model.simulator, &model.environment.day_night);
}

fn rebuild_boid_mesh(model: &mut Model) {
    let mut scene = model.simulator.meshes();
    let rebuilt = Mesh::sphere_for_budget("boid", 1.0, model.config.mesh_vertex_budget);
    let Some(boid) = model.meshes.replace(scene.boid.handle, rebuilt) else {
        log::warn!("boid mesh {:?} is not in the library", scene.boid.handle);
        return;
    };
    log::info!("boid mesh rebuilt with {} vertices", boid.vertex_count);

    scene.boid = boid;
    model.simulator.set_meshes(scene);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_meshes_fall_back_to_dome_sphere() {
        let mut library = MeshLibrary::new();
        let scene = build_scene_meshes(&mut library, &SimulationConfig::default(), 1.5, None);
        assert_eq!(library.len(), 3);
        assert_eq!(scene.boid.vertex_count, 768);
        assert_eq!(
            scene.dome.vertex_count,
            (DOME_SLICES * DOME_STACKS * 6) as usize
        );
        let dome = library.get(scene.dome.handle).unwrap();
        assert!(dome.positions.iter().all(|p| (p.length() - 1.5).abs() < 1e-4));
    }

    #[test]
    fn test_scene_meshes_use_loaded_dome() {
        let mut library = MeshLibrary::new();
        let loaded = crate::mesh::parse_obj("hall", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let scene = build_scene_meshes(&mut library, &SimulationConfig::default(), 1.5, Some(loaded));
        assert_eq!(scene.dome.vertex_count, 3);
        assert_eq!(library.get(scene.dome.handle).map(|m| m.name.as_str()), Some("hall"));
    }

    #[test]
    fn test_loaded_dome_named_boid_keeps_its_own_handle() {
        let mut library = MeshLibrary::new();
        let loaded = crate::mesh::parse_obj("boid", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let scene = build_scene_meshes(&mut library, &SimulationConfig::default(), 1.5, Some(loaded));

        assert_ne!(scene.boid.handle, scene.dome.handle);
        assert_eq!(library.len(), 3);
        assert_eq!(library.get(scene.boid.handle).map(Mesh::vertex_count), Some(768));
        assert_eq!(library.get(scene.dome.handle).map(Mesh::vertex_count), Some(3));

        // Rebuilding the boid sphere leaves the dome alone
        let boid = library
            .replace(scene.boid.handle, Mesh::sphere_for_budget("boid", 1.0, 96))
            .unwrap();
        assert_eq!(boid.handle, scene.boid.handle);
        assert_eq!(library.get(scene.dome.handle).map(Mesh::vertex_count), Some(3));
    }
}
