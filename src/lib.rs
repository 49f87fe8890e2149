/*
 * Fireflies - Module Definitions
 *
 * This file defines the module structure for the firefly simulation.
 * The simulation core (random, boid, flock, environment, mesh, frame) has
 * no windowing dependency; app, ui, input and renderer bind it to nannou.
 */

// Re-export key components for easier access
pub use boid::{Boid, MarkovState};
pub use camera::Camera;
pub use environment::{DayNightCycle, EnvironmentModel};
pub use error::AssetError;
pub use flock::{FlockSimulator, SceneMeshes};
pub use frame::{DrawParams, FrameUniforms, RenderBackend, RenderableFrame};
pub use mesh::{Mesh, MeshLibrary, MeshRef};
pub use params::{BoundaryPolicy, SimulationConfig};
pub use random::RandomModel;
pub use debug::DebugInfo;
pub use app::Model;

// Define modules
pub mod random;
pub mod boid;
pub mod camera;
pub mod environment;
pub mod error;
pub mod flock;
pub mod frame;
pub mod mesh;
pub mod params;
pub mod debug;
pub mod app;
pub mod ui;
pub mod renderer;
pub mod input;
