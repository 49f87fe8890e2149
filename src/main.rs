/*
 * Fireflies
 *
 * A flock of firefly boids inside a translucent dome. Each boid follows
 * three rules against the whole flock:
 * 1. Separation: push away from neighbors that are too close
 * 2. Alignment: match the flock's average velocity
 * 3. Cohesion: steer towards the flock's centroid
 *
 * Boids also shy away from a surveyor probe that rides ahead of the camera,
 * glow when crowded, and change colors as the dome moves between day and
 * night. Settings can be tuned live from the controls window.
 */

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use fireflies::app::{self, Startup};
use fireflies::environment::DEFAULT_DOME_RADIUS;
use fireflies::mesh::Mesh;
use fireflies::params::{BoundaryPolicy, SimulationConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Firefly flocking inside a dome", long_about = None)]
struct Args {
    /// Seed for the random model; taken from the clock when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Initial number of boids
    #[arg(short, long, default_value_t = SimulationConfig::default().num_boids)]
    boids: usize,

    /// Radius of the dome the flock lives in
    #[arg(long, default_value_t = DEFAULT_DOME_RADIUS)]
    dome_radius: f32,

    /// What happens to boids that reach the dome wall
    #[arg(long, value_enum, default_value_t = Boundary::Reflect)]
    boundary: Boundary,

    /// Wavefront OBJ file to draw as the dome
    #[arg(long)]
    dome_mesh: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Boundary {
    Reflect,
    Clamp,
}

impl From<Boundary> for BoundaryPolicy {
    fn from(boundary: Boundary) -> Self {
        match boundary {
            Boundary::Reflect => BoundaryPolicy::Reflect,
            Boundary::Clamp => BoundaryPolicy::Clamp,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    log::info!("Fireflies starting...");
    log::info!("Boids: {}", args.boids);
    log::info!("Dome radius: {}", args.dome_radius);
    log::info!("Boundary: {:?}", args.boundary);

    if args.dome_radius <= 0.0 || !args.dome_radius.is_finite() {
        anyhow::bail!("Dome radius must be positive, got {}", args.dome_radius);
    }

    let dome_mesh = match &args.dome_mesh {
        Some(path) => {
            let mesh = Mesh::load_obj(path)
                .with_context(|| format!("Failed to load dome mesh {}", path.display()))?;
            log::info!("Loaded dome mesh '{}' ({} vertices)", mesh.name, mesh.vertex_count());
            Some(mesh)
        }
        None => None,
    };

    app::configure(Startup {
        seed: args.seed,
        num_boids: args.boids,
        dome_radius: args.dome_radius,
        boundary_policy: args.boundary.into(),
        dome_mesh,
    })
    .map_err(|_| anyhow::anyhow!("Startup options were already set"))?;

    nannou::app(app::model).update(app::update).run();

    Ok(())
}
