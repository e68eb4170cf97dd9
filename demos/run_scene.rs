//! Load a scene file and step it, logging a summary every simulated second.
//!
//! cargo run --example run_scene -- demos/bouncing.scene [seconds]

use std::process::ExitCode;

use impulse2d::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const FRAME: f32 = 1.0 / 60.0;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "demos/bouncing.scene".to_string());
    let seconds: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(5.0);

    let scene = match Scene::load(&path, &mut StdRng::seed_from_u64(0)) {
        Ok(s) => s,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut sim = Simulator::new(SimConfig { enable_timing: true, ..SimConfig::default() });
    if let Err(e) = scene.apply(&mut sim) {
        error!("{path}: {e}");
        return ExitCode::FAILURE;
    }
    info!(
        title = scene.title.as_deref().unwrap_or("untitled"),
        lines = sim.lines().len(),
        particles = sim.particles().len(),
        balls = sim.balls().len(),
        boxes = sim.boxes().len(),
        "scene loaded"
    );

    let frames = (seconds / FRAME).round() as usize;
    for frame in 1..=frames {
        sim.simulate(FRAME);
        if frame % 60 == 0 {
            let energy: f32 = sim
                .particles()
                .iter()
                .map(|p| 0.5 * p.mass() * p.vel().length_squared())
                .chain(sim.balls().iter().map(|b| 0.5 * b.mass() * b.vel().length_squared()))
                .chain(sim.boxes().iter().map(|b| 0.5 * b.mass() * b.vel().length_squared()))
                .sum();
            let t = sim.timing().unwrap_or_default();
            let stats = sim.stats();
            info!(
                t = frame as f32 * FRAME,
                kinetic = energy,
                contacts = stats.contacts,
                step_ms = t.simulate_ms,
                "progress"
            );
        }
    }
    ExitCode::SUCCESS
}
