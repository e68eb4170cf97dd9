use impulse2d::*;

fn lcg(seed: &mut u32) -> u32 {
    *seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
    *seed
}

fn unit(seed: &mut u32) -> f32 {
    lcg(seed) as f32 / u32::MAX as f32
}

/// `n` particles at constant density: the area grows with `n`.
fn build_sim(n: usize, kind: BroadphaseKind, seed0: u32) -> Simulator {
    let mut sim = Simulator::new(SimConfig {
        sub_steps: 1,
        broadphase: kind,
        enable_timing: true,
        ..SimConfig::default()
    });
    let bounds = 400.0 * (n as f32 / 32.0).sqrt();
    let mut seed = seed0;
    for _ in 0..n {
        let pos = Vec2::new(unit(&mut seed) * 2.0 * bounds - bounds, unit(&mut seed) * 2.0 * bounds - bounds);
        let vel = Vec2::new(unit(&mut seed) * 6.0 - 3.0, unit(&mut seed) * 6.0 - 3.0);
        let mass = 1.0 + unit(&mut seed);
        let radius = 1.0 + unit(&mut seed) * 19.0;
        if let Err(e) = sim.add_particle(mass, radius, pos, vel) {
            eprintln!("skipping particle: {e}");
        }
    }
    sim
}

fn main() {
    let kinds = [
        BroadphaseKind::BruteForce,
        BroadphaseKind::SortedSweep,
        BroadphaseKind::IntervalSweep,
        BroadphaseKind::KdTree,
        BroadphaseKind::RangeTree,
    ];
    let n_vals = [1_000usize, 4_000, 16_000];
    println!("n,broadphase,simulate_ms,broadphase_ms,narrowphase_ms,candidate_pairs,contacts");
    for &n in &n_vals {
        for &kind in &kinds {
            if kind == BroadphaseKind::BruteForce && n > 4_000 {
                continue;
            }
            let mut sim = build_sim(n, kind, 1);
            sim.simulate(1.0 / 60.0);
            let t = sim.timing().unwrap_or_default();
            let stats = sim.stats();
            println!(
                "{},{:?},{:.3},{:.3},{:.3},{},{}",
                n, kind, t.simulate_ms, t.broadphase_ms, t.narrowphase_ms, stats.candidate_pairs, stats.contacts
            );
        }
    }
}
