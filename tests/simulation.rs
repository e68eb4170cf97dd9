//! End-to-end simulator scenarios.

use impulse2d::{
    Ball, BoxShape, BroadphaseKind, DynamicShape, ForceField, Particle, Shape, SimConfig, Simulator,
    SimulatorApi, Vec2,
};
use proptest::prelude::*;

fn elastic() -> SimConfig {
    SimConfig { sub_steps: 10, restitution: 1.0, friction: 0.0, ..SimConfig::default() }
}

/// Closed box of four lines facing inward.
fn walls(sim: &mut Simulator, half: f32) {
    let c = [
        Vec2::new(-half, -half),
        Vec2::new(half, -half),
        Vec2::new(half, half),
        Vec2::new(-half, half),
    ];
    for k in 0..4 {
        sim.add_line_facing(c[k], c[(k + 1) % 4], Vec2::ZERO);
    }
}

#[test]
fn head_on_equal_masses_swap_velocities() {
    let mut sim = Simulator::new(elastic());
    sim.add_particle(1.0, 1.0, Vec2::new(-1.5, 0.0), Vec2::new(1.0, 0.0)).unwrap();
    sim.add_particle(1.0, 1.0, Vec2::new(1.5, 0.0), Vec2::new(-1.0, 0.0)).unwrap();
    for _ in 0..20 {
        sim.simulate(0.1);
    }
    let p = sim.particles();
    assert!((p[0].vel() - Vec2::new(-1.0, 0.0)).length() < 1e-5);
    assert!((p[1].vel() - Vec2::new(1.0, 0.0)).length() < 1e-5);
}

#[test]
fn particles_stay_inside_walls() {
    let mut sim = Simulator::new(SimConfig { sub_steps: 20, ..elastic() });
    walls(&mut sim, 20.0);
    for k in 0..16 {
        let a = k as f32 * 0.39;
        sim.add_particle(1.0, 0.5, Vec2::new((k as f32 - 8.0) * 2.0, 0.0), Vec2::new(a.cos(), a.sin()) * 8.0)
            .unwrap();
    }
    sim.add_force_field(ForceField::earth_gravity());
    for _ in 0..300 {
        sim.simulate(1.0 / 60.0);
    }
    for p in sim.particles() {
        assert!(p.pos().x.abs() < 20.5 && p.pos().y.abs() < 20.5, "escaped: {:?}", p.pos());
    }
}

#[test]
fn every_broadphase_gives_same_trajectory() {
    let run = |kind: BroadphaseKind| {
        let mut sim = Simulator::new(SimConfig { broadphase: kind, ..elastic() });
        walls(&mut sim, 10.0);
        for k in 0..10 {
            let x = -8.0 + k as f32 * 1.7;
            sim.add_particle(1.0 + k as f32 * 0.1, 0.6, Vec2::new(x, (k % 3) as f32), Vec2::new(3.0, -2.0 + k as f32 * 0.4))
                .unwrap();
        }
        for _ in 0..50 {
            sim.simulate(0.02);
        }
        sim.particles().iter().map(|p| p.pos()).collect::<Vec<_>>()
    };
    let reference = run(BroadphaseKind::BruteForce);
    for kind in [BroadphaseKind::SortedSweep, BroadphaseKind::IntervalSweep, BroadphaseKind::KdTree, BroadphaseKind::RangeTree] {
        assert_eq!(run(kind), reference, "{kind:?}");
    }
}

#[test]
fn ball_rolls_on_floor_with_friction() {
    let mut sim = Simulator::new(SimConfig { restitution: 0.2, friction: 0.5, ..elastic() });
    sim.add_line(Vec2::new(-100.0, 0.0), Vec2::new(100.0, 0.0));
    sim.add_ball(1.0, 1.0, Vec2::new(0.0, 1.0), Vec2::new(5.0, 0.0), 0.0, 0.0).unwrap();
    sim.add_force_field(ForceField::earth_gravity());
    for _ in 0..30 {
        sim.simulate(1.0 / 30.0);
    }
    let b = &sim.balls()[0];
    assert!(b.vel().x < 5.0);
    assert!(b.spin.ang_vel < 0.0);
    assert!(b.pos().y > 0.5);
}

#[test]
fn box_lands_on_floor() {
    let mut sim = Simulator::new(SimConfig { restitution: 0.0, ..elastic() });
    sim.add_line(Vec2::new(-10.0, 0.0), Vec2::new(10.0, 0.0));
    // tall and thin, so the AABB reaches the floor before the contact radius does
    sim.add_box(2.0, 0.25, 4.0, Vec2::new(0.0, 5.0), Vec2::ZERO, 0.0, 0.0).unwrap();
    sim.add_force_field(ForceField::earth_gravity());
    for _ in 0..60 {
        sim.simulate(1.0 / 30.0);
    }
    let b = &sim.boxes()[0];
    // settles at the approximate radius sqrt(w * h) = 1
    assert!((b.pos().y - 1.0).abs() < 0.1, "y = {}", b.pos().y);
}

#[test]
fn point_gravity_source_can_move() {
    let mut sim = Simulator::new(elastic());
    sim.add_particle(1.0, 0.1, Vec2::ZERO, Vec2::ZERO).unwrap();
    sim.add_force_field(ForceField::point_gravity(Vec2::new(10.0, 0.0), 100.0));
    sim.simulate(0.1);
    assert!(sim.particles()[0].vel().x > 0.0);
    sim.force_fields_mut()[0].pos = Vec2::new(-1000.0, 0.0);
    let before = sim.particles()[0].vel().x;
    sim.simulate(0.1);
    assert!(sim.particles()[0].vel().x < before);
}

#[test]
fn clear_is_idempotent() {
    let mut sim = Simulator::default();
    walls(&mut sim, 5.0);
    sim.add_particle(1.0, 1.0, Vec2::ZERO, Vec2::X).unwrap();
    sim.add_ball(1.0, 1.0, Vec2::ONE, Vec2::ZERO, 0.0, 1.0).unwrap();
    sim.simulate(0.5);
    sim.clear();
    sim.clear();
    sim.simulate(3.0);
    assert!(sim.lines().is_empty());
    assert!(sim.particles().is_empty());
    assert!(sim.balls().is_empty());
    assert!(sim.boxes().is_empty());
    assert!(sim.shape_refs().is_empty());
    assert_eq!(sim.stats().contacts, 0);
}

proptest! {
    #[test]
    fn aabb_stays_ordered_after_moves(
        px in -100.0f32..100.0, py in -100.0f32..100.0,
        vx in -50.0f32..50.0, vy in -50.0f32..50.0,
        angle in -7.0f32..7.0, spin in -20.0f32..20.0,
        dt in 0.0f32..0.5, steps in 1usize..20,
    ) {
        let pos = Vec2::new(px, py);
        let vel = Vec2::new(vx, vy);
        let mut p = Particle::new(pos, vel, 1.0, 0.5).unwrap();
        let mut b = Ball::new(pos, vel, 1.0, 0.5, angle, spin).unwrap();
        let mut x = BoxShape::new(pos, vel, 1.0, 2.0, 0.5, angle, spin).unwrap();
        for _ in 0..steps {
            p.advance(dt);
            b.advance(dt);
            x.advance(dt);
            prop_assert!(p.aabb().is_valid());
            prop_assert!(b.aabb().is_valid());
            prop_assert!(x.aabb().is_valid());
            // the box always encloses its corners
            for c in x.corners() {
                prop_assert!(x.aabb().left <= c.x && c.x <= x.aabb().right);
                prop_assert!(x.aabb().bottom <= c.y && c.y <= x.aabb().top);
            }
        }
    }
}
