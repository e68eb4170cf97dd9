use glam::Vec2;

use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::api::{NarrowphaseApi, SimulatorApi};
use crate::broadphase;
use crate::error::SimResult;
use crate::force::ForceField;
use crate::math::Vec2Ext;
use crate::narrowphase::Narrowphase;
use crate::shapes::{Aabb, Ball, BoxShape, DynamicShape, Line, Particle, Proxy, Shape};
use crate::types::*;

/// Impulse-based 2D simulator. Owns every shape and force field.
pub struct Simulator {
    pub cfg: SimConfig,

    // Storage, one collection per concrete shape
    lines: Vec<Line>,
    particles: Vec<Particle>,
    balls: Vec<Ball>,
    boxes: Vec<BoxShape>,
    force_fields: Vec<ForceField>,

    // Derived views, sorted by AABB left edge; rebuilt when `refs_valid` is false
    shape_refs: Vec<ShapeRef>,
    dynamic_refs: Vec<ShapeRef>,
    refs_valid: bool,

    // Per-step scratch for the broad-phase
    proxies: Vec<Proxy>,

    stats: SimStats,
    last_timing: Option<SimTiming>,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

fn elapsed_ms(t: Option<Instant>) -> f64 {
    t.map(|t| t.elapsed().as_secs_f64() * 1000.0).unwrap_or(0.0)
}

/// Move every shape, then hand it each field's impulse at its own position.
fn integrate<T: DynamicShape>(shapes: &mut [T], fields: &[ForceField], dt: f32) {
    for s in shapes {
        s.advance(dt);
        for field in fields {
            let impulse = field.force(&*s) * dt;
            let at = s.pos();
            s.apply_impulse(impulse, at);
        }
    }
}

/// Two distinct mutable elements of one slice.
fn pair_mut<T>(v: &mut [T], i: usize, j: usize) -> Option<(&mut T, &mut T)> {
    if i == j || i >= v.len() || j >= v.len() {
        return None;
    }
    if i < j {
        let (head, tail) = v.split_at_mut(j);
        Some((&mut head[i], &mut tail[0]))
    } else {
        let (head, tail) = v.split_at_mut(i);
        Some((&mut tail[0], &mut head[j]))
    }
}

impl SimulatorApi for Simulator {
    fn new(cfg: SimConfig) -> Self {
        Self {
            cfg,
            lines: Vec::new(),
            particles: Vec::new(),
            balls: Vec::new(),
            boxes: Vec::new(),
            force_fields: Vec::new(),
            shape_refs: Vec::new(),
            dynamic_refs: Vec::new(),
            refs_valid: true,
            proxies: Vec::new(),
            stats: SimStats::default(),
            last_timing: None,
        }
    }

    fn add_line(&mut self, start: Vec2, end: Vec2) -> usize {
        self.lines.push(Line::new(start, end));
        self.refs_valid = false;
        self.lines.len() - 1
    }

    fn add_line_facing(&mut self, start: Vec2, end: Vec2, point_on_normal_side: Vec2) -> usize {
        self.lines.push(Line::facing(start, end, point_on_normal_side));
        self.refs_valid = false;
        self.lines.len() - 1
    }

    fn add_particle(&mut self, mass: f32, radius: f32, pos: Vec2, vel: Vec2) -> SimResult<usize> {
        self.particles.push(Particle::new(pos, vel, mass, radius)?);
        self.refs_valid = false;
        Ok(self.particles.len() - 1)
    }

    fn add_ball(
        &mut self,
        mass: f32,
        radius: f32,
        pos: Vec2,
        vel: Vec2,
        angle: f32,
        ang_vel: f32,
    ) -> SimResult<usize> {
        self.balls.push(Ball::new(pos, vel, mass, radius, angle, ang_vel)?);
        self.refs_valid = false;
        Ok(self.balls.len() - 1)
    }

    fn add_box(
        &mut self,
        mass: f32,
        width: f32,
        height: f32,
        pos: Vec2,
        vel: Vec2,
        angle: f32,
        ang_vel: f32,
    ) -> SimResult<usize> {
        self.boxes.push(BoxShape::new(pos, vel, mass, width, height, angle, ang_vel)?);
        self.refs_valid = false;
        Ok(self.boxes.len() - 1)
    }

    fn add_force_field(&mut self, field: ForceField) -> usize {
        self.force_fields.push(field);
        self.force_fields.len() - 1
    }

    fn clear(&mut self) {
        debug!(
            lines = self.lines.len(),
            particles = self.particles.len(),
            balls = self.balls.len(),
            boxes = self.boxes.len(),
            fields = self.force_fields.len(),
            "clearing simulator"
        );
        self.lines.clear();
        self.particles.clear();
        self.balls.clear();
        self.boxes.clear();
        self.force_fields.clear();
        self.shape_refs.clear();
        self.dynamic_refs.clear();
        self.proxies.clear();
        self.refs_valid = true;
        self.stats = SimStats::default();
        self.last_timing = None;
    }

    fn simulate(&mut self, seconds: f32) {
        let timed = self.cfg.enable_timing;
        let t_all = if timed { Some(Instant::now()) } else { None };
        let mut timing = SimTiming::default();

        self.ensure_refs();
        if self.cfg.sub_steps == 0 {
            warn!("sub_steps is 0; clamping to 1");
            self.cfg.sub_steps = 1;
        }
        let sub_steps = self.cfg.sub_steps;
        let dt = seconds / sub_steps as f32;
        let resolver = Narrowphase::new(self.cfg.restitution, self.cfg.friction);

        self.stats = SimStats {
            dynamic_shapes: self.dynamic_refs.len(),
            static_shapes: self.lines.len(),
            ..SimStats::default()
        };

        for step in 0..sub_steps {
            let t0 = if timed { Some(Instant::now()) } else { None };
            integrate(&mut self.particles, &self.force_fields, dt);
            integrate(&mut self.balls, &self.force_fields, dt);
            integrate(&mut self.boxes, &self.force_fields, dt);
            timing.integrate_ms += elapsed_ms(t0);

            if self.cfg.n_body_gravity > 0.0 {
                let t0 = if timed { Some(Instant::now()) } else { None };
                self.apply_n_body(dt);
                timing.n_body_ms += elapsed_ms(t0);
            }

            let t0 = if timed { Some(Instant::now()) } else { None };
            self.refresh_proxies();
            let pairs = broadphase::find_pairs(self.cfg.broadphase, &self.proxies);
            timing.broadphase_ms += elapsed_ms(t0);

            let t0 = if timed { Some(Instant::now()) } else { None };
            let mut contacts = 0;
            for &(i, j) in &pairs {
                if self.resolve(self.shape_refs[i], self.shape_refs[j], &resolver) {
                    contacts += 1;
                }
            }
            timing.narrowphase_ms += elapsed_ms(t0);

            trace!(step, candidates = pairs.len(), contacts, "sub-step");
            self.stats.candidate_pairs += pairs.len();
            self.stats.contacts += contacts;
        }

        if timed {
            timing.simulate_ms = elapsed_ms(t_all);
            self.last_timing = Some(timing);
        }
    }

    fn lines(&self) -> &[Line] {
        &self.lines
    }

    fn particles(&self) -> &[Particle] {
        &self.particles
    }

    fn balls(&self) -> &[Ball] {
        &self.balls
    }

    fn boxes(&self) -> &[BoxShape] {
        &self.boxes
    }

    fn force_fields(&self) -> &[ForceField] {
        &self.force_fields
    }

    fn force_fields_mut(&mut self) -> &mut [ForceField] {
        &mut self.force_fields
    }

    fn shape_refs(&mut self) -> &[ShapeRef] {
        self.ensure_refs();
        &self.shape_refs
    }

    fn dynamic_refs(&mut self) -> &[ShapeRef] {
        self.ensure_refs();
        &self.dynamic_refs
    }

    fn aabb_of(&self, shape: ShapeRef) -> Option<&Aabb> {
        match shape {
            ShapeRef::Line(i) => self.lines.get(i).map(|s| s.aabb()),
            ShapeRef::Particle(i) => self.particles.get(i).map(|s| s.aabb()),
            ShapeRef::Ball(i) => self.balls.get(i).map(|s| s.aabb()),
            ShapeRef::Box(i) => self.boxes.get(i).map(|s| s.aabb()),
        }
    }

    fn stats(&self) -> SimStats {
        self.stats
    }

    fn timing(&self) -> Option<SimTiming> {
        self.last_timing
    }
}

impl Simulator {
    /// Set the restitution coefficient, clamped to [0, 1].
    pub fn set_restitution(&mut self, e: f32) {
        self.cfg.restitution = e.clamp(0.0, 1.0);
    }

    /// Set the friction coefficient, clamped to [0, 1].
    pub fn set_friction(&mut self, f: f32) {
        self.cfg.friction = f.clamp(0.0, 1.0);
    }

    /// Pairwise gravity constant. Zero or negative disables the pass.
    pub fn set_n_body_gravity(&mut self, g: f32) {
        self.cfg.n_body_gravity = g;
    }

    pub fn set_sub_steps(&mut self, n: u32) {
        self.cfg.sub_steps = n.max(1);
    }

    pub fn set_broadphase(&mut self, kind: BroadphaseKind) {
        self.cfg.broadphase = kind;
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.particles.is_empty() && self.balls.is_empty() && self.boxes.is_empty()
    }

    fn left_edge(&self, r: ShapeRef) -> f32 {
        self.aabb_of(r).map_or(f32::INFINITY, |bb| bb.left)
    }

    fn ensure_refs(&mut self) {
        if self.refs_valid {
            return;
        }
        let mut dynamic = std::mem::take(&mut self.dynamic_refs);
        dynamic.clear();
        dynamic.extend((0..self.particles.len()).map(ShapeRef::Particle));
        dynamic.extend((0..self.balls.len()).map(ShapeRef::Ball));
        dynamic.extend((0..self.boxes.len()).map(ShapeRef::Box));
        dynamic.sort_by(|&a, &b| self.left_edge(a).total_cmp(&self.left_edge(b)));

        let mut all = std::mem::take(&mut self.shape_refs);
        all.clear();
        all.extend_from_slice(&dynamic);
        all.extend((0..self.lines.len()).map(ShapeRef::Line));
        all.sort_by(|&a, &b| self.left_edge(a).total_cmp(&self.left_edge(b)));

        debug!(dynamic = dynamic.len(), total = all.len(), "rebuilt shape references");
        self.dynamic_refs = dynamic;
        self.shape_refs = all;
        self.refs_valid = true;
    }

    fn refresh_proxies(&mut self) {
        let mut proxies = std::mem::take(&mut self.proxies);
        proxies.clear();
        for &r in &self.shape_refs {
            if let Some(aabb) = self.aabb_of(r) {
                proxies.push(Proxy { aabb: *aabb, kind: r.shape_type() });
            }
        }
        self.proxies = proxies;
    }

    /// Equal and opposite `G m1 m2 / d^2` impulses between every pair of
    /// dynamic shapes. Coincident pairs are skipped.
    fn apply_n_body(&mut self, dt: f32) {
        let g = self.cfg.n_body_gravity;
        let mut bodies: Vec<&mut dyn DynamicShape> = Vec::with_capacity(self.dynamic_refs.len());
        bodies.extend(self.particles.iter_mut().map(|s| s as &mut dyn DynamicShape));
        bodies.extend(self.balls.iter_mut().map(|s| s as &mut dyn DynamicShape));
        bodies.extend(self.boxes.iter_mut().map(|s| s as &mut dyn DynamicShape));

        for i in 0..bodies.len() {
            let (head, tail) = bodies.split_at_mut(i + 1);
            let a = &mut head[i];
            for b in tail.iter_mut() {
                let (dist, dir) = (b.pos() - a.pos()).magnitude_and_direction();
                if dist == 0.0 {
                    continue;
                }
                let impulse = dir * (g * a.mass() * b.mass() / (dist * dist)) * dt;
                let (pa, pb) = (a.pos(), b.pos());
                a.apply_impulse(impulse, pa);
                b.apply_impulse(-impulse, pb);
            }
        }
    }

    /// Dispatch one candidate pair to its contact manifold. Pairs without a
    /// manifold (anything rigid against anything dynamic) are skipped.
    fn resolve(&mut self, a: ShapeRef, b: ShapeRef, np: &Narrowphase) -> bool {
        match (a, b) {
            (ShapeRef::Particle(i), ShapeRef::Particle(j)) => {
                pair_mut(&mut self.particles, i, j).is_some_and(|(p, q)| np.particle_particle(p, q))
            }
            (ShapeRef::Particle(i), ShapeRef::Line(l)) | (ShapeRef::Line(l), ShapeRef::Particle(i)) => {
                np.particle_line(&mut self.particles[i], &self.lines[l])
            }
            (ShapeRef::Ball(i), ShapeRef::Line(l)) | (ShapeRef::Line(l), ShapeRef::Ball(i)) => {
                np.ball_line(&mut self.balls[i], &self.lines[l])
            }
            (ShapeRef::Box(i), ShapeRef::Line(l)) | (ShapeRef::Line(l), ShapeRef::Box(i)) => {
                np.box_line(&mut self.boxes[i], &self.lines[l])
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> SimConfig {
        SimConfig { sub_steps: 10, restitution: 1.0, friction: 0.0, ..SimConfig::default() }
    }

    #[test]
    fn test_head_on_elastic_swap() {
        for kind in [
            BroadphaseKind::BruteForce,
            BroadphaseKind::SortedSweep,
            BroadphaseKind::IntervalSweep,
            BroadphaseKind::KdTree,
            BroadphaseKind::RangeTree,
        ] {
            let mut sim = Simulator::new(SimConfig { broadphase: kind, ..cfg() });
            sim.add_particle(1.0, 1.0, Vec2::new(-1.5, 0.0), Vec2::new(1.0, 0.0)).unwrap();
            sim.add_particle(1.0, 1.0, Vec2::new(1.5, 0.0), Vec2::new(-1.0, 0.0)).unwrap();
            sim.simulate(2.0);
            let p = sim.particles();
            assert!((p[0].vel() - Vec2::new(-1.0, 0.0)).length() < 1e-5, "{kind:?}");
            assert!((p[1].vel() - Vec2::new(1.0, 0.0)).length() < 1e-5, "{kind:?}");
            assert!(p[0].pos().x < p[1].pos().x);
        }
    }

    #[test]
    fn test_free_fall_under_uniform_gravity() {
        let mut sim = Simulator::new(SimConfig { sub_steps: 100, ..cfg() });
        sim.add_particle(2.0, 0.5, Vec2::new(0.0, 100.0), Vec2::new(1.0, 3.0)).unwrap();
        sim.add_force_field(ForceField::earth_gravity());
        let (t, g) = (1.0f32, 9.8f32);
        sim.simulate(t);
        let p = &sim.particles()[0];
        let expected_y = 100.0 + 3.0 * t - 0.5 * g * t * t;
        let dt = t / 100.0;
        assert!((p.pos().y - expected_y).abs() <= 0.5 * g * t * dt + 1e-2);
        assert!((p.pos().x - 1.0).abs() < 1e-4);
        assert!((p.vel().y - (3.0 - g * t)).abs() < 1e-3);
    }

    #[test]
    fn test_clear_then_simulate_is_noop() {
        let mut sim = Simulator::new(cfg());
        sim.add_line(Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0));
        sim.add_particle(1.0, 1.0, Vec2::new(0.0, 3.0), Vec2::ZERO).unwrap();
        sim.add_force_field(ForceField::earth_gravity());
        sim.simulate(0.5);
        sim.clear();
        assert!(sim.is_empty());
        sim.simulate(1.0);
        sim.clear();
        assert!(sim.lines().is_empty() && sim.particles().is_empty());
        assert!(sim.force_fields().is_empty());
        assert!(sim.shape_refs().is_empty());
        assert_eq!(sim.stats().candidate_pairs, 0);
    }

    #[test]
    fn test_refs_rebuilt_lazily_and_sorted() {
        let mut sim = Simulator::new(cfg());
        sim.add_particle(1.0, 1.0, Vec2::new(5.0, 0.0), Vec2::ZERO).unwrap();
        sim.add_line(Vec2::new(-9.0, -1.0), Vec2::new(-8.0, -1.0));
        assert!(!sim.refs_valid);
        assert_eq!(sim.shape_refs(), &[ShapeRef::Line(0), ShapeRef::Particle(0)]);
        assert!(sim.refs_valid);
        sim.add_ball(1.0, 1.0, Vec2::new(0.0, 0.0), Vec2::ZERO, 0.0, 0.0).unwrap();
        assert!(!sim.refs_valid);
        assert_eq!(sim.dynamic_refs(), &[ShapeRef::Ball(0), ShapeRef::Particle(0)]);
        assert_eq!(sim.shape_refs().len(), 3);
    }

    #[test]
    fn test_invalid_mass_not_added() {
        let mut sim = Simulator::new(cfg());
        assert!(sim.add_particle(0.0, 1.0, Vec2::ZERO, Vec2::ZERO).is_err());
        assert!(sim.add_box(-2.0, 1.0, 1.0, Vec2::ZERO, Vec2::ZERO, 0.0, 0.0).is_err());
        assert!(sim.is_empty());
    }

    #[test]
    fn test_particle_rests_on_floor() {
        let mut sim = Simulator::new(SimConfig { restitution: 0.0, ..cfg() });
        sim.add_line(Vec2::new(-10.0, 0.0), Vec2::new(10.0, 0.0));
        sim.add_particle(1.0, 1.0, Vec2::new(0.0, 3.0), Vec2::ZERO).unwrap();
        sim.add_force_field(ForceField::earth_gravity());
        for _ in 0..60 {
            sim.simulate(1.0 / 30.0);
        }
        let p = &sim.particles()[0];
        assert!(p.pos().y > 0.9 && p.pos().y < 1.1, "y = {}", p.pos().y);
        assert!(sim.stats().contacts > 0);
    }

    #[test]
    fn test_ball_ball_pairs_ignored() {
        let mut sim = Simulator::new(cfg());
        sim.add_ball(1.0, 1.0, Vec2::new(-0.5, 0.0), Vec2::new(1.0, 0.0), 0.0, 0.0).unwrap();
        sim.add_ball(1.0, 1.0, Vec2::new(0.5, 0.0), Vec2::new(-1.0, 0.0), 0.0, 0.0).unwrap();
        sim.simulate(0.1);
        assert_eq!(sim.balls()[0].vel(), Vec2::new(1.0, 0.0));
        assert!(sim.stats().candidate_pairs > 0);
        assert_eq!(sim.stats().contacts, 0);
    }

    #[test]
    fn test_n_body_attracts() {
        let mut sim = Simulator::new(SimConfig { n_body_gravity: 1.0, ..cfg() });
        sim.add_particle(1.0, 0.1, Vec2::new(-5.0, 0.0), Vec2::ZERO).unwrap();
        sim.add_particle(1.0, 0.1, Vec2::new(5.0, 0.0), Vec2::ZERO).unwrap();
        sim.simulate(1.0);
        let p = sim.particles();
        assert!(p[0].vel().x > 0.0 && p[1].vel().x < 0.0);
        assert!((p[0].vel().x + p[1].vel().x).abs() < 1e-6);
    }

    #[test]
    fn test_timing_recorded_when_enabled() {
        let mut sim = Simulator::new(SimConfig { enable_timing: true, ..cfg() });
        sim.add_particle(1.0, 1.0, Vec2::ZERO, Vec2::X).unwrap();
        assert!(sim.timing().is_none());
        sim.simulate(0.1);
        let t = sim.timing().unwrap();
        assert!(t.simulate_ms >= t.broadphase_ms);
    }

    #[test]
    fn test_setters_clamp() {
        let mut sim = Simulator::default();
        sim.set_restitution(1.5);
        sim.set_friction(-0.2);
        sim.set_sub_steps(0);
        assert_eq!(sim.cfg.restitution, 1.0);
        assert_eq!(sim.cfg.friction, 0.0);
        assert_eq!(sim.cfg.sub_steps, 1);
    }
}
