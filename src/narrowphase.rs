use glam::Vec2;

use crate::api::NarrowphaseApi;
use crate::math::{dist_sq_to_segment, Vec2Ext};
use crate::shapes::{Ball, BoxShape, DynamicShape, Line, Particle};

/// Single-pass impulse resolution: every contact is handled once per
/// sub-step, independent of any other contact touching the same body.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Narrowphase {
    pub restitution: f32,
    pub friction: f32,
}

impl Narrowphase {
    pub fn new(restitution: f32, friction: f32) -> Self {
        Self { restitution, friction }
    }

    /// Normal response plus capped Coulomb friction for a circle resting on a
    /// line. `spin_vel` is the extra tangential term rigid bodies fold in.
    fn line_impulse(&self, momentum: Vec2, normal: Vec2, spin_vel: Vec2) -> Vec2 {
        let normal_comp = momentum.proj_on_unit(normal);
        let normal_impulse = -(1.0 + self.restitution) * normal_comp;
        let (tangent_mag, tangent_dir) = (momentum - normal_comp - spin_vel).magnitude_and_direction();
        let friction = -self.friction * normal_comp.length().min(tangent_mag) * tangent_dir;
        normal_impulse + friction
    }
}

/// Distance-to-segment test shared by the circle-vs-line manifolds. Pushes
/// the body out along `normal` by the penetration depth and returns `false`
/// if it is not touching.
fn push_out_of_line(body_pos: &mut Vec2, radius: f32, line: &Line) -> bool {
    let dist_sq = dist_sq_to_segment(line.start(), line.end(), *body_pos);
    if dist_sq > radius * radius {
        return false;
    }
    let depth = dist_sq.sqrt() - radius;
    if depth < 0.0 {
        *body_pos -= line.normal() * depth;
    }
    true
}

impl NarrowphaseApi for Narrowphase {
    fn particle_particle(&self, a: &mut Particle, b: &mut Particle) -> bool {
        let reach = a.radius + b.radius;
        let offset = b.body.pos - a.body.pos;
        let dist_sq = offset.length_squared();
        if dist_sq > reach * reach {
            return false;
        }
        let dist = dist_sq.sqrt();
        if dist == 0.0 {
            // coincident centres: no usable normal
            return false;
        }
        let n = offset / dist;
        let depth = dist - reach;
        if depth < 0.0 {
            // each body moves by the full depth
            a.body.pos += n * depth;
            b.body.pos -= n * depth;
        }
        if a.body.vel.dot(n) > b.body.vel.dot(n) {
            let v_rel = b.body.vel - a.body.vel;
            let impulse = v_rel.proj_on_unit(n) * (1.0 + self.restitution) / (a.body.inv_mass + b.body.inv_mass);
            a.body.vel += impulse * a.body.inv_mass;
            b.body.vel -= impulse * b.body.inv_mass;
        }
        true
    }

    fn particle_line(&self, p: &mut Particle, line: &Line) -> bool {
        if !push_out_of_line(&mut p.body.pos, p.radius, line) {
            return false;
        }
        let n = line.normal();
        if p.body.vel.dot(n) < 0.0 {
            let impulse = self.line_impulse(p.body.vel * p.body.mass, n, Vec2::ZERO);
            let at = p.body.pos;
            p.apply_impulse(impulse, at);
        }
        true
    }

    fn ball_line(&self, ball: &mut Ball, line: &Line) -> bool {
        if !push_out_of_line(&mut ball.body.pos, ball.radius, line) {
            return false;
        }
        let n = line.normal();
        if ball.body.vel.dot(n) < 0.0 {
            let spin_vel = n.rotate_sc(1.0, 0.0) * (ball.spin.ang_vel * ball.spin.inertia * ball.radius);
            let impulse = self.line_impulse(ball.body.vel * ball.body.mass, n, spin_vel);
            let contact = ball.body.pos - n * ball.radius;
            ball.apply_impulse(impulse, contact);
        }
        true
    }

    fn box_line(&self, bx: &mut BoxShape, line: &Line) -> bool {
        let radius = (bx.width * bx.height).sqrt();
        if !push_out_of_line(&mut bx.body.pos, radius, line) {
            return false;
        }
        let n = line.normal();
        if bx.body.vel.dot(n) < 0.0 {
            let impulse = -(1.0 + self.restitution) * bx.body.mass * bx.body.vel.proj_on_unit(n);
            let contact = bx.body.pos - n * radius;
            bx.apply_impulse(impulse, contact);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> Line {
        Line::new(Vec2::new(-10.0, 0.0), Vec2::new(10.0, 0.0))
    }

    #[test]
    fn test_particle_particle_elastic_swap() {
        let np = Narrowphase::new(1.0, 0.0);
        let mut a = Particle::new(Vec2::new(-0.9, 0.0), Vec2::new(1.0, 0.0), 1.0, 1.0).unwrap();
        let mut b = Particle::new(Vec2::new(0.9, 0.0), Vec2::new(-1.0, 0.0), 1.0, 1.0).unwrap();
        assert!(np.particle_particle(&mut a, &mut b));
        assert!((a.body.vel - Vec2::new(-1.0, 0.0)).length() < 1e-6);
        assert!((b.body.vel - Vec2::new(1.0, 0.0)).length() < 1e-6);
        // full-depth correction on both sides: 0.2 each
        assert!((a.body.pos.x + 1.1).abs() < 1e-6);
        assert!((b.body.pos.x - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_particle_particle_separating_untouched() {
        let np = Narrowphase::new(1.0, 0.0);
        let mut a = Particle::new(Vec2::new(-1.0, 0.0), Vec2::new(-1.0, 0.0), 1.0, 1.0).unwrap();
        let mut b = Particle::new(Vec2::new(1.0, 0.0), Vec2::new(1.0, 0.0), 1.0, 1.0).unwrap();
        assert!(np.particle_particle(&mut a, &mut b));
        assert_eq!(a.body.vel, Vec2::new(-1.0, 0.0));
        assert_eq!(b.body.vel, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_particle_particle_unequal_masses_conserve_momentum() {
        let np = Narrowphase::new(0.5, 0.0);
        let mut a = Particle::new(Vec2::new(-0.5, 0.0), Vec2::new(2.0, 0.0), 3.0, 1.0).unwrap();
        let mut b = Particle::new(Vec2::new(0.5, 0.0), Vec2::new(-1.0, 0.0), 1.0, 1.0).unwrap();
        let before = a.body.vel * a.body.mass + b.body.vel * b.body.mass;
        np.particle_particle(&mut a, &mut b);
        let after = a.body.vel * a.body.mass + b.body.vel * b.body.mass;
        assert!((before - after).length() < 1e-5);
    }

    #[test]
    fn test_coincident_particles_ignored() {
        let np = Narrowphase::new(1.0, 0.5);
        let mut a = Particle::new(Vec2::ZERO, Vec2::X, 1.0, 1.0).unwrap();
        let mut b = Particle::new(Vec2::ZERO, -Vec2::X, 1.0, 1.0).unwrap();
        assert!(!np.particle_particle(&mut a, &mut b));
        assert_eq!(a.body.vel, Vec2::X);
    }

    #[test]
    fn test_particle_bounces_off_floor() {
        let np = Narrowphase::new(1.0, 0.0);
        let mut p = Particle::new(Vec2::new(0.0, 0.5), Vec2::new(0.0, -3.0), 2.0, 1.0).unwrap();
        assert!(np.particle_line(&mut p, &floor()));
        assert!((p.body.pos.y - 1.0).abs() < 1e-6);
        assert!((p.body.vel - Vec2::new(0.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_particle_line_friction_is_capped() {
        let np = Narrowphase::new(0.0, 1.0);
        let mut p = Particle::new(Vec2::new(0.0, 1.0), Vec2::new(5.0, -1.0), 1.0, 1.0).unwrap();
        np.particle_line(&mut p, &floor());
        // normal fully absorbed, tangential reduced by |normal momentum| only
        assert!(p.body.vel.y.abs() < 1e-6);
        assert!((p.body.vel.x - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_particle_beyond_segment_end_misses() {
        let np = Narrowphase::new(1.0, 0.0);
        let mut p = Particle::new(Vec2::new(12.0, 0.5), Vec2::new(0.0, -1.0), 1.0, 1.0).unwrap();
        assert!(!np.particle_line(&mut p, &floor()));
        assert_eq!(p.body.vel, Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_ball_line_friction_spins_ball() {
        let np = Narrowphase::new(1.0, 0.5);
        let mut b = Ball::new(Vec2::new(0.0, 1.0), Vec2::new(2.0, -1.0), 1.0, 1.0, 0.0, 0.0).unwrap();
        assert!(np.ball_line(&mut b, &floor()));
        assert!(b.body.vel.y > 0.0);
        assert!(b.body.vel.x < 2.0);
        // friction acts at the bottom against +x motion: clockwise spin
        assert!(b.spin.ang_vel < 0.0);
    }

    #[test]
    fn test_box_line_uses_area_radius() {
        let np = Narrowphase::new(1.0, 0.0);
        // sqrt(1 * 4) = 2
        let mut bx = BoxShape::new(Vec2::new(0.0, 1.9), Vec2::new(0.0, -1.0), 1.0, 1.0, 4.0, 0.0, 0.0).unwrap();
        assert!(np.box_line(&mut bx, &floor()));
        assert!((bx.body.pos.y - 2.0).abs() < 1e-5);
        assert!((bx.body.vel.y - 1.0).abs() < 1e-5);

        let mut far = BoxShape::new(Vec2::new(0.0, 2.5), Vec2::new(0.0, -1.0), 1.0, 1.0, 4.0, 0.0, 0.0).unwrap();
        assert!(!np.box_line(&mut far, &floor()));
    }
}
