use glam::Vec2;

use crate::error::{SimError, SimResult};
use crate::math::Vec2Ext;
use crate::types::ShapeType;

/// Axis-aligned bounding box. Invariant: `left <= right`, `bottom <= top`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Aabb {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl Aabb {
    pub fn new(left: f32, bottom: f32, right: f32, top: f32) -> Self {
        Self { left, bottom, right, top }
    }

    /// Bounds `min..max` extended by `motion` on the side it points to only.
    pub fn swept(min: Vec2, max: Vec2, motion: Vec2) -> Self {
        Self {
            left: min.x + motion.x.min(0.0),
            bottom: min.y + motion.y.min(0.0),
            right: max.x + motion.x.max(0.0),
            top: max.y + motion.y.max(0.0),
        }
    }

    /// 4-way overlap test, inclusive on edges.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        !(self.right < other.left
            || self.left > other.right
            || self.top < other.bottom
            || self.bottom > other.top)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.left, self.bottom)
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.left <= self.right && self.bottom <= self.top
    }
}

/// Anything the broad-phase can pair up.
pub trait Shape {
    fn aabb(&self) -> &Aabb;
    fn shape_type(&self) -> ShapeType;

    /// Static geometry never needs mutual resolution.
    fn is_static(&self) -> bool {
        !self.shape_type().is_a(ShapeType::DynamicShape)
    }
}

impl<T: Shape + ?Sized> Shape for &T {
    fn aabb(&self) -> &Aabb {
        (**self).aabb()
    }

    fn shape_type(&self) -> ShapeType {
        (**self).shape_type()
    }
}

/// Linear state shared by every moving shape.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub mass: f32,
    pub inv_mass: f32,
}

impl Body {
    pub fn new(pos: Vec2, vel: Vec2, mass: f32) -> SimResult<Self> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(SimError::InvalidMass(mass));
        }
        Ok(Self { pos, vel, mass, inv_mass: 1.0 / mass })
    }
}

/// Angular state of a rigid shape.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Spin {
    pub inertia: f32,
    pub inv_inertia: f32,
    pub angle: f32,
    pub ang_vel: f32,
}

impl Spin {
    fn new(inertia: f32, angle: f32, ang_vel: f32) -> Self {
        let inv_inertia = if inertia > 0.0 { 1.0 / inertia } else { 0.0 };
        Self { inertia, inv_inertia, angle, ang_vel }
    }
}

/// A shape that moves: integrates its position and reacts to impulses.
pub trait DynamicShape: Shape {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    /// Recompute the AABB at the current pose, swept by `vel * dt`.
    fn update_aabb(&mut self, dt: f32);

    /// Apply `impulse` at world-space `contact`. Point-mass shapes ignore the
    /// contact point.
    fn apply_impulse(&mut self, impulse: Vec2, _contact: Vec2) {
        let b = self.body_mut();
        b.vel += impulse * b.inv_mass;
    }

    /// Euler step: `pos += vel * dt`, then refresh the AABB.
    fn advance(&mut self, dt: f32) {
        let b = self.body_mut();
        b.pos += b.vel * dt;
        self.update_aabb(dt);
    }

    #[inline]
    fn pos(&self) -> Vec2 {
        self.body().pos
    }

    #[inline]
    fn vel(&self) -> Vec2 {
        self.body().vel
    }

    #[inline]
    fn mass(&self) -> f32 {
        self.body().mass
    }
}

/// Rigid shapes additionally carry angular state.
pub trait RigidShape: DynamicShape {
    fn spin(&self) -> &Spin;
}

// Shared rigid-body paths; Ball and Box route their DynamicShape impls here.
fn rigid_apply_impulse(body: &mut Body, spin: &mut Spin, impulse: Vec2, contact: Vec2) {
    spin.ang_vel += (contact - body.pos).perp_dot(impulse) * spin.inv_inertia;
    body.vel += impulse * body.inv_mass;
}

fn rigid_advance(body: &mut Body, spin: &mut Spin, dt: f32) {
    body.pos += body.vel * dt;
    spin.angle += spin.ang_vel * dt;
}

/// Circular point mass without rotation.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub body: Body,
    pub radius: f32,
    aabb: Aabb,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, mass: f32, radius: f32) -> SimResult<Self> {
        let mut p = Self { body: Body::new(pos, vel, mass)?, radius, aabb: Aabb::default() };
        p.update_aabb(0.0);
        Ok(p)
    }
}

impl Shape for Particle {
    fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    fn shape_type(&self) -> ShapeType {
        ShapeType::Particle
    }
}

impl DynamicShape for Particle {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update_aabb(&mut self, dt: f32) {
        let r = Vec2::splat(self.radius);
        self.aabb = Aabb::swept(self.body.pos - r, self.body.pos + r, self.body.vel * dt);
    }
}

/// Rotating disc. Moment of inertia `m r^2 / 2`.
#[derive(Clone, Debug, PartialEq)]
pub struct Ball {
    pub body: Body,
    pub spin: Spin,
    pub radius: f32,
    aabb: Aabb,
}

impl Ball {
    pub fn new(
        pos: Vec2,
        vel: Vec2,
        mass: f32,
        radius: f32,
        angle: f32,
        ang_vel: f32,
    ) -> SimResult<Self> {
        let body = Body::new(pos, vel, mass)?;
        let spin = Spin::new(mass * radius * radius * 0.5, angle, ang_vel);
        let mut b = Self { body, spin, radius, aabb: Aabb::default() };
        b.update_aabb(0.0);
        Ok(b)
    }
}

impl Shape for Ball {
    fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    fn shape_type(&self) -> ShapeType {
        ShapeType::Ball
    }
}

impl DynamicShape for Ball {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update_aabb(&mut self, dt: f32) {
        let r = Vec2::splat(self.radius);
        self.aabb = Aabb::swept(self.body.pos - r, self.body.pos + r, self.body.vel * dt);
    }

    fn apply_impulse(&mut self, impulse: Vec2, contact: Vec2) {
        rigid_apply_impulse(&mut self.body, &mut self.spin, impulse, contact);
    }

    fn advance(&mut self, dt: f32) {
        rigid_advance(&mut self.body, &mut self.spin, dt);
        self.update_aabb(dt);
    }
}

impl RigidShape for Ball {
    fn spin(&self) -> &Spin {
        &self.spin
    }
}

/// Rotating rectangle of full `width` x `height`, centred on its position.
/// Moment of inertia `m (w^2 + h^2) / 12`.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxShape {
    pub body: Body,
    pub spin: Spin,
    pub width: f32,
    pub height: f32,
    corners: [Vec2; 4],
    aabb: Aabb,
}

impl BoxShape {
    pub fn new(
        pos: Vec2,
        vel: Vec2,
        mass: f32,
        width: f32,
        height: f32,
        angle: f32,
        ang_vel: f32,
    ) -> SimResult<Self> {
        let body = Body::new(pos, vel, mass)?;
        let spin = Spin::new(mass * (width * width + height * height) / 12.0, angle, ang_vel);
        let mut b = Self { body, spin, width, height, corners: [pos; 4], aabb: Aabb::default() };
        b.update_aabb(0.0);
        Ok(b)
    }

    /// World-space corners as of the last AABB update, counter-clockwise.
    pub fn corners(&self) -> &[Vec2; 4] {
        &self.corners
    }
}

impl Shape for BoxShape {
    fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    fn shape_type(&self) -> ShapeType {
        ShapeType::Box
    }
}

impl DynamicShape for BoxShape {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update_aabb(&mut self, dt: f32) {
        let (s, c) = self.spin.angle.sin_cos();
        let first = Vec2::new(self.width, self.height).rotate_sc(s, c) * 0.5;
        let second = Vec2::new(-self.width, self.height).rotate_sc(s, c) * 0.5;
        let pos = self.body.pos;
        self.corners = [pos + first, pos + second, pos - first, pos - second];
        let mut min = self.corners[0];
        let mut max = self.corners[0];
        for c in &self.corners[1..] {
            min = min.min(*c);
            max = max.max(*c);
        }
        self.aabb = Aabb::swept(min, max, self.body.vel * dt);
    }

    fn apply_impulse(&mut self, impulse: Vec2, contact: Vec2) {
        rigid_apply_impulse(&mut self.body, &mut self.spin, impulse, contact);
    }

    fn advance(&mut self, dt: f32) {
        rigid_advance(&mut self.body, &mut self.spin, dt);
        self.update_aabb(dt);
    }
}

impl RigidShape for BoxShape {
    fn spin(&self) -> &Spin {
        &self.spin
    }
}

/// Static segment with a fixed unit normal.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    start: Vec2,
    end: Vec2,
    normal: Vec2,
    aabb: Aabb,
}

impl Line {
    /// Bounding-box padding so axis-aligned segments never get a zero-thickness AABB.
    pub const PADDING: f32 = 0.05;

    /// Normal is the segment direction rotated +90 degrees, so callers pick
    /// the facing side through endpoint order.
    pub fn new(start: Vec2, end: Vec2) -> Self {
        let normal = (end - start).rotate_sc(1.0, 0.0).normalize_or_zero();
        Self::with_normal(start, end, normal)
    }

    /// Normal faces `point_on_side`.
    pub fn facing(start: Vec2, end: Vec2, point_on_side: Vec2) -> Self {
        let d = end - start;
        let rel = point_on_side - start;
        let normal = (rel * d.length_squared() - d * d.dot(rel)).normalize_or_zero();
        Self::with_normal(start, end, normal)
    }

    fn with_normal(start: Vec2, end: Vec2, normal: Vec2) -> Self {
        let pad = Vec2::splat(Self::PADDING);
        let min = start.min(end) - pad;
        let max = start.max(end) + pad;
        let aabb = Aabb::new(min.x, min.y, max.x, max.y);
        Self { start, end, normal, aabb }
    }

    pub fn start(&self) -> Vec2 {
        self.start
    }

    pub fn end(&self) -> Vec2 {
        self.end
    }

    pub fn normal(&self) -> Vec2 {
        self.normal
    }
}

impl Shape for Line {
    fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    fn shape_type(&self) -> ShapeType {
        ShapeType::Line
    }
}

/// Bare AABB + tag, the view the broad-phase works on.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Proxy {
    pub aabb: Aabb,
    pub kind: ShapeType,
}

impl Shape for Proxy {
    fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    fn shape_type(&self) -> ShapeType {
        self.kind
    }
}
