use glam::Vec2;

use crate::error::SimResult;
use crate::force::ForceField;
use crate::math::Rect;
use crate::shapes::{Aabb, Ball, BoxShape, Line, Particle, Shape};
use crate::types::*;

/// Public API contract for the impulse simulator.
pub trait SimulatorApi {
    /// Construct an empty simulator with the given configuration.
    fn new(cfg: SimConfig) -> Self
    where
        Self: Sized;

    // --- Population --------------------------------------------------------

    /// Static segment; normal is `end - start` rotated +90 degrees.
    fn add_line(&mut self, start: Vec2, end: Vec2) -> usize;

    /// Static segment whose normal faces `point_on_normal_side`.
    fn add_line_facing(&mut self, start: Vec2, end: Vec2, point_on_normal_side: Vec2) -> usize;

    fn add_particle(&mut self, mass: f32, radius: f32, pos: Vec2, vel: Vec2) -> SimResult<usize>;

    fn add_ball(
        &mut self,
        mass: f32,
        radius: f32,
        pos: Vec2,
        vel: Vec2,
        angle: f32,
        ang_vel: f32,
    ) -> SimResult<usize>;

    #[allow(clippy::too_many_arguments)]
    fn add_box(
        &mut self,
        mass: f32,
        width: f32,
        height: f32,
        pos: Vec2,
        vel: Vec2,
        angle: f32,
        ang_vel: f32,
    ) -> SimResult<usize>;

    fn add_force_field(&mut self, field: ForceField) -> usize;

    /// Drop every shape and force field.
    fn clear(&mut self);

    // --- Stepping ----------------------------------------------------------

    /// Advance by `seconds`, split into `cfg.sub_steps` equal sub-steps.
    fn simulate(&mut self, seconds: f32);

    // --- Views -------------------------------------------------------------

    fn lines(&self) -> &[Line];
    fn particles(&self) -> &[Particle];
    fn balls(&self) -> &[Ball];
    fn boxes(&self) -> &[BoxShape];
    fn force_fields(&self) -> &[ForceField];
    fn force_fields_mut(&mut self) -> &mut [ForceField];

    /// Every shape, sorted by AABB left edge. Rebuilt lazily after mutation.
    fn shape_refs(&mut self) -> &[ShapeRef];

    /// Dynamic shapes only, sorted by AABB left edge.
    fn dynamic_refs(&mut self) -> &[ShapeRef];

    fn aabb_of(&self, shape: ShapeRef) -> Option<&Aabb>;

    fn stats(&self) -> SimStats;
    fn timing(&self) -> Option<SimTiming>;
}

/// Candidate-pair generation over any slice of AABB-bearing shapes.
///
/// Implementations return every `(i, j)` with `i < j` whose AABBs overlap,
/// excluding static-static pairs, sorted ascending.
pub trait Broadphase {
    fn find_pairs<S: Shape>(shapes: &[S]) -> Vec<(usize, usize)>;
}

/// Static 2D point index answering closed-rectangle queries.
pub trait RangeQuery<V> {
    fn build(points: &[Vec2], values: &[V]) -> SimResult<Self>
    where
        Self: Sized;

    /// Values whose point lies inside `range` (all edges inclusive).
    fn range_query(&self, range: &Rect) -> Vec<V>;
}

/// Contact resolution for the handled shape pairs. Each returns `true` when
/// the shapes were touching (and were resolved).
pub trait NarrowphaseApi {
    fn particle_particle(&self, a: &mut Particle, b: &mut Particle) -> bool;
    fn particle_line(&self, p: &mut Particle, line: &Line) -> bool;
    fn ball_line(&self, ball: &mut Ball, line: &Line) -> bool;
    fn box_line(&self, bx: &mut BoxShape, line: &Line) -> bool;
}
