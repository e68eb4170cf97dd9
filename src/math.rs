use glam::Vec2;

/// Vector helpers the solver needs on top of `glam::Vec2`.
///
/// `glam` already covers add/sub/scale, `dot`, `perp_dot` (2D cross) and
/// `normalize`; these fill in the projection and rotation forms used by the
/// contact code.
pub trait Vec2Ext {
    /// Projection of `self` onto an arbitrary (non-zero) vector.
    fn proj(self, onto: Vec2) -> Vec2;
    /// Projection of `self` onto a vector already known to be unit length.
    fn proj_on_unit(self, unit: Vec2) -> Vec2;
    /// Rotate counter-clockwise by an angle given as its (sin, cos) pair.
    fn rotate_sc(self, sin: f32, cos: f32) -> Vec2;
    /// Rotate counter-clockwise by `angle` radians.
    fn rotated(self, angle: f32) -> Vec2;
    /// Length and unit direction; `(0, ZERO)` for near-zero vectors.
    fn magnitude_and_direction(self) -> (f32, Vec2);
}

impl Vec2Ext for Vec2 {
    #[inline]
    fn proj(self, onto: Vec2) -> Vec2 {
        onto * (self.dot(onto) / onto.length_squared())
    }

    #[inline]
    fn proj_on_unit(self, unit: Vec2) -> Vec2 {
        unit * self.dot(unit)
    }

    #[inline]
    fn rotate_sc(self, sin: f32, cos: f32) -> Vec2 {
        Vec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    #[inline]
    fn rotated(self, angle: f32) -> Vec2 {
        let (s, c) = angle.sin_cos();
        self.rotate_sc(s, c)
    }

    #[inline]
    fn magnitude_and_direction(self) -> (f32, Vec2) {
        let mag = self.length();
        if almost_equal(mag, 0.0) {
            return (0.0, Vec2::ZERO);
        }
        (mag, self / mag)
    }
}

/// Epsilon comparison scaled to the magnitude of the operands.
///
/// Also true when the difference is subnormal, which is what makes it usable
/// as a "is this length zero" test.
#[inline]
pub fn almost_equal(x: f32, y: f32) -> bool {
    let diff = (x - y).abs();
    diff <= f32::EPSILON * (x + y).abs() || diff < f32::MIN_POSITIVE
}

/// Squared distance from `p` to the segment `start..end` (clamped, not the
/// infinite line). A zero-length segment measures to `start`.
pub fn dist_sq_to_segment(start: Vec2, end: Vec2, p: Vec2) -> f32 {
    let d = end - start;
    let len_sq = d.length_squared();
    if len_sq == 0.0 {
        return (p - start).length_squared();
    }
    let t = (p - start).dot(d) / len_sq;
    if t < 0.0 {
        (start - p).length_squared()
    } else if t > 1.0 {
        (end - p).length_squared()
    } else {
        (p - (start + d * t)).length_squared()
    }
}

/// Closed 1D range; endpoints are normalised so `start <= end`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Span {
    pub start: f32,
    pub end: f32,
}

impl Span {
    pub fn new(a: f32, b: f32) -> Self {
        Self { start: a.min(b), end: a.max(b) }
    }

    #[inline]
    pub fn contains(&self, v: f32) -> bool {
        self.start <= v && v <= self.end
    }

    #[inline]
    pub fn contains_span(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    #[inline]
    pub fn intersects(&self, other: &Span) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Axis-aligned query rectangle, inclusive on every edge.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    pub x: Span,
    pub y: Span,
}

impl Rect {
    pub fn new(x0: f32, x1: f32, y0: f32, y1: f32) -> Self {
        Self { x: Span::new(x0, x1), y: Span::new(y0, y1) }
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y)
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.x.contains_span(&other.x) && self.y.contains_span(&other.y)
    }
}
