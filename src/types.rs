/// Shape type tags.
///
/// Each level of specialisation appends one hex digit to its parent's tag, so
/// `is_a` is a shift-and-compare instead of a dispatch table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ShapeType {
    BaseShape = 0x1,
    DynamicShape = 0x11,
    Line = 0x12,
    Particle = 0x111,
    RigidShape = 0x112,
    Ball = 0x1121,
    Box = 0x1122,
}

impl ShapeType {
    #[inline]
    pub fn tag(self) -> u32 {
        self as u32
    }

    /// `true` if `self` is `ancestor` or specialises it.
    pub fn is_a(self, ancestor: ShapeType) -> bool {
        is_type_of(ancestor.tag(), self.tag())
    }
}

/// Raw tag test: does `tag` descend from (or equal) `ancestor`?
pub fn is_type_of(ancestor: u32, mut tag: u32) -> bool {
    if ancestor == 0 || tag == 0 {
        return false;
    }
    while ancestor < tag {
        tag >>= 4;
    }
    ancestor == tag
}

/// Handle into one of the simulator's per-variant collections.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShapeRef {
    Line(usize),
    Particle(usize),
    Ball(usize),
    Box(usize),
}

impl ShapeRef {
    pub fn shape_type(self) -> ShapeType {
        match self {
            ShapeRef::Line(_) => ShapeType::Line,
            ShapeRef::Particle(_) => ShapeType::Particle,
            ShapeRef::Ball(_) => ShapeType::Ball,
            ShapeRef::Box(_) => ShapeType::Box,
        }
    }
}

/// Broad-phase algorithm used by `simulate`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BroadphaseKind {
    /// All pairs, O(n^2). Reference implementation.
    BruteForce,
    /// Sort by AABB left edge, scan right while edges overlap.
    #[default]
    SortedSweep,
    /// Sweep line over x with an interval tree over y as the active set.
    IntervalSweep,
    /// Min-corner k-d tree, one range query per shape.
    KdTree,
    /// Min-corner 2D range tree, one range query per shape.
    RangeTree,
}

/// Simulator tunables. All fields may be changed between `simulate` calls.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Number of equal sub-steps per `simulate` call (>= 1).
    pub sub_steps: u32,
    /// Bounciness in [0, 1].
    pub restitution: f32,
    /// Coulomb-style friction factor in [0, 1].
    pub friction: f32,
    /// Pairwise gravitational constant; the O(n^2) pass only runs when > 0.
    pub n_body_gravity: f32,
    pub broadphase: BroadphaseKind,
    /// Record a `SimTiming` breakdown for each `simulate` call.
    pub enable_timing: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            sub_steps: 10,
            restitution: 1.0,
            friction: 0.5,
            n_body_gravity: 0.0,
            broadphase: BroadphaseKind::default(),
            enable_timing: false,
        }
    }
}

/// Counters for the last `simulate` call.
#[derive(Copy, Clone, Debug, Default)]
pub struct SimStats {
    pub dynamic_shapes: usize,
    pub static_shapes: usize,
    /// Candidate pairs summed over all sub-steps.
    pub candidate_pairs: usize,
    /// Candidate pairs that turned out to be touching, summed over sub-steps.
    pub contacts: usize,
}

/// Timing breakdown for the last `simulate` call.
#[derive(Copy, Clone, Debug, Default)]
pub struct SimTiming {
    pub simulate_ms: f64,
    pub integrate_ms: f64,
    pub n_body_ms: f64,
    pub broadphase_ms: f64,
    pub narrowphase_ms: f64,
}
