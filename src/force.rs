use std::fmt;

use glam::Vec2;

use crate::math::Vec2Ext;
use crate::shapes::DynamicShape;

/// Standard gravity, y up.
pub const EARTH_GRAVITY: Vec2 = Vec2::new(0.0, -9.8);

type FieldFn = dyn Fn(&dyn DynamicShape, &ForceField) -> Vec2 + Send + Sync;

/// A force applied to every dynamic shape each sub-step. The simulator turns
/// it into an impulse `force * dt` at the shape's position.
///
/// `pos` is a reference point the field function may read (e.g. the source
/// of point gravity); callers may move it between steps through
/// `force_fields_mut`.
pub struct ForceField {
    pub pos: Vec2,
    func: Box<FieldFn>,
}

impl ForceField {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&dyn DynamicShape, &ForceField) -> Vec2 + Send + Sync + 'static,
    {
        Self::with_pos(Vec2::ZERO, func)
    }

    pub fn with_pos<F>(pos: Vec2, func: F) -> Self
    where
        F: Fn(&dyn DynamicShape, &ForceField) -> Vec2 + Send + Sync + 'static,
    {
        Self { pos, func: Box::new(func) }
    }

    /// Constant acceleration `g`: force `g * mass`.
    pub fn uniform(g: Vec2) -> Self {
        Self::new(move |shape, _| g * shape.mass())
    }

    pub fn earth_gravity() -> Self {
        Self::uniform(EARTH_GRAVITY)
    }

    /// Inverse-square attraction toward `pos`: `strength * mass / d^2`.
    /// Zero at the source itself.
    pub fn point_gravity(pos: Vec2, strength: f32) -> Self {
        Self::with_pos(pos, move |shape, field| {
            let (dist, dir) = (field.pos - shape.pos()).magnitude_and_direction();
            if dist == 0.0 {
                return Vec2::ZERO;
            }
            dir * (strength * shape.mass() / (dist * dist))
        })
    }

    /// Force this field exerts on `shape`.
    #[inline]
    pub fn force(&self, shape: &dyn DynamicShape) -> Vec2 {
        (self.func)(shape, self)
    }
}

impl fmt::Debug for ForceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForceField").field("pos", &self.pos).finish_non_exhaustive()
    }
}
