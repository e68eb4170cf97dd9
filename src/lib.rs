//! impulse2d: impulse-based 2D particle and rigid-body simulator

pub mod types;
pub mod error;
pub mod math;
pub mod shapes;
pub mod api;
pub mod interval_tree;
pub mod kd_tree;
pub mod range_tree;
pub mod broadphase;
pub mod narrowphase;
pub mod force;
pub mod world;
pub mod scene;

pub use crate::types::*;
pub use crate::api::*;
pub use crate::error::{SceneError, SimError, SimResult};
pub use crate::force::ForceField;
pub use crate::interval_tree::IntervalTree;
pub use crate::kd_tree::KdTree;
pub use crate::math::{Rect, Span, Vec2Ext};
pub use crate::range_tree::RangeTree2D;
pub use crate::scene::{Scene, SceneCommand};
pub use crate::shapes::{Aabb, Ball, BoxShape, DynamicShape, Line, Particle, RigidShape, Shape};
pub use crate::world::Simulator;
pub use glam::Vec2;
