//! Broad-phase candidate-pair generation.
//!
//! Every strategy returns the same set: all `(i, j)`, `i < j`, whose AABBs
//! overlap (edges inclusive) and which are not both static, sorted ascending.

use std::marker::PhantomData;

use glam::Vec2;

use crate::api::{Broadphase, RangeQuery};
use crate::interval_tree::IntervalTree;
use crate::kd_tree::KdTree;
use crate::math::Rect;
use crate::range_tree::RangeTree2D;
use crate::shapes::Shape;
use crate::types::BroadphaseKind;

#[inline]
fn both_static<S: Shape>(a: &S, b: &S) -> bool {
    a.is_static() && b.is_static()
}

#[inline]
fn ordered(i: usize, j: usize) -> (usize, usize) {
    if i < j { (i, j) } else { (j, i) }
}

/// All pairs, O(n^2). Ground truth for the others.
pub struct BruteForce;

impl Broadphase for BruteForce {
    fn find_pairs<S: Shape>(shapes: &[S]) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, a) in shapes.iter().enumerate() {
            for (j, b) in shapes.iter().enumerate().skip(i + 1) {
                if !both_static(a, b) && a.aabb().intersects(b.aabb()) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }
}

/// Sort by left edge, then scan right only while the candidate's left edge
/// is within the current shape's right edge.
pub struct SortedSweep;

impl Broadphase for SortedSweep {
    fn find_pairs<S: Shape>(shapes: &[S]) -> Vec<(usize, usize)> {
        let mut order: Vec<usize> = (0..shapes.len()).collect();
        order.sort_by(|&a, &b| shapes[a].aabb().left.total_cmp(&shapes[b].aabb().left).then(a.cmp(&b)));

        let mut pairs = Vec::new();
        for (k, &i) in order.iter().enumerate() {
            let a = &shapes[i];
            let right = a.aabb().right;
            for &j in &order[k + 1..] {
                let b = &shapes[j];
                if b.aabb().left > right {
                    break;
                }
                if !both_static(a, b) && a.aabb().intersects(b.aabb()) {
                    pairs.push(ordered(i, j));
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum EdgeKind {
    // Declaration order is sort order: opens precede closes at equal x.
    Start,
    End,
}

/// Line sweep over x with an interval tree of y-extents as the active set.
pub struct IntervalSweep;

impl Broadphase for IntervalSweep {
    fn find_pairs<S: Shape>(shapes: &[S]) -> Vec<(usize, usize)> {
        let mut events: Vec<(f32, EdgeKind, usize)> = Vec::with_capacity(shapes.len() * 2);
        for (i, s) in shapes.iter().enumerate() {
            // `+ 0.0` folds -0.0 into +0.0, which total_cmp would order first
            events.push((s.aabb().left + 0.0, EdgeKind::Start, i));
            events.push((s.aabb().right + 0.0, EdgeKind::End, i));
        }
        events.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

        let mut active: IntervalTree<f32, usize> = IntervalTree::with_capacity(shapes.len());
        let mut hits = Vec::new();
        let mut pairs = Vec::new();
        for (_, kind, i) in events {
            let bb = shapes[i].aabb();
            match kind {
                EdgeKind::Start => {
                    hits.clear();
                    active.search_all_into(bb.bottom, bb.top, &mut hits);
                    for &j in &hits {
                        if !both_static(&shapes[i], &shapes[j]) {
                            pairs.push(ordered(i, j));
                        }
                    }
                    active.insert(bb.bottom, bb.top, i);
                }
                EdgeKind::End => {
                    let removed = active.remove(bb.bottom, bb.top, i);
                    debug_assert!(removed, "sweep closed an interval it never opened");
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }
}

/// Index every AABB's min corner in a range-query structure and ask, per
/// shape, for the min corners that could belong to an overlapping box.
pub struct TreeQuery<T>(PhantomData<T>);

pub type KdTreeQuery = TreeQuery<KdTree<usize>>;
pub type RangeTreeQuery = TreeQuery<RangeTree2D<usize>>;

impl<T: RangeQuery<usize>> Broadphase for TreeQuery<T> {
    fn find_pairs<S: Shape>(shapes: &[S]) -> Vec<(usize, usize)> {
        if shapes.is_empty() {
            return Vec::new();
        }
        let corners: Vec<Vec2> = shapes.iter().map(|s| s.aabb().min()).collect();
        let ids: Vec<usize> = (0..shapes.len()).collect();
        let Ok(tree) = T::build(&corners, &ids) else {
            return Vec::new();
        };
        let (max_w, max_h) = shapes
            .iter()
            .fold((0.0f32, 0.0f32), |(w, h), s| (w.max(s.aabb().width()), h.max(s.aabb().height())));

        // widened by a few ulps; every hit is re-checked against the real boxes
        let widen = |v: f32, extent: f32| v - (v.abs().max(extent) * 4.0 * f32::EPSILON);

        let mut pairs = Vec::new();
        for (i, a) in shapes.iter().enumerate() {
            let bb = a.aabb();
            let range = Rect::new(
                widen(bb.left - max_w, max_w),
                bb.right,
                widen(bb.bottom - max_h, max_h),
                bb.top,
            );
            for j in tree.range_query(&range) {
                let b = &shapes[j];
                if j > i && !both_static(a, b) && bb.intersects(b.aabb()) {
                    pairs.push((i, j));
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }
}

/// Run the strategy selected by `kind`.
pub fn find_pairs<S: Shape>(kind: BroadphaseKind, shapes: &[S]) -> Vec<(usize, usize)> {
    match kind {
        BroadphaseKind::BruteForce => BruteForce::find_pairs(shapes),
        BroadphaseKind::SortedSweep => SortedSweep::find_pairs(shapes),
        BroadphaseKind::IntervalSweep => IntervalSweep::find_pairs(shapes),
        BroadphaseKind::KdTree => KdTreeQuery::find_pairs(shapes),
        BroadphaseKind::RangeTree => RangeTreeQuery::find_pairs(shapes),
    }
}
