use glam::Vec2;

use crate::api::RangeQuery;
use crate::error::{SimError, SimResult};
use crate::math::Rect;

/// 2D k-d tree over a fixed point set.
///
/// The tree is implicit: items are partially ordered in place so that the
/// median of every range `[lo, hi)` sits at `(lo + hi - 1) / 2`, with lower
/// coordinates to its left. Depth-even levels split on x, odd on y.
#[derive(Clone, Debug)]
pub struct KdTree<V> {
    items: Vec<(Vec2, V)>,
}

impl<V: Copy> KdTree<V> {
    pub fn new(points: &[Vec2], values: &[V]) -> SimResult<Self> {
        if points.len() != values.len() {
            return Err(SimError::LengthMismatch { points: points.len(), values: values.len() });
        }
        let mut items: Vec<(Vec2, V)> = points.iter().copied().zip(values.iter().copied()).collect();
        Self::partition(&mut items, 0);
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Values whose point lies inside `range`.
    pub fn range_query(&self, range: &Rect) -> Vec<V> {
        let mut out = Vec::new();
        self.query_into(0, self.items.len(), 0, range, &mut out);
        out
    }

    fn partition(items: &mut [(Vec2, V)], depth: usize) {
        if items.len() <= 1 {
            return;
        }
        let mid = (items.len() - 1) / 2;
        let axis = depth % 2;
        items.select_nth_unstable_by(mid, |a, b| a.0[axis].total_cmp(&b.0[axis]));
        let (lower, rest) = items.split_at_mut(mid);
        Self::partition(lower, depth + 1);
        Self::partition(&mut rest[1..], depth + 1);
    }

    fn query_into(&self, lo: usize, hi: usize, depth: usize, range: &Rect, out: &mut Vec<V>) {
        if lo >= hi {
            return;
        }
        let mid = lo + (hi - lo - 1) / 2;
        let (p, value) = self.items[mid];
        let (span, coord) = if depth % 2 == 0 { (range.x, p.x) } else { (range.y, p.y) };
        if span.end < coord {
            self.query_into(lo, mid, depth + 1, range, out);
        } else if span.start > coord {
            self.query_into(mid + 1, hi, depth + 1, range, out);
        } else {
            if range.contains(p) {
                out.push(value);
            }
            self.query_into(lo, mid, depth + 1, range, out);
            self.query_into(mid + 1, hi, depth + 1, range, out);
        }
    }
}

impl<V: Copy> RangeQuery<V> for KdTree<V> {
    fn build(points: &[Vec2], values: &[V]) -> SimResult<Self> {
        Self::new(points, values)
    }

    fn range_query(&self, range: &Rect) -> Vec<V> {
        KdTree::range_query(self, range)
    }
}
