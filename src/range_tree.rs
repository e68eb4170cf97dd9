use glam::Vec2;

use crate::api::RangeQuery;
use crate::error::{SimError, SimResult};
use crate::math::{Rect, Span};

const NIL: usize = usize::MAX;

/// One slot of a node's y-sorted array. `left`/`right` point at the first
/// entry of the matching child array that is not below this one, or `NIL`
/// when that child has nothing left.
#[derive(Copy, Clone, Debug)]
struct YEntry {
    y: f32,
    item: usize,
    left: usize,
    right: usize,
}

#[derive(Clone, Debug)]
struct Node {
    x: Span,
    left: usize,
    right: usize,
    ys: Vec<YEntry>,
}

/// Static 2D range tree with fractional cascading.
///
/// The outer tree is a balanced split of the x-sorted points; every node
/// keeps all its points sorted by y. Only the root array is binary searched,
/// descendants are entered through the cross references.
#[derive(Clone, Debug)]
pub struct RangeTree2D<V> {
    items: Vec<(Vec2, V)>,
    nodes: Vec<Node>,
    root: usize,
}

impl<V: Copy> RangeTree2D<V> {
    pub fn new(points: &[Vec2], values: &[V]) -> SimResult<Self> {
        if points.len() != values.len() {
            return Err(SimError::LengthMismatch { points: points.len(), values: values.len() });
        }
        let mut items: Vec<(Vec2, V)> = points.iter().copied().zip(values.iter().copied()).collect();
        items.sort_by(|a, b| a.0.x.total_cmp(&b.0.x).then(a.0.y.total_cmp(&b.0.y)));
        let mut tree = Self { items, nodes: Vec::new(), root: NIL };
        if !tree.items.is_empty() {
            tree.nodes.reserve(2 * tree.items.len());
            tree.root = tree.build(0, tree.items.len());
        }
        Ok(tree)
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
        if self.root == NIL {
            return out;
        }
        let ys = &self.nodes[self.root].ys;
        let start = ys.partition_point(|e| e.y < range.y.start);
        if start < ys.len() {
            self.query_into(self.root, start, range, &mut out);
        }
        out
    }

    fn build(&mut self, lo: usize, hi: usize) -> usize {
        let x = Span { start: self.items[lo].0.x, end: self.items[hi - 1].0.x };
        if hi - lo == 1 {
            let y = self.items[lo].0.y;
            self.nodes.push(Node {
                x,
                left: NIL,
                right: NIL,
                ys: vec![YEntry { y, item: lo, left: NIL, right: NIL }],
            });
            return self.nodes.len() - 1;
        }

        let mid = lo + (hi - lo) / 2;
        let l = self.build(lo, mid);
        let r = self.build(mid, hi);

        let (lys, rys) = (&self.nodes[l].ys, &self.nodes[r].ys);
        let mut ys = Vec::with_capacity(lys.len() + rys.len());
        let (mut i, mut j) = (0, 0);
        while i < lys.len() || j < rys.len() {
            let left = if i < lys.len() { i } else { NIL };
            let right = if j < rys.len() { j } else { NIL };
            let take_left = j == rys.len() || (i < lys.len() && lys[i].y <= rys[j].y);
            let src = if take_left {
                i += 1;
                lys[i - 1]
            } else {
                j += 1;
                rys[j - 1]
            };
            ys.push(YEntry { y: src.y, item: src.item, left, right });
        }

        self.nodes.push(Node { x, left: l, right: r, ys });
        self.nodes.len() - 1
    }

    /// `start` is the index of the first entry of `n.ys` with `y >= range.y.start`.
    fn query_into(&self, n: usize, start: usize, range: &Rect, out: &mut Vec<V>) {
        if n == NIL || start == NIL {
            return;
        }
        let node = &self.nodes[n];
        if start >= node.ys.len() || !range.x.intersects(&node.x) {
            return;
        }
        if range.x.contains_span(&node.x) {
            for e in node.ys[start..].iter().take_while(|e| e.y <= range.y.end) {
                out.push(self.items[e.item].1);
            }
            return;
        }
        if node.left == NIL {
            let (p, v) = self.items[node.ys[start].item];
            if range.contains(p) {
                out.push(v);
            }
            return;
        }
        let entry = node.ys[start];
        self.query_into(node.left, entry.left, range, out);
        self.query_into(node.right, entry.right, range, out);
    }
}

impl<V: Copy> RangeQuery<V> for RangeTree2D<V> {
    fn build(points: &[Vec2], values: &[V]) -> SimResult<Self> {
        Self::new(points, values)
    }

    fn range_query(&self, range: &Rect) -> Vec<V> {
        RangeTree2D::range_query(self, range)
    }
}
