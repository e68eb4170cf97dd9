//! Augmented AVL interval tree backed by an index arena.
//!
//! Nodes live in a `Vec` and refer to each other by index; released slots go
//! on a free list and are reused by later inserts, so a sweep that inserts and
//! removes thousands of intervals per step does not hit the allocator.

use std::cmp::Ordering;

/// Null link.
pub const NIL: usize = usize::MAX;

#[derive(Clone, Debug)]
struct Node<K, V> {
    low: K,
    high: K,
    value: V,
    /// Largest `high` anywhere in this subtree.
    max_end: K,
    left: usize,
    right: usize,
    height: i32,
    balance: i32,
}

/// Multiset of closed intervals `[low, high]` with an attached value.
///
/// Ordered lexicographically by `(low, high, value)`, so identical intervals
/// carrying different values coexist.
#[derive(Clone, Debug)]
pub struct IntervalTree<K, V> {
    nodes: Vec<Node<K, V>>,
    free: Vec<usize>,
    root: usize,
    len: usize,
}

impl<K, V> Default for IntervalTree<K, V> {
    fn default() -> Self {
        Self { nodes: Vec::new(), free: Vec::new(), root: NIL, len: 0 }
    }
}

#[inline]
fn order<K: PartialOrd>(a: &K, b: &K) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

#[inline]
fn max_of<K: PartialOrd + Copy>(a: K, b: K) -> K {
    if b > a { b } else { a }
}

impl<K: Copy + PartialOrd, V: Copy + Ord> IntervalTree<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self { nodes: Vec::with_capacity(cap), free: Vec::new(), root: NIL, len: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop every interval. Arena capacity is retained.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = NIL;
        self.len = 0;
    }

    pub fn insert(&mut self, low: K, high: K, value: V) {
        self.root = self.insert_at(self.root, low, high, value);
        self.len += 1;
    }

    /// Remove the exact `(low, high, value)` entry. Returns `false` if it was
    /// not present.
    pub fn remove(&mut self, low: K, high: K, value: V) -> bool {
        let (root, removed) = self.remove_at(self.root, low, high, value);
        self.root = root;
        if removed {
            self.len -= 1;
        }
        removed
    }

    /// Values of every stored interval overlapping the closed range
    /// `[low, high]`.
    pub fn search_all(&self, low: K, high: K) -> Vec<V> {
        let mut out = Vec::new();
        self.search_into(self.root, low, high, &mut out);
        out
    }

    /// Like `search_all` but appends to a caller-owned buffer.
    pub fn search_all_into(&self, low: K, high: K, out: &mut Vec<V>) {
        self.search_into(self.root, low, high, out);
    }

    /// `(low, high, value)` triples in key order.
    pub fn in_order(&self) -> Vec<(K, K, V)> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack = Vec::new();
        let mut cur = self.root;
        while cur != NIL || !stack.is_empty() {
            while cur != NIL {
                stack.push(cur);
                cur = self.nodes[cur].left;
            }
            let Some(n) = stack.pop() else { break };
            let node = &self.nodes[n];
            out.push((node.low, node.high, node.value));
            cur = node.right;
        }
        out
    }

    /// Height of the tree (0 when empty).
    pub fn height(&self) -> i32 {
        self.height_of(self.root)
    }

    /// Verify AVL balance, stored heights, key order and the `max_end`
    /// augmentation for every node.
    pub fn is_balanced(&self) -> bool {
        self.check(self.root).is_some() && self.is_sorted()
    }

    // --- arena -------------------------------------------------------------

    fn alloc_node(&mut self, low: K, high: K, value: V) -> usize {
        let node = Node { low, high, value, max_end: high, left: NIL, right: NIL, height: 1, balance: 0 };
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn free_node(&mut self, idx: usize) {
        assert!(self.free.len() < self.nodes.len(), "interval tree arena over-released");
        self.free.push(idx);
    }

    // --- structure ---------------------------------------------------------

    #[inline]
    fn height_of(&self, n: usize) -> i32 {
        if n == NIL { 0 } else { self.nodes[n].height }
    }

    fn update(&mut self, n: usize) {
        let (l, r) = (self.nodes[n].left, self.nodes[n].right);
        let (hl, hr) = (self.height_of(l), self.height_of(r));
        let mut max_end = self.nodes[n].high;
        if l != NIL {
            max_end = max_of(max_end, self.nodes[l].max_end);
        }
        if r != NIL {
            max_end = max_of(max_end, self.nodes[r].max_end);
        }
        let node = &mut self.nodes[n];
        node.height = 1 + hl.max(hr);
        node.balance = hl - hr;
        node.max_end = max_end;
    }

    fn rotate_right(&mut self, n: usize) -> usize {
        let l = self.nodes[n].left;
        self.nodes[n].left = self.nodes[l].right;
        self.nodes[l].right = n;
        self.update(n);
        self.update(l);
        l
    }

    fn rotate_left(&mut self, n: usize) -> usize {
        let r = self.nodes[n].right;
        self.nodes[n].right = self.nodes[r].left;
        self.nodes[r].left = n;
        self.update(n);
        self.update(r);
        r
    }

    fn rebalance(&mut self, n: usize) -> usize {
        let balance = self.nodes[n].balance;
        if balance > 1 {
            let l = self.nodes[n].left;
            if self.nodes[l].balance < 0 {
                self.nodes[n].left = self.rotate_left(l);
            }
            return self.rotate_right(n);
        }
        if balance < -1 {
            let r = self.nodes[n].right;
            if self.nodes[r].balance > 0 {
                self.nodes[n].right = self.rotate_right(r);
            }
            return self.rotate_left(n);
        }
        n
    }

    fn cmp_key(&self, low: K, high: K, value: V, n: usize) -> Ordering {
        let node = &self.nodes[n];
        order(&low, &node.low)
            .then_with(|| order(&high, &node.high))
            .then_with(|| value.cmp(&node.value))
    }

    fn insert_at(&mut self, n: usize, low: K, high: K, value: V) -> usize {
        if n == NIL {
            return self.alloc_node(low, high, value);
        }
        if self.cmp_key(low, high, value, n) == Ordering::Less {
            let child = self.insert_at(self.nodes[n].left, low, high, value);
            self.nodes[n].left = child;
        } else {
            let child = self.insert_at(self.nodes[n].right, low, high, value);
            self.nodes[n].right = child;
        }
        self.update(n);
        self.rebalance(n)
    }

    fn min_node(&self, mut n: usize) -> usize {
        while self.nodes[n].left != NIL {
            n = self.nodes[n].left;
        }
        n
    }

    /// Detach (without freeing) the minimum of subtree `n`.
    fn remove_min(&mut self, n: usize) -> usize {
        let l = self.nodes[n].left;
        if l == NIL {
            return self.nodes[n].right;
        }
        let child = self.remove_min(l);
        self.nodes[n].left = child;
        self.update(n);
        self.rebalance(n)
    }

    fn remove_at(&mut self, n: usize, low: K, high: K, value: V) -> (usize, bool) {
        if n == NIL {
            return (NIL, false);
        }
        let removed = match self.cmp_key(low, high, value, n) {
            Ordering::Less => {
                let (child, removed) = self.remove_at(self.nodes[n].left, low, high, value);
                self.nodes[n].left = child;
                removed
            }
            Ordering::Greater => {
                let (child, removed) = self.remove_at(self.nodes[n].right, low, high, value);
                self.nodes[n].right = child;
                removed
            }
            Ordering::Equal => {
                let (l, r) = (self.nodes[n].left, self.nodes[n].right);
                self.free_node(n);
                if l == NIL {
                    return (r, true);
                }
                if r == NIL {
                    return (l, true);
                }
                // in-order successor takes this node's place
                let succ = self.min_node(r);
                let rest = self.remove_min(r);
                self.nodes[succ].right = rest;
                self.nodes[succ].left = l;
                self.update(succ);
                return (self.rebalance(succ), true);
            }
        };
        self.update(n);
        (self.rebalance(n), removed)
    }

    fn search_into(&self, n: usize, low: K, high: K, out: &mut Vec<V>) {
        if n == NIL {
            return;
        }
        let node = &self.nodes[n];
        if node.max_end < low {
            return;
        }
        if node.low <= high && low <= node.high {
            out.push(node.value);
        }
        self.search_into(node.left, low, high, out);
        // right subtree only holds intervals starting at or after node.low
        if node.low <= high {
            self.search_into(node.right, low, high, out);
        }
    }

    fn check(&self, n: usize) -> Option<(i32, Option<K>)> {
        if n == NIL {
            return Some((0, None));
        }
        let node = &self.nodes[n];
        let (hl, ml) = self.check(node.left)?;
        let (hr, mr) = self.check(node.right)?;
        let mut max_end = node.high;
        for m in [ml, mr].into_iter().flatten() {
            max_end = max_of(max_end, m);
        }
        let height = 1 + hl.max(hr);
        let ok = (hl - hr).abs() <= 1
            && node.balance == hl - hr
            && node.height == height
            && order(&node.max_end, &max_end) == Ordering::Equal;
        ok.then_some((height, Some(max_end)))
    }

    fn is_sorted(&self) -> bool {
        let items = self.in_order();
        items.len() == self.len
            && items.windows(2).all(|w| {
                order(&w[0].0, &w[1].0)
                    .then_with(|| order(&w[0].1, &w[1].1))
                    .then_with(|| w[0].2.cmp(&w[1].2))
                    != Ordering::Greater
            })
    }
}
