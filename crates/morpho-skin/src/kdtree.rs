//! Static k-d tree over 3-d points.
//!
//! Built once by recursive median partitioning; the tree is implicit in the
//! item order (the median of each sub-slice is its root), so no node
//! allocation happens beyond the item array itself.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use morpho_math::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
struct KdItem {
    point: Vec3,
    id: u32,
}

/// A k-nearest query candidate. Ordered by squared distance, so a
/// `BinaryHeap` keeps the worst candidate on top.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    dist_sq: f32,
    id: u32,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist_sq
            .total_cmp(&other.dist_sq)
            .then(self.id.cmp(&other.id))
    }
}

/// k-d tree for nearest-neighbour queries.
#[derive(Debug, Clone, Default)]
pub struct KdTree {
    items: Vec<KdItem>,
}

impl KdTree {
    /// Build from `(point, id)` pairs.
    pub fn build(points: impl IntoIterator<Item = (Vec3, u32)>) -> Self {
        let mut items: Vec<KdItem> = points
            .into_iter()
            .map(|(point, id)| KdItem { point, id })
            .collect();
        partition(&mut items, 0);
        Self { items }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Up to `k` nearest ids with their squared distances, closest first.
    /// Ties are broken by id.
    pub fn nearest(&self, query: Vec3, k: usize) -> Vec<(u32, f32)> {
        if k == 0 {
            return Vec::new();
        }
        let mut heap = BinaryHeap::with_capacity(k + 1);
        search(&self.items, 0, query, k, &mut heap);
        heap.into_sorted_vec()
            .into_iter()
            .map(|c| (c.id, c.dist_sq))
            .collect()
    }
}

fn partition(items: &mut [KdItem], depth: usize) {
    if items.len() <= 1 {
        return;
    }
    let axis = depth % 3;
    let mid = items.len() / 2;
    items.select_nth_unstable_by(mid, |a, b| a.point[axis].total_cmp(&b.point[axis]));
    let (left, rest) = items.split_at_mut(mid);
    partition(left, depth + 1);
    partition(&mut rest[1..], depth + 1);
}

fn search(items: &[KdItem], depth: usize, query: Vec3, k: usize, heap: &mut BinaryHeap<Candidate>) {
    if items.is_empty() {
        return;
    }
    let axis = depth % 3;
    let mid = items.len() / 2;
    let node = items[mid];

    heap.push(Candidate {
        dist_sq: node.point.distance_squared(query),
        id: node.id,
    });
    if heap.len() > k {
        heap.pop();
    }

    let diff = query[axis] - node.point[axis];
    let (near, far) = if diff < 0.0 {
        (&items[..mid], &items[mid + 1..])
    } else {
        (&items[mid + 1..], &items[..mid])
    };

    search(near, depth + 1, query, k, heap);

    let worst = heap.peek().map_or(f32::INFINITY, |c| c.dist_sq);
    if heap.len() < k || diff * diff <= worst {
        search(far, depth + 1, query, k, heap);
    }
}
