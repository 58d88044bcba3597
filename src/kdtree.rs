use crate::bounds::BoundingBox;
use crate::metric::euclidean_sq;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Clone, Copy, Debug)]
struct KdNode {
    bounds: BoundingBox<3>,
    left: usize, // LEAF if leaf
    right: usize,
    // Leaf data: indices[start..end]
    start: usize,
    end: usize,
    // Internal node data
    split_val: f64,
    axis: u8,
}

const LEAF: usize = usize::MAX;

/// Candidate point during a k-nearest search, ordered by distance then index.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Candidate {
    pub dist_sq: f64,
    pub index: usize,
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
            .then(self.index.cmp(&other.index))
    }
}

/// Binary space partition over a flat `[x, y, z]` coordinate buffer.
///
/// The tree stores only indices; coordinates are passed back in on every query
/// and must be the buffer the tree was built from.
pub(crate) struct KdTree {
    nodes: Vec<KdNode>,
    indices: Vec<usize>,
    leaf_size: usize,
}

impl KdTree {
    pub fn new(leaf_size: usize) -> Self {
        KdTree {
            nodes: Vec::new(),
            indices: Vec::new(),
            leaf_size: leaf_size.max(1),
        }
    }

    pub fn build(&mut self, coords: &[f64]) {
        let count = coords.len() / 3;
        self.indices = (0..count).collect();
        self.nodes.clear();

        if count == 0 {
            return;
        }

        // A balanced tree has 2*N/leaf_size nodes roughly
        self.nodes.reserve(2 * count.div_ceil(self.leaf_size));

        self.build_recursive(0, count, coords);
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn build_recursive(&mut self, start: usize, end: usize, coords: &[f64]) -> usize {
        let count = end - start;

        let mut bounds = BoundingBox::empty();
        for &idx in &self.indices[start..end] {
            bounds.extend(&coords[idx * 3..idx * 3 + 3]);
        }

        if count <= self.leaf_size {
            let node_idx = self.nodes.len();
            self.nodes.push(KdNode {
                bounds,
                left: LEAF,
                right: LEAF,
                start,
                end,
                split_val: 0.0,
                axis: 0,
            });
            return node_idx;
        }

        let axis = bounds.widest_axis();

        // Median split; equal coordinates fall back to index order so the
        // layout depends only on the coordinates.
        let mid = start + count / 2;
        self.indices[start..end].select_nth_unstable_by(count / 2, |&a, &b| {
            coords[a * 3 + axis]
                .total_cmp(&coords[b * 3 + axis])
                .then(a.cmp(&b))
        });

        let split_val = coords[self.indices[mid] * 3 + axis];

        let left = self.build_recursive(start, mid, coords);
        let right = self.build_recursive(mid, end, coords);

        let node_idx = self.nodes.len();
        self.nodes.push(KdNode {
            bounds,
            left,
            right,
            start: 0,
            end: 0,
            split_val,
            axis: axis as u8,
        });
        node_idx
    }

    fn root(&self) -> Option<usize> {
        // Root is the last node pushed in our recursive build
        self.nodes.len().checked_sub(1)
    }

    /// The `k` closest points to `point`, ascending by `(dist_sq, index)`.
    pub fn nearest(&self, point: [f64; 3], k: usize, coords: &[f64]) -> Vec<Candidate> {
        let Some(root) = self.root() else { return Vec::new() };
        if k == 0 {
            return Vec::new();
        }
        let mut heap = BinaryHeap::with_capacity(k + 1);
        self.nearest_recursive(root, point, k, coords, &mut heap);
        heap.into_sorted_vec()
    }

    fn nearest_recursive(
        &self,
        node_idx: usize,
        point: [f64; 3],
        k: usize,
        coords: &[f64],
        heap: &mut BinaryHeap<Candidate>,
    ) {
        let node = &self.nodes[node_idx];

        // Boxes at exactly the current worst distance may still hold a tie
        // with a lower index, so only strictly farther boxes are skipped.
        if heap.len() == k {
            if let Some(worst) = heap.peek() {
                if node.bounds.dist_sq(&point) > worst.dist_sq {
                    return;
                }
            }
        }

        // Leaf
        if node.left == LEAF {
            for &index in &self.indices[node.start..node.end] {
                let candidate = Candidate {
                    dist_sq: euclidean_sq(&point, &point_of(coords, index)),
                    index,
                };
                if heap.len() < k {
                    heap.push(candidate);
                } else if heap.peek().is_some_and(|worst| candidate < *worst) {
                    heap.pop();
                    heap.push(candidate);
                }
            }
            return;
        }

        // Visit nearest child first
        let diff = point[node.axis as usize] - node.split_val;
        let (first, second) = if diff <= 0.0 { (node.left, node.right) } else { (node.right, node.left) };

        self.nearest_recursive(first, point, k, coords, heap);
        self.nearest_recursive(second, point, k, coords, heap);
    }

    /// Appends every index within `radius_sq` (squared Euclidean) of `point` to `out`.
    pub fn within(&self, point: [f64; 3], radius_sq: f64, coords: &[f64], out: &mut Vec<usize>) {
        if let Some(root) = self.root() {
            self.within_recursive(root, point, radius_sq, coords, out);
        }
    }

    fn within_recursive(&self, node_idx: usize, point: [f64; 3], radius_sq: f64, coords: &[f64], out: &mut Vec<usize>) {
        let node = &self.nodes[node_idx];

        if node.bounds.dist_sq(&point) > radius_sq {
            return;
        }

        if node.left == LEAF {
            for &index in &self.indices[node.start..node.end] {
                if euclidean_sq(&point, &point_of(coords, index)) <= radius_sq {
                    out.push(index);
                }
            }
            return;
        }

        self.within_recursive(node.left, point, radius_sq, coords, out);
        self.within_recursive(node.right, point, radius_sq, coords, out);
    }
}

#[inline]
fn point_of(coords: &[f64], index: usize) -> [f64; 3] {
    [coords[index * 3], coords[index * 3 + 1], coords[index * 3 + 2]]
}
