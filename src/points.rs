use crate::bounds::BoundingBox;
use crate::error::{FindError, FindResult};
use crate::result::IndexCollection;
use crate::shape::ChannelShape;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Absolute per-component tolerance used by point set equality.
pub const POINT_EQ_TOLERANCE: f64 = 1e-12;

static NEXT_SNAPSHOT: AtomicU64 = AtomicU64::new(1);

/// Identity of one coordinate buffer.
///
/// Every constructed buffer receives a fresh id; clones share it. A spatial
/// index remembers the id it was built from and is valid only for that id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SnapshotId(u64);

impl SnapshotId {
    fn next() -> Self {
        SnapshotId(NEXT_SNAPSHOT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Immutable collection of Cartesian points arranged in a channel shape.
///
/// Coordinates are stored flat as `[x0, y0, z0, x1, y1, z1, ...]` in row-major
/// order of the channel shape. Cloning is cheap and keeps the snapshot id.
#[derive(Clone, Debug)]
pub struct PointSet {
    coords: Arc<[f64]>,
    shape: ChannelShape,
    snapshot: SnapshotId,
}

impl PointSet {
    /// Creates a point set from a flat coordinate buffer and a channel shape.
    ///
    /// The buffer must hold exactly `csize(shape) * 3` finite values.
    pub fn new(coords: Vec<f64>, shape: &[usize]) -> FindResult<Self> {
        let shape = ChannelShape::new(shape);
        let expected = shape.csize() * 3;
        if coords.len() != expected {
            return Err(FindError::InvalidShape {
                shape: shape.dims().to_vec(),
                len: coords.len(),
                expected,
            });
        }
        if let Some(pos) = coords.iter().position(|v| !v.is_finite()) {
            return Err(FindError::InvalidCoordinates {
                index: pos / 3,
                component: pos % 3,
            });
        }
        Ok(Self {
            coords: coords.into(),
            shape,
            snapshot: SnapshotId::next(),
        })
    }

    /// Creates a one-dimensional point set.
    pub fn from_points(points: &[[f64; 3]]) -> FindResult<Self> {
        let coords = points.iter().flatten().copied().collect();
        Self::new(coords, &[points.len()])
    }

    /// Creates a point set holding one point, with channel shape `[1]`.
    pub fn single(point: [f64; 3]) -> FindResult<Self> {
        Self::new(point.to_vec(), &[])
    }

    /// Generates `count` uniformly distributed points inside `bounds`.
    pub fn random(count: usize, bounds: &BoundingBox<3>, seed: u64) -> FindResult<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut coords = Vec::with_capacity(count * 3);
        for _ in 0..count {
            for axis in 0..3 {
                let (lo, hi) = (bounds.min[axis], bounds.max[axis]);
                coords.push(if hi > lo { rng.gen_range(lo..hi) } else { lo });
            }
        }
        Self::new(coords, &[count])
    }

    pub fn shape(&self) -> &ChannelShape {
        &self.shape
    }

    pub fn csize(&self) -> usize {
        self.shape.csize()
    }

    pub fn len(&self) -> usize {
        self.csize()
    }

    pub fn is_empty(&self) -> bool {
        self.csize() == 0
    }

    /// The flat `(csize, 3)` coordinate buffer.
    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    pub fn snapshot(&self) -> SnapshotId {
        self.snapshot
    }

    /// Point at a flat index.
    pub fn point(&self, flat: usize) -> Option<[f64; 3]> {
        if flat >= self.csize() {
            return None;
        }
        Some(self.point_unchecked(flat))
    }

    /// Point at a multi-dimensional channel index.
    pub fn point_at(&self, multi: &[usize]) -> FindResult<[f64; 3]> {
        let flat = self.shape.to_flat(multi)?;
        Ok(self.point_unchecked(flat))
    }

    pub(crate) fn point_unchecked(&self, flat: usize) -> [f64; 3] {
        let c = &self.coords[flat * 3..flat * 3 + 3];
        [c[0], c[1], c[2]]
    }

    pub fn iter(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        self.coords.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    pub fn bounds(&self) -> BoundingBox<3> {
        BoundingBox::from_points(&self.coords)
    }

    /// Points referenced by `indices`, arranged in the collection's shape.
    pub fn select(&self, indices: &IndexCollection) -> FindResult<Self> {
        self.gather(indices.flat(), indices.shape().dims())
    }

    /// Points at the given flat indices, as a one-dimensional point set.
    pub fn select_flat(&self, indices: &[usize]) -> FindResult<Self> {
        self.gather(indices, &[indices.len()])
    }

    fn gather(&self, indices: &[usize], shape: &[usize]) -> FindResult<Self> {
        let mut coords = Vec::with_capacity(indices.len() * 3);
        for &i in indices {
            let p = self.point(i).ok_or_else(|| FindError::IndexOutOfRange {
                index: vec![i],
                shape: self.shape.dims().to_vec(),
            })?;
            coords.extend_from_slice(&p);
        }
        Self::new(coords, shape)
    }

    /// Shared distance from the origin if every point lies on one sphere.
    ///
    /// `rel_tol` is relative to the mean radius. Returns `None` for an empty set
    /// or when any radius deviates by more than the tolerance.
    pub fn common_radius(&self, rel_tol: f64) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let radius = self.mean_radius();
        let limit = rel_tol * radius.max(f64::MIN_POSITIVE);
        self.iter()
            .all(|p| (norm(&p) - radius).abs() <= limit)
            .then_some(radius)
    }

    pub(crate) fn mean_radius(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.iter().map(|p| norm(&p)).sum::<f64>() / self.csize() as f64
    }
}

impl PartialEq for PointSet {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape
            && self
                .coords
                .iter()
                .zip(other.coords.iter())
                .all(|(a, b)| (a - b).abs() <= POINT_EQ_TOLERANCE)
    }
}

pub(crate) fn norm(p: &[f64; 3]) -> f64 {
    (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt()
}
