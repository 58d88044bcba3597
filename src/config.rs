use crate::metric::DistanceMetric;

/// Tuning parameters for building and querying a [`SpatialIndex`](crate::SpatialIndex).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexConfig {
    /// Maximum number of points stored in a kd-tree leaf.
    pub leaf_size: usize,
    /// Query batches with at least this many points are searched in parallel.
    pub parallel_threshold: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            leaf_size: 16,
            parallel_threshold: 256,
        }
    }
}

impl IndexConfig {
    pub fn leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size.max(1);
        self
    }

    pub fn parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }
}

/// Parameters of a radius query.
///
/// A reference point is returned when its distance to the query point is at
/// most `radius + atol`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WithinOptions {
    pub radius: f64,
    pub metric: DistanceMetric,
    pub atol: f64,
    pub return_sorted: bool,
}

impl WithinOptions {
    /// Euclidean search with no tolerance, sorted by distance.
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            metric: DistanceMetric::Euclidean,
            atol: 0.0,
            return_sorted: true,
        }
    }

    pub fn metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn atol(mut self, atol: f64) -> Self {
        self.atol = atol;
        self
    }

    pub fn return_sorted(mut self, sorted: bool) -> Self {
        self.return_sorted = sorted;
        self
    }
}
