use crate::config::{IndexConfig, WithinOptions};
use crate::error::{FindError, FindResult};
use crate::index::{self, SpatialIndex};
use crate::metric::DistanceMetric;
use crate::points::PointSet;
use crate::result::{NeighborResult, WithinResult};
use std::sync::OnceLock;
use tracing::debug;

/// The main container for searching a set of reference points.
///
/// This struct manages:
/// - The current **point set** snapshot.
/// - The **spatial index** over that snapshot, built on the first query and
///   reused by every later one.
///
/// Replacing or editing points creates a new snapshot and drops the index, so
/// the next query rebuilds it. Queries take `&self` and may run concurrently.
pub struct Coordinates {
    points: PointSet,
    config: IndexConfig,
    index: OnceLock<SpatialIndex>,
}

impl Coordinates {
    pub fn new(points: PointSet) -> Self {
        Self::with_config(points, IndexConfig::default())
    }

    pub fn with_config(points: PointSet, config: IndexConfig) -> Self {
        Self {
            points,
            config,
            index: OnceLock::new(),
        }
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn csize(&self) -> usize {
        self.points.csize()
    }

    /// Whether a spatial index for the current snapshot exists.
    pub fn index_is_built(&self) -> bool {
        self.index.get().is_some()
    }

    /// Replaces all points with a new snapshot.
    pub fn set_points(&mut self, points: PointSet) {
        self.points = points;
        self.invalidate();
    }

    /// Moves a single point, keeping the channel shape.
    pub fn set_point(&mut self, flat: usize, point: [f64; 3]) -> FindResult<()> {
        if flat >= self.points.csize() {
            return Err(FindError::IndexOutOfRange {
                index: vec![flat],
                shape: self.points.shape().dims().to_vec(),
            });
        }
        let mut coords = self.points.coords().to_vec();
        coords[flat * 3..flat * 3 + 3].copy_from_slice(&point);
        let points = PointSet::new(coords, self.points.shape().dims())?;
        self.set_points(points);
        Ok(())
    }

    fn invalidate(&mut self) {
        if self.index.take().is_some() {
            debug!(snapshot = self.points.snapshot().get(), "spatial index invalidated");
        }
    }

    /// The index for the current snapshot, building it if needed.
    pub fn index(&self) -> &SpatialIndex {
        let index = self
            .index
            .get_or_init(|| SpatialIndex::build(&self.points, &self.config));
        debug_assert!(index.is_valid_for(&self.points));
        index
    }

    /// Finds the `k` nearest points to each query point under `metric`.
    ///
    /// Arguments are validated before the index is built.
    pub fn find_nearest(&self, query: &PointSet, k: usize, metric: DistanceMetric) -> FindResult<NeighborResult> {
        let plan = index::plan_nearest(&self.points, query, k)?;
        Ok(self.index().search_nearest(&plan, &self.points, query, metric))
    }

    /// Finds all points within a radius of each query point.
    pub fn find_within(&self, query: &PointSet, options: &WithinOptions) -> FindResult<WithinResult> {
        let plan = index::plan_within(&self.points, query, options)?;
        Ok(self.index().search_within(&plan, &self.points, query, options))
    }
}

impl From<PointSet> for Coordinates {
    fn from(points: PointSet) -> Self {
        Self::new(points)
    }
}

impl PartialEq for Coordinates {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl std::fmt::Debug for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinates")
            .field("points", &self.points)
            .field("index_built", &self.index_is_built())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_built_once() {
        let points = PointSet::from_points(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]).unwrap();
        let coords = Coordinates::new(points);
        assert!(!coords.index_is_built());

        let query = PointSet::single([0.9, 0.0, 0.0]).unwrap();
        coords.find_nearest(&query, 1, DistanceMetric::Euclidean).unwrap();
        assert!(coords.index_is_built());

        let first = coords.index() as *const SpatialIndex;
        coords.find_within(&query, &WithinOptions::new(1.0)).unwrap();
        assert_eq!(first, coords.index() as *const SpatialIndex);
    }

    #[test]
    fn test_set_point_invalidates() {
        let points = PointSet::from_points(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]).unwrap();
        let mut coords = Coordinates::new(points);
        let query = PointSet::single([0.9, 0.0, 0.0]).unwrap();

        let before = coords.find_nearest(&query, 1, DistanceMetric::Euclidean).unwrap();
        assert_eq!(before.nearest().flat(), &[1]);

        coords.set_point(1, [5.0, 0.0, 0.0]).unwrap();
        assert!(!coords.index_is_built());

        let after = coords.find_nearest(&query, 1, DistanceMetric::Euclidean).unwrap();
        assert_eq!(after.nearest().flat(), &[0]);
        assert!(coords.index().is_valid_for(coords.points()));
    }

    #[test]
    fn test_errors_match_index_and_skip_build() {
        let points = PointSet::from_points(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]).unwrap();
        let coords = Coordinates::new(points.clone());
        let index = SpatialIndex::build(&points, &IndexConfig::default());
        let query = PointSet::single([0.5, 0.0, 0.0]).unwrap();

        for k in [0, 4] {
            assert_eq!(
                coords.find_nearest(&query, k, DistanceMetric::Euclidean).unwrap_err(),
                index.find_nearest(&points, &query, k, DistanceMetric::Euclidean).unwrap_err()
            );
        }
        // Radius is reported before tolerance
        for options in [WithinOptions::new(-1.0).atol(-1.0), WithinOptions::new(1.0).atol(f64::NAN)] {
            assert_eq!(
                coords.find_within(&query, &options).unwrap_err(),
                index.find_within(&points, &query, &options).unwrap_err()
            );
        }
        assert!(!coords.index_is_built());

        // A valid query through either path gives the same answer
        assert_eq!(
            coords.find_nearest(&query, 2, DistanceMetric::Euclidean).unwrap(),
            index.find_nearest(&points, &query, 2, DistanceMetric::Euclidean).unwrap()
        );
        assert!(coords.index_is_built());
    }

    #[test]
    fn test_set_point_out_of_range() {
        let mut coords = Coordinates::new(PointSet::single([0.0; 3]).unwrap());
        assert!(matches!(coords.set_point(1, [0.0; 3]), Err(FindError::IndexOutOfRange { .. })));
        assert!(coords.set_point(0, [f64::NAN, 0.0, 0.0]).is_err());
    }
}
