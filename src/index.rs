use crate::broadcast::QueryPlan;
use crate::config::{IndexConfig, WithinOptions};
use crate::error::{FindError, FindResult};
use crate::kdtree::KdTree;
use crate::metric::DistanceMetric;
use crate::points::{PointSet, SnapshotId, norm};
use crate::result::{NeighborResult, WithinResult, assemble_nearest, assemble_within};
use crate::validate;
use rayon::prelude::*;
use tracing::{debug, trace};

/// Relative slack added to the Euclidean candidate radius of a radius query.
const BOUND_SLACK: f64 = 1e-9;

/// Exact k-nearest and radius search over one point set snapshot.
///
/// The index holds no coordinates. Every query takes the point set again and
/// fails with [`FindError::StaleIndex`] unless it is the snapshot the index was
/// built from.
pub struct SpatialIndex {
    tree: KdTree,
    snapshot: SnapshotId,
    sphere_radius: f64,
    config: IndexConfig,
}

impl SpatialIndex {
    pub fn build(points: &PointSet, config: &IndexConfig) -> Self {
        let mut tree = KdTree::new(config.leaf_size);
        tree.build(points.coords());
        debug!(
            snapshot = points.snapshot().get(),
            points = tree.len(),
            nodes = tree.node_count(),
            "built spatial index"
        );
        Self {
            tree,
            snapshot: points.snapshot(),
            sphere_radius: points.mean_radius(),
            config: *config,
        }
    }

    pub fn snapshot(&self) -> SnapshotId {
        self.snapshot
    }

    pub fn is_valid_for(&self, points: &PointSet) -> bool {
        self.snapshot == points.snapshot()
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Finds the `k` closest reference points to every query point.
    ///
    /// Neighbours are ordered by ascending distance; equal distances are
    /// ordered by ascending flat index.
    pub fn find_nearest(
        &self,
        points: &PointSet,
        query: &PointSet,
        k: usize,
        metric: DistanceMetric,
    ) -> FindResult<NeighborResult> {
        let plan = plan_nearest(points, query, k)?;
        self.check_snapshot(points)?;
        Ok(self.search_nearest(&plan, points, query, metric))
    }

    /// Finds every reference point within `options.radius + options.atol` of
    /// each query point.
    pub fn find_within(
        &self,
        points: &PointSet,
        query: &PointSet,
        options: &WithinOptions,
    ) -> FindResult<WithinResult> {
        let plan = plan_within(points, query, options)?;
        self.check_snapshot(points)?;
        Ok(self.search_within(&plan, points, query, options))
    }

    /// k-nearest search for arguments already accepted by [`plan_nearest`].
    pub(crate) fn search_nearest(
        &self,
        plan: &QueryPlan,
        points: &PointSet,
        query: &PointSet,
        metric: DistanceMetric,
    ) -> NeighborResult {
        let k = plan.k();
        trace!(queries = plan.query_count(), k, %metric, "nearest query");
        let coords = points.coords();
        let search = |q: [f64; 3]| {
            let mut found: Vec<(usize, f64)> = self
                .tree
                .nearest(q, k, coords)
                .into_iter()
                .map(|c| (c.index, metric_distance(metric, c.dist_sq, &q, points, c.index)))
                .collect();
            sort_by_distance(&mut found);
            found
        };

        assemble_nearest(plan, self.search_batch(query, search))
    }

    /// Radius search for arguments already accepted by [`plan_within`].
    pub(crate) fn search_within(
        &self,
        plan: &QueryPlan,
        points: &PointSet,
        query: &PointSet,
        options: &WithinOptions,
    ) -> WithinResult {
        let metric = options.metric;
        let limit = options.radius + options.atol;
        trace!(queries = plan.query_count(), limit, %metric, "within query");

        let coords = points.coords();
        let search = |q: [f64; 3]| {
            // Candidates come from a slightly wider Euclidean ball, then the
            // exact metric distance decides.
            let bound = metric.euclidean_bound(limit, norm(&q), self.sphere_radius) * (1.0 + BOUND_SLACK);
            let mut candidates = Vec::new();
            self.tree.within(q, bound * bound, coords, &mut candidates);

            let mut found: Vec<(usize, f64)> = candidates
                .into_iter()
                .map(|i| (i, metric.reference_distance(&q, &points.point_unchecked(i))))
                .filter(|&(_, d)| d <= limit)
                .collect();
            if options.return_sorted {
                sort_by_distance(&mut found);
            } else {
                found.sort_unstable_by_key(|&(i, _)| i);
            }
            found
        };

        assemble_within(plan, self.search_batch(query, search))
    }

    fn check_snapshot(&self, points: &PointSet) -> FindResult<()> {
        if !self.is_valid_for(points) {
            return Err(FindError::StaleIndex {
                built: self.snapshot.get(),
                given: points.snapshot().get(),
            });
        }
        Ok(())
    }

    fn search_batch<F>(&self, query: &PointSet, search: F) -> Vec<Vec<(usize, f64)>>
    where
        F: Fn([f64; 3]) -> Vec<(usize, f64)> + Sync,
    {
        if query.csize() >= self.config.parallel_threshold {
            query
                .coords()
                .par_chunks_exact(3)
                .map(|c| search([c[0], c[1], c[2]]))
                .collect()
        } else {
            query.iter().map(search).collect()
        }
    }
}

/// Argument checks of a k-nearest query, in reporting order.
pub(crate) fn plan_nearest(points: &PointSet, query: &PointSet, k: usize) -> FindResult<QueryPlan> {
    let plan = QueryPlan::nearest(points.shape(), query.shape(), k)?;
    validate::query(query)?;
    Ok(plan)
}

/// Argument checks of a radius query, in reporting order.
pub(crate) fn plan_within(points: &PointSet, query: &PointSet, options: &WithinOptions) -> FindResult<QueryPlan> {
    validate::radius(options.radius)?;
    validate::tolerance(options.atol)?;
    validate::query(query)?;
    QueryPlan::within(points.shape(), query.shape())
}

fn metric_distance(metric: DistanceMetric, dist_sq: f64, q: &[f64; 3], points: &PointSet, index: usize) -> f64 {
    match metric {
        DistanceMetric::Euclidean => dist_sq.sqrt(),
        _ => metric.reference_distance(q, &points.point_unchecked(index)),
    }
}

fn sort_by_distance(found: &mut [(usize, f64)]) {
    found.sort_unstable_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
}
