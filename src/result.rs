use crate::broadcast::QueryPlan;
use crate::error::FindResult;
use crate::shape::ChannelShape;

/// Indices into a reference point set, one per query point, arranged in the
/// query's channel shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexCollection {
    shape: ChannelShape,
    points: ChannelShape,
    flat: Vec<usize>,
}

impl IndexCollection {
    /// Shape of the collection: the query's channel shape.
    pub fn shape(&self) -> &ChannelShape {
        &self.shape
    }

    /// Channel shape of the point set the indices refer to.
    pub fn point_shape(&self) -> &ChannelShape {
        &self.points
    }

    /// Flat reference indices in row-major order of the query shape.
    pub fn flat(&self) -> &[usize] {
        &self.flat
    }

    pub fn len(&self) -> usize {
        self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    /// Multi-index into the point set for the query point at `query_multi`.
    pub fn get(&self, query_multi: &[usize]) -> FindResult<Vec<usize>> {
        let q = self.shape.to_flat(query_multi)?;
        Ok(self.points.unravel(self.flat[q]))
    }

    pub fn multi_indices(&self) -> impl Iterator<Item = Vec<usize>> + '_ {
        self.flat.iter().map(|&i| self.points.unravel(i))
    }
}

/// Dense row-major array of distances.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapedArray {
    shape: ChannelShape,
    data: Vec<f64>,
}

impl ShapedArray {
    pub fn shape(&self) -> &ChannelShape {
        &self.shape
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn get(&self, multi: &[usize]) -> FindResult<f64> {
        Ok(self.data[self.shape.to_flat(multi)?])
    }
}

/// Result of a k-nearest query.
#[derive(Clone, Debug, PartialEq)]
pub struct NeighborResult {
    indices: Vec<IndexCollection>,
    distances: ShapedArray,
}

impl NeighborResult {
    pub fn k(&self) -> usize {
        self.indices.len()
    }

    /// One collection per neighbour rank, closest first.
    pub fn indices(&self) -> &[IndexCollection] {
        &self.indices
    }

    /// Distances shaped `(k, *Q)`, or `Q` when a single neighbour was requested.
    pub fn distances(&self) -> &ShapedArray {
        &self.distances
    }

    /// The closest neighbour of every query point.
    pub fn nearest(&self) -> &IndexCollection {
        &self.indices[0]
    }

    pub fn into_parts(self) -> (Vec<IndexCollection>, ShapedArray) {
        (self.indices, self.distances)
    }
}

/// Result of a radius query.
///
/// Matches of all query points share one index arena; each query point owns a
/// `(start, len)` span of it.
#[derive(Clone, Debug, PartialEq)]
pub struct WithinResult {
    query: ChannelShape,
    points: ChannelShape,
    arena: Vec<usize>,
    distances: Vec<f64>,
    spans: Vec<(usize, usize)>,
}

impl WithinResult {
    /// Number of query points, each with its own collection.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn query_shape(&self) -> &ChannelShape {
        &self.query
    }

    /// Flat reference indices found for the query point at flat index `query`.
    pub fn get(&self, query: usize) -> Option<&[usize]> {
        let &(start, len) = self.spans.get(query)?;
        Some(&self.arena[start..start + len])
    }

    pub fn get_multi(&self, query_multi: &[usize]) -> FindResult<&[usize]> {
        let q = self.query.to_flat(query_multi)?;
        let (start, len) = self.spans[q];
        Ok(&self.arena[start..start + len])
    }

    /// Distances parallel to [`get`](Self::get), under the query's metric.
    pub fn distances(&self, query: usize) -> Option<&[f64]> {
        let &(start, len) = self.spans.get(query)?;
        Some(&self.distances[start..start + len])
    }

    /// Multi-indices into the point set for one query point.
    pub fn multi_indices(&self, query: usize) -> Option<Vec<Vec<usize>>> {
        self.get(query)
            .map(|flat| flat.iter().map(|&i| self.points.unravel(i)).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.spans.iter().map(|&(start, len)| &self.arena[start..start + len])
    }

    /// Total number of matches over all query points.
    pub fn total(&self) -> usize {
        self.arena.len()
    }
}

/// Folds per-query `(flat index, distance)` lists, each of length `k`, into
/// rank-major index collections and a stacked distance array.
pub(crate) fn assemble_nearest(plan: &QueryPlan, per_query: Vec<Vec<(usize, f64)>>) -> NeighborResult {
    let k = plan.k();
    let n = plan.query_count();
    debug_assert_eq!(per_query.len(), n);

    let mut flat = vec![vec![0usize; n]; k];
    let mut data = vec![0.0; k * n];
    for (q, neighbours) in per_query.into_iter().enumerate() {
        debug_assert_eq!(neighbours.len(), k);
        for (rank, (index, dist)) in neighbours.into_iter().enumerate() {
            flat[rank][q] = index;
            // Row-major over (k, *Q); also valid for the rank-less k == 1 layout
            data[rank * n + q] = dist;
        }
    }

    let indices = flat
        .into_iter()
        .map(|flat| IndexCollection {
            shape: plan.index_shape().clone(),
            points: plan.point_shape().clone(),
            flat,
        })
        .collect();

    NeighborResult {
        indices,
        distances: ShapedArray {
            shape: plan.distance_shape(),
            data,
        },
    }
}

pub(crate) fn assemble_within(plan: &QueryPlan, per_query: Vec<Vec<(usize, f64)>>) -> WithinResult {
    let total = per_query.iter().map(Vec::len).sum();
    let mut arena = Vec::with_capacity(total);
    let mut distances = Vec::with_capacity(total);
    let mut spans = Vec::with_capacity(per_query.len());

    for matches in per_query {
        spans.push((arena.len(), matches.len()));
        for (index, dist) in matches {
            arena.push(index);
            distances.push(dist);
        }
    }

    WithinResult {
        query: plan.index_shape().clone(),
        points: plan.point_shape().clone(),
        arena,
        distances,
        spans,
    }
}
