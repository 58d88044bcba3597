use crate::error::{FindError, FindResult};
use crate::shape::ChannelShape;
use crate::validate;

/// Output layout of a query, computed from the reference and query channel
/// shapes before any searching happens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryPlan {
    points: ChannelShape,
    query: ChannelShape,
    k: usize,
}

impl QueryPlan {
    /// Plan for a k-nearest query; fails on an empty reference set or a `k`
    /// outside `1..=csize(points)`.
    pub fn nearest(points: &ChannelShape, query: &ChannelShape, k: usize) -> FindResult<Self> {
        // A zero count is an argument error whatever the reference set holds
        if k == 0 {
            return Err(FindError::InvalidCount { k: k.to_string(), available: points.csize() });
        }
        let available = non_empty(points)?;
        let k = validate::count(k, available)?;
        Ok(Self {
            points: points.clone(),
            query: query.clone(),
            k,
        })
    }

    /// Plan for a radius query with one index collection per query point.
    pub fn within(points: &ChannelShape, query: &ChannelShape) -> FindResult<Self> {
        non_empty(points)?;
        Ok(Self {
            points: points.clone(),
            query: query.clone(),
            k: 1,
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn point_shape(&self) -> &ChannelShape {
        &self.points
    }

    /// Shape of every index collection: the query's channel shape.
    pub fn index_shape(&self) -> &ChannelShape {
        &self.query
    }

    /// `(k, *Q)`, or just `Q` for a single neighbour.
    pub fn distance_shape(&self) -> ChannelShape {
        if self.k == 1 {
            self.query.clone()
        } else {
            self.query.with_leading(self.k)
        }
    }

    pub fn query_count(&self) -> usize {
        self.query.csize()
    }
}

fn non_empty(points: &ChannelShape) -> FindResult<usize> {
    match points.csize() {
        0 => Err(FindError::EmptyPointSet),
        n => Ok(n),
    }
}
