//! Argument checks shared by the Rust API and the WebAssembly bindings.
//!
//! Every query validates all of its arguments through these functions before
//! touching the spatial index.

use crate::error::{FindError, FindResult};
use crate::metric::DistanceMetric;
use crate::points::PointSet;

/// Checks a neighbour count against the number of reference points.
pub fn count(k: usize, available: usize) -> FindResult<usize> {
    if k < 1 || k > available {
        return Err(FindError::InvalidCount { k: k.to_string(), available });
    }
    Ok(k)
}

/// Converts a neighbour count that arrives as a loosely typed number.
///
/// Negative, fractional and non-finite values are rejected; the upper bound
/// is checked later against the reference set.
pub fn count_f64(k: f64, available: usize) -> FindResult<usize> {
    if !k.is_finite() || k < 1.0 || k.fract() != 0.0 {
        return Err(FindError::InvalidCount { k: k.to_string(), available });
    }
    Ok(k as usize)
}

pub fn radius(radius: f64) -> FindResult<f64> {
    if radius.is_nan() || radius < 0.0 {
        return Err(FindError::InvalidRadius(radius));
    }
    Ok(radius)
}

pub fn tolerance(atol: f64) -> FindResult<f64> {
    if atol.is_nan() || atol < 0.0 {
        return Err(FindError::InvalidTolerance(format!("got {atol}")));
    }
    Ok(atol)
}

pub fn metric_token(token: &str) -> FindResult<DistanceMetric> {
    token.parse()
}

/// Checks that query coordinates can be compared against the index.
///
/// Point sets reject non-finite values on construction, so any point set is
/// a valid query; the check is kept here for buffers assembled elsewhere.
pub fn query(query: &PointSet) -> FindResult<&PointSet> {
    if let Some(pos) = query.coords().iter().position(|v| !v.is_finite()) {
        return Err(FindError::InvalidQuery(format!(
            "coordinate {} of point {} is not finite",
            pos % 3,
            pos / 3
        )));
    }
    Ok(query)
}

/// A loosely typed argument as it arrives from a dynamic host such as
/// JavaScript.
#[derive(Clone, Debug, PartialEq)]
pub enum LooseArg {
    /// `undefined`, `null` or an omitted argument.
    Missing,
    Number(f64),
    Text(String),
    Bool(bool),
    /// A packed float buffer such as a `Float64Array`.
    Floats(Vec<f64>),
    List(Vec<LooseArg>),
    /// Anything else, kept as a printable description.
    Other(String),
}

impl LooseArg {
    fn as_point(&self) -> Option<[f64; 3]> {
        match self {
            LooseArg::Floats(v) if v.len() == 3 => Some([v[0], v[1], v[2]]),
            LooseArg::List(items) if items.len() == 3 => {
                let mut point = [0.0; 3];
                for (slot, item) in point.iter_mut().zip(items) {
                    let LooseArg::Number(v) = item else { return None };
                    *slot = *v;
                }
                Some(point)
            }
            _ => None,
        }
    }
}

/// Reads a query: flat coordinates (a float buffer or a list of numbers) or
/// a list of `[x, y, z]` points. Without a shape the points form one axis.
pub fn loose_query(arg: &LooseArg, shape: Option<&[usize]>) -> FindResult<PointSet> {
    let coords = match arg {
        LooseArg::Floats(values) => values.clone(),
        LooseArg::List(items) => list_coords(items)?,
        other => {
            return Err(FindError::InvalidQuery(format!("expected an array of coordinates, got {other:?}")));
        }
    };
    if coords.len() % 3 != 0 {
        return Err(FindError::InvalidQuery(format!("{} values are not a list of 3D points", coords.len())));
    }
    let linear = [coords.len() / 3];
    let points = PointSet::new(coords, shape.unwrap_or(&linear[..])).map_err(|e| FindError::InvalidQuery(e.to_string()))?;
    query(&points)?;
    Ok(points)
}

// One form per list: all numbers or all points
fn list_coords(items: &[LooseArg]) -> FindResult<Vec<f64>> {
    if items.iter().all(|item| matches!(item, LooseArg::Number(_))) {
        return Ok(items
            .iter()
            .filter_map(|item| match item {
                LooseArg::Number(v) => Some(*v),
                _ => None,
            })
            .collect());
    }
    let mut coords = Vec::with_capacity(items.len() * 3);
    for (i, item) in items.iter().enumerate() {
        let point = item.as_point().ok_or_else(|| {
            FindError::InvalidQuery(format!(
                "entry {i} is {item:?}; entries must be all numbers or all [x, y, z] points"
            ))
        })?;
        coords.extend_from_slice(&point);
    }
    Ok(coords)
}

/// Reads a neighbour count, defaulting to one.
pub fn loose_count(arg: &LooseArg, available: usize) -> FindResult<usize> {
    match arg {
        LooseArg::Missing => Ok(1),
        LooseArg::Number(k) => count_f64(*k, available),
        other => Err(FindError::InvalidCount { k: format!("{other:?}"), available }),
    }
}

/// Reads a metric token, defaulting to Euclidean.
pub fn loose_metric(arg: &LooseArg) -> FindResult<DistanceMetric> {
    match arg {
        LooseArg::Missing => Ok(DistanceMetric::Euclidean),
        LooseArg::Text(token) => metric_token(token),
        other => Err(FindError::InvalidMetric(format!("{other:?}"))),
    }
}

pub fn loose_radius(arg: &LooseArg) -> FindResult<f64> {
    match arg {
        LooseArg::Number(r) => radius(*r),
        _ => Err(FindError::InvalidRadius(f64::NAN)),
    }
}

/// Reads an absolute tolerance, defaulting to zero.
pub fn loose_tolerance(arg: &LooseArg) -> FindResult<f64> {
    match arg {
        LooseArg::Missing => Ok(0.0),
        LooseArg::Number(atol) => tolerance(*atol),
        other => Err(FindError::InvalidTolerance(format!("expected a number, got {other:?}"))),
    }
}

/// Reads the sort flag, defaulting to sorted.
pub fn loose_sort_flag(arg: &LooseArg) -> FindResult<bool> {
    match arg {
        LooseArg::Missing => Ok(true),
        LooseArg::Bool(sorted) => Ok(*sorted),
        other => Err(FindError::InvalidSortFlag(format!("got {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_bounds() {
        assert_eq!(count(1, 4).unwrap(), 1);
        assert_eq!(count(4, 4).unwrap(), 4);
        assert!(matches!(count(0, 4), Err(FindError::InvalidCount { .. })));
        assert!(matches!(count(5, 4), Err(FindError::InvalidCount { .. })));
    }

    #[test]
    fn test_count_from_number() {
        assert_eq!(count_f64(3.0, 10).unwrap(), 3);
        for bad in [-1.0, 0.0, 2.5, f64::NAN, f64::INFINITY] {
            let err = count_f64(bad, 10).unwrap_err();
            assert!(err.is_invalid_argument(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_radius_and_tolerance() {
        assert_eq!(radius(0.0).unwrap(), 0.0);
        assert!(matches!(radius(-1.0), Err(FindError::InvalidRadius(_))));
        assert!(radius(f64::NAN).is_err());
        assert_eq!(tolerance(1e-6).unwrap(), 1e-6);
        assert!(matches!(tolerance(-1e-6), Err(FindError::InvalidTolerance(_))));
    }
}
