use crate::error::FindError;
use crate::points::norm;
use std::fmt;
use std::str::FromStr;

/// Distance functions supported by the spatial queries.
///
/// All metrics are searched in Euclidean space. For the spherical variants
/// every reference point must lie at a common distance from the origin; on
/// such a sphere the Euclidean distance to any query grows monotonically with
/// the great-circle angle. That precondition is the caller's to uphold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DistanceMetric {
    /// Straight-line distance in Cartesian space.
    #[default]
    Euclidean,
    /// Great-circle angle between the two directions, in radians.
    SphericalRadians,
    /// Great-circle arc length on the common sphere.
    SphericalMeter,
}

impl DistanceMetric {
    pub const ALL: [DistanceMetric; 3] = [
        DistanceMetric::Euclidean,
        DistanceMetric::SphericalRadians,
        DistanceMetric::SphericalMeter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::SphericalRadians => "spherical_radians",
            DistanceMetric::SphericalMeter => "spherical_meter",
        }
    }

    pub fn distance(&self, p: &[f64; 3], q: &[f64; 3]) -> f64 {
        match self {
            DistanceMetric::Euclidean => euclidean_sq(p, q).sqrt(),
            DistanceMetric::SphericalRadians => angle(p, q),
            DistanceMetric::SphericalMeter => angle(p, q) * 0.5 * (norm(p) + norm(q)),
        }
    }

    /// Distance from a query point to a reference point, with arc lengths
    /// measured on the sphere through the reference point.
    ///
    /// Equals [`distance`](Self::distance) when both points share a radius.
    pub fn reference_distance(&self, query: &[f64; 3], reference: &[f64; 3]) -> f64 {
        match self {
            DistanceMetric::SphericalMeter => angle(query, reference) * norm(reference),
            _ => self.distance(query, reference),
        }
    }

    /// Euclidean search radius that covers every reference point within
    /// `radius` of a query at distance `query_norm` from the origin, for
    /// reference points on a sphere of radius `sphere_radius`.
    pub fn euclidean_bound(&self, radius: f64, query_norm: f64, sphere_radius: f64) -> f64 {
        let theta = match self {
            DistanceMetric::Euclidean => return radius,
            DistanceMetric::SphericalRadians => radius,
            DistanceMetric::SphericalMeter if sphere_radius > 0.0 => radius / sphere_radius,
            DistanceMetric::SphericalMeter => std::f64::consts::PI,
        };
        if theta >= std::f64::consts::PI {
            return query_norm + sphere_radius;
        }
        // Law of cosines between the query and a point on the sphere at angle theta
        let d2 = query_norm * query_norm + sphere_radius * sphere_radius
            - 2.0 * query_norm * sphere_radius * theta.cos();
        d2.max(0.0).sqrt()
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMetric {
    type Err = FindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "euclidean" => Ok(DistanceMetric::Euclidean),
            "spherical" | "spherical_radians" => Ok(DistanceMetric::SphericalRadians),
            "spherical_meter" => Ok(DistanceMetric::SphericalMeter),
            other => Err(FindError::InvalidMetric(format!("{other:?}"))),
        }
    }
}

pub(crate) fn euclidean_sq(p: &[f64; 3], q: &[f64; 3]) -> f64 {
    let dx = p[0] - q[0];
    let dy = p[1] - q[1];
    let dz = p[2] - q[2];
    dx * dx + dy * dy + dz * dz
}

fn angle(p: &[f64; 3], q: &[f64; 3]) -> f64 {
    let cx = p[1] * q[2] - p[2] * q[1];
    let cy = p[2] * q[0] - p[0] * q[2];
    let cz = p[0] * q[1] - p[1] * q[0];
    let cross = (cx * cx + cy * cy + cz * cz).sqrt();
    let dot = p[0] * q[0] + p[1] * q[1] + p[2] * q[2];
    cross.atan2(dot)
}
