/// Generic axis-aligned bounding box for N-dimensional space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox<const D: usize> {
    pub min: [f64; D],
    pub max: [f64; D],
}

impl<const D: usize> BoundingBox<D> {
    pub fn new(min: [f64; D], max: [f64; D]) -> Self {
        Self { min, max }
    }

    /// An inverted box that any point extends.
    pub fn empty() -> Self {
        Self {
            min: [f64::INFINITY; D],
            max: [f64::NEG_INFINITY; D],
        }
    }

    /// Smallest box containing every point of a flat `D`-strided buffer.
    pub fn from_points(coords: &[f64]) -> Self {
        let mut bounds = Self::empty();
        for p in coords.chunks_exact(D) {
            bounds.extend(p);
        }
        bounds
    }

    pub fn extend(&mut self, point: &[f64]) {
        for axis in 0..D {
            let v = point[axis];
            if v < self.min[axis] { self.min[axis] = v; }
            if v > self.max[axis] { self.max[axis] = v; }
        }
    }

    pub fn contains(&self, point: &[f64; D]) -> bool {
        (0..D).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }

    /// Squared distance from `point` to the box, zero if the point is inside.
    pub fn dist_sq(&self, point: &[f64; D]) -> f64 {
        let mut d2 = 0.0;
        for axis in 0..D {
            let v = point[axis];
            if v < self.min[axis] { d2 += (self.min[axis] - v).powi(2); }
            else if v > self.max[axis] { d2 += (v - self.max[axis]).powi(2); }
        }
        d2
    }

    /// Index of the axis with the largest extent, preferring lower axes on ties.
    pub fn widest_axis(&self) -> usize {
        let mut best = 0;
        for axis in 1..D {
            if self.max[axis] - self.min[axis] > self.max[best] - self.min[best] {
                best = axis;
            }
        }
        best
    }

    pub fn diagonal(&self) -> f64 {
        (0..D).map(|axis| (self.max[axis] - self.min[axis]).powi(2)).sum::<f64>().sqrt()
    }
}
