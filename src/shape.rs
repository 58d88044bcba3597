use crate::error::{FindError, FindResult};

/// Logical arrangement of the points in a collection, independent of the
/// three Cartesian components.
///
/// Flat indices follow row-major order: the last dimension varies fastest.
/// An empty shape describes a single point and is stored as `[1]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChannelShape {
    dims: Vec<usize>,
}

impl ChannelShape {
    pub fn new(dims: &[usize]) -> Self {
        if dims.is_empty() {
            return Self { dims: vec![1] };
        }
        Self { dims: dims.to_vec() }
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Number of points described by the shape.
    pub fn csize(&self) -> usize {
        self.dims.iter().product()
    }

    /// Row-major strides, in points.
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = vec![1; self.dims.len()];
        for axis in (0..self.dims.len().saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1] * self.dims[axis + 1];
        }
        strides
    }

    /// Shape `(k, *dims)`, used for arrays stacked over neighbour ranks.
    pub fn with_leading(&self, k: usize) -> Self {
        let mut dims = Vec::with_capacity(self.dims.len() + 1);
        dims.push(k);
        dims.extend_from_slice(&self.dims);
        Self { dims }
    }

    pub fn to_flat(&self, multi: &[usize]) -> FindResult<usize> {
        if multi.len() != self.dims.len() || multi.iter().zip(&self.dims).any(|(&i, &n)| i >= n) {
            return Err(self.out_of_range(multi.to_vec()));
        }
        Ok(multi
            .iter()
            .zip(&self.dims)
            .fold(0, |flat, (&i, &n)| flat * n + i))
    }

    pub fn to_multi(&self, flat: usize) -> FindResult<Vec<usize>> {
        if flat >= self.csize() {
            return Err(self.out_of_range(vec![flat]));
        }
        Ok(self.unravel(flat))
    }

    /// Row-major unravel without bounds checking; callers guarantee `flat < csize`.
    pub(crate) fn unravel(&self, mut flat: usize) -> Vec<usize> {
        let mut multi = vec![0; self.dims.len()];
        for axis in (0..self.dims.len()).rev() {
            let n = self.dims[axis];
            multi[axis] = flat % n;
            flat /= n;
        }
        multi
    }

    fn out_of_range(&self, index: Vec<usize>) -> FindError {
        FindError::IndexOutOfRange {
            index,
            shape: self.dims.clone(),
        }
    }
}

impl From<&[usize]> for ChannelShape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims)
    }
}

impl<const N: usize> From<[usize; N]> for ChannelShape {
    fn from(dims: [usize; N]) -> Self {
        Self::new(&dims)
    }
}
