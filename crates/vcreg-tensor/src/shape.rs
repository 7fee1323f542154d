//! Shape utilities for feature batches.
//!
//! This module provides the [`Shape`] type for representing tensor dimensions
//! and [`BatchDims`], the named view of a rank-4 `(B, C, H, W)` batch shape.

use std::fmt;

use crate::{TensorError, TensorResult};

/// Represents the shape (dimensions) of a tensor.
///
/// # Examples
///
/// ```
/// use vcreg_tensor::Shape;
///
/// let shape = Shape::new(vec![2, 3, 4]);
/// assert_eq!(shape.ndim(), 3);
/// assert_eq!(shape.to_string(), "(2, 3, 4)");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Creates a new shape from the given dimensions.
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    /// Returns the number of dimensions (rank) of the shape.
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Returns the dimensions as a slice.
    pub fn as_slice(&self) -> &[usize] {
        &self.dims
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape({:?})", self.dims)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, dim) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", dim)?;
        }
        write!(f, ")")
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self::new(dims.to_vec())
    }
}

/// Named dimensions of a rank-4 feature batch.
///
/// Dimensions obtained through [`TryFrom<&Shape>`] have a checked element
/// count, so [`spatial`](Self::spatial) and [`numel`](Self::numel) cannot
/// overflow on them. Dimensions built with [`BatchDims::new`] should go
/// through [`checked_numel`](Self::checked_numel) before anything is
/// allocated for them.
///
/// # Examples
///
/// ```
/// use vcreg_tensor::{BatchDims, Shape};
///
/// let dims = BatchDims::try_from(&Shape::from([16, 3, 224, 224])).unwrap();
/// assert_eq!(dims.spatial(), 224 * 224);
/// assert_eq!(dims.flattened(), (16, 3, 224 * 224));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchDims {
    /// Number of samples in the batch (B).
    pub batch: usize,
    /// Number of feature channels per sample (C).
    pub channels: usize,
    /// Spatial height (H).
    pub height: usize,
    /// Spatial width (W).
    pub width: usize,
}

impl BatchDims {
    /// Creates batch dimensions from `(B, C, H, W)`.
    pub fn new(batch: usize, channels: usize, height: usize, width: usize) -> Self {
        Self {
            batch,
            channels,
            height,
            width,
        }
    }

    /// Number of spatial positions per channel, `H * W`.
    pub fn spatial(&self) -> usize {
        self.height * self.width
    }

    /// The `(B, C, H * W)` shape obtained by flattening the spatial axes.
    pub fn flattened(&self) -> (usize, usize, usize) {
        (self.batch, self.channels, self.spatial())
    }

    /// Total number of elements in the batch.
    pub fn numel(&self) -> usize {
        self.batch * self.channels * self.spatial()
    }

    /// Total number of elements, or an error if any partial product overflows.
    ///
    /// Performs the same multiplications as [`spatial`](Self::spatial) and
    /// [`numel`](Self::numel); when this succeeds, neither of them overflows.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::InvalidShape`] on overflow.
    ///
    /// # Examples
    ///
    /// ```
    /// use vcreg_tensor::BatchDims;
    ///
    /// assert_eq!(BatchDims::new(4, 8, 2, 3).checked_numel().unwrap(), 192);
    /// assert!(BatchDims::new(usize::MAX, 2, 1, 1).checked_numel().is_err());
    /// ```
    pub fn checked_numel(&self) -> TensorResult<usize> {
        self.height
            .checked_mul(self.width)
            .and_then(|spatial| {
                self.batch
                    .checked_mul(self.channels)
                    .and_then(|rows| rows.checked_mul(spatial))
            })
            .ok_or_else(|| {
                TensorError::InvalidShape(format!("element count of {} overflows usize", self))
            })
    }

    /// Returns these dimensions as a [`Shape`].
    pub fn to_shape(&self) -> Shape {
        Shape::from([self.batch, self.channels, self.height, self.width])
    }
}

impl TryFrom<&Shape> for BatchDims {
    type Error = TensorError;

    fn try_from(shape: &Shape) -> TensorResult<Self> {
        match *shape.as_slice() {
            [batch, channels, height, width] => {
                let dims = Self::new(batch, channels, height, width);
                dims.checked_numel()?;
                Ok(dims)
            }
            _ => Err(TensorError::RankMismatch {
                expected: 4,
                got: shape.ndim(),
                shape: shape.clone(),
            }),
        }
    }
}

impl fmt::Display for BatchDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(B={}, C={}, H={}, W={})",
            self.batch, self.channels, self.height, self.width
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_new() {
        let shape = Shape::new(vec![2, 3, 4]);
        assert_eq!(shape.as_slice(), &[2, 3, 4]);
        assert_eq!(shape.ndim(), 3);
    }

    #[test]
    fn test_shape_from_conversions() {
        let shape1: Shape = vec![2, 3, 4].into();
        assert_eq!(shape1.as_slice(), &[2, 3, 4]);

        let shape2: Shape = [2, 3, 4].into();
        assert_eq!(shape2.as_slice(), &[2, 3, 4]);

        let dims = &[2, 3, 4][..];
        let shape3: Shape = dims.into();
        assert_eq!(shape3, shape1);
    }

    #[test]
    fn test_shape_display() {
        let shape = Shape::new(vec![2, 3, 4]);
        assert_eq!(format!("{}", shape), "(2, 3, 4)");
        assert_eq!(format!("{:?}", shape), "Shape([2, 3, 4])");
    }

    #[test]
    fn test_batch_dims_from_shape() {
        let dims = BatchDims::try_from(&Shape::from([4, 8, 2, 3])).unwrap();
        assert_eq!(dims, BatchDims::new(4, 8, 2, 3));
        assert_eq!(dims.spatial(), 6);
        assert_eq!(dims.flattened(), (4, 8, 6));
        assert_eq!(dims.numel(), 192);
        assert_eq!(dims.to_shape().as_slice(), &[4, 8, 2, 3]);
    }

    #[test]
    fn test_batch_dims_rejects_wrong_rank() {
        let err = BatchDims::try_from(&Shape::from([4, 8, 6])).unwrap_err();
        assert_eq!(
            err,
            TensorError::RankMismatch {
                expected: 4,
                got: 3,
                shape: Shape::from([4, 8, 6]),
            }
        );
    }

    #[test]
    fn test_checked_numel_overflow() {
        let huge = BatchDims::new(usize::MAX, 2, 1, 1);
        assert!(matches!(huge.checked_numel(), Err(TensorError::InvalidShape(_))));

        // H * W overflows even though the batch is empty.
        let wide = BatchDims::new(0, 3, usize::MAX, 2);
        assert!(matches!(wide.checked_numel(), Err(TensorError::InvalidShape(_))));

        assert_eq!(BatchDims::new(0, 3, 4, 4).checked_numel().unwrap(), 0);
    }

    #[test]
    fn test_batch_dims_from_shape_rejects_overflow() {
        let err = BatchDims::try_from(&Shape::from([2, usize::MAX, 2, 1])).unwrap_err();
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn test_batch_dims_display() {
        let dims = BatchDims::new(16, 3, 224, 224);
        assert_eq!(dims.to_string(), "(B=16, C=3, H=224, W=224)");
    }
}
