//! ndarray-backed feature batch.
//!
//! This module provides [`FeatureBatch`], the rank-4 `(B, C, H, W)` input of
//! the regularizer. The spatial axes are flattened once at construction, so
//! every accessor hands out views of a standard-layout `(B, C, H * W)` array.

use ndarray::{Array3, Array4, ArrayD, ArrayView2, ArrayView3, ArrayViewD, Axis, Ix4};

use crate::shape::{BatchDims, Shape};
use crate::{TensorError, TensorResult};

/// An owned batch of feature maps.
///
/// # Examples
///
/// ```
/// use ndarray::Array4;
/// use vcreg_tensor::FeatureBatch;
///
/// let batch = FeatureBatch::from_array4(Array4::zeros((4, 8, 2, 2))).unwrap();
/// assert_eq!(batch.flattened().shape(), &[4, 8, 4]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureBatch {
    dims: BatchDims,
    data: Array3<f32>,
}

impl FeatureBatch {
    /// Creates a batch from a rank-4 array of any memory layout.
    ///
    /// Non-standard layouts (transposed or Fortran-ordered arrays) are copied
    /// into row-major order first so the spatial flattening follows logical
    /// `(h, w)` order.
    pub fn from_array4(array: Array4<f32>) -> TensorResult<Self> {
        let (batch, channels, height, width) = array.dim();
        let dims = BatchDims::new(batch, channels, height, width);
        let array = if array.is_standard_layout() {
            array
        } else {
            array.as_standard_layout().into_owned()
        };
        let data = array.into_shape(dims.flattened())?;
        Ok(Self { dims, data })
    }

    /// Creates a batch from a dynamic-rank array.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::RankMismatch`] if the array is not rank 4.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndarray::ArrayD;
    /// use vcreg_tensor::{FeatureBatch, TensorError};
    ///
    /// let flat = ArrayD::<f32>::zeros(vec![4, 8, 16]);
    /// let err = FeatureBatch::from_ndarray(flat).unwrap_err();
    /// assert!(matches!(err, TensorError::RankMismatch { got: 3, .. }));
    /// ```
    pub fn from_ndarray(array: ArrayD<f32>) -> TensorResult<Self> {
        ensure_rank4(array.shape())?;
        Self::from_array4(array.into_dimensionality::<Ix4>()?)
    }

    /// Creates a batch by copying a borrowed dynamic-rank array.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::RankMismatch`] if the view is not rank 4.
    pub fn from_view(view: ArrayViewD<'_, f32>) -> TensorResult<Self> {
        ensure_rank4(view.shape())?;
        Self::from_array4(view.into_dimensionality::<Ix4>()?.to_owned())
    }

    /// Creates a batch from a row-major buffer and a `(B, C, H, W)` shape.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::RankMismatch`] if `shape` is not rank 4,
    /// [`TensorError::InvalidShape`] if its element count overflows `usize`
    /// and [`TensorError::DataLength`] if `data` does not fill it exactly.
    pub fn from_shape_vec(shape: &[usize], data: Vec<f32>) -> TensorResult<Self> {
        let shape = Shape::from(shape);
        let dims = BatchDims::try_from(&shape)?;
        if data.len() != dims.numel() {
            return Err(TensorError::DataLength {
                expected: dims.numel(),
                got: data.len(),
                shape,
            });
        }
        let data = Array3::from_shape_vec(dims.flattened(), data)?;
        Ok(Self { dims, data })
    }

    /// Returns the `(B, C, H, W)` dimensions of the batch.
    pub fn dims(&self) -> BatchDims {
        self.dims
    }

    /// Number of samples (B).
    pub fn batch_size(&self) -> usize {
        self.dims.batch
    }

    /// Number of channels (C).
    pub fn channels(&self) -> usize {
        self.dims.channels
    }

    /// Number of spatial positions per channel (H * W).
    pub fn spatial(&self) -> usize {
        self.dims.spatial()
    }

    /// The flattened `(B, C, H * W)` view.
    pub fn flattened(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    /// All samples of one channel as a `(B, H * W)` view.
    ///
    /// Indexes the batch channel-major without making a transposed copy.
    ///
    /// # Panics
    ///
    /// Panics if `channel >= self.channels()`.
    pub fn channel(&self, channel: usize) -> ArrayView2<'_, f32> {
        self.data.index_axis(Axis(1), channel)
    }

    /// Index `(b, c, p)` of the first NaN or infinite value, in flattened order.
    ///
    /// # Examples
    ///
    /// ```
    /// use vcreg_tensor::FeatureBatch;
    ///
    /// let batch = FeatureBatch::from_shape_vec(&[2, 1, 1, 2], vec![0.0, 1.0, f32::NAN, 2.0]).unwrap();
    /// assert_eq!(batch.first_non_finite(), Some((1, 0, 0)));
    /// ```
    pub fn first_non_finite(&self) -> Option<(usize, usize, usize)> {
        self.data
            .indexed_iter()
            .find(|(_, value)| !value.is_finite())
            .map(|(index, _)| index)
    }

    /// Returns a new batch whose channel `i` is this batch's channel `order[i]`.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::InvalidShape`] if any index is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use vcreg_tensor::FeatureBatch;
    ///
    /// let batch = FeatureBatch::from_shape_vec(&[1, 3, 1, 1], vec![1.0, 2.0, 3.0]).unwrap();
    /// let reversed = batch.select_channels(&[2, 1, 0]).unwrap();
    /// assert_eq!(reversed.flattened().iter().copied().collect::<Vec<_>>(), vec![3.0, 2.0, 1.0]);
    /// ```
    pub fn select_channels(&self, order: &[usize]) -> TensorResult<Self> {
        if let Some(&bad) = order.iter().find(|&&c| c >= self.dims.channels) {
            return Err(TensorError::InvalidShape(format!(
                "channel index {} out of range for {} channels",
                bad, self.dims.channels
            )));
        }
        let data = self.data.select(Axis(1), order);
        let dims = BatchDims {
            channels: order.len(),
            ..self.dims
        };
        Ok(Self { dims, data })
    }
}

fn ensure_rank4(shape: &[usize]) -> TensorResult<()> {
    if shape.len() == 4 {
        Ok(())
    } else {
        Err(TensorError::RankMismatch {
            expected: 4,
            got: shape.len(),
            shape: Shape::from(shape),
        })
    }
}
