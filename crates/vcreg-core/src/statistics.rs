//! Batch statistics behind the two loss terms.
//!
//! All functions take the flattened `(B, C, H * W)` view of a batch, read the
//! `f32` values and accumulate in `f64`. Sums run over the batch index in
//! ascending order, then over positions, then over channels, with no
//! parallelism, so repeated calls are bit-for-bit identical.

use ndarray::{Array2, ArrayView3, Axis};
use vcreg_tensor::ops::{off_diagonal, relu};

use crate::error::{RegularizerError, RegularizerResult};

/// Mean hinge penalty on the per-position standard deviation.
///
/// For every channel and spatial position the population standard deviation
/// over the batch is `sqrt(var + epsilon)` (variance divided by B). The hinge
/// `relu(target - std)` is averaged over positions, then over channels.
///
/// # Example
///
/// ```
/// use ndarray::Array3;
/// use vcreg_core::statistics::variance_hinge;
///
/// // Two samples, one channel, one position: values -1 and 1 have std 1.
/// let x = Array3::from_shape_vec((2, 1, 1), vec![-1.0f32, 1.0]).unwrap();
/// let hinge = variance_hinge(&x.view(), 1e-4, 1.0).unwrap();
/// assert_eq!(hinge, 0.0);
/// ```
pub fn variance_hinge(
    flattened: &ArrayView3<'_, f32>,
    epsilon: f64,
    target: f64,
) -> RegularizerResult<f64> {
    let (batch, channels, spatial) = flattened.dim();
    ensure_nonempty(batch, channels, spatial)?;
    let n = batch as f64;

    let mut channel_sum = 0.0;
    for channel in flattened.axis_iter(Axis(1)) {
        let mut hinge_sum = 0.0;
        for position in channel.axis_iter(Axis(1)) {
            let mean = position.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
            let var = position
                .iter()
                .map(|&v| {
                    let d = f64::from(v) - mean;
                    d * d
                })
                .sum::<f64>()
                / n;
            hinge_sum += relu(target - (var + epsilon).sqrt());
        }
        channel_sum += hinge_sum / spatial as f64;
    }

    Ok(channel_sum / channels as f64)
}

/// Per-element mean over the batch axis, shape `(C, H * W)`.
pub fn batch_mean(flattened: &ArrayView3<'_, f32>) -> RegularizerResult<Array2<f64>> {
    let (batch, channels, spatial) = flattened.dim();
    ensure_nonempty(batch, channels, spatial)?;

    let mut sum = Array2::<f64>::zeros((channels, spatial));
    for sample in flattened.outer_iter() {
        sum.zip_mut_with(&sample, |acc, &v| *acc += f64::from(v));
    }
    Ok(sum / batch as f64)
}

/// Channel-by-channel sample covariance, shape `(C, C)`.
///
/// Each sample is centered on the batch mean, the `(C, H * W)` product with
/// its own transpose is summed over the batch, and the sum is divided by
/// `B - 1`.
///
/// # Errors
///
/// Returns [`RegularizerError::InvalidConfiguration`] when `B < 2`.
pub fn covariance_matrix(flattened: &ArrayView3<'_, f32>) -> RegularizerResult<Array2<f64>> {
    let (batch, channels, _) = flattened.dim();
    if batch < 2 {
        return Err(RegularizerError::invalid_config(format!(
            "covariance needs a batch of at least 2 samples, got {}",
            batch
        )));
    }
    let mean = batch_mean(flattened)?;

    let mut cov = Array2::<f64>::zeros((channels, channels));
    for sample in flattened.outer_iter() {
        let centered = sample.mapv(f64::from) - &mean;
        cov += &centered.dot(&centered.t());
    }
    cov /= (batch - 1) as f64;
    Ok(cov)
}

/// Sum of squared off-diagonal entries of `cov`, divided by its size.
///
/// A diagonal matrix yields exactly zero.
pub fn off_diagonal_penalty(cov: &Array2<f64>) -> RegularizerResult<f64> {
    let size = cov.nrows();
    if size == 0 {
        return Err(RegularizerError::shape("covariance matrix is empty"));
    }
    let squared: f64 = off_diagonal(&cov.view())?.iter().map(|v| v * v).sum();
    Ok(squared / size as f64)
}

fn ensure_nonempty(batch: usize, channels: usize, spatial: usize) -> RegularizerResult<()> {
    if batch == 0 || channels == 0 || spatial == 0 {
        return Err(RegularizerError::shape(format!(
            "batch statistics need non-empty (B, C, H*W), got ({}, {}, {})",
            batch, channels, spatial
        )));
    }
    Ok(())
}
