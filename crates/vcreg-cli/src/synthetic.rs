//! Synthetic feature batches for smoke-testing the regularizer.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use vcreg_tensor::{BatchDims, FeatureBatch, TensorResult};

/// Builds a batch of standard-normal values.
///
/// The same `seed` always yields the same batch; `None` seeds from OS entropy.
pub fn normal_batch(dims: BatchDims, seed: Option<u64>) -> TensorResult<FeatureBatch> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    normal_batch_with(dims, &mut rng)
}

/// Builds a batch of standard-normal values drawn from `rng`.
pub fn normal_batch_with<R: Rng + ?Sized>(dims: BatchDims, rng: &mut R) -> TensorResult<FeatureBatch> {
    let numel = dims.checked_numel()?;
    let data: Vec<f32> = (0..numel)
        .map(|_| StandardNormal.sample(&mut *rng))
        .collect();
    FeatureBatch::from_shape_vec(dims.to_shape().as_slice(), data)
}
