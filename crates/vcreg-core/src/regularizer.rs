//! Variance-covariance regularization of embedding batches.

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vcreg_tensor::{BatchDims, FeatureBatch};

use crate::config::VCRegConfig;
use crate::error::{RegularizerError, RegularizerResult};
use crate::observer::LossObserver;
use crate::statistics;

/// The two unweighted loss terms and their weighted sum.
///
/// A disabled term is reported as `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LossTerms {
    /// Mean hinge penalty on per-channel standard deviation.
    pub variance: f64,
    /// Squared off-diagonal covariance, divided by the channel count.
    pub covariance: f64,
    /// `variance_weight * variance + covariance_weight * covariance`.
    pub total: f64,
}

/// Regularizer that discourages collapsed or correlated feature channels.
///
/// The loss is a weighted sum of a variance term, which penalizes channels
/// whose spread across the batch falls below a target standard deviation,
/// and a covariance term, which penalizes correlation between distinct
/// channels. `VCReg` holds only its configuration, so one instance can be
/// reused for every batch.
///
/// # Example
///
/// ```
/// use vcreg_core::{VCReg, VCRegConfig};
/// use vcreg_tensor::FeatureBatch;
///
/// let reg = VCReg::new(VCRegConfig::default().with_covariance_term(false)).unwrap();
/// let collapsed = FeatureBatch::from_shape_vec(&[4, 2, 1, 1], vec![0.5; 8]).unwrap();
/// let loss = reg.compute(&collapsed).unwrap();
/// assert!((loss - 25.0 * 0.99).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct VCReg {
    config: VCRegConfig,
}

impl VCReg {
    /// Creates a regularizer after validating `config`.
    pub fn new(config: VCRegConfig) -> RegularizerResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration this regularizer was built with.
    pub fn config(&self) -> &VCRegConfig {
        &self.config
    }

    /// Computes the scalar loss for one batch.
    pub fn compute(&self, batch: &FeatureBatch) -> RegularizerResult<f64> {
        Ok(self.compute_terms(batch)?.total)
    }

    /// Computes the loss for a dynamic-rank array.
    ///
    /// # Errors
    ///
    /// Returns [`RegularizerError::Shape`] if `batch` is not rank 4.
    pub fn compute_array(&self, batch: &ArrayD<f32>) -> RegularizerResult<f64> {
        let batch = FeatureBatch::from_view(batch.view())?;
        self.compute(&batch)
    }

    /// Computes the loss and reports the terms to `observer`.
    ///
    /// The observer is only called when the computation succeeds.
    pub fn compute_observed(
        &self,
        batch: &FeatureBatch,
        observer: &mut dyn LossObserver,
    ) -> RegularizerResult<f64> {
        let terms = self.compute_terms(batch)?;
        observer.observe(&terms);
        Ok(terms.total)
    }

    /// Computes both terms and the weighted total.
    ///
    /// All preconditions are checked before any statistic is computed,
    /// including that every value of the batch is finite.
    pub fn compute_terms(&self, batch: &FeatureBatch) -> RegularizerResult<LossTerms> {
        let dims = batch.dims();
        self.check_batch(dims)?;
        if self.config.enable_variance_term || self.config.enable_covariance_term {
            if let Some((b, c, p)) = batch.first_non_finite() {
                return Err(RegularizerError::shape(format!(
                    "batch {} has a non-finite value at sample {}, channel {}, position {}",
                    dims, b, c, p
                )));
            }
        }
        debug!(%dims, "computing vc regularization");

        let flattened = batch.flattened();
        let variance = if self.config.enable_variance_term {
            statistics::variance_hinge(
                &flattened,
                self.config.variance_epsilon,
                self.config.variance_target,
            )?
        } else {
            0.0
        };
        let covariance = if self.config.enable_covariance_term {
            let cov = statistics::covariance_matrix(&flattened)?;
            statistics::off_diagonal_penalty(&cov)?
        } else {
            0.0
        };

        Ok(LossTerms {
            variance,
            covariance,
            total: self.config.variance_weight * variance
                + self.config.covariance_weight * covariance,
        })
    }

    fn check_batch(&self, dims: BatchDims) -> RegularizerResult<()> {
        let any_term = self.config.enable_variance_term || self.config.enable_covariance_term;
        if any_term && (dims.batch == 0 || dims.channels == 0 || dims.spatial() == 0) {
            return Err(RegularizerError::shape(format!(
                "batch {} has an empty dimension",
                dims
            )));
        }
        if self.config.enable_covariance_term && dims.batch < 2 {
            return Err(RegularizerError::invalid_config(format!(
                "covariance term needs batch size >= 2, got {}",
                dims.batch
            )));
        }
        Ok(())
    }
}
