//! vcreg CLI Library
//!
//! Command-line driver for the variance-covariance regularizer. It builds a
//! [`VCRegConfig`] from flags (optionally layered over a JSON config file),
//! synthesizes a standard-normal batch of the requested shape, runs the
//! regularizer once and returns the loss.
//!
//! # Example
//!
//! ```bash
//! # Default: 16 samples of shape 3x224x224, both terms enabled
//! vcreg
//!
//! # Smaller batch, covariance only, reproducible data
//! vcreg --batch-size 8 --input_shape 64,7,7 --no_std --seed 42
//!
//! # Weights from a file, with one flag override
//! vcreg --config vcreg.json --cov_coeff 0.04
//! ```

pub mod synthetic;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use vcreg_core::{TracingObserver, VCReg, VCRegConfig};
use vcreg_tensor::BatchDims;

/// Run the variance-covariance regularizer on a synthetic batch
///
/// Coefficient flags override values from `--config`; when neither is given
/// the defaults are 25.0 for the variance term and 1.0 for the covariance term.
#[derive(Parser, Debug, Clone)]
#[command(name = "vcreg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shape of each encoded sample as C,H,W
    #[arg(
        long = "input_shape",
        value_delimiter = ',',
        num_args = 1..,
        default_values_t = [3usize, 224, 224]
    )]
    pub input_shape: Vec<usize>,

    /// Number of samples in the batch
    #[arg(long = "batch-size", default_value_t = 16)]
    pub batch_size: usize,

    /// Variance regularization loss coefficient
    #[arg(long = "std_coeff")]
    pub std_coeff: Option<f64>,

    /// Covariance regularization loss coefficient
    #[arg(long = "cov_coeff")]
    pub cov_coeff: Option<f64>,

    /// Disable the variance term
    #[arg(long = "no_std")]
    pub no_std: bool,

    /// Disable the covariance term
    #[arg(long = "no_cov")]
    pub no_cov: bool,

    /// Seed for the synthetic batch (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// JSON file with a regularizer configuration
    #[arg(long, env = "VCREG_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Resolves the regularizer configuration: file (or defaults), then flags.
    pub fn regularizer_config(&self) -> Result<VCRegConfig> {
        let mut config = match &self.config {
            Some(path) => VCRegConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config from {:?}", path))?,
            None => VCRegConfig::default(),
        };

        if let Some(weight) = self.std_coeff {
            config.variance_weight = weight;
        }
        if let Some(weight) = self.cov_coeff {
            config.covariance_weight = weight;
        }
        if self.no_std {
            config.enable_variance_term = false;
        }
        if self.no_cov {
            config.enable_covariance_term = false;
        }

        config.validate()?;
        Ok(config)
    }

    /// Returns the `(B, C, H, W)` shape of the synthetic batch.
    pub fn batch_dims(&self) -> Result<BatchDims> {
        if self.batch_size == 0 {
            bail!("--batch-size must be positive");
        }
        match *self.input_shape.as_slice() {
            [channels, height, width] if channels > 0 && height > 0 && width > 0 => {
                let dims = BatchDims::new(self.batch_size, channels, height, width);
                dims.checked_numel()
                    .with_context(|| format!("Batch {} is too large", dims))?;
                Ok(dims)
            }
            _ => bail!(
                "--input_shape expects three positive dimensions C,H,W, got {:?}",
                self.input_shape
            ),
        }
    }

    /// Synthesizes a batch, computes the loss and returns it.
    pub fn run(&self) -> Result<f64> {
        let config = self.regularizer_config()?;
        let dims = self.batch_dims()?;
        info!(
            "Regularizer config: std_coeff={}, cov_coeff={}, std={}, cov={}",
            config.variance_weight,
            config.covariance_weight,
            config.enable_variance_term,
            config.enable_covariance_term
        );
        info!("Synthesizing batch {}", dims);

        let batch = synthetic::normal_batch(dims, self.seed)
            .context("Failed to build synthetic batch")?;
        let reg = VCReg::new(config)?;
        let mut observer = TracingObserver::with_label("synthetic");
        let loss = reg
            .compute_observed(&batch, &mut observer)
            .context("Failed to compute regularization loss")?;
        Ok(loss)
    }
}
