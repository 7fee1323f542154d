//! Variance-covariance regularization for self-supervised embeddings.
//!
//! This crate computes a scalar regularization loss over a batch of feature
//! maps `(B, C, H, W)` that discourages representation collapse:
//!
//! - **Variance term**: a hinge on the per-position standard deviation of each
//!   channel across the batch, zero once the spread reaches the target.
//! - **Covariance term**: the squared off-diagonal entries of the
//!   channel-by-channel covariance matrix, divided by the channel count.
//!
//! The two terms are weighted and summed. Either can be disabled.
//!
//! # Quick Start
//!
//! ```
//! use vcreg_core::prelude::*;
//!
//! let reg = VCReg::new(VCRegConfig::default()).unwrap();
//! let data: Vec<f32> = (0..4 * 8 * 2 * 2).map(|i| ((i * 37) % 11) as f32 - 5.0).collect();
//! let batch = FeatureBatch::from_shape_vec(&[4, 8, 2, 2], data).unwrap();
//!
//! let loss = reg.compute(&batch).unwrap();
//! assert!(loss.is_finite() && loss >= 0.0);
//! ```
//!
//! # Numerics
//!
//! Inputs are `f32`; every statistic is accumulated in `f64` and the loss is
//! returned as `f64`. The variance term divides by `B` (population variance)
//! while the covariance matrix divides by `B - 1`. See [`statistics`] for the
//! accumulation order.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod observer;
pub mod regularizer;
pub mod statistics;

pub use config::VCRegConfig;
pub use error::{RegularizerError, RegularizerResult};
pub use observer::{LossObserver, RecordingObserver, TracingObserver};
pub use regularizer::{LossTerms, VCReg};

/// Prelude module for convenient imports.
///
/// ```
/// use vcreg_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::VCRegConfig;
    pub use crate::error::{RegularizerError, RegularizerResult};
    pub use crate::observer::{LossObserver, RecordingObserver, TracingObserver};
    pub use crate::regularizer::{LossTerms, VCReg};
    pub use vcreg_tensor::FeatureBatch;
}
