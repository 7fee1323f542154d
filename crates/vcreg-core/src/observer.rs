//! Optional reporting of computed losses.
//!
//! The regularizer itself has no side effects. Callers that want to see each
//! loss pass a [`LossObserver`] to [`crate::VCReg::compute_observed`].

use tracing::info;

use crate::regularizer::LossTerms;

/// Receives the terms of every successful loss computation.
///
/// Any `FnMut(&LossTerms)` closure is an observer:
///
/// ```
/// use vcreg_core::{LossTerms, VCReg, VCRegConfig};
/// use vcreg_tensor::FeatureBatch;
///
/// let reg = VCReg::new(VCRegConfig::default()).unwrap();
/// let batch = FeatureBatch::from_shape_vec(&[2, 2, 1, 1], vec![0.0, 1.0, 1.0, 0.0]).unwrap();
///
/// let mut seen = Vec::new();
/// let mut observer = |terms: &LossTerms| seen.push(terms.total);
/// let loss = reg.compute_observed(&batch, &mut observer).unwrap();
/// assert_eq!(seen, vec![loss]);
/// ```
pub trait LossObserver {
    /// Called once per successful computation.
    fn observe(&mut self, terms: &LossTerms);
}

impl<F> LossObserver for F
where
    F: FnMut(&LossTerms),
{
    fn observe(&mut self, terms: &LossTerms) {
        self(terms)
    }
}

/// Observer that emits each loss as a `tracing` info event.
#[derive(Debug, Clone, Default)]
pub struct TracingObserver {
    label: Option<String>,
}

impl TracingObserver {
    /// Creates an observer that tags its events with `label`.
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }
}

impl LossObserver for TracingObserver {
    fn observe(&mut self, terms: &LossTerms) {
        info!(
            label = self.label.as_deref().unwrap_or("vcreg"),
            total = terms.total,
            variance = terms.variance,
            covariance = terms.covariance,
            "vc regularization loss"
        );
    }
}

/// Observer that keeps every observed [`LossTerms`].
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    records: Vec<LossTerms>,
}

impl RecordingObserver {
    /// Returns the observed terms, oldest first.
    pub fn records(&self) -> &[LossTerms] {
        &self.records
    }

    /// Returns the most recent total, if any.
    pub fn last_total(&self) -> Option<f64> {
        self.records.last().map(|terms| terms.total)
    }
}

impl LossObserver for RecordingObserver {
    fn observe(&mut self, terms: &LossTerms) {
        self.records.push(*terms);
    }
}
