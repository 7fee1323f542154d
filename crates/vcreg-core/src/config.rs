//! Regularizer configuration.
//!
//! [`VCRegConfig`] is passed explicitly to [`crate::VCReg::new`]; nothing is
//! read from global state. It can be built in code with the `with_*` methods
//! or deserialized from JSON, where missing fields take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RegularizerError, RegularizerResult};

/// Default multiplier on the variance term.
pub const DEFAULT_VARIANCE_WEIGHT: f64 = 25.0;
/// Default multiplier on the covariance term.
pub const DEFAULT_COVARIANCE_WEIGHT: f64 = 1.0;
/// Constant added to the variance before the square root.
pub const DEFAULT_VARIANCE_EPSILON: f64 = 1e-4;
/// Standard deviation below which the hinge starts to penalize a channel.
pub const DEFAULT_VARIANCE_TARGET: f64 = 1.0;

/// Configuration for the variance-covariance regularizer.
///
/// # Example
///
/// ```
/// use vcreg_core::VCRegConfig;
///
/// let config = VCRegConfig::default()
///     .with_variance_weight(10.0)
///     .with_covariance_term(false);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.covariance_weight, 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VCRegConfig {
    /// Include the variance hinge penalty.
    pub enable_variance_term: bool,
    /// Include the off-diagonal covariance penalty.
    pub enable_covariance_term: bool,
    /// Multiplier on the variance term. Negative values are allowed.
    pub variance_weight: f64,
    /// Multiplier on the covariance term. Negative values are allowed.
    pub covariance_weight: f64,
    /// Added inside the square root of the variance; must be positive.
    pub variance_epsilon: f64,
    /// Hinge target for the per-position standard deviation.
    pub variance_target: f64,
}

impl Default for VCRegConfig {
    fn default() -> Self {
        Self {
            enable_variance_term: true,
            enable_covariance_term: true,
            variance_weight: DEFAULT_VARIANCE_WEIGHT,
            covariance_weight: DEFAULT_COVARIANCE_WEIGHT,
            variance_epsilon: DEFAULT_VARIANCE_EPSILON,
            variance_target: DEFAULT_VARIANCE_TARGET,
        }
    }
}

impl VCRegConfig {
    /// Sets the variance term multiplier.
    pub fn with_variance_weight(mut self, weight: f64) -> Self {
        self.variance_weight = weight;
        self
    }

    /// Sets the covariance term multiplier.
    pub fn with_covariance_weight(mut self, weight: f64) -> Self {
        self.covariance_weight = weight;
        self
    }

    /// Enables or disables the variance term.
    pub fn with_variance_term(mut self, enabled: bool) -> Self {
        self.enable_variance_term = enabled;
        self
    }

    /// Enables or disables the covariance term.
    pub fn with_covariance_term(mut self, enabled: bool) -> Self {
        self.enable_covariance_term = enabled;
        self
    }

    /// Sets the epsilon added to the variance before the square root.
    pub fn with_variance_epsilon(mut self, epsilon: f64) -> Self {
        self.variance_epsilon = epsilon;
        self
    }

    /// Sets the hinge target for the standard deviation.
    pub fn with_variance_target(mut self, target: f64) -> Self {
        self.variance_target = target;
        self
    }

    /// Validates the configuration.
    ///
    /// Weights and the target must be finite. Epsilon must be finite and
    /// strictly positive so the square root argument stays above zero.
    pub fn validate(&self) -> RegularizerResult<()> {
        if !self.variance_weight.is_finite() {
            return Err(RegularizerError::invalid_config(format!(
                "variance_weight must be finite, got {}",
                self.variance_weight
            )));
        }
        if !self.covariance_weight.is_finite() {
            return Err(RegularizerError::invalid_config(format!(
                "covariance_weight must be finite, got {}",
                self.covariance_weight
            )));
        }
        if !(self.variance_epsilon.is_finite() && self.variance_epsilon > 0.0) {
            return Err(RegularizerError::invalid_config(format!(
                "variance_epsilon must be finite and positive, got {}",
                self.variance_epsilon
            )));
        }
        if !self.variance_target.is_finite() {
            return Err(RegularizerError::invalid_config(format!(
                "variance_target must be finite, got {}",
                self.variance_target
            )));
        }
        Ok(())
    }

    /// Parses a configuration from a JSON document.
    ///
    /// Missing fields keep their default values. The result is validated.
    ///
    /// # Example
    ///
    /// ```
    /// use vcreg_core::VCRegConfig;
    ///
    /// let config = VCRegConfig::from_json_str(r#"{"covariance_weight": 0.04}"#).unwrap();
    /// assert_eq!(config.covariance_weight, 0.04);
    /// assert_eq!(config.variance_weight, 25.0);
    /// ```
    pub fn from_json_str(json: &str) -> RegularizerResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a JSON configuration file.
    pub fn load_from_file(path: impl AsRef<Path>) -> RegularizerResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RegularizerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}
