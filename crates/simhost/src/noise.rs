//! Noise factory for sensor outputs.
//!
//! Sensors describe their noise with a [`NoiseConfig`] and obtain a
//! [`NoiseModel`] from [`NoiseModel::from_config`]. Construction validates
//! every parameter, so a malformed block fails at load time rather than on
//! the first sample.
//!
//! The models are intentionally simple: additive Gaussian noise with an
//! optional constant bias drawn once at construction, optionally quantized
//! to a fixed precision. Sampling is deterministic for a given seed.
//!
//! # Example
//!
//! ```
//! use simhost::noise::{NoiseConfig, NoiseModel};
//!
//! let mut model = NoiseModel::from_config(&NoiseConfig::gaussian(0.0, 0.0)).unwrap();
//! assert_eq!(model.apply(1.5), 1.5);
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal, NormalError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seed used when a noise block does not specify one.
pub const DEFAULT_NOISE_SEED: u64 = 0x5EED_0F_4015E;

/// Parameters shared by the Gaussian noise models.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GaussianParams {
    /// Mean of the per-sample noise.
    #[serde(default)]
    pub mean: f64,
    /// Standard deviation of the per-sample noise.
    #[serde(default)]
    pub stddev: f64,
    /// Mean of the constant bias.
    #[serde(default)]
    pub bias_mean: f64,
    /// Standard deviation of the constant bias.
    #[serde(default)]
    pub bias_stddev: f64,
    /// Quantization step. Zero disables quantization for plain Gaussian noise.
    #[serde(default)]
    pub precision: f64,
    /// RNG seed; [`DEFAULT_NOISE_SEED`] when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Noise block as it appears in sensor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NoiseConfig {
    /// No noise; values pass through unchanged.
    None,
    /// Additive Gaussian noise.
    Gaussian(GaussianParams),
    /// Additive Gaussian noise followed by quantization to `precision`.
    GaussianQuantized(GaussianParams),
}

impl NoiseConfig {
    /// Shorthand for unbiased, unquantized Gaussian noise.
    #[must_use]
    pub fn gaussian(mean: f64, stddev: f64) -> Self {
        Self::Gaussian(GaussianParams {
            mean,
            stddev,
            ..GaussianParams::default()
        })
    }
}

/// Errors raised while building a [`NoiseModel`].
#[derive(Debug, Error)]
pub enum NoiseError {
    /// A parameter was NaN or infinite.
    #[error("noise parameter `{field}` must be finite")]
    NonFinite {
        /// Offending field.
        field: &'static str,
    },
    /// A parameter that must be non-negative was negative.
    #[error("noise parameter `{field}` must be non-negative, got {value}")]
    Negative {
        /// Offending field.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// Quantized noise without a positive precision.
    #[error("quantized noise requires a positive precision")]
    MissingPrecision,
    /// The distribution rejected its parameters.
    #[error("invalid noise distribution: {0}")]
    Distribution(#[from] NormalError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoiseKind {
    None,
    Gaussian,
    GaussianQuantized,
}

/// A constructed noise model ready to perturb values.
#[derive(Debug, Clone)]
pub struct NoiseModel {
    kind: NoiseKind,
    normal: Option<Normal<f64>>,
    bias: f64,
    precision: f64,
    rng: ChaCha8Rng,
}

impl NoiseModel {
    /// Builds a model from its configuration, validating every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`NoiseError`] when a parameter is non-finite, negative where
    /// it must not be, or when quantized noise has no precision.
    pub fn from_config(config: &NoiseConfig) -> Result<Self, NoiseError> {
        let (kind, params) = match config {
            NoiseConfig::None => {
                return Ok(Self {
                    kind: NoiseKind::None,
                    normal: None,
                    bias: 0.0,
                    precision: 0.0,
                    rng: ChaCha8Rng::seed_from_u64(DEFAULT_NOISE_SEED),
                })
            }
            NoiseConfig::Gaussian(params) => (NoiseKind::Gaussian, params),
            NoiseConfig::GaussianQuantized(params) => (NoiseKind::GaussianQuantized, params),
        };

        validate(params)?;
        if kind == NoiseKind::GaussianQuantized && params.precision <= 0.0 {
            return Err(NoiseError::MissingPrecision);
        }

        let mut rng = ChaCha8Rng::seed_from_u64(params.seed.unwrap_or(DEFAULT_NOISE_SEED));
        let normal = Normal::new(params.mean, params.stddev)?;

        // The bias is drawn once and keeps its sign for the model's lifetime.
        let mut bias = Normal::new(params.bias_mean, params.bias_stddev)?.sample(&mut rng);
        if rng.gen_bool(0.5) {
            bias = -bias;
        }

        Ok(Self {
            kind,
            normal: Some(normal),
            bias,
            precision: params.precision,
            rng,
        })
    }

    /// Returns `true` if this model leaves values untouched.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.kind == NoiseKind::None
    }

    /// Constant bias added to every sample.
    #[must_use]
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Applies the noise model to a single value.
    pub fn apply(&mut self, value: f64) -> f64 {
        let Some(normal) = self.normal else {
            return value;
        };

        let noisy = value + self.bias + normal.sample(&mut self.rng);
        if self.precision > 0.0 {
            (noisy / self.precision).round() * self.precision
        } else {
            noisy
        }
    }
}

fn validate(params: &GaussianParams) -> Result<(), NoiseError> {
    let fields = [
        ("mean", params.mean),
        ("stddev", params.stddev),
        ("bias_mean", params.bias_mean),
        ("bias_stddev", params.bias_stddev),
        ("precision", params.precision),
    ];
    for (field, value) in fields {
        if !value.is_finite() {
            return Err(NoiseError::NonFinite { field });
        }
    }
    for (field, value) in [
        ("stddev", params.stddev),
        ("bias_stddev", params.bias_stddev),
        ("precision", params.precision),
    ] {
        if value < 0.0 {
            return Err(NoiseError::Negative { field, value });
        }
    }
    Ok(())
}
