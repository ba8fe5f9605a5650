use super::Estimator;
use crate::baselines::BaselineType;
use serde::{Deserialize, Serialize};
use tch::nn;

/// Configuration for [`Estimator`]
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Weight of the encoder entropy bonus.
    pub encoder_entropy_coeff: f64,
    /// Weight of the decoder entropy bonus. Score function estimators only.
    pub decoder_entropy_coeff: f64,
    /// Baseline policy.
    pub baseline: BaselineType,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            encoder_entropy_coeff: 0.0,
            decoder_entropy_coeff: 0.0,
            baseline: BaselineType::RunningAverage,
        }
    }
}

impl EstimatorConfig {
    /// Build an estimator.
    ///
    /// # Args
    /// * `vs` - Variable path for a learned baseline network.
    ///     Should share a variable store with the encoder and decoder so that one optimizer
    ///     trains all of them.
    /// * `input_dim` - Flattened size of one encoder input row.
    pub fn build_estimator<F, E, D, L>(
        &self,
        encoder: E,
        decoder: D,
        loss_fn: L,
        vs: &nn::Path,
        input_dim: usize,
    ) -> Estimator<F, E, D, L> {
        Estimator::new(
            encoder,
            decoder,
            loss_fn,
            self.baseline.build_baseline(vs, input_dim),
        )
        .with_entropy_coeffs(self.encoder_entropy_coeff, self.decoder_entropy_coeff)
    }
}
