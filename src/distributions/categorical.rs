//! Categorical distribution
use super::{clamp_float_min, LatentDistribution};
use tch::{Kind, Tensor};

/// Categorical distribution(s).
#[derive(Debug)]
pub struct Categorical {
    /// Log probability of each event.
    ///
    /// An f32 tensor of shape `[BATCH_SHAPE.., NUM_EVENTS]`.
    logits: Tensor,
}

impl Categorical {
    /// Initialize from possibly unnormalized log probabilities.
    ///
    /// The log probabilities are normalized by adding some value `C` to each
    /// such that `sum_i exp(log_prob[i] + C) = 1`.
    pub fn new(logits: &Tensor) -> Self {
        Self {
            logits: logits.log_softmax(-1, Kind::Float),
        }
    }

    /// Normalized log probabilities of each event.
    pub const fn logits(&self) -> &Tensor {
        &self.logits
    }
}

impl LatentDistribution for Categorical {
    /// Samples are int64 event indices
    fn sample(&self) -> Tensor {
        self.logits.exp().multinomial(1, true).squeeze_dim(-1)
    }

    fn log_probs(&self, elements: &Tensor) -> Tensor {
        self.logits
            .gather(-1, &elements.to_kind(Kind::Int64).unsqueeze(-1), false)
            .squeeze_dim(-1)
    }

    fn entropy(&self) -> Tensor {
        let clamped_logits = clamp_float_min(&self.logits)
            .unwrap_or_else(|kind| panic!("logits must be f32 or f64, not {:?}", kind));
        -(clamped_logits * self.logits.exp()).sum_dim_intlist(&[-1], false, Kind::Float)
    }

    fn mode(&self) -> Tensor {
        self.logits.argmax(-1, false)
    }
}
