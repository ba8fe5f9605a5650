use crate::diagnostics::tensor_mean;
use crate::utils::stats::OnlineMean;
use serde::{Deserialize, Serialize};
use tch::Tensor;

/// Running average of the batch-mean task loss.
///
/// The same scalar serves as the baseline for every example of a batch.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningMean {
    stats: OnlineMean<f64>,
}

impl RunningMean {
    /// Resume from the mean of `count` previous batches.
    pub const fn from_parts(mean: f64, count: u64) -> Self {
        Self {
            stats: OnlineMean::from_parts(mean, count),
        }
    }

    pub fn mean(&self) -> f64 {
        self.stats.mean()
    }

    /// Number of batches observed.
    pub const fn count(&self) -> u64 {
        self.stats.count()
    }

    /// Current baseline value as a 0-dim tensor.
    pub fn value(&self) -> Tensor {
        Tensor::from(self.mean())
    }

    /// State after observing one more batch of task losses.
    ///
    /// Gradients are not tracked through the observed loss.
    #[must_use]
    pub fn update(self, loss: &Tensor) -> Self {
        Self {
            stats: self.stats.push(tensor_mean(loss)),
        }
    }
}
