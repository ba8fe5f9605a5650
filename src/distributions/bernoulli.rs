//! Bernoulli distribution
use super::{clamp_float_finite, LatentDistribution};
use once_cell::sync::OnceCell;
use tch::{Kind, Reduction, Tensor};

/// Bernoulli distribution(s).
///
/// Each element of the batch is an independent bit.
#[derive(Debug)]
pub struct Bernoulli {
    /// Logits
    ///
    /// A float tensor of shape `[BATCH_SHAPE...]`.
    /// `logits_i = log(p_i / (1 - p_i))`
    logits: Tensor,
    /// Cached probabilities
    probs: OnceCell<Tensor>,
}

impl Bernoulli {
    /// Initialize from logits
    #[must_use]
    pub fn new(logits: Tensor) -> Self {
        Self {
            logits,
            probs: OnceCell::new(),
        }
    }

    pub const fn logits(&self) -> &Tensor {
        &self.logits
    }

    /// Probability of each bit being set.
    pub fn probs(&self) -> &Tensor {
        self.probs.get_or_init(|| self.logits.sigmoid())
    }

    fn finite_logits(&self) -> Tensor {
        clamp_float_finite(&self.logits)
            .unwrap_or_else(|kind| panic!("logits must be f32 or f64, not {:?}", kind))
    }
}

impl LatentDistribution for Bernoulli {
    /// Samples are float tensors of 0.0 and 1.0
    fn sample(&self) -> Tensor {
        self.probs().bernoulli()
    }

    fn log_probs(&self, elements: &Tensor) -> Tensor {
        -self
            .finite_logits()
            .binary_cross_entropy_with_logits::<&Tensor>(
                &elements.to_kind(self.logits.kind()),
                None,
                None,
                Reduction::None,
            )
    }

    fn entropy(&self) -> Tensor {
        self.finite_logits()
            .binary_cross_entropy_with_logits::<&Tensor>(
                self.probs(),
                None,
                None,
                Reduction::None,
            )
    }

    fn mode(&self) -> Tensor {
        self.logits.gt(0.0).to_kind(Kind::Float)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::IndexOp;

    #[test]
    fn sample() {
        let logits = Tensor::of_slice(&[f32::NEG_INFINITY, -1000.0, 0.0, 1000.0, f32::INFINITY]);
        let d = Bernoulli::new(logits);
        let samples = d.sample();
        assert_eq!(samples.size(), [5]);
        assert_eq!(samples.kind(), Kind::Float);

        let samples_vec: Vec<f32> = samples.into();
        assert_eq!(samples_vec[0], 0.0);
        assert_eq!(samples_vec[1], 0.0);
        assert!(samples_vec[2] == 0.0 || samples_vec[2] == 1.0);
        assert_eq!(samples_vec[3], 1.0);
        assert_eq!(samples_vec[4], 1.0);
    }

    #[test]
    fn log_probs() {
        // Use f64 in calculations for reduced error
        #[allow(clippy::cast_possible_truncation)]
        fn log_sigmoid(logit: f64) -> f32 {
            -(-logit).exp().ln_1p() as f32
        }

        let logits = Tensor::of_slice(&[f32::NEG_INFINITY, -2.0, 0.0, 1.0, 1.0, f32::INFINITY]);
        let d = Bernoulli::new(logits);
        let log_probs = d.log_probs(&Tensor::of_slice(&[1.0_f32, 1.0, 1.0, 1.0, 0.0, 1.0]));
        assert_eq!(log_probs.size(), [6]);

        let expected = [
            f32::NEG_INFINITY,
            log_sigmoid(-2.0),
            (0.5f32).ln(),
            log_sigmoid(1.0),
            log_sigmoid(-1.0),
            0.0,
        ];
        // Exclude the first element from comparison, might be NEG_INFINITY or just very negative
        assert!(
            log_probs
                .i(1..)
                .allclose(&Tensor::of_slice(&expected[1..]), 1e-5, 1e-8, false),
            "\nlog_probs: {log_probs:?}\nexpected:  {expected:?}\n"
        );
        // Check that the first element is very negative
        assert!(f32::from(log_probs.i(0)) <= f32::MIN / 2.0);
        assert!(bool::from(log_probs.less_equal(0.0).all()));
    }

    #[test]
    fn entropies() {
        // Use f64 in calculations for reduced error
        #[allow(clippy::cast_possible_truncation)]
        fn logit_entropy(logit: f64) -> f32 {
            let p = (1.0 + (-logit).exp()).recip();
            let h = -p * p.ln() - (1.0 - p) * (1.0 - p).ln();
            h as f32
        }

        let logits = Tensor::of_slice(&[f32::NEG_INFINITY, -2.0, 0.0, 1.0, f32::INFINITY]);
        let d = Bernoulli::new(logits);
        let entropies = d.entropy();
        assert_eq!(entropies.size(), [5]);

        let expected = [
            0.0,
            logit_entropy(-2.0),
            -(0.5f32).ln(),
            logit_entropy(1.0),
            0.0,
        ];
        assert!(
            entropies.allclose(&Tensor::of_slice(&expected), 1e-5, 1e-8, false),
            "\nentropies: {entropies:?}\nexpected:  {expected:?}\n"
        );
    }

    #[test]
    fn mode() {
        let logits = Tensor::of_slice(&[-1.0_f32, 0.0, 0.5, 3.0]);
        let d = Bernoulli::new(logits);
        assert_eq!(d.mode(), Tensor::of_slice(&[0.0_f32, 0.0, 1.0, 1.0]));
    }
}
