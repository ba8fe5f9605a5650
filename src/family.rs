//! Discrete latent families
//!
//! A family fixes how raw encoder scores become a distribution and how per-element statistics
//! of that distribution are reduced to one value per example.
use crate::distributions::{Bernoulli, Categorical, LatentDistribution};
use tch::{Kind, Tensor};

/// How the terms of the training signal are combined into a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Composition {
    /// Reduce each term to its batch mean then add the means.
    BatchMean,
    /// Add the terms for each example then take the batch mean of the sum.
    PerExample,
}

/// A family of discrete latent distributions parameterized by a score tensor.
pub trait LatentFamily {
    type Distribution: LatentDistribution + 'static;

    /// Name used in log messages.
    const NAME: &'static str;

    /// How [`Estimator`](crate::Estimator) combines its loss terms for this family.
    const COMPOSITION: Composition;

    /// Whether the estimator diagnostics carry the encoder distribution itself.
    const REPORTS_DISTRIBUTION: bool;

    /// Construct the batch of distributions for scores of shape `[BATCH, D]`.
    fn distribution(scores: &Tensor) -> Self::Distribution;

    /// Log probability of each example's sample. Shape `[BATCH]`.
    fn sample_log_prob(distribution: &Self::Distribution, sample: &Tensor) -> Tensor;

    /// Entropy of each example's distribution. Shape `[BATCH]`.
    fn entropy(distribution: &Self::Distribution) -> Tensor;

    /// The deterministic decision of each example: the most probable latent value.
    fn hard_decision(distribution: &Self::Distribution) -> Tensor {
        distribution.mode()
    }
}

/// One-of-K latents; softmax over the scores of each example.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CategoricalLatent;

impl LatentFamily for CategoricalLatent {
    type Distribution = Categorical;

    const NAME: &'static str = "categorical";
    const COMPOSITION: Composition = Composition::BatchMean;
    const REPORTS_DISTRIBUTION: bool = false;

    fn distribution(scores: &Tensor) -> Self::Distribution {
        Categorical::new(scores)
    }

    fn sample_log_prob(distribution: &Self::Distribution, sample: &Tensor) -> Tensor {
        distribution.log_probs(sample)
    }

    fn entropy(distribution: &Self::Distribution) -> Tensor {
        distribution.entropy()
    }
}

/// Bit-vector latents; one independent Bernoulli per score with the score as its logit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitVectorLatent;

impl LatentFamily for BitVectorLatent {
    type Distribution = Bernoulli;

    const NAME: &'static str = "bit-vector";
    const COMPOSITION: Composition = Composition::PerExample;
    const REPORTS_DISTRIBUTION: bool = true;

    fn distribution(scores: &Tensor) -> Self::Distribution {
        Bernoulli::new(scores.shallow_clone())
    }

    /// Sum of the bit log probabilities.
    fn sample_log_prob(distribution: &Self::Distribution, sample: &Tensor) -> Tensor {
        distribution
            .log_probs(sample)
            .sum_dim_intlist(&[1], false, Kind::Float)
    }

    /// Sum (not mean) of the bit entropies.
    fn entropy(distribution: &Self::Distribution) -> Tensor {
        distribution
            .entropy()
            .sum_dim_intlist(&[1], false, Kind::Float)
    }
}
