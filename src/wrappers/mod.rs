//! Sampling wrappers
//!
//! Wrappers turn an agent that produces raw scores into an [`Encoder`] or [`Decoder`] that
//! produces a discrete sample together with the statistics an estimator needs.
mod deterministic;
mod sampling;

pub use deterministic::DeterministicWrapper;
pub use sampling::{BitVectorWrapper, CategoricalWrapper, SamplingWrapper};

use tch::Tensor;

/// Output of an [`Encoder`].
#[derive(Debug)]
pub struct EncoderOutput {
    /// Discrete latent sample. `[BATCH]` (categorical) or `[BATCH, D]` (bit-vector).
    pub sample: Tensor,
    /// Raw scores the sample was drawn from. `[BATCH, D]`.
    pub scores: Tensor,
    /// Entropy of each example's distribution. `[BATCH]`.
    pub entropy: Tensor,
}

/// Output of a [`Decoder`].
#[derive(Debug)]
pub struct DecoderOutput {
    /// Decoder output passed to the task loss.
    pub output: Tensor,
    /// Either the log probability of `output` (`[BATCH]` or a broadcastable placeholder)
    /// or the logits it was sampled from (`[BATCH, K]`).
    pub log_prob: Tensor,
    /// Entropy of the decoder distribution; `[BATCH]` or a broadcastable placeholder.
    pub entropy: Tensor,
}

/// Maps encoder input to a discrete latent sample.
pub trait Encoder {
    fn encode(&self, input: &Tensor) -> EncoderOutput;
}

/// Maps a latent sample and auxiliary input to a task-relevant output.
pub trait Decoder {
    fn decode(&self, latent: &Tensor, input: &Tensor) -> DecoderOutput;
}

/// A module of a latent sample and an auxiliary input.
pub trait LatentModule {
    fn forward(&self, latent: &Tensor, input: &Tensor) -> Tensor;
}

impl<F> LatentModule for F
where
    F: Fn(&Tensor, &Tensor) -> Tensor,
{
    fn forward(&self, latent: &Tensor, input: &Tensor) -> Tensor {
        self(latent, input)
    }
}

impl<T: Encoder + ?Sized> Encoder for Box<T> {
    fn encode(&self, input: &Tensor) -> EncoderOutput {
        T::encode(self, input)
    }
}

impl<T: Decoder + ?Sized> Decoder for Box<T> {
    fn decode(&self, latent: &Tensor, input: &Tensor) -> DecoderOutput {
        T::decode(self, latent, input)
    }
}
