//! Torch statistical distributions over discrete latents
//!
//! These types are all capable of representing a batch of distributions, with arbitrary batch
//! shape. The return values of statistics methods are tensors with the same batch shape.
mod bernoulli;
mod categorical;

pub use bernoulli::Bernoulli;
pub use categorical::Categorical;

use std::fmt;
use tch::{Kind, Tensor};

/// A (batch of) distribution(s) over discrete latent values.
pub trait LatentDistribution: fmt::Debug {
    /// Sample a batch of elements.
    ///
    /// Draws from the global torch random generator.
    ///
    /// # Returns
    /// A tensor of shape `[BATCH_SHAPE..., ELEMENT_SHAPE...]`
    fn sample(&self) -> Tensor;

    /// Log probabilities of the given elements
    ///
    /// # Args
    /// * `elements` - Elements from the distribution domains. One per distribution.
    ///                A tensor with shape `[BATCH_SHAPE..., ELEMENT_SHAPE...]`.
    ///
    /// # Returns
    /// A tensor of log probabilities with shape `[BATCH_SHAPE...]`.
    fn log_probs(&self, elements: &Tensor) -> Tensor;

    /// Distribution entropies.
    ///
    /// # Returns
    /// A tensor of entropies with shape `[BATCH_SHAPE...]`.
    fn entropy(&self) -> Tensor;

    /// The most probable element of each distribution.
    fn mode(&self) -> Tensor;
}

/// Clamp float values to be finite
fn clamp_float_finite(x: &Tensor) -> Result<Tensor, Kind> {
    match x.kind() {
        Kind::Float => Ok(x.clamp(f64::from(f32::MIN), f64::from(f32::MAX))),
        Kind::Double => Ok(x.clamp(f64::MIN, f64::MAX)),
        kind => Err(kind),
    }
}

/// Clamp float values to be >= the smallest finite float value.
fn clamp_float_min(x: &Tensor) -> Result<Tensor, Kind> {
    match x.kind() {
        Kind::Float => Ok(x.clamp_min(f64::from(f32::MIN))),
        Kind::Double => Ok(x.clamp_min(f64::MIN)),
        kind => Err(kind),
    }
}
