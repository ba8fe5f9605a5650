//! Gradient estimators for models with discrete latent variables.
//!
//! Supports one-of-K (categorical) and bit-vector (independent Bernoulli) latents with
//! two estimators:
//! * NVIL: the score function estimator with a learned input-dependent baseline.
//! * SFE: the score function estimator with a running-average or resampled baseline.
#![warn(clippy::cast_lossless)]
#![warn(clippy::cast_possible_truncation)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::explicit_iter_loop)]
#![warn(clippy::missing_const_for_fn)] // has some false positives
#![warn(clippy::needless_borrow)]
#![warn(clippy::needless_pass_by_value)]
#![warn(clippy::redundant_closure_for_method_calls)]
#![warn(clippy::use_self)] // also triggered by macro expansions
pub mod baselines;
pub mod diagnostics;
pub mod distributions;
mod error;
pub mod estimator;
pub mod family;
pub mod modules;
pub mod utils;
pub mod wrappers;

pub use baselines::{Baseline, BaselineNetwork, BaselineType, EstimatorKind, RunningMean};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::EstimatorError;
pub use estimator::{
    BitVectorEstimator, CategoricalEstimator, Estimator, EstimatorConfig, EstimatorOutput,
    LossTerms, Mode, TaskLoss,
};
pub use family::{BitVectorLatent, CategoricalLatent, Composition, LatentFamily};
pub use wrappers::{
    BitVectorWrapper, CategoricalWrapper, Decoder, DecoderOutput, DeterministicWrapper, Encoder,
    EncoderOutput, LatentModule, SamplingWrapper,
};
