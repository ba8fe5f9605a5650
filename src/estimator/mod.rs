//! Gradient estimators for discrete latent variables
//!
//! One forward pass encodes, decodes, evaluates the task loss, and combines
//! * a policy-gradient surrogate `detach(loss - baseline) * log_prob(sample)`,
//! * the task loss itself,
//! * entropy regularization, and
//! * for NVIL, the squared error of the learned baseline against the detached loss
//!
//! into a single scalar whose gradient is the estimator.
mod config;

pub use config::EstimatorConfig;

use crate::baselines::{Baseline, BaselineNetwork, BaselineType, EstimatorKind, RunningMean};
use crate::diagnostics::{tensor_mean, Diagnostic, Diagnostics};
use crate::distributions::{Categorical, LatentDistribution};
use crate::error::EstimatorError;
use crate::family::{BitVectorLatent, CategoricalLatent, Composition, LatentFamily};
use crate::wrappers::{Decoder, DecoderOutput, Encoder, EncoderOutput};
use log::{debug, warn};
use std::fmt;
use std::marker::PhantomData;
use tch::{Kind, Tensor};

/// Task-specific loss.
pub trait TaskLoss {
    /// Per-example loss and diagnostics.
    ///
    /// # Args
    /// * `encoder_input`  - Input given to the encoder.
    /// * `decision`       - Deterministic decision from the encoder scores
    ///                      (or the alternative sample during a resampled rollout).
    /// * `decoder_input`  - Auxiliary input given to the decoder.
    /// * `decoder_output` - Decoder output.
    /// * `labels`         - Targets.
    ///
    /// # Returns
    /// A loss tensor of shape `[BATCH]` and diagnostics for the batch.
    fn loss(
        &self,
        encoder_input: &Tensor,
        decision: &Tensor,
        decoder_input: &Tensor,
        decoder_output: &Tensor,
        labels: &Tensor,
    ) -> (Tensor, Diagnostics);
}

impl<F> TaskLoss for F
where
    F: Fn(&Tensor, &Tensor, &Tensor, &Tensor, &Tensor) -> (Tensor, Diagnostics),
{
    fn loss(
        &self,
        encoder_input: &Tensor,
        decision: &Tensor,
        decoder_input: &Tensor,
        decoder_output: &Tensor,
        labels: &Tensor,
    ) -> (Tensor, Diagnostics) {
        self(
            encoder_input,
            decision,
            decoder_input,
            decoder_output,
            labels,
        )
    }
}

/// Estimator mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Running baselines are updated on every forward pass.
    Training,
    /// No estimator state changes.
    Evaluation,
}

impl Default for Mode {
    fn default() -> Self {
        Self::Training
    }
}

/// The batch-mean value of each term of the training signal.
///
/// These remain attached to the computation graph.
#[derive(Debug)]
pub struct LossTerms {
    /// Policy-gradient surrogate.
    pub policy: Tensor,
    /// Task loss.
    pub task: Tensor,
    /// Negative weighted entropy.
    pub entropy: Tensor,
    /// Squared error of the learned baseline. NVIL only.
    pub mse: Option<Tensor>,
}

/// Training signal from one forward pass.
#[derive(Debug)]
pub struct EstimatorOutput {
    /// Scalar to minimize.
    pub loss: Tensor,
    /// Diagnostics with every per-example entry reduced to its mean.
    ///
    /// `baseline` is the mean of the baseline used in this pass, so for a running average it is
    /// the value from before this pass updated it.
    pub log: Diagnostics,
    /// The terms that make up `loss`, still attached to the graph.
    pub terms: LossTerms,
}

/// Gradient estimator for a discrete latent model.
///
/// Generic over the latent family `F`, the encoder `E`, the decoder `D` and the task loss `L`.
/// The estimator kind (NVIL or score function) follows from the baseline policy.
pub struct Estimator<F, E, D, L> {
    encoder: E,
    decoder: D,
    loss_fn: L,
    encoder_entropy_coeff: f64,
    decoder_entropy_coeff: f64,
    baseline: Baseline,
    mode: Mode,
    family: PhantomData<fn() -> F>,
}

/// Estimator for one-of-K latents.
pub type CategoricalEstimator<E, D, L> = Estimator<CategoricalLatent, E, D, L>;

/// Estimator for bit-vector latents.
pub type BitVectorEstimator<E, D, L> = Estimator<BitVectorLatent, E, D, L>;

impl<F, E, D, L> Estimator<F, E, D, L> {
    /// Create an estimator with the given baseline and zero entropy coefficients.
    pub const fn new(encoder: E, decoder: D, loss_fn: L, baseline: Baseline) -> Self {
        Self {
            encoder,
            decoder,
            loss_fn,
            encoder_entropy_coeff: 0.0,
            decoder_entropy_coeff: 0.0,
            baseline,
            mode: Mode::Training,
            family: PhantomData,
        }
    }

    /// NVIL estimator with a learned baseline network.
    pub const fn nvil(encoder: E, decoder: D, loss_fn: L, network: BaselineNetwork) -> Self {
        Self::new(encoder, decoder, loss_fn, Baseline::LearnedNetwork(network))
    }

    /// Score function estimator.
    ///
    /// # Args
    /// * `baseline_type` - `"runavg"` or `"sample"`.
    ///
    /// # Errors
    /// [`EstimatorError::UnsupportedBaseline`] for any other baseline type.
    pub fn score_function(
        encoder: E,
        decoder: D,
        loss_fn: L,
        baseline_type: &str,
    ) -> Result<Self, EstimatorError> {
        let baseline = match baseline_type.parse()? {
            BaselineType::RunningAverage => Baseline::RunningAverage(RunningMean::default()),
            BaselineType::Sample => Baseline::ResampledRollout,
            BaselineType::Nvil => {
                return Err(EstimatorError::UnsupportedBaseline(baseline_type.into()))
            }
        };
        Ok(Self::new(encoder, decoder, loss_fn, baseline))
    }

    /// Set the entropy regularization coefficients.
    #[must_use]
    pub fn with_entropy_coeffs(
        mut self,
        encoder_entropy_coeff: f64,
        decoder_entropy_coeff: f64,
    ) -> Self {
        self.encoder_entropy_coeff = encoder_entropy_coeff;
        self.decoder_entropy_coeff = decoder_entropy_coeff;
        self
    }

    pub const fn kind(&self) -> EstimatorKind {
        self.baseline.kind()
    }

    pub const fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    /// Running-average baseline state, if that is the baseline policy.
    pub fn running_mean(&self) -> Option<RunningMean> {
        match &self.baseline {
            Baseline::RunningAverage(running_mean) => Some(*running_mean),
            _ => None,
        }
    }

    pub const fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn train(&mut self) {
        self.set_mode(Mode::Training)
    }

    pub fn eval(&mut self) {
        self.set_mode(Mode::Evaluation)
    }

    pub const fn encoder(&self) -> &E {
        &self.encoder
    }

    pub const fn decoder(&self) -> &D {
        &self.decoder
    }
}

impl<F, E, D, L> Estimator<F, E, D, L>
where
    F: LatentFamily,
    E: Encoder,
    D: Decoder,
    L: TaskLoss,
{
    /// Run one forward pass and compose the training signal.
    ///
    /// In training mode this also advances a running-average baseline.
    ///
    /// Score function estimators of both families include the decoder log probability and
    /// decoder entropy terms. These vanish for a [`DeterministicWrapper`] decoder.
    ///
    /// [`DeterministicWrapper`]: crate::wrappers::DeterministicWrapper
    ///
    /// # Errors
    /// [`EstimatorError::LossShape`] if the task loss is not one value per example.
    pub fn forward(
        &mut self,
        encoder_input: &Tensor,
        decoder_input: &Tensor,
        labels: &Tensor,
    ) -> Result<EstimatorOutput, EstimatorError> {
        let EncoderOutput {
            sample,
            scores,
            entropy: encoder_entropy,
        } = self.encoder.encode(encoder_input);
        let decoded = self.decoder.decode(&sample, decoder_input);

        let distribution = F::distribution(&scores);
        let decision = F::hard_decision(&distribution);
        let (loss, task_log) = self.loss_fn.loss(
            encoder_input,
            &decision,
            decoder_input,
            &decoded.output,
            labels,
        );
        let batch_size = match loss.size()[..] {
            [batch_size] => batch_size,
            _ => return Err(EstimatorError::LossShape { shape: loss.size() }),
        };

        let encoder_log_prob = F::sample_log_prob(&distribution, &sample);

        let kind = self.kind();
        let (log_prob, decoder_entropy) = match kind {
            EstimatorKind::Nvil => (encoder_log_prob, None),
            EstimatorKind::ScoreFunction => (
                encoder_log_prob + decoder_sample_log_prob(&decoded),
                Some(decoded.entropy),
            ),
        };

        let baseline = match &self.baseline {
            Baseline::LearnedNetwork(network) => network.forward(encoder_input, batch_size),
            Baseline::RunningAverage(running_mean) => running_mean.value(),
            Baseline::ResampledRollout => tch::no_grad(|| {
                self.rollout_loss(&distribution, encoder_input, decoder_input, labels)
            }),
        };

        let policy = (&loss - &baseline).detach() * &log_prob;
        let mse = match kind {
            EstimatorKind::Nvil => {
                let residual = loss.detach() - &baseline;
                Some(&residual * &residual)
            }
            EstimatorKind::ScoreFunction => None,
        };

        let (full_loss, terms) = match F::COMPOSITION {
            Composition::BatchMean => {
                let policy = policy.mean(Kind::Float);
                let task = loss.mean(Kind::Float);
                let encoder_term = encoder_entropy.mean(Kind::Float) * self.encoder_entropy_coeff;
                let entropy = -match &decoder_entropy {
                    Some(decoder_entropy) => {
                        encoder_term
                            + decoder_entropy.mean(Kind::Float) * self.decoder_entropy_coeff
                    }
                    None => encoder_term,
                };
                let mse = mse.map(|mse| mse.mean(Kind::Float));

                let full_loss = match &mse {
                    Some(mse) => &policy + &task + mse + &entropy,
                    None => &policy + &entropy + &task,
                };
                let terms = LossTerms {
                    policy,
                    task,
                    entropy,
                    mse,
                };
                (full_loss, terms)
            }
            Composition::PerExample => {
                let encoder_term = &encoder_entropy * self.encoder_entropy_coeff;
                let entropy = -match &decoder_entropy {
                    Some(decoder_entropy) => {
                        encoder_term + decoder_entropy * self.decoder_entropy_coeff
                    }
                    None => encoder_term,
                };

                let per_example = match &mse {
                    Some(mse) => &policy + &loss + mse + &entropy,
                    None => &policy + &entropy + &loss,
                };
                let terms = LossTerms {
                    policy: policy.mean(Kind::Float),
                    task: loss.mean(Kind::Float),
                    entropy: entropy.mean(Kind::Float),
                    mse: mse.map(|mse| mse.mean(Kind::Float)),
                };
                (per_example.mean(Kind::Float), terms)
            }
        };

        if self.mode == Mode::Training {
            if let Baseline::RunningAverage(running_mean) = &mut self.baseline {
                *running_mean = running_mean.update(&loss);
            }
        }

        let mut log = task_log.reduced();
        let baseline_value = tensor_mean(&baseline);
        log.insert("baseline", baseline_value);
        log.insert("loss", tensor_mean(&loss));
        log.insert("encoder_entropy", tensor_mean(&encoder_entropy));
        if let Some(decoder_entropy) = &decoder_entropy {
            log.insert("decoder_entropy", tensor_mean(decoder_entropy));
        }
        log.insert("policy_loss", tensor_mean(&terms.policy));
        if let Some(mse) = &terms.mse {
            log.insert("mse", tensor_mean(mse));
        }
        if F::REPORTS_DISTRIBUTION {
            log.insert("distr", Diagnostic::Distribution(Box::new(distribution)));
        }

        let full_loss_value = tensor_mean(&full_loss);
        if full_loss_value.is_finite() {
            debug!(
                "{} {:?} estimator: loss {:.6}, baseline {:.6}",
                F::NAME,
                kind,
                full_loss_value,
                baseline_value
            );
        } else {
            warn!(
                "{} {:?} estimator: non-finite training signal {}",
                F::NAME,
                kind,
                full_loss_value
            );
        }

        Ok(EstimatorOutput {
            loss: full_loss,
            log,
            terms,
        })
    }

    /// Task loss of an independent alternative sample from the encoder distribution.
    fn rollout_loss(
        &self,
        distribution: &F::Distribution,
        encoder_input: &Tensor,
        decoder_input: &Tensor,
        labels: &Tensor,
    ) -> Tensor {
        let alt_sample = distribution.sample().detach();
        let decoded = self.decoder.decode(&alt_sample, decoder_input);
        let (loss, _) = self.loss_fn.loss(
            encoder_input,
            &alt_sample,
            decoder_input,
            &decoded.output,
            labels,
        );
        loss.detach()
    }
}

/// Log probability of the decoder output.
///
/// A multi-dimensional `log_prob` holds the logits the output was sampled from.
fn decoder_sample_log_prob(decoded: &DecoderOutput) -> Tensor {
    if decoded.log_prob.dim() > 1 {
        Categorical::new(&decoded.log_prob).log_probs(&decoded.output)
    } else {
        decoded.log_prob.shallow_clone()
    }
}

impl<F: LatentFamily, E, D, L> fmt::Debug for Estimator<F, E, D, L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Estimator")
            .field("family", &F::NAME)
            .field("kind", &self.kind())
            .field("encoder_entropy_coeff", &self.encoder_entropy_coeff)
            .field("decoder_entropy_coeff", &self.decoder_entropy_coeff)
            .field("baseline", &self.baseline)
            .field("mode", &self.mode)
            .finish()
    }
}
