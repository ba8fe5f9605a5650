use super::{Decoder, DecoderOutput, Encoder, EncoderOutput, LatentModule};
use crate::distributions::LatentDistribution;
use crate::family::{BitVectorLatent, CategoricalLatent, LatentFamily};
use std::fmt;
use std::marker::PhantomData;
use tch::{nn, Tensor};

/// Wraps a score-producing agent and samples from the distribution its scores define.
///
/// As an [`Encoder`] the agent is a [`tch::nn::Module`] of the encoder input.
/// As a [`Decoder`] the agent is a [`LatentModule`] and the output is the sample, with the
/// raw scores returned in place of the log probability.
pub struct SamplingWrapper<A, F> {
    agent: A,
    family: PhantomData<fn() -> F>,
}

/// Samples one of `D` classes from a softmax over the scores.
pub type CategoricalWrapper<A> = SamplingWrapper<A, CategoricalLatent>;

/// Samples `D` independent bits with the scores as logits.
pub type BitVectorWrapper<A> = SamplingWrapper<A, BitVectorLatent>;

impl<A, F> SamplingWrapper<A, F> {
    pub const fn new(agent: A) -> Self {
        Self {
            agent,
            family: PhantomData,
        }
    }

    pub const fn agent(&self) -> &A {
        &self.agent
    }
}

impl<A> SamplingWrapper<A, CategoricalLatent> {
    pub const fn categorical(agent: A) -> Self {
        Self::new(agent)
    }
}

impl<A> SamplingWrapper<A, BitVectorLatent> {
    pub const fn bit_vector(agent: A) -> Self {
        Self::new(agent)
    }
}

impl<A: fmt::Debug, F: LatentFamily> fmt::Debug for SamplingWrapper<A, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SamplingWrapper")
            .field("agent", &self.agent)
            .field("family", &F::NAME)
            .finish()
    }
}

impl<A: Clone, F> Clone for SamplingWrapper<A, F> {
    fn clone(&self) -> Self {
        Self::new(self.agent.clone())
    }
}

/// Sample from the distribution defined by `scores`.
fn sample_scores<F: LatentFamily>(scores: Tensor) -> EncoderOutput {
    let distribution = F::distribution(&scores);
    let entropy = F::entropy(&distribution);
    let sample = distribution.sample();
    EncoderOutput {
        sample,
        scores,
        entropy,
    }
}

impl<A, F> Encoder for SamplingWrapper<A, F>
where
    A: nn::Module,
    F: LatentFamily,
{
    fn encode(&self, input: &Tensor) -> EncoderOutput {
        sample_scores::<F>(self.agent.forward(input))
    }
}

impl<A, F> Decoder for SamplingWrapper<A, F>
where
    A: LatentModule,
    F: LatentFamily,
{
    fn decode(&self, latent: &Tensor, input: &Tensor) -> DecoderOutput {
        let EncoderOutput {
            sample,
            scores,
            entropy,
        } = sample_scores::<F>(self.agent.forward(latent, input));
        DecoderOutput {
            output: sample,
            log_prob: scores,
            entropy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{Device, Kind};

    fn linear_agent(vs: &nn::VarStore, in_dim: i64, out_dim: i64) -> nn::Linear {
        nn::linear(&vs.root() / "agent", in_dim, out_dim, Default::default())
    }

    #[test]
    fn categorical_encode_shapes() {
        tch::manual_seed(0);
        let vs = nn::VarStore::new(Device::Cpu);
        let encoder = SamplingWrapper::categorical(linear_agent(&vs, 10, 3));
        let output = encoder.encode(&Tensor::ones(&[4, 10], (Kind::Float, Device::Cpu)));
        assert_eq!(output.sample.size(), [4]);
        assert_eq!(output.sample.kind(), Kind::Int64);
        assert_eq!(output.scores.size(), [4, 3]);
        assert_eq!(output.entropy.size(), [4]);
        assert!(bool::from(output.entropy.greater(0.0).all()));
        assert!(bool::from(output.sample.less(3_i64).all()));
    }

    #[test]
    fn bit_vector_encode_shapes() {
        tch::manual_seed(0);
        let vs = nn::VarStore::new(Device::Cpu);
        let encoder = SamplingWrapper::bit_vector(linear_agent(&vs, 10, 5));
        let output = encoder.encode(&Tensor::ones(&[4, 10], (Kind::Float, Device::Cpu)));
        assert_eq!(output.sample.size(), [4, 5]);
        assert_eq!(output.scores.size(), [4, 5]);
        assert_eq!(output.entropy.size(), [4]);
        // s * (s - 1) vanishes only for 0 and 1
        let off_binary = (&output.sample * (&output.sample - 1.0)).abs().sum(Kind::Float);
        assert_eq!(f64::from(&off_binary), 0.0);
    }

    #[test]
    fn scores_pass_through_unchanged() {
        let scores = Tensor::of_slice(&[0.1_f32, 0.7, -0.3, 2.0, 1.0, 0.0]).reshape(&[2, 3]);
        let fixed = scores.shallow_clone();
        let encoder = CategoricalWrapper::new(nn::func(move |_| fixed.shallow_clone()));
        let output = encoder.encode(&Tensor::zeros(&[2, 1], (Kind::Float, Device::Cpu)));
        assert_eq!(output.scores, scores);
    }

    #[test]
    fn decode_returns_scores_as_log_prob() {
        tch::manual_seed(0);
        let decoder = CategoricalWrapper::new(|latent: &Tensor, input: &Tensor| {
            latent.to_kind(Kind::Float).unsqueeze(-1) + input
        });
        let latent = Tensor::of_slice(&[0_i64, 1, 2]);
        let input = Tensor::zeros(&[3, 4], (Kind::Float, Device::Cpu));
        let output = decoder.decode(&latent, &input);
        assert_eq!(output.output.size(), [3]);
        assert_eq!(output.log_prob.size(), [3, 4]);
        assert_eq!(output.entropy.size(), [3]);
        // Uniform scores so every example has entropy ln(4)
        let expected = Tensor::ones(&[3], (Kind::Float, Device::Cpu)) * 4.0_f64.ln();
        assert!(output.entropy.allclose(&expected, 1e-6, 1e-6, false));
    }
}
