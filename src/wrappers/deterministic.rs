use super::{Decoder, DecoderOutput, LatentModule};
use std::fmt;
use tch::{Kind, Tensor};

/// Makes a deterministic agent usable where a sampling decoder is expected.
///
/// The agent output is passed through as is. No sampling is done and no randomness is consumed.
/// The log probability and entropy are zero placeholders of shape `[1]`.
#[derive(Clone)]
pub struct DeterministicWrapper<A> {
    agent: A,
}

impl<A> DeterministicWrapper<A> {
    pub const fn new(agent: A) -> Self {
        Self { agent }
    }
}

impl<A: fmt::Debug> fmt::Debug for DeterministicWrapper<A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DeterministicWrapper")
            .field("agent", &self.agent)
            .finish()
    }
}

impl<A: LatentModule> Decoder for DeterministicWrapper<A> {
    fn decode(&self, latent: &Tensor, input: &Tensor) -> DecoderOutput {
        let output = self.agent.forward(latent, input);
        let options = (Kind::Float, output.device());
        DecoderOutput {
            output,
            log_prob: Tensor::zeros(&[1], options),
            entropy: Tensor::zeros(&[1], options),
        }
    }
}
