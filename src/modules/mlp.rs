//! Multi-layer perceptron
use super::Activation;
use serde::{Deserialize, Serialize};
use std::iter;
use tch::nn;

/// Multi-Layer Perceptron Configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MlpConfig {
    /// Sizes of the hidden layers
    pub hidden_sizes: Vec<usize>,
    /// Activation function between hidden layers.
    pub activation: Activation,
    /// Activation function on the output.
    pub output_activation: Activation,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            hidden_sizes: vec![128],
            activation: Activation::Relu,
            output_activation: Activation::Identity,
        }
    }
}

impl MlpConfig {
    /// Build the network with variables stored under `vs`.
    ///
    /// Layer `i` stores its weights under `vs / "layer_{i}"`.
    #[allow(clippy::cast_possible_wrap)]
    pub fn build_module(
        &self,
        vs: &nn::Path,
        input_dim: usize,
        output_dim: usize,
    ) -> nn::Sequential {
        let iter_in_dim = iter::once(&input_dim).chain(self.hidden_sizes.iter());
        let iter_out_dim = self.hidden_sizes.iter().chain(iter::once(&output_dim));

        let mut layers = nn::seq();
        for (i, (&layer_in_dim, &layer_out_dim)) in iter_in_dim.zip(iter_out_dim).enumerate() {
            if i > 0 {
                if let Some(m) = self.activation.maybe_module() {
                    layers = layers.add(m);
                }
            }
            layers = layers.add(nn::linear(
                vs / format!("layer_{}", i),
                layer_in_dim as i64,
                layer_out_dim as i64,
                Default::default(),
            ));
        }

        if let Some(m) = self.output_activation.maybe_module() {
            layers = layers.add(m);
        }
        layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tch::{nn::Module, Device, Kind, Tensor};

    #[fixture]
    fn default_module() -> (nn::VarStore, nn::Sequential, usize, usize) {
        let in_dim = 3;
        let out_dim = 2;
        let config = MlpConfig::default();
        let vs = nn::VarStore::new(Device::Cpu);
        let module = config.build_module(&vs.root(), in_dim, out_dim);
        (vs, module, in_dim, out_dim)
    }

    #[rstest]
    fn forward_batch(default_module: (nn::VarStore, nn::Sequential, usize, usize)) {
        let (_vs, mlp, in_dim, out_dim) = default_module;
        let input = Tensor::ones(&[4, in_dim as i64], (Kind::Float, Device::Cpu));
        let output = mlp.forward(&input);
        assert_eq!(output.size(), [4, out_dim as i64]);
    }

    #[rstest]
    fn trainable_variable_count(default_module: (nn::VarStore, nn::Sequential, usize, usize)) {
        let (vs, _mlp, _, _) = default_module;
        // weight and bias for each of the 2 layers
        assert_eq!(vs.trainable_variables().len(), 4);
    }

    #[test]
    fn deep_config_variable_count() {
        let config = MlpConfig {
            hidden_sizes: vec![8, 8, 8],
            ..MlpConfig::default()
        };
        let vs = nn::VarStore::new(Device::Cpu);
        let _ = config.build_module(&vs.root(), 5, 1);
        assert_eq!(vs.trainable_variables().len(), 8);
    }

    #[test]
    fn config_serde_round_trip() {
        let config = MlpConfig {
            hidden_sizes: vec![512, 512],
            activation: Activation::Identity,
            output_activation: Activation::Relu,
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: MlpConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
