use crate::modules::{Activation, MlpConfig};
use tch::{nn, nn::Module, Kind, Tensor};

/// Learned baseline: a feed-forward regressor from the encoder input to one value per example.
///
/// Has no optimizer of its own. Its variables are trained by whatever optimizer minimizes the
/// estimator loss, through the squared-error term that estimator adds.
#[derive(Debug)]
pub struct BaselineNetwork {
    module: nn::Sequential,
    input_dim: i64,
}

impl BaselineNetwork {
    /// Three hidden layers of width 512 with ReLU activations and a linear scalar output.
    pub fn default_config() -> MlpConfig {
        MlpConfig {
            hidden_sizes: vec![512, 512, 512],
            activation: Activation::Relu,
            output_activation: Activation::Identity,
        }
    }

    /// Build the default baseline network with variables under `vs`.
    pub fn new(vs: &nn::Path, input_dim: usize) -> Self {
        Self::with_config(vs, input_dim, &Self::default_config())
    }

    /// Build a baseline network with a custom architecture. The output dimension is always 1.
    #[allow(clippy::cast_possible_wrap)]
    pub fn with_config(vs: &nn::Path, input_dim: usize, config: &MlpConfig) -> Self {
        Self {
            module: config.build_module(vs, input_dim, 1),
            input_dim: input_dim as i64,
        }
    }

    /// Baseline value for each of `batch_size` examples.
    ///
    /// The input is flattened to rows of `input_dim` values.
    /// If there are several rows per example, the row values are averaged per example.
    ///
    /// # Returns
    /// A tensor of shape `[batch_size]`.
    pub fn forward(&self, input: &Tensor, batch_size: i64) -> Tensor {
        self.module
            .forward(&input.reshape(&[-1, self.input_dim]))
            .squeeze_dim(-1)
            .reshape(&[-1, batch_size])
            .mean_dim(&[0], false, Kind::Float)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::Device;

    #[test]
    fn one_value_per_example() {
        let vs = nn::VarStore::new(Device::Cpu);
        let network = BaselineNetwork::new(&vs.root(), 6);
        let input = Tensor::randn(&[4, 6], (Kind::Float, Device::Cpu));
        assert_eq!(network.forward(&input, 4).size(), [4]);
    }

    #[test]
    fn flattens_input() {
        let vs = nn::VarStore::new(Device::Cpu);
        let network = BaselineNetwork::new(&vs.root(), 6);
        let input = Tensor::randn(&[4, 2, 3], (Kind::Float, Device::Cpu));
        let flat = input.reshape(&[4, 6]);
        assert_eq!(network.forward(&input, 4), network.forward(&flat, 4));
    }

    #[test]
    fn averages_rows_per_example() {
        let vs = nn::VarStore::new(Device::Cpu);
        let network = BaselineNetwork::new(&vs.root(), 3);
        let first = Tensor::randn(&[2, 3], (Kind::Float, Device::Cpu));
        let second = Tensor::randn(&[2, 3], (Kind::Float, Device::Cpu));
        let stacked = Tensor::cat(&[&first, &second], 0);
        let expected = (network.forward(&first, 2) + network.forward(&second, 2)) / 2.0;
        assert!(network
            .forward(&stacked, 2)
            .allclose(&expected, 1e-5, 1e-6, false));
    }

    #[test]
    fn default_architecture() {
        let vs = nn::VarStore::new(Device::Cpu);
        let _ = BaselineNetwork::new(&vs.root(), 10);
        let variables = vs.variables();
        assert_eq!(variables["layer_0.weight"].size(), [512, 10]);
        assert_eq!(variables["layer_1.weight"].size(), [512, 512]);
        assert_eq!(variables["layer_2.weight"].size(), [512, 512]);
        assert_eq!(variables["layer_3.weight"].size(), [1, 512]);
    }
}
