//! Activation functions
use serde::{Deserialize, Serialize};
use tch::{nn, Tensor};

/// Activation functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activation {
    /// No transformation
    Identity,
    /// Rectified linear
    Relu,
}

impl Default for Activation {
    fn default() -> Self {
        Self::Relu
    }
}

impl Activation {
    /// Create a module encapsulating this function if not the identity.
    pub fn maybe_module(self) -> Option<nn::Func<'static>> {
        match self {
            Self::Identity => None,
            Self::Relu => Some(self.module()),
        }
    }

    /// Create a module encapsulating this function.
    pub fn module(self) -> nn::Func<'static> {
        match self {
            Self::Identity => nn::func(Tensor::shallow_clone),
            Self::Relu => nn::func(Tensor::relu),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::nn::Module;

    #[test]
    fn identity_has_no_module() {
        assert!(Activation::Identity.maybe_module().is_none());
    }

    #[test]
    fn relu_forward() {
        let x = Tensor::of_slice(&[-2.0, -1.0, 0.0, 1.0, 2.0]);
        let expected = Tensor::of_slice(&[0.0, 0.0, 0.0, 1.0, 2.0]);
        assert_eq!(Activation::Relu.module().forward(&x), expected);
    }

    #[test]
    fn identity_forward_unchanged() {
        let x = Tensor::of_slice(&[-2.0, 0.0, 3.5]);
        assert_eq!(Activation::Identity.module().forward(&x), x);
    }

    #[test]
    fn relu_nonnegative() {
        let x = Tensor::of_slice(&[f64::NEG_INFINITY, -2.0, -1.0, 0.0, 1.0, 2.0, f64::INFINITY]);
        let y = Activation::Relu.module().forward(&x);
        assert!(bool::from(y.greater_equal(0.0).all()));
    }
}
