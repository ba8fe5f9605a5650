//! Variance-reduction baselines
mod network;
mod running_mean;

pub use network::BaselineNetwork;
pub use running_mean::RunningMean;

use crate::error::EstimatorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tch::nn;

/// Estimator family, determined by the baseline policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EstimatorKind {
    /// Neural variational inference and learning: learned baseline network.
    Nvil,
    /// Score function estimator (REINFORCE) with a running-average or resampled baseline.
    ScoreFunction,
}

/// A baseline policy and its state.
#[derive(Debug)]
pub enum Baseline {
    /// Regressor of the encoder input trained jointly through a squared-error term.
    LearnedNetwork(BaselineNetwork),
    /// Mean task loss over all previous training passes.
    RunningAverage(RunningMean),
    /// Task loss of an independent latent sample from the same encoder distribution.
    ResampledRollout,
}

impl Baseline {
    pub const fn kind(&self) -> EstimatorKind {
        match self {
            Self::LearnedNetwork(_) => EstimatorKind::Nvil,
            Self::RunningAverage(_) | Self::ResampledRollout => EstimatorKind::ScoreFunction,
        }
    }

    pub const fn baseline_type(&self) -> BaselineType {
        match self {
            Self::LearnedNetwork(_) => BaselineType::Nvil,
            Self::RunningAverage(_) => BaselineType::RunningAverage,
            Self::ResampledRollout => BaselineType::Sample,
        }
    }
}

impl From<BaselineNetwork> for Baseline {
    fn from(network: BaselineNetwork) -> Self {
        Self::LearnedNetwork(network)
    }
}

impl From<RunningMean> for Baseline {
    fn from(running_mean: RunningMean) -> Self {
        Self::RunningAverage(running_mean)
    }
}

/// Baseline policy tag as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum BaselineType {
    /// `"nvil"`
    Nvil,
    /// `"runavg"`
    RunningAverage,
    /// `"sample"`
    Sample,
}

impl Default for BaselineType {
    fn default() -> Self {
        Self::RunningAverage
    }
}

impl BaselineType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nvil => "nvil",
            Self::RunningAverage => "runavg",
            Self::Sample => "sample",
        }
    }

    /// Build a fresh baseline of this type.
    ///
    /// # Args
    /// * `vs` - Variable path for the baseline network; unused by the other policies.
    /// * `input_dim` - Flattened size of one encoder input row.
    pub fn build_baseline(self, vs: &nn::Path, input_dim: usize) -> Baseline {
        match self {
            Self::Nvil => Baseline::LearnedNetwork(BaselineNetwork::new(vs, input_dim)),
            Self::RunningAverage => Baseline::RunningAverage(RunningMean::default()),
            Self::Sample => Baseline::ResampledRollout,
        }
    }
}

impl fmt::Display for BaselineType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BaselineType {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nvil" => Ok(Self::Nvil),
            "runavg" => Ok(Self::RunningAverage),
            "sample" => Ok(Self::Sample),
            _ => Err(EstimatorError::UnsupportedBaseline(s.into())),
        }
    }
}

impl TryFrom<String> for BaselineType {
    type Error = EstimatorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<BaselineType> for &'static str {
    fn from(baseline_type: BaselineType) -> Self {
        baseline_type.as_str()
    }
}
