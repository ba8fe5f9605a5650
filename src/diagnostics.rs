//! Diagnostics reported alongside the training signal
use crate::distributions::LatentDistribution;
use std::collections::{btree_map, BTreeMap};
use tch::{Kind, Tensor};

/// A diagnostic value.
#[derive(Debug)]
pub enum Diagnostic {
    /// One value per example. Reduced to its mean before being returned by an estimator.
    PerExample(Tensor),
    /// A single value.
    Scalar(f64),
    /// A distribution object for downstream inspection. Never reduced.
    Distribution(Box<dyn LatentDistribution>),
}

impl Diagnostic {
    /// The scalar value, if this is (or has been reduced to) a scalar.
    pub const fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(value) => Some(*value),
            _ => None,
        }
    }

    /// Reduce per-example values to their mean; other values are unchanged.
    #[must_use]
    pub fn reduced(self) -> Self {
        match self {
            Self::PerExample(tensor) => Self::Scalar(tensor_mean(&tensor)),
            other => other,
        }
    }
}

impl From<f64> for Diagnostic {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<f32> for Diagnostic {
    fn from(value: f32) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<Tensor> for Diagnostic {
    fn from(tensor: Tensor) -> Self {
        Self::PerExample(tensor)
    }
}

/// Mean of all elements of a tensor, detached from the graph.
pub(crate) fn tensor_mean(tensor: &Tensor) -> f64 {
    f64::from(&tensor.detach().mean(Kind::Double))
}

/// Named diagnostic values, ordered by name.
#[derive(Debug, Default)]
pub struct Diagnostics(BTreeMap<String, Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous value with the same name.
    pub fn insert<S: Into<String>, V: Into<Diagnostic>>(&mut self, name: S, value: V) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Diagnostic> {
        self.0.get(name)
    }

    /// Scalar value with the given name.
    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Diagnostic::as_scalar)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<String, Diagnostic> {
        self.0.iter()
    }

    /// Reduce every per-example entry to its mean.
    #[must_use]
    pub fn reduced(self) -> Self {
        Self(
            self.0
                .into_iter()
                .map(|(name, value)| (name, value.reduced()))
                .collect(),
        )
    }
}

impl IntoIterator for Diagnostics {
    type Item = (String, Diagnostic);
    type IntoIter = btree_map::IntoIter<String, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<S: Into<String>, V: Into<Diagnostic>> FromIterator<(S, V)> for Diagnostics {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::Bernoulli;

    #[test]
    fn reduce_per_example_to_mean() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.insert("accuracy", Tensor::of_slice(&[1.0_f32, 0.0, 1.0, 1.0]));
        let reduced = diagnostics.reduced();
        assert_eq!(reduced.scalar("accuracy"), Some(0.75));
    }

    #[test]
    fn scalars_unchanged() {
        let diagnostics: Diagnostics = vec![("lr", 0.1_f64)].into_iter().collect();
        assert_eq!(diagnostics.reduced().scalar("lr"), Some(0.1));
    }

    #[test]
    fn distributions_not_reduced() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.insert(
            "distr",
            Diagnostic::Distribution(Box::new(Bernoulli::new(Tensor::of_slice(&[0.0_f32, 1.0])))),
        );
        let reduced = diagnostics.reduced();
        assert!(matches!(
            reduced.get("distr"),
            Some(Diagnostic::Distribution(_))
        ));
        assert_eq!(reduced.scalar("distr"), None);
    }

    #[test]
    fn insert_replaces() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.insert("loss", 1.0_f64);
        diagnostics.insert("loss", 2.0_f64);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.scalar("loss"), Some(2.0));
    }
}
