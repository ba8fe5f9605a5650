use num_traits::{real::Real, Zero};
use serde::{Deserialize, Serialize};
use std::iter::FromIterator;

/// Online mean calculation.
///
/// Updates are pure transitions: [`OnlineMean::push`] consumes the current state and returns
/// the next one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OnlineMean<T> {
    mean: T,
    count: u64,
}

impl<T: Zero> Default for OnlineMean<T> {
    fn default() -> Self {
        Self {
            mean: T::zero(),
            count: 0,
        }
    }
}

impl<T> OnlineMean<T> {
    /// Resume from a mean of `count` values.
    pub const fn from_parts(mean: T, count: u64) -> Self {
        Self { mean, count }
    }

    /// The number of accumulated values.
    pub const fn count(&self) -> u64 {
        self.count
    }
}

impl<T: Copy> OnlineMean<T> {
    /// The mean of all accumulated values. Zero if there are none.
    pub fn mean(&self) -> T {
        self.mean
    }
}

impl<T: Real> OnlineMean<T> {
    /// Add a new value to the calculation.
    ///
    /// `mean += (value - mean) / count` with `count` incremented first.
    #[must_use]
    pub fn push(self, value: T) -> Self {
        let count = self.count + 1;
        let mean = self.mean + (value - self.mean) / T::from(count).unwrap_or_else(T::one);
        Self { mean, count }
    }
}

impl<T: Real> FromIterator<T> for OnlineMean<T> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        iter.into_iter().fold(Self::default(), Self::push)
    }
}
