//! Summary statistics over a solved ensemble
//!
//! These produce plain data for downstream consumers; nothing here draws.

use super::TrajectoryEnsemble;
use crate::physics::math::{Scalar, Vector};

impl TrajectoryEnsemble {
    /// Mean state of each member over the time grid, in member order
    pub fn time_averages(&self) -> Vec<Vector> {
        self.trajectories()
            .map(|trajectory| {
                trajectory.iter().copied().sum::<Vector>() / trajectory.len() as Scalar
            })
            .collect()
    }
}

/// Equal-width histogram of a set of values
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Histogram {
    /// `bins + 1` ascending bin edges
    pub edges: Vec<Scalar>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width bins spanning their range.
    ///
    /// Bins are half-open except the last, which also holds the maximum. When
    /// every value is identical the range is widened to `value ± 0.5`. Empty
    /// input or zero bins yields an empty histogram. Non-finite values are
    /// skipped.
    pub fn from_values(values: &[Scalar], bins: usize) -> Self {
        let finite: Vec<Scalar> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || bins == 0 {
            return Self::default();
        }

        let (mut low, mut high) = finite
            .iter()
            .fold((Scalar::INFINITY, Scalar::NEG_INFINITY), |(low, high), &v| {
                (low.min(v), high.max(v))
            });
        if low == high {
            low -= 0.5;
            high += 0.5;
        }

        // Halved so the span stays finite even for values near Scalar::MAX
        let half_span = 0.5 * high - 0.5 * low;
        let mut edges: Vec<Scalar> = (0..=bins)
            .map(|i| {
                let fraction = i as Scalar / bins as Scalar;
                low * (1.0 - fraction) + high * fraction
            })
            .collect();
        edges[bins] = high;

        let mut counts = vec![0; bins];
        for value in finite {
            let fraction = (0.5 * value - 0.5 * low) / half_span;
            let index = ((fraction * bins as Scalar) as usize).min(bins - 1);
            counts[index] += 1;
        }

        Self { edges, counts }
    }

    pub fn bin_count(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// `(lower edge, upper edge, count)` per bin
    pub fn bins(&self) -> impl Iterator<Item = (Scalar, Scalar, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(edge, &count)| (edge[0], edge[1], count))
    }
}
