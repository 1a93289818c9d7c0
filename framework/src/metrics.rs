//! Summary statistics over one series of samples

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation
    pub standard_deviation: f64,
    /// Standard deviation divided by the mean
    pub relative_standard_deviation: f64,
}

impl Metrics {
    /// Compute metrics over `samples`, ignoring the first `iterations_to_skip`.
    ///
    /// Returns `None` for an empty series. When the skip would leave nothing,
    /// every sample is used.
    pub fn compute(samples: &[f64], iterations_to_skip: usize) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let skip = if iterations_to_skip >= samples.len() {
            warn!(
                "Cannot skip {} iterations out of {} samples, using all of them",
                iterations_to_skip,
                samples.len()
            );
            0
        } else {
            iterations_to_skip
        };
        let samples = &samples[skip..];

        let mean = mean(samples);
        let standard_deviation = standard_deviation(samples, mean);
        let relative_standard_deviation = if mean == 0.0 {
            0.0
        } else {
            standard_deviation / mean
        };

        Some(Self {
            min: samples.iter().copied().fold(f64::INFINITY, f64::min),
            max: samples.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean,
            median: median(samples),
            standard_deviation,
            relative_standard_deviation,
        })
    }
}

fn mean(samples: &[f64]) -> f64 {
    samples.iter().sum::<f64>() / samples.len() as f64
}

fn median(samples: &[f64]) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    let count = sorted.len();
    if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    } else {
        sorted[count / 2]
    }
}

fn standard_deviation(samples: &[f64], mean: f64) -> f64 {
    let variance = samples
        .iter()
        .map(|sample| {
            let difference = sample - mean;
            difference * difference
        })
        .sum::<f64>()
        / samples.len() as f64;
    variance.sqrt()
}
