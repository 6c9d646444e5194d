use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_BINS: usize = 30;
pub const DEFAULT_RANGE: (f64, f64) = (0.0, 1.0);

/// Equal-width binning spec. The default matches the classifier-output
/// convention: 30 bins over [0, 1].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct HistogramSpec {
    pub bins: usize,
    pub low: f64,
    pub high: f64,
}

impl Default for HistogramSpec {
    fn default() -> Self {
        Self {
            bins: DEFAULT_BINS,
            low: DEFAULT_RANGE.0,
            high: DEFAULT_RANGE.1,
        }
    }
}

/// Density-normalized weighted histogram with per-bin error bars.
///
/// Densities integrate to 1 over the in-range mass. Errors follow the
/// rescaled-Poisson convention: the density is converted back to an
/// equivalent unweighted count, its square root is taken, and the result is
/// rescaled by the total equivalent count.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeightedHistogram {
    pub bin_edges: Vec<f64>,
    pub densities: Vec<f64>,
    pub errors: Vec<f64>,
    pub entries: usize,
    pub weight_total: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum HistogramError {
    LengthMismatch { values: usize, weights: usize },
    InvalidSpec { bins: usize, low: f64, high: f64 },
    EmptySample,
    ZeroWeightInRange,
}

impl fmt::Display for HistogramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { values, weights } => write!(
                f,
                "length mismatch: values {}, weights {}",
                values, weights
            ),
            Self::InvalidSpec { bins, low, high } => write!(
                f,
                "invalid histogram spec: bins {}, range [{}, {}]",
                bins, low, high
            ),
            Self::EmptySample => write!(f, "cannot bin an empty sample"),
            Self::ZeroWeightInRange => write!(f, "no weight falls inside the histogram range"),
        }
    }
}

impl std::error::Error for HistogramError {}

pub fn weighted_histogram(
    values: &[f64],
    weights: &[f64],
    spec: HistogramSpec,
) -> Result<WeightedHistogram, HistogramError> {
    if values.len() != weights.len() {
        return Err(HistogramError::LengthMismatch {
            values: values.len(),
            weights: weights.len(),
        });
    }
    if spec.bins == 0 || !spec.low.is_finite() || !spec.high.is_finite() || spec.low >= spec.high {
        return Err(HistogramError::InvalidSpec {
            bins: spec.bins,
            low: spec.low,
            high: spec.high,
        });
    }
    if values.is_empty() {
        return Err(HistogramError::EmptySample);
    }

    let width = (spec.high - spec.low) / spec.bins as f64;
    let mut bin_weights = vec![0.0_f64; spec.bins];
    let mut entries = 0usize;
    let mut weight_total = 0.0_f64;
    for (&value, &weight) in values.iter().zip(weights.iter()) {
        if value < spec.low || value > spec.high {
            continue;
        }
        // The top edge is inclusive, matching the usual fixed-range binning.
        let mut bin = ((value - spec.low) / width) as usize;
        if bin >= spec.bins {
            bin = spec.bins - 1;
        }
        bin_weights[bin] += weight;
        entries += 1;
        weight_total += weight;
    }

    if weight_total == 0.0 {
        return Err(HistogramError::ZeroWeightInRange);
    }

    let densities: Vec<f64> = bin_weights
        .iter()
        .map(|&w| w / (weight_total * width))
        .collect();

    // Equivalent unweighted count per bin, Poisson std per bin, rescaled by
    // the total equivalent count.
    let counts_per_bin: Vec<f64> = densities
        .iter()
        .map(|&density| density * entries as f64 * width)
        .collect();
    let counts_total: f64 = counts_per_bin.iter().sum();
    let errors: Vec<f64> = counts_per_bin
        .iter()
        .map(|&count| count.sqrt() / counts_total)
        .collect();

    let bin_edges: Vec<f64> = (0..=spec.bins)
        .map(|edge| spec.low + edge as f64 * width)
        .collect();

    Ok(WeightedHistogram {
        bin_edges,
        densities,
        errors,
        entries,
        weight_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn unit_spec(bins: usize) -> HistogramSpec {
        HistogramSpec {
            bins,
            low: 0.0,
            high: 1.0,
        }
    }

    #[test]
    fn densities_integrate_to_one() {
        let values = [0.05, 0.15, 0.35, 0.35, 0.95];
        let weights = [1.0, 2.0, 0.5, 0.5, 3.0];
        let hist = weighted_histogram(&values, &weights, unit_spec(10)).expect("histogram");

        let width = 0.1;
        let integral: f64 = hist.densities.iter().map(|d| d * width).sum();
        assert_abs_diff_eq!(integral, 1.0, epsilon = 1e-12);
        assert_eq!(hist.entries, 5);
        assert_abs_diff_eq!(hist.weight_total, 7.0, epsilon = 1e-12);
        assert_eq!(hist.bin_edges.len(), 11);
    }

    #[test]
    fn weights_shift_density_between_bins() {
        let values = [0.25, 0.75];
        let weights = [1.0, 3.0];
        let hist = weighted_histogram(&values, &weights, unit_spec(2)).expect("histogram");
        // widths are 0.5; densities: (1/4)/0.5 and (3/4)/0.5
        assert_abs_diff_eq!(hist.densities[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(hist.densities[1], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn top_edge_lands_in_last_bin() {
        let hist = weighted_histogram(&[1.0, 0.5], &[1.0, 1.0], unit_spec(4)).expect("histogram");
        assert!(hist.densities[3] > 0.0);
        assert_eq!(hist.entries, 2);
    }

    #[test]
    fn out_of_range_values_are_skipped() {
        let hist =
            weighted_histogram(&[-0.5, 0.5, 1.5], &[1.0, 2.0, 1.0], unit_spec(4)).expect("hist");
        assert_eq!(hist.entries, 1);
        assert_abs_diff_eq!(hist.weight_total, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn unit_weight_errors_follow_sqrt_counts() {
        // Four unit-weight entries in one bin of a 2-bin histogram: the
        // equivalent count is 4, so the error is sqrt(4)/4.
        let values = [0.2, 0.2, 0.2, 0.2, 0.7];
        let weights = [1.0; 5];
        let hist = weighted_histogram(&values, &weights, unit_spec(2)).expect("histogram");
        assert_abs_diff_eq!(hist.errors[0], 2.0 / 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hist.errors[1], 1.0 / 5.0, epsilon = 1e-12);
    }

    #[test]
    fn rejects_bad_inputs() {
        assert_eq!(
            weighted_histogram(&[0.5], &[1.0, 2.0], unit_spec(4)).unwrap_err(),
            HistogramError::LengthMismatch {
                values: 1,
                weights: 2,
            }
        );
        assert_eq!(
            weighted_histogram(&[0.5], &[1.0], unit_spec(0)).unwrap_err(),
            HistogramError::InvalidSpec {
                bins: 0,
                low: 0.0,
                high: 1.0,
            }
        );
        assert_eq!(
            weighted_histogram(&[], &[], unit_spec(4)).unwrap_err(),
            HistogramError::EmptySample
        );
        assert_eq!(
            weighted_histogram(&[2.0], &[1.0], unit_spec(4)).unwrap_err(),
            HistogramError::ZeroWeightInRange
        );
    }
}
