//! Weighted ROC-AUC core.
//!
//! The estimator here is the probability that a randomly chosen positive
//! sample outranks a randomly chosen negative one, generalized to per-sample
//! weights, with score collisions credited at exactly one half. It is the
//! exact weighted Mann-Whitney statistic, not a curve-integration
//! approximation; `roc_points` provides the curve companion for rendering.

#[cfg(feature = "python")]
mod python;

use std::cmp::Ordering;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum AucError {
    InvalidInputShape {
        classes: usize,
        predictions: usize,
        weights: Option<usize>,
    },
    InvalidLabelSet {
        distinct: usize,
    },
    DegenerateClassWeights {
        class0_weight: f64,
        class1_weight: f64,
    },
}

impl fmt::Display for AucError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInputShape {
                classes,
                predictions,
                weights,
            } => match weights {
                Some(weights) => write!(
                    f,
                    "input length mismatch: classes {}, predictions {}, weights {}",
                    classes, predictions, weights
                ),
                None => write!(
                    f,
                    "input length mismatch: classes {}, predictions {}",
                    classes, predictions
                ),
            },
            Self::InvalidLabelSet { distinct } => write!(
                f,
                "expected exactly 2 distinct class labels, found {}",
                distinct
            ),
            Self::DegenerateClassWeights {
                class0_weight,
                class1_weight,
            } => write!(
                f,
                "class weight totals must be nonzero: class0 {}, class1 {}",
                class0_weight, class1_weight
            ),
        }
    }
}

impl std::error::Error for AucError {}

/// One point of the weighted ROC curve. Points are emitted from (0, 0) with
/// thresholds descending; tied scores collapse into a single point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RocPoint {
    pub threshold: f64,
    pub false_positive_rate: f64,
    pub true_positive_rate: f64,
}

#[inline]
fn weight_at(weights: Option<&[f64]>, index: usize) -> f64 {
    weights.map_or(1.0, |w| w[index])
}

#[inline]
fn same_label(a: f64, b: f64) -> bool {
    a.total_cmp(&b) == Ordering::Equal
}

fn validate_shape(
    classes: &[f64],
    predictions: &[f64],
    weights: Option<&[f64]>,
) -> Result<(), AucError> {
    let ok = classes.len() == predictions.len()
        && weights.map_or(true, |w| w.len() == classes.len());
    if ok {
        return Ok(());
    }
    Err(AucError::InvalidInputShape {
        classes: classes.len(),
        predictions: predictions.len(),
        weights: weights.map(|w| w.len()),
    })
}

/// Returns (class0, class1), the two distinct label values ordered by
/// `total_cmp`. The ordering is a property of the value set, never of the
/// input order, so the statistic's sign convention is deterministic.
fn distinct_label_pair(classes: &[f64]) -> Result<(f64, f64), AucError> {
    let mut sorted = classes.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup_by(|a, b| same_label(*a, *b));
    if sorted.len() != 2 {
        return Err(AucError::InvalidLabelSet {
            distinct: sorted.len(),
        });
    }
    Ok((sorted[0], sorted[1]))
}

/// Ranking permutation: score ascending, class ascending within equal scores,
/// original index last.
///
/// The class tiebreak is load-bearing, not cosmetic: inside a tie group every
/// class0 sample must precede every class1 sample, because the cumulative
/// formula in `weighted_auc` counts the full w0*w1 cross product inside each
/// group and the 0.5 correction assumes exactly that. The reference
/// formulation got the same layout from a class sort followed by a stable
/// mergesort on score; a single sort on the composite key reproduces it
/// without depending on sort stability at all.
fn ranked_order(classes: &[f64], predictions: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..predictions.len()).collect();
    order.sort_by(|&left, &right| {
        predictions[left]
            .total_cmp(&predictions[right])
            .then_with(|| classes[left].total_cmp(&classes[right]))
            .then_with(|| left.cmp(&right))
    });
    order
}

/// Weighted, tie-corrected ROC-AUC as the probability of correct ordering.
///
/// `weights` of `None` treats every sample as weight 1. Weight sign is not
/// validated here; negative weights are accepted arithmetically and may push
/// the result outside [0, 1]. Callers wanting a validated boundary use the
/// eval layer on top of this.
///
/// O(n log n): one sort, one run scan for tie groups, one cumulative pass.
pub fn weighted_auc(
    classes: &[f64],
    predictions: &[f64],
    weights: Option<&[f64]>,
) -> Result<f64, AucError> {
    validate_shape(classes, predictions, weights)?;
    let (class0, _class1) = distinct_label_pair(classes)?;
    let order = ranked_order(classes, predictions);

    // Tied scores credit each pairwise ordering with one half, so every
    // cross-class pair inside a tie group contributes w0*w1, halved once at
    // the end relative to a strict concordant pair.
    let mut correction = 0.0;
    let mut start = 0usize;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && predictions[order[end]] == predictions[order[start]] {
            end += 1;
        }
        if end - start > 1 {
            let mut w0 = 0.0;
            let mut w1 = 0.0;
            for &index in &order[start..end] {
                let w = weight_at(weights, index);
                if same_label(classes[index], class0) {
                    w0 += w;
                } else {
                    w1 += w;
                }
            }
            correction += w0 * w1;
        }
        start = end;
    }
    correction *= 0.5;

    // cum0 at a ranked position is the weighted count of class0 samples at or
    // below it; every class1 sample then contributes cum0 * w correctly
    // ordered pairs, overcounting ties by exactly the correction above.
    let mut cum0 = 0.0;
    let mut total1 = 0.0;
    let mut numerator = 0.0;
    for &index in &order {
        let w = weight_at(weights, index);
        if same_label(classes[index], class0) {
            cum0 += w;
        } else {
            numerator += cum0 * w;
            total1 += w;
        }
    }

    if cum0 == 0.0 || total1 == 0.0 {
        return Err(AucError::DegenerateClassWeights {
            class0_weight: cum0,
            class1_weight: total1,
        });
    }

    Ok((numerator - correction) / (total1 * cum0))
}

/// Weighted ROC curve: cumulative weighted TP/FP rates swept over distinct
/// score thresholds, highest first, anchored at (0, 0).
///
/// Shares ranking and validation with `weighted_auc`, but the trapezoid of
/// this curve is not the exact statistic when ties exist; callers must not
/// substitute one for the other.
pub fn roc_points(
    classes: &[f64],
    predictions: &[f64],
    weights: Option<&[f64]>,
) -> Result<Vec<RocPoint>, AucError> {
    validate_shape(classes, predictions, weights)?;
    let (class0, _class1) = distinct_label_pair(classes)?;

    let mut total0 = 0.0;
    let mut total1 = 0.0;
    for (index, &label) in classes.iter().enumerate() {
        let w = weight_at(weights, index);
        if same_label(label, class0) {
            total0 += w;
        } else {
            total1 += w;
        }
    }
    if total0 == 0.0 || total1 == 0.0 {
        return Err(AucError::DegenerateClassWeights {
            class0_weight: total0,
            class1_weight: total1,
        });
    }

    let order = ranked_order(classes, predictions);
    let mut points = Vec::with_capacity(order.len() + 1);
    points.push(RocPoint {
        threshold: f64::INFINITY,
        false_positive_rate: 0.0,
        true_positive_rate: 0.0,
    });

    let mut tp = 0.0;
    let mut fp = 0.0;
    let mut end = order.len();
    while end > 0 {
        let threshold = predictions[order[end - 1]];
        let mut start = end;
        while start > 0 && predictions[order[start - 1]] == threshold {
            start -= 1;
        }
        for &index in &order[start..end] {
            let w = weight_at(weights, index);
            if same_label(classes[index], class0) {
                fp += w;
            } else {
                tp += w;
            }
        }
        points.push(RocPoint {
            threshold,
            false_positive_rate: fp / total0,
            true_positive_rate: tp / total1,
        });
        end = start;
    }

    Ok(points)
}

/// Trapezoidal area under a curve produced by `roc_points`. Presentation
/// companion only; see `roc_points` for why this is not the exact statistic.
pub fn trapezoid_auc(points: &[RocPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| {
            let dx = pair[1].false_positive_rate - pair[0].false_positive_rate;
            0.5 * (pair[0].true_positive_rate + pair[1].true_positive_rate) * dx
        })
        .sum()
}
