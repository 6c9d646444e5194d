use serde::{Deserialize, Serialize};
use std::fmt;

use sepeval_core::{roc_points, trapezoid_auc, weighted_auc, AucError, RocPoint};

use crate::histogram::{weighted_histogram, HistogramError, HistogramSpec, WeightedHistogram};
use crate::ks::{ks_two_sample, KsError, KsResult};
use crate::score_set::ScoreSet;

pub const AUC_ALGORITHM_ID: &str = "weighted_mann_whitney_tie_corrected_v1";
pub const ROC_SWEEP_ID: &str = "weighted_threshold_sweep_desc_v1";
pub const KS_TEST_ID: &str = "two_sample_ks_asymp_v1";
pub const HISTOGRAM_ID: &str = "weighted_density_hist_v1";

/// Serializable ROC point. The curve's (0, 0) anchor has no finite
/// threshold, so it carries `None` instead of a non-finite float that JSON
/// cannot represent.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct RocSample {
    pub threshold: Option<f64>,
    pub false_positive_rate: f64,
    pub true_positive_rate: f64,
}

impl From<RocPoint> for RocSample {
    fn from(point: RocPoint) -> Self {
        Self {
            threshold: point.threshold.is_finite().then_some(point.threshold),
            false_positive_rate: point.false_positive_rate,
            true_positive_rate: point.true_positive_rate,
        }
    }
}

/// Per-class score distribution within one split.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClassSummary {
    pub n: usize,
    pub weight_total: f64,
    pub histogram: WeightedHistogram,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SplitSummary {
    pub signal: ClassSummary,
    pub background: ClassSummary,
}

/// Train/test shape agreement per class. Large statistics with small
/// p-values indicate the classifier memorized the training split.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct KsConsistency {
    pub signal: KsResult,
    pub background: KsResult,
}

pub struct RunEvalInput {
    pub train: ScoreSet,
    pub test: ScoreSet,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RunEvalResult {
    pub auc_algorithm: String,
    pub roc_sweep_algorithm: String,
    pub ks_algorithm: String,
    pub histogram_algorithm: String,
    /// Exact weighted AUC on the held-out test split.
    pub primary_auc: f64,
    /// Trapezoid integral of the test ROC curve. Diverges from `primary_auc`
    /// only when tied scores collapse curve points.
    pub curve_auc_trapezoid: f64,
    pub roc: Vec<RocSample>,
    pub train: SplitSummary,
    pub test: SplitSummary,
    pub ks: KsConsistency,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RunEvalError {
    Auc(AucError),
    Histogram(HistogramError),
    Ks(KsError),
}

impl fmt::Display for RunEvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auc(err) => write!(f, "auc computation failed: {}", err),
            Self::Histogram(err) => write!(f, "histogram computation failed: {}", err),
            Self::Ks(err) => write!(f, "ks consistency check failed: {}", err),
        }
    }
}

impl std::error::Error for RunEvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Auc(err) => Some(err),
            Self::Histogram(err) => Some(err),
            Self::Ks(err) => Some(err),
        }
    }
}

impl From<AucError> for RunEvalError {
    fn from(err: AucError) -> Self {
        Self::Auc(err)
    }
}

impl From<HistogramError> for RunEvalError {
    fn from(err: HistogramError) -> Self {
        Self::Histogram(err)
    }
}

impl From<KsError> for RunEvalError {
    fn from(err: KsError) -> Self {
        Self::Ks(err)
    }
}

/// Full evaluation of one train/test score pair: exact weighted AUC and ROC
/// sweep on the test split, per-class score histograms on both splits, and
/// KS shape agreement between the splits per class.
pub fn compute_run_eval(input: &RunEvalInput) -> Result<RunEvalResult, RunEvalError> {
    let test = &input.test;
    let primary_auc = weighted_auc(test.labels(), test.scores(), Some(test.weights()))?;
    let points = roc_points(test.labels(), test.scores(), Some(test.weights()))?;
    let curve_auc_trapezoid = trapezoid_auc(&points);
    let roc = points.into_iter().map(RocSample::from).collect();

    let train_summary = split_summary(&input.train)?;
    let test_summary = split_summary(test)?;

    let ks = KsConsistency {
        signal: ks_two_sample(&input.train.signal_scores(), &test.signal_scores())?,
        background: ks_two_sample(&input.train.background_scores(), &test.background_scores())?,
    };

    Ok(RunEvalResult {
        auc_algorithm: AUC_ALGORITHM_ID.to_string(),
        roc_sweep_algorithm: ROC_SWEEP_ID.to_string(),
        ks_algorithm: KS_TEST_ID.to_string(),
        histogram_algorithm: HISTOGRAM_ID.to_string(),
        primary_auc,
        curve_auc_trapezoid,
        roc,
        train: train_summary,
        test: test_summary,
        ks,
    })
}

fn split_summary(set: &ScoreSet) -> Result<SplitSummary, RunEvalError> {
    let spec = HistogramSpec::default();
    Ok(SplitSummary {
        signal: class_summary(&set.signal_scores(), &set.signal_weights(), spec)?,
        background: class_summary(&set.background_scores(), &set.background_weights(), spec)?,
    })
}

fn class_summary(
    scores: &[f64],
    weights: &[f64],
    spec: HistogramSpec,
) -> Result<ClassSummary, RunEvalError> {
    Ok(ClassSummary {
        n: scores.len(),
        weight_total: weights.iter().sum(),
        histogram: weighted_histogram(scores, weights, spec)?,
    })
}
