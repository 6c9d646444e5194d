//! Run-level evaluation of a binary classifier's scores.
//!
//! [`ScoreSet`] validates one split's scores, labels and per-sample weights.
//! [`compute_run_eval`] produces the exact weighted AUC and ROC sweep on the
//! test split, per-class score histograms on both splits, and a
//! Kolmogorov-Smirnov train/test consistency check. [`write_run_report`]
//! serializes the result with a canonical content hash.

use serde::Serialize;

mod histogram;
mod ks;
mod run_eval;
mod score_set;
mod writer;

pub use histogram::{
    weighted_histogram, HistogramError, HistogramSpec, WeightedHistogram, DEFAULT_BINS,
    DEFAULT_RANGE,
};
pub use ks::{ks_two_sample, KsError, KsResult};
pub use run_eval::{
    compute_run_eval, ClassSummary, KsConsistency, RocSample, RunEvalError, RunEvalInput,
    RunEvalResult, SplitSummary, AUC_ALGORITHM_ID, HISTOGRAM_ID, KS_TEST_ID, ROC_SWEEP_ID,
};
pub use score_set::{ScoreSet, ScoreSetError};
pub use writer::{
    write_run_report, ReportArtifacts, WriteError, FLOAT_FORMAT_ID, REPORT_SCHEMA_ID,
    SUMMARY_CSV_COLUMNS_V1, SUMMARY_SCHEMA_ID,
};

pub fn jcs_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_jcs::to_vec(value).expect("JCS serialization failed")
}

pub fn blake3_hex(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}
