use crate::run_eval::RunEvalResult;
use crate::{blake3_hex, jcs_bytes};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const REPORT_SCHEMA_ID: &str = "run_eval_report_v1";
pub const SUMMARY_SCHEMA_ID: &str = "run_eval_summary_csv_v1";
pub const FLOAT_FORMAT_ID: &str = "sci_17e_v1";

pub const SUMMARY_CSV_COLUMNS_V1: &[&str] = &[
    "primary_auc",
    "curve_auc_trapezoid",
    "auc_algorithm",
    "test_signal_n",
    "test_background_n",
    "test_signal_weight_total",
    "test_background_weight_total",
    "ks_signal_statistic",
    "ks_signal_p_value",
    "ks_background_statistic",
    "ks_background_p_value",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportArtifacts {
    pub report_json: PathBuf,
    pub summary_csv: PathBuf,
    /// blake3 over the JCS canonicalization of the report, stable across
    /// formatting changes.
    pub report_hash: String,
}

#[derive(Debug)]
pub enum WriteError {
    Io(std::io::Error),
    Json(serde_json::Error),
    InvalidFloat { field: &'static str, value: f64 },
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {}", err),
            Self::Json(err) => write!(f, "json error: {}", err),
            Self::InvalidFloat { field, value } => {
                write!(f, "non-finite float for {}: {}", field, value)
            }
        }
    }
}

impl std::error::Error for WriteError {}

impl From<std::io::Error> for WriteError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for WriteError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Serialize)]
struct ReportJson<'a> {
    report_schema_id: &'static str,
    summary_schema_id: &'static str,
    float_format_id: &'static str,
    result: &'a RunEvalResult,
}

pub fn write_run_report<P: AsRef<Path>>(
    out_dir: P,
    result: &RunEvalResult,
) -> Result<ReportArtifacts, WriteError> {
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)?;

    let report = ReportJson {
        report_schema_id: REPORT_SCHEMA_ID,
        summary_schema_id: SUMMARY_SCHEMA_ID,
        float_format_id: FLOAT_FORMAT_ID,
        result,
    };
    let report_bytes = serde_json::to_vec_pretty(&report)?;
    let report_hash = blake3_hex(&jcs_bytes(&report));
    let report_path = out_dir.join("report.json");
    write_bytes_lf(&report_path, &report_bytes)?;

    let summary = build_summary_csv(result)?;
    let summary_path = out_dir.join("summary.csv");
    write_string_lf(&summary_path, &summary)?;

    Ok(ReportArtifacts {
        report_json: report_path,
        summary_csv: summary_path,
        report_hash,
    })
}

fn build_summary_csv(result: &RunEvalResult) -> Result<String, WriteError> {
    let values = [
        fmt_f64("primary_auc", result.primary_auc)?,
        fmt_f64("curve_auc_trapezoid", result.curve_auc_trapezoid)?,
        result.auc_algorithm.clone(),
        result.test.signal.n.to_string(),
        result.test.background.n.to_string(),
        fmt_f64("test_signal_weight_total", result.test.signal.weight_total)?,
        fmt_f64(
            "test_background_weight_total",
            result.test.background.weight_total,
        )?,
        fmt_f64("ks_signal_statistic", result.ks.signal.statistic)?,
        fmt_f64("ks_signal_p_value", result.ks.signal.p_value)?,
        fmt_f64("ks_background_statistic", result.ks.background.statistic)?,
        fmt_f64("ks_background_p_value", result.ks.background.p_value)?,
    ];
    debug_assert_eq!(values.len(), SUMMARY_CSV_COLUMNS_V1.len());

    let mut out = String::new();
    out.push_str(&SUMMARY_CSV_COLUMNS_V1.join(","));
    out.push('\n');
    out.push_str(&values.join(","));
    out.push('\n');
    Ok(out)
}

fn fmt_f64(field: &'static str, value: f64) -> Result<String, WriteError> {
    if !value.is_finite() {
        return Err(WriteError::InvalidFloat { field, value });
    }
    Ok(format!("{:.17e}", value))
}

fn write_string_lf(path: &Path, content: &str) -> Result<(), WriteError> {
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    fs::write(path, normalized.as_bytes())?;
    Ok(())
}

fn write_bytes_lf(path: &Path, bytes: &[u8]) -> Result<(), WriteError> {
    let content = std::str::from_utf8(bytes).map_err(|err| {
        WriteError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("invalid UTF-8 bytes: {}", err),
        ))
    })?;
    write_string_lf(path, content)
}
