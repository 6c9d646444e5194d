use serde::{Deserialize, Serialize};
use std::fmt;

/// Two-sample Kolmogorov-Smirnov test between empirical distributions.
///
/// The p-value is the asymptotic two-sided approximation evaluated at the
/// effective sample size; fine for the train/test consistency check this
/// backs, where the question is "did the score shape drift", not exact
/// small-sample inference.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct KsResult {
    pub statistic: f64,
    pub p_value: f64,
    pub n_left: usize,
    pub n_right: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KsError {
    EmptySample { left: usize, right: usize },
}

impl fmt::Display for KsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySample { left, right } => write!(
                f,
                "both samples must be nonempty: left {}, right {}",
                left, right
            ),
        }
    }
}

impl std::error::Error for KsError {}

pub fn ks_two_sample(left: &[f64], right: &[f64]) -> Result<KsResult, KsError> {
    if left.is_empty() || right.is_empty() {
        return Err(KsError::EmptySample {
            left: left.len(),
            right: right.len(),
        });
    }

    let mut a = left.to_vec();
    let mut b = right.to_vec();
    a.sort_by(f64::total_cmp);
    b.sort_by(f64::total_cmp);

    let n_left = a.len();
    let n_right = b.len();
    let mut i = 0usize;
    let mut j = 0usize;
    let mut statistic = 0.0_f64;
    while i < n_left && j < n_right {
        let x = if a[i] <= b[j] { a[i] } else { b[j] };
        while i < n_left && a[i] == x {
            i += 1;
        }
        while j < n_right && b[j] == x {
            j += 1;
        }
        let f_left = i as f64 / n_left as f64;
        let f_right = j as f64 / n_right as f64;
        statistic = statistic.max((f_left - f_right).abs());
    }

    let effective = ((n_left as f64) * (n_right as f64) / ((n_left + n_right) as f64)).sqrt();
    let lambda = (effective + 0.12 + 0.11 / effective) * statistic;

    Ok(KsResult {
        statistic,
        p_value: kolmogorov_survival(lambda),
        n_left,
        n_right,
    })
}

/// Q_KS(lambda) = 2 * sum_{j>=1} (-1)^(j-1) exp(-2 j^2 lambda^2), truncated
/// once the terms stop mattering; returns 1.0 when the series fails to
/// converge, which only happens for tiny lambda where the answer is ~1.
fn kolmogorov_survival(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    let exponent_base = -2.0 * lambda * lambda;
    let mut sum = 0.0_f64;
    let mut sign = 1.0_f64;
    let mut previous = 0.0_f64;
    for j in 1..=100u32 {
        let term = 2.0 * sign * (exponent_base * (j * j) as f64).exp();
        sum += term;
        let magnitude = term.abs();
        if magnitude <= 1e-3 * previous || magnitude <= 1e-8 * sum.abs() {
            return sum.clamp(0.0, 1.0);
        }
        previous = magnitude;
        sign = -sign;
    }
    1.0
}
