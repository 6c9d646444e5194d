use std::cmp::Ordering;
use std::fmt;

/// One split's scores, labels and weights, validated on construction.
///
/// The core engine accepts weights arithmetically; this type is the explicit
/// policy boundary above it: weights must be finite and non-negative, scores
/// and labels must be finite, and exactly two label values must be present.
/// The greater label value is the signal (positive) class.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreSet {
    scores: Vec<f64>,
    labels: Vec<f64>,
    weights: Vec<f64>,
    class0: f64,
    class1: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ScoreSetError {
    LengthMismatch {
        scores: usize,
        labels: usize,
        weights: Option<usize>,
    },
    NonFiniteScore {
        index: usize,
    },
    NonFiniteLabel {
        index: usize,
    },
    NonFiniteWeight {
        index: usize,
    },
    NegativeWeight {
        index: usize,
        weight: f64,
    },
    NotBinary {
        distinct: usize,
    },
}

impl fmt::Display for ScoreSetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch {
                scores,
                labels,
                weights,
            } => match weights {
                Some(weights) => write!(
                    f,
                    "length mismatch: scores {}, labels {}, weights {}",
                    scores, labels, weights
                ),
                None => write!(f, "length mismatch: scores {}, labels {}", scores, labels),
            },
            Self::NonFiniteScore { index } => write!(f, "non-finite score at index {}", index),
            Self::NonFiniteLabel { index } => write!(f, "non-finite label at index {}", index),
            Self::NonFiniteWeight { index } => write!(f, "non-finite weight at index {}", index),
            Self::NegativeWeight { index, weight } => {
                write!(f, "negative weight {} at index {}", weight, index)
            }
            Self::NotBinary { distinct } => write!(
                f,
                "expected exactly 2 distinct labels, found {}",
                distinct
            ),
        }
    }
}

impl std::error::Error for ScoreSetError {}

impl ScoreSet {
    pub fn new(
        scores: Vec<f64>,
        labels: Vec<f64>,
        weights: Option<Vec<f64>>,
    ) -> Result<Self, ScoreSetError> {
        let lengths_ok = scores.len() == labels.len()
            && weights.as_ref().map_or(true, |w| w.len() == scores.len());
        if !lengths_ok {
            return Err(ScoreSetError::LengthMismatch {
                scores: scores.len(),
                labels: labels.len(),
                weights: weights.as_ref().map(|w| w.len()),
            });
        }

        for (index, score) in scores.iter().enumerate() {
            if !score.is_finite() {
                return Err(ScoreSetError::NonFiniteScore { index });
            }
        }
        for (index, label) in labels.iter().enumerate() {
            if !label.is_finite() {
                return Err(ScoreSetError::NonFiniteLabel { index });
            }
        }

        let weights = weights.unwrap_or_else(|| vec![1.0; scores.len()]);
        for (index, &weight) in weights.iter().enumerate() {
            if !weight.is_finite() {
                return Err(ScoreSetError::NonFiniteWeight { index });
            }
            if weight < 0.0 {
                return Err(ScoreSetError::NegativeWeight { index, weight });
            }
        }

        let mut distinct = labels.clone();
        distinct.sort_by(f64::total_cmp);
        distinct.dedup_by(|a, b| a.total_cmp(b) == Ordering::Equal);
        if distinct.len() != 2 {
            return Err(ScoreSetError::NotBinary {
                distinct: distinct.len(),
            });
        }

        Ok(Self {
            scores,
            labels,
            weights,
            class0: distinct[0],
            class1: distinct[1],
        })
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Background (negative) class label value.
    pub fn class0(&self) -> f64 {
        self.class0
    }

    /// Signal (positive) class label value.
    pub fn class1(&self) -> f64 {
        self.class1
    }

    pub fn signal_scores(&self) -> Vec<f64> {
        self.filtered(&self.scores, self.class1)
    }

    pub fn background_scores(&self) -> Vec<f64> {
        self.filtered(&self.scores, self.class0)
    }

    pub fn signal_weights(&self) -> Vec<f64> {
        self.filtered(&self.weights, self.class1)
    }

    pub fn background_weights(&self) -> Vec<f64> {
        self.filtered(&self.weights, self.class0)
    }

    fn filtered(&self, values: &[f64], class: f64) -> Vec<f64> {
        values
            .iter()
            .zip(self.labels.iter())
            .filter(|(_, &label)| label == class)
            .map(|(&value, _)| value)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_split_and_partitions_by_class() {
        let set = ScoreSet::new(
            vec![0.1, 0.9, 0.4, 0.6],
            vec![0.0, 1.0, 0.0, 1.0],
            Some(vec![1.0, 2.0, 3.0, 4.0]),
        )
        .expect("score set");

        assert_eq!(set.len(), 4);
        assert_eq!(set.class0(), 0.0);
        assert_eq!(set.class1(), 1.0);
        assert_eq!(set.signal_scores(), vec![0.9, 0.6]);
        assert_eq!(set.background_scores(), vec![0.1, 0.4]);
        assert_eq!(set.signal_weights(), vec![2.0, 4.0]);
        assert_eq!(set.background_weights(), vec![1.0, 3.0]);
    }

    #[test]
    fn absent_weights_default_to_one() {
        let set = ScoreSet::new(vec![0.1, 0.9], vec![0.0, 1.0], None).expect("score set");
        assert_eq!(set.weights(), &[1.0, 1.0]);
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = ScoreSet::new(vec![0.1, 0.9], vec![0.0, 1.0], Some(vec![1.0])).unwrap_err();
        assert_eq!(
            err,
            ScoreSetError::LengthMismatch {
                scores: 2,
                labels: 2,
                weights: Some(1),
            }
        );
    }

    #[test]
    fn rejects_negative_weight() {
        let err =
            ScoreSet::new(vec![0.1, 0.9], vec![0.0, 1.0], Some(vec![1.0, -0.5])).unwrap_err();
        assert_eq!(
            err,
            ScoreSetError::NegativeWeight {
                index: 1,
                weight: -0.5,
            }
        );
    }

    #[test]
    fn rejects_non_finite_values() {
        let err = ScoreSet::new(vec![f64::NAN, 0.9], vec![0.0, 1.0], None).unwrap_err();
        assert_eq!(err, ScoreSetError::NonFiniteScore { index: 0 });

        let err = ScoreSet::new(vec![0.1, 0.9], vec![0.0, f64::INFINITY], None).unwrap_err();
        assert_eq!(err, ScoreSetError::NonFiniteLabel { index: 1 });

        let err =
            ScoreSet::new(vec![0.1, 0.9], vec![0.0, 1.0], Some(vec![1.0, f64::NAN])).unwrap_err();
        assert_eq!(err, ScoreSetError::NonFiniteWeight { index: 1 });
    }

    #[test]
    fn rejects_non_binary_labels() {
        let err = ScoreSet::new(vec![0.1, 0.5, 0.9], vec![0.0, 1.0, 2.0], None).unwrap_err();
        assert_eq!(err, ScoreSetError::NotBinary { distinct: 3 });

        let err = ScoreSet::new(vec![0.1, 0.9], vec![1.0, 1.0], None).unwrap_err();
        assert_eq!(err, ScoreSetError::NotBinary { distinct: 1 });
    }
}
