//! Multiclass evaluation metrics

use crate::core::{ClassifierError, Result};

/// k×k confusion matrix; rows are actual classes, columns predicted.
#[derive(Debug, Clone)]
pub struct ConfusionMatrix {
    counts: Vec<Vec<usize>>,
    n_classes: usize,
}

impl ConfusionMatrix {
    /// Tally predicted/actual class id pairs.
    pub fn from_pairs(n_classes: usize, predicted: &[usize], actual: &[usize]) -> Result<Self> {
        if predicted.len() != actual.len() {
            return Err(ClassifierError::InvalidParameter(format!(
                "got {} predictions for {} actual labels",
                predicted.len(),
                actual.len()
            )));
        }

        let mut counts = vec![vec![0usize; n_classes]; n_classes];
        for (&p, &a) in predicted.iter().zip(actual.iter()) {
            if p >= n_classes || a >= n_classes {
                return Err(ClassifierError::InvalidParameter(format!(
                    "class id out of range for {n_classes} classes: predicted {p}, actual {a}"
                )));
            }
            counts[a][p] += 1;
        }

        Ok(Self { counts, n_classes })
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Samples with actual class `actual` predicted as `predicted`.
    pub fn count(&self, actual: usize, predicted: usize) -> usize {
        self.counts[actual][predicted]
    }

    /// Total number of tallied samples.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|row| row.iter().sum::<usize>()).sum()
    }

    /// Overall fraction of correct predictions.
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..self.n_classes).map(|c| self.counts[c][c]).sum();
        correct as f64 / total as f64
    }

    /// Precision for one class: TP / (TP + FP).
    pub fn precision(&self, class: usize) -> f64 {
        let tp = self.counts[class][class];
        let predicted: usize = (0..self.n_classes).map(|a| self.counts[a][class]).sum();
        if predicted == 0 {
            0.0
        } else {
            tp as f64 / predicted as f64
        }
    }

    /// Recall for one class: TP / (TP + FN).
    pub fn recall(&self, class: usize) -> f64 {
        let tp = self.counts[class][class];
        let actual: usize = self.counts[class].iter().sum();
        if actual == 0 {
            0.0
        } else {
            tp as f64 / actual as f64
        }
    }

    /// F1 score for one class.
    pub fn f1(&self, class: usize) -> f64 {
        let p = self.precision(class);
        let r = self.recall(class);
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    /// Unweighted mean of per-class F1 scores.
    pub fn macro_f1(&self) -> f64 {
        if self.n_classes == 0 {
            return 0.0;
        }
        (0..self.n_classes).map(|c| self.f1(c)).sum::<f64>() / self.n_classes as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perfect_predictions() {
        let matrix = ConfusionMatrix::from_pairs(3, &[0, 1, 2, 1], &[0, 1, 2, 1]).unwrap();

        assert_eq!(matrix.total(), 4);
        assert_eq!(matrix.accuracy(), 1.0);
        assert_eq!(matrix.macro_f1(), 1.0);
    }

    #[test]
    fn test_mixed_predictions() {
        // Actual:    [0, 0, 1, 1]
        // Predicted: [0, 1, 1, 1]
        let matrix = ConfusionMatrix::from_pairs(2, &[0, 1, 1, 1], &[0, 0, 1, 1]).unwrap();

        assert_eq!(matrix.count(0, 0), 1);
        assert_eq!(matrix.count(0, 1), 1);
        assert_eq!(matrix.count(1, 1), 2);
        assert_eq!(matrix.accuracy(), 0.75);

        // Class 0: precision 1/1, recall 1/2
        assert_relative_eq!(matrix.precision(0), 1.0);
        assert_relative_eq!(matrix.recall(0), 0.5);

        // Class 1: precision 2/3, recall 2/2
        assert_relative_eq!(matrix.precision(1), 2.0 / 3.0);
        assert_relative_eq!(matrix.recall(1), 1.0);

        assert_relative_eq!(matrix.f1(0), 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(matrix.f1(1), 0.8, epsilon = 1e-12);
        assert_relative_eq!(matrix.macro_f1(), (2.0 / 3.0 + 0.8) / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_class_scores_zero() {
        // Class 2 never occurs and is never predicted
        let matrix = ConfusionMatrix::from_pairs(3, &[0, 1], &[0, 1]).unwrap();

        assert_eq!(matrix.precision(2), 0.0);
        assert_eq!(matrix.recall(2), 0.0);
        assert_eq!(matrix.f1(2), 0.0);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let result = ConfusionMatrix::from_pairs(2, &[0, 1], &[0]);
        assert!(matches!(result, Err(ClassifierError::InvalidParameter(_))));
    }

    #[test]
    fn test_out_of_range_class_rejected() {
        let result = ConfusionMatrix::from_pairs(2, &[0, 2], &[0, 1]);
        assert!(matches!(result, Err(ClassifierError::InvalidParameter(_))));
    }

    #[test]
    fn test_empty_matrix() {
        let matrix = ConfusionMatrix::from_pairs(2, &[], &[]).unwrap();
        assert_eq!(matrix.total(), 0);
        assert_eq!(matrix.accuracy(), 0.0);
    }
}
