use nalgebra::Matrix2;

use super::CLASS_COUNT;
use crate::errors::{ClonalityError, ClonalityResult};

/// Two-class confusion matrix, rows are observed classes and columns are predicted classes
///
#[derive(Clone, Debug, PartialEq)]
pub struct ConfusionMatrix {
    counts: Matrix2<usize>,
}

impl ConfusionMatrix {
    pub fn from_labels(observed: &[usize], predicted: &[usize]) -> Self {
        assert_eq!(observed.len(), predicted.len());
        let mut counts = Matrix2::zeros();
        for (&o, &p) in observed.iter().zip(predicted) {
            counts[(o, p)] += 1;
        }
        Self { counts }
    }

    pub fn total(&self) -> usize {
        self.counts.sum()
    }

    fn get_fraction(&self, count: usize) -> ClonalityResult<f64> {
        let total = self.total();
        if total == 0 {
            return Err(ClonalityError::division_by_zero(
                "classification rate of an empty confusion matrix",
            ));
        }
        Ok(count as f64 / total as f64)
    }

    pub fn accuracy(&self) -> ClonalityResult<f64> {
        self.get_fraction(self.counts.trace())
    }

    pub fn misclassification_rate(&self) -> ClonalityResult<f64> {
        self.get_fraction(self.counts[(0, 1)] + self.counts[(1, 0)])
    }

    /// Counts as nested arrays, indexed by [observed][predicted]
    ///
    pub fn to_rows(&self) -> [[usize; CLASS_COUNT]; CLASS_COUNT] {
        std::array::from_fn(|o| std::array::from_fn(|p| self.counts[(o, p)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let labels = [0, 1, 1, 0, 1];
        let confusion = ConfusionMatrix::from_labels(&labels, &labels);
        assert_eq!(confusion.to_rows(), [[2, 0], [0, 3]]);
        assert_eq!(confusion.accuracy().unwrap(), 1.0);
        assert_eq!(confusion.misclassification_rate().unwrap(), 0.0);
    }

    #[test]
    fn test_inverted_predictions() {
        let observed = [0, 1, 1, 0];
        let predicted = [1, 0, 0, 1];
        let confusion = ConfusionMatrix::from_labels(&observed, &predicted);
        assert_eq!(confusion.to_rows(), [[0, 2], [2, 0]]);
        assert_eq!(confusion.accuracy().unwrap(), 0.0);
        assert_eq!(confusion.misclassification_rate().unwrap(), 1.0);
    }

    #[test]
    fn test_mixed_predictions() {
        let observed = [0, 0, 0, 1, 1];
        let predicted = [0, 1, 0, 1, 0];
        let confusion = ConfusionMatrix::from_labels(&observed, &predicted);
        assert_eq!(confusion.to_rows(), [[2, 1], [1, 1]]);
        assert_eq!(confusion.total(), 5);
        approx::assert_ulps_eq!(confusion.accuracy().unwrap(), 0.6, max_ulps = 4);
        approx::assert_ulps_eq!(
            confusion.misclassification_rate().unwrap(),
            0.4,
            max_ulps = 4
        );
    }

    #[test]
    fn test_empty_confusion_matrix() {
        let confusion = ConfusionMatrix::from_labels(&[], &[]);
        assert!(matches!(
            confusion.accuracy(),
            Err(ClonalityError::DivisionByZero { .. })
        ));
        assert!(matches!(
            confusion.misclassification_rate(),
            Err(ClonalityError::DivisionByZero { .. })
        ));
    }
}
