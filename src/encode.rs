//! Label encoding
//!
//! Maps the distinct raw labels observed at fit time onto the contiguous
//! class ids 0..k-1 the multiclass model works with. The mapping sorts
//! labels ascending, so MNIST digits 0-9 encode to themselves.

use crate::core::{ClassifierError, Result};

/// Injective mapping between raw labels and contiguous class ids.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEncoder {
    /// Distinct raw labels, sorted ascending; position is the class id.
    classes: Vec<i64>,
}

impl LabelEncoder {
    /// Learn the mapping from observed labels.
    pub fn fit(labels: &[i64]) -> Result<Self> {
        if labels.is_empty() {
            return Err(ClassifierError::EmptyDataset);
        }

        let mut classes = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();

        Ok(Self { classes })
    }

    /// Fit and immediately encode the same labels.
    pub fn fit_transform(labels: &[i64]) -> Result<(Self, Vec<usize>)> {
        let encoder = Self::fit(labels)?;
        let encoded = encoder.transform(labels)?;
        Ok((encoder, encoded))
    }

    /// Encode one raw label.
    pub fn encode(&self, label: i64) -> Result<usize> {
        self.classes
            .binary_search(&label)
            .map_err(|_| ClassifierError::UnknownLabel(label))
    }

    /// Encode a batch of raw labels.
    pub fn transform(&self, labels: &[i64]) -> Result<Vec<usize>> {
        labels.iter().map(|&l| self.encode(l)).collect()
    }

    /// Map a class id back to its raw label.
    pub fn decode(&self, class: usize) -> Result<i64> {
        self.classes.get(class).copied().ok_or_else(|| {
            ClassifierError::InvalidParameter(format!(
                "class id {} out of range for {} classes",
                class,
                self.classes.len()
            ))
        })
    }

    /// Map a batch of class ids back to raw labels.
    pub fn decode_batch(&self, classes: &[usize]) -> Result<Vec<i64>> {
        classes.iter().map(|&c| self.decode(c)).collect()
    }

    /// Distinct raw labels, sorted ascending.
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Number of distinct classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
