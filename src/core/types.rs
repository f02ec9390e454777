//! Core type definitions shared by the solver, kernels, and models

/// Sparse vector of pixel intensities with sorted indices.
///
/// MNIST-style images are mostly background (zero), so only non-zero
/// pixels are stored.
#[derive(Clone, Debug, PartialEq)]
pub struct SparseVector {
    /// Sorted indices of non-zero pixels
    pub indices: Vec<usize>,
    /// Intensities corresponding to `indices`
    pub values: Vec<f64>,
}

impl SparseVector {
    /// Create a sparse vector, sorting index/value pairs by index.
    pub fn new(indices: Vec<usize>, values: Vec<f64>) -> Self {
        assert_eq!(
            indices.len(),
            values.len(),
            "Indices and values must have same length"
        );

        let mut pairs: Vec<_> = indices.into_iter().zip(values).collect();
        pairs.sort_by_key(|&(idx, _)| idx);

        let (indices, values): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        Self { indices, values }
    }

    /// Build from a dense row, keeping only non-zero entries.
    pub fn from_dense(row: &[f64]) -> Self {
        let mut indices = Vec::new();
        let mut values = Vec::new();
        for (idx, &value) in row.iter().enumerate() {
            if value != 0.0 {
                indices.push(idx);
                values.push(value);
            }
        }
        Self { indices, values }
    }

    /// Create an empty sparse vector (an all-background image).
    pub fn empty() -> Self {
        Self {
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Value at `index`, 0.0 if not stored.
    pub fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    /// Squared L2 norm.
    pub fn norm_squared(&self) -> f64 {
        self.values.iter().map(|&v| v * v).sum()
    }

    /// Number of non-zero pixels.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Dot product of two sparse vectors.
    ///
    /// Both index lists are sorted, so a two-pointer merge runs in
    /// O(nnz(x) + nnz(y)).
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let mut result = 0.0;
        let mut i = 0;
        let mut j = 0;

        while i < self.indices.len() && j < other.indices.len() {
            let a = self.indices[i];
            let b = other.indices[j];

            if a == b {
                result += self.values[i] * other.values[j];
                i += 1;
                j += 1;
            } else if a < b {
                i += 1;
            } else {
                j += 1;
            }
        }

        result
    }
}

/// Training sample as seen by the binary SMO solver.
#[derive(Clone, Debug)]
pub struct BinarySample {
    /// Pixel vector
    pub features: SparseVector,
    /// Class label, strictly +1.0 or -1.0
    pub label: f64,
}

impl BinarySample {
    pub fn new(features: SparseVector, label: f64) -> Self {
        Self { features, label }
    }
}

/// Binary prediction: signed label plus the raw decision value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryPrediction {
    /// Predicted label (+1 or -1)
    pub label: f64,
    /// Raw decision function value
    pub decision_value: f64,
}

impl BinaryPrediction {
    pub fn new(label: f64, decision_value: f64) -> Self {
        Self {
            label,
            decision_value,
        }
    }

    /// Distance from the decision boundary.
    pub fn confidence(&self) -> f64 {
        self.decision_value.abs()
    }
}

/// Solver configuration.
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Regularization parameter (upper bound for alpha)
    pub c: f64,
    /// Tolerance for KKT conditions
    pub epsilon: f64,
    /// Maximum number of outer-loop passes
    pub max_iterations: usize,
    /// Kernel cache size in bytes
    pub cache_size: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            epsilon: 0.001,
            max_iterations: 10000,
            cache_size: 100_000_000, // 100MB
        }
    }
}

/// Raw output of the SMO solver.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Lagrange multipliers, one per training sample
    pub alpha: Vec<f64>,
    /// Bias term
    pub b: f64,
    /// Indices of support vectors (alpha above tolerance)
    pub support_vectors: Vec<usize>,
    /// Outer-loop passes performed
    pub iterations: usize,
}
