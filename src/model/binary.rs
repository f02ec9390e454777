//! Binary SVM training and prediction
//!
//! Wraps the SMO solver: extracts support vectors from the raw
//! optimization result and exposes the decision function.

use crate::core::{BinaryPrediction, BinarySample, OptimizerConfig, Result, SparseVector};
use crate::kernel::Kernel;
use crate::solver::SmoSolver;
use std::sync::Arc;

/// Trainer for a single binary machine.
pub struct BinarySvm<K: Kernel> {
    kernel: Arc<K>,
    config: OptimizerConfig,
}

impl<K: Kernel> BinarySvm<K> {
    pub fn new(kernel: Arc<K>, config: OptimizerConfig) -> Self {
        Self { kernel, config }
    }

    /// Fit on ±1-labeled samples.
    pub fn fit(&self, samples: &[BinarySample]) -> Result<TrainedBinarySvm<K>> {
        let solver = SmoSolver::new(Arc::clone(&self.kernel), self.config.clone());
        let result = solver.solve(samples)?;

        let mut support_vectors = Vec::with_capacity(result.support_vectors.len());
        let mut alpha_y = Vec::with_capacity(result.support_vectors.len());

        for &sv_idx in &result.support_vectors {
            let sv = &samples[sv_idx];
            support_vectors.push(sv.features.clone());
            alpha_y.push(result.alpha[sv_idx] * sv.label);
        }

        Ok(TrainedBinarySvm {
            kernel: Arc::clone(&self.kernel),
            support_vectors,
            alpha_y,
            bias: result.b,
        })
    }
}

/// A fitted binary machine.
///
/// Keeps only the support vectors; the decision function is
/// f(x) = sum_i alpha_i * y_i * K(x_i, x) + b, stored with alpha and y
/// pre-multiplied.
pub struct TrainedBinarySvm<K: Kernel> {
    kernel: Arc<K>,
    support_vectors: Vec<SparseVector>,
    /// alpha_i * y_i per support vector
    alpha_y: Vec<f64>,
    bias: f64,
}

impl<K: Kernel> TrainedBinarySvm<K> {
    /// Reassemble a model from its stored parts (used by persistence).
    pub fn from_parts(
        kernel: Arc<K>,
        support_vectors: Vec<SparseVector>,
        alpha_y: Vec<f64>,
        bias: f64,
    ) -> Self {
        assert_eq!(
            support_vectors.len(),
            alpha_y.len(),
            "Support vectors and coefficients must have same length"
        );
        Self {
            kernel,
            support_vectors,
            alpha_y,
            bias,
        }
    }

    /// Raw decision value for one pixel vector.
    pub fn decision_function(&self, x: &SparseVector) -> f64 {
        let mut result = self.bias;
        for (sv, &coeff) in self.support_vectors.iter().zip(self.alpha_y.iter()) {
            result += coeff * self.kernel.compute(sv, x);
        }
        result
    }

    /// Signed prediction with the raw decision value attached.
    pub fn predict(&self, x: &SparseVector) -> BinaryPrediction {
        let decision_value = self.decision_function(x);
        let label = if decision_value >= 0.0 { 1.0 } else { -1.0 };
        BinaryPrediction::new(label, decision_value)
    }

    pub fn n_support_vectors(&self) -> usize {
        self.support_vectors.len()
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn support_vectors(&self) -> &[SparseVector] {
        &self.support_vectors
    }

    pub fn alpha_y(&self) -> &[f64] {
        &self.alpha_y
    }
}
