//! RBF (Radial Basis Function) kernel implementation
//!
//! K(x, y) = exp(-γ * ||x - y||²)

use crate::core::SparseVector;
use crate::kernel::Kernel;

/// RBF kernel: K(x, y) = exp(-γ * ||x - y||²)
///
/// Gamma controls the reach of each training example: high gamma lets
/// only nearby images influence the boundary, low gamma smooths it out.
#[derive(Debug, Clone, Copy)]
pub struct RbfKernel {
    gamma: f64,
}

impl RbfKernel {
    /// Create an RBF kernel.
    ///
    /// # Panics
    /// Panics if gamma is not positive.
    pub fn new(gamma: f64) -> Self {
        assert!(gamma > 0.0, "Gamma must be positive, got: {}", gamma);
        Self { gamma }
    }

    /// RBF kernel with gamma = 1/n_features.
    pub fn auto(n_features: usize) -> Self {
        assert!(n_features > 0, "Number of features must be positive");
        Self::new(1.0 / n_features as f64)
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Kernel for RbfKernel {
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64 {
        // ||x - y||² = ||x||² + ||y||² - 2<x, y>
        let distance_sq = x.norm_squared() + y.norm_squared() - 2.0 * x.dot(y);
        // Guard against tiny negative values from floating point cancellation
        (-self.gamma * distance_sq.max(0.0)).exp()
    }
}
