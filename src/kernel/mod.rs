//! Kernel functions for SVM training

pub mod linear;
pub mod polynomial;
pub mod rbf;
pub mod traits;

pub use self::linear::*;
pub use self::polynomial::*;
pub use self::rbf::*;
pub use self::traits::*;

use crate::core::{ClassifierError, Result, SparseVector};
use serde::{Deserialize, Serialize};

/// Serializable kernel description.
///
/// Saved models carry one of these instead of a concrete kernel type so
/// they can be reconstructed after loading. The enum implements `Kernel`
/// directly, dispatching to the same formulas as the concrete kernels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KernelSpec {
    Linear,
    Polynomial { degree: u32, gamma: f64, coef0: f64 },
    Rbf { gamma: f64 },
}

impl KernelSpec {
    /// Polynomial spec with gamma = 1/n_features and no independent term.
    pub fn polynomial_auto(degree: u32, n_features: usize) -> Self {
        let kernel = PolynomialKernel::auto(degree, n_features);
        Self::Polynomial {
            degree: kernel.degree,
            gamma: kernel.gamma,
            coef0: kernel.coef0,
        }
    }

    /// RBF spec with gamma = 1/n_features.
    pub fn rbf_auto(n_features: usize) -> Self {
        Self::Rbf {
            gamma: RbfKernel::auto(n_features).gamma(),
        }
    }

    /// Check parameters, for specs read from an untrusted model file.
    pub fn validate(&self) -> Result<()> {
        match *self {
            KernelSpec::Linear => Ok(()),
            KernelSpec::Polynomial { degree, gamma, .. } => {
                if degree == 0 {
                    return Err(ClassifierError::InvalidParameter(
                        "polynomial degree must be positive".to_string(),
                    ));
                }
                if gamma <= 0.0 {
                    return Err(ClassifierError::InvalidParameter(format!(
                        "polynomial gamma must be positive, got {gamma}"
                    )));
                }
                Ok(())
            }
            KernelSpec::Rbf { gamma } => {
                if gamma <= 0.0 {
                    return Err(ClassifierError::InvalidParameter(format!(
                        "rbf gamma must be positive, got {gamma}"
                    )));
                }
                Ok(())
            }
        }
    }

    /// Short name for logs and model summaries.
    pub fn name(&self) -> &'static str {
        match self {
            KernelSpec::Linear => "linear",
            KernelSpec::Polynomial { .. } => "polynomial",
            KernelSpec::Rbf { .. } => "rbf",
        }
    }
}

impl Kernel for KernelSpec {
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64 {
        match *self {
            KernelSpec::Linear => x.dot(y),
            KernelSpec::Polynomial {
                degree,
                gamma,
                coef0,
            } => (gamma * x.dot(y) + coef0).powi(degree as i32),
            KernelSpec::Rbf { gamma } => {
                let distance_sq = x.norm_squared() + y.norm_squared() - 2.0 * x.dot(y);
                (-gamma * distance_sq.max(0.0)).exp()
            }
        }
    }
}
