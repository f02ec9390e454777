//! Handwritten digit classification with a polynomial-kernel SVM
//!
//! Loads MNIST-style CSV data, encodes labels, holds out a seeded
//! validation split, trains a one-vs-one SVM with an SMO solver, and
//! writes leaderboard-format predictions.

pub mod cache;
pub mod core;
pub mod data;
pub mod encode;
pub mod kernel;
pub mod metrics;
pub mod model;
pub mod persistence;
pub mod pipeline;
pub mod solver;
pub mod submission;

// Re-export main types for convenience
pub use crate::cache::{CacheStats, KernelCache};
pub use crate::core::*;
pub use crate::data::{gather, split_indices, TestSet, TrainingSet};
pub use crate::encode::LabelEncoder;
pub use crate::kernel::{Kernel, KernelSpec, LinearKernel, PolynomialKernel, RbfKernel};
pub use crate::metrics::ConfusionMatrix;
pub use crate::model::{MulticlassModel, MulticlassSvm, TrainedBinarySvm};
pub use crate::persistence::SavedModel;
pub use crate::pipeline::{KernelChoice, PipelineConfig, PipelineSummary};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
