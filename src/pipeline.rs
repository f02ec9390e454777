//! End-to-end digit classification pipeline
//!
//! Load a labeled training CSV, encode labels, hold out a seeded
//! validation split, fit a one-vs-one SVM, score it, refit on the full
//! dataset, predict an unlabeled test CSV, and write the submission file.
//!
//! The validation accuracy is a model-selection signal only: the final
//! model is refit on every training row before predicting, so the score
//! does not describe the deployed model.

use crate::core::{ClassifierError, Result};
use crate::data::{gather, split_indices, TestSet, TrainingSet};
use crate::encode::LabelEncoder;
use crate::kernel::KernelSpec;
use crate::model::MulticlassSvm;
use crate::submission;
use log::info;
use std::path::PathBuf;

/// Kernel selection deferred until the pixel count is known, so the
/// gamma = 1/n_features default can be applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelChoice {
    Linear,
    Polynomial { degree: u32 },
    Rbf,
}

impl KernelChoice {
    /// Resolve to a concrete kernel for `n_features` pixel columns.
    pub fn resolve(&self, n_features: usize) -> KernelSpec {
        match *self {
            KernelChoice::Linear => KernelSpec::Linear,
            KernelChoice::Polynomial { degree } => KernelSpec::polynomial_auto(degree, n_features),
            KernelChoice::Rbf => KernelSpec::rbf_auto(n_features),
        }
    }
}

/// Pipeline parameters. The defaults are the classic digit-recognizer
/// setup: `Data/train.csv` and `Data/test.csv` in, `result.csv` out, a
/// 20% validation holdout at seed 0, and a degree-2 polynomial kernel.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub output_path: PathBuf,
    /// Fraction of training rows held out for validation
    pub holdout_fraction: f64,
    /// Seed for the validation split
    pub seed: u64,
    pub kernel: KernelChoice,
    /// Regularization parameter C
    pub c: f64,
    /// Solver convergence tolerance
    pub epsilon: f64,
    /// Maximum solver passes per binary machine
    pub max_iterations: usize,
    /// Kernel cache size in bytes, per binary machine
    pub cache_size: usize,
    /// Scale pixel intensities into [0, 1] before training
    pub normalize: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            train_path: PathBuf::from("Data/train.csv"),
            test_path: PathBuf::from("Data/test.csv"),
            output_path: PathBuf::from("result.csv"),
            holdout_fraction: 0.2,
            seed: 0,
            kernel: KernelChoice::Polynomial { degree: 2 },
            c: 1.0,
            epsilon: 0.001,
            max_iterations: 10000,
            cache_size: 100_000_000,
            normalize: false,
        }
    }
}

/// What the pipeline did, for logging and tests.
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub n_train: usize,
    pub n_validation: usize,
    pub n_classes: usize,
    pub validation_accuracy: f64,
    pub n_predictions: usize,
    pub output_path: PathBuf,
}

/// Run the full pipeline.
pub fn run(config: &PipelineConfig) -> Result<PipelineSummary> {
    info!("Loading training data from {:?}", config.train_path);
    let mut training = TrainingSet::from_file(&config.train_path)?;
    if config.normalize {
        training.normalize();
    }
    info!(
        "Loaded {} training images with {} pixels each",
        training.len(),
        training.dim()
    );

    let (encoder, classes) = LabelEncoder::fit_transform(training.labels())?;
    info!(
        "Encoded {} distinct labels: {:?}",
        encoder.len(),
        encoder.classes()
    );

    let (train_idx, validation_idx) =
        split_indices(training.len(), config.holdout_fraction, config.seed)?;
    let train_images = gather(training.images(), &train_idx);
    let train_classes = gather(&classes, &train_idx);
    let validation_images = gather(training.images(), &validation_idx);
    let validation_classes = gather(&classes, &validation_idx);
    info!(
        "Split {} rows into {} train / {} validation (seed {})",
        training.len(),
        train_idx.len(),
        validation_idx.len(),
        config.seed
    );

    let kernel = config.kernel.resolve(training.dim());
    let trainer = MulticlassSvm::new(kernel)
        .with_c(config.c)
        .with_epsilon(config.epsilon)
        .with_max_iterations(config.max_iterations)
        .with_cache_size(config.cache_size);

    let holdout_model = trainer.fit(&train_images, &train_classes)?;
    let validation_accuracy =
        holdout_model.accuracy(&validation_images, &validation_classes);
    info!(
        "Validation accuracy: {:.2}% ({} machines)",
        validation_accuracy * 100.0,
        holdout_model.n_machines()
    );

    // Final model is refit on every training row; the holdout model and
    // its score are discarded past this point.
    let model = trainer.fit(training.images(), &classes)?;

    info!("Loading test data from {:?}", config.test_path);
    let mut test = TestSet::from_file(&config.test_path)?;
    if config.normalize {
        test.normalize();
    }
    if test.dim() != training.dim() {
        return Err(ClassifierError::DimensionMismatch {
            expected: training.dim(),
            actual: test.dim(),
        });
    }

    let predicted_classes = model.predict_batch(test.images());
    let predicted_labels = encoder.decode_batch(&predicted_classes)?;

    submission::write_predictions_to_file(&config.output_path, &predicted_labels)?;
    info!(
        "Wrote {} predictions to {:?}",
        predicted_labels.len(),
        config.output_path
    );

    Ok(PipelineSummary {
        n_train: train_idx.len(),
        n_validation: validation_idx.len(),
        n_classes: encoder.len(),
        validation_accuracy,
        n_predictions: predicted_labels.len(),
        output_path: config.output_path.clone(),
    })
}
