//! Model serialization and persistence
//!
//! Saves a fitted one-vs-one model together with its label encoder so a
//! later process can predict without retraining. Models are stored as
//! JSON with enough metadata to identify how they were produced.

use crate::core::{ClassifierError, OptimizerConfig, Result, SparseVector};
use crate::encode::LabelEncoder;
use crate::kernel::KernelSpec;
use crate::model::{MulticlassModel, PairwiseMachine, TrainedBinarySvm};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

/// Serializable representation of a fitted multiclass model.
#[derive(Serialize, Deserialize)]
pub struct SavedModel {
    /// Kernel description, used to rebuild the decision functions
    pub kernel: KernelSpec,
    /// Raw labels in class-id order (the label encoder's table)
    pub classes: Vec<i64>,
    /// Size of the class-id space the machines vote over
    pub n_classes: usize,
    /// One entry per trained class pair
    pub machines: Vec<SavedMachine>,
    pub metadata: ModelMetadata,
}

/// One serialized binary machine.
#[derive(Serialize, Deserialize)]
pub struct SavedMachine {
    pub positive: usize,
    pub negative: usize,
    pub support_vectors: Vec<SavedVector>,
    /// alpha_i * y_i per support vector
    pub alpha_y: Vec<f64>,
    pub bias: f64,
}

/// Serialized sparse pixel vector.
#[derive(Serialize, Deserialize, Clone)]
pub struct SavedVector {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

/// Model metadata for tracking and validation.
#[derive(Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Crate version that produced the model
    pub library_version: String,
    /// Total support vectors across all machines
    pub n_support_vectors: usize,
    pub training_params: TrainingParams,
    /// Creation timestamp, RFC 3339
    pub created_at: String,
}

/// Training parameters recorded for reference.
#[derive(Serialize, Deserialize, Clone)]
pub struct TrainingParams {
    pub c: f64,
    pub epsilon: f64,
    pub max_iterations: usize,
}

impl From<&OptimizerConfig> for TrainingParams {
    fn from(config: &OptimizerConfig) -> Self {
        Self {
            c: config.c,
            epsilon: config.epsilon,
            max_iterations: config.max_iterations,
        }
    }
}

impl From<&SparseVector> for SavedVector {
    fn from(v: &SparseVector) -> Self {
        Self {
            indices: v.indices.clone(),
            values: v.values.clone(),
        }
    }
}

impl SavedModel {
    /// Capture a fitted model, its encoder, and the parameters used.
    pub fn from_trained(
        model: &MulticlassModel<KernelSpec>,
        encoder: &LabelEncoder,
        kernel: KernelSpec,
        config: &OptimizerConfig,
    ) -> Self {
        let machines: Vec<SavedMachine> = model
            .machines()
            .iter()
            .map(|m| SavedMachine {
                positive: m.positive,
                negative: m.negative,
                support_vectors: m.svm.support_vectors().iter().map(SavedVector::from).collect(),
                alpha_y: m.svm.alpha_y().to_vec(),
                bias: m.svm.bias(),
            })
            .collect();

        Self {
            kernel,
            classes: encoder.classes().to_vec(),
            n_classes: model.n_classes(),
            machines,
            metadata: ModelMetadata {
                library_version: crate::VERSION.to_string(),
                n_support_vectors: model.n_support_vectors(),
                training_params: TrainingParams::from(config),
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    /// Save as pretty-printed JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| ClassifierError::SerializationError(e.to_string()))?;
        Ok(())
    }

    /// Load from a JSON model file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| ClassifierError::SerializationError(e.to_string()))
    }

    /// Rebuild the usable model and encoder, validating the file contents.
    pub fn to_model(&self) -> Result<(MulticlassModel<KernelSpec>, LabelEncoder)> {
        self.kernel.validate()?;

        if self.classes.is_empty() {
            return Err(ClassifierError::SerializationError(
                "model file lists no classes".to_string(),
            ));
        }

        let kernel = Arc::new(self.kernel);
        let mut machines = Vec::with_capacity(self.machines.len());

        for m in &self.machines {
            if m.positive >= self.n_classes || m.negative >= self.n_classes {
                return Err(ClassifierError::SerializationError(format!(
                    "machine {}v{} references a class outside 0..{}",
                    m.positive, m.negative, self.n_classes
                )));
            }
            if m.support_vectors.len() != m.alpha_y.len() {
                return Err(ClassifierError::SerializationError(format!(
                    "machine {}v{}: {} support vectors but {} coefficients",
                    m.positive,
                    m.negative,
                    m.support_vectors.len(),
                    m.alpha_y.len()
                )));
            }

            let support_vectors: Vec<SparseVector> = m
                .support_vectors
                .iter()
                .map(|v| SparseVector::new(v.indices.clone(), v.values.clone()))
                .collect();

            machines.push(PairwiseMachine {
                positive: m.positive,
                negative: m.negative,
                svm: TrainedBinarySvm::from_parts(
                    Arc::clone(&kernel),
                    support_vectors,
                    m.alpha_y.clone(),
                    m.bias,
                ),
            });
        }

        let model = MulticlassModel::from_parts(self.n_classes, machines);
        let encoder = LabelEncoder::fit(&self.classes)?;

        Ok((model, encoder))
    }

    /// Print a human-readable summary.
    pub fn print_summary(&self) {
        println!("=== Model Summary ===");
        println!("Kernel: {:?}", self.kernel);
        println!("Classes: {:?}", self.classes);
        println!("Machines: {}", self.machines.len());
        println!("Support vectors: {}", self.metadata.n_support_vectors);
        println!("Library version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at);
        println!("Training parameters:");
        println!("  C: {}", self.metadata.training_params.c);
        println!("  Epsilon: {}", self.metadata.training_params.epsilon);
        println!(
            "  Max iterations: {}",
            self.metadata.training_params.max_iterations
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MulticlassSvm;
    use tempfile::NamedTempFile;

    fn image(values: &[f64]) -> SparseVector {
        SparseVector::from_dense(values)
    }

    fn fitted_model() -> (MulticlassModel<KernelSpec>, LabelEncoder, KernelSpec) {
        let images = vec![
            image(&[4.0, 0.0]),
            image(&[4.5, 0.1]),
            image(&[-4.0, 4.0]),
            image(&[-4.2, 4.1]),
            image(&[0.0, -4.0]),
            image(&[0.1, -4.3]),
        ];
        let raw_labels = vec![3, 3, 7, 7, 9, 9];

        let (encoder, classes) = LabelEncoder::fit_transform(&raw_labels).unwrap();
        let kernel = KernelSpec::Linear;
        let model = MulticlassSvm::new(kernel)
            .fit(&images, &classes)
            .expect("training should succeed");

        (model, encoder, kernel)
    }

    #[test]
    fn test_save_load_round_trip() {
        let (model, encoder, kernel) = fitted_model();
        let config = OptimizerConfig::default();
        let saved = SavedModel::from_trained(&model, &encoder, kernel, &config);

        let temp_file = NamedTempFile::new().expect("temp file");
        saved.save_to_file(temp_file.path()).expect("save");

        let loaded = SavedModel::load_from_file(temp_file.path()).expect("load");
        assert_eq!(loaded.kernel, kernel);
        assert_eq!(loaded.classes, vec![3, 7, 9]);
        assert_eq!(loaded.machines.len(), 3);
        assert_eq!(
            loaded.metadata.n_support_vectors,
            saved.metadata.n_support_vectors
        );
    }

    #[test]
    fn test_reconstructed_model_predicts_identically() {
        let (model, encoder, kernel) = fitted_model();
        let config = OptimizerConfig::default();
        let saved = SavedModel::from_trained(&model, &encoder, kernel, &config);

        let (rebuilt, rebuilt_encoder) = saved.to_model().expect("reconstruct");
        assert_eq!(rebuilt.n_classes(), model.n_classes());
        assert_eq!(rebuilt_encoder, encoder);

        let probes = vec![
            image(&[4.2, 0.0]),
            image(&[-4.1, 4.0]),
            image(&[0.0, -4.1]),
            image(&[1.0, 1.0]),
        ];
        for probe in &probes {
            assert_eq!(rebuilt.predict(probe), model.predict(probe));
        }
    }

    #[test]
    fn test_corrupt_machine_rejected() {
        let (model, encoder, kernel) = fitted_model();
        let config = OptimizerConfig::default();
        let mut saved = SavedModel::from_trained(&model, &encoder, kernel, &config);

        saved.machines[0].alpha_y.push(1.0);
        assert!(matches!(
            saved.to_model(),
            Err(ClassifierError::SerializationError(_))
        ));
    }

    #[test]
    fn test_out_of_range_class_rejected() {
        let (model, encoder, kernel) = fitted_model();
        let config = OptimizerConfig::default();
        let mut saved = SavedModel::from_trained(&model, &encoder, kernel, &config);

        saved.machines[0].positive = 99;
        assert!(matches!(
            saved.to_model(),
            Err(ClassifierError::SerializationError(_))
        ));
    }

    #[test]
    fn test_invalid_kernel_rejected() {
        let (model, encoder, _) = fitted_model();
        let config = OptimizerConfig::default();
        let bad_kernel = KernelSpec::Rbf { gamma: -1.0 };
        let saved = SavedModel::from_trained(&model, &encoder, bad_kernel, &config);

        assert!(saved.to_model().is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = SavedModel::load_from_file("/nonexistent/model.json");
        assert!(matches!(result, Err(ClassifierError::IoError(_))));
    }
}
