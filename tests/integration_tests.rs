//! Integration tests for the digitsvm library
//!
//! These exercise the library surface end to end: CSV loading, label
//! encoding, splitting, multiclass training, metrics, persistence, and
//! submission output working together.

use digitsvm::core::OptimizerConfig;
use digitsvm::encode::LabelEncoder;
use digitsvm::kernel::KernelSpec;
use digitsvm::metrics::ConfusionMatrix;
use digitsvm::model::MulticlassSvm;
use digitsvm::persistence::SavedModel;
use digitsvm::{data, submission, TrainingSet};
use std::io::Write;
use tempfile::NamedTempFile;

/// Two linearly separable "digit" classes in a 4-pixel space.
fn write_labeled_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(file, "label,pixel0,pixel1,pixel2,pixel3").expect("write");
    writeln!(file, "3,200,180,0,0").expect("write");
    writeln!(file, "3,210,190,0,0").expect("write");
    writeln!(file, "3,190,170,0,0").expect("write");
    writeln!(file, "3,205,185,0,0").expect("write");
    writeln!(file, "8,0,0,200,180").expect("write");
    writeln!(file, "8,0,0,210,190").expect("write");
    writeln!(file, "8,0,0,190,170").expect("write");
    writeln!(file, "8,0,0,205,185").expect("write");
    file.flush().expect("flush");
    file
}

#[test]
fn test_complete_training_workflow() {
    let file = write_labeled_csv();
    let mut training = TrainingSet::from_file(file.path()).expect("load");
    training.normalize();

    assert_eq!(training.len(), 8);
    assert_eq!(training.dim(), 4);

    let (encoder, classes) = LabelEncoder::fit_transform(training.labels()).expect("encode");
    assert_eq!(encoder.classes(), &[3, 8]);

    let kernel = KernelSpec::polynomial_auto(2, training.dim());
    let model = MulticlassSvm::new(kernel)
        .with_c(100.0)
        .fit(training.images(), &classes)
        .expect("train");

    assert_eq!(model.n_machines(), 1);
    assert_eq!(model.accuracy(training.images(), &classes), 1.0);

    // Predictions decode back to the raw labels
    let predicted = model.predict_batch(training.images());
    let labels = encoder.decode_batch(&predicted).expect("decode");
    assert_eq!(labels, training.labels());
}

#[test]
fn test_split_then_train_then_score() {
    let file = write_labeled_csv();
    let mut training = TrainingSet::from_file(file.path()).expect("load");
    training.normalize();

    let (encoder, classes) = LabelEncoder::fit_transform(training.labels()).expect("encode");
    let (train_idx, val_idx) = data::split_indices(training.len(), 0.25, 0).expect("split");

    assert_eq!(train_idx.len(), 6);
    assert_eq!(val_idx.len(), 2);

    let train_images = data::gather(training.images(), &train_idx);
    let train_classes = data::gather(&classes, &train_idx);
    let val_images = data::gather(training.images(), &val_idx);
    let val_classes = data::gather(&classes, &val_idx);

    let model = MulticlassSvm::new(KernelSpec::Linear)
        .with_c(100.0)
        .fit(&train_images, &train_classes)
        .expect("train");

    // Clusters are far apart, so held-out rows classify cleanly
    assert_eq!(model.accuracy(&val_images, &val_classes), 1.0);

    let predicted = model.predict_batch(&val_images);
    let matrix =
        ConfusionMatrix::from_pairs(encoder.len(), &predicted, &val_classes).expect("matrix");
    assert_eq!(matrix.accuracy(), 1.0);
    assert_eq!(matrix.total(), 2);
}

#[test]
fn test_save_load_predict_cycle() {
    let file = write_labeled_csv();
    let mut training = TrainingSet::from_file(file.path()).expect("load");
    training.normalize();

    let (encoder, classes) = LabelEncoder::fit_transform(training.labels()).expect("encode");
    let kernel = KernelSpec::polynomial_auto(2, training.dim());
    let config = OptimizerConfig {
        c: 100.0,
        ..OptimizerConfig::default()
    };

    let model = MulticlassSvm::new(kernel)
        .with_c(config.c)
        .fit(training.images(), &classes)
        .expect("train");

    let model_file = NamedTempFile::new().expect("temp file");
    SavedModel::from_trained(&model, &encoder, kernel, &config)
        .save_to_file(model_file.path())
        .expect("save");

    let loaded = SavedModel::load_from_file(model_file.path()).expect("load");
    let (rebuilt, rebuilt_encoder) = loaded.to_model().expect("reconstruct");

    assert_eq!(rebuilt_encoder.classes(), encoder.classes());
    for image in training.images() {
        assert_eq!(rebuilt.predict(image), model.predict(image));
    }
}

#[test]
fn test_predictions_to_submission_file() {
    let file = write_labeled_csv();
    let mut training = TrainingSet::from_file(file.path()).expect("load");
    training.normalize();

    let (encoder, classes) = LabelEncoder::fit_transform(training.labels()).expect("encode");
    let model = MulticlassSvm::new(KernelSpec::Linear)
        .with_c(100.0)
        .fit(training.images(), &classes)
        .expect("train");

    let predicted = model.predict_batch(training.images());
    let labels = encoder.decode_batch(&predicted).expect("decode");

    let out_file = NamedTempFile::new().expect("temp file");
    submission::write_predictions_to_file(out_file.path(), &labels).expect("write");

    let text = std::fs::read_to_string(out_file.path()).expect("read");
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), labels.len() + 1);
    assert_eq!(lines[0], "ImageId, Label");
    for (row, line) in lines.iter().skip(1).enumerate() {
        let (id, label) = line.split_once(',').expect("id,label");
        assert_eq!(id.parse::<usize>().unwrap(), row + 1);
        assert_eq!(label.parse::<i64>().unwrap(), labels[row]);
    }
}

#[test]
fn test_unseen_label_at_scoring_time_errors() {
    let file = write_labeled_csv();
    let training = TrainingSet::from_file(file.path()).expect("load");

    let (encoder, _) = LabelEncoder::fit_transform(training.labels()).expect("encode");

    // A labeled file containing a digit the encoder never saw
    let result = encoder.transform(&[3, 8, 5]);
    assert!(matches!(
        result,
        Err(digitsvm::ClassifierError::UnknownLabel(5))
    ));
}

#[test]
fn test_three_class_shifted_labels() {
    // Labels far from 0..k: encoding must still produce contiguous ids
    // and decoding must restore the originals.
    let images: Vec<_> = [
        [9.0, 0.0, 0.0],
        [8.5, 0.0, 0.0],
        [0.0, 9.0, 0.0],
        [0.0, 8.5, 0.0],
        [0.0, 0.0, 9.0],
        [0.0, 0.0, 8.5],
    ]
    .iter()
    .map(|row| digitsvm::SparseVector::from_dense(row))
    .collect();
    let raw_labels: Vec<i64> = vec![100, 100, 250, 250, 400, 400];

    let (encoder, classes) = LabelEncoder::fit_transform(&raw_labels).expect("encode");
    assert_eq!(classes, vec![0, 0, 1, 1, 2, 2]);

    let model = MulticlassSvm::new(KernelSpec::Linear)
        .with_c(100.0)
        .fit(&images, &classes)
        .expect("train");

    let predicted = model.predict_batch(&images);
    let decoded = encoder.decode_batch(&predicted).expect("decode");
    assert_eq!(decoded, raw_labels);
}
