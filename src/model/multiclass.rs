//! One-vs-one multiclass reduction
//!
//! Trains one binary machine per unordered pair of classes, each on just
//! the samples of its two classes, and predicts by majority vote. Pairwise
//! problems stay small and balanced, at the cost of k*(k-1)/2 machines.

use crate::core::{BinarySample, ClassifierError, OptimizerConfig, Result, SparseVector};
use crate::kernel::Kernel;
use crate::model::binary::{BinarySvm, TrainedBinarySvm};
use log::{debug, info};
use std::sync::Arc;

/// Multiclass SVM trainer with builder-style configuration.
pub struct MulticlassSvm<K: Kernel> {
    kernel: Arc<K>,
    config: OptimizerConfig,
}

impl<K: Kernel> MulticlassSvm<K> {
    pub fn new(kernel: K) -> Self {
        Self {
            kernel: Arc::new(kernel),
            config: OptimizerConfig::default(),
        }
    }

    /// Set regularization parameter C
    pub fn with_c(mut self, c: f64) -> Self {
        self.config.c = c;
        self
    }

    /// Set convergence tolerance
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.config.epsilon = epsilon;
        self
    }

    /// Set maximum number of solver passes
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set kernel cache size in bytes
    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.config.cache_size = cache_size;
        self
    }

    /// Fit on pixel vectors with contiguous class ids (0..k-1).
    pub fn fit(
        &self,
        images: &[SparseVector],
        classes: &[usize],
    ) -> Result<MulticlassModel<K>> {
        if images.is_empty() {
            return Err(ClassifierError::EmptyDataset);
        }
        if images.len() != classes.len() {
            return Err(ClassifierError::InvalidParameter(format!(
                "got {} images but {} class ids",
                images.len(),
                classes.len()
            )));
        }

        let n_classes = classes.iter().max().map_or(0, |&c| c + 1);

        // Classes actually present; a split can leave a class empty, in
        // which case no machine involves it and it can never win a vote.
        let mut present: Vec<usize> = classes.to_vec();
        present.sort_unstable();
        present.dedup();

        info!(
            "Training one-vs-one SVM: {} samples, {} classes, {} machines",
            images.len(),
            present.len(),
            present.len() * present.len().saturating_sub(1) / 2
        );

        let trainer = BinarySvm::new(Arc::clone(&self.kernel), self.config.clone());
        let mut machines = Vec::new();

        for (pi, &positive) in present.iter().enumerate() {
            for &negative in &present[pi + 1..] {
                let pair: Vec<BinarySample> = images
                    .iter()
                    .zip(classes.iter())
                    .filter(|(_, &c)| c == positive || c == negative)
                    .map(|(img, &c)| {
                        let sign = if c == positive { 1.0 } else { -1.0 };
                        BinarySample::new(img.clone(), sign)
                    })
                    .collect();

                let svm = trainer.fit(&pair)?;
                debug!(
                    "machine {}v{}: {} samples, {} support vectors",
                    positive,
                    negative,
                    pair.len(),
                    svm.n_support_vectors()
                );

                machines.push(PairwiseMachine {
                    positive,
                    negative,
                    svm,
                });
            }
        }

        Ok(MulticlassModel {
            n_classes,
            machines,
        })
    }
}

/// One fitted binary machine of the one-vs-one ensemble.
pub struct PairwiseMachine<K: Kernel> {
    /// Class mapped to +1
    pub positive: usize,
    /// Class mapped to -1
    pub negative: usize,
    pub svm: TrainedBinarySvm<K>,
}

/// A fitted one-vs-one multiclass model.
pub struct MulticlassModel<K: Kernel> {
    n_classes: usize,
    machines: Vec<PairwiseMachine<K>>,
}

impl<K: Kernel> MulticlassModel<K> {
    /// Reassemble a model from its stored parts (used by persistence).
    pub fn from_parts(n_classes: usize, machines: Vec<PairwiseMachine<K>>) -> Self {
        Self {
            n_classes,
            machines,
        }
    }

    /// Predict the class id for one pixel vector.
    ///
    /// Majority vote over all machines; ties are broken by accumulated
    /// decision values, then by the lower class id.
    pub fn predict(&self, x: &SparseVector) -> usize {
        let mut votes = vec![0usize; self.n_classes];
        let mut scores = vec![0.0f64; self.n_classes];

        for machine in &self.machines {
            let pred = machine.svm.predict(x);
            if pred.label > 0.0 {
                votes[machine.positive] += 1;
            } else {
                votes[machine.negative] += 1;
            }
            scores[machine.positive] += pred.decision_value;
            scores[machine.negative] -= pred.decision_value;
        }

        let mut winner = 0;
        for candidate in 1..self.n_classes {
            if votes[candidate] > votes[winner]
                || (votes[candidate] == votes[winner] && scores[candidate] > scores[winner])
            {
                winner = candidate;
            }
        }
        winner
    }

    /// Predict class ids for a batch of pixel vectors.
    pub fn predict_batch(&self, images: &[SparseVector]) -> Vec<usize> {
        images.iter().map(|x| self.predict(x)).collect()
    }

    /// Fraction of correctly classified samples.
    pub fn accuracy(&self, images: &[SparseVector], classes: &[usize]) -> f64 {
        if images.is_empty() {
            return 0.0;
        }
        let correct = images
            .iter()
            .zip(classes.iter())
            .filter(|(x, &c)| self.predict(x) == c)
            .count();
        correct as f64 / images.len() as f64
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_machines(&self) -> usize {
        self.machines.len()
    }

    pub fn machines(&self) -> &[PairwiseMachine<K>] {
        &self.machines
    }

    /// Total support vectors across all machines.
    pub fn n_support_vectors(&self) -> usize {
        self.machines
            .iter()
            .map(|m| m.svm.n_support_vectors())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::LinearKernel;

    fn image(values: &[f64]) -> SparseVector {
        SparseVector::from_dense(values)
    }

    /// Three well-separated clusters in 2D.
    fn three_cluster_data() -> (Vec<SparseVector>, Vec<usize>) {
        let images = vec![
            image(&[5.0, 0.0]),
            image(&[5.5, 0.2]),
            image(&[4.8, -0.1]),
            image(&[-5.0, 5.0]),
            image(&[-5.2, 5.3]),
            image(&[-4.9, 4.8]),
            image(&[0.0, -5.0]),
            image(&[0.2, -5.4]),
            image(&[-0.1, -4.7]),
        ];
        let classes = vec![0, 0, 0, 1, 1, 1, 2, 2, 2];
        (images, classes)
    }

    #[test]
    fn test_fit_builds_one_machine_per_pair() {
        let (images, classes) = three_cluster_data();
        let model = MulticlassSvm::new(LinearKernel::new())
            .fit(&images, &classes)
            .expect("training should succeed");

        assert_eq!(model.n_classes(), 3);
        assert_eq!(model.n_machines(), 3); // 3 choose 2
        assert!(model.n_support_vectors() > 0);
    }

    #[test]
    fn test_training_data_classified_correctly() {
        let (images, classes) = three_cluster_data();
        let model = MulticlassSvm::new(LinearKernel::new())
            .fit(&images, &classes)
            .expect("training should succeed");

        for (img, &class) in images.iter().zip(classes.iter()) {
            assert_eq!(model.predict(img), class);
        }
        assert_eq!(model.accuracy(&images, &classes), 1.0);
    }

    #[test]
    fn test_predict_batch_matches_predict() {
        let (images, classes) = three_cluster_data();
        let model = MulticlassSvm::new(LinearKernel::new())
            .fit(&images, &classes)
            .expect("training should succeed");

        let batch = model.predict_batch(&images);
        let singles: Vec<usize> = images.iter().map(|x| model.predict(x)).collect();
        assert_eq!(batch, singles);
    }

    #[test]
    fn test_two_class_problem() {
        let images = vec![image(&[2.0]), image(&[1.5]), image(&[-2.0]), image(&[-1.5])];
        let classes = vec![0, 0, 1, 1];

        let model = MulticlassSvm::new(LinearKernel::new())
            .with_c(10.0)
            .fit(&images, &classes)
            .expect("training should succeed");

        assert_eq!(model.n_machines(), 1);
        assert_eq!(model.predict(&image(&[3.0])), 0);
        assert_eq!(model.predict(&image(&[-3.0])), 1);
    }

    #[test]
    fn test_absent_class_never_wins() {
        // Class 1 is missing from the training subset: only the 0v2
        // machine exists, so predictions are 0 or 2.
        let images = vec![image(&[2.0]), image(&[1.5]), image(&[-2.0]), image(&[-1.5])];
        let classes = vec![0, 0, 2, 2];

        let model = MulticlassSvm::new(LinearKernel::new())
            .fit(&images, &classes)
            .expect("training should succeed");

        assert_eq!(model.n_classes(), 3);
        assert_eq!(model.n_machines(), 1);

        for probe in [image(&[4.0]), image(&[-4.0]), image(&[0.1])] {
            assert_ne!(model.predict(&probe), 1);
        }
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let images = vec![image(&[1.0])];
        let classes = vec![0, 1];

        let result = MulticlassSvm::new(LinearKernel::new()).fit(&images, &classes);
        assert!(matches!(result, Err(ClassifierError::InvalidParameter(_))));
    }

    #[test]
    fn test_empty_input_rejected() {
        let result = MulticlassSvm::new(LinearKernel::new()).fit(&[], &[]);
        assert!(matches!(result, Err(ClassifierError::EmptyDataset)));
    }

    #[test]
    fn test_blank_images_tie_resolves_to_first_class() {
        // All-zero pixels with a zero-coef0 polynomial kernel: every
        // decision value is 0, each machine votes for its positive class,
        // and the lowest class id wins the tie.
        let kernel = crate::kernel::PolynomialKernel::new(2, 0.5, 0.0);
        let images = vec![SparseVector::empty(), SparseVector::empty()];
        let classes = vec![0, 1];

        let model = MulticlassSvm::new(kernel)
            .fit(&images, &classes)
            .expect("training should succeed");

        assert_eq!(model.predict(&SparseVector::empty()), 0);
    }
}
