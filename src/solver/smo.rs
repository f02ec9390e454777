//! Sequential Minimal Optimization (SMO) solver
//!
//! Solves the binary SVM dual problem by repeatedly optimizing pairs of
//! Lagrange multipliers: an outer loop alternates between scanning all
//! samples and only the non-bound ones for KKT violations, and a second
//! variable is chosen to maximize the error difference |E_i - E_j|, with
//! deterministic fallback scans when that step makes no progress.

use crate::cache::KernelCache;
use crate::core::{BinarySample, ClassifierError, OptimizationResult, OptimizerConfig, Result};
use crate::kernel::Kernel;
use log::debug;
use std::sync::Arc;

/// Alphas below this are treated as zero when collecting support vectors.
const SUPPORT_VECTOR_THRESHOLD: f64 = 1e-8;

/// SMO solver for the binary SVM dual problem.
pub struct SmoSolver<K: Kernel> {
    kernel: Arc<K>,
    config: OptimizerConfig,
}

impl<K: Kernel> SmoSolver<K> {
    pub fn new(kernel: Arc<K>, config: OptimizerConfig) -> Self {
        Self { kernel, config }
    }

    /// Solve for the given samples.
    ///
    /// Labels must be strictly +1 or -1; the caller is responsible for
    /// mapping class ids onto signs.
    pub fn solve(&self, samples: &[BinarySample]) -> Result<OptimizationResult> {
        if samples.is_empty() {
            return Err(ClassifierError::EmptyDataset);
        }
        for sample in samples {
            if sample.label != 1.0 && sample.label != -1.0 {
                return Err(ClassifierError::NonBinaryLabel(sample.label));
            }
        }

        let n = samples.len();
        let mut ws = Workspace {
            kernel: self.kernel.as_ref(),
            config: &self.config,
            samples,
            alpha: vec![0.0; n],
            // With all alphas zero the output is zero, so E_i = -y_i
            errors: samples.iter().map(|s| -s.label).collect(),
            cache: KernelCache::with_memory_limit(self.config.cache_size),
        };

        let mut iterations = 0;
        let mut num_changed = 0;
        let mut examine_all = true;

        while (num_changed > 0 || examine_all) && iterations < self.config.max_iterations {
            num_changed = 0;

            if examine_all {
                for i in 0..n {
                    if ws.examine(i) {
                        num_changed += 1;
                    }
                }
            } else {
                for i in 0..n {
                    if ws.is_non_bound(i) && ws.examine(i) {
                        num_changed += 1;
                    }
                }
            }

            if examine_all {
                examine_all = false;
            } else if num_changed == 0 {
                examine_all = true;
            }

            iterations += 1;
        }

        let b = ws.bias();

        let support_vectors: Vec<usize> = ws
            .alpha
            .iter()
            .enumerate()
            .filter_map(|(i, &a)| (a > SUPPORT_VECTOR_THRESHOLD).then_some(i))
            .collect();

        debug!(
            "SMO converged: {} passes, {} support vectors, cache hit rate {:.1}%",
            iterations,
            support_vectors.len(),
            ws.cache.hit_rate() * 100.0
        );

        Ok(OptimizationResult {
            alpha: ws.alpha,
            b,
            support_vectors,
            iterations,
        })
    }
}

/// Mutable solver state for one `solve` call.
struct Workspace<'a, K: Kernel> {
    kernel: &'a K,
    config: &'a OptimizerConfig,
    samples: &'a [BinarySample],
    alpha: Vec<f64>,
    /// Error cache: E_i = output_i - y_i
    errors: Vec<f64>,
    cache: KernelCache,
}

impl<K: Kernel> Workspace<'_, K> {
    fn kernel_value(&mut self, i: usize, j: usize) -> f64 {
        let kernel = self.kernel;
        let samples = self.samples;
        self.cache
            .get_or_compute(i, j, || kernel.compute(&samples[i].features, &samples[j].features))
    }

    fn is_non_bound(&self, i: usize) -> bool {
        self.alpha[i] > 0.0 && self.alpha[i] < self.config.c
    }

    /// Check sample `i` for a KKT violation and try to optimize it against
    /// a second variable.
    fn examine(&mut self, i: usize) -> bool {
        let y_i = self.samples[i].label;
        let alpha_i = self.alpha[i];
        let e_i = self.errors[i];
        let r_i = e_i * y_i;

        // KKT violation: the multiplier wants to move but is not at the
        // bound that would stop it.
        let violated = (r_i < -self.config.epsilon && alpha_i < self.config.c)
            || (r_i > self.config.epsilon && alpha_i > 0.0);
        if !violated {
            return false;
        }

        // First choice: maximize |E_i - E_j|
        if let Some(j) = self.second_choice(i, e_i) {
            if self.take_step(i, j) {
                return true;
            }
        }

        // Fallback: scan non-bound variables from a deterministic offset
        let n = self.samples.len();
        for offset in 0..n {
            let j = (i + 1 + offset) % n;
            if j != i && self.is_non_bound(j) && self.take_step(i, j) {
                return true;
            }
        }

        // Last resort: scan everything
        for offset in 0..n {
            let j = (i + 1 + offset) % n;
            if j != i && self.take_step(i, j) {
                return true;
            }
        }

        false
    }

    /// Second-variable heuristic: the sample whose cached error is
    /// furthest from E_i gives the largest expected step.
    fn second_choice(&self, i: usize, e_i: f64) -> Option<usize> {
        let mut best_j = None;
        let mut max_diff = 0.0;

        for j in 0..self.samples.len() {
            if j == i {
                continue;
            }
            let diff = (e_i - self.errors[j]).abs();
            if diff > max_diff {
                max_diff = diff;
                best_j = Some(j);
            }
        }

        best_j
    }

    /// Jointly optimize alpha_i and alpha_j, keeping the linear constraint
    /// sum(alpha_k * y_k) = 0 intact.
    fn take_step(&mut self, i: usize, j: usize) -> bool {
        if i == j {
            return false;
        }

        let y_i = self.samples[i].label;
        let y_j = self.samples[j].label;
        let alpha_i_old = self.alpha[i];
        let alpha_j_old = self.alpha[j];
        let e_i = self.errors[i];
        let e_j = self.errors[j];
        let c = self.config.c;

        // Feasible range for the new alpha_j
        let (low, high) = if y_i != y_j {
            let diff = alpha_j_old - alpha_i_old;
            (0.0_f64.max(diff), c.min(c + diff))
        } else {
            let sum = alpha_i_old + alpha_j_old;
            (0.0_f64.max(sum - c), c.min(sum))
        };

        if low >= high {
            return false;
        }

        let k_ii = self.kernel_value(i, i);
        let k_ij = self.kernel_value(i, j);
        let k_jj = self.kernel_value(j, j);

        // Second derivative of the objective along the constraint line
        let eta = k_ii + k_jj - 2.0 * k_ij;
        if eta <= 0.0 {
            // Degenerate direction; skip rather than evaluate endpoints
            return false;
        }

        let mut alpha_j_new = alpha_j_old + y_j * (e_i - e_j) / eta;
        alpha_j_new = alpha_j_new.clamp(low, high);

        // Ignore steps too small to matter
        if (alpha_j_new - alpha_j_old).abs()
            < self.config.epsilon * (alpha_j_new + alpha_j_old + self.config.epsilon)
        {
            return false;
        }

        let alpha_i_new = alpha_i_old + y_i * y_j * (alpha_j_old - alpha_j_new);

        self.alpha[i] = alpha_i_new;
        self.alpha[j] = alpha_j_new;

        // Incremental error cache update for every sample
        let delta_i = y_i * (alpha_i_new - alpha_i_old);
        let delta_j = y_j * (alpha_j_new - alpha_j_old);

        for k in 0..self.samples.len() {
            let k_ik = self.kernel_value(i, k);
            let k_jk = self.kernel_value(j, k);
            self.errors[k] += delta_i * k_ik + delta_j * k_jk;
        }

        true
    }

    /// Estimate the bias from margin support vectors, falling back to all
    /// support vectors when none sit strictly inside the box.
    fn bias(&self) -> f64 {
        let eps = self.config.epsilon;
        let c = self.config.c;

        let margin: Vec<f64> = self
            .alpha
            .iter()
            .zip(self.errors.iter())
            .filter(|(&a, _)| a > eps && a < c - eps)
            .map(|(_, &e)| e)
            .collect();

        let pool: Vec<f64> = if !margin.is_empty() {
            margin
        } else {
            self.alpha
                .iter()
                .zip(self.errors.iter())
                .filter(|(&a, _)| a > SUPPORT_VECTOR_THRESHOLD)
                .map(|(_, &e)| e)
                .collect()
        };

        if pool.is_empty() {
            0.0
        } else {
            -pool.iter().sum::<f64>() / pool.len() as f64
        }
    }
}
