//! Dense CSV loaders for digit image data
//!
//! Two layouts are supported:
//! - labeled training file: a label column followed by one column per
//!   pixel (`label,pixel0,...,pixel783`)
//! - unlabeled test file: pixel columns only
//!
//! A header row is detected automatically (most fields non-numeric) and
//! skipped. Rows are stored as sparse pixel vectors since digit images
//! are mostly background.

use crate::core::{ClassifierError, Result, SparseVector};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Maximum raw pixel intensity, used for optional normalization.
const PIXEL_MAX: f64 = 255.0;

/// Labeled digit images: parallel pixel vectors and raw labels.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    images: Vec<SparseVector>,
    labels: Vec<i64>,
    dim: usize,
}

impl TrainingSet {
    /// Load from a CSV file with a leading label column.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load from any buffered reader (used heavily in tests).
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut images = Vec::new();
        let mut labels = Vec::new();
        let mut dim = None;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if images.is_empty() && is_header_line(line) {
                continue;
            }

            let fields = split_fields(line);
            if fields.len() < 2 {
                return Err(ClassifierError::ParseError(format!(
                    "line {}: expected a label and at least one pixel",
                    line_num + 1
                )));
            }

            let label = fields[0].parse::<i64>().map_err(|_| {
                ClassifierError::ParseError(format!(
                    "line {}: invalid label: {}",
                    line_num + 1,
                    fields[0]
                ))
            })?;

            let pixels = parse_pixels(&fields[1..], line_num)?;
            check_width(&mut dim, pixels.len())?;

            images.push(SparseVector::from_dense(&pixels));
            labels.push(label);
        }

        if images.is_empty() {
            return Err(ClassifierError::EmptyDataset);
        }

        Ok(Self {
            images,
            labels,
            dim: dim.unwrap_or(0),
        })
    }

    /// Scale all pixel intensities into [0, 1].
    pub fn normalize(&mut self) {
        for image in &mut self.images {
            for value in &mut image.values {
                *value /= PIXEL_MAX;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Pixel columns per image.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn images(&self) -> &[SparseVector] {
        &self.images
    }

    pub fn labels(&self) -> &[i64] {
        &self.labels
    }
}

/// Unlabeled digit images in input order.
#[derive(Debug, Clone)]
pub struct TestSet {
    images: Vec<SparseVector>,
    dim: usize,
}

impl TestSet {
    /// Load from a CSV file of pixel columns only.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut images = Vec::new();
        let mut dim = None;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if images.is_empty() && is_header_line(line) {
                continue;
            }

            let fields = split_fields(line);
            let pixels = parse_pixels(&fields, line_num)?;
            check_width(&mut dim, pixels.len())?;

            images.push(SparseVector::from_dense(&pixels));
        }

        if images.is_empty() {
            return Err(ClassifierError::EmptyDataset);
        }

        Ok(Self {
            images,
            dim: dim.unwrap_or(0),
        })
    }

    /// Scale all pixel intensities into [0, 1].
    pub fn normalize(&mut self) {
        for image in &mut self.images {
            for value in &mut image.values {
                *value /= PIXEL_MAX;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn images(&self) -> &[SparseVector] {
        &self.images
    }
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(',').map(|f| f.trim()).collect()
}

/// A line is a header when most of its fields fail to parse as numbers.
fn is_header_line(line: &str) -> bool {
    let fields = split_fields(line);
    if fields.is_empty() {
        return false;
    }

    let non_numeric = fields
        .iter()
        .filter(|field| field.parse::<f64>().is_err())
        .count();

    non_numeric > fields.len() / 2
}

fn parse_pixels(fields: &[&str], line_num: usize) -> Result<Vec<f64>> {
    fields
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            field.parse::<f64>().map_err(|_| {
                ClassifierError::ParseError(format!(
                    "line {}: invalid pixel value at column {}: {}",
                    line_num + 1,
                    idx + 1,
                    field
                ))
            })
        })
        .collect()
}

/// Enforce a rectangular file: every row must match the first row's width.
fn check_width(dim: &mut Option<usize>, actual: usize) -> Result<()> {
    match *dim {
        None => {
            *dim = Some(actual);
            Ok(())
        }
        Some(expected) if expected == actual => Ok(()),
        Some(expected) => Err(ClassifierError::DimensionMismatch { expected, actual }),
    }
}
