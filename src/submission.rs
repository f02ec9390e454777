//! Submission file output
//!
//! Writes the leaderboard-format prediction file: an `ImageId, Label`
//! header, then one row per prediction with 1-based sequential ids, in
//! input order.

use crate::core::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Header row. The space after the comma is part of the expected format.
pub const HEADER: &str = "ImageId, Label";

/// Write the header and one row per predicted label.
pub fn write_predictions<W: Write>(writer: &mut W, labels: &[i64]) -> Result<()> {
    writeln!(writer, "{HEADER}")?;
    for (index, label) in labels.iter().enumerate() {
        writeln!(writer, "{},{}", index + 1, label)?;
    }
    Ok(())
}

/// Write predictions to a file, flushing before returning.
pub fn write_predictions_to_file<P: AsRef<Path>>(path: P, labels: &[i64]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_predictions(&mut writer, labels)?;
    writer.flush()?;
    Ok(())
}
