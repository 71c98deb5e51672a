use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Local};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::formatter::format_csv;
use crate::scoring::PredictionResult;

/// `horse_racing_predictions_YYYYMMDD_HHMMSS.csv`
pub fn export_file_name(at: DateTime<Local>) -> String {
    format!("horse_racing_predictions_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

/// Write the predictions as CSV into `dir`, creating it if needed.
/// Returns the path of the written file.
pub fn export_csv(dir: &Path, predictions: &[PredictionResult]) -> Result<PathBuf> {
    if !dir.as_os_str().is_empty() && !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create export directory {}", dir.display()))?;
    }

    let path = dir.join(export_file_name(Local::now()));
    let csv = format_csv(predictions);

    let mut file = AtomicWriteFile::open(&path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(csv.as_bytes())
        .with_context(|| format!("Failed to write predictions to {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save {}", path.display()))?;

    tracing::info!(path = %path.display(), rows = predictions.len(), "exported predictions");
    Ok(path)
}
