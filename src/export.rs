//! CSV export of derived tables
//!
//! Tables are written to a temporary sibling file first and then renamed over the
//! target, so a reader never observes a partially written file and concurrent runs
//! exporting to the same path cannot interleave their rows.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const PEAK_USAGE_FILE: &str = "peak_usage.csv";
pub const SUMMARY_FILE: &str = "summary.csv";
pub const VERSION_USAGE_FILE: &str = "version_usage.csv";
pub const USER_USAGE_FILE: &str = "user_usage.csv";

/// Where an export lands: the explicit path if given, otherwise `file_name` in `data_dir`
pub fn resolve_export_path(explicit: Option<&Path>, data_dir: &Path, file_name: &str) -> PathBuf {
    match explicit {
        Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
        _ => data_dir.join(file_name),
    }
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create export directory: {}", parent.display()))?;
    }

    let file_name = path
        .file_name()
        .with_context(|| format!("Export path has no file name: {}", path.display()))?
        .to_string_lossy();
    let tmp_path = path.with_file_name(format!(
        ".{}.{}.{}.tmp",
        file_name,
        std::process::id(),
        uuid::Uuid::new_v4().simple()
    ));

    let result = write_rows(&tmp_path, rows).and_then(|_| {
        fs::rename(&tmp_path, path)
            .with_context(|| format!("Failed to move export into place: {}", path.display()))
    });
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result?;

    info!(path = %path.display(), rows = rows.len(), "Exported table");
    Ok(())
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush export file: {}", path.display()))?;
    Ok(())
}
