//! Two files per dataset: an append-only history log and an overwritten snapshot.

use crate::models::Tabular;
use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// History and snapshot paths of one dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetFiles {
    pub history: PathBuf,
    pub snapshot: PathBuf,
}

impl DatasetFiles {
    pub fn append_history<T: Tabular>(&self, records: &[T]) -> Result<()> {
        append_history(&self.history, records)
    }

    pub fn overwrite_snapshot<T: Tabular>(&self, records: &[T]) -> Result<()> {
        overwrite_snapshot(&self.snapshot, records)
    }
}

/// Append rows, writing the header only if the file is new (or empty).
pub fn append_history<T: Tabular>(path: &Path, records: &[T]) -> Result<()> {
    ensure_parent(path)?;
    let needs_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {} for appending", path.display()))?;

    write_rows(file, records, needs_header)
        .with_context(|| format!("Failed to append to {}", path.display()))?;
    info!("💾 Appended {} rows to {}", records.len(), path.display());
    Ok(())
}

/// Replace the file with a header and `records`.
pub fn overwrite_snapshot<T: Tabular>(path: &Path, records: &[T]) -> Result<()> {
    ensure_parent(path)?;
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    write_rows(file, records, true).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("💾 Saved {} rows to {}", records.len(), path.display());
    Ok(())
}

fn write_rows<T: Tabular, W: Write>(out: W, records: &[T], header: bool) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    if header {
        wtr.write_record(T::HEADER)?;
    }
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display())),
        _ => Ok(()),
    }
}
