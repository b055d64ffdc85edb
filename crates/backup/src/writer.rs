//! Dated output directory and per-table CSV files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use royalty_core::table::TableName;

/// `{root}/{YYYY-MM-DD}`.
pub fn dated_dir(root: &Path, date: NaiveDate) -> PathBuf {
    root.join(date.format("%Y-%m-%d").to_string())
}

/// Create the dated directory (and any missing parents) if absent.
pub fn prepare_dir(root: &Path, date: NaiveDate) -> io::Result<PathBuf> {
    let dir = dated_dir(root, date);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Write `{dir}/{table}.csv`, replacing any existing file.
pub fn write_table(dir: &Path, table: &TableName, contents: &str) -> io::Result<PathBuf> {
    let path = dir.join(format!("{table}.csv"));
    fs::write(&path, contents)?;
    Ok(path)
}
