//! Table-by-table backup export.
//!
//! Tables are fetched and written strictly in order. The first failure
//! aborts the run; files written before it stay on disk.

use std::path::PathBuf;

use chrono::NaiveDate;
use royalty_core::config::BackupConfig;
use royalty_core::csv::to_csv;
use royalty_core::table::{TableName, TableRow};
use royalty_supabase::{SupabaseApi, SupabaseApiError};

use crate::writer;

/// Source of table rows. Implemented by [`SupabaseApi`]; tests use fakes.
pub trait TableSource {
    async fn fetch_table(&self, table: &TableName) -> Result<Vec<TableRow>, SupabaseApiError>;
}

impl TableSource for SupabaseApi {
    async fn fetch_table(&self, table: &TableName) -> Result<Vec<TableRow>, SupabaseApiError> {
        SupabaseApi::fetch_table(self, table).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("Failed to fetch {table}: {source}")]
    Fetch {
        table: TableName,
        #[source]
        source: SupabaseApiError,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One exported table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedTable {
    pub table: TableName,
    pub rows: usize,
    pub path: PathBuf,
}

/// Outcome of a completed backup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupReport {
    pub directory: PathBuf,
    pub tables: Vec<ExportedTable>,
}

impl BackupReport {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

/// Export every configured table into `{output_root}/{date}/{table}.csv`.
pub async fn run_backup<S: TableSource>(
    source: &S,
    config: &BackupConfig,
    date: NaiveDate,
) -> Result<BackupReport, BackupError> {
    let directory = writer::prepare_dir(&config.output_root, date).map_err(|source| {
        BackupError::Io {
            path: writer::dated_dir(&config.output_root, date),
            source,
        }
    })?;

    let mut tables = Vec::with_capacity(config.tables.len());

    for table in &config.tables {
        let rows = source
            .fetch_table(table)
            .await
            .map_err(|source| BackupError::Fetch {
                table: table.clone(),
                source,
            })?;

        let csv = to_csv(&rows);
        let path = writer::write_table(&directory, table, &csv).map_err(|source| {
            BackupError::Io {
                path: directory.join(format!("{table}.csv")),
                source,
            }
        })?;

        tracing::info!(table = %table, rows = rows.len(), path = %path.display(), "Wrote table backup");

        tables.push(ExportedTable {
            table: table.clone(),
            rows: rows.len(),
            path,
        });
    }

    Ok(BackupReport { directory, tables })
}
