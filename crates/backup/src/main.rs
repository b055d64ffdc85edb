//! `royalty-backup` -- one-shot CSV export of the Supabase tables.
//!
//! Fetches each configured table over the REST endpoint and writes
//! `{BACKUP_DIR}/{YYYY-MM-DD}/{table}.csv`, then exits. Intended to be run
//! from a scheduler.
//!
//! # Environment variables
//!
//! | Variable                    | Required | Default   | Description                        |
//! |-----------------------------|----------|-----------|------------------------------------|
//! | `SUPABASE_URL`              | yes      | --        | Project base URL                   |
//! | `SUPABASE_SERVICE_ROLE_KEY` | yes      | --        | Service-role key                   |
//! | `BACKUP_DIR`                | no       | `backups` | Output root                        |
//! | `BACKUP_TABLES`             | no       | all five  | Comma-separated table list         |
//! | `HTTP_TIMEOUT_SECS`         | no       | --        | Per-request timeout                |

use std::process::ExitCode;

use anyhow::Context;
use chrono::Utc;
use royalty_core::config::{BackupConfig, HttpConfig, SupabaseConfig};
use royalty_supabase::SupabaseApi;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use royalty_backup::export;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "royalty_backup=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Backup failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let supabase = SupabaseConfig::from_env()?;
    let backup = BackupConfig::from_env()?;
    let http = HttpConfig::from_env()?;

    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = http.request_timeout {
        builder = builder.timeout(timeout);
    }
    let client = builder.build().context("Failed to build HTTP client")?;
    let api = SupabaseApi::with_client(client, &supabase);

    let date = Utc::now().date_naive();
    tracing::info!(
        tables = backup.tables.len(),
        output_root = %backup.output_root.display(),
        %date,
        "Starting backup export",
    );

    let report = export::run_backup(&api, &backup, date).await?;

    tracing::info!(
        directory = %report.directory.display(),
        tables = report.tables.len(),
        rows = report.total_rows(),
        "Backup complete",
    );
    Ok(())
}
