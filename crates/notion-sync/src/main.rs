//! `royalty-notion-sync` -- mirror queued payouts into a Notion database.
//!
//! Fetches payouts with `status = queued` and `notion_sync = false`, creates
//! one Notion page per payout, and flags each row as synced with the page
//! URL. Runs a single pass and exits.
//!
//! Failures on individual payouts are logged and do not affect the exit
//! code; a failure to fetch the queue does.
//!
//! # Environment variables
//!
//! | Variable                    | Required | Default                     |
//! |-----------------------------|----------|-----------------------------|
//! | `SUPABASE_URL`              | yes      | --                          |
//! | `SUPABASE_SERVICE_ROLE_KEY` | yes      | --                          |
//! | `NOTION_TOKEN`              | yes      | --                          |
//! | `NOTION_DATABASE_ID`        | yes      | --                          |
//! | `NOTION_API_URL`            | no       | `https://api.notion.com/v1` |
//! | `HTTP_TIMEOUT_SECS`         | no       | --                          |

use std::process::ExitCode;

use anyhow::Context;
use royalty_core::config::{HttpConfig, NotionConfig, SupabaseConfig};
use royalty_notion::NotionApi;
use royalty_supabase::SupabaseApi;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use royalty_notion_sync::batch;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "royalty_notion_sync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Payout sync failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let supabase_config = SupabaseConfig::from_env()?;
    let notion_config = NotionConfig::from_env()?;
    let http = HttpConfig::from_env()?;

    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = http.request_timeout {
        builder = builder.timeout(timeout);
    }
    let client = builder.build().context("Failed to build HTTP client")?;

    let supabase = SupabaseApi::with_client(client.clone(), &supabase_config);
    let notion = NotionApi::with_client(client, &notion_config);

    let payouts = supabase
        .fetch_queued_payouts()
        .await
        .context("Failed to fetch payouts")?;
    tracing::info!(count = payouts.len(), "Found queued payouts to sync");

    let report = batch::sync_payouts(&notion, &supabase, &payouts).await;

    tracing::info!(
        synced = report.synced.len(),
        failed = report.failed.len(),
        skipped = report.skipped.len(),
        "Payout sync complete",
    );
    Ok(())
}
