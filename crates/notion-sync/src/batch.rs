//! Per-payout sync loop.
//!
//! Each queued payout is mirrored as one unit: decode the row, create the
//! Notion page, then flag the source row as synced. Payouts are processed
//! sequentially and a failure on one never stops the rest; every outcome
//! lands in the returned [`SyncReport`].

use std::collections::HashSet;

use royalty_core::error::DecodeError;
use royalty_core::payout::{Payout, PayoutId};
use royalty_notion::properties::PayoutProperties;
use royalty_notion::{payout_properties, CreatedPage, NotionApi, NotionApiError};
use royalty_supabase::{SupabaseApi, SupabaseApiError};
use serde_json::Value;

/// Creates the external page for a payout. Implemented by [`NotionApi`].
pub trait PagePublisher {
    async fn create_page(&self, properties: &PayoutProperties)
        -> Result<CreatedPage, NotionApiError>;
}

/// Records a successful sync on the source row. Implemented by [`SupabaseApi`].
pub trait PayoutLedger {
    async fn mark_synced(&self, id: &PayoutId, page_url: &str) -> Result<(), SupabaseApiError>;
}

impl PagePublisher for NotionApi {
    async fn create_page(
        &self,
        properties: &PayoutProperties,
    ) -> Result<CreatedPage, NotionApiError> {
        NotionApi::create_page(self, properties).await
    }
}

impl PayoutLedger for SupabaseApi {
    async fn mark_synced(&self, id: &PayoutId, page_url: &str) -> Result<(), SupabaseApiError> {
        self.mark_payout_synced(id, page_url).await.map(|_| ())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The queued row could not be read as a payout (e.g. no usable `id`).
    #[error("Malformed payout row: {0}")]
    Decode(#[from] DecodeError),

    #[error("Notion page creation failed: {0}")]
    CreatePage(#[from] NotionApiError),

    /// The page exists but the row is still unsynced; the next run will
    /// create a second page for it.
    #[error("Failed to mark payout synced: {0}")]
    MarkSynced(#[from] SupabaseApiError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedPayout {
    pub id: PayoutId,
    pub page_url: String,
}

#[derive(Debug)]
pub struct FailedPayout {
    /// `None` when the row had no readable id.
    pub id: Option<PayoutId>,
    pub error: SyncError,
}

/// Outcome of one pass over the queue.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub synced: Vec<SyncedPayout>,
    pub failed: Vec<FailedPayout>,
    /// Payouts not attempted: already synced, not queued, or a repeat of
    /// an id earlier in the input.
    pub skipped: Vec<PayoutId>,
}

impl SyncReport {
    pub fn attempted(&self) -> usize {
        self.synced.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Mirror a single payout: create its page, then mark the row synced.
pub async fn sync_payout<P, L>(
    publisher: &P,
    ledger: &L,
    payout: &Payout,
) -> Result<SyncedPayout, SyncError>
where
    P: PagePublisher,
    L: PayoutLedger,
{
    let properties = payout_properties(payout);
    let page = publisher.create_page(&properties).await?;
    ledger.mark_synced(&payout.id, &page.url).await?;

    Ok(SyncedPayout {
        id: payout.id.clone(),
        page_url: page.url,
    })
}

/// Mirror every queued row in order, collecting successes and failures.
///
/// Rows are decoded one at a time; a row that does not decode is recorded
/// as failed and the loop moves on.
pub async fn sync_payouts<P, L>(publisher: &P, ledger: &L, rows: &[Value]) -> SyncReport
where
    P: PagePublisher,
    L: PayoutLedger,
{
    let mut report = SyncReport::default();
    let mut seen: HashSet<PayoutId> = HashSet::with_capacity(rows.len());

    for row in rows {
        let payout = match Payout::from_json(row.clone()) {
            Ok(payout) => payout,
            Err(error) => {
                let id = PayoutId::from_row(row);
                tracing::error!(
                    payout_id = ?id,
                    error = %error,
                    "Skipping malformed payout row",
                );
                report.failed.push(FailedPayout {
                    id,
                    error: error.into(),
                });
                continue;
            }
        };

        if !payout.is_pending_sync() {
            tracing::warn!(
                payout_id = %payout.id,
                status = payout.status.as_str(),
                notion_sync = payout.notion_sync,
                "Payout is not pending sync, skipping",
            );
            report.skipped.push(payout.id);
            continue;
        }
        if !seen.insert(payout.id.clone()) {
            tracing::warn!(payout_id = %payout.id, "Duplicate payout in queue, skipping");
            report.skipped.push(payout.id);
            continue;
        }

        match sync_payout(publisher, ledger, &payout).await {
            Ok(synced) => {
                tracing::info!(payout_id = %synced.id, page_url = %synced.page_url, "Synced payout");
                report.synced.push(synced);
            }
            Err(error) => {
                tracing::error!(payout_id = %payout.id, error = %error, "Error handling payout");
                report.failed.push(FailedPayout {
                    id: Some(payout.id),
                    error,
                });
            }
        }
    }

    report
}
