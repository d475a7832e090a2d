//! Character affiliation reconciler.
//!
//! Periodically refreshes the (corporation, alliance, faction) tuple for
//! every known character. Character IDs are enumerated from the store,
//! partitioned into batches of at most 1000 (the ESI affiliation request
//! limit), and dispatched to a semaphore-bounded worker pool. Each worker
//! posts its batch, upserts the returned records, and accounts a
//! per-character outcome; a batch-level upstream failure marks every
//! character of the batch failed without writing anything. Cancellation is
//! honored at batch boundaries: in-flight batches finish, pending batches
//! are abandoned, and the aggregate of completed work is returned.

#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{FuturesUnordered, StreamExt};
use sea_orm::DatabaseConnection;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::client::esi::EsiClient;
use crate::data::character::CharacterRepository;
use crate::error::Error;
use crate::model::sync::AffiliationStats;
use crate::service::retry::RetryContext;
use crate::util::cancel::CancellationFlag;
use crate::util::esi::{is_valid_character_id, ESI_AFFILIATION_REQUEST_LIMIT};

#[derive(Default)]
struct BatchResult {
    updated: usize,
    failed: usize,
    skipped: usize,
    /// Whether an upstream batch call was actually issued.
    dispatched: bool,
    /// Whether the batch was abandoned due to cancellation.
    cancelled: bool,
}

/// Reconciler driving bulk affiliation refreshes over all known characters.
pub struct AffiliationService {
    db: DatabaseConnection,
    esi_client: EsiClient,
    workers: usize,
}

impl AffiliationService {
    /// Creates a new instance of [`AffiliationService`].
    ///
    /// # Arguments
    /// - `workers` - Parallel batch workers; clamped to at least one
    pub fn new(db: DatabaseConnection, esi_client: EsiClient, workers: usize) -> Self {
        Self {
            db,
            esi_client,
            workers: workers.max(1),
        }
    }

    /// Runs one full reconciliation pass.
    ///
    /// # Returns
    /// - `Ok(AffiliationStats)` - Per-run totals; `updated + failed +
    ///   skipped` equals the number of enumerated characters unless the run
    ///   was cancelled
    /// - `Err(Error)` - Store enumeration failed; nothing was dispatched
    pub async fn run(&self, cancel: &CancellationFlag) -> Result<AffiliationStats, Error> {
        let started = Instant::now();

        let character_ids = CharacterRepository::new(&self.db)
            .all_character_ids()
            .await?;

        let mut stats = AffiliationStats::default();

        // An invalid ID fails the entire upstream batch, so filter before
        // partitioning and account the rejects as skipped.
        let valid_ids: Vec<i32> = character_ids
            .into_iter()
            .filter(|&id| {
                let valid = is_valid_character_id(id);
                if !valid {
                    warn!(
                        character_id = id,
                        "Character ID outside ESI's allocated range; skipping affiliation refresh"
                    );
                    stats.skipped += 1;
                }
                valid
            })
            .collect();

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut batches = FuturesUnordered::new();

        for batch in valid_ids.chunks(ESI_AFFILIATION_REQUEST_LIMIT) {
            let batch = batch.to_vec();
            let db = self.db.clone();
            let esi_client = self.esi_client.clone();
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();

            batches.push(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return BatchResult {
                        cancelled: true,
                        ..Default::default()
                    };
                };

                if cancel.is_cancelled() {
                    return BatchResult {
                        cancelled: true,
                        ..Default::default()
                    };
                }

                Self::process_batch(&db, &esi_client, batch).await
            });
        }

        while let Some(result) = batches.next().await {
            stats.updated += result.updated;
            stats.failed += result.failed;
            stats.skipped += result.skipped;
            if result.dispatched {
                stats.batches += 1;
            }
            if result.cancelled {
                stats.cancelled = true;
            }
        }

        stats.duration_ms = started.elapsed().as_millis() as u64;

        info!(
            updated = stats.updated,
            failed = stats.failed,
            skipped = stats.skipped,
            batches = stats.batches,
            duration_ms = stats.duration_ms,
            cancelled = stats.cancelled,
            "Affiliation reconciliation finished"
        );

        Ok(stats)
    }

    /// Refreshes one batch of at most 1000 characters.
    ///
    /// A character in the request but absent from the response is counted
    /// skipped (ESI considers it deleted or unknown); a character in the
    /// response but absent from the store is inserted by the upsert.
    async fn process_batch(
        db: &DatabaseConnection,
        esi_client: &EsiClient,
        batch: Vec<i32>,
    ) -> BatchResult {
        let mut result = BatchResult {
            dispatched: true,
            ..Default::default()
        };

        // Transient upstream failures (429, 5xx) are retried with backoff
        // before the batch is written off as failed.
        let ids = batch.as_slice();
        let affiliations = match RetryContext::new()
            .execute_with_retry(
                &format!("affiliation batch of {} character(s)", batch.len()),
                move || async move { Ok(esi_client.character_affiliations(ids).await?) },
            )
            .await
        {
            Ok(affiliations) => affiliations,
            Err(e) => {
                error!(
                    batch_size = batch.len(),
                    "Affiliation batch failed upstream: {e}"
                );
                result.failed = batch.len();
                return result;
            }
        };

        let returned: HashSet<i32> = affiliations.iter().map(|a| a.character_id).collect();
        result.skipped += batch.iter().filter(|id| !returned.contains(id)).count();

        let repo = CharacterRepository::new(db);
        let mut write = repo.upsert_affiliations(&affiliations).await;
        if write.is_err() {
            // A concurrent insert on the same natural key is recoverable;
            // retry the upsert once before failing the batch.
            warn!("Affiliation upsert hit a write conflict; retrying once");
            write = repo.upsert_affiliations(&affiliations).await;
        }

        match write {
            Ok(()) => result.updated = affiliations.len(),
            Err(e) => {
                error!(
                    batch_size = batch.len(),
                    "Affiliation upsert failed after retry: {e}"
                );
                result.failed = affiliations.len();
            }
        }

        result
    }
}
