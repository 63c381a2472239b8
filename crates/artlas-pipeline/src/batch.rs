//! Sequential batch driver
//!
//! Items run one after another with a fixed delay between lookups. A
//! failed item is recorded in the report and never stops the batch.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use artlas_core::{
    ArtistRepository, ArtistSummary, ArtlasError, BatchConfig, EnrichedArtist, Result,
    SaveOutcome,
};

use crate::enrich::ArtistEnricher;

pub const REASON_NOT_FOUND: &str = "Artist not found or not valid";
pub const REASON_SAVE_FAILED: &str = "Database save failed";

// ============================================================================
// Item state machine
// ============================================================================

/// Lifecycle of one batch item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemState {
    Pending,
    Searching,
    Found,
    NotFound,
    Saved,
    SaveFailed,
    Skipped,
}

impl ItemState {
    /// Whether `next` is a legal successor
    pub fn can_transition(self, next: ItemState) -> bool {
        use ItemState::*;
        matches!(
            (self, next),
            (Pending, Searching)
                | (Pending, Skipped)
                | (Searching, Found)
                | (Searching, NotFound)
                | (Found, Saved)
                | (Found, SaveFailed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::NotFound | Self::Saved | Self::SaveFailed | Self::Skipped
        )
    }
}

/// One item moving through the state machine
#[derive(Debug)]
struct ItemRun<'a> {
    name: &'a str,
    state: ItemState,
}

impl<'a> ItemRun<'a> {
    fn new(name: &'a str) -> Self {
        Self {
            name,
            state: ItemState::Pending,
        }
    }

    fn advance(&mut self, next: ItemState) {
        debug_assert!(
            self.state.can_transition(next),
            "illegal item transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::debug!(artist = self.name, from = ?self.state, to = ?next, "Item state");
        self.state = next;
    }
}

/// Final result of one item
#[derive(Debug)]
pub enum ItemOutcome {
    Saved {
        artist: Box<EnrichedArtist>,
        save: SaveOutcome,
    },
    Skipped,
    Failed {
        reason: String,
    },
}

/// Report reason for an item-level error
pub fn failure_reason(error: &ArtlasError) -> String {
    match error {
        e if e.is_not_found() => REASON_NOT_FOUND.to_string(),
        ArtlasError::PersistenceFailure(_) => REASON_SAVE_FAILED.to_string(),
        other => other.to_string(),
    }
}

// ============================================================================
// Report
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessEntry {
    pub name: String,
    pub info: ArtistSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureEntry {
    pub name: String,
    pub error: String,
}

/// Aggregate batch result, written as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub successful: Vec<SuccessEntry>,
    pub failed: Vec<FailureEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    pub total: usize,
    pub success_rate: String,
}

impl Default for BatchReport {
    fn default() -> Self {
        Self {
            successful: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
            total: 0,
            success_rate: format_success_rate(0, 0),
        }
    }
}

/// Percentage with one decimal, `"0.0%"` for an empty batch
pub fn format_success_rate(successes: usize, total: usize) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", successes as f64 / total as f64 * 100.0)
}

impl BatchReport {
    /// Report for a batch that could not start: every name fails with `reason`
    pub fn all_failed<S: AsRef<str>>(names: &[S], reason: &str) -> Self {
        let mut report = Self {
            failed: names
                .iter()
                .map(|name| FailureEntry {
                    name: name.as_ref().to_string(),
                    error: reason.to_string(),
                })
                .collect(),
            ..Default::default()
        };
        report.finish();
        report
    }

    fn finish(&mut self) {
        self.total = self.successful.len() + self.failed.len() + self.skipped.len();
        self.success_rate = format_success_rate(self.successful.len(), self.total);
    }

    /// Write the report as pretty-printed JSON
    pub async fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(anyhow::Error::from)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

/// Newline-separated names, blank lines ignored
pub async fn read_names(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Drives enrichment and persistence over a list of names
pub struct BatchOrchestrator {
    enricher: ArtistEnricher,
    store: Arc<dyn ArtistRepository>,
    config: BatchConfig,
}

impl BatchOrchestrator {
    pub fn new(
        enricher: ArtistEnricher,
        store: Arc<dyn ArtistRepository>,
        config: BatchConfig,
    ) -> Self {
        Self {
            enricher,
            store,
            config,
        }
    }

    pub fn enricher(&self) -> &ArtistEnricher {
        &self.enricher
    }

    /// Run one item to a terminal state
    pub async fn process(&self, name: &str) -> ItemOutcome {
        let mut item = ItemRun::new(name);

        if self.config.skip_existing {
            match self.store.find_existing(name).await {
                Ok(Some(existing)) => {
                    tracing::info!(artist = name, id = %existing.id, "Already stored, skipping");
                    item.advance(ItemState::Skipped);
                    return ItemOutcome::Skipped;
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(artist = name, error = %e, "Existing-artist check failed"),
            }
        }

        item.advance(ItemState::Searching);
        let artist = match self.enricher.lookup(name).await {
            Ok(artist) => artist,
            Err(e) => {
                item.advance(ItemState::NotFound);
                tracing::warn!(artist = name, error = %e, "Lookup failed");
                return ItemOutcome::Failed {
                    reason: failure_reason(&e),
                };
            }
        };
        item.advance(ItemState::Found);

        match self.store.save(&artist).await {
            Ok(save) => {
                item.advance(ItemState::Saved);
                ItemOutcome::Saved {
                    artist: Box::new(artist),
                    save,
                }
            }
            Err(e) => {
                item.advance(ItemState::SaveFailed);
                tracing::error!(artist = name, error = %e, "Save failed");
                ItemOutcome::Failed {
                    reason: failure_reason(&e),
                }
            }
        }
    }

    /// Process every name in order
    pub async fn run<S: AsRef<str>>(&self, names: &[S]) -> BatchReport {
        let mut report = BatchReport::default();
        let delay = self.config.delay();
        let mut previous_looked_up = false;

        tracing::info!(items = names.len(), delay_ms = self.config.delay_ms, "Batch started");

        for (index, name) in names.iter().enumerate() {
            let name = name.as_ref();

            if previous_looked_up && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            tracing::info!(artist = name, item = index + 1, of = names.len(), "Processing");
            let outcome = self.process(name).await;
            previous_looked_up = !matches!(outcome, ItemOutcome::Skipped);

            match outcome {
                ItemOutcome::Saved { artist, .. } => report.successful.push(SuccessEntry {
                    name: name.to_string(),
                    info: artist
                        .record
                        .summary(self.config.summary_biography_chars),
                }),
                ItemOutcome::Skipped => report.skipped.push(name.to_string()),
                ItemOutcome::Failed { reason } => report.failed.push(FailureEntry {
                    name: name.to_string(),
                    error: reason,
                }),
            }
        }

        report.finish();
        tracing::info!(
            total = report.total,
            successful = report.successful.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            success_rate = %report.success_rate,
            "Batch completed"
        );
        report
    }
}
