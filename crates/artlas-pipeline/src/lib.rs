//! artlas Pipeline - Artist enrichment orchestration
//!
//! Control flow for one name:
//! sources → extractor → [`reconcile`] → classifier → store
//!
//! [`batch`] drives that flow over a list of names and aggregates the
//! per-item outcomes into a JSON report.

pub mod batch;
pub mod context;
pub mod enrich;
pub mod reconcile;

pub use batch::{
    failure_reason, format_success_rate, read_names, BatchOrchestrator, BatchReport,
    FailureEntry, ItemOutcome, ItemState, SuccessEntry, REASON_NOT_FOUND, REASON_SAVE_FAILED,
};
pub use context::EnrichmentContext;
pub use enrich::ArtistEnricher;
pub use reconcile::Reconciler;
