//! artlas Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout the artlas system:
//! - The canonical artist record and the raw source payloads feeding it
//! - Common error types
//! - Shared traits for knowledge source adapters
//! - Era and copyright classification
//! - Configuration management
//! - Artist persistence (SQLite)

pub mod classify;
pub mod config;
pub mod merge;
pub mod store;
pub mod vocabulary;

pub use classify::{
    classify_era, classify_era_at, current_year, determine_copyright_status,
    determine_copyright_status_at, Classification, CopyrightStatus, Era,
};
pub use config::{
    AppConfig, BatchConfig, ConfigError, DatabaseConfig, LoggingConfig, ReconcilerConfig,
    SourcesConfig, TranslationConfig, TranslationProvider,
};
pub use store::{
    name_key, open_repository, ArtistRepository, ArtistStore, SaveOutcome, StoredArtist,
    UnavailableStore,
};
pub use vocabulary::Vocabulary;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for artlas operations
#[derive(Error, Debug)]
pub enum ArtlasError {
    #[error("Artist not found: {0}")]
    NotFound(String),

    #[error("Page is not about a visual artist: {0}")]
    ValidationRejected(String),

    #[error("Source adapter failure ({adapter}): {message}")]
    AdapterFailure { adapter: String, message: String },

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ArtlasError {
    /// Build an adapter failure for the named source
    pub fn adapter(adapter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AdapterFailure {
            adapter: adapter.into(),
            message: message.into(),
        }
    }

    /// A lookup that ended without a usable page.
    ///
    /// Validation rejections are reported exactly like missing pages.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::ValidationRejected(_))
    }
}

pub type Result<T> = std::result::Result<T, ArtlasError>;

// ============================================================================
// Artist Record
// ============================================================================

/// The canonical, reconciled description of one artist.
///
/// `name` comes from the primary source and is the dedup identity. Every
/// other field is optional and is filled progressively by the pipeline
/// stages; see [`merge`] for the rules that keep populated values intact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRecord {
    pub name: String,
    pub name_localized: Option<String>,

    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
    /// Free text, more precise than the year when present
    pub birth_date: Option<String>,
    pub death_date: Option<String>,

    pub nationality: Option<String>,
    pub nationality_localized: Option<String>,

    pub biography: Option<String>,
    pub biography_localized: Option<String>,

    pub art_movement: Option<String>,
    pub birth_place: Option<String>,

    /// Append-only across merges
    pub education: Vec<String>,
    /// First matches in document order, at most 10
    pub notable_works: Vec<String>,

    pub image_url: Option<String>,
    pub source_url: Option<String>,
    /// Knowledge-graph identifier (e.g. a Wikidata Q-id)
    pub external_id: Option<String>,

    /// Art-related categories only, at most 20
    pub categories: Vec<String>,
    /// Outbound links, at most 10
    pub references: Vec<String>,
}

impl ArtistRecord {
    /// Create a record with only its identity set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Short, report-friendly view of the record
    pub fn summary(&self, biography_chars: usize) -> ArtistSummary {
        ArtistSummary {
            name: self.name.clone(),
            birth_year: self.birth_year,
            death_year: self.death_year,
            nationality: self.nationality.clone(),
            biography: self
                .biography
                .as_deref()
                .map(|b| truncate_chars(b, biography_chars).to_string()),
        }
    }
}

/// Condensed record used in batch reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistSummary {
    pub name: String,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
    pub nationality: Option<String>,
    pub biography: Option<String>,
}

/// A reconciled record together with its derived classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedArtist {
    pub record: ArtistRecord,
    pub classification: Classification,
}

impl EnrichedArtist {
    /// Classify the record against the current calendar year
    pub fn classify(record: ArtistRecord) -> Self {
        Self::classify_at(record, current_year())
    }

    pub fn classify_at(record: ArtistRecord, current_year: i32) -> Self {
        let classification = Classification::of_at(&record, current_year);
        Self {
            record,
            classification,
        }
    }
}

static YEAR_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").expect("year token pattern"));

/// Leading 4-digit year token of a free-text date.
///
/// Handles both prose dates ("25 October 1881") and ISO timestamps
/// ("1881-10-25T00:00:00Z").
pub fn year_from_date(date: &str) -> Option<i32> {
    YEAR_TOKEN
        .find(date)
        .and_then(|m| m.as_str().parse::<i32>().ok())
}

/// Prefix of `text` holding at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ============================================================================
// Source Payloads
// ============================================================================

/// A raw encyclopedia page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Canonical page title
    pub title: String,

    /// Plain-text body
    pub text: String,

    /// Declared categories, in page order
    pub categories: Vec<String>,

    /// Outbound links, in page order
    pub links: Vec<String>,

    /// Canonical page URL
    pub url: Option<String>,
}

/// Summary metadata for a page (image, knowledge-graph id)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    pub external_id: Option<String>,
    pub image_url: Option<String>,
}

/// Secondary-language lookup result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedInfo {
    pub name_localized: Option<String>,
    pub biography_localized: Option<String>,
}

/// First result row of a knowledge-graph query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphFacts {
    pub birth_date: Option<String>,
    pub death_date: Option<String>,
    pub nationality: Option<String>,
    pub occupation: Option<String>,
    pub education: Option<String>,
}

// ============================================================================
// Traits
// ============================================================================

/// An encyclopedia corpus in one language
#[async_trait::async_trait]
pub trait EncyclopediaSource: Send + Sync {
    /// Fetch a page by exact title. `Ok(None)` when the page does not exist.
    async fn fetch_page(&self, title: &str) -> Result<Option<SourceDocument>>;

    /// Fetch summary metadata for a page
    async fn fetch_summary(&self, title: &str) -> Result<Option<PageSummary>>;

    /// Fuzzy title search, returning at most `limit` titles
    async fn search_titles(&self, query: &str, limit: usize) -> Result<Vec<String>>;

    /// Language code of the corpus
    fn language(&self) -> &str;
}

/// Structured fact lookup keyed by an external identifier
#[async_trait::async_trait]
pub trait KnowledgeGraphSource: Send + Sync {
    async fn fetch_facts(&self, external_id: &str) -> Result<Option<GraphFacts>>;
}

/// Optional name translation capability
#[async_trait::async_trait]
pub trait NameTranslator: Send + Sync {
    /// Translate an artist name into `target_language`
    async fn translate_name(&self, name: &str, target_language: &str) -> Result<String>;
}

// ============================================================================
// Tests
// ============================================================================
