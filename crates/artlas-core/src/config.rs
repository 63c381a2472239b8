//! artlas Configuration Management
//!
//! Handles configuration from environment variables and TOML config files
//! with sensible defaults for local runs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::vocabulary::Vocabulary;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Artist store connection
    pub database: DatabaseConfig,

    /// Knowledge source endpoints
    pub sources: SourcesConfig,

    /// Optional name translation service
    pub translation: TranslationConfig,

    /// Batch driver settings
    pub batch: BatchConfig,

    /// Reconciler behaviour
    pub reconciler: ReconcilerConfig,

    /// Extraction tables
    pub vocabulary: Vocabulary,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        self.apply_env()?;
        Ok(self)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        // Database
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = url;
        }

        // Sources
        if let Ok(lang) = std::env::var("ARTLAS_PRIMARY_LANG") {
            self.sources.primary_language = lang;
        }
        if let Ok(lang) = std::env::var("ARTLAS_SECONDARY_LANG") {
            self.sources.secondary_language = lang;
        }
        if let Ok(secs) = std::env::var("ARTLAS_HTTP_TIMEOUT_SECS") {
            self.sources.request_timeout_secs = parse_env("ARTLAS_HTTP_TIMEOUT_SECS", secs)?;
        }

        // Batch
        if let Ok(ms) = std::env::var("ARTLAS_BATCH_DELAY_MS") {
            self.batch.delay_ms = parse_env("ARTLAS_BATCH_DELAY_MS", ms)?;
        }

        // Translation
        if let Ok(provider) = std::env::var("TRANSLATION_PROVIDER") {
            self.translation.provider = provider.parse()?;
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.translation.openai_api_key = Some(key);
        }
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            self.translation.openai_base_url = Some(url);
        }
        if let Ok(url) = std::env::var("OLLAMA_URL") {
            self.translation.ollama_url = url;
        }
        if let Ok(model) = std::env::var("TRANSLATION_MODEL") {
            self.translation.model = model;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Artist store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Connection pool size
    pub pool_size: u32,

    /// Create the artists table on startup when missing
    pub create_schema: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://artlas.db?mode=rwc".to_string(),
            pool_size: 1,
            create_schema: true,
        }
    }
}

/// Knowledge source endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Primary encyclopedia language
    pub primary_language: String,

    /// Secondary (localized) encyclopedia language
    pub secondary_language: String,

    /// Encyclopedia base URL; `{lang}` is replaced by the language code
    pub wikipedia_url_template: String,

    /// SPARQL endpoint of the knowledge graph
    pub sparql_endpoint: String,

    /// User-Agent sent with every request
    pub user_agent: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Number of alternative titles requested from search
    pub search_limit: usize,
}

impl SourcesConfig {
    /// Base URL of the encyclopedia in `language`
    pub fn wikipedia_base_url(&self, language: &str) -> String {
        self.wikipedia_url_template.replace("{lang}", language)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            primary_language: "en".to_string(),
            secondary_language: "ko".to_string(),
            wikipedia_url_template: "https://{lang}.wikipedia.org".to_string(),
            sparql_endpoint: "https://query.wikidata.org/sparql".to_string(),
            user_agent: concat!(
                "artlas/",
                env!("CARGO_PKG_VERSION"),
                " (artist enrichment; data collection bot)"
            )
            .to_string(),
            request_timeout_secs: 10,
            search_limit: 5,
        }
    }
}

/// Name translation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Translation backend
    pub provider: TranslationProvider,

    /// OpenAI API key; without it the OpenAI translator is disabled
    pub openai_api_key: Option<String>,

    /// OpenAI API base URL (for Azure or compatible APIs)
    pub openai_base_url: Option<String>,

    /// Ollama server URL
    pub ollama_url: String,

    /// Model name to use
    pub model: String,

    /// Maximum tokens for the reply
    pub max_tokens: u32,

    /// Temperature for generation
    pub temperature: f32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::OpenAI,
            openai_api_key: None,
            openai_base_url: None,
            ollama_url: "http://localhost:11434".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 50,
            temperature: 0.1,
            timeout_secs: 10,
        }
    }
}

/// Supported translation backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    OpenAI,
    Ollama,
    Disabled,
}

impl std::str::FromStr for TranslationProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            "disabled" | "none" => Ok(Self::Disabled),
            _ => Err(ConfigError::InvalidValue {
                key: "TRANSLATION_PROVIDER".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Batch driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Delay between items, in milliseconds
    pub delay_ms: u64,

    /// Skip names already present in the store
    pub skip_existing: bool,

    /// Characters of biography kept in report summaries
    pub summary_biography_chars: usize,
}

impl BatchConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1000,
            skip_existing: false,
            summary_biography_chars: 200,
        }
    }
}

/// Reconciler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Skip knowledge-graph education values already on the record
    pub dedupe_education: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            dedupe_education: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl From<ConfigError> for crate::ArtlasError {
    fn from(err: ConfigError) -> Self {
        crate::ArtlasError::ConfigError(err.to_string())
    }
}
