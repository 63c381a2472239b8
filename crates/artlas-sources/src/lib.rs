//! artlas Sources - Remote knowledge adapters
//!
//! HTTP implementations of the adapter traits declared in `artlas-core`:
//! - [`WikipediaClient`]: pages, summaries and title search ([`EncyclopediaSource`])
//! - [`WikidataClient`]: SPARQL fact lookup ([`KnowledgeGraphSource`])
//! - [`translate`]: OpenAI / Ollama name translation ([`NameTranslator`])
//!
//! [`EncyclopediaSource`]: artlas_core::EncyclopediaSource
//! [`KnowledgeGraphSource`]: artlas_core::KnowledgeGraphSource
//! [`NameTranslator`]: artlas_core::NameTranslator

use std::time::Duration;

use artlas_core::{ArtlasError, Result};
use reqwest::Client;

pub mod translate;
pub mod wikidata;
pub mod wikipedia;

pub use translate::{create_translator, OllamaTranslator, OpenAiTranslator};
pub use wikidata::WikidataClient;
pub use wikipedia::WikipediaClient;

/// Build an HTTP client with a User-Agent and a hard request timeout
pub(crate) fn http_client(adapter: &str, user_agent: &str, timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(|e| ArtlasError::adapter(adapter, format!("Failed to build HTTP client: {e}")))
}

/// Map a transport error, calling out timeouts
pub(crate) fn request_error(adapter: &str, err: reqwest::Error) -> ArtlasError {
    if err.is_timeout() {
        ArtlasError::adapter(adapter, format!("Request timed out: {err}"))
    } else {
        ArtlasError::adapter(adapter, format!("Request failed: {err}"))
    }
}
