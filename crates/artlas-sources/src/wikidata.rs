//! Wikidata SPARQL client

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use artlas_core::{ArtlasError, GraphFacts, KnowledgeGraphSource, Result, SourcesConfig};

use crate::{http_client, request_error};

const ADAPTER: &str = "wikidata";

/// Knowledge-graph lookups against a SPARQL endpoint
pub struct WikidataClient {
    client: Client,
    endpoint: String,
}

impl WikidataClient {
    pub fn new(endpoint: impl Into<String>, user_agent: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(ADAPTER, user_agent, timeout)?,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &SourcesConfig) -> Result<Self> {
        Self::new(
            config.sparql_endpoint.clone(),
            &config.user_agent,
            config.request_timeout(),
        )
    }
}

/// Item ids are spliced into the query, so only `Q<digits>` is accepted
fn is_item_id(id: &str) -> bool {
    id.strip_prefix('Q')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Birth, death, citizenship, occupation and education of one item
pub fn build_query(item_id: &str) -> String {
    format!(
        r#"SELECT ?birthDate ?deathDate ?nationalityLabel ?occupationLabel ?educationLabel WHERE {{
  OPTIONAL {{ wd:{item_id} wdt:P569 ?birthDate . }}
  OPTIONAL {{ wd:{item_id} wdt:P570 ?deathDate . }}
  OPTIONAL {{ wd:{item_id} wdt:P27 ?nationality . }}
  OPTIONAL {{ wd:{item_id} wdt:P106 ?occupation . }}
  OPTIONAL {{ wd:{item_id} wdt:P69 ?education . }}
  SERVICE wikibase:label {{ bd:serviceParam wikibase:language "en" . }}
}}
LIMIT 1"#
    )
}

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    #[serde(default)]
    bindings: Vec<HashMap<String, SparqlValue>>,
}

#[derive(Debug, Deserialize)]
struct SparqlValue {
    value: String,
}

fn first_row(response: SparqlResponse) -> Option<GraphFacts> {
    let mut row = response.results.bindings.into_iter().next()?;
    let mut take = |key: &str| {
        row.remove(key)
            .map(|v| v.value)
            .filter(|v| !v.trim().is_empty())
    };

    let facts = GraphFacts {
        birth_date: take("birthDate"),
        death_date: take("deathDate"),
        nationality: take("nationalityLabel"),
        occupation: take("occupationLabel"),
        education: take("educationLabel"),
    };

    (facts != GraphFacts::default()).then_some(facts)
}

#[async_trait]
impl KnowledgeGraphSource for WikidataClient {
    async fn fetch_facts(&self, external_id: &str) -> Result<Option<GraphFacts>> {
        if !is_item_id(external_id) {
            return Err(ArtlasError::adapter(
                ADAPTER,
                format!("Invalid item id: {external_id}"),
            ));
        }

        let query = build_query(external_id);
        let response = self
            .client
            .get(&self.endpoint)
            .header("Accept", "application/sparql-results+json")
            .query(&[("query", query.as_str()), ("format", "json")])
            .send()
            .await
            .map_err(|e| request_error(ADAPTER, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ArtlasError::adapter(
                ADAPTER,
                format!("HTTP {}: {error_text}", status.as_u16()),
            ));
        }

        let parsed: SparqlResponse = response
            .json()
            .await
            .map_err(|e| ArtlasError::adapter(ADAPTER, format!("Failed to parse response: {e}")))?;

        let facts = first_row(parsed);
        tracing::debug!(external_id, found = facts.is_some(), "Knowledge graph lookup");
        Ok(facts)
    }
}
