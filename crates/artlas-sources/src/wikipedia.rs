//! Wikipedia client
//!
//! Three endpoints per language edition:
//! - MediaWiki action API for page text, categories, links and URL
//! - REST page summary for the thumbnail and Wikidata item
//! - REST title search for spelling variations

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use artlas_core::{
    ArtlasError, EncyclopediaSource, PageSummary, Result, SourceDocument, SourcesConfig,
};

use crate::{http_client, request_error};

const ADAPTER: &str = "wikipedia";

/// One Wikipedia language edition
pub struct WikipediaClient {
    client: Client,
    base_url: String,
    language: String,
}

impl WikipediaClient {
    pub fn new(
        base_url: impl Into<String>,
        language: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: http_client(ADAPTER, user_agent, timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            language: language.into(),
        })
    }

    /// Create the edition for `language` from config
    pub fn from_config(config: &SourcesConfig, language: &str) -> Result<Self> {
        Self::new(
            config.wikipedia_base_url(language),
            language,
            &config.user_agent,
            config.request_timeout(),
        )
    }

    fn summary_url(&self, title: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ArtlasError::adapter(ADAPTER, format!("Invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ArtlasError::adapter(ADAPTER, "Base URL cannot carry a path"))?
            .extend(["api", "rest_v1", "page", "summary"])
            .push(&title.replace(' ', "_"));
        Ok(url)
    }

    /// Action API query for page text, visible categories, links and URL.
    ///
    /// Hidden maintenance categories ("Articles with short description")
    /// are excluded; their names would pass the art-category check.
    fn page_request(&self, title: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}/w/api.php", self.base_url))
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("redirects", "1"),
                ("prop", "extracts|categories|links|info"),
                ("explaintext", "1"),
                ("inprop", "url"),
                ("cllimit", "max"),
                ("clshow", "!hidden"),
                ("clprop", "hidden"),
                ("pllimit", "max"),
                ("titles", title),
            ])
    }

    /// GET a JSON body; 404 maps to `None`
    async fn get_json<T>(&self, request: reqwest::RequestBuilder) -> Result<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = request
            .send()
            .await
            .map_err(|e| request_error(ADAPTER, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ArtlasError::adapter(
                ADAPTER,
                format!("HTTP {}: {error_text}", status.as_u16()),
            ));
        }

        response
            .json()
            .await
            .map(Some)
            .map_err(|e| ArtlasError::adapter(ADAPTER, format!("Failed to parse response: {e}")))
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: Option<QueryBody>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: Vec<RawPage>,
}

#[derive(Debug, Deserialize)]
struct RawPage {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    extract: Option<String>,
    #[serde(default)]
    categories: Vec<CategoryRef>,
    #[serde(default)]
    links: Vec<TitleRef>,
    fullurl: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TitleRef {
    title: String,
}

#[derive(Debug, Deserialize)]
struct CategoryRef {
    title: String,
    #[serde(default)]
    hidden: bool,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    wikibase_item: Option<String>,
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    source: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    pages: Vec<TitleRef>,
}

/// Category title without its namespace prefix
fn strip_namespace(title: &str) -> &str {
    title.split_once(':').map_or(title, |(_, rest)| rest)
}

fn into_document(response: QueryResponse) -> Option<SourceDocument> {
    let page = response.query?.pages.into_iter().next()?;
    if page.missing || page.invalid {
        return None;
    }

    Some(SourceDocument {
        title: page.title,
        text: page.extract.unwrap_or_default(),
        categories: page
            .categories
            .iter()
            .filter(|c| !c.hidden)
            .map(|c| strip_namespace(&c.title).to_string())
            .collect(),
        links: page.links.into_iter().map(|l| l.title).collect(),
        url: page.fullurl,
    })
}

impl From<SummaryResponse> for PageSummary {
    fn from(summary: SummaryResponse) -> Self {
        Self {
            external_id: summary.wikibase_item,
            image_url: summary.thumbnail.map(|t| t.source),
        }
    }
}

// ============================================================================
// EncyclopediaSource
// ============================================================================

#[async_trait]
impl EncyclopediaSource for WikipediaClient {
    async fn fetch_page(&self, title: &str) -> Result<Option<SourceDocument>> {
        tracing::debug!(language = %self.language, title, "Fetching page");

        let response: Option<QueryResponse> = self.get_json(self.page_request(title)).await?;
        Ok(response.and_then(into_document))
    }

    async fn fetch_summary(&self, title: &str) -> Result<Option<PageSummary>> {
        let url = self.summary_url(title)?;
        let summary: Option<SummaryResponse> = self.get_json(self.client.get(url)).await?;
        Ok(summary.map(PageSummary::from))
    }

    async fn search_titles(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let request = self
            .client
            .get(format!("{}/w/rest.php/v1/search/page", self.base_url))
            .query(&[("q", query.to_string()), ("limit", limit.to_string())]);

        let response: Option<SearchResponse> = self.get_json(request).await?;
        let titles: Vec<String> = response
            .map(|r| r.pages.into_iter().map(|p| p.title).take(limit).collect())
            .unwrap_or_default();

        tracing::debug!(language = %self.language, query, found = titles.len(), "Title search");
        Ok(titles)
    }

    fn language(&self) -> &str {
        &self.language
    }
}
