//! Single-artist enrichment
//!
//! Primary page (with one search-variation retry) → extraction → page
//! summary → secondary language → knowledge graph → reconcile → classify.
//! Only a missing or rejected primary page fails the lookup; every other
//! adapter error is logged and leaves its fields empty.

use artlas_core::merge::coalesce_text;
use artlas_core::{
    current_year, ArtlasError, EnrichedArtist, GraphFacts, LocalizedInfo, PageSummary, Result,
    SourceDocument,
};

use crate::context::EnrichmentContext;

/// Outcome of fetching one primary title
enum PrimaryPage {
    Accepted(SourceDocument),
    Rejected,
    Missing,
}

/// Looks up and reconciles one artist
pub struct ArtistEnricher {
    context: EnrichmentContext,
}

impl ArtistEnricher {
    pub fn new(context: EnrichmentContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &EnrichmentContext {
        &self.context
    }

    /// Enrich one artist by name
    pub async fn lookup(&self, name: &str) -> Result<EnrichedArtist> {
        tracing::info!(artist = name, "Enrichment started");

        // 1. Primary page
        let document = self.find_primary(name).await?;

        // 2. Extract
        let mut record = self.context.extractor().extract(&document);

        // 3. Summary metadata
        if let Some(summary) = self.fetch_summary(&document.title).await {
            coalesce_text(&mut record.image_url, summary.image_url);
            coalesce_text(&mut record.external_id, summary.external_id);
        }

        // 4. Secondary language
        let localized = self.lookup_localized(name).await;

        // 5. Knowledge graph
        let facts = match record.external_id.as_deref() {
            Some(id) => self.lookup_facts(id).await,
            None => None,
        };

        // 6. Reconcile & classify
        let record = self.context.reconciler().reconcile(record, localized, facts);
        let year = self.context.current_year().unwrap_or_else(current_year);
        let enriched = EnrichedArtist::classify_at(record, year);

        tracing::info!(
            artist = %enriched.record.name,
            era = %enriched.classification.era,
            copyright = %enriched.classification.copyright_status,
            "Enrichment completed"
        );
        Ok(enriched)
    }

    async fn find_primary(&self, name: &str) -> Result<SourceDocument> {
        match self.fetch_primary(name).await {
            PrimaryPage::Accepted(document) => return Ok(document),
            PrimaryPage::Rejected => {
                tracing::warn!(artist = name, "Page is not about a visual artist");
                return Err(ArtlasError::ValidationRejected(name.to_string()));
            }
            PrimaryPage::Missing => {}
        }

        let primary = self.context.primary();
        let alternatives = primary
            .search_titles(name, self.context.search_limit())
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(artist = name, error = %e, "Title search failed");
                Vec::new()
            });

        let Some(alternative) = alternatives.first() else {
            tracing::warn!(artist = name, "No page or search result");
            return Err(ArtlasError::NotFound(name.to_string()));
        };

        tracing::debug!(artist = name, alternative = %alternative, "Retrying with search result");
        match self.fetch_primary(alternative).await {
            PrimaryPage::Accepted(document) => Ok(document),
            PrimaryPage::Rejected => {
                tracing::warn!(
                    artist = name,
                    alternative = %alternative,
                    "Page is not about a visual artist"
                );
                Err(ArtlasError::ValidationRejected(alternative.clone()))
            }
            PrimaryPage::Missing => Err(ArtlasError::NotFound(name.to_string())),
        }
    }

    async fn fetch_primary(&self, title: &str) -> PrimaryPage {
        match self.context.primary().fetch_page(title).await {
            Ok(Some(document)) if self.context.extractor().is_art_subject(&document) => {
                PrimaryPage::Accepted(document)
            }
            Ok(Some(_)) => PrimaryPage::Rejected,
            Ok(None) => PrimaryPage::Missing,
            Err(e) => {
                tracing::warn!(title, error = %e, "Primary page fetch failed");
                PrimaryPage::Missing
            }
        }
    }

    async fn fetch_summary(&self, title: &str) -> Option<PageSummary> {
        self.context
            .primary()
            .fetch_summary(title)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(title, error = %e, "Page summary unavailable");
                None
            })
    }

    /// Secondary page under the literal name, then under a translated name
    async fn lookup_localized(&self, name: &str) -> Option<LocalizedInfo> {
        let secondary = self.context.secondary()?;

        if let Some(info) = self.fetch_localized(name).await {
            return Some(info);
        }

        let translator = self.context.translator()?;
        let translated = match translator.translate_name(name, secondary.language()).await {
            Ok(translated) => translated,
            Err(e) => {
                tracing::warn!(artist = name, error = %e, "Name translation failed");
                return None;
            }
        };

        if translated == name {
            return None;
        }
        tracing::debug!(artist = name, %translated, "Retrying secondary lookup");
        self.fetch_localized(&translated).await
    }

    async fn fetch_localized(&self, title: &str) -> Option<LocalizedInfo> {
        let secondary = self.context.secondary()?;
        match secondary.fetch_page(title).await {
            Ok(Some(page)) => Some(LocalizedInfo {
                biography_localized: self.context.extractor().localized_biography(&page.text),
                name_localized: Some(page.title),
            }),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(
                    title,
                    language = secondary.language(),
                    error = %e,
                    "Secondary page fetch failed"
                );
                None
            }
        }
    }

    async fn lookup_facts(&self, external_id: &str) -> Option<GraphFacts> {
        let graph = self.context.knowledge_graph()?;
        graph.fetch_facts(external_id).await.unwrap_or_else(|e| {
            tracing::warn!(external_id, error = %e, "Knowledge graph lookup failed");
            None
        })
    }
}
