//! Pipeline context
//!
//! Everything a lookup needs, built once per run and passed explicitly:
//! source adapters, the optional translator, extraction tables and merge
//! settings. Structured events go to the `tracing` subscriber.

use std::sync::Arc;

use artlas_core::{
    AppConfig, EncyclopediaSource, KnowledgeGraphSource, NameTranslator, Result, Vocabulary,
};
use artlas_extractor::ArtistTextExtractor;
use artlas_sources::{create_translator, WikidataClient, WikipediaClient};

use crate::reconcile::Reconciler;

const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Shared state for one enrichment run
pub struct EnrichmentContext {
    /// Primary-language encyclopedia
    primary: Arc<dyn EncyclopediaSource>,

    /// Secondary-language encyclopedia (optional)
    secondary: Option<Arc<dyn EncyclopediaSource>>,

    /// Knowledge graph (optional)
    knowledge_graph: Option<Arc<dyn KnowledgeGraphSource>>,

    /// Name translator for the secondary retry (optional)
    translator: Option<Arc<dyn NameTranslator>>,

    extractor: ArtistTextExtractor,
    reconciler: Reconciler,

    /// Alternatives requested from title search
    search_limit: usize,

    /// Fixed classification year; the calendar year when unset
    current_year: Option<i32>,
}

impl EnrichmentContext {
    /// Create a context over a primary source with default tables
    pub fn new(primary: Arc<dyn EncyclopediaSource>) -> Self {
        Self {
            primary,
            secondary: None,
            knowledge_graph: None,
            translator: None,
            extractor: ArtistTextExtractor::default(),
            reconciler: Reconciler::default(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            current_year: None,
        }
    }

    /// Build the HTTP-backed context described by `config`
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let sources = &config.sources;

        let primary = WikipediaClient::from_config(sources, &sources.primary_language)?;
        let secondary = WikipediaClient::from_config(sources, &sources.secondary_language)?;
        let knowledge_graph = WikidataClient::from_config(sources)?;

        let mut context = Self::new(Arc::new(primary))
            .with_secondary(Arc::new(secondary))
            .with_knowledge_graph(Arc::new(knowledge_graph))
            .with_vocabulary(config.vocabulary.clone())
            .with_reconciler(Reconciler::new(&config.reconciler))
            .with_search_limit(sources.search_limit);

        if let Some(translator) = create_translator(&config.translation)? {
            context = context.with_translator(translator);
        }

        tracing::debug!(
            primary = %sources.primary_language,
            secondary = %sources.secondary_language,
            translator = context.translator.is_some(),
            "Enrichment context ready"
        );

        Ok(context)
    }

    pub fn with_secondary(mut self, source: Arc<dyn EncyclopediaSource>) -> Self {
        self.secondary = Some(source);
        self
    }

    pub fn with_knowledge_graph(mut self, source: Arc<dyn KnowledgeGraphSource>) -> Self {
        self.knowledge_graph = Some(source);
        self
    }

    pub fn with_translator(mut self, translator: Arc<dyn NameTranslator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.extractor = ArtistTextExtractor::new(vocabulary);
        self
    }

    pub fn with_reconciler(mut self, reconciler: Reconciler) -> Self {
        self.reconciler = reconciler;
        self
    }

    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    /// Classify against a fixed year instead of the calendar year
    pub fn at_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    pub fn primary(&self) -> &dyn EncyclopediaSource {
        self.primary.as_ref()
    }

    pub fn secondary(&self) -> Option<&dyn EncyclopediaSource> {
        self.secondary.as_deref()
    }

    pub fn knowledge_graph(&self) -> Option<&dyn KnowledgeGraphSource> {
        self.knowledge_graph.as_deref()
    }

    pub fn translator(&self) -> Option<&dyn NameTranslator> {
        self.translator.as_deref()
    }

    pub fn extractor(&self) -> &ArtistTextExtractor {
        &self.extractor
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn search_limit(&self) -> usize {
        self.search_limit
    }

    pub fn current_year(&self) -> Option<i32> {
        self.current_year
    }
}
