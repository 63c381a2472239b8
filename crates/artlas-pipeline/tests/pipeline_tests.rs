//! End-to-end pipeline tests over in-memory sources and an in-memory store

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use artlas_core::{
    open_repository, ArtistRepository, ArtistStore, ArtlasError, BatchConfig, CopyrightStatus,
    DatabaseConfig, EncyclopediaSource, EnrichedArtist, Era, GraphFacts, KnowledgeGraphSource,
    NameTranslator, PageSummary, Result, SaveOutcome, SourceDocument, StoredArtist,
};
use artlas_pipeline::{
    ArtistEnricher, BatchOrchestrator, EnrichmentContext, ItemOutcome, REASON_NOT_FOUND,
    REASON_SAVE_FAILED,
};

// ============================================================================
// Fakes
// ============================================================================

#[derive(Default)]
struct FakeEncyclopedia {
    language: String,
    pages: HashMap<String, SourceDocument>,
    summaries: HashMap<String, PageSummary>,
    search: HashMap<String, Vec<String>>,
    failing: bool,
    fetched: Mutex<Vec<String>>,
    searched: Mutex<Vec<String>>,
}

impl FakeEncyclopedia {
    fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
            ..Default::default()
        }
    }

    fn with_page(mut self, page: SourceDocument) -> Self {
        self.pages.insert(page.title.clone(), page);
        self
    }

    fn with_summary(mut self, title: &str, summary: PageSummary) -> Self {
        self.summaries.insert(title.to_string(), summary);
        self
    }

    fn with_search(mut self, query: &str, titles: &[&str]) -> Self {
        self.search.insert(
            query.to_string(),
            titles.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    fn searched(&self) -> Vec<String> {
        self.searched.lock().unwrap().clone()
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            Err(ArtlasError::adapter("fake", "Request timed out"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl EncyclopediaSource for FakeEncyclopedia {
    async fn fetch_page(&self, title: &str) -> Result<Option<SourceDocument>> {
        self.fetched.lock().unwrap().push(title.to_string());
        self.check()?;
        Ok(self.pages.get(title).cloned())
    }

    async fn fetch_summary(&self, title: &str) -> Result<Option<PageSummary>> {
        self.check()?;
        Ok(self.summaries.get(title).cloned())
    }

    async fn search_titles(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        self.searched.lock().unwrap().push(query.to_string());
        self.check()?;
        Ok(self
            .search
            .get(query)
            .map(|titles| titles.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    fn language(&self) -> &str {
        &self.language
    }
}

struct FakeGraph {
    facts: HashMap<String, GraphFacts>,
    failing: bool,
}

#[async_trait]
impl KnowledgeGraphSource for FakeGraph {
    async fn fetch_facts(&self, external_id: &str) -> Result<Option<GraphFacts>> {
        if self.failing {
            return Err(ArtlasError::adapter("fake-graph", "HTTP 503"));
        }
        Ok(self.facts.get(external_id).cloned())
    }
}

struct FakeTranslator;

#[async_trait]
impl NameTranslator for FakeTranslator {
    async fn translate_name(&self, name: &str, target_language: &str) -> Result<String> {
        match (name, target_language) {
            ("Pablo Picasso", "ko") => Ok("파블로 피카소".to_string()),
            _ => Err(ArtlasError::adapter("fake-translator", "no translation")),
        }
    }
}

/// Repository whose writes always fail
struct BrokenRepository;

#[async_trait]
impl ArtistRepository for BrokenRepository {
    async fn find_by_name(&self, _name: &str) -> Result<Option<StoredArtist>> {
        Ok(None)
    }

    async fn find_existing(&self, _name: &str) -> Result<Option<StoredArtist>> {
        Ok(None)
    }

    async fn save(&self, _artist: &EnrichedArtist) -> Result<SaveOutcome> {
        Err(ArtlasError::PersistenceFailure("database is locked".to_string()))
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn picasso_page() -> SourceDocument {
    SourceDocument {
        title: "Pablo Picasso".to_string(),
        text: "Pablo Ruiz Picasso (1881–1973) was a Spanish painter, sculptor, printmaker, \
               ceramicist and theatre designer who spent most of his adult life in France. \
               He co-founded the Cubist movement.\n\
               Notable works:\n\
               \"Guernica\", \"Les Demoiselles d'Avignon\"\n\n\
               Picasso's output is among the largest of any artist."
            .to_string(),
        categories: vec![
            "1881 births".to_string(),
            "20th-century Spanish painters".to_string(),
            "Cubist artists".to_string(),
        ],
        links: vec!["Cubism".to_string(), "Georges Braque".to_string()],
        url: Some("https://en.wikipedia.org/wiki/Pablo_Picasso".to_string()),
    }
}

fn monet_page() -> SourceDocument {
    SourceDocument {
        title: "Claude Monet".to_string(),
        text: "Oscar-Claude Monet (1840–1926) was a French painter and founder of \
               impressionism."
            .to_string(),
        categories: vec!["French Impressionist painters".to_string()],
        ..Default::default()
    }
}

fn cantor_page() -> SourceDocument {
    SourceDocument {
        title: "Georg Cantor".to_string(),
        text: "Georg Cantor (1845–1918) was a mathematician who created set theory.".to_string(),
        categories: vec!["German mathematicians".to_string()],
        ..Default::default()
    }
}

fn korean_picasso() -> SourceDocument {
    SourceDocument {
        title: "파블로 피카소".to_string(),
        text: "파블로 피카소는 스페인 출신의 화가이자 조각가이다.".to_string(),
        ..Default::default()
    }
}

fn primary() -> FakeEncyclopedia {
    FakeEncyclopedia::new("en")
        .with_page(picasso_page())
        .with_page(monet_page())
        .with_page(cantor_page())
        .with_summary(
            "Pablo Picasso",
            PageSummary {
                external_id: Some("Q5593".to_string()),
                image_url: Some("https://upload.wikimedia.org/picasso.jpg".to_string()),
            },
        )
        .with_search("Picaso", &["Pablo Picasso", "Picasso (surname)"])
}

fn graph() -> FakeGraph {
    let mut facts = HashMap::new();
    facts.insert(
        "Q5593".to_string(),
        GraphFacts {
            birth_date: Some("1881-10-25T00:00:00Z".to_string()),
            death_date: Some("1973-04-08T00:00:00Z".to_string()),
            nationality: Some("Spain".to_string()),
            occupation: Some("painter".to_string()),
            education: Some("Real Academia de Bellas Artes de San Fernando".to_string()),
        },
    );
    FakeGraph {
        facts,
        failing: false,
    }
}

fn context(primary: Arc<FakeEncyclopedia>) -> EnrichmentContext {
    EnrichmentContext::new(primary)
        .with_secondary(Arc::new(
            FakeEncyclopedia::new("ko").with_page(korean_picasso()),
        ))
        .with_knowledge_graph(Arc::new(graph()))
        .with_translator(Arc::new(FakeTranslator))
        .at_year(2043)
}

fn no_delay() -> BatchConfig {
    BatchConfig {
        delay_ms: 0,
        ..Default::default()
    }
}

// ============================================================================
// Lookup
// ============================================================================

#[tokio::test]
async fn test_picasso_end_to_end() {
    let enricher = ArtistEnricher::new(context(Arc::new(primary())));

    let artist = enricher.lookup("Pablo Picasso").await.unwrap();
    let record = &artist.record;

    assert_eq!(record.name, "Pablo Picasso");
    assert_eq!(record.birth_year, Some(1881));
    assert_eq!(record.death_year, Some(1973));
    assert_eq!(record.nationality.as_deref(), Some("Spanish"));
    assert_eq!(record.nationality_localized.as_deref(), Some("스페인"));
    assert_eq!(
        record.notable_works,
        vec!["Guernica".to_string(), "Les Demoiselles d'Avignon".to_string()]
    );
    assert_eq!(record.external_id.as_deref(), Some("Q5593"));
    assert_eq!(
        record.image_url.as_deref(),
        Some("https://upload.wikimedia.org/picasso.jpg")
    );
    assert_eq!(record.birth_date.as_deref(), Some("1881-10-25T00:00:00Z"));
    assert_eq!(
        record.education,
        vec!["Real Academia de Bellas Artes de San Fernando".to_string()]
    );
    // found through the translated title
    assert_eq!(record.name_localized.as_deref(), Some("파블로 피카소"));
    assert!(record.biography_localized.is_some());

    assert_eq!(artist.classification.era, Era::Postmodern);
    assert_eq!(
        artist.classification.copyright_status,
        CopyrightStatus::PublicDomain
    );
}

#[tokio::test]
async fn test_copyright_depends_on_year() {
    let enricher = ArtistEnricher::new(context(Arc::new(primary())).at_year(2026));

    let artist = enricher.lookup("Pablo Picasso").await.unwrap();
    assert_eq!(
        artist.classification.copyright_status,
        CopyrightStatus::Transitional
    );
}

#[tokio::test]
async fn test_search_variation_retry() {
    let source = Arc::new(primary());
    let enricher = ArtistEnricher::new(context(source.clone()));

    let artist = enricher.lookup("Picaso").await.unwrap();
    assert_eq!(artist.record.name, "Pablo Picasso");
    assert_eq!(
        source.fetched(),
        vec!["Picaso".to_string(), "Pablo Picasso".to_string()]
    );
}

#[tokio::test]
async fn test_unknown_name_not_found() {
    let enricher = ArtistEnricher::new(context(Arc::new(primary())));

    let err = enricher.lookup("Nobody Atall").await.unwrap_err();
    assert!(matches!(err, ArtlasError::NotFound(_)));
}

#[tokio::test]
async fn test_non_artist_rejected_without_search() {
    let source = Arc::new(primary());
    let enricher = ArtistEnricher::new(context(source.clone()));

    let err = enricher.lookup("Georg Cantor").await.unwrap_err();
    assert!(matches!(err, ArtlasError::ValidationRejected(_)));
    assert!(err.is_not_found());
    assert!(source.searched().is_empty());
}

#[tokio::test]
async fn test_secondary_adapter_failures_degrade() {
    let context = EnrichmentContext::new(Arc::new(primary()))
        .with_secondary(Arc::new(FakeEncyclopedia::new("ko").failing()))
        .with_knowledge_graph(Arc::new(FakeGraph {
            facts: HashMap::new(),
            failing: true,
        }))
        .at_year(2043);
    let enricher = ArtistEnricher::new(context);

    let artist = enricher.lookup("Pablo Picasso").await.unwrap();
    let record = &artist.record;

    assert_eq!(record.birth_year, Some(1881));
    assert_eq!(record.name_localized, None);
    assert!(record.education.is_empty());
    assert_eq!(record.birth_date, None);
}

#[tokio::test]
async fn test_primary_failure_is_not_found() {
    let enricher = ArtistEnricher::new(EnrichmentContext::new(Arc::new(
        FakeEncyclopedia::new("en").failing(),
    )));

    let err = enricher.lookup("Pablo Picasso").await.unwrap_err();
    assert!(err.is_not_found());
}

// ============================================================================
// Batch
// ============================================================================

#[tokio::test]
async fn test_batch_with_one_missing_name() {
    let store = Arc::new(ArtistStore::in_memory().await.unwrap());
    let orchestrator = BatchOrchestrator::new(
        ArtistEnricher::new(context(Arc::new(primary()))),
        store.clone(),
        no_delay(),
    );

    let report = orchestrator
        .run(&["Pablo Picasso", "Nobody Atall", "Claude Monet"])
        .await;

    assert_eq!(report.total, 3);
    assert_eq!(report.successful.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.success_rate, "66.7%");
    assert_eq!(report.failed[0].name, "Nobody Atall");
    assert_eq!(report.failed[0].error, REASON_NOT_FOUND);

    let picasso = &report.successful[0];
    assert_eq!(picasso.name, "Pablo Picasso");
    assert_eq!(picasso.info.birth_year, Some(1881));
    assert!(picasso.info.biography.as_ref().unwrap().chars().count() <= 200);

    let stored = store.find_by_name("claude monet").await.unwrap().unwrap();
    assert_eq!(stored.record.nationality.as_deref(), Some("French"));
    assert_eq!(stored.era.as_deref(), Some("Modern"));
}

#[tokio::test]
async fn test_rerun_updates_without_nulling() {
    let store = Arc::new(ArtistStore::in_memory().await.unwrap());
    let orchestrator = BatchOrchestrator::new(
        ArtistEnricher::new(context(Arc::new(primary()))),
        store.clone(),
        no_delay(),
    );
    let first = orchestrator.process("Pablo Picasso").await;
    let ItemOutcome::Saved { save, .. } = first else {
        panic!("first run should save");
    };
    assert!(matches!(save, SaveOutcome::Inserted(_)));

    // second pass without knowledge graph or secondary data
    let sparse = BatchOrchestrator::new(
        ArtistEnricher::new(EnrichmentContext::new(Arc::new(primary())).at_year(2043)),
        store.clone(),
        no_delay(),
    );
    let second = sparse.process("Pablo Picasso").await;
    let ItemOutcome::Saved { save: second_save, .. } = second else {
        panic!("second run should save");
    };
    assert_eq!(second_save, SaveOutcome::Updated(save.id()));

    let stored = store.find_by_name("Pablo Picasso").await.unwrap().unwrap();
    assert_eq!(stored.record.name_localized.as_deref(), Some("파블로 피카소"));
    assert_eq!(stored.record.birth_date.as_deref(), Some("1881-10-25T00:00:00Z"));
    assert_eq!(stored.record.nationality.as_deref(), Some("Spanish"));
    assert_eq!(stored.copyright_status.as_deref(), Some("public_domain"));
}

#[tokio::test]
async fn test_skip_existing_does_not_look_up() {
    let store = Arc::new(ArtistStore::in_memory().await.unwrap());
    let seed = BatchOrchestrator::new(
        ArtistEnricher::new(context(Arc::new(primary()))),
        store.clone(),
        no_delay(),
    );
    seed.process("Pablo Picasso").await;

    let source = Arc::new(primary());
    let orchestrator = BatchOrchestrator::new(
        ArtistEnricher::new(context(source.clone())),
        store.clone(),
        BatchConfig {
            delay_ms: 0,
            skip_existing: true,
            ..Default::default()
        },
    );

    let report = orchestrator.run(&["파블로 피카소", "Claude Monet"]).await;

    assert_eq!(report.skipped, vec!["파블로 피카소".to_string()]);
    assert_eq!(report.total, 2);
    assert_eq!(report.successful.len(), 1);
    assert_eq!(report.success_rate, "50.0%");
    assert_eq!(source.fetched(), vec!["Claude Monet".to_string()]);
}

#[tokio::test]
async fn test_save_failure_reported() {
    let orchestrator = BatchOrchestrator::new(
        ArtistEnricher::new(context(Arc::new(primary()))),
        Arc::new(BrokenRepository),
        no_delay(),
    );

    let report = orchestrator.run(&["Pablo Picasso"]).await;
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].error, REASON_SAVE_FAILED);
    assert_eq!(report.success_rate, "0.0%");
}

#[tokio::test]
async fn test_empty_batch() {
    let orchestrator = BatchOrchestrator::new(
        ArtistEnricher::new(context(Arc::new(primary()))),
        Arc::new(BrokenRepository),
        no_delay(),
    );

    let names: [&str; 0] = [];
    let report = orchestrator.run(&names).await;
    assert_eq!(report.total, 0);
    assert_eq!(report.success_rate, "0.0%");
}

#[tokio::test]
async fn test_delay_between_items() {
    let orchestrator = BatchOrchestrator::new(
        ArtistEnricher::new(context(Arc::new(primary()))),
        Arc::new(BrokenRepository),
        BatchConfig {
            delay_ms: 30,
            ..Default::default()
        },
    );

    let started = Instant::now();
    orchestrator
        .run(&["Nobody", "Nobody Else", "Still Nobody"])
        .await;
    assert!(started.elapsed() >= Duration::from_millis(60));
}

#[tokio::test]
async fn test_report_written_as_json() {
    let orchestrator = BatchOrchestrator::new(
        ArtistEnricher::new(context(Arc::new(primary()))),
        Arc::new(ArtistStore::in_memory().await.unwrap()),
        no_delay(),
    );
    let report = orchestrator.run(&["Pablo Picasso", "Nobody Atall"]).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    report.write_json(&path).await.unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["total"], 2);
    assert_eq!(json["success_rate"], "50.0%");
    assert_eq!(json["successful"][0]["info"]["nationality"], "Spanish");
    assert_eq!(json["failed"][0]["error"], REASON_NOT_FOUND);
}

#[tokio::test]
async fn test_unreachable_database_still_reports() {
    let store = open_repository(&DatabaseConfig {
        url: "sqlite:///nonexistent/artlas/dir/artists.db".to_string(),
        pool_size: 1,
        create_schema: true,
    })
    .await;
    let orchestrator = BatchOrchestrator::new(
        ArtistEnricher::new(context(Arc::new(primary()))),
        store,
        BatchConfig {
            delay_ms: 0,
            skip_existing: true,
            ..Default::default()
        },
    );

    let report = orchestrator.run(&["Pablo Picasso", "Nobody Atall"]).await;
    assert_eq!(report.total, 2);
    assert_eq!(report.failed[0].error, REASON_SAVE_FAILED);
    assert_eq!(report.failed[1].error, REASON_NOT_FOUND);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("artist_results.json");
    report.write_json(&path).await.unwrap();
    assert!(path.exists());
}
