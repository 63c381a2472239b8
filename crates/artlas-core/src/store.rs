//! SQLite artist store
//!
//! Dedup lookup by case-insensitive name, then insert-or-update inside one
//! transaction. Updates coalesce every column: an absent incoming value
//! never replaces a stored one.
//!
//! SQLite's `LOWER()` folds ASCII only, so names are folded in Rust and
//! kept in indexed `name_key` / `name_localized_key` columns.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::{ArtistRecord, ArtlasError, EnrichedArtist, Result};

/// Artists with more notable works than this are featured on insert
const FEATURED_MIN_WORKS: usize = 5;

/// Case-folded lookup key of an artist name
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// SQLite artist store
pub struct ArtistStore {
    pool: SqlitePool,
}

impl ArtistStore {
    /// Open a pool against the configured database
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.pool_size.max(1))
            // keep in-memory databases alive for the life of the pool
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(&config.url)
            .await
            .map_err(|e| db_error("SQLite connection failed", e))?;

        let store = Self { pool };
        if config.create_schema {
            store.ensure_schema().await?;
        }
        Ok(store)
    }

    /// Single-connection in-memory store with the schema applied
    pub async fn in_memory() -> Result<Self> {
        Self::connect(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            pool_size: 1,
            create_schema: true,
        })
        .await
    }

    /// Create from an existing pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the artists table when missing
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS artists (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                name_key TEXT NOT NULL,
                name_localized TEXT,
                name_localized_key TEXT,
                birth_year INTEGER,
                death_year INTEGER,
                birth_date TEXT,
                death_date TEXT,
                nationality TEXT,
                nationality_localized TEXT,
                bio TEXT,
                bio_localized TEXT,
                art_movement TEXT,
                birth_place TEXT,
                education TEXT,
                notable_works TEXT,
                categories TEXT,
                reference_links TEXT,
                images TEXT,
                sources TEXT,
                official_links TEXT,
                era TEXT,
                copyright_status TEXT,
                is_featured INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create artists table", e))?;

        for statement in [
            "CREATE INDEX IF NOT EXISTS idx_artists_name_key ON artists (name_key)",
            "CREATE INDEX IF NOT EXISTS idx_artists_name_localized_key ON artists (name_localized_key)",
        ] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| db_error("Failed to create name index", e))?;
        }

        Ok(())
    }
}

fn db_error(context: &str, err: sqlx::Error) -> ArtlasError {
    ArtlasError::PersistenceFailure(format!("{context}: {err}"))
}

/// Result of a successful save
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted(Uuid),
    Updated(Uuid),
}

impl SaveOutcome {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Inserted(id) | Self::Updated(id) => *id,
        }
    }
}

/// An artist row as stored
#[derive(Debug, Clone, Serialize)]
pub struct StoredArtist {
    pub id: Uuid,
    pub record: ArtistRecord,
    pub era: Option<String>,
    pub copyright_status: Option<String>,
    pub is_featured: bool,
    pub images: Option<serde_json::Value>,
    pub sources: Option<serde_json::Value>,
    pub official_links: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Artist row from database
#[derive(Debug, FromRow)]
struct ArtistRow {
    id: String,
    name: String,
    name_localized: Option<String>,
    birth_year: Option<i64>,
    death_year: Option<i64>,
    birth_date: Option<String>,
    death_date: Option<String>,
    nationality: Option<String>,
    nationality_localized: Option<String>,
    bio: Option<String>,
    bio_localized: Option<String>,
    art_movement: Option<String>,
    birth_place: Option<String>,
    education: Option<String>,
    notable_works: Option<String>,
    categories: Option<String>,
    reference_links: Option<String>,
    images: Option<String>,
    sources: Option<String>,
    official_links: Option<String>,
    era: Option<String>,
    copyright_status: Option<String>,
    is_featured: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn json_list(column: Option<String>) -> Vec<String> {
    column
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

fn json_object(column: Option<String>) -> Option<serde_json::Value> {
    column.and_then(|raw| serde_json::from_str(&raw).ok())
}

impl TryFrom<ArtistRow> for StoredArtist {
    type Error = ArtlasError;

    fn try_from(row: ArtistRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id).map_err(|e| {
            ArtlasError::PersistenceFailure(format!("Invalid artist id {}: {e}", row.id))
        })?;

        let images = json_object(row.images);
        let sources = json_object(row.sources);
        let official_links = json_object(row.official_links);

        let record = ArtistRecord {
            name: row.name,
            name_localized: row.name_localized,
            birth_year: row.birth_year.map(|y| y as i32),
            death_year: row.death_year.map(|y| y as i32),
            birth_date: row.birth_date,
            death_date: row.death_date,
            nationality: row.nationality,
            nationality_localized: row.nationality_localized,
            biography: row.bio,
            biography_localized: row.bio_localized,
            art_movement: row.art_movement,
            birth_place: row.birth_place,
            education: json_list(row.education),
            notable_works: json_list(row.notable_works),
            image_url: json_str(&images, "portrait"),
            source_url: json_str(&official_links, "wikipedia"),
            external_id: json_str(&sources, "wikidata"),
            categories: json_list(row.categories),
            references: json_list(row.reference_links),
        };

        Ok(StoredArtist {
            id,
            record,
            era: row.era,
            copyright_status: row.copyright_status,
            is_featured: row.is_featured,
            images,
            sources,
            official_links,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn json_str(value: &Option<serde_json::Value>, key: &str) -> Option<String> {
    value
        .as_ref()
        .and_then(|v| v.get(key))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

/// Column values bound for one save.
///
/// Absent or empty values are bound as NULL so updates keep stored data.
struct ArtistColumns {
    education: Option<String>,
    notable_works: Option<String>,
    categories: Option<String>,
    reference_links: Option<String>,
    images: Option<String>,
    sources: Option<String>,
    official_links: Option<String>,
}

fn list_column(values: &[String]) -> Result<Option<String>> {
    if values.is_empty() {
        return Ok(None);
    }
    serde_json::to_string(values)
        .map(Some)
        .map_err(|e| ArtlasError::PersistenceFailure(format!("Failed to encode list: {e}")))
}

impl ArtistColumns {
    fn from_record(record: &ArtistRecord) -> Result<Self> {
        let images = record
            .image_url
            .as_ref()
            .map(|url| serde_json::json!({ "portrait": url }).to_string());

        let mut sources = serde_json::json!({ "wikipedia": "collected" });
        if let Some(id) = &record.external_id {
            sources["wikidata"] = serde_json::json!(id);
        }

        let official_links = record
            .source_url
            .as_ref()
            .map(|url| serde_json::json!({ "wikipedia": url }).to_string());

        Ok(Self {
            education: list_column(&record.education)?,
            notable_works: list_column(&record.notable_works)?,
            categories: list_column(&record.categories)?,
            reference_links: list_column(&record.references)?,
            images,
            sources: Some(sources.to_string()),
            official_links,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, name, name_localized, birth_year, death_year, birth_date, death_date,
        nationality, nationality_localized, bio, bio_localized, art_movement, birth_place,
        education, notable_works, categories, reference_links,
        images, sources, official_links, era, copyright_status, is_featured,
        created_at, updated_at
    FROM artists
"#;

/// Trait for artist persistence
#[async_trait]
pub trait ArtistRepository: Send + Sync {
    /// Find an artist by case-insensitive name
    async fn find_by_name(&self, name: &str) -> Result<Option<StoredArtist>>;

    /// Find an artist by name or localized name
    async fn find_existing(&self, name: &str) -> Result<Option<StoredArtist>>;

    /// Insert or coalesce-update an enriched artist in one transaction
    async fn save(&self, artist: &EnrichedArtist) -> Result<SaveOutcome>;
}

#[async_trait]
impl ArtistRepository for ArtistStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<StoredArtist>> {
        let row: Option<ArtistRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE name_key = ? LIMIT 1"))
                .bind(name_key(name))
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to look up artist", e))?;

        row.map(StoredArtist::try_from).transpose()
    }

    async fn find_existing(&self, name: &str) -> Result<Option<StoredArtist>> {
        let row: Option<ArtistRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE name_key = ?1 OR name_localized_key = ?1 LIMIT 1"
        ))
        .bind(name_key(name))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to look up artist", e))?;

        row.map(StoredArtist::try_from).transpose()
    }

    async fn save(&self, artist: &EnrichedArtist) -> Result<SaveOutcome> {
        let record = &artist.record;
        let columns = ArtistColumns::from_record(record)?;
        let key = name_key(&record.name);
        let localized_key = record.name_localized.as_deref().map(name_key);
        let now = Utc::now();

        // rolled back on drop if anything below fails
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let existing: Option<(String,)> =
            sqlx::query_as("SELECT id FROM artists WHERE name_key = ? LIMIT 1")
                .bind(&key)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| db_error("Failed to look up artist", e))?;

        let outcome = match existing {
            Some((id,)) => {
                sqlx::query(
                    r#"
                    UPDATE artists SET
                        name_localized = COALESCE(?1, name_localized),
                        birth_year = COALESCE(?2, birth_year),
                        death_year = COALESCE(?3, death_year),
                        birth_date = COALESCE(?4, birth_date),
                        death_date = COALESCE(?5, death_date),
                        nationality = COALESCE(?6, nationality),
                        nationality_localized = COALESCE(?7, nationality_localized),
                        bio = COALESCE(?8, bio),
                        bio_localized = COALESCE(?9, bio_localized),
                        art_movement = COALESCE(?10, art_movement),
                        birth_place = COALESCE(?11, birth_place),
                        education = COALESCE(?12, education),
                        notable_works = COALESCE(?13, notable_works),
                        categories = COALESCE(?14, categories),
                        reference_links = COALESCE(?15, reference_links),
                        images = CASE WHEN ?16 IS NULL THEN images
                                      ELSE json_patch(COALESCE(images, '{}'), ?16) END,
                        sources = CASE WHEN ?17 IS NULL THEN sources
                                       ELSE json_patch(COALESCE(sources, '{}'), ?17) END,
                        official_links = CASE WHEN ?18 IS NULL THEN official_links
                                              ELSE json_patch(COALESCE(official_links, '{}'), ?18) END,
                        era = COALESCE(?19, era),
                        updated_at = ?20,
                        name_localized_key = COALESCE(?22, name_localized_key)
                    WHERE id = ?21
                    "#,
                )
                .bind(&record.name_localized)
                .bind(record.birth_year)
                .bind(record.death_year)
                .bind(&record.birth_date)
                .bind(&record.death_date)
                .bind(&record.nationality)
                .bind(&record.nationality_localized)
                .bind(&record.biography)
                .bind(&record.biography_localized)
                .bind(&record.art_movement)
                .bind(&record.birth_place)
                .bind(&columns.education)
                .bind(&columns.notable_works)
                .bind(&columns.categories)
                .bind(&columns.reference_links)
                .bind(&columns.images)
                .bind(&columns.sources)
                .bind(&columns.official_links)
                .bind(artist.classification.era.as_str())
                .bind(now)
                .bind(&id)
                .bind(&localized_key)
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error("Failed to update artist", e))?;

                let id = Uuid::parse_str(&id).map_err(|e| {
                    ArtlasError::PersistenceFailure(format!("Invalid artist id {id}: {e}"))
                })?;
                tracing::info!(artist = %record.name, %id, "Updated artist");
                SaveOutcome::Updated(id)
            }
            None => {
                let id = Uuid::new_v4();
                let featured = record.notable_works.len() > FEATURED_MIN_WORKS;

                sqlx::query(
                    r#"
                    INSERT INTO artists (
                        id, name, name_key, name_localized, name_localized_key,
                        birth_year, death_year, birth_date, death_date,
                        nationality, nationality_localized, bio, bio_localized, art_movement,
                        birth_place, education, notable_works, categories, reference_links,
                        images, sources, official_links, era, copyright_status, is_featured,
                        created_at, updated_at
                    ) VALUES (
                        ?, ?, ?, ?, ?,
                        ?, ?, ?, ?,
                        ?, ?, ?, ?, ?,
                        ?, ?, ?, ?, ?,
                        ?, ?, ?, ?, ?, ?,
                        ?, ?
                    )
                    "#,
                )
                .bind(id.to_string())
                .bind(&record.name)
                .bind(&key)
                .bind(&record.name_localized)
                .bind(&localized_key)
                .bind(record.birth_year)
                .bind(record.death_year)
                .bind(&record.birth_date)
                .bind(&record.death_date)
                .bind(&record.nationality)
                .bind(&record.nationality_localized)
                .bind(&record.biography)
                .bind(&record.biography_localized)
                .bind(&record.art_movement)
                .bind(&record.birth_place)
                .bind(&columns.education)
                .bind(&columns.notable_works)
                .bind(&columns.categories)
                .bind(&columns.reference_links)
                .bind(&columns.images)
                .bind(&columns.sources)
                .bind(&columns.official_links)
                .bind(artist.classification.era.as_str())
                .bind(artist.classification.copyright_status.as_str())
                .bind(featured)
                .bind(now)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error("Failed to insert artist", e))?;

                tracing::info!(artist = %record.name, %id, featured, "Inserted artist");
                SaveOutcome::Inserted(id)
            }
        };

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;

        Ok(outcome)
    }
}

/// Repository standing in for a store that could not be opened.
///
/// Every call fails with the connection error, so a batch still runs its
/// lookups and reports each found artist as a save failure.
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> ArtlasError {
        ArtlasError::PersistenceFailure(self.reason.clone())
    }
}

#[async_trait]
impl ArtistRepository for UnavailableStore {
    async fn find_by_name(&self, _name: &str) -> Result<Option<StoredArtist>> {
        Err(self.error())
    }

    async fn find_existing(&self, _name: &str) -> Result<Option<StoredArtist>> {
        Err(self.error())
    }

    async fn save(&self, _artist: &EnrichedArtist) -> Result<SaveOutcome> {
        Err(self.error())
    }
}

/// Open the configured store, or an [`UnavailableStore`] carrying the error
pub async fn open_repository(config: &DatabaseConfig) -> Arc<dyn ArtistRepository> {
    match ArtistStore::connect(config).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!(url = %config.url, error = %e, "Artist store unavailable");
            Arc::new(UnavailableStore::new(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Classification, CopyrightStatus, Era};

    fn picasso() -> ArtistRecord {
        let mut record = ArtistRecord::new("Pablo Picasso");
        record.birth_year = Some(1881);
        record.death_year = Some(1973);
        record.nationality = Some("Spanish".to_string());
        record.image_url = Some("https://upload.example/picasso.jpg".to_string());
        record.external_id = Some("Q5593".to_string());
        record.notable_works = vec!["Guernica".to_string()];
        record
    }

    fn enriched(record: ArtistRecord) -> EnrichedArtist {
        EnrichedArtist::classify_at(record, 2026)
    }

    #[tokio::test]
    async fn test_insert_then_find_case_insensitive() {
        let store = ArtistStore::in_memory().await.unwrap();

        let outcome = store.save(&enriched(picasso())).await.unwrap();
        assert!(matches!(outcome, SaveOutcome::Inserted(_)));

        let stored = store.find_by_name("pablo PICASSO").await.unwrap().unwrap();
        assert_eq!(stored.id, outcome.id());
        assert_eq!(stored.record.nationality.as_deref(), Some("Spanish"));
        assert_eq!(stored.record.notable_works, vec!["Guernica".to_string()]);
        assert_eq!(stored.record.external_id.as_deref(), Some("Q5593"));
        assert_eq!(stored.era.as_deref(), Some("Postmodern"));
        assert_eq!(stored.copyright_status.as_deref(), Some("transitional"));
        assert!(!stored.is_featured);
    }

    #[tokio::test]
    async fn test_update_never_nulls_populated_fields() {
        let store = ArtistStore::in_memory().await.unwrap();
        let first = store.save(&enriched(picasso())).await.unwrap();

        let mut incoming = ArtistRecord::new("PABLO PICASSO");
        incoming.birth_place = Some("Málaga".to_string());

        let second = store.save(&enriched(incoming)).await.unwrap();
        assert_eq!(second, SaveOutcome::Updated(first.id()));

        let stored = store.find_by_name("Pablo Picasso").await.unwrap().unwrap();
        assert_eq!(stored.record.nationality.as_deref(), Some("Spanish"));
        assert_eq!(stored.record.birth_year, Some(1881));
        assert_eq!(stored.record.birth_place.as_deref(), Some("Málaga"));
        assert_eq!(stored.record.notable_works, vec!["Guernica".to_string()]);
        assert_eq!(
            stored.record.image_url.as_deref(),
            Some("https://upload.example/picasso.jpg")
        );
        assert_eq!(stored.record.external_id.as_deref(), Some("Q5593"));
        // identity keeps the spelling of the first insert
        assert_eq!(stored.record.name, "Pablo Picasso");
    }

    #[tokio::test]
    async fn test_featured_and_copyright_fixed_at_insert() {
        let store = ArtistStore::in_memory().await.unwrap();

        let mut record = ArtistRecord::new("Vincent van Gogh");
        record.birth_year = Some(1853);
        record.death_year = Some(1890);
        record.notable_works = (1..=6).map(|i| format!("Work {i}")).collect();
        store.save(&enriched(record)).await.unwrap();

        let stored = store.find_by_name("vincent van gogh").await.unwrap().unwrap();
        assert!(stored.is_featured);
        assert_eq!(stored.copyright_status.as_deref(), Some("public_domain"));

        // a later update with fewer works and a different status keeps both
        let update = EnrichedArtist {
            record: ArtistRecord::new("Vincent van Gogh"),
            classification: Classification {
                era: Era::Impressionism,
                copyright_status: CopyrightStatus::Licensed,
            },
        };
        store.save(&update).await.unwrap();

        let stored = store.find_by_name("Vincent van Gogh").await.unwrap().unwrap();
        assert!(stored.is_featured);
        assert_eq!(stored.copyright_status.as_deref(), Some("public_domain"));
        assert_eq!(stored.record.notable_works.len(), 6);
    }

    #[tokio::test]
    async fn test_five_works_not_featured() {
        let store = ArtistStore::in_memory().await.unwrap();

        let mut record = ArtistRecord::new("Frida Kahlo");
        record.notable_works = (1..=5).map(|i| format!("Work {i}")).collect();
        store.save(&enriched(record)).await.unwrap();

        let stored = store.find_by_name("Frida Kahlo").await.unwrap().unwrap();
        assert!(!stored.is_featured);
    }

    #[tokio::test]
    async fn test_find_existing_by_localized_name() {
        let store = ArtistStore::in_memory().await.unwrap();

        let mut record = picasso();
        record.name_localized = Some("파블로 피카소".to_string());
        store.save(&enriched(record)).await.unwrap();

        let found = store.find_existing("파블로 피카소").await.unwrap();
        assert!(found.is_some());
        assert!(store.find_by_name("파블로 피카소").await.unwrap().is_none());
        assert!(store.find_existing("Claude Monet").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_name_key_folds_non_ascii() {
        let store = ArtistStore::in_memory().await.unwrap();

        let mut record = ArtistRecord::new("Édouard Manet");
        record.name_localized = Some("ÉDOUARD MANET".to_string());
        let first = store.save(&enriched(record)).await.unwrap();

        let second = store
            .save(&enriched(ArtistRecord::new("ÉDOUARD MANET")))
            .await
            .unwrap();
        assert_eq!(second, SaveOutcome::Updated(first.id()));

        let stored = store.find_by_name("édouard manet").await.unwrap().unwrap();
        assert_eq!(stored.record.name, "Édouard Manet");
        assert!(store.find_existing("édouard MANET").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unreachable_database_fails_every_call() {
        let repository = open_repository(&DatabaseConfig {
            url: "sqlite:///nonexistent/artlas/dir/artists.db".to_string(),
            pool_size: 1,
            create_schema: true,
        })
        .await;

        let err = repository.save(&enriched(picasso())).await.unwrap_err();
        assert!(matches!(err, ArtlasError::PersistenceFailure(_)));
        assert!(repository.find_existing("Pablo Picasso").await.is_err());
    }

    #[tokio::test]
    async fn test_save_fails_without_schema() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = ArtistStore::from_pool(pool);

        let err = store.save(&enriched(picasso())).await.unwrap_err();
        assert!(matches!(err, ArtlasError::PersistenceFailure(_)));
    }
}
