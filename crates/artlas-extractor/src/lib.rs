//! artlas Extractor - Artist facts from encyclopedia text
//!
//! Turns a raw [`SourceDocument`] into a partial [`ArtistRecord`] using the
//! regex matchers in [`patterns`]. Which words count, how far into the text
//! to look and how many items to keep all come from the [`Vocabulary`].

use artlas_core::{truncate_chars, ArtistRecord, SourceDocument, Vocabulary};

pub mod patterns;

/// Rule-based extractor over primary-language pages
#[derive(Debug, Clone, Default)]
pub struct ArtistTextExtractor {
    vocabulary: Vocabulary,
}

impl ArtistTextExtractor {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Whether the page passes the visual-artist relevance check
    pub fn is_art_subject(&self, document: &SourceDocument) -> bool {
        patterns::is_art_subject(&document.text, &document.categories, &self.vocabulary)
    }

    /// Build a record from a primary page.
    ///
    /// The record name is the page title. Fields the text does not support
    /// are left empty.
    pub fn extract(&self, document: &SourceDocument) -> ArtistRecord {
        let vocab = &self.vocabulary;
        let text = document.text.as_str();

        let (birth_year, death_year) = patterns::extract_life_years(text);
        let (birth_date, death_date) = patterns::extract_life_dates(text, vocab.date_window);
        let nationality = patterns::extract_nationality(text, vocab);
        let nationality_localized = nationality
            .as_deref()
            .and_then(|n| vocab.localize_nationality(n))
            .map(str::to_string);

        let biography = Some(truncate_chars(text, vocab.biography_chars).trim().to_string())
            .filter(|b| !b.is_empty());

        let record = ArtistRecord {
            name: document.title.clone(),
            birth_year,
            death_year,
            birth_date,
            death_date,
            nationality,
            nationality_localized,
            biography,
            art_movement: patterns::extract_art_movement(text, &vocab.movements),
            birth_place: patterns::extract_birth_place(text, vocab.date_window),
            notable_works: patterns::extract_notable_works(text, vocab.max_notable_works),
            categories: patterns::filter_categories(
                &document.categories,
                &vocab.art_category_markers,
                vocab.max_categories,
            ),
            references: patterns::take_references(&document.links, vocab.max_references),
            source_url: document.url.clone(),
            ..Default::default()
        };

        tracing::debug!(
            artist = %record.name,
            birth_year = ?record.birth_year,
            death_year = ?record.death_year,
            nationality = ?record.nationality,
            works = record.notable_works.len(),
            "Extracted artist facts"
        );

        record
    }

    /// Localized biography from a secondary-language page
    pub fn localized_biography(&self, text: &str) -> Option<String> {
        let bio = truncate_chars(text, self.vocabulary.localized_biography_chars).trim();
        (!bio.is_empty()).then(|| bio.to_string())
    }
}
