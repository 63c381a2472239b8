//! Cross-source record reconciliation
//!
//! Merge order is fixed: extractor output is the base, the secondary
//! language fills localized fields, the knowledge graph is merged last.

use artlas_core::merge::{append_values, coalesce, coalesce_text, overwrite_text};
use artlas_core::{year_from_date, ArtistRecord, GraphFacts, LocalizedInfo, ReconcilerConfig};

/// Merges secondary and knowledge-graph results into an extracted record
#[derive(Debug, Clone)]
pub struct Reconciler {
    dedupe_education: bool,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(&ReconcilerConfig::default())
    }
}

impl Reconciler {
    pub fn new(config: &ReconcilerConfig) -> Self {
        Self {
            dedupe_education: config.dedupe_education,
        }
    }

    /// Fill localized name and biography; never overwrites
    pub fn merge_localized(&self, record: &mut ArtistRecord, localized: LocalizedInfo) {
        coalesce_text(&mut record.name_localized, localized.name_localized);
        coalesce_text(&mut record.biography_localized, localized.biography_localized);
    }

    /// Merge knowledge-graph facts.
    ///
    /// Dates overwrite the free-text ones; years are only filled when
    /// missing and education is appended. The graph's citizenship label is
    /// a country, not an adjective, so nationality is left to the extractor.
    pub fn merge_graph(&self, record: &mut ArtistRecord, facts: GraphFacts) {
        coalesce(
            &mut record.birth_year,
            facts.birth_date.as_deref().and_then(year_from_date),
        );
        coalesce(
            &mut record.death_year,
            facts.death_date.as_deref().and_then(year_from_date),
        );
        overwrite_text(&mut record.birth_date, facts.birth_date);
        overwrite_text(&mut record.death_date, facts.death_date);
        append_values(&mut record.education, facts.education, self.dedupe_education);
    }

    /// Run the full merge in order
    pub fn reconcile(
        &self,
        mut record: ArtistRecord,
        localized: Option<LocalizedInfo>,
        facts: Option<GraphFacts>,
    ) -> ArtistRecord {
        if let Some(localized) = localized {
            self.merge_localized(&mut record, localized);
        }
        if let Some(facts) = facts {
            self.merge_graph(&mut record, facts);
        }
        fill_years_from_dates(&mut record);
        record
    }
}

/// Derive missing years from whatever date text survived the merge
fn fill_years_from_dates(record: &mut ArtistRecord) {
    coalesce(
        &mut record.birth_year,
        record.birth_date.as_deref().and_then(year_from_date),
    );
    coalesce(
        &mut record.death_year,
        record.death_date.as_deref().and_then(year_from_date),
    );
}
