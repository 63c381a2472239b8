//! Era and copyright classification
//!
//! Both classifiers work on calendar years only; month and day precision
//! is intentionally ignored.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::ArtistRecord;

/// Art-historical era, bucketed by the artist's active year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Era {
    Medieval,
    Renaissance,
    Baroque,
    Neoclassicism,
    Impressionism,
    Modern,
    Postmodern,
    Contemporary,
}

impl Era {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medieval => "Medieval",
            Self::Renaissance => "Renaissance",
            Self::Baroque => "Baroque",
            Self::Neoclassicism => "Neoclassicism",
            Self::Impressionism => "Impressionism",
            Self::Modern => "Modern",
            Self::Postmodern => "Postmodern",
            Self::Contemporary => "Contemporary",
        }
    }
}

impl std::fmt::Display for Era {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Copyright status of an artist's works
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyrightStatus {
    PublicDomain,
    Transitional,
    Licensed,
    Contemporary,
    Unknown,
}

impl CopyrightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PublicDomain => "public_domain",
            Self::Transitional => "transitional",
            Self::Licensed => "licensed",
            Self::Contemporary => "contemporary",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for CopyrightStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Upper bounds (exclusive) of each era, checked in order
const ERA_THRESHOLDS: [(i32, Era); 7] = [
    (1400, Era::Medieval),
    (1600, Era::Renaissance),
    (1750, Era::Baroque),
    (1850, Era::Neoclassicism),
    (1900, Era::Impressionism),
    (1945, Era::Modern),
    (1980, Era::Postmodern),
];

/// Current calendar year (UTC)
pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// Classify the era of an artist against the current year
pub fn classify_era(birth_year: Option<i32>, death_year: Option<i32>) -> Era {
    classify_era_at(birth_year, death_year, current_year())
}

/// Classify the era of an artist.
///
/// Without a birth year the artist is assumed to be contemporary. The
/// active year is the death year, or `current_year` for living artists.
pub fn classify_era_at(birth_year: Option<i32>, death_year: Option<i32>, current_year: i32) -> Era {
    if birth_year.is_none() {
        return Era::Contemporary;
    }

    let active_year = death_year.unwrap_or(current_year);

    ERA_THRESHOLDS
        .iter()
        .find(|(upper, _)| active_year < *upper)
        .map(|(_, era)| *era)
        .unwrap_or(Era::Contemporary)
}

/// Determine copyright status against the current year
pub fn determine_copyright_status(
    birth_year: Option<i32>,
    death_year: Option<i32>,
) -> CopyrightStatus {
    determine_copyright_status_at(birth_year, death_year, current_year())
}

/// Determine copyright status from life years.
///
/// - died 70+ years ago: public domain; 50+ years: transitional; else licensed
/// - no death year but born more than 150 years ago: public domain
/// - otherwise living/contemporary, or unknown without any year
pub fn determine_copyright_status_at(
    birth_year: Option<i32>,
    death_year: Option<i32>,
    current_year: i32,
) -> CopyrightStatus {
    if let Some(death) = death_year {
        let years_since_death = current_year - death;
        return if years_since_death >= 70 {
            CopyrightStatus::PublicDomain
        } else if years_since_death >= 50 {
            CopyrightStatus::Transitional
        } else {
            CopyrightStatus::Licensed
        };
    }

    match birth_year {
        Some(birth) if current_year - birth > 150 => CopyrightStatus::PublicDomain,
        Some(_) => CopyrightStatus::Contemporary,
        None => CopyrightStatus::Unknown,
    }
}

/// Derived fields of a reconciled record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub era: Era,
    pub copyright_status: CopyrightStatus,
}

impl Classification {
    pub fn of(record: &ArtistRecord) -> Self {
        Self::of_at(record, current_year())
    }

    pub fn of_at(record: &ArtistRecord, current_year: i32) -> Self {
        Self {
            era: classify_era_at(record.birth_year, record.death_year, current_year),
            copyright_status: determine_copyright_status_at(
                record.birth_year,
                record.death_year,
                current_year,
            ),
        }
    }
}
