//! Regex matchers over encyclopedia body text
//!
//! Every function here is pure and independent of the others; a miss is
//! `None` or an empty list, never an error.

use once_cell::sync::Lazy;
use regex::Regex;

use artlas_core::truncate_chars;
use artlas_core::vocabulary::Vocabulary;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
}

// ============================================================================
// Life dates
// ============================================================================

/// Year-pair patterns, tried in order
static YEAR_PAIRS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        compile(r"\((\d{4})[–-](\d{4})\)"),
        compile(r"(?i)born\s+(\d{4}).*?died\s+(\d{4})"),
        compile(r"(\d{4})[–-](\d{4})"),
    ]
});

static BORN_TEXT: Lazy<Regex> = Lazy::new(|| compile(r"(?i)born\s+(?:on\s+)?([^,\n]+)"));
static DIED_TEXT: Lazy<Regex> = Lazy::new(|| compile(r"(?i)died\s+([^,\n]+)"));

/// Birth and death years from the first matching year-pair pattern
pub fn extract_life_years(text: &str) -> (Option<i32>, Option<i32>) {
    for pattern in YEAR_PAIRS.iter() {
        if let Some(caps) = pattern.captures(text) {
            let birth = caps.get(1).and_then(|m| m.as_str().parse::<i32>().ok());
            let death = caps.get(2).and_then(|m| m.as_str().parse::<i32>().ok());
            if let (Some(birth), Some(death)) = (birth, death) {
                return (Some(birth), Some(death));
            }
        }
    }
    (None, None)
}

/// Free-text birth and death dates within the first `window` characters
pub fn extract_life_dates(text: &str, window: usize) -> (Option<String>, Option<String>) {
    let head = truncate_chars(text, window);
    (first_capture(&BORN_TEXT, head), first_capture(&DIED_TEXT, head))
}

fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

// ============================================================================
// Nationality & birth place
// ============================================================================

static NATIONALITY_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        compile(r"(?i)(\w+)\s+(?:painter|artist|sculptor|photographer)"),
        compile(r"(?i)was\s+a\s+(\w+)"),
        compile(r"(?i)born\s+in\s+([^,\n]+)"),
    ]
});

static BIRTH_PLACE: Lazy<Regex> = Lazy::new(|| compile(r"(?i)born\s+(?:in\s+)?([^,\n\(]+)"));

/// First nationality candidate on the allow-list.
///
/// Patterns match case-insensitively but the allow-list check does not.
/// Only the first match of each pattern is considered.
pub fn extract_nationality(text: &str, vocabulary: &Vocabulary) -> Option<String> {
    let head = truncate_chars(text, vocabulary.nationality_window);

    NATIONALITY_PATTERNS
        .iter()
        .filter_map(|pattern| first_capture(pattern, head))
        .find(|candidate| vocabulary.is_known_nationality(candidate))
}

pub fn extract_birth_place(text: &str, window: usize) -> Option<String> {
    first_capture(&BIRTH_PLACE, truncate_chars(text, window))
}

// ============================================================================
// Movement
// ============================================================================

/// First vocabulary movement mentioned anywhere in the text, title-cased
pub fn extract_art_movement(text: &str, movements: &[String]) -> Option<String> {
    let lowered = text.to_lowercase();
    movements
        .iter()
        .find(|m| lowered.contains(&m.to_lowercase()))
        .map(|m| title_case(m))
}

fn title_case(term: &str) -> String {
    term.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Notable works
// ============================================================================

/// Header, then the section body up to a blank line, a line starting with
/// a letter or the end of the text. The whole pattern is case-insensitive,
/// so `[A-Z]` matches lower-case line starts too.
static NOTABLE_SECTION: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?si)(?:notable works?|major works?|famous works?)[:\n](.*?)(?:\n\n|\n[A-Z]|\z)")
});

static WORK_TITLES: Lazy<[Regex; 4]> = Lazy::new(|| {
    [
        compile(r#""([^"]+)""#),
        compile(r"'([^']+)'"),
        compile(r"\*([^*]+)\*"),
        compile(r"_([^_]+)_"),
    ]
});

/// Work titles from the first notable-works section, at most `limit`
pub fn extract_notable_works(text: &str, limit: usize) -> Vec<String> {
    let Some(section) = NOTABLE_SECTION
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
    else {
        return Vec::new();
    };

    WORK_TITLES
        .iter()
        .flat_map(|pattern| pattern.captures_iter(section))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .filter(|title| !title.is_empty())
        .take(limit)
        .collect()
}

// ============================================================================
// Relevance, categories & references
// ============================================================================

fn has_marker(category: &str, markers: &[String]) -> bool {
    let lowered = category.to_lowercase();
    markers.iter().any(|m| lowered.contains(&m.to_lowercase()))
}

/// Whether a page describes a visual artist.
///
/// True if an art role appears in the opening text or any category carries
/// an art marker.
pub fn is_art_subject(text: &str, categories: &[String], vocabulary: &Vocabulary) -> bool {
    let head = truncate_chars(text, vocabulary.relevance_window).to_lowercase();
    let role_in_text = vocabulary
        .art_roles
        .iter()
        .any(|role| head.contains(&role.to_lowercase()));

    role_in_text
        || categories
            .iter()
            .any(|c| has_marker(c, &vocabulary.art_category_markers))
}

/// Art-related categories in page order, at most `limit`
pub fn filter_categories(categories: &[String], markers: &[String], limit: usize) -> Vec<String> {
    categories
        .iter()
        .filter(|c| has_marker(c, markers))
        .take(limit)
        .cloned()
        .collect()
}

/// First `limit` outbound links verbatim
pub fn take_references(links: &[String], limit: usize) -> Vec<String> {
    links.iter().take(limit).cloned().collect()
}
