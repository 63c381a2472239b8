//! Extraction vocabulary
//!
//! Keyword lists, allow-lists, scan windows and caps used by the text
//! extractor. Loaded from the `[vocabulary]` config section; every field
//! falls back to the built-in table.

use serde::{Deserialize, Serialize};

/// A nationality adjective and its localized form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nationality {
    pub name: String,
    pub localized: Option<String>,
}

/// Extraction tables and limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Role keywords marking a page as art-related
    pub art_roles: Vec<String>,

    /// Substrings marking a category as art-related
    pub art_category_markers: Vec<String>,

    /// Accepted nationality adjectives (case-sensitive)
    pub nationalities: Vec<Nationality>,

    /// Lower-case movement names, in tie-break order
    pub movements: Vec<String>,

    /// Characters scanned for role keywords
    pub relevance_window: usize,

    /// Characters scanned for born/died dates and birth place
    pub date_window: usize,

    /// Characters scanned for nationality
    pub nationality_window: usize,

    /// Characters of body text kept as biography
    pub biography_chars: usize,

    /// Characters of localized text kept as localized biography
    pub localized_biography_chars: usize,

    pub max_notable_works: usize,
    pub max_categories: usize,
    pub max_references: usize,
}

impl Vocabulary {
    /// Localized form of an accepted nationality
    pub fn localize_nationality(&self, nationality: &str) -> Option<&str> {
        self.nationalities
            .iter()
            .find(|n| n.name == nationality)
            .and_then(|n| n.localized.as_deref())
    }

    /// Whether a nationality is on the allow-list
    pub fn is_known_nationality(&self, candidate: &str) -> bool {
        self.nationalities.iter().any(|n| n.name == candidate)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        let nationalities = [
            ("American", "미국"),
            ("French", "프랑스"),
            ("Spanish", "스페인"),
            ("Italian", "이탈리아"),
            ("German", "독일"),
            ("British", "영국"),
            ("Dutch", "네덜란드"),
            ("Russian", "러시아"),
            ("Japanese", "일본"),
            ("Korean", "한국"),
            ("Chinese", "중국"),
            ("Mexican", "멕시코"),
            ("Brazilian", "브라질"),
            ("Indian", "인도"),
        ]
        .iter()
        .map(|(name, localized)| Nationality {
            name: name.to_string(),
            localized: Some(localized.to_string()),
        })
        .collect();

        Self {
            art_roles: strings(&[
                "painter",
                "artist",
                "sculptor",
                "photographer",
                "printmaker",
                "conceptual artist",
                "installation artist",
                "performance artist",
                "ceramic artist",
                "textile artist",
                "video artist",
                "digital artist",
            ]),
            art_category_markers: strings(&["artist", "painter", "sculptor", "art"]),
            nationalities,
            movements: strings(&[
                "impressionism",
                "expressionism",
                "cubism",
                "surrealism",
                "abstract expressionism",
                "pop art",
                "minimalism",
                "conceptual art",
                "dadaism",
                "fauvism",
                "futurism",
                "constructivism",
            ]),
            relevance_window: 1000,
            date_window: 1000,
            nationality_window: 500,
            biography_chars: 2000,
            localized_biography_chars: 1000,
            max_notable_works: 10,
            max_categories: 20,
            max_references: 10,
        }
    }
}
