use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Newtype wrapper for category IDs (e.g. `"underwater"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub String);

impl CategoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A five-slot color palette. Values are CSS color strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub text: String,
}

/// A flat mapping of UI-label keys (`score`, `start`, ...) to display strings.
pub type LabelSet = BTreeMap<String, String>;

/// A static, read-only record describing one game category.
///
/// Every `Vec` holds interchangeable variants; the selector picks one entry
/// from each per render. The first palette is the category's default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDefinition {
    pub id: CategoryId,
    pub keywords: Vec<String>,
    pub titles: Vec<String>,
    pub label_sets: Vec<LabelSet>,
    /// Each variant is a short list of how-to-play lines.
    pub mechanics: Vec<Vec<String>>,
    pub palettes: Vec<Palette>,
    pub intros: Vec<String>,
    /// Name of the skeleton this category renders with.
    pub skeleton: String,
}

impl CategoryDefinition {
    /// The category's default palette, if any variants are declared.
    pub fn default_palette(&self) -> Option<&Palette> {
        self.palettes.first()
    }

    /// Number of this category's keywords contained in an already
    /// lower-cased prompt.
    ///
    /// Containment is substring-based, so `"car"` also hits `"carpet"`.
    pub fn match_count(&self, prompt_lower: &str) -> usize {
        self.keywords
            .iter()
            .filter(|kw| prompt_lower.contains(kw.as_str()))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_category(keywords: &[&str]) -> CategoryDefinition {
        CategoryDefinition {
            id: CategoryId::new("racing"),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            titles: vec!["Turbo Dash".to_string()],
            label_sets: vec![LabelSet::from([(
                "score".to_string(),
                "Laps".to_string(),
            )])],
            mechanics: vec![vec!["Steer with the arrow keys".to_string()]],
            palettes: vec![Palette {
                primary: "#ff3b30".to_string(),
                secondary: "#222".to_string(),
                accent: "#ffd60a".to_string(),
                background: "#111".to_string(),
                text: "#fff".to_string(),
            }],
            intros: vec!["Start your engines.".to_string()],
            skeleton: "arcade".to_string(),
        }
    }

    #[test]
    fn category_id_display() {
        let id = CategoryId::from("space");
        assert_eq!(id.to_string(), "space");
        assert_eq!(id.as_str(), "space");
    }

    #[test]
    fn match_count_counts_each_keyword_once() {
        let cat = make_category(&["car", "race", "racing"]);
        assert_eq!(cat.match_count("a racing game with a race car"), 3);
        assert_eq!(cat.match_count("race race racing racing"), 2);
    }

    #[test]
    fn match_count_hits_word_fragments() {
        let cat = make_category(&["car"]);
        assert_eq!(cat.match_count("a flying carpet"), 1);
    }

    #[test]
    fn match_count_zero_for_empty_prompt() {
        let cat = make_category(&["car", "race"]);
        assert_eq!(cat.match_count(""), 0);
    }

    #[test]
    fn default_palette_is_first() {
        let cat = make_category(&["car"]);
        assert_eq!(cat.default_palette().unwrap().primary, "#ff3b30");
    }
}
