/// Prompt classifier: keyword scoring of a free-text prompt against the
/// catalog's categories and modifier tables.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::core::catalog::Catalog;
use crate::schema::category::CategoryId;
use crate::schema::modifier::{ModifierKind, ModifierTag};

/// Confidence reported when no category keyword matched.
pub const FALLBACK_CONFIDENCE: f32 = 0.3;
/// Upper bound on confidence for keyword matches.
pub const MAX_CONFIDENCE: f32 = 0.9;

const BASE_CONFIDENCE: f32 = 0.4;
const CONFIDENCE_PER_HIT: f32 = 0.15;

/// The outcome of classifying one prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: CategoryId,
    pub confidence: f32,
    /// Number of the winning category's keywords found in the prompt.
    pub match_count: usize,
    pub modifiers: Vec<ModifierTag>,
}

impl ClassificationResult {
    /// True when no keyword matched and the fallback category was used.
    pub fn is_fallback(&self) -> bool {
        self.match_count == 0
    }

    /// The first detected tag of the given kind.
    pub fn modifier(&self, kind: ModifierKind) -> Option<&str> {
        self.modifiers
            .iter()
            .find(|m| m.kind == kind)
            .map(|m| m.tag.as_str())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.modifiers.iter().any(|m| m.tag == tag)
    }
}

/// Map a keyword hit count to a confidence score.
///
/// Monotonic non-decreasing in `hits`, capped at `MAX_CONFIDENCE`.
pub fn confidence_for(hits: usize) -> f32 {
    if hits == 0 {
        return FALLBACK_CONFIDENCE;
    }
    (BASE_CONFIDENCE + CONFIDENCE_PER_HIT * hits as f32).min(MAX_CONFIDENCE)
}

/// Classify a prompt. Never fails: empty or unmatched prompts classify to
/// the catalog's fallback category.
///
/// Ties on match count go to the category declared first.
pub fn classify(catalog: &Catalog, prompt: &str) -> ClassificationResult {
    let lower = prompt.to_lowercase();

    let mut best: Option<(&CategoryId, usize)> = None;
    for cat in catalog.categories() {
        let hits = cat.match_count(&lower);
        if hits == 0 {
            continue;
        }
        match best {
            Some((_, best_hits)) if best_hits >= hits => {}
            _ => best = Some((&cat.id, hits)),
        }
    }

    let (category, match_count) = match best {
        Some((id, hits)) => (id.clone(), hits),
        None => (catalog.fallback().clone(), 0),
    };

    let modifiers = detect_modifiers(catalog, &lower);

    tracing::debug!(
        category = %category,
        match_count,
        modifiers = modifiers.len(),
        "classified prompt"
    );

    ClassificationResult {
        category,
        confidence: confidence_for(match_count),
        match_count,
        modifiers,
    }
}

fn detect_modifiers(catalog: &Catalog, prompt_lower: &str) -> Vec<ModifierTag> {
    let mut seen = FxHashSet::default();
    let mut modifiers = Vec::new();
    for table in catalog.modifier_tables() {
        for tag in table.detect(prompt_lower) {
            if seen.insert(tag.clone()) {
                modifiers.push(tag);
            }
        }
    }
    modifiers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::builtin().unwrap()
    }

    #[test]
    fn confidence_curve() {
        assert_eq!(confidence_for(0), FALLBACK_CONFIDENCE);
        assert!((confidence_for(1) - 0.55).abs() < 1e-6);
        assert!((confidence_for(2) - 0.70).abs() < 1e-6);
        assert_eq!(confidence_for(4), MAX_CONFIDENCE);
        assert_eq!(confidence_for(40), MAX_CONFIDENCE);
    }

    #[test]
    fn confidence_is_monotonic() {
        let mut last = 0.0;
        for hits in 1..20 {
            let c = confidence_for(hits);
            assert!(c >= last);
            assert!(c > FALLBACK_CONFIDENCE);
            assert!((0.0..=1.0).contains(&c));
            last = c;
        }
    }

    #[test]
    fn empty_and_blank_prompts_fall_back() {
        let catalog = catalog();
        for prompt in ["", "   ", "\t\n"] {
            let result = classify(&catalog, prompt);
            assert_eq!(&result.category, catalog.fallback());
            assert_eq!(result.confidence, FALLBACK_CONFIDENCE);
            assert!(result.is_fallback());
        }
    }

    #[test]
    fn single_keyword_prompts_classify_to_their_category() {
        let catalog = catalog();
        for (prompt, expected) in [
            ("bullseye", "darts"),
            ("slam dunk", "basketball"),
            ("coral reef", "underwater"),
            ("a knight and a castle", "medieval"),
            ("asteroid field", "space"),
            ("grand prix", "racing"),
            ("sudoku", "puzzle"),
        ] {
            let result = classify(&catalog, prompt);
            assert_eq!(result.category.as_str(), expected, "prompt: {}", prompt);
            assert!(result.confidence > FALLBACK_CONFIDENCE);
        }
    }

    #[test]
    fn case_insensitive() {
        let catalog = catalog();
        for prompt in [
            "Create a magical underwater adventure with mermaids",
            "An EXPERT ninja racing game",
            "basketball",
        ] {
            assert_eq!(
                classify(&catalog, prompt),
                classify(&catalog, &prompt.to_uppercase())
            );
        }
    }

    #[test]
    fn highest_count_wins() {
        let catalog = catalog();
        // One space keyword, two racing keywords.
        let result = classify(&catalog, "race a kart around the planet");
        assert_eq!(result.category.as_str(), "racing");
        assert_eq!(result.match_count, 2);
    }

    #[test]
    fn ties_go_to_first_declared() {
        let catalog = catalog();
        // "dart" (darts) and "hoop" (basketball): one hit each.
        let result = classify(&catalog, "dart hoop");
        assert_eq!(result.category.as_str(), "darts");
    }

    #[test]
    fn substring_matching_hits_fragments() {
        let catalog = catalog();
        let result = classify(&catalog, "a flying carpet");
        assert_eq!(result.category.as_str(), "racing");
    }

    #[test]
    fn modifiers_detected_independently() {
        let catalog = catalog();
        let result = classify(&catalog, "an easy ninja game in the forest");
        assert!(result.has_tag("ninja"));
        assert_eq!(result.modifier(ModifierKind::Environment), Some("forest"));
        assert_eq!(result.modifier(ModifierKind::Difficulty), Some("easy"));
        assert_eq!(&result.category, catalog.fallback());
    }

    #[test]
    fn difficulty_is_exclusive() {
        let catalog = catalog();
        let result = classify(&catalog, "an easy start but an expert finish");
        let levels: Vec<_> = result
            .modifiers
            .iter()
            .filter(|m| m.kind == ModifierKind::Difficulty)
            .collect();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].tag, "expert");
    }

    #[test]
    fn modifiers_not_duplicated() {
        let catalog = catalog();
        let result = classify(&catalog, "magic magical enchanted");
        let magical = result.modifiers.iter().filter(|m| m.tag == "magical").count();
        assert_eq!(magical, 1);
    }

    #[test]
    fn folding_is_plain_lowercase() {
        // Dotless i does not lowercase to 'i', so only the uppercase form matches.
        let catalog = catalog();
        assert_eq!(classify(&catalog, "RACING").category.as_str(), "racing");
        assert!(classify(&catalog, "racıng").is_fallback());
    }
}
