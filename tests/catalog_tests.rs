/// Catalog data integration tests: the shipped `game_data/` directory.

use prompt_arcade::core::catalog::{Catalog, CatalogSource};
use prompt_arcade::core::classifier::classify;
use prompt_arcade::schema::category::CategoryId;
use prompt_arcade::schema::modifier::ModifierKind;

#[test]
fn game_data_dir_matches_builtin() {
    let from_dir = Catalog::load_from_dir(std::path::Path::new("game_data")).unwrap();
    let builtin = Catalog::builtin().unwrap();

    let dir_ids: Vec<_> = from_dir.categories().iter().map(|c| c.id.clone()).collect();
    let builtin_ids: Vec<_> = builtin.categories().iter().map(|c| c.id.clone()).collect();
    assert_eq!(dir_ids, builtin_ids);
    assert_eq!(from_dir.skeleton_names(), builtin.skeleton_names());
}

#[test]
fn expected_categories_present() {
    let catalog = Catalog::builtin().unwrap();
    let expected = [
        "darts",
        "basketball",
        "underwater",
        "medieval",
        "space",
        "racing",
        "puzzle",
        "arcade",
    ];
    for id in &expected {
        assert!(
            catalog.contains(&CategoryId::from(*id)),
            "Missing category: {}",
            id
        );
    }
}

#[test]
fn all_categories_have_minimum_variants() {
    let catalog = Catalog::builtin().unwrap();
    for cat in catalog.categories() {
        assert!(
            cat.titles.len() >= 2,
            "Category '{}' has only {} titles (minimum 2 expected)",
            cat.id,
            cat.titles.len()
        );
        assert!(cat.label_sets.len() >= 2, "{} label sets", cat.id);
        assert!(cat.palettes.len() >= 2, "{} palettes", cat.id);
        assert!(cat.mechanics.len() >= 2, "{} mechanics", cat.id);
    }
}

#[test]
fn label_sets_agree_within_category() {
    let catalog = Catalog::builtin().unwrap();
    for cat in catalog.categories() {
        let keys: Vec<_> = cat.label_sets[0].keys().collect();
        for labels in &cat.label_sets[1..] {
            assert_eq!(
                labels.keys().collect::<Vec<_>>(),
                keys,
                "label keys differ within '{}'",
                cat.id
            );
        }
    }
}

#[test]
fn titles_are_distinct_and_plain() {
    let catalog = Catalog::builtin().unwrap();
    for cat in catalog.categories() {
        for (i, a) in cat.titles.iter().enumerate() {
            assert!(
                !a.contains(['&', '<', '>', '"', '\'']),
                "title '{}' needs escaping",
                a
            );
            for b in &cat.titles[i + 1..] {
                assert!(!a.contains(b.as_str()) && !b.contains(a.as_str()));
            }
        }
    }
}

#[test]
fn every_category_keyword_classifies_home() {
    // A category's own keywords, alone, always classify to that category.
    let catalog = Catalog::builtin().unwrap();
    for cat in catalog.categories() {
        for kw in &cat.keywords {
            let result = classify(&catalog, kw);
            assert_eq!(
                result.category, cat.id,
                "keyword '{}' of '{}' classified as '{}'",
                kw,
                cat.id,
                result.category
            );
        }
    }
}

#[test]
fn difficulty_table_covers_all_levels() {
    let catalog = Catalog::builtin().unwrap();
    let table = catalog
        .modifier_tables()
        .iter()
        .find(|t| t.kind == ModifierKind::Difficulty)
        .expect("difficulty table");
    assert!(table.exclusive);
    let tags: Vec<_> = table.entries.iter().map(|e| e.tag.as_str()).collect();
    for level in ["easy", "medium", "hard", "expert"] {
        assert!(tags.contains(&level), "missing difficulty {}", level);
    }
}

#[test]
fn transforms_reference_known_tags() {
    let catalog = Catalog::builtin().unwrap();
    let known: Vec<_> = catalog
        .modifier_tables()
        .iter()
        .flat_map(|t| t.entries.iter().map(|e| e.tag.as_str()))
        .collect();
    for transform in catalog.title_transforms() {
        assert!(
            known.contains(&transform.tag.as_str()),
            "transform for unknown tag '{}'",
            transform.tag
        );
    }
}

#[test]
fn builtin_source_round_trips_through_merge() {
    let mut source = CatalogSource::builtin().unwrap();
    source.merge(CatalogSource::builtin().unwrap());
    let merged = source.build().unwrap();
    assert_eq!(
        merged.categories().len(),
        Catalog::builtin().unwrap().categories().len()
    );
}

#[test]
fn free_throw_is_basketball_not_darts() {
    let catalog = Catalog::builtin().unwrap();
    assert_eq!(classify(&catalog, "free throw practice").category.as_str(), "basketball");
    assert_eq!(classify(&catalog, "throw darts at the pub").category.as_str(), "darts");
}
