/// Category catalog: the immutable table every pipeline stage reads.
///
/// Raw data is gathered in a `CatalogSource` (built-in RON, a data directory,
/// or both merged) and validated once into a `Catalog`.

use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::core::renderer;
use crate::core::template::{Template, TemplateError};
use crate::schema::category::{CategoryDefinition, CategoryId};
use crate::schema::modifier::{ModifierTable, TitleTransform};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("skeleton '{skeleton}' failed to parse: {source}")]
    Template {
        skeleton: String,
        #[source]
        source: TemplateError,
    },
    #[error("no fallback category declared")]
    MissingFallback,
    #[error("fallback category '{0}' is not in the catalog")]
    UnknownFallback(CategoryId),
    #[error("category '{0}' is declared twice")]
    DuplicateCategory(CategoryId),
    #[error("category '{0}' has an empty keyword")]
    EmptyKeyword(CategoryId),
    #[error("category '{category}' has no {field} variants")]
    EmptyVariants {
        category: CategoryId,
        field: &'static str,
    },
    #[error("category '{category}' uses unknown skeleton '{skeleton}'")]
    UnknownSkeleton {
        category: CategoryId,
        skeleton: String,
    },
    #[error("skeleton '{skeleton}' needs '{placeholder}', which category '{category}' cannot provide")]
    UnprovidedPlaceholder {
        category: CategoryId,
        skeleton: String,
        placeholder: String,
    },
}

mod data {
    pub const CATEGORIES: &str = include_str!("../../game_data/categories.ron");
    pub const MODIFIERS: &str = include_str!("../../game_data/modifiers.ron");
    pub const SKELETONS: &[(&str, &str)] = &[
        ("arcade", include_str!("../../game_data/skeletons/arcade.html")),
        ("puzzle", include_str!("../../game_data/skeletons/puzzle.html")),
    ];
}

// On-disk shapes of `categories.ron` and `modifiers.ron`.

#[derive(Debug, Default, Deserialize)]
struct CategoryFile {
    #[serde(default)]
    fallback: Option<CategoryId>,
    #[serde(default)]
    categories: Vec<CategoryDefinition>,
}

#[derive(Debug, Default, Deserialize)]
struct ModifierFile {
    #[serde(default)]
    tables: Vec<ModifierTable>,
    #[serde(default)]
    title_transforms: Vec<TitleTransform>,
}

/// Unvalidated catalog data. Merge sources, then `build()`.
#[derive(Debug, Clone, Default)]
pub struct CatalogSource {
    pub fallback: Option<CategoryId>,
    pub categories: Vec<CategoryDefinition>,
    pub modifier_tables: Vec<ModifierTable>,
    pub title_transforms: Vec<TitleTransform>,
    /// Skeleton name → raw skeleton text.
    pub skeletons: BTreeMap<String, String>,
}

impl CatalogSource {
    /// The catalog data compiled into the crate.
    pub fn builtin() -> Result<CatalogSource, CatalogError> {
        let mut source = Self::parse_ron(data::CATEGORIES, data::MODIFIERS)?;
        for (name, text) in data::SKELETONS {
            source.skeletons.insert(name.to_string(), text.to_string());
        }
        Ok(source)
    }

    /// Parse category and modifier data from RON strings. Skeletons are
    /// added separately.
    pub fn parse_ron(categories: &str, modifiers: &str) -> Result<CatalogSource, CatalogError> {
        let cats: CategoryFile = ron::from_str(categories)?;
        let mods: ModifierFile = ron::from_str(modifiers)?;
        Ok(CatalogSource {
            fallback: cats.fallback,
            categories: cats.categories,
            modifier_tables: mods.tables,
            title_transforms: mods.title_transforms,
            skeletons: BTreeMap::new(),
        })
    }

    /// Load a catalog directory. Every part is optional:
    /// `categories.ron`, `modifiers.ron` and `skeletons/*.html`.
    pub fn load_from_dir(dir: &Path) -> Result<CatalogSource, CatalogError> {
        let mut source = CatalogSource::default();

        let categories_path = dir.join("categories.ron");
        if categories_path.exists() {
            let file: CategoryFile = ron::from_str(&std::fs::read_to_string(&categories_path)?)?;
            source.fallback = file.fallback;
            source.categories = file.categories;
        }

        let modifiers_path = dir.join("modifiers.ron");
        if modifiers_path.exists() {
            let file: ModifierFile = ron::from_str(&std::fs::read_to_string(&modifiers_path)?)?;
            source.modifier_tables = file.tables;
            source.title_transforms = file.title_transforms;
        }

        let skeleton_dir = dir.join("skeletons");
        if skeleton_dir.is_dir() {
            for entry in std::fs::read_dir(&skeleton_dir)? {
                let path = entry?.path();
                if path.extension().and_then(|s| s.to_str()) != Some("html") {
                    continue;
                }
                if let Some(name) = path.file_stem().and_then(|s| s.to_str()) {
                    source
                        .skeletons
                        .insert(name.to_string(), std::fs::read_to_string(&path)?);
                }
            }
        }

        tracing::debug!(
            dir = %dir.display(),
            categories = source.categories.len(),
            skeletons = source.skeletons.len(),
            "loaded catalog directory"
        );
        Ok(source)
    }

    /// Merge another source into this one. Entries from `other` replace
    /// entries with the same key in place; new entries are appended, so
    /// declaration order (and with it tie-breaking) is kept stable.
    pub fn merge(&mut self, other: CatalogSource) {
        if other.fallback.is_some() {
            self.fallback = other.fallback;
        }

        for cat in other.categories {
            match self.categories.iter_mut().find(|c| c.id == cat.id) {
                Some(slot) => *slot = cat,
                None => self.categories.push(cat),
            }
        }

        for table in other.modifier_tables {
            match self.modifier_tables.iter_mut().find(|t| t.kind == table.kind) {
                Some(slot) => *slot = table,
                None => self.modifier_tables.push(table),
            }
        }

        for transform in other.title_transforms {
            match self
                .title_transforms
                .iter_mut()
                .find(|t| t.tag == transform.tag)
            {
                Some(slot) => *slot = transform,
                None => self.title_transforms.push(transform),
            }
        }

        self.skeletons.extend(other.skeletons);
    }

    /// Normalise and validate into an immutable `Catalog`.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        let fallback = self.fallback.ok_or(CatalogError::MissingFallback)?;

        let mut skeletons = FxHashMap::default();
        for (name, text) in self.skeletons {
            let template = Template::parse(&text).map_err(|source| CatalogError::Template {
                skeleton: name.clone(),
                source,
            })?;
            skeletons.insert(name, template);
        }

        let mut categories = self.categories;
        let mut index = FxHashMap::default();
        for (pos, cat) in categories.iter_mut().enumerate() {
            if index.insert(cat.id.clone(), pos).is_some() {
                return Err(CatalogError::DuplicateCategory(cat.id.clone()));
            }
            for kw in cat.keywords.iter_mut() {
                *kw = kw.trim().to_lowercase();
                if kw.is_empty() {
                    return Err(CatalogError::EmptyKeyword(cat.id.clone()));
                }
            }
            validate_category(cat, &skeletons)?;
        }

        if !index.contains_key(&fallback) {
            return Err(CatalogError::UnknownFallback(fallback));
        }

        let mut modifier_tables = self.modifier_tables;
        for table in modifier_tables.iter_mut() {
            for entry in table.entries.iter_mut() {
                for kw in entry.keywords.iter_mut() {
                    *kw = kw.trim().to_lowercase();
                }
                entry.keywords.retain(|kw| !kw.is_empty());
            }
        }

        Ok(Catalog {
            fallback,
            categories,
            index,
            modifier_tables,
            title_transforms: self.title_transforms,
            skeletons,
        })
    }
}

fn validate_category(
    cat: &CategoryDefinition,
    skeletons: &FxHashMap<String, Template>,
) -> Result<(), CatalogError> {
    let empty = |field: &'static str| CatalogError::EmptyVariants {
        category: cat.id.clone(),
        field,
    };
    if cat.titles.is_empty() {
        return Err(empty("title"));
    }
    if cat.label_sets.is_empty() {
        return Err(empty("label set"));
    }
    if cat.mechanics.is_empty() {
        return Err(empty("mechanics"));
    }
    if cat.palettes.is_empty() {
        return Err(empty("palette"));
    }
    if cat.intros.is_empty() {
        return Err(empty("intro"));
    }

    let skeleton = skeletons
        .get(&cat.skeleton)
        .ok_or_else(|| CatalogError::UnknownSkeleton {
            category: cat.id.clone(),
            skeleton: cat.skeleton.clone(),
        })?;

    for labels in &cat.label_sets {
        for placeholder in skeleton.placeholders() {
            if !renderer::provides(placeholder, labels) {
                return Err(CatalogError::UnprovidedPlaceholder {
                    category: cat.id.clone(),
                    skeleton: cat.skeleton.clone(),
                    placeholder: placeholder.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// The validated, read-only category table. Constructed once at startup
/// and shared by reference.
#[derive(Debug, Clone)]
pub struct Catalog {
    fallback: CategoryId,
    categories: Vec<CategoryDefinition>,
    index: FxHashMap<CategoryId, usize>,
    modifier_tables: Vec<ModifierTable>,
    title_transforms: Vec<TitleTransform>,
    skeletons: FxHashMap<String, Template>,
}

impl Catalog {
    /// The built-in catalog.
    pub fn builtin() -> Result<Catalog, CatalogError> {
        CatalogSource::builtin()?.build()
    }

    /// Load and validate a catalog directory on its own.
    pub fn load_from_dir(dir: &Path) -> Result<Catalog, CatalogError> {
        CatalogSource::load_from_dir(dir)?.build()
    }

    /// The category returned when nothing matches.
    pub fn fallback(&self) -> &CategoryId {
        &self.fallback
    }

    /// Categories in declaration order.
    pub fn categories(&self) -> &[CategoryDefinition] {
        &self.categories
    }

    pub fn get(&self, id: &CategoryId) -> Option<&CategoryDefinition> {
        self.index.get(id).map(|&pos| &self.categories[pos])
    }

    pub fn contains(&self, id: &CategoryId) -> bool {
        self.index.contains_key(id)
    }

    pub fn modifier_tables(&self) -> &[ModifierTable] {
        &self.modifier_tables
    }

    pub fn title_transforms(&self) -> &[TitleTransform] {
        &self.title_transforms
    }

    pub fn skeleton(&self, name: &str) -> Option<&Template> {
        self.skeletons.get(name)
    }

    /// Skeleton names, sorted.
    pub fn skeleton_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.skeletons.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
