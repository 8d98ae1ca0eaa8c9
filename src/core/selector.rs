/// Template selector: resolves a classification into concrete template values.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::catalog::Catalog;
use crate::core::classifier::ClassificationResult;
use crate::schema::category::{CategoryDefinition, CategoryId, LabelSet, Palette};
use crate::schema::difficulty::{Difficulty, DifficultyParams};
use crate::schema::modifier::{ModifierKind, ModifierTag};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    /// The category is not in the catalog. Classification only produces
    /// catalog ids, so this means the result came from somewhere else.
    #[error("unknown category '{0}'")]
    UnknownCategory(CategoryId),
    #[error("category '{category}' has no {field} variants")]
    NoVariants {
        category: CategoryId,
        field: &'static str,
    },
}

/// The fully resolved values for one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateChoice {
    pub category: CategoryId,
    pub title: String,
    pub labels: LabelSet,
    pub palette: Palette,
    pub mechanics: Vec<String>,
    pub intro: String,
    pub difficulty: Difficulty,
    pub params: DifficultyParams,
    /// Name of the skeleton to render with.
    pub skeleton: String,
    pub modifiers: Vec<ModifierTag>,
}

/// Pick one variant of every list for the classified category.
///
/// At most one title transform is applied: the first one, in catalog
/// order, whose tag was detected.
pub fn select<R: Rng + ?Sized>(
    catalog: &Catalog,
    result: &ClassificationResult,
    rng: &mut R,
) -> Result<TemplateChoice, SelectError> {
    let cat = catalog
        .get(&result.category)
        .ok_or_else(|| SelectError::UnknownCategory(result.category.clone()))?;

    let base_title = pick(cat, &cat.titles, "title", rng)?;
    let labels = pick(cat, &cat.label_sets, "label set", rng)?;
    let mechanics = pick(cat, &cat.mechanics, "mechanics", rng)?;
    let palette = pick(cat, &cat.palettes, "palette", rng)?;
    let intro = pick(cat, &cat.intros, "intro", rng)?;

    let title = match catalog
        .title_transforms()
        .iter()
        .find(|t| result.has_tag(&t.tag))
    {
        Some(transform) => transform.apply(base_title),
        None => base_title.clone(),
    };

    let difficulty = Difficulty::from_tag(result.modifier(ModifierKind::Difficulty));

    tracing::debug!(
        category = %cat.id,
        title = %title,
        difficulty = difficulty.name(),
        "selected template values"
    );

    Ok(TemplateChoice {
        category: cat.id.clone(),
        title,
        labels: labels.clone(),
        palette: palette.clone(),
        mechanics: mechanics.clone(),
        intro: intro.clone(),
        difficulty,
        params: difficulty.params(),
        skeleton: cat.skeleton.clone(),
        modifiers: result.modifiers.clone(),
    })
}

fn pick<'a, T, R: Rng + ?Sized>(
    cat: &CategoryDefinition,
    variants: &'a [T],
    field: &'static str,
    rng: &mut R,
) -> Result<&'a T, SelectError> {
    variants.choose(rng).ok_or_else(|| SelectError::NoVariants {
        category: cat.id.clone(),
        field,
    })
}
