/// Template renderer: substitutes a `TemplateChoice` into its skeleton.
///
/// Rendering is pure: the same choice and prompt always produce the same
/// bytes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::core::catalog::Catalog;
use crate::core::selector::TemplateChoice;
use crate::core::template::{Segment, Template};
use crate::schema::category::{CategoryId, LabelSet, Palette};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("category '{category}' uses unknown skeleton '{skeleton}'")]
    UnknownSkeleton {
        category: CategoryId,
        skeleton: String,
    },
    #[error("skeleton '{skeleton}' references '{placeholder}', which has no value for category '{category}'")]
    MissingPlaceholder {
        category: CategoryId,
        skeleton: String,
        placeholder: String,
    },
}

/// The final output of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedGame {
    pub category: CategoryId,
    pub title: String,
    pub labels: LabelSet,
    pub palette: Palette,
    /// The complete HTML document.
    pub document: String,
}

/// Placeholders every choice can fill. `label.<key>` is provided per label set.
const STATIC_PLACEHOLDERS: &[&str] = &[
    "title",
    "prompt",
    "category",
    "intro",
    "mechanics",
    "difficulty",
    "difficulty.speed",
    "difficulty.spawn_rate",
    "difficulty.lives",
    "palette.primary",
    "palette.secondary",
    "palette.accent",
    "palette.background",
    "palette.text",
];

const LABEL_PREFIX: &str = "label.";

/// Whether a placeholder can be filled for a category using `labels`.
pub(crate) fn provides(placeholder: &str, labels: &LabelSet) -> bool {
    STATIC_PLACEHOLDERS.contains(&placeholder)
        || placeholder
            .strip_prefix(LABEL_PREFIX)
            .is_some_and(|key| labels.contains_key(key))
}

/// Build the placeholder → value mapping for a choice. Text values are
/// HTML-escaped; `mechanics` is a run of `<li>` items.
pub fn substitutions(choice: &TemplateChoice, prompt: &str) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();
    let mut put = |k: &str, v: String| {
        values.insert(k.to_string(), v);
    };

    put("title", escape_html(&choice.title));
    put("prompt", escape_html(prompt.trim()));
    put("category", escape_html(choice.category.as_str()));
    put("intro", escape_html(&choice.intro));
    put(
        "mechanics",
        choice
            .mechanics
            .iter()
            .map(|m| format!("<li>{}</li>", escape_html(m)))
            .collect::<Vec<_>>()
            .join("\n"),
    );
    put("difficulty", choice.difficulty.name().to_string());
    put("difficulty.speed", format!("{:.2}", choice.params.speed));
    put("difficulty.spawn_rate", format!("{:.2}", choice.params.spawn_rate));
    put("difficulty.lives", choice.params.lives.to_string());
    put("palette.primary", escape_html(&choice.palette.primary));
    put("palette.secondary", escape_html(&choice.palette.secondary));
    put("palette.accent", escape_html(&choice.palette.accent));
    put("palette.background", escape_html(&choice.palette.background));
    put("palette.text", escape_html(&choice.palette.text));

    for (key, label) in &choice.labels {
        values.insert(format!("{}{}", LABEL_PREFIX, key), escape_html(label));
    }
    values
}

/// Substitute `values` into `template`. Any placeholder without a value is
/// an error; no partial output is returned.
pub fn render_template(
    template: &Template,
    values: &BTreeMap<String, String>,
    choice: &TemplateChoice,
) -> Result<String, RenderError> {
    let mut out = String::new();
    for seg in &template.segments {
        match seg {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(name) => {
                let value = values
                    .get(name)
                    .ok_or_else(|| RenderError::MissingPlaceholder {
                        category: choice.category.clone(),
                        skeleton: choice.skeleton.clone(),
                        placeholder: name.clone(),
                    })?;
                out.push_str(value);
            }
        }
    }
    Ok(out)
}

/// Render a choice with its category's skeleton.
pub fn render(
    catalog: &Catalog,
    choice: &TemplateChoice,
    prompt: &str,
) -> Result<RenderedGame, RenderError> {
    let skeleton = catalog
        .skeleton(&choice.skeleton)
        .ok_or_else(|| RenderError::UnknownSkeleton {
            category: choice.category.clone(),
            skeleton: choice.skeleton.clone(),
        })?;

    let values = substitutions(choice, prompt);
    let document = render_template(skeleton, &values, choice)?;

    Ok(RenderedGame {
        category: choice.category.clone(),
        title: choice.title.clone(),
        labels: choice.labels.clone(),
        palette: choice.palette.clone(),
        document,
    })
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
