use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of descriptive modifier a tag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKind {
    Theme,
    Character,
    Environment,
    Difficulty,
}

impl ModifierKind {
    /// Returns the prefix used when the tag is written out (e.g., "theme").
    pub fn name(&self) -> &'static str {
        match self {
            Self::Theme => "theme",
            Self::Character => "character",
            Self::Environment => "environment",
            Self::Difficulty => "difficulty",
        }
    }
}

/// A secondary descriptive label detected in a prompt, independent of
/// the category match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModifierTag {
    pub kind: ModifierKind,
    pub tag: String,
}

impl ModifierTag {
    pub fn new(kind: ModifierKind, tag: impl Into<String>) -> Self {
        Self {
            kind,
            tag: tag.into(),
        }
    }
}

impl fmt::Display for ModifierTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.name(), self.tag)
    }
}

/// One detectable tag and the keywords that trigger it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierEntry {
    pub tag: String,
    pub keywords: Vec<String>,
}

/// A keyword table for one modifier kind.
///
/// Exclusive tables report only their first matching entry (in declaration
/// order); the rest report every matching entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierTable {
    pub kind: ModifierKind,
    #[serde(default)]
    pub exclusive: bool,
    pub entries: Vec<ModifierEntry>,
}

impl ModifierTable {
    /// Detect tags of this table in an already lower-cased prompt.
    pub fn detect(&self, prompt_lower: &str) -> Vec<ModifierTag> {
        let mut found = Vec::new();
        for entry in &self.entries {
            if entry
                .keywords
                .iter()
                .any(|kw| prompt_lower.contains(kw.as_str()))
            {
                found.push(ModifierTag::new(self.kind, entry.tag.clone()));
                if self.exclusive {
                    break;
                }
            }
        }
        found
    }
}

/// A title rewrite keyed on a detected modifier tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleTransform {
    pub tag: String,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
}

impl TitleTransform {
    /// Apply the prefix and/or suffix, skipping a part the title already carries.
    pub fn apply(&self, title: &str) -> String {
        let mut out = String::with_capacity(title.len() + 16);
        if let Some(ref prefix) = self.prefix {
            if !title.starts_with(prefix.as_str()) {
                out.push_str(prefix);
            }
        }
        out.push_str(title);
        if let Some(ref suffix) = self.suffix {
            if !title.ends_with(suffix.as_str()) {
                out.push_str(suffix);
            }
        }
        out
    }
}
