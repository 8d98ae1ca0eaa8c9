/// Skeleton templates: parsing `{{placeholder}}` documents into segments.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unclosed placeholder starting at byte {0}")]
    Unclosed(usize),
    #[error("nested placeholder at byte {0}")]
    Nested(usize),
    #[error("empty placeholder at byte {0}")]
    Empty(usize),
    #[error("invalid placeholder name '{0}'")]
    InvalidName(String),
}

/// A segment of a parsed skeleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Segment {
    /// Literal text, emitted as-is.
    Literal(String),
    /// Named substitution point: `{{name}}`.
    Placeholder(String),
}

/// A parsed skeleton: a sequence of segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub segments: Vec<Segment>,
}

impl Template {
    /// Parse a skeleton string into a sequence of segments.
    ///
    /// Syntax:
    /// - `{{name}}` → `Placeholder` (surrounding whitespace inside the braces is ignored)
    /// - Everything else, including single `{` and `}` → `Literal`
    ///
    /// Names are lowercase ASCII letters, digits, `_` and `.`.
    pub fn parse(input: &str) -> Result<Template, TemplateError> {
        let mut segments = Vec::new();
        let mut literal_start = 0;
        let mut i = 0;

        while let Some(offset) = input[i..].find("{{") {
            let open = i + offset;
            let content_start = open + 2;
            let close = input[content_start..]
                .find("}}")
                .map(|o| content_start + o)
                .ok_or(TemplateError::Unclosed(open))?;

            let content = &input[content_start..close];
            if content.contains('{') {
                return Err(TemplateError::Nested(open));
            }
            let name = content.trim();
            if name.is_empty() {
                return Err(TemplateError::Empty(open));
            }
            if !is_valid_name(name) {
                return Err(TemplateError::InvalidName(name.to_string()));
            }

            if open > literal_start {
                segments.push(Segment::Literal(input[literal_start..open].to_string()));
            }
            segments.push(Segment::Placeholder(name.to_string()));

            i = close + 2;
            literal_start = i;
        }

        if literal_start < input.len() {
            segments.push(Segment::Literal(input[literal_start..].to_string()));
        }

        Ok(Template { segments })
    }

    /// Placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for seg in &self.segments {
            if let Segment::Placeholder(name) = seg {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }
}

fn is_valid_name(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.')
        && !name.starts_with('.')
        && !name.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_literal_only() {
        let t = Template::parse("<h1>Hello</h1>").unwrap();
        assert_eq!(t.segments, vec![Segment::Literal("<h1>Hello</h1>".to_string())]);
    }

    #[test]
    fn parse_placeholder() {
        let t = Template::parse("<h1>{{title}}</h1>").unwrap();
        assert_eq!(t.segments.len(), 3);
        assert_eq!(t.segments[1], Segment::Placeholder("title".to_string()));
    }

    #[test]
    fn parse_dotted_and_padded_names() {
        let t = Template::parse("color: {{ palette.primary }};").unwrap();
        assert_eq!(
            t.segments[1],
            Segment::Placeholder("palette.primary".to_string())
        );
    }

    #[test]
    fn single_braces_are_literal() {
        let src = "body { margin: 0; } function f() { if (a) { b(); }}";
        let t = Template::parse(src).unwrap();
        assert_eq!(t.segments, vec![Segment::Literal(src.to_string())]);
    }

    #[test]
    fn placeholder_inside_css_block() {
        let t = Template::parse("h1 { color: {{palette.accent}}; }").unwrap();
        assert_eq!(
            t.segments,
            vec![
                Segment::Literal("h1 { color: ".to_string()),
                Segment::Placeholder("palette.accent".to_string()),
                Segment::Literal("; }".to_string()),
            ]
        );
    }

    #[test]
    fn parse_empty_error() {
        assert_eq!(Template::parse("a {{ }} b"), Err(TemplateError::Empty(2)));
    }

    #[test]
    fn parse_nested_error() {
        assert!(matches!(
            Template::parse("a {{outer{{inner}}}}"),
            Err(TemplateError::Nested(2))
        ));
    }

    #[test]
    fn parse_unclosed_error() {
        assert_eq!(
            Template::parse("x {{title"),
            Err(TemplateError::Unclosed(2))
        );
    }

    #[test]
    fn parse_invalid_name_error() {
        assert!(matches!(
            Template::parse("{{Title}}"),
            Err(TemplateError::InvalidName(n)) if n == "Title"
        ));
        assert!(Template::parse("{{label.}}").is_err());
    }

    #[test]
    fn placeholders_deduplicated_in_order() {
        let t = Template::parse("{{title}} {{label.score}} {{title}} {{prompt}}").unwrap();
        assert_eq!(t.placeholders(), vec!["title", "label.score", "prompt"]);
    }
}
