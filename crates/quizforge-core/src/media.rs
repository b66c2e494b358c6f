//! Visual field normalization.
//!
//! The `visual` field arrives as a string, a `{content|text}` object, or
//! something else entirely. It is inspected here exactly once and reduced to
//! plain text plus an emoji count.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::Diagnostic;
use crate::model::{Media, MediaKind};

/// Placeholder glyphs the generator emits instead of real content.
pub const SENTINEL_GLYPHS: [&str; 2] = ["❓", "📝"];

static EMOJI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{Extended_Pictographic}").expect("emoji pattern is valid"));

/// The visual field reduced to text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedVisual {
    pub text: String,
    pub present: bool,
    pub emoji_count: usize,
}

impl NormalizedVisual {
    pub fn absent() -> Self {
        Self::default()
    }

    fn from_text(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Self::absent();
        }
        Self {
            text: text.to_string(),
            present: true,
            emoji_count: count_emoji(text),
        }
    }

    pub fn has_emoji(&self) -> bool {
        self.emoji_count > 0
    }

    /// Media descriptor for the question envelope.
    pub fn to_media(&self) -> Option<Media> {
        if !self.present {
            return None;
        }
        Some(Media {
            kind: if self.has_emoji() {
                MediaKind::Emoji
            } else {
                MediaKind::Text
            },
            content: self.text.clone(),
            emoji_count: self.emoji_count,
        })
    }
}

/// Normalize a raw `visual` value, recording malformed or placeholder input.
pub fn normalize_visual(visual: Option<&Value>, diagnostics: &mut Vec<Diagnostic>) -> NormalizedVisual {
    let text = match visual {
        None | Some(Value::Null) => return NormalizedVisual::absent(),
        Some(Value::String(s)) => s.as_str(),
        Some(Value::Object(map)) => ["content", "text"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .unwrap_or(""),
        Some(other) => {
            diagnostics.push(Diagnostic::MalformedVisual {
                json_type: json_type_name(other).to_string(),
            });
            return NormalizedVisual::absent();
        }
    };

    if let Some(glyph) = sentinel(text) {
        diagnostics.push(Diagnostic::SentinelVisual {
            glyph: glyph.to_string(),
        });
        return NormalizedVisual::absent();
    }

    NormalizedVisual::from_text(text)
}

/// Returns the sentinel glyph if `text` is nothing but a placeholder.
pub fn sentinel(text: &str) -> Option<&'static str> {
    let trimmed = text.trim();
    SENTINEL_GLYPHS.into_iter().find(|g| *g == trimmed)
}

/// Number of emoji-class characters in `text`.
pub fn count_emoji(text: &str) -> usize {
    EMOJI.find_iter(text).count()
}

/// `text` with emoji removed and whitespace collapsed.
pub fn strip_emoji(text: &str) -> String {
    EMOJI
        .replace_all(text, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
