//! Conversion diagnostics.
//!
//! Conversion never fails. Every ambiguous or unresolvable condition is
//! absorbed into a safe default and recorded as a `Diagnostic` so it can be
//! logged and reviewed offline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::QuestionType;

/// A condition detected while converting a single raw item.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The explicit `type` field did not name a known variant.
    #[error("unknown question type '{name}', ignoring explicit type")]
    UnknownType { name: String },

    /// The `visual` field was neither a string nor a `{content|text}` object.
    #[error("malformed visual of JSON type {json_type}, treated as no media")]
    MalformedVisual { json_type: String },

    /// The `visual` field held a placeholder glyph instead of content.
    #[error("visual is the placeholder '{glyph}', treated as no media")]
    SentinelVisual { glyph: String },

    /// No `correct_answer` was supplied.
    #[error("no correct_answer for {variant}, using default")]
    MissingAnswer { variant: QuestionType },

    /// A value expected to be numeric could not be parsed.
    #[error("could not parse '{raw}' as a number, using {fallback}")]
    UnparseableNumber { raw: String, fallback: String },

    /// A numeric answer used as an index was outside the options list.
    #[error("answer index {index} is out of range for {len} option(s)")]
    IndexOutOfRange { index: i64, len: usize },

    /// The answer did not match any option or accepted form.
    #[error("could not resolve answer '{raw}' for {variant}")]
    UnresolvedAnswer { variant: QuestionType, raw: String },

    /// A true/false answer string was not a recognised boolean spelling.
    #[error("unrecognised boolean '{raw}', defaulting to false")]
    UnrecognizedBoolean { raw: String },

    /// An absent answer was inferred from other fields.
    #[error("answer inferred: {detail}")]
    InferredAnswer { detail: String },

    /// Fewer answers than blanks; overflow blanks reuse the first answer.
    #[error("{answers} answer(s) for {blanks} blank(s), reusing the first answer")]
    AnswerListShorter { blanks: usize, answers: usize },

    /// Fill-blank prompt had no `___` marker; one blank was synthesized.
    #[error("no blank markers found, synthesized a single blank")]
    NoBlankMarkers,

    /// A count was negative or fractional and was clamped.
    #[error("count {raw} is not a non-negative integer, clamped to {clamped}")]
    ClampedCount { raw: String, clamped: u32 },
}

impl Diagnostic {
    /// Returns `true` if a safe default replaced an answer the input did not resolve.
    pub fn is_defaulted(&self) -> bool {
        matches!(
            self,
            Diagnostic::MissingAnswer { .. }
                | Diagnostic::UnparseableNumber { .. }
                | Diagnostic::IndexOutOfRange { .. }
                | Diagnostic::UnresolvedAnswer { .. }
                | Diagnostic::UnrecognizedBoolean { .. }
        )
    }

    /// Returns `true` if the condition concerns the visual field.
    pub fn is_media(&self) -> bool {
        matches!(
            self,
            Diagnostic::MalformedVisual { .. } | Diagnostic::SentinelVisual { .. }
        )
    }
}
