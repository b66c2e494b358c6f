//! Canonical question model.
//!
//! A `Question` is a common envelope plus exactly one variant payload. These
//! are the types a renderer switches on; every answer field is always
//! present, even when the raw input could not be resolved.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::input::SkillInfo;

/// Fixed tolerance for numeric answers.
pub const NUMERIC_TOLERANCE: f64 = 0.01;

/// Fixed maximum answer length for short-answer questions.
pub const SHORT_ANSWER_MAX_LENGTH: u32 = 200;

/// The six question variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Counting,
    MultipleChoice,
    TrueFalse,
    FillBlank,
    Numeric,
    ShortAnswer,
}

impl QuestionType {
    pub const ALL: [QuestionType; 6] = [
        QuestionType::Counting,
        QuestionType::MultipleChoice,
        QuestionType::TrueFalse,
        QuestionType::FillBlank,
        QuestionType::Numeric,
        QuestionType::ShortAnswer,
    ];

    /// Canonical tag as it appears in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Counting => "counting",
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::FillBlank => "fill_blank",
            QuestionType::Numeric => "numeric",
            QuestionType::ShortAnswer => "short_answer",
        }
    }

    /// Default point value.
    pub fn default_points(&self) -> u32 {
        match self {
            QuestionType::TrueFalse => 5,
            QuestionType::Counting | QuestionType::MultipleChoice | QuestionType::FillBlank => 10,
            QuestionType::Numeric | QuestionType::ShortAnswer => 15,
        }
    }

    pub fn cognitive_level(&self) -> CognitiveLevel {
        match self {
            QuestionType::Counting | QuestionType::TrueFalse => CognitiveLevel::Remember,
            QuestionType::MultipleChoice | QuestionType::ShortAnswer => CognitiveLevel::Understand,
            QuestionType::FillBlank | QuestionType::Numeric => CognitiveLevel::Apply,
        }
    }

    /// Estimated time to answer, in seconds.
    pub fn estimated_time_secs(&self) -> u32 {
        match self {
            QuestionType::TrueFalse => 20,
            QuestionType::Counting => 30,
            QuestionType::MultipleChoice => 45,
            QuestionType::FillBlank | QuestionType::Numeric => 60,
            QuestionType::ShortAnswer => 90,
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    /// Only the canonical names are accepted; upstream guarantees them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        QuestionType::ALL
            .into_iter()
            .find(|t| t.as_str() == lowered)
            .ok_or_else(|| format!("unknown question type: {}", s.trim()))
    }
}

/// Difficulty band derived from the grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Kindergarten through grade 2 is easy, 3-5 medium, 6 and up hard.
    /// Unrecognised grades fall back to medium.
    pub fn from_skill(skill: &SkillInfo) -> Self {
        if skill.is_early_grade() {
            return Difficulty::Easy;
        }
        match skill.grade_number() {
            Some(g) if g <= 5 => Difficulty::Medium,
            Some(_) => Difficulty::Hard,
            None => Difficulty::Medium,
        }
    }
}

/// Bloom-style cognitive level tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CognitiveLevel {
    Remember,
    Understand,
    Apply,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionMetadata {
    pub cognitive_level: CognitiveLevel,
    /// Seconds.
    pub estimated_time: u32,
}

impl QuestionMetadata {
    pub fn for_type(question_type: QuestionType) -> Self {
        Self {
            cognitive_level: question_type.cognitive_level(),
            estimated_time: question_type.estimated_time_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Emoji,
    Text,
}

/// Normalized visual content attached to a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub kind: MediaKind,
    pub content: String,
    pub emoji_count: usize,
}

/// A canonical, render-ready question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
    /// The literal prompt text.
    pub content: String,
    pub topic: String,
    pub subject: String,
    pub difficulty: Difficulty,
    pub points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hints: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Media>,
    pub metadata: QuestionMetadata,
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }
}

/// Variant payloads, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    Counting(CountingPayload),
    MultipleChoice(MultipleChoicePayload),
    TrueFalse(TrueFalsePayload),
    FillBlank(FillBlankPayload),
    Numeric(NumericPayload),
    ShortAnswer(ShortAnswerPayload),
}

impl QuestionKind {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::Counting(_) => QuestionType::Counting,
            QuestionKind::MultipleChoice(_) => QuestionType::MultipleChoice,
            QuestionKind::TrueFalse(_) => QuestionType::TrueFalse,
            QuestionKind::FillBlank(_) => QuestionType::FillBlank,
            QuestionKind::Numeric(_) => QuestionType::Numeric,
            QuestionKind::ShortAnswer(_) => QuestionType::ShortAnswer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountingPayload {
    pub correct_count: u32,
    pub count_what: String,
    pub min_count: u32,
    pub max_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleChoicePayload {
    pub options: Vec<ChoiceOption>,
    pub allow_multiple: bool,
    pub randomize_options: bool,
}

impl MultipleChoicePayload {
    /// The option marked correct, if one was resolved.
    pub fn correct_option(&self) -> Option<&ChoiceOption> {
        self.options.iter().find(|o| o.is_correct)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrueFalsePayload {
    pub statement: String,
    pub correct_answer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blank {
    pub id: String,
    pub position: usize,
    pub correct_answers: Vec<String>,
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillBlankPayload {
    pub template: String,
    pub blanks: Vec<Blank>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericPayload {
    pub correct_answer: f64,
    pub tolerance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortAnswerPayload {
    pub acceptable_answers: Vec<String>,
    pub case_sensitive: bool,
    pub max_length: u32,
}
