//! Raw, untrusted assessment items as produced by a language model.
//!
//! Field names and value shapes vary between generations, so the raw item is
//! built from an arbitrary `serde_json::Value` and never fails to
//! deserialize. Shape errors degrade to absent fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys that may carry the answer, in priority order.
const ANSWER_KEYS: [&str; 3] = ["correct_answer", "correctAnswer", "answer"];

/// One raw assessment or practice item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct RawAssessmentInput {
    pub question: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<RawAnswer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
}

impl RawAssessmentInput {
    /// Convenience constructor for a bare prompt.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, question_type: impl Into<String>) -> Self {
        self.question_type = Some(question_type.into());
        self
    }

    pub fn with_visual(mut self, visual: impl Into<Value>) -> Self {
        self.visual = Some(visual.into());
        self
    }

    pub fn with_options<I, T>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_answer(mut self, answer: impl Into<Value>) -> Self {
        self.correct_answer = RawAnswer::from_value(&answer.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Options rendered as display strings.
    pub fn option_texts(&self) -> Vec<String> {
        self.options.iter().map(option_text).collect()
    }
}

impl From<Value> for RawAssessmentInput {
    fn from(value: Value) -> Self {
        let map = match value {
            Value::Object(map) => map,
            // A bare string is treated as the prompt itself.
            Value::String(s) => return RawAssessmentInput::new(s),
            _ => return RawAssessmentInput::default(),
        };

        let question = string_field(&map, "question")
            .filter(|q| !q.trim().is_empty())
            .or_else(|| string_field(&map, "content"))
            .unwrap_or_default();

        let options = match map.get("options") {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };

        let correct_answer = ANSWER_KEYS
            .iter()
            .find_map(|key| map.get(*key).filter(|v| !v.is_null()))
            .and_then(RawAnswer::from_value);

        RawAssessmentInput {
            question,
            question_type: string_field(&map, "type"),
            visual: map.get("visual").filter(|v| !v.is_null()).cloned(),
            options,
            correct_answer,
            explanation: string_field(&map, "explanation"),
            hint: string_field(&map, "hint"),
            statement: string_field(&map, "statement"),
        }
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A `correct_answer` in any of the encodings the generator uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAnswer {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<RawAnswer>),
}

impl RawAnswer {
    /// Build from JSON. `null` and objects are treated as absent.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(RawAnswer::Bool(*b)),
            Value::Number(n) => n.as_f64().map(RawAnswer::Number),
            Value::String(s) => Some(RawAnswer::Text(s.clone())),
            Value::Array(items) => Some(RawAnswer::List(
                items.iter().filter_map(RawAnswer::from_value).collect(),
            )),
            Value::Null | Value::Object(_) => None,
        }
    }

    /// Numeric value of a number or a numeric string.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawAnswer::Number(n) => Some(*n),
            RawAnswer::Text(s) => parse_number(s),
            _ => None,
        }
    }

    /// A native number usable as a list index.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            RawAnswer::Number(n) if *n >= 0.0 && n.fract() == 0.0 => Some(*n as usize),
            _ => None,
        }
    }

    /// The first scalar: the value itself, or the first list element.
    pub fn first_scalar(&self) -> Option<&RawAnswer> {
        match self {
            RawAnswer::List(items) => items.first().and_then(RawAnswer::first_scalar),
            scalar => Some(scalar),
        }
    }

    /// Display string of a scalar; lists join their elements with ", ".
    pub fn display(&self) -> String {
        match self {
            RawAnswer::Bool(b) => b.to_string(),
            RawAnswer::Number(n) => format_number(*n),
            RawAnswer::Text(s) => s.clone(),
            RawAnswer::List(items) => items
                .iter()
                .map(RawAnswer::display)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Flatten into display strings, one per scalar.
    pub fn to_strings(&self) -> Vec<String> {
        match self {
            RawAnswer::List(items) => items.iter().flat_map(RawAnswer::to_strings).collect(),
            scalar => vec![scalar.display()],
        }
    }
}

/// Parse a trimmed string as a finite number.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Render a number without a trailing `.0` for integral values.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Stringify an option value for display.
pub fn option_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Grade and subject context accompanying every conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillInfo {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub skill_name: String,
    #[serde(default)]
    pub skill_number: String,
}

impl SkillInfo {
    pub fn new(subject: impl Into<String>, grade: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            grade: grade.into(),
            ..Default::default()
        }
    }

    pub fn is_math(&self) -> bool {
        matches!(
            self.subject.trim().to_lowercase().as_str(),
            "math" | "maths" | "mathematics"
        )
    }

    pub fn is_kindergarten(&self) -> bool {
        matches!(
            normalized_grade(&self.grade).as_str(),
            "k" | "kg" | "pre-k" | "prek" | "kindergarten"
        )
    }

    /// Kindergarten or a numeric grade of 2 or below.
    pub fn is_early_grade(&self) -> bool {
        self.is_kindergarten() || self.grade_number().is_some_and(|g| g <= 2)
    }

    /// Numeric grade, ignoring a leading "grade" word and ordinal suffixes.
    pub fn grade_number(&self) -> Option<u32> {
        let grade = normalized_grade(&self.grade);
        let digits: String = grade.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits.parse().ok()
    }
}

fn normalized_grade(grade: &str) -> String {
    let lowered = grade.trim().to_lowercase();
    lowered
        .strip_prefix("grade")
        .map(|rest| rest.trim().to_string())
        .unwrap_or(lowered)
}
