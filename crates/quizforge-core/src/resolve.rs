//! Answer resolution, one resolver per variant.
//!
//! Each resolver turns the raw `correct_answer` (an index, a literal, a
//! boolean-ish string, or a list) into the variant's canonical payload.
//! Resolvers never fail: anything unresolvable becomes the variant's safe
//! default and a `Diagnostic` is recorded.

use std::sync::LazyLock;

use regex::Regex;

use crate::classify::blank_markers;
use crate::error::Diagnostic;
use crate::input::{format_number, parse_number, RawAnswer, RawAssessmentInput};
use crate::media::{strip_emoji, NormalizedVisual};
use crate::model::{
    Blank, ChoiceOption, CountingPayload, FillBlankPayload, MultipleChoicePayload,
    NumericPayload, QuestionKind, QuestionType, ShortAnswerPayload, TrueFalsePayload,
    NUMERIC_TOLERANCE, SHORT_ANSWER_MAX_LENGTH,
};

const DEFAULT_COUNT_LABEL: &str = "items";
const MIN_DISPLAY_MAX_COUNT: u32 = 10;

static TRUE_FALSE_PREFIXES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)^\s*true\s*(?:or|/)\s*false\s*[:?.\-]?\s*"),
        Regex::new(r"(?i)^\s*t\s*/\s*f\s*[:.\-]?\s*"),
        Regex::new(r"(?i)^\s*is\s+it\s+true\s+that\s*:?\s*"),
    ]
    .map(|re| re.expect("true/false prefix pattern is valid"))
});

static THERE_ARE_N: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bthere\s+(?:are|is)\s+(\d+)\b").expect("there-are pattern is valid")
});

static COUNT_SUBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)how\s+many\s+(.+?)\s+(?:are|is|do|does|did|can|were|was|in|on)\b")
        .expect("count subject pattern is valid")
});

static COUNT_NOUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)how\s+many\s+(\w+)").expect("count noun pattern is valid"));

/// What every resolver needs from the raw item.
#[derive(Debug)]
pub struct ResolveInput<'a> {
    pub raw: &'a RawAssessmentInput,
    pub options: Vec<String>,
    pub visual: &'a NormalizedVisual,
}

impl<'a> ResolveInput<'a> {
    pub fn new(raw: &'a RawAssessmentInput, visual: &'a NormalizedVisual) -> Self {
        Self {
            raw,
            options: raw.option_texts(),
            visual,
        }
    }

    fn answer(&self) -> Option<&'a RawAnswer> {
        self.raw.correct_answer.as_ref()
    }

    fn question(&self) -> &'a str {
        &self.raw.question
    }
}

/// Dispatch to the resolver for `question_type`.
pub fn resolve(
    question_type: QuestionType,
    input: &ResolveInput<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> QuestionKind {
    match question_type {
        QuestionType::Counting => QuestionKind::Counting(resolve_counting(input, diagnostics)),
        QuestionType::MultipleChoice => {
            QuestionKind::MultipleChoice(resolve_multiple_choice(input, diagnostics))
        }
        QuestionType::TrueFalse => QuestionKind::TrueFalse(resolve_true_false(input, diagnostics)),
        QuestionType::FillBlank => QuestionKind::FillBlank(resolve_fill_blank(input, diagnostics)),
        QuestionType::Numeric => QuestionKind::Numeric(resolve_numeric(input, diagnostics)),
        QuestionType::ShortAnswer => {
            QuestionKind::ShortAnswer(resolve_short_answer(input, diagnostics))
        }
    }
}

// ---------------------------------------------------------------------------
// Counting
// ---------------------------------------------------------------------------

pub fn resolve_counting(input: &ResolveInput<'_>, diagnostics: &mut Vec<Diagnostic>) -> CountingPayload {
    let correct_count = if input.visual.has_emoji() {
        // The visual is the ground truth for counting questions.
        input.visual.emoji_count as u32
    } else {
        count_from_answer(input, diagnostics)
    };

    CountingPayload {
        correct_count,
        count_what: count_label(input.question()),
        min_count: 0,
        max_count: MIN_DISPLAY_MAX_COUNT.max(correct_count.saturating_add(5)),
    }
}

fn count_from_answer(input: &ResolveInput<'_>, diagnostics: &mut Vec<Diagnostic>) -> u32 {
    let Some(answer) = input.answer().and_then(RawAnswer::first_scalar) else {
        diagnostics.push(Diagnostic::MissingAnswer {
            variant: QuestionType::Counting,
        });
        return 0;
    };

    match answer {
        RawAnswer::Number(n) => {
            if let Some(option) = answer.as_index().and_then(|i| input.options.get(i)) {
                if let Some(value) = parse_number(option) {
                    return clamp_count(value, diagnostics);
                }
            }
            clamp_count(*n, diagnostics)
        }
        RawAnswer::Text(s) => match s.trim().parse::<i64>() {
            Ok(value) => clamp_count(value as f64, diagnostics),
            Err(_) => {
                diagnostics.push(Diagnostic::UnparseableNumber {
                    raw: s.clone(),
                    fallback: "0".into(),
                });
                0
            }
        },
        other => {
            diagnostics.push(Diagnostic::UnresolvedAnswer {
                variant: QuestionType::Counting,
                raw: other.display(),
            });
            0
        }
    }
}

fn clamp_count(value: f64, diagnostics: &mut Vec<Diagnostic>) -> u32 {
    if value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        return value as u32;
    }
    let clamped = value.clamp(0.0, u32::MAX as f64).trunc() as u32;
    diagnostics.push(Diagnostic::ClampedCount {
        raw: format_number(value),
        clamped,
    });
    clamped
}

/// The thing being counted, from "how many X are ...".
fn count_label(question: &str) -> String {
    fn first_group(re: &Regex, text: &str) -> Option<String> {
        let label = re.captures(text)?.get(1)?.as_str().trim().to_string();
        (!label.is_empty()).then_some(label)
    }

    first_group(&COUNT_SUBJECT, question)
        .or_else(|| first_group(&COUNT_NOUN, &strip_emoji(question)))
        .unwrap_or_else(|| DEFAULT_COUNT_LABEL.to_string())
}

// ---------------------------------------------------------------------------
// Multiple choice
// ---------------------------------------------------------------------------

pub fn resolve_multiple_choice(
    input: &ResolveInput<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> MultipleChoicePayload {
    let correct_index = match input.answer().and_then(RawAnswer::first_scalar) {
        Some(answer) => {
            let index = choice_index(answer, &input.options, diagnostics);
            if index.is_none() {
                tracing::debug!(
                    answer = %answer.display(),
                    options = ?input.options,
                    "no option matches the answer"
                );
                diagnostics.push(Diagnostic::UnresolvedAnswer {
                    variant: QuestionType::MultipleChoice,
                    raw: answer.display(),
                });
            }
            index
        }
        None => {
            diagnostics.push(Diagnostic::MissingAnswer {
                variant: QuestionType::MultipleChoice,
            });
            None
        }
    };

    let options = input
        .options
        .iter()
        .enumerate()
        .map(|(i, text)| ChoiceOption {
            id: option_id(i),
            text: text.clone(),
            is_correct: Some(i) == correct_index,
        })
        .collect();

    MultipleChoicePayload {
        options,
        allow_multiple: false,
        randomize_options: false,
    }
}

fn choice_index(
    answer: &RawAnswer,
    options: &[String],
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<usize> {
    match answer {
        RawAnswer::Number(n) => {
            // Position, not text: duplicate option text must not shift the mark.
            if let Some(i) = answer.as_index().filter(|i| *i < options.len()) {
                return Some(i);
            }
            let by_value = match_text(options, &format_number(*n));
            if by_value.is_none() {
                diagnostics.push(Diagnostic::IndexOutOfRange {
                    index: n.trunc() as i64,
                    len: options.len(),
                });
            }
            by_value
        }
        // Matched literally; a single letter is never read as a position.
        RawAnswer::Text(s) => match_text(options, s),
        RawAnswer::Bool(b) => match_text(options, &b.to_string()),
        RawAnswer::List(_) => None,
    }
}

/// Exact match first, then case-insensitive on trimmed text.
fn match_text(options: &[String], wanted: &str) -> Option<usize> {
    options.iter().position(|o| o == wanted).or_else(|| {
        let wanted = wanted.trim().to_lowercase();
        options.iter().position(|o| o.trim().to_lowercase() == wanted)
    })
}

fn option_id(index: usize) -> String {
    if index < 26 {
        ((b'a' + index as u8) as char).to_string()
    } else {
        format!("opt{index}")
    }
}

// ---------------------------------------------------------------------------
// True / false
// ---------------------------------------------------------------------------

pub fn resolve_true_false(
    input: &ResolveInput<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> TrueFalsePayload {
    let correct_answer = match input.answer().and_then(RawAnswer::first_scalar) {
        Some(answer) => boolean_answer(answer, &input.options, diagnostics),
        None => infer_from_visual(input, diagnostics).unwrap_or_else(|| {
            diagnostics.push(Diagnostic::MissingAnswer {
                variant: QuestionType::TrueFalse,
            });
            false
        }),
    };

    TrueFalsePayload {
        statement: statement_text(input.question(), input.raw.statement.as_deref()),
        correct_answer,
    }
}

fn boolean_answer(answer: &RawAnswer, options: &[String], diagnostics: &mut Vec<Diagnostic>) -> bool {
    match answer {
        RawAnswer::Bool(b) => *b,
        RawAnswer::Text(s) => parse_boolean(s).unwrap_or_else(|| {
            diagnostics.push(Diagnostic::UnrecognizedBoolean { raw: s.clone() });
            false
        }),
        RawAnswer::Number(n) => {
            if !options.is_empty() {
                match answer.as_index().and_then(|i| options.get(i)) {
                    Some(option) => parse_boolean(option).unwrap_or_else(|| {
                        diagnostics.push(Diagnostic::UnrecognizedBoolean {
                            raw: option.clone(),
                        });
                        false
                    }),
                    None => {
                        diagnostics.push(Diagnostic::IndexOutOfRange {
                            index: n.trunc() as i64,
                            len: options.len(),
                        });
                        false
                    }
                }
            } else {
                // Without options, 0 means true and 1 means false.
                match answer.as_index() {
                    Some(0) => true,
                    Some(1) => false,
                    _ => {
                        diagnostics.push(Diagnostic::UnresolvedAnswer {
                            variant: QuestionType::TrueFalse,
                            raw: format_number(*n),
                        });
                        false
                    }
                }
            }
        }
        RawAnswer::List(_) => {
            diagnostics.push(Diagnostic::UnresolvedAnswer {
                variant: QuestionType::TrueFalse,
                raw: answer.display(),
            });
            false
        }
    }
}

/// `Some(true)` for true/t/yes/1, `Some(false)` for false/f/no/0.
pub fn parse_boolean(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "t" | "yes" | "1" => Some(true),
        "false" | "f" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Compare the emoji count to "there are N" in the prompt. Other phrasings
/// are not recognised.
fn infer_from_visual(input: &ResolveInput<'_>, diagnostics: &mut Vec<Diagnostic>) -> Option<bool> {
    if !input.visual.has_emoji() {
        return None;
    }
    let claimed: usize = THERE_ARE_N
        .captures(input.question())?
        .get(1)?
        .as_str()
        .parse()
        .ok()?;
    let actual = input.visual.emoji_count;
    diagnostics.push(Diagnostic::InferredAnswer {
        detail: format!("prompt claims {claimed}, visual shows {actual}"),
    });
    Some(claimed == actual)
}

/// The prompt without its "True or False:" prefix. A separate statement is
/// only used when no prefix was stripped.
fn statement_text(question: &str, statement: Option<&str>) -> String {
    let stripped = TRUE_FALSE_PREFIXES.iter().find_map(|re| {
        re.find(question)
            .filter(|m| m.end() > 0)
            .map(|m| question[m.end()..].trim().to_string())
    });

    match stripped {
        Some(text) => text,
        None => statement
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(question.trim())
            .to_string(),
    }
}

// ---------------------------------------------------------------------------
// Fill in the blank
// ---------------------------------------------------------------------------

pub fn blank_token(position: usize) -> String {
    format!("{{{{blank_{position}}}}}")
}

pub fn resolve_fill_blank(
    input: &ResolveInput<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> FillBlankPayload {
    let question = input.question();
    let markers = blank_markers(question);
    let answers: Vec<String> = input.answer().map(RawAnswer::to_strings).unwrap_or_default();
    if answers.is_empty() {
        diagnostics.push(Diagnostic::MissingAnswer {
            variant: QuestionType::FillBlank,
        });
    }

    if markers.is_empty() {
        diagnostics.push(Diagnostic::NoBlankMarkers);
        return FillBlankPayload {
            template: format!("{} {}", question.trim_end(), blank_token(0)),
            blanks: vec![make_blank(0, answers)],
        };
    }

    // One group of accepted strings per top-level list element; a nested list
    // gives its blank several accepted answers.
    let groups: Option<Vec<Vec<String>>> = match input.answer() {
        Some(RawAnswer::List(items)) => Some(items.iter().map(RawAnswer::to_strings).collect()),
        _ => None,
    };
    if let Some(groups) = groups.as_ref().filter(|g| !g.is_empty()) {
        if groups.len() < markers.len() {
            diagnostics.push(Diagnostic::AnswerListShorter {
                blanks: markers.len(),
                answers: groups.len(),
            });
        }
    }

    let mut template = String::with_capacity(question.len());
    let mut last = 0;
    let mut blanks = Vec::with_capacity(markers.len());
    for (position, range) in markers.into_iter().enumerate() {
        template.push_str(&question[last..range.start]);
        template.push_str(&blank_token(position));
        last = range.end;

        let correct = match &groups {
            Some(groups) => groups
                .get(position)
                .or_else(|| groups.first())
                .cloned()
                .unwrap_or_default(),
            // A scalar answer fills every blank.
            None => answers.first().cloned().into_iter().collect(),
        };
        blanks.push(make_blank(position, correct));
    }
    template.push_str(&question[last..]);

    FillBlankPayload { template, blanks }
}

fn make_blank(position: usize, correct_answers: Vec<String>) -> Blank {
    Blank {
        id: format!("blank_{position}"),
        position,
        correct_answers,
        case_sensitive: false,
    }
}

// ---------------------------------------------------------------------------
// Numeric
// ---------------------------------------------------------------------------

pub fn resolve_numeric(input: &ResolveInput<'_>, diagnostics: &mut Vec<Diagnostic>) -> NumericPayload {
    let correct_answer = match input.answer().and_then(RawAnswer::first_scalar) {
        Some(RawAnswer::Number(n)) => *n,
        Some(RawAnswer::Text(s)) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            parse_number(&cleaned).unwrap_or_else(|| {
                diagnostics.push(Diagnostic::UnparseableNumber {
                    raw: s.clone(),
                    fallback: "0".into(),
                });
                0.0
            })
        }
        Some(other) => {
            diagnostics.push(Diagnostic::UnparseableNumber {
                raw: other.display(),
                fallback: "0".into(),
            });
            0.0
        }
        None => {
            diagnostics.push(Diagnostic::MissingAnswer {
                variant: QuestionType::Numeric,
            });
            0.0
        }
    };

    NumericPayload {
        correct_answer,
        tolerance: NUMERIC_TOLERANCE,
    }
}

// ---------------------------------------------------------------------------
// Short answer
// ---------------------------------------------------------------------------

pub fn resolve_short_answer(
    input: &ResolveInput<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> ShortAnswerPayload {
    let acceptable_answers: Vec<String> = input
        .answer()
        .map(RawAnswer::to_strings)
        .unwrap_or_default()
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();

    if acceptable_answers.is_empty() {
        diagnostics.push(Diagnostic::MissingAnswer {
            variant: QuestionType::ShortAnswer,
        });
    }

    ShortAnswerPayload {
        acceptable_answers,
        case_sensitive: false,
        max_length: SHORT_ANSWER_MAX_LENGTH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::normalize_visual;
    use serde_json::json;

    fn with_input<T>(raw: &RawAssessmentInput, f: impl FnOnce(&ResolveInput<'_>, &mut Vec<Diagnostic>) -> T) -> (T, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let visual = normalize_visual(raw.visual.as_ref(), &mut diagnostics);
        let input = ResolveInput::new(raw, &visual);
        let out = f(&input, &mut diagnostics);
        (out, diagnostics)
    }

    // --- counting ---

    #[test]
    fn counting_prefers_emoji_count() {
        let raw = RawAssessmentInput::new("How many 🍎 are there?")
            .with_visual("🍎🍎🍎")
            .with_options(["2", "3", "4"])
            .with_answer(0);
        let (p, d) = with_input(&raw, resolve_counting);
        assert_eq!(p.correct_count, 3);
        assert_eq!(p.count_what, "🍎");
        assert_eq!(p.min_count, 0);
        assert_eq!(p.max_count, 10);
        assert!(d.is_empty());
    }

    #[test]
    fn counting_index_into_options() {
        let raw = RawAssessmentInput::new("How many legs does a dog have?")
            .with_options(["2", "4", "6"])
            .with_answer(1);
        let (p, _) = with_input(&raw, resolve_counting);
        assert_eq!(p.correct_count, 4);
        assert_eq!(p.count_what, "legs");
    }

    #[test]
    fn counting_falls_back_to_answer_value() {
        let raw = RawAssessmentInput::new("Count the dots")
            .with_options(["many", "few"])
            .with_answer(1);
        let (p, _) = with_input(&raw, resolve_counting);
        assert_eq!(p.correct_count, 1);

        let out_of_range = RawAssessmentInput::new("Count the dots").with_answer(12);
        let (p, _) = with_input(&out_of_range, resolve_counting);
        assert_eq!(p.correct_count, 12);
        assert_eq!(p.max_count, 17);
        assert_eq!(p.count_what, "items");
    }

    #[test]
    fn counting_string_answers() {
        let raw = RawAssessmentInput::new("How many cats?").with_answer(" 7 ");
        let (p, _) = with_input(&raw, resolve_counting);
        assert_eq!(p.correct_count, 7);

        let bad = RawAssessmentInput::new("How many cats?").with_answer("seven");
        let (p, d) = with_input(&bad, resolve_counting);
        assert_eq!(p.correct_count, 0);
        assert!(matches!(d[0], Diagnostic::UnparseableNumber { .. }));
    }

    #[test]
    fn counting_negative_is_clamped() {
        let raw = RawAssessmentInput::new("How many?").with_answer(-3);
        let (p, d) = with_input(&raw, resolve_counting);
        assert_eq!(p.correct_count, 0);
        assert!(matches!(d[0], Diagnostic::ClampedCount { clamped: 0, .. }));
    }

    // --- multiple choice ---

    fn correct_indices(p: &MultipleChoicePayload) -> Vec<usize> {
        p.options
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_correct)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn multiple_choice_by_index() {
        for i in 0..4 {
            let raw = RawAssessmentInput::new("Pick")
                .with_options(["w", "x", "y", "z"])
                .with_answer(i);
            let (p, d) = with_input(&raw, resolve_multiple_choice);
            assert_eq!(correct_indices(&p), vec![i as usize]);
            assert!(d.is_empty());
        }
    }

    #[test]
    fn multiple_choice_index_with_duplicate_text() {
        let raw = RawAssessmentInput::new("Pick")
            .with_options(["same", "same", "other"])
            .with_answer(1);
        let (p, _) = with_input(&raw, resolve_multiple_choice);
        assert_eq!(correct_indices(&p), vec![1]);
    }

    #[test]
    fn multiple_choice_by_text() {
        let raw = RawAssessmentInput::new("Pick the prime number")
            .with_options(["4", "6", "7", "8"])
            .with_answer("7");
        let (p, _) = with_input(&raw, resolve_multiple_choice);
        assert_eq!(correct_indices(&p), vec![2]);
        assert_eq!(p.options[2].id, "c");
        assert!(!p.allow_multiple);
        assert!(!p.randomize_options);

        let ci = RawAssessmentInput::new("Capital?")
            .with_options(["Paris", "Rome"])
            .with_answer(" rome ");
        let (p, _) = with_input(&ci, resolve_multiple_choice);
        assert_eq!(correct_indices(&p), vec![1]);
    }

    #[test]
    fn multiple_choice_exact_before_case_insensitive() {
        let raw = RawAssessmentInput::new("Pick")
            .with_options(["apple", "Apple"])
            .with_answer("Apple");
        let (p, _) = with_input(&raw, resolve_multiple_choice);
        assert_eq!(correct_indices(&p), vec![1]);
    }

    #[test]
    fn multiple_choice_letter_answer_is_not_an_index() {
        let raw = RawAssessmentInput::new("Which is a primary color?")
            .with_options(["red", "green", "blue"])
            .with_answer("B");
        let (p, d) = with_input(&raw, resolve_multiple_choice);
        assert!(correct_indices(&p).is_empty());
        assert_eq!(
            d,
            vec![Diagnostic::UnresolvedAnswer {
                variant: QuestionType::MultipleChoice,
                raw: "B".into()
            }]
        );

        let literal = RawAssessmentInput::new("Which letter is a vowel?")
            .with_options(["b", "A", "c"])
            .with_answer("a");
        let (p, _) = with_input(&literal, resolve_multiple_choice);
        assert_eq!(correct_indices(&p), vec![1]);
    }

    #[test]
    fn multiple_choice_unresolved_marks_nothing() {
        let raw = RawAssessmentInput::new("Pick")
            .with_options(["red", "green", "blue"])
            .with_answer("purple");
        let (p, d) = with_input(&raw, resolve_multiple_choice);
        assert!(correct_indices(&p).is_empty());
        assert_eq!(p.options.len(), 3);
        assert!(p.correct_option().is_none());
        assert!(d.iter().any(|d| matches!(d, Diagnostic::UnresolvedAnswer { .. })));
    }

    #[test]
    fn multiple_choice_number_out_of_range_matches_value() {
        let raw = RawAssessmentInput::new("What is 5 + 5?")
            .with_options([json!(8), json!(10), json!(12)])
            .with_answer(10);
        let (p, _) = with_input(&raw, resolve_multiple_choice);
        assert_eq!(correct_indices(&p), vec![1]);

        let missing = RawAssessmentInput::new("Pick").with_options(["a", "b"]).with_answer(9);
        let (p, d) = with_input(&missing, resolve_multiple_choice);
        assert!(correct_indices(&p).is_empty());
        assert!(d.contains(&Diagnostic::IndexOutOfRange { index: 9, len: 2 }));
    }

    // --- true / false ---

    #[test]
    fn true_false_string_forms() {
        for s in ["true", "T", "YES", "1", " True "] {
            let raw = RawAssessmentInput::new("Statement").with_answer(s);
            let (p, _) = with_input(&raw, resolve_true_false);
            assert!(p.correct_answer, "{s} should be true");
        }
        for s in ["false", "no", "0", "F"] {
            let raw = RawAssessmentInput::new("Statement").with_answer(s);
            let (p, d) = with_input(&raw, resolve_true_false);
            assert!(!p.correct_answer);
            assert!(d.is_empty());
        }
        let raw = RawAssessmentInput::new("Statement").with_answer("maybe");
        let (p, d) = with_input(&raw, resolve_true_false);
        assert!(!p.correct_answer);
        assert_eq!(d, vec![Diagnostic::UnrecognizedBoolean { raw: "maybe".into() }]);
    }

    #[test]
    fn true_false_numeric_forms() {
        let with_options = RawAssessmentInput::new("The sky is green.")
            .with_options(["True", "False"])
            .with_answer(1);
        assert!(!with_input(&with_options, resolve_true_false).0.correct_answer);

        let reversed = RawAssessmentInput::new("The sky is blue.")
            .with_options(["False", "True"])
            .with_answer(1);
        assert!(with_input(&reversed, resolve_true_false).0.correct_answer);

        let yes_no = RawAssessmentInput::new("Birds have feathers.")
            .with_type("true_false")
            .with_options(["Yes", "No"])
            .with_answer(0);
        let (p, d) = with_input(&yes_no, resolve_true_false);
        assert!(p.correct_answer);
        assert!(d.is_empty());

        let odd_option = RawAssessmentInput::new("Birds have feathers.")
            .with_options(["Agree", "Disagree"])
            .with_answer(0);
        let (p, d) = with_input(&odd_option, resolve_true_false);
        assert!(!p.correct_answer);
        assert_eq!(d, vec![Diagnostic::UnrecognizedBoolean { raw: "Agree".into() }]);

        let bare_zero = RawAssessmentInput::new("The sky is blue.").with_answer(0);
        assert!(with_input(&bare_zero, resolve_true_false).0.correct_answer);

        let bare_one = RawAssessmentInput::new("The sky is green.").with_answer(1);
        assert!(!with_input(&bare_one, resolve_true_false).0.correct_answer);
    }

    #[test]
    fn true_false_inferred_from_visual() {
        let raw = RawAssessmentInput::new("There are 3 stars.").with_visual("⭐⭐⭐");
        let (p, d) = with_input(&raw, resolve_true_false);
        assert!(p.correct_answer);
        assert!(matches!(d[0], Diagnostic::InferredAnswer { .. }));

        let wrong = RawAssessmentInput::new("True or False: there is 1 dog").with_visual("🐶🐶");
        assert!(!with_input(&wrong, resolve_true_false).0.correct_answer);

        let unmatched = RawAssessmentInput::new("Three stars are shown.").with_visual("⭐⭐⭐");
        let (p, d) = with_input(&unmatched, resolve_true_false);
        assert!(!p.correct_answer);
        assert_eq!(
            d,
            vec![Diagnostic::MissingAnswer {
                variant: QuestionType::TrueFalse
            }]
        );
    }

    #[test]
    fn statement_prefix_stripping() {
        assert_eq!(
            statement_text("True or False: Cats are mammals.", None),
            "Cats are mammals."
        );
        assert_eq!(statement_text("T/F: Fish fly.", None), "Fish fly.");
        assert_eq!(
            statement_text("Is it true that: the moon is cheese?", None),
            "the moon is cheese?"
        );
        assert_eq!(
            statement_text("true/false - Ice is cold", Some("ignored")),
            "Ice is cold"
        );
        assert_eq!(
            statement_text("Decide whether this holds.", Some("Ice is cold.")),
            "Ice is cold."
        );
        assert_eq!(statement_text("Ice is cold.", Some("  ")), "Ice is cold.");
    }

    // --- fill blank ---

    #[test]
    fn fill_blank_single_marker() {
        let raw = RawAssessmentInput::new("The capital of France is ____.").with_answer("Paris");
        let (p, d) = with_input(&raw, resolve_fill_blank);
        assert_eq!(p.template, "The capital of France is {{blank_0}}.");
        assert_eq!(p.blanks.len(), 1);
        assert_eq!(p.blanks[0].correct_answers, vec!["Paris"]);
        assert_eq!(p.blanks[0].id, "blank_0");
        assert!(!p.blanks[0].case_sensitive);
        assert!(d.is_empty());
    }

    #[test]
    fn fill_blank_list_shorter_than_blanks() {
        let raw = RawAssessmentInput::new("___ + ___ = ___").with_answer(json!(["2", "3"]));
        let (p, d) = with_input(&raw, resolve_fill_blank);
        assert_eq!(p.template, "{{blank_0}} + {{blank_1}} = {{blank_2}}");
        assert_eq!(p.blanks[0].correct_answers, vec!["2"]);
        assert_eq!(p.blanks[1].correct_answers, vec!["3"]);
        assert_eq!(p.blanks[2].correct_answers, vec!["2"]);
        assert_eq!(p.blanks[2].position, 2);
        assert_eq!(d, vec![Diagnostic::AnswerListShorter { blanks: 3, answers: 2 }]);
    }

    #[test]
    fn fill_blank_nested_list_gives_alternatives_per_blank() {
        let raw = RawAssessmentInput::new("___ is in France and ___ is in Italy.")
            .with_answer(json!([["Paris", "paris"], "Rome"]));
        let (p, d) = with_input(&raw, resolve_fill_blank);
        assert_eq!(p.blanks[0].correct_answers, vec!["Paris", "paris"]);
        assert_eq!(p.blanks[1].correct_answers, vec!["Rome"]);
        assert!(d.is_empty());

        let short = RawAssessmentInput::new("___, ___ and ___")
            .with_answer(json!([["one", "1"], "two"]));
        let (p, d) = with_input(&short, resolve_fill_blank);
        assert_eq!(p.blanks[2].correct_answers, vec!["one", "1"]);
        assert_eq!(d, vec![Diagnostic::AnswerListShorter { blanks: 3, answers: 2 }]);
    }

    #[test]
    fn fill_blank_scalar_fills_every_blank() {
        let raw = RawAssessmentInput::new("___ and ___ rhyme with cat").with_answer("hat");
        let (p, _) = with_input(&raw, resolve_fill_blank);
        assert!(p.blanks.iter().all(|b| b.correct_answers == vec!["hat"]));
    }

    #[test]
    fn fill_blank_without_markers_synthesizes_one() {
        let raw = RawAssessmentInput::new("Name the largest planet.")
            .with_answer(json!(["Jupiter", "jupiter"]));
        let (p, d) = with_input(&raw, resolve_fill_blank);
        assert_eq!(p.blanks.len(), 1);
        assert_eq!(p.blanks[0].position, 0);
        assert_eq!(p.blanks[0].correct_answers, vec!["Jupiter", "jupiter"]);
        assert_eq!(p.template, "Name the largest planet. {{blank_0}}");
        assert_eq!(d, vec![Diagnostic::NoBlankMarkers]);
    }

    // --- numeric ---

    #[test]
    fn numeric_parsing() {
        let raw = RawAssessmentInput::new("Cost?").with_answer("$1,234.50");
        let (p, _) = with_input(&raw, resolve_numeric);
        assert_eq!(p.correct_answer, 1234.5);
        assert_eq!(p.tolerance, NUMERIC_TOLERANCE);

        let neg = RawAssessmentInput::new("Temp?").with_answer("-4 degrees");
        assert_eq!(with_input(&neg, resolve_numeric).0.correct_answer, -4.0);

        let native = RawAssessmentInput::new("Half?").with_answer(0.5);
        assert_eq!(with_input(&native, resolve_numeric).0.correct_answer, 0.5);

        let bad = RawAssessmentInput::new("Cost?").with_answer("unknown");
        let (p, d) = with_input(&bad, resolve_numeric);
        assert_eq!(p.correct_answer, 0.0);
        assert!(matches!(d[0], Diagnostic::UnparseableNumber { .. }));
    }

    // --- short answer ---

    #[test]
    fn short_answer_normalization() {
        let scalar = RawAssessmentInput::new("Color?").with_answer("red");
        let (p, _) = with_input(&scalar, resolve_short_answer);
        assert_eq!(p.acceptable_answers, vec!["red"]);
        assert_eq!(p.max_length, SHORT_ANSWER_MAX_LENGTH);
        assert!(!p.case_sensitive);

        let list = RawAssessmentInput::new("Color?").with_answer(json!(["red", " crimson ", "", 7]));
        let (p, _) = with_input(&list, resolve_short_answer);
        assert_eq!(p.acceptable_answers, vec!["red", "crimson", "7"]);

        let none = RawAssessmentInput::new("Color?");
        let (p, d) = with_input(&none, resolve_short_answer);
        assert!(p.acceptable_answers.is_empty());
        assert_eq!(d.len(), 1);
    }
}
