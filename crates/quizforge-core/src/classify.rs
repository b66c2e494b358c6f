//! Question type classification.
//!
//! The rules are an ordered table evaluated top-down; the first rule that
//! returns a type wins. The two counting overrides sit above the explicit
//! `type` field so that emoji-counted visuals and numeric-only options beat
//! whatever label the generator attached.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Diagnostic;
use crate::input::{parse_number, RawAnswer, RawAssessmentInput, SkillInfo};
use crate::media::NormalizedVisual;
use crate::model::QuestionType;

/// Idioms that mark a counting question.
pub const COUNTING_IDIOMS: [&str; 6] = [
    "how many",
    "count",
    "total number",
    "how much",
    "find the number",
    "what is the number",
];

static BLANK_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_{3,}").expect("blank marker pattern is valid"));

static TRUE_FALSE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:true\s*(?:or|/)\s*false|t\s*/\s*f|is\s+it\s+true\s+that)\b")
        .expect("true/false prefix pattern is valid")
});

/// Everything the rules look at, computed once per item.
#[derive(Debug)]
pub struct Signals<'a> {
    pub counting_pattern: bool,
    pub explicit_type: Option<QuestionType>,
    pub visual: &'a NormalizedVisual,
    pub options: Vec<String>,
    pub answer: Option<&'a RawAnswer>,
    pub skill: &'a SkillInfo,
    pub question: &'a str,
}

impl<'a> Signals<'a> {
    pub fn collect(
        raw: &'a RawAssessmentInput,
        skill: &'a SkillInfo,
        visual: &'a NormalizedVisual,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Self {
        let explicit_type = raw
            .question_type
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .and_then(|t| match t.parse::<QuestionType>() {
                Ok(parsed) => Some(parsed),
                Err(_) => {
                    diagnostics.push(Diagnostic::UnknownType {
                        name: t.trim().to_string(),
                    });
                    None
                }
            });

        Self {
            counting_pattern: has_counting_pattern(&raw.question),
            explicit_type,
            visual,
            options: raw.option_texts(),
            answer: raw.correct_answer.as_ref(),
            skill,
            question: &raw.question,
        }
    }
}

/// A named classification rule.
pub struct ClassificationRule {
    pub name: &'static str,
    pub apply: fn(&Signals<'_>) -> Option<QuestionType>,
}

/// Classification rules in precedence order.
pub static RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "counting_emoji_visual",
        apply: counting_emoji_visual,
    },
    ClassificationRule {
        name: "counting_numeric_options",
        apply: counting_numeric_options,
    },
    ClassificationRule {
        name: "explicit_type",
        apply: explicit_type,
    },
    ClassificationRule {
        name: "early_math_visual",
        apply: early_math_visual,
    },
    ClassificationRule {
        name: "fill_blank_marker",
        apply: fill_blank_marker,
    },
    ClassificationRule {
        name: "true_false_shape",
        apply: true_false_shape,
    },
    ClassificationRule {
        name: "options_present",
        apply: options_present,
    },
    ClassificationRule {
        name: "math_numeric_answer",
        apply: math_numeric_answer,
    },
    ClassificationRule {
        name: "fallback",
        apply: fallback,
    },
];

fn counting_emoji_visual(s: &Signals<'_>) -> Option<QuestionType> {
    (s.counting_pattern && s.visual.has_emoji()).then_some(QuestionType::Counting)
}

fn counting_numeric_options(s: &Signals<'_>) -> Option<QuestionType> {
    let numeric = !s.options.is_empty() && s.options.iter().all(|o| parse_number(o).is_some());
    (s.counting_pattern && numeric).then_some(QuestionType::Counting)
}

fn explicit_type(s: &Signals<'_>) -> Option<QuestionType> {
    s.explicit_type
}

fn early_math_visual(s: &Signals<'_>) -> Option<QuestionType> {
    (s.skill.is_math() && s.skill.is_early_grade() && s.visual.present)
        .then_some(QuestionType::Counting)
}

fn fill_blank_marker(s: &Signals<'_>) -> Option<QuestionType> {
    has_blank_marker(s.question).then_some(QuestionType::FillBlank)
}

// Two options including "true". Without options, a "True or False:" style
// prompt or a native boolean answer.
fn true_false_shape(s: &Signals<'_>) -> Option<QuestionType> {
    let two_options =
        s.options.len() == 2 && s.options.iter().any(|o| o.trim().eq_ignore_ascii_case("true"));
    let optionless = s.options.is_empty()
        && (TRUE_FALSE_PREFIX.is_match(s.question)
            || matches!(s.answer, Some(RawAnswer::Bool(_))));
    (two_options || optionless).then_some(QuestionType::TrueFalse)
}

fn options_present(s: &Signals<'_>) -> Option<QuestionType> {
    (!s.options.is_empty()).then_some(QuestionType::MultipleChoice)
}

fn math_numeric_answer(s: &Signals<'_>) -> Option<QuestionType> {
    let numeric = s.answer.and_then(RawAnswer::as_number).is_some();
    (s.skill.is_math() && numeric).then_some(QuestionType::Numeric)
}

fn fallback(_: &Signals<'_>) -> Option<QuestionType> {
    Some(QuestionType::ShortAnswer)
}

/// The chosen type and the rule that chose it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub question_type: QuestionType,
    pub rule: &'static str,
}

/// Evaluate `RULES` top-down and return the first match.
pub fn classify(signals: &Signals<'_>) -> Classification {
    let classification = RULES
        .iter()
        .find_map(|rule| {
            (rule.apply)(signals).map(|question_type| Classification {
                question_type,
                rule: rule.name,
            })
        })
        .unwrap_or(Classification {
            question_type: QuestionType::ShortAnswer,
            rule: "fallback",
        });

    if let Some(explicit) = signals.explicit_type {
        if explicit != classification.question_type {
            tracing::debug!(
                explicit = %explicit,
                chosen = %classification.question_type,
                rule = classification.rule,
                "explicit type overridden"
            );
        }
    }
    tracing::debug!(
        question_type = %classification.question_type,
        rule = classification.rule,
        "classified item"
    );

    classification
}

pub fn has_counting_pattern(question: &str) -> bool {
    let lowered = question.to_lowercase();
    COUNTING_IDIOMS.iter().any(|idiom| lowered.contains(idiom))
}

pub fn has_blank_marker(question: &str) -> bool {
    BLANK_MARKER.is_match(question)
}

/// Byte ranges of every blank marker, left to right.
pub fn blank_markers(question: &str) -> Vec<std::ops::Range<usize>> {
    BLANK_MARKER.find_iter(question).map(|m| m.range()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::normalize_visual;
    use serde_json::json;

    fn run(raw: &RawAssessmentInput, skill: &SkillInfo) -> Classification {
        let mut diagnostics = Vec::new();
        let visual = normalize_visual(raw.visual.as_ref(), &mut diagnostics);
        let signals = Signals::collect(raw, skill, &visual, &mut diagnostics);
        classify(&signals)
    }

    fn math(grade: &str) -> SkillInfo {
        SkillInfo::new("Math", grade)
    }

    #[test]
    fn emoji_visual_overrides_explicit_type() {
        let raw = RawAssessmentInput::new("How many 🍎 are there?")
            .with_type("multiple_choice")
            .with_visual("🍎🍎🍎")
            .with_options(["2", "3", "4"])
            .with_answer(1);
        let c = run(&raw, &math("1"));
        assert_eq!(c.question_type, QuestionType::Counting);
        assert_eq!(c.rule, "counting_emoji_visual");
    }

    #[test]
    fn numeric_options_override_explicit_type() {
        let raw = RawAssessmentInput::new("Count the stars in the picture")
            .with_type("multiple_choice")
            .with_options([json!(4), json!("5"), json!(6)]);
        let c = run(&raw, &math("3"));
        assert_eq!(c.question_type, QuestionType::Counting);
        assert_eq!(c.rule, "counting_numeric_options");
    }

    #[test]
    fn explicit_type_trusted_without_override() {
        for t in QuestionType::ALL {
            let raw = RawAssessmentInput::new("Describe the water cycle")
                .with_type(t.as_str())
                .with_options(["evaporation", "condensation"]);
            assert_eq!(run(&raw, &SkillInfo::new("Science", "5")).question_type, t);
        }
    }

    #[test]
    fn unknown_explicit_type_is_ignored() {
        let raw = RawAssessmentInput::new("Pick one")
            .with_type("mcq")
            .with_options(["a", "b", "c"]);
        let mut diagnostics = Vec::new();
        let visual = NormalizedVisual::absent();
        let skill = SkillInfo::default();
        let signals = Signals::collect(&raw, &skill, &visual, &mut diagnostics);
        assert_eq!(classify(&signals).question_type, QuestionType::MultipleChoice);
        assert_eq!(diagnostics, vec![Diagnostic::UnknownType { name: "mcq".into() }]);
    }

    #[test]
    fn early_math_with_visual_is_counting() {
        let raw = RawAssessmentInput::new("Look at the shapes")
            .with_visual(json!({"text": "three triangles"}))
            .with_answer(3);
        assert_eq!(run(&raw, &math("K")).question_type, QuestionType::Counting);
        assert_eq!(run(&raw, &math("4")).question_type, QuestionType::Numeric);
    }

    #[test]
    fn sentinel_visual_does_not_count_as_present() {
        let raw = RawAssessmentInput::new("Look at the shapes")
            .with_visual("❓")
            .with_answer("circle");
        assert_eq!(run(&raw, &math("1")).question_type, QuestionType::ShortAnswer);
    }

    #[test]
    fn fill_blank_detection() {
        let raw = RawAssessmentInput::new("The capital of France is ____.").with_answer("Paris");
        let c = run(&raw, &SkillInfo::default());
        assert_eq!(c.question_type, QuestionType::FillBlank);
        assert!(!has_blank_marker("only __ two"));
    }

    #[test]
    fn true_false_detection() {
        let two = RawAssessmentInput::new("The sun is a star.")
            .with_options(["True", "False"])
            .with_answer(0);
        assert_eq!(run(&two, &SkillInfo::default()).question_type, QuestionType::TrueFalse);

        let prefixed = RawAssessmentInput::new("True or False: Cats are mammals.").with_answer("true");
        assert_eq!(
            run(&prefixed, &SkillInfo::default()).question_type,
            QuestionType::TrueFalse
        );

        let boolean = RawAssessmentInput::new("Water boils at 100C at sea level.").with_answer(true);
        assert_eq!(run(&boolean, &SkillInfo::default()).question_type, QuestionType::TrueFalse);

        let prefixed_with_options =
            RawAssessmentInput::new("Is it true that plants need sunlight? Choose the best reason.")
                .with_options(["They make food", "They stay warm", "They sleep", "They swim"])
                .with_answer(0);
        let c = run(&prefixed_with_options, &SkillInfo::default());
        assert_eq!(c.question_type, QuestionType::MultipleChoice);
        assert_eq!(c.rule, "options_present");

        let boolean_with_options = RawAssessmentInput::new("Is the statement correct?")
            .with_options(["true", "false", "unknown"])
            .with_answer(true);
        assert_eq!(
            run(&boolean_with_options, &SkillInfo::default()).question_type,
            QuestionType::MultipleChoice
        );

        let yes_no = RawAssessmentInput::new("Is it raining?").with_options(["Yes", "No"]);
        assert_eq!(
            run(&yes_no, &SkillInfo::default()).question_type,
            QuestionType::MultipleChoice
        );
    }

    #[test]
    fn default_chain() {
        let mc = RawAssessmentInput::new("Pick the prime number")
            .with_options(["4", "6", "7", "8"])
            .with_answer("7");
        assert_eq!(run(&mc, &math("5")).question_type, QuestionType::MultipleChoice);

        let numeric = RawAssessmentInput::new("What is 6 x 7?").with_answer("42");
        assert_eq!(run(&numeric, &math("4")).question_type, QuestionType::Numeric);
        assert_eq!(
            run(&numeric, &SkillInfo::new("ELA", "4")).question_type,
            QuestionType::ShortAnswer
        );

        let short = RawAssessmentInput::new("Name a primary color").with_answer("red");
        let c = run(&short, &math("4"));
        assert_eq!(c.question_type, QuestionType::ShortAnswer);
        assert_eq!(c.rule, "fallback");
    }

    #[test]
    fn counting_idioms() {
        assert!(has_counting_pattern("HOW MANY legs does a spider have?"));
        assert!(has_counting_pattern("Find the number of sides"));
        assert!(!has_counting_pattern("Pick the prime number"));
    }

    #[test]
    fn blank_marker_ranges() {
        let ranges = blank_markers("___ plus _____ is ___");
        assert_eq!(ranges, vec![0..3, 9..14, 18..21]);
    }
}
