//! Question assembly.

use crate::input::{RawAssessmentInput, SkillInfo};
use crate::media::NormalizedVisual;
use crate::model::{Difficulty, Question, QuestionKind, QuestionMetadata};

/// Wrap a resolved payload in the common envelope.
pub fn build_question(
    id: String,
    kind: QuestionKind,
    raw: &RawAssessmentInput,
    skill: &SkillInfo,
    visual: &NormalizedVisual,
) -> Question {
    let question_type = kind.question_type();
    Question {
        id,
        kind,
        content: raw.question.clone(),
        topic: skill.skill_name.clone(),
        subject: skill.subject.clone(),
        difficulty: Difficulty::from_skill(skill),
        points: question_type.default_points(),
        explanation: non_empty(raw.explanation.as_deref()),
        hints: None,
        media: visual.to_media(),
        metadata: QuestionMetadata::for_type(question_type),
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}
