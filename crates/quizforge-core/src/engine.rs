//! Conversion engine.
//!
//! Runs classifier → normalizer → resolver → builder for one item, and the
//! same pipeline per item for batches. The only state is the id counter,
//! which is atomic so one engine can be shared across threads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use uuid::Uuid;

use crate::build::build_question;
use crate::classify::{classify, Signals};
use crate::error::Diagnostic;
use crate::input::{RawAssessmentInput, SkillInfo};
use crate::media::normalize_visual;
use crate::model::Question;
use crate::report::{ConversionReport, ConversionSummary, ItemOutcome};
use crate::resolve::{resolve, ResolveInput};
use crate::traits::{ConversionObserver, NoopObserver};

/// Configuration for the conversion engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Prefix for ids of individually converted questions.
    pub id_prefix: String,
    /// Prefix for positional batch ids.
    pub batch_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            id_prefix: "q".to_string(),
            batch_prefix: "item".to_string(),
        }
    }
}

/// A converted question together with how it was derived.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub question: Question,
    /// Name of the classification rule that fired.
    pub rule: &'static str,
    pub diagnostics: Vec<Diagnostic>,
}

/// The conversion engine.
pub struct ConversionEngine {
    config: EngineConfig,
    counter: AtomicU64,
    observer: Box<dyn ConversionObserver>,
}

impl Default for ConversionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl ConversionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            counter: AtomicU64::new(0),
            observer: Box::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: impl ConversionObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Start the id counter at `start` instead of zero.
    pub fn with_counter_start(self, start: u64) -> Self {
        self.counter.store(start, Ordering::SeqCst);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn reset_counter(&self) {
        self.counter.store(0, Ordering::SeqCst);
    }

    /// `{prefix}-{unix_millis}-{counter}`, unique for this engine.
    pub fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let millis = chrono::Utc::now().timestamp_millis();
        format!("{}-{millis}-{n}", self.config.id_prefix)
    }

    /// Convert one raw item. Never fails; diagnostics are logged.
    pub fn convert(&self, raw: &RawAssessmentInput, skill: &SkillInfo) -> Question {
        self.convert_with_diagnostics(raw, skill).question
    }

    /// Convert one raw item and keep the diagnostics.
    pub fn convert_with_diagnostics(&self, raw: &RawAssessmentInput, skill: &SkillInfo) -> Conversion {
        let id = self.next_id();
        self.convert_as(id, raw, skill, false)
    }

    fn convert_as(
        &self,
        id: String,
        raw: &RawAssessmentInput,
        skill: &SkillInfo,
        attach_hint: bool,
    ) -> Conversion {
        let mut diagnostics = Vec::new();

        let visual = normalize_visual(raw.visual.as_ref(), &mut diagnostics);
        let signals = Signals::collect(raw, skill, &visual, &mut diagnostics);
        let classification = classify(&signals);
        self.observer.on_classified(&id, &classification);

        let input = ResolveInput::new(raw, &visual);
        let kind = resolve(classification.question_type, &input, &mut diagnostics);
        let mut question = build_question(id, kind, raw, skill, &visual);
        if attach_hint {
            if let Some(hint) = raw.hint.as_deref().map(str::trim).filter(|h| !h.is_empty()) {
                question.hints = Some(vec![hint.to_string()]);
            }
        }

        for diagnostic in &diagnostics {
            tracing::warn!(
                id = %question.id,
                question_type = %classification.question_type,
                question = %raw.question,
                answer = ?raw.correct_answer,
                "{diagnostic}"
            );
            self.observer.on_diagnostic(&question.id, diagnostic);
        }
        self.observer.on_item_converted(&question);

        Conversion {
            question,
            rule: classification.rule,
            diagnostics,
        }
    }

    /// Convert items in order with positional ids `{prefix}-{index}`. Each
    /// item's hint becomes a single-element hint list.
    pub fn convert_batch(
        &self,
        items: &[RawAssessmentInput],
        skill: &SkillInfo,
        prefix: &str,
    ) -> Vec<Question> {
        self.convert_batch_detailed(items, skill, prefix)
            .into_iter()
            .map(|c| c.question)
            .collect()
    }

    /// Like `convert_batch`, but keep per-item rules and diagnostics.
    pub fn convert_batch_detailed(
        &self,
        items: &[RawAssessmentInput],
        skill: &SkillInfo,
        prefix: &str,
    ) -> Vec<Conversion> {
        let start = Instant::now();

        let conversions: Vec<Conversion> = items
            .iter()
            .enumerate()
            .map(|(index, raw)| self.convert_as(format!("{prefix}-{index}"), raw, skill, true))
            .collect();

        let with_diagnostics = conversions
            .iter()
            .filter(|c| !c.diagnostics.is_empty())
            .count();
        self.observer
            .on_batch_complete(conversions.len(), with_diagnostics, start.elapsed());

        conversions
    }

    /// Convert a batch and assemble a full report.
    pub fn convert_batch_report(
        &self,
        items: &[RawAssessmentInput],
        skill: &SkillInfo,
        source: &str,
    ) -> ConversionReport {
        let start = Instant::now();
        let conversions = self.convert_batch_detailed(items, skill, &self.config.batch_prefix);

        let outcomes: Vec<ItemOutcome> = conversions
            .iter()
            .enumerate()
            .map(|(index, c)| ItemOutcome {
                index,
                question_id: c.question.id.clone(),
                question_type: c.question.question_type(),
                rule: c.rule.to_string(),
                diagnostics: c.diagnostics.clone(),
            })
            .collect();

        ConversionReport {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            source: source.to_string(),
            skill_info: skill.clone(),
            summary: ConversionSummary::from_items(&outcomes),
            questions: conversions.into_iter().map(|c| c.question).collect(),
            items: outcomes,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionKind, QuestionType};
    use crate::traits::{ObservedEvent, RecordingObserver};
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn ids_are_unique_and_prefixed() {
        let engine = ConversionEngine::default();
        let raw = RawAssessmentInput::new("Name a color").with_answer("red");
        let ids: HashSet<String> = (0..50)
            .map(|_| engine.convert(&raw, &SkillInfo::default()).id)
            .collect();
        assert_eq!(ids.len(), 50);
        assert!(ids.iter().all(|id| id.starts_with("q-")));
    }

    #[test]
    fn counter_seed_and_reset() {
        let engine = ConversionEngine::new(EngineConfig {
            id_prefix: "practice".into(),
            ..Default::default()
        })
        .with_counter_start(41);
        assert!(engine.next_id().ends_with("-41"));
        assert!(engine.next_id().ends_with("-42"));
        engine.reset_counter();
        let id = engine.next_id();
        assert!(id.starts_with("practice-"));
        assert!(id.ends_with("-0"));
    }

    #[test]
    fn batch_ids_hints_and_order() {
        let engine = ConversionEngine::default();
        let items = vec![
            RawAssessmentInput::new("Name a color").with_answer("red").with_hint("Look up"),
            RawAssessmentInput::new("Pick one")
                .with_options(["a", "b"])
                .with_answer("b"),
            RawAssessmentInput::new("Fill ___ in").with_answer("x").with_hint("   "),
        ];

        let questions = engine.convert_batch(&items, &SkillInfo::default(), "lesson");

        let ids: Vec<&str> = questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["lesson-0", "lesson-1", "lesson-2"]);
        assert_eq!(questions[0].hints, Some(vec!["Look up".to_string()]));
        assert!(questions[1].hints.is_none());
        assert!(questions[2].hints.is_none());
        assert_eq!(questions[1].question_type(), QuestionType::MultipleChoice);
        assert_eq!(questions[2].question_type(), QuestionType::FillBlank);
    }

    #[test]
    fn single_conversion_has_no_hints() {
        let engine = ConversionEngine::default();
        let raw = RawAssessmentInput::new("Name a color").with_answer("red").with_hint("sky");
        assert!(engine.convert(&raw, &SkillInfo::default()).hints.is_none());
    }

    #[test]
    fn malformed_item_does_not_abort_batch() {
        let engine = ConversionEngine::default();
        let items: Vec<RawAssessmentInput> = vec![
            serde_json::from_value(serde_json::json!({"visual": [1, 2], "options": 5})).unwrap(),
            RawAssessmentInput::new("What is 3 + 4?").with_answer("7"),
        ];
        let report = engine.convert_batch_report(&items, &SkillInfo::new("Math", "3"), "inline");

        assert_eq!(report.questions.len(), 2);
        assert_eq!(report.questions[0].question_type(), QuestionType::ShortAnswer);
        assert!(!report.items[0].diagnostics.is_empty());
        assert!(matches!(
            report.questions[1].kind,
            QuestionKind::Numeric(ref p) if p.correct_answer == 7.0
        ));
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.items[1].rule, "math_numeric_answer");
    }

    #[test]
    fn observer_sees_classification_and_diagnostics() {
        let observer = Arc::new(RecordingObserver::new());
        let engine = ConversionEngine::default().with_observer(Arc::clone(&observer));
        let raw = RawAssessmentInput::new("Pick")
            .with_options(["red", "blue"])
            .with_answer("green");

        engine.convert_batch(&[raw], &SkillInfo::default(), "b");

        let events = observer.events();
        assert!(matches!(
            &events[0],
            ObservedEvent::Classified { question_id, classification }
                if question_id == "b-0" && classification.rule == "options_present"
        ));
        assert!(events
            .iter()
            .any(|e| matches!(e, ObservedEvent::Diagnostic { .. })));
        assert_eq!(
            events.last(),
            Some(&ObservedEvent::BatchComplete {
                total: 1,
                with_diagnostics: 1
            })
        );
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        let engine = Arc::new(ConversionEngine::default());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || {
                    (0..25)
                        .map(|_| engine.next_id())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let ids: HashSet<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        assert_eq!(ids.len(), 100);
    }
}
