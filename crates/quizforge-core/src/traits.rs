//! Observation hooks for the conversion engine.
//!
//! Observers see every classification decision and diagnostic. They return
//! nothing, so an observer can never change what the engine produces.

use std::sync::Mutex;
use std::time::Duration;

use crate::classify::Classification;
use crate::error::Diagnostic;
use crate::model::{Question, QuestionType};

/// Receives conversion events.
pub trait ConversionObserver: Send + Sync {
    fn on_classified(&self, question_id: &str, classification: &Classification);
    fn on_diagnostic(&self, question_id: &str, diagnostic: &Diagnostic);
    fn on_item_converted(&self, question: &Question);
    fn on_batch_complete(&self, total: usize, with_diagnostics: usize, elapsed: Duration);
}

/// No-op observer.
pub struct NoopObserver;

impl ConversionObserver for NoopObserver {
    fn on_classified(&self, _: &str, _: &Classification) {}
    fn on_diagnostic(&self, _: &str, _: &Diagnostic) {}
    fn on_item_converted(&self, _: &Question) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: Duration) {}
}

/// Forwards events to `tracing` at debug/info level.
pub struct TracingObserver;

impl ConversionObserver for TracingObserver {
    fn on_classified(&self, question_id: &str, classification: &Classification) {
        tracing::debug!(
            id = question_id,
            rule = classification.rule,
            "classified as {}",
            classification.question_type
        );
    }

    fn on_diagnostic(&self, question_id: &str, diagnostic: &Diagnostic) {
        tracing::debug!(id = question_id, kind = ?diagnostic, "diagnostic");
    }

    fn on_item_converted(&self, question: &Question) {
        tracing::debug!(id = %question.id, points = question.points, "converted");
    }

    fn on_batch_complete(&self, total: usize, with_diagnostics: usize, elapsed: Duration) {
        tracing::info!(
            total,
            with_diagnostics,
            elapsed_ms = elapsed.as_millis() as u64,
            "batch converted"
        );
    }
}

/// An event captured by `RecordingObserver`.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservedEvent {
    Classified {
        question_id: String,
        classification: Classification,
    },
    Diagnostic {
        question_id: String,
        diagnostic: Diagnostic,
    },
    Converted {
        question_id: String,
        question_type: QuestionType,
    },
    BatchComplete {
        total: usize,
        with_diagnostics: usize,
    },
}

/// Collects events in memory, for tests and offline review.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn push(&self, event: ObservedEvent) {
        // A poisoned lock only loses the event.
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl ConversionObserver for RecordingObserver {
    fn on_classified(&self, question_id: &str, classification: &Classification) {
        self.push(ObservedEvent::Classified {
            question_id: question_id.to_string(),
            classification: *classification,
        });
    }

    fn on_diagnostic(&self, question_id: &str, diagnostic: &Diagnostic) {
        self.push(ObservedEvent::Diagnostic {
            question_id: question_id.to_string(),
            diagnostic: diagnostic.clone(),
        });
    }

    fn on_item_converted(&self, question: &Question) {
        self.push(ObservedEvent::Converted {
            question_id: question.id.clone(),
            question_type: question.question_type(),
        });
    }

    fn on_batch_complete(&self, total: usize, with_diagnostics: usize, _: Duration) {
        self.push(ObservedEvent::BatchComplete {
            total,
            with_diagnostics,
        });
    }
}

impl<T: ConversionObserver + ?Sized> ConversionObserver for std::sync::Arc<T> {
    fn on_classified(&self, question_id: &str, classification: &Classification) {
        (**self).on_classified(question_id, classification);
    }

    fn on_diagnostic(&self, question_id: &str, diagnostic: &Diagnostic) {
        (**self).on_diagnostic(question_id, diagnostic);
    }

    fn on_item_converted(&self, question: &Question) {
        (**self).on_item_converted(question);
    }

    fn on_batch_complete(&self, total: usize, with_diagnostics: usize, elapsed: Duration) {
        (**self).on_batch_complete(total, with_diagnostics, elapsed);
    }
}
