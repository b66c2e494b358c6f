//! Conversion report types with JSON persistence.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Diagnostic;
use crate::input::SkillInfo;
use crate::model::{Question, QuestionType};

/// A complete batch conversion report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Where the batch came from (file path or caller label).
    pub source: String,
    /// Context the batch was converted with.
    pub skill_info: SkillInfo,
    /// Canonical questions, in input order.
    pub questions: Vec<Question>,
    /// Per-item classification and diagnostics, in input order.
    pub items: Vec<ItemOutcome>,
    /// Aggregate counts.
    pub summary: ConversionSummary,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// How a single item was converted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub index: usize,
    pub question_id: String,
    pub question_type: QuestionType,
    /// Name of the classification rule that fired.
    pub rule: String,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

/// Aggregate counts over a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionSummary {
    pub total: usize,
    pub per_type: BTreeMap<QuestionType, usize>,
    /// Items with at least one diagnostic.
    pub with_diagnostics: usize,
    /// Items whose answer fell back to a default.
    pub defaulted_answers: usize,
    /// Items whose visual was malformed or a sentinel glyph.
    #[serde(default)]
    pub media_issues: usize,
}

impl ConversionSummary {
    pub fn from_items(items: &[ItemOutcome]) -> Self {
        let mut summary = ConversionSummary {
            total: items.len(),
            ..Default::default()
        };
        for item in items {
            *summary.per_type.entry(item.question_type).or_insert(0) += 1;
            if !item.diagnostics.is_empty() {
                summary.with_diagnostics += 1;
            }
            if item.diagnostics.iter().any(Diagnostic::is_defaulted) {
                summary.defaulted_answers += 1;
            }
            if item.diagnostics.iter().any(Diagnostic::is_media) {
                summary.media_issues += 1;
            }
        }
        summary
    }

    /// Format the summary as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} items, {} with diagnostics, {} defaulted answers\n\n",
            self.total, self.with_diagnostics, self.defaulted_answers
        ));
        if self.media_issues > 0 {
            md.push_str(&format!(
                "{} item(s) with unusable visuals\n\n",
                self.media_issues
            ));
        }

        if !self.per_type.is_empty() {
            md.push_str("| Type | Count |\n");
            md.push_str("|------|-------|\n");
            for (question_type, count) in &self.per_type {
                md.push_str(&format!("| {question_type} | {count} |\n"));
            }
        }

        md
    }
}

impl ConversionReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ConversionReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Diagnostics paired with the id of the question they belong to.
    pub fn diagnostics(&self) -> impl Iterator<Item = (&str, &Diagnostic)> {
        self.items.iter().flat_map(|item| {
            item.diagnostics
                .iter()
                .map(move |d| (item.question_id.as_str(), d))
        })
    }
}
