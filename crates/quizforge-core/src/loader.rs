//! Batch file loading and validation.
//!
//! Loads raw assessment batches from JSON files and directories. Model
//! output often arrives wrapped in markdown fences or surrounded by prose;
//! the JSON payload is cut out before parsing.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::input::{RawAssessmentInput, SkillInfo};
use crate::model::QuestionType;

/// Keys under which a wrapper object may hold its item list.
const ITEM_KEYS: [&str; 4] = ["questions", "items", "assessment", "practice"];

/// A batch of raw items from one source.
#[derive(Debug, Clone)]
pub struct AssessmentBatch {
    /// Identifier derived from the source file stem.
    pub id: String,
    /// Skill context embedded in the file, if any.
    pub skill_info: Option<SkillInfo>,
    pub items: Vec<RawAssessmentInput>,
}

/// Wrapper-object form of a batch file.
#[derive(Debug, Deserialize)]
struct JsonBatchFile {
    #[serde(default)]
    skill_info: Option<SkillInfo>,
    #[serde(flatten)]
    rest: serde_json::Map<String, Value>,
}

/// A fenced block: its language tag (lowercased, may be empty) and body.
struct Fence<'a> {
    lang: String,
    body: Vec<&'a str>,
}

/// Split a response into fenced blocks. An unclosed final fence (a
/// truncated response) still counts.
fn fences(response: &str) -> Vec<Fence<'_>> {
    let mut blocks = Vec::new();
    let mut open: Option<Fence<'_>> = None;

    for line in response.lines() {
        let trimmed = line.trim();
        match open.take() {
            Some(fence) if trimmed == "```" => blocks.push(fence),
            Some(mut fence) => {
                fence.body.push(line);
                open = Some(fence);
            }
            None => {
                if let Some(tag) = trimmed.strip_prefix("```") {
                    open = Some(Fence {
                        lang: tag.trim_start_matches('`').trim().to_lowercase(),
                        body: Vec::new(),
                    });
                }
            }
        }
    }
    blocks.extend(open.filter(|f| !f.body.is_empty()));
    blocks
}

/// Extract JSON from a model response.
///
/// Prefers the first ```json (or jsonc) block, then the first untagged
/// block. Without fences, prose around the payload is cut away by slicing
/// from the first `[` or `{` to the last `]` or `}`.
pub fn extract_json_from_markdown(response: &str) -> String {
    let blocks = fences(response);
    let chosen = blocks
        .iter()
        .find(|f| matches!(f.lang.as_str(), "json" | "jsonc"))
        .or_else(|| blocks.iter().find(|f| f.lang.is_empty()));

    if let Some(fence) = chosen {
        return fence.body.join("\n");
    }

    let trimmed = response.trim();
    let start = trimmed.find(['[', '{']);
    let end = trimmed.rfind([']', '}']);
    match (start, end) {
        (Some(start), Some(end)) if start < end => trimmed[start..=end].to_string(),
        _ => trimmed.to_string(),
    }
}

/// Parse a single JSON file into an `AssessmentBatch`.
pub fn parse_batch(path: &Path) -> Result<AssessmentBatch> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read batch file: {}", path.display()))?;

    parse_batch_str(&content, path)
}

/// Parse a JSON string into an `AssessmentBatch`.
///
/// Accepts an array of items, a wrapper object holding the items under
/// `questions`, `items`, `assessment` or `practice` (plus an optional
/// `skill_info`), or a single item object.
pub fn parse_batch_str(content: &str, source_path: &Path) -> Result<AssessmentBatch> {
    let json = extract_json_from_markdown(content);
    let value: Value = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?;

    let id = source_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "batch".to_string());

    let (skill_info, items) = match value {
        Value::Array(items) => (None, items),
        Value::Object(_) => {
            let file: JsonBatchFile = serde_json::from_value(value)
                .with_context(|| format!("invalid batch object: {}", source_path.display()))?;
            let list = ITEM_KEYS
                .iter()
                .find_map(|key| match file.rest.get(*key) {
                    Some(Value::Array(items)) => Some(items.clone()),
                    _ => None,
                });
            match list {
                Some(items) => (file.skill_info, items),
                None if file.rest.contains_key("question") || file.rest.contains_key("content") => {
                    (file.skill_info, vec![Value::Object(file.rest)])
                }
                None => anyhow::bail!(
                    "no items found in {}: expected an array or one of {:?}",
                    source_path.display(),
                    ITEM_KEYS
                ),
            }
        }
        other => anyhow::bail!(
            "expected a JSON array or object in {}, found {}",
            source_path.display(),
            other
        ),
    };

    Ok(AssessmentBatch {
        id,
        skill_info,
        items: items.into_iter().map(RawAssessmentInput::from).collect(),
    })
}

/// Recursively load all `.json` batch files from a directory.
pub fn load_batch_directory(dir: &Path) -> Result<Vec<AssessmentBatch>> {
    let mut batches = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            batches.extend(load_batch_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "json") {
            match parse_batch(&path) {
                Ok(batch) => batches.push(batch),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(batches)
}

/// Load a file or every batch in a directory.
pub fn load_batches(path: &Path) -> Result<Vec<AssessmentBatch>> {
    if path.is_dir() {
        load_batch_directory(path)
    } else {
        Ok(vec![parse_batch(path)?])
    }
}

/// A warning from batch validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Item index (if applicable).
    pub index: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Validate a batch for issues that will force defaults during conversion.
pub fn validate_batch(batch: &AssessmentBatch) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if batch.skill_info.is_none() {
        warnings.push(ValidationWarning {
            index: None,
            message: "no skill_info in file; subject and grade must be supplied".into(),
        });
    }

    let mut seen = HashSet::new();
    for (index, item) in batch.items.iter().enumerate() {
        let mut warn = |message: String| {
            warnings.push(ValidationWarning {
                index: Some(index),
                message,
            })
        };

        let prompt = item.question.trim();
        if prompt.is_empty() {
            warn("question text is empty".into());
        } else if !seen.insert(prompt.to_lowercase()) {
            warn(format!("duplicate question: {prompt}"));
        }

        if item.correct_answer.is_none() {
            warn("correct_answer is missing".into());
        }

        if let Some(t) = item.question_type.as_deref() {
            if t.parse::<QuestionType>().is_err() {
                warn(format!("unknown type '{t}' will be ignored"));
            }
        }

        if item.options.len() == 1 {
            warn("only one option provided".into());
        }
    }

    warnings
}
