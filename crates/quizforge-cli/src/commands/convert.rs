//! The `quizforge convert` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use quizforge_core::config::load_config_from;
use quizforge_core::engine::ConversionEngine;
use quizforge_core::loader::load_batches;
use quizforge_core::report::ConversionReport;
use quizforge_core::traits::TracingObserver;

use super::resolve_skill;
use crate::SkillArgs;

pub fn execute(
    input: PathBuf,
    output: Option<PathBuf>,
    skill_args: SkillArgs,
    prefix: Option<String>,
    report: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let batches = load_batches(&input)?;
    if batches.is_empty() {
        anyhow::bail!("no batch files found in {}", input.display());
    }

    let base_prefix = prefix.unwrap_or_else(|| config.batch_prefix.clone());
    let multiple = batches.len() > 1;

    let mut reports = Vec::with_capacity(batches.len());
    for batch in &batches {
        let skill = resolve_skill(&skill_args, batch.skill_info.as_ref(), &config.skill);
        if skill.subject.is_empty() || skill.grade.is_empty() {
            tracing::warn!(
                "batch '{}' has no subject or grade; classification falls back to generic rules",
                batch.id
            );
        }

        // Positional ids restart per batch, so each batch gets its own prefix.
        let mut engine_config = config.to_engine_config();
        engine_config.batch_prefix = if multiple {
            format!("{base_prefix}-{}", batch.id)
        } else {
            base_prefix.clone()
        };
        let engine = ConversionEngine::new(engine_config).with_observer(TracingObserver);

        reports.push(engine.convert_batch_report(&batch.items, &skill, &batch.id));
    }

    let json = if report {
        match reports.as_slice() {
            [single] => to_json(single, config.pretty)?,
            many => to_json(many, config.pretty)?,
        }
    } else {
        let questions: Vec<_> = reports.iter().flat_map(|r| r.questions.iter()).collect();
        to_json(&questions, config.pretty)?
    };

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, json)
                .with_context(|| format!("failed to write output to {}", path.display()))?;
            print_totals(&reports);
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("failed to serialize output")
}

fn print_totals(reports: &[ConversionReport]) {
    let total: usize = reports.iter().map(|r| r.summary.total).sum();
    let with_diagnostics: usize = reports.iter().map(|r| r.summary.with_diagnostics).sum();
    eprintln!(
        "Converted {total} item(s) from {} batch(es), {with_diagnostics} with diagnostics",
        reports.len()
    );
}
