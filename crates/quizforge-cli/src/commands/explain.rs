//! The `quizforge explain` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizforge_core::config::load_config_from;
use quizforge_core::engine::ConversionEngine;
use quizforge_core::loader::load_batches;
use quizforge_core::report::ConversionReport;

use super::resolve_skill;
use crate::SkillArgs;

pub fn execute(input: PathBuf, skill_args: SkillArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let batches = load_batches(&input)?;
    let multiple = batches.len() > 1;

    for batch in &batches {
        let skill = resolve_skill(&skill_args, batch.skill_info.as_ref(), &config.skill);

        let mut engine_config = config.to_engine_config();
        if multiple {
            engine_config.batch_prefix = format!("{}-{}", config.batch_prefix, batch.id);
        }
        let engine = ConversionEngine::new(engine_config);
        let report = engine.convert_batch_report(&batch.items, &skill, &batch.id);

        println!(
            "Batch: {} (subject: {}, grade: {})",
            batch.id,
            display_or_dash(&skill.subject),
            display_or_dash(&skill.grade)
        );
        println!("{}", explain_table(&report));
        for (question_id, diagnostic) in report.diagnostics() {
            println!("  {question_id}: {diagnostic}");
        }
        println!("{}", report.summary.to_markdown());
    }

    Ok(())
}

fn explain_table(report: &ConversionReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Id", "Type", "Rule", "Diagnostics"]);

    for item in &report.items {
        table.add_row(vec![
            Cell::new(item.index),
            Cell::new(&item.question_id),
            Cell::new(item.question_type),
            Cell::new(&item.rule),
            Cell::new(item.diagnostics.len()),
        ]);
    }

    table
}

fn display_or_dash(s: &str) -> &str {
    if s.trim().is_empty() {
        "-"
    } else {
        s
    }
}
