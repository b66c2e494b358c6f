//! The `quizforge validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizforge_core::loader::{load_batches, validate_batch};

pub fn execute(input: PathBuf) -> Result<()> {
    let batches = load_batches(&input)?;

    let mut total_warnings = 0;

    for batch in &batches {
        println!("Batch: {} ({} items)", batch.id, batch.items.len());

        let warnings = validate_batch(batch);
        for w in &warnings {
            let prefix = w
                .index
                .map(|i| format!("  [{i}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All batches valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
