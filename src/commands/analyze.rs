use super::CommandContext;
use crate::core::FileAnalysis;
use crate::io;
use crate::project::analyze_project_with;
use crate::smells::{label_records, SmellDetector};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// Write `value` to `--output` as JSON, or print it
fn emit_json<T: Serialize + ?Sized>(context: &CommandContext, value: &T) -> Result<()> {
    match &context.output {
        Some(path) => {
            io::write_json(path, value)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

pub fn analyze(context: &CommandContext, path: &Path) -> Result<()> {
    let analysis = analyze_project_with(path, &context.config, &context.project)
        .with_context(|| format!("Failed to analyze {}", path.display()))?;
    if analysis.errors > 0 {
        eprintln!(
            "{} of {} files could not be analyzed",
            analysis.errors, analysis.scanned_files
        );
    }
    emit_json(context, &analysis.files)
}

pub fn label(context: &CommandContext, input: &Path) -> Result<()> {
    let records: Vec<FileAnalysis> = io::read_json(input)
        .with_context(|| format!("Failed to read analysis records from {}", input.display()))?;
    let detector = SmellDetector::new(context.config.thresholds.clone());
    let labeled = label_records(records, &detector);
    emit_json(context, &labeled)
}
