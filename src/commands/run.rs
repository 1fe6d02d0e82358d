use super::{print_summary, CommandContext};
use crate::pipeline::{run_pipeline, PipelineOptions, WorkLayout};
use anyhow::{Context, Result};
use std::path::Path;

pub fn run(
    context: &CommandContext,
    repo: &Path,
    work_dir: &Path,
    extract: bool,
    train: bool,
) -> Result<()> {
    let options = PipelineOptions {
        repo: repo.to_path_buf(),
        layout: WorkLayout::new(work_dir),
        extract,
        train,
        project: context.project,
    };
    let report = run_pipeline(&options, &context.config)
        .with_context(|| format!("Pipeline failed for {}", repo.display()))?;

    let mut lines = vec![
        format!(
            "Analyzed {} files ({} failed), {} with smells",
            report.analyzed_files, report.failed_files, report.smelly_files
        ),
        format!(
            "Dataset: {} rows, {} features after engineering",
            report.dataset_rows, report.features
        ),
    ];
    if let Some(evaluation) = &report.evaluation {
        lines.push(evaluation.report());
    }
    lines.push("Outputs:".to_string());
    lines.extend(report.outputs.iter().map(|p| format!("  {}", p.display())));
    lines.push(format!("Elapsed: {:.2?}", report.elapsed));

    print_summary(context.format, &report, &lines)
}
