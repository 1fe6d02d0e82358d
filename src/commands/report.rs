use super::CommandContext;
use crate::dataset::load_labeled;
use crate::io::output::create_writer;
use crate::observability::{self, Stage};
use crate::project::analyze_project_with;
use crate::report::QualityReport;
use crate::smells::{label_records, LabeledRecord, SmellDetector};
use anyhow::{Context, Result};
use std::path::Path;

/// Labeled records from a directory of sources, or from a labeled JSON file
fn labeled_records(context: &CommandContext, path: &Path) -> Result<Vec<LabeledRecord>> {
    if path.is_file() {
        return load_labeled(path)
            .with_context(|| format!("Failed to load labeled records from {}", path.display()));
    }
    let analysis = analyze_project_with(path, &context.config, &context.project)
        .with_context(|| format!("Failed to analyze {}", path.display()))?;
    let detector = SmellDetector::new(context.config.thresholds.clone());
    Ok(label_records(analysis.files, &detector))
}

pub fn report(context: &CommandContext, path: &Path) -> Result<()> {
    let records = labeled_records(context, path)?;

    let _stage = observability::set_stage(Stage::Reporting);
    let report = QualityReport::build(&records);
    let mut writer = create_writer(context.format, context.output.as_deref())?;
    writer.write_report(&report)
}
