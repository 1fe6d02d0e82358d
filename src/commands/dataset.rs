use super::{print_summary, CommandContext};
use crate::dataset::{load_labeled, Dataset};
use crate::features::FeaturePipeline;
use crate::pipeline::WorkLayout;
use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;

pub fn dataset(context: &CommandContext, input: &Path) -> Result<()> {
    let records = load_labeled(input)
        .with_context(|| format!("Failed to load labeled records from {}", input.display()))?;
    let dataset = Dataset::from_labeled(&records, &context.config.features)
        .context("Failed to build dataset")?;

    let output = context.output_or(WorkLayout::default().dataset_csv());
    dataset
        .write_csv(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    print_summary(
        context.format,
        &json!({
            "output": output,
            "rows": dataset.len(),
            "features": dataset.feature_names.len(),
            "targets": dataset.target_names.len(),
        }),
        &[format!(
            "Wrote {} rows with {} features to {}",
            dataset.len(),
            dataset.feature_names.len(),
            output.display()
        )],
    )
}

pub fn features(context: &CommandContext, input: &Path, pipeline_path: &Path) -> Result<()> {
    let dataset = Dataset::read_csv(input)
        .with_context(|| format!("Failed to read dataset {}", input.display()))?;
    let (fitted, matrix) = FeaturePipeline::fit(&dataset, &context.config.features)
        .context("Failed to fit feature pipeline")?;

    let output = context.output_or(WorkLayout::default().processed_csv());
    dataset
        .with_features(fitted.output_features.clone(), &matrix.rows)
        .write_csv(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    fitted
        .save(pipeline_path)
        .with_context(|| format!("Failed to write {}", pipeline_path.display()))?;

    print_summary(
        context.format,
        &json!({
            "output": output,
            "pipeline": pipeline_path,
            "rows": matrix.n_rows(),
            "features": fitted.output_features,
            "dropped": fitted.dropped,
        }),
        &[
            format!(
                "Kept {} features, dropped {}",
                fitted.output_features.len(),
                fitted.dropped.len()
            ),
            format!("Processed dataset: {}", output.display()),
            format!("Fitted pipeline: {}", pipeline_path.display()),
        ],
    )
}
