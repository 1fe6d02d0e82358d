use super::{print_summary, CommandContext};
use crate::dataset::Dataset;
use crate::evaluation::{cross_validate, evaluate_holdout};
use crate::io::{self, output::OutputFormat};
use crate::model::Trainer;
use crate::pipeline::WorkLayout;
use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;

fn read_dataset(input: &Path) -> Result<Dataset> {
    Dataset::read_csv(input).with_context(|| format!("Failed to read dataset {}", input.display()))
}

pub fn train(context: &CommandContext, input: &Path) -> Result<()> {
    let dataset = read_dataset(input)?;
    let artifact = Trainer::from_config(&context.config)
        .train(&dataset)
        .context("Training failed")?;

    let output = context.output_or(WorkLayout::default().model());
    artifact
        .save(&output)
        .with_context(|| format!("Failed to write model {}", output.display()))?;

    let mut lines = vec![format!(
        "Trained {} models ({}) on {} rows, {} features",
        artifact.models.len(),
        artifact.model_choice,
        artifact.training_rows,
        artifact.feature_names.len()
    )];
    for model in &artifact.models {
        lines.push(format!(
            "  {:<28} {:<9} {} positive / {} negative",
            model.target,
            model.model.name(),
            model.balance.positives,
            model.balance.negatives
        ));
    }
    lines.push(format!("Model artifact: {}", output.display()));

    let models: Vec<_> = artifact
        .models
        .iter()
        .map(|m| json!({"target": m.target, "model": m.model.name(), "balance": m.balance}))
        .collect();
    print_summary(
        context.format,
        &json!({"output": output, "rows": artifact.training_rows, "models": models}),
        &lines,
    )
}

pub fn evaluate(context: &CommandContext, input: &Path, folds: Option<usize>) -> Result<()> {
    let dataset = read_dataset(input)?;
    let trainer = Trainer::from_config(&context.config);

    let (value, text) = match folds {
        Some(k) => {
            let cv = cross_validate(&dataset, &trainer, k).context("Cross validation failed")?;
            (serde_json::to_value(&cv)?, cv.report())
        }
        None => {
            let holdout =
                evaluate_holdout(&dataset, &trainer).context("Holdout evaluation failed")?;
            (serde_json::to_value(&holdout)?, holdout.report())
        }
    };

    match (&context.output, context.format) {
        (Some(path), OutputFormat::Json) => io::write_json(path, &value)?,
        (Some(path), _) => io::write_file(path, &text)?,
        (None, OutputFormat::Json) => println!("{}", serde_json::to_string_pretty(&value)?),
        (None, _) => print!("{text}"),
    }
    Ok(())
}
