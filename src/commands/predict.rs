use super::CommandContext;
use crate::inference::Predictor;
use crate::io::output::create_writer;
use anyhow::{Context, Result};
use std::path::Path;

pub fn predict(context: &CommandContext, path: &Path, model: &Path) -> Result<()> {
    let predictor = Predictor::load(model)
        .with_context(|| format!("Failed to load model {}", model.display()))?;
    let result = predictor
        .predict_directory(path, &context.config, &context.project)
        .with_context(|| format!("Failed to predict smells for {}", path.display()))?;

    let mut writer = create_writer(context.format, context.output.as_deref())?;
    writer.write_predictions(&result)
}
