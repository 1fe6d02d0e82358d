//! CLI command implementations.
//!
//! Each submodule maps one group of subcommands onto the library. Commands
//! return `anyhow::Result` and add user-facing context; the library errors
//! underneath stay typed.
//!
//! - **collect**: extract, prune and clear
//! - **analyze**: analyze and label
//! - **dataset**: dataset and features
//! - **train**: train and evaluate
//! - **predict**: predict
//! - **report**: report
//! - **run**: the whole pipeline
//! - **init**: write a default configuration file

pub mod analyze;
pub mod collect;
pub mod dataset;
pub mod init;
pub mod predict;
pub mod report;
pub mod run;
pub mod train;

use crate::cli::GlobalArgs;
use crate::config::{load_config, load_config_from, SmellscopeConfig};
use crate::io::output::OutputFormat;
use crate::progress::ProgressConfig;
use crate::project::ProjectOptions;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub use init::init_config;

/// Settings shared by every command, resolved once from the global flags
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: SmellscopeConfig,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub project: ProjectOptions,
}

impl CommandContext {
    pub fn from_args(args: &GlobalArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => load_config_from(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => load_config(),
        };
        if args.no_vcs {
            config.vcs.enabled = false;
        }
        let format = args
            .format
            .map(OutputFormat::from)
            .or(config.output.default_format)
            .unwrap_or(OutputFormat::Terminal);
        Ok(Self {
            config,
            format,
            output: args.output.clone(),
            project: ProjectOptions {
                parallel: !args.no_parallel,
                progress: ProgressConfig::from_env(args.plain),
            },
        })
    }

    /// `--output` if given, else `default`
    pub fn output_or(&self, default: impl AsRef<Path>) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default.as_ref().to_path_buf())
    }
}

/// Print a serializable summary as JSON or as plain lines
fn print_summary<T: serde::Serialize>(
    format: OutputFormat,
    value: &T,
    lines: &[String],
) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        for line in lines {
            println!("{line}");
        }
    }
    Ok(())
}
