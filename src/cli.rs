use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
    Terminal,
}

impl From<OutputFormat> for crate::io::output::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Self::Json,
            OutputFormat::Markdown => Self::Markdown,
            OutputFormat::Terminal => Self::Terminal,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "smellscope")]
#[command(about = "Code smell detection and prediction for Python, Java and C++", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags accepted by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Increase verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Configuration file (defaults to the nearest .smellscope.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Output file (defaults to stdout or the working directory layout)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Analyze files sequentially
    #[arg(long = "no-parallel", global = true)]
    pub no_parallel: bool,

    /// Number of worker threads (0 = all cores)
    #[arg(short = 'j', long = "jobs", default_value = "0", global = true)]
    pub jobs: usize,

    /// Skip git history metrics
    #[arg(long = "no-vcs", global = true)]
    pub no_vcs: bool,

    /// Disable colors and progress bars
    #[arg(long, global = true)]
    pub plain: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy the analyzable sources of local checkouts into a run directory
    Extract {
        /// Checkout to extract
        #[arg(required_unless_present = "repo_list")]
        repo: Option<PathBuf>,

        /// Repository metadata JSON; every entry is looked up under --checkouts
        #[arg(long = "repo-list", requires = "checkouts")]
        repo_list: Option<PathBuf>,

        /// Directory holding one checkout per repository name
        #[arg(long)]
        checkouts: Option<PathBuf>,

        /// Run directory
        #[arg(long = "run-dir", default_value = "data/run")]
        run_dir: PathBuf,
    },

    /// Delete everything but source files and git metadata from a checkout
    Prune {
        /// Checkout to prune
        repo: PathBuf,

        /// Actually delete files (default is a dry run)
        #[arg(long)]
        execute: bool,
    },

    /// Empty the run directory
    Clear {
        #[arg(long = "run-dir", default_value = "data/run")]
        run_dir: PathBuf,
    },

    /// Compute per-file metrics and write the analysis records as JSON
    Analyze {
        /// Directory to analyze
        path: PathBuf,
    },

    /// Detect smells in analysis records and attach 0/1 labels
    Label {
        /// Analysis records written by `analyze`
        input: PathBuf,
    },

    /// Build the raw CSV dataset from labeled records
    Dataset {
        /// Labeled records file, or a directory of them
        input: PathBuf,
    },

    /// Fit the feature pipeline and write the processed dataset
    Features {
        /// Raw dataset CSV
        input: PathBuf,

        /// Where to store the fitted pipeline
        #[arg(long, default_value = "data/processed/pipeline.json")]
        pipeline: PathBuf,
    },

    /// Train one model per smell target and write the model artifact
    Train {
        /// Raw dataset CSV
        input: PathBuf,
    },

    /// Evaluate the configured model on a dataset
    Evaluate {
        /// Raw dataset CSV
        input: PathBuf,

        /// Cross-validate with this many folds instead of a single holdout split
        #[arg(long)]
        folds: Option<usize>,
    },

    /// Predict smells for every file under a directory
    Predict {
        /// Directory to analyze
        path: PathBuf,

        /// Model artifact
        #[arg(short, long, default_value = "data/models/model.json")]
        model: PathBuf,
    },

    /// Quality report with smells and refactoring suggestions
    Report {
        /// Directory to analyze, or labeled records written by `label`
        path: PathBuf,
    },

    /// Analyze, label, build the dataset, fit features and train in one go
    Run {
        /// Local checkout
        repo: PathBuf,

        /// Working directory for every intermediate file
        #[arg(short, long = "work-dir", default_value = "data")]
        work_dir: PathBuf,

        /// Copy the sources into <work-dir>/run first and analyze the copy
        #[arg(long)]
        extract: bool,

        /// Stop after feature engineering
        #[arg(long = "no-train")]
        no_train: bool,
    },

    /// Initialize configuration file
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "smellscope",
            "predict",
            "src",
            "-vv",
            "--format",
            "json",
            "--no-vcs",
            "--jobs",
            "2",
        ]);
        assert_eq!(cli.global.verbosity, 2);
        assert_eq!(cli.global.format, Some(OutputFormat::Json));
        assert!(cli.global.no_vcs);
        assert_eq!(cli.global.jobs, 2);
        match cli.command {
            Commands::Predict { path, model } => {
                assert_eq!(path, PathBuf::from("src"));
                assert_eq!(model, PathBuf::from("data/models/model.json"));
            }
            other => panic!("Expected Predict command, got {other:?}"),
        }
    }

    #[test]
    fn test_init_force() {
        let cli = Cli::parse_from(["smellscope", "init", "--force"]);
        assert!(matches!(cli.command, Commands::Init { force: true }));
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::parse_from(["smellscope", "run", "."]);
        match cli.command {
            Commands::Run {
                work_dir,
                extract,
                no_train,
                ..
            } => {
                assert_eq!(work_dir, PathBuf::from("data"));
                assert!(!extract);
                assert!(!no_train);
            }
            other => panic!("Expected Run command, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_needs_repo_or_list() {
        assert!(Cli::try_parse_from(["smellscope", "extract"]).is_err());
        assert!(Cli::try_parse_from(["smellscope", "extract", "--repo-list", "r.json"]).is_err());
        assert!(Cli::try_parse_from([
            "smellscope",
            "extract",
            "--repo-list",
            "r.json",
            "--checkouts",
            "repos"
        ])
        .is_ok());
    }

    #[test]
    fn test_output_format_conversion() {
        let format: crate::io::output::OutputFormat = OutputFormat::Markdown.into();
        assert_eq!(format, crate::io::output::OutputFormat::Markdown);
    }
}
