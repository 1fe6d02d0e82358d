// Export modules for library usage
pub mod analyzers;
pub mod cli;
pub mod collect;
pub mod commands;
pub mod config;
pub mod core;
pub mod dataset;
pub mod errors;
pub mod evaluation;
pub mod features;
pub mod inference;
pub mod io;
pub mod metrics;
pub mod model;
pub mod observability;
pub mod pipeline;
pub mod progress;
pub mod project;
pub mod report;
pub mod smells;
pub mod vcs;

// Re-export commonly used types
pub use crate::core::{
    ClassMetrics, FileAnalysis, FileFeatures, FunctionMetrics, Language, QualityLabel, Severity,
    SmellKind,
};

pub use crate::errors::{Error, Result};

pub use crate::analyzers::{analyze_file, get_analyzer, Analyzer};

pub use crate::project::{analyze_project, ProjectAnalysis};

pub use crate::smells::{label_records, LabeledRecord, Smell, SmellDetector};

pub use crate::dataset::Dataset;

pub use crate::features::{FeaturePipeline, FittedPipeline};

pub use crate::model::{ModelArtifact, Trainer};

pub use crate::inference::{PredictionResult, Predictor};

pub use crate::report::QualityReport;

pub use crate::io::output::{create_writer, OutputFormat, OutputWriter};

pub use crate::pipeline::{run_pipeline, PipelineOptions, PipelineReport};
