use serde::{Deserialize, Serialize};

use super::thresholds::SmellThresholds;
use crate::analyzers::common::AnalysisOptions;
use crate::core::Language;
use crate::io::output::OutputFormat;

/// Root configuration structure, read from `.smellscope.toml`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SmellscopeConfig {
    #[serde(default)]
    pub thresholds: SmellThresholds,

    #[serde(default)]
    pub languages: LanguagesConfig,

    #[serde(default)]
    pub ignore: IgnoreConfig,

    #[serde(default)]
    pub features: FeatureConfig,

    #[serde(default)]
    pub training: TrainingConfig,

    #[serde(default)]
    pub vcs: VcsConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl SmellscopeConfig {
    /// Enabled languages; unknown names are skipped with a warning
    pub fn languages(&self) -> Vec<Language> {
        let mut languages = Vec::new();
        for name in &self.languages.enabled {
            match Language::from_name(name) {
                Some(lang) if !languages.contains(&lang) => languages.push(lang),
                Some(_) => {}
                None => log::warn!("Ignoring unknown language '{name}' in config"),
            }
        }
        languages
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            max_line_length: self.thresholds.max_line_length,
            many_parameters: self.thresholds.max_parameters,
            feature_envy_ratio: self.thresholds.feature_envy_ratio,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LanguagesConfig {
    #[serde(default = "default_enabled_languages")]
    pub enabled: Vec<String>,
}

impl Default for LanguagesConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled_languages(),
        }
    }
}

fn default_enabled_languages() -> Vec<String> {
    vec!["python".to_string(), "java".to_string(), "cpp".to_string()]
}

/// Glob patterns excluded from discovery
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct IgnoreConfig {
    #[serde(default)]
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureConfig {
    /// k in `[Q1 - k*IQR, Q3 + k*IQR]`
    #[serde(default = "default_outlier_iqr_factor")]
    pub outlier_iqr_factor: f64,

    #[serde(default = "default_variance_threshold")]
    pub variance_threshold: f64,

    /// Columns removed regardless of variance
    #[serde(default = "default_drop_columns")]
    pub drop_columns: Vec<String>,

    #[serde(default = "default_true")]
    pub skip_init_modules: bool,

    #[serde(default)]
    pub include_test_files: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            outlier_iqr_factor: default_outlier_iqr_factor(),
            variance_threshold: default_variance_threshold(),
            drop_columns: default_drop_columns(),
            skip_init_modules: true,
            include_test_files: false,
        }
    }
}

fn default_outlier_iqr_factor() -> f64 {
    3.0
}

fn default_variance_threshold() -> f64 {
    0.01
}

fn default_drop_columns() -> Vec<String> {
    vec!["vcs_available".to_string()]
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelChoice {
    Logistic,
    Forest,
    #[default]
    Voting,
}

impl std::fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ModelChoice::Logistic => "logistic",
            ModelChoice::Forest => "forest",
            ModelChoice::Voting => "voting",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingConfig {
    #[serde(default)]
    pub model: ModelChoice,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "default_test_ratio")]
    pub test_ratio: f64,

    #[serde(default = "default_folds")]
    pub folds: usize,

    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    #[serde(default = "default_epochs")]
    pub epochs: usize,

    #[serde(default = "default_l2")]
    pub l2: f64,

    #[serde(default = "default_trees")]
    pub trees: usize,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,

    /// Probability at or above which a file is predicted smelly
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            model: ModelChoice::default(),
            seed: default_seed(),
            test_ratio: default_test_ratio(),
            folds: default_folds(),
            learning_rate: default_learning_rate(),
            epochs: default_epochs(),
            l2: default_l2(),
            trees: default_trees(),
            max_depth: default_max_depth(),
            min_samples_split: default_min_samples_split(),
            threshold: default_threshold(),
        }
    }
}

fn default_seed() -> u64 {
    42
}

fn default_test_ratio() -> f64 {
    0.2
}

fn default_folds() -> usize {
    5
}

fn default_learning_rate() -> f64 {
    0.1
}

fn default_epochs() -> usize {
    500
}

fn default_l2() -> f64 {
    0.01
}

fn default_trees() -> usize {
    50
}

fn default_max_depth() -> usize {
    8
}

fn default_min_samples_split() -> usize {
    4
}

fn default_threshold() -> f64 {
    0.5
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VcsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_max_commits")]
    pub max_commits: usize,
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_commits: default_max_commits(),
        }
    }
}

fn default_max_commits() -> usize {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    #[serde(default)]
    pub default_format: Option<OutputFormat>,
}
