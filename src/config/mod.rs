mod core;
mod loader;
mod thresholds;
pub mod validation;

pub use core::{
    FeatureConfig, IgnoreConfig, LanguagesConfig, ModelChoice, OutputConfig, SmellscopeConfig,
    TrainingConfig, VcsConfig,
};
pub use loader::{
    directory_ancestors, load_config, load_config_from, load_config_in,
    parse_and_validate_config, CONFIG_FILE_NAME,
};
pub use thresholds::SmellThresholds;

/// Commented starter file written by `smellscope init`
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# smellscope configuration
#
# Every key is optional; removed keys fall back to the values shown here.

[thresholds]
long_method_lines = 50
max_parameters = 5
god_class_methods = 20
god_class_lines = 500
lazy_class_methods = 1
cyclomatic = 15
nesting_depth = 4
min_documentable = 3
# percent of functions and classes with docs
documentation_coverage = 30.0
comment_mismatch = 0.2
global_mutations = 2
feature_envy_ratio = 2.0
formatting_ratio = 0.05
unstable_commits = 20
unstable_authors = 4
instability = 0.8
min_efferent = 5
max_line_length = 100

[languages]
enabled = ["python", "java", "cpp"]

[ignore]
patterns = ["**/node_modules/**", "**/build/**", "**/.venv/**"]

[features]
outlier_iqr_factor = 3.0
variance_threshold = 0.01
drop_columns = ["vcs_available"]
skip_init_modules = true
include_test_files = false

[training]
# logistic | forest | voting
model = "voting"
seed = 42
test_ratio = 0.2
folds = 5
learning_rate = 0.1
epochs = 500
l2 = 0.01
trees = 50
max_depth = 8
min_samples_split = 4
threshold = 0.5

[vcs]
enabled = true
max_commits = 1000

[output]
# json | markdown | terminal
default_format = "terminal"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_to_valid_config() {
        let config = parse_and_validate_config(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.thresholds, SmellThresholds::default());
        assert_eq!(config.training, TrainingConfig::default());
        assert_eq!(config.ignore.patterns.len(), 3);
    }
}
