use serde::{Deserialize, Serialize};

/// Limits used by the smell detector. A file smells when a metric goes past
/// its threshold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SmellThresholds {
    #[serde(default = "default_long_method_lines")]
    pub long_method_lines: usize,

    #[serde(default = "default_max_parameters")]
    pub max_parameters: usize,

    #[serde(default = "default_god_class_methods")]
    pub god_class_methods: usize,

    #[serde(default = "default_god_class_lines")]
    pub god_class_lines: usize,

    #[serde(default = "default_lazy_class_methods")]
    pub lazy_class_methods: usize,

    /// Per-function cyclomatic complexity
    #[serde(default = "default_cyclomatic")]
    pub cyclomatic: u32,

    #[serde(default = "default_nesting_depth")]
    pub nesting_depth: u32,

    /// Functions plus classes needed before documentation is judged
    #[serde(default = "default_min_documentable")]
    pub min_documentable: usize,

    /// Percentage, 0-100
    #[serde(default = "default_documentation_coverage")]
    pub documentation_coverage: f64,

    /// Fraction of comment lines that look like code
    #[serde(default = "default_comment_mismatch")]
    pub comment_mismatch: f64,

    #[serde(default = "default_global_mutations")]
    pub global_mutations: usize,

    #[serde(default = "default_feature_envy_ratio")]
    pub feature_envy_ratio: f64,

    /// Formatting violations per physical line
    #[serde(default = "default_formatting_ratio")]
    pub formatting_ratio: f64,

    #[serde(default = "default_unstable_commits")]
    pub unstable_commits: usize,

    #[serde(default = "default_unstable_authors")]
    pub unstable_authors: usize,

    #[serde(default = "default_instability")]
    pub instability: f64,

    #[serde(default = "default_min_efferent")]
    pub min_efferent: usize,

    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
}

impl Default for SmellThresholds {
    fn default() -> Self {
        Self {
            long_method_lines: default_long_method_lines(),
            max_parameters: default_max_parameters(),
            god_class_methods: default_god_class_methods(),
            god_class_lines: default_god_class_lines(),
            lazy_class_methods: default_lazy_class_methods(),
            cyclomatic: default_cyclomatic(),
            nesting_depth: default_nesting_depth(),
            min_documentable: default_min_documentable(),
            documentation_coverage: default_documentation_coverage(),
            comment_mismatch: default_comment_mismatch(),
            global_mutations: default_global_mutations(),
            feature_envy_ratio: default_feature_envy_ratio(),
            formatting_ratio: default_formatting_ratio(),
            unstable_commits: default_unstable_commits(),
            unstable_authors: default_unstable_authors(),
            instability: default_instability(),
            min_efferent: default_min_efferent(),
            max_line_length: default_max_line_length(),
        }
    }
}

fn default_long_method_lines() -> usize {
    50
}

fn default_max_parameters() -> usize {
    5
}

fn default_god_class_methods() -> usize {
    20
}

fn default_god_class_lines() -> usize {
    500
}

fn default_lazy_class_methods() -> usize {
    1
}

fn default_cyclomatic() -> u32 {
    15
}

fn default_nesting_depth() -> u32 {
    4
}

fn default_min_documentable() -> usize {
    3
}

fn default_documentation_coverage() -> f64 {
    30.0
}

fn default_comment_mismatch() -> f64 {
    0.2
}

fn default_global_mutations() -> usize {
    2
}

fn default_feature_envy_ratio() -> f64 {
    2.0
}

fn default_formatting_ratio() -> f64 {
    0.05
}

fn default_unstable_commits() -> usize {
    20
}

fn default_unstable_authors() -> usize {
    4
}

fn default_instability() -> f64 {
    0.8
}

fn default_min_efferent() -> usize {
    5
}

fn default_max_line_length() -> usize {
    100
}
