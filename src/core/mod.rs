pub mod ast;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Copy, PartialOrd, Ord)]
pub enum Language {
    Python,
    Java,
    Cpp,
    Unknown,
}

impl Language {
    pub const SUPPORTED: [Language; 3] = [Language::Python, Language::Java, Language::Cpp];

    pub fn from_extension(ext: &str) -> Self {
        static EXTENSION_MAP: &[(&[&str], Language)] = &[
            (&["py", "pyi"], Language::Python),
            (&["java"], Language::Java),
            (
                &["cpp", "cc", "cxx", "c", "h", "hpp", "hh", "hxx"],
                Language::Cpp,
            ),
        ];

        let ext = ext.to_ascii_lowercase();
        EXTENSION_MAP
            .iter()
            .find(|(exts, _)| exts.contains(&ext.as_str()))
            .map(|(_, lang)| *lang)
            .unwrap_or(Language::Unknown)
    }

    pub fn from_path(path: &std::path::Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    /// Parse a language name as written in config files and on the command line
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Some(Language::Python),
            "java" => Some(Language::Java),
            "cpp" | "c++" | "cxx" => Some(Language::Cpp),
            _ => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        static DISPLAY_STRINGS: &[(Language, &str)] = &[
            (Language::Python, "Python"),
            (Language::Java, "Java"),
            (Language::Cpp, "C++"),
            (Language::Unknown, "Unknown"),
        ];

        let display_str = DISPLAY_STRINGS
            .iter()
            .find(|(l, _)| l == self)
            .map(|(_, s)| *s)
            .unwrap_or("Unknown");

        write!(f, "{display_str}")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionMetrics {
    pub name: String,
    pub line: usize,
    pub length: usize,
    pub parameters: usize,
    pub cyclomatic: u32,
    pub cognitive: u32,
    pub nesting: u32,
    pub has_docstring: bool,
    pub is_method: bool,
    pub is_async: bool,
    pub self_accesses: usize,
    pub foreign_accesses: usize,
}

impl FunctionMetrics {
    pub fn new(name: String, line: usize) -> Self {
        Self {
            name,
            line,
            length: 0,
            parameters: 0,
            cyclomatic: 1,
            cognitive: 0,
            nesting: 0,
            has_docstring: false,
            is_method: false,
            is_async: false,
            self_accesses: 0,
            foreign_accesses: 0,
        }
    }

    pub fn is_complex(&self, threshold: u32) -> bool {
        self.cyclomatic > threshold || self.cognitive > threshold
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClassMetrics {
    pub name: String,
    pub line: usize,
    pub line_count: usize,
    pub methods: usize,
    pub attributes: usize,
    pub has_inheritance: bool,
    pub base_count: usize,
    pub has_docstring: bool,
    pub lack_of_cohesion: f64,
}

impl ClassMetrics {
    pub fn new(name: String, line: usize) -> Self {
        Self {
            name,
            line,
            line_count: 0,
            methods: 0,
            attributes: 0,
            has_inheritance: false,
            base_count: 0,
            has_docstring: false,
            lack_of_cohesion: 0.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Import {
    pub name: String,
    pub kind: ImportKind,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ImportKind {
    /// `import x` / `import a.b.C;`
    Module,
    /// `from x import y`
    FromModule,
    /// `#include "local.h"`
    LocalInclude,
    /// `#include <system>`
    SystemInclude,
}

/// Raw text-level measurements gathered alongside the syntax tree walk
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TextMetrics {
    pub physical_lines: usize,
    pub code_lines: usize,
    pub comment_lines: usize,
    pub docstring_lines: usize,
    pub blank_lines: usize,
    pub long_lines: usize,
    pub trailing_whitespace_lines: usize,
    pub mixed_indentation_lines: usize,
    pub duplicate_lines: usize,
    pub debt_markers: usize,
    pub swallowed_errors: usize,
    pub commented_out_code: usize,
    pub global_state_mutations: usize,
}

impl TextMetrics {
    pub fn formatting_violations(&self) -> usize {
        self.long_lines + self.trailing_whitespace_lines + self.mixed_indentation_lines
    }
}

/// Conversion used to flatten the feature struct into a row of optional values.
pub trait FeatureValue {
    fn feature(&self) -> Option<f64>;
}

impl FeatureValue for f64 {
    fn feature(&self) -> Option<f64> {
        Some(*self)
    }
}

impl FeatureValue for Option<f64> {
    fn feature(&self) -> Option<f64> {
        *self
    }
}

macro_rules! file_features {
    ($($name:ident : $ty:ty),* $(,)?) => {
        /// Flat numerical summary of one file, used as model input.
        #[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
        pub struct FileFeatures {
            $(#[serde(default)] pub $name: $ty,)*
        }

        impl FileFeatures {
            /// Column names in dataset order
            pub const NAMES: &'static [&'static str] = &[$(stringify!($name)),*];

            /// Column values in the same order as [`FileFeatures::NAMES`]
            pub fn values(&self) -> Vec<Option<f64>> {
                vec![$(FeatureValue::feature(&self.$name)),*]
            }

            pub fn get(&self, name: &str) -> Option<f64> {
                match name {
                    $(stringify!($name) => FeatureValue::feature(&self.$name),)*
                    _ => None,
                }
            }
        }
    };
}

file_features! {
    lines_of_code: f64,
    source_lines: f64,
    comment_lines: f64,
    docstring_lines: f64,
    blank_lines: f64,
    comment_percentage: f64,
    classes: f64,
    functions: f64,
    methods: f64,
    async_functions: f64,
    average_cyclomatic_complexity: f64,
    max_cyclomatic_complexity: f64,
    average_cognitive_complexity: f64,
    max_nesting_level: f64,
    average_function_length: f64,
    max_function_length: f64,
    functions_over_20_lines: f64,
    functions_over_50_lines: f64,
    max_parameters: f64,
    methods_with_many_parameters: f64,
    average_methods_per_class: f64,
    max_methods_in_class: f64,
    classes_with_inheritance: f64,
    lack_of_cohesion: f64,
    documentation_coverage: f64,
    total_imports: f64,
    halstead_volume: f64,
    halstead_difficulty: f64,
    halstead_effort: f64,
    halstead_estimated_bugs: f64,
    duplicate_lines: f64,
    technical_debt_ratio: f64,
    long_lines: f64,
    formatting_violations: f64,
    comment_code_mismatch_score: f64,
    global_state_mutations: f64,
    feature_envy_methods: f64,
    afferent_coupling: f64,
    efferent_coupling: f64,
    instability: f64,
    circular_dependencies: f64,
    unit_test_presence: f64,
    vcs_available: f64,
    commit_count: Option<f64>,
    distinct_authors: Option<f64>,
    file_age_days: Option<f64>,
    lines_added: Option<f64>,
    lines_deleted: Option<f64>,
    maintainability_score: f64,
    maintainability_index: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FileAnalysis {
    /// Path relative to the analysis root
    pub path: PathBuf,
    pub language: Language,
    #[serde(default)]
    pub is_test_file: bool,
    pub functions: Vec<FunctionMetrics>,
    pub classes: Vec<ClassMetrics>,
    pub imports: Vec<Import>,
    pub text: TextMetrics,
    pub features: FileFeatures,
}

impl FileAnalysis {
    pub fn empty(path: PathBuf, language: Language) -> Self {
        Self {
            path,
            language,
            is_test_file: false,
            functions: vec![],
            classes: vec![],
            imports: vec![],
            text: TextMetrics::default(),
            features: FileFeatures::default(),
        }
    }

    pub fn max_cyclomatic(&self) -> u32 {
        self.functions.iter().map(|f| f.cyclomatic).max().unwrap_or(0)
    }

    pub fn max_function_length(&self) -> usize {
        self.functions.iter().map(|f| f.length).max().unwrap_or(0)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Copy, PartialOrd, Ord)]
pub enum SmellKind {
    LongMethod,
    LargeParameterList,
    GodClass,
    LazyClass,
    SpaghettiCode,
    PoorDocumentation,
    MisleadingComments,
    GlobalStateAbuse,
    FeatureEnvy,
    UntestedCode,
    FormattingIssues,
    UnstableModule,
}

impl SmellKind {
    pub const ALL: [SmellKind; 12] = [
        SmellKind::LongMethod,
        SmellKind::LargeParameterList,
        SmellKind::GodClass,
        SmellKind::LazyClass,
        SmellKind::SpaghettiCode,
        SmellKind::PoorDocumentation,
        SmellKind::MisleadingComments,
        SmellKind::GlobalStateAbuse,
        SmellKind::FeatureEnvy,
        SmellKind::UntestedCode,
        SmellKind::FormattingIssues,
        SmellKind::UnstableModule,
    ];

    /// Dataset target column for this smell
    pub fn target_name(&self) -> String {
        format!("y_{self:?}")
    }

    pub fn from_target_name(name: &str) -> Option<Self> {
        let kind = name.strip_prefix("y_")?;
        Self::ALL.iter().copied().find(|k| format!("{k:?}") == kind)
    }
}

impl std::fmt::Display for SmellKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        static DISPLAY_STRINGS: &[(SmellKind, &str)] = &[
            (SmellKind::LongMethod, "Long Method"),
            (SmellKind::LargeParameterList, "Large Parameter List"),
            (SmellKind::GodClass, "God Class"),
            (SmellKind::LazyClass, "Lazy Class"),
            (SmellKind::SpaghettiCode, "Spaghetti Code"),
            (SmellKind::PoorDocumentation, "Poor Documentation"),
            (SmellKind::MisleadingComments, "Misleading Comments"),
            (SmellKind::GlobalStateAbuse, "Global State Abuse"),
            (SmellKind::FeatureEnvy, "Feature Envy"),
            (SmellKind::UntestedCode, "Untested Code"),
            (SmellKind::FormattingIssues, "Formatting Issues"),
            (SmellKind::UnstableModule, "Unstable Module"),
        ];

        let display_str = DISPLAY_STRINGS
            .iter()
            .find(|(k, _)| k == self)
            .map(|(_, s)| *s)
            .unwrap_or("Unknown");

        write!(f, "{display_str}")
    }
}

/// Name of the aggregate target column
pub const ANY_SMELL_TARGET: &str = "y_any_smell";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Copy, Ord, PartialOrd)]
pub enum Severity {
    Info,
    Minor,
    Major,
    Critical,
    Blocker,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Info => "INFO",
            Severity::Minor => "MINOR",
            Severity::Major => "MAJOR",
            Severity::Critical => "CRITICAL",
            Severity::Blocker => "BLOCKER",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Copy)]
pub enum QualityLabel {
    Excellent,
    Good,
    Fair,
    Poor,
    VeryPoor,
}

impl QualityLabel {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => QualityLabel::Excellent,
            75..=89 => QualityLabel::Good,
            60..=74 => QualityLabel::Fair,
            40..=59 => QualityLabel::Poor,
            _ => QualityLabel::VeryPoor,
        }
    }
}

impl std::fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            QualityLabel::Excellent => "Excellent",
            QualityLabel::Good => "Good",
            QualityLabel::Fair => "Fair",
            QualityLabel::Poor => "Poor",
            QualityLabel::VeryPoor => "Very Poor",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_language_from_path() {
        assert_eq!(Language::from_path(Path::new("a/b.py")), Language::Python);
        assert_eq!(Language::from_path(Path::new("Main.java")), Language::Java);
        assert_eq!(Language::from_path(Path::new("x.HPP")), Language::Cpp);
        assert_eq!(Language::from_path(Path::new("README.md")), Language::Unknown);
        assert_eq!(Language::from_path(Path::new("Makefile")), Language::Unknown);
    }

    #[test]
    fn test_language_from_name() {
        assert_eq!(Language::from_name("C++"), Some(Language::Cpp));
        assert_eq!(Language::from_name(" Python "), Some(Language::Python));
        assert_eq!(Language::from_name("rust"), None);
    }

    #[test]
    fn test_feature_names_match_values() {
        let features = FileFeatures::default();
        assert_eq!(FileFeatures::NAMES.len(), features.values().len());
        assert_eq!(features.get("commit_count"), None);
        assert_eq!(features.get("lines_of_code"), Some(0.0));
        assert_eq!(features.get("no_such_column"), None);
    }

    #[test]
    fn test_smell_target_names_round_trip() {
        for kind in SmellKind::ALL {
            assert_eq!(SmellKind::from_target_name(&kind.target_name()), Some(kind));
        }
        assert_eq!(SmellKind::from_target_name(ANY_SMELL_TARGET), None);
    }

    #[test]
    fn test_quality_label_boundaries() {
        assert_eq!(QualityLabel::from_score(100), QualityLabel::Excellent);
        assert_eq!(QualityLabel::from_score(90), QualityLabel::Excellent);
        assert_eq!(QualityLabel::from_score(89), QualityLabel::Good);
        assert_eq!(QualityLabel::from_score(60), QualityLabel::Fair);
        assert_eq!(QualityLabel::from_score(40), QualityLabel::Poor);
        assert_eq!(QualityLabel::from_score(0), QualityLabel::VeryPoor);
    }
}
