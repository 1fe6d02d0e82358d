use super::SmellLabels;
use crate::analyzers::common::is_envious;
use crate::config::SmellThresholds;
use crate::core::{ClassMetrics, FileAnalysis, FunctionMetrics, Severity, SmellKind};
use serde::{Deserialize, Serialize};

/// A detected code smell with its location and the metric that triggered it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Smell {
    pub kind: SmellKind,
    pub severity: Severity,
    pub line: usize,
    /// Function, class or file the smell is attached to
    pub element: String,
    pub value: f64,
    pub threshold: f64,
    pub message: String,
}

/// Minor past the threshold, Major past twice it, Critical past four times
fn escalate(value: f64, threshold: f64) -> Severity {
    if threshold <= 0.0 {
        return Severity::Minor;
    }
    match value / threshold {
        r if r > 4.0 => Severity::Critical,
        r if r > 2.0 => Severity::Major,
        _ => Severity::Minor,
    }
}

pub struct SmellDetector {
    thresholds: SmellThresholds,
}

impl Default for SmellDetector {
    fn default() -> Self {
        Self::new(SmellThresholds::default())
    }
}

impl SmellDetector {
    pub fn new(thresholds: SmellThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &SmellThresholds {
        &self.thresholds
    }

    pub fn labels(&self, file: &FileAnalysis) -> SmellLabels {
        SmellLabels::from_smells(&self.detect(file))
    }

    /// Every smell in the file, ordered by kind then line
    pub fn detect(&self, file: &FileAnalysis) -> Vec<Smell> {
        let t = &self.thresholds;
        let file_name = file.path.display().to_string();

        let mut smells: Vec<Smell> = file
            .functions
            .iter()
            .flat_map(|f| {
                [
                    detect_long_method(f, t),
                    detect_large_parameter_list(f, t),
                    detect_spaghetti_code(f, t),
                    detect_feature_envy(f, t),
                ]
            })
            .flatten()
            .collect();

        smells.extend(
            file.classes
                .iter()
                .flat_map(|c| [detect_god_class(c, t), detect_lazy_class(c, t)])
                .flatten(),
        );

        smells.extend(
            [
                detect_poor_documentation(file, t),
                detect_misleading_comments(file, t),
                detect_global_state_abuse(file, t),
                detect_untested_code(file),
                detect_formatting_issues(file, t),
                detect_unstable_module(file, t),
            ]
            .into_iter()
            .flatten()
            .map(|mut smell| {
                smell.element = file_name.clone();
                smell
            }),
        );

        smells.sort_by_key(|s| (s.kind, s.line));
        smells
    }
}

fn detect_long_method(func: &FunctionMetrics, t: &SmellThresholds) -> Option<Smell> {
    let threshold = t.long_method_lines;
    (func.length > threshold).then(|| Smell {
        kind: SmellKind::LongMethod,
        severity: escalate(func.length as f64, threshold as f64),
        line: func.line,
        element: func.name.clone(),
        value: func.length as f64,
        threshold: threshold as f64,
        message: format!(
            "Function '{}' has {} lines (threshold: {})",
            func.name, func.length, threshold
        ),
    })
}

fn detect_large_parameter_list(func: &FunctionMetrics, t: &SmellThresholds) -> Option<Smell> {
    let threshold = t.max_parameters;
    (func.parameters > threshold).then(|| Smell {
        kind: SmellKind::LargeParameterList,
        severity: escalate(func.parameters as f64, threshold as f64),
        line: func.line,
        element: func.name.clone(),
        value: func.parameters as f64,
        threshold: threshold as f64,
        message: format!(
            "Function '{}' has {} parameters (threshold: {})",
            func.name, func.parameters, threshold
        ),
    })
}

fn detect_spaghetti_code(func: &FunctionMetrics, t: &SmellThresholds) -> Option<Smell> {
    if func.cyclomatic > t.cyclomatic {
        Some(Smell {
            kind: SmellKind::SpaghettiCode,
            severity: escalate(f64::from(func.cyclomatic), f64::from(t.cyclomatic)),
            line: func.line,
            element: func.name.clone(),
            value: f64::from(func.cyclomatic),
            threshold: f64::from(t.cyclomatic),
            message: format!(
                "Function '{}' has cyclomatic complexity {} (threshold: {})",
                func.name, func.cyclomatic, t.cyclomatic
            ),
        })
    } else if func.nesting > t.nesting_depth {
        Some(Smell {
            kind: SmellKind::SpaghettiCode,
            severity: escalate(f64::from(func.nesting), f64::from(t.nesting_depth)),
            line: func.line,
            element: func.name.clone(),
            value: f64::from(func.nesting),
            threshold: f64::from(t.nesting_depth),
            message: format!(
                "Function '{}' nests {} levels deep (threshold: {})",
                func.name, func.nesting, t.nesting_depth
            ),
        })
    } else {
        None
    }
}

fn detect_feature_envy(func: &FunctionMetrics, t: &SmellThresholds) -> Option<Smell> {
    if !func.is_method || !is_envious(func, t.feature_envy_ratio) {
        return None;
    }
    let threshold = (t.feature_envy_ratio * func.self_accesses as f64).max(3.0);
    Some(Smell {
        kind: SmellKind::FeatureEnvy,
        severity: escalate(func.foreign_accesses as f64, threshold),
        line: func.line,
        element: func.name.clone(),
        value: func.foreign_accesses as f64,
        threshold,
        message: format!(
            "Method '{}' uses other objects {} times and its own state {} times",
            func.name, func.foreign_accesses, func.self_accesses
        ),
    })
}

fn detect_god_class(class: &ClassMetrics, t: &SmellThresholds) -> Option<Smell> {
    let (value, threshold, what) = if class.methods > t.god_class_methods {
        (class.methods, t.god_class_methods, "methods")
    } else if class.line_count > t.god_class_lines {
        (class.line_count, t.god_class_lines, "lines")
    } else {
        return None;
    };
    Some(Smell {
        kind: SmellKind::GodClass,
        severity: escalate(value as f64, threshold as f64),
        line: class.line,
        element: class.name.clone(),
        value: value as f64,
        threshold: threshold as f64,
        message: format!(
            "Class '{}' has {} {} (threshold: {})",
            class.name, value, what, threshold
        ),
    })
}

fn detect_lazy_class(class: &ClassMetrics, t: &SmellThresholds) -> Option<Smell> {
    let lazy =
        class.methods <= t.lazy_class_methods && class.attributes <= 2 && class.line_count < 15;
    lazy.then(|| Smell {
        kind: SmellKind::LazyClass,
        severity: Severity::Minor,
        line: class.line,
        element: class.name.clone(),
        value: class.methods as f64,
        threshold: t.lazy_class_methods as f64,
        message: format!(
            "Class '{}' has {} methods and {} attributes in {} lines",
            class.name, class.methods, class.attributes, class.line_count
        ),
    })
}

fn detect_poor_documentation(file: &FileAnalysis, t: &SmellThresholds) -> Option<Smell> {
    let documentable = file.functions.len() + file.classes.len();
    let coverage = file.features.documentation_coverage;
    let threshold = t.documentation_coverage;
    if documentable < t.min_documentable || coverage >= threshold {
        return None;
    }
    let severity = if coverage < threshold / 4.0 {
        Severity::Critical
    } else if coverage < threshold / 2.0 {
        Severity::Major
    } else {
        Severity::Minor
    };
    Some(Smell {
        kind: SmellKind::PoorDocumentation,
        severity,
        line: 1,
        element: String::new(),
        value: coverage,
        threshold,
        message: format!(
            "{coverage:.1}% of {documentable} functions and classes are documented (threshold: {threshold:.0}%)"
        ),
    })
}

fn detect_misleading_comments(file: &FileAnalysis, t: &SmellThresholds) -> Option<Smell> {
    let score = file.features.comment_code_mismatch_score;
    let misleading = file.text.comment_lines >= 5 && score > t.comment_mismatch;
    misleading.then(|| Smell {
        kind: SmellKind::MisleadingComments,
        severity: Severity::Minor,
        line: 1,
        element: String::new(),
        value: score,
        threshold: t.comment_mismatch,
        message: format!(
            "{} of {} comment lines look like commented-out code",
            file.text.commented_out_code, file.text.comment_lines
        ),
    })
}

fn detect_global_state_abuse(file: &FileAnalysis, t: &SmellThresholds) -> Option<Smell> {
    let mutations = file.text.global_state_mutations;
    (mutations > t.global_mutations).then(|| Smell {
        kind: SmellKind::GlobalStateAbuse,
        severity: escalate(mutations as f64, t.global_mutations as f64),
        line: 1,
        element: String::new(),
        value: mutations as f64,
        threshold: t.global_mutations as f64,
        message: format!(
            "{} global state mutations (threshold: {})",
            mutations, t.global_mutations
        ),
    })
}

fn detect_untested_code(file: &FileAnalysis) -> Option<Smell> {
    let untested = !file.is_test_file
        && !file.functions.is_empty()
        && file.features.unit_test_presence == 0.0;
    untested.then(|| Smell {
        kind: SmellKind::UntestedCode,
        severity: Severity::Info,
        line: 1,
        element: String::new(),
        value: 0.0,
        threshold: 1.0,
        message: format!(
            "No test file found for {} functions",
            file.functions.len()
        ),
    })
}

fn detect_formatting_issues(file: &FileAnalysis, t: &SmellThresholds) -> Option<Smell> {
    let physical = file.text.physical_lines;
    if physical == 0 {
        return None;
    }
    let violations = file.text.formatting_violations();
    let ratio = violations as f64 / physical as f64;
    (ratio > t.formatting_ratio).then(|| Smell {
        kind: SmellKind::FormattingIssues,
        severity: Severity::Minor,
        line: 1,
        element: String::new(),
        value: ratio,
        threshold: t.formatting_ratio,
        message: format!(
            "{violations} formatting violations in {physical} lines ({} long, {} trailing whitespace, {} mixed indentation)",
            file.text.long_lines,
            file.text.trailing_whitespace_lines,
            file.text.mixed_indentation_lines
        ),
    })
}

fn detect_unstable_module(file: &FileAnalysis, t: &SmellThresholds) -> Option<Smell> {
    let features = &file.features;
    let commits = features.commit_count.unwrap_or(0.0);
    let authors = features.distinct_authors.unwrap_or(0.0);

    if commits >= t.unstable_commits as f64 && authors >= t.unstable_authors as f64 {
        return Some(Smell {
            kind: SmellKind::UnstableModule,
            severity: escalate(commits, t.unstable_commits as f64),
            line: 1,
            element: String::new(),
            value: commits,
            threshold: t.unstable_commits as f64,
            message: format!("Changed in {commits} commits by {authors} authors"),
        });
    }

    let unstable = features.instability > t.instability
        && features.efferent_coupling >= t.min_efferent as f64;
    unstable.then(|| Smell {
        kind: SmellKind::UnstableModule,
        severity: Severity::Minor,
        line: 1,
        element: String::new(),
        value: features.instability,
        threshold: t.instability,
        message: format!(
            "Instability {:.2} with {} outgoing dependencies",
            features.instability, features.efferent_coupling
        ),
    })
}
