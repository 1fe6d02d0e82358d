use crate::core::SmellKind;
use crate::smells::Smell;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Suggestion {
    pub title: String,
    pub action: String,
}

/// A concrete refactoring step for `smell`, naming the element and the
/// metric that triggered it
pub fn suggest(smell: &Smell) -> Suggestion {
    let element = &smell.element;
    let value = format_metric(smell.value);
    let threshold = format_metric(smell.threshold);

    let (title, action) = match smell.kind {
        SmellKind::LongMethod => (
            format!("Split '{element}' into smaller functions"),
            format!(
                "'{element}' spans {value} lines (limit {threshold}). Extract each distinct step \
                 into a named helper and keep '{element}' as the coordinator."
            ),
        ),
        SmellKind::LargeParameterList => (
            format!("Introduce a parameter object for '{element}'"),
            format!(
                "'{element}' takes {value} parameters (limit {threshold}). Group the values that \
                 travel together into a struct or data class, or move them onto the receiver."
            ),
        ),
        SmellKind::GodClass => (
            format!("Break up class '{element}'"),
            format!(
                "'{element}' measures {value} against a limit of {threshold}. Identify clusters of \
                 methods sharing the same attributes and extract each cluster into its own class."
            ),
        ),
        SmellKind::LazyClass => (
            format!("Inline or merge class '{element}'"),
            format!(
                "'{element}' has only {value} method(s). Fold it into its single caller or merge \
                 it with a closely related class."
            ),
        ),
        SmellKind::SpaghettiCode => (
            format!("Flatten control flow in '{element}'"),
            format!(
                "'{element}' scores {value} against a limit of {threshold}. Replace nested \
                 conditionals with guard clauses and move branches into separate functions."
            ),
        ),
        SmellKind::PoorDocumentation => (
            "Document the public functions and classes".to_string(),
            format!(
                "Documentation coverage is {value}% (target {threshold}%). Add docstrings or doc \
                 comments to every public function and class in {element}."
            ),
        ),
        SmellKind::MisleadingComments => (
            "Delete commented-out code".to_string(),
            format!(
                "A share of {value} of the comments in {element} looks like dead code (limit \
                 {threshold}). Remove it; version control keeps the history."
            ),
        ),
        SmellKind::GlobalStateAbuse => (
            "Pass state explicitly".to_string(),
            format!(
                "{element} mutates global state {value} times (limit {threshold}). Move the state \
                 into an object owned by the caller and pass it as an argument."
            ),
        ),
        SmellKind::FeatureEnvy => (
            format!("Move '{element}' closer to its data"),
            format!(
                "'{element}' touches another object {value} times (limit {threshold}). Move the \
                 method, or the part using that object, onto the class that owns the data."
            ),
        ),
        SmellKind::UntestedCode => (
            "Add unit tests".to_string(),
            format!(
                "No test file was found for {element}. Add tests for its public functions, \
                 starting with the most complex ones."
            ),
        ),
        SmellKind::FormattingIssues => (
            "Run a formatter".to_string(),
            format!(
                "Formatting violations hit {value} of the lines in {element} (limit {threshold}). \
                 Apply the project formatter and enforce it in CI."
            ),
        ),
        SmellKind::UnstableModule => (
            "Stabilize the module interface".to_string(),
            format!(
                "{element} measures {value} against a limit of {threshold}. Depend on abstractions \
                 instead of concrete modules and split frequently changing parts out."
            ),
        ),
    };
    Suggestion { title, action }
}

fn format_metric(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
