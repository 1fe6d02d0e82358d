//! Line-level hygiene measurements that do not need a syntax tree.

use crate::core::{Language, TextMetrics};
use crate::metrics::loc_counter::{tally, LineKind};
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Lines at or below this length never count as duplicates
const MIN_DUPLICATE_LINE_LEN: usize = 10;

static DEBT_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(TODO|FIXME)\b").unwrap());

static PYTHON_BARE_EXCEPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*except\s*:").unwrap());

static CATCH_ALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"catch\s*\(\s*\.\.\.\s*\)").unwrap());

static CODE_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(return|if|elif|else|for|while|def|class|import|from|try|except|catch|switch|case|public|private|protected|static|const|int|void|auto|#include)\b",
    )
    .unwrap()
});

/// Measure text hygiene for `content`, reusing the LOC classification
pub fn measure(
    content: &str,
    kinds: &[LineKind],
    language: Language,
    max_line_length: usize,
) -> TextMetrics {
    let loc = tally(kinds);
    let mut metrics = TextMetrics {
        physical_lines: loc.physical_lines,
        code_lines: loc.code_lines,
        comment_lines: loc.comment_lines,
        docstring_lines: loc.docstring_lines,
        blank_lines: loc.blank_lines,
        ..TextMetrics::default()
    };

    let mut seen = HashSet::new();

    for (line, kind) in content.lines().zip(kinds.iter().copied()) {
        if line.chars().count() > max_line_length {
            metrics.long_lines += 1;
        }
        if line.ends_with(' ') || line.ends_with('\t') {
            metrics.trailing_whitespace_lines += 1;
        }
        if has_mixed_indentation(line) {
            metrics.mixed_indentation_lines += 1;
        }
        if DEBT_MARKER.is_match(line) {
            metrics.debt_markers += 1;
        }

        match kind {
            LineKind::Code => {
                if is_swallow_site(line, language) {
                    metrics.swallowed_errors += 1;
                }
                let normalized = normalize(line);
                if normalized.len() > MIN_DUPLICATE_LINE_LEN && !seen.insert(line_hash(&normalized))
                {
                    metrics.duplicate_lines += 1;
                }
            }
            LineKind::Comment => {
                if looks_like_code(&strip_comment_markers(line)) {
                    metrics.commented_out_code += 1;
                }
            }
            LineKind::Docstring | LineKind::Blank => {}
        }
    }

    metrics
}

/// 100 × (long lines + debt markers + swallow sites) / physical lines
pub fn technical_debt_ratio(metrics: &TextMetrics) -> f64 {
    if metrics.physical_lines == 0 {
        return 0.0;
    }
    let issues = metrics.long_lines + metrics.debt_markers + metrics.swallowed_errors;
    100.0 * issues as f64 / metrics.physical_lines as f64
}

/// Fraction of comment lines that look like commented-out code
pub fn comment_code_mismatch(metrics: &TextMetrics) -> f64 {
    if metrics.comment_lines == 0 {
        return 0.0;
    }
    metrics.commented_out_code as f64 / metrics.comment_lines as f64
}

fn has_mixed_indentation(line: &str) -> bool {
    let indent: String = line
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect();
    indent.contains(' ') && indent.contains('\t')
}

fn is_swallow_site(line: &str, language: Language) -> bool {
    match language {
        Language::Python => PYTHON_BARE_EXCEPT.is_match(line),
        Language::Java | Language::Cpp => CATCH_ALL.is_match(line),
        Language::Unknown => false,
    }
}

fn normalize(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn line_hash(normalized: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hasher.finalize().into()
}

fn strip_comment_markers(line: &str) -> String {
    let trimmed = line.trim();
    let trimmed = trimmed
        .strip_prefix("//")
        .or_else(|| trimmed.strip_prefix("/*"))
        .or_else(|| trimmed.strip_prefix('#'))
        .or_else(|| trimmed.strip_prefix('*'))
        .unwrap_or(trimmed);
    let trimmed = trimmed.trim();
    trimmed.strip_suffix("*/").unwrap_or(trimmed).trim().to_string()
}

fn looks_like_code(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    text.ends_with(';')
        || text.ends_with('{')
        || text.ends_with('}')
        || text.ends_with(')')
        || text.ends_with(':')
        || text.contains(" = ")
        || CODE_KEYWORD.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::loc_counter::LocCounter;
    use indoc::indoc;

    fn run(source: &str, language: Language) -> TextMetrics {
        let kinds = LocCounter::new(language).classify(source);
        measure(source, &kinds, language, 100)
    }

    #[test]
    fn test_python_hygiene() {
        let source = indoc! {"
            # TODO: remove
            # x = compute()
            # explains the intent
            try:
                total = compute_total(items)
            except:
                total = compute_total(items)
        "};
        let m = run(source, Language::Python);
        assert_eq!(m.debt_markers, 1);
        assert_eq!(m.swallowed_errors, 1);
        assert_eq!(m.duplicate_lines, 1);
        assert_eq!(m.comment_lines, 3);
        assert_eq!(m.commented_out_code, 1);
        assert!((technical_debt_ratio(&m) - 200.0 / 7.0).abs() < 1e-9);
        assert!((comment_code_mismatch(&m) - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_formatting_counters() {
        let long = format!("int x = {};\n", "1".repeat(120));
        let source = format!("{long}int y = 2;  \n\t  int z = 3;\n");
        let m = run(&source, Language::Cpp);
        assert_eq!(m.long_lines, 1);
        assert_eq!(m.trailing_whitespace_lines, 1);
        assert_eq!(m.mixed_indentation_lines, 1);
        assert_eq!(m.formatting_violations(), 3);
    }

    #[test]
    fn test_catch_all_is_a_swallow_site() {
        let m = run("try { f(); } catch (...) { }\n", Language::Cpp);
        assert_eq!(m.swallowed_errors, 1);
    }

    #[test]
    fn test_short_repeated_lines_are_not_duplicates() {
        let m = run("x = 1\nx = 1\n", Language::Python);
        assert_eq!(m.duplicate_lines, 0);
    }

    #[test]
    fn test_ratios_on_empty_input() {
        let m = TextMetrics::default();
        assert_eq!(technical_debt_ratio(&m), 0.0);
        assert_eq!(comment_code_mismatch(&m), 0.0);
    }
}
