//! Language-aware line classification
//!
//! Every physical line is classified as exactly one of code, comment,
//! docstring or blank, so `physical_lines == code_lines + comment_lines +
//! docstring_lines + blank_lines` always holds.
//!
//! - Python: `#` comments, and `"""`/`'''` blocks that start a line are
//!   docstrings. Triple-quoted strings that follow code on the same line
//!   (`x = """...`) are code, including their continuation lines.
//! - Java/C++: `//` and `/* */` comments with block-comment state tracking.
//!
//! Comment markers inside ordinary string literals are not detected.

use crate::core::Language;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    Docstring,
    Code,
}

/// Line counts for a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocCount {
    pub physical_lines: usize,
    pub code_lines: usize,
    pub comment_lines: usize,
    pub docstring_lines: usize,
    pub blank_lines: usize,
}

impl LocCount {
    pub fn comment_percentage(&self) -> f64 {
        if self.physical_lines == 0 {
            return 0.0;
        }
        100.0 * self.comment_lines as f64 / self.physical_lines as f64
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LocCounter {
    language: Language,
}

impl LocCounter {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    /// Classify every line of `content`, in order
    pub fn classify(&self, content: &str) -> Vec<LineKind> {
        let mut state = ScanState::default();
        content
            .lines()
            .map(|line| classify_line(line.trim(), &mut state, self.language))
            .collect()
    }

    pub fn count(&self, content: &str) -> LocCount {
        tally(&self.classify(content))
    }
}

pub fn tally(kinds: &[LineKind]) -> LocCount {
    kinds.iter().fold(
        LocCount {
            physical_lines: kinds.len(),
            ..LocCount::default()
        },
        |mut count, kind| {
            match kind {
                LineKind::Blank => count.blank_lines += 1,
                LineKind::Comment => count.comment_lines += 1,
                LineKind::Docstring => count.docstring_lines += 1,
                LineKind::Code => count.code_lines += 1,
            }
            count
        },
    )
}

#[derive(Clone, Debug, Default)]
struct ScanState {
    in_block_comment: bool,
    /// Open triple-quote delimiter and whether it opened a docstring
    open_triple: Option<(&'static str, LineKind)>,
}

fn classify_line(trimmed: &str, state: &mut ScanState, language: Language) -> LineKind {
    match language {
        Language::Python => classify_python_line(trimmed, state),
        Language::Java | Language::Cpp => classify_c_family_line(trimmed, state),
        Language::Unknown => {
            if trimmed.is_empty() {
                LineKind::Blank
            } else {
                LineKind::Code
            }
        }
    }
}

fn classify_python_line(trimmed: &str, state: &mut ScanState) -> LineKind {
    if let Some((delimiter, kind)) = state.open_triple {
        if trimmed.contains(delimiter) {
            state.open_triple = None;
        }
        return kind;
    }

    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if trimmed.starts_with('#') {
        return LineKind::Comment;
    }

    let body = strip_string_prefix(trimmed);
    if let Some(delimiter) = triple_quote_at_start(body) {
        let rest = &body[3..];
        if !rest.contains(delimiter) {
            state.open_triple = Some((delimiter, LineKind::Docstring));
        }
        return LineKind::Docstring;
    }

    if let Some(delimiter) = unclosed_triple_quote(trimmed) {
        state.open_triple = Some((delimiter, LineKind::Code));
    }
    LineKind::Code
}

fn strip_string_prefix(s: &str) -> &str {
    let prefix_len = s
        .chars()
        .take(2)
        .take_while(|c| matches!(c, 'r' | 'R' | 'u' | 'U' | 'b' | 'B' | 'f' | 'F'))
        .count();
    let rest = &s[prefix_len..];
    if triple_quote_at_start(rest).is_some() {
        rest
    } else {
        s
    }
}

fn triple_quote_at_start(s: &str) -> Option<&'static str> {
    if s.starts_with("\"\"\"") {
        Some("\"\"\"")
    } else if s.starts_with("'''") {
        Some("'''")
    } else {
        None
    }
}

/// A triple quote that opens on this line and does not close on it
fn unclosed_triple_quote(line: &str) -> Option<&'static str> {
    ["\"\"\"", "'''"]
        .into_iter()
        .find(|delimiter| line.matches(delimiter).count() % 2 == 1)
}

fn classify_c_family_line(trimmed: &str, state: &mut ScanState) -> LineKind {
    if trimmed.is_empty() {
        return if state.in_block_comment {
            LineKind::Comment
        } else {
            LineKind::Blank
        };
    }

    if state.in_block_comment {
        match trimmed.find("*/") {
            Some(end) => {
                state.in_block_comment = false;
                let after = trimmed[end + 2..].trim();
                if after.is_empty() || after.starts_with("//") {
                    return LineKind::Comment;
                }
                // code after the block closes, which may open another block
                scan_code_segment(after, state);
                return LineKind::Code;
            }
            None => return LineKind::Comment,
        }
    }

    if trimmed.starts_with("//") {
        return LineKind::Comment;
    }

    if let Some(rest) = trimmed.strip_prefix("/*") {
        match rest.find("*/") {
            None => {
                state.in_block_comment = true;
                return LineKind::Comment;
            }
            Some(end) => {
                let after = rest[end + 2..].trim();
                if after.is_empty() || after.starts_with("//") {
                    return LineKind::Comment;
                }
                scan_code_segment(after, state);
                return LineKind::Code;
            }
        }
    }

    scan_code_segment(trimmed, state);
    LineKind::Code
}

/// Track block comments opened after code on the same line
fn scan_code_segment(segment: &str, state: &mut ScanState) {
    let mut rest = segment;
    loop {
        let open = rest.find("/*");
        let line_comment = rest.find("//");
        match (open, line_comment) {
            (Some(o), Some(l)) if l < o => return,
            (Some(o), _) => {
                let after_open = &rest[o + 2..];
                match after_open.find("*/") {
                    Some(close) => rest = &after_open[close + 2..],
                    None => {
                        state.in_block_comment = true;
                        return;
                    }
                }
            }
            _ => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn assert_invariant(count: &LocCount) {
        assert_eq!(
            count.physical_lines,
            count.code_lines + count.comment_lines + count.docstring_lines + count.blank_lines
        );
    }

    #[test]
    fn test_python_comments_and_docstrings() {
        let source = indoc! {r#"
            """Module docstring."""
            # a comment

            def f(x):
                """
                Multi-line docstring.
                """
                return x  # trailing comment is code
        "#};
        let count = LocCounter::new(Language::Python).count(source);
        assert_eq!(count.physical_lines, 8);
        assert_eq!(count.docstring_lines, 4);
        assert_eq!(count.comment_lines, 1);
        assert_eq!(count.blank_lines, 1);
        assert_eq!(count.code_lines, 2);
        assert_invariant(&count);
    }

    #[test]
    fn test_python_assigned_triple_string_is_code() {
        let source = "QUERY = \"\"\"\nSELECT 1\n\n\"\"\"\nx = 1\n";
        let kinds = LocCounter::new(Language::Python).classify(source);
        assert_eq!(
            kinds,
            vec![
                LineKind::Code,
                LineKind::Code,
                LineKind::Code,
                LineKind::Code,
                LineKind::Code
            ]
        );
    }

    #[test]
    fn test_java_block_comments() {
        let source = indoc! {"
            /**
             * Javadoc
             */
            public class A {
                int x = 1; /* trailing
                still comment */
                // line
            }
        "};
        let count = LocCounter::new(Language::Java).count(source);
        assert_eq!(count.comment_lines, 5);
        assert_eq!(count.code_lines, 3);
        assert_eq!(count.docstring_lines, 0);
        assert_invariant(&count);
    }

    #[test]
    fn test_cpp_code_after_block_close() {
        let source = "/* a */ int x;\n/* b\n*/ int y; /* c\n*/\n";
        let kinds = LocCounter::new(Language::Cpp).classify(source);
        assert_eq!(
            kinds,
            vec![
                LineKind::Code,
                LineKind::Comment,
                LineKind::Code,
                LineKind::Comment
            ]
        );
    }

    #[test]
    fn test_comment_percentage() {
        let count = LocCounter::new(Language::Python).count("# c\nx = 1\n");
        assert!((count.comment_percentage() - 50.0).abs() < f64::EPSILON);
        assert_eq!(LocCount::default().comment_percentage(), 0.0);
    }

    #[test]
    fn test_empty_content() {
        let count = LocCounter::new(Language::Cpp).count("");
        assert_eq!(count, LocCount::default());
    }
}
