//! Halstead measures computed from tree-sitter leaf tokens.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tree_sitter::Node;

/// Node kinds that decide how a token is counted
#[derive(Debug, Clone, Copy)]
pub struct TokenClasses {
    /// Leaf kinds counted as operands (identifiers, numbers, keywords like `true`)
    pub operands: &'static [&'static str],
    /// Composite kinds counted as one operand without descending (string literals)
    pub atoms: &'static [&'static str],
    /// Kinds that are not tokens at all (comments)
    pub skipped: &'static [&'static str],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Halstead {
    pub distinct_operators: usize,
    pub distinct_operands: usize,
    pub total_operators: usize,
    pub total_operands: usize,
}

impl Halstead {
    pub fn vocabulary(&self) -> usize {
        self.distinct_operators + self.distinct_operands
    }

    pub fn length(&self) -> usize {
        self.total_operators + self.total_operands
    }

    pub fn volume(&self) -> f64 {
        let n = self.vocabulary();
        if n == 0 {
            return 0.0;
        }
        self.length() as f64 * (n as f64).log2()
    }

    pub fn difficulty(&self) -> f64 {
        if self.vocabulary() == 0 || self.distinct_operands == 0 {
            return 0.0;
        }
        (self.distinct_operators as f64 / 2.0)
            * (self.total_operands as f64 / self.distinct_operands as f64)
    }

    pub fn effort(&self) -> f64 {
        self.difficulty() * self.volume()
    }

    pub fn estimated_bugs(&self) -> f64 {
        self.volume() / 3000.0
    }
}

#[derive(Default)]
struct TokenCounts<'a> {
    operators: HashMap<&'a str, usize>,
    operands: HashMap<&'a str, usize>,
}

pub fn measure(root: Node<'_>, source: &str, classes: &TokenClasses) -> Halstead {
    let mut counts = TokenCounts::default();
    collect_tokens(root, source.as_bytes(), classes, &mut counts);

    Halstead {
        distinct_operators: counts.operators.len(),
        distinct_operands: counts.operands.len(),
        total_operators: counts.operators.values().sum(),
        total_operands: counts.operands.values().sum(),
    }
}

fn collect_tokens<'a>(
    root: Node<'_>,
    source: &'a [u8],
    classes: &TokenClasses,
    counts: &mut TokenCounts<'a>,
) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        let kind = node.kind();
        if classes.skipped.contains(&kind) {
            continue;
        }

        if classes.atoms.contains(&kind) || node.child_count() == 0 {
            let Ok(text) = std::str::from_utf8(&source[node.byte_range()]) else {
                continue;
            };
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            let bucket = if classes.atoms.contains(&kind) || classes.operands.contains(&kind) {
                &mut counts.operands
            } else {
                &mut counts.operators
            };
            *bucket.entry(text).or_insert(0) += 1;
            continue;
        }

        stack.extend(node.children(&mut node.walk()));
    }
}
