//! Tree-sitter walk shared by the Python, Java and C++ analyzers.
//!
//! Each language describes its grammar through a [`LanguageSyntax`] table of
//! node kinds plus a [`LanguageProfile`] for the bits that need real code
//! (names, parameters, imports). Everything else, from complexity to class
//! cohesion, is computed here once.

use crate::core::ast::{Ast, SourceTree};
use crate::core::{ClassMetrics, FileAnalysis, FileFeatures, FunctionMetrics, Import, Language};
use crate::errors::{Error, Result};
use crate::metrics::halstead::{self, Halstead, TokenClasses};
use crate::metrics::loc_counter::LocCounter;
use crate::metrics::maintainability::{
    maintainability_index, maintainability_score, MaintainabilityInputs,
};
use crate::metrics::{round_to, text};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tree_sitter::{Node, Parser};

/// Files whose syntax tree nests deeper than this are reported as failures
/// instead of analyzed
pub const MAX_TREE_DEPTH: usize = 400;

/// Node kinds that drive the generic metrics
#[derive(Debug)]
pub struct LanguageSyntax {
    pub functions: &'static [&'static str],
    pub classes: &'static [&'static str],
    /// `if` statements
    pub branches: &'static [&'static str],
    /// Kinds that are always an `else if` (Python `elif`)
    pub else_ifs: &'static [&'static str],
    pub elses: &'static [&'static str],
    pub loops: &'static [&'static str],
    pub switches: &'static [&'static str],
    pub cases: &'static [&'static str],
    pub tries: &'static [&'static str],
    pub catches: &'static [&'static str],
    pub ternaries: &'static [&'static str],
    pub comprehension_ifs: &'static [&'static str],
    /// Blocks that nest without branching (`with`)
    pub scopes: &'static [&'static str],
    /// Kinds whose `operator` field may be `&&`/`||`/`and`/`or`
    pub boolean_ops: &'static [&'static str],
    pub tokens: TokenClasses,
}

/// Source bytes plus pre-split lines for the profile hooks
pub struct SourceContext<'a> {
    pub bytes: &'a [u8],
    pub lines: Vec<&'a str>,
}

impl<'a> SourceContext<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            bytes: source.as_bytes(),
            lines: source.lines().collect(),
        }
    }

    pub fn text(&self, node: Node<'_>) -> &'a str {
        node.utf8_text(self.bytes).unwrap_or("")
    }
}

pub enum MemberAccess {
    /// Access through `self`/`this`, with the member name
    Own(String),
    Foreign,
}

/// Language hooks for the generic walk
pub trait LanguageProfile {
    fn language(&self) -> Language;
    fn grammar(&self) -> tree_sitter::Language;
    fn syntax(&self) -> &'static LanguageSyntax;

    fn function_name(&self, node: Node<'_>, ctx: &SourceContext<'_>) -> String {
        node.child_by_field_name("name")
            .map(|n| ctx.text(n).to_string())
            .unwrap_or_else(|| "<anonymous>".to_string())
    }

    fn parameter_count(&self, node: Node<'_>, ctx: &SourceContext<'_>, is_method: bool) -> usize;

    fn is_async(&self, _node: Node<'_>, _ctx: &SourceContext<'_>) -> bool {
        false
    }

    fn has_docstring(&self, node: Node<'_>, ctx: &SourceContext<'_>) -> bool {
        preceding_doc_comment(node.start_position().row, &ctx.lines)
    }

    fn class_name(&self, node: Node<'_>, ctx: &SourceContext<'_>) -> String {
        node.child_by_field_name("name")
            .map(|n| ctx.text(n).to_string())
            .unwrap_or_else(|| "<anonymous>".to_string())
    }

    fn base_count(&self, node: Node<'_>, ctx: &SourceContext<'_>) -> usize;

    fn class_attributes(&self, node: Node<'_>, ctx: &SourceContext<'_>) -> HashSet<String>;

    /// Methods declared in the class body without a definition
    fn declared_methods(&self, _node: Node<'_>, _ctx: &SourceContext<'_>) -> usize {
        0
    }

    /// Whether bare identifiers can refer to instance members
    fn implicit_members(&self) -> bool {
        false
    }

    fn member_access(&self, node: Node<'_>, ctx: &SourceContext<'_>) -> Option<MemberAccess>;

    fn imports(&self, root: Node<'_>, ctx: &SourceContext<'_>) -> Vec<Import>;

    fn global_state_mutations(&self, root: Node<'_>, ctx: &SourceContext<'_>) -> usize;
}

/// Knobs that affect per-file feature values
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub max_line_length: usize,
    pub many_parameters: usize,
    pub feature_envy_ratio: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            max_line_length: 100,
            many_parameters: 5,
            feature_envy_ratio: 2.0,
        }
    }
}

pub fn parse_source(
    grammar: tree_sitter::Language,
    language: Language,
    content: &str,
    path: PathBuf,
) -> Result<Ast> {
    let mut parser = Parser::new();
    parser
        .set_language(&grammar)
        .map_err(|e| Error::Analysis(format!("failed to load {language} grammar: {e}")))?;
    let tree = parser
        .parse(content, None)
        .ok_or_else(|| Error::parse(&path, "parser produced no tree"))?;

    if exceeds_depth(tree.root_node(), MAX_TREE_DEPTH) {
        return Err(Error::parse(
            &path,
            format!("syntax tree nests deeper than {MAX_TREE_DEPTH} levels"),
        ));
    }

    if tree.root_node().has_error() {
        log::warn!(
            "{}: syntax errors found, analyzing the recoverable tree",
            path.display()
        );
    }

    Ok(Ast::wrap(
        language,
        SourceTree {
            tree,
            source: content.to_string(),
            path,
        },
    ))
}

/// Whether any node sits more than `limit` levels below `root`
fn exceeds_depth(root: Node<'_>, limit: usize) -> bool {
    let mut cursor = root.walk();
    let mut depth = 0;
    loop {
        if cursor.goto_first_child() {
            depth += 1;
            if depth > limit {
                return true;
            }
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return false;
            }
            depth -= 1;
        }
    }
}

pub fn analyze_tree(
    profile: &dyn LanguageProfile,
    tree: &SourceTree,
    options: &AnalysisOptions,
) -> FileAnalysis {
    let syntax = profile.syntax();
    let ctx = SourceContext::new(&tree.source);
    let root = tree.root();

    let mut function_nodes = Vec::new();
    let mut class_nodes = Vec::new();
    collect_definitions(root, syntax, &mut function_nodes, &mut class_nodes);

    let class_attributes: HashMap<usize, HashSet<String>> = class_nodes
        .iter()
        .map(|class| (class.id(), profile.class_attributes(*class, &ctx)))
        .collect();

    let mut functions = Vec::with_capacity(function_nodes.len());
    let mut member_sets: HashMap<usize, Vec<HashSet<String>>> = HashMap::new();

    for node in &function_nodes {
        let owner = enclosing_scope(*node, syntax).filter(|scope| is_class(*scope, syntax));
        let name = profile.function_name(*node, &ctx);
        let is_method = owner.is_some() || name.contains("::");
        let attributes = owner.and_then(|class| class_attributes.get(&class.id()));

        let mut metrics = FunctionMetrics::new(name, node.start_position().row + 1);
        metrics.length = node.end_position().row - node.start_position().row + 1;
        metrics.parameters = profile.parameter_count(*node, &ctx, is_method);
        metrics.cyclomatic = cyclomatic_complexity(*node, syntax, &ctx);
        metrics.cognitive = cognitive_complexity(*node, syntax);
        metrics.nesting = max_nesting(*node, syntax);
        metrics.has_docstring = profile.has_docstring(*node, &ctx);
        metrics.is_method = is_method;
        metrics.is_async = profile.is_async(*node, &ctx);

        let accesses = member_accesses(profile, *node, &ctx, attributes);
        metrics.self_accesses = accesses.own_count;
        metrics.foreign_accesses = accesses.foreign_count;

        if let Some(class) = owner {
            member_sets
                .entry(class.id())
                .or_default()
                .push(accesses.own_members);
        }
        functions.push(metrics);
    }

    let classes = class_nodes
        .iter()
        .map(|node| {
            let mut class = ClassMetrics::new(
                profile.class_name(*node, &ctx),
                node.start_position().row + 1,
            );
            let methods = member_sets.get(&node.id());
            class.line_count = node.end_position().row - node.start_position().row + 1;
            class.methods =
                methods.map_or(0, |m| m.len()) + profile.declared_methods(*node, &ctx);
            class.attributes = class_attributes.get(&node.id()).map_or(0, |a| a.len());
            class.base_count = profile.base_count(*node, &ctx);
            class.has_inheritance = class.base_count > 0;
            class.has_docstring = profile.has_docstring(*node, &ctx);
            class.lack_of_cohesion = methods.map_or(0.0, |m| lack_of_cohesion(m));
            class
        })
        .collect();

    let kinds = LocCounter::new(profile.language()).classify(&tree.source);
    let mut text_metrics = text::measure(
        &tree.source,
        &kinds,
        profile.language(),
        options.max_line_length,
    );
    text_metrics.global_state_mutations = profile.global_state_mutations(root, &ctx);

    let halstead = halstead::measure(root, &tree.source, &syntax.tokens);

    let mut analysis = FileAnalysis::empty(tree.path.clone(), profile.language());
    analysis.functions = functions;
    analysis.classes = classes;
    analysis.imports = profile.imports(root, &ctx);
    analysis.text = text_metrics;
    analysis.features = summarize(&analysis, &halstead, options);
    analysis
}

/// Fold per-element metrics into the flat feature row.
/// Project-level columns are left at their defaults.
pub fn summarize(
    analysis: &FileAnalysis,
    halstead: &Halstead,
    options: &AnalysisOptions,
) -> FileFeatures {
    let functions = &analysis.functions;
    let classes = &analysis.classes;
    let text = &analysis.text;

    let documentable = functions.len() + classes.len();
    let documented = functions.iter().filter(|f| f.has_docstring).count()
        + classes.iter().filter(|c| c.has_docstring).count();
    let coverage = documented as f64 / documentable.max(1) as f64;

    let total_decisions: u32 = functions
        .iter()
        .map(|f| f.cyclomatic.saturating_sub(1))
        .sum();
    let inputs = MaintainabilityInputs {
        lines_of_code: text.physical_lines,
        total_decisions,
        documentation_coverage: coverage,
        halstead_volume: halstead.volume(),
    };

    let feature_envy_methods = functions
        .iter()
        .filter(|f| f.is_method && is_envious(f, options.feature_envy_ratio))
        .count();

    FileFeatures {
        lines_of_code: text.physical_lines as f64,
        source_lines: text.code_lines as f64,
        comment_lines: text.comment_lines as f64,
        docstring_lines: text.docstring_lines as f64,
        blank_lines: text.blank_lines as f64,
        comment_percentage: if text.physical_lines == 0 {
            0.0
        } else {
            round_to(
                100.0 * text.comment_lines as f64 / text.physical_lines as f64,
                1,
            )
        },
        classes: classes.len() as f64,
        functions: functions.len() as f64,
        methods: functions.iter().filter(|f| f.is_method).count() as f64,
        async_functions: functions.iter().filter(|f| f.is_async).count() as f64,
        average_cyclomatic_complexity: average(
            functions.iter().map(|f| f64::from(f.cyclomatic)),
            functions.len(),
        ),
        max_cyclomatic_complexity: f64::from(analysis.max_cyclomatic()),
        average_cognitive_complexity: average(
            functions.iter().map(|f| f64::from(f.cognitive)),
            functions.len(),
        ),
        max_nesting_level: f64::from(functions.iter().map(|f| f.nesting).max().unwrap_or(0)),
        average_function_length: average(
            functions.iter().map(|f| f.length as f64),
            functions.len(),
        ),
        max_function_length: analysis.max_function_length() as f64,
        functions_over_20_lines: functions.iter().filter(|f| f.length > 20).count() as f64,
        functions_over_50_lines: functions.iter().filter(|f| f.length > 50).count() as f64,
        max_parameters: functions.iter().map(|f| f.parameters).max().unwrap_or(0) as f64,
        methods_with_many_parameters: functions
            .iter()
            .filter(|f| f.parameters > options.many_parameters)
            .count() as f64,
        average_methods_per_class: average(
            classes.iter().map(|c| c.methods as f64),
            classes.len(),
        ),
        max_methods_in_class: classes.iter().map(|c| c.methods).max().unwrap_or(0) as f64,
        classes_with_inheritance: classes.iter().filter(|c| c.has_inheritance).count() as f64,
        lack_of_cohesion: average(
            classes.iter().map(|c| c.lack_of_cohesion),
            classes.len(),
        ),
        documentation_coverage: round_to(coverage * 100.0, 1),
        total_imports: analysis.imports.len() as f64,
        halstead_volume: round_to(halstead.volume(), 2),
        halstead_difficulty: round_to(halstead.difficulty(), 2),
        halstead_effort: round_to(halstead.effort(), 2),
        halstead_estimated_bugs: round_to(halstead.estimated_bugs(), 4),
        duplicate_lines: text.duplicate_lines as f64,
        technical_debt_ratio: round_to(text::technical_debt_ratio(text), 1),
        long_lines: text.long_lines as f64,
        formatting_violations: text.formatting_violations() as f64,
        comment_code_mismatch_score: round_to(text::comment_code_mismatch(text), 2),
        global_state_mutations: text.global_state_mutations as f64,
        feature_envy_methods: feature_envy_methods as f64,
        maintainability_score: maintainability_score(&inputs),
        maintainability_index: round_to(maintainability_index(&inputs), 2),
        ..FileFeatures::default()
    }
}

fn average(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    round_to(values.sum::<f64>() / count as f64, 2)
}

pub fn is_envious(function: &FunctionMetrics, ratio: f64) -> bool {
    function.foreign_accesses > 3
        && function.foreign_accesses as f64 > ratio * function.self_accesses as f64
}

/// Children of `node` in reverse, ready to push on a depth-first stack
fn reversed_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut children: Vec<Node<'t>> = node.children(&mut node.walk()).collect();
    children.reverse();
    children
}

/// Function and class definitions in source order
fn collect_definitions<'t>(
    root: Node<'t>,
    syntax: &LanguageSyntax,
    functions: &mut Vec<Node<'t>>,
    classes: &mut Vec<Node<'t>>,
) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        let kind = node.kind();
        if syntax.functions.contains(&kind) {
            functions.push(node);
        } else if syntax.classes.contains(&kind) && node.child_by_field_name("body").is_some() {
            classes.push(node);
        }
        stack.extend(reversed_children(node));
    }
}

fn is_boundary(node: Node<'_>, syntax: &LanguageSyntax) -> bool {
    syntax.functions.contains(&node.kind()) || is_class(node, syntax)
}

fn is_class(node: Node<'_>, syntax: &LanguageSyntax) -> bool {
    syntax.classes.contains(&node.kind()) && node.child_by_field_name("body").is_some()
}

/// Nearest enclosing function or class definition
pub fn enclosing_scope<'t>(node: Node<'t>, syntax: &LanguageSyntax) -> Option<Node<'t>> {
    let mut current = node.parent();
    while let Some(parent) = current {
        if is_boundary(parent, syntax) {
            return Some(parent);
        }
        current = parent.parent();
    }
    None
}

/// Visit every descendant of `root` that belongs to it and not to a nested definition
fn for_each_owned<'t>(
    root: Node<'t>,
    syntax: &LanguageSyntax,
    visit: &mut dyn FnMut(Node<'t>),
) {
    let mut stack = owned_children(root, syntax);
    stack.reverse();
    while let Some(node) = stack.pop() {
        visit(node);
        let mut children = owned_children(node, syntax);
        children.reverse();
        stack.extend(children);
    }
}

/// Children that are not nested function or class definitions
fn owned_children<'t>(node: Node<'t>, syntax: &LanguageSyntax) -> Vec<Node<'t>> {
    node.children(&mut node.walk())
        .filter(|child| !is_boundary(*child, syntax))
        .collect()
}

fn is_boolean_op(node: Node<'_>, syntax: &LanguageSyntax) -> bool {
    syntax.boolean_ops.contains(&node.kind())
        && node
            .child_by_field_name("operator")
            .is_some_and(|op| matches!(op.kind(), "&&" | "||" | "and" | "or"))
}

fn operator_kind(node: Node<'_>) -> Option<&'static str> {
    node.child_by_field_name("operator").map(|op| op.kind())
}

fn is_case(node: Node<'_>, syntax: &LanguageSyntax, ctx: &SourceContext<'_>) -> bool {
    syntax.cases.contains(&node.kind()) && !ctx.text(node).trim_start().starts_with("default")
}

/// Whether `node` is the alternative branch of an enclosing `if`
fn is_alternative_of_if(node: Node<'_>, syntax: &LanguageSyntax) -> bool {
    node.parent().is_some_and(|parent| {
        syntax.branches.contains(&parent.kind())
            && parent
                .child_by_field_name("alternative")
                .is_some_and(|alt| alt.id() == node.id())
    })
}

fn is_else_if(node: Node<'_>, syntax: &LanguageSyntax) -> bool {
    let kind = node.kind();
    if syntax.else_ifs.contains(&kind) {
        return true;
    }
    syntax.branches.contains(&kind)
        && (is_alternative_of_if(node, syntax)
            || node
                .parent()
                .is_some_and(|parent| syntax.elses.contains(&parent.kind())))
}

fn is_plain_else(node: Node<'_>, syntax: &LanguageSyntax) -> bool {
    let kind = node.kind();
    if syntax.elses.contains(&kind) {
        // `else if` is scored on the inner `if`
        return !node
            .named_child(0)
            .is_some_and(|child| syntax.branches.contains(&child.kind()));
    }
    is_alternative_of_if(node, syntax)
        && !syntax.branches.contains(&kind)
        && !syntax.else_ifs.contains(&kind)
}

fn is_decision(node: Node<'_>, syntax: &LanguageSyntax, ctx: &SourceContext<'_>) -> bool {
    let kind = node.kind();
    syntax.branches.contains(&kind)
        || syntax.else_ifs.contains(&kind)
        || syntax.loops.contains(&kind)
        || syntax.catches.contains(&kind)
        || syntax.ternaries.contains(&kind)
        || syntax.comprehension_ifs.contains(&kind)
        || is_case(node, syntax, ctx)
        || is_boolean_op(node, syntax)
}

pub fn cyclomatic_complexity(
    function: Node<'_>,
    syntax: &LanguageSyntax,
    ctx: &SourceContext<'_>,
) -> u32 {
    let mut complexity = 1;
    for_each_owned(function, syntax, &mut |node| {
        if is_decision(node, syntax, ctx) {
            complexity += 1;
        }
    });
    complexity
}

pub fn cognitive_complexity(function: Node<'_>, syntax: &LanguageSyntax) -> u32 {
    let mut total = 0;
    let mut stack: Vec<(Node<'_>, u32)> = owned_children(function, syntax)
        .into_iter()
        .map(|child| (child, 0))
        .collect();
    while let Some((node, nesting)) = stack.pop() {
        let (increment, child_nesting) = cognitive_increment(node, syntax, nesting);
        total += increment;
        stack.extend(
            owned_children(node, syntax)
                .into_iter()
                .map(|child| (child, child_nesting)),
        );
    }
    total
}

/// Score of `node` itself and the nesting level its children see
fn cognitive_increment(node: Node<'_>, syntax: &LanguageSyntax, nesting: u32) -> (u32, u32) {
    let kind = node.kind();

    if is_else_if(node, syntax) || is_plain_else(node, syntax) {
        (1, nesting)
    } else if syntax.branches.contains(&kind)
        || syntax.loops.contains(&kind)
        || syntax.switches.contains(&kind)
        || syntax.catches.contains(&kind)
        || syntax.ternaries.contains(&kind)
    {
        (1 + nesting, nesting + 1)
    } else if is_boolean_op(node, syntax) && !continues_boolean_sequence(node, syntax) {
        (1, nesting)
    } else {
        (0, nesting)
    }
}

/// `a && b && c` costs once: the inner operator continues its parent's sequence
fn continues_boolean_sequence(node: Node<'_>, syntax: &LanguageSyntax) -> bool {
    node.parent().is_some_and(|parent| {
        is_boolean_op(parent, syntax) && operator_kind(parent) == operator_kind(node)
    })
}

pub fn max_nesting(function: Node<'_>, syntax: &LanguageSyntax) -> u32 {
    let mut deepest = 0;
    let mut stack: Vec<(Node<'_>, u32)> = owned_children(function, syntax)
        .into_iter()
        .map(|child| (child, 0))
        .collect();
    while let Some((node, depth)) = stack.pop() {
        let depth = if nests(node, syntax) { depth + 1 } else { depth };
        deepest = deepest.max(depth);
        stack.extend(
            owned_children(node, syntax)
                .into_iter()
                .map(|child| (child, depth)),
        );
    }
    deepest
}

fn nests(node: Node<'_>, syntax: &LanguageSyntax) -> bool {
    let kind = node.kind();
    (syntax.branches.contains(&kind) && !is_else_if(node, syntax))
        || syntax.loops.contains(&kind)
        || syntax.switches.contains(&kind)
        || syntax.tries.contains(&kind)
        || syntax.scopes.contains(&kind)
}

struct Accesses {
    own_count: usize,
    foreign_count: usize,
    own_members: HashSet<String>,
}

fn member_accesses(
    profile: &dyn LanguageProfile,
    function: Node<'_>,
    ctx: &SourceContext<'_>,
    class_attributes: Option<&HashSet<String>>,
) -> Accesses {
    let syntax = profile.syntax();
    let implicit = if profile.implicit_members() {
        class_attributes
    } else {
        None
    };
    let body = function.child_by_field_name("body").unwrap_or(function);

    let mut accesses = Accesses {
        own_count: 0,
        foreign_count: 0,
        own_members: HashSet::new(),
    };
    let mut explicit_fields = HashSet::new();

    for_each_owned(body, syntax, &mut |node| {
        match profile.member_access(node, ctx) {
            Some(MemberAccess::Own(name)) => {
                accesses.own_count += 1;
                if let Some(field) = node.child_by_field_name("field") {
                    explicit_fields.insert(field.id());
                }
                accesses.own_members.insert(name);
            }
            Some(MemberAccess::Foreign) => accesses.foreign_count += 1,
            None => {}
        }
    });

    if let Some(attributes) = implicit {
        for_each_owned(body, syntax, &mut |node| {
            if node.kind() == "identifier" && !explicit_fields.contains(&node.id()) {
                let name = ctx.text(node);
                let is_member_position = node
                    .parent()
                    .and_then(|p| p.child_by_field_name("field"))
                    .is_some_and(|f| f.id() == node.id());
                if attributes.contains(name) && !is_member_position {
                    accesses.own_count += 1;
                    accesses.own_members.insert(name.to_string());
                }
            }
        });
    }

    accesses
}

/// Fraction of method pairs that share no instance attribute
pub fn lack_of_cohesion(methods: &[HashSet<String>]) -> f64 {
    if methods.len() < 2 {
        return 0.0;
    }
    let mut pairs = 0usize;
    let mut disjoint = 0usize;
    for (i, a) in methods.iter().enumerate() {
        for b in &methods[i + 1..] {
            pairs += 1;
            if a.is_disjoint(b) {
                disjoint += 1;
            }
        }
    }
    round_to(disjoint as f64 / pairs as f64, 2)
}

/// Doc comment within the three lines above `start_row`, skipping annotations
pub fn preceding_doc_comment(start_row: usize, lines: &[&str]) -> bool {
    for row in (0..start_row.min(lines.len())).rev().take(3) {
        let line = lines[row].trim();
        if line.starts_with("//") || line.starts_with("/*") {
            return true;
        }
        if line.starts_with('*') {
            return continues_block_comment(row, lines);
        }
        if line.is_empty() || line.starts_with('@') || line.starts_with("template") {
            continue;
        }
        return false;
    }
    false
}

/// Whether a `*`-led line at `row` belongs to a `/* ... */` block opened above it
fn continues_block_comment(row: usize, lines: &[&str]) -> bool {
    lines[..=row]
        .iter()
        .rev()
        .map(|line| line.trim())
        .find(|line| !line.starts_with('*'))
        .is_some_and(|line| line.starts_with("/*"))
}

/// Named children of a field, skipping comments
pub fn named_children_of<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    node.named_children(&mut node.walk())
        .filter(|child| !child.kind().contains("comment"))
        .collect()
}

/// First descendant (depth-first, including `node`) whose kind is in `kinds`
pub fn find_descendant<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if kinds.contains(&current.kind()) {
            return Some(current);
        }
        stack.extend(reversed_children(current));
    }
    None
}
