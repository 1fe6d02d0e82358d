use crate::analyzers::common::{
    analyze_tree, named_children_of, parse_source, AnalysisOptions, LanguageProfile,
    LanguageSyntax, MemberAccess, SourceContext,
};
use crate::analyzers::Analyzer;
use crate::core::ast::Ast;
use crate::core::{FileAnalysis, Import, ImportKind, Language};
use crate::errors::Result;
use crate::metrics::halstead::TokenClasses;
use std::collections::HashSet;
use std::path::PathBuf;
use tree_sitter::Node;

static PYTHON_SYNTAX: LanguageSyntax = LanguageSyntax {
    functions: &["function_definition"],
    classes: &["class_definition"],
    branches: &["if_statement"],
    else_ifs: &["elif_clause"],
    elses: &["else_clause"],
    loops: &["for_statement", "while_statement"],
    switches: &["match_statement"],
    cases: &["case_clause"],
    tries: &["try_statement"],
    catches: &["except_clause", "except_group_clause"],
    ternaries: &["conditional_expression"],
    comprehension_ifs: &["if_clause"],
    scopes: &["with_statement"],
    boolean_ops: &["boolean_operator"],
    tokens: TokenClasses {
        operands: &["identifier", "integer", "float", "true", "false", "none"],
        atoms: &["string", "concatenated_string"],
        skipped: &["comment"],
    },
};

pub struct PythonAnalyzer {
    options: AnalysisOptions,
}

impl PythonAnalyzer {
    pub fn new() -> Self {
        Self::with_options(AnalysisOptions::default())
    }

    pub fn with_options(options: AnalysisOptions) -> Self {
        Self { options }
    }
}

impl Default for PythonAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for PythonAnalyzer {
    fn parse(&self, content: &str, path: PathBuf) -> Result<Ast> {
        parse_source(self.grammar(), Language::Python, content, path)
    }

    fn analyze(&self, ast: &Ast) -> FileAnalysis {
        match ast {
            Ast::Python(tree) => analyze_tree(self, tree, &self.options),
            _ => FileAnalysis::empty(PathBuf::new(), Language::Python),
        }
    }

    fn language(&self) -> Language {
        Language::Python
    }
}

impl LanguageProfile for PythonAnalyzer {
    fn language(&self) -> Language {
        Language::Python
    }

    fn grammar(&self) -> tree_sitter::Language {
        tree_sitter_python::LANGUAGE.into()
    }

    fn syntax(&self) -> &'static LanguageSyntax {
        &PYTHON_SYNTAX
    }

    fn parameter_count(&self, node: Node<'_>, ctx: &SourceContext<'_>, is_method: bool) -> usize {
        let Some(parameters) = node.child_by_field_name("parameters") else {
            return 0;
        };
        let params: Vec<Node> = named_children_of(parameters)
            .into_iter()
            .filter(|p| !matches!(p.kind(), "keyword_separator" | "positional_separator"))
            .collect();

        let receiver = is_method
            && params
                .first()
                .and_then(|first| parameter_name(*first, ctx))
                .is_some_and(|name| name == "self" || name == "cls");

        params.len() - usize::from(receiver)
    }

    fn is_async(&self, node: Node<'_>, _ctx: &SourceContext<'_>) -> bool {
        node.child(0).is_some_and(|first| first.kind() == "async")
    }

    fn has_docstring(&self, node: Node<'_>, _ctx: &SourceContext<'_>) -> bool {
        node.child_by_field_name("body")
            .and_then(|body| named_children_of(body).into_iter().next())
            .filter(|first| first.kind() == "expression_statement")
            .and_then(|stmt| stmt.named_child(0))
            .is_some_and(|expr| matches!(expr.kind(), "string" | "concatenated_string"))
    }

    fn base_count(&self, node: Node<'_>, _ctx: &SourceContext<'_>) -> usize {
        node.child_by_field_name("superclasses")
            .map(|args| {
                named_children_of(args)
                    .into_iter()
                    .filter(|arg| arg.kind() != "keyword_argument")
                    .count()
            })
            .unwrap_or(0)
    }

    fn class_attributes(&self, node: Node<'_>, ctx: &SourceContext<'_>) -> HashSet<String> {
        let mut attributes = HashSet::new();
        let Some(body) = node.child_by_field_name("body") else {
            return attributes;
        };

        // class-level assignments
        for stmt in named_children_of(body) {
            if stmt.kind() != "expression_statement" {
                continue;
            }
            if let Some(target) = stmt
                .named_child(0)
                .filter(|e| e.kind() == "assignment")
                .and_then(|a| a.child_by_field_name("left"))
                .filter(|left| left.kind() == "identifier")
            {
                attributes.insert(ctx.text(target).to_string());
            }
        }

        collect_self_assignments(body, ctx, &mut attributes);
        attributes
    }

    fn member_access(&self, node: Node<'_>, ctx: &SourceContext<'_>) -> Option<MemberAccess> {
        if node.kind() != "attribute" {
            return None;
        }
        let object = node.child_by_field_name("object")?;
        if object.kind() != "identifier" {
            return None;
        }
        match ctx.text(object) {
            "self" | "cls" => {
                let attribute = node.child_by_field_name("attribute")?;
                Some(MemberAccess::Own(ctx.text(attribute).to_string()))
            }
            _ => Some(MemberAccess::Foreign),
        }
    }

    fn imports(&self, root: Node<'_>, ctx: &SourceContext<'_>) -> Vec<Import> {
        let mut imports = Vec::new();
        collect_imports(root, ctx, &mut imports);
        imports
    }

    fn global_state_mutations(&self, root: Node<'_>, ctx: &SourceContext<'_>) -> usize {
        let module_names: HashSet<&str> = named_children_of(root)
            .into_iter()
            .filter(|stmt| stmt.kind() == "expression_statement")
            .filter_map(|stmt| stmt.named_child(0))
            .filter(|expr| expr.kind() == "assignment")
            .filter_map(|assignment| assignment.child_by_field_name("left"))
            .filter(|left| left.kind() == "identifier")
            .map(|left| ctx.text(left))
            .collect();

        let mut count = 0;
        count_global_mutations(root, ctx, &module_names, false, &mut count);
        count
    }
}

fn parameter_name<'a>(param: Node<'_>, ctx: &SourceContext<'a>) -> Option<&'a str> {
    match param.kind() {
        "identifier" => Some(ctx.text(param)),
        "default_parameter" | "typed_default_parameter" => {
            param.child_by_field_name("name").map(|n| ctx.text(n))
        }
        "typed_parameter" => param
            .named_child(0)
            .filter(|n| n.kind() == "identifier")
            .map(|n| ctx.text(n)),
        _ => None,
    }
}

fn self_attribute<'a>(target: Node<'_>, ctx: &SourceContext<'a>) -> Option<&'a str> {
    if target.kind() != "attribute" {
        return None;
    }
    let object = target.child_by_field_name("object")?;
    if object.kind() == "identifier" && ctx.text(object) == "self" {
        target
            .child_by_field_name("attribute")
            .map(|attr| ctx.text(attr))
    } else {
        None
    }
}

fn collect_self_assignments(node: Node<'_>, ctx: &SourceContext<'_>, out: &mut HashSet<String>) {
    for child in node.children(&mut node.walk()) {
        match child.kind() {
            "class_definition" => continue,
            "assignment" | "augmented_assignment" => {
                if let Some(name) = child
                    .child_by_field_name("left")
                    .and_then(|left| self_attribute(left, ctx))
                {
                    out.insert(name.to_string());
                }
            }
            _ => {}
        }
        collect_self_assignments(child, ctx, out);
    }
}

fn collect_imports(node: Node<'_>, ctx: &SourceContext<'_>, imports: &mut Vec<Import>) {
    match node.kind() {
        "import_statement" => {
            for name in node.children_by_field_name("name", &mut node.walk()) {
                imports.push(Import {
                    name: imported_name(name, ctx).to_string(),
                    kind: ImportKind::Module,
                });
            }
            return;
        }
        "import_from_statement" => {
            let module = node
                .child_by_field_name("module_name")
                .map(|m| ctx.text(m))
                .unwrap_or_default();
            let names: Vec<Node> = node
                .children_by_field_name("name", &mut node.walk())
                .collect();
            if names.is_empty() {
                // `from x import *`
                imports.push(Import {
                    name: module.to_string(),
                    kind: ImportKind::FromModule,
                });
            }
            for name in names {
                let item = imported_name(name, ctx);
                let joined = if module.ends_with('.') {
                    format!("{module}{item}")
                } else {
                    format!("{module}.{item}")
                };
                imports.push(Import {
                    name: joined,
                    kind: ImportKind::FromModule,
                });
            }
            return;
        }
        _ => {}
    }

    for child in node.children(&mut node.walk()) {
        collect_imports(child, ctx, imports);
    }
}

fn imported_name<'a>(node: Node<'_>, ctx: &SourceContext<'a>) -> &'a str {
    if node.kind() == "aliased_import" {
        if let Some(name) = node.child_by_field_name("name") {
            return ctx.text(name);
        }
    }
    ctx.text(node)
}

fn count_global_mutations(
    node: Node<'_>,
    ctx: &SourceContext<'_>,
    module_names: &HashSet<&str>,
    in_function: bool,
    count: &mut usize,
) {
    match node.kind() {
        "global_statement" | "nonlocal_statement" => *count += 1,
        "assignment" | "augmented_assignment" if in_function => {
            let mutated_base = node
                .child_by_field_name("left")
                .filter(|left| matches!(left.kind(), "subscript" | "attribute"))
                .and_then(|left| {
                    left.child_by_field_name("value")
                        .or_else(|| left.child_by_field_name("object"))
                })
                .filter(|base| base.kind() == "identifier");
            if mutated_base.is_some_and(|base| module_names.contains(ctx.text(base))) {
                *count += 1;
            }
        }
        _ => {}
    }

    let in_function = in_function || node.kind() == "function_definition";
    for child in node.children(&mut node.walk()) {
        count_global_mutations(child, ctx, module_names, in_function, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn analyze(source: &str) -> FileAnalysis {
        let analyzer = PythonAnalyzer::new();
        let ast = analyzer.parse(source, PathBuf::from("m.py")).unwrap();
        Analyzer::analyze(&analyzer, &ast)
    }

    #[test]
    fn test_function_complexity() {
        let analysis = analyze(indoc! {r#"
            def classify(x, y):
                """Classify a pair."""
                if x > 0 and y > 0:
                    for i in range(x):
                        if i % 2:
                            return "odd"
                elif x < 0:
                    return "neg"
                else:
                    return "zero"
                return [v for v in range(y) if v]
        "#});

        let f = &analysis.functions[0];
        assert_eq!(f.name, "classify");
        assert_eq!(f.line, 1);
        assert_eq!(f.length, 11);
        assert_eq!(f.parameters, 2);
        assert!(f.has_docstring);
        // if, and, for, inner if, elif, comprehension if
        assert_eq!(f.cyclomatic, 7);
        // if(1) + and(1) + for(2) + inner if(3) + elif(1) + else(1)
        assert_eq!(f.cognitive, 9);
        assert_eq!(f.nesting, 3);
    }

    #[test]
    fn test_methods_and_classes() {
        let analysis = analyze(indoc! {r#"
            class Account(Base, metaclass=Meta):
                """A bank account."""
                rate = 0.1

                def __init__(self, owner, balance=0):
                    self.owner = owner
                    self.balance = balance

                def deposit(self, amount):
                    self.balance += amount

                def describe(self):
                    return self.owner

                @staticmethod
                async def fetch(client, *args, **kwargs):
                    return await client.get(args)
        "#});

        assert_eq!(analysis.classes.len(), 1);
        let class = &analysis.classes[0];
        assert_eq!(class.name, "Account");
        assert_eq!(class.methods, 4);
        assert_eq!(class.base_count, 1);
        assert!(class.has_inheritance);
        assert!(class.has_docstring);
        assert_eq!(class.attributes, 3);
        // pairs sharing nothing: (deposit, describe), and fetch with every other method
        assert_eq!(class.lack_of_cohesion, 0.67);

        let init = &analysis.functions[0];
        assert!(init.is_method);
        assert_eq!(init.parameters, 2);
        assert_eq!(init.self_accesses, 2);

        let fetch = analysis.functions.iter().find(|f| f.name == "fetch").unwrap();
        assert!(fetch.is_async);
        assert_eq!(fetch.parameters, 3);
        assert_eq!(fetch.foreign_accesses, 1);
        assert_eq!(analysis.features.async_functions, 1.0);
        assert_eq!(analysis.features.methods, 4.0);
    }

    #[test]
    fn test_imports() {
        let analysis = analyze(indoc! {"
            import os, sys as system
            from pkg.sub import a, b as c
            from . import sibling
            from x import *
        "});
        let names: Vec<&str> = analysis.imports.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["os", "sys", "pkg.sub.a", "pkg.sub.b", ".sibling", "x"]
        );
        assert_eq!(analysis.features.total_imports, 6.0);
    }

    #[test]
    fn test_global_state_mutations() {
        let analysis = analyze(indoc! {"
            CACHE = {}
            counter = 0

            def bump():
                global counter
                counter += 1
                CACHE['k'] = 1

            def local():
                CACHE = {}
                return CACHE
        "});
        assert_eq!(analysis.text.global_state_mutations, 2);
    }

    #[test]
    fn test_feature_row_basics() {
        let analysis = analyze(indoc! {"
            # helpers
            def a():
                return 1


            def b():
                return 2
        "});
        let features = &analysis.features;
        assert_eq!(features.lines_of_code, 7.0);
        assert_eq!(features.functions, 2.0);
        assert_eq!(features.comment_lines, 1.0);
        assert_eq!(features.blank_lines, 2.0);
        assert_eq!(features.comment_percentage, 14.3);
        assert_eq!(features.documentation_coverage, 0.0);
        assert_eq!(features.average_cyclomatic_complexity, 1.0);
        assert!(features.halstead_volume > 0.0);
        assert!(features.maintainability_index > 0.0);
    }

    #[test]
    fn test_syntax_errors_still_analyzed() {
        let analysis = analyze("def ok():\n    return 1\n\ndef broken(:\n");
        assert!(analysis.functions.iter().any(|f| f.name == "ok"));
    }

    fn long_sum(terms: usize) -> String {
        format!("def total():\n    return {}\n", vec!["1"; terms].join(" + "))
    }

    #[test]
    fn test_long_expression_within_depth_limit() {
        let analysis = analyze(&long_sum(300));
        assert_eq!(analysis.functions.len(), 1);
        assert_eq!(analysis.functions[0].cyclomatic, 1);
        assert!(analysis.features.halstead_volume > 0.0);
    }

    #[test]
    fn test_overly_deep_tree_is_an_error_on_small_stack() {
        // rayon workers run on 2 MiB stacks
        let result = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(|| {
                let source = long_sum(10_000);
                crate::analyzers::analyze_file(
                    &source,
                    PathBuf::from("generated.py"),
                    &PythonAnalyzer::new(),
                )
                .map(|_| ())
                .map_err(|e| e.to_string())
            })
            .unwrap()
            .join()
            .unwrap();

        let err = result.unwrap_err();
        assert!(err.contains("generated.py"), "{err}");
        assert!(err.contains("deeper than"), "{err}");
    }
}
