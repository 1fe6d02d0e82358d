use crate::analyzers::common::{
    analyze_tree, find_descendant, named_children_of, parse_source, AnalysisOptions,
    LanguageProfile, LanguageSyntax, MemberAccess, SourceContext,
};
use crate::analyzers::Analyzer;
use crate::core::ast::Ast;
use crate::core::{FileAnalysis, Import, ImportKind, Language};
use crate::errors::Result;
use crate::metrics::halstead::TokenClasses;
use std::collections::HashSet;
use std::path::PathBuf;
use tree_sitter::Node;

static CPP_SYNTAX: LanguageSyntax = LanguageSyntax {
    functions: &["function_definition"],
    classes: &["class_specifier", "struct_specifier"],
    branches: &["if_statement"],
    else_ifs: &[],
    elses: &["else_clause"],
    loops: &[
        "for_statement",
        "for_range_loop",
        "while_statement",
        "do_statement",
    ],
    switches: &["switch_statement"],
    cases: &["case_statement"],
    tries: &["try_statement"],
    catches: &["catch_clause"],
    ternaries: &["conditional_expression"],
    comprehension_ifs: &[],
    scopes: &[],
    boolean_ops: &["binary_expression"],
    tokens: TokenClasses {
        operands: &[
            "identifier",
            "field_identifier",
            "type_identifier",
            "namespace_identifier",
            "primitive_type",
            "number_literal",
            "true",
            "false",
            "null",
            "nullptr",
            "this",
        ],
        atoms: &[
            "string_literal",
            "raw_string_literal",
            "char_literal",
            "concatenated_string",
            "system_lib_string",
        ],
        skipped: &["comment"],
    },
};

/// Node kinds that can name a function
const NAME_KINDS: &[&str] = &[
    "identifier",
    "field_identifier",
    "qualified_identifier",
    "destructor_name",
    "operator_name",
];

/// Ancestors that keep a declaration at namespace scope
const NAMESPACE_SCOPE: &[&str] = &[
    "translation_unit",
    "declaration_list",
    "namespace_definition",
    "linkage_specification",
    "preproc_if",
    "preproc_ifdef",
    "preproc_else",
    "preproc_elif",
];

pub struct CppAnalyzer {
    options: AnalysisOptions,
}

impl CppAnalyzer {
    pub fn new() -> Self {
        Self::with_options(AnalysisOptions::default())
    }

    pub fn with_options(options: AnalysisOptions) -> Self {
        Self { options }
    }
}

impl Default for CppAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for CppAnalyzer {
    fn parse(&self, content: &str, path: PathBuf) -> Result<Ast> {
        parse_source(self.grammar(), Language::Cpp, content, path)
    }

    fn analyze(&self, ast: &Ast) -> FileAnalysis {
        match ast {
            Ast::Cpp(tree) => analyze_tree(self, tree, &self.options),
            _ => FileAnalysis::empty(PathBuf::new(), Language::Cpp),
        }
    }

    fn language(&self) -> Language {
        Language::Cpp
    }
}

fn function_declarator(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name("declarator")
        .and_then(|d| find_descendant(d, &["function_declarator"]))
}

impl LanguageProfile for CppAnalyzer {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn grammar(&self) -> tree_sitter::Language {
        tree_sitter_cpp::LANGUAGE.into()
    }

    fn syntax(&self) -> &'static LanguageSyntax {
        &CPP_SYNTAX
    }

    fn function_name(&self, node: Node<'_>, ctx: &SourceContext<'_>) -> String {
        function_declarator(node)
            .and_then(|f| f.child_by_field_name("declarator"))
            .and_then(|d| find_descendant(d, NAME_KINDS))
            .map(|name| ctx.text(name).to_string())
            .unwrap_or_else(|| "<anonymous>".to_string())
    }

    fn parameter_count(
        &self,
        node: Node<'_>,
        ctx: &SourceContext<'_>,
        _is_method: bool,
    ) -> usize {
        let Some(params) = function_declarator(node).and_then(|f| f.child_by_field_name("parameters"))
        else {
            return 0;
        };
        let params: Vec<Node> = named_children_of(params)
            .into_iter()
            .filter(|p| {
                matches!(
                    p.kind(),
                    "parameter_declaration"
                        | "optional_parameter_declaration"
                        | "variadic_parameter_declaration"
                        | "variadic_parameter"
                )
            })
            .collect();

        if params.len() == 1 && ctx.text(params[0]).trim() == "void" {
            return 0;
        }
        params.len()
    }

    fn base_count(&self, node: Node<'_>, _ctx: &SourceContext<'_>) -> usize {
        node.children(&mut node.walk())
            .filter(|child| child.kind() == "base_class_clause")
            .map(|clause| {
                named_children_of(clause)
                    .into_iter()
                    .filter(|base| {
                        matches!(
                            base.kind(),
                            "type_identifier" | "qualified_identifier" | "template_type"
                        )
                    })
                    .count()
            })
            .sum()
    }

    fn class_attributes(&self, node: Node<'_>, ctx: &SourceContext<'_>) -> HashSet<String> {
        let mut attributes = HashSet::new();
        let Some(body) = node.child_by_field_name("body") else {
            return attributes;
        };
        for field in named_children_of(body)
            .into_iter()
            .filter(|m| m.kind() == "field_declaration")
        {
            for declarator in field.children_by_field_name("declarator", &mut field.walk()) {
                if find_descendant(declarator, &["function_declarator"]).is_some() {
                    continue;
                }
                if let Some(name) = find_descendant(declarator, &["field_identifier"]) {
                    attributes.insert(ctx.text(name).to_string());
                }
            }
        }
        attributes
    }

    fn declared_methods(&self, node: Node<'_>, _ctx: &SourceContext<'_>) -> usize {
        let Some(body) = node.child_by_field_name("body") else {
            return 0;
        };
        named_children_of(body)
            .into_iter()
            .filter(|m| matches!(m.kind(), "field_declaration" | "declaration"))
            .filter(|m| {
                m.child_by_field_name("declarator")
                    .is_some_and(|d| d.kind() == "function_declarator")
            })
            .count()
    }

    fn implicit_members(&self) -> bool {
        true
    }

    fn member_access(&self, node: Node<'_>, ctx: &SourceContext<'_>) -> Option<MemberAccess> {
        if node.kind() != "field_expression" {
            return None;
        }
        let argument = node.child_by_field_name("argument")?;
        match argument.kind() {
            "this" => {
                let field = node.child_by_field_name("field")?;
                Some(MemberAccess::Own(ctx.text(field).to_string()))
            }
            "identifier" => Some(MemberAccess::Foreign),
            _ => None,
        }
    }

    fn imports(&self, root: Node<'_>, ctx: &SourceContext<'_>) -> Vec<Import> {
        let mut imports = Vec::new();
        collect_includes(root, ctx, &mut imports);
        imports
    }

    fn global_state_mutations(&self, root: Node<'_>, ctx: &SourceContext<'_>) -> usize {
        let mut count = 0;
        count_mutable_globals(root, ctx, &mut count);
        count
    }
}

fn collect_includes(node: Node<'_>, ctx: &SourceContext<'_>, imports: &mut Vec<Import>) {
    if node.kind() == "preproc_include" {
        if let Some(path) = node.child_by_field_name("path") {
            let raw = ctx.text(path).trim();
            let (name, kind) = if path.kind() == "system_lib_string" {
                (raw.trim_matches(|c| c == '<' || c == '>'), ImportKind::SystemInclude)
            } else {
                (raw.trim_matches('"'), ImportKind::LocalInclude)
            };
            imports.push(Import {
                name: name.to_string(),
                kind,
            });
        }
        return;
    }
    for child in node.children(&mut node.walk()) {
        collect_includes(child, ctx, imports);
    }
}

fn at_namespace_scope(node: Node<'_>) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if !NAMESPACE_SCOPE.contains(&parent.kind()) {
            return false;
        }
        current = parent.parent();
    }
    true
}

fn is_mutable_global(node: Node<'_>, ctx: &SourceContext<'_>) -> bool {
    let mut cursor = node.walk();
    let has_variable = node
        .children_by_field_name("declarator", &mut cursor)
        .any(|d| find_descendant(d, &["function_declarator"]).is_none());
    if !has_variable {
        return false;
    }
    let frozen = node.children(&mut node.walk()).any(|child| {
        matches!(child.kind(), "type_qualifier" | "storage_class_specifier")
            && matches!(ctx.text(child), "const" | "constexpr" | "constinit" | "extern")
    });
    !frozen
}

fn count_mutable_globals(node: Node<'_>, ctx: &SourceContext<'_>, count: &mut usize) {
    if node.kind() == "declaration" {
        if at_namespace_scope(node) && is_mutable_global(node, ctx) {
            *count += 1;
        }
        return;
    }
    if matches!(node.kind(), "function_definition" | "class_specifier" | "struct_specifier") {
        return;
    }
    for child in node.children(&mut node.walk()) {
        count_mutable_globals(child, ctx, count);
    }
}
