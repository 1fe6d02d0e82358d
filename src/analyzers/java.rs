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

static JAVA_SYNTAX: LanguageSyntax = LanguageSyntax {
    functions: &[
        "method_declaration",
        "constructor_declaration",
        "compact_constructor_declaration",
    ],
    classes: &[
        "class_declaration",
        "interface_declaration",
        "enum_declaration",
        "record_declaration",
    ],
    branches: &["if_statement"],
    else_ifs: &[],
    elses: &[],
    loops: &[
        "for_statement",
        "enhanced_for_statement",
        "while_statement",
        "do_statement",
    ],
    switches: &["switch_expression", "switch_statement"],
    cases: &["switch_label"],
    tries: &["try_statement", "try_with_resources_statement"],
    catches: &["catch_clause"],
    ternaries: &["ternary_expression"],
    comprehension_ifs: &[],
    scopes: &["synchronized_statement"],
    boolean_ops: &["binary_expression"],
    tokens: TokenClasses {
        operands: &[
            "identifier",
            "type_identifier",
            "decimal_integer_literal",
            "hex_integer_literal",
            "octal_integer_literal",
            "binary_integer_literal",
            "decimal_floating_point_literal",
            "hex_floating_point_literal",
            "true",
            "false",
            "null_literal",
            "this",
        ],
        atoms: &["string_literal", "character_literal"],
        skipped: &["line_comment", "block_comment"],
    },
};

pub struct JavaAnalyzer {
    options: AnalysisOptions,
}

impl JavaAnalyzer {
    pub fn new() -> Self {
        Self::with_options(AnalysisOptions::default())
    }

    pub fn with_options(options: AnalysisOptions) -> Self {
        Self { options }
    }
}

impl Default for JavaAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for JavaAnalyzer {
    fn parse(&self, content: &str, path: PathBuf) -> Result<Ast> {
        parse_source(self.grammar(), Language::Java, content, path)
    }

    fn analyze(&self, ast: &Ast) -> FileAnalysis {
        match ast {
            Ast::Java(tree) => analyze_tree(self, tree, &self.options),
            _ => FileAnalysis::empty(PathBuf::new(), Language::Java),
        }
    }

    fn language(&self) -> Language {
        Language::Java
    }
}

impl LanguageProfile for JavaAnalyzer {
    fn language(&self) -> Language {
        Language::Java
    }

    fn grammar(&self) -> tree_sitter::Language {
        tree_sitter_java::LANGUAGE.into()
    }

    fn syntax(&self) -> &'static LanguageSyntax {
        &JAVA_SYNTAX
    }

    fn parameter_count(
        &self,
        node: Node<'_>,
        _ctx: &SourceContext<'_>,
        _is_method: bool,
    ) -> usize {
        node.child_by_field_name("parameters")
            .map(|params| {
                named_children_of(params)
                    .into_iter()
                    .filter(|p| matches!(p.kind(), "formal_parameter" | "spread_parameter"))
                    .count()
            })
            .unwrap_or(0)
    }

    fn base_count(&self, node: Node<'_>, _ctx: &SourceContext<'_>) -> usize {
        node.children(&mut node.walk())
            .map(|child| match child.kind() {
                "superclass" => 1,
                "super_interfaces" | "extends_interfaces" => find_descendant(child, &["type_list"])
                    .map(|list| named_children_of(list).len())
                    .unwrap_or(0),
                _ => 0,
            })
            .sum()
    }

    fn class_attributes(&self, node: Node<'_>, ctx: &SourceContext<'_>) -> HashSet<String> {
        let mut attributes = HashSet::new();
        let Some(body) = node.child_by_field_name("body") else {
            return attributes;
        };

        let mut members = named_children_of(body);
        // enum constants come first, fields live in the trailing declarations block
        if let Some(decls) = members
            .iter()
            .find(|m| m.kind() == "enum_body_declarations")
            .copied()
        {
            members.extend(named_children_of(decls));
        }

        for field in members.iter().filter(|m| m.kind() == "field_declaration") {
            for declarator in field.children_by_field_name("declarator", &mut field.walk()) {
                if let Some(name) = declarator.child_by_field_name("name") {
                    attributes.insert(ctx.text(name).to_string());
                }
            }
        }
        attributes
    }

    fn implicit_members(&self) -> bool {
        true
    }

    fn member_access(&self, node: Node<'_>, ctx: &SourceContext<'_>) -> Option<MemberAccess> {
        let member_field = match node.kind() {
            "field_access" => "field",
            "method_invocation" => "name",
            _ => return None,
        };
        let object = node.child_by_field_name("object")?;
        match object.kind() {
            "this" => {
                let member = node.child_by_field_name(member_field)?;
                Some(MemberAccess::Own(ctx.text(member).to_string()))
            }
            "identifier" => Some(MemberAccess::Foreign),
            _ => None,
        }
    }

    fn imports(&self, root: Node<'_>, ctx: &SourceContext<'_>) -> Vec<Import> {
        named_children_of(root)
            .into_iter()
            .filter(|decl| decl.kind() == "import_declaration")
            .map(|decl| Import {
                name: import_path(ctx.text(decl)),
                kind: ImportKind::Module,
            })
            .collect()
    }

    fn global_state_mutations(&self, root: Node<'_>, _ctx: &SourceContext<'_>) -> usize {
        let mut count = 0;
        count_mutable_statics(root, &mut count);
        count
    }
}

/// `import static a.b.C.*;` -> `a.b.C`
fn import_path(declaration: &str) -> String {
    let path = declaration
        .trim()
        .trim_start_matches("import")
        .trim_end_matches(';')
        .trim();
    let path = path.strip_prefix("static ").unwrap_or(path).trim();
    path.trim_end_matches(".*").to_string()
}

fn has_modifier(field: Node<'_>, modifier: &str) -> bool {
    field
        .children(&mut field.walk())
        .filter(|child| child.kind() == "modifiers")
        .any(|mods| {
            mods.children(&mut mods.walk())
                .any(|m| m.kind() == modifier)
        })
}

fn count_mutable_statics(node: Node<'_>, count: &mut usize) {
    if node.kind() == "field_declaration"
        && has_modifier(node, "static")
        && !has_modifier(node, "final")
    {
        *count += 1;
    }
    for child in node.children(&mut node.walk()) {
        count_mutable_statics(child, count);
    }
}
