use crate::core::Language;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub enum Ast {
    Python(SourceTree),
    Java(SourceTree),
    Cpp(SourceTree),
    Unknown,
}

/// A parsed tree-sitter tree together with the text it was parsed from.
#[derive(Clone, Debug)]
pub struct SourceTree {
    pub tree: tree_sitter::Tree,
    pub source: String,
    pub path: PathBuf,
}

impl SourceTree {
    pub fn root(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    pub fn has_syntax_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    pub fn text(&self, node: tree_sitter::Node<'_>) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }
}

impl Ast {
    pub fn language(&self) -> Language {
        match self {
            Ast::Python(_) => Language::Python,
            Ast::Java(_) => Language::Java,
            Ast::Cpp(_) => Language::Cpp,
            Ast::Unknown => Language::Unknown,
        }
    }

    pub fn source_tree(&self) -> Option<&SourceTree> {
        match self {
            Ast::Python(tree) | Ast::Java(tree) | Ast::Cpp(tree) => Some(tree),
            Ast::Unknown => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.source_tree().map(|t| t.path.as_path())
    }

    pub fn wrap(language: Language, tree: SourceTree) -> Self {
        match language {
            Language::Python => Ast::Python(tree),
            Language::Java => Ast::Java(tree),
            Language::Cpp => Ast::Cpp(tree),
            Language::Unknown => Ast::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python_tree(source: &str) -> SourceTree {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .unwrap();
        SourceTree {
            tree: parser.parse(source, None).unwrap(),
            source: source.to_string(),
            path: PathBuf::from("m.py"),
        }
    }

    #[test]
    fn test_wrap_and_language() {
        let ast = Ast::wrap(Language::Python, python_tree("x = 1\n"));
        assert_eq!(ast.language(), Language::Python);
        assert_eq!(ast.path(), Some(Path::new("m.py")));
        assert!(Ast::Unknown.source_tree().is_none());
    }

    #[test]
    fn test_syntax_errors_are_reported() {
        assert!(!python_tree("def f():\n    return 1\n").has_syntax_errors());
        assert!(python_tree("def f(:\n").has_syntax_errors());
    }
}
