use crate::core::{ast::Ast, FileAnalysis, Language};
use crate::errors::Result;
use std::path::PathBuf;

pub mod common;
pub mod cpp;
pub mod java;
pub mod python;

pub use common::AnalysisOptions;

pub trait Analyzer: Send + Sync {
    fn parse(&self, content: &str, path: PathBuf) -> Result<Ast>;
    fn analyze(&self, ast: &Ast) -> FileAnalysis;
    fn language(&self) -> Language;
}

/// Parse and analyze one file. The result carries `path` as given.
pub fn analyze_file(content: &str, path: PathBuf, analyzer: &dyn Analyzer) -> Result<FileAnalysis> {
    analyzer.parse(content, path.clone()).map(|ast| {
        let mut analysis = analyzer.analyze(&ast);
        analysis.path = path;
        analysis
    })
}

pub fn get_analyzer(language: Language) -> Box<dyn Analyzer> {
    get_analyzer_with_options(language, AnalysisOptions::default())
}

pub fn get_analyzer_with_options(language: Language, options: AnalysisOptions) -> Box<dyn Analyzer> {
    type AnalyzerFactory = fn(AnalysisOptions) -> Box<dyn Analyzer>;

    static ANALYZER_MAP: &[(Language, AnalyzerFactory)] = &[
        (Language::Python, |o| Box::new(python::PythonAnalyzer::with_options(o))),
        (Language::Java, |o| Box::new(java::JavaAnalyzer::with_options(o))),
        (Language::Cpp, |o| Box::new(cpp::CppAnalyzer::with_options(o))),
    ];

    ANALYZER_MAP
        .iter()
        .find(|(lang, _)| *lang == language)
        .map(|(_, factory)| factory(options))
        .unwrap_or_else(|| Box::new(NullAnalyzer))
}

struct NullAnalyzer;

impl Analyzer for NullAnalyzer {
    fn parse(&self, _content: &str, _path: PathBuf) -> Result<Ast> {
        Ok(Ast::Unknown)
    }

    fn analyze(&self, _ast: &Ast) -> FileAnalysis {
        FileAnalysis::empty(PathBuf::new(), Language::Unknown)
    }

    fn language(&self) -> Language {
        Language::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_analyzer_per_language() {
        for language in Language::SUPPORTED {
            assert_eq!(get_analyzer(language).language(), language);
        }
        assert_eq!(get_analyzer(Language::Unknown).language(), Language::Unknown);
    }

    #[test]
    fn test_null_analyzer_yields_empty_analysis() {
        let analysis =
            analyze_file("whatever", PathBuf::from("notes.txt"), &NullAnalyzer).unwrap();
        assert_eq!(analysis.language, Language::Unknown);
        assert_eq!(analysis.path, PathBuf::from("notes.txt"));
        assert!(analysis.functions.is_empty());
    }

    #[test]
    fn test_analyze_file_keeps_given_path() {
        let analyzer = get_analyzer(Language::Python);
        let analysis = analyze_file(
            "def f(a, b):\n    return a if b else 0\n",
            PathBuf::from("pkg/util.py"),
            analyzer.as_ref(),
        )
        .unwrap();
        assert_eq!(analysis.path, PathBuf::from("pkg/util.py"));
        assert_eq!(analysis.functions.len(), 1);
        assert_eq!(analysis.functions[0].cyclomatic, 2);
        assert_eq!(analysis.features.functions, 1.0);
    }
}
