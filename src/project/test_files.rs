//! Test file naming conventions and test presence lookup.

use crate::core::Language;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Directory names that hold tests anywhere in a project
const TEST_DIRS: &[&str] = &["tests", "test"];

fn stem_of(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|s| s.to_str())
}

/// Whether the file name follows the test naming convention of its language
pub fn is_test_file(path: &Path) -> bool {
    let Some(stem) = stem_of(path) else {
        return false;
    };
    match Language::from_path(path) {
        Language::Python | Language::Cpp => stem.starts_with("test_") || stem.ends_with("_test"),
        Language::Java => stem.ends_with("Test") || stem.ends_with("Tests"),
        Language::Unknown => false,
    }
}

/// Stems a test for `path` would carry
fn test_stems(path: &Path) -> Vec<String> {
    let Some(stem) = stem_of(path) else {
        return vec![];
    };
    match Language::from_path(path) {
        Language::Python | Language::Cpp => vec![format!("test_{stem}"), format!("{stem}_test")],
        Language::Java => vec![format!("{stem}Test"), format!("{stem}Tests")],
        Language::Unknown => vec![],
    }
}

fn in_test_dir(path: &Path) -> bool {
    path.parent().is_some_and(|parent| {
        parent
            .components()
            .any(|c| TEST_DIRS.contains(&c.as_os_str().to_string_lossy().as_ref()))
    })
}

/// Index of the test files of a project, by path relative to its root
pub struct TestIndex {
    tests: Vec<PathBuf>,
}

impl TestIndex {
    pub fn new<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Self {
        Self {
            tests: paths
                .into_iter()
                .filter(|p| is_test_file(p))
                .map(Path::to_path_buf)
                .collect(),
        }
    }

    /// True when a matching test sits next to `path` or under a test directory
    pub fn has_test_for(&self, path: &Path) -> bool {
        let wanted: HashSet<String> = test_stems(path).into_iter().collect();
        if wanted.is_empty() {
            return false;
        }
        let language = Language::from_path(path);
        self.tests.iter().any(|test| {
            Language::from_path(test) == language
                && stem_of(test).is_some_and(|s| wanted.contains(s))
                && (test.parent() == path.parent() || in_test_dir(test))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_test_file() {
        assert!(is_test_file(Path::new("pkg/test_util.py")));
        assert!(is_test_file(Path::new("pkg/util_test.py")));
        assert!(is_test_file(Path::new("src/test/java/CartTest.java")));
        assert!(is_test_file(Path::new("net/socket_test.cc")));
        assert!(!is_test_file(Path::new("pkg/util.py")));
        assert!(!is_test_file(Path::new("Testing.java")));
        assert!(!is_test_file(Path::new("notes_test.md")));
    }

    #[test]
    fn test_has_test_for() {
        let paths = [
            "pkg/util.py",
            "pkg/test_util.py",
            "app/models.py",
            "tests/unit/test_models.py",
            "src/main/java/com/acme/Cart.java",
            "src/test/java/com/acme/CartTest.java",
            "lib/parser.cpp",
            "other/parser_test.cpp",
        ];
        let index = TestIndex::new(paths.iter().map(Path::new));

        assert!(index.has_test_for(Path::new("pkg/util.py")));
        assert!(index.has_test_for(Path::new("app/models.py")));
        assert!(index.has_test_for(Path::new("src/main/java/com/acme/Cart.java")));
        // neither a sibling nor under a test directory
        assert!(!index.has_test_for(Path::new("lib/parser.cpp")));
        assert!(!index.has_test_for(Path::new("pkg/other.py")));
    }
}
