use crate::core::Language;
use crate::errors::{Error, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

pub struct FileWalker {
    root: PathBuf,
    languages: Vec<Language>,
    ignore_patterns: Vec<String>,
}

impl FileWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            languages: Language::SUPPORTED.to_vec(),
            ignore_patterns: vec![],
        }
    }

    pub fn with_languages(mut self, languages: Vec<Language>) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    /// Source files under the root, sorted, honoring `.gitignore`
    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        let patterns = self
            .ignore_patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .require_git(false)
            .filter_entry(|entry| entry.file_name() != std::ffi::OsStr::new(".git"))
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| Error::FileSystem {
                message: format!("walking {}: {e}", self.root.display()),
                path: Some(self.root.clone()),
                source: None,
            })?;
            let path = entry.path();

            if path.is_file() && self.should_process(path, &patterns) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        Ok(files)
    }

    fn should_process(&self, path: &Path, patterns: &[glob::Pattern]) -> bool {
        let lang = Language::from_path(path);
        if lang == Language::Unknown || !self.languages.contains(&lang) {
            return false;
        }

        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        !patterns
            .iter()
            .any(|p| p.matches_path(relative) || p.matches_path(path))
    }
}

pub fn find_project_files(root: &Path, languages: Vec<Language>) -> Result<Vec<PathBuf>> {
    FileWalker::new(root.to_path_buf())
        .with_languages(languages)
        .walk()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_walk_filters_languages_and_patterns() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "pkg/a.py");
        touch(dir.path(), "pkg/B.java");
        touch(dir.path(), "native/c.cpp");
        touch(dir.path(), "README.md");
        touch(dir.path(), "vendor/lib.py");
        touch(dir.path(), ".git/hooks/x.py");

        let files = FileWalker::new(dir.path().to_path_buf())
            .with_ignore_patterns(vec!["vendor/**".to_string()])
            .walk()
            .unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| {
                p.strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(names, vec!["native/c.cpp", "pkg/B.java", "pkg/a.py"]);
    }

    #[test]
    fn test_enabled_languages_only() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.py");
        touch(dir.path(), "b.cpp");
        let files = find_project_files(dir.path(), vec![Language::Cpp]).unwrap();
        assert_eq!(files, vec![dir.path().join("b.cpp")]);
    }

    #[test]
    fn test_gitignore_is_honored() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "build/\n").unwrap();
        touch(dir.path(), "build/gen.py");
        touch(dir.path(), "src/main.py");
        let files = find_project_files(dir.path(), Language::SUPPORTED.to_vec()).unwrap();
        assert_eq!(files, vec![dir.path().join("src/main.py")]);
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = FileWalker::new(dir.path().to_path_buf())
            .with_ignore_patterns(vec!["[".to_string()])
            .walk();
        assert!(matches!(result, Err(Error::Pattern(_))));
    }
}
