pub mod output;
pub mod walker;
pub mod writers;

use crate::errors::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io_at(path, e))
}

/// Write `content`, creating parent directories as needed
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, content).map_err(|e| Error::io_at(path, e))
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        fs::create_dir_all(path).map_err(|e| Error::io_at(path, e))?;
    }
    Ok(())
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_file(path, &json)
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = read_file(path)?;
    serde_json::from_str(&content)
        .map_err(|e| Error::parse(path, format!("invalid JSON: {e}")))
}

pub fn file_exists(path: &Path) -> bool {
    path.exists() && path.is_file()
}

pub fn dir_exists(path: &Path) -> bool {
    path.exists() && path.is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_file_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/c.txt");
        write_file(&path, "hi").unwrap();
        assert_eq!(read_file(&path).unwrap(), "hi");
        assert!(dir_exists(&dir.path().join("a/b")));
        assert!(file_exists(&path));
    }

    #[test]
    fn test_json_round_trip_and_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.json");
        write_json(&path, &vec![1, 2, 3]).unwrap();
        let back: Vec<i32> = read_json(&path).unwrap();
        assert_eq!(back, vec![1, 2, 3]);

        write_file(&path, "{not json").unwrap();
        assert!(matches!(
            read_json::<Vec<i32>>(&path),
            Err(Error::Parse { .. })
        ));
        assert!(matches!(
            read_file(&dir.path().join("missing")),
            Err(Error::FileSystem { .. })
        ));
    }
}
