use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::core::SmellscopeConfig;
use crate::errors::{Error, Result};

pub const CONFIG_FILE_NAME: &str = ".smellscope.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

pub(crate) fn read_config_file(path: &Path) -> std::result::Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Parse a TOML document and check value ranges
pub fn parse_and_validate_config(contents: &str) -> Result<SmellscopeConfig> {
    let config = toml::from_str::<SmellscopeConfig>(contents)?;
    config.validate()?;
    Ok(config)
}

fn try_load_config_from_path(config_path: &Path) -> Option<SmellscopeConfig> {
    let contents = match read_config_file(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_and_validate_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!(
                "Invalid config {}: {}. Using defaults.",
                config_path.display(),
                e
            );
            Some(SmellscopeConfig::default())
        }
    }
}

fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    if error.kind() != std::io::ErrorKind::NotFound {
        log::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search the current directory and its ancestors for a config file
pub fn load_config() -> SmellscopeConfig {
    match std::env::current_dir() {
        Ok(dir) => load_config_in(dir),
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            SmellscopeConfig::default()
        }
    }
}

/// Search `start` and up to nine ancestors. The nearest file wins; an
/// invalid nearest file yields defaults rather than a farther file.
pub fn load_config_in(start: PathBuf) -> SmellscopeConfig {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            SmellscopeConfig::default()
        })
}

/// Load an explicitly named config file. Any problem is an error.
pub fn load_config_from(path: &Path) -> Result<SmellscopeConfig> {
    let contents = read_config_file(path).map_err(|e| Error::io_at(path, e))?;
    parse_and_validate_config(&contents)
        .map_err(|e| e.with_context(format!("loading {}", path.display())))
}
