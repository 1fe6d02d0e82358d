//! Tabular datasets built from labeled analysis records.

pub mod csv;

use crate::config::FeatureConfig;
use crate::core::{FileFeatures, Language};
use crate::errors::{Error, Result};
use crate::smells::{LabeledRecord, SmellLabels};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const TARGET_PREFIX: &str = "y_";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetRecord {
    pub file_path: String,
    pub language: Language,
    pub features: Vec<Option<f64>>,
    pub targets: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    pub feature_names: Vec<String>,
    pub target_names: Vec<String>,
    pub records: Vec<DatasetRecord>,
}

impl Dataset {
    pub fn new(feature_names: Vec<String>, target_names: Vec<String>) -> Self {
        Self {
            feature_names,
            target_names,
            records: Vec::new(),
        }
    }

    /// Build the raw dataset. `__init__.py` files and test files are left
    /// out according to `options`.
    pub fn from_labeled(records: &[LabeledRecord], options: &FeatureConfig) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::dataset("no records"));
        }

        let mut dataset = Self::new(
            FileFeatures::NAMES.iter().map(|s| s.to_string()).collect(),
            SmellLabels::target_names(),
        );
        let mut skipped = 0;
        for record in records {
            let analysis = &record.analysis;
            if options.skip_init_modules && is_init_module(&analysis.path) {
                skipped += 1;
                continue;
            }
            if analysis.is_test_file && !options.include_test_files {
                skipped += 1;
                continue;
            }
            dataset.records.push(DatasetRecord {
                file_path: analysis.path.to_string_lossy().into_owned(),
                language: analysis.language,
                features: analysis.features.values(),
                targets: record.labels.values(),
            });
        }

        log::info!(
            "Built dataset with {} rows ({} skipped), {} features, {} targets",
            dataset.len(),
            skipped,
            dataset.feature_names.len(),
            dataset.target_names.len()
        );
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|n| n == name)
    }

    pub fn target_index(&self, name: &str) -> Option<usize> {
        self.target_names.iter().position(|n| n == name)
    }

    /// Column of one target, 0 for rows that lack it
    pub fn target_column(&self, index: usize) -> Vec<u8> {
        self.records
            .iter()
            .map(|r| r.targets.get(index).copied().unwrap_or(0))
            .collect()
    }

    /// The rows at `indices`, in that order
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            feature_names: self.feature_names.clone(),
            target_names: self.target_names.clone(),
            records: indices
                .iter()
                .filter_map(|&i| self.records.get(i).cloned())
                .collect(),
        }
    }

    /// Same rows and targets with a new feature table, one row per record
    pub fn with_features(&self, feature_names: Vec<String>, rows: &[Vec<f64>]) -> Self {
        Self {
            feature_names,
            target_names: self.target_names.clone(),
            records: self
                .records
                .iter()
                .zip(rows)
                .map(|(record, row)| DatasetRecord {
                    features: row.iter().copied().map(Some).collect(),
                    ..record.clone()
                })
                .collect(),
        }
    }

    pub fn to_csv_string(&self) -> String {
        let mut header: Vec<&str> = vec!["file_path", "language"];
        header.extend(self.feature_names.iter().map(String::as_str));
        header.extend(self.target_names.iter().map(String::as_str));

        let mut out = csv::format_row(&header);
        out.push('\n');
        for record in &self.records {
            let mut row = vec![record.file_path.clone(), record.language.to_string()];
            row.extend(
                record
                    .features
                    .iter()
                    .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
            );
            row.extend(record.targets.iter().map(|t| t.to_string()));
            out.push_str(&csv::format_row(&row));
            out.push('\n');
        }
        out
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        crate::io::write_file(path, &self.to_csv_string())?;
        log::info!("Wrote {} dataset rows to {}", self.len(), path.display());
        Ok(())
    }

    pub fn from_csv_str(text: &str) -> Result<Self> {
        let mut rows = csv::parse_rows(text).into_iter();
        let header = rows
            .next()
            .ok_or_else(|| Error::dataset("empty CSV, expected a header row"))?;
        let columns = header.fields;
        if columns.len() < 2 || columns[0] != "file_path" || columns[1] != "language" {
            return Err(Error::dataset(
                "CSV header must start with file_path,language",
            ));
        }

        let (targets, features): (Vec<(usize, &String)>, Vec<(usize, &String)>) = columns
            .iter()
            .enumerate()
            .skip(2)
            .partition(|(_, name)| name.starts_with(TARGET_PREFIX));

        let mut dataset = Self::new(
            features.iter().map(|(_, n)| n.to_string()).collect(),
            targets.iter().map(|(_, n)| n.to_string()).collect(),
        );

        for row in rows {
            if row.fields.len() != columns.len() {
                return Err(Error::dataset(format!(
                    "line {}: expected {} cells, found {}",
                    row.line,
                    columns.len(),
                    row.fields.len()
                )));
            }
            let cells = &row.fields;
            dataset.records.push(DatasetRecord {
                file_path: cells[0].clone(),
                language: Language::from_name(&cells[1]).unwrap_or(Language::Unknown),
                features: features
                    .iter()
                    .map(|(i, _)| parse_number(&cells[*i]))
                    .collect(),
                targets: targets
                    .iter()
                    .map(|(i, _)| parse_target(&cells[*i]))
                    .collect(),
            });
        }
        Ok(dataset)
    }

    pub fn read_csv(path: &Path) -> Result<Self> {
        let text = crate::io::read_file(path)?;
        Self::from_csv_str(&text)
            .map_err(|e| e.with_context(format!("reading {}", path.display())))
    }
}

fn is_init_module(path: &Path) -> bool {
    path.file_name().is_some_and(|n| n == "__init__.py")
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_target(cell: &str) -> u8 {
    match parse_number(cell) {
        Some(v) if v > 0.0 => 1,
        _ => 0,
    }
}

/// Load labeled records from one JSON file holding an array or a single
/// record
pub fn load_labeled_file(path: &Path) -> Result<Vec<LabeledRecord>> {
    let value: Value = crate::io::read_json(path)?;
    let records = match value {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<LabeledRecord>, _>>()?,
        single => vec![serde_json::from_value(single)?],
    };
    Ok(records)
}

/// Load every `*.json` below `dir`. Files that fail to parse are logged and
/// skipped.
pub fn load_analysis_dir(dir: &Path) -> Result<Vec<LabeledRecord>> {
    if !dir.is_dir() {
        return Err(Error::file_system(
            format!("{} is not a directory", dir.display()),
            dir,
        ));
    }

    let files: Vec<PathBuf> = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();

    let mut records = Vec::new();
    for file in &files {
        match load_labeled_file(file) {
            Ok(mut loaded) => records.append(&mut loaded),
            Err(e) => log::warn!("Skipping {}: {}", file.display(), e),
        }
    }
    log::info!(
        "Loaded {} labeled records from {} JSON files",
        records.len(),
        files.len()
    );
    Ok(records)
}

/// Accept either a single JSON file or a directory of them
pub fn load_labeled(path: &Path) -> Result<Vec<LabeledRecord>> {
    if path.is_dir() {
        load_analysis_dir(path)
    } else {
        load_labeled_file(path)
    }
}
