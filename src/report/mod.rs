//! Project quality reports built from labeled records.

pub mod suggestions;

pub use suggestions::{suggest, Suggestion};

use crate::core::{FileFeatures, Language, SmellKind};
use crate::smells::{LabeledRecord, QualityAssessment, Smell};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QualityDistribution {
    /// 90 and above
    pub excellent: usize,
    /// 75 to 89
    pub good: usize,
    /// 60 to 74
    pub fair: usize,
    /// below 60
    pub poor: usize,
}

impl QualityDistribution {
    fn add(&mut self, score: u32) {
        match score {
            90.. => self.excellent += 1,
            75..=89 => self.good += 1,
            60..=74 => self.fair += 1,
            _ => self.poor += 1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectSummary {
    pub total_files: usize,
    pub total_lines_of_code: usize,
    pub total_functions: usize,
    pub average_cyclomatic_complexity: f64,
    pub total_code_smells: usize,
    pub average_quality_score: f64,
    pub files_by_quality: QualityDistribution,
    pub smell_counts: BTreeMap<SmellKind, usize>,
    /// Mean of each feature over the files where it is known
    pub feature_averages: BTreeMap<String, f64>,
}

impl ProjectSummary {
    pub fn from_files(records: &[LabeledRecord]) -> Self {
        let mut summary = Self {
            total_files: records.len(),
            ..Self::default()
        };
        if records.is_empty() {
            return summary;
        }

        let mut cyclomatic_total = 0u64;
        let mut score_total = 0u64;
        for record in records {
            let analysis = &record.analysis;
            summary.total_lines_of_code += analysis.features.lines_of_code.max(0.0) as usize;
            summary.total_functions += analysis.functions.len();
            cyclomatic_total += analysis
                .functions
                .iter()
                .map(|f| u64::from(f.cyclomatic))
                .sum::<u64>();
            summary.total_code_smells += record.smells.len();
            score_total += u64::from(record.quality.score);
            summary.files_by_quality.add(record.quality.score);
            for smell in &record.smells {
                *summary.smell_counts.entry(smell.kind).or_default() += 1;
            }
        }

        if summary.total_functions > 0 {
            summary.average_cyclomatic_complexity =
                cyclomatic_total as f64 / summary.total_functions as f64;
        }
        summary.average_quality_score = score_total as f64 / records.len() as f64;

        for name in FileFeatures::NAMES {
            let known: Vec<f64> = records
                .iter()
                .filter_map(|r| r.analysis.features.get(name))
                .filter(|v| v.is_finite())
                .collect();
            if !known.is_empty() {
                let mean = known.iter().sum::<f64>() / known.len() as f64;
                summary
                    .feature_averages
                    .insert(name.to_string(), crate::metrics::round_to(mean, 3));
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileReport {
    pub path: PathBuf,
    pub language: Language,
    pub quality: QualityAssessment,
    pub smells: Vec<Smell>,
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityReport {
    pub generated_at: DateTime<Utc>,
    pub summary: ProjectSummary,
    /// Worst files first
    pub files: Vec<FileReport>,
}

impl QualityReport {
    pub fn build(records: &[LabeledRecord]) -> Self {
        let mut files: Vec<FileReport> = records
            .iter()
            .map(|record| FileReport {
                path: record.analysis.path.clone(),
                language: record.analysis.language,
                quality: record.quality,
                smells: record.smells.clone(),
                suggestions: record.smells.iter().map(suggest).collect(),
            })
            .collect();
        files.sort_by_key(|f| f.quality.score);

        Self {
            generated_at: Utc::now(),
            summary: ProjectSummary::from_files(records),
            files,
        }
    }

    /// Files with at least one smell
    pub fn smelly_files(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| !f.smells.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FileAnalysis, FunctionMetrics};
    use crate::smells::SmellDetector;
    use pretty_assertions::assert_eq;

    fn record(path: &str, cyclomatic: &[u32], loc: f64) -> LabeledRecord {
        let mut analysis = FileAnalysis::empty(PathBuf::from(path), Language::Python);
        for (i, &cc) in cyclomatic.iter().enumerate() {
            let mut f = FunctionMetrics::new(format!("f{i}"), i + 1);
            f.cyclomatic = cc;
            f.has_docstring = true;
            analysis.functions.push(f);
        }
        analysis.features.lines_of_code = loc;
        analysis.features.unit_test_presence = 1.0;
        LabeledRecord::new(analysis, &SmellDetector::default())
    }

    #[test]
    fn test_summary_totals() {
        let records = vec![
            record("a.py", &[1, 3], 40.0),
            record("b.py", &[20], 200.0),
            record("c.py", &[], 5.0),
        ];
        let summary = ProjectSummary::from_files(&records);
        assert_eq!(summary.total_files, 3);
        assert_eq!(summary.total_lines_of_code, 245);
        assert_eq!(summary.total_functions, 3);
        assert_eq!(summary.average_cyclomatic_complexity, 8.0);
        assert_eq!(summary.smell_counts.get(&SmellKind::SpaghettiCode), Some(&1));
        assert_eq!(
            summary.total_code_smells,
            records.iter().map(|r| r.smells.len()).sum::<usize>()
        );
        let dist = summary.files_by_quality;
        assert_eq!(dist.excellent + dist.good + dist.fair + dist.poor, 3);
        assert_eq!(summary.feature_averages.get("lines_of_code"), Some(&81.667));
        assert!(!summary.feature_averages.contains_key("commit_count"));
    }

    #[test]
    fn test_empty_summary() {
        let summary = ProjectSummary::from_files(&[]);
        assert_eq!(summary, ProjectSummary::default());
    }

    #[test]
    fn test_report_orders_worst_first_with_suggestions() {
        let records = vec![record("clean.py", &[1], 10.0), record("messy.py", &[30], 10.0)];
        let report = QualityReport::build(&records);
        assert_eq!(report.files[0].path, PathBuf::from("messy.py"));
        assert_eq!(report.files[0].suggestions.len(), report.files[0].smells.len());
        assert_eq!(report.smelly_files().count(), 1);
    }

    #[test]
    fn test_distribution_bands() {
        let mut dist = QualityDistribution::default();
        for score in [100, 90, 89, 75, 74, 60, 59, 0] {
            dist.add(score);
        }
        assert_eq!(
            dist,
            QualityDistribution {
                excellent: 2,
                good: 2,
                fair: 2,
                poor: 2
            }
        );
    }
}
