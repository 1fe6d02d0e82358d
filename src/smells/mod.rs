//! Smell detection and the 0/1 training labels derived from it.

pub mod detector;

pub use detector::{Smell, SmellDetector};

use crate::core::{FileAnalysis, QualityLabel, SmellKind, ANY_SMELL_TARGET};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One 0/1 flag per target column (`y_<Kind>` and `y_any_smell`)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SmellLabels(BTreeMap<String, u8>);

impl SmellLabels {
    pub fn from_smells(smells: &[Smell]) -> Self {
        let mut flags: BTreeMap<String, u8> = SmellKind::ALL
            .iter()
            .map(|kind| (kind.target_name(), 0))
            .collect();
        for smell in smells {
            flags.insert(smell.kind.target_name(), 1);
        }
        flags.insert(
            ANY_SMELL_TARGET.to_string(),
            u8::from(!smells.is_empty()),
        );
        Self(flags)
    }

    pub fn get(&self, target: &str) -> u8 {
        self.0.get(target).copied().unwrap_or(0)
    }

    pub fn has(&self, kind: SmellKind) -> bool {
        self.get(&kind.target_name()) == 1
    }

    /// Target names in dataset order: every smell kind, then `y_any_smell`
    pub fn target_names() -> Vec<String> {
        SmellKind::ALL
            .iter()
            .map(SmellKind::target_name)
            .chain(std::iter::once(ANY_SMELL_TARGET.to_string()))
            .collect()
    }

    /// Values in [`SmellLabels::target_names`] order
    pub fn values(&self) -> Vec<u8> {
        Self::target_names().iter().map(|t| self.get(t)).collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct QualityAssessment {
    pub score: u32,
    pub label: QualityLabel,
}

/// Start from 100 and take off points for complexity, length and each smell
pub fn assess_quality(file: &FileAnalysis, smells: &[Smell]) -> QualityAssessment {
    let mut score: i64 = 100;
    let max_cc = file.max_cyclomatic();
    if max_cc > 15 {
        score -= 20;
    } else if max_cc > 10 {
        score -= 10;
    }
    if file.max_function_length() > 50 {
        score -= 15;
    }
    score -= 5 * smells.len() as i64;

    let score = score.clamp(0, 100) as u32;
    QualityAssessment {
        score,
        label: QualityLabel::from_score(score),
    }
}

/// An analysis record annotated with its smells, labels and quality
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabeledRecord {
    #[serde(flatten)]
    pub analysis: FileAnalysis,
    pub smells: Vec<Smell>,
    pub labels: SmellLabels,
    pub quality: QualityAssessment,
}

impl LabeledRecord {
    pub fn new(analysis: FileAnalysis, detector: &SmellDetector) -> Self {
        let smells = detector.detect(&analysis);
        let labels = SmellLabels::from_smells(&smells);
        let quality = assess_quality(&analysis, &smells);
        Self {
            analysis,
            smells,
            labels,
            quality,
        }
    }
}

pub fn label_records(records: Vec<FileAnalysis>, detector: &SmellDetector) -> Vec<LabeledRecord> {
    let labeled: Vec<LabeledRecord> = records
        .into_iter()
        .map(|record| LabeledRecord::new(record, detector))
        .collect();
    let smelly = labeled
        .iter()
        .filter(|r| r.labels.get(ANY_SMELL_TARGET) == 1)
        .count();
    log::info!("Labeled {} records, {} with at least one smell", labeled.len(), smelly);
    labeled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FunctionMetrics, Language, Severity};
    use std::path::PathBuf;

    fn smell(kind: SmellKind) -> Smell {
        Smell {
            kind,
            severity: Severity::Minor,
            line: 1,
            element: "f".to_string(),
            value: 1.0,
            threshold: 0.0,
            message: String::new(),
        }
    }

    #[test]
    fn test_labels_and_any_smell() {
        let labels = SmellLabels::from_smells(&[smell(SmellKind::GodClass), smell(SmellKind::GodClass)]);
        assert!(labels.has(SmellKind::GodClass));
        assert!(!labels.has(SmellKind::LongMethod));
        assert_eq!(labels.get(ANY_SMELL_TARGET), 1);
        assert_eq!(labels.values().iter().map(|v| *v as u32).sum::<u32>(), 2);

        let clean = SmellLabels::from_smells(&[]);
        assert_eq!(clean.values(), vec![0; SmellKind::ALL.len() + 1]);
    }

    #[test]
    fn test_detector_labels_match_record() {
        let mut file = FileAnalysis::empty(PathBuf::from("a.py"), Language::Python);
        let mut f = FunctionMetrics::new("f".to_string(), 1);
        f.length = 200;
        file.functions.push(f);

        let detector = SmellDetector::default();
        let labels = detector.labels(&file);
        assert!(labels.has(SmellKind::LongMethod));
        assert_eq!(labels.get(ANY_SMELL_TARGET), 1);
        assert_eq!(LabeledRecord::new(file, &detector).labels, labels);
    }

    #[test]
    fn test_target_names_order() {
        let names = SmellLabels::target_names();
        assert_eq!(names.first().map(String::as_str), Some("y_LongMethod"));
        assert_eq!(names.last().map(String::as_str), Some(ANY_SMELL_TARGET));
    }

    #[test]
    fn test_quality_assessment() {
        let mut file = FileAnalysis::empty(PathBuf::from("a.py"), Language::Python);
        let mut f = FunctionMetrics::new("f".to_string(), 1);
        f.cyclomatic = 16;
        f.length = 60;
        file.functions.push(f);

        let smells = vec![smell(SmellKind::LongMethod), smell(SmellKind::SpaghettiCode)];
        let quality = assess_quality(&file, &smells);
        // 100 - 20 - 15 - 10
        assert_eq!(quality.score, 55);
        assert_eq!(quality.label, QualityLabel::Poor);

        let many: Vec<Smell> = (0..30).map(|_| smell(SmellKind::LazyClass)).collect();
        assert_eq!(assess_quality(&file, &many).score, 0);
    }

    #[test]
    fn test_labeled_record_json_is_flat() {
        let file = FileAnalysis::empty(PathBuf::from("a.py"), Language::Python);
        let record = LabeledRecord::new(file, &SmellDetector::default());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["path"], "a.py");
        assert_eq!(json["labels"]["y_any_smell"], 0);
        let back: LabeledRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
