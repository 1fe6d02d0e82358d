//! Features computed from combinations of raw metrics.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedFeature {
    ComplexityScore,
    CodeHealth,
    DocQuality,
    HasTests,
    CouplingComplexity,
    EffortImpactRatio,
    FileMaturity,
}

impl DerivedFeature {
    pub const ALL: [DerivedFeature; 7] = [
        DerivedFeature::ComplexityScore,
        DerivedFeature::CodeHealth,
        DerivedFeature::DocQuality,
        DerivedFeature::HasTests,
        DerivedFeature::CouplingComplexity,
        DerivedFeature::EffortImpactRatio,
        DerivedFeature::FileMaturity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DerivedFeature::ComplexityScore => "complexity_score",
            DerivedFeature::CodeHealth => "code_health",
            DerivedFeature::DocQuality => "doc_quality",
            DerivedFeature::HasTests => "has_tests",
            DerivedFeature::CouplingComplexity => "coupling_complexity",
            DerivedFeature::EffortImpactRatio => "effort_impact_ratio",
            DerivedFeature::FileMaturity => "file_maturity",
        }
    }

    /// Raw columns this feature reads, in the order `compute` expects them
    pub fn inputs(&self) -> &'static [&'static str] {
        match self {
            DerivedFeature::ComplexityScore => &[
                "average_cyclomatic_complexity",
                "max_cyclomatic_complexity",
                "average_cognitive_complexity",
            ],
            DerivedFeature::CodeHealth => &[
                "formatting_violations",
                "maintainability_score",
                "comment_code_mismatch_score",
            ],
            DerivedFeature::DocQuality => &["documentation_coverage", "comment_percentage"],
            DerivedFeature::HasTests => &["unit_test_presence"],
            DerivedFeature::CouplingComplexity => &["efferent_coupling", "instability"],
            DerivedFeature::EffortImpactRatio => &["halstead_effort", "halstead_estimated_bugs"],
            DerivedFeature::FileMaturity => &["file_age_days", "lines_added", "lines_of_code"],
        }
    }

    /// `values` holds one entry per name in [`DerivedFeature::inputs`]
    pub fn compute(&self, values: &[f64]) -> f64 {
        match (self, values) {
            (DerivedFeature::ComplexityScore, [avg, max, cognitive]) => {
                (avg + max + cognitive) / 3.0
            }
            (DerivedFeature::CodeHealth, [violations, maintainability, mismatch]) => {
                (100.0 - violations) * 0.3 + maintainability * 0.4 + (100.0 - mismatch * 100.0) * 0.3
            }
            (DerivedFeature::DocQuality, [coverage, comments]) => {
                coverage * 0.5 + (100.0 - comments) * 0.5
            }
            (DerivedFeature::HasTests, [presence]) => {
                if *presence > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            (DerivedFeature::CouplingComplexity, [efferent, instability]) => {
                efferent * 0.5 + instability * 0.5
            }
            (DerivedFeature::EffortImpactRatio, [effort, bugs]) => effort / (bugs + 1.0),
            (DerivedFeature::FileMaturity, [age, added, loc]) => {
                age.max(0.0).ln_1p() * (1.0 + added / loc.max(1.0))
            }
            _ => f64::NAN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formulas() {
        assert_eq!(DerivedFeature::ComplexityScore.compute(&[2.0, 6.0, 1.0]), 3.0);
        assert_eq!(DerivedFeature::CodeHealth.compute(&[10.0, 50.0, 0.5]), 27.0 + 20.0 + 15.0);
        assert_eq!(DerivedFeature::DocQuality.compute(&[40.0, 20.0]), 60.0);
        assert_eq!(DerivedFeature::HasTests.compute(&[0.0]), 0.0);
        assert_eq!(DerivedFeature::HasTests.compute(&[1.0]), 1.0);
        assert_eq!(DerivedFeature::EffortImpactRatio.compute(&[300.0, 2.0]), 100.0);
        assert_eq!(DerivedFeature::FileMaturity.compute(&[0.0, 10.0, 0.0]), 0.0);
        let maturity = DerivedFeature::FileMaturity.compute(&[std::f64::consts::E - 1.0, 10.0, 10.0]);
        assert!((maturity - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_wrong_arity_is_nan() {
        assert!(DerivedFeature::DocQuality.compute(&[1.0]).is_nan());
    }
}
