/// Inputs for the maintainability heuristics
#[derive(Debug, Clone, Copy, Default)]
pub struct MaintainabilityInputs {
    pub lines_of_code: usize,
    /// Sum of decision points across all functions
    pub total_decisions: u32,
    /// Documented elements / documentable elements, 0.0..=1.0
    pub documentation_coverage: f64,
    pub halstead_volume: f64,
}

impl MaintainabilityInputs {
    pub fn estimated_cyclomatic(&self) -> u32 {
        self.total_decisions + 1
    }
}

/// Rule-based 0-100 score
pub fn maintainability_score(inputs: &MaintainabilityInputs) -> f64 {
    let mut score: i32 = 100;

    score -= match inputs.lines_of_code {
        loc if loc > 200 => 20,
        loc if loc > 100 => 10,
        _ => 0,
    };

    score -= match inputs.estimated_cyclomatic() {
        cc if cc > 20 => 20,
        cc if cc > 10 => 10,
        _ => 0,
    };

    if inputs.documentation_coverage > 0.8 {
        score += 10;
    } else if inputs.documentation_coverage < 0.3 {
        score -= 15;
    }

    f64::from(score.clamp(0, 100))
}

/// Classic maintainability index rescaled to 0-100
pub fn maintainability_index(inputs: &MaintainabilityInputs) -> f64 {
    let ln = |x: f64| x.max(1.0).ln();
    let raw = 171.0
        - 5.2 * ln(inputs.halstead_volume)
        - 0.23 * f64::from(inputs.estimated_cyclomatic())
        - 16.2 * ln(inputs.lines_of_code as f64);
    (raw * 100.0 / 171.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_documented_file_scores_high() {
        let inputs = MaintainabilityInputs {
            lines_of_code: 40,
            total_decisions: 3,
            documentation_coverage: 0.9,
            halstead_volume: 120.0,
        };
        assert_eq!(maintainability_score(&inputs), 100.0);
    }

    #[test]
    fn test_penalties_accumulate() {
        let inputs = MaintainabilityInputs {
            lines_of_code: 250,
            total_decisions: 25,
            documentation_coverage: 0.1,
            halstead_volume: 5000.0,
        };
        assert_eq!(maintainability_score(&inputs), 45.0);
    }

    #[test]
    fn test_middle_bands() {
        let inputs = MaintainabilityInputs {
            lines_of_code: 150,
            total_decisions: 12,
            documentation_coverage: 0.5,
            halstead_volume: 0.0,
        };
        assert_eq!(maintainability_score(&inputs), 80.0);
    }

    #[test]
    fn test_index_of_empty_file_is_maximal() {
        let inputs = MaintainabilityInputs::default();
        let expected = (171.0 - 0.23) * 100.0 / 171.0;
        assert!((maintainability_index(&inputs) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_index_never_negative() {
        let inputs = MaintainabilityInputs {
            lines_of_code: 1_000_000,
            total_decisions: 10_000,
            documentation_coverage: 0.0,
            halstead_volume: 1e12,
        };
        assert_eq!(maintainability_index(&inputs), 0.0);
    }
}
