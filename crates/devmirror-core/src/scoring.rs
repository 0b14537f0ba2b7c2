//! Structural discipline score
//!
//! Converts one analysis record into a bounded score in `[0, 100]`.
//! Higher means shallower nesting, simpler branching and smaller functions.

use devmirror_shared::{AnalysisRecord, ScoringConfig, StructuralScore, round2};
use serde::{Deserialize, Serialize};

/// Individual terms of the score formula
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub depth_penalty: f64,
    pub complexity_penalty: f64,
    pub length_penalty: f64,
    pub modularity_bonus: f64,
    pub score: StructuralScore,
}

/// Scorer parameterized by [`ScoringConfig`]
#[derive(Debug, Clone, Default)]
pub struct StructuralScorer {
    config: ScoringConfig,
}

impl StructuralScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn score(&self, record: &AnalysisRecord) -> StructuralScore {
        self.breakdown(record).score
    }

    pub fn breakdown(&self, record: &AnalysisRecord) -> ScoreBreakdown {
        let cfg = &self.config;

        let depth_penalty = (record.max_nesting_depth as f64 * cfg.depth_weight).min(cfg.depth_cap);
        let complexity_penalty =
            (record.cyclomatic_complexity * cfg.complexity_weight).min(cfg.complexity_cap);
        let length_penalty = (record.avg_function_length / cfg.length_divisor).min(cfg.length_cap);

        // Tiers are ordered highest first
        let modularity_bonus = cfg
            .modularity_tiers
            .iter()
            .find(|tier| {
                record.function_count >= tier.min_functions
                    && record.avg_function_length < tier.max_avg_length
            })
            .map_or(0.0, |tier| tier.bonus);

        let raw = cfg.base_score - (depth_penalty + complexity_penalty + length_penalty);

        ScoreBreakdown {
            depth_penalty,
            complexity_penalty,
            length_penalty,
            modularity_bonus,
            score: StructuralScore::new(round2(raw + modularity_bonus)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devmirror_shared::ModularityTier;

    fn record(count: usize, avg_len: f64, depth: usize, cc: f64) -> AnalysisRecord {
        AnalysisRecord {
            function_count: count,
            avg_function_length: avg_len,
            max_nesting_depth: depth,
            cyclomatic_complexity: cc,
            ..AnalysisRecord::default()
        }
    }

    #[test]
    fn test_simple_function_score() {
        let score = StructuralScorer::default().score(&record(1, 5.0, 0, 1.0));
        assert_eq!(score.value(), 95.5);
    }

    #[test]
    fn test_half_cent_ties_round_to_even() {
        // 100 - (5 + 2.5 + 1.375) + 5 = 96.125
        let score = StructuralScorer::default().score(&record(4, 2.75, 1, 1.25));
        assert_eq!(score.value(), 96.12);
    }

    #[test]
    fn test_modularity_tiers() {
        let scorer = StructuralScorer::default();

        let top = scorer.breakdown(&record(6, 10.0, 0, 1.0));
        assert_eq!(top.modularity_bonus, 10.0);

        let middle = scorer.breakdown(&record(6, 22.0, 0, 1.0));
        assert_eq!(middle.modularity_bonus, 5.0);

        let small = scorer.breakdown(&record(3, 24.9, 0, 1.0));
        assert_eq!(small.modularity_bonus, 5.0);

        let none = scorer.breakdown(&record(2, 5.0, 0, 1.0));
        assert_eq!(none.modularity_bonus, 0.0);
    }

    #[test]
    fn test_score_is_capped_at_100() {
        // 100 - 0.5 + 10
        let score = StructuralScorer::default().score(&record(8, 1.0, 0, 0.0));
        assert_eq!(score.value(), 100.0);
    }

    #[test]
    fn test_penalties_are_capped() {
        let breakdown = StructuralScorer::default().breakdown(&record(1, 500.0, 40, 90.0));
        assert_eq!(breakdown.depth_penalty, 30.0);
        assert_eq!(breakdown.complexity_penalty, 40.0);
        assert_eq!(breakdown.length_penalty, 30.0);
        assert_eq!(breakdown.score.value(), 0.0);
    }

    #[test]
    fn test_extreme_inputs_stay_in_range() {
        let scorer = StructuralScorer::default();
        for r in [
            record(usize::MAX, f64::MAX, usize::MAX, f64::MAX),
            record(0, 0.0, 0, 0.0),
            record(1_000_000, 0.0, 0, 0.0),
            record(3, f64::INFINITY, 2, f64::NAN),
        ] {
            let value = scorer.score(&r).value();
            assert!((0.0..=100.0).contains(&value), "out of range: {value}");
        }
    }

    #[test]
    fn test_uncapped_config_still_clamps() {
        let config = ScoringConfig {
            depth_cap: f64::MAX,
            complexity_cap: f64::MAX,
            length_cap: f64::MAX,
            modularity_tiers: vec![ModularityTier {
                min_functions: 0,
                max_avg_length: f64::MAX,
                bonus: 1_000.0,
            }],
            ..ScoringConfig::default()
        };
        let scorer = StructuralScorer::new(config);
        assert_eq!(scorer.score(&record(1, 1.0, 0, 0.0)).value(), 100.0);
        assert_eq!(scorer.score(&record(1, 1.0, 1_000, 0.0)).value(), 0.0);
    }
}
