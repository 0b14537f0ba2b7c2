//! Pattern classification
//!
//! Fixed-threshold rules turning merged metrics into insights and
//! single-snapshot cognitive style labels. Rules are independent; any number
//! of them may fire for the same snapshot.

use devmirror_shared::{ClassifierConfig, ComplexityMetrics, StructuralMetrics};
use serde::{Deserialize, Serialize};

/// Structural observation about one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Insight {
    DeepNesting,
    LargeFunctions,
    HighComplexity,
    ScriptStyle,
}

impl Insight {
    pub fn message(self) -> &'static str {
        match self {
            Insight::DeepNesting => "Deep nesting detected. Consider simplifying control flow.",
            Insight::LargeFunctions => {
                "Large function size detected. Consider breaking into smaller units."
            }
            Insight::HighComplexity => {
                "High cyclomatic complexity. Logic may be difficult to maintain."
            }
            Insight::ScriptStyle => {
                "No functions detected. Code may be script-style and less modular."
            }
        }
    }
}

/// Cognitive style suggested by a single snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CognitiveStyle {
    OverStructurer,
    MonolithicBuilder,
    MicroModularThinker,
    LinearThinker,
}

impl CognitiveStyle {
    pub fn message(self) -> &'static str {
        match self {
            CognitiveStyle::OverStructurer => {
                "Over-structurer: Tends toward layered logic and heavy branching."
            }
            CognitiveStyle::MonolithicBuilder => {
                "Monolithic builder: Prefers large, centralized functions."
            }
            CognitiveStyle::MicroModularThinker => {
                "Micro-modular thinker: Breaks problems into small abstractions."
            }
            CognitiveStyle::LinearThinker => "Linear thinker: Prefers straightforward control flow.",
        }
    }
}

/// Output of the classifier, in rule order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PatternReport {
    pub insights: Vec<Insight>,
    pub cognitive_profile: Vec<CognitiveStyle>,
}

impl PatternReport {
    pub fn insight_messages(&self) -> Vec<String> {
        self.insights.iter().map(|i| i.message().to_string()).collect()
    }

    pub fn profile_messages(&self) -> Vec<String> {
        self.cognitive_profile
            .iter()
            .map(|s| s.message().to_string())
            .collect()
    }
}

/// Rule-based classifier over structural and complexity metrics
#[derive(Debug, Clone, Default)]
pub struct PatternClassifier {
    config: ClassifierConfig,
}

impl PatternClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn classify(
        &self,
        structure: &StructuralMetrics,
        complexity: &ComplexityMetrics,
    ) -> PatternReport {
        let cfg = &self.config;
        let depth = structure.max_nesting_depth;
        let avg_len = structure.avg_function_length;
        let func_count = structure.function_count;
        let cc = complexity.cyclomatic_complexity;

        let mut report = PatternReport::default();

        if depth >= cfg.deep_nesting_depth {
            report.insights.push(Insight::DeepNesting);
        }
        if avg_len > cfg.large_function_length {
            report.insights.push(Insight::LargeFunctions);
        }
        if cc > cfg.high_complexity {
            report.insights.push(Insight::HighComplexity);
        }
        if func_count == 0 {
            report.insights.push(Insight::ScriptStyle);
        }

        if depth >= cfg.over_structurer_depth && cc > cfg.over_structurer_complexity {
            report.cognitive_profile.push(CognitiveStyle::OverStructurer);
        }
        if avg_len > cfg.monolithic_length {
            report.cognitive_profile.push(CognitiveStyle::MonolithicBuilder);
        }
        if func_count > cfg.micro_modular_min_functions && avg_len < cfg.micro_modular_max_length {
            report.cognitive_profile.push(CognitiveStyle::MicroModularThinker);
        }
        if cc < cfg.linear_max_complexity && depth <= cfg.linear_max_depth {
            report.cognitive_profile.push(CognitiveStyle::LinearThinker);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(count: usize, avg_len: f64, depth: usize, cc: f64) -> (StructuralMetrics, ComplexityMetrics) {
        (
            StructuralMetrics {
                function_count: count,
                avg_function_length: avg_len,
                max_nesting_depth: depth,
            },
            ComplexityMetrics {
                cyclomatic_complexity: cc,
            },
        )
    }

    #[test]
    fn test_simple_function_is_linear() {
        let (s, c) = metrics(1, 5.0, 0, 1.0);
        let report = PatternClassifier::default().classify(&s, &c);
        assert!(report.insights.is_empty());
        assert_eq!(report.cognitive_profile, vec![CognitiveStyle::LinearThinker]);
        assert!(report.profile_messages()[0].starts_with("Linear thinker"));
    }

    #[test]
    fn test_script_style() {
        let (s, c) = metrics(0, 0.0, 0, 0.0);
        let report = PatternClassifier::default().classify(&s, &c);
        assert_eq!(report.insights, vec![Insight::ScriptStyle]);
        assert_eq!(report.cognitive_profile, vec![CognitiveStyle::LinearThinker]);
    }

    #[test]
    fn test_multiple_rules_fire() {
        let (s, c) = metrics(2, 45.0, 4, 12.0);
        let report = PatternClassifier::default().classify(&s, &c);
        assert_eq!(
            report.insights,
            vec![Insight::DeepNesting, Insight::LargeFunctions, Insight::HighComplexity]
        );
        assert_eq!(
            report.cognitive_profile,
            vec![CognitiveStyle::OverStructurer, CognitiveStyle::MonolithicBuilder]
        );
    }

    #[test]
    fn test_threshold_boundaries() {
        // Depth 3 is deep, length 30 and complexity 10 are not yet over
        let (s, c) = metrics(6, 30.0, 3, 10.0);
        let report = PatternClassifier::default().classify(&s, &c);
        assert_eq!(report.insights, vec![Insight::DeepNesting]);
        assert!(report.cognitive_profile.is_empty());

        let (s, c) = metrics(6, 14.9, 1, 4.9);
        let report = PatternClassifier::default().classify(&s, &c);
        assert_eq!(
            report.cognitive_profile,
            vec![CognitiveStyle::MicroModularThinker, CognitiveStyle::LinearThinker]
        );
    }

    #[test]
    fn test_thresholds_are_configurable() {
        let config = ClassifierConfig {
            deep_nesting_depth: 1,
            ..ClassifierConfig::default()
        };
        let (s, c) = metrics(1, 5.0, 1, 1.0);
        let report = PatternClassifier::new(config).classify(&s, &c);
        assert_eq!(report.insights, vec![Insight::DeepNesting]);
    }
}
