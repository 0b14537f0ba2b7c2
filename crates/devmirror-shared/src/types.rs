//! Core types used throughout DevMirror.rs

use serde::{Deserialize, Serialize};

/// Raw structural counts extracted from one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StructuralMetrics {
    /// Function definitions at any nesting level
    pub function_count: usize,

    /// Mean function length in lines, 0 when there are no functions
    pub avg_function_length: f64,

    /// Deepest simultaneous nesting of control-flow constructs
    pub max_nesting_depth: usize,
}

/// Decision-point complexity of one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ComplexityMetrics {
    /// Mean cyclomatic complexity over all function blocks
    pub cyclomatic_complexity: f64,
}

/// Complete analysis of one snapshot, the unit stored in history
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub function_count: usize,
    pub avg_function_length: f64,
    pub max_nesting_depth: usize,
    pub cyclomatic_complexity: f64,
    pub insights: Vec<String>,
    pub cognitive_profile: Vec<String>,
}

impl AnalysisRecord {
    /// Merge the stage outputs into one record
    pub fn new(
        structure: StructuralMetrics,
        complexity: ComplexityMetrics,
        insights: Vec<String>,
        cognitive_profile: Vec<String>,
    ) -> Self {
        Self {
            function_count: structure.function_count,
            avg_function_length: structure.avg_function_length,
            max_nesting_depth: structure.max_nesting_depth,
            cyclomatic_complexity: complexity.cyclomatic_complexity,
            insights,
            cognitive_profile,
        }
    }

    /// Structural part of the record
    pub fn structure(&self) -> StructuralMetrics {
        StructuralMetrics {
            function_count: self.function_count,
            avg_function_length: self.avg_function_length,
            max_nesting_depth: self.max_nesting_depth,
        }
    }

    /// Complexity part of the record
    pub fn complexity(&self) -> ComplexityMetrics {
        ComplexityMetrics {
            cyclomatic_complexity: self.cyclomatic_complexity,
        }
    }
}

/// Structural discipline score, always within `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct StructuralScore(f64);

impl StructuralScore {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 100.0;

    /// Create a score, clamping into range. NaN maps to the minimum.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(Self::MIN);
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for StructuralScore {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<StructuralScore> for f64 {
    fn from(score: StructuralScore) -> Self {
        score.0
    }
}

impl std::fmt::Display for StructuralScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Behavioral signal produced by the event-log analysis service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerSignal {
    pub thinking_style: String,
    pub confidence: f64,
    pub debug_loop: bool,
}

impl PeerSignal {
    pub const FALLBACK_STYLE: &'static str = "Unknown (Fallback)";

    /// Create a signal, clamping confidence into `[0, 1]`
    pub fn new(thinking_style: impl Into<String>, confidence: f64, debug_loop: bool) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };

        Self {
            thinking_style: thinking_style.into(),
            confidence,
            debug_loop,
        }
    }

    /// Value used when the peer service supplies nothing
    pub fn fallback() -> Self {
        Self::new(Self::FALLBACK_STYLE, 0.0, false)
    }

    pub fn is_fallback(&self) -> bool {
        self.thinking_style == Self::FALLBACK_STYLE
    }
}

impl Default for PeerSignal {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Round to two decimal places, ties to even
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_clamps() {
        assert_eq!(StructuralScore::new(-12.0).value(), 0.0);
        assert_eq!(StructuralScore::new(140.0).value(), 100.0);
        assert_eq!(StructuralScore::new(f64::NAN).value(), 0.0);
        assert_eq!(StructuralScore::new(f64::INFINITY).value(), 100.0);
        assert_eq!(StructuralScore::new(95.5).to_string(), "95.50");
    }

    #[test]
    fn test_record_round_trips_parts() {
        let structure = StructuralMetrics {
            function_count: 3,
            avg_function_length: 7.33,
            max_nesting_depth: 2,
        };
        let complexity = ComplexityMetrics {
            cyclomatic_complexity: 2.5,
        };
        let record = AnalysisRecord::new(structure, complexity, Vec::new(), Vec::new());

        assert_eq!(record.structure(), structure);
        assert_eq!(record.complexity(), complexity);
    }

    #[test]
    fn test_peer_signal_fallback() {
        let signal = PeerSignal::default();
        assert!(signal.is_fallback());
        assert_eq!(signal.confidence, 0.0);
        assert!(!signal.debug_loop);

        assert_eq!(PeerSignal::new("Explorer", 1.7, true).confidence, 1.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(7.3333), 7.33);
        assert_eq!(round2(2.0), 2.0);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(96.125), 96.12);
        assert_eq!(round2(96.375), 96.38);
        assert_eq!(round2(1.375), 1.38);
    }

    #[test]
    fn test_score_clamps_when_deserialized() {
        let high: StructuralScore = serde_json::from_str("250.0").unwrap();
        assert_eq!(high.value(), 100.0);
        let low: StructuralScore = serde_json::from_str("-3").unwrap();
        assert_eq!(low.value(), 0.0);
        assert_eq!(serde_json::to_string(&StructuralScore::new(95.5)).unwrap(), "95.5");
    }
}
