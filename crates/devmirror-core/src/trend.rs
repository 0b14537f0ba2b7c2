//! Longitudinal trend inference
//!
//! Read-only analyses over a subject's [`History`]:
//! - Short-term and baseline trend
//! - Growth velocity across the whole session
//! - Signal confidence from sample size
//! - Cognitive profile tendencies
//!
//! Every operation is total: short histories produce sentinel values, never errors.

use crate::history::History;
use devmirror_shared::TrendConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Latest score against the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShortTermTrend {
    Improving,
    Declining,
    Stable,
}

impl fmt::Display for ShortTermTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortTermTrend::Improving => write!(f, "Improving recently."),
            ShortTermTrend::Declining => write!(f, "Declining recently."),
            ShortTermTrend::Stable => write!(f, "Stable recently."),
        }
    }
}

/// Latest score against the baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaselineTrend {
    Growth,
    Decline,
    NearBaseline,
}

impl fmt::Display for BaselineTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaselineTrend::Growth => write!(f, "Overall structural growth since baseline."),
            BaselineTrend::Decline => write!(f, "Overall structural decline since baseline."),
            BaselineTrend::NearBaseline => write!(f, "Near baseline structure."),
        }
    }
}

/// Result of [`TrendEngine::analyze_trend`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrendReport {
    InsufficientData,
    Classified {
        short_term: ShortTermTrend,
        long_term: BaselineTrend,
        delta: f64,
        baseline_delta: f64,
    },
}

impl TrendReport {
    pub fn is_insufficient(&self) -> bool {
        matches!(self, TrendReport::InsufficientData)
    }
}

impl fmt::Display for TrendReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendReport::InsufficientData => write!(f, "Insufficient data for trend analysis."),
            TrendReport::Classified {
                short_term,
                long_term,
                ..
            } => write!(f, "{short_term} {long_term}"),
        }
    }
}

/// Mean score change per submission, in ordered bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthVelocity {
    NotEnoughData,
    RapidImprovement,
    GradualImprovement,
    NoTrend,
    MildRegression,
    SignificantRegression,
}

impl fmt::Display for GrowthVelocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            GrowthVelocity::NotEnoughData => "Not enough data to estimate growth velocity.",
            GrowthVelocity::RapidImprovement => "Rapid structural improvement.",
            GrowthVelocity::GradualImprovement => "Gradual structural improvement.",
            GrowthVelocity::NoTrend => "No structural change trend.",
            GrowthVelocity::MildRegression => "Mild structural regression.",
            GrowthVelocity::SignificantRegression => "Significant structural regression.",
        };
        f.write_str(text)
    }
}

/// Reliability of the signal, from sample count alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalConfidence {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl fmt::Display for SignalConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SignalConfidence::Low => "Low confidence (insufficient data).",
            SignalConfidence::Moderate => "Moderate confidence (limited history).",
            SignalConfidence::High => "High confidence (solid behavioral sample).",
            SignalConfidence::VeryHigh => {
                "Very high confidence (strong behavioral pattern established)."
            }
        };
        f.write_str(text)
    }
}

/// Tendency inferred across a whole session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileTendency {
    MicroFunctionArchitect,
    DeepNestingBias,
    MonolithicConstruction,
}

impl fmt::Display for ProfileTendency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ProfileTendency::MicroFunctionArchitect => "Micro-function architect tendency",
            ProfileTendency::DeepNestingBias => "Deep nesting bias",
            ProfileTendency::MonolithicConstruction => "Monolithic construction tendency",
        };
        f.write_str(text)
    }
}

/// All trend analyses for one history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub submissions: usize,
    pub trend: TrendReport,
    pub velocity: GrowthVelocity,
    pub confidence: SignalConfidence,
    pub profile: Vec<ProfileTendency>,
}

/// Trend engine parameterized by [`TrendConfig`]
#[derive(Debug, Clone, Default)]
pub struct TrendEngine {
    config: TrendConfig,
}

impl TrendEngine {
    pub fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    /// Run every analysis over the same history
    pub fn summarize(&self, history: &History) -> TrendSummary {
        TrendSummary {
            submissions: history.len(),
            trend: self.analyze_trend(history),
            velocity: self.calculate_growth_velocity(history),
            confidence: self.calculate_signal_confidence(history),
            profile: self.infer_cognitive_profile(history),
        }
    }

    /// Short-term (latest vs previous) and long-term (latest vs baseline) trend
    pub fn analyze_trend(&self, history: &History) -> TrendReport {
        if history.len() < self.config.min_trend_entries {
            return TrendReport::InsufficientData;
        }
        let (Some(baseline), Some(previous), Some(latest)) =
            (history.baseline(), history.previous(), history.latest())
        else {
            return TrendReport::InsufficientData;
        };

        let latest = latest.score.value();
        let delta = latest - previous.score.value();
        let baseline_delta = latest - baseline.score.value();

        let short_band = self.config.short_term_band;
        let short_term = if delta > short_band {
            ShortTermTrend::Improving
        } else if delta < -short_band {
            ShortTermTrend::Declining
        } else {
            ShortTermTrend::Stable
        };

        let long_band = self.config.baseline_band;
        let long_term = if baseline_delta > long_band {
            BaselineTrend::Growth
        } else if baseline_delta < -long_band {
            BaselineTrend::Decline
        } else {
            BaselineTrend::NearBaseline
        };

        TrendReport::Classified {
            short_term,
            long_term,
            delta,
            baseline_delta,
        }
    }

    /// Mean of consecutive score deltas across the whole history
    ///
    /// `None` for fewer than two entries.
    pub fn mean_score_delta(&self, history: &History) -> Option<f64> {
        let scores: Vec<f64> = history.scores().collect();
        if scores.len() < 2 {
            return None;
        }

        let total: f64 = scores.windows(2).map(|pair| pair[1] - pair[0]).sum();
        Some(total / (scores.len() - 1) as f64)
    }

    pub fn calculate_growth_velocity(&self, history: &History) -> GrowthVelocity {
        if history.len() < self.config.min_velocity_entries {
            return GrowthVelocity::NotEnoughData;
        }
        let Some(mean_delta) = self.mean_score_delta(history) else {
            return GrowthVelocity::NotEnoughData;
        };

        if mean_delta > self.config.rapid_improvement {
            GrowthVelocity::RapidImprovement
        } else if mean_delta > 0.0 {
            GrowthVelocity::GradualImprovement
        } else if mean_delta == 0.0 {
            GrowthVelocity::NoTrend
        } else if mean_delta > self.config.significant_regression {
            GrowthVelocity::MildRegression
        } else {
            GrowthVelocity::SignificantRegression
        }
    }

    /// Depends on the number of entries only
    pub fn calculate_signal_confidence(&self, history: &History) -> SignalConfidence {
        let tiers = &self.config.confidence;
        match history.len() {
            n if n < tiers.low_below => SignalConfidence::Low,
            n if n < tiers.moderate_below => SignalConfidence::Moderate,
            n if n < tiers.high_below => SignalConfidence::High,
            _ => SignalConfidence::VeryHigh,
        }
    }

    /// Session-wide tendencies
    ///
    /// The micro-function and monolithic rules read the same mean and are not
    /// exclusive of each other.
    pub fn infer_cognitive_profile(&self, history: &History) -> Vec<ProfileTendency> {
        if history.len() < self.config.min_profile_entries {
            return Vec::new();
        }
        let (Some(first), Some(last)) = (history.baseline(), history.latest()) else {
            return Vec::new();
        };

        let samples = history.len() as f64;
        let mean_length = history
            .iter()
            .map(|e| e.record.avg_function_length)
            .sum::<f64>()
            / samples;
        let mean_depth = history
            .iter()
            .map(|e| e.record.max_nesting_depth as f64)
            .sum::<f64>()
            / samples;
        let functions_grew = last.record.function_count > first.record.function_count;

        let mut profile = Vec::new();
        if mean_length < self.config.micro_function_length && functions_grew {
            profile.push(ProfileTendency::MicroFunctionArchitect);
        }
        if mean_depth > self.config.deep_nesting_depth {
            profile.push(ProfileTendency::DeepNestingBias);
        }
        if mean_length > self.config.monolithic_length {
            profile.push(ProfileTendency::MonolithicConstruction);
        }
        profile
    }
}
