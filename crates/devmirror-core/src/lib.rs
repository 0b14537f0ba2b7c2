//! # DevMirror Core
//!
//! Core engine for DevMirror.rs - structural coding profiles
//!
//! This crate derives a coding profile from Rust source snapshots:
//! - Structural parsing and complexity estimation
//! - Rule-based pattern and cognitive style classification
//! - Bounded structural scoring
//! - Longitudinal trend inference over a session history
//!
//! Every component is a pure function of its inputs and configuration.
//! Persistence, transport and presentation belong to the caller.

pub mod analysis;
pub mod engine;
pub mod history;
pub mod scoring;
pub mod trend;

// Re-export commonly used types
pub use devmirror_shared::*;

pub use analysis::{
    CognitiveStyle, ComplexityEstimator, Insight, MetricsAggregator, PatternClassifier,
    StructuralParser,
};
pub use engine::{NarrativeBrief, Profiler, ScoredAnalysis, SessionReport};
pub use history::{History, HistoryEntry, HistoryStore, InMemoryHistoryStore};
pub use scoring::{ScoreBreakdown, StructuralScorer};
pub use trend::{
    BaselineTrend, GrowthVelocity, ProfileTendency, ShortTermTrend, SignalConfidence, TrendEngine,
    TrendReport, TrendSummary,
};
