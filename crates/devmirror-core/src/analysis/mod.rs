//! Snapshot analysis
//!
//! This module turns one code snapshot into one [`AnalysisRecord`]:
//! - Structural parsing (function counts, lengths, nesting depth)
//! - Cyclomatic complexity estimation
//! - Pattern and cognitive style classification
//! - Aggregation into a single record
//!
//! [`AnalysisRecord`]: devmirror_shared::AnalysisRecord

pub mod complexity;
pub mod metrics;
pub mod parser;
pub mod patterns;

// Re-export main types
pub use complexity::{BlockComplexity, ComplexityEstimator};
pub use metrics::MetricsAggregator;
pub use parser::StructuralParser;
pub use patterns::{CognitiveStyle, Insight, PatternClassifier, PatternReport};
