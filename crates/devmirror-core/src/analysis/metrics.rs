//! Metrics aggregation
//!
//! Runs parser, estimator and classifier in sequence and merges their output
//! into one [`AnalysisRecord`]. A snapshot that does not parse short-circuits
//! the whole pipeline.

use super::complexity::ComplexityEstimator;
use super::parser::StructuralParser;
use super::patterns::PatternClassifier;
use devmirror_shared::{AnalysisError, AnalysisRecord, ClassifierConfig};
use tracing::{debug, instrument, warn};

/// Snapshot pipeline: parse, estimate, classify, merge
#[derive(Debug, Clone, Default)]
pub struct MetricsAggregator {
    parser: StructuralParser,
    estimator: ComplexityEstimator,
    classifier: PatternClassifier,
}

impl MetricsAggregator {
    pub fn new(classifier: ClassifierConfig) -> Self {
        Self {
            parser: StructuralParser::new(),
            estimator: ComplexityEstimator::new(),
            classifier: PatternClassifier::new(classifier),
        }
    }

    /// Analyze one snapshot
    ///
    /// Returns `AnalysisError::InvalidCode` without computing anything else when
    /// the snapshot does not parse. Every field of a returned record is populated.
    #[instrument(skip_all, fields(bytes = snapshot.len()))]
    pub fn analyze(&self, snapshot: &str) -> Result<AnalysisRecord, AnalysisError> {
        let structure = self.parser.parse(snapshot).inspect_err(|e| {
            warn!("Snapshot rejected: {}", e);
        })?;

        let complexity = self.estimator.estimate(snapshot);
        let patterns = self.classifier.classify(&structure, &complexity);

        debug!(
            insights = patterns.insights.len(),
            styles = patterns.cognitive_profile.len(),
            "Snapshot classified"
        );

        Ok(AnalysisRecord::new(
            structure,
            complexity,
            patterns.insight_messages(),
            patterns.profile_messages(),
        ))
    }
}
