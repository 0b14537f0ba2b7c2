//! Profiler engine that orchestrates the analysis pipeline
//!
//! Owns one instance of every component, built from a single
//! [`DevMirrorConfig`], and sequences them for the orchestration layer:
//! analyze a snapshot, score it, append it to the subject's history and
//! summarize the extended history.

use crate::analysis::MetricsAggregator;
use crate::history::{History, HistoryEntry, HistoryStore};
use crate::scoring::{ScoreBreakdown, StructuralScorer};
use crate::trend::{TrendEngine, TrendSummary};
use devmirror_shared::{AnalysisError, AnalysisRecord, DevMirrorConfig, PeerSignal, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// One analyzed and scored snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAnalysis {
    pub record: AnalysisRecord,
    pub breakdown: ScoreBreakdown,
}

impl ScoredAnalysis {
    pub fn into_entry(self) -> HistoryEntry {
        HistoryEntry::new(self.record, self.breakdown.score)
    }
}

/// Fields consumed by the narrative generation step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeBrief {
    pub code_snapshot: String,
    pub thinking_style: String,
    pub complexity: f64,
    pub anti_patterns: Vec<String>,
}

/// Everything produced for one submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub subject: String,
    pub analysis: ScoredAnalysis,
    pub trends: TrendSummary,
    pub peer: PeerSignal,
    pub narrative: NarrativeBrief,
}

/// Main engine for profile analysis
#[derive(Debug, Clone, Default)]
pub struct Profiler {
    aggregator: MetricsAggregator,
    scorer: StructuralScorer,
    trends: TrendEngine,
}

impl Profiler {
    /// Create a profiler from an already validated configuration
    pub fn new(config: &DevMirrorConfig) -> Self {
        Self {
            aggregator: MetricsAggregator::new(config.classifier.clone()),
            scorer: StructuralScorer::new(config.scoring.clone()),
            trends: TrendEngine::new(config.trend.clone()),
        }
    }

    pub fn trend_engine(&self) -> &TrendEngine {
        &self.trends
    }

    /// Analyze and score one snapshot
    pub fn analyze(&self, snapshot: &str) -> std::result::Result<ScoredAnalysis, AnalysisError> {
        let record = self.aggregator.analyze(snapshot)?;
        let breakdown = self.scorer.breakdown(&record);
        Ok(ScoredAnalysis { record, breakdown })
    }

    /// All trend analyses over a history
    pub fn evaluate(&self, history: &History) -> TrendSummary {
        self.trends.summarize(history)
    }

    /// Analyze a snapshot, append it to the subject's history and report
    ///
    /// An unparseable snapshot is returned as an error before the store is touched.
    #[instrument(skip(self, store, snapshot, peer))]
    pub fn submit(
        &self,
        store: &mut dyn HistoryStore,
        subject: &str,
        snapshot: &str,
        peer: Option<PeerSignal>,
    ) -> Result<SessionReport> {
        let analysis = self.analyze(snapshot)?;
        self.record(store, subject, snapshot, analysis, peer)
    }

    /// Append an already computed analysis to the subject's history and report
    pub fn record(
        &self,
        store: &mut dyn HistoryStore,
        subject: &str,
        snapshot: &str,
        analysis: ScoredAnalysis,
        peer: Option<PeerSignal>,
    ) -> Result<SessionReport> {
        let history = store.load(subject)?;
        let entry = HistoryEntry::new(analysis.record.clone(), analysis.breakdown.score);
        store.append(subject, entry.clone())?;

        let extended = history.with_entry(entry);
        let trends = self.evaluate(&extended);
        info!(
            score = analysis.breakdown.score.value(),
            submissions = extended.len(),
            "Submission recorded"
        );

        let peer = peer.unwrap_or_default();
        let narrative = NarrativeBrief {
            code_snapshot: snapshot.to_string(),
            thinking_style: peer.thinking_style.clone(),
            complexity: analysis.record.cyclomatic_complexity,
            anti_patterns: analysis.record.insights.clone(),
        };

        Ok(SessionReport {
            subject: subject.to_string(),
            analysis,
            trends,
            peer,
            narrative,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MockHistoryStore;
    use crate::trend::{SignalConfidence, TrendReport};
    use devmirror_shared::{DevMirrorError, StructuralScore};

    const SIMPLE: &str = "fn one() -> u8 {\n    1\n}\n";

    #[test]
    fn test_analyze_scores_record() {
        let analysis = Profiler::default().analyze(SIMPLE).unwrap();
        assert_eq!(analysis.record.function_count, 1);
        assert_eq!(analysis.record.avg_function_length, 3.0);
        // 100 - (0 + 2 + 1.5)
        assert_eq!(analysis.breakdown.score.value(), 96.5);
    }

    #[test]
    fn test_submit_appends_and_reports() {
        let baseline = HistoryEntry::new(AnalysisRecord::default(), StructuralScore::new(80.0));

        let mut store = MockHistoryStore::new();
        store
            .expect_load()
            .withf(|subject| subject == "alice")
            .times(1)
            .returning(move |_| Ok(History::from_entries(vec![baseline.clone()])));
        store
            .expect_append()
            .withf(|subject, entry| subject == "alice" && entry.score.value() == 96.5)
            .times(1)
            .returning(|_, _| Ok(()));

        let report = Profiler::default()
            .submit(&mut store, "alice", SIMPLE, None)
            .unwrap();

        assert_eq!(report.trends.submissions, 2);
        assert!(matches!(report.trends.trend, TrendReport::Classified { .. }));
        assert_eq!(report.trends.confidence, SignalConfidence::Low);
        assert!(report.peer.is_fallback());
        assert_eq!(report.narrative.thinking_style, PeerSignal::FALLBACK_STYLE);
        assert_eq!(report.narrative.complexity, 1.0);
    }

    #[test]
    fn test_submit_invalid_snapshot_leaves_store_alone() {
        let mut store = MockHistoryStore::new();
        store.expect_load().never();
        store.expect_append().never();

        let err = Profiler::default()
            .submit(&mut store, "alice", "fn (", None)
            .unwrap_err();
        assert!(matches!(err, DevMirrorError::Analysis(AnalysisError::InvalidCode { .. })));
    }

    #[test]
    fn test_submit_propagates_store_failure() {
        let mut store = MockHistoryStore::new();
        store.expect_load().returning(|_| {
            Err(DevMirrorError::Storage {
                message: "disk gone".to_string(),
            })
        });
        store.expect_append().never();

        let err = Profiler::default()
            .submit(&mut store, "alice", SIMPLE, None)
            .unwrap_err();
        assert!(err.to_string().contains("disk gone"));
    }

    #[test]
    fn test_peer_signal_flows_into_brief() {
        let mut store = crate::history::InMemoryHistoryStore::new();
        let peer = PeerSignal::new("Trial-and-error debugger", 0.8, true);

        let report = Profiler::default()
            .submit(&mut store, "bob", SIMPLE, Some(peer.clone()))
            .unwrap();

        assert_eq!(report.peer, peer);
        assert_eq!(report.narrative.thinking_style, "Trial-and-error debugger");
        assert!(report.trends.trend.is_insufficient());
    }

    #[test]
    fn test_custom_config_changes_score() {
        let mut config = DevMirrorConfig::default();
        config.scoring.complexity_weight = 0.0;

        let analysis = Profiler::new(&config).analyze(SIMPLE).unwrap();
        assert_eq!(analysis.breakdown.score.value(), 98.5);
    }
}
