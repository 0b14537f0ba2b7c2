//! Plain-text rendering of analysis results

use devmirror_core::{History, ScoredAnalysis, SessionReport, TrendSummary};
use devmirror_shared::{AnalysisError, PeerSignal};
use std::fmt::Write;

pub fn analysis(label: &str, analysis: &ScoredAnalysis) -> String {
    let record = &analysis.record;
    let breakdown = &analysis.breakdown;
    let mut out = String::new();

    let _ = writeln!(out, "📄 {label}");
    let _ = writeln!(out, "  Functions:              {}", record.function_count);
    let _ = writeln!(out, "  Avg function length:    {:.2}", record.avg_function_length);
    let _ = writeln!(out, "  Max nesting depth:      {}", record.max_nesting_depth);
    let _ = writeln!(out, "  Cyclomatic complexity:  {:.2}", record.cyclomatic_complexity);
    let _ = writeln!(
        out,
        "  Structural score:       {} (depth -{:.2}, complexity -{:.2}, length -{:.2}, modularity +{:.2})",
        breakdown.score,
        breakdown.depth_penalty,
        breakdown.complexity_penalty,
        breakdown.length_penalty,
        breakdown.modularity_bonus
    );

    section(&mut out, "Insights", &record.insights);
    section(&mut out, "Cognitive profile", &record.cognitive_profile);
    out
}

pub fn session(label: &str, report: &SessionReport) -> String {
    let mut out = analysis(label, &report.analysis);
    let _ = writeln!(out, "  Subject:                {}", report.subject);
    out.push_str(&trends(&report.trends));
    out.push_str(&peer(&report.peer));
    out
}

pub fn trends(summary: &TrendSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  Submissions:            {}", summary.submissions);
    let _ = writeln!(out, "  Trend:                  {}", summary.trend);
    let _ = writeln!(out, "  Velocity:               {}", summary.velocity);
    let _ = writeln!(out, "  Confidence:             {}", summary.confidence);

    let tendencies: Vec<String> = summary.profile.iter().map(ToString::to_string).collect();
    section(&mut out, "Session tendencies", &tendencies);
    out
}

pub fn peer(signal: &PeerSignal) -> String {
    format!(
        "  Peer signal:            {} (confidence {:.2}, debug loop: {})\n",
        signal.thinking_style,
        signal.confidence,
        if signal.debug_loop { "yes" } else { "no" }
    )
}

pub fn invalid(label: &str, error: &AnalysisError) -> String {
    let AnalysisError::InvalidCode { line, column, .. } = error;
    match (line, column) {
        (Some(line), Some(column)) => format!("❌ {label}:{line}:{column}: {error}\n"),
        (Some(line), None) => format!("❌ {label}:{line}: {error}\n"),
        _ => format!("❌ {label}: {error}\n"),
    }
}

pub fn history(subject: &str, history: &History) -> String {
    let mut out = String::new();
    if history.is_empty() {
        let _ = writeln!(out, "No history recorded for {subject}");
        return out;
    }

    let _ = writeln!(out, "History for {subject} ({} entries)", history.len());
    let _ = writeln!(
        out,
        "  {:>4}  {:<20}  {:>6}  {:>5}  {:>7}  {:>5}  {:>6}",
        "#", "recorded", "score", "fns", "avg len", "depth", "cc"
    );
    for (index, entry) in history.iter().enumerate() {
        let record = &entry.record;
        let _ = writeln!(
            out,
            "  {:>4}  {:<20}  {:>6.2}  {:>5}  {:>7.2}  {:>5}  {:>6.2}",
            index,
            entry.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry.score.value(),
            record.function_count,
            record.avg_function_length,
            record.max_nesting_depth,
            record.cyclomatic_complexity
        );
    }
    out
}

fn section(out: &mut String, title: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }

    let _ = writeln!(out, "  {title}:");
    for line in lines {
        let _ = writeln!(out, "    - {line}");
    }
}
