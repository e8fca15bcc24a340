//! Deterministic plain-text rendering of pipeline outcomes.
//!
//! Produces the curator-facing report layout: local-event header, discovery
//! statistics, and one block per ranked influence with metrics, reliability
//! components, constraint checks, and the top explanation paths.

use crate::pipeline::PipelineOutcome;
use causeway_core::report::Report;

const RULE: &str = "================================================================================";
const THIN_RULE: &str =
    "--------------------------------------------------------------------------------";

/// Renders an outcome for terminal display.
pub fn render_outcome(outcome: &PipelineOutcome, rendered_paths: usize) -> String {
    match outcome {
        PipelineOutcome::Report(report) => render_report(report, rendered_paths),
        PipelineOutcome::NotFound {
            error, suggestion, ..
        } => {
            format!("[ERROR] {error}\n   Suggestion: {suggestion}")
        }
    }
}

/// Renders a report for terminal display.
///
/// `rendered_paths` caps how many explanation paths are shown per influence.
pub fn render_report(report: &Report, rendered_paths: usize) -> String {
    let mut out = Vec::new();
    out.push(RULE.to_string());
    out.push("GLOBAL-LOCAL HISTORICAL INFLUENCE DISCOVERY".to_string());
    out.push(RULE.to_string());
    out.push(String::new());

    let local = &report.local_event;
    out.push(format!("[*] Local Event: {}", display(&local.name)));
    out.push(format!(
        "    Exhibit: {}",
        display(local.exhibit_name.as_deref().unwrap_or(""))
    ));
    out.push(format!(
        "    Date: {}",
        display(local.date.as_deref().unwrap_or(""))
    ));
    out.push(format!("    Location: {}", display(&local.location)));
    out.push(String::new());

    let stats = &report.statistics;
    out.push("[STATS] Discovery Statistics:".to_string());
    out.push(format!("    Total Candidates: {}", stats.total_candidates));
    out.push(format!("    High Confidence (>0.7): {}", stats.high_confidence));
    out.push(format!(
        "    Medium Confidence (0.5-0.7): {}",
        stats.medium_confidence
    ));
    out.push(format!("    Low Confidence (<0.5): {}", stats.low_confidence));
    out.push(String::new());

    out.push(RULE.to_string());
    out.push("TOP GLOBAL INFLUENCES".to_string());
    out.push(RULE.to_string());
    out.push(String::new());

    if report.top_influences.is_empty() {
        out.push("No plausible global influences were found for this event.".to_string());
        out.push(String::new());
    }

    for (rank, influence) in report.top_influences.iter().enumerate() {
        out.push(THIN_RULE.to_string());
        out.push(format!("Influence #{}", rank + 1));
        out.push(THIN_RULE.to_string());
        out.push(String::new());

        let event = &influence.global_event;
        out.push(format!("[GLOBAL] Global Cause: {}", display(&event.name)));
        out.push(format!(
            "    Date: {}",
            display(event.date.as_deref().unwrap_or(""))
        ));
        out.push(format!("    Location: {}", display(&event.location)));
        out.push(format!("    Description: {}", display(&event.description)));
        out.push(String::new());

        out.push("[METRICS] Influence Metrics:".to_string());
        out.push(format!(
            "    Causal Strength: {:.2}",
            influence.causal_strength
        ));
        out.push(format!(
            "    Reliability Score: {:.1}/100",
            influence.reliability_score
        ));
        out.push(format!("    Final Score: {:.2}", influence.final_score));
        out.push(format!("    Mechanism: {}", influence.mechanism));
        out.push(String::new());

        let components = &influence.reliability_components;
        out.push("[RELIABILITY] Reliability Components:".to_string());
        out.push(format!("    Directness (D): {:.2}", components.directness));
        out.push(format!(
            "    Source Consistency (S): {:.2}",
            components.source_consistency
        ));
        out.push(format!(
            "    Temporal Proximity (T): {:.2}",
            components.temporal_proximity
        ));
        out.push(format!(
            "    Evidence Strength: {:.2}",
            influence.evidence_strength
        ));
        out.push(String::new());

        let constraints = &influence.constraints;
        out.push("[CHECKS] Constraint Checks:".to_string());
        out.push(format!(
            "    Temporal Order: {}",
            pass_fail(constraints.temporal_order)
        ));
        out.push(format!(
            "    Geographic Plausibility: {}",
            pass_fail(constraints.geographic_plausibility)
        ));
        out.push(format!(
            "    Source Consistency: {}",
            pass_fail(constraints.source_consistency)
        ));
        out.push(String::new());

        if !influence.explanation_paths.is_empty() {
            out.push("[PATHS] Explanation Paths:".to_string());
            for (idx, path) in influence
                .explanation_paths
                .iter()
                .take(rendered_paths)
                .enumerate()
            {
                out.push(format!("    Path {} (Score: {:.2}):", idx + 1, path.score));
                out.push(format!("       {}", path.explanation));
            }
            out.push(String::new());
        }
    }

    out.push(RULE.to_string());
    out.join("\n")
}

fn display(value: &str) -> &str {
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}

fn pass_fail(passed: bool) -> &'static str {
    if passed {
        "[PASS]"
    } else {
        "[FAIL]"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use causeway_core::report::{
        DiscoveryStatistics, EvidenceSummary, GlobalEventSummary, Influence, LocalEventSummary,
        ReliabilityComponents,
    };
    use causeway_core::types::{
        ConstraintResult, ExplanationPath, MechanismDistribution, PredictionSource,
    };

    fn sample_report() -> Report {
        Report {
            local_event: LocalEventSummary {
                id: "LOCAL_001".into(),
                name: "Establishment of tea plantations".into(),
                exhibit_name: Some("Ceylon Tea Story".into()),
                date: Some("1867-01-01".into()),
                location: "Central Highlands".into(),
                description: String::new(),
            },
            evidence_summary: EvidenceSummary::default(),
            statistics: DiscoveryStatistics {
                total_candidates: 2,
                high_confidence: 1,
                medium_confidence: 1,
                low_confidence: 0,
            },
            top_influences: vec![Influence {
                global_event: GlobalEventSummary {
                    id: "GLOBAL_002".into(),
                    name: "American Civil War".into(),
                    date: Some("1861-04-12".into()),
                    location: "United States".into(),
                    description: "War disrupting cotton supply".into(),
                },
                causal_strength: 0.92,
                reliability_score: 71.5,
                final_score: 0.81,
                mechanism: "trade_shock".into(),
                mechanism_probs: MechanismDistribution {
                    trade_shock: 0.9,
                    economic_shift: 0.1,
                    ..Default::default()
                },
                constraints: ConstraintResult::from_components(true, true, true),
                evidence_strength: 0.65,
                reliability_components: ReliabilityComponents {
                    directness: 0.9,
                    source_consistency: 0.8,
                    temporal_proximity: 0.3,
                },
                prediction_source: PredictionSource::EdgeFallback {
                    edge_id: "EDGE_0".into(),
                },
                explanation_paths: vec![ExplanationPath {
                    nodes: vec!["GLOBAL_002".into(), "LOCAL_001".into()],
                    edge_weights: vec![0.92],
                    score: 0.75,
                    explanation: "American Civil War directly influenced Establishment of tea plantations".into(),
                }],
            }],
        }
    }

    #[test]
    fn test_render_contains_all_sections() {
        let text = render_report(&sample_report(), 2);
        assert!(text.contains("GLOBAL-LOCAL HISTORICAL INFLUENCE DISCOVERY"));
        assert!(text.contains("[*] Local Event: Establishment of tea plantations"));
        assert!(text.contains("Total Candidates: 2"));
        assert!(text.contains("Influence #1"));
        assert!(text.contains("Causal Strength: 0.92"));
        assert!(text.contains("Reliability Score: 71.5/100"));
        assert!(text.contains("Mechanism: trade_shock"));
        assert!(text.contains("Temporal Order: [PASS]"));
        assert!(text.contains("directly influenced"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let report = sample_report();
        assert_eq!(render_report(&report, 2), render_report(&report, 2));
    }

    #[test]
    fn test_empty_influences_render_zero_state() {
        let mut report = sample_report();
        report.top_influences.clear();
        let text = render_report(&report, 2);
        assert!(text.contains("No plausible global influences"));
    }

    #[test]
    fn test_not_found_renders_suggestion() {
        let outcome = PipelineOutcome::NotFound {
            input: "mystery event".into(),
            error: "Could not find local event matching: mystery event".into(),
            suggestion: "Check the event name.".into(),
        };
        let text = render_outcome(&outcome, 2);
        assert!(text.contains("[ERROR]"));
        assert!(text.contains("Suggestion: Check the event name."));
    }
}
