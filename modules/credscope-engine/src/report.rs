use credscope_common::{PipelineRun, RunStatus, Verdict};

/// Render a run as the textual report delivered to chat recipients and the
/// terminal. Failed runs get a short apology line instead of a verdict.
pub fn render(run: &PipelineRun) -> String {
    if run.status != RunStatus::Completed {
        return format!(
            "Analysis failed ({}). Please try again with a different text.",
            run.error.as_deref().unwrap_or("unknown error"),
        );
    }

    let Some(aggregated) = &run.aggregated else {
        return "Analysis incomplete: no verdict available.".to_string();
    };

    let marker = match aggregated.verdict {
        Verdict::True => "[TRUE]",
        Verdict::False => "[FALSE]",
        Verdict::PartiallyTrue => "[PARTIALLY TRUE]",
        Verdict::InsufficientEvidence => "[INSUFFICIENT EVIDENCE]",
    };

    let mut lines = vec![
        "Credibility Analysis Complete".to_string(),
        String::new(),
        format!("{marker} Verdict: {}", aggregated.verdict),
        format!("Credibility Score: {}/100", aggregated.score),
        format!("Confidence: {:.0}%", aggregated.confidence),
        String::new(),
        format!("Summary: {}", aggregated.explanation),
    ];

    if !run.claim_verdicts.is_empty() {
        lines.push(String::new());
        lines.push("Claims:".to_string());
        for (i, cv) in run.claim_verdicts.iter().enumerate() {
            lines.push(format!(
                "  {}. \"{}\" → {} ({:.0}%)",
                i + 1,
                cv.claim_text,
                cv.verdict,
                cv.confidence,
            ));
        }
    }

    lines.push(String::new());
    lines.push(format!("Report ID: {}", run.id));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use credscope_common::{
        AggregatedVerdict, ClaimVerdict, PipelineRun, ScoreBreakdown,
    };

    fn completed_run() -> PipelineRun {
        let mut run = PipelineRun::new("input", "claude");
        run.status = RunStatus::Completed;
        run.claim_verdicts.push(ClaimVerdict {
            claim_id: "c1".to_string(),
            claim_text: "The sky is blue".to_string(),
            verdict: Verdict::True,
            confidence: 85.0,
            reasoning: String::new(),
            key_evidence: Vec::new(),
        });
        run.aggregated = Some(AggregatedVerdict {
            verdict: Verdict::True,
            score: 81.5,
            confidence: 84.0,
            explanation: "Final credibility score: 81.5/100.".to_string(),
            breakdown: ScoreBreakdown {
                author_score: 80.0,
                author_weight: 0.10,
                publisher_score: 85.0,
                publisher_weight: 0.15,
                claims_score: 81.0,
                claims_weight: 0.75,
                claim_scores: Vec::new(),
            },
        });
        run
    }

    #[test]
    fn renders_verdict_score_and_claims() {
        let report = render(&completed_run());
        assert!(report.contains("Verdict: True"));
        assert!(report.contains("Credibility Score: 81.5/100"));
        assert!(report.contains("Confidence: 84%"));
        assert!(report.contains("The sky is blue"));
    }

    #[test]
    fn failed_run_renders_apology() {
        let mut run = PipelineRun::new("input", "claude");
        run.status = RunStatus::Failed;
        run.error = Some("engine down".to_string());
        let report = render(&run);
        assert!(report.contains("Analysis failed"));
        assert!(report.contains("engine down"));
    }
}
