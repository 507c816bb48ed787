use tracing::info;

use credscope_common::{
    AggregatedVerdict, AuthorAssessment, ClaimScoreEntry, ClaimVerdict, PublisherAssessment,
    ScoreBreakdown, Verdict, UNKNOWN_AUTHOR, UNKNOWN_PUBLISHER,
};

use crate::round1;

// Fixed ensemble weights. Claims dominate so an unverifiable or anonymous
// source does not by itself force a false verdict.
const WEIGHT_AUTHOR: f64 = 0.10;
const WEIGHT_PUBLISHER: f64 = 0.15;
const WEIGHT_CLAIMS: f64 = 0.75;

/// Claim score when no claims were processed.
const NO_CLAIMS_SCORE: f64 = 38.0;

/// Convert a claim verdict + confidence to a credibility score in [0,100].
/// Low confidence regresses the score toward the neutral midpoint of 50.
pub fn verdict_to_score(verdict: Verdict, confidence: f64) -> f64 {
    let base = match verdict {
        Verdict::True => 88.0,
        Verdict::PartiallyTrue => 58.0,
        Verdict::InsufficientEvidence => 38.0,
        Verdict::False => 8.0,
    };
    let weight = confidence / 100.0;
    (base * weight + 50.0 * (1.0 - weight)).clamp(0.0, 100.0)
}

/// Final verdict from the per-claim verdict distribution first, with score
/// thresholds as the fallback for mixed or claim-free runs.
fn score_to_verdict(score: f64, claim_verdicts: &[Verdict]) -> Verdict {
    if claim_verdicts.is_empty() {
        return if score >= 70.0 {
            Verdict::True
        } else if score >= 50.0 {
            Verdict::PartiallyTrue
        } else if score >= 30.0 {
            Verdict::InsufficientEvidence
        } else {
            Verdict::False
        };
    }

    let total = claim_verdicts.len() as f64;
    let true_ratio = claim_verdicts
        .iter()
        .filter(|v| **v == Verdict::True)
        .count() as f64
        / total;
    let false_ratio = claim_verdicts
        .iter()
        .filter(|v| **v == Verdict::False)
        .count() as f64
        / total;

    if true_ratio >= 0.6 && score >= 55.0 {
        return Verdict::True;
    }
    if true_ratio >= 0.8 {
        return Verdict::True;
    }
    if false_ratio >= 0.6 && score < 40.0 {
        return Verdict::False;
    }
    if false_ratio >= 0.8 {
        return Verdict::False;
    }

    if score >= 72.0 {
        Verdict::True
    } else if score >= 52.0 {
        Verdict::PartiallyTrue
    } else if score >= 32.0 {
        Verdict::InsufficientEvidence
    } else {
        Verdict::False
    }
}

/// Confidence from the spread of the component scores: tight agreement is
/// high confidence, wide disagreement is low.
fn confidence_from_spread(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 50.0;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / scores.len() as f64;
    round1((88.0 - variance.sqrt() * 0.4).clamp(35.0, 95.0))
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

fn build_explanation(
    final_score: f64,
    author: &AuthorAssessment,
    publisher: &PublisherAssessment,
    claim_verdicts: &[ClaimVerdict],
) -> String {
    let claim_summaries = if claim_verdicts.is_empty() {
        "No specific claims analyzed".to_string()
    } else {
        claim_verdicts
            .iter()
            .take(3)
            .map(|cv| {
                format!(
                    "\"{}…\" → {} ({:.0}%)",
                    truncate_chars(&cv.claim_text, 55),
                    cv.verdict,
                    cv.confidence,
                )
            })
            .collect::<Vec<_>>()
            .join("; ")
    };

    let source_note = if author.author_name == UNKNOWN_AUTHOR
        && publisher.publisher_name == UNKNOWN_PUBLISHER
    {
        " Note: Source is unverified (no author/publisher), but claim credibility \
         is based primarily on evidence."
    } else {
        ""
    };

    format!(
        "Final credibility score: {final_score}/100. \
         Author '{}' scored {}/100 ({}). \
         Publisher '{}' scored {}/100{}. \
         Claim evidence: {claim_summaries}.{source_note}",
        author.author_name,
        author.credibility_score,
        if author.registry_match {
            "verified journalist"
        } else {
            "not in journalist registry"
        },
        publisher.publisher_name,
        publisher.credibility_score,
        if publisher.blacklisted {
            " (known misinformation source)"
        } else {
            ""
        },
    )
}

/// Stage 5: single final verdict from the author score, publisher score,
/// and all per-claim verdicts of the run.
pub struct Aggregator;

impl Aggregator {
    pub fn aggregate(
        &self,
        author: &AuthorAssessment,
        publisher: &PublisherAssessment,
        claim_verdicts: &[ClaimVerdict],
    ) -> AggregatedVerdict {
        info!(claims = claim_verdicts.len(), "aggregation start");

        let author_score = author.credibility_score;
        let publisher_score = publisher.credibility_score;

        let claims_score = if claim_verdicts.is_empty() {
            NO_CLAIMS_SCORE
        } else {
            let sum: f64 = claim_verdicts
                .iter()
                .map(|cv| verdict_to_score(cv.verdict, cv.confidence))
                .sum();
            sum / claim_verdicts.len() as f64
        };

        let final_score = round1(
            WEIGHT_AUTHOR * author_score
                + WEIGHT_PUBLISHER * publisher_score
                + WEIGHT_CLAIMS * claims_score,
        );

        let confidence = confidence_from_spread(&[author_score, publisher_score, claims_score]);

        let verdicts: Vec<Verdict> = claim_verdicts.iter().map(|cv| cv.verdict).collect();
        let final_verdict = score_to_verdict(final_score, &verdicts);

        let explanation = build_explanation(final_score, author, publisher, claim_verdicts);

        let breakdown = ScoreBreakdown {
            author_score,
            author_weight: WEIGHT_AUTHOR,
            publisher_score,
            publisher_weight: WEIGHT_PUBLISHER,
            claims_score: round1(claims_score),
            claims_weight: WEIGHT_CLAIMS,
            claim_scores: claim_verdicts
                .iter()
                .map(|cv| ClaimScoreEntry {
                    claim: truncate_chars(&cv.claim_text, 80),
                    verdict: cv.verdict,
                    confidence: cv.confidence,
                    score: round1(verdict_to_score(cv.verdict, cv.confidence)),
                })
                .collect(),
        };

        info!(
            final_score,
            verdict = %final_verdict,
            confidence,
            "aggregation complete"
        );

        AggregatedVerdict {
            verdict: final_verdict,
            score: final_score,
            confidence,
            explanation,
            breakdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(score: f64) -> AuthorAssessment {
        AuthorAssessment {
            author_name: "Jane Doe".to_string(),
            credibility_score: score,
            registry_match: true,
            known_outlets: vec!["BBC".to_string()],
            domain_authority_score: 92.0,
            public_profile_found: true,
            reasoning: String::new(),
            flags: Vec::new(),
        }
    }

    fn anonymous_author(score: f64) -> AuthorAssessment {
        AuthorAssessment {
            author_name: UNKNOWN_AUTHOR.to_string(),
            credibility_score: score,
            registry_match: false,
            known_outlets: Vec::new(),
            domain_authority_score: 50.0,
            public_profile_found: false,
            reasoning: String::new(),
            flags: vec!["anonymous".to_string()],
        }
    }

    fn publisher(score: f64) -> PublisherAssessment {
        PublisherAssessment {
            publisher_name: "BBC".to_string(),
            domain: Some("bbc.com".to_string()),
            credibility_score: score,
            domain_age_years: Some(28.0),
            blacklisted: false,
            whois_registered: true,
            country: Some("GB".to_string()),
            reasoning: String::new(),
            flags: Vec::new(),
        }
    }

    fn unknown_publisher(score: f64) -> PublisherAssessment {
        PublisherAssessment {
            publisher_name: UNKNOWN_PUBLISHER.to_string(),
            domain: None,
            credibility_score: score,
            domain_age_years: None,
            blacklisted: false,
            whois_registered: false,
            country: None,
            reasoning: String::new(),
            flags: Vec::new(),
        }
    }

    fn claim_verdict(verdict: Verdict, confidence: f64) -> ClaimVerdict {
        ClaimVerdict {
            claim_id: "c".to_string(),
            claim_text: "Some claim about something important".to_string(),
            verdict,
            confidence,
            reasoning: String::new(),
            key_evidence: Vec::new(),
        }
    }

    #[test]
    fn verdict_to_score_regresses_toward_fifty() {
        // Full confidence hits the base, zero confidence is neutral.
        assert_eq!(verdict_to_score(Verdict::True, 100.0), 88.0);
        assert_eq!(verdict_to_score(Verdict::True, 0.0), 50.0);
        assert_eq!(verdict_to_score(Verdict::False, 100.0), 8.0);
        // w = 0.5: 88*0.5 + 50*0.5
        assert_eq!(verdict_to_score(Verdict::True, 50.0), 69.0);
    }

    #[test]
    fn verdict_to_score_is_deterministic() {
        let a = verdict_to_score(Verdict::PartiallyTrue, 62.5);
        let b = verdict_to_score(Verdict::PartiallyTrue, 62.5);
        assert_eq!(a, b);
    }

    #[test]
    fn weighted_sum_matches_fixed_weights() {
        let verdicts = vec![
            claim_verdict(Verdict::True, 100.0),
            claim_verdict(Verdict::True, 100.0),
        ];
        let result = Aggregator.aggregate(&author(50.0), &publisher(50.0), &verdicts);
        // claims_score = 88, final = 0.10*50 + 0.15*50 + 0.75*88 = 78.5
        assert_eq!(result.breakdown.claims_score, 88.0);
        assert_eq!(result.score, 78.5);
        // 100% True claims with score >= 55
        assert_eq!(result.verdict, Verdict::True);
    }

    #[test]
    fn majority_true_claims_with_decent_score_is_true() {
        let verdicts = vec![
            claim_verdict(Verdict::True, 85.0),
            claim_verdict(Verdict::True, 80.0),
            claim_verdict(Verdict::PartiallyTrue, 50.0),
        ];
        let result = Aggregator.aggregate(&author(70.0), &publisher(75.0), &verdicts);
        assert!(result.score >= 55.0);
        assert_eq!(result.verdict, Verdict::True);
    }

    #[test]
    fn majority_false_claims_with_low_score_is_false() {
        let verdicts = vec![
            claim_verdict(Verdict::False, 85.0),
            claim_verdict(Verdict::False, 80.0),
            claim_verdict(Verdict::InsufficientEvidence, 25.0),
        ];
        let result = Aggregator.aggregate(&anonymous_author(20.0), &publisher(30.0), &verdicts);
        assert!(result.score < 40.0);
        assert_eq!(result.verdict, Verdict::False);
    }

    #[test]
    fn no_claims_falls_back_to_score_thresholds() {
        let result = Aggregator.aggregate(&author(80.0), &publisher(85.0), &[]);
        // claims_score defaults to 38.0
        assert_eq!(result.breakdown.claims_score, 38.0);
        // 0.10*80 + 0.15*85 + 0.75*38 = 49.25 -> 49.3 (rounded), below 50
        assert_eq!(result.score, 49.3);
        assert_eq!(result.verdict, Verdict::InsufficientEvidence);
    }

    #[test]
    fn confidence_tracks_component_spread() {
        // Identical components: zero variance, capped at 88.
        let tight = Aggregator.aggregate(
            &author(88.0),
            &publisher(88.0),
            &[claim_verdict(Verdict::True, 100.0)],
        );
        assert_eq!(tight.confidence, 88.0);

        // Wildly disagreeing components lose confidence, floored at 35.
        let wide = Aggregator.aggregate(
            &author(5.0),
            &publisher(95.0),
            &[claim_verdict(Verdict::True, 100.0)],
        );
        assert!(wide.confidence < tight.confidence);
        assert!(wide.confidence >= 35.0);
    }

    #[test]
    fn unverified_source_note_appears_only_for_double_sentinel() {
        let noted = Aggregator.aggregate(
            &anonymous_author(20.0),
            &unknown_publisher(35.0),
            &[claim_verdict(Verdict::True, 85.0)],
        );
        assert!(noted.explanation.contains("Source is unverified"));

        let not_noted = Aggregator.aggregate(
            &author(80.0),
            &unknown_publisher(35.0),
            &[claim_verdict(Verdict::True, 85.0)],
        );
        assert!(!not_noted.explanation.contains("Source is unverified"));
    }

    #[test]
    fn explanation_cites_score_and_claims() {
        let verdicts = vec![
            claim_verdict(Verdict::True, 85.0),
            claim_verdict(Verdict::False, 70.0),
            claim_verdict(Verdict::PartiallyTrue, 50.0),
            claim_verdict(Verdict::True, 60.0),
        ];
        let result = Aggregator.aggregate(&author(80.0), &publisher(85.0), &verdicts);
        assert!(result.explanation.contains("Final credibility score"));
        assert!(result.explanation.contains("verified journalist"));
        // only the first three claims are cited
        assert_eq!(result.explanation.matches('→').count(), 3);
        assert_eq!(result.breakdown.claim_scores.len(), 4);
    }

    #[test]
    fn breakdown_records_weights_and_bounds() {
        let verdicts = vec![claim_verdict(Verdict::InsufficientEvidence, 25.0)];
        let result = Aggregator.aggregate(&author(60.0), &publisher(70.0), &verdicts);
        assert_eq!(result.breakdown.author_weight, 0.10);
        assert_eq!(result.breakdown.publisher_weight, 0.15);
        assert_eq!(result.breakdown.claims_weight, 0.75);
        assert!(result.score >= 0.0 && result.score <= 100.0);
        assert!(result.confidence >= 35.0 && result.confidence <= 95.0);
    }
}
