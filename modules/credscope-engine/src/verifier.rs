use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use credscope_common::{Claim, ClaimVerdict, CredScopeError, EvidenceSet, Verdict};
use reason_client::{EngineError, ReasoningEngine};

use crate::retry::RetryPolicy;
use crate::round1;

/// An engine verdict of True/False at or above this confidence is trusted
/// over the deterministic opinion.
const ENGINE_TRUST_THRESHOLD: f64 = 65.0;

/// How many top-relevance articles the engine sees.
const MAX_ARTICLES_IN_PROMPT: usize = 8;

/// Default key-evidence picks when the engine supplies none.
const MAX_KEY_EVIDENCE: usize = 3;
const MIN_KEY_EVIDENCE_RELEVANCE: f64 = 0.1;

const SYSTEM_PROMPT: &str = r#"You are a claim verification specialist for a news credibility system.

Classify the claim as one of:
- "True" - Evidence supports it, OR it is a well-known verifiable fact confirmed by search results.
- "False" - Evidence contradicts it, OR search results show the correct fact is different.
- "Partially True" - Mixed evidence; some parts correct, some wrong.
- "Insufficient Evidence" - Genuinely cannot determine from available evidence.

IMPORTANT RULES:
1. If the evidence synthesis states the correct fact, and the claim matches that fact,
   the verdict is "True" with high confidence.
2. If search results confirm a person holds a position, and the claim states that, answer "True".
3. If search results show a DIFFERENT person holds the position, answer "False".
4. Do NOT say "Insufficient Evidence" when the synthesis actually confirms the claim.
5. Use your world knowledge combined with evidence to give accurate verdicts.

Respond with JSON ONLY:
{
  "claim_id": "string",
  "claim_text": "string",
  "verdict": "True|False|Partially True|Insufficient Evidence",
  "confidence": 0-100,
  "reasoning": "3-4 sentences explaining the verdict clearly, stating correct facts if known",
  "key_evidence": ["url1", "url2"]
}"#;

/// One of the two opinions feeding the ensemble.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Opinion {
    pub verdict: Verdict,
    pub confidence: f64,
}

/// Rule-based verdict from the evidence stance counts alone.
pub fn deterministic_opinion(evidence: &EvidenceSet) -> Opinion {
    let total = evidence.total_count();
    if total == 0 {
        return Opinion {
            verdict: Verdict::InsufficientEvidence,
            confidence: 20.0,
        };
    }

    let supporting = evidence.supporting_count;
    let contradicting = evidence.contradicting_count;
    let support_ratio = supporting as f64 / total as f64;
    let contradict_ratio = contradicting as f64 / total as f64;

    if supporting >= 3 && support_ratio >= 0.4 {
        Opinion {
            verdict: Verdict::True,
            confidence: ((support_ratio * 100.0).round() + 30.0).min(85.0),
        }
    } else if contradicting >= 3 && contradict_ratio >= 0.4 {
        Opinion {
            verdict: Verdict::False,
            confidence: ((contradict_ratio * 100.0).round() + 30.0).min(85.0),
        }
    } else if supporting >= 1 && contradicting == 0 {
        Opinion {
            verdict: Verdict::True,
            confidence: 60.0,
        }
    } else if contradicting >= 1 && supporting == 0 {
        Opinion {
            verdict: Verdict::False,
            confidence: 60.0,
        }
    } else if supporting > 0 && contradicting > 0 {
        Opinion {
            verdict: Verdict::PartiallyTrue,
            confidence: 50.0,
        }
    } else {
        Opinion {
            verdict: Verdict::InsufficientEvidence,
            confidence: 25.0,
        }
    }
}

/// Reconcile the engine's opinion with the deterministic one.
///
/// A decisive, confident engine verdict wins outright; agreement boosts
/// confidence; on disagreement the more decisive verdict (lower caution
/// rank) is kept, ties going to the engine.
pub fn reconcile(engine: Opinion, deterministic: Opinion) -> Opinion {
    if engine.confidence >= ENGINE_TRUST_THRESHOLD
        && matches!(engine.verdict, Verdict::True | Verdict::False)
    {
        return Opinion {
            verdict: engine.verdict,
            confidence: round1(0.7 * engine.confidence + 0.3 * deterministic.confidence),
        };
    }

    if engine.verdict == deterministic.verdict {
        let boosted = (engine.confidence + deterministic.confidence) / 2.0 + 10.0;
        return Opinion {
            verdict: engine.verdict,
            confidence: round1(boosted.min(90.0)),
        };
    }

    let verdict = if engine.verdict.caution_rank() <= deterministic.verdict.caution_rank() {
        engine.verdict
    } else {
        deterministic.verdict
    };
    Opinion {
        verdict,
        confidence: round1((engine.confidence + deterministic.confidence) / 2.0),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawClaimVerdict {
    verdict: String,
    confidence: Option<f64>,
    reasoning: String,
    key_evidence: Vec<String>,
}

/// Stage 4: final per-claim verdict from the two-opinion ensemble.
pub struct ClaimVerifier {
    engine: Arc<dyn ReasoningEngine>,
    retry: RetryPolicy,
}

impl ClaimVerifier {
    pub fn new(engine: Arc<dyn ReasoningEngine>, retry: RetryPolicy) -> Self {
        Self { engine, retry }
    }

    pub async fn verify(
        &self,
        claim: &Claim,
        evidence: &EvidenceSet,
    ) -> Result<ClaimVerdict, CredScopeError> {
        info!(claim_id = claim.id.as_str(), "claim verification start");

        let det = deterministic_opinion(evidence);

        let mut top_articles: Vec<_> = evidence.articles.iter().collect();
        top_articles.sort_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        top_articles.truncate(MAX_ARTICLES_IN_PROMPT);

        let articles_text = if top_articles.is_empty() {
            "No articles retrieved.".to_string()
        } else {
            top_articles
                .iter()
                .map(|a| {
                    format!(
                        "- [{}] {}: {} ({})",
                        a.stance.to_string().to_uppercase(),
                        a.publisher,
                        a.summary,
                        a.url,
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        let user_message = format!(
            "CLAIM: \"{}\"\n\n\
             EVIDENCE SYNTHESIS FROM SEARCH: {}\n\n\
             TOP ARTICLES:\n{articles_text}\n\n\
             Supporting: {} | Contradicting: {} | Neutral: {}\n\n\
             Deterministic scoring suggests: {} (confidence: {}%)\n\n\
             IMPORTANT: If the synthesis confirms the claim is factually correct \
             (e.g. confirms a person IS in a position), verdict should be True. \
             Do not say Insufficient Evidence if the facts are confirmed.\n\n\
             Claim ID: {}",
            claim.text,
            evidence.synthesis,
            evidence.supporting_count,
            evidence.contradicting_count,
            evidence.neutral_count,
            det.verdict,
            det.confidence,
            claim.id,
        );

        let raw = self
            .retry
            .run("claim_verification", || async {
                let response = self
                    .engine
                    .complete(SYSTEM_PROMPT, &user_message, 0.1, 800)
                    .await?;
                let raw: RawClaimVerdict = serde_json::from_value(response.parse_json()?)
                    .map_err(EngineError::MalformedJson)?;
                Ok::<_, CredScopeError>(raw)
            })
            .await?;

        let engine_opinion = Opinion {
            verdict: Verdict::from_label(&raw.verdict).unwrap_or(Verdict::InsufficientEvidence),
            confidence: raw.confidence.unwrap_or(50.0).clamp(0.0, 100.0),
        };
        let final_opinion = reconcile(engine_opinion, det);

        let key_evidence = if raw.key_evidence.is_empty() {
            top_articles
                .iter()
                .filter(|a| a.relevance > MIN_KEY_EVIDENCE_RELEVANCE)
                .take(MAX_KEY_EVIDENCE)
                .map(|a| a.url.clone())
                .collect()
        } else {
            raw.key_evidence
        };

        let verdict = ClaimVerdict {
            claim_id: claim.id.clone(),
            claim_text: claim.text.clone(),
            verdict: final_opinion.verdict,
            confidence: final_opinion.confidence,
            reasoning: raw.reasoning,
            key_evidence,
        };

        info!(
            claim_id = claim.id.as_str(),
            verdict = %verdict.verdict,
            confidence = verdict.confidence,
            engine_said = %engine_opinion.verdict,
            deterministic_said = %det.verdict,
            "claim verification complete"
        );
        Ok(verdict)
    }
}
