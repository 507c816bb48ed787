use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use credscope_common::{Claim, ClaimType, CredScopeError, EntityLabel, Extraction, NamedEntity};
use reason_client::util::truncate_to_char_boundary;
use reason_client::{EngineError, ReasoningEngine};

use crate::retry::RetryPolicy;

/// Inputs beyond this are truncated before prompting.
const MAX_INPUT_BYTES: usize = 30_000;

const SYSTEM_PROMPT: &str = r#"You are a claim extraction specialist for a news credibility system.

Your job:
1. Extract the author name and publisher/outlet name from the text (if present).
2. Extract 1-5 main factual claims as structured JSON.
3. Identify named entities (people, organizations, locations, dates).
4. Provide a short neutral summary.

RULES:
- Only extract verifiable factual claims, not opinions.
- Each claim must have: claim_text, claim_type (factual/opinion/statistic/quote), subject, predicate, object, confidence (0.0-1.0).
- Named entities: label must be one of PERSON, ORG, GPE, DATE, NUMBER, EVENT.
- Confidence = how sure you are this is an actual claim (0.0-1.0).

Respond ONLY with a valid JSON object matching this structure:
{
  "author_name": "string or null",
  "publisher_name": "string or null",
  "publisher_domain": "string or null",
  "claims": [
    {
      "id": "uuid-string",
      "claim_text": "The full claim sentence",
      "claim_type": "factual|opinion|statistic|quote",
      "subject": "who/what",
      "predicate": "does/is/has",
      "object": "what/whom",
      "confidence": 0.85
    }
  ],
  "named_entities": [
    {"text": "WHO", "label": "ORG", "confidence": 0.95}
  ],
  "summary": "One-paragraph neutral summary of the text.",
  "language": "en"
}"#;

// Raw engine payload, defaulted field by field before validation.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawExtraction {
    author_name: Option<String>,
    publisher_name: Option<String>,
    publisher_domain: Option<String>,
    claims: Vec<RawClaim>,
    named_entities: Vec<RawEntity>,
    summary: String,
    language: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawClaim {
    id: Option<String>,
    claim_text: String,
    claim_type: String,
    subject: String,
    predicate: String,
    object: String,
    confidence: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawEntity {
    text: String,
    label: String,
    confidence: Option<f64>,
}

/// Stage 1: raw news text in, structured claims + byline out.
pub struct ClaimExtractor {
    engine: Arc<dyn ReasoningEngine>,
    retry: RetryPolicy,
}

impl ClaimExtractor {
    pub fn new(engine: Arc<dyn ReasoningEngine>, retry: RetryPolicy) -> Self {
        Self { engine, retry }
    }

    pub async fn run(&self, text: &str) -> Result<Extraction, CredScopeError> {
        info!(text_length = text.len(), "claim extraction start");

        let extraction = self
            .retry
            .run("claim_extraction", || self.extract_once(text))
            .await?;

        info!(
            claims = extraction.claims.len(),
            entities = extraction.named_entities.len(),
            author = ?extraction.author_name,
            publisher = ?extraction.publisher_name,
            "claim extraction complete"
        );
        Ok(extraction)
    }

    async fn extract_once(&self, text: &str) -> Result<Extraction, CredScopeError> {
        let text = truncate_to_char_boundary(text, MAX_INPUT_BYTES);
        let user_message = format!("Extract claims from this news text:\n\n{text}");

        let response = self
            .engine
            .complete(SYSTEM_PROMPT, &user_message, 0.1, 2500)
            .await?;
        let raw: RawExtraction =
            serde_json::from_value(response.parse_json()?).map_err(EngineError::MalformedJson)?;

        Ok(validate_extraction(raw))
    }
}

/// Field-by-field validation of the raw payload: claims and entities outside
/// the closed label sets are dropped, confidences clamped, missing claim ids
/// generated.
fn validate_extraction(raw: RawExtraction) -> Extraction {
    let mut claims = Vec::new();
    for claim in raw.claims {
        if claim.claim_text.trim().is_empty() {
            continue;
        }
        let Some(claim_type) = ClaimType::from_label(&claim.claim_type) else {
            warn!(claim_type = claim.claim_type, "unknown claim type, dropping claim");
            continue;
        };
        claims.push(Claim {
            id: claim
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            text: claim.claim_text,
            claim_type,
            subject: claim.subject,
            predicate: claim.predicate,
            object: claim.object,
            confidence: claim.confidence.unwrap_or(0.5).clamp(0.0, 1.0),
        });
    }

    let mut named_entities = Vec::new();
    for entity in raw.named_entities {
        let Some(label) = EntityLabel::from_label(&entity.label) else {
            warn!(label = entity.label, "unknown entity label, dropping entity");
            continue;
        };
        named_entities.push(NamedEntity {
            text: entity.text,
            label,
            confidence: entity.confidence.unwrap_or(0.5).clamp(0.0, 1.0),
        });
    }

    Extraction {
        author_name: raw.author_name.filter(|s| !s.trim().is_empty()),
        publisher_name: raw.publisher_name.filter(|s| !s.trim().is_empty()),
        publisher_domain: raw.publisher_domain.filter(|s| !s.trim().is_empty()),
        claims,
        named_entities,
        summary: raw.summary,
        language: raw.language.unwrap_or_else(|| "en".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_claim(text: &str, claim_type: &str) -> RawClaim {
        RawClaim {
            id: None,
            claim_text: text.to_string(),
            claim_type: claim_type.to_string(),
            subject: "subject".to_string(),
            predicate: "is".to_string(),
            object: "object".to_string(),
            confidence: Some(0.9),
        }
    }

    #[test]
    fn generates_ids_for_claims_without_one() {
        let raw = RawExtraction {
            claims: vec![raw_claim("The sky is blue", "factual")],
            ..Default::default()
        };
        let extraction = validate_extraction(raw);
        assert_eq!(extraction.claims.len(), 1);
        assert!(!extraction.claims[0].id.is_empty());
    }

    #[test]
    fn drops_claims_with_unknown_type_and_empty_text() {
        let raw = RawExtraction {
            claims: vec![
                raw_claim("valid", "statistic"),
                raw_claim("bad type", "rumor"),
                raw_claim("  ", "factual"),
            ],
            ..Default::default()
        };
        let extraction = validate_extraction(raw);
        assert_eq!(extraction.claims.len(), 1);
        assert_eq!(extraction.claims[0].claim_type, ClaimType::Statistic);
    }

    #[test]
    fn drops_entities_outside_label_set() {
        let raw = RawExtraction {
            named_entities: vec![
                RawEntity {
                    text: "WHO".to_string(),
                    label: "ORG".to_string(),
                    confidence: Some(0.95),
                },
                RawEntity {
                    text: "thing".to_string(),
                    label: "MISC".to_string(),
                    confidence: None,
                },
            ],
            ..Default::default()
        };
        let extraction = validate_extraction(raw);
        assert_eq!(extraction.named_entities.len(), 1);
        assert_eq!(extraction.named_entities[0].label, EntityLabel::Org);
    }

    #[test]
    fn clamps_confidence_and_blanks_empty_byline() {
        let mut claim = raw_claim("claim", "factual");
        claim.confidence = Some(1.7);
        let raw = RawExtraction {
            author_name: Some("  ".to_string()),
            claims: vec![claim],
            ..Default::default()
        };
        let extraction = validate_extraction(raw);
        assert_eq!(extraction.claims[0].confidence, 1.0);
        assert!(extraction.author_name.is_none());
        assert_eq!(extraction.language, "en");
    }
}
