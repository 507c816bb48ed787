use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use credscope_common::{AuthorAssessment, CredScopeError, UNKNOWN_AUTHOR};
use reason_client::{EngineError, ReasoningEngine};

use crate::reference::ReferenceData;
use crate::retry::RetryPolicy;
use crate::round1;

/// Registry score dominates the engine's opinion when a registry match exists.
const REGISTRY_WEIGHT: f64 = 0.7;
const ENGINE_WEIGHT: f64 = 0.3;

const SYSTEM_PROMPT: &str = r#"You are an author credibility assessor.

Given an author name and optional publisher context, assess the author's credibility.

Consider:
- Does the name look real or like a pseudonym/alias?
- Is this name associated with credible journalism?
- Any red flags (anonymous, vague byline, single-name only)?

Respond with JSON ONLY:
{
  "author_name": "string",
  "credibility_score": 0-100,
  "found_in_journalist_db": true/false,
  "known_outlets": ["list"],
  "domain_authority_score": 0-100,
  "public_profile_found": true/false,
  "reasoning": "2-3 sentence explanation",
  "flags": ["flag1", "flag2"]
}

Possible flags: anonymous, pseudonym, low_history, single_byline, no_social_presence, known_misinformation_author"#;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAuthorAssessment {
    credibility_score: Option<f64>,
    found_in_journalist_db: bool,
    known_outlets: Vec<String>,
    public_profile_found: bool,
    reasoning: String,
    flags: Vec<String>,
}

/// Scores an author by blending the journalist registry with an engine
/// assessment. Never fails on a missing byline; the sentinel is scored
/// instead.
pub struct AuthorScorer {
    engine: Arc<dyn ReasoningEngine>,
    reference: Arc<ReferenceData>,
    retry: RetryPolicy,
}

impl AuthorScorer {
    pub fn new(
        engine: Arc<dyn ReasoningEngine>,
        reference: Arc<ReferenceData>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            engine,
            reference,
            retry,
        }
    }

    pub async fn score(
        &self,
        author_name: Option<&str>,
        publisher_domain: Option<&str>,
    ) -> Result<AuthorAssessment, CredScopeError> {
        let name = author_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_AUTHOR);

        info!(author = name, domain = ?publisher_domain, "author scoring start");

        let registry = self.reference.find_journalist(name);
        let domain_authority = self.reference.domain_authority(publisher_domain);

        let registry_context = registry
            .map(|rec| {
                format!(
                    "\nJournalist registry match: outlets {:?}, score {}, verified {}",
                    rec.outlets, rec.score, rec.verified
                )
            })
            .unwrap_or_default();

        let user_message = format!(
            "Verify author: '{name}'\n\
             Publisher domain: {}\n\
             Domain authority score: {domain_authority}/100\n\
             {registry_context}\n\n\
             Assess credibility. If author is '{UNKNOWN_AUTHOR}', give low score with flag.",
            publisher_domain.unwrap_or("unknown"),
        );

        let raw = self
            .retry
            .run("author_verification", || async {
                let response = self
                    .engine
                    .complete(SYSTEM_PROMPT, &user_message, 0.1, 600)
                    .await?;
                let raw: RawAuthorAssessment = serde_json::from_value(response.parse_json()?)
                    .map_err(EngineError::MalformedJson)?;
                Ok::<_, CredScopeError>(raw)
            })
            .await?;

        let engine_score = raw.credibility_score.unwrap_or(50.0).clamp(0.0, 100.0);

        // Registry data overrides whatever the engine believed about the
        // registry; its score is blended rather than replaced.
        let (credibility_score, registry_match, known_outlets) = match registry {
            Some(rec) => (
                round1(REGISTRY_WEIGHT * rec.score + ENGINE_WEIGHT * engine_score),
                true,
                rec.outlets.clone(),
            ),
            None => (engine_score, raw.found_in_journalist_db, raw.known_outlets),
        };

        let assessment = AuthorAssessment {
            author_name: name.to_string(),
            credibility_score,
            registry_match,
            known_outlets,
            domain_authority_score: domain_authority,
            public_profile_found: raw.public_profile_found,
            reasoning: raw.reasoning,
            flags: raw.flags,
        };

        info!(
            author = name,
            score = assessment.credibility_score,
            registry_match,
            "author scoring complete"
        );
        Ok(assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedEngine;

    fn engine_json(score: f64) -> String {
        format!(
            r#"{{"credibility_score": {score}, "found_in_journalist_db": false,
                 "known_outlets": ["Somewhere Daily"], "public_profile_found": true,
                 "reasoning": "Looks plausible.", "flags": []}}"#
        )
    }

    fn scorer(engine: ScriptedEngine) -> AuthorScorer {
        AuthorScorer::new(
            Arc::new(engine),
            Arc::new(ReferenceData::default()),
            RetryPolicy::default(),
        )
    }

    #[tokio::test]
    async fn registry_match_blends_seventy_thirty() {
        let engine = ScriptedEngine::new().on("author credibility", engine_json(50.0));
        let assessment = scorer(engine)
            .score(Some("John Smith"), Some("reuters.com"))
            .await
            .unwrap();

        // 0.7 * 82 + 0.3 * 50
        assert_eq!(assessment.credibility_score, 72.4);
        assert!(assessment.registry_match);
        assert_eq!(assessment.known_outlets, vec!["Reuters", "AP"]);
        assert_eq!(assessment.domain_authority_score, 95.0);
    }

    #[tokio::test]
    async fn missing_author_uses_sentinel() {
        let engine = ScriptedEngine::new().on("author credibility", engine_json(20.0));
        let assessment = scorer(engine).score(None, None).await.unwrap();

        assert_eq!(assessment.author_name, UNKNOWN_AUTHOR);
        assert_eq!(assessment.credibility_score, 20.0);
        assert!(!assessment.registry_match);
        assert_eq!(assessment.domain_authority_score, 50.0);
    }

    #[tokio::test]
    async fn unregistered_author_keeps_engine_opinion() {
        let engine = ScriptedEngine::new().on("author credibility", engine_json(64.0));
        let assessment = scorer(engine)
            .score(Some("Totally New Writer"), Some("example.org"))
            .await
            .unwrap();

        assert_eq!(assessment.credibility_score, 64.0);
        assert!(!assessment.registry_match);
        assert_eq!(assessment.known_outlets, vec!["Somewhere Daily"]);
        assert_eq!(assessment.domain_authority_score, 50.0);
    }

    #[tokio::test]
    async fn engine_score_is_clamped_before_blending() {
        let engine = ScriptedEngine::new().on("author credibility", engine_json(140.0));
        let assessment = scorer(engine)
            .score(Some("jane doe"), None)
            .await
            .unwrap();

        // 0.7 * 88 + 0.3 * 100
        assert_eq!(assessment.credibility_score, 91.6);
    }
}
