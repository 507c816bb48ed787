use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use credscope_common::{CredScopeError, PublisherAssessment, UNKNOWN_PUBLISHER};
use reason_client::{EngineError, ReasoningEngine};

use crate::reference::ReferenceData;
use crate::retry::RetryPolicy;
use crate::round1;

/// Reputation-table score dominates the engine's opinion when one exists.
const REPUTATION_WEIGHT: f64 = 0.6;
const ENGINE_WEIGHT: f64 = 0.4;

/// Hard ceiling for blacklisted domains. Blacklist membership is not just
/// another blended signal.
const BLACKLIST_SCORE_CAP: f64 = 15.0;

const BLACKLIST_FLAG: &str = "known_misinformation";

const SYSTEM_PROMPT: &str = r#"You are a publisher credibility assessor.

Given a publisher name, domain, WHOIS data, and misinformation-blacklist status, assess credibility.

Consider:
- Domain age (older = generally more trustworthy)
- WHOIS registration status (no data = red flag)
- Presence in known misinformation blacklists
- General reputation of the publisher

Respond with JSON ONLY:
{
  "publisher_name": "string",
  "domain": "string or null",
  "credibility_score": 0-100,
  "domain_age_years": number or null,
  "blacklisted": true/false,
  "whois_registered": true/false,
  "country": "string or null",
  "reasoning": "2-3 sentence explanation",
  "flags": ["flag1", "flag2"]
}

Possible flags: known_misinformation, very_new_domain, no_whois, satire_site, unknown_publisher, no_about_page, clickbait_history"#;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPublisherAssessment {
    credibility_score: Option<f64>,
    reasoning: String,
    flags: Vec<String>,
}

/// Scores a publisher by blending reputation, WHOIS facts, and blacklist
/// membership with an engine assessment. Keyed by domain.
pub struct PublisherScorer {
    engine: Arc<dyn ReasoningEngine>,
    reference: Arc<ReferenceData>,
    retry: RetryPolicy,
}

impl PublisherScorer {
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
        publisher_name: Option<&str>,
        domain: Option<&str>,
    ) -> Result<PublisherAssessment, CredScopeError> {
        let name = publisher_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_PUBLISHER);

        info!(publisher = name, domain = ?domain, "publisher scoring start");

        let blacklisted = self.reference.is_blacklisted(domain);
        let whois = self.reference.whois(domain);
        let base_score = self.reference.publisher_base_score(domain);

        let user_message = format!(
            "Publisher: '{name}'\n\
             Domain: {}\n\
             Domain age: {} years\n\
             WHOIS registered: {}\n\
             Country: {}\n\
             In known misinformation blacklist: {blacklisted}\n\
             Base credibility score from reputation table: {}\n\n\
             Assess publisher credibility.",
            domain.unwrap_or("unknown"),
            whois
                .age_years
                .map(|a| a.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            whois.registered,
            whois.country.as_deref().unwrap_or("unknown"),
            base_score
                .map(|s| s.to_string())
                .unwrap_or_else(|| "not found".to_string()),
        );

        let raw = self
            .retry
            .run("publisher_verification", || async {
                let response = self
                    .engine
                    .complete(SYSTEM_PROMPT, &user_message, 0.1, 600)
                    .await?;
                let raw: RawPublisherAssessment = serde_json::from_value(response.parse_json()?)
                    .map_err(EngineError::MalformedJson)?;
                Ok::<_, CredScopeError>(raw)
            })
            .await?;

        let engine_score = raw.credibility_score.unwrap_or(50.0).clamp(0.0, 100.0);

        let mut credibility_score = match base_score {
            Some(base) => round1(REPUTATION_WEIGHT * base + ENGINE_WEIGHT * engine_score),
            None => engine_score,
        };

        let mut flags = raw.flags;
        if blacklisted {
            if flags.first().map(String::as_str) != Some(BLACKLIST_FLAG) {
                flags.retain(|f| f != BLACKLIST_FLAG);
                flags.insert(0, BLACKLIST_FLAG.to_string());
            }
            credibility_score = credibility_score.min(BLACKLIST_SCORE_CAP);
        }

        let assessment = PublisherAssessment {
            publisher_name: name.to_string(),
            domain: domain.map(str::to_string),
            credibility_score,
            domain_age_years: whois.age_years,
            blacklisted,
            whois_registered: whois.registered,
            country: whois.country,
            reasoning: raw.reasoning,
            flags,
        };

        info!(
            publisher = name,
            score = assessment.credibility_score,
            blacklisted,
            "publisher scoring complete"
        );
        Ok(assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedEngine;

    fn engine_json(score: f64, flags: &str) -> String {
        format!(
            r#"{{"credibility_score": {score}, "reasoning": "Assessed.", "flags": {flags}}}"#
        )
    }

    fn scorer(engine: ScriptedEngine) -> PublisherScorer {
        PublisherScorer::new(
            Arc::new(engine),
            Arc::new(ReferenceData::default()),
            RetryPolicy::default(),
        )
    }

    #[tokio::test]
    async fn reputation_base_blends_sixty_forty() {
        let engine = ScriptedEngine::new().on("publisher credibility", engine_json(70.0, "[]"));
        let assessment = scorer(engine)
            .score(Some("Reuters"), Some("reuters.com"))
            .await
            .unwrap();

        // 0.6 * 96 + 0.4 * 70
        assert_eq!(assessment.credibility_score, 85.6);
        assert!(!assessment.blacklisted);
        assert_eq!(assessment.domain_age_years, Some(29.0));
        assert_eq!(assessment.country.as_deref(), Some("US"));
    }

    #[tokio::test]
    async fn blacklisted_domain_is_capped_and_flagged_first() {
        let engine = ScriptedEngine::new().on(
            "publisher credibility",
            engine_json(90.0, r#"["clickbait_history", "known_misinformation"]"#),
        );
        let assessment = scorer(engine)
            .score(Some("InfoWars"), Some("infowars.com"))
            .await
            .unwrap();

        assert!(assessment.blacklisted);
        assert!(assessment.credibility_score <= 15.0);
        assert_eq!(assessment.flags[0], BLACKLIST_FLAG);
        // the duplicate deeper in the list is gone
        assert_eq!(
            assessment
                .flags
                .iter()
                .filter(|f| f.as_str() == BLACKLIST_FLAG)
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn missing_publisher_uses_sentinel_and_engine_score() {
        let engine = ScriptedEngine::new().on("publisher credibility", engine_json(35.0, "[]"));
        let assessment = scorer(engine).score(None, None).await.unwrap();

        assert_eq!(assessment.publisher_name, UNKNOWN_PUBLISHER);
        assert_eq!(assessment.credibility_score, 35.0);
        assert!(!assessment.whois_registered);
        assert!(assessment.domain_age_years.is_none());
    }

    #[tokio::test]
    async fn unknown_domain_gets_default_whois_facts() {
        let engine = ScriptedEngine::new().on("publisher credibility", engine_json(55.0, "[]"));
        let assessment = scorer(engine)
            .score(Some("Fresh Outlet"), Some("fresh-outlet.net"))
            .await
            .unwrap();

        assert_eq!(assessment.credibility_score, 55.0);
        assert!(assessment.whois_registered);
        assert_eq!(assessment.country.as_deref(), Some("Unknown"));
    }
}
