use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Byline sentinel used when the text carries no author.
pub const UNKNOWN_AUTHOR: &str = "Unknown/Anonymous";

/// Publisher sentinel used when the text names no outlet.
pub const UNKNOWN_PUBLISHER: &str = "Unknown Publisher";

// ---------------------------------------------------------------------------
// Claim extraction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimType {
    Factual,
    Opinion,
    Statistic,
    Quote,
}

impl ClaimType {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "factual" => Some(Self::Factual),
            "opinion" => Some(Self::Opinion),
            "statistic" => Some(Self::Statistic),
            "quote" => Some(Self::Quote),
            _ => None,
        }
    }
}

/// One atomic factual assertion extracted from the input text.
/// Immutable once extracted; `id` is generated when the engine omits one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub id: String,
    pub text: String,
    pub claim_type: ClaimType,
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityLabel {
    Person,
    Org,
    Gpe,
    Date,
    Number,
    Event,
}

impl EntityLabel {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "PERSON" => Some(Self::Person),
            "ORG" => Some(Self::Org),
            "GPE" => Some(Self::Gpe),
            "DATE" => Some(Self::Date),
            "NUMBER" => Some(Self::Number),
            "EVENT" => Some(Self::Event),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedEntity {
    pub text: String,
    pub label: EntityLabel,
    pub confidence: f64,
}

/// Output of the extraction stage; feeds every later stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    pub author_name: Option<String>,
    pub publisher_name: Option<String>,
    pub publisher_domain: Option<String>,
    pub claims: Vec<Claim>,
    pub named_entities: Vec<NamedEntity>,
    pub summary: String,
    pub language: String,
}

// ---------------------------------------------------------------------------
// Author / publisher assessments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorAssessment {
    pub author_name: String,
    pub credibility_score: f64,
    pub registry_match: bool,
    pub known_outlets: Vec<String>,
    pub domain_authority_score: f64,
    pub public_profile_found: bool,
    pub reasoning: String,
    pub flags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherAssessment {
    pub publisher_name: String,
    pub domain: Option<String>,
    pub credibility_score: f64,
    pub domain_age_years: Option<f64>,
    pub blacklisted: bool,
    pub whois_registered: bool,
    pub country: Option<String>,
    pub reasoning: String,
    pub flags: Vec<String>,
}

// ---------------------------------------------------------------------------
// Evidence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    Supporting,
    Contradicting,
    Neutral,
}

impl Stance {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "supporting" => Some(Self::Supporting),
            "contradicting" => Some(Self::Contradicting),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }
}

impl std::fmt::Display for Stance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Supporting => "supporting",
            Self::Contradicting => "contradicting",
            Self::Neutral => "neutral",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceArticle {
    pub title: String,
    pub url: String,
    pub publisher: String,
    pub published_date: Option<String>,
    pub summary: String,
    pub stance: Stance,
    pub relevance: f64,
}

/// All evidence gathered for one claim, with per-stance counts and a
/// synthesis of what the articles collectively show.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceSet {
    pub claim_id: String,
    pub claim_text: String,
    pub articles: Vec<EvidenceArticle>,
    pub supporting_count: u32,
    pub contradicting_count: u32,
    pub neutral_count: u32,
    pub synthesis: String,
}

impl EvidenceSet {
    pub fn total_count(&self) -> u32 {
        self.supporting_count + self.contradicting_count + self.neutral_count
    }
}

// ---------------------------------------------------------------------------
// Verdicts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    True,
    False,
    #[serde(rename = "Partially True")]
    PartiallyTrue,
    #[serde(rename = "Insufficient Evidence")]
    InsufficientEvidence,
}

impl Verdict {
    /// Lower rank = more decisive. Used to pick the more conservative of two
    /// disagreeing opinions.
    pub fn caution_rank(&self) -> u8 {
        match self {
            Self::True => 0,
            Self::False => 1,
            Self::PartiallyTrue => 2,
            Self::InsufficientEvidence => 3,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "True" => Some(Self::True),
            "False" => Some(Self::False),
            "Partially True" => Some(Self::PartiallyTrue),
            "Insufficient Evidence" => Some(Self::InsufficientEvidence),
            _ => None,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::True => "True",
            Self::False => "False",
            Self::PartiallyTrue => "Partially True",
            Self::InsufficientEvidence => "Insufficient Evidence",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimVerdict {
    pub claim_id: String,
    pub claim_text: String,
    pub verdict: Verdict,
    pub confidence: f64,
    pub reasoning: String,
    pub key_evidence: Vec<String>,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimScoreEntry {
    pub claim: String,
    pub verdict: Verdict,
    pub confidence: f64,
    pub score: f64,
}

/// Component scores and weights behind a final verdict, kept for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub author_score: f64,
    pub author_weight: f64,
    pub publisher_score: f64,
    pub publisher_weight: f64,
    pub claims_score: f64,
    pub claims_weight: f64,
    pub claim_scores: Vec<ClaimScoreEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedVerdict {
    pub verdict: Verdict,
    pub score: f64,
    pub confidence: f64,
    pub explanation: String,
    pub breakdown: ScoreBreakdown,
}

// ---------------------------------------------------------------------------
// Pipeline run
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Processing,
    Completed,
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// One input text and everything the pipeline derived from it.
///
/// Mutated in place as stages complete. The claim verdict list preserves
/// extraction order, and the aggregated verdict (present iff the run
/// completed) is derived only from this run's assessments and verdicts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub id: String,
    pub input_text: String,
    pub created_at: DateTime<Utc>,
    pub status: RunStatus,
    pub error: Option<String>,
    pub engine_provider: String,
    pub extraction: Option<Extraction>,
    pub author: Option<AuthorAssessment>,
    pub publisher: Option<PublisherAssessment>,
    pub evidence: Vec<EvidenceSet>,
    pub claim_verdicts: Vec<ClaimVerdict>,
    pub aggregated: Option<AggregatedVerdict>,
}

impl PipelineRun {
    pub fn new(input_text: impl Into<String>, engine_provider: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            input_text: input_text.into(),
            created_at: Utc::now(),
            status: RunStatus::Processing,
            error: None,
            engine_provider: engine_provider.into(),
            extraction: None,
            author: None,
            publisher: None,
            evidence: Vec::new(),
            claim_verdicts: Vec::new(),
            aggregated: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caution_rank_orders_decisive_before_cautious() {
        assert!(Verdict::True.caution_rank() < Verdict::False.caution_rank());
        assert!(Verdict::False.caution_rank() < Verdict::PartiallyTrue.caution_rank());
        assert!(
            Verdict::PartiallyTrue.caution_rank()
                < Verdict::InsufficientEvidence.caution_rank()
        );
    }

    #[test]
    fn verdict_labels_round_trip() {
        for verdict in [
            Verdict::True,
            Verdict::False,
            Verdict::PartiallyTrue,
            Verdict::InsufficientEvidence,
        ] {
            assert_eq!(Verdict::from_label(&verdict.to_string()), Some(verdict));
        }
        assert_eq!(Verdict::from_label("Mostly True"), None);
    }

    #[test]
    fn verdict_serializes_with_spaces() {
        let json = serde_json::to_string(&Verdict::PartiallyTrue).unwrap();
        assert_eq!(json, "\"Partially True\"");
        let json = serde_json::to_string(&Verdict::InsufficientEvidence).unwrap();
        assert_eq!(json, "\"Insufficient Evidence\"");
    }

    #[test]
    fn new_run_starts_processing() {
        let run = PipelineRun::new("some text", "claude");
        assert_eq!(run.status, RunStatus::Processing);
        assert!(run.aggregated.is_none());
        assert!(!run.id.is_empty());
    }

    #[test]
    fn evidence_total_sums_stance_counts() {
        let set = EvidenceSet {
            claim_id: "c1".to_string(),
            claim_text: "claim".to_string(),
            articles: Vec::new(),
            supporting_count: 3,
            contradicting_count: 1,
            neutral_count: 2,
            synthesis: String::new(),
        };
        assert_eq!(set.total_count(), 6);
    }
}
