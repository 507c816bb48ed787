use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use credscope_common::{Claim, CredScopeError, PipelineRun, RunStatus};
use reason_client::ReasoningEngine;

use crate::aggregator::Aggregator;
use crate::author::AuthorScorer;
use crate::evidence::EvidenceAssessor;
use crate::extraction::ClaimExtractor;
use crate::publisher::PublisherScorer;
use crate::reference::ReferenceData;
use crate::retry::RetryPolicy;
use crate::search::SearchProvider;
use crate::verifier::ClaimVerifier;

/// At most this many claims are processed per run, in extraction order.
pub const MAX_CLAIMS_PER_RUN: usize = 5;

/// Sequences the five stages over one input text.
///
/// Extraction runs alone; author and publisher scoring run concurrently;
/// each processed claim then gets an independent evidence→verification
/// chain, fanned out with fail-fast join semantics; aggregation runs last.
/// A stage failure (after retries) marks the whole run failed; partial
/// claim results are never promoted to the aggregator.
pub struct Pipeline {
    extractor: ClaimExtractor,
    author: AuthorScorer,
    publisher: PublisherScorer,
    evidence: EvidenceAssessor,
    verifier: ClaimVerifier,
    aggregator: Aggregator,
    provider: String,
}

impl Pipeline {
    pub fn new(
        engine: Arc<dyn ReasoningEngine>,
        search: Arc<dyn SearchProvider>,
        reference: Arc<ReferenceData>,
    ) -> Self {
        let retry = RetryPolicy::default();
        let provider = engine.provider_name().to_string();
        Self {
            extractor: ClaimExtractor::new(engine.clone(), retry),
            author: AuthorScorer::new(engine.clone(), reference.clone(), retry),
            publisher: PublisherScorer::new(engine.clone(), reference, retry),
            evidence: EvidenceAssessor::new(engine.clone(), search, retry),
            verifier: ClaimVerifier::new(engine, retry),
            aggregator: Aggregator,
            provider,
        }
    }

    /// Run the full pipeline. The returned run is terminal: completed with
    /// an aggregated verdict, or failed with the causing error recorded.
    pub async fn run(&self, text: &str) -> PipelineRun {
        let mut run = PipelineRun::new(text, &self.provider);
        info!(run_id = run.id.as_str(), "pipeline start");
        let started_at = Utc::now();

        match self.run_stages(&mut run).await {
            Ok(()) => {
                run.status = RunStatus::Completed;
                let aggregated = run.aggregated.as_ref();
                info!(
                    run_id = run.id.as_str(),
                    verdict = aggregated.map(|a| a.verdict.to_string()).unwrap_or_default(),
                    score = aggregated.map(|a| a.score).unwrap_or_default(),
                    duration_s = (Utc::now() - started_at).num_seconds(),
                    "pipeline complete"
                );
            }
            Err(e) => {
                error!(run_id = run.id.as_str(), error = %e, "pipeline failed");
                run.status = RunStatus::Failed;
                run.error = Some(e.to_string());
            }
        }
        run
    }

    async fn run_stages(&self, run: &mut PipelineRun) -> Result<(), CredScopeError> {
        // Stage 1: extraction feeds everything downstream.
        let extraction = self.extractor.run(&run.input_text).await?;
        run.extraction = Some(extraction.clone());

        // Stages 2 and 2': author and publisher scoring are independent.
        let (author, publisher) = tokio::try_join!(
            self.author.score(
                extraction.author_name.as_deref(),
                extraction.publisher_domain.as_deref(),
            ),
            self.publisher.score(
                extraction.publisher_name.as_deref(),
                extraction.publisher_domain.as_deref(),
            ),
        )?;
        run.author = Some(author.clone());
        run.publisher = Some(publisher.clone());

        // Stages 3 and 4: one evidence→verification chain per claim. Chains
        // for different claims overlap freely; try_join_all preserves
        // extraction order and aborts the group on the first failure.
        let claims: Vec<Claim> = extraction
            .claims
            .iter()
            .take(MAX_CLAIMS_PER_RUN)
            .cloned()
            .collect();
        if claims.len() < extraction.claims.len() {
            info!(
                processed = claims.len(),
                extracted = extraction.claims.len(),
                "claim cap applied"
            );
        }

        let pairs = futures::future::try_join_all(claims.iter().map(|claim| async {
            let evidence = self.evidence.assess(claim).await?;
            let verdict = self.verifier.verify(claim, &evidence).await?;
            Ok::<_, CredScopeError>((evidence, verdict))
        }))
        .await?;

        for (evidence, verdict) in pairs {
            run.evidence.push(evidence);
            run.claim_verdicts.push(verdict);
        }

        // Stage 5: aggregation, single-threaded, after every verdict is in.
        let aggregated = self
            .aggregator
            .aggregate(&author, &publisher, &run.claim_verdicts);
        run.aggregated = Some(aggregated);
        Ok(())
    }
}
