use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use credscope_common::PipelineRun;

/// Persistence seam. Implementations take a full run snapshot keyed by run
/// id and upsert it idempotently; a store failure must never abort a
/// completed run's in-memory result, so callers log and continue.
#[async_trait]
pub trait RunStore: Send + Sync {
    async fn upsert(&self, run: &PipelineRun) -> Result<()>;

    async fn get(&self, run_id: &str) -> Result<Option<PipelineRun>>;
}

/// In-memory store used by the CLI and tests.
pub struct MemoryRunStore {
    runs: Mutex<HashMap<String, PipelineRun>>,
}

impl MemoryRunStore {
    pub fn new() -> Self {
        Self {
            runs: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryRunStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RunStore for MemoryRunStore {
    async fn upsert(&self, run: &PipelineRun) -> Result<()> {
        self.runs
            .lock()
            .await
            .insert(run.id.clone(), run.clone());
        Ok(())
    }

    async fn get(&self, run_id: &str) -> Result<Option<PipelineRun>> {
        Ok(self.runs.lock().await.get(run_id).cloned())
    }
}
