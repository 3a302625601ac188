//! Where raw LLM responses come from.

use async_trait::async_trait;
use thiserror::Error;

use crate::queue::AnalysisJob;

/// Errors from response sources.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Empty response")]
    EmptyResponse,

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

/// Produces the raw markdown report for a job.
///
/// Implementations wrap an LLM client (prompt construction, HTTP, retries)
/// or replay stored responses. The pipeline applies its own timeout.
#[async_trait]
pub trait ResponseSource: Send + Sync {
    /// Fetch the LLM's report for this job's code and criteria.
    async fn fetch(&self, job: &AnalysisJob) -> Result<String, SourceError>;

    /// Name used in logs.
    fn name(&self) -> &str;
}
