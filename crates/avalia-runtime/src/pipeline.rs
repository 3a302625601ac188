//! Drives queued jobs through fetch, parse and completion.

use avalia_core::{AnalysisReport, CriteriaResponseParser};
use std::sync::Arc;

use crate::cache::{CacheKey, ReportCache};
use crate::config::RuntimeConfig;
use crate::queue::{AnalysisJob, AnalysisQueue, JobId, JobStatus, QueueError};
use crate::source::ResponseSource;
use crate::RuntimeError;

/// What happened to one processed job.
#[derive(Debug, Clone)]
pub enum JobOutcome {
    /// The response was parsed and the job marked completed.
    Completed {
        job: AnalysisJob,
        report: AnalysisReport,
        truncated: bool,
    },

    /// The source failed or timed out; the job is marked failed.
    Failed { job: AnalysisJob, reason: String },

    /// The job was cancelled while in flight; its result was dropped.
    Discarded { id: JobId },
}

impl JobOutcome {
    pub fn job_id(&self) -> JobId {
        match self {
            JobOutcome::Completed { job, .. } | JobOutcome::Failed { job, .. } => job.id,
            JobOutcome::Discarded { id } => *id,
        }
    }
}

/// Sequential processor for an [`AnalysisQueue`].
pub struct AnalysisPipeline {
    queue: Arc<AnalysisQueue>,
    source: Arc<dyn ResponseSource>,
    parser: CriteriaResponseParser,
    cache: ReportCache,
    config: RuntimeConfig,
}

impl AnalysisPipeline {
    pub fn new(
        queue: Arc<AnalysisQueue>,
        source: Arc<dyn ResponseSource>,
        config: RuntimeConfig,
    ) -> Result<Self, RuntimeError> {
        config.validate()?;
        Ok(Self {
            queue,
            source,
            parser: CriteriaResponseParser::with_config(config.parser.clone()),
            cache: ReportCache::from_config(&config.cache),
            config,
        })
    }

    /// Use a shared or pre-warmed cache.
    pub fn with_cache(mut self, cache: ReportCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn queue(&self) -> &Arc<AnalysisQueue> {
        &self.queue
    }

    pub fn cache(&self) -> &ReportCache {
        &self.cache
    }

    /// Process the next queued job.
    ///
    /// Returns `Ok(None)` when nothing could be started: the queue is empty
    /// or another job is already processing.
    pub async fn process_next(&self) -> Result<Option<JobOutcome>, RuntimeError> {
        let Some(job) = self.queue.start_next() else {
            return Ok(None);
        };

        let timeout = self.config.source_timeout;
        let fetched = tokio::time::timeout(timeout, self.source.fetch(&job)).await;

        let raw = match fetched {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                tracing::warn!(job = %job.id, source = self.source.name(), error = %e, "Response source failed");
                return self.finish_failed(job.id, e.to_string());
            }
            Err(_) => {
                tracing::warn!(job = %job.id, source = self.source.name(), timeout = ?timeout, "Response source timed out");
                return self.finish_failed(job.id, format!("Timed out after {:?}", timeout));
            }
        };

        let (text, truncated) = truncate_chars(&raw, self.config.max_response_chars);
        if truncated {
            tracing::warn!(
                job = %job.id,
                limit = self.config.max_response_chars,
                "Response truncated before parsing"
            );
        }

        let key = CacheKey::new(text, &job.requested);
        let report = self
            .cache
            .get_or_parse(key, || self.parser.parse_report(text, &job.requested))
            .await;

        match self.queue.complete(job.id) {
            Ok(job) => Ok(Some(JobOutcome::Completed {
                job,
                report,
                truncated,
            })),
            Err(e) => self.discard_if_cancelled(job.id, e),
        }
    }

    /// Process jobs until the queue is empty, returning every outcome in order.
    pub async fn run_until_idle(&self) -> Result<Vec<JobOutcome>, RuntimeError> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.process_next().await? {
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    fn finish_failed(&self, id: JobId, reason: String) -> Result<Option<JobOutcome>, RuntimeError> {
        match self.queue.fail(id, reason.clone()) {
            Ok(job) => Ok(Some(JobOutcome::Failed { job, reason })),
            Err(e) => self.discard_if_cancelled(id, e),
        }
    }

    fn discard_if_cancelled(
        &self,
        id: JobId,
        error: QueueError,
    ) -> Result<Option<JobOutcome>, RuntimeError> {
        match error {
            QueueError::InvalidTransition {
                from: JobStatus::Cancelled,
                ..
            } => {
                tracing::info!(job = %id, "Discarding result of cancelled job");
                Ok(Some(JobOutcome::Discarded { id }))
            }
            other => Err(other.into()),
        }
    }
}

/// Cut `text` to at most `max_chars` characters without splitting one.
fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => (&text[..end], true),
        None => (text, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceError;
    use async_trait::async_trait;
    use avalia_core::{CriterionRequest, CriterionStatus};
    use parking_lot::Mutex;
    use std::time::Duration;

    const RESPONSE: &str = "\
## Critério 1: Legibilidade
Nomes claros.
**Status:** Conforme
**Confiança:** 90%
";

    /// Replays canned responses in order.
    struct CannedSource {
        responses: Mutex<Vec<Result<String, SourceError>>>,
    }

    impl CannedSource {
        fn new(responses: Vec<Result<String, SourceError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl ResponseSource for CannedSource {
        async fn fetch(&self, _job: &AnalysisJob) -> Result<String, SourceError> {
            let mut responses = self.responses.lock();
            if responses.is_empty() {
                return Err(SourceError::EmptyResponse);
            }
            responses.remove(0)
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    struct SlowSource;

    #[async_trait]
    impl ResponseSource for SlowSource {
        async fn fetch(&self, _job: &AnalysisJob) -> Result<String, SourceError> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok(RESPONSE.to_string())
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    /// Cancels the job it is asked about, as a user would mid-analysis.
    struct CancellingSource {
        queue: Arc<AnalysisQueue>,
    }

    #[async_trait]
    impl ResponseSource for CancellingSource {
        async fn fetch(&self, job: &AnalysisJob) -> Result<String, SourceError> {
            self.queue
                .cancel(job.id)
                .map_err(|e| SourceError::RequestFailed(e.to_string()))?;
            Ok(RESPONSE.to_string())
        }

        fn name(&self) -> &str {
            "cancelling"
        }
    }

    fn requests() -> Vec<CriterionRequest> {
        vec![CriterionRequest::new("criteria_1", "Legibilidade").with_number(1)]
    }

    fn pipeline(source: Arc<dyn ResponseSource>, config: RuntimeConfig) -> AnalysisPipeline {
        AnalysisPipeline::new(Arc::new(AnalysisQueue::new()), source, config).unwrap()
    }

    #[tokio::test]
    async fn test_completes_job() {
        let pipeline = pipeline(
            Arc::new(CannedSource::new(vec![Ok(RESPONSE.to_string())])),
            RuntimeConfig::default(),
        );
        let id = pipeline.queue().enqueue("fn main() {}", requests());

        let outcome = pipeline.process_next().await.unwrap().unwrap();
        match outcome {
            JobOutcome::Completed { job, report, truncated } => {
                assert_eq!(job.id, id);
                assert_eq!(job.status, JobStatus::Completed);
                assert!(!truncated);
                assert_eq!(report.results[0].status, CriterionStatus::Conformant);
                assert_eq!(report.results[0].confidence, Some(0.9));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(pipeline.queue().active().is_none());
    }

    #[tokio::test]
    async fn test_empty_queue_is_idle() {
        let pipeline = pipeline(Arc::new(CannedSource::new(vec![])), RuntimeConfig::default());
        assert!(pipeline.process_next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_source_error_fails_job() {
        let pipeline = pipeline(
            Arc::new(CannedSource::new(vec![Err(SourceError::Unavailable(
                "quota".to_string(),
            ))])),
            RuntimeConfig::default(),
        );
        let id = pipeline.queue().enqueue("code", requests());

        let outcome = pipeline.process_next().await.unwrap().unwrap();
        assert!(matches!(outcome, JobOutcome::Failed { ref reason, .. } if reason.contains("quota")));
        assert_eq!(
            pipeline.queue().get(id).map(|j| j.status),
            Some(JobStatus::Failed)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fails_job() {
        let config = RuntimeConfig {
            source_timeout: Duration::from_secs(5),
            ..Default::default()
        };
        let pipeline = pipeline(Arc::new(SlowSource), config);
        pipeline.queue().enqueue("code", requests());

        let outcome = pipeline.process_next().await.unwrap().unwrap();
        match outcome {
            JobOutcome::Failed { job, reason } => {
                assert_eq!(job.status, JobStatus::Failed);
                assert!(reason.contains("Timed out"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancelled_in_flight_is_discarded() {
        let queue = Arc::new(AnalysisQueue::new());
        let source = Arc::new(CancellingSource {
            queue: Arc::clone(&queue),
        });
        let pipeline =
            AnalysisPipeline::new(Arc::clone(&queue), source, RuntimeConfig::default()).unwrap();
        let id = queue.enqueue("code", requests());

        let outcome = pipeline.process_next().await.unwrap().unwrap();
        assert!(matches!(outcome, JobOutcome::Discarded { id: discarded } if discarded == id));
        assert_eq!(queue.get(id).map(|j| j.status), Some(JobStatus::Cancelled));
    }

    #[tokio::test]
    async fn test_run_until_idle_processes_in_order() {
        let pipeline = pipeline(
            Arc::new(CannedSource::new(vec![
                Ok(RESPONSE.to_string()),
                Err(SourceError::EmptyResponse),
                Ok(RESPONSE.to_string()),
            ])),
            RuntimeConfig::default(),
        );
        let ids: Vec<JobId> = (0..3)
            .map(|_| pipeline.queue().enqueue("code", requests()))
            .collect();

        let outcomes = pipeline.run_until_idle().await.unwrap();
        let seen: Vec<JobId> = outcomes.iter().map(JobOutcome::job_id).collect();
        assert_eq!(seen, ids);
        assert!(matches!(outcomes[1], JobOutcome::Failed { .. }));
        assert_eq!(pipeline.queue().pending_len(), 0);

        let key = CacheKey::new(RESPONSE, &requests());
        assert!(pipeline.cache().get(&key).await.is_some());
    }

    #[tokio::test]
    async fn test_oversized_response_truncated() {
        let config = RuntimeConfig {
            max_response_chars: 40,
            ..Default::default()
        };
        let long = format!("{}{}", RESPONSE, "x".repeat(1000));
        let pipeline = pipeline(Arc::new(CannedSource::new(vec![Ok(long)])), config);
        pipeline.queue().enqueue("code", requests());

        match pipeline.process_next().await.unwrap().unwrap() {
            JobOutcome::Completed { report, truncated, .. } => {
                assert!(truncated);
                assert!(report.results[0].matched);
                assert!(report.results[0].content.chars().count() <= 40);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RuntimeConfig {
            max_response_chars: 0,
            ..Default::default()
        };
        let result = AnalysisPipeline::new(
            Arc::new(AnalysisQueue::new()),
            Arc::new(CannedSource::new(vec![])),
            config,
        );
        assert!(matches!(result, Err(RuntimeError::Config(_))));
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        assert_eq!(truncate_chars("Critério", 7), ("Critéri", true));
        assert_eq!(truncate_chars("ção", 2), ("çã", true));
        assert_eq!(truncate_chars("abc", 3), ("abc", false));
        assert_eq!(truncate_chars("", 0), ("", false));
    }
}
