//! FIFO analysis queue with a single active job.
//!
//! Submissions wait in order; at most one job is processing at a time.
//! A job keeps its record after it finishes so callers can poll its final
//! state, until it is dropped with `remove` or `prune_finished`.

use avalia_core::CriterionRequest;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use thiserror::Error;

/// Errors from queue operations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueueError {
    #[error("Job not found: {0}")]
    NotFound(JobId),

    #[error("Job {0} is still {1}")]
    NotFinished(JobId, JobStatus),

    #[error("Job {id} cannot go from {from} to {to}")]
    InvalidTransition {
        id: JobId,
        from: JobStatus,
        to: JobStatus,
    },
}

/// Queue-assigned job identifier, increasing in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of an analysis job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A code submission waiting for, undergoing, or done with analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisJob {
    pub id: JobId,

    /// Source code submitted for evaluation
    pub code: String,

    /// Criteria to evaluate, in prompt order
    pub requested: Vec<CriterionRequest>,

    pub status: JobStatus,

    pub submitted_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

#[derive(Debug, Default)]
struct QueueState {
    next_id: u64,
    pending: VecDeque<JobId>,
    active: Option<JobId>,
    jobs: HashMap<JobId, AnalysisJob>,
}

impl QueueState {
    fn job_mut(&mut self, id: JobId) -> Result<&mut AnalysisJob, QueueError> {
        self.jobs.get_mut(&id).ok_or(QueueError::NotFound(id))
    }

    /// Move the active job to a terminal state.
    fn finish(
        &mut self,
        id: JobId,
        to: JobStatus,
        reason: Option<String>,
    ) -> Result<AnalysisJob, QueueError> {
        let job = self.job_mut(id)?;
        if job.status != JobStatus::Processing {
            return Err(QueueError::InvalidTransition {
                id,
                from: job.status,
                to,
            });
        }
        job.status = to;
        job.finished_at = Some(Utc::now());
        job.failure_reason = reason;
        let finished = job.clone();

        if self.active == Some(id) {
            self.active = None;
        }
        Ok(finished)
    }
}

/// Thread-safe job queue.
#[derive(Debug, Default)]
pub struct AnalysisQueue {
    state: Mutex<QueueState>,
}

impl AnalysisQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a submission to the back of the queue.
    pub fn enqueue(&self, code: impl Into<String>, requested: Vec<CriterionRequest>) -> JobId {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = JobId(state.next_id);

        state.jobs.insert(
            id,
            AnalysisJob {
                id,
                code: code.into(),
                requested,
                status: JobStatus::Queued,
                submitted_at: Utc::now(),
                started_at: None,
                finished_at: None,
                failure_reason: None,
            },
        );
        state.pending.push_back(id);

        tracing::info!(job = %id, pending = state.pending.len(), "Job queued");
        id
    }

    /// Start the oldest queued job.
    ///
    /// Returns `None` while another job is processing or nothing is queued.
    pub fn start_next(&self) -> Option<AnalysisJob> {
        let mut state = self.state.lock();
        if state.active.is_some() {
            return None;
        }

        let id = state.pending.pop_front()?;
        state.active = Some(id);
        let job = state.jobs.get_mut(&id)?;
        job.status = JobStatus::Processing;
        job.started_at = Some(Utc::now());

        tracing::info!(job = %id, "Job started");
        Some(job.clone())
    }

    /// Mark the active job as completed.
    pub fn complete(&self, id: JobId) -> Result<AnalysisJob, QueueError> {
        let job = self.state.lock().finish(id, JobStatus::Completed, None)?;
        tracing::info!(job = %id, "Job completed");
        Ok(job)
    }

    /// Mark the active job as failed.
    pub fn fail(&self, id: JobId, reason: impl Into<String>) -> Result<AnalysisJob, QueueError> {
        let reason = reason.into();
        let job = self
            .state
            .lock()
            .finish(id, JobStatus::Failed, Some(reason.clone()))?;
        tracing::info!(job = %id, reason = %reason, "Job failed");
        Ok(job)
    }

    /// Cancel a queued or processing job.
    ///
    /// Cancelling the active job frees the slot immediately; whatever was
    /// computing its result must discard it.
    pub fn cancel(&self, id: JobId) -> Result<AnalysisJob, QueueError> {
        let mut state = self.state.lock();
        let from = state.job_mut(id)?.status;

        match from {
            JobStatus::Queued => state.pending.retain(|queued| *queued != id),
            JobStatus::Processing => state.active = None,
            _ => {
                return Err(QueueError::InvalidTransition {
                    id,
                    from,
                    to: JobStatus::Cancelled,
                })
            }
        }

        let job = state.job_mut(id)?;
        job.status = JobStatus::Cancelled;
        job.finished_at = Some(Utc::now());
        let cancelled = job.clone();

        tracing::info!(job = %id, from = %from, "Job cancelled");
        Ok(cancelled)
    }

    /// Snapshot of a job in any state.
    pub fn get(&self, id: JobId) -> Option<AnalysisJob> {
        self.state.lock().jobs.get(&id).cloned()
    }

    /// Zero-based place in line for a queued job.
    pub fn position(&self, id: JobId) -> Option<usize> {
        self.state.lock().pending.iter().position(|queued| *queued == id)
    }

    /// The job currently processing, if any.
    pub fn active(&self) -> Option<AnalysisJob> {
        let state = self.state.lock();
        state.active.and_then(|id| state.jobs.get(&id).cloned())
    }

    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Drop the record of a finished job, returning it.
    pub fn remove(&self, id: JobId) -> Result<AnalysisJob, QueueError> {
        let mut state = self.state.lock();
        let status = state.job_mut(id)?.status;
        if !status.is_terminal() {
            return Err(QueueError::NotFinished(id, status));
        }
        state.jobs.remove(&id).ok_or(QueueError::NotFound(id))
    }

    /// Drop every finished job that finished before `cutoff`.
    ///
    /// Returns the number of records removed. Queued and processing jobs
    /// are never touched.
    pub fn prune_finished(&self, cutoff: DateTime<Utc>) -> usize {
        let mut state = self.state.lock();
        let before = state.jobs.len();
        state.jobs.retain(|_, job| {
            !(job.status.is_terminal() && job.finished_at.is_some_and(|at| at < cutoff))
        });

        let pruned = before - state.jobs.len();
        if pruned > 0 {
            tracing::info!(pruned, remaining = state.jobs.len(), "Pruned finished jobs");
        }
        pruned
    }
}
