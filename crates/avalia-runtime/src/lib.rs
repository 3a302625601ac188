//! # avalia-runtime
//!
//! Job handling around the deterministic parser in `avalia-core`.
//!
//! Submissions wait in an [`AnalysisQueue`] and are processed one at a
//! time. For each job the [`AnalysisPipeline`] asks a [`ResponseSource`]
//! for the LLM's markdown report, parses it into per-criterion results
//! and records the outcome on the job.
//!
//! ## Important
//!
//! This crate never talks to an LLM itself. Prompting, HTTP and retries
//! live behind the [`ResponseSource`] trait.
//!
//! ## Example
//!
//! ```rust,ignore
//! use avalia_runtime::{AnalysisPipeline, AnalysisQueue, RuntimeConfig};
//!
//! let queue = Arc::new(AnalysisQueue::new());
//! let pipeline = AnalysisPipeline::new(queue.clone(), Arc::new(my_source), RuntimeConfig::default())?;
//!
//! queue.enqueue(code, catalog.requests_for(&selected)?);
//! for outcome in pipeline.run_until_idle().await? {
//!     println!("{:?}", outcome.job_id());
//! }
//! ```

use thiserror::Error;

pub mod cache;
pub mod config;
pub mod pipeline;
pub mod queue;
pub mod source;

pub use cache::{CacheKey, ReportCache};
pub use config::{CacheConfig, RuntimeConfig};
pub use pipeline::{AnalysisPipeline, JobOutcome};
pub use queue::{AnalysisJob, AnalysisQueue, JobId, JobStatus, QueueError};
pub use source::{ResponseSource, SourceError};

/// Errors from the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Configuration error: {0}")]
    Config(#[from] avalia_core::ConfigError),
}
