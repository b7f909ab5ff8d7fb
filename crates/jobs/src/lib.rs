//! Job lifecycle management and the analysis pipeline.
//!
//! [`store::JobStore`] is the in-memory registry pollers read from;
//! [`scheduler::JobScheduler`] owns pipeline execution: prompt build,
//! provider call, extraction, validation, and the best-effort sink
//! write. One spawned task per job; the submitting caller never blocks.

pub mod job;
pub mod scheduler;
pub mod sink;
pub mod store;

pub use job::{JobSnapshot, JobStatus};
pub use scheduler::{JobScheduler, PipelineError, StartError};
pub use sink::{HistoryEntry, MemorySink, ResultSink, SinkError, SinkStats};
pub use store::JobStore;
