//! World generation orchestrator.
//!
//! Drives a single remote generation job per run:
//! - **Prepare**: ask the control plane for a signed upload URL
//! - **Upload**: PUT the image bytes to that URL
//! - **Submit**: start generation referencing the uploaded asset
//! - **Poll**: fetch status snapshots until done, failed, or out of time

mod config;
mod runner;
mod types;

pub use config::{
    GenerationParams, PollPolicy, WorldModel, MAX_WAIT_RANGE_SECS, POLL_INTERVAL_RANGE_SECS,
};
pub use runner::WorldGenerator;
pub use types::{
    GenerationError, GenerationEvent, GenerationObserver, GenerationOutcome, OperationState,
};
