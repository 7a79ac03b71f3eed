//! af-tracker: Execution status tracking for agentflow runs
//!
//! Polls the backend runner's status endpoint for one run id until a
//! terminal status is observed, with an in-flight guard so polls never
//! overlap and cancellation when the run id changes or is cleared.

pub mod tracker;

pub use tracker::{RunStatusTracker, TrackerEvent, TrackerPhase, TrackerSnapshot};
