// Contact pipeline: eligibility filtering, deduplicating persistence, and run orchestration

pub mod orchestrator;
pub mod processing;
pub mod storage;

pub use orchestrator::{Orchestrator, RunReport, RunStage};
