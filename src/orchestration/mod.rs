//! Orchestration layer for article publishing
//!
//! This module provides the fan-out/fan-in orchestrator that drives the
//! platform clients concurrently, plus the publish history store.

pub mod history;
pub mod publisher;

// Re-export main types for convenience
pub use history::{PlatformStatistics, PublishHistory, PublishRecord, PublishStatistics};
pub use publisher::PostOrchestrator;
