//! Service Module
//!
//! Business logic layer for the launcher.
//! Services orchestrate between the backends and contain the pipeline logic.

pub mod artifacts;
pub mod launcher;
pub mod parameters;
pub mod stages;

// Re-export for convenience
pub use artifacts as artifact_service;
pub use launcher::{LaunchError, LaunchReceipt, PipelineLauncher, SubmittedJob};
pub use parameters as parameter_service;
