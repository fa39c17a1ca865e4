//! uvbf-pipeline library interface
//!
//! Stage services, the in-process learning collaborators and the
//! orchestrator that chains them. The `uvbf-pipeline` binary is a thin
//! CLI over [`WorkflowOrchestrator`].

pub mod config;
pub mod ml;
pub mod models;
pub mod services;

pub use config::{AnnotationMode, PipelineConfig};
pub use services::{RunOptions, WorkflowOrchestrator};

/// Version, commit, build time and profile of this build
pub fn build_info() -> String {
    format!(
        "{} {} (commit {}, built {}, {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    )
}
