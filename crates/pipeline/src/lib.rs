//! The content pipeline: five stages and the orchestrator that chains them.

pub mod config;
pub mod orchestrator;
pub mod stages;

pub use config::PipelineConfig;
pub use orchestrator::{Pipeline, PipelineError, PipelineReport, PipelineRequest, StageKind};
pub use stages::{Providers, StageSettings, Stages};
