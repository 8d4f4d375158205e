//! Data model shared by the ClearSignals pipeline, memory and API crates.

pub mod analysis;
pub mod config;
pub mod lenient;
pub mod profile;
pub mod thread;

pub use analysis::{
    AnalysisResult, Coaching, DealAnalysis, DealStage, FinalAssessment, NextTime,
    PerMessageAnalysis, Ryg, Severity, Signal, SignalKind,
};
pub use config::{ModelCatalog, PipelineConfig, ResolvedModel};
pub use profile::{CommunicationProfile, RelationshipHealth, TrendDirection};
pub use thread::{snippet, Direction, MessageSummary, Thread, ThreadMessage};
