pub mod builder;
pub mod error;
pub mod gateway;
pub mod node;
pub mod nodes;
pub mod pipeline;
pub mod prompts;
pub mod recovery;
pub mod router;
pub mod state;

pub use builder::PipelineBuilder;
pub use error::{ModelInvocationError, ParseError, PipelineError};
pub use gateway::{Invocation, ModelGateway};
pub use node::{Node, Outcome, Phase};
pub use nodes::{Analyzer, MergeNode, Preprocessor, SingleCallAnalyzer};
pub use pipeline::Pipeline;
pub use recovery::recover_json;
pub use router::{PipelineRouter, Router};
pub use state::{PipelineKind, PipelineRun, PipelineState};

// Re-export key types from clearsignals-types
pub use clearsignals_types::{AnalysisResult, ModelCatalog, PipelineConfig, ResolvedModel};
