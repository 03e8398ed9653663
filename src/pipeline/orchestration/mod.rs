pub mod analysis_pipeline;
pub mod model_registry;

pub use analysis_pipeline::{AnalysisPipeline, AnalysisPipelineBuilder};
pub use model_registry::{LoadedModel, ModelRegistry};
