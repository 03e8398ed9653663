pub mod context;
pub mod orchestration;
pub mod services;
pub mod types;

pub use orchestration::{AnalysisPipeline, LoadedModel, ModelRegistry};
pub use services::{ChartKind, ChartSet, Classifier, EncodedChart};
pub use types::{
    AnalysisResult, CareRecommendation, ClassMapping, ColorMetrics, ImageReference, OodVerdict,
    ProbabilityVector, RawImage,
};
