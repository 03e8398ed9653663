pub mod analysis_context;
pub mod metrics;
pub mod state;

pub use analysis_context::AnalysisContext;
pub use metrics::{Stage, StageMetrics};
pub use state::{InferredState, IngestedState, ProcessingState, ScoredState};
