use crate::pipeline::types::{ColorMetrics, OodVerdict, ProbabilityVector};

// Markers to track how far an image has progressed through the analysis pipeline
pub struct IngestedState;

pub struct InferredState {
    pub(super) native: ProbabilityVector,
    pub(super) color: ColorMetrics,
}

pub struct ScoredState {
    pub(super) canonical: ProbabilityVector,
    pub(super) verdict: OodVerdict,
    pub(super) color: ColorMetrics,
}

pub trait ProcessingState: 'static {
    fn state_name() -> &'static str;
}

impl ProcessingState for IngestedState {
    fn state_name() -> &'static str {
        "Ingested"
    }
}

impl ProcessingState for InferredState {
    fn state_name() -> &'static str {
        "Inferred"
    }
}

impl ProcessingState for ScoredState {
    fn state_name() -> &'static str {
        "Scored"
    }
}
