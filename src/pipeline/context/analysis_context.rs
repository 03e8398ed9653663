use std::sync::Arc;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::pipeline::context::metrics::{Stage, StageMetrics};
use crate::pipeline::context::state::{InferredState, IngestedState, ProcessingState, ScoredState};
use crate::pipeline::types::{ColorMetrics, OodVerdict, ProbabilityVector, RawImage};

// AnalysisContext with compile-time stage tracking via the state parameter
pub struct AnalysisContext<S> {
    id: Uuid,
    image: Arc<RawImage>,
    metrics: StageMetrics,
    processing_start: Instant,
    state: S,
}

impl<S: ProcessingState> AnalysisContext<S> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn image(&self) -> &Arc<RawImage> {
        &self.image
    }

    pub fn metrics(&self) -> &StageMetrics {
        &self.metrics
    }

    pub fn record(&mut self, stage: Stage, duration: Duration) {
        self.metrics.record(stage, duration);
    }

    pub fn elapsed(&self) -> Duration {
        self.processing_start.elapsed()
    }

    pub fn state_name(&self) -> &'static str {
        S::state_name()
    }

    fn advance<T>(self, state: T) -> AnalysisContext<T> {
        AnalysisContext {
            id: self.id,
            image: self.image,
            metrics: self.metrics,
            processing_start: self.processing_start,
            state,
        }
    }
}

impl AnalysisContext<IngestedState> {
    pub fn new(image: RawImage) -> Self {
        Self {
            id: Uuid::new_v4(),
            image: Arc::new(image),
            metrics: StageMetrics::new(),
            processing_start: Instant::now(),
            state: IngestedState,
        }
    }

    pub fn into_inferred(
        self,
        native: ProbabilityVector,
        color: ColorMetrics,
    ) -> AnalysisContext<InferredState> {
        self.advance(InferredState { native, color })
    }
}

impl AnalysisContext<InferredState> {
    pub fn native(&self) -> &ProbabilityVector {
        &self.state.native
    }

    pub fn into_scored(
        self,
        canonical: ProbabilityVector,
        verdict: OodVerdict,
    ) -> AnalysisContext<ScoredState> {
        let color = self.state.color;
        self.advance(ScoredState {
            canonical,
            verdict,
            color,
        })
    }
}

impl AnalysisContext<ScoredState> {
    pub fn canonical(&self) -> &ProbabilityVector {
        &self.state.canonical
    }

    pub fn verdict(&self) -> &OodVerdict {
        &self.state.verdict
    }

    pub fn color(&self) -> &ColorMetrics {
        &self.state.color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    #[test]
    fn context_keeps_identity_across_states() {
        let image = RawImage::from_rgb(ImageBuffer::from_pixel(4, 4, Rgb([0, 255, 0]))).unwrap();
        let ingested = AnalysisContext::new(image);
        let id = ingested.id();
        assert_eq!(ingested.state_name(), "Ingested");

        let color = ColorMetrics {
            percent_green: 100.0,
            percent_yellow: 0.0,
        };
        let inferred = ingested.into_inferred(ProbabilityVector::new(vec![1.0, 0.0]), color);
        assert_eq!(inferred.state_name(), "Inferred");

        let verdict = OodVerdict {
            predicted_index: 0,
            confidence: 1.0,
            entropy: 0.0,
            is_ood: false,
        };
        let scored = inferred.into_scored(ProbabilityVector::new(vec![1.0, 0.0]), verdict);
        assert_eq!(scored.id(), id);
        assert_eq!(scored.color(), &color);
        assert_eq!(scored.verdict().predicted_index, 0);
    }
}
