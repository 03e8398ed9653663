use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tower::Service;
use tracing::debug;

use crate::error::AnalysisError;
use crate::pipeline::types::{ModelTensor, ProbabilityVector};

/// A loaded classification model. `predict` must be deterministic for a given tensor and return
/// exactly `output_len()` probabilities in the model's native class order.
pub trait Classifier: Send + Sync {
    fn output_len(&self) -> usize;

    fn predict(&self, tensor: &ModelTensor) -> Result<ProbabilityVector, AnalysisError>;
}

/// Runs the classifier on the blocking pool and checks the shape of what comes back.
#[derive(Clone)]
pub struct InferenceService {
    classifier: Arc<dyn Classifier>,
}

impl InferenceService {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }
}

fn check_output(
    output: ProbabilityVector,
    expected_len: usize,
) -> Result<ProbabilityVector, AnalysisError> {
    if output.len() != expected_len {
        return Err(AnalysisError::Inference(format!(
            "classifier returned {} scores, expected {expected_len}",
            output.len()
        )));
    }
    if !output.is_finite() {
        return Err(AnalysisError::Inference(
            "classifier returned non-finite scores".to_string(),
        ));
    }
    Ok(output)
}

impl Service<ModelTensor> for InferenceService {
    type Response = ProbabilityVector;
    type Error = AnalysisError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, tensor: ModelTensor) -> Self::Future {
        let classifier = self.classifier.clone();

        Box::pin(async move {
            let expected_len = classifier.output_len();
            let output =
                tokio::task::spawn_blocking(move || classifier.predict(&tensor)).await??;
            debug!("Classifier produced {} scores", output.len());
            check_output(output, expected_len)
        })
    }
}
