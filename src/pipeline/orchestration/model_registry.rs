use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Semaphore;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::{ServiceBuilder, ServiceExt};
use tracing::info;

use crate::error::AnalysisError;
use crate::pipeline::services::{ClassMapper, Classifier, InferenceService};
use crate::pipeline::types::{ClassMapping, ModelTensor, ProbabilityVector};

/// A classifier paired with the class mapping that describes its outputs. Validated once on
/// construction and immutable afterwards.
pub struct LoadedModel {
    mapping: ClassMapping,
    mapper: ClassMapper,
    inference: InferenceService,
    permits: Arc<Semaphore>,
}

impl LoadedModel {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        mapping: ClassMapping,
        max_concurrent_inferences: usize,
    ) -> Result<Self, AnalysisError> {
        let model_outputs = classifier.output_len();
        if mapping.class_count() != model_outputs {
            return Err(AnalysisError::ClassCountMismatch {
                declared: mapping.class_count(),
                model_outputs,
            });
        }

        Ok(Self {
            mapper: ClassMapper::new(mapping.index_translation().cloned()),
            mapping,
            inference: InferenceService::new(classifier),
            permits: Arc::new(Semaphore::new(max_concurrent_inferences.max(1))),
        })
    }

    pub fn mapping(&self) -> &ClassMapping {
        &self.mapping
    }

    pub fn mapper(&self) -> &ClassMapper {
        &self.mapper
    }

    /// Runs the classifier, waiting for a permit when the concurrency limit is reached.
    pub async fn infer(&self, tensor: ModelTensor) -> Result<ProbabilityVector, AnalysisError> {
        ServiceBuilder::new()
            .layer(GlobalConcurrencyLimitLayer::with_semaphore(self.permits.clone()))
            .service(self.inference.clone())
            .oneshot(tensor)
            .await
    }
}

/// Holds the currently loaded model. Replacing it swaps the reference; analyses already running
/// keep the model they started with.
#[derive(Default)]
pub struct ModelRegistry {
    current: RwLock<Option<Arc<LoadedModel>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, model: LoadedModel) -> Arc<LoadedModel> {
        let model = Arc::new(model);
        info!(
            "Loaded {} model with classes {:?}",
            model.mapping().plant_type(),
            model.mapping().display_names()
        );
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(model.clone());
        model
    }

    /// Validates and installs in one step; on failure the previous model stays in place.
    pub fn load(
        &self,
        classifier: Arc<dyn Classifier>,
        mapping: ClassMapping,
        max_concurrent_inferences: usize,
    ) -> Result<Arc<LoadedModel>, AnalysisError> {
        let model = LoadedModel::new(classifier, mapping, max_concurrent_inferences)?;
        Ok(self.install(model))
    }

    pub fn clear(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn current(&self) -> Result<Arc<LoadedModel>, AnalysisError> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(AnalysisError::NotConfigured)
    }

    pub fn is_ready(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::services::inference_service::testing::FixedClassifier;

    fn names(names: &[&str]) -> ClassMapping {
        ClassMapping::new(names.iter().map(|n| n.to_string()).collect()).unwrap()
    }

    #[test]
    fn empty_registry_is_not_configured() {
        let registry = ModelRegistry::new();
        assert!(!registry.is_ready());
        assert!(matches!(registry.current(), Err(AnalysisError::NotConfigured)));
    }

    #[test]
    fn mismatched_class_count_fails_at_load_time() {
        let registry = ModelRegistry::new();
        let classifier = Arc::new(FixedClassifier::new(vec![0.2, 0.3, 0.5]));
        let err = registry
            .load(classifier.clone(), names(&["A", "B", "C", "D"]), 1)
            .err()
            .unwrap();
        assert_eq!(
            err,
            AnalysisError::ClassCountMismatch {
                declared: 4,
                model_outputs: 3
            }
        );
        assert!(err.is_configuration_error());
        assert!(!registry.is_ready());
        assert_eq!(classifier.calls(), 0);
    }

    #[test]
    fn failed_reload_keeps_previous_model() {
        let registry = ModelRegistry::new();
        registry
            .load(Arc::new(FixedClassifier::new(vec![1.0, 0.0])), names(&["A", "B"]), 1)
            .unwrap();
        assert!(registry
            .load(Arc::new(FixedClassifier::new(vec![1.0])), names(&["A", "B"]), 1)
            .is_err());
        assert_eq!(registry.current().unwrap().mapping().display_names(), &["A", "B"]);
    }

    #[test]
    fn install_swaps_without_touching_held_snapshot() {
        let registry = ModelRegistry::new();
        registry
            .load(Arc::new(FixedClassifier::new(vec![1.0, 0.0])), names(&["A", "B"]), 1)
            .unwrap();
        let held = registry.current().unwrap();

        registry
            .load(Arc::new(FixedClassifier::new(vec![1.0])), names(&["Only"]), 1)
            .unwrap();
        assert_eq!(held.mapping().class_count(), 2);
        assert_eq!(registry.current().unwrap().mapping().class_count(), 1);

        registry.clear();
        assert!(!registry.is_ready());
        assert_eq!(held.mapping().class_count(), 2);
    }
}
