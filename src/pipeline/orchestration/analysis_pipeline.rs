use std::sync::Arc;
use std::time::Instant;

use futures::future::try_join;
use tower::ServiceExt;
use tracing::{debug, field, info, instrument, Span};

use crate::config::Settings;
use crate::error::{AnalysisError, ConfigError};
use crate::pipeline::context::{AnalysisContext, Stage};
use crate::pipeline::orchestration::model_registry::{LoadedModel, ModelRegistry};
use crate::pipeline::services::image::HsvImage;
use crate::pipeline::services::visualization::ChartInputs;
use crate::pipeline::services::{
    ChartRenderer, Classifier, ColorAnalysisService, OodDetector, PreprocessingService,
};
use crate::pipeline::types::{
    AnalysisParts, AnalysisResult, ClassMapping, ColorMetrics, ImageReference, OodVerdict,
    RawImage,
};

/// Runs one image through preprocessing, classification, color analysis and chart rendering,
/// then assembles the result. Holds no per-request state, so a single instance serves
/// concurrent callers.
pub struct AnalysisPipeline {
    registry: Arc<ModelRegistry>,
    preprocessing: PreprocessingService,
    color_analysis: ColorAnalysisService,
    ood: OodDetector,
    renderer: ChartRenderer,
    max_concurrent_inferences: usize,
}

impl AnalysisPipeline {
    pub fn builder() -> AnalysisPipelineBuilder {
        AnalysisPipelineBuilder::default()
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Validates the pair against each other and makes it the model used by later analyses.
    pub fn load_model(
        &self,
        classifier: Arc<dyn Classifier>,
        mapping: ClassMapping,
    ) -> Result<Arc<LoadedModel>, AnalysisError> {
        self.registry
            .load(classifier, mapping, self.max_concurrent_inferences)
    }

    /// Preprocesses and classifies an image for its out-of-distribution verdict alone, without
    /// color analysis or charts.
    pub async fn assess_ood(&self, image: RawImage) -> Result<OodVerdict, AnalysisError> {
        let model = self.registry.current()?;
        let tensor = self.preprocessing.clone().oneshot(Arc::new(image)).await?;
        let native = model.infer(tensor).await?;
        Ok(self.ood.assess(&native))
    }

    pub async fn analyze_bytes(
        &self,
        bytes: &[u8],
        image_ref: ImageReference,
    ) -> Result<AnalysisResult, AnalysisError> {
        // Readiness first: an unconfigured service reports that rather than image problems.
        self.registry.current()?;
        let image = RawImage::decode(bytes)?;
        self.analyze(image, image_ref).await
    }

    #[instrument(
        skip(self, image, image_ref),
        fields(image_ref = image_ref.as_str(), analysis_id = field::Empty)
    )]
    pub async fn analyze(
        &self,
        image: RawImage,
        image_ref: ImageReference,
    ) -> Result<AnalysisResult, AnalysisError> {
        // Snapshot the model so a concurrent reload cannot change it mid-analysis.
        let model = self.registry.current()?;
        let mut ctx = AnalysisContext::new(image);
        Span::current().record("analysis_id", field::display(ctx.id()));

        let started = Instant::now();
        let tensor = self
            .preprocessing
            .clone()
            .oneshot(ctx.image().clone())
            .await?;
        ctx.record(Stage::Preprocess, started.elapsed());

        let inference = async {
            let started = Instant::now();
            let native = model.infer(tensor).await?;
            Ok::<_, AnalysisError>((native, started.elapsed()))
        };
        let color = {
            let image = ctx.image().clone();
            let service = self.color_analysis.clone();
            async move {
                let started = Instant::now();
                let (hsv, metrics) = tokio::task::spawn_blocking(move || {
                    let hsv = HsvImage::from_rgb(image.pixels());
                    let metrics = service.analyze_hsv(&hsv);
                    (hsv, metrics)
                })
                .await?;
                Ok::<_, AnalysisError>((hsv, metrics, started.elapsed()))
            }
        };
        let ((native, inference_time), (hsv, metrics, color_time)) =
            try_join(inference, color).await?;
        ctx.record(Stage::Inference, inference_time);
        ctx.record(Stage::ColorAnalysis, color_time);
        let ctx = ctx.into_inferred(native, metrics);

        let started = Instant::now();
        let verdict = self.ood.assess(ctx.native());
        let canonical = model.mapper().remap(ctx.native());
        let mut ctx = ctx.into_scored(canonical, verdict);
        ctx.record(Stage::Scoring, started.elapsed());

        let started = Instant::now();
        let charts = {
            let renderer = self.renderer.clone();
            let image = ctx.image().clone();
            let probabilities = ctx.canonical().clone();
            let palette = model.mapping().palette().clone();
            let class_names = model.mapping().display_names().to_vec();
            let color: ColorMetrics = *ctx.color();
            tokio::task::spawn_blocking(move || {
                renderer.render(ChartInputs {
                    image: &image,
                    hsv: &hsv,
                    probabilities: &probabilities,
                    class_names: &class_names,
                    palette: &palette,
                    color: &color,
                })
            })
            .await??
        };
        ctx.record(Stage::Rendering, started.elapsed());
        debug!("Stage timings: {:?}", ctx.metrics());

        let (predicted_index, confidence) = ctx
            .canonical()
            .argmax()
            .ok_or_else(|| AnalysisError::Inference("classifier produced no scores".to_string()))?;
        let class_name = model
            .mapping()
            .display_name(predicted_index)
            .ok_or_else(|| {
                AnalysisError::Inference(format!("no display name for class {predicted_index}"))
            })?
            .to_string();

        info!(
            "Classified as {} ({:.1}%) in {:?}: green {:.1}%, yellow {:.1}%, ood {}",
            class_name,
            confidence * 100.0,
            ctx.elapsed(),
            ctx.color().percent_green,
            ctx.color().percent_yellow,
            ctx.verdict().is_ood
        );

        Ok(AnalysisResult::new(AnalysisParts {
            id: ctx.id(),
            plant_type: model.mapping().plant_type().to_string(),
            class_name,
            predicted_index,
            confidence,
            probabilities: ctx.canonical().clone(),
            ood: *ctx.verdict(),
            color: *ctx.color(),
            charts,
            image_ref,
        }))
    }
}

#[derive(Default)]
pub struct AnalysisPipelineBuilder {
    settings: Settings,
    registry: Option<Arc<ModelRegistry>>,
}

impl AnalysisPipelineBuilder {
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn registry(mut self, registry: Arc<ModelRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<AnalysisPipeline, ConfigError> {
        self.settings.validate()?;
        let analysis = &self.settings.analysis;

        Ok(AnalysisPipeline {
            registry: self.registry.unwrap_or_default(),
            preprocessing: PreprocessingService::new(analysis.input_width, analysis.input_height),
            color_analysis: ColorAnalysisService::new(analysis.green_band, analysis.yellow_band),
            ood: OodDetector::new(analysis.ood),
            renderer: ChartRenderer::new(self.settings.charts.clone(), analysis.green_band)?,
            max_concurrent_inferences: analysis.max_concurrent_inferences,
        })
    }
}
