use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::pipeline::services::visualization::ChartSet;
use crate::pipeline::types::{CareRecommendation, ColorMetrics, OodVerdict, ProbabilityVector};

/// Caller-owned reference to where the analyzed image was stored for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImageReference(String);

impl ImageReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Everything produced for one analyzed image. Never mutated after construction.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    id: Uuid,
    analyzed_at: DateTime<Utc>,
    plant_type: String,
    class_name: String,
    predicted_index: usize,
    confidence: f32,
    probabilities: ProbabilityVector,
    ood: OodVerdict,
    color: ColorMetrics,
    recommendation: CareRecommendation,
    charts: ChartSet,
    image_ref: ImageReference,
}

pub(crate) struct AnalysisParts {
    pub id: Uuid,
    pub plant_type: String,
    pub class_name: String,
    pub predicted_index: usize,
    pub confidence: f32,
    pub probabilities: ProbabilityVector,
    pub ood: OodVerdict,
    pub color: ColorMetrics,
    pub charts: ChartSet,
    pub image_ref: ImageReference,
}

impl AnalysisResult {
    pub(crate) fn new(parts: AnalysisParts) -> Self {
        Self {
            id: parts.id,
            analyzed_at: Utc::now(),
            plant_type: parts.plant_type,
            class_name: parts.class_name,
            predicted_index: parts.predicted_index,
            confidence: parts.confidence,
            probabilities: parts.probabilities,
            ood: parts.ood,
            recommendation: CareRecommendation::from_metrics(&parts.color),
            color: parts.color,
            charts: parts.charts,
            image_ref: parts.image_ref,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn analyzed_at(&self) -> DateTime<Utc> {
        self.analyzed_at
    }

    pub fn plant_type(&self) -> &str {
        &self.plant_type
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn predicted_index(&self) -> usize {
        self.predicted_index
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn probabilities(&self) -> &ProbabilityVector {
        &self.probabilities
    }

    pub fn ood(&self) -> &OodVerdict {
        &self.ood
    }

    pub fn color(&self) -> &ColorMetrics {
        &self.color
    }

    pub fn recommendation(&self) -> CareRecommendation {
        self.recommendation
    }

    pub fn advice(&self) -> String {
        self.recommendation.advice(&self.plant_type)
    }

    pub fn charts(&self) -> &ChartSet {
        &self.charts
    }

    pub fn image_ref(&self) -> &ImageReference {
        &self.image_ref
    }
}
