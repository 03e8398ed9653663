mod analysis_result;
mod class_mapping;
mod color_metrics;
mod model_tensor;
mod ood_verdict;
mod probability_vector;
mod raw_image;

pub(crate) use analysis_result::AnalysisParts;
pub use analysis_result::{AnalysisResult, ImageReference};
pub use class_mapping::{parse_hex_color, ClassMapping, ClassPalette, IndexTranslation};
pub use color_metrics::{CareRecommendation, ColorMetrics, HueBand};
pub use model_tensor::ModelTensor;
pub use ood_verdict::{OodThresholds, OodVerdict};
pub use probability_vector::ProbabilityVector;
pub use raw_image::RawImage;
