pub mod class_mapper;
pub mod image;
pub mod inference_service;
pub mod ood_detector;
pub mod preprocessing;
pub mod visualization;

pub use class_mapper::ClassMapper;
pub use self::image::ColorAnalysisService;
pub use inference_service::{Classifier, InferenceService};
pub use ood_detector::OodDetector;
pub use preprocessing::PreprocessingService;
pub use visualization::{ChartKind, ChartRenderer, ChartSet, EncodedChart};
