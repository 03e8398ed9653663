pub mod color_analysis_service;
pub mod hsv;

pub use color_analysis_service::ColorAnalysisService;
pub use hsv::{rgb_to_hsv, HsvImage};
