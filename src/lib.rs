pub mod config;
pub mod error;
pub mod pipeline;

pub use config::{init_logging, Settings};
pub use error::{AnalysisError, AppError, ConfigError, ErrorKind, ErrorReport};

pub use pipeline::{AnalysisPipeline, AnalysisResult, ClassMapping, Classifier, ModelRegistry};
