use std::path::Path;
use std::str::FromStr;

use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::Level;

use crate::error::ConfigError;
use crate::pipeline::types::{HueBand, OodThresholds};

const ENV_PREFIX: &str = "LEAFSCAN";
/// Smallest chart side that still fits margins, titles and labels.
pub const MIN_CHART_SIDE: u32 = 200;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub analysis: AnalysisSettings,
    pub charts: ChartSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub input_width: u32,
    pub input_height: u32,
    pub ood: OodThresholds,
    pub green_band: HueBand,
    pub yellow_band: HueBand,
    /// Number of classifier invocations allowed in flight for one loaded model.
    pub max_concurrent_inferences: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            input_width: 224,
            input_height: 224,
            ood: OodThresholds::default(),
            green_band: HueBand::GREEN,
            yellow_band: HueBand::YELLOW,
            max_concurrent_inferences: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

impl ChartSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub rgb_histogram: ChartSize,
    pub class_distribution: ChartSize,
    pub hsv_analysis: ChartSize,
}

impl ChartSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, size) in [
            ("charts.rgb_histogram", self.rgb_histogram),
            ("charts.class_distribution", self.class_distribution),
            ("charts.hsv_analysis", self.hsv_analysis),
        ] {
            if size.width < MIN_CHART_SIDE || size.height < MIN_CHART_SIDE {
                return Err(invalid(
                    field,
                    &format!("charts must be at least {MIN_CHART_SIDE}x{MIN_CHART_SIDE} pixels"),
                ));
            }
        }
        Ok(())
    }
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            rgb_histogram: ChartSize::new(800, 400),
            class_distribution: ChartSize::new(800, 400),
            hsv_analysis: ChartSize::new(1000, 800),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from an optional file, then `LEAFSCAN__SECTION__KEY` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let analysis = &self.analysis;
        if analysis.input_width == 0 || analysis.input_height == 0 {
            return Err(invalid("analysis.input_width", "input size must be non-zero"));
        }
        if analysis.max_concurrent_inferences == 0 {
            return Err(invalid(
                "analysis.max_concurrent_inferences",
                "at least one inference must be allowed",
            ));
        }
        if !(0.0..=1.0).contains(&analysis.ood.min_confidence) {
            return Err(invalid(
                "analysis.ood.min_confidence",
                "confidence threshold must lie in [0, 1]",
            ));
        }
        if !analysis.ood.max_entropy_bits.is_finite() || analysis.ood.max_entropy_bits < 0.0 {
            return Err(invalid(
                "analysis.ood.max_entropy_bits",
                "entropy threshold must be a non-negative number",
            ));
        }
        validate_band("analysis.green_band", analysis.green_band)?;
        validate_band("analysis.yellow_band", analysis.yellow_band)?;
        self.charts.validate()
    }
}

fn validate_band(field: &'static str, band: HueBand) -> Result<(), ConfigError> {
    if band.min > band.max {
        return Err(invalid(field, "lower hue bound exceeds the upper bound"));
    }
    if band.max > HueBand::HUE_MAX {
        return Err(invalid(field, "hue bounds use the 0-179 range"));
    }
    Ok(())
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

pub fn init_logging(settings: &LoggingSettings) {
    let level = Level::from_str(&settings.level).unwrap_or(Level::INFO);
    // A subscriber may already be installed by the host process.
    let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_fixed_pipeline_constants() {
        let settings = Settings::default();
        assert_eq!(settings.analysis.input_width, 224);
        assert_eq!(settings.analysis.input_height, 224);
        assert_eq!(settings.analysis.ood.min_confidence, 0.5);
        assert_eq!(settings.analysis.ood.max_entropy_bits, 1.0);
        assert_eq!(settings.analysis.green_band, HueBand::new(40, 80));
        assert_eq!(settings.analysis.yellow_band, HueBand::new(20, 40));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn load_reads_partial_file_over_defaults() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{ "analysis": {{ "max_concurrent_inferences": 4 }}, "logging": {{ "level": "debug" }} }}"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.analysis.max_concurrent_inferences, 4);
        assert_eq!(settings.analysis.input_width, 224);
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.charts, ChartSettings::default());
    }

    #[test]
    fn validate_rejects_inverted_band() {
        let mut settings = Settings::default();
        settings.analysis.green_band = HueBand::new(80, 40);
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Invalid {
                field: "analysis.green_band",
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_undersized_chart() {
        let mut settings = Settings::default();
        settings.charts.hsv_analysis = ChartSize::new(20, 20);
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Invalid {
                field: "charts.hsv_analysis",
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut settings = Settings::default();
        settings.analysis.max_concurrent_inferences = 0;
        assert!(settings.validate().is_err());
    }
}
