pub mod canvas;
pub mod colormap;
pub mod distribution;
pub mod histogram;
pub mod hsv_panels;

use base64::Engine as _;
use image::RgbImage;
use serde::Serialize;
use tracing::debug;

use crate::config::ChartSettings;
use crate::error::{AnalysisError, ConfigError};
use crate::pipeline::services::image::HsvImage;
use crate::pipeline::types::{ClassPalette, ColorMetrics, HueBand, ProbabilityVector, RawImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    RgbHistogram,
    ClassDistribution,
    HsvAnalysis,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [
        ChartKind::RgbHistogram,
        ChartKind::ClassDistribution,
        ChartKind::HsvAnalysis,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::RgbHistogram => "rgb_histogram",
            ChartKind::ClassDistribution => "class_distribution",
            ChartKind::HsvAnalysis => "hsv_analysis",
        }
    }
}

/// Base64 PNG payload, ready for a `data:image/png;base64,` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EncodedChart(String);

impl EncodedChart {
    pub fn encode(canvas: &RgbImage) -> Result<Self, AnalysisError> {
        canvas::encode_png_base64(canvas).map(Self)
    }

    pub fn as_base64(&self) -> &str {
        &self.0
    }

    pub fn decode(&self) -> Result<RgbImage, AnalysisError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&self.0)
            .map_err(|e| AnalysisError::Render(e.to_string()))?;
        let image = image::load_from_memory_with_format(&bytes, image::ImageFormat::Png)
            .map_err(|e| AnalysisError::Render(e.to_string()))?;
        Ok(image.into_rgb8())
    }
}

/// Exactly one chart of each kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSet {
    rgb_histogram: EncodedChart,
    class_distribution: EncodedChart,
    hsv_analysis: EncodedChart,
}

impl ChartSet {
    pub fn get(&self, kind: ChartKind) -> &EncodedChart {
        match kind {
            ChartKind::RgbHistogram => &self.rgb_histogram,
            ChartKind::ClassDistribution => &self.class_distribution,
            ChartKind::HsvAnalysis => &self.hsv_analysis,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChartKind, &EncodedChart)> {
        ChartKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}

pub struct ChartInputs<'a> {
    pub image: &'a RawImage,
    pub hsv: &'a HsvImage,
    pub probabilities: &'a ProbabilityVector,
    pub class_names: &'a [String],
    pub palette: &'a ClassPalette,
    pub color: &'a ColorMetrics,
}

/// Draws the diagnostic charts. Stateless: identical inputs give byte-identical payloads.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    settings: ChartSettings,
    green_band: HueBand,
}

impl ChartRenderer {
    pub fn new(settings: ChartSettings, green_band: HueBand) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            settings,
            green_band,
        })
    }

    pub fn settings(&self) -> &ChartSettings {
        &self.settings
    }

    pub fn render(&self, inputs: ChartInputs<'_>) -> Result<ChartSet, AnalysisError> {
        if inputs.probabilities.is_empty() {
            return Err(AnalysisError::Render(
                "class distribution needs at least one class".to_string(),
            ));
        }
        if inputs.class_names.len() != inputs.probabilities.len() {
            return Err(AnalysisError::Render(format!(
                "{} class names for {} probabilities",
                inputs.class_names.len(),
                inputs.probabilities.len()
            )));
        }

        let font = canvas::chart_font()?;
        let rgb_histogram =
            histogram::render(inputs.image.pixels(), &font, self.settings.rgb_histogram);
        let class_distribution = distribution::render(
            inputs.probabilities,
            inputs.class_names,
            inputs.palette,
            &font,
            self.settings.class_distribution,
        );
        let hsv_analysis = hsv_panels::render(
            inputs.hsv,
            self.green_band,
            inputs.color,
            &font,
            self.settings.hsv_analysis,
        );
        debug!(
            "Rendered charts for {} classes",
            inputs.probabilities.len()
        );

        Ok(ChartSet {
            rgb_histogram: EncodedChart::encode(&rgb_histogram)?,
            class_distribution: EncodedChart::encode(&class_distribution)?,
            hsv_analysis: EncodedChart::encode(&hsv_analysis)?,
        })
    }
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self {
            settings: ChartSettings::default(),
            green_band: HueBand::GREEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::services::image::ColorAnalysisService;
    use crate::config::ChartSize;
    use image::{ImageBuffer, Rgb};

    fn class_names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Class {i}")).collect()
    }

    fn render_for(image: &RawImage, probabilities: &ProbabilityVector) -> ChartSet {
        let hsv = HsvImage::from_rgb(image.pixels());
        let color = ColorAnalysisService::default().analyze_hsv(&hsv);
        ChartRenderer::default()
            .render(ChartInputs {
                image,
                hsv: &hsv,
                probabilities,
                class_names: &class_names(probabilities.len()),
                palette: &ClassPalette::default(),
                color: &color,
            })
            .unwrap()
    }

    fn leaf() -> RawImage {
        let mut pixels = ImageBuffer::from_pixel(64, 48, Rgb([40, 160, 60]));
        for x in 0..64 {
            pixels.put_pixel(x, 0, Rgb([200, 180, 20]));
        }
        RawImage::from_rgb(pixels).unwrap()
    }

    #[test]
    fn always_three_charts_regardless_of_class_count() {
        let image = leaf();
        for n in [1usize, 2, 3, 7, 40] {
            let charts = render_for(&image, &ProbabilityVector::uniform(n));
            let kinds: Vec<_> = charts.iter().map(|(kind, _)| kind.name()).collect();
            assert_eq!(kinds, vec!["rgb_histogram", "class_distribution", "hsv_analysis"]);
            for (_, chart) in charts.iter() {
                assert!(!chart.as_base64().is_empty());
            }
        }
    }

    #[test]
    fn rendering_is_repeatable() {
        let image = leaf();
        let probabilities = ProbabilityVector::new(vec![0.7, 0.2, 0.1]);
        assert_eq!(
            render_for(&image, &probabilities),
            render_for(&image, &probabilities)
        );
    }

    #[test]
    fn payloads_decode_to_configured_sizes() {
        let charts = render_for(&leaf(), &ProbabilityVector::new(vec![0.7, 0.2, 0.1]));
        let settings = ChartSettings::default();
        for (kind, size) in [
            (ChartKind::RgbHistogram, settings.rgb_histogram),
            (ChartKind::ClassDistribution, settings.class_distribution),
            (ChartKind::HsvAnalysis, settings.hsv_analysis),
        ] {
            let decoded = charts.get(kind).decode().unwrap();
            assert_eq!(decoded.dimensions(), (size.width, size.height));
        }
    }

    #[test]
    fn serializes_with_chart_names() {
        let charts = render_for(&leaf(), &ProbabilityVector::new(vec![1.0]));
        let json = serde_json::to_value(&charts).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 3);
        for kind in ChartKind::ALL {
            assert!(object[kind.name()].is_string());
        }
    }

    #[test]
    fn empty_probabilities_are_rejected() {
        let image = leaf();
        let hsv = HsvImage::from_rgb(image.pixels());
        let color = ColorAnalysisService::default().analyze_hsv(&hsv);
        let result = ChartRenderer::default().render(ChartInputs {
            image: &image,
            hsv: &hsv,
            probabilities: &ProbabilityVector::new(vec![]),
            class_names: &[],
            palette: &ClassPalette::default(),
            color: &color,
        });
        assert!(matches!(result, Err(AnalysisError::Render(_))));
    }

    #[test]
    fn name_count_must_match_probabilities() {
        let image = leaf();
        let hsv = HsvImage::from_rgb(image.pixels());
        let color = ColorAnalysisService::default().analyze_hsv(&hsv);
        let result = ChartRenderer::default().render(ChartInputs {
            image: &image,
            hsv: &hsv,
            probabilities: &ProbabilityVector::new(vec![0.5, 0.5]),
            class_names: &class_names(3),
            palette: &ClassPalette::default(),
            color: &color,
        });
        assert!(matches!(result, Err(AnalysisError::Render(_))));
    }

    #[test]
    fn undersized_charts_are_rejected_on_construction() {
        for size in [ChartSize::new(20, 20), ChartSize::new(800, 150)] {
            let settings = ChartSettings {
                hsv_analysis: size,
                ..ChartSettings::default()
            };
            assert!(matches!(
                ChartRenderer::new(settings, HueBand::GREEN),
                Err(ConfigError::Invalid {
                    field: "charts.hsv_analysis",
                    ..
                })
            ));
        }
    }

    #[test]
    fn minimum_sized_charts_render() {
        let side = crate::config::MIN_CHART_SIDE;
        let size = ChartSize::new(side, side);
        let renderer = ChartRenderer::new(
            ChartSettings {
                rgb_histogram: size,
                class_distribution: size,
                hsv_analysis: size,
            },
            HueBand::GREEN,
        )
        .unwrap();

        let image = leaf();
        let hsv = HsvImage::from_rgb(image.pixels());
        let color = ColorAnalysisService::default().analyze_hsv(&hsv);
        let charts = renderer
            .render(ChartInputs {
                image: &image,
                hsv: &hsv,
                probabilities: &ProbabilityVector::uniform(12),
                class_names: &class_names(12),
                palette: &ClassPalette::default(),
                color: &color,
            })
            .unwrap();
        for (_, chart) in charts.iter() {
            assert_eq!(chart.decode().unwrap().dimensions(), (side, side));
        }
    }
}
