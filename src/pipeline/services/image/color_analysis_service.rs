use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tower::Service;

use crate::error::AnalysisError;
use crate::pipeline::services::image::hsv::HsvImage;
use crate::pipeline::types::{ColorMetrics, HueBand, RawImage};

/// Share of the picture whose hue reads as green or yellow. Independent of the classifier.
#[derive(Debug, Clone, Copy)]
pub struct ColorAnalysisService {
    green_band: HueBand,
    yellow_band: HueBand,
}

impl ColorAnalysisService {
    pub fn new(green_band: HueBand, yellow_band: HueBand) -> Self {
        Self {
            green_band,
            yellow_band,
        }
    }

    pub fn analyze(&self, image: &RawImage) -> ColorMetrics {
        self.analyze_hsv(&HsvImage::from_rgb(image.pixels()))
    }

    pub fn analyze_hsv(&self, hsv: &HsvImage) -> ColorMetrics {
        let total = hsv.hue().len();
        if total == 0 {
            return ColorMetrics {
                percent_green: 0.0,
                percent_yellow: 0.0,
            };
        }

        let percent = |count: usize| (count as f64 / total as f64 * 100.0) as f32;
        ColorMetrics {
            percent_green: percent(hsv.count_in_band(self.green_band)),
            percent_yellow: percent(hsv.count_in_band(self.yellow_band)),
        }
    }
}

impl Default for ColorAnalysisService {
    fn default() -> Self {
        Self::new(HueBand::GREEN, HueBand::YELLOW)
    }
}

impl Service<Arc<RawImage>> for ColorAnalysisService {
    type Response = ColorMetrics;
    type Error = AnalysisError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), AnalysisError>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, image: Arc<RawImage>) -> Self::Future {
        let metrics = self.analyze(&image);

        Box::pin(async move { Ok(metrics) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, RgbImage};
    use tower::ServiceExt;

    fn solid(px: [u8; 3]) -> RawImage {
        RawImage::from_rgb(ImageBuffer::from_pixel(32, 24, Rgb(px))).unwrap()
    }

    #[test]
    fn pure_green_is_fully_green() {
        let metrics = ColorAnalysisService::default().analyze(&solid([0, 255, 0]));
        assert_eq!(metrics.percent_green, 100.0);
        assert_eq!(metrics.percent_yellow, 0.0);
    }

    #[test]
    fn pure_red_is_neither_green_nor_yellow() {
        let metrics = ColorAnalysisService::default().analyze(&solid([255, 0, 0]));
        assert_eq!(metrics.percent_green, 0.0);
        assert_eq!(metrics.percent_yellow, 0.0);
    }

    #[test]
    fn pure_yellow_is_fully_yellow() {
        let metrics = ColorAnalysisService::default().analyze(&solid([255, 255, 0]));
        assert_eq!(metrics.percent_green, 0.0);
        assert_eq!(metrics.percent_yellow, 100.0);
    }

    #[test]
    fn hue_forty_counts_in_both_bands() {
        // (170, 255, 0) sits at 80 degrees, hue 40 on the halved scale.
        let metrics = ColorAnalysisService::default().analyze(&solid([170, 255, 0]));
        assert_eq!(metrics.percent_green, 100.0);
        assert_eq!(metrics.percent_yellow, 100.0);
    }

    #[test]
    fn percentages_follow_pixel_area() {
        let mut pixels: RgbImage = ImageBuffer::from_pixel(10, 10, Rgb([255, 0, 0]));
        for x in 0..10 {
            for y in 0..3 {
                pixels.put_pixel(x, y, Rgb([0, 200, 0]));
            }
        }
        pixels.put_pixel(0, 9, Rgb([255, 255, 0]));
        let metrics = ColorAnalysisService::default().analyze(&RawImage::from_rgb(pixels).unwrap());
        assert!((metrics.percent_green - 30.0).abs() < 1e-4);
        assert!((metrics.percent_yellow - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn service_call_returns_metrics() {
        let metrics = ColorAnalysisService::default()
            .oneshot(Arc::new(solid([0, 255, 0])))
            .await
            .unwrap();
        assert_eq!(metrics.percent_green, 100.0);
    }
}
