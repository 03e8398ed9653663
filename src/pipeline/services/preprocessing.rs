use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use image::imageops::{self, FilterType};
use ndarray::Array4;
use tower::Service;
use tracing::debug;

use crate::error::AnalysisError;
use crate::pipeline::types::{ModelTensor, RawImage};

/// Resizes an image straight to the model input size (no crop, aspect ratio not kept) and scales
/// channels to [0, 1].
#[derive(Debug, Clone)]
pub struct PreprocessingService {
    width: u32,
    height: u32,
}

impl PreprocessingService {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn preprocess(&self, image: &RawImage) -> Result<ModelTensor, AnalysisError> {
        let resized = if image.width() == self.width && image.height() == self.height {
            image.pixels().clone()
        } else {
            imageops::resize(image.pixels(), self.width, self.height, FilterType::Triangle)
        };

        let scaled: Vec<f32> = resized
            .into_raw()
            .into_iter()
            .map(|v| v as f32 / 255.0)
            .collect();
        let data = Array4::from_shape_vec(
            (1, self.height as usize, self.width as usize, 3),
            scaled,
        )
        .map_err(|e| AnalysisError::InvalidImage(format!("cannot shape model input: {e}")))?;

        debug!(
            "Preprocessed {}x{} image into {:?}",
            image.width(),
            image.height(),
            data.dim()
        );
        Ok(ModelTensor::new(data))
    }
}

impl Default for PreprocessingService {
    fn default() -> Self {
        Self::new(224, 224)
    }
}

impl Service<Arc<RawImage>> for PreprocessingService {
    type Response = ModelTensor;
    type Error = AnalysisError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, image: Arc<RawImage>) -> Self::Future {
        let result = self.preprocess(&image);
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use rand::Rng;
    use tower::ServiceExt;

    fn solid(width: u32, height: u32, px: [u8; 3]) -> RawImage {
        RawImage::from_rgb(ImageBuffer::from_pixel(width, height, Rgb(px))).unwrap()
    }

    #[test]
    fn output_shape_is_fixed_for_any_input_size() {
        let service = PreprocessingService::default();
        let mut rng = rand::rng();
        for _ in 0..20 {
            let width = rng.random_range(1..=400);
            let height = rng.random_range(1..=400);
            let px = [rng.random(), rng.random(), rng.random()];
            let tensor = service.preprocess(&solid(width, height, px)).unwrap();
            assert_eq!(tensor.shape(), (1, 224, 224, 3));
            assert!(tensor.data().iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn channels_are_divided_by_255() {
        let service = PreprocessingService::default();
        let tensor = service.preprocess(&solid(224, 224, [255, 0, 51])).unwrap();
        let data = tensor.data();
        assert_eq!(data[[0, 10, 10, 0]], 1.0);
        assert_eq!(data[[0, 10, 10, 1]], 0.0);
        assert!((data[[0, 10, 10, 2]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn extreme_aspect_ratio_is_stretched() {
        let service = PreprocessingService::new(8, 8);
        let tensor = service.preprocess(&solid(1, 500, [0, 255, 0])).unwrap();
        assert_eq!(tensor.shape(), (1, 8, 8, 3));
        assert!((tensor.data()[[0, 7, 7, 1]] - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn service_call_produces_tensor() {
        let tensor = PreprocessingService::default()
            .oneshot(Arc::new(solid(50, 30, [10, 20, 30])))
            .await
            .unwrap();
        assert_eq!(tensor.shape(), (1, 224, 224, 3));
    }
}
