use image::{DynamicImage, RgbImage};

use crate::error::AnalysisError;

/// Decoded 8-bit RGB photograph, owned by the analysis that received it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    pixels: RgbImage,
}

impl RawImage {
    /// Decodes any format the `image` crate recognizes and converts it to 3-channel RGB.
    pub fn decode(bytes: &[u8]) -> Result<Self, AnalysisError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| AnalysisError::InvalidImage(e.to_string()))?;
        Self::from_dynamic(image)
    }

    pub fn from_dynamic(image: DynamicImage) -> Result<Self, AnalysisError> {
        Self::from_rgb(image.into_rgb8())
    }

    pub fn from_rgb(pixels: RgbImage) -> Result<Self, AnalysisError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(AnalysisError::InvalidImage(format!(
                "image has zero dimension ({}x{})",
                pixels.width(),
                pixels.height()
            )));
        }
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.width() as usize * self.pixels.height() as usize
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }
}
