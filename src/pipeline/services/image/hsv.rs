use image::{Rgb, RgbImage};

use crate::pipeline::types::HueBand;

/// Converts one RGB pixel to 8-bit HSV: hue in 0..180 (degrees halved), saturation and value
/// in 0..=255. Rounding is exact rather than table-based, so a hue near a band edge
/// may differ by one step from fixed-point converters.
pub fn rgb_to_hsv(px: &Rgb<u8>) -> [u8; 3] {
    let [r, g, b] = px.0.map(f32::from);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let saturation = if max > 0.0 { delta * 255.0 / max } else { 0.0 };

    let mut hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if hue < 0.0 {
        hue += 360.0;
    }

    let hue = ((hue / 2.0).round() as u16 % 180) as u8;
    [hue, saturation.round() as u8, max as u8]
}

/// Planar HSV copy of an image.
#[derive(Debug, Clone, PartialEq)]
pub struct HsvImage {
    width: u32,
    height: u32,
    hue: Vec<u8>,
    saturation: Vec<u8>,
    value: Vec<u8>,
}

impl HsvImage {
    pub fn from_rgb(image: &RgbImage) -> Self {
        let len = image.width() as usize * image.height() as usize;
        let mut hue = Vec::with_capacity(len);
        let mut saturation = Vec::with_capacity(len);
        let mut value = Vec::with_capacity(len);

        for px in image.pixels() {
            let [h, s, v] = rgb_to_hsv(px);
            hue.push(h);
            saturation.push(s);
            value.push(v);
        }

        Self {
            width: image.width(),
            height: image.height(),
            hue,
            saturation,
            value,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn hue(&self) -> &[u8] {
        &self.hue
    }

    pub fn saturation(&self) -> &[u8] {
        &self.saturation
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// 255 where the hue falls inside `band`, 0 elsewhere.
    pub fn band_mask(&self, band: HueBand) -> Vec<u8> {
        self.hue
            .iter()
            .map(|&h| if band.contains(h) { 255 } else { 0 })
            .collect()
    }

    pub fn count_in_band(&self, band: HueBand) -> usize {
        self.hue.iter().filter(|&&h| band.contains(h)).count()
    }
}
