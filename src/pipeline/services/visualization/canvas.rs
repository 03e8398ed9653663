use std::io::Cursor;

use ab_glyph::{FontRef, PxScale};
use base64::Engine as _;
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut, text_size,
};
use imageproc::rect::Rect;

use crate::config::ChartSize;
use crate::error::AnalysisError;

pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
pub const AXIS: Rgb<u8> = Rgb([0, 0, 0]);
pub const GRID: Rgb<u8> = Rgb([225, 225, 225]);
pub const TEXT: Rgb<u8> = Rgb([40, 40, 40]);

pub const TITLE_SCALE: f32 = 18.0;
pub const LABEL_SCALE: f32 = 13.0;
pub const TITLE_BAND: u32 = 32;

const MARGIN_LEFT: u32 = 60;
const MARGIN_RIGHT: u32 = 20;
const MARGIN_TOP: u32 = TITLE_BAND + 4;
const MARGIN_BOTTOM: u32 = 40;

static FONT_DATA: &[u8] = include_bytes!("../../../../fonts/DejaVuSans.ttf");

pub fn chart_font() -> Result<FontRef<'static>, AnalysisError> {
    FontRef::try_from_slice(FONT_DATA).map_err(|e| AnalysisError::Render(e.to_string()))
}

/// Pixel rectangle that data coordinates are mapped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotArea {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl PlotArea {
    pub fn within(size: ChartSize) -> Self {
        Self {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            width: size
                .width
                .saturating_sub(MARGIN_LEFT + MARGIN_RIGHT)
                .max(1),
            height: size
                .height
                .saturating_sub(MARGIN_TOP + MARGIN_BOTTOM)
                .max(1),
        }
    }

    pub fn right(&self) -> u32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }

    /// Maps `fraction` of the plot height (0 = bottom) to a y pixel.
    pub fn y_at(&self, fraction: f32) -> f32 {
        self.bottom() as f32 - fraction.clamp(0.0, 1.0) * self.height as f32
    }

    /// Maps `fraction` of the plot width (0 = left) to an x pixel.
    pub fn x_at(&self, fraction: f32) -> f32 {
        self.left as f32 + fraction.clamp(0.0, 1.0) * self.width as f32
    }
}

pub fn blank(size: ChartSize) -> RgbImage {
    RgbImage::from_pixel(size.width, size.height, BACKGROUND)
}

/// Horizontal grid lines at every `step` of the plot height.
pub fn draw_horizontal_grid(canvas: &mut RgbImage, area: PlotArea, step: f32) {
    let mut fraction = step;
    while fraction < 1.0 - f32::EPSILON {
        let y = area.y_at(fraction);
        draw_line_segment_mut(canvas, (area.left as f32, y), (area.right() as f32, y), GRID);
        fraction += step;
    }
}

pub fn draw_vertical_grid(canvas: &mut RgbImage, area: PlotArea, step: f32) {
    let mut fraction = step;
    while fraction < 1.0 - f32::EPSILON {
        let x = area.x_at(fraction);
        draw_line_segment_mut(canvas, (x, area.top as f32), (x, area.bottom() as f32), GRID);
        fraction += step;
    }
}

pub fn draw_frame(canvas: &mut RgbImage, area: PlotArea) {
    draw_hollow_rect_mut(
        canvas,
        Rect::at(area.left as i32, area.top as i32).of_size(area.width + 1, area.height + 1),
        AXIS,
    );
}

/// Filled rectangle, skipped when it would be empty.
pub fn fill_rect(canvas: &mut RgbImage, x: i32, y: i32, width: u32, height: u32, color: Rgb<u8>) {
    if width == 0 || height == 0 {
        return;
    }
    draw_filled_rect_mut(canvas, Rect::at(x, y).of_size(width, height), color);
}

/// Draws `text` horizontally centered on `center_x`, cut short so it never exceeds `max_width`.
pub fn draw_centered_text(
    canvas: &mut RgbImage,
    font: &FontRef<'_>,
    text: &str,
    center_x: i32,
    top: i32,
    scale: f32,
    max_width: u32,
) {
    let scale = PxScale::from(scale);
    let mut shown: String = text.to_string();
    let mut width = text_size(scale, font, &shown).0;
    while width > max_width && !shown.is_empty() {
        shown.pop();
        width = text_size(scale, font, &format!("{shown}..")).0;
    }
    if shown.len() < text.len() {
        if shown.is_empty() {
            return;
        }
        shown.push_str("..");
    }
    draw_text_mut(canvas, TEXT, center_x - width as i32 / 2, top, scale, font, &shown);
}

/// Chart title centered in the band above the plot.
pub fn draw_title(canvas: &mut RgbImage, font: &FontRef<'_>, title: &str) {
    let width = canvas.width();
    draw_centered_text(canvas, font, title, width as i32 / 2, 8, TITLE_SCALE, width);
}

/// Right-aligned labels left of the plot at every `step` of the unit y axis, 0 included.
pub fn draw_unit_axis_labels(canvas: &mut RgbImage, font: &FontRef<'_>, area: PlotArea, step: f32) {
    let scale = PxScale::from(LABEL_SCALE);
    let steps = (1.0 / step).round() as u32;
    for i in 0..=steps {
        let fraction = i as f32 * step;
        let label = format!("{fraction:.1}");
        let (width, height) = text_size(scale, font, &label);
        let x = area.left as i32 - 6 - width as i32;
        let y = area.y_at(fraction) as i32 - height as i32 / 2;
        draw_text_mut(canvas, TEXT, x, y, scale, font, &label);
    }
}

/// PNG-encodes the canvas and wraps it in standard base64.
pub fn encode_png_base64(canvas: &RgbImage) -> Result<String, AnalysisError> {
    let mut bytes = Cursor::new(Vec::new());
    canvas
        .write_to(&mut bytes, ImageFormat::Png)
        .map_err(|e| AnalysisError::Render(e.to_string()))?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes.into_inner()))
}
