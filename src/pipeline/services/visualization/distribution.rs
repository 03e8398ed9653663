use ab_glyph::FontRef;
use image::RgbImage;

use crate::config::ChartSize;
use crate::pipeline::services::visualization::canvas::{self, PlotArea};
use crate::pipeline::types::{ClassPalette, ProbabilityVector};

pub const TITLE: &str = "Class Probability Distribution";

const BAR_FILL: f32 = 0.8;
const MARKER_GAP: u32 = 4;
const MARKER_HEIGHT: u32 = 8;
const NAME_GAP: u32 = 4;

/// Horizontal extent of one class bar, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarSlot {
    pub x: u32,
    pub width: u32,
}

/// Evenly spaced bars filling 80% of their slot, centered, at least one pixel wide.
pub fn bar_layout(class_count: usize, area: PlotArea) -> Vec<BarSlot> {
    if class_count == 0 {
        return Vec::new();
    }
    let slot = area.width as f32 / class_count as f32;
    let width = ((slot * BAR_FILL).floor() as u32).max(1);
    (0..class_count)
        .map(|i| {
            let center = area.left as f32 + slot * (i as f32 + 0.5);
            BarSlot {
                x: (center - width as f32 / 2.0).round().max(area.left as f32) as u32,
                width,
            }
        })
        .collect()
}

/// Bar per canonical class on a y axis fixed to [0, 1], with a class-colored marker and the class
/// name under each bar so zero-probability classes stay visible.
pub fn render(
    probabilities: &ProbabilityVector,
    class_names: &[String],
    palette: &ClassPalette,
    font: &FontRef<'_>,
    size: ChartSize,
) -> RgbImage {
    let mut chart = canvas::blank(size);
    let area = PlotArea::within(size);
    canvas::draw_horizontal_grid(&mut chart, area, 0.2);

    let slots = bar_layout(probabilities.len(), area);
    let slot_pitch = area.width / probabilities.len().max(1) as u32;
    for (index, (slot, &p)) in slots.iter().zip(probabilities.as_slice()).enumerate() {
        let color = palette.color_for(index);
        let top = area.y_at(p).round() as u32;
        let height = area.bottom().saturating_sub(top);
        canvas::fill_rect(&mut chart, slot.x as i32, top as i32, slot.width, height, color);
        canvas::fill_rect(
            &mut chart,
            slot.x as i32,
            (area.bottom() + MARKER_GAP) as i32,
            slot.width,
            MARKER_HEIGHT,
            color,
        );
        if let Some(name) = class_names.get(index) {
            canvas::draw_centered_text(
                &mut chart,
                font,
                name,
                (slot.x + slot.width / 2) as i32,
                (area.bottom() + MARKER_GAP + MARKER_HEIGHT + NAME_GAP) as i32,
                canvas::LABEL_SCALE,
                slot_pitch.saturating_sub(4),
            );
        }
    }

    canvas::draw_frame(&mut chart, area);
    canvas::draw_unit_axis_labels(&mut chart, font, area, 0.2);
    canvas::draw_title(&mut chart, font, TITLE);
    chart
}

/// Number of distinct colored runs along the marker row; equals the number of bars drawn.
#[cfg(test)]
pub(crate) fn count_markers(chart: &RgbImage, size: ChartSize) -> usize {
    let area = PlotArea::within(size);
    let y = area.bottom() + MARKER_GAP + MARKER_HEIGHT / 2;
    if y >= chart.height() {
        return 0;
    }
    let mut runs = 0;
    let mut inside = false;
    for x in area.left..area.right().min(chart.width()) {
        let colored = *chart.get_pixel(x, y) != canvas::BACKGROUND;
        if colored && !inside {
            runs += 1;
        }
        inside = colored;
    }
    runs
}
