use ab_glyph::FontRef;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use imageproc::stats::histogram;

use crate::config::ChartSize;
use crate::pipeline::services::visualization::canvas::{self, PlotArea};

pub const TITLE: &str = "RGB Histogram";

const BINS: f32 = 256.0;
const CHANNEL_COLORS: [Rgb<u8>; 3] = [Rgb([255, 0, 0]), Rgb([0, 128, 0]), Rgb([0, 0, 255])];

/// Three overlaid intensity curves on a shared count axis, x spanning [0, 256].
pub fn render(image: &RgbImage, font: &FontRef<'_>, size: ChartSize) -> RgbImage {
    let channels = histogram(image).channels;
    let tallest = channels
        .iter()
        .flat_map(|h| h.iter())
        .copied()
        .max()
        .unwrap_or(0)
        .max(1) as f32;

    let mut chart = canvas::blank(size);
    let area = PlotArea::within(size);
    canvas::draw_horizontal_grid(&mut chart, area, 0.2);
    canvas::draw_vertical_grid(&mut chart, area, 0.25);

    for (counts, color) in channels.iter().zip(CHANNEL_COLORS) {
        let points: Vec<(f32, f32)> = counts
            .iter()
            .enumerate()
            .map(|(bin, &count)| {
                (
                    area.x_at(bin as f32 / BINS),
                    area.y_at(count as f32 / tallest),
                )
            })
            .collect();
        for segment in points.windows(2) {
            draw_line_segment_mut(&mut chart, segment[0], segment[1], color);
        }
    }

    canvas::draw_frame(&mut chart, area);
    canvas::draw_title(&mut chart, font, TITLE);
    chart
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_red_draws_red_peak_at_right_edge() {
        let image = RgbImage::from_pixel(8, 8, Rgb([255, 0, 0]));
        let size = ChartSize::new(800, 400);
        let chart = render(&image, &canvas::chart_font().unwrap(), size);
        assert_eq!(chart.dimensions(), (800, 400));

        let area = PlotArea::within(size);
        // The red curve rises to the top of the plot at bin 255.
        let x = area.x_at(255.0 / 256.0).round() as u32;
        let column_has_red = (area.top..area.bottom())
            .any(|y| *chart.get_pixel(x, y) == Rgb([255, 0, 0]));
        assert!(column_has_red);
    }

    #[test]
    fn title_band_carries_text() {
        let image = RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]));
        let size = ChartSize::new(800, 400);
        let chart = render(&image, &canvas::chart_font().unwrap(), size);
        let inked = (0..size.width)
            .flat_map(|x| (0..canvas::TITLE_BAND).map(move |y| (x, y)))
            .any(|(x, y)| *chart.get_pixel(x, y) != canvas::BACKGROUND);
        assert!(inked);
    }
}
