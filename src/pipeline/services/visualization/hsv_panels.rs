use ab_glyph::FontRef;
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::config::ChartSize;
use crate::pipeline::services::image::HsvImage;
use crate::pipeline::services::visualization::canvas;
use crate::pipeline::services::visualization::colormap::Colormap;
use crate::pipeline::types::{ColorMetrics, HueBand};

pub const TITLE: &str = "HSV Color Analysis";
pub const PANEL_LABELS: [&str; 4] = ["Hue", "Saturation", "Value", "Green Mask"];

const GUTTER: u32 = 10;
const LABEL_HEIGHT: u32 = 18;
const STRIP_HEIGHT: u32 = 14;
const STRIP_GAP: u32 = 4;
const TRACK: Rgb<u8> = Rgb([235, 235, 235]);
const YELLOW_GAUGE: Rgb<u8> = Rgb([230, 190, 0]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panel {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Panel {
    fn image_top(&self) -> u32 {
        self.y + LABEL_HEIGHT
    }

    fn image_height(&self) -> u32 {
        self.height
            .saturating_sub(LABEL_HEIGHT + STRIP_HEIGHT + STRIP_GAP)
            .max(1)
    }

    fn strip_top(&self) -> u32 {
        self.y + self.height.saturating_sub(STRIP_HEIGHT)
    }
}

/// Hue, saturation, value and green-mask panels in row-major order, below the title band.
pub fn panel_grid(size: ChartSize) -> [Panel; 4] {
    let width = (size.width.saturating_sub(3 * GUTTER) / 2).max(1);
    let height = (size
        .height
        .saturating_sub(canvas::TITLE_BAND + 3 * GUTTER)
        / 2)
    .max(1);
    let at = |col: u32, row: u32| Panel {
        x: GUTTER + col * (width + GUTTER),
        y: canvas::TITLE_BAND + GUTTER + row * (height + GUTTER),
        width,
        height,
    };
    [at(0, 0), at(1, 0), at(0, 1), at(1, 1)]
}

/// Largest size with the source aspect ratio that fits the bounds, at least 1x1.
pub fn fit_within(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let scale = (bounds.0 as f64 / source.0 as f64).min(bounds.1 as f64 / source.1 as f64);
    (
        ((source.0 as f64 * scale).floor() as u32).clamp(1, bounds.0.max(1)),
        ((source.1 as f64 * scale).floor() as u32).clamp(1, bounds.1.max(1)),
    )
}

pub fn render(
    hsv: &HsvImage,
    green_band: HueBand,
    metrics: &ColorMetrics,
    font: &FontRef<'_>,
    size: ChartSize,
) -> RgbImage {
    let mut chart = canvas::blank(size);
    let panels = panel_grid(size);
    let [hue_panel, saturation_panel, value_panel, mask_panel] = panels;
    let mask = hsv.band_mask(green_band);

    let planes: [(Panel, &[u8], f32, Colormap); 4] = [
        (hue_panel, hsv.hue(), 180.0, Colormap::Hsv),
        (saturation_panel, hsv.saturation(), 255.0, Colormap::Plasma),
        (value_panel, hsv.value(), 255.0, Colormap::Gray),
        (mask_panel, &mask, 255.0, Colormap::Greens),
    ];
    for (panel, plane, scale, colormap) in planes {
        draw_plane(&mut chart, panel, plane, hsv.dimensions(), scale, colormap);
    }

    draw_colorbar(&mut chart, hue_panel, Colormap::Hsv);
    draw_colorbar(&mut chart, saturation_panel, Colormap::Plasma);
    draw_colorbar(&mut chart, value_panel, Colormap::Gray);
    draw_coverage_gauges(&mut chart, mask_panel, metrics);

    for (panel, label) in panels.iter().zip(PANEL_LABELS) {
        canvas::draw_centered_text(
            &mut chart,
            font,
            label,
            (panel.x + panel.width / 2) as i32,
            panel.y as i32 + 2,
            canvas::LABEL_SCALE,
            panel.width,
        );
    }
    canvas::draw_title(&mut chart, font, TITLE);
    chart
}

/// Nearest-neighbour scales one channel into the panel, then colors it through `colormap`.
fn draw_plane(
    chart: &mut RgbImage,
    panel: Panel,
    plane: &[u8],
    (width, height): (u32, u32),
    scale: f32,
    colormap: Colormap,
) {
    let (dest_w, dest_h) = fit_within((width, height), (panel.width, panel.image_height()));
    let channel = GrayImage::from_fn(width, height, |x, y| {
        Luma([plane[y as usize * width as usize + x as usize]])
    });
    let resized = imageops::resize(&channel, dest_w, dest_h, FilterType::Nearest);
    let colored = RgbImage::from_fn(dest_w, dest_h, |x, y| {
        colormap.sample(resized.get_pixel(x, y)[0] as f32 / scale)
    });

    let x = panel.x + (panel.width - dest_w) / 2;
    let y = panel.image_top() + (panel.image_height() - dest_h) / 2;
    imageops::replace(chart, &colored, x as i64, y as i64);
}

fn draw_colorbar(chart: &mut RgbImage, panel: Panel, colormap: Colormap) {
    let top = panel.strip_top();
    let span = panel.width.saturating_sub(1).max(1) as f32;
    for dx in 0..panel.width {
        let color = colormap.sample(dx as f32 / span);
        canvas::fill_rect(chart, (panel.x + dx) as i32, top as i32, 1, STRIP_HEIGHT, color);
    }
}

/// Two stacked bars showing green and yellow pixel coverage in percent of the image.
fn draw_coverage_gauges(chart: &mut RgbImage, panel: Panel, metrics: &ColorMetrics) {
    let half = STRIP_HEIGHT / 2;
    let top = panel.strip_top();
    let gauges = [
        (top, metrics.percent_green, Colormap::Greens.sample(1.0)),
        (top + half, metrics.percent_yellow, YELLOW_GAUGE),
    ];
    for (y, percent, color) in gauges {
        canvas::fill_rect(chart, panel.x as i32, y as i32, panel.width, half - 1, TRACK);
        let filled = (panel.width as f32 * (percent / 100.0).clamp(0.0, 1.0)).round() as u32;
        canvas::fill_rect(chart, panel.x as i32, y as i32, filled, half - 1, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn green_chart(size: ChartSize) -> RgbImage {
        let image = RgbImage::from_pixel(20, 20, Rgb([0, 255, 0]));
        let hsv = HsvImage::from_rgb(&image);
        let metrics = ColorMetrics {
            percent_green: 100.0,
            percent_yellow: 0.0,
        };
        render(&hsv, HueBand::GREEN, &metrics, &canvas::chart_font().unwrap(), size)
    }

    #[test]
    fn grid_fills_canvas_below_title() {
        let panels = panel_grid(ChartSize::new(1000, 800));
        assert_eq!(panels[0], Panel { x: 10, y: 42, width: 485, height: 369 });
        assert_eq!(panels[3].x, 505);
        assert_eq!(panels[3].y, 421);
        assert!(panels[3].x + panels[3].width <= 1000);
        assert!(panels[3].y + panels[3].height <= 800);
    }

    #[test]
    fn fit_preserves_aspect_ratio() {
        assert_eq!(fit_within((200, 100), (400, 400)), (400, 200));
        assert_eq!(fit_within((100, 400), (400, 200)), (50, 200));
        assert_eq!(fit_within((10_000, 1), (400, 200)), (400, 1));
    }

    #[test]
    fn green_image_renders_dark_mask_and_full_gauge() {
        let size = ChartSize::new(1000, 800);
        let chart = green_chart(size);
        let [hue, _, value, mask] = panel_grid(size);

        let center = |p: Panel| (p.x + p.width / 2, p.image_top() + p.image_height() / 2);
        let (x, y) = center(mask);
        assert_eq!(*chart.get_pixel(x, y), Colormap::Greens.sample(1.0));
        let (x, y) = center(value);
        assert_eq!(*chart.get_pixel(x, y), Rgb([255, 255, 255]));
        let (x, y) = center(hue);
        assert_eq!(*chart.get_pixel(x, y), Colormap::Hsv.sample(60.0 / 180.0));

        let gauge_end = chart.get_pixel(mask.x + mask.width - 1, mask.strip_top());
        assert_eq!(*gauge_end, Colormap::Greens.sample(1.0));
        let yellow_start = chart.get_pixel(mask.x, mask.strip_top() + STRIP_HEIGHT / 2);
        assert_eq!(*yellow_start, TRACK);
    }

    #[test]
    fn every_panel_is_labelled() {
        let size = ChartSize::new(1000, 800);
        let chart = green_chart(size);
        for panel in panel_grid(size) {
            let inked = (panel.x..panel.x + panel.width)
                .flat_map(|x| (panel.y..panel.image_top()).map(move |y| (x, y)))
                .any(|(x, y)| *chart.get_pixel(x, y) != canvas::BACKGROUND);
            assert!(inked);
        }
    }

    #[test]
    fn smallest_allowed_canvas_renders() {
        let side = crate::config::MIN_CHART_SIDE;
        let chart = green_chart(ChartSize::new(side, side));
        assert_eq!(chart.dimensions(), (side, side));
    }
}
