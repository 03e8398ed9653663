use serde::{Deserialize, Serialize};

/// Inclusive hue range on the 0-179 scale (degrees halved).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HueBand {
    pub min: u8,
    pub max: u8,
}

impl HueBand {
    pub const HUE_MAX: u8 = 179;
    pub const GREEN: HueBand = HueBand::new(40, 80);
    pub const YELLOW: HueBand = HueBand::new(20, 40);

    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, hue: u8) -> bool {
        (self.min..=self.max).contains(&hue)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorMetrics {
    pub percent_green: f32,
    pub percent_yellow: f32,
}

impl ColorMetrics {
    /// Green area relative to yellow area, with yellow floored at 0.1%.
    pub fn green_to_yellow_ratio(&self) -> f32 {
        self.percent_green / self.percent_yellow.max(0.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareRecommendation {
    Thriving,
    Stressed,
    Mixed,
    Stable,
}

impl CareRecommendation {
    pub fn from_metrics(metrics: &ColorMetrics) -> Self {
        if metrics.percent_green > 80.0 {
            CareRecommendation::Thriving
        } else if metrics.percent_yellow > 30.0 {
            CareRecommendation::Stressed
        } else if metrics.percent_green < 50.0 && metrics.percent_yellow < 20.0 {
            CareRecommendation::Mixed
        } else {
            CareRecommendation::Stable
        }
    }

    pub fn advice(&self, plant_type: &str) -> String {
        let plant = plant_type.to_lowercase();
        match self {
            CareRecommendation::Thriving => format!(
                "The {plant} shows good greenness and appears healthy. Keep the current care routine."
            ),
            CareRecommendation::Stressed => format!(
                "The {plant} shows stress with significant yellow areas. Check watering, light exposure and pests."
            ),
            CareRecommendation::Mixed => format!(
                "The {plant} shows mixed results. It may be in transition or need care adjustments. Monitor closely."
            ),
            CareRecommendation::Stable => format!(
                "The {plant} is within the normal range. Keep the usual care routine and watch for changes."
            ),
        }
    }
}
