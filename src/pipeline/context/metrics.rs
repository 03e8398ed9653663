use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Preprocess,
    Inference,
    ColorAnalysis,
    Scoring,
    Rendering,
}

/// Wall-clock durations collected while one image moves through the pipeline
#[derive(Debug, Clone, Default)]
pub struct StageMetrics {
    preprocess: Option<Duration>,
    inference: Option<Duration>,
    color_analysis: Option<Duration>,
    scoring: Option<Duration>,
    rendering: Option<Duration>,
}

impl StageMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stage: Stage, duration: Duration) {
        let slot = match stage {
            Stage::Preprocess => &mut self.preprocess,
            Stage::Inference => &mut self.inference,
            Stage::ColorAnalysis => &mut self.color_analysis,
            Stage::Scoring => &mut self.scoring,
            Stage::Rendering => &mut self.rendering,
        };
        *slot = Some(duration);
    }

    pub fn get(&self, stage: Stage) -> Option<Duration> {
        match stage {
            Stage::Preprocess => self.preprocess,
            Stage::Inference => self.inference,
            Stage::ColorAnalysis => self.color_analysis,
            Stage::Scoring => self.scoring,
            Stage::Rendering => self.rendering,
        }
    }
}
