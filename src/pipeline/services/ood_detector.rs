use tracing::warn;

use crate::pipeline::types::{OodThresholds, OodVerdict, ProbabilityVector};

/// Flags inputs the classifier does not recognize well, from its native (unmapped) output.
#[derive(Debug, Clone, Copy, Default)]
pub struct OodDetector {
    thresholds: OodThresholds,
}

impl OodDetector {
    pub fn new(thresholds: OodThresholds) -> Self {
        Self { thresholds }
    }

    pub fn assess(&self, native: &ProbabilityVector) -> OodVerdict {
        let (predicted_index, confidence) = native.argmax().unwrap_or((0, 0.0));
        let entropy = native.entropy_bits();
        let is_ood = confidence < self.thresholds.min_confidence
            || entropy > self.thresholds.max_entropy_bits;

        if is_ood {
            warn!(
                "Input looks out of distribution (confidence {:.3}, entropy {:.3} bits)",
                confidence, entropy
            );
        }

        OodVerdict {
            predicted_index,
            confidence,
            entropy,
            is_ood,
        }
    }
}
