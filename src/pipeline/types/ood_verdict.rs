use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OodThresholds {
    /// Top probability below this marks the input as out of distribution.
    pub min_confidence: f32,
    /// Output entropy above this (in bits) marks the input as out of distribution.
    pub max_entropy_bits: f32,
}

impl Default for OodThresholds {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            max_entropy_bits: 1.0,
        }
    }
}

/// Advisory out-of-distribution assessment computed from the classifier's native output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OodVerdict {
    pub predicted_index: usize,
    pub confidence: f32,
    pub entropy: f32,
    pub is_ood: bool,
}
