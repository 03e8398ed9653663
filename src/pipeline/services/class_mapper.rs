use crate::pipeline::types::{IndexTranslation, ProbabilityVector};

/// Moves scores from the model's training-time index order into the display order.
#[derive(Debug, Clone, Default)]
pub struct ClassMapper {
    translation: Option<IndexTranslation>,
}

impl ClassMapper {
    pub fn new(translation: Option<IndexTranslation>) -> Self {
        Self { translation }
    }

    /// Without a translation table the native vector is returned as is. With one, every
    /// `native -> canonical` pair copies its score; canonical slots no pair targets stay at zero
    /// and nothing is renormalized.
    pub fn remap(&self, native: &ProbabilityVector) -> ProbabilityVector {
        let Some(translation) = &self.translation else {
            return native.clone();
        };

        let mut canonical = ProbabilityVector::zeros(native.len());
        for &(native_index, canonical_index) in translation.pairs() {
            if let Some(score) = native.get(native_index) {
                canonical.set(canonical_index, score);
            }
        }
        canonical
    }
}
