use ndarray::Array4;

/// Classifier input in NHWC layout with a leading batch axis of 1 and channels scaled to [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTensor {
    data: Array4<f32>,
}

impl ModelTensor {
    pub(crate) fn new(data: Array4<f32>) -> Self {
        Self { data }
    }

    /// (batch, height, width, channels)
    pub fn shape(&self) -> (usize, usize, usize, usize) {
        self.data.dim()
    }

    pub fn data(&self) -> &Array4<f32> {
        &self.data
    }
}
