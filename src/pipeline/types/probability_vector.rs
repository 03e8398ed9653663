use serde::{Deserialize, Serialize};

const ENTROPY_EPSILON: f64 = 1e-10;

/// Per-class scores in some index order; native when produced by a classifier, canonical after
/// remapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProbabilityVector(Vec<f32>);

impl ProbabilityVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn zeros(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    pub fn uniform(len: usize) -> Self {
        Self(vec![1.0 / len as f32; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.0.get(index).copied()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn sum(&self) -> f32 {
        self.0.iter().sum()
    }

    /// Index and value of the largest entry; ties resolve to the lowest index.
    pub fn argmax(&self) -> Option<(usize, f32)> {
        self.0
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best, (idx, value)| match best {
                Some((_, top)) if top >= value => best,
                _ => Some((idx, value)),
            })
    }

    /// Shannon entropy in bits: -sum(p * log2(p + eps)).
    pub fn entropy_bits(&self) -> f32 {
        let sum: f64 = self
            .0
            .iter()
            .map(|&p| {
                let p = p as f64;
                p * (p + ENTROPY_EPSILON).log2()
            })
            .sum();
        (-sum).max(0.0) as f32
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|p| p.is_finite())
    }

    pub(crate) fn set(&mut self, index: usize, value: f32) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = value;
        }
    }
}

impl From<Vec<f32>> for ProbabilityVector {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}
