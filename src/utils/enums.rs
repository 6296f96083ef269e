use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScoreFunction {
    /// Bilinear score through a learned weight matrix (Luong)
    Multiplicative,
    /// Learned tanh projection scored by a vector (Bahdanau)
    Additive,
}

impl Default for ScoreFunction {
    fn default() -> Self {
        Self::Multiplicative
    }
}
