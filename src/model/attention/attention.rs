use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::model::ModelError;
use crate::utils::ScoreFunction;

use super::additive::AdditiveAttention;
use super::multiplicative::MultiplicativeAttention;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttentionConfig {
    pub decoder_dim: usize,
    pub encoder_dim: usize,
    /// Projection size of the additive scoring network; ignored by the
    /// multiplicative scorer.
    pub hidden_dim: usize,
}

/// Alignment mechanism over a set of encoder hidden states.
///
/// `decoder_state` is a single column `[decoder_dim, 1]`; `encoder_states`
/// holds one column per source position `[encoder_dim, n_positions]`. The
/// result is the context vector `[encoder_dim, 1]`.
#[typetag::serde]
pub trait Attention {
    fn forward(
        &self,
        decoder_state: &Array2<f64>,
        encoder_states: &Array2<f64>,
    ) -> Result<Array2<f64>, ModelError>;
}

/// Builds a boxed scorer for the requested score function.
pub fn build_attention(
    score: &ScoreFunction,
    config: &AttentionConfig,
) -> Result<Box<dyn Attention>, ModelError> {
    match score {
        ScoreFunction::Multiplicative => Ok(Box::new(MultiplicativeAttention::new(
            config.decoder_dim,
            config.encoder_dim,
        )?)),
        ScoreFunction::Additive => {
            if config.hidden_dim == 0 {
                return Err(ModelError::ConfigError(
                    "hidden_dim must be non-zero for additive scoring".to_string(),
                ));
            }
            Ok(Box::new(AdditiveAttention::new(
                config.decoder_dim,
                config.encoder_dim,
                config.hidden_dim,
            )?))
        }
    }
}
