use ndarray::{Array, Array2};
use ndarray_rand::RandomExt;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::model::attention::Attention;
use crate::model::ModelError;
use crate::utils::softmax;

/// Scores the decoder state against every encoder position through a learned
/// tanh scoring network and returns the resulting context vector.
///
/// # Arguments
/// * `decoder_state` - column vector `[decoder_dim, 1]`
/// * `encoder_states` - one column per source position `[encoder_dim, n_positions]`
/// * `v_add` - scoring vector `[hidden_dim, 1]`
/// * `w_enc` - encoder projection `[hidden_dim, encoder_dim]`
/// * `w_dec` - decoder projection `[hidden_dim, decoder_dim]`
///
/// Both projections map into the shared hidden space, where their sum is
/// squashed by tanh and scored by `v_add`. The output `[encoder_dim, 1]` is a
/// convex combination of the columns of `encoder_states`.
pub fn additive_attention(
    decoder_state: &Array2<f64>,
    encoder_states: &Array2<f64>,
    v_add: &Array2<f64>,
    w_enc: &Array2<f64>,
    w_dec: &Array2<f64>,
) -> Result<Array2<f64>, ModelError> {
    if decoder_state.ncols() != 1 {
        return Err(ModelError::DimensionMismatch(format!(
            "Expected a decoder column vector, got shape {:?}",
            decoder_state.shape()
        )));
    }
    if w_dec.ncols() != decoder_state.nrows() {
        return Err(ModelError::DimensionMismatch(format!(
            "Decoder projection has {} columns, decoder state has {} features",
            w_dec.ncols(),
            decoder_state.nrows()
        )));
    }
    if w_enc.ncols() != encoder_states.nrows() {
        return Err(ModelError::DimensionMismatch(format!(
            "Encoder projection has {} columns, encoder states have {} features",
            w_enc.ncols(),
            encoder_states.nrows()
        )));
    }
    if w_enc.nrows() != w_dec.nrows() {
        return Err(ModelError::DimensionMismatch(format!(
            "Projections disagree on hidden size: {} vs {}",
            w_enc.nrows(),
            w_dec.nrows()
        )));
    }
    if v_add.dim() != (w_enc.nrows(), 1) {
        return Err(ModelError::DimensionMismatch(format!(
            "Scoring vector must have shape [{}, 1], got {:?}",
            w_enc.nrows(),
            v_add.shape()
        )));
    }

    let encoder_projected = w_enc.dot(encoder_states);
    // [hidden_dim, 1], broadcast across every position
    let decoder_projected = w_dec.dot(decoder_state);
    let combined = (&encoder_projected + &decoder_projected).mapv(f64::tanh);

    let scores = v_add.t().dot(&combined);
    let weights = softmax(&scores);

    Ok(weights.dot(&encoder_states.t()).reversed_axes())
}

/// Additive attention with a learned tanh scoring network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdditiveAttention {
    pub w_encoder: Array2<f64>, // [hidden_dim, encoder_dim]
    pub w_decoder: Array2<f64>, // [hidden_dim, decoder_dim]
    pub v: Array2<f64>,         // [hidden_dim, 1]
}

impl AdditiveAttention {
    pub fn new(
        decoder_dim: usize,
        encoder_dim: usize,
        hidden_dim: usize,
    ) -> Result<Self, ModelError> {
        // Scale each parameter to its own fan-in
        let enc_std = (1.0 / encoder_dim as f64).sqrt();
        let dec_std = (1.0 / decoder_dim as f64).sqrt();
        let v_std = (1.0 / hidden_dim as f64).sqrt();

        let enc_normal = Normal::new(0.0, enc_std)
            .map_err(|e| ModelError::InitializationError(e.to_string()))?;
        let dec_normal = Normal::new(0.0, dec_std)
            .map_err(|e| ModelError::InitializationError(e.to_string()))?;
        let v_normal = Normal::new(0.0, v_std)
            .map_err(|e| ModelError::InitializationError(e.to_string()))?;

        Ok(Self {
            w_encoder: Array::random((hidden_dim, encoder_dim), enc_normal),
            w_decoder: Array::random((hidden_dim, decoder_dim), dec_normal),
            v: Array::random((hidden_dim, 1), v_normal),
        })
    }

    /// Wraps caller-supplied parameters, checking that they agree on the
    /// hidden dimension.
    pub fn from_weights(
        w_encoder: Array2<f64>,
        w_decoder: Array2<f64>,
        v: Array2<f64>,
    ) -> Result<Self, ModelError> {
        if w_encoder.nrows() != w_decoder.nrows() {
            return Err(ModelError::DimensionMismatch(format!(
                "Projections disagree on hidden size: {} vs {}",
                w_encoder.nrows(),
                w_decoder.nrows()
            )));
        }
        if v.dim() != (w_encoder.nrows(), 1) {
            return Err(ModelError::DimensionMismatch(format!(
                "Scoring vector must have shape [{}, 1], got {:?}",
                w_encoder.nrows(),
                v.shape()
            )));
        }

        Ok(Self {
            w_encoder,
            w_decoder,
            v,
        })
    }

    pub fn forward(
        &self,
        decoder_state: &Array2<f64>,
        encoder_states: &Array2<f64>,
    ) -> Result<Array2<f64>, ModelError> {
        additive_attention(
            decoder_state,
            encoder_states,
            &self.v,
            &self.w_encoder,
            &self.w_decoder,
        )
    }
}

#[typetag::serde]
impl Attention for AdditiveAttention {
    fn forward(
        &self,
        decoder_state: &Array2<f64>,
        encoder_states: &Array2<f64>,
    ) -> Result<Array2<f64>, ModelError> {
        self.forward(decoder_state, encoder_states)
    }
}
