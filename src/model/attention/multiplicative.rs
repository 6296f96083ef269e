use ndarray::Array2;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::model::attention::Attention;
use crate::model::ModelError;
use crate::utils::softmax;

/// Scores the decoder state against every encoder position through a learned
/// bilinear form and returns the resulting context vector.
///
/// # Arguments
/// * `decoder_state` - column vector `[decoder_dim, 1]`
/// * `encoder_states` - one column per source position `[encoder_dim, n_positions]`
/// * `w_mult` - score weight matrix `[decoder_dim, encoder_dim]`
///
/// The output `[encoder_dim, 1]` is a convex combination of the columns of
/// `encoder_states`.
pub fn multiplicative_attention(
    decoder_state: &Array2<f64>,
    encoder_states: &Array2<f64>,
    w_mult: &Array2<f64>,
) -> Result<Array2<f64>, ModelError> {
    if decoder_state.ncols() != 1 {
        return Err(ModelError::DimensionMismatch(format!(
            "Expected a decoder column vector, got shape {:?}",
            decoder_state.shape()
        )));
    }
    if w_mult.nrows() != decoder_state.nrows() {
        return Err(ModelError::DimensionMismatch(format!(
            "Weight matrix has {} rows, decoder state has {} features",
            w_mult.nrows(),
            decoder_state.nrows()
        )));
    }
    if w_mult.ncols() != encoder_states.nrows() {
        return Err(ModelError::DimensionMismatch(format!(
            "Weight matrix has {} columns, encoder states have {} features",
            w_mult.ncols(),
            encoder_states.nrows()
        )));
    }

    let scores = decoder_state.t().dot(w_mult).dot(encoder_states);
    let weights = softmax(&scores);

    Ok(weights.dot(&encoder_states.t()).reversed_axes())
}

/// Dot-product attention through a learned weight matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiplicativeAttention {
    pub weight: Array2<f64>, // [decoder_dim, encoder_dim]
}

impl MultiplicativeAttention {
    pub fn new(decoder_dim: usize, encoder_dim: usize) -> Result<Self, ModelError> {
        let mut rng = rand::thread_rng();
        let normal = Normal::new(0.0, 0.02)
            .map_err(|e| ModelError::InitializationError(e.to_string()))?;

        Ok(Self {
            weight: Array2::from_shape_fn((decoder_dim, encoder_dim), |_| {
                normal.sample(&mut rng)
            }),
        })
    }

    /// Wraps caller-supplied weights without copying.
    pub fn from_weight(weight: Array2<f64>) -> Self {
        Self { weight }
    }

    pub fn forward(
        &self,
        decoder_state: &Array2<f64>,
        encoder_states: &Array2<f64>,
    ) -> Result<Array2<f64>, ModelError> {
        multiplicative_attention(decoder_state, encoder_states, &self.weight)
    }
}

#[typetag::serde]
impl Attention for MultiplicativeAttention {
    fn forward(
        &self,
        decoder_state: &Array2<f64>,
        encoder_states: &Array2<f64>,
    ) -> Result<Array2<f64>, ModelError> {
        self.forward(decoder_state, encoder_states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_attention_vector_shape() {
        let decoder = array![[1.0], [1.0]];
        let encoder = array![[1.0, 4.0], [2.0, 5.0], [3.0, 6.0]];
        let w = Array2::<f64>::ones((2, 3));

        let context = multiplicative_attention(&decoder, &encoder, &w).unwrap();

        assert_eq!(context.dim(), (3, 1));
        // a weighted average of the columns stays inside their componentwise range
        for (i, row) in encoder.rows().into_iter().enumerate() {
            let min = row.fold(f64::INFINITY, |a, &b| a.min(b));
            let max = row.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
            let c = context[[i, 0]];
            assert!(c >= min - 1e-12 && c <= max + 1e-12, "component {} = {}", i, c);
        }
    }

    #[test]
    fn test_output_within_encoder_hull() {
        let decoder = array![[0.5], [-1.0]];
        let encoder = array![[1.0, -2.0, 0.0], [3.0, 0.5, -1.0]];
        let w = array![[0.2, -0.3], [0.1, 0.4]];

        let context = multiplicative_attention(&decoder, &encoder, &w).unwrap();

        assert_eq!(context.dim(), (2, 1));
        for (i, row) in encoder.rows().into_iter().enumerate() {
            let min = row.fold(f64::INFINITY, |a, &b| a.min(b));
            let max = row.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
            let c = context[[i, 0]];
            assert!(c >= min - 1e-12 && c <= max + 1e-12, "component {} = {}", i, c);
        }
    }

    #[test]
    fn test_zero_weight_averages_encoder_columns() {
        let decoder = array![[1.0], [2.0]];
        let encoder = array![[1.0, 3.0], [2.0, 6.0]];
        let w = Array2::<f64>::zeros((2, 2));

        // every score is zero, so each position carries weight 1/2
        let context = multiplicative_attention(&decoder, &encoder, &w).unwrap();

        let expected = [2.0, 4.0];
        for (c, e) in context.iter().zip(expected.iter()) {
            assert!((c - e).abs() < 1e-12, "got {}, expected {}", c, e);
        }
    }

    #[test]
    fn test_single_position_returns_that_column() {
        let decoder = array![[0.3], [0.7]];
        let encoder = array![[5.0], [-2.0], [0.25]];
        let w = array![[1.0, 0.0, 2.0], [0.5, 1.0, 0.0]];

        let context = multiplicative_attention(&decoder, &encoder, &w).unwrap();

        assert_eq!(context.dim(), (3, 1));
        for (c, e) in context.iter().zip(encoder.iter()) {
            assert!((c - e).abs() < 1e-12, "got {}, expected {}", c, e);
        }
    }

    #[test]
    fn test_rejects_mismatched_weight() {
        let decoder = array![[1.0], [1.0]];
        let encoder = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let w = Array2::<f64>::ones((3, 3)); // decoder only has 2 features

        let result = multiplicative_attention(&decoder, &encoder, &w);
        assert!(matches!(result, Err(ModelError::DimensionMismatch(_))));
    }

    #[test]
    fn test_rejects_row_decoder_state() {
        let decoder = array![[1.0, 1.0]];
        let encoder = array![[1.0, 2.0], [3.0, 4.0]];
        let w = Array2::<f64>::ones((2, 2));

        let result = multiplicative_attention(&decoder, &encoder, &w);
        assert!(matches!(result, Err(ModelError::DimensionMismatch(_))));
    }

    #[test]
    fn test_rejects_weight_encoder_mismatch() {
        let decoder = array![[1.0], [1.0]];
        let encoder = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let w = Array2::<f64>::ones((2, 2)); // encoder has 3 features

        let result = multiplicative_attention(&decoder, &encoder, &w);
        assert!(matches!(result, Err(ModelError::DimensionMismatch(_))));
    }

    #[test]
    fn test_layer_initialization_shape() {
        let layer = MultiplicativeAttention::new(4, 3).unwrap();
        assert_eq!(layer.weight.dim(), (4, 3));
    }

    #[test]
    fn test_layer_forward_matches_free_function() {
        let w = array![[1.0, 0.0], [0.0, 1.0]];
        let layer = MultiplicativeAttention::from_weight(w.clone());
        let decoder = array![[1.0], [2.0]];
        let encoder = array![[0.0, 1.0], [1.0, 0.0]];

        let from_layer = layer.forward(&decoder, &encoder).unwrap();
        let from_fn = multiplicative_attention(&decoder, &encoder, &w).unwrap();

        for (a, b) in from_layer.iter().zip(from_fn.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_layer_forward_random_weights() {
        let layer = MultiplicativeAttention::new(3, 2).unwrap();
        let decoder = array![[0.1], [0.2], [0.3]];
        let encoder = array![[1.0, -1.0, 0.5], [0.0, 2.0, -0.5]];

        let context = layer.forward(&decoder, &encoder).unwrap();

        // Weights are random, so just check shape and finiteness
        assert_eq!(context.dim(), (2, 1));
        assert!(context.iter().all(|v| v.is_finite()));
    }
}
