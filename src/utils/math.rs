use ndarray::{Array2, Axis};

/// Normalizes each row of `logits` into a probability distribution.
///
/// Every element is shifted by the single largest entry of the whole matrix
/// before exponentiation so `exp` cannot overflow; the shift cancels during
/// normalization, leaving each row non-negative and summing to 1. NaN inputs
/// propagate.
pub fn softmax(logits: &Array2<f64>) -> Array2<f64> {
    let max = logits.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let exp = logits.mapv(|x| (x - max).exp());
    let denominators = exp.sum_axis(Axis(1)).insert_axis(Axis(1));
    &exp / &denominators
}
