//! Categorical cross-entropy against one-hot targets.

use candle_core::{D, Result, Tensor};

/// Mean over the batch of `-sum(target * log_softmax(logits))`.
///
/// - `logits`: [B, V]
/// - `targets`: [B, V] one-hot (or any probability rows)
pub fn categorical_cross_entropy(logits: &Tensor, targets: &Tensor) -> Result<Tensor> {
    let log_probs = candle_nn::ops::log_softmax(logits, D::Minus1)?;
    (targets * log_probs)?.sum(D::Minus1)?.neg()?.mean_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    #[test]
    fn uniform_logits_give_log_vocab() {
        let device = Device::Cpu;
        let logits = Tensor::zeros((2, 4), candle_core::DType::F32, &device).unwrap();
        let targets = Tensor::new(&[[1f32, 0., 0., 0.], [0., 0., 1., 0.]], &device).unwrap();
        let loss = categorical_cross_entropy(&logits, &targets)
            .unwrap()
            .to_scalar::<f32>()
            .unwrap();
        assert!((loss - 4f32.ln()).abs() < 1e-5, "loss = {loss}");
    }

    #[test]
    fn confident_correct_prediction_is_near_zero() {
        let device = Device::Cpu;
        let logits = Tensor::new(&[[20f32, 0., 0.]], &device).unwrap();
        let targets = Tensor::new(&[[1f32, 0., 0.]], &device).unwrap();
        let loss = categorical_cross_entropy(&logits, &targets)
            .unwrap()
            .to_scalar::<f32>()
            .unwrap();
        assert!(loss < 1e-6, "loss = {loss}");
    }
}
