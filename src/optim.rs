//! RMSProp optimizer.
//!
//! ```text
//! s ← ρ·s + (1 − ρ)·g²
//! θ ← θ − lr · g / (√s + ε)
//! ```
//!
//! Plugs into candle's [`Optimizer`] trait, so `backward_step` works as it
//! does for the built-in SGD and AdamW.

use candle_core::backprop::GradStore;
use candle_core::{Result, Var};
use candle_nn::Optimizer;

use crate::config::RmsPropConfig;

#[derive(Debug)]
struct VarRmsProp {
    var: Var,
    square_avg: Var,
}

/// RMSProp over a fixed set of trainable variables.
#[derive(Debug)]
pub struct RmsProp {
    vars: Vec<VarRmsProp>,
    params: RmsPropConfig,
}

impl Optimizer for RmsProp {
    type Config = RmsPropConfig;

    fn new(vars: Vec<Var>, params: RmsPropConfig) -> Result<Self> {
        let vars = vars
            .into_iter()
            .filter(|var| var.dtype().is_float())
            .map(|var| {
                let square_avg = Var::zeros(var.shape(), var.dtype(), var.device())?;
                Ok(VarRmsProp { var, square_avg })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { vars, params })
    }

    fn learning_rate(&self) -> f64 {
        self.params.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f64) {
        self.params.learning_rate = lr;
    }

    fn step(&mut self, grads: &GradStore) -> Result<()> {
        let RmsPropConfig {
            learning_rate,
            rho,
            epsilon,
        } = self.params;

        for v in &self.vars {
            let Some(grad) = grads.get(v.var.as_tensor()) else {
                continue;
            };
            let square_avg =
                ((v.square_avg.as_tensor() * rho)? + (grad.sqr()? * (1.0 - rho))?)?;
            let update = (grad / (square_avg.sqrt()? + epsilon)?)?;
            v.var.set(&v.var.sub(&(update * learning_rate)?)?)?;
            v.square_avg.set(&square_avg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{Device, Tensor};

    #[test]
    fn first_step_matches_closed_form() {
        let device = Device::Cpu;
        let x = Var::new(&[3f32], &device).unwrap();
        let params = RmsPropConfig {
            learning_rate: 0.01,
            ..Default::default()
        };
        let mut opt = RmsProp::new(vec![x.clone()], params).unwrap();

        let loss = x.as_tensor().sqr().unwrap().sum_all().unwrap();
        opt.backward_step(&loss).unwrap();

        // g = 6, s = 0.1 * 36, step = 0.01 * 6 / sqrt(3.6)
        let expected = 3.0 - 0.01 * 6.0 / 3.6f32.sqrt();
        let got = x.to_vec1::<f32>().unwrap()[0];
        assert!((got - expected).abs() < 1e-5, "got {got}, expected {expected}");
    }

    #[test]
    fn minimizes_a_quadratic() {
        let device = Device::Cpu;
        let x = Var::new(&[3f32, -2.0], &device).unwrap();
        let mut opt = RmsProp::new(
            vec![x.clone()],
            RmsPropConfig {
                learning_rate: 0.05,
                ..Default::default()
            },
        )
        .unwrap();

        for _ in 0..200 {
            let loss = x.as_tensor().sqr().unwrap().sum_all().unwrap();
            opt.backward_step(&loss).unwrap();
        }
        let final_loss = x
            .as_tensor()
            .sqr()
            .and_then(|t| t.sum_all())
            .and_then(|t| t.to_scalar::<f32>())
            .unwrap();
        assert!(final_loss < 0.1, "loss = {final_loss}");
    }

    #[test]
    fn learning_rate_is_adjustable() {
        let device = Device::Cpu;
        let x = Var::from_tensor(&Tensor::zeros(2, candle_core::DType::F32, &device).unwrap()).unwrap();
        let mut opt = RmsProp::new(vec![x], RmsPropConfig::default()).unwrap();
        assert!((opt.learning_rate() - 0.001).abs() < 1e-12);
        opt.set_learning_rate(0.1);
        assert!((opt.learning_rate() - 0.1).abs() < 1e-12);
    }
}
