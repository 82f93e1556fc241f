//! Stacked LSTM next-token network.
//!
//! ```text
//! [B, W, 1] → LSTM(512, seq) → Dropout → LSTM(512, seq) → Dropout
//!           → LSTM(512, last) → Dense(256) → Dropout → Dense(V) → softmax
//! ```

use candle_core::{Module, Result, Tensor};
use candle_nn::{Dropout, Init, LSTM, LSTMConfig, Linear, RNN, VarBuilder, VarMap};

use crate::config::ModelConfig;

const LSTM_LAYERS: [&str; 3] = ["lstm1", "lstm2", "lstm3"];

/// Three-layer LSTM classifier over the token vocabulary.
#[derive(Debug, Clone)]
pub struct NoteLstm {
    lstm1: LSTM,
    lstm2: LSTM,
    lstm3: LSTM,
    dense: Linear,
    output: Linear,
    dropout: Dropout,
    vocab_size: usize,
}

impl NoteLstm {
    pub fn new(cfg: &ModelConfig, vocab_size: usize, vb: VarBuilder) -> Result<Self> {
        let units = cfg.lstm_units;
        Ok(Self {
            lstm1: candle_nn::lstm(1, units, lstm_config(1, units), vb.pp(LSTM_LAYERS[0]))?,
            lstm2: candle_nn::lstm(units, units, lstm_config(units, units), vb.pp(LSTM_LAYERS[1]))?,
            lstm3: candle_nn::lstm(units, units, lstm_config(units, units), vb.pp(LSTM_LAYERS[2]))?,
            dense: glorot_linear(units, cfg.dense_units, vb.pp("dense"))?,
            output: glorot_linear(cfg.dense_units, vocab_size, vb.pp("output"))?,
            dropout: Dropout::new(cfg.dropout),
            vocab_size,
        })
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Unnormalized scores.
    ///
    /// - `xs`: [B, W, 1] normalized codes
    /// - returns: [B, V]
    pub fn logits(&self, xs: &Tensor, train: bool) -> Result<Tensor> {
        let h = full_sequence(&self.lstm1, xs)?;
        let h = self.dropout.forward(&h, train)?;
        let h = full_sequence(&self.lstm2, &h)?;
        let h = self.dropout.forward(&h, train)?;

        let states = self.lstm3.seq(&h)?;
        let last = states
            .last()
            .ok_or_else(|| candle_core::Error::Msg("empty input sequence".into()))?
            .h();

        let h = self.dense.forward(last)?;
        let h = self.dropout.forward(&h, train)?;
        self.output.forward(&h)
    }

    /// Next-token probabilities, [B, V].
    pub fn forward_t(&self, xs: &Tensor, train: bool) -> Result<Tensor> {
        candle_nn::ops::softmax_last_dim(&self.logits(xs, train)?)
    }
}

/// Set the forget-gate slice of every LSTM input bias to one.
///
/// Gates are packed `[input, forget, cell, output]`, so this writes
/// `[0; H] ++ [1; H] ++ [0; 2H]` into `lstmN.bias_ih_l0`. Call after
/// [`NoteLstm::new`] has registered its variables in `varmap`.
pub fn set_unit_forget_bias(varmap: &VarMap, units: usize) -> Result<()> {
    let data = varmap
        .data()
        .lock()
        .map_err(|e| candle_core::Error::Msg(format!("varmap lock poisoned: {e}")))?;
    for layer in LSTM_LAYERS {
        let name = format!("{layer}.bias_ih_l0");
        let var = data
            .get(&name)
            .ok_or_else(|| candle_core::Error::Msg(format!("cannot find {name} in VarMap")))?;
        let (dtype, device) = (var.dtype(), var.device());
        let bias = Tensor::cat(
            &[
                Tensor::zeros(units, dtype, device)?,
                Tensor::ones(units, dtype, device)?,
                Tensor::zeros(2 * units, dtype, device)?,
            ],
            0,
        )?;
        var.set(&bias)?;
    }
    Ok(())
}

/// Glorot-uniform init for a `fan_in x fan_out` kernel.
fn glorot_uniform(fan_in: usize, fan_out: usize) -> Init {
    let bound = (6.0 / (fan_in + fan_out) as f64).sqrt();
    Init::Uniform {
        lo: -bound,
        up: bound,
    }
}

/// Glorot-uniform input kernel; the four gates share one `in x 4H` kernel.
fn lstm_config(in_dim: usize, units: usize) -> LSTMConfig {
    LSTMConfig {
        w_ih_init: glorot_uniform(in_dim, 4 * units),
        ..LSTMConfig::default()
    }
}

/// Dense layer with a glorot-uniform kernel and zero bias.
fn glorot_linear(in_dim: usize, out_dim: usize, vb: VarBuilder) -> Result<Linear> {
    let weight = vb.get_with_hints((out_dim, in_dim), "weight", glorot_uniform(in_dim, out_dim))?;
    let bias = vb.get_with_hints(out_dim, "bias", Init::Const(0.))?;
    Ok(Linear::new(weight, Some(bias)))
}

/// Hidden state at every step: [B, S, H].
fn full_sequence(lstm: &LSTM, xs: &Tensor) -> Result<Tensor> {
    let states = lstm.seq(xs)?;
    lstm.states_to_tensor(&states)
}
