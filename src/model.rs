//! Next-note model.
//!
//! ## Components
//!
//! - [`network`] — three stacked LSTMs, a dense bottleneck and a softmax head
//! - [`loss`] — categorical cross-entropy on one-hot targets

pub mod loss;
pub mod network;

pub use loss::categorical_cross_entropy;
pub use network::{NoteLstm, set_unit_forget_bias};
