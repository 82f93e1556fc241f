//! Next-note LSTM training on MIDI corpora, in pure Rust.
//!
//! A candle-based training pipeline for symbolic music models: notes and
//! chords are read from MIDI files, encoded as integer windows, and used to
//! fit a stacked LSTM that predicts the token following each window.
//!
//! ## Architecture
//!
//! ```text
//! midi_songs/*.mid ── midly ──→ Score ──→ tokens ("C4", "0.4.7", ...)
//!                                            │        └──→ data/notes
//!                                            ↓
//!                               Vocabulary + sliding window (W = 160)
//!                                            ↓
//!                        inputs [N, W, 1] / V,  one-hot targets [N, V]
//!                                            ↓
//!            LSTM ×3 (512) → Dense(256) → Dense(V) → softmax, RMSProp
//!                                            ↓
//!                      weights-improvement-{epoch}-{loss}-bigger.safetensors
//! ```
//!
//! ## Modules
//!
//! - [`corpus`] — MIDI parsing, instrument partitioning, tokenization, token file
//! - [`sequence`] — vocabulary, training windows, tensor encoding
//! - [`model`] — the LSTM network and its loss
//! - [`optim`] — RMSProp for candle's `Optimizer` trait
//! - [`training`] — epoch loop, batching, best-loss checkpoints
//! - [`pipeline`] — end-to-end run over a [`config::TrainingConfig`]

pub mod config;
pub mod corpus;
pub mod model;
pub mod optim;
pub mod pipeline;
pub mod sequence;
pub mod training;

mod error;

pub use error::{Error, Result};
