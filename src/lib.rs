//! Character-level seq2seq translator (English to Portuguese)
//!
//! Rebuilds an embedding + LSTM encoder/decoder from a safetensors
//! checkpoint and a vocabulary config, decodes greedily one character at a
//! time, and serves the result over HTTP.

#![deny(unsafe_code)]

pub mod cli;
pub mod core;
pub mod nn;
pub mod server;

// Re-export key types for convenience
pub use crate::core::{
    client::TranslationClient,
    config::{AppConfig, ClientConfig, ServiceConfig},
    engine::Seq2SeqTranslator,
    errors::TranslationError,
    models::{ModelInfo, StopReason, Translation, TranslationRequest, TranslationResponse},
    vocab::ModelConfig,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
