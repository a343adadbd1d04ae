//! Core data models for translation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why greedy decoding ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Decoder emitted the stop token
    StopToken,
    /// Decoded text grew past the decoder length limit
    LengthLimit,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::StopToken => write!(f, "stop_token"),
            StopReason::LengthLimit => write!(f, "length_limit"),
        }
    }
}

/// Translation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub text: String,
    pub steps: usize,
    pub stop_reason: StopReason,
}

/// Model dimensions reported by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub latent_dim: usize,
    pub num_encoder_tokens: usize,
    pub num_decoder_tokens: usize,
    pub max_encoder_seq_length: usize,
    pub max_decoder_seq_length: usize,
}

/// Translation request body for `POST /traduzir`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    #[serde(rename = "texto")]
    pub text: Option<String>,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// Translation response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResponse {
    #[serde(rename = "texto_original")]
    pub original: String,
    #[serde(rename = "texto_traduzido")]
    pub translated: String,
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "erro")]
    pub error: String,
}
