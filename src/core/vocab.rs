//! Model configuration and character vocabularies

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::core::errors::{Result, TranslationError};

/// Token that opens every decoder sequence
pub const START_TOKEN: char = '\t';

/// Token that terminates a decoded sequence
pub const STOP_TOKEN: char = '\n';

/// Hyper-parameters and vocabularies exported by the training pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub latent_dim: usize,
    pub num_encoder_tokens: usize,
    pub num_decoder_tokens: usize,
    pub max_encoder_seq_length: usize,
    pub max_decoder_seq_length: usize,
    pub input_token_index: HashMap<String, usize>,
    pub target_token_index: HashMap<String, usize>,
    /// JSON object keys are strings, so indices arrive as decimal text
    pub reverse_target_char_index: HashMap<String, String>,
}

/// Validated lookup tables built from [`ModelConfig`]
#[derive(Debug, Clone)]
pub struct Vocabulary {
    input: HashMap<char, usize>,
    target: HashMap<char, usize>,
    reverse_target: HashMap<usize, char>,
}

impl ModelConfig {
    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TranslationError::FileError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let config = Self::from_json(&content)?;
        info!(
            "Loaded model config from {} (latent_dim={}, encoder_tokens={}, decoder_tokens={})",
            path.display(),
            config.latent_dim,
            config.num_encoder_tokens,
            config.num_decoder_tokens
        );
        Ok(config)
    }

    /// Parse from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Check dimensions and build the lookup tables
    pub fn vocabulary(&self) -> Result<Vocabulary> {
        for (name, value) in [
            ("latent_dim", self.latent_dim),
            ("num_encoder_tokens", self.num_encoder_tokens),
            ("num_decoder_tokens", self.num_decoder_tokens),
            ("max_encoder_seq_length", self.max_encoder_seq_length),
            ("max_decoder_seq_length", self.max_decoder_seq_length),
        ] {
            if value == 0 {
                return Err(config_error(format!("{} must be greater than 0", name)));
            }
        }

        let input = char_index("input_token_index", &self.input_token_index, self.num_encoder_tokens)?;
        let target = char_index("target_token_index", &self.target_token_index, self.num_decoder_tokens)?;

        let mut reverse_target = HashMap::with_capacity(self.reverse_target_char_index.len());
        for (key, value) in &self.reverse_target_char_index {
            let index = key.parse::<usize>().map_err(|_| {
                config_error(format!("reverse_target_char_index key {:?} is not an integer", key))
            })?;
            reverse_target.insert(index, single_char("reverse_target_char_index", value)?);
        }

        for (ch, index) in &target {
            if reverse_target.get(index) != Some(ch) {
                return Err(config_error(format!(
                    "reverse_target_char_index does not map {} back to {:?}",
                    index, ch
                )));
            }
        }

        for token in [START_TOKEN, STOP_TOKEN] {
            if !target.contains_key(&token) {
                return Err(config_error(format!(
                    "target vocabulary is missing control token {:?}",
                    token
                )));
            }
        }

        Ok(Vocabulary {
            input,
            target,
            reverse_target,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.vocabulary().map(|_| ())
    }
}

impl Vocabulary {
    /// Encoder index for a source character
    pub fn input_index(&self, ch: char) -> Option<usize> {
        self.input.get(&ch).copied()
    }

    /// Decoder index for a target character
    pub fn target_index(&self, ch: char) -> Option<usize> {
        self.target.get(&ch).copied()
    }

    /// Target character for a decoder index
    pub fn target_char(&self, index: usize) -> Option<char> {
        self.reverse_target.get(&index).copied()
    }

    /// Decoder index of the start token
    pub fn start_index(&self) -> usize {
        // presence checked when the vocabulary was built
        self.target[&START_TOKEN]
    }
}

fn config_error(message: String) -> TranslationError {
    TranslationError::ModelConfigError { message }
}

fn single_char(field: &str, key: &str) -> Result<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(config_error(format!(
            "{} entry {:?} is not a single character",
            field, key
        ))),
    }
}

fn char_index(field: &str, map: &HashMap<String, usize>, size: usize) -> Result<HashMap<char, usize>> {
    let mut index = HashMap::with_capacity(map.len());
    for (key, &value) in map {
        if value >= size {
            return Err(TranslationError::TokenOutOfRange { index: value, size });
        }
        index.insert(single_char(field, key)?, value);
    }
    Ok(index)
}
