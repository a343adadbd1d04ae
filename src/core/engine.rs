//! Encoder/decoder inference with greedy character decoding

use ndarray::{Array1, Array2};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use crate::core::errors::{Result, TranslationError};
use crate::core::models::{ModelInfo, StopReason, Translation};
use crate::core::vocab::{ModelConfig, Vocabulary, STOP_TOKEN};
use crate::nn::layers::{argmax, softmax, Dense, Embedding, Lstm, LstmState};
use crate::nn::weights::WeightStore;

/// Character-level seq2seq translator reconstructed from a checkpoint
#[derive(Debug, Clone)]
pub struct Seq2SeqTranslator {
    config: ModelConfig,
    vocab: Vocabulary,
    encoder_embedding: Embedding,
    encoder: Lstm,
    decoder_embedding: Embedding,
    decoder: Lstm,
    output: Dense,
}

impl Seq2SeqTranslator {
    /// Build encoder and decoder from a validated config and its checkpoint
    pub fn new(config: ModelConfig, weights: &WeightStore) -> Result<Self> {
        let vocab = config.vocabulary()?;
        let d = config.latent_dim;

        let encoder_embedding = Embedding::new(weights.matrix(
            "enc_embedding/embeddings",
            config.num_encoder_tokens,
            d,
        )?);
        let encoder = load_lstm(weights, "encoder_lstm", d)?;

        let decoder_embedding = Embedding::new(weights.matrix(
            "dec_embedding/embeddings",
            config.num_decoder_tokens,
            d,
        )?);
        let decoder = load_lstm(weights, "decoder_lstm", d)?;

        let output = Dense::new(
            weights.matrix("decoder_output/kernel", d, config.num_decoder_tokens)?,
            weights.vector("decoder_output/bias", config.num_decoder_tokens)?,
        );

        Ok(Self {
            config,
            vocab,
            encoder_embedding,
            encoder,
            decoder_embedding,
            decoder,
            output,
        })
    }

    /// Load config JSON and checkpoint from disk
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(config_path: P, weights_path: Q) -> Result<Self> {
        let start = Instant::now();
        let config = ModelConfig::from_file(config_path)?;
        let weights = WeightStore::from_file(weights_path)?;
        let translator = Self::new(config, &weights)?;

        info!("Model ready for translation in {:?}", start.elapsed());
        Ok(translator)
    }

    /// Translate a sentence, returning only the text
    pub fn translate(&self, text: &str) -> Result<String> {
        Ok(self.translate_detailed(text)?.text)
    }

    /// Translate a sentence, reporting how decoding stopped
    pub fn translate_detailed(&self, text: &str) -> Result<Translation> {
        let context = self.encode(text)?;

        let mut state = context;
        let mut token = self.vocab.start_index();
        let mut decoded = String::new();
        let mut decoded_len = 0;
        let mut steps = 0;

        let stop_reason = loop {
            let (probs, next_state) = self.decode_step(token, &state)?;
            let sampled = argmax(probs.view()).ok_or_else(|| {
                TranslationError::InternalError("decoder produced no output".to_string())
            })?;
            let ch = self
                .vocab
                .target_char(sampled)
                .ok_or(TranslationError::UnknownTargetIndex { index: sampled })?;
            steps += 1;

            if ch == STOP_TOKEN {
                break StopReason::StopToken;
            }
            decoded.push(ch);
            decoded_len += 1;

            if decoded_len > self.config.max_decoder_seq_length {
                break StopReason::LengthLimit;
            }

            token = sampled;
            state = next_state;
        };

        debug!(
            "Decoded {} steps ({:?}) for input of {} chars",
            steps,
            stop_reason,
            text.chars().count()
        );

        Ok(Translation {
            text: decoded.trim().to_string(),
            steps,
            stop_reason,
        })
    }

    /// Run the encoder over the padded input and return its final state
    pub fn encode(&self, text: &str) -> Result<LstmState> {
        let indices = self.vectorize(text)?;

        let mut inputs = Array2::<f32>::zeros((indices.len(), self.config.latent_dim));
        for (mut row, &index) in inputs.rows_mut().into_iter().zip(&indices) {
            row.assign(&self.encoder_embedding.lookup(index)?);
        }

        Ok(self
            .encoder
            .run(inputs.rows(), LstmState::zeros(self.encoder.units())))
    }

    /// One decoder step: probabilities over the target vocabulary and the next state
    pub fn decode_step(&self, token: usize, state: &LstmState) -> Result<(Array1<f32>, LstmState)> {
        let x = self.decoder_embedding.lookup(token)?;
        let next = self.decoder.step(x, state);
        let probs = softmax(self.output.forward(next.h.view()).view());
        Ok((probs, next))
    }

    /// Map characters to encoder indices, padding with zeros.
    ///
    /// Characters outside the input vocabulary keep index 0.
    pub fn vectorize(&self, text: &str) -> Result<Vec<usize>> {
        let max = self.config.max_encoder_seq_length;
        let length = text.chars().count();
        if length > max {
            return Err(TranslationError::InputTooLong { length, max });
        }

        let mut indices = vec![0; max];
        for (slot, ch) in indices.iter_mut().zip(text.chars()) {
            if let Some(index) = self.vocab.input_index(ch) {
                *slot = index;
            }
        }
        Ok(indices)
    }

    /// Model dimensions
    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            latent_dim: self.config.latent_dim,
            num_encoder_tokens: self.config.num_encoder_tokens,
            num_decoder_tokens: self.config.num_decoder_tokens,
            max_encoder_seq_length: self.config.max_encoder_seq_length,
            max_decoder_seq_length: self.config.max_decoder_seq_length,
        }
    }
}

fn load_lstm(weights: &WeightStore, prefix: &str, units: usize) -> Result<Lstm> {
    Ok(Lstm::new(
        weights.matrix(&format!("{}/kernel", prefix), units, 4 * units)?,
        weights.matrix(&format!("{}/recurrent_kernel", prefix), units, 4 * units)?,
        weights.vector(&format!("{}/bias", prefix), 4 * units)?,
    ))
}
