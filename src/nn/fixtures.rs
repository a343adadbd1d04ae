//! Tiny deterministic model used across the test suite.
//!
//! The decoder forgets its previous cell state every step (forget bias -10,
//! recurrent kernel zero), so its output depends only on the token just fed
//! in. The dense kernel then encodes a fixed "next character" table.

use safetensors::tensor::TensorView;
use safetensors::Dtype;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::vocab::ModelConfig;

pub const LATENT_DIM: usize = 4;

/// Default transitions: `\t -> o -> i -> \n`, decoding to "oi"
pub const OI: &[(usize, usize)] = &[(0, 2), (2, 3), (3, 1)];

pub fn model_config() -> ModelConfig {
    let input: HashMap<String, usize> = [(" ", 0), ("h", 1), ("i", 2)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    let target: HashMap<String, usize> = [("\t", 0), ("\n", 1), ("o", 2), ("i", 3)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    let reverse = target.iter().map(|(k, v)| (v.to_string(), k.clone())).collect();

    ModelConfig {
        latent_dim: LATENT_DIM,
        num_encoder_tokens: 3,
        num_decoder_tokens: 4,
        max_encoder_seq_length: 5,
        max_decoder_seq_length: 3,
        input_token_index: input,
        target_token_index: target,
        reverse_target_char_index: reverse,
    }
}

/// Serialize `(name, shape, values)` triples as an F32 safetensors buffer
pub fn serialize(tensors: &[(&str, Vec<usize>, Vec<f32>)]) -> Vec<u8> {
    let raw: Vec<(String, Vec<usize>, Vec<u8>)> = tensors
        .iter()
        .map(|(name, shape, values)| {
            let bytes = values.iter().flat_map(|v| v.to_le_bytes()).collect();
            (name.to_string(), shape.clone(), bytes)
        })
        .collect();

    let views: Vec<(String, TensorView<'_>)> = raw
        .iter()
        .map(|(name, shape, bytes)| {
            let view = TensorView::new(Dtype::F32, shape.clone(), bytes).unwrap();
            (name.clone(), view)
        })
        .collect();

    safetensors::serialize(views, &None).unwrap()
}

/// Checkpoint for `config` whose decoder follows `transitions`
pub fn weights(config: &ModelConfig, transitions: &[(usize, usize)]) -> Vec<u8> {
    let d = config.latent_dim;
    let enc = config.num_encoder_tokens;
    let dec = config.num_decoder_tokens;

    let enc_embedding: Vec<f32> = (0..enc * d).map(|i| (i % 7) as f32 * 0.1).collect();
    let encoder_kernel = vec![0.1; d * 4 * d];

    // decoder embedding: one-hot rows (token t lights latent unit t % d)
    let mut dec_embedding = vec![0.0; dec * d];
    for t in 0..dec {
        dec_embedding[t * d + t % d] = 1.0;
    }

    // gate blocks [i | f | g | o]; g = tanh(3x) copies the one-hot input
    let mut decoder_kernel = vec![0.0; d * 4 * d];
    for u in 0..d {
        decoder_kernel[u * 4 * d + 2 * d + u] = 3.0;
    }
    let mut decoder_bias = vec![0.0; 4 * d];
    for u in 0..d {
        decoder_bias[u] = 10.0;
        decoder_bias[d + u] = -10.0;
        decoder_bias[3 * d + u] = 10.0;
    }

    let mut output_kernel = vec![0.0; d * dec];
    for &(from, to) in transitions {
        output_kernel[(from % d) * dec + to] = 5.0;
    }

    serialize(&[
        ("enc_embedding/embeddings", vec![enc, d], enc_embedding),
        ("encoder_lstm/kernel", vec![d, 4 * d], encoder_kernel),
        ("encoder_lstm/recurrent_kernel", vec![d, 4 * d], vec![0.05; d * 4 * d]),
        ("encoder_lstm/bias", vec![4 * d], vec![0.0; 4 * d]),
        ("dec_embedding/embeddings", vec![dec, d], dec_embedding),
        ("decoder_lstm/kernel", vec![d, 4 * d], decoder_kernel),
        ("decoder_lstm/recurrent_kernel", vec![d, 4 * d], vec![0.0; d * 4 * d]),
        ("decoder_lstm/bias", vec![4 * d], decoder_bias),
        ("decoder_output/kernel", vec![d, dec], output_kernel),
        ("decoder_output/bias", vec![dec], vec![0.0; dec]),
    ])
}

/// Write config and checkpoint into `dir`, returning their paths
pub fn write_artifacts(dir: &Path, config: &ModelConfig, transitions: &[(usize, usize)]) -> (PathBuf, PathBuf) {
    let config_path = dir.join("tradutor_config.json");
    let weights_path = dir.join("tradutor_pesos.safetensors");

    std::fs::write(&config_path, serde_json::to_string(config).unwrap()).unwrap();
    std::fs::write(&weights_path, weights(config, transitions)).unwrap();

    (config_path, weights_path)
}
