//! Checkpoint loading from safetensors files

use ndarray::{Array1, Array2};
use safetensors::{Dtype, SafeTensors};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use crate::core::errors::{Result, TranslationError};

/// One tensor as stored in the checkpoint, before dtype conversion
#[derive(Debug, Clone)]
struct RawTensor {
    dtype: Dtype,
    shape: Vec<usize>,
    data: Vec<u8>,
}

/// Checkpoint tensors indexed by name, parsed once on load
#[derive(Debug, Clone)]
pub struct WeightStore {
    tensors: BTreeMap<String, RawTensor>,
}

impl WeightStore {
    /// Read a checkpoint from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let buffer = std::fs::read(path).map_err(|e| TranslationError::FileError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let store = Self::from_bytes(buffer)?;
        info!(
            "Loaded checkpoint {} ({} tensors)",
            path.display(),
            store.tensors.len()
        );
        Ok(store)
    }

    /// Parse an in-memory checkpoint
    pub fn from_bytes(buffer: Vec<u8>) -> Result<Self> {
        let parsed = SafeTensors::deserialize(&buffer)?;
        let tensors = parsed
            .tensors()
            .into_iter()
            .map(|(name, view)| {
                let raw = RawTensor {
                    dtype: view.dtype(),
                    shape: view.shape().to_vec(),
                    data: view.data().to_vec(),
                };
                (name, raw)
            })
            .collect();

        Ok(Self { tensors })
    }

    /// Names of every tensor in the checkpoint, sorted
    pub fn tensor_names(&self) -> Vec<String> {
        self.tensors.keys().cloned().collect()
    }

    /// Load a 2-D tensor with the given shape
    pub fn matrix(&self, name: &str, rows: usize, cols: usize) -> Result<Array2<f32>> {
        let values = self.read(name, &[rows, cols])?;
        Array2::from_shape_vec((rows, cols), values)
            .map_err(|e| TranslationError::InternalError(e.to_string()))
    }

    /// Load a 1-D tensor with the given length
    pub fn vector(&self, name: &str, len: usize) -> Result<Array1<f32>> {
        Ok(Array1::from_vec(self.read(name, &[len])?))
    }

    fn read(&self, name: &str, expected: &[usize]) -> Result<Vec<f32>> {
        let tensor = self
            .tensors
            .get(name)
            .ok_or_else(|| TranslationError::MissingTensor {
                name: name.to_string(),
            })?;

        if tensor.shape != expected {
            return Err(TranslationError::ShapeMismatch {
                name: name.to_string(),
                expected: expected.to_vec(),
                found: tensor.shape.clone(),
            });
        }

        let values = match tensor.dtype {
            Dtype::F32 => tensor
                .data
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect(),
            Dtype::F64 => tensor
                .data
                .chunks_exact(8)
                .map(|b| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]) as f32)
                .collect(),
            other => {
                return Err(TranslationError::UnsupportedDtype {
                    name: name.to_string(),
                    dtype: format!("{:?}", other),
                })
            }
        };

        debug!("Read tensor {} {:?}", name, expected);
        Ok(values)
    }
}
