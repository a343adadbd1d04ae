//! Inference-only layers: embedding, LSTM and dense projection

use ndarray::{s, Array1, Array2, ArrayView1};

use crate::core::errors::{Result, TranslationError};

/// Lookup table mapping token indices to dense vectors
#[derive(Debug, Clone)]
pub struct Embedding {
    table: Array2<f32>,
}

impl Embedding {
    pub fn new(table: Array2<f32>) -> Self {
        Self { table }
    }

    pub fn lookup(&self, index: usize) -> Result<ArrayView1<'_, f32>> {
        if index >= self.table.nrows() {
            return Err(TranslationError::TokenOutOfRange {
                index,
                size: self.table.nrows(),
            });
        }
        Ok(self.table.row(index))
    }
}

/// Hidden and cell state carried between LSTM steps
#[derive(Debug, Clone, PartialEq)]
pub struct LstmState {
    pub h: Array1<f32>,
    pub c: Array1<f32>,
}

impl LstmState {
    pub fn zeros(units: usize) -> Self {
        Self {
            h: Array1::zeros(units),
            c: Array1::zeros(units),
        }
    }
}

/// Single-layer LSTM with Keras weight layout.
///
/// `kernel` is `[input_dim, 4 * units]` and `recurrent_kernel` is
/// `[units, 4 * units]`, with the four gate blocks ordered input, forget,
/// cell candidate, output.
#[derive(Debug, Clone)]
pub struct Lstm {
    kernel: Array2<f32>,
    recurrent_kernel: Array2<f32>,
    bias: Array1<f32>,
    units: usize,
}

impl Lstm {
    pub fn new(kernel: Array2<f32>, recurrent_kernel: Array2<f32>, bias: Array1<f32>) -> Self {
        let units = recurrent_kernel.nrows();
        Self {
            kernel,
            recurrent_kernel,
            bias,
            units,
        }
    }

    pub fn units(&self) -> usize {
        self.units
    }

    /// Advance one timestep
    pub fn step(&self, x: ArrayView1<'_, f32>, state: &LstmState) -> LstmState {
        let u = self.units;
        let z = x.dot(&self.kernel) + state.h.dot(&self.recurrent_kernel) + &self.bias;

        let i = z.slice(s![0..u]).mapv(sigmoid);
        let f = z.slice(s![u..2 * u]).mapv(sigmoid);
        let g = z.slice(s![2 * u..3 * u]).mapv(f32::tanh);
        let o = z.slice(s![3 * u..4 * u]).mapv(sigmoid);

        let c = &f * &state.c + &i * &g;
        let h = &o * &c.mapv(f32::tanh);
        LstmState { h, c }
    }

    /// Fold the cell over every row of `inputs`, returning the final state
    pub fn run<'a, I>(&self, inputs: I, initial: LstmState) -> LstmState
    where
        I: IntoIterator<Item = ArrayView1<'a, f32>>,
    {
        inputs
            .into_iter()
            .fold(initial, |state, x| self.step(x, &state))
    }
}

/// Fully connected layer, `kernel` is `[input_dim, output_dim]`
#[derive(Debug, Clone)]
pub struct Dense {
    kernel: Array2<f32>,
    bias: Array1<f32>,
}

impl Dense {
    pub fn new(kernel: Array2<f32>, bias: Array1<f32>) -> Self {
        Self { kernel, bias }
    }

    pub fn forward(&self, x: ArrayView1<'_, f32>) -> Array1<f32> {
        x.dot(&self.kernel) + &self.bias
    }
}

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Numerically stable softmax
pub fn softmax(logits: ArrayView1<'_, f32>) -> Array1<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp = logits.mapv(|v| (v - max).exp());
    let sum = exp.sum();
    exp / sum
}

/// Index of the largest value; the first one wins on ties
pub fn argmax(values: ArrayView1<'_, f32>) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}
