//! Numeric building blocks for recurrent inference

pub mod layers;
pub mod weights;

#[cfg(test)]
pub(crate) mod fixtures;
