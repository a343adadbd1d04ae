//! Core translation engine module

pub mod client;
pub mod config;
pub mod engine;
pub mod errors;
pub mod models;
pub mod vocab;
