//! Next-word prediction and word completion library.
//!
//! This crate provides a small statistical text-entry model including:
//! - Corpus tokenization
//! - Bigram frequency mappings for a sentence corpus and a word corpus
//! - A prefix completion index
//! - Frequency and heuristic confidence scoring of suggestions
//! - Corpus loading from language packs on disk or in memory
//!
//! The model is rebuilt from its corpora on every initialization; nothing
//! is persisted.

/// Prediction model, its building blocks and the query engine.
pub mod model;

/// Corpus loaders (language packs on disk, in-memory corpora).
pub mod loader;

/// Error taxonomy shared by the model and loaders.
pub mod error;

#[cfg(test)]
mod tests;
