//! Top-level module for the prediction model.
//!
//! This module provides:
//! - Corpus tokenization (`tokenizer`)
//! - Bigram successor counts (`FrequencyMapping`)
//! - Prefix to word completion lists (`CompletionIndex`)
//! - The read-only query interface (`PredictionEngine`)
//! - Lifecycle management (`PredictionModel`)
//! - Initialization metrics (`ModelMetrics`)

/// Lifecycle controller owning the trained structures.
///
/// Loads corpora, trains the mappings and exposes initialize/reset and
/// the query surface.
pub mod prediction_model;

/// Scoring and ranking of next-word predictions and completions.
pub mod engine;

/// First-order (bigram) successor counts.
pub mod frequency_mapping;

/// Prefix to sorted word list index.
pub mod completion_index;

/// Corpus text to token sequence.
pub mod tokenizer;

/// Informational initialization metrics.
pub mod metrics;
