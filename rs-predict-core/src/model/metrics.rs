use std::time::Duration;

use serde::Serialize;

/// Time spent in each preprocessing stage, in milliseconds.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct PreprocessingTimes {
	pub sentences_ms: f64,
	pub words_ms: f64,
	pub completions_ms: f64,
}

/// Sizes of the structures built during initialization.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DataStats {
	pub unique_words: usize,
	pub word_contexts: usize,
	pub sentence_contexts: usize,
	pub completion_prefixes: usize,
}

/// Informational snapshot of the last initialization.
///
/// Not part of the prediction contract: values are only meant for
/// monitoring and are zeroed by `reset()`.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct ModelMetrics {
	pub initialization_ms: f64,
	pub preprocessing: PreprocessingTimes,
	pub stats: DataStats,
}

/// Converts a duration to fractional milliseconds.
pub(crate) fn millis(duration: Duration) -> f64 {
	duration.as_secs_f64() * 1000.0
}
