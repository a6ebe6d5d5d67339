use serde::Serialize;

use super::frequency_mapping::Successors;
use super::prediction_model::TrainedModel;
use super::tokenizer::normalize;

/// Maximum number of suggestions returned by any query.
pub const MAX_RESULTS: usize = 15;

/// A next-word suggestion with its relative frequency.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct PredictionResult {
	pub word: String,
	/// Share of this successor among all successors of the context (0..=1).
	pub confidence: f64,
	/// Raw number of times the word followed the context.
	pub frequency: u64,
}

/// A word completion with its heuristic score.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CompletionResult {
	pub word: String,
	pub confidence: f64,
	/// Fraction of the word already typed (0..=1).
	pub prefix_match: f64,
}

/// Read-only query interface over a trained model.
///
/// Only obtainable from a model in the `Ready` state, so queries never
/// have to check for initialization.
#[derive(Clone, Copy, Debug)]
pub struct PredictionEngine<'a> {
	model: &'a TrainedModel,
}

impl<'a> PredictionEngine<'a> {
	pub fn new(model: &'a TrainedModel) -> Self {
		Self { model }
	}

	/// Predicts the words most likely to follow `context`.
	///
	/// Successors are sorted by descending count; ties keep the order in
	/// which they were first seen in the sentence corpus. Unknown contexts
	/// give an empty list.
	pub fn predict_next(&self, context: &str) -> Vec<String> {
		match self.model.sentence_predictions().successors(&normalize(context)) {
			Some(successors) => ranked(successors)
				.into_iter()
				.map(|(word, _)| word.to_owned())
				.collect(),
			None => Vec::new(),
		}
	}

	/// Same as [`predict_next`](Self::predict_next), with the relative
	/// frequency of each successor as its confidence.
	///
	/// Confidences are rounded independently to two decimals, so their sum
	/// is only approximately 1.
	pub fn predict_next_with_confidence(&self, context: &str) -> Vec<PredictionResult> {
		let Some(successors) = self.model.sentence_predictions().successors(&normalize(context)) else {
			return Vec::new();
		};

		let total = successors.total() as f64;
		ranked(successors)
			.into_iter()
			.map(|(word, frequency)| PredictionResult {
				word: word.to_owned(),
				confidence: round2(frequency as f64 / total),
				frequency,
			})
			.collect()
	}

	/// Lists known words starting with `prefix`, in lexicographic order.
	pub fn complete(&self, prefix: &str) -> Vec<String> {
		self.completions(&normalize(prefix)).to_vec()
	}

	/// Scores the completions of `prefix` and sorts them by confidence.
	///
	/// The score mixes how much of the word is already typed, how often the
	/// word occurs in the word corpus, and a preference for short words:
	/// `0.4 * prefix_match + 0.4 * frequency_factor + 0.2 * length_factor`.
	/// Only the first [`MAX_RESULTS`] lexicographic completions are scored.
	/// The length factor exceeds 1 for words under five characters; only the
	/// final score is clamped to `0..=1`.
	pub fn complete_with_confidence(&self, prefix: &str) -> Vec<CompletionResult> {
		let prefix = normalize(prefix);
		let typed = prefix.chars().count() as f64;

		let mut results: Vec<CompletionResult> = self
			.completions(&prefix)
			.iter()
			.map(|word| {
				let length = word.chars().count() as f64;
				let prefix_match = round2(typed / length);
				let frequency = self.model.word_predictions().occurrences(word) as f64;

				let length_factor = (1.0 - (length - 5.0) / 10.0).max(0.0);
				let frequency_factor = (frequency / 100.0).min(1.0);
				let confidence = prefix_match * 0.4 + frequency_factor * 0.4 + length_factor * 0.2;

				CompletionResult {
					word: word.clone(),
					confidence: round2(confidence.clamp(0.0, 1.0)),
					prefix_match,
				}
			})
			.collect();

		results.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
		results
	}

	fn completions(&self, prefix: &str) -> &'a [String] {
		match self.model.completions().get(prefix) {
			Some(words) => &words[..words.len().min(MAX_RESULTS)],
			None => &[],
		}
	}
}

/// Sorts successors by descending count (stable) and keeps the top results.
fn ranked(successors: &Successors) -> Vec<(&str, u64)> {
	let mut entries: Vec<(&str, u64)> = successors.iter().collect();
	entries.sort_by(|a, b| b.1.cmp(&a.1));
	entries.truncate(MAX_RESULTS);
	entries
}

/// Rounds the exact binary value of `value` to two decimal places,
/// sending exact halfway cases up (`0.075` is stored below its decimal
/// form and gives `0.07`, `0.125` is exact and gives `0.13`).
fn round2(value: f64) -> f64 {
	// Only multiples of 1/8 can sit exactly halfway between two hundredths
	let eighths = value * 8.0;
	if eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
		return (value * 100.0).round() / 100.0;
	}
	format!("{:.2}", value).parse().unwrap_or(value)
}
