use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::thread;
use std::time::Instant;

use super::completion_index::CompletionIndex;
use super::engine::{CompletionResult, PredictionEngine, PredictionResult};
use super::frequency_mapping::FrequencyMapping;
use super::metrics::{millis, DataStats, ModelMetrics, PreprocessingTimes};
use super::tokenizer::tokenize;
use crate::error::{InitStage, PredictionError, Result};
use crate::loader::{CorpusLoader, FsCorpusLoader, SENTENCE_CORPUS, WORD_CORPUS};

/// Identifier of a language pack (ex. `"en"`).
///
/// The identifier names a directory, so it must be a single non-empty
/// path component.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Language(String);

impl Language {
	/// Validates and wraps a language identifier.
	///
	/// # Errors
	/// Returns [`PredictionError::UnsupportedLanguage`] for empty identifiers
	/// or identifiers containing path separators or dots only.
	pub fn new(identifier: &str) -> Result<Self> {
		let identifier = identifier.trim();
		let is_component = !identifier.is_empty()
			&& !identifier.chars().all(|c| c == '.')
			&& !identifier.contains(['/', '\\']);
		if !is_component {
			return Err(PredictionError::UnsupportedLanguage(identifier.to_owned()));
		}
		Ok(Self(identifier.to_owned()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Default for Language {
	fn default() -> Self {
		Self("en".to_owned())
	}
}

impl fmt::Display for Language {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl FromStr for Language {
	type Err = PredictionError;

	fn from_str(s: &str) -> Result<Self> {
		Self::new(s)
	}
}

/// Construction parameters of a [`PredictionModel`].
#[derive(Clone, Debug, PartialEq)]
pub struct ModelConfig {
	/// Data root containing the `language-pack` directory.
	pub path: PathBuf,
	/// Language loaded by `initialize(None)`.
	pub language: Language,
}

impl Default for ModelConfig {
	fn default() -> Self {
		Self { path: PathBuf::from("."), language: Language::default() }
	}
}

impl ModelConfig {
	pub fn new<P: AsRef<Path>>(path: P) -> Self {
		Self { path: path.as_ref().to_path_buf(), ..Self::default() }
	}

	pub fn with_language(mut self, language: Language) -> Self {
		self.language = language;
		self
	}
}

/// Every structure built from the corpora of one language.
///
/// Built in full before being published, then only read.
#[derive(Clone, Debug, Default)]
pub struct TrainedModel {
	sentence_predictions: FrequencyMapping,
	word_predictions: FrequencyMapping,
	completions: CompletionIndex,
	unique_words: HashSet<String>,
}

impl TrainedModel {
	/// Tokenizes both corpora and builds the mappings, recording the time
	/// spent in each stage into `times`.
	pub fn train(sentences: &str, words: &str, times: &mut PreprocessingTimes) -> Self {
		let start = Instant::now();
		let sentence_tokens = tokenize(sentences);
		log::debug!("Processing {} sentence tokens", sentence_tokens.len());
		let sentence_predictions = FrequencyMapping::build(&sentence_tokens);
		times.sentences_ms = millis(start.elapsed());

		let start = Instant::now();
		let word_tokens = tokenize(words);
		log::debug!("Processing {} word tokens", word_tokens.len());
		let unique_words: HashSet<String> = word_tokens.iter().cloned().collect();

		let completion_start = Instant::now();
		let completions = CompletionIndex::build(unique_words.iter().map(String::as_str));
		times.completions_ms = millis(completion_start.elapsed());

		let word_predictions = FrequencyMapping::build(&word_tokens);
		times.words_ms = millis(start.elapsed());

		Self { sentence_predictions, word_predictions, completions, unique_words }
	}

	/// Bigram counts of the free-text corpus.
	pub fn sentence_predictions(&self) -> &FrequencyMapping {
		&self.sentence_predictions
	}

	/// Bigram counts of the word-list corpus.
	pub fn word_predictions(&self) -> &FrequencyMapping {
		&self.word_predictions
	}

	pub fn completions(&self) -> &CompletionIndex {
		&self.completions
	}

	/// Distinct tokens of the word-list corpus.
	pub fn unique_words(&self) -> &HashSet<String> {
		&self.unique_words
	}

	fn stats(&self) -> DataStats {
		DataStats {
			unique_words: self.unique_words.len(),
			word_contexts: self.word_predictions.len(),
			sentence_contexts: self.sentence_predictions.len(),
			completion_prefixes: self.completions.len(),
		}
	}
}

/// Lifecycle state of a [`PredictionModel`].
#[derive(Debug, Default)]
enum ModelState {
	#[default]
	Uninitialized,
	Ready(TrainedModel),
}

/// Next-word predictor and word completer for one language.
///
/// The model starts uninitialized. `initialize()` loads the sentence and
/// word corpora through its [`CorpusLoader`] and publishes the trained
/// structures at once; `reset()` drops them again.
///
/// # Example
/// ```
/// use rs_predict_core::loader::MemoryCorpusLoader;
/// use rs_predict_core::model::prediction_model::{Language, ModelConfig, PredictionModel};
///
/// let loader = MemoryCorpusLoader::new()
/// 	.with_language(&Language::default(), "the cat sat the cat ran", "cat car cart");
/// let mut model = PredictionModel::with_loader(ModelConfig::default(), loader);
/// model.initialize(None)?;
///
/// assert_eq!(model.predict_next("the")?, vec!["cat"]);
/// assert_eq!(model.complete("ca")?, vec!["car", "cart", "cat"]);
/// # Ok::<(), rs_predict_core::error::PredictionError>(())
/// ```
#[derive(Debug)]
pub struct PredictionModel<L: CorpusLoader = FsCorpusLoader> {
	language: Language,
	loader: L,
	state: ModelState,
	metrics: ModelMetrics,
}

impl PredictionModel<FsCorpusLoader> {
	/// Creates a model reading its language packs from `config.path`.
	pub fn new(config: ModelConfig) -> Self {
		let loader = FsCorpusLoader::new(&config.path);
		Self::with_loader(config, loader)
	}
}

impl<L: CorpusLoader> PredictionModel<L> {
	/// Creates a model fetching its corpora through `loader`.
	///
	/// `config.path` is only used by [`PredictionModel::new`].
	pub fn with_loader(config: ModelConfig, loader: L) -> Self {
		Self {
			language: config.language,
			loader,
			state: ModelState::Uninitialized,
			metrics: ModelMetrics::default(),
		}
	}

	/// Loads and preprocesses the corpora of the current language.
	///
	/// `language` replaces the configured language before loading; the
	/// replacement is kept even when loading fails.
	///
	/// Any previously trained state is dropped first. The new structures
	/// are only published once they are complete, so on failure the model
	/// is left uninitialized.
	///
	/// # Errors
	/// Returns [`PredictionError::Initialization`] naming the stage that
	/// failed and wrapping its cause.
	pub fn initialize(&mut self, language: Option<Language>) -> Result<()> {
		let start = Instant::now();
		if let Some(language) = language {
			self.language = language;
		}
		self.reset();

		log::info!("Initializing prediction model with language: {}", self.language);

		let (sentences, words) = match self.load_corpora() {
			Ok(corpora) => corpora,
			Err(e) => {
				log::warn!("Prediction model initialization failed: {}", e);
				return Err(e);
			}
		};
		log::info!(
			"Loaded corpora in {:.2}ms ({} + {} bytes)",
			millis(start.elapsed()),
			sentences.len(),
			words.len()
		);

		let mut preprocessing = PreprocessingTimes::default();
		let trained = TrainedModel::train(&sentences, &words, &mut preprocessing);

		self.metrics = ModelMetrics {
			initialization_ms: millis(start.elapsed()),
			preprocessing,
			stats: trained.stats(),
		};
		self.state = ModelState::Ready(trained);

		log::info!(
			"Prediction model ready in {:.2}ms: {} sentence contexts, {} unique words, {} completion prefixes",
			self.metrics.initialization_ms,
			self.metrics.stats.sentence_contexts,
			self.metrics.stats.unique_words,
			self.metrics.stats.completion_prefixes
		);
		Ok(())
	}

	/// Fetches both corpora concurrently.
	fn load_corpora(&self) -> Result<(String, String)> {
		let language = &self.language;
		let loader = &self.loader;

		thread::scope(|scope| {
			let sentences = scope.spawn(move || loader.load_corpus(language, SENTENCE_CORPUS));
			let words = scope.spawn(move || loader.load_corpus(language, WORD_CORPUS));

			// Join both before inspecting either, an unjoined panicking thread would panic the scope
			let (sentences, words) = (sentences.join(), words.join());

			let sentences = join_load(sentences).map_err(|e| e.during(InitStage::LoadSentences))?;
			let words = join_load(words).map_err(|e| e.during(InitStage::LoadWords))?;
			Ok((sentences, words))
		})
	}

	/// Drops every trained structure and zeroes the metrics.
	///
	/// Idempotent; the model can be initialized again afterwards.
	pub fn reset(&mut self) {
		if let ModelState::Ready(_) = self.state {
			log::info!("Resetting prediction model");
		}
		self.state = ModelState::Uninitialized;
		self.metrics = ModelMetrics::default();
	}

	pub fn is_initialized(&self) -> bool {
		matches!(self.state, ModelState::Ready(_))
	}

	/// Returns the current language.
	pub fn language(&self) -> &Language {
		&self.language
	}

	/// Returns a snapshot of the last initialization metrics.
	pub fn metrics(&self) -> ModelMetrics {
		self.metrics
	}

	/// Returns the trained structures.
	///
	/// # Errors
	/// Returns [`PredictionError::NotInitialized`] before a successful
	/// `initialize()`.
	pub fn trained(&self) -> Result<&TrainedModel> {
		match &self.state {
			ModelState::Ready(trained) => Ok(trained),
			ModelState::Uninitialized => Err(PredictionError::NotInitialized),
		}
	}

	/// Returns a query engine over the trained structures.
	///
	/// # Errors
	/// Returns [`PredictionError::NotInitialized`] before a successful
	/// `initialize()`.
	pub fn engine(&self) -> Result<PredictionEngine<'_>> {
		self.trained().map(PredictionEngine::new)
	}

	/// See [`PredictionEngine::predict_next`].
	pub fn predict_next(&self, text: &str) -> Result<Vec<String>> {
		let start = Instant::now();
		let results = self.engine()?.predict_next(text);
		log::debug!("Prediction for {:?} - {} results ({:.0}μs)", text, results.len(), millis(start.elapsed()) * 1000.0);
		Ok(results)
	}

	/// See [`PredictionEngine::predict_next_with_confidence`].
	pub fn predict_next_with_confidence(&self, text: &str) -> Result<Vec<PredictionResult>> {
		let start = Instant::now();
		let results = self.engine()?.predict_next_with_confidence(text);
		log::debug!(
			"Prediction with confidence for {:?} - {} results ({:.0}μs)",
			text,
			results.len(),
			millis(start.elapsed()) * 1000.0
		);
		Ok(results)
	}

	/// See [`PredictionEngine::complete`].
	pub fn complete(&self, prefix: &str) -> Result<Vec<String>> {
		let start = Instant::now();
		let results = self.engine()?.complete(prefix);
		log::debug!("Completion for {:?} - {} results ({:.0}μs)", prefix, results.len(), millis(start.elapsed()) * 1000.0);
		Ok(results)
	}

	/// See [`PredictionEngine::complete_with_confidence`].
	pub fn complete_with_confidence(&self, prefix: &str) -> Result<Vec<CompletionResult>> {
		let start = Instant::now();
		let results = self.engine()?.complete_with_confidence(prefix);
		log::debug!(
			"Completion with confidence for {:?} - {} results ({:.0}μs)",
			prefix,
			results.len(),
			millis(start.elapsed()) * 1000.0
		);
		Ok(results)
	}
}

/// Flattens the outcome of a loader thread.
fn join_load(joined: thread::Result<Result<String>>) -> Result<String> {
	match joined {
		Ok(loaded) => loaded,
		Err(payload) => {
			let message = payload
				.downcast_ref::<&str>()
				.map(|s| (*s).to_owned())
				.or_else(|| payload.downcast_ref::<String>().cloned())
				.unwrap_or_else(|| "unknown panic".to_owned());
			Err(PredictionError::LoaderPanic(message))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn language_rejects_path_like_identifiers() {
		assert_eq!(Language::new(" fr ").unwrap().as_str(), "fr");
		for invalid in ["", "  ", "..", "en/../x", "a\\b"] {
			assert!(matches!(Language::new(invalid), Err(PredictionError::UnsupportedLanguage(_))));
		}
	}

	#[test]
	fn language_parses_from_str() {
		let language: Language = "de".parse().unwrap();
		assert_eq!(language.to_string(), "de");
	}

	#[test]
	fn config_defaults() {
		let config = ModelConfig::default();
		assert_eq!(config.path, PathBuf::from("."));
		assert_eq!(config.language.as_str(), "en");
	}

	#[test]
	fn train_records_stats() {
		let trained = TrainedModel::train("a b a", "cat car cat", &mut PreprocessingTimes::default());
		let stats = trained.stats();

		assert_eq!(stats.sentence_contexts, 2);
		assert_eq!(stats.unique_words, 2);
		assert_eq!(stats.unique_words, trained.unique_words().len());
		assert!(trained.unique_words().contains("car"));
		assert_eq!(stats.word_contexts, 2);
		// c, ca, cat, car
		assert_eq!(stats.completion_prefixes, 4);
	}
}
