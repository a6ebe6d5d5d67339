//! Lifecycle scenarios of the prediction model.

use std::fs;
use std::io;

use crate::error::{InitStage, PredictionError, Result};
use crate::loader::{CorpusLoader, MemoryCorpusLoader, LANGUAGE_PACK_DIR, SENTENCE_CORPUS, WORD_CORPUS};
use crate::model::metrics::ModelMetrics;
use crate::model::prediction_model::{Language, ModelConfig, PredictionModel};

const SENTENCES: &str = "The cat sat\nthe cat ran";
const WORDS: &str = "cat\ndog car\nfish cart";

fn ready_model() -> PredictionModel<MemoryCorpusLoader> {
	let loader = MemoryCorpusLoader::new().with_language(&Language::default(), SENTENCES, WORDS);
	let mut model = PredictionModel::with_loader(ModelConfig::default(), loader);
	model.initialize(None).unwrap();
	model
}

/// Fails for one file, serves fixed text for the other.
struct FailingLoader {
	failing: &'static str,
}

impl CorpusLoader for FailingLoader {
	fn load_corpus(&self, _language: &Language, filename: &str) -> Result<String> {
		if filename == self.failing {
			return Err(PredictionError::CorpusLoad {
				filename: filename.to_owned(),
				source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
			});
		}
		Ok("a b c".to_owned())
	}
}

struct PanickingLoader;

impl CorpusLoader for PanickingLoader {
	fn load_corpus(&self, _language: &Language, filename: &str) -> Result<String> {
		if filename == WORD_CORPUS {
			panic!("disk on fire");
		}
		Ok(String::new())
	}
}

#[test]
fn queries_fail_before_initialize() {
	let model = PredictionModel::with_loader(ModelConfig::default(), MemoryCorpusLoader::new());

	assert!(!model.is_initialized());
	assert!(matches!(model.predict_next("the"), Err(PredictionError::NotInitialized)));
	assert!(matches!(model.predict_next_with_confidence("the"), Err(PredictionError::NotInitialized)));
	assert!(matches!(model.complete("ca"), Err(PredictionError::NotInitialized)));
	assert!(matches!(model.complete_with_confidence("ca"), Err(PredictionError::NotInitialized)));
	assert!(model.engine().is_err());
}

#[test]
fn predicts_next_word_from_sentences() {
	let model = ready_model();

	assert!(model.is_initialized());
	assert_eq!(model.predict_next("the").unwrap(), vec!["cat"]);
	assert_eq!(model.predict_next("cat").unwrap(), vec!["sat", "ran"]);
	// The newline joins "sat" and "the"
	assert_eq!(model.predict_next("sat").unwrap(), vec!["the"]);
	assert!(model.predict_next("ran").unwrap().is_empty());
}

#[test]
fn completes_from_word_list() {
	let model = ready_model();

	assert_eq!(model.complete("ca").unwrap(), vec!["car", "cart", "cat"]);
	assert!(model.complete("xyz").unwrap().is_empty());
	assert!(model.complete("").unwrap().is_empty());
}

#[test]
fn confidences_stay_in_bounds() {
	let model = ready_model();

	let predictions = model.predict_next_with_confidence("cat").unwrap();
	assert_eq!(predictions.len(), 2);
	let sum: f64 = predictions.iter().map(|r| r.confidence).sum();
	assert!((sum - 1.0).abs() < 0.02);

	for prefix in ["c", "ca", "d", "fish"] {
		for result in model.complete_with_confidence(prefix).unwrap() {
			assert!((0.0..=1.0).contains(&result.confidence));
			assert!((0.0..=1.0).contains(&result.prefix_match));
		}
	}
}

#[test]
fn reset_is_idempotent_and_reinitializable() {
	let mut model = ready_model();
	let first_metrics = model.metrics();
	let first = model.complete_with_confidence("c").unwrap();

	model.reset();
	model.reset();
	assert!(!model.is_initialized());
	assert_eq!(model.metrics(), ModelMetrics::default());
	assert!(matches!(model.complete("ca"), Err(PredictionError::NotInitialized)));

	model.initialize(None).unwrap();
	assert_eq!(model.complete_with_confidence("c").unwrap(), first);
	assert_eq!(model.metrics().stats, first_metrics.stats);
}

#[test]
fn failed_load_leaves_model_uninitialized() {
	for (failing, stage) in [(SENTENCE_CORPUS, InitStage::LoadSentences), (WORD_CORPUS, InitStage::LoadWords)] {
		let mut model = PredictionModel::with_loader(ModelConfig::default(), FailingLoader { failing });

		let err = model.initialize(None).unwrap_err();
		assert_eq!(err.stage(), Some(stage));
		match err {
			PredictionError::Initialization { source, .. } => {
				assert!(matches!(*source, PredictionError::CorpusLoad { ref filename, .. } if filename == failing));
			}
			other => panic!("unexpected error: {other}"),
		}
		assert!(!model.is_initialized());
		assert_eq!(model.metrics(), ModelMetrics::default());
	}
}

#[test]
fn failed_reinitialize_drops_previous_state() {
	let language = Language::default();
	let loader = MemoryCorpusLoader::new().with_language(&language, SENTENCES, WORDS);
	let mut model = PredictionModel::with_loader(ModelConfig::default(), loader);
	model.initialize(None).unwrap();

	let err = model.initialize(Some(Language::new("fr").unwrap())).unwrap_err();
	assert_eq!(err.stage(), Some(InitStage::LoadSentences));
	assert!(!model.is_initialized());
	// The override is kept even though loading failed
	assert_eq!(model.language().as_str(), "fr");
}

#[test]
fn loader_panic_is_reported() {
	let mut model = PredictionModel::with_loader(ModelConfig::default(), PanickingLoader);

	let err = model.initialize(None).unwrap_err();
	assert_eq!(err.stage(), Some(InitStage::LoadWords));
	match err {
		PredictionError::Initialization { source, .. } => {
			assert!(matches!(*source, PredictionError::LoaderPanic(ref message) if message == "disk on fire"));
		}
		other => panic!("unexpected error: {other}"),
	}
	assert!(!model.is_initialized());
}

#[test]
fn initialize_switches_language() {
	let en = Language::default();
	let fr = Language::new("fr").unwrap();
	let loader = MemoryCorpusLoader::new()
		.with_language(&en, "hello world", "hello")
		.with_language(&fr, "bonjour monde", "bonjour");
	let mut model = PredictionModel::with_loader(ModelConfig::default(), loader);

	model.initialize(None).unwrap();
	assert_eq!(model.language(), &en);
	assert_eq!(model.predict_next("hello").unwrap(), vec!["world"]);

	model.initialize(Some(fr.clone())).unwrap();
	assert_eq!(model.language(), &fr);
	assert!(model.predict_next("hello").unwrap().is_empty());
	assert_eq!(model.complete("bon").unwrap(), vec!["bonjour"]);
}

#[test]
fn metrics_describe_built_structures() {
	let model = ready_model();
	let metrics = model.metrics();
	let trained = model.trained().unwrap();

	assert_eq!(metrics.stats.sentence_contexts, trained.sentence_predictions().len());
	assert_eq!(metrics.stats.word_contexts, trained.word_predictions().len());
	assert_eq!(metrics.stats.unique_words, 5);
	let mut vocabulary: Vec<&str> = trained.unique_words().iter().map(String::as_str).collect();
	vocabulary.sort_unstable();
	assert_eq!(vocabulary, vec!["car", "cart", "cat", "dog", "fish"]);
	assert_eq!(metrics.stats.completion_prefixes, trained.completions().len());
	assert!(metrics.initialization_ms >= 0.0);
}

#[test]
fn initializes_from_language_pack_on_disk() {
	let root = tempfile::tempdir().unwrap();
	let pack = root.path().join(LANGUAGE_PACK_DIR).join("en");
	fs::create_dir_all(&pack).unwrap();
	fs::write(pack.join(SENTENCE_CORPUS), SENTENCES).unwrap();
	fs::write(pack.join(WORD_CORPUS), WORDS).unwrap();

	let mut model = PredictionModel::new(ModelConfig::new(root.path()));
	model.initialize(None).unwrap();

	assert_eq!(model.predict_next("THE").unwrap(), vec!["cat"]);
	assert_eq!(model.complete("car").unwrap(), vec!["car", "cart"]);
}
