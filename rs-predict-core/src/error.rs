use std::fmt;
use std::io;

/// Result type used across the crate, defaulting to [`PredictionError`].
pub type Result<T, E = PredictionError> = std::result::Result<T, E>;

/// Stage of [`PredictionModel::initialize`](crate::model::prediction_model::PredictionModel::initialize)
/// in which a failure happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitStage {
	/// Fetching the free-text sentence corpus.
	LoadSentences,
	/// Fetching the word-list corpus.
	LoadWords,
}

impl fmt::Display for InitStage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			InitStage::LoadSentences => "sentence corpus loading",
			InitStage::LoadWords => "word corpus loading",
		};
		f.write_str(name)
	}
}

/// Errors raised by the prediction model and its corpus loaders.
///
/// Query misses (unknown context, unknown prefix) are not errors: they
/// produce empty results.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
	/// A query was issued before a successful `initialize()`.
	#[error("prediction model not initialized, call initialize() first")]
	NotInitialized,

	/// The loader could not produce the text of a corpus file.
	#[error("error loading language file {filename}: {source}")]
	CorpusLoad {
		filename: String,
		#[source]
		source: io::Error,
	},

	/// Initialization was aborted; the model is left uninitialized.
	#[error("failed to initialize prediction model during {stage}: {source}")]
	Initialization {
		stage: InitStage,
		#[source]
		source: Box<PredictionError>,
	},

	/// A corpus loading thread panicked.
	#[error("corpus loader thread panicked: {0}")]
	LoaderPanic(String),

	/// The language identifier cannot name a language pack.
	#[error("unsupported language identifier '{0}'")]
	UnsupportedLanguage(String),
}

impl PredictionError {
	/// Wraps `self` into an [`PredictionError::Initialization`] for `stage`.
	pub(crate) fn during(self, stage: InitStage) -> Self {
		PredictionError::Initialization { stage, source: Box::new(self) }
	}

	/// Returns the failed stage when this is an initialization error.
	pub fn stage(&self) -> Option<InitStage> {
		match self {
			PredictionError::Initialization { stage, .. } => Some(*stage),
			_ => None,
		}
	}
}
