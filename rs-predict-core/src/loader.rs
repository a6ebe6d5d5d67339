use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::{env, fs};

use crate::error::{PredictionError, Result};
use crate::model::prediction_model::Language;

/// Free-text corpus used for next-word prediction.
pub const SENTENCE_CORPUS: &str = "paragraphs.txt";

/// Word-list corpus used for completion and word frequencies.
pub const WORD_CORPUS: &str = "words.txt";

/// Directory, under the data root, holding one sub-directory per language.
pub const LANGUAGE_PACK_DIR: &str = "language-pack";

/// Source of corpus text for a language.
///
/// Implementations must return the whole text of the requested file, or a
/// [`PredictionError::CorpusLoad`] naming it. Both corpora of a language
/// are fetched concurrently, hence the `Sync` bound.
pub trait CorpusLoader: Sync {
	fn load_corpus(&self, language: &Language, filename: &str) -> Result<String>;
}

/// Loads corpora from `{root}/language-pack/{language}/{filename}`.
#[derive(Clone, Debug)]
pub struct FsCorpusLoader {
	root: PathBuf,
}

impl FsCorpusLoader {
	/// Creates a loader rooted at `root`.
	///
	/// `"."` and `"./"` resolve to the current working directory.
	pub fn new<P: AsRef<Path>>(root: P) -> Self {
		Self { root: normalize_folder(root.as_ref()) }
	}

	/// Path of `filename` inside the pack of `language`.
	pub fn corpus_path(&self, language: &Language, filename: &str) -> PathBuf {
		self.root.join(LANGUAGE_PACK_DIR).join(language.as_str()).join(filename)
	}
}

impl CorpusLoader for FsCorpusLoader {
	fn load_corpus(&self, language: &Language, filename: &str) -> Result<String> {
		let path = self.corpus_path(language, filename);
		log::debug!("Loading corpus {}", path.display());
		read_file(&path).map_err(|source| PredictionError::CorpusLoad {
			filename: filename.to_owned(),
			source,
		})
	}
}

/// Serves corpora held in memory, keyed by language and file name.
///
/// Useful to embed small corpora in a binary or to drive tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryCorpusLoader {
	files: HashMap<(String, String), String>,
}

impl MemoryCorpusLoader {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers both corpora of `language`.
	pub fn with_language(mut self, language: &Language, sentences: &str, words: &str) -> Self {
		self.insert(language, SENTENCE_CORPUS, sentences);
		self.insert(language, WORD_CORPUS, words);
		self
	}

	/// Registers (or replaces) a single file.
	pub fn insert(&mut self, language: &Language, filename: &str, text: &str) {
		self.files.insert((language.as_str().to_owned(), filename.to_owned()), text.to_owned());
	}
}

impl CorpusLoader for MemoryCorpusLoader {
	fn load_corpus(&self, language: &Language, filename: &str) -> Result<String> {
		let key = (language.as_str().to_owned(), filename.to_owned());
		self.files.get(&key).cloned().ok_or_else(|| PredictionError::CorpusLoad {
			filename: filename.to_owned(),
			source: io::Error::new(
				io::ErrorKind::NotFound,
				format!("no {} corpus registered for language '{}'", filename, language),
			),
		})
	}
}

/// Reads a whole text file into memory.
fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents)
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub fn normalize_folder(input: &Path) -> PathBuf {
	if input == Path::new(".") || input == Path::new("./") {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		input.to_path_buf()
	}
}

/// Lists the language packs available under `root`, sorted by name.
///
/// A language pack is any directory directly inside
/// `{root}/language-pack`; its name is the language identifier.
pub fn list_languages<P: AsRef<Path>>(root: P) -> io::Result<Vec<String>> {
	let pack_dir = normalize_folder(root.as_ref()).join(LANGUAGE_PACK_DIR);
	let mut languages = Vec::new();

	for entry in fs::read_dir(pack_dir)? {
		let path = entry?.path();
		if path.is_dir() {
			if let Some(name) = path.file_name() {
				languages.push(name.to_string_lossy().to_string());
			}
		}
	}

	languages.sort();
	Ok(languages)
}
