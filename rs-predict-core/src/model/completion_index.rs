use std::collections::{HashMap, HashSet};

/// Maps every prefix of every known word to the words sharing it.
///
/// # Invariants
/// - A word of `L` characters appears under exactly `L` prefixes
/// - A word appears at most once per prefix
/// - Each word list is sorted lexicographically (ascending)
///
/// Prefix lengths are counted in characters, so multi-byte words are never
/// split inside a character.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompletionIndex {
	prefixes: HashMap<String, Vec<String>>,
}

impl CompletionIndex {
	/// Builds the index from a set of words.
	///
	/// All words are appended to their prefix lists first and every list is
	/// sorted once at the end. Duplicate input words are ignored.
	pub fn build<'a, I>(words: I) -> Self
	where
		I: IntoIterator<Item = &'a str>,
	{
		let mut prefixes: HashMap<String, Vec<String>> = HashMap::new();
		let mut seen: HashSet<&str> = HashSet::new();

		for word in words {
			if word.is_empty() || !seen.insert(word) {
				continue;
			}
			// Every prefix of a distinct word is distinct, so no duplicate check is needed
			for (offset, c) in word.char_indices() {
				let prefix = &word[..offset + c.len_utf8()];
				match prefixes.get_mut(prefix) {
					Some(list) => list.push(word.to_owned()),
					None => {
						prefixes.insert(prefix.to_owned(), vec![word.to_owned()]);
					}
				}
			}
		}

		for list in prefixes.values_mut() {
			list.sort_unstable();
		}

		Self { prefixes }
	}

	/// Returns the sorted words starting with `prefix` (exact key match).
	pub fn get(&self, prefix: &str) -> Option<&[String]> {
		self.prefixes.get(prefix).map(Vec::as_slice)
	}

	/// Number of distinct prefixes.
	pub fn len(&self) -> usize {
		self.prefixes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.prefixes.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn single_word_has_one_entry_per_character() {
		for word in ["a", "zz", "cart", "éte", "aaaa"] {
			let index = CompletionIndex::build([word]);
			assert_eq!(index.len(), word.chars().count(), "{word}");
			for end in word.char_indices().map(|(start, c)| start + c.len_utf8()) {
				assert_eq!(index.get(&word[..end]), Some(&[word.to_owned()][..]), "{word}");
			}
			assert!(index.get(&format!("{word}s")).is_none());
		}
	}

	#[test]
	fn lists_are_sorted() {
		let index = CompletionIndex::build(["cat", "cart", "car", "dog"]);

		assert_eq!(index.get("ca").unwrap(), ["car", "cart", "cat"]);
		assert_eq!(index.get("car").unwrap(), ["car", "cart"]);
		assert_eq!(index.get("d").unwrap(), ["dog"]);
	}

	#[test]
	fn duplicates_are_listed_once() {
		let index = CompletionIndex::build(["hi", "hi", "hit"]);
		assert_eq!(index.get("h").unwrap(), ["hi", "hit"]);
	}

	#[test]
	fn prefixes_respect_char_boundaries() {
		let index = CompletionIndex::build(["éte"]);

		assert_eq!(index.len(), 3);
		assert_eq!(index.get("é").unwrap(), ["éte"]);
		assert_eq!(index.get("ét").unwrap(), ["éte"]);
	}

	#[test]
	fn empty_input_builds_empty_index() {
		assert!(CompletionIndex::build(std::iter::empty()).is_empty());
	}
}
