use std::collections::HashMap;

/// Successor tokens observed after a single context token.
///
/// Conceptually a node of a first-order Markov chain: outgoing edges are
/// weighted by their number of observations.
///
/// ## Invariants
/// - Each occurrence count is strictly positive
/// - Iteration follows the order in which successors were first seen
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Successors {
	/// Position of each successor inside `entries`.
	index: HashMap<String, usize>,
	/// Successors and their counts, in first-seen order.
	entries: Vec<(String, u64)>,
	/// Sum of all counts.
	total: u64,
}

impl Successors {
	/// Records an occurrence of `next` after this context.
	///
	/// - If the successor already exists, its count is increased.
	/// - Otherwise it is appended with an initial count of 1.
	fn add(&mut self, next: &str) {
		match self.index.get(next) {
			Some(&position) => self.entries[position].1 += 1,
			None => {
				self.index.insert(next.to_owned(), self.entries.len());
				self.entries.push((next.to_owned(), 1));
			}
		}
		self.total += 1;
	}

	/// Returns how many times `word` followed this context.
	pub fn get(&self, word: &str) -> Option<u64> {
		self.index.get(word).map(|&position| self.entries[position].1)
	}

	/// Sum of the counts of every successor.
	pub fn total(&self) -> u64 {
		self.total
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates over `(successor, count)` in first-seen order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
		self.entries.iter().map(|(word, count)| (word.as_str(), *count))
	}
}

/// Bigram co-occurrence counts built from a token sequence.
///
/// Maps each token (the context) to the tokens that directly follow it,
/// with the number of times each pair was observed. Counts are raw: any
/// normalization happens at query time.
///
/// # Invariants
/// - Every context has a non-empty `Successors`
/// - Counts only grow until the whole mapping is dropped
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrequencyMapping {
	contexts: HashMap<String, Successors>,
	/// Number of times each token appeared as the right member of a pair.
	incoming: HashMap<String, u64>,
}

impl FrequencyMapping {
	/// Counts every adjacent pair `(tokens[i], tokens[i + 1])`.
	///
	/// Sequences shorter than two tokens produce an empty mapping.
	pub fn build<S: AsRef<str>>(tokens: &[S]) -> Self {
		let mut mapping = Self::default();
		for pair in tokens.windows(2) {
			mapping.add_pair(pair[0].as_ref(), pair[1].as_ref());
		}
		mapping
	}

	fn add_pair(&mut self, current: &str, next: &str) {
		// Avoid allocating the key when the context already exists
		match self.contexts.get_mut(current) {
			Some(successors) => successors.add(next),
			None => {
				let mut successors = Successors::default();
				successors.add(next);
				self.contexts.insert(current.to_owned(), successors);
			}
		}
		*self.incoming.entry(next.to_owned()).or_insert(0) += 1;
	}

	/// Returns the successors observed after `context` (exact match).
	pub fn successors(&self, context: &str) -> Option<&Successors> {
		self.contexts.get(context)
	}

	/// Total occurrences of `word` as either member of any counted pair.
	///
	/// This is the number of pairs where `word` is the context plus the
	/// number of pairs where it is the successor, so a self-pair
	/// (`word word`) is counted on both sides.
	pub fn occurrences(&self, word: &str) -> u64 {
		let outgoing = self.contexts.get(word).map_or(0, Successors::total);
		let incoming = self.incoming.get(word).copied().unwrap_or(0);
		outgoing + incoming
	}

	/// Iterates over every context token.
	pub fn contexts(&self) -> impl Iterator<Item = &str> {
		self.contexts.keys().map(String::as_str)
	}

	/// Number of distinct contexts.
	pub fn len(&self) -> usize {
		self.contexts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.contexts.is_empty()
	}
}
