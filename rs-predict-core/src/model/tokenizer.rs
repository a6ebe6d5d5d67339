/// Splits raw corpus text into a flat sequence of lowercase tokens.
///
/// - Lowercases the entire input
/// - Replaces every `\n` with a single space, then splits on single spaces
/// - Drops empty and whitespace-only fragments
///
/// Punctuation is kept as part of the token, no stemming is applied.
pub fn tokenize(raw: &str) -> Vec<String> {
	raw.to_lowercase()
		.replace('\n', " ")
		.split(' ')
		.filter(|fragment| !fragment.trim().is_empty())
		.map(str::to_owned)
		.collect()
}

/// Normalizes a query (context or prefix) to the form used as a lookup key.
pub fn normalize(input: &str) -> String {
	input.to_lowercase().trim().to_owned()
}
