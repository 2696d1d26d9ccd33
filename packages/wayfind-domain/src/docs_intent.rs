use std::sync::LazyLock;

use regex::Regex;

const DOC_NOUNS: &[&str] = &[
	"doc",
	"docs",
	"document",
	"documents",
	"documentation",
	"spec",
	"specs",
	"specification",
	"roadmap",
	"roadmaps",
	"readme",
	"design",
	"adr",
	"adrs",
	"rfc",
	"rfcs",
	"guide",
	"changelog",
	"notes",
	"plan",
	"plans",
];
const LOOKUP_VERBS: &[&str] =
	&["list", "find", "open", "show", "get", "read", "fetch", "where", "search", "lookup"];
const STOP_WORDS: &[&str] = &[
	"the", "and", "for", "with", "from", "that", "this", "these", "those", "what", "where",
	"which", "when", "who", "how", "are", "was", "were", "has", "have", "our", "your", "you",
	"all", "any", "into", "about", "please", "can", "could", "would", "should", "list", "find",
	"open", "show", "get", "read", "fetch", "search", "lookup", "doc", "docs", "document",
	"documents",
];

static CODE_MARKERS: LazyLock<Option<Regex>> = LazyLock::new(|| {
	Regex::new(
		r"(?i)(::|->|\w/\w|\\|\.(rs|ts|tsx|js|jsx|mjs|py|go|java|kt|rb|php|swift|cs|c|cc|cpp|h|hpp|vue|svelte|sql|sh)\b)",
	)
	.ok()
});

/// Whether the query reads like a request for project documentation rather than code.
pub fn looks_like_docs_lookup(query: &str) -> bool {
	let lower = query.trim().to_lowercase();

	if lower.is_empty() || has_code_markers(&lower) {
		return false;
	}

	let words = alphanumeric_runs(&lower);
	let has_noun = words.iter().any(|word| DOC_NOUNS.contains(word));
	let has_verb = words.iter().any(|word| LOOKUP_VERBS.contains(word));

	has_noun && has_verb
}

/// Lowercase alphanumeric runs of at least three characters, minus stop words. Order is kept and
/// duplicates are removed.
pub fn tokenize_query(query: &str) -> Vec<String> {
	let lower = query.to_lowercase();
	let mut out: Vec<String> = Vec::new();

	for word in alphanumeric_runs(&lower) {
		if word.chars().count() < 3 || STOP_WORDS.contains(&word) {
			continue;
		}
		if out.iter().any(|seen| seen == word) {
			continue;
		}

		out.push(word.to_string());
	}

	out
}

fn has_code_markers(lower: &str) -> bool {
	CODE_MARKERS.as_ref().map(|re| re.is_match(lower)).unwrap_or(false)
}

fn alphanumeric_runs(text: &str) -> Vec<&str> {
	text.split(|ch: char| !ch.is_alphanumeric()).filter(|word| !word.is_empty()).collect()
}
