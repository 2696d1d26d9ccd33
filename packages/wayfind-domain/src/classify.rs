//! Deterministic query classification.
//!
//! `classify` picks a search mode from the query text alone. Rules are evaluated in a fixed
//! order and the first match wins. Output-format inference is independent of mode selection.

use crate::{OutputFormat, SearchMode};

pub const REASON_DEFAULT: &str = "default for broad discovery";
pub const REASON_TEAM: &str = "team or cross-project keywords detected";
pub const REASON_EXHAUSTIVE: &str = "query asks for all occurrences";
pub const REASON_QUOTED: &str = "quoted literal query";
pub const REASON_PATTERN: &str = "glob or regex syntax detected";
pub const REASON_IDENTIFIER: &str = "identifier-like symbol";
pub const REASON_QUESTION: &str = "natural-language question";

const TEAM_KEYWORDS: &[&str] = &[
	"team-wide",
	"team wide",
	"across projects",
	"across all projects",
	"across workspaces",
	"across all workspaces",
	"all workspaces",
	"cross-project",
	"cross project",
	"cross-workspace",
	"whole team",
	"entire team",
];
const EXHAUSTIVE_PHRASES: &[&str] = &[
	"find all",
	"all occurrences",
	"every occurrence",
	"every usage",
	"all usages",
	"every use of",
	"all uses of",
	"all references",
	"every reference",
	"all instances",
	"every instance",
];
const QUESTION_WORDS: &[&str] = &[
	"what", "how", "why", "where", "when", "which", "who", "whose", "does", "do", "is", "are",
	"can", "could", "should", "would", "will", "explain",
];
const COUNT_PREFIXES: &[&str] = &["how many", "count of", "number of"];
const REGEX_METACHARS: &[char] = &['+', '^', '$', '|', '(', ')', '[', ']', '{', '}', '\\'];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
	pub mode: SearchMode,
	pub reason: &'static str,
	/// The unquoted literal when the whole query was wrapped in quotes.
	pub literal: Option<String>,
}
impl Classification {
	fn new(mode: SearchMode, reason: &'static str) -> Self {
		Self { mode, reason, literal: None }
	}

	pub fn is_quoted(&self) -> bool {
		self.literal.is_some()
	}
}

pub fn classify(query: &str) -> Classification {
	let trimmed = query.trim();

	if trimmed.is_empty() {
		return Classification::new(SearchMode::Hybrid, REASON_DEFAULT);
	}

	let literal = unquote(trimmed);

	// Phrases inside a quoted literal are part of the literal.
	if literal.is_none() {
		let lower = trimmed.to_lowercase();

		if TEAM_KEYWORDS.iter().any(|phrase| contains_phrase(&lower, phrase)) {
			return Classification::new(SearchMode::Team, REASON_TEAM);
		}
		if EXHAUSTIVE_PHRASES.iter().any(|phrase| contains_phrase(&lower, phrase)) {
			return Classification::new(SearchMode::Exhaustive, REASON_EXHAUSTIVE);
		}
	}

	if let Some(literal) = literal {
		return Classification {
			mode: SearchMode::Keyword,
			reason: REASON_QUOTED,
			literal: Some(literal.to_string()),
		};
	}
	if has_pattern_syntax(trimmed) {
		return Classification::new(SearchMode::Pattern, REASON_PATTERN);
	}
	if is_identifier_like(trimmed) {
		return Classification::new(SearchMode::Refactor, REASON_IDENTIFIER);
	}
	// Count questions are answered from lexical matches, so they keep the hybrid default.
	if !has_count_intent(trimmed) && prefers_semantic(trimmed) {
		return Classification::new(SearchMode::Semantic, REASON_QUESTION);
	}

	Classification::new(SearchMode::Hybrid, REASON_DEFAULT)
}

/// Whether the query reads like a natural-language question, regardless of other rules.
pub fn prefers_semantic(query: &str) -> bool {
	let trimmed = query.trim();

	if trimmed.is_empty() {
		return false;
	}
	if trimmed.ends_with('?') {
		return true;
	}

	let mut words = trimmed.split_whitespace();
	let first = words
		.next()
		.map(|word| word.trim_matches(|ch: char| !ch.is_ascii_alphanumeric()).to_lowercase())
		.unwrap_or_default();

	if QUESTION_WORDS.contains(&first.as_str()) {
		return true;
	}

	1 + words.count() >= 3
}

pub fn infer_output_format(query: &str, mode: SearchMode) -> OutputFormat {
	if has_count_intent(query) {
		return OutputFormat::Count;
	}
	if matches!(mode, SearchMode::Refactor | SearchMode::Exhaustive)
		&& identifier_target(query).is_some()
	{
		return OutputFormat::Paths;
	}

	OutputFormat::Minimal
}

pub fn has_count_intent(query: &str) -> bool {
	let lower = query.trim().to_lowercase();

	if COUNT_PREFIXES.iter().any(|prefix| lower.starts_with(prefix)) {
		return true;
	}

	let without_mark = lower.trim_end_matches('?').trim_end();

	contains_phrase(&lower, "how many") && without_mark.ends_with("are there")
}

/// Returns the inner text when the whole query is wrapped in matching single or double quotes.
pub fn unquote(query: &str) -> Option<&str> {
	let trimmed = query.trim();
	let bytes = trimmed.as_bytes();

	if bytes.len() < 2 {
		return None;
	}

	let first = bytes[0];
	let last = bytes[bytes.len() - 1];

	if (first == b'"' || first == b'\'') && first == last {
		return Some(&trimmed[1..trimmed.len() - 1]);
	}

	None
}

pub fn has_pattern_syntax(query: &str) -> bool {
	if query.contains('*') || query.contains(REGEX_METACHARS) {
		return true;
	}

	let question_marks = query.matches('?').count();

	question_marks > 1 || (question_marks == 1 && !query.ends_with('?'))
}

/// A single token of `[A-Za-z0-9_:]` that is mixed-case, contains `_`, or is ALL-CAPS with at
/// least three characters.
pub fn is_identifier_like(query: &str) -> bool {
	let token = query.trim();

	if token.is_empty()
		|| !token.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == ':')
	{
		return false;
	}

	let has_upper = token.chars().any(|ch| ch.is_ascii_uppercase());
	let has_lower = token.chars().any(|ch| ch.is_ascii_lowercase());

	if has_upper && has_lower {
		return true;
	}
	if token.contains('_') {
		return true;
	}

	has_upper && !has_lower && token.len() >= 3
}

/// The identifier the query is about: the whole query, or its last token for phrase queries
/// such as "find all getUserById".
pub fn identifier_target(query: &str) -> Option<&str> {
	let trimmed = query.trim();

	if is_identifier_like(trimmed) {
		return Some(trimmed);
	}

	let last = trimmed
		.split_whitespace()
		.last()?
		.trim_matches(|ch: char| matches!(ch, '"' | '\'' | '`' | '?' | '.' | ','));

	is_identifier_like(last).then_some(last)
}

pub fn regex_escape(literal: &str) -> String {
	regex::escape(literal)
}

fn contains_phrase(haystack: &str, phrase: &str) -> bool {
	let mut start = 0;

	while let Some(pos) = haystack[start..].find(phrase) {
		let begin = start + pos;
		let end = begin + phrase.len();
		let before_ok =
			haystack[..begin].chars().next_back().is_none_or(|ch| !ch.is_alphanumeric());
		let after_ok = haystack[end..].chars().next().is_none_or(|ch| !ch.is_alphanumeric());

		if before_ok && after_ok {
			return true;
		}

		start = begin + phrase.len().max(1);

		if start >= haystack.len() {
			break;
		}
	}

	false
}
