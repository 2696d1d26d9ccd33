use wayfind_domain::{
	OutputFormat, SearchMode,
	classify::{self, REASON_DEFAULT},
	docs_intent,
};

#[test]
fn empty_query_defaults_to_hybrid() {
	for query in ["", "   ", "\t\n"] {
		let classification = classify::classify(query);

		assert_eq!(classification.mode, SearchMode::Hybrid);
		assert_eq!(classification.reason, "default for broad discovery");
		assert!(classification.literal.is_none());
	}
}

#[test]
fn quoted_queries_are_keyword_with_literal() {
	let cases = [
		("\"getUserById\"", "getUserById"),
		("'find all users'", "find all users"),
		("\"across projects\"", "across projects"),
		("\"foo*bar\"", "foo*bar"),
		("\"\"", ""),
		("\"how does auth work?\"", "how does auth work?"),
	];

	for (query, literal) in cases {
		let classification = classify::classify(query);

		assert_eq!(classification.mode, SearchMode::Keyword, "query: {query}");
		assert_eq!(classification.literal.as_deref(), Some(literal), "query: {query}");
	}
}

#[test]
fn mismatched_quotes_are_not_literals() {
	assert_ne!(classify::classify("\"getUserById'").mode, SearchMode::Keyword);
	assert!(classify::classify("\"").literal.is_none());
}

#[test]
fn team_keywords_win_first() {
	for query in ["team-wide auth helpers", "search across projects for retry logic"] {
		assert_eq!(classify::classify(query).mode, SearchMode::Team, "query: {query}");
	}
}

#[test]
fn all_occurrence_phrases_are_exhaustive() {
	for query in ["find all getUserById", "every usage of parseConfig", "all occurrences of TODO"]
	{
		assert_eq!(classify::classify(query).mode, SearchMode::Exhaustive, "query: {query}");
	}
}

#[test]
fn wildcards_and_regex_syntax_are_patterns() {
	for query in [
		"*.rs",
		"src/**/mod.rs",
		"fn\\s+main",
		"^use tokio",
		"get(User|Account)",
		"foo+",
		"user?name",
		"config$",
		"what??",
	] {
		assert_eq!(classify::classify(query).mode, SearchMode::Pattern, "query: {query}");
	}
}

#[test]
fn trailing_question_mark_is_not_a_pattern() {
	assert_eq!(classify::classify("where is auth configured?").mode, SearchMode::Semantic);
	assert_eq!(classify::classify("auth?").mode, SearchMode::Semantic);
}

#[test]
fn identifier_like_tokens_are_refactor() {
	for query in ["getUserById", "user_id", "MAX_RETRIES", "TODO", "HTTP2", "_private", "Config"] {
		assert_eq!(classify::classify(query).mode, SearchMode::Refactor, "query: {query}");
	}
}

#[test]
fn plain_lowercase_and_short_caps_are_not_identifiers() {
	assert_eq!(classify::classify("auth").mode, SearchMode::Hybrid);
	assert_eq!(classify::classify("OK").mode, SearchMode::Hybrid);
	assert_eq!(classify::classify("std::fs").mode, SearchMode::Hybrid);
	assert_eq!(classify::classify("retry logic").mode, SearchMode::Hybrid);
}

#[test]
fn questions_and_long_phrases_are_semantic() {
	for query in [
		"how does the session refresh work",
		"why is login slow",
		"token refresh after expiry handling",
	] {
		let classification = classify::classify(query);

		assert_eq!(classification.mode, SearchMode::Semantic, "query: {query}");
		assert_eq!(classification.reason, classify::REASON_QUESTION);
	}
}

#[test]
fn count_question_stays_hybrid_and_infers_count_format() {
	let query = "how many TODO comments are there";
	let classification = classify::classify(query);

	assert_eq!(classification.mode, SearchMode::Hybrid);
	assert_eq!(classification.reason, REASON_DEFAULT);
	assert!(!classification.reason.contains("how many"));
	assert_eq!(classify::infer_output_format(query, classification.mode), OutputFormat::Count);
	assert!(classify::prefers_semantic(query));
}

#[test]
fn count_prefixes_force_count_format() {
	for query in ["count of unsafe blocks", "number of open handlers", "so how many retries are there?"]
	{
		assert!(classify::has_count_intent(query), "query: {query}");
		assert_eq!(
			classify::infer_output_format(query, SearchMode::Hybrid),
			OutputFormat::Count,
			"query: {query}"
		);
	}
}

#[test]
fn identifier_queries_under_refactor_or_exhaustive_prefer_paths() {
	assert_eq!(
		classify::infer_output_format("getUserById", SearchMode::Refactor),
		OutputFormat::Paths
	);
	assert_eq!(
		classify::infer_output_format("find all getUserById", SearchMode::Exhaustive),
		OutputFormat::Paths
	);
	assert_eq!(
		classify::infer_output_format("getUserById", SearchMode::Keyword),
		OutputFormat::Minimal
	);
	assert_eq!(
		classify::infer_output_format("find all users", SearchMode::Exhaustive),
		OutputFormat::Minimal
	);
}

#[test]
fn regex_escape_quotes_metacharacters() {
	assert_eq!(classify::regex_escape("a.b(c)"), "a\\.b\\(c\\)");
	assert_eq!(classify::regex_escape("getUserById"), "getUserById");
}

#[test]
fn classification_is_deterministic() {
	for query in ["getUserById", "how does auth work", "\"x\"", "*.ts", ""] {
		assert_eq!(classify::classify(query), classify::classify(query));
	}
}

#[test]
fn docs_lookups_need_noun_and_verb() {
	assert!(docs_intent::looks_like_docs_lookup("list the roadmap docs"));
	assert!(docs_intent::looks_like_docs_lookup("open the auth spec"));
	assert!(!docs_intent::looks_like_docs_lookup("roadmap"));
	assert!(!docs_intent::looks_like_docs_lookup("find getUserById"));
	assert!(!docs_intent::looks_like_docs_lookup("find the spec for parser.ts"));
}

#[test]
fn search_mode_round_trips_through_strings() {
	for mode in SearchMode::ALL {
		assert_eq!(mode.as_str().parse::<SearchMode>(), Ok(mode));
	}

	assert!("fuzzy".parse::<SearchMode>().is_err());
	assert_eq!(
		serde_json::to_string(&SearchMode::Exhaustive).expect("serialize failed"),
		"\"exhaustive\""
	);
}
