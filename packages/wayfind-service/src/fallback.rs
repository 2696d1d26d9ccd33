//! Fallback chain as an explicit transition table.
//!
//! The driver runs the starting mode, then repeatedly takes the first untaken row whose
//! from-set contains the current mode and whose guard holds. A row is taken at most once, so the
//! chain always terminates. Given identical provider responses the executed mode and the notes
//! are identical.

use tokio::time::Instant;

use crate::{Collaborators, Error, Result, RoutingTuning};
use wayfind_domain::{
	Classification, OutputFormat, Query, ScopeCandidate, SearchEnvelope, SearchMode,
	classify::{self, identifier_target},
};

const TRANSITIONS: [Transition; 9] = [
	Transition {
		from: &[SearchMode::Hybrid],
		guard: Guard::LowConfidence,
		next: SearchMode::Semantic,
		text: NextText::Original,
	},
	Transition {
		from: &[SearchMode::Keyword],
		guard: Guard::QuotedEmpty,
		next: SearchMode::Keyword,
		text: NextText::Literal,
	},
	Transition {
		from: &[SearchMode::Keyword],
		guard: Guard::QuotedEmpty,
		next: SearchMode::Pattern,
		text: NextText::EscapedLiteral,
	},
	Transition {
		from: &[SearchMode::Keyword, SearchMode::Pattern],
		guard: Guard::QuotedEmpty,
		next: SearchMode::Exhaustive,
		text: NextText::Literal,
	},
	Transition {
		from: &[SearchMode::Refactor, SearchMode::Exhaustive],
		guard: Guard::UnquotedEmpty,
		next: SearchMode::Keyword,
		text: NextText::Identifier,
	},
	Transition {
		from: &[SearchMode::Keyword],
		guard: Guard::IdentifierEmpty,
		next: SearchMode::Refactor,
		text: NextText::Identifier,
	},
	Transition {
		from: &[SearchMode::Keyword, SearchMode::Refactor],
		guard: Guard::IdentifierEmpty,
		next: SearchMode::Exhaustive,
		text: NextText::Identifier,
	},
	Transition {
		from: &[SearchMode::Keyword],
		guard: Guard::SemanticEmpty,
		next: SearchMode::Semantic,
		text: NextText::Original,
	},
	Transition {
		from: &[SearchMode::Keyword],
		guard: Guard::UnquotedEmpty,
		next: SearchMode::Hybrid,
		text: NextText::Original,
	},
];

/// Everything the controller needs to know about the query, computed once per request.
#[derive(Clone, Debug)]
pub struct FallbackPlan {
	pub start_mode: SearchMode,
	/// Raw query text; keyword starts on it even when it is quoted.
	pub text: String,
	pub classification: Classification,
	pub auto_selected: bool,
	pub output_format: OutputFormat,
}
impl FallbackPlan {
	pub fn new(
		query: &Query,
		start_mode: SearchMode,
		classification: Classification,
		auto_selected: bool,
		output_format: OutputFormat,
	) -> Self {
		Self {
			start_mode,
			text: query.text.trim().to_string(),
			classification,
			auto_selected,
			output_format,
		}
	}

	fn literal(&self) -> &str {
		self.classification.literal.as_deref().unwrap_or(&self.text)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Attempt {
	pub mode: SearchMode,
	pub query: String,
	pub results: usize,
	pub top_score: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FallbackReport {
	pub envelope: SearchEnvelope,
	pub executed_mode: SearchMode,
	pub notes: Vec<String>,
	pub attempts: Vec<Attempt>,
	pub interrupted: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Guard {
	/// Auto-selected hybrid whose results are empty or weak while the query reads as a question.
	LowConfidence,
	QuotedEmpty,
	UnquotedEmpty,
	IdentifierEmpty,
	SemanticEmpty,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NextText {
	Original,
	Literal,
	EscapedLiteral,
	/// The identifier inside the query when there is one, the query itself otherwise.
	Identifier,
}

struct Transition {
	from: &'static [SearchMode],
	guard: Guard,
	next: SearchMode,
	text: NextText,
}
impl Transition {
	fn applies(
		&self,
		mode: SearchMode,
		plan: &FallbackPlan,
		envelope: &SearchEnvelope,
		tuning: &RoutingTuning,
	) -> bool {
		if !self.from.contains(&mode) {
			return false;
		}

		let quoted = plan.classification.is_quoted();

		match self.guard {
			Guard::LowConfidence =>
				plan.auto_selected
					&& classify::prefers_semantic(&plan.text)
					&& (envelope.is_empty() || envelope.top_score() < tuning.low_confidence_score),
			Guard::QuotedEmpty => envelope.is_empty() && quoted,
			Guard::UnquotedEmpty => envelope.is_empty() && !quoted,
			Guard::IdentifierEmpty =>
				envelope.is_empty() && !quoted && identifier_target(&plan.text).is_some(),
			Guard::SemanticEmpty =>
				envelope.is_empty() && !quoted && classify::prefers_semantic(&plan.text),
		}
	}

	fn text(&self, plan: &FallbackPlan) -> String {
		match self.text {
			NextText::Original => plan.text.clone(),
			NextText::Literal => plan.literal().to_string(),
			NextText::EscapedLiteral => classify::regex_escape(plan.literal()),
			NextText::Identifier => identifier_target(&plan.text).unwrap_or(&plan.text).to_string(),
		}
	}
}

/// Runs the fallback chain for one scope candidate.
///
/// An error on the first attempt is returned classified. A recoverable error on a later step
/// stops the chain and keeps the envelope gathered so far; other errors are returned. When the
/// request deadline passes mid-chain, the envelope gathered so far is returned with
/// `interrupted` set.
pub async fn run_fallback(
	collaborators: &Collaborators,
	tuning: &RoutingTuning,
	query: &Query,
	plan: &FallbackPlan,
	scope: &ScopeCandidate,
	deadline: Instant,
) -> Result<FallbackReport> {
	let mut report = FallbackReport {
		envelope: SearchEnvelope::empty(),
		executed_mode: plan.start_mode,
		notes: Vec::new(),
		attempts: Vec::new(),
		interrupted: false,
	};
	let mut current = plan.start_mode;
	let mut taken = [false; TRANSITIONS.len()];

	match execute(collaborators, query, plan, scope, current, &plan.text, deadline).await {
		Some(res) => report.envelope = record(&mut report, current, &plan.text, res?),
		None => {
			interrupt(&mut report);

			return Ok(report);
		},
	}

	while let Some(index) = TRANSITIONS
		.iter()
		.enumerate()
		.position(|(index, row)| !taken[index] && row.applies(current, plan, &report.envelope, tuning))
	{
		let row = &TRANSITIONS[index];
		let text = row.text(plan);

		taken[index] = true;

		if report.attempts.iter().any(|attempt| attempt.mode == row.next && attempt.query == text) {
			tracing::debug!(mode = %row.next, query = %text, "Skipping an attempt already made.");

			continue;
		}

		let Some(res) = execute(collaborators, query, plan, scope, row.next, &text, deadline).await
		else {
			interrupt(&mut report);

			break;
		};
		let envelope = match res {
			Ok(envelope) => record(&mut report, row.next, &text, envelope),
			Err(err) if err.is_recoverable() => {
				tracing::warn!(
					error = %err,
					mode = %row.next,
					scope = %scope.label(),
					"Fallback step failed."
				);

				report.notes.push(step_failed_note(row, current, &err));

				break;
			},
			Err(err) => return Err(err),
		};

		if row.guard == Guard::LowConfidence {
			adopt_semantic(&mut report, envelope, tuning);

			current = report.executed_mode;

			continue;
		}

		tracing::info!(from = %current, to = %row.next, scope = %scope.label(), "Fallback taken.");

		report.notes.push(format!(
			"{} search returned no results; fell back to {} search for `{text}`.",
			title_case(current.as_str()),
			row.next
		));
		report.envelope = envelope;
		report.executed_mode = row.next;
		current = row.next;
	}

	Ok(report)
}

async fn execute(
	collaborators: &Collaborators,
	query: &Query,
	plan: &FallbackPlan,
	scope: &ScopeCandidate,
	mode: SearchMode,
	text: &str,
	deadline: Instant,
) -> Option<Result<SearchEnvelope>> {
	let params = query.params(
		text,
		scope.workspace_id.as_deref(),
		scope.project_id.as_deref(),
		plan.output_format,
	);

	tracing::debug!(%mode, query = %text, scope = %scope.label(), "Search attempt.");

	crate::before_deadline(deadline, collaborators.provider.search(mode, &params))
		.await
		.map(|res| res.map_err(Error::from))
}

fn record(
	report: &mut FallbackReport,
	mode: SearchMode,
	text: &str,
	envelope: SearchEnvelope,
) -> SearchEnvelope {
	report.attempts.push(Attempt {
		mode,
		query: text.to_string(),
		results: envelope.len(),
		top_score: envelope.top_score(),
	});

	envelope
}

fn adopt_semantic(report: &mut FallbackReport, semantic: SearchEnvelope, tuning: &RoutingTuning) {
	let hybrid_top = report.envelope.top_score();
	let semantic_top = semantic.top_score();
	let adopt = if report.envelope.is_empty() {
		!semantic.is_empty()
	} else {
		semantic_top - hybrid_top > tuning.semantic_improvement_margin
	};

	if adopt {
		tracing::info!(hybrid_top, semantic_top, "Adopted semantic results.");

		report.notes.push(format!(
			"Hybrid results looked low-confidence (top score {hybrid_top:.2}); retried with semantic search and used its results (top score {semantic_top:.2})."
		));
		report.envelope = semantic;
		report.executed_mode = SearchMode::Semantic;
	} else {
		report.notes.push(format!(
			"Hybrid results looked low-confidence (top score {hybrid_top:.2}); retried with semantic search but kept the hybrid results."
		));
	}
}

/// A failed step after the first attempt ends the chain; the envelope already held is kept.
fn step_failed_note(row: &Transition, current: SearchMode, err: &Error) -> String {
	if row.guard == Guard::LowConfidence {
		return format!("Semantic retry failed ({err}); kept the hybrid results.");
	}

	format!(
		"{} fallback search failed ({err}); kept the {current} results.",
		title_case(row.next.as_str())
	)
}

fn interrupt(report: &mut FallbackReport) {
	tracing::warn!(mode = %report.executed_mode, "Request deadline reached during fallback.");

	report.interrupted = true;
	report
		.notes
		.push("Request deadline reached; returning the best results found so far.".to_string());
}

fn title_case(word: &str) -> String {
	let mut chars = word.chars();

	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_row_leaves_a_mode_it_can_reach() {
		for row in &TRANSITIONS {
			assert!(!row.from.is_empty());
			assert_ne!(row.next, SearchMode::Team);
		}
	}

	#[test]
	fn quoted_rows_are_ordered_keyword_pattern_exhaustive() {
		let quoted: Vec<SearchMode> = TRANSITIONS
			.iter()
			.filter(|row| row.guard == Guard::QuotedEmpty)
			.map(|row| row.next)
			.collect();

		assert_eq!(quoted, vec![SearchMode::Keyword, SearchMode::Pattern, SearchMode::Exhaustive]);
	}

	#[test]
	fn title_cases_mode_names() {
		assert_eq!(title_case("keyword"), "Keyword");
		assert_eq!(title_case(""), "");
	}
}
