use tokio::time::Instant;

use crate::{
	Collaborators, Error, FallbackPlan, FallbackReport, Result, RoutingTuning, fallback,
};
use wayfind_domain::{Query, ScopeCandidate};

#[derive(Clone, Debug, PartialEq)]
pub struct IterationReport {
	pub report: FallbackReport,
	pub candidate: ScopeCandidate,
	/// Scopes skipped or searched without results before settling on `candidate`.
	pub notes: Vec<String>,
}

/// Tries each candidate in rank order and stops at the first non-empty envelope.
///
/// When every scope comes back empty the first-tried report is kept. Recoverable errors skip
/// the candidate; when no candidate could be searched at all the error is returned, as
/// `NoValidScope` if every one of them was not found.
pub async fn iterate_scopes(
	collaborators: &Collaborators,
	tuning: &RoutingTuning,
	query: &Query,
	plan: &FallbackPlan,
	candidates: &[ScopeCandidate],
	deadline: Instant,
) -> Result<IterationReport> {
	let mut notes = Vec::new();
	let mut first: Option<(FallbackReport, &ScopeCandidate)> = None;
	let mut empty_labels = Vec::new();
	let mut last_err = None;
	let mut all_not_found = true;

	for candidate in candidates {
		match fallback::run_fallback(collaborators, tuning, query, plan, candidate, deadline).await {
			Ok(report) if !report.envelope.is_empty() => {
				if !empty_labels.is_empty() {
					notes.push(format!(
						"No results in {}; showing results from {}.",
						empty_labels.join(", "),
						candidate.label()
					));
				}

				return Ok(IterationReport { report, candidate: candidate.clone(), notes });
			},
			Ok(report) if report.interrupted => {
				return Ok(IterationReport { report, candidate: candidate.clone(), notes });
			},
			Ok(report) => {
				tracing::debug!(scope = %candidate.label(), "Scope returned no results.");

				empty_labels.push(candidate.label());

				if first.is_none() {
					first = Some((report, candidate));
				}
			},
			Err(err) if err.is_recoverable() => {
				tracing::warn!(error = %err, scope = %candidate.label(), "Skipping scope.");

				notes.push(format!("Skipped {}: {err}", candidate.label()));

				if !matches!(err, Error::NotFound { .. }) {
					all_not_found = false;
				}

				last_err = Some(err);
			},
			Err(err) => return Err(err),
		}
	}

	if let Some((report, candidate)) = first {
		notes.push(format!(
			"Project- and workspace-scoped search found nothing in {}.",
			empty_labels.join(", ")
		));

		return Ok(IterationReport { report, candidate: candidate.clone(), notes });
	}

	match last_err {
		Some(_) if all_not_found => Err(Error::NoValidScope {
			message: format!("None of the {} candidate scopes exist.", candidates.len()),
		}),
		Some(err) => Err(err),
		None => Err(Error::NoValidScope { message: "No scope candidates to search.".to_string() }),
	}
}
