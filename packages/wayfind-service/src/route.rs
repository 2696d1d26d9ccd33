use std::{path::PathBuf, time::Duration};

use time::OffsetDateTime;
use tokio::time::Instant;

use crate::{
	Error, FallbackPlan, OutcomeBuilder, Result, RoutingEngine, RoutingOutcome, ScopeRequest, docs,
	iterate, scope, team,
};
use wayfind_domain::{Query, SearchMode, SessionDefaults, classify};

const REASON_EXPLICIT: &str = "explicitly requested";

#[derive(Clone, Debug)]
pub struct RouteRequest {
	pub query: Query,
	/// Explicit mode. `None` lets the classifier choose.
	pub mode: Option<SearchMode>,
	pub explicit_workspace: Option<String>,
	pub explicit_project: Option<String>,
	pub folder_path: Option<PathBuf>,
	pub session: SessionDefaults,
	/// Overall request deadline. Defaults to the configured request timeout.
	pub timeout: Option<Duration>,
}
impl RouteRequest {
	pub fn new(query: Query) -> Self {
		Self {
			query,
			mode: None,
			explicit_workspace: None,
			explicit_project: None,
			folder_path: None,
			session: SessionDefaults::default(),
			timeout: None,
		}
	}
}

impl RoutingEngine {
	/// Routes one query end to end: classify, pick the mode and output format, then either fan
	/// out to the team or walk the scope candidates through the fallback table, and finally try
	/// the docs lookup when code search found nothing.
	pub async fn route(&self, req: RouteRequest) -> Result<RoutingOutcome> {
		let mut query = req.query;

		if query.text.trim().is_empty() {
			return Err(Error::InvalidRequest {
				message: "Query text must be non-empty.".to_string(),
			});
		}
		if query.limit == 0 {
			query.limit = self.tuning.default_limit;
		}
		if query.content_max_chars == 0 {
			query.content_max_chars = self.tuning.content_max_chars;
		}

		let text = query.text.trim();
		let deadline = Instant::now() + req.timeout.unwrap_or(self.tuning.request_timeout);
		let classification = classify::classify(text);
		let auto_selected = req.mode.is_none();
		let mode = req.mode.unwrap_or(classification.mode);
		let reason = if auto_selected { classification.reason } else { REASON_EXPLICIT };
		let output_format =
			query.output_format.unwrap_or_else(|| classify::infer_output_format(text, mode));
		let builder = OutcomeBuilder::new(mode, auto_selected, reason, output_format);

		tracing::debug!(
			%mode,
			auto_selected,
			reason,
			output_format = output_format.as_str(),
			"Routing query."
		);

		if mode.is_scope_orthogonal() {
			let report = team::team_search(
				&self.collaborators,
				&self.tuning,
				&query,
				query.limit,
				output_format,
				deadline,
			)
			.await?;

			return Ok(builder.team(report).build());
		}

		let scope_req = ScopeRequest {
			explicit_workspace: req.explicit_workspace.as_deref(),
			explicit_project: req.explicit_project.as_deref(),
			folder: req.folder_path.as_deref(),
			session: &req.session,
		};
		let resolution = scope::resolve_candidates(
			&self.collaborators,
			&self.tuning,
			&scope_req,
			OffsetDateTime::now_utc(),
			deadline,
		)
		.await?;
		let plan = FallbackPlan::new(&query, mode, classification, auto_selected, output_format);
		let iteration = iterate::iterate_scopes(
			&self.collaborators,
			&self.tuning,
			&query,
			&plan,
			&resolution.candidates,
			deadline,
		)
		.await?;
		let search_docs = !iteration.report.interrupted
			&& docs::should_search_docs(&self.tuning, &iteration.report.envelope, text);
		let mut builder = builder
			.scope_corrections(resolution.notes, resolution.explicit_project_autocorrected)
			.iteration(iteration);

		if search_docs {
			let report = docs::find_docs(
				&self.collaborators,
				&self.tuning,
				text,
				query.limit,
				&resolution.candidates,
				deadline,
			)
			.await;

			builder = builder.docs(report);
		}

		let outcome = builder.build();

		tracing::info!(
			request_id = %outcome.request_id(),
			executed_mode = %outcome.executed_mode(),
			results = outcome.envelope().len(),
			notes = outcome.fallback_notes().len(),
			"Routed query."
		);

		Ok(outcome)
	}
}
