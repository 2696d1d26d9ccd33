use tokio::{task::JoinSet, time::Instant};

use crate::{Collaborators, Error, Result, RoutingTuning};
use wayfind_domain::{OutputFormat, Query, ResultItem, SearchEnvelope, SearchMode};

#[derive(Clone, Debug, PartialEq)]
pub struct TeamReport {
	pub envelope: SearchEnvelope,
	pub workspaces: usize,
	pub responded: usize,
	pub skipped: usize,
	pub notes: Vec<String>,
}

/// Fans one hybrid search out to every team workspace and merges the results by score.
///
/// A workspace whose call fails or outlives its timeout is skipped and counted in a note; it
/// never fails the aggregate. `total` is the merged count before truncation.
pub async fn team_search(
	collaborators: &Collaborators,
	tuning: &RoutingTuning,
	query: &Query,
	requested_limit: u32,
	output_format: OutputFormat,
	deadline: Instant,
) -> Result<TeamReport> {
	if !collaborators.entitlement.has_team_access() {
		return Err(Error::NotEntitled);
	}

	let cap = tuning.team_max_workspaces.clamp(1, RoutingTuning::TEAM_WORKSPACE_CAP);
	let mut workspaces = crate::before_deadline(
		deadline,
		collaborators.provider.list_team_workspaces(cap),
	)
	.await
	.ok_or_else(|| Error::ProviderTimeout {
		message: "Request deadline reached before team workspaces were listed.".to_string(),
	})??;

	workspaces.truncate(cap as usize);

	if workspaces.is_empty() {
		return Ok(TeamReport {
			envelope: SearchEnvelope::empty(),
			workspaces: 0,
			responded: 0,
			skipped: 0,
			notes: vec!["No team workspaces are available to search.".to_string()],
		});
	}

	let count = workspaces.len();
	let per_workspace_limit = requested_limit.max(1).div_ceil(count as u32);
	let mut set = JoinSet::new();

	for (index, workspace) in workspaces.iter().enumerate() {
		let provider = collaborators.provider.clone();
		let mut params = query.params(query.text.trim(), Some(&workspace.id), None, output_format);
		let call_deadline = deadline.min(Instant::now() + tuning.team_call_timeout);

		params.limit = per_workspace_limit;

		set.spawn(async move {
			let res = tokio::time::timeout_at(
				call_deadline,
				provider.search(SearchMode::Hybrid, &params),
			)
			.await;

			(index, res)
		});
	}

	let mut slots: Vec<Option<SearchEnvelope>> = vec![None; count];

	while let Some(joined) = set.join_next().await {
		match joined {
			Ok((index, Ok(Ok(envelope)))) => slots[index] = Some(envelope),
			Ok((index, Ok(Err(err)))) => {
				tracing::warn!(
					error = %err,
					workspace_id = %workspaces[index].id,
					"Skipping team workspace."
				);
			},
			Ok((index, Err(_))) => {
				tracing::warn!(
					workspace_id = %workspaces[index].id,
					"Team workspace call timed out."
				);
			},
			Err(err) => {
				tracing::warn!(error = %err, "Team workspace task failed.");
			},
		}
	}

	let mut merged: Vec<ResultItem> = Vec::new();
	let mut responded = 0;

	for (workspace, slot) in workspaces.iter().zip(slots) {
		let Some(envelope) = slot else {
			continue;
		};

		responded += 1;

		merged.extend(envelope.results.into_iter().map(|mut item| {
			item.workspace_id = Some(workspace.id.clone());
			item.workspace_name = Some(workspace.name.clone());

			item
		}));
	}

	merged.sort_by(|a, b| b.score_or_zero().total_cmp(&a.score_or_zero()));

	let total = merged.len() as u64;
	let skipped = count - responded;
	let mut notes = Vec::new();

	merged.truncate(requested_limit as usize);

	if skipped > 0 {
		notes.push(format!("Skipped {skipped} of {count} team workspaces that failed or timed out."));
	}

	tracing::info!(workspaces = count, responded, skipped, total, "Team search merged.");

	Ok(TeamReport {
		envelope: SearchEnvelope { results: merged, total },
		workspaces: count,
		responded,
		skipped,
		notes,
	})
}
