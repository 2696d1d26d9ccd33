use std::path::Path;

use time::OffsetDateTime;
use tokio::time::Instant;

use crate::{Collaborators, Error, Result, RoutingTuning};
use wayfind_domain::{ScopeCandidate, ScopeOrigin, SessionDefaults};

#[derive(Clone, Copy, Debug)]
pub struct ScopeRequest<'a> {
	pub explicit_workspace: Option<&'a str>,
	pub explicit_project: Option<&'a str>,
	pub folder: Option<&'a Path>,
	pub session: &'a SessionDefaults,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeResolution {
	pub candidates: Vec<ScopeCandidate>,
	/// Corrections made to the caller's explicit scope, in the order they happened.
	pub notes: Vec<String>,
	pub explicit_project_autocorrected: bool,
}

/// Builds the ranked scope list: explicit, folder mapping, local index, session default, then a
/// workspace-wide entry. Never returns an empty list.
pub async fn resolve_candidates(
	collaborators: &Collaborators,
	tuning: &RoutingTuning,
	req: &ScopeRequest<'_>,
	now: OffsetDateTime,
	deadline: Instant,
) -> Result<ScopeResolution> {
	let folder_scope = req.folder.and_then(|folder| collaborators.folder_mappings.lookup(folder));
	let resolved_workspace = req
		.explicit_workspace
		.map(str::to_string)
		.or_else(|| folder_scope.as_ref().and_then(|scope| scope.workspace_id.clone()))
		.or_else(|| req.session.workspace_id.clone());
	let mut resolution = ScopeResolution::default();
	let mut candidates = Vec::new();
	let mut explicit_kept = false;

	if let Some(project_id) = req.explicit_project {
		if let Some(candidate) = validate_explicit_project(
			collaborators,
			project_id,
			resolved_workspace.as_deref(),
			deadline,
			&mut resolution,
		)
		.await?
		{
			candidates.push(candidate);

			explicit_kept = true;
		}
	} else if let Some(workspace_id) = req.explicit_workspace {
		candidates.push(candidate(Some(workspace_id.to_string()), None, ScopeOrigin::Explicit));

		explicit_kept = true;
	}

	let outside_explicit_workspace = |workspace: Option<&str>| {
		matches!(
			(req.explicit_workspace, workspace),
			(Some(explicit), Some(workspace)) if explicit != workspace
		)
	};

	if let Some(scope) = folder_scope {
		let workspace_id = scope.workspace_id.or_else(|| resolved_workspace.clone());

		if outside_explicit_workspace(workspace_id.as_deref()) {
			tracing::debug!(?workspace_id, "Folder mapping points outside the explicit workspace.");
		} else {
			candidates.push(candidate(workspace_id, scope.project_id, ScopeOrigin::FolderMapping));
		}
	}

	if let Some(folder) = req.folder
		&& let Some(indexed) = collaborators.index_status.latest(folder)
	{
		let fresh = wayfind_storage::is_fresh(indexed.indexed_at, now, tuning.index_max_age);
		let workspace_id = indexed.workspace_id.or_else(|| resolved_workspace.clone());

		if !fresh {
			tracing::debug!(
				path = %indexed.path.display(),
				indexed_at = %indexed.indexed_at,
				"Local index is stale."
			);
		} else if indexed.project_id.is_none() {
			tracing::debug!(path = %indexed.path.display(), "Local index has no project id.");
		} else if outside_explicit_workspace(workspace_id.as_deref()) {
			tracing::debug!(?workspace_id, "Local index points outside the explicit workspace.");
		} else {
			candidates.push(candidate(workspace_id, indexed.project_id, ScopeOrigin::LocalIndex));
		}
	}

	if req.session.workspace_id.is_some() || req.session.project_id.is_some() {
		let workspace_id = req.session.workspace_id.clone().or_else(|| resolved_workspace.clone());

		if !outside_explicit_workspace(workspace_id.as_deref()) {
			candidates.push(candidate(
				workspace_id,
				req.session.project_id.clone(),
				ScopeOrigin::SessionDefault,
			));
		}
	}

	if !explicit_kept {
		let none = candidate(resolved_workspace, None, ScopeOrigin::None);

		candidates.retain(|existing| !existing.same_pair(&none));
		candidates.push(none);
	}

	resolution.candidates = dedup_and_rank(candidates);

	tracing::debug!(
		candidates = resolution.candidates.len(),
		autocorrected = resolution.explicit_project_autocorrected,
		"Resolved scope candidates."
	);

	Ok(resolution)
}

async fn validate_explicit_project(
	collaborators: &Collaborators,
	project_id: &str,
	resolved_workspace: Option<&str>,
	deadline: Instant,
	resolution: &mut ScopeResolution,
) -> Result<Option<ScopeCandidate>> {
	let lookup =
		crate::before_deadline(deadline, collaborators.provider.get_project(project_id)).await;
	let unvalidated = || {
		candidate(
			resolved_workspace.map(str::to_string),
			Some(project_id.to_string()),
			ScopeOrigin::Explicit,
		)
	};

	match lookup.map(|res| res.map_err(Error::from)) {
		Some(Ok(project)) => match (project.workspace_id.as_deref(), resolved_workspace) {
			(Some(owner), Some(resolved)) if owner != resolved => {
				resolution.notes.push(format!(
					"Explicit project {project_id} belongs to workspace {owner}, not {resolved}; dropped it from the search scope."
				));
				resolution.explicit_project_autocorrected = true;

				tracing::info!(project_id, owner, resolved, "Dropped mismatched explicit project.");

				Ok(None)
			},
			(owner, resolved) => Ok(Some(candidate(
				resolved.or(owner).map(str::to_string),
				Some(project.id),
				ScopeOrigin::Explicit,
			))),
		},
		Some(Err(Error::NotFound { .. })) => {
			resolution.notes.push(format!(
				"Explicit project {project_id} was not found; dropped it from the search scope."
			));
			resolution.explicit_project_autocorrected = true;

			Ok(None)
		},
		Some(Err(err @ Error::Auth { .. })) => Err(err),
		Some(Err(err)) => {
			resolution.notes.push(format!(
				"Could not validate explicit project {project_id} ({err}); using it as given."
			));

			Ok(Some(unvalidated()))
		},
		None => {
			resolution.notes.push(format!(
				"Could not validate explicit project {project_id} before the deadline; using it as given."
			));

			Ok(Some(unvalidated()))
		},
	}
}

fn candidate(
	workspace_id: Option<String>,
	project_id: Option<String>,
	origin: ScopeOrigin,
) -> ScopeCandidate {
	ScopeCandidate { workspace_id, project_id, rank: 0, origin }
}

fn dedup_and_rank(candidates: Vec<ScopeCandidate>) -> Vec<ScopeCandidate> {
	let mut out: Vec<ScopeCandidate> = Vec::with_capacity(candidates.len());

	for candidate in candidates {
		if out.iter().any(|kept| kept.same_pair(&candidate)) {
			continue;
		}

		out.push(candidate);
	}
	for (rank, candidate) in out.iter_mut().enumerate() {
		candidate.rank = rank as u32;
	}

	out
}
