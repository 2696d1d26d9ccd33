use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeOrigin {
	Explicit,
	FolderMapping,
	LocalIndex,
	SessionDefault,
	/// Workspace-wide, no project filter.
	None,
}
impl ScopeOrigin {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Explicit => "explicit",
			Self::FolderMapping => "folder_mapping",
			Self::LocalIndex => "local_index",
			Self::SessionDefault => "session_default",
			Self::None => "none",
		}
	}
}

/// A (workspace, project) pair to try. Lower `rank` is tried first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeCandidate {
	pub workspace_id: Option<String>,
	pub project_id: Option<String>,
	pub rank: u32,
	pub origin: ScopeOrigin,
}
impl ScopeCandidate {
	pub fn same_pair(&self, other: &Self) -> bool {
		self.workspace_id == other.workspace_id && self.project_id == other.project_id
	}

	pub fn scope_ref(&self) -> ScopeRef<'_> {
		ScopeRef {
			workspace_id: self.workspace_id.as_deref(),
			project_id: self.project_id.as_deref(),
		}
	}

	/// Short label used in provenance notes, e.g. `project p-1` or `workspace w-1`.
	pub fn label(&self) -> String {
		match (self.workspace_id.as_deref(), self.project_id.as_deref()) {
			(_, Some(project)) => format!("project {project}"),
			(Some(workspace), None) => format!("workspace {workspace}"),
			(None, None) => "default scope".to_string(),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeRef<'a> {
	pub workspace_id: Option<&'a str>,
	pub project_id: Option<&'a str>,
}
