use std::{
	collections::BTreeMap,
	path::{Path, PathBuf},
	time::Duration,
};

use serde::Deserialize;

use crate::{Result, SnapshotCache};

/// Persisted association between a folder and a workspace/project.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct FolderScope {
	pub workspace_id: Option<String>,
	pub project_id: Option<String>,
}
impl FolderScope {
	pub fn is_empty(&self) -> bool {
		self.workspace_id.is_none() && self.project_id.is_none()
	}
}

#[derive(Debug, Default)]
pub struct FolderMappingSnapshot {
	entries: Vec<(PathBuf, FolderScope)>,
}
impl FolderMappingSnapshot {
	/// Reads `{"mappings": {"<abs path>": {"workspace_id": .., "project_id": ..}}}`.
	pub fn load(path: &Path) -> Result<Self> {
		let file: MappingFile = crate::read_json(path)?;

		Ok(Self::from_entries(file.mappings))
	}

	pub fn from_entries<I, P>(entries: I) -> Self
	where
		I: IntoIterator<Item = (P, FolderScope)>,
		P: AsRef<Path>,
	{
		let entries = entries
			.into_iter()
			.map(|(path, scope)| (crate::normalize_path(path.as_ref()), scope))
			.filter(|(_, scope)| !scope.is_empty())
			.collect();

		Self { entries }
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Nearest-ancestor match: the mapping whose folder is the longest prefix of `folder`.
	pub fn lookup(&self, folder: &Path) -> Option<&FolderScope> {
		let folder = crate::normalize_path(folder);

		self.entries
			.iter()
			.filter(|(mapped, _)| folder.starts_with(mapped))
			.max_by_key(|(mapped, _)| mapped.components().count())
			.map(|(_, scope)| scope)
	}
}

pub struct FolderMappingStore {
	cache: SnapshotCache<FolderMappingSnapshot>,
}
impl FolderMappingStore {
	pub fn open(path: Option<PathBuf>, ttl: Duration) -> Self {
		Self { cache: SnapshotCache::new(path, ttl, FolderMappingSnapshot::load) }
	}

	pub fn lookup(&self, folder: &Path) -> Option<FolderScope> {
		let snapshot = self.cache.get();
		let scope = snapshot.lookup(folder).cloned();

		tracing::debug!(
			folder = %folder.display(),
			matched = scope.is_some(),
			"Folder mapping lookup."
		);

		scope
	}
}

#[derive(Deserialize)]
struct MappingFile {
	#[serde(default)]
	mappings: BTreeMap<String, FolderScope>,
}
