use std::{
	collections::BTreeMap,
	path::{Path, PathBuf},
	time::Duration,
};

use serde::Deserialize;
use time::{
	Date, OffsetDateTime, Time, format_description::well_known::Rfc3339, macros::format_description,
};

use crate::{Result, SnapshotCache};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedProject {
	pub path: PathBuf,
	pub project_id: Option<String>,
	pub workspace_id: Option<String>,
	pub indexed_at: OffsetDateTime,
}

#[derive(Debug, Default)]
pub struct IndexStatusSnapshot {
	projects: Vec<IndexedProject>,
}
impl IndexStatusSnapshot {
	/// Reads the indexer's status file,
	/// `{"projects": {"<abs path>": {"indexed_at": .., "project_id": .., "workspace_id": ..}}}`.
	/// Entries with an unparseable `indexed_at` are skipped.
	pub fn load(path: &Path) -> Result<Self> {
		let file: StatusFile = crate::read_json(path)?;
		let projects = file
			.projects
			.into_iter()
			.filter_map(|(folder, entry)| {
				let Some(indexed_at) = parse_indexed_at(&entry.indexed_at) else {
					tracing::warn!(
						folder = %folder,
						indexed_at = %entry.indexed_at,
						"Skipping index entry with an invalid timestamp."
					);

					return None;
				};

				Some(IndexedProject {
					path: crate::normalize_path(Path::new(&folder)),
					project_id: entry.project_id.filter(|id| !id.trim().is_empty()),
					workspace_id: entry.workspace_id.filter(|id| !id.trim().is_empty()),
					indexed_at,
				})
			})
			.collect();

		Ok(Self { projects })
	}

	pub fn from_projects(projects: Vec<IndexedProject>) -> Self {
		let projects = projects
			.into_iter()
			.map(|project| IndexedProject { path: crate::normalize_path(&project.path), ..project })
			.collect();

		Self { projects }
	}

	pub fn len(&self) -> usize {
		self.projects.len()
	}

	pub fn is_empty(&self) -> bool {
		self.projects.is_empty()
	}

	/// Whether `folder` is an indexed path or lies inside one.
	pub fn is_indexed(&self, folder: &Path) -> bool {
		let folder = crate::normalize_path(folder);

		self.projects.iter().any(|project| folder.starts_with(&project.path))
	}

	/// Most recently indexed entry covering `folder` that names a project. Entries without a
	/// project id never shadow older ones that have one. Staleness is the caller's policy.
	pub fn latest(&self, folder: &Path) -> Option<&IndexedProject> {
		let folder = crate::normalize_path(folder);

		self.projects
			.iter()
			.filter(|project| project.project_id.is_some() && folder.starts_with(&project.path))
			.max_by_key(|project| project.indexed_at)
	}
}

pub struct IndexStatusStore {
	cache: SnapshotCache<IndexStatusSnapshot>,
}
impl IndexStatusStore {
	pub fn open(path: Option<PathBuf>, ttl: Duration) -> Self {
		Self { cache: SnapshotCache::new(path, ttl, IndexStatusSnapshot::load) }
	}

	pub fn latest(&self, folder: &Path) -> Option<IndexedProject> {
		self.cache.get().latest(folder).cloned()
	}
}

/// An index is fresh when it is no older than `max_age`. Timestamps in the future count as fresh.
pub fn is_fresh(indexed_at: OffsetDateTime, now: OffsetDateTime, max_age: time::Duration) -> bool {
	now - indexed_at <= max_age
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_indexed_at(raw: &str) -> Option<OffsetDateTime> {
	let raw = raw.trim();

	if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
		return Some(ts);
	}

	Date::parse(raw, format_description!("[year]-[month]-[day]"))
		.ok()
		.map(|date| date.with_time(Time::MIDNIGHT).assume_utc())
}

#[derive(Deserialize)]
struct StatusFile {
	#[serde(default)]
	projects: BTreeMap<String, StatusEntry>,
}

#[derive(Deserialize)]
struct StatusEntry {
	indexed_at: String,
	#[serde(default)]
	project_id: Option<String>,
	#[serde(default)]
	workspace_id: Option<String>,
}
