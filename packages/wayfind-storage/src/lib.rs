//! Read-only, file-backed snapshots consumed by scope resolution.
//!
//! Both stores are written by other tools. This crate only reads them, caches the parsed
//! snapshot for a short TTL, and degrades to an empty snapshot when a file is missing or invalid.

pub mod folder_mappings;
pub mod index_status;
pub mod project_root;
pub mod snapshot;

mod error;

pub use error::{Error, Result};
pub use folder_mappings::{FolderMappingSnapshot, FolderMappingStore, FolderScope};
pub use index_status::{IndexStatusSnapshot, IndexStatusStore, IndexedProject, is_fresh};
pub use project_root::find_project_root;
pub use snapshot::SnapshotCache;

use std::{
	fs,
	path::{Component, Path, PathBuf},
};

/// Lexically normalizes a stored or queried folder path: drops `.` components and trailing
/// separators so `/a/b/` and `/a/b` compare equal.
pub fn normalize_path(path: &Path) -> PathBuf {
	path.components().filter(|component| !matches!(component, Component::CurDir)).collect()
}

pub(crate) fn read_json<T>(path: &Path) -> Result<T>
where
	T: serde::de::DeserializeOwned,
{
	let bytes = fs::read(path).map_err(|source| Error::Read { path: path.to_path_buf(), source })?;

	serde_json::from_slice(&bytes)
		.map_err(|err| Error::Parse { path: path.to_path_buf(), message: err.to_string() })
}
