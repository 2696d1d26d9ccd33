use std::path::{Path, PathBuf};

/// Marker directory written by the local indexer at a project root.
pub const PROJECT_MARKER: &str = ".wayfind";

/// Walks up from `start` to the first directory holding a `.wayfind` marker directory or a
/// `.git` entry. Returns `None` when neither is found.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
	start
		.ancestors()
		.find(|dir| dir.join(PROJECT_MARKER).is_dir() || dir.join(".git").exists())
		.map(Path::to_path_buf)
}
