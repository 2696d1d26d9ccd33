use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read {path:?}.")]
	Read { path: PathBuf, source: std::io::Error },
	#[error("Failed to parse {path:?}: {message}")]
	Parse { path: PathBuf, message: String },
}
impl Error {
	pub fn is_missing_file(&self) -> bool {
		matches!(self, Self::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
	}
}
