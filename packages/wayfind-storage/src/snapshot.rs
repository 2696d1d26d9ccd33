use std::{
	path::{Path, PathBuf},
	sync::{Arc, RwLock},
	time::{Duration, Instant},
};

use crate::Result;

/// Parsed view of one file, reloaded lazily once older than `ttl`.
pub struct SnapshotCache<T> {
	path: Option<PathBuf>,
	ttl: Duration,
	load: fn(&Path) -> Result<T>,
	state: RwLock<Option<Cached<T>>>,
}
impl<T> SnapshotCache<T>
where
	T: Default,
{
	/// `path = None` means the store is not configured; every read yields the empty snapshot.
	pub fn new(path: Option<PathBuf>, ttl: Duration, load: fn(&Path) -> Result<T>) -> Self {
		Self { path, ttl, load, state: RwLock::new(None) }
	}

	pub fn get(&self) -> Arc<T> {
		{
			let state = self.state.read().unwrap_or_else(|err| err.into_inner());

			if let Some(cached) = state.as_ref()
				&& cached.loaded_at.elapsed() < self.ttl
			{
				return cached.snapshot.clone();
			}
		}

		let snapshot = Arc::new(self.reload());
		let mut state = self.state.write().unwrap_or_else(|err| err.into_inner());

		*state = Some(Cached { loaded_at: Instant::now(), snapshot: snapshot.clone() });

		snapshot
	}

	fn reload(&self) -> T {
		let Some(path) = self.path.as_deref() else {
			return T::default();
		};

		match (self.load)(path) {
			Ok(snapshot) => snapshot,
			Err(err) if err.is_missing_file() => {
				tracing::debug!(path = %path.display(), "Snapshot file does not exist.");

				T::default()
			},
			Err(err) => {
				tracing::warn!(error = %err, path = %path.display(), "Using an empty snapshot.");

				T::default()
			},
		}
	}
}

struct Cached<T> {
	loaded_at: Instant,
	snapshot: Arc<T>,
}
