use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub provider: ProviderConfig,
	#[serde(default)]
	pub routing: Routing,
	#[serde(default)]
	pub team: Team,
	#[serde(default)]
	pub docs: Docs,
	#[serde(default)]
	pub stores: Stores,
	pub session: Option<Session>,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

/// Thresholds and defaults that shape mode selection and fallback.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Routing {
	/// Hybrid results whose top score is below this are treated as low confidence.
	pub low_confidence_score: f32,
	/// Semantic results replace hybrid results only when their top score is higher by more than
	/// this margin.
	pub semantic_improvement_margin: f32,
	pub default_limit: u32,
	pub content_max_chars: u32,
	pub request_timeout_ms: u64,
}
impl Default for Routing {
	fn default() -> Self {
		Self {
			low_confidence_score: 0.35,
			semantic_improvement_margin: 0.08,
			default_limit: 10,
			content_max_chars: 400,
			request_timeout_ms: 30_000,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Team {
	pub entitled: bool,
	pub max_workspaces: u32,
	pub call_timeout_ms: u64,
}
impl Default for Team {
	fn default() -> Self {
		Self { entitled: false, max_workspaces: 10, call_timeout_ms: 8_000 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Docs {
	pub enabled: bool,
	pub max_documents: u32,
}
impl Default for Docs {
	fn default() -> Self {
		Self { enabled: true, max_documents: 50 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Stores {
	/// Optional. JSON file with persisted folder to workspace/project associations.
	pub folder_mappings_path: Option<PathBuf>,
	/// Optional. JSON file written by the local indexer, keyed by absolute folder path.
	pub index_status_path: Option<PathBuf>,
	pub index_max_age_days: u32,
	pub snapshot_ttl_secs: u64,
}
impl Default for Stores {
	fn default() -> Self {
		Self {
			folder_mappings_path: None,
			index_status_path: None,
			index_max_age_days: 7,
			snapshot_ttl_secs: 30,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Session {
	pub workspace_id: Option<String>,
	pub project_id: Option<String>,
}
