//! Query routing engine: picks a search mode, resolves candidate scopes, walks the fallback
//! table, fans team searches out, and explains every automatic decision it made.

pub mod compose;
pub mod docs;
pub mod fallback;
pub mod iterate;
pub mod route;
pub mod scope;
pub mod team;

mod error;

pub use compose::{OutcomeBuilder, RoutingOutcome, RoutingPayload, payload, render_text};
pub use error::{Error, Result};
pub use fallback::{Attempt, FallbackPlan, FallbackReport};
pub use iterate::IterationReport;
pub use route::RouteRequest;
pub use scope::{ScopeRequest, ScopeResolution};
pub use team::TeamReport;

use std::{future::Future, path::Path, pin::Pin, sync::Arc, time::Duration};

use tokio::time::Instant;

use wayfind_config::Config;
use wayfind_domain::{
	Document, Project, ScopeRef, SearchEnvelope, SearchMode, SearchParams, Workspace,
};
use wayfind_providers::Client;
use wayfind_storage::{FolderMappingStore, FolderScope, IndexStatusStore, IndexedProject};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type ProviderResult<T> = wayfind_providers::Result<T>;

/// Remote search backend. One call per mode; team fan-out is built on top of `hybrid`.
pub trait SearchProvider
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		mode: SearchMode,
		params: &'a SearchParams,
	) -> BoxFuture<'a, ProviderResult<SearchEnvelope>>;

	fn list_team_workspaces<'a>(
		&'a self,
		page_size: u32,
	) -> BoxFuture<'a, ProviderResult<Vec<Workspace>>>;

	fn get_project<'a>(&'a self, project_id: &'a str) -> BoxFuture<'a, ProviderResult<Project>>;

	fn list_documents<'a>(
		&'a self,
		scope: ScopeRef<'a>,
		per_page: u32,
	) -> BoxFuture<'a, ProviderResult<Vec<Document>>>;
}

pub trait FolderMappings
where
	Self: Send + Sync,
{
	fn lookup(&self, folder: &Path) -> Option<FolderScope>;
}

pub trait IndexStatus
where
	Self: Send + Sync,
{
	fn latest(&self, folder: &Path) -> Option<IndexedProject>;
}

pub trait TeamEntitlement
where
	Self: Send + Sync,
{
	fn has_team_access(&self) -> bool;
}

#[derive(Clone)]
pub struct Collaborators {
	pub provider: Arc<dyn SearchProvider>,
	pub folder_mappings: Arc<dyn FolderMappings>,
	pub index_status: Arc<dyn IndexStatus>,
	pub entitlement: Arc<dyn TeamEntitlement>,
}

/// Thresholds and limits used while routing. The score thresholds are empirical.
#[derive(Clone, Debug)]
pub struct RoutingTuning {
	pub low_confidence_score: f32,
	pub semantic_improvement_margin: f32,
	pub default_limit: u32,
	pub content_max_chars: u32,
	pub request_timeout: Duration,
	pub team_max_workspaces: u32,
	pub team_call_timeout: Duration,
	pub docs_enabled: bool,
	pub docs_max_documents: u32,
	pub index_max_age: time::Duration,
}
impl RoutingTuning {
	pub const LOW_CONFIDENCE_SCORE: f32 = 0.35;
	pub const SEMANTIC_IMPROVEMENT_MARGIN: f32 = 0.08;
	pub const TEAM_WORKSPACE_CAP: u32 = 10;
	pub const DOCS_MAX_DOCUMENTS: u32 = 50;
}
impl Default for RoutingTuning {
	fn default() -> Self {
		Self {
			low_confidence_score: Self::LOW_CONFIDENCE_SCORE,
			semantic_improvement_margin: Self::SEMANTIC_IMPROVEMENT_MARGIN,
			default_limit: 10,
			content_max_chars: 400,
			request_timeout: Duration::from_secs(30),
			team_max_workspaces: Self::TEAM_WORKSPACE_CAP,
			team_call_timeout: Duration::from_secs(8),
			docs_enabled: true,
			docs_max_documents: Self::DOCS_MAX_DOCUMENTS,
			index_max_age: time::Duration::days(7),
		}
	}
}
impl From<&Config> for RoutingTuning {
	fn from(cfg: &Config) -> Self {
		Self {
			low_confidence_score: cfg.routing.low_confidence_score,
			semantic_improvement_margin: cfg.routing.semantic_improvement_margin,
			default_limit: cfg.routing.default_limit,
			content_max_chars: cfg.routing.content_max_chars,
			request_timeout: Duration::from_millis(cfg.routing.request_timeout_ms),
			team_max_workspaces: cfg.team.max_workspaces.min(Self::TEAM_WORKSPACE_CAP),
			team_call_timeout: Duration::from_millis(cfg.team.call_timeout_ms),
			docs_enabled: cfg.docs.enabled,
			docs_max_documents: cfg.docs.max_documents.min(Self::DOCS_MAX_DOCUMENTS),
			index_max_age: time::Duration::days(i64::from(cfg.stores.index_max_age_days)),
		}
	}
}

pub struct RoutingEngine {
	pub tuning: RoutingTuning,
	pub collaborators: Collaborators,
}
impl RoutingEngine {
	pub fn new(tuning: RoutingTuning, collaborators: Collaborators) -> Self {
		Self { tuning, collaborators }
	}

	/// Wires the HTTP provider and the file-backed stores described by `cfg`.
	pub fn from_config(cfg: &Config) -> Result<Self> {
		let client = Client::new(&cfg.provider)?;
		let ttl = Duration::from_secs(cfg.stores.snapshot_ttl_secs);
		let collaborators = Collaborators {
			provider: Arc::new(client),
			folder_mappings: Arc::new(FolderMappingStore::open(
				cfg.stores.folder_mappings_path.clone(),
				ttl,
			)),
			index_status: Arc::new(IndexStatusStore::open(cfg.stores.index_status_path.clone(), ttl)),
			entitlement: Arc::new(StaticEntitlement(cfg.team.entitled)),
		};

		Ok(Self::new(RoutingTuning::from(cfg), collaborators))
	}
}

/// Entitlement decided once, up front, by whoever built the engine.
#[derive(Clone, Copy, Debug)]
pub struct StaticEntitlement(pub bool);
impl TeamEntitlement for StaticEntitlement {
	fn has_team_access(&self) -> bool {
		self.0
	}
}

impl SearchProvider for Client {
	fn search<'a>(
		&'a self,
		mode: SearchMode,
		params: &'a SearchParams,
	) -> BoxFuture<'a, ProviderResult<SearchEnvelope>> {
		Box::pin(Client::search(self, mode, params))
	}

	fn list_team_workspaces<'a>(
		&'a self,
		page_size: u32,
	) -> BoxFuture<'a, ProviderResult<Vec<Workspace>>> {
		Box::pin(Client::list_team_workspaces(self, page_size))
	}

	fn get_project<'a>(&'a self, project_id: &'a str) -> BoxFuture<'a, ProviderResult<Project>> {
		Box::pin(Client::get_project(self, project_id))
	}

	fn list_documents<'a>(
		&'a self,
		scope: ScopeRef<'a>,
		per_page: u32,
	) -> BoxFuture<'a, ProviderResult<Vec<Document>>> {
		Box::pin(Client::list_documents(self, scope, per_page))
	}
}

impl FolderMappings for FolderMappingStore {
	fn lookup(&self, folder: &Path) -> Option<FolderScope> {
		FolderMappingStore::lookup(self, folder)
	}
}

impl IndexStatus for IndexStatusStore {
	fn latest(&self, folder: &Path) -> Option<IndexedProject> {
		IndexStatusStore::latest(self, folder)
	}
}

/// Runs one provider call under the request deadline. `None` means the deadline passed first.
pub(crate) async fn before_deadline<T, F>(deadline: Instant, call: F) -> Option<ProviderResult<T>>
where
	F: Future<Output = ProviderResult<T>>,
{
	tokio::time::timeout_at(deadline, call).await.ok()
}
