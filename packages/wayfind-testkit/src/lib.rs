//! In-memory collaborators for routing tests.
//!
//! `ScriptedProvider` answers searches from a list of rules (first match wins, unmatched calls
//! return an empty envelope) and records every call so tests can assert on the exact chain.

use std::{
	collections::HashMap,
	path::{Path, PathBuf},
	sync::{Arc, Mutex},
	time::Duration,
};

use time::OffsetDateTime;

use wayfind_domain::{
	Document, Project, ResultItem, ScopeRef, SearchEnvelope, SearchMode, SearchParams, Workspace,
};
use wayfind_providers::Error as ProviderError;
use wayfind_service::{
	BoxFuture, Collaborators, FolderMappings, IndexStatus, ProviderResult, RoutingEngine,
	RoutingTuning, SearchProvider, StaticEntitlement,
};
use wayfind_storage::{FolderMappingSnapshot, FolderScope, IndexStatusSnapshot, IndexedProject};

/// Provider failures a script can inject. Converted into real provider errors on each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptedError {
	NotFound,
	Unauthorized,
	Timeout,
	Status(u16),
}
impl ScriptedError {
	pub fn into_error(self) -> ProviderError {
		let message = "scripted".to_string();

		match self {
			Self::NotFound => ProviderError::NotFound { message },
			Self::Unauthorized => ProviderError::Unauthorized { message },
			Self::Timeout => ProviderError::Timeout { message },
			Self::Status(status) => ProviderError::Status { status, message },
		}
	}
}

#[derive(Clone, Debug)]
pub struct Reply<T> {
	result: Result<T, ScriptedError>,
	delay: Option<Duration>,
}
impl<T> Reply<T>
where
	T: Clone,
{
	pub fn ok(value: T) -> Self {
		Self { result: Ok(value), delay: None }
	}

	pub fn err(err: ScriptedError) -> Self {
		Self { result: Err(err), delay: None }
	}

	/// Sleeps for `delay` before answering.
	pub fn after(mut self, delay: Duration) -> Self {
		self.delay = Some(delay);

		self
	}

	async fn resolve(self) -> ProviderResult<T> {
		if let Some(delay) = self.delay {
			tokio::time::sleep(delay).await;
		}

		self.result.map_err(ScriptedError::into_error)
	}
}

/// Matches search calls. Unset fields match anything; `project(None)` matches only calls
/// without a project.
#[derive(Clone, Debug, Default)]
pub struct SearchMatch {
	mode: Option<SearchMode>,
	query: Option<String>,
	workspace_id: Option<String>,
	project_id: Option<Option<String>>,
}
impl SearchMatch {
	pub fn any() -> Self {
		Self::default()
	}

	pub fn mode(mode: SearchMode) -> Self {
		Self { mode: Some(mode), ..Self::default() }
	}

	pub fn query(mut self, query: impl Into<String>) -> Self {
		self.query = Some(query.into());

		self
	}

	pub fn workspace(mut self, workspace_id: impl Into<String>) -> Self {
		self.workspace_id = Some(workspace_id.into());

		self
	}

	pub fn project(mut self, project_id: Option<&str>) -> Self {
		self.project_id = Some(project_id.map(str::to_string));

		self
	}

	fn matches(&self, mode: SearchMode, params: &SearchParams) -> bool {
		self.mode.is_none_or(|expected| expected == mode)
			&& self.query.as_deref().is_none_or(|expected| expected == params.query)
			&& self
				.workspace_id
				.as_deref()
				.is_none_or(|expected| params.workspace_id.as_deref() == Some(expected))
			&& self.project_id.as_ref().is_none_or(|expected| *expected == params.project_id)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchCall {
	pub mode: SearchMode,
	pub params: SearchParams,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentCall {
	pub workspace_id: Option<String>,
	pub project_id: Option<String>,
	pub per_page: u32,
}

#[derive(Default)]
pub struct ScriptedProvider {
	searches: Vec<(SearchMatch, Reply<SearchEnvelope>)>,
	workspaces: Option<Reply<Vec<Workspace>>>,
	projects: HashMap<String, Reply<Project>>,
	documents: Vec<(Option<String>, Option<String>, Reply<Vec<Document>>)>,
	search_calls: Mutex<Vec<SearchCall>>,
	document_calls: Mutex<Vec<DocumentCall>>,
}
impl ScriptedProvider {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn on_search(mut self, matcher: SearchMatch, reply: Reply<SearchEnvelope>) -> Self {
		self.searches.push((matcher, reply));

		self
	}

	pub fn with_workspaces(mut self, reply: Reply<Vec<Workspace>>) -> Self {
		self.workspaces = Some(reply);

		self
	}

	pub fn with_project(mut self, project_id: impl Into<String>, reply: Reply<Project>) -> Self {
		self.projects.insert(project_id.into(), reply);

		self
	}

	/// Documents listed for an exact (workspace, project) scope.
	pub fn with_documents(
		mut self,
		workspace_id: Option<&str>,
		project_id: Option<&str>,
		reply: Reply<Vec<Document>>,
	) -> Self {
		self.documents.push((
			workspace_id.map(str::to_string),
			project_id.map(str::to_string),
			reply,
		));

		self
	}

	pub fn search_calls(&self) -> Vec<SearchCall> {
		self.search_calls.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}

	/// `(mode, query)` pairs in call order.
	pub fn search_chain(&self) -> Vec<(SearchMode, String)> {
		self.search_calls().into_iter().map(|call| (call.mode, call.params.query)).collect()
	}

	pub fn document_calls(&self) -> Vec<DocumentCall> {
		self.document_calls.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl SearchProvider for ScriptedProvider {
	fn search<'a>(
		&'a self,
		mode: SearchMode,
		params: &'a SearchParams,
	) -> BoxFuture<'a, ProviderResult<SearchEnvelope>> {
		self.search_calls
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.push(SearchCall { mode, params: params.clone() });

		let reply = self
			.searches
			.iter()
			.find(|(matcher, _)| matcher.matches(mode, params))
			.map(|(_, reply)| reply.clone())
			.unwrap_or_else(|| Reply::ok(SearchEnvelope::empty()));

		Box::pin(reply.resolve())
	}

	fn list_team_workspaces<'a>(
		&'a self,
		page_size: u32,
	) -> BoxFuture<'a, ProviderResult<Vec<Workspace>>> {
		let reply = self.workspaces.clone().unwrap_or_else(|| Reply::ok(Vec::new()));

		Box::pin(async move {
			let mut workspaces = reply.resolve().await?;

			workspaces.truncate(page_size as usize);

			Ok(workspaces)
		})
	}

	fn get_project<'a>(&'a self, project_id: &'a str) -> BoxFuture<'a, ProviderResult<Project>> {
		let reply = self
			.projects
			.get(project_id)
			.cloned()
			.unwrap_or_else(|| Reply::err(ScriptedError::NotFound));

		Box::pin(reply.resolve())
	}

	fn list_documents<'a>(
		&'a self,
		scope: ScopeRef<'a>,
		per_page: u32,
	) -> BoxFuture<'a, ProviderResult<Vec<Document>>> {
		self.document_calls.lock().unwrap_or_else(|err| err.into_inner()).push(DocumentCall {
			workspace_id: scope.workspace_id.map(str::to_string),
			project_id: scope.project_id.map(str::to_string),
			per_page,
		});

		let reply = self
			.documents
			.iter()
			.find(|(workspace_id, project_id, _)| {
				workspace_id.as_deref() == scope.workspace_id
					&& project_id.as_deref() == scope.project_id
			})
			.map(|(_, _, reply)| reply.clone())
			.unwrap_or_else(|| Reply::ok(Vec::new()));

		Box::pin(async move {
			let mut docs = reply.resolve().await?;

			docs.truncate(per_page as usize);

			Ok(docs)
		})
	}
}

#[derive(Default)]
pub struct StaticFolderMappings(FolderMappingSnapshot);
impl StaticFolderMappings {
	pub fn new<P>(entries: Vec<(P, FolderScope)>) -> Self
	where
		P: AsRef<Path>,
	{
		Self(FolderMappingSnapshot::from_entries(entries))
	}
}
impl FolderMappings for StaticFolderMappings {
	fn lookup(&self, folder: &Path) -> Option<FolderScope> {
		self.0.lookup(folder).cloned()
	}
}

#[derive(Default)]
pub struct StaticIndexStatus(IndexStatusSnapshot);
impl StaticIndexStatus {
	pub fn new(projects: Vec<IndexedProject>) -> Self {
		Self(IndexStatusSnapshot::from_projects(projects))
	}
}
impl IndexStatus for StaticIndexStatus {
	fn latest(&self, folder: &Path) -> Option<IndexedProject> {
		self.0.latest(folder).cloned()
	}
}

/// Collaborators around `provider` with empty stores and no team entitlement.
pub fn collaborators(provider: Arc<ScriptedProvider>) -> Collaborators {
	Collaborators {
		provider,
		folder_mappings: Arc::new(StaticFolderMappings::default()),
		index_status: Arc::new(StaticIndexStatus::default()),
		entitlement: Arc::new(StaticEntitlement(false)),
	}
}

pub fn engine(collaborators: Collaborators) -> RoutingEngine {
	RoutingEngine::new(RoutingTuning::default(), collaborators)
}

/// Envelope of `(location, score)` items, `total` equal to the item count.
pub fn envelope(items: &[(&str, f32)]) -> SearchEnvelope {
	SearchEnvelope::from_results(
		items.iter().map(|(location, score)| ResultItem::new(*location).with_score(*score)).collect(),
	)
}

pub fn workspace(id: &str, name: &str) -> Workspace {
	Workspace { id: id.to_string(), name: name.to_string() }
}

pub fn folder_scope(workspace_id: Option<&str>, project_id: Option<&str>) -> FolderScope {
	FolderScope {
		workspace_id: workspace_id.map(str::to_string),
		project_id: project_id.map(str::to_string),
	}
}

pub fn indexed_project(
	path: impl Into<PathBuf>,
	workspace_id: Option<&str>,
	project_id: Option<&str>,
	indexed_at: OffsetDateTime,
) -> IndexedProject {
	IndexedProject {
		path: path.into(),
		project_id: project_id.map(str::to_string),
		workspace_id: workspace_id.map(str::to_string),
		indexed_at,
	}
}
