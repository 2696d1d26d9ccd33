use std::{path::Path, sync::Arc, time::Duration};

use time::macros::datetime;
use tokio::time::Instant;

use wayfind_domain::{Document, OutputFormat, Query, ScopeOrigin, SearchMode, SessionDefaults};
use wayfind_service::{
	Error, OutcomeBuilder, RouteRequest, RoutingTuning, ScopeRequest, StaticEntitlement, payload,
	render_text, scope,
};
use wayfind_testkit::{
	Reply, ScriptedError, ScriptedProvider, SearchMatch, StaticFolderMappings, StaticIndexStatus,
	envelope, folder_scope, indexed_project,
};

fn deadline() -> Instant {
	Instant::now() + Duration::from_secs(5)
}

fn session(workspace_id: Option<&str>, project_id: Option<&str>) -> SessionDefaults {
	SessionDefaults {
		workspace_id: workspace_id.map(str::to_string),
		project_id: project_id.map(str::to_string),
	}
}

#[tokio::test]
async fn candidates_follow_origin_priority_and_end_in_none() {
	let mut collaborators = wayfind_testkit::collaborators(Arc::new(ScriptedProvider::new()));

	collaborators.folder_mappings = Arc::new(StaticFolderMappings::new(vec![(
		"/repo",
		folder_scope(Some("w1"), Some("p-folder")),
	)]));
	collaborators.index_status = Arc::new(StaticIndexStatus::new(vec![indexed_project(
		"/repo",
		Some("w1"),
		Some("p-index"),
		datetime!(2024-03-01 00:00 UTC),
	)]));

	let session = session(Some("w1"), Some("p-session"));
	let req = ScopeRequest {
		explicit_workspace: None,
		explicit_project: None,
		folder: Some(Path::new("/repo/src")),
		session: &session,
	};
	let resolution = scope::resolve_candidates(
		&collaborators,
		&RoutingTuning::default(),
		&req,
		datetime!(2024-03-05 00:00 UTC),
		deadline(),
	)
	.await
	.expect("resolve failed");
	let summary: Vec<(Option<&str>, ScopeOrigin, u32)> = resolution
		.candidates
		.iter()
		.map(|candidate| (candidate.project_id.as_deref(), candidate.origin, candidate.rank))
		.collect();

	assert_eq!(
		summary,
		vec![
			(Some("p-folder"), ScopeOrigin::FolderMapping, 0),
			(Some("p-index"), ScopeOrigin::LocalIndex, 1),
			(Some("p-session"), ScopeOrigin::SessionDefault, 2),
			(None, ScopeOrigin::None, 3),
		]
	);
	assert!(resolution.notes.is_empty());
}

#[tokio::test]
async fn stale_local_index_is_ignored() {
	let mut collaborators = wayfind_testkit::collaborators(Arc::new(ScriptedProvider::new()));

	collaborators.index_status = Arc::new(StaticIndexStatus::new(vec![indexed_project(
		"/repo",
		Some("w1"),
		Some("p-index"),
		datetime!(2024-03-01 00:00 UTC),
	)]));

	let session = session(Some("w1"), None);
	let req = ScopeRequest {
		explicit_workspace: None,
		explicit_project: None,
		folder: Some(Path::new("/repo")),
		session: &session,
	};
	let tuning = RoutingTuning::default();
	let fresh = scope::resolve_candidates(
		&collaborators,
		&tuning,
		&req,
		datetime!(2024-03-08 00:00 UTC),
		deadline(),
	)
	.await
	.expect("resolve failed");
	let stale = scope::resolve_candidates(
		&collaborators,
		&tuning,
		&req,
		datetime!(2024-03-08 00:01 UTC),
		deadline(),
	)
	.await
	.expect("resolve failed");

	assert_eq!(fresh.candidates[0].origin, ScopeOrigin::LocalIndex);
	assert_eq!(stale.candidates.len(), 1);
	assert_eq!(stale.candidates[0].origin, ScopeOrigin::None);
}

#[tokio::test]
async fn candidate_list_is_never_empty_and_ends_in_none_without_explicit() {
	let provider = Arc::new(ScriptedProvider::new().with_project(
		"p-ok",
		Reply::ok(wayfind_domain::Project {
			id: "p-ok".to_string(),
			workspace_id: Some("w1".to_string()),
			name: None,
		}),
	));
	let collaborators = wayfind_testkit::collaborators(provider);
	let tuning = RoutingTuning::default();
	let sessions = [session(None, None), session(Some("w1"), None), session(Some("w1"), Some("p"))];
	let explicit = [(None, None), (Some("w1"), None), (None, Some("p-missing")), (Some("w1"), Some("p-ok"))];

	for session in &sessions {
		for (explicit_workspace, explicit_project) in explicit {
			let req = ScopeRequest { explicit_workspace, explicit_project, folder: None, session };
			let resolution = scope::resolve_candidates(
				&collaborators,
				&tuning,
				&req,
				datetime!(2024-03-08 00:00 UTC),
				deadline(),
			)
			.await
			.expect("resolve failed");
			let candidates = &resolution.candidates;
			let last = candidates.last().expect("Candidate list must not be empty.");
			let explicit_kept =
				candidates.iter().any(|candidate| candidate.origin == ScopeOrigin::Explicit);

			assert!(explicit_kept || last.origin == ScopeOrigin::None, "{req:?}");

			for (index, candidate) in candidates.iter().enumerate() {
				assert_eq!(candidate.rank, index as u32);
				assert!(
					candidates[..index].iter().all(|earlier| !earlier.same_pair(candidate)),
					"{req:?}"
				);
			}
		}
	}
}

#[tokio::test]
async fn unvalidated_explicit_project_is_kept_on_timeout() {
	let provider = Arc::new(
		ScriptedProvider::new().with_project("p-slow", Reply::err(ScriptedError::Timeout)),
	);
	let collaborators = wayfind_testkit::collaborators(provider);
	let session = session(Some("w1"), None);
	let req = ScopeRequest {
		explicit_workspace: None,
		explicit_project: Some("p-slow"),
		folder: None,
		session: &session,
	};
	let resolution = scope::resolve_candidates(
		&collaborators,
		&RoutingTuning::default(),
		&req,
		datetime!(2024-03-08 00:00 UTC),
		deadline(),
	)
	.await
	.expect("resolve failed");

	assert_eq!(resolution.candidates[0].origin, ScopeOrigin::Explicit);
	assert_eq!(resolution.candidates[0].project_id.as_deref(), Some("p-slow"));
	assert!(!resolution.explicit_project_autocorrected);
	assert!(resolution.notes[0].contains("using it as given"));
}

#[tokio::test]
async fn explicit_project_auth_failure_propagates() {
	let provider = Arc::new(
		ScriptedProvider::new().with_project("p-1", Reply::err(ScriptedError::Unauthorized)),
	);
	let engine = wayfind_testkit::engine(wayfind_testkit::collaborators(provider));
	let mut req = RouteRequest::new(Query::new("auth", 10, 400));

	req.explicit_project = Some("p-1".to_string());

	let err = engine.route(req).await.expect_err("Expected auth failure.");

	assert!(matches!(err, Error::Auth { .. }));
}

#[tokio::test]
async fn later_scope_answers_when_project_scope_is_empty() {
	let provider = Arc::new(ScriptedProvider::new().on_search(
		SearchMatch::mode(SearchMode::Hybrid).workspace("w1").project(None),
		Reply::ok(envelope(&[("src/auth.rs:10", 0.7)])),
	));
	let engine = wayfind_testkit::engine(wayfind_testkit::collaborators(provider.clone()));
	let mut req = RouteRequest::new(Query::new("auth", 10, 400));

	req.session = session(Some("w1"), Some("p1"));

	let outcome = engine.route(req).await.expect("route failed");
	let scope = outcome.resolved_scope().expect("Expected a resolved scope.");

	assert_eq!(scope.origin, ScopeOrigin::None);
	assert_eq!(scope.rank, 1);
	assert!(
		outcome
			.fallback_notes()
			.iter()
			.any(|note| note == "No results in project p1; showing results from workspace w1.")
	);
	assert_eq!(provider.search_calls().len(), 2);
}

#[tokio::test]
async fn empty_everywhere_keeps_the_first_scope() {
	let provider = Arc::new(ScriptedProvider::new());
	let engine = wayfind_testkit::engine(wayfind_testkit::collaborators(provider));
	let mut req = RouteRequest::new(Query::new("auth", 10, 400));

	req.session = session(Some("w1"), Some("p1"));

	let outcome = engine.route(req).await.expect("route failed");

	assert!(outcome.envelope().is_empty());
	assert_eq!(outcome.resolved_scope().map(|scope| scope.rank), Some(0));
	assert!(
		outcome.fallback_notes().iter().any(|note| note.contains("scoped search found nothing"))
	);
}

#[tokio::test]
async fn recoverable_scope_errors_become_notes() {
	let provider = Arc::new(
		ScriptedProvider::new()
			.on_search(
				SearchMatch::any().project(Some("p1")),
				Reply::err(ScriptedError::Status(503)),
			)
			.on_search(SearchMatch::any(), Reply::ok(envelope(&[("src/lib.rs:1", 0.6)]))),
	);
	let engine = wayfind_testkit::engine(wayfind_testkit::collaborators(provider));
	let mut req = RouteRequest::new(Query::new("auth", 10, 400));

	req.session = session(Some("w1"), Some("p1"));

	let outcome = engine.route(req).await.expect("route failed");

	assert_eq!(outcome.envelope().len(), 1);
	assert!(outcome.fallback_notes().iter().any(|note| note.starts_with("Skipped project p1")));
}

#[tokio::test]
async fn all_scopes_missing_is_no_valid_scope() {
	let provider = Arc::new(
		ScriptedProvider::new().on_search(SearchMatch::any(), Reply::err(ScriptedError::NotFound)),
	);
	let engine = wayfind_testkit::engine(wayfind_testkit::collaborators(provider));
	let mut req = RouteRequest::new(Query::new("auth", 10, 400));

	req.session = session(Some("w-gone"), Some("p-gone"));

	let err = engine.route(req).await.expect_err("Expected no valid scope.");

	assert!(matches!(err, Error::NoValidScope { .. }));
}

#[tokio::test]
async fn search_auth_failure_is_not_recovered() {
	let provider = Arc::new(
		ScriptedProvider::new()
			.on_search(SearchMatch::any(), Reply::err(ScriptedError::Unauthorized)),
	);
	let engine = wayfind_testkit::engine(wayfind_testkit::collaborators(provider));
	let mut req = RouteRequest::new(Query::new("auth", 10, 400));

	req.session = session(Some("w1"), Some("p1"));

	let err = engine.route(req).await.expect_err("Expected auth failure.");

	assert!(matches!(err, Error::Auth { .. }));
}

#[tokio::test]
async fn team_search_requires_entitlement() {
	let engine =
		wayfind_testkit::engine(wayfind_testkit::collaborators(Arc::new(ScriptedProvider::new())));
	let mut req = RouteRequest::new(Query::new("retry logic", 10, 400));

	req.mode = Some(SearchMode::Team);

	let err = engine.route(req).await.expect_err("Expected entitlement failure.");

	assert!(matches!(err, Error::NotEntitled));
}

#[tokio::test]
async fn team_results_never_exceed_the_requested_limit() {
	let provider = Arc::new(
		ScriptedProvider::new()
			.with_workspaces(Reply::ok(vec![
				wayfind_testkit::workspace("w1", "One"),
				wayfind_testkit::workspace("w2", "Two"),
			]))
			.on_search(
				SearchMatch::mode(SearchMode::Hybrid),
				Reply::ok(envelope(&[("a.rs", 0.3), ("b.rs", 0.6), ("c.rs", 0.9)])),
			),
	);
	let mut collaborators = wayfind_testkit::collaborators(provider.clone());

	collaborators.entitlement = Arc::new(StaticEntitlement(true));

	let engine = wayfind_testkit::engine(collaborators);

	for limit in [1, 2, 5, 10] {
		let mut req = RouteRequest::new(Query::new("retry logic", limit, 400));

		req.mode = Some(SearchMode::Team);

		let outcome = engine.route(req).await.expect("team search failed");

		assert!(outcome.envelope().len() <= limit as usize);
		assert_eq!(outcome.envelope().total, 6);
	}

	let per_workspace: Vec<u32> =
		provider.search_calls().iter().take(2).map(|call| call.params.limit).collect();

	assert_eq!(per_workspace, vec![1, 1]);
}

#[tokio::test]
async fn docs_lookup_runs_when_code_search_is_empty() {
	let provider = Arc::new(ScriptedProvider::new().with_documents(
		Some("w1"),
		None,
		Reply::ok(vec![
			Document {
				id: "d1".to_string(),
				title: "Glossary".to_string(),
				content: "Terms".to_string(),
				path: None,
			},
			Document {
				id: "d2".to_string(),
				title: "Q3 roadmap".to_string(),
				content: "Auth rewrite".to_string(),
				path: Some("docs/roadmap.md".to_string()),
			},
		]),
	));
	let engine = wayfind_testkit::engine(wayfind_testkit::collaborators(provider.clone()));
	let mut req = RouteRequest::new(Query::new("list the roadmap docs", 5, 400));

	req.session = session(Some("w1"), None);

	let outcome = engine.route(req).await.expect("route failed");

	assert!(outcome.docs_fallback());
	assert_eq!(outcome.envelope().len(), 2);
	assert_eq!(outcome.envelope().results[0].location, "docs/roadmap.md");
	assert_eq!(outcome.envelope().results[0].score, Some(1.0));
	assert_eq!(outcome.envelope().results[1].location, "Glossary");
	assert_eq!(outcome.envelope().results[1].score, Some(0.0));
	assert_eq!(provider.document_calls()[0].per_page, 5);
	assert!(
		outcome
			.fallback_notes()
			.last()
			.is_some_and(|note| note.contains("documents ranked by query terms from workspace w1"))
	);
}

#[tokio::test]
async fn docs_lookup_is_skipped_for_code_queries() {
	let provider = Arc::new(ScriptedProvider::new());
	let engine = wayfind_testkit::engine(wayfind_testkit::collaborators(provider.clone()));
	let outcome = engine
		.route(RouteRequest::new(Query::new("find the spec for parser.ts", 5, 400)))
		.await
		.expect("route failed");

	assert!(!outcome.docs_fallback());
	assert!(provider.document_calls().is_empty());
}

#[tokio::test]
async fn deadline_before_the_first_answer_returns_nothing() {
	let provider = Arc::new(ScriptedProvider::new().on_search(
		SearchMatch::any(),
		Reply::ok(envelope(&[("src/a.rs", 0.9)])).after(Duration::from_secs(2)),
	));
	let engine = wayfind_testkit::engine(wayfind_testkit::collaborators(provider));
	let mut req = RouteRequest::new(Query::new("\"getUserById\"", 10, 400));

	req.timeout = Some(Duration::from_millis(50));

	let started = std::time::Instant::now();
	let outcome = engine.route(req).await.expect("deadline must not fail the request");

	assert!(started.elapsed() < Duration::from_secs(2));
	assert!(outcome.interrupted());
	assert!(outcome.envelope().is_empty());
	assert!(outcome.fallback_notes().iter().any(|note| note.contains("deadline")));
}

#[tokio::test]
async fn deadline_mid_chain_keeps_the_hybrid_results() {
	let provider = Arc::new(
		ScriptedProvider::new()
			.on_search(
				SearchMatch::mode(SearchMode::Hybrid),
				Reply::ok(envelope(&[("src/retry.rs:10", 0.2)])),
			)
			.on_search(
				SearchMatch::mode(SearchMode::Semantic),
				Reply::ok(envelope(&[("src/backoff.rs:8", 0.9)])).after(Duration::from_secs(2)),
			),
	);
	let engine = wayfind_testkit::engine(wayfind_testkit::collaborators(provider));
	let mut req = RouteRequest::new(Query::new("how many retries are there", 10, 400));

	req.session = session(Some("w1"), None);
	req.timeout = Some(Duration::from_millis(50));

	let started = std::time::Instant::now();
	let outcome = engine.route(req).await.expect("deadline must not fail the request");

	assert!(started.elapsed() < Duration::from_secs(2));
	assert!(outcome.interrupted());
	assert_eq!(outcome.executed_mode(), SearchMode::Hybrid);
	assert_eq!(outcome.envelope().len(), 1);
	assert_eq!(outcome.envelope().results[0].location, "src/retry.rs:10");
	assert!(
		outcome.fallback_notes().iter().any(|note| note.starts_with("Request deadline reached"))
	);
}

#[tokio::test]
async fn blank_queries_are_rejected() {
	let engine =
		wayfind_testkit::engine(wayfind_testkit::collaborators(Arc::new(ScriptedProvider::new())));
	let err = engine
		.route(RouteRequest::new(Query::new("   ", 10, 400)))
		.await
		.expect_err("Expected invalid request.");

	assert!(matches!(err, Error::InvalidRequest { .. }));
}

#[test]
fn renders_numbered_list_with_optional_language_and_score() {
	let mut results = envelope(&[("src/auth.rs:42", 0.91)]);

	results.results[0].language = Some("rust".to_string());
	results.results.push(wayfind_domain::ResultItem::new("README.md"));
	results.total = 2;

	let note = "Keyword search returned no results; fell back to keyword search for `x`.";
	let outcome =
		OutcomeBuilder::new(SearchMode::Keyword, true, "quoted literal query", OutputFormat::Minimal)
			.fallback(wayfind_service::FallbackReport {
				envelope: results,
				executed_mode: SearchMode::Keyword,
				notes: vec![note.to_string()],
				attempts: Vec::new(),
				interrupted: false,
			})
			.build();
	let text = render_text(&outcome);

	assert_eq!(
		text,
		"1. src/auth.rs:42 [rust] 91%\n2. README.md\n\nNotes:\n- Mode auto-selected: keyword (quoted literal query).\n- Keyword search returned no results; fell back to keyword search for `x`.\n"
	);
}

#[test]
fn renders_paths_and_counts() {
	let build = |format| {
		OutcomeBuilder::new(SearchMode::Refactor, false, "explicitly requested", format)
			.fallback(wayfind_service::FallbackReport {
				envelope: envelope(&[("src/a.rs:1", 0.5), ("src/b.rs:2", 0.4)]),
				executed_mode: SearchMode::Refactor,
				notes: Vec::new(),
				attempts: Vec::new(),
				interrupted: false,
			})
			.build()
	};

	assert_eq!(render_text(&build(OutputFormat::Paths)), "src/a.rs:1\nsrc/b.rs:2\n");
	assert_eq!(render_text(&build(OutputFormat::Count)), "2 results\n");
}

#[tokio::test]
async fn payload_carries_resolution_and_notes() {
	let provider = Arc::new(ScriptedProvider::new().on_search(
		SearchMatch::any(),
		Reply::ok(envelope(&[("src/auth.rs:3", 0.6)])),
	));
	let engine = wayfind_testkit::engine(wayfind_testkit::collaborators(provider));
	let mut req = RouteRequest::new(Query::new("auth", 10, 400));

	req.session = session(Some("w1"), Some("p1"));

	let outcome = engine.route(req).await.expect("route failed");
	let json = serde_json::to_value(payload(&outcome)).expect("serialize failed");

	assert_eq!(json["executed_mode"], "hybrid");
	assert_eq!(json["resolved_workspace_id"], "w1");
	assert_eq!(json["resolved_project_id"], "p1");
	assert_eq!(json["resolution_rank"], 0);
	assert_eq!(json["resolution_origin"], "session_default");
	assert_eq!(json["explicit_project_autocorrected"], false);
	assert_eq!(json["total"], 1);
	assert_eq!(json["results"][0]["location"], "src/auth.rs:3");
	assert_eq!(json["fallback_notes"][0], "Mode auto-selected: hybrid (default for broad discovery).");
}
