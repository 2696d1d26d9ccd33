use tokio::time::Instant;

use crate::{Collaborators, Error, RoutingTuning};
use wayfind_domain::{
	Document, ResultItem, ScopeCandidate, SearchEnvelope,
	docs_intent::{looks_like_docs_lookup, tokenize_query},
};

#[derive(Clone, Debug, PartialEq)]
pub struct DocsReport {
	pub envelope: SearchEnvelope,
	/// Scope the documents came from. `None` when no scope produced any.
	pub candidate: Option<ScopeCandidate>,
	pub ranked: bool,
	pub notes: Vec<String>,
}

/// The docs lookup only runs after code search came back empty for a query that reads like a
/// request for documentation.
pub fn should_search_docs(tuning: &RoutingTuning, envelope: &SearchEnvelope, query: &str) -> bool {
	tuning.docs_enabled && envelope.is_empty() && looks_like_docs_lookup(query)
}

pub fn per_page(tuning: &RoutingTuning, limit: u32) -> u32 {
	tuning.docs_max_documents.min(limit.max(1))
}

/// Walks the scope candidates in rank order and returns documents from the first scope that
/// has any. Provider errors on a scope become notes.
pub async fn find_docs(
	collaborators: &Collaborators,
	tuning: &RoutingTuning,
	query: &str,
	limit: u32,
	candidates: &[ScopeCandidate],
	deadline: Instant,
) -> DocsReport {
	let tokens = tokenize_query(query);
	let page_size = per_page(tuning, limit);
	let mut notes = Vec::new();

	for candidate in candidates {
		let listed = crate::before_deadline(
			deadline,
			collaborators.provider.list_documents(candidate.scope_ref(), page_size),
		)
		.await;
		let docs = match listed {
			Some(Ok(docs)) => docs,
			Some(Err(err)) => {
				let err = Error::from(err);

				tracing::warn!(error = %err, scope = %candidate.label(), "Docs lookup failed.");

				notes.push(format!("Docs lookup skipped {}: {err}", candidate.label()));

				continue;
			},
			None => {
				notes.push("Request deadline reached during the docs lookup.".to_string());

				break;
			},
		};

		if docs.is_empty() {
			continue;
		}

		let (results, ranked) = rank_documents(docs, &tokens, page_size as usize);

		notes.push(if ranked {
			format!(
				"Code search found nothing; showing {} documents ranked by query terms from {}.",
				results.len(),
				candidate.label()
			)
		} else {
			format!(
				"Code search found nothing and no document matched the query terms; showing the first {} documents from {}.",
				results.len(),
				candidate.label()
			)
		});

		tracing::info!(
			scope = %candidate.label(),
			documents = results.len(),
			ranked,
			"Docs fallback used."
		);

		return DocsReport {
			envelope: SearchEnvelope::from_results(results),
			candidate: Some(candidate.clone()),
			ranked,
			notes,
		};
	}

	DocsReport { envelope: SearchEnvelope::empty(), candidate: None, ranked: false, notes }
}

/// Scores each document by how many query tokens appear in its title and content, then sorts
/// all of them descending. Ties keep listing order, so non-matching documents follow the
/// matching ones. When nothing matches, the first `limit` documents are returned unranked and
/// the flag is `false`.
pub fn rank_documents(
	docs: Vec<Document>,
	tokens: &[String],
	limit: usize,
) -> (Vec<ResultItem>, bool) {
	let mut scored: Vec<(usize, Document)> = docs
		.into_iter()
		.map(|doc| {
			let haystack = format!("{} {}", doc.title, doc.content).to_lowercase();
			let matched = tokens.iter().filter(|token| haystack.contains(token.as_str())).count();

			(matched, doc)
		})
		.collect();

	if !scored.iter().any(|(matched, _)| *matched > 0) {
		let items =
			scored.into_iter().take(limit).map(|(_, doc)| document_item(doc, None)).collect();

		return (items, false);
	}

	scored.sort_by(|a, b| b.0.cmp(&a.0));

	let items = scored
		.into_iter()
		.take(limit)
		.map(|(matched, doc)| document_item(doc, Some(matched as f32 / tokens.len() as f32)))
		.collect();

	(items, true)
}

fn document_item(doc: Document, score: Option<f32>) -> ResultItem {
	ResultItem {
		location: doc.path.unwrap_or(doc.title),
		score,
		language: None,
		snippet: Some(doc.content).filter(|content| !content.is_empty()),
		workspace_id: None,
		workspace_name: None,
	}
}
