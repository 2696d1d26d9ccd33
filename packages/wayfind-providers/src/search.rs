use serde_json::Value;

use crate::{Client, Error, Result};
use wayfind_domain::{ResultItem, SearchEnvelope, SearchMode, SearchParams};

impl Client {
	/// One remote search call. `mode` selects the backend endpoint; team fan-out is composed by
	/// the caller from per-workspace hybrid calls.
	pub async fn search(&self, mode: SearchMode, params: &SearchParams) -> Result<SearchEnvelope> {
		if mode == SearchMode::Team {
			return Err(Error::InvalidRequest {
				message: "Team search has no single backend endpoint.".to_string(),
			});
		}

		let url = self.endpoint(["search", mode.as_str()]);
		let body = serde_json::to_value(params)?;
		let json = self.post_json(url, &body).await?;

		parse_envelope(&json)
	}
}

pub fn parse_envelope(json: &Value) -> Result<SearchEnvelope> {
	let items = crate::find_array(json, &["results", "items", "hits"]).ok_or_else(|| {
		Error::InvalidResponse { message: "Search response is missing a results array.".to_string() }
	})?;
	let results: Vec<ResultItem> = items.iter().filter_map(parse_result_item).collect();
	let reported_total = json
		.get("data")
		.and_then(|data| data.get("total"))
		.or_else(|| json.get("total"))
		.and_then(Value::as_u64)
		.unwrap_or(0);
	let total = reported_total.max(results.len() as u64);

	Ok(SearchEnvelope { results, total })
}

fn parse_result_item(item: &Value) -> Option<ResultItem> {
	let location = match crate::first_str(item, &["location"]) {
		Some(location) => location.to_string(),
		None => {
			let path = crate::first_str(item, &["file_path", "path", "file", "id"])?;
			let line = ["line", "line_start", "start_line"]
				.iter()
				.find_map(|key| item.get(key).and_then(Value::as_u64));

			match line {
				Some(line) => format!("{path}:{line}"),
				None => path.to_string(),
			}
		},
	};
	let score = ["score", "similarity", "relevance_score"]
		.iter()
		.find_map(|key| item.get(key).and_then(Value::as_f64))
		.filter(|score| score.is_finite())
		.map(|score| score.clamp(0.0, 1.0) as f32);

	Some(ResultItem {
		location,
		score,
		language: crate::first_str(item, &["language", "lang"]).map(str::to_string),
		snippet: crate::first_str(item, &["content", "snippet", "text"]).map(str::to_string),
		workspace_id: crate::first_str(item, &["workspace_id"]).map(str::to_string),
		workspace_name: crate::first_str(item, &["workspace_name"]).map(str::to_string),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn normalizes_nested_data_results() {
		let json = serde_json::json!({
			"data": {
				"results": [
					{ "file_path": "src/auth.rs", "line": 42, "score": 0.91, "language": "rust" },
					{ "location": "src/lib.rs:7", "similarity": 1.4 }
				],
				"total": 12
			}
		});
		let envelope = parse_envelope(&json).expect("parse failed");

		assert_eq!(envelope.total, 12);
		assert_eq!(envelope.results[0].location, "src/auth.rs:42");
		assert_eq!(envelope.results[0].language.as_deref(), Some("rust"));
		assert_eq!(envelope.results[1].score, Some(1.0));
	}

	#[test]
	fn normalizes_flat_results_and_skips_items_without_location() {
		let json = serde_json::json!({
			"results": [
				{ "path": "README.md" },
				{ "score": 0.5 }
			]
		});
		let envelope = parse_envelope(&json).expect("parse failed");

		assert_eq!(envelope.len(), 1);
		assert_eq!(envelope.total, 1);
		assert_eq!(envelope.results[0].score, None);
	}

	#[test]
	fn rejects_responses_without_results() {
		let err = parse_envelope(&serde_json::json!({ "status": "ok" }))
			.expect_err("Expected invalid response.");

		assert!(matches!(err, Error::InvalidResponse { .. }));
	}
}
