use serde_json::Value;

use crate::{Client, Error, Result};
use wayfind_domain::{Document, ScopeRef};

impl Client {
	pub async fn list_documents(&self, scope: ScopeRef<'_>, per_page: u32) -> Result<Vec<Document>> {
		let url = match (scope.project_id, scope.workspace_id) {
			(Some(project), _) => self.endpoint(["projects", project, "docs"]),
			(None, Some(workspace)) => self.endpoint(["workspaces", workspace, "docs"]),
			(None, None) => self.endpoint(["docs"]),
		};
		let json = self.get_json(url, &[("per_page", per_page.to_string())]).await?;

		parse_documents(&json)
	}
}

pub fn parse_documents(json: &Value) -> Result<Vec<Document>> {
	let items = crate::find_array(json, &["docs", "documents", "items", "results"]).ok_or_else(
		|| Error::InvalidResponse {
			message: "Document response is missing a documents array.".to_string(),
		},
	)?;

	Ok(items
		.iter()
		.filter_map(|item| {
			let id = crate::first_str(item, &["id", "doc_id"])?;

			Some(Document {
				id: id.to_string(),
				title: crate::first_str(item, &["title", "name"]).unwrap_or(id).to_string(),
				content: crate::first_str(item, &["content", "body", "text"])
					.unwrap_or_default()
					.to_string(),
				path: crate::first_str(item, &["path", "file_path"]).map(str::to_string),
			})
		})
		.collect())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_documents_and_defaults_missing_fields() {
		let json = serde_json::json!({
			"items": [
				{ "id": "d1", "title": "Roadmap", "content": "Q3 goals", "path": "docs/roadmap.md" },
				{ "id": "d2" }
			]
		});
		let docs = parse_documents(&json).expect("parse failed");

		assert_eq!(docs.len(), 2);
		assert_eq!(docs[0].path.as_deref(), Some("docs/roadmap.md"));
		assert_eq!(docs[1].title, "d2");
		assert_eq!(docs[1].content, "");
	}
}
