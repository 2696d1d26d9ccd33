use serde_json::Value;

use crate::{Client, Error, Result};
use wayfind_domain::{Project, Workspace};

impl Client {
	pub async fn list_team_workspaces(&self, page_size: u32) -> Result<Vec<Workspace>> {
		let url = self.endpoint(["workspaces"]);
		let query = [("scope", "team".to_string()), ("page_size", page_size.to_string())];
		let json = self.get_json(url, &query).await?;

		parse_workspaces(&json)
	}

	pub async fn get_project(&self, project_id: &str) -> Result<Project> {
		let url = self.endpoint(["projects", project_id]);
		let json = self.get_json(url, &[]).await?;

		parse_project(&json)
	}
}

pub fn parse_workspaces(json: &Value) -> Result<Vec<Workspace>> {
	let items = crate::find_array(json, &["workspaces", "items", "results"]).ok_or_else(|| {
		Error::InvalidResponse {
			message: "Workspace response is missing a workspaces array.".to_string(),
		}
	})?;

	Ok(items
		.iter()
		.filter_map(|item| {
			let id = crate::first_str(item, &["id", "workspace_id"])?;
			let name = crate::first_str(item, &["name", "title"]).unwrap_or(id);

			Some(Workspace { id: id.to_string(), name: name.to_string() })
		})
		.collect())
}

pub fn parse_project(json: &Value) -> Result<Project> {
	let item = json.get("data").filter(|data| data.is_object()).unwrap_or(json);
	let id = crate::first_str(item, &["id", "project_id"]).ok_or_else(|| {
		Error::InvalidResponse { message: "Project response is missing an id.".to_string() }
	})?;

	Ok(Project {
		id: id.to_string(),
		workspace_id: crate::first_str(item, &["workspace_id"]).map(str::to_string),
		name: crate::first_str(item, &["name"]).map(str::to_string),
	})
}
