use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
	Full,
	#[default]
	Minimal,
	Paths,
	Count,
}
impl OutputFormat {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Full => "full",
			Self::Minimal => "minimal",
			Self::Paths => "paths",
			Self::Count => "count",
		}
	}
}

/// A single incoming search request. Never mutated once routing starts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Query {
	pub text: String,
	pub limit: u32,
	pub offset: u32,
	pub content_max_chars: u32,
	pub context_lines: Option<u32>,
	pub exact_match_boost: Option<f32>,
	pub output_format: Option<OutputFormat>,
}
impl Query {
	pub fn new(text: impl Into<String>, limit: u32, content_max_chars: u32) -> Self {
		Self {
			text: text.into(),
			limit,
			offset: 0,
			content_max_chars,
			context_lines: None,
			exact_match_boost: None,
			output_format: None,
		}
	}

	/// Builds provider parameters for one call, replacing the query text and scope.
	pub fn params(
		&self,
		text: &str,
		workspace_id: Option<&str>,
		project_id: Option<&str>,
		output_format: OutputFormat,
	) -> SearchParams {
		SearchParams {
			query: text.to_string(),
			workspace_id: workspace_id.map(str::to_string),
			project_id: project_id.map(str::to_string),
			limit: self.limit,
			offset: self.offset,
			content_max_chars: self.content_max_chars,
			context_lines: self.context_lines,
			exact_match_boost: self.exact_match_boost,
			output_format: Some(output_format),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
	pub query: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub workspace_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub project_id: Option<String>,
	pub limit: u32,
	pub offset: u32,
	pub content_max_chars: u32,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub context_lines: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub exact_match_boost: Option<f32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub output_format: Option<OutputFormat>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDefaults {
	pub workspace_id: Option<String>,
	pub project_id: Option<String>,
}
