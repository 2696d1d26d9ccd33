use serde::{Deserialize, Serialize};

/// The single result shape every provider response is normalized into.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchEnvelope {
	pub results: Vec<ResultItem>,
	pub total: u64,
}
impl SearchEnvelope {
	pub fn empty() -> Self {
		Self::default()
	}

	pub fn from_results(results: Vec<ResultItem>) -> Self {
		let total = results.len() as u64;

		Self { results, total }
	}

	pub fn is_empty(&self) -> bool {
		self.results.is_empty()
	}

	pub fn len(&self) -> usize {
		self.results.len()
	}

	/// Highest score in the envelope. Missing scores count as zero.
	pub fn top_score(&self) -> f32 {
		self.results.iter().map(ResultItem::score_or_zero).fold(0.0, f32::max)
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
	pub location: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub score: Option<f32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub language: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub snippet: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub workspace_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub workspace_name: Option<String>,
}
impl ResultItem {
	pub fn new(location: impl Into<String>) -> Self {
		Self { location: location.into(), ..Self::default() }
	}

	pub fn with_score(mut self, score: f32) -> Self {
		self.score = Some(score);

		self
	}

	pub fn score_or_zero(&self) -> f32 {
		self.score.filter(|score| score.is_finite()).unwrap_or(0.0)
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
	pub id: String,
	pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
	pub id: String,
	pub workspace_id: Option<String>,
	pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
	pub id: String,
	pub title: String,
	pub content: String,
	pub path: Option<String>,
}
