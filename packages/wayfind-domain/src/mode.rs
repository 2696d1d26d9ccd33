use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
	Semantic,
	Hybrid,
	Keyword,
	Pattern,
	Exhaustive,
	Refactor,
	/// Fans out across every workspace of a team. Ignores project scope.
	Team,
}
impl SearchMode {
	pub const ALL: [Self; 7] = [
		Self::Semantic,
		Self::Hybrid,
		Self::Keyword,
		Self::Pattern,
		Self::Exhaustive,
		Self::Refactor,
		Self::Team,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Semantic => "semantic",
			Self::Hybrid => "hybrid",
			Self::Keyword => "keyword",
			Self::Pattern => "pattern",
			Self::Exhaustive => "exhaustive",
			Self::Refactor => "refactor",
			Self::Team => "team",
		}
	}

	/// Modes that search across workspaces and ignore scope candidates.
	pub fn is_scope_orthogonal(self) -> bool {
		self == Self::Team
	}
}

impl fmt::Display for SearchMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for SearchMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let needle = s.trim().to_ascii_lowercase();

		Self::ALL
			.into_iter()
			.find(|mode| mode.as_str() == needle)
			.ok_or_else(|| format!("Unknown search mode: {s}."))
	}
}
