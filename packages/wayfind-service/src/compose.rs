use std::fmt::Write as _;

use serde::Serialize;
use uuid::Uuid;

use crate::{FallbackReport, TeamReport, docs::DocsReport, iterate::IterationReport};
use wayfind_domain::{
	OutputFormat, ResultItem, ScopeCandidate, ScopeOrigin, SearchEnvelope, SearchMode,
};

/// Frozen result of one routed query. Built by [`OutcomeBuilder`].
#[derive(Clone, Debug)]
pub struct RoutingOutcome {
	request_id: Uuid,
	envelope: SearchEnvelope,
	selected_mode: SearchMode,
	executed_mode: SearchMode,
	mode_auto_selected: bool,
	mode_reason: String,
	output_format: OutputFormat,
	fallback_notes: Vec<String>,
	resolved_scope: Option<ScopeCandidate>,
	explicit_project_autocorrected: bool,
	docs_fallback: bool,
	interrupted: bool,
}
impl RoutingOutcome {
	pub fn request_id(&self) -> Uuid {
		self.request_id
	}

	pub fn envelope(&self) -> &SearchEnvelope {
		&self.envelope
	}

	/// Mode chosen before any fallback ran.
	pub fn selected_mode(&self) -> SearchMode {
		self.selected_mode
	}

	pub fn executed_mode(&self) -> SearchMode {
		self.executed_mode
	}

	pub fn mode_auto_selected(&self) -> bool {
		self.mode_auto_selected
	}

	pub fn mode_reason(&self) -> &str {
		&self.mode_reason
	}

	pub fn output_format(&self) -> OutputFormat {
		self.output_format
	}

	/// Provenance notes, in decision order.
	pub fn fallback_notes(&self) -> &[String] {
		&self.fallback_notes
	}

	pub fn resolved_scope(&self) -> Option<&ScopeCandidate> {
		self.resolved_scope.as_ref()
	}

	pub fn explicit_project_autocorrected(&self) -> bool {
		self.explicit_project_autocorrected
	}

	pub fn docs_fallback(&self) -> bool {
		self.docs_fallback
	}

	pub fn interrupted(&self) -> bool {
		self.interrupted
	}
}

/// Collects the pieces of an outcome as routing progresses.
///
/// Notes are grouped by source and emitted in a fixed order on `build`: mode selection, scope
/// corrections, fallback, scope iteration, then docs.
#[derive(Debug)]
pub struct OutcomeBuilder {
	selected_mode: SearchMode,
	executed_mode: SearchMode,
	mode_auto_selected: bool,
	mode_reason: String,
	output_format: OutputFormat,
	envelope: SearchEnvelope,
	resolved_scope: Option<ScopeCandidate>,
	explicit_project_autocorrected: bool,
	docs_fallback: bool,
	interrupted: bool,
	scope_notes: Vec<String>,
	fallback_notes: Vec<String>,
	iteration_notes: Vec<String>,
	docs_notes: Vec<String>,
}
impl OutcomeBuilder {
	pub fn new(
		mode: SearchMode,
		mode_auto_selected: bool,
		mode_reason: impl Into<String>,
		output_format: OutputFormat,
	) -> Self {
		Self {
			selected_mode: mode,
			executed_mode: mode,
			mode_auto_selected,
			mode_reason: mode_reason.into(),
			output_format,
			envelope: SearchEnvelope::empty(),
			resolved_scope: None,
			explicit_project_autocorrected: false,
			docs_fallback: false,
			interrupted: false,
			scope_notes: Vec::new(),
			fallback_notes: Vec::new(),
			iteration_notes: Vec::new(),
			docs_notes: Vec::new(),
		}
	}

	pub fn scope_corrections(mut self, notes: Vec<String>, autocorrected: bool) -> Self {
		self.scope_notes.extend(notes);
		self.explicit_project_autocorrected |= autocorrected;

		self
	}

	pub fn fallback(mut self, report: FallbackReport) -> Self {
		self.envelope = report.envelope;
		self.executed_mode = report.executed_mode;
		self.interrupted |= report.interrupted;
		self.fallback_notes.extend(report.notes);

		self
	}

	pub fn iteration(self, iteration: IterationReport) -> Self {
		let mut builder = self.fallback(iteration.report);

		builder.resolved_scope = Some(iteration.candidate);
		builder.iteration_notes.extend(iteration.notes);

		builder
	}

	pub fn team(mut self, report: TeamReport) -> Self {
		self.envelope = report.envelope;
		self.executed_mode = SearchMode::Team;
		self.iteration_notes.extend(report.notes);

		self
	}

	/// Replaces the envelope with documents when the docs lookup produced any.
	pub fn docs(mut self, report: DocsReport) -> Self {
		self.docs_notes.extend(report.notes);

		if let Some(candidate) = report.candidate {
			self.envelope = report.envelope;
			self.resolved_scope = Some(candidate);
			self.docs_fallback = true;
		}

		self
	}

	pub fn build(self) -> RoutingOutcome {
		let mut notes = Vec::with_capacity(
			1 + self.scope_notes.len()
				+ self.fallback_notes.len()
				+ self.iteration_notes.len()
				+ self.docs_notes.len(),
		);

		if self.mode_auto_selected {
			notes.push(format!(
				"Mode auto-selected: {} ({}).",
				self.selected_mode, self.mode_reason
			));
		}

		notes.extend(self.scope_notes);
		notes.extend(self.fallback_notes);
		notes.extend(self.iteration_notes);
		notes.extend(self.docs_notes);

		RoutingOutcome {
			request_id: Uuid::new_v4(),
			envelope: self.envelope,
			selected_mode: self.selected_mode,
			executed_mode: self.executed_mode,
			mode_auto_selected: self.mode_auto_selected,
			mode_reason: self.mode_reason,
			output_format: self.output_format,
			fallback_notes: notes,
			resolved_scope: self.resolved_scope,
			explicit_project_autocorrected: self.explicit_project_autocorrected,
			docs_fallback: self.docs_fallback,
			interrupted: self.interrupted,
		}
	}
}

/// Structured view of an outcome for JSON consumers.
#[derive(Clone, Debug, Serialize)]
pub struct RoutingPayload {
	pub request_id: Uuid,
	pub selected_mode: SearchMode,
	pub executed_mode: SearchMode,
	pub mode_auto_selected: bool,
	pub mode_reason: String,
	pub output_format: OutputFormat,
	pub resolved_workspace_id: Option<String>,
	pub resolved_project_id: Option<String>,
	pub resolution_rank: Option<u32>,
	pub resolution_origin: Option<ScopeOrigin>,
	pub explicit_project_autocorrected: bool,
	pub docs_fallback: bool,
	pub interrupted: bool,
	pub fallback_notes: Vec<String>,
	pub total: u64,
	pub results: Vec<ResultItem>,
}

pub fn payload(outcome: &RoutingOutcome) -> RoutingPayload {
	let scope = outcome.resolved_scope.as_ref();

	RoutingPayload {
		request_id: outcome.request_id,
		selected_mode: outcome.selected_mode,
		executed_mode: outcome.executed_mode,
		mode_auto_selected: outcome.mode_auto_selected,
		mode_reason: outcome.mode_reason.clone(),
		output_format: outcome.output_format,
		resolved_workspace_id: scope.and_then(|scope| scope.workspace_id.clone()),
		resolved_project_id: scope.and_then(|scope| scope.project_id.clone()),
		resolution_rank: scope.map(|scope| scope.rank),
		resolution_origin: scope.map(|scope| scope.origin),
		explicit_project_autocorrected: outcome.explicit_project_autocorrected,
		docs_fallback: outcome.docs_fallback,
		interrupted: outcome.interrupted,
		fallback_notes: outcome.fallback_notes.clone(),
		total: outcome.envelope.total,
		results: outcome.envelope.results.clone(),
	}
}

/// Human-readable listing followed by the provenance notes.
pub fn render_text(outcome: &RoutingOutcome) -> String {
	let envelope = &outcome.envelope;
	let mut out = String::new();

	match outcome.output_format {
		OutputFormat::Count => {
			let _ = writeln!(out, "{} results", envelope.total);
		},
		_ if envelope.is_empty() => out.push_str("No results found.\n"),
		OutputFormat::Paths => {
			for item in &envelope.results {
				let _ = writeln!(out, "{}", item.location);
			}
		},
		OutputFormat::Full | OutputFormat::Minimal => {
			for (index, item) in envelope.results.iter().enumerate() {
				let _ = writeln!(out, "{}. {}", index + 1, item_line(item));

				if outcome.output_format == OutputFormat::Full
					&& let Some(snippet) = item.snippet.as_deref()
				{
					for line in snippet.lines() {
						let _ = writeln!(out, "   {line}");
					}
				}
			}
		},
	}

	if !outcome.fallback_notes.is_empty() {
		out.push_str("\nNotes:\n");

		for note in &outcome.fallback_notes {
			let _ = writeln!(out, "- {note}");
		}
	}

	out
}

fn item_line(item: &ResultItem) -> String {
	let mut line = item.location.clone();

	if let Some(language) = item.language.as_deref() {
		let _ = write!(line, " [{language}]");
	}
	if let Some(score) = item.score {
		let _ = write!(line, " {:.0}%", score * 100.0);
	}

	line
}
