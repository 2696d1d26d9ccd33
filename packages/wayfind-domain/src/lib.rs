pub mod classify;
pub mod docs_intent;
pub mod envelope;
pub mod mode;
pub mod query;
pub mod scope;

pub use classify::{Classification, classify, infer_output_format, prefers_semantic};
pub use envelope::{Document, Project, ResultItem, SearchEnvelope, Workspace};
pub use mode::SearchMode;
pub use query::{OutputFormat, Query, SearchParams, SessionDefaults};
pub use scope::{ScopeCandidate, ScopeOrigin, ScopeRef};
