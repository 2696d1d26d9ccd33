pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Team search requires a team-tier entitlement.")]
	NotEntitled,
	#[error("Provider timed out: {message}")]
	ProviderTimeout { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Authentication failed: {message}")]
	Auth { message: String },
	#[error("No valid scope: {message}")]
	NoValidScope { message: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
}
impl Error {
	/// Recoverable errors are turned into provenance notes and the next scope or workspace is
	/// tried. Everything else is surfaced to the caller.
	pub fn is_recoverable(&self) -> bool {
		matches!(self, Self::NotFound { .. } | Self::ProviderTimeout { .. } | Self::Provider { .. })
	}
}

impl From<wayfind_providers::Error> for Error {
	fn from(err: wayfind_providers::Error) -> Self {
		use wayfind_providers::Error as ProviderError;

		if err.is_timeout() {
			return Self::ProviderTimeout { message: err.to_string() };
		}

		match err {
			ProviderError::NotFound { message } => Self::NotFound { message },
			ProviderError::Unauthorized { message } => Self::Auth { message },
			ProviderError::InvalidRequest { message } => Self::InvalidRequest { message },
			other => Self::Provider { message: other.to_string() },
		}
	}
}
