pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("{message}")]
	InvalidRequest { message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Unauthorized: {message}")]
	Unauthorized { message: String },
	#[error("Request timed out: {message}")]
	Timeout { message: String },
	#[error("Backend returned status {status}: {message}")]
	Status { status: u16, message: String },
}
impl Error {
	pub fn is_timeout(&self) -> bool {
		match self {
			Self::Timeout { .. } => true,
			Self::Reqwest(err) => err.is_timeout(),
			_ => false,
		}
	}

	pub fn from_status(status: u16, message: String) -> Self {
		match status {
			401 | 403 => Self::Unauthorized { message },
			404 => Self::NotFound { message },
			408 | 504 => Self::Timeout { message },
			_ => Self::Status { status, message },
		}
	}
}
