mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Docs, ProviderConfig, Routing, Service, Session, Stores, Team};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}

	let api_base = cfg.provider.api_base.trim();

	if api_base.is_empty() {
		return Err(Error::Validation {
			message: "provider.api_base must be non-empty.".to_string(),
		});
	}
	if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
		return Err(Error::Validation {
			message: "provider.api_base must start with http:// or https://.".to_string(),
		});
	}
	if cfg.provider.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "provider.api_key must be non-empty.".to_string(),
		});
	}
	if cfg.provider.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "provider.timeout_ms must be greater than zero.".to_string(),
		});
	}

	for (key, value) in &cfg.provider.default_headers {
		if !value.is_string() {
			return Err(Error::Validation {
				message: format!("provider.default_headers.{key} must be a string."),
			});
		}
	}

	for (label, value) in [
		("routing.low_confidence_score", cfg.routing.low_confidence_score),
		("routing.semantic_improvement_margin", cfg.routing.semantic_improvement_margin),
	] {
		if !value.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if !(0.0..=1.0).contains(&value) {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 0.0-1.0."),
			});
		}
	}

	if cfg.routing.default_limit == 0 {
		return Err(Error::Validation {
			message: "routing.default_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.routing.content_max_chars == 0 {
		return Err(Error::Validation {
			message: "routing.content_max_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.routing.request_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "routing.request_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.team.max_workspaces == 0 || cfg.team.max_workspaces > 10 {
		return Err(Error::Validation {
			message: "team.max_workspaces must be in the range 1-10.".to_string(),
		});
	}
	if cfg.team.call_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "team.call_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.docs.max_documents == 0 || cfg.docs.max_documents > 50 {
		return Err(Error::Validation {
			message: "docs.max_documents must be in the range 1-50.".to_string(),
		});
	}
	if cfg.stores.index_max_age_days == 0 {
		return Err(Error::Validation {
			message: "stores.index_max_age_days must be greater than zero.".to_string(),
		});
	}

	if let Some(session) = cfg.session.as_ref()
		&& session.project_id.is_some()
		&& session.workspace_id.is_none()
	{
		return Err(Error::Validation {
			message: "session.workspace_id is required when session.project_id is set."
				.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let trimmed = cfg.provider.api_base.trim().trim_end_matches('/').to_string();

	cfg.provider.api_base = trimmed;

	if let Some(session) = cfg.session.as_mut() {
		if session.workspace_id.as_deref().map(|id| id.trim().is_empty()).unwrap_or(false) {
			session.workspace_id = None;
		}
		if session.project_id.as_deref().map(|id| id.trim().is_empty()).unwrap_or(false) {
			session.project_id = None;
		}
	}
	if cfg
		.stores
		.folder_mappings_path
		.as_deref()
		.map(|path| path.as_os_str().is_empty())
		.unwrap_or(false)
	{
		cfg.stores.folder_mappings_path = None;
	}
	if cfg
		.stores
		.index_status_path
		.as_deref()
		.map(|path| path.as_os_str().is_empty())
		.unwrap_or(false)
	{
		cfg.stores.index_status_path = None;
	}
}
