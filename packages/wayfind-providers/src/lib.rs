//! HTTP client for the remote search backend.
//!
//! Every response shape the backend has used is normalized here, so callers only ever see the
//! typed envelopes from `wayfind-domain`.

pub mod documents;
pub mod search;
pub mod workspaces;

mod error;

pub use error::{Error, Result};

use std::time::Duration;

use reqwest::{
	Response, Url,
	header::{AUTHORIZATION, HeaderMap, HeaderName},
};
use serde_json::{Map, Value};

use wayfind_config::ProviderConfig;

const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Clone, Debug)]
pub struct Client {
	http: reqwest::Client,
	api_base: Url,
}
impl Client {
	pub fn new(cfg: &ProviderConfig) -> Result<Self> {
		let api_base = Url::parse(&cfg.api_base).map_err(|err| Error::InvalidConfig {
			message: format!("provider.api_base is not a valid URL: {err}."),
		})?;

		if api_base.cannot_be_a_base() {
			return Err(Error::InvalidConfig {
				message: "provider.api_base cannot be used as a base URL.".to_string(),
			});
		}

		let http = reqwest::Client::builder()
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.default_headers(auth_headers(&cfg.api_key, &cfg.default_headers)?)
			.build()?;

		Ok(Self { http, api_base })
	}

	pub(crate) fn endpoint<I>(&self, segments: I) -> Url
	where
		I: IntoIterator,
		I::Item: AsRef<str>,
	{
		let mut url = self.api_base.clone();

		// `new` rejects cannot-be-a-base URLs, so the segments are always available.
		if let Ok(mut path) = url.path_segments_mut() {
			path.pop_if_empty().extend(segments);
		}

		url
	}

	pub(crate) async fn get_json(&self, url: Url, query: &[(&str, String)]) -> Result<Value> {
		let res = self.http.get(url).query(query).send().await.map_err(send_error)?;

		read_json(res).await
	}

	pub(crate) async fn post_json(&self, url: Url, body: &Value) -> Result<Value> {
		let res = self.http.post(url).json(body).send().await.map_err(send_error)?;

		read_json(res).await
	}
}

pub fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

/// Looks up the first array found at any of `keys`, checking a `data` object before the root.
pub(crate) fn find_array<'a>(json: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
	let data = json.get("data");

	for key in keys {
		if let Some(array) = data.and_then(|data| data.get(key)).and_then(Value::as_array) {
			return Some(array);
		}
		if let Some(array) = json.get(key).and_then(Value::as_array) {
			return Some(array);
		}
	}

	data.and_then(Value::as_array).or_else(|| json.as_array())
}

pub(crate) fn first_str<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a str> {
	keys.iter()
		.filter_map(|key| item.get(key))
		.find_map(|value| value.as_str().map(str::trim).filter(|value| !value.is_empty()))
}

fn send_error(err: reqwest::Error) -> Error {
	if err.is_timeout() {
		return Error::Timeout { message: err.to_string() };
	}

	Error::Reqwest(err)
}

async fn read_json(res: Response) -> Result<Value> {
	let status = res.status();

	if status.is_success() {
		return Ok(res.json().await?);
	}

	let body = res.text().await.unwrap_or_default();
	let message: String = body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();

	tracing::debug!(status = status.as_u16(), "Backend request failed.");

	Err(Error::from_status(status.as_u16(), message))
}
