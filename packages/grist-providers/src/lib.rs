pub mod embedding;
pub mod query;

use color_eyre::{Result, eyre};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName};
use serde_json::{Map, Value};

/// Bearer-auth header map extended with the configured defaults. Header
/// values must be JSON strings.
pub fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::with_capacity(default_headers.len() + 1);

	headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);

	for (name, value) in default_headers {
		let Value::String(raw) = value else {
			return Err(eyre::eyre!("Header {name} must be a string."));
		};

		headers.insert(HeaderName::from_bytes(name.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn auth_headers_reject_non_string_values() {
		let mut extra = Map::new();

		extra.insert("x-count".to_string(), Value::from(3));

		assert!(auth_headers("key", &extra).is_err());
	}

	#[test]
	fn auth_headers_carry_the_bearer_token() {
		let headers = auth_headers("key", &Map::new()).expect("headers");

		assert_eq!(headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()), Some("Bearer key"));
	}
}
