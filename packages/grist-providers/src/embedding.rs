use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

use grist_config::EmbeddingProviderConfig;

// Keeps a run's worth of chunk contents inside typical provider request
// limits; the atomizer can emit far more chunks than one call should carry.
const MAX_BATCH: usize = 128;

/// Embeds `texts` in input order, batching as needed. Every returned vector
/// is validated against the configured dimensionality.
pub async fn embed(cfg: &EmbeddingProviderConfig, texts: &[String]) -> Result<Vec<Vec<f32>>> {
	if texts.is_empty() {
		return Ok(Vec::new());
	}

	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let headers = crate::auth_headers(&cfg.api_key, &cfg.default_headers)?;
	let mut vectors = Vec::with_capacity(texts.len());

	for batch in texts.chunks(MAX_BATCH) {
		let body = serde_json::json!({
			"model": cfg.model,
			"input": batch,
			"dimensions": cfg.dimensions,
		});
		let res = client.post(&url).headers(headers.clone()).json(&body).send().await?;
		let json: Value = res.error_for_status()?.json().await?;

		vectors.extend(parse_vectors(json, batch.len(), cfg.dimensions)?);
	}

	Ok(vectors)
}

fn parse_vectors(json: Value, expected: usize, dimensions: u32) -> Result<Vec<Vec<f32>>> {
	let Some(data) = json.get("data").and_then(Value::as_array) else {
		return Err(eyre::eyre!("Embedding response has no data array."));
	};

	if data.len() != expected {
		return Err(eyre::eyre!(
			"Embedding response carries {} vectors for {expected} inputs.",
			data.len()
		));
	}

	let mut indexed = Vec::with_capacity(data.len());

	for (position, item) in data.iter().enumerate() {
		let index =
			item.get("index").and_then(Value::as_u64).map(|v| v as usize).unwrap_or(position);
		let Some(values) = item.get("embedding").and_then(Value::as_array) else {
			return Err(eyre::eyre!("Embedding item {index} has no embedding array."));
		};
		let vector = values
			.iter()
			.map(|value| value.as_f64().map(|n| n as f32))
			.collect::<Option<Vec<f32>>>()
			.ok_or_else(|| eyre::eyre!("Embedding item {index} holds a non-numeric value."))?;

		if vector.len() != dimensions as usize {
			return Err(eyre::eyre!(
				"Embedding item {index} has {} dimensions, expected {dimensions}.",
				vector.len()
			));
		}

		indexed.push((index, vector));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vector)| vector).collect())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_vectors_in_index_order() {
		let json = serde_json::json!({
			"data": [
				{ "index": 1, "embedding": [2.0, 3.0] },
				{ "index": 0, "embedding": [0.5, 1.5] }
			]
		});
		let parsed = parse_vectors(json, 2, 2).expect("parse failed");

		assert_eq!(parsed, vec![vec![0.5, 1.5], vec![2.0, 3.0]]);
	}

	#[test]
	fn rejects_a_count_mismatch() {
		let json = serde_json::json!({
			"data": [{ "index": 0, "embedding": [0.5, 1.5] }]
		});

		assert!(parse_vectors(json, 2, 2).is_err());
	}

	#[test]
	fn rejects_a_dimension_mismatch() {
		let json = serde_json::json!({
			"data": [{ "index": 0, "embedding": [0.5, 1.5, 2.5] }]
		});

		assert!(parse_vectors(json, 1, 2).is_err());
	}
}
