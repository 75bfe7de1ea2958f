//! LLM query-understanding collaborator.
//!
//! Rewrites a free-text question into a semantic query plus suggested
//! registry keys and numeric filters. Callers treat any failure here as
//! "use the original query unchanged".

use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FieldHint {
	pub key: String,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub example: Option<String>,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct QueryFilters {
	#[serde(default)]
	pub min: Option<f64>,
	#[serde(default)]
	pub max: Option<f64>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct QueryUnderstanding {
	#[serde(default)]
	pub semantic_query_text: String,
	#[serde(default)]
	pub matched_field_keys: Vec<String>,
	#[serde(default)]
	pub filters: QueryFilters,
}
impl QueryUnderstanding {
	/// Identity fallback: the raw query, no suggested keys, no filters.
	pub fn identity(query: &str) -> Self {
		Self {
			semantic_query_text: query.to_string(),
			matched_field_keys: Vec::new(),
			filters: QueryFilters::default(),
		}
	}
}

const MAX_PROMPT_HINTS: usize = 10;

pub async fn understand(
	cfg: &grist_config::LlmProviderConfig,
	query: &str,
	hints: &[FieldHint],
) -> Result<QueryUnderstanding> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let messages = serde_json::json!([
		{
			"role": "system",
			"content": "You are a query understanding assistant for a research evidence base."
		},
		{ "role": "user", "content": build_prompt(query, hints) }
	]);

	for _ in 0..3 {
		let body = serde_json::json!({
			"model": cfg.model,
			"temperature": cfg.temperature,
			"messages": messages,
			"response_format": { "type": "json_object" },
		});
		let res = client
			.post(&url)
			.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
			.json(&body)
			.send()
			.await?;
		let json: Value = res.error_for_status()?.json().await?;
		if let Ok(parsed) = parse_understanding(json, query) {
			return Ok(parsed);
		}
	}

	Err(eyre::eyre!("Query understanding response is not valid JSON."))
}

fn build_prompt(query: &str, hints: &[FieldHint]) -> String {
	let mut fields_context = String::new();

	if !hints.is_empty() {
		fields_context.push_str("\n## Available Fields\n\n");

		for hint in hints.iter().take(MAX_PROMPT_HINTS) {
			fields_context.push_str(&format!(
				"- **{}**: {}",
				hint.key,
				hint.description.as_deref().unwrap_or("")
			));

			if let Some(example) = hint.example.as_deref() {
				fields_context.push_str(&format!(" (e.g. {example})"));
			}

			fields_context.push('\n');
		}
	}

	format!(
		r#"You are analyzing a user query for a research evidence search system.
{fields_context}
## User Query
"{query}"

## Your Task
Return a JSON object with:

1. **semantic_query_text**: the query rewritten as keywords optimized for semantic search
2. **matched_field_keys**: field keys from Available Fields matching the query intent (empty list if none)
3. **filters**: any numeric bounds mentioned in the query, as {{"min": ..., "max": ...}}

Return ONLY the JSON object."#
	)
}

fn parse_understanding(json: Value, query: &str) -> Result<QueryUnderstanding> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| eyre::eyre!("Query understanding response is missing content."))?;
	let mut parsed: QueryUnderstanding = serde_json::from_str(content)
		.map_err(|_| eyre::eyre!("Query understanding content is not valid JSON."))?;

	if parsed.semantic_query_text.trim().is_empty() {
		parsed.semantic_query_text = query.to_string();
	}

	Ok(parsed)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_choice_content() {
		let json = serde_json::json!({
			"choices": [
				{
					"message": {
						"content": "{\"semantic_query_text\": \"payback period months\", \"matched_field_keys\": [\"financial.payback_months.base\"], \"filters\": {\"max\": 20000}}"
					}
				}
			]
		});
		let parsed = parse_understanding(json, "original").expect("parse failed");

		assert_eq!(parsed.semantic_query_text, "payback period months");
		assert_eq!(parsed.matched_field_keys, vec!["financial.payback_months.base"]);
		assert_eq!(parsed.filters.max, Some(20_000.0));
	}

	#[test]
	fn blank_rewrite_falls_back_to_query() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "content": "{\"semantic_query_text\": \"  \"}" } }
			]
		});
		let parsed = parse_understanding(json, "original").expect("parse failed");

		assert_eq!(parsed.semantic_query_text, "original");
	}

	#[test]
	fn prompt_caps_field_hints() {
		let hints: Vec<FieldHint> = (0..15)
			.map(|i| FieldHint {
				key: format!("financial.field_{i}"),
				description: Some("desc".to_string()),
				example: None,
			})
			.collect();
		let prompt = build_prompt("q", &hints);

		assert!(prompt.contains("financial.field_9"));
		assert!(!prompt.contains("financial.field_10"));
	}
}
