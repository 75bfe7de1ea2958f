//! Deterministic test doubles: a keyword-mapped embedder, a ready-made
//! config, and record constructors for seeding the in-memory stores.

use grist_config::{
	Chunking, Config, EmbeddingProviderConfig, Providers, Search, Service,
};
use grist_storage::{Metric, Provenance, RegistryEntry};

/// Embeds by keyword lookup: the first table entry whose keyword occurs in
/// the lowercased text wins; unknown text gets a zero vector. Same input,
/// same vector, every time.
#[derive(Debug, Clone)]
pub struct StaticEmbedder {
	dimensions: usize,
	table: Vec<(String, Vec<f32>)>,
}
impl StaticEmbedder {
	pub fn new(dimensions: usize) -> Self {
		Self { dimensions, table: Vec::new() }
	}

	pub fn with_mapping(mut self, keyword: &str, vector: Vec<f32>) -> Self {
		self.table.push((keyword.to_lowercase(), vector));

		self
	}

	pub fn vector_for(&self, text: &str) -> Vec<f32> {
		let lowered = text.to_lowercase();

		for (keyword, vector) in &self.table {
			if lowered.contains(keyword) {
				return vector.clone();
			}
		}

		vec![0.0; self.dimensions]
	}

	pub fn embed_all(&self, texts: &[String]) -> Vec<Vec<f32>> {
		texts.iter().map(|text| self.vector_for(text)).collect()
	}
}

/// Config with an inert embedding provider and library defaults everywhere
/// else. Tests never reach the network; the provider section only has to
/// pass construction-time validation.
pub fn test_config() -> Config {
	Config {
		service: Service { log_level: "debug".to_string() },
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:0".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "test-embedding".to_string(),
				dimensions: 4,
				timeout_ms: 1_000,
				default_headers: serde_json::Map::new(),
			},
			query: None,
		},
		search: Search::default(),
		chunking: Chunking::default(),
	}
}

pub fn registry_entry(key: &str, embedding: Option<Vec<f32>>) -> RegistryEntry {
	RegistryEntry {
		key: key.to_string(),
		canonical_name: key.replace('.', " "),
		description: Some(format!("Canonical field {key}.")),
		value_type: "number".to_string(),
		unit: None,
		query_capability: None,
		embedding,
	}
}

pub fn metric(id: i64, research_run_id: i64, key: &str, value_numeric: Option<f64>) -> Metric {
	Metric {
		id,
		research_run_id,
		key: key.to_string(),
		value_numeric,
		range_min: None,
		range_max: None,
		value_text: None,
		value_json: None,
		unit: None,
		confidence: Some(0.8),
		embedding: None,
	}
}

pub fn provenance(metric_id: i64, chunk_uid: &str, quote: Option<&str>) -> Provenance {
	Provenance {
		metric_id,
		chunk_uid: chunk_uid.to_string(),
		quote: quote.map(str::to_string),
		confidence: Some(0.9),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn embedder_is_deterministic() {
		let embedder = StaticEmbedder::new(3).with_mapping("payback", vec![1.0, 0.0, 0.0]);

		assert_eq!(embedder.vector_for("Payback period"), vec![1.0, 0.0, 0.0]);
		assert_eq!(embedder.vector_for("unrelated"), vec![0.0, 0.0, 0.0]);
		assert_eq!(embedder.vector_for("Payback period"), embedder.vector_for("payback period"));
	}

	#[test]
	fn config_passes_validation() {
		assert!(grist_config::validate(&test_config()).is_ok());
	}
}
