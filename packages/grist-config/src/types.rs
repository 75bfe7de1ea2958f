use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub chunking: Chunking,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	/// Optional LLM query-understanding collaborator. Absent means the raw
	/// query text is used unchanged.
	pub query: Option<LlmProviderConfig>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	pub vector_weight: f32,
	pub bm25_weight: f32,
	pub bm25_k1: f32,
	pub bm25_b: f32,
	pub grounding_top_k: usize,
	pub primary_limit: usize,
	pub background_limit: usize,
	pub default_top_k: usize,
	pub corpus_sample_limit: usize,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			vector_weight: 0.7,
			bm25_weight: 0.3,
			bm25_k1: 1.5,
			bm25_b: 0.75,
			grounding_top_k: 10,
			primary_limit: 8,
			background_limit: 2,
			default_top_k: 30,
			corpus_sample_limit: 1_000,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Chunking {
	pub chunk_version: String,
	pub min_paragraph_chars: usize,
	pub dedup_prefix_chars: usize,
	pub max_inferred_focus: usize,
}
impl Default for Chunking {
	fn default() -> Self {
		Self {
			chunk_version: "v1".to_string(),
			min_paragraph_chars: 50,
			dedup_prefix_chars: 50,
			max_inferred_focus: 2,
		}
	}
}
