use grist_domain::{ChunkType, ValidationFailure};

/// Where a chunk's content came from: an extraction provenance item or the
/// raw report text supplement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
	Provenance,
	RawText,
}

/// A research judgment atom. Append-only once persisted; the only mutation
/// ever applied is the validation-phase downgrade before the append.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResearchChunk {
	pub research_run_id: i64,
	/// Run-scoped stable identifier, e.g. `run_12_prov_0003` or
	/// `run_12_prov_0003_t1` for a trigger split.
	pub chunk_uid: String,
	pub content: String,
	pub chunk_type: ChunkType,
	/// Ordered registry keys this chunk evidences. May be empty.
	pub metric_focus: Vec<String>,
	pub section: Option<String>,
	pub subsection: Option<String>,
	pub chunk_version: String,
	pub source_kind: SourceKind,
	/// Set when validation downgraded the chunk to background context.
	pub downgrade_reason: Option<ValidationFailure>,
	pub embedding: Option<Vec<f32>>,
}

/// Canonical field definition. Owned by an external registration process;
/// read-only from this engine's perspective.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RegistryEntry {
	pub key: String,
	pub canonical_name: String,
	pub description: Option<String>,
	pub value_type: String,
	pub unit: Option<String>,
	pub query_capability: Option<String>,
	pub embedding: Option<Vec<f32>>,
}

/// Structured fact derived from a research run. Read-only here.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Metric {
	pub id: i64,
	pub research_run_id: i64,
	pub key: String,
	pub value_numeric: Option<f64>,
	pub range_min: Option<f64>,
	pub range_max: Option<f64>,
	pub value_text: Option<String>,
	pub value_json: Option<serde_json::Value>,
	pub unit: Option<String>,
	pub confidence: Option<f32>,
	pub embedding: Option<Vec<f32>>,
}

/// Binds a metric to the chunk and quote that evidence it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Provenance {
	pub metric_id: i64,
	pub chunk_uid: String,
	pub quote: Option<String>,
	pub confidence: Option<f32>,
}
