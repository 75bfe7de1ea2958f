use std::{future::Future, pin::Pin};

use grist_domain::ChunkType;

use crate::{
	Result,
	models::{Metric, Provenance, RegistryEntry, ResearchChunk},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Filter for chunk reads. Every clause is optional; an empty filter
/// returns the whole corpus in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ChunkFilter {
	pub chunk_version: Option<String>,
	/// Keep only these types.
	pub include_types: Option<Vec<ChunkType>>,
	/// Drop this type. Applied after `include_types`.
	pub exclude_type: Option<ChunkType>,
	pub require_embedding: bool,
	pub research_run_id: Option<i64>,
	pub limit: Option<usize>,
}

/// Read-only view of the canonical field registry.
pub trait RegistryStore
where
	Self: Send + Sync,
{
	/// All entries in registration order. The order is the stable
	/// tie-break for grounding scores.
	fn entries(&self) -> BoxFuture<'_, Result<Vec<RegistryEntry>>>;
}

/// Append-only chunk persistence with filtered reads.
pub trait ChunkStore
where
	Self: Send + Sync,
{
	fn append<'a>(&'a self, chunks: &'a [ResearchChunk]) -> BoxFuture<'a, Result<()>>;

	fn list<'a>(&'a self, filter: &'a ChunkFilter) -> BoxFuture<'a, Result<Vec<ResearchChunk>>>;

	/// Distinct chunk versions present in the store.
	fn versions(&self) -> BoxFuture<'_, Result<Vec<String>>>;

	/// Up to `limit` chunk contents for corpus statistics.
	fn sample_contents(&self, limit: usize) -> BoxFuture<'_, Result<Vec<String>>>;
}

/// Read-only metric and provenance lookups.
pub trait MetricStore
where
	Self: Send + Sync,
{
	fn metrics_by_ids<'a>(&'a self, ids: &'a [i64]) -> BoxFuture<'a, Result<Vec<Metric>>>;

	fn all_metrics(&self) -> BoxFuture<'_, Result<Vec<Metric>>>;

	fn provenance_by_chunk_uids<'a>(
		&'a self,
		chunk_uids: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Provenance>>>;
}
