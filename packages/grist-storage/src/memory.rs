//! In-memory reference backend.
//!
//! Preserves insertion order everywhere, which makes it the determinism
//! baseline for the atomizer and the retrieval pipeline tests. A real
//! deployment substitutes a database-backed implementation of the same
//! traits.

use std::sync::Mutex;

use crate::{
	Result,
	models::{Metric, Provenance, RegistryEntry, ResearchChunk},
	store::{BoxFuture, ChunkFilter, ChunkStore, MetricStore, RegistryStore},
};

#[derive(Debug, Default)]
struct Inner {
	registry: Vec<RegistryEntry>,
	chunks: Vec<ResearchChunk>,
	metrics: Vec<Metric>,
	provenance: Vec<Provenance>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
	inner: Mutex<Inner>,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn seed_registry(&self, entries: Vec<RegistryEntry>) {
		self.lock().registry.extend(entries);
	}

	pub fn seed_chunks(&self, chunks: Vec<ResearchChunk>) {
		self.lock().chunks.extend(chunks);
	}

	pub fn seed_metrics(&self, metrics: Vec<Metric>) {
		self.lock().metrics.extend(metrics);
	}

	pub fn seed_provenance(&self, provenance: Vec<Provenance>) {
		self.lock().provenance.extend(provenance);
	}

	pub fn chunk_count(&self) -> usize {
		self.lock().chunks.len()
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
		self.inner.lock().unwrap_or_else(|err| err.into_inner())
	}
}

fn matches_filter(chunk: &ResearchChunk, filter: &ChunkFilter) -> bool {
	if let Some(version) = filter.chunk_version.as_ref()
		&& &chunk.chunk_version != version
	{
		return false;
	}
	if let Some(types) = filter.include_types.as_ref()
		&& !types.contains(&chunk.chunk_type)
	{
		return false;
	}
	if let Some(excluded) = filter.exclude_type
		&& chunk.chunk_type == excluded
	{
		return false;
	}
	if filter.require_embedding && chunk.embedding.is_none() {
		return false;
	}
	if let Some(run_id) = filter.research_run_id
		&& chunk.research_run_id != run_id
	{
		return false;
	}

	true
}

impl RegistryStore for MemoryStore {
	fn entries(&self) -> BoxFuture<'_, Result<Vec<RegistryEntry>>> {
		let entries = self.lock().registry.clone();

		Box::pin(async move { Ok(entries) })
	}
}

impl ChunkStore for MemoryStore {
	fn append<'a>(&'a self, chunks: &'a [ResearchChunk]) -> BoxFuture<'a, Result<()>> {
		self.lock().chunks.extend_from_slice(chunks);

		Box::pin(async { Ok(()) })
	}

	fn list<'a>(&'a self, filter: &'a ChunkFilter) -> BoxFuture<'a, Result<Vec<ResearchChunk>>> {
		let mut matched: Vec<ResearchChunk> =
			self.lock().chunks.iter().filter(|chunk| matches_filter(chunk, filter)).cloned().collect();

		if let Some(limit) = filter.limit {
			matched.truncate(limit);
		}

		Box::pin(async move { Ok(matched) })
	}

	fn versions(&self) -> BoxFuture<'_, Result<Vec<String>>> {
		let mut versions: Vec<String> = Vec::new();

		for chunk in &self.lock().chunks {
			if !versions.contains(&chunk.chunk_version) {
				versions.push(chunk.chunk_version.clone());
			}
		}

		Box::pin(async move { Ok(versions) })
	}

	fn sample_contents(&self, limit: usize) -> BoxFuture<'_, Result<Vec<String>>> {
		let contents: Vec<String> = self
			.lock()
			.chunks
			.iter()
			.map(|chunk| chunk.content.clone())
			.filter(|content| !content.is_empty())
			.take(limit)
			.collect();

		Box::pin(async move { Ok(contents) })
	}
}

impl MetricStore for MemoryStore {
	fn metrics_by_ids<'a>(&'a self, ids: &'a [i64]) -> BoxFuture<'a, Result<Vec<Metric>>> {
		let metrics: Vec<Metric> =
			self.lock().metrics.iter().filter(|metric| ids.contains(&metric.id)).cloned().collect();

		Box::pin(async move { Ok(metrics) })
	}

	fn all_metrics(&self) -> BoxFuture<'_, Result<Vec<Metric>>> {
		let metrics = self.lock().metrics.clone();

		Box::pin(async move { Ok(metrics) })
	}

	fn provenance_by_chunk_uids<'a>(
		&'a self,
		chunk_uids: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Provenance>>> {
		let rows: Vec<Provenance> = self
			.lock()
			.provenance
			.iter()
			.filter(|row| chunk_uids.contains(&row.chunk_uid))
			.cloned()
			.collect();

		Box::pin(async move { Ok(rows) })
	}
}

#[cfg(test)]
mod tests {
	use grist_domain::ChunkType;

	use super::*;
	use crate::models::SourceKind;

	fn chunk(uid: &str, chunk_type: ChunkType, version: &str, embedded: bool) -> ResearchChunk {
		ResearchChunk {
			research_run_id: 1,
			chunk_uid: uid.to_string(),
			content: format!("content of {uid}"),
			chunk_type,
			metric_focus: Vec::new(),
			section: None,
			subsection: None,
			chunk_version: version.to_string(),
			source_kind: SourceKind::Provenance,
			downgrade_reason: None,
			embedding: embedded.then(|| vec![1.0, 0.0]),
		}
	}

	#[tokio::test]
	async fn filters_by_version_type_and_embedding() {
		let store = MemoryStore::new();

		store.seed_chunks(vec![
			chunk("a", ChunkType::NumericEstimate, "v1", true),
			chunk("b", ChunkType::BackgroundContext, "v1", true),
			chunk("c", ChunkType::NumericEstimate, "v0", true),
			chunk("d", ChunkType::NumericEstimate, "v1", false),
		]);

		let filter = ChunkFilter {
			chunk_version: Some("v1".to_string()),
			include_types: Some(vec![ChunkType::NumericEstimate]),
			require_embedding: true,
			..Default::default()
		};
		let matched = store.list(&filter).await.unwrap();

		assert_eq!(matched.len(), 1);
		assert_eq!(matched[0].chunk_uid, "a");

		let filter = ChunkFilter {
			exclude_type: Some(ChunkType::BackgroundContext),
			..Default::default()
		};

		assert_eq!(store.list(&filter).await.unwrap().len(), 3);
	}

	#[tokio::test]
	async fn versions_preserve_first_seen_order() {
		let store = MemoryStore::new();

		store.seed_chunks(vec![
			chunk("a", ChunkType::Reasoning, "v1", false),
			chunk("b", ChunkType::Reasoning, "v0", false),
			chunk("c", ChunkType::Reasoning, "v1", false),
		]);

		assert_eq!(store.versions().await.unwrap(), vec!["v1", "v0"]);
	}
}
