pub mod error;
pub mod search;
pub mod split;

use std::{
	future::Future,
	pin::Pin,
	sync::{Arc, OnceLock},
};

pub use error::{ServiceError, ServiceResult};
use grist_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use grist_providers::{embedding, query};
pub use grist_providers::query::{FieldHint, QueryFilters, QueryUnderstanding};
use grist_storage::{ChunkStore, MetricStore, RegistryStore};
pub use search::{Diagnostics, ResultItem, SearchRequest, SearchResponse};
pub use split::SplitRequest;

use crate::search::corpus::CorpusStats;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

pub trait QueryProvider
where
	Self: Send + Sync,
{
	fn understand<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		query: &'a str,
		hints: &'a [FieldHint],
	) -> BoxFuture<'a, color_eyre::Result<QueryUnderstanding>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub query: Arc<dyn QueryProvider>,
}

/// Facade over the atomizer and the retrieval pipeline. Holds the backing
/// stores behind capability traits and caches corpus statistics plus the
/// detected chunk version for the lifetime of the instance.
pub struct GristService {
	pub cfg: Config,
	pub registry: Arc<dyn RegistryStore>,
	pub chunks: Arc<dyn ChunkStore>,
	pub metrics: Arc<dyn MetricStore>,
	pub providers: Providers,
	corpus: OnceLock<CorpusStats>,
	chunk_version: OnceLock<String>,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl QueryProvider for DefaultProviders {
	fn understand<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		query: &'a str,
		hints: &'a [FieldHint],
	) -> BoxFuture<'a, color_eyre::Result<QueryUnderstanding>> {
		Box::pin(query::understand(cfg, query, hints))
	}
}

impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, query: Arc<dyn QueryProvider>) -> Self {
		Self { embedding, query }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);
		Self { embedding: provider.clone(), query: provider }
	}
}

impl GristService {
	pub fn new(
		cfg: Config,
		registry: Arc<dyn RegistryStore>,
		chunks: Arc<dyn ChunkStore>,
		metrics: Arc<dyn MetricStore>,
	) -> ServiceResult<Self> {
		Self::with_providers(cfg, registry, chunks, metrics, Providers::default())
	}

	pub fn with_providers(
		cfg: Config,
		registry: Arc<dyn RegistryStore>,
		chunks: Arc<dyn ChunkStore>,
		metrics: Arc<dyn MetricStore>,
		providers: Providers,
	) -> ServiceResult<Self> {
		// Missing provider configuration is the one unrecoverable condition;
		// surface it at construction, not mid-query.
		if cfg.providers.embedding.api_key.trim().is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "Embedding provider api_key is empty.".to_string(),
			});
		}
		if cfg.providers.embedding.dimensions == 0 {
			return Err(ServiceError::InvalidRequest {
				message: "Embedding provider dimensions must be positive.".to_string(),
			});
		}

		Ok(Self {
			cfg,
			registry,
			chunks,
			metrics,
			providers,
			corpus: OnceLock::new(),
			chunk_version: OnceLock::new(),
		})
	}

	/// Corpus statistics over a bounded sample of chunk contents. Computed
	/// once per instance; racing initializers build structurally identical
	/// snapshots, so last-writer-wins is safe.
	pub(crate) async fn corpus_stats(&self) -> &CorpusStats {
		if let Some(stats) = self.corpus.get() {
			return stats;
		}

		let contents = match self.chunks.sample_contents(self.cfg.search.corpus_sample_limit).await
		{
			Ok(contents) => contents,
			Err(err) => {
				tracing::warn!(error = %err, "Corpus sampling failed; using empty statistics.");

				Vec::new()
			},
		};

		self.corpus.get_or_init(|| CorpusStats::build(&contents))
	}

	/// Active chunk version: the highest version present in the store,
	/// ranked by (leading numeric component, lexicographic), cached once.
	/// Falls back to the configured version on an empty store.
	pub(crate) async fn active_chunk_version(&self) -> &str {
		if let Some(version) = self.chunk_version.get() {
			return version;
		}

		let detected = match self.chunks.versions().await {
			Ok(versions) => versions
				.into_iter()
				.max_by(|a, b| version_rank(a).total_cmp(&version_rank(b)).then_with(|| a.cmp(b))),
			Err(err) => {
				tracing::warn!(error = %err, "Chunk version listing failed; using the configured version.");

				None
			},
		};
		let version = detected.unwrap_or_else(|| self.cfg.chunking.chunk_version.clone());

		self.chunk_version.get_or_init(|| version)
	}
}

/// Leading numeric component of a version string, as a float: `v1.2` ranks
/// as 1.2, below `v2` and above `v1`. Versions with no parseable number
/// rank lowest.
fn version_rank(version: &str) -> f64 {
	let Some(start) = version.find(|c: char| c.is_ascii_digit()) else {
		return 0.0;
	};
	let tail = &version[start..];
	let end = tail.find(|c: char| !c.is_ascii_digit() && c != '.').unwrap_or(tail.len());

	tail[..end].parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn version_rank_parses_the_leading_number() {
		assert!(version_rank("v10") > version_rank("v2"));
		assert!(version_rank("v1.2") < version_rank("v2"));
		assert!(version_rank("v1.2") > version_rank("v1"));
		assert_eq!(version_rank("draft"), 0.0);
	}
}
