use grist_chunking::{AtomizerConfig, EvidenceItem};
use grist_storage::ResearchChunk;

use crate::{GristService, ServiceResult};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SplitRequest {
	pub research_run_id: i64,
	#[serde(default)]
	pub raw_report_text: String,
	#[serde(default)]
	pub evidence: Vec<EvidenceItem>,
}

impl GristService {
	/// Atomizes a research run's evidence, embeds the resulting chunks, and
	/// appends them to the chunk store. An embedding failure persists the
	/// chunks without vectors rather than failing the run.
	pub async fn split(&self, req: SplitRequest) -> ServiceResult<Vec<ResearchChunk>> {
		let entries = self.registry.entries().await?;
		let registry_keys: Vec<String> = entries.into_iter().map(|entry| entry.key).collect();
		let atomizer_cfg = AtomizerConfig {
			chunk_version: self.cfg.chunking.chunk_version.clone(),
			min_paragraph_chars: self.cfg.chunking.min_paragraph_chars,
			dedup_prefix_chars: self.cfg.chunking.dedup_prefix_chars,
			max_inferred_focus: self.cfg.chunking.max_inferred_focus,
		};
		let mut chunks = grist_chunking::split(
			&atomizer_cfg,
			req.research_run_id,
			&req.raw_report_text,
			&req.evidence,
			&registry_keys,
		);

		if !chunks.is_empty() {
			let contents: Vec<String> = chunks.iter().map(|chunk| chunk.content.clone()).collect();

			match self.providers.embedding.embed(&self.cfg.providers.embedding, &contents).await {
				Ok(vectors) if vectors.len() == chunks.len() => {
					for (chunk, vector) in chunks.iter_mut().zip(vectors) {
						chunk.embedding = Some(vector);
					}
				},
				Ok(vectors) => {
					tracing::warn!(
						expected = chunks.len(),
						received = vectors.len(),
						"Embedding count mismatch; persisting chunks without vectors."
					);
				},
				Err(err) => {
					tracing::warn!(
						error = %err,
						"Chunk embedding failed; persisting chunks without vectors."
					);
				},
			}
		}

		self.chunks.append(&chunks).await?;

		Ok(chunks)
	}
}
