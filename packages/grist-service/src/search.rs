//! Hybrid retrieval pipeline: intent classification, registry grounding,
//! staged chunk retrieval with filter relaxation, vector+BM25 scoring,
//! metric correlation, bucketed ordering, and a metric-level fallback.

pub mod corpus;
pub mod scoring;

use std::{cmp::Ordering, collections::HashMap};

use grist_domain::{ChunkType, QueryIntent, classify_intent};
use grist_storage::{ChunkFilter, Metric, RegistryEntry, ResearchChunk};

use crate::{
	FieldHint, GristService, QueryUnderstanding, ServiceError, ServiceResult,
	search::corpus::CorpusStats,
};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchRequest {
	pub query: String,
	pub top_k: Option<u32>,
	#[serde(default)]
	pub hints: Vec<FieldHint>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Diagnostics {
	pub matched_registry_keys: usize,
	pub retrieved_chunks: usize,
	pub matched_metrics: usize,
	pub fallback_used: bool,
}

/// One correlated metric with the chunk evidence that justifies it. The
/// evidence slots are absent on the fallback path.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResultItem {
	pub metric_id: i64,
	pub key: String,
	pub value_numeric: Option<f64>,
	pub range_min: Option<f64>,
	pub range_max: Option<f64>,
	pub value_text: Option<String>,
	pub value_json: Option<serde_json::Value>,
	pub unit: Option<String>,
	pub confidence: Option<f32>,
	pub evidence_chunk: Option<String>,
	pub chunk_uid: Option<String>,
	pub quote: Option<String>,
	pub vector_score: f32,
	pub bm25_score: f32,
	pub hybrid_score: f32,
	pub research_run_id: i64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchResponse {
	pub query_text: String,
	pub semantic_query_text: String,
	pub intent: QueryIntent,
	pub matched_fields: Vec<String>,
	pub results: Vec<ResultItem>,
	pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone)]
struct ScoredChunk {
	chunk: ResearchChunk,
	vector_score: f32,
	bm25_score: f32,
	hybrid_score: f32,
}

impl GristService {
	pub async fn search(&self, req: SearchRequest) -> ServiceResult<SearchResponse> {
		let query = req.query.trim();

		if query.is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "Query text must not be empty.".to_string(),
			});
		}

		let top_k = req
			.top_k
			.map(|k| k as usize)
			.filter(|k| *k > 0)
			.unwrap_or(self.cfg.search.default_top_k);
		let intent = classify_intent(query);

		tracing::info!(query, intent = intent.as_str(), top_k, "Search started.");

		let understanding = self.understand_query(query, &req.hints).await;
		let semantic_query = understanding.semantic_query_text.clone();
		let query_tokens = scoring::tokenize(&semantic_query);
		let query_vector = self.embed_query(&semantic_query).await;
		let entries = self.registry.entries().await?;
		let matched_fields = self.ground_registry(&entries, query_vector.as_deref(), &understanding);

		tracing::debug!(grounded = matched_fields.len(), "Registry grounding complete.");

		let version = self.active_chunk_version().await.to_string();
		let pool = self.primary_pool(intent, &version, top_k).await?;
		let pool = focus_filter(pool, &matched_fields);
		let stats = self.corpus_stats().await;
		let mut primary = score_chunks(pool, query_vector.as_deref(), &query_tokens, stats, &self.cfg);

		sort_by_score(&mut primary);
		primary.truncate(self.cfg.search.primary_limit);

		let background = self.background_supplement(&version, query_vector.as_deref(), &query_tokens, stats).await?;
		let retrieved_chunks = primary.len() + background.len();

		tracing::debug!(primary = primary.len(), background = background.len(), "Chunk retrieval complete.");

		let mut results = self.correlate_metrics(&primary, &background, &matched_fields).await?;

		results.truncate(top_k);

		let mut fallback_used = false;

		if results.is_empty() {
			tracing::warn!("Pipeline yielded no results; degrading to metric-level correlation.");

			results = self
				.fallback_correlation(query_vector.as_deref(), &query_tokens, &entries, top_k)
				.await?;
			fallback_used = true;
		}

		let diagnostics = Diagnostics {
			matched_registry_keys: matched_fields.len(),
			retrieved_chunks,
			matched_metrics: results.len(),
			fallback_used,
		};

		tracing::info!(
			results = results.len(),
			fallback_used,
			"Search complete."
		);

		Ok(SearchResponse {
			query_text: query.to_string(),
			semantic_query_text: semantic_query,
			intent,
			matched_fields,
			results,
			diagnostics,
		})
	}

	async fn understand_query(&self, query: &str, hints: &[FieldHint]) -> QueryUnderstanding {
		let Some(query_cfg) = &self.cfg.providers.query else {
			return QueryUnderstanding::identity(query);
		};

		match self.providers.query.understand(query_cfg, query, hints).await {
			Ok(understanding) => understanding,
			Err(err) => {
				tracing::warn!(error = %err, "Query understanding failed; using the raw query.");

				QueryUnderstanding::identity(query)
			},
		}
	}

	async fn embed_query(&self, text: &str) -> Option<Vec<f32>> {
		match self.providers.embedding.embed(&self.cfg.providers.embedding, &[text.to_string()]).await
		{
			Ok(mut vectors) if !vectors.is_empty() => Some(vectors.remove(0)),
			Ok(_) => {
				tracing::warn!("Embedding provider returned no vectors; scoring without the vector component.");

				None
			},
			Err(err) => {
				tracing::warn!(error = %err, "Query embedding failed; scoring without the vector component.");

				None
			},
		}
	}

	/// Top grounded registry keys by cosine similarity (stable tie-break in
	/// registration order), unioned with the keys the query understanding
	/// collaborator suggested.
	fn ground_registry(
		&self,
		entries: &[RegistryEntry],
		query_vector: Option<&[f32]>,
		understanding: &QueryUnderstanding,
	) -> Vec<String> {
		let mut grounded: Vec<String> = if let Some(query_vector) = query_vector {
			let mut scored: Vec<(f32, &str)> = entries
				.iter()
				.filter_map(|entry| {
					entry
						.embedding
						.as_deref()
						.map(|embedding| (scoring::cosine(query_vector, embedding), entry.key.as_str()))
				})
				.collect();

			scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

			scored
				.into_iter()
				.take(self.cfg.search.grounding_top_k)
				.map(|(_, key)| key.to_string())
				.collect()
		} else {
			Vec::new()
		};

		for key in &understanding.matched_field_keys {
			if !grounded.contains(key) {
				grounded.push(key.clone());
			}
		}

		grounded
	}

	/// Version- and type-filtered candidate pool with the relaxation
	/// ladder: a pool below `max(3, top_k/2)` drops the type filter; an
	/// empty pool after that drops the version filter too. Background
	/// chunks never enter the primary pool.
	async fn primary_pool(
		&self,
		intent: QueryIntent,
		version: &str,
		top_k: usize,
	) -> ServiceResult<Vec<ResearchChunk>> {
		let include_types = match intent {
			QueryIntent::Decision => Some(vec![
				ChunkType::NumericEstimate,
				ChunkType::FinalJudgement,
				ChunkType::MetricSummaryRow,
			]),
			QueryIntent::Explain => None,
		};
		let filter = ChunkFilter {
			chunk_version: Some(version.to_string()),
			include_types,
			exclude_type: Some(ChunkType::BackgroundContext),
			require_embedding: true,
			..Default::default()
		};
		let mut pool = self.chunks.list(&filter).await?;
		let min_pool = 3.max(top_k / 2);

		if pool.len() < min_pool {
			tracing::warn!(
				pool = pool.len(),
				min_pool,
				"Candidate pool too small; relaxing the type filter."
			);

			let relaxed = ChunkFilter {
				chunk_version: Some(version.to_string()),
				exclude_type: Some(ChunkType::BackgroundContext),
				require_embedding: true,
				..Default::default()
			};

			pool = self.chunks.list(&relaxed).await?;

			if pool.is_empty() {
				tracing::warn!("Versioned pool is empty; relaxing the version filter.");

				let unversioned = ChunkFilter {
					exclude_type: Some(ChunkType::BackgroundContext),
					require_embedding: true,
					..Default::default()
				};

				pool = self.chunks.list(&unversioned).await?;
			}
		}

		Ok(pool)
	}

	/// Independent retrieval of background chunks, same scoring, fixed cap.
	/// Vectorless chunks never qualify, matching the primary pool.
	async fn background_supplement(
		&self,
		version: &str,
		query_vector: Option<&[f32]>,
		query_tokens: &[String],
		stats: &CorpusStats,
	) -> ServiceResult<Vec<ScoredChunk>> {
		let filter = ChunkFilter {
			chunk_version: Some(version.to_string()),
			include_types: Some(vec![ChunkType::BackgroundContext]),
			require_embedding: true,
			..Default::default()
		};
		let mut pool = self.chunks.list(&filter).await?;

		if pool.is_empty() {
			let unversioned = ChunkFilter {
				include_types: Some(vec![ChunkType::BackgroundContext]),
				require_embedding: true,
				..Default::default()
			};

			pool = self.chunks.list(&unversioned).await?;
		}

		let mut scored = score_chunks(pool, query_vector, query_tokens, stats, &self.cfg);

		sort_by_score(&mut scored);
		scored.truncate(self.cfg.search.background_limit);

		Ok(scored)
	}

	/// Joins the retained chunks to metrics through provenance. Metric ids
	/// deduplicate in first-seen order; metrics outside the grounded key
	/// set are dropped when grounding is non-empty; each metric inherits
	/// its source chunk's scores.
	async fn correlate_metrics(
		&self,
		primary: &[ScoredChunk],
		background: &[ScoredChunk],
		grounded_keys: &[String],
	) -> ServiceResult<Vec<ResultItem>> {
		let by_uid: HashMap<&str, &ScoredChunk> = primary
			.iter()
			.chain(background.iter())
			.map(|scored| (scored.chunk.chunk_uid.as_str(), scored))
			.collect();
		let uids: Vec<String> = primary
			.iter()
			.chain(background.iter())
			.map(|scored| scored.chunk.chunk_uid.clone())
			.collect();

		if uids.is_empty() {
			return Ok(Vec::new());
		}

		let provenance = self.metrics.provenance_by_chunk_uids(&uids).await?;
		let mut first_seen: Vec<&grist_storage::Provenance> = Vec::new();

		for row in &provenance {
			if !first_seen.iter().any(|seen| seen.metric_id == row.metric_id) {
				first_seen.push(row);
			}
		}

		let metric_ids: Vec<i64> = first_seen.iter().map(|row| row.metric_id).collect();
		let metrics = self.metrics.metrics_by_ids(&metric_ids).await?;
		let metric_map: HashMap<i64, &Metric> =
			metrics.iter().map(|metric| (metric.id, metric)).collect();
		let mut results = Vec::new();

		for row in first_seen {
			let Some(metric) = metric_map.get(&row.metric_id) else {
				continue;
			};

			if !grounded_keys.is_empty() && !grounded_keys.contains(&metric.key) {
				continue;
			}

			let Some(scored) = by_uid.get(row.chunk_uid.as_str()) else {
				continue;
			};

			results.push((scored.chunk.chunk_type, ResultItem {
				metric_id: metric.id,
				key: metric.key.clone(),
				value_numeric: metric.value_numeric,
				range_min: metric.range_min,
				range_max: metric.range_max,
				value_text: metric.value_text.clone(),
				value_json: metric.value_json.clone(),
				unit: metric.unit.clone(),
				confidence: row.confidence,
				evidence_chunk: Some(scored.chunk.content.clone()),
				chunk_uid: Some(scored.chunk.chunk_uid.clone()),
				quote: row.quote.clone(),
				vector_score: scored.vector_score,
				bm25_score: scored.bm25_score,
				hybrid_score: scored.hybrid_score,
				research_run_id: metric.research_run_id,
			}));
		}

		results.sort_by(|a, b| b.1.hybrid_score.partial_cmp(&a.1.hybrid_score).unwrap_or(Ordering::Equal));
		results.sort_by_key(|(chunk_type, _)| type_bucket(*chunk_type));

		Ok(results.into_iter().map(|(_, item)| item).collect())
	}

	/// Direct metric-level correlation: every metric scored against the
	/// query over an enriched text, with a sigmoid-squashed BM25 component.
	async fn fallback_correlation(
		&self,
		query_vector: Option<&[f32]>,
		query_tokens: &[String],
		entries: &[RegistryEntry],
		top_k: usize,
	) -> ServiceResult<Vec<ResultItem>> {
		let metrics = self.metrics.all_metrics().await?;

		if metrics.is_empty() {
			return Ok(Vec::new());
		}

		let descriptions: HashMap<&str, &RegistryEntry> =
			entries.iter().map(|entry| (entry.key.as_str(), entry)).collect();
		let texts: Vec<String> = metrics
			.iter()
			.map(|metric| enriched_metric_text(metric, descriptions.get(metric.key.as_str()).copied()))
			.collect();
		let stats = CorpusStats::build(&texts);
		let mut results: Vec<ResultItem> = metrics
			.iter()
			.zip(texts.iter())
			.map(|(metric, text)| {
				let vector_score = match (query_vector, metric.embedding.as_deref()) {
					(Some(query_vector), Some(embedding)) => scoring::cosine(query_vector, embedding),
					_ => 0.0,
				};
				let bm25_score = scoring::sigmoid_normalize(scoring::bm25(
					query_tokens,
					text,
					&stats,
					self.cfg.search.bm25_k1,
					self.cfg.search.bm25_b,
				));
				let hybrid_score = scoring::hybrid(
					vector_score,
					bm25_score,
					self.cfg.search.vector_weight,
					self.cfg.search.bm25_weight,
				);

				ResultItem {
					metric_id: metric.id,
					key: metric.key.clone(),
					value_numeric: metric.value_numeric,
					range_min: metric.range_min,
					range_max: metric.range_max,
					value_text: metric.value_text.clone(),
					value_json: metric.value_json.clone(),
					unit: metric.unit.clone(),
					confidence: metric.confidence,
					evidence_chunk: None,
					chunk_uid: None,
					quote: None,
					vector_score,
					bm25_score,
					hybrid_score,
					research_run_id: metric.research_run_id,
				}
			})
			.collect();

		results.sort_by(|a, b| b.hybrid_score.partial_cmp(&a.hybrid_score).unwrap_or(Ordering::Equal));
		results.truncate(top_k);

		Ok(results)
	}
}

fn focus_filter(mut pool: Vec<ResearchChunk>, grounded_keys: &[String]) -> Vec<ResearchChunk> {
	if grounded_keys.is_empty() {
		return pool;
	}

	pool.retain(|chunk| {
		chunk.metric_focus.is_empty()
			|| chunk.metric_focus.iter().any(|key| grounded_keys.contains(key))
	});

	pool
}

fn score_chunks(
	pool: Vec<ResearchChunk>,
	query_vector: Option<&[f32]>,
	query_tokens: &[String],
	stats: &CorpusStats,
	cfg: &grist_config::Config,
) -> Vec<ScoredChunk> {
	pool.into_iter()
		.map(|chunk| {
			let vector_score = match (query_vector, chunk.embedding.as_deref()) {
				(Some(query_vector), Some(embedding)) => scoring::cosine(query_vector, embedding),
				_ => 0.0,
			};
			let bm25_score = scoring::bm25(
				query_tokens,
				&chunk.content,
				stats,
				cfg.search.bm25_k1,
				cfg.search.bm25_b,
			);
			let hybrid_score = scoring::hybrid(
				vector_score,
				bm25_score,
				cfg.search.vector_weight,
				cfg.search.bm25_weight,
			);

			ScoredChunk { chunk, vector_score, bm25_score, hybrid_score }
		})
		.collect()
}

fn sort_by_score(scored: &mut [ScoredChunk]) {
	scored.sort_by(|a, b| b.hybrid_score.partial_cmp(&a.hybrid_score).unwrap_or(Ordering::Equal));
}

/// Fixed-priority result buckets by source chunk type.
fn type_bucket(chunk_type: ChunkType) -> u8 {
	match chunk_type {
		ChunkType::NumericEstimate | ChunkType::MetricSummaryRow => 0,
		ChunkType::FinalJudgement => 1,
		ChunkType::BackgroundContext => 3,
		_ => 2,
	}
}

/// Searchable surrogate text for a metric: key path as words, registry
/// description, and stringified value payloads.
fn enriched_metric_text(metric: &Metric, entry: Option<&RegistryEntry>) -> String {
	let mut parts = vec![metric.key.replace(['.', '_'], " ")];

	if let Some(description) = entry.and_then(|entry| entry.description.as_deref()) {
		parts.push(description.to_string());
	}
	if let Some(value) = metric.value_numeric {
		parts.push(format!("value {value}"));
	}
	if let (Some(min), Some(max)) = (metric.range_min, metric.range_max) {
		parts.push(format!("range {min} {max}"));
	}
	if let Some(text) = metric.value_text.as_deref() {
		parts.push(text.to_string());
	}
	if let Some(json) = &metric.value_json {
		match json {
			serde_json::Value::Object(map) => {
				for value in map.values() {
					match value {
						serde_json::Value::String(text) => parts.push(text.clone()),
						serde_json::Value::Number(number) => parts.push(number.to_string()),
						_ => {},
					}
				}
			},
			serde_json::Value::String(text) => parts.push(text.clone()),
			serde_json::Value::Number(number) => parts.push(number.to_string()),
			_ => {},
		}
	}

	parts.join(" ")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bucket_order_matches_priorities() {
		assert_eq!(type_bucket(ChunkType::NumericEstimate), 0);
		assert_eq!(type_bucket(ChunkType::MetricSummaryRow), 0);
		assert_eq!(type_bucket(ChunkType::FinalJudgement), 1);
		assert_eq!(type_bucket(ChunkType::Reasoning), 2);
		assert_eq!(type_bucket(ChunkType::StrategyPattern), 2);
		assert_eq!(type_bucket(ChunkType::BackgroundContext), 3);
	}

	#[test]
	fn enriched_text_carries_key_words_and_values() {
		let metric = Metric {
			id: 1,
			research_run_id: 9,
			key: "financial.payback_months.base".to_string(),
			value_numeric: Some(11.0),
			range_min: Some(10.0),
			range_max: Some(12.0),
			value_text: None,
			value_json: Some(serde_json::json!({ "note": "steady demand" })),
			unit: Some("months".to_string()),
			confidence: Some(0.8),
			embedding: None,
		};
		let text = enriched_metric_text(&metric, None);

		assert!(text.contains("payback months base"));
		assert!(text.contains("value 11"));
		assert!(text.contains("range 10 12"));
		assert!(text.contains("steady demand"));
	}

	#[test]
	fn focus_filter_passes_empty_focus_through() {
		let chunk = |focus: Vec<&str>| ResearchChunk {
			research_run_id: 1,
			chunk_uid: "run_1_prov_0000".to_string(),
			content: "content".to_string(),
			chunk_type: ChunkType::Reasoning,
			metric_focus: focus.into_iter().map(str::to_string).collect(),
			section: None,
			subsection: None,
			chunk_version: "v1".to_string(),
			source_kind: grist_storage::SourceKind::Provenance,
			downgrade_reason: None,
			embedding: None,
		};
		let grounded = vec!["financial.capex.total".to_string()];
		let kept = focus_filter(
			vec![chunk(vec![]), chunk(vec!["financial.capex.total"]), chunk(vec!["other.key"])],
			&grounded,
		);

		assert_eq!(kept.len(), 2);
	}
}
