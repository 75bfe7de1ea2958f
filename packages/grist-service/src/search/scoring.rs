//! Hybrid score primitives: embedding cosine fused with a BM25-style
//! lexical score over whitespace tokens.

use crate::search::corpus::CorpusStats;

pub fn tokenize(text: &str) -> Vec<String> {
	text.to_lowercase().split_whitespace().map(str::to_string).collect()
}

/// Cosine similarity. 0.0 on length mismatch, empty input, or a
/// zero-magnitude side.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
	if a.is_empty() || a.len() != b.len() {
		return 0.0;
	}

	let mut dot = 0.0_f32;
	let mut norm_a = 0.0_f32;
	let mut norm_b = 0.0_f32;

	for (x, y) in a.iter().zip(b.iter()) {
		dot += x * y;
		norm_a += x * x;
		norm_b += y * y;
	}

	if norm_a <= 0.0 || norm_b <= 0.0 {
		return 0.0;
	}

	dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Okapi BM25 over the corpus statistics snapshot. Unseen terms score with
/// `ln(N + 1)` as their idf. A repeated query term contributes once per
/// occurrence.
pub fn bm25(query_tokens: &[String], doc: &str, stats: &CorpusStats, k1: f32, b: f32) -> f32 {
	if query_tokens.is_empty() {
		return 0.0;
	}

	let doc_tokens = tokenize(doc);

	if doc_tokens.is_empty() {
		return 0.0;
	}

	let doc_len = doc_tokens.len() as f32;
	let total_docs = stats.total_docs as f32;
	let mut score = 0.0_f32;

	for term in query_tokens {
		let term_freq = doc_tokens.iter().filter(|token| *token == term).count() as f32;

		if term_freq == 0.0 {
			continue;
		}

		let doc_freq = stats.doc_freq(term) as f32;
		let idf = if doc_freq > 0.0 {
			((total_docs - doc_freq + 0.5) / (doc_freq + 0.5) + 1.0).ln()
		} else {
			(total_docs + 1.0).ln()
		};
		let denominator =
			term_freq + k1 * (1.0 - b + b * doc_len / stats.avg_doc_length);

		score += idf * term_freq * (k1 + 1.0) / denominator;
	}

	score
}

pub fn hybrid(vector_score: f32, bm25_score: f32, vector_weight: f32, bm25_weight: f32) -> f32 {
	vector_weight * vector_score + bm25_weight * bm25_score
}

/// Squashes an unbounded BM25 score into (0, 1) for the metric fallback
/// path, where no vector component may exist to balance it.
pub fn sigmoid_normalize(score: f32) -> f32 {
	1.0 / (1.0 + (-score / 10.0).exp())
}
