use ahash::{AHashMap, AHashSet};

use crate::search::scoring;

/// Average token length assumed for an empty corpus.
pub const DEFAULT_AVG_DOC_LENGTH: f32 = 200.0;

/// Read-only corpus snapshot for lexical scoring: document count, mean
/// whitespace-token length, and per-term document frequency.
#[derive(Debug, Clone)]
pub struct CorpusStats {
	pub total_docs: u32,
	pub avg_doc_length: f32,
	pub term_doc_freq: AHashMap<String, u32>,
}
impl CorpusStats {
	pub fn build(contents: &[String]) -> Self {
		if contents.is_empty() {
			return Self {
				total_docs: 0,
				avg_doc_length: DEFAULT_AVG_DOC_LENGTH,
				term_doc_freq: AHashMap::new(),
			};
		}

		let mut term_doc_freq = AHashMap::new();
		let mut total_tokens = 0_usize;

		for content in contents {
			let tokens = scoring::tokenize(content);

			total_tokens += tokens.len();

			let distinct: AHashSet<String> = tokens.into_iter().collect();

			for term in distinct {
				*term_doc_freq.entry(term).or_insert(0) += 1;
			}
		}

		Self {
			total_docs: contents.len() as u32,
			avg_doc_length: total_tokens as f32 / contents.len() as f32,
			term_doc_freq,
		}
	}

	pub fn doc_freq(&self, term: &str) -> u32 {
		self.term_doc_freq.get(term).copied().unwrap_or(0)
	}
}
