mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Chunking, Config, EmbeddingProviderConfig, LlmProviderConfig, Providers, Search, Service,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.api_key must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}

	for (label, weight) in
		[("search.vector_weight", cfg.search.vector_weight), ("search.bm25_weight", cfg.search.bm25_weight)]
	{
		if !weight.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if !(0.0..=1.0).contains(&weight) {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 0.0-1.0."),
			});
		}
	}

	if (cfg.search.vector_weight + cfg.search.bm25_weight - 1.0).abs() > 1e-6 {
		return Err(Error::Validation {
			message: "search.vector_weight and search.bm25_weight must sum to 1.0.".to_string(),
		});
	}
	if !cfg.search.bm25_k1.is_finite() || cfg.search.bm25_k1 <= 0.0 {
		return Err(Error::Validation {
			message: "search.bm25_k1 must be greater than zero.".to_string(),
		});
	}
	if !cfg.search.bm25_b.is_finite() || !(0.0..=1.0).contains(&cfg.search.bm25_b) {
		return Err(Error::Validation {
			message: "search.bm25_b must be in the range 0.0-1.0.".to_string(),
		});
	}

	for (label, value) in [
		("search.grounding_top_k", cfg.search.grounding_top_k),
		("search.primary_limit", cfg.search.primary_limit),
		("search.background_limit", cfg.search.background_limit),
		("search.default_top_k", cfg.search.default_top_k),
		("search.corpus_sample_limit", cfg.search.corpus_sample_limit),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if cfg.chunking.chunk_version.trim().is_empty() {
		return Err(Error::Validation {
			message: "chunking.chunk_version must be non-empty.".to_string(),
		});
	}
	if cfg.chunking.min_paragraph_chars == 0 {
		return Err(Error::Validation {
			message: "chunking.min_paragraph_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.chunking.dedup_prefix_chars == 0 {
		return Err(Error::Validation {
			message: "chunking.dedup_prefix_chars must be greater than zero.".to_string(),
		});
	}

	if let Some(query) = cfg.providers.query.as_ref()
		&& query.api_key.trim().is_empty()
	{
		return Err(Error::Validation {
			message: "providers.query.api_key must be non-empty when configured.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	// A query provider stanza without credentials is the same as no query
	// provider at all.
	if cfg
		.providers
		.query
		.as_ref()
		.map(|query| query.api_base.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.providers.query = None;
	}
}
