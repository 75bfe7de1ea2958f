//! Chunk atomizer: turns raw research evidence into typed, validated,
//! independently-verifiable chunks.
//!
//! `split` runs seven strictly ordered phases: seed from evidence, hard
//! split triggers, metric-focus backfill, type classification, section
//! classification, validation with downgrade, and a background supplement
//! cut from the raw report text. The whole pass is deterministic: same
//! inputs, same uid sequence, same classifications.

use regex::Regex;

use grist_domain::{
	ChunkType, ValidationFailure, check_triggers, classify_chunk_type,
	classify_section_by_keywords, section_from_key, validators,
};
use grist_storage::{ResearchChunk, SourceKind};

#[derive(Clone, Debug)]
pub struct AtomizerConfig {
	pub chunk_version: String,
	pub min_paragraph_chars: usize,
	pub dedup_prefix_chars: usize,
	pub max_inferred_focus: usize,
}
impl Default for AtomizerConfig {
	fn default() -> Self {
		Self {
			chunk_version: "v1".to_string(),
			min_paragraph_chars: 50,
			dedup_prefix_chars: 50,
			max_inferred_focus: 2,
		}
	}
}

/// One evidence item proposed by the upstream extraction process.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct EvidenceItem {
	/// Registry keys the extractor claims this evidence supports.
	#[serde(default)]
	pub fields: Vec<String>,
	pub evidence_text: String,
}

#[derive(Clone, Debug)]
struct Candidate {
	chunk_uid: String,
	content: String,
	metric_focus: Vec<String>,
	chunk_type: ChunkType,
	section: Option<String>,
	subsection: Option<String>,
	downgrade_reason: Option<ValidationFailure>,
}

pub fn split(
	cfg: &AtomizerConfig,
	run_id: i64,
	raw_report_text: &str,
	evidence: &[EvidenceItem],
	registry_keys: &[String],
) -> Vec<ResearchChunk> {
	tracing::info!(run_id, evidence = evidence.len(), "Atomizing research evidence.");

	let seeded = phase1_seed(run_id, evidence);

	tracing::debug!(candidates = seeded.len(), "Phase 1: seeded from evidence.");

	let mut candidates = phase2_triggers(seeded);

	tracing::debug!(candidates = candidates.len(), "Phase 2: trigger cascade applied.");

	phase3_backfill_focus(&mut candidates, registry_keys, cfg.max_inferred_focus);
	phase4_classify_type(&mut candidates);
	phase5_classify_section(&mut candidates);
	phase6_validate(&mut candidates);

	let mut chunks: Vec<ResearchChunk> = candidates
		.into_iter()
		.map(|candidate| to_chunk(run_id, &cfg.chunk_version, candidate))
		.collect();
	let background = phase7_supplement(cfg, run_id, raw_report_text, &chunks);

	tracing::info!(
		run_id,
		primary = chunks.len(),
		background = background.len(),
		"Atomization complete."
	);

	chunks.extend(background);

	chunks
}

fn phase1_seed(run_id: i64, evidence: &[EvidenceItem]) -> Vec<Candidate> {
	let mut candidates = Vec::new();

	for (idx, item) in evidence.iter().enumerate() {
		let content = item.evidence_text.trim();

		if content.is_empty() {
			tracing::warn!(idx, "Evidence item has no text; skipped.");

			continue;
		}

		candidates.push(Candidate {
			chunk_uid: format!("run_{run_id}_prov_{idx:04}"),
			content: content.to_string(),
			metric_focus: item.fields.clone(),
			chunk_type: ChunkType::BackgroundContext,
			section: None,
			subsection: None,
			downgrade_reason: None,
		});
	}

	candidates
}

fn phase2_triggers(candidates: Vec<Candidate>) -> Vec<Candidate> {
	let mut out = Vec::new();

	for candidate in candidates {
		let Some(fire) = check_triggers(&candidate.content, &candidate.metric_focus) else {
			out.push(candidate);

			continue;
		};

		tracing::debug!(
			chunk_uid = %candidate.chunk_uid,
			trigger = fire.id.as_str(),
			parts = fire.parts.len(),
			"Trigger split applied."
		);

		for (sub_idx, part) in fire.parts.into_iter().enumerate() {
			out.push(Candidate {
				chunk_uid: format!("{}_t{sub_idx}", candidate.chunk_uid),
				content: part,
				..candidate.clone()
			});
		}
	}

	out
}

fn phase3_backfill_focus(candidates: &mut [Candidate], registry_keys: &[String], max: usize) {
	for candidate in candidates.iter_mut() {
		if !candidate.metric_focus.is_empty() {
			continue;
		}

		let content_lower = candidate.content.to_lowercase();
		let inferred: Vec<String> = registry_keys
			.iter()
			.filter(|key| {
				key.split('.')
					.next_back()
					.map(|term| content_lower.contains(&term.to_lowercase()))
					.unwrap_or(false)
			})
			.take(max)
			.cloned()
			.collect();

		candidate.metric_focus = inferred;
	}
}

fn phase4_classify_type(candidates: &mut [Candidate]) {
	for candidate in candidates.iter_mut() {
		candidate.chunk_type = classify_chunk_type(&candidate.content);
	}
}

fn phase5_classify_section(candidates: &mut [Candidate]) {
	for candidate in candidates.iter_mut() {
		if let Some(first_key) = candidate.metric_focus.first() {
			let (section, subsection) = section_from_key(first_key);

			candidate.section = Some(section);
			candidate.subsection = subsection;
		} else {
			candidate.section = Some(classify_section_by_keywords(&candidate.content).to_string());
		}
	}
}

fn phase6_validate(candidates: &mut [Candidate]) {
	for candidate in candidates.iter_mut() {
		if let Err(failure) = validators::validate(&candidate.content, &candidate.metric_focus) {
			tracing::warn!(
				chunk_uid = %candidate.chunk_uid,
				reason = failure.as_str(),
				"Chunk failed validation; downgraded to background context."
			);

			candidate.chunk_type = ChunkType::BackgroundContext;
			candidate.downgrade_reason = Some(failure);
		}
	}
}

fn phase7_supplement(
	cfg: &AtomizerConfig,
	run_id: i64,
	raw_report_text: &str,
	existing: &[ResearchChunk],
) -> Vec<ResearchChunk> {
	if raw_report_text.trim().is_empty() {
		return Vec::new();
	}

	let paragraph_break = match Regex::new(r"\n\n+") {
		Ok(re) => re,
		Err(err) => {
			tracing::warn!(error = %err, "Paragraph pattern failed to compile; supplement skipped.");

			return Vec::new();
		},
	};
	let mut out = Vec::new();
	let mut bg_idx = 0_usize;

	for paragraph in paragraph_break.split(raw_report_text) {
		let paragraph = paragraph.trim();

		if paragraph.chars().count() < cfg.min_paragraph_chars {
			continue;
		}

		let prefix: String = paragraph.chars().take(cfg.dedup_prefix_chars).collect();

		if existing.iter().any(|chunk| chunk.content.contains(&prefix)) {
			continue;
		}

		out.push(ResearchChunk {
			research_run_id: run_id,
			chunk_uid: format!("run_{run_id}_bg_{bg_idx:04}"),
			content: paragraph.to_string(),
			chunk_type: ChunkType::BackgroundContext,
			metric_focus: Vec::new(),
			section: Some("background".to_string()),
			subsection: None,
			chunk_version: cfg.chunk_version.clone(),
			source_kind: SourceKind::RawText,
			downgrade_reason: None,
			embedding: None,
		});

		bg_idx += 1;
	}

	out
}

fn to_chunk(run_id: i64, chunk_version: &str, candidate: Candidate) -> ResearchChunk {
	ResearchChunk {
		research_run_id: run_id,
		chunk_uid: candidate.chunk_uid,
		content: candidate.content,
		chunk_type: candidate.chunk_type,
		metric_focus: candidate.metric_focus,
		section: candidate.section,
		subsection: candidate.subsection,
		chunk_version: chunk_version.to_string(),
		source_kind: SourceKind::Provenance,
		downgrade_reason: candidate.downgrade_reason,
		embedding: None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn skips_empty_evidence() {
		let cfg = AtomizerConfig::default();
		let evidence = vec![
			EvidenceItem { fields: Vec::new(), evidence_text: "   ".to_string() },
			EvidenceItem {
				fields: vec!["financial.capex.total".to_string()],
				evidence_text: "Total capex lands between 18000 and 22000 USD".to_string(),
			},
		];
		let chunks = split(&cfg, 7, "", &evidence, &[]);

		assert_eq!(chunks.len(), 1);
		assert_eq!(chunks[0].chunk_uid, "run_7_prov_0001");
	}

	#[test]
	fn supplement_drops_short_and_duplicate_paragraphs() {
		let cfg = AtomizerConfig::default();
		let evidence = vec![EvidenceItem {
			fields: vec!["financial.capex.total".to_string()],
			evidence_text: "Total capex lands between 18000 and 22000 USD for a compact unit"
				.to_string(),
		}];
		let raw = "Too short.\n\n\
			Total capex lands between 18000 and 22000 USD for a compact unit\n\n\
			Seasonality shifts weekend demand toward shopping districts and away from offices.";
		let chunks = split(&cfg, 3, raw, &evidence, &[]);
		let background: Vec<_> =
			chunks.iter().filter(|c| c.source_kind == SourceKind::RawText).collect();

		assert_eq!(background.len(), 1);
		assert!(background[0].content.starts_with("Seasonality"));
		assert_eq!(background[0].chunk_uid, "run_3_bg_0000");
		assert_eq!(background[0].section.as_deref(), Some("background"));
	}
}
