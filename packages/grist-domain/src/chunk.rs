use regex::Regex;

use crate::vocab;

/// Semantic type of a research judgment atom. Exactly one per chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
	NumericEstimate,
	Reasoning,
	FinalJudgement,
	StrategyPattern,
	RiskAnalysis,
	MetricSummaryRow,
	BackgroundContext,
}
impl ChunkType {
	pub const ALL: [Self; 7] = [
		Self::NumericEstimate,
		Self::Reasoning,
		Self::FinalJudgement,
		Self::StrategyPattern,
		Self::RiskAnalysis,
		Self::MetricSummaryRow,
		Self::BackgroundContext,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::NumericEstimate => "numeric_estimate",
			Self::Reasoning => "reasoning",
			Self::FinalJudgement => "final_judgement",
			Self::StrategyPattern => "strategy_pattern",
			Self::RiskAnalysis => "risk_analysis",
			Self::MetricSummaryRow => "metric_summary_row",
			Self::BackgroundContext => "background_context",
		}
	}
}

/// Classify a chunk's content. Ordered first-match cascade; the first rule
/// that matches decides, and `background_context` is the catch-all.
pub fn classify_chunk_type(content: &str) -> ChunkType {
	if content.contains('|') || content.contains('\t') {
		return ChunkType::MetricSummaryRow;
	}
	if vocab::contains_any(content, vocab::FINAL_JUDGEMENT_TERMS) {
		return ChunkType::FinalJudgement;
	}
	if has_numeric_estimate_shape(content) {
		return ChunkType::NumericEstimate;
	}
	if vocab::contains_any(content, vocab::STRATEGY_TERMS) {
		return ChunkType::StrategyPattern;
	}
	if vocab::contains_any(content, vocab::RISK_TERMS) {
		return ChunkType::RiskAnalysis;
	}
	if vocab::contains_any(content, vocab::REASONING_TERMS) {
		return ChunkType::Reasoning;
	}

	ChunkType::BackgroundContext
}

fn has_numeric_estimate_shape(content: &str) -> bool {
	// Percentage, currency, or numeric range.
	for pattern in [r"\d+\.?\d*\s*%", r"\$\s*\d+", r"\d+\s*[-–~]\s*\d+"] {
		if Regex::new(pattern).map(|re| re.is_match(content)).unwrap_or(false) {
			return true;
		}
	}

	false
}

/// Derive section/subsection labels from the first metric-focus key, e.g.
/// `financial.capex.total` -> (`financial`, `financial.capex`).
pub fn section_from_key(key: &str) -> (String, Option<String>) {
	let parts: Vec<&str> = key.split('.').collect();
	let section = parts[0].to_string();
	let subsection = (parts.len() >= 2).then(|| parts[..2].join("."));

	(section, subsection)
}

/// Keyword-bucket section classification for chunks without metric focus.
pub fn classify_section_by_keywords(content: &str) -> &'static str {
	for (section, keywords) in vocab::SECTION_KEYWORDS {
		if vocab::contains_any(content, keywords) {
			return section;
		}
	}

	vocab::DEFAULT_SECTION
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn classification_is_first_match() {
		// Tabular marker wins over the judgement vocabulary.
		assert_eq!(classify_chunk_type("a | b | most important"), ChunkType::MetricSummaryRow);
		assert_eq!(classify_chunk_type("this is the most important factor"), ChunkType::FinalJudgement);
		assert_eq!(classify_chunk_type("margin is 12%"), ChunkType::NumericEstimate);
		assert_eq!(classify_chunk_type("we recommend a smaller footprint"), ChunkType::StrategyPattern);
		assert_eq!(classify_chunk_type("high maintenance risk in humid climates"), ChunkType::RiskAnalysis);
		assert_eq!(classify_chunk_type("demand rises because foot traffic concentrates"), ChunkType::Reasoning);
		assert_eq!(classify_chunk_type("the venue opened in spring"), ChunkType::BackgroundContext);
	}

	#[test]
	fn serializes_snake_case() {
		let json = serde_json::to_string(&ChunkType::MetricSummaryRow).unwrap();

		assert_eq!(json, "\"metric_summary_row\"");
	}

	#[test]
	fn derives_section_labels() {
		let (section, subsection) = section_from_key("financial.capex.total");

		assert_eq!(section, "financial");
		assert_eq!(subsection.as_deref(), Some("financial.capex"));

		let (section, subsection) = section_from_key("market");

		assert_eq!(section, "market");
		assert_eq!(subsection, None);
	}
}
