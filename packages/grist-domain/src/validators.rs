//! Chunk quality validators (V1-V3).
//!
//! All three checks must pass for a chunk to keep its semantic type; a
//! failure downgrades it to `background_context` with the reason recorded.
//! Content is never discarded.

use crate::vocab;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationFailure {
	MultipleQuestions,
	NotIndependent,
	NeedsContext,
}
impl ValidationFailure {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::MultipleQuestions => "multiple_questions",
			Self::NotIndependent => "not_independent",
			Self::NeedsContext => "needs_context",
		}
	}
}

pub fn validate(content: &str, metric_focus: &[String]) -> Result<(), ValidationFailure> {
	if !single_question(content) {
		return Err(ValidationFailure::MultipleQuestions);
	}
	if !independent_evidence(content, metric_focus) {
		return Err(ValidationFailure::NotIndependent);
	}
	if !context_free(content) {
		return Err(ValidationFailure::NeedsContext);
	}

	Ok(())
}

/// V1: answers a single question. At most three non-trivial sentences
/// (one main statement plus one or two qualifiers).
pub fn single_question(content: &str) -> bool {
	if content.trim().is_empty() {
		return false;
	}

	let non_trivial = vocab::split_sentences(content, vocab::VALIDATOR_SENTENCE_TERMINATORS)
		.into_iter()
		.filter(|s| s.chars().count() > 5)
		.count();

	non_trivial <= 3
}

/// V2: stands alone as evidence. Long enough, and mentions its own metric
/// terms, a number, or a judgement indicator.
pub fn independent_evidence(content: &str, metric_focus: &[String]) -> bool {
	let trimmed = content.trim();

	if trimmed.chars().count() < 20 {
		return false;
	}

	if !metric_focus.is_empty() {
		let content_lower = content.to_lowercase();
		let mentions_own_metric = metric_focus.iter().any(|key| {
			// Last and second-to-last dotted segments, e.g.
			// financial.capex.total -> "total", "capex".
			let segments: Vec<&str> = key.split('.').collect();

			segments
				.iter()
				.rev()
				.take(2)
				.any(|segment| content_lower.contains(&segment.to_lowercase()))
		});

		if mentions_own_metric {
			return true;
		}
	}

	if vocab::contains_digit(content) {
		return true;
	}

	vocab::contains_any(content, vocab::EVIDENCE_JUDGEMENT_TERMS)
}

/// V3: clear without surrounding context. Rejects pronoun-heavy text and
/// short text that opens with a bare pronoun.
pub fn context_free(content: &str) -> bool {
	if content.trim().is_empty() {
		return false;
	}

	let pronoun_count: usize = vocab::ZH_PRONOUNS
		.iter()
		.chain(vocab::EN_PRONOUNS)
		.map(|p| content.matches(p).count())
		.sum();

	if pronoun_count > 2 {
		return false;
	}

	if content.chars().count() < 30 {
		let trimmed = content.trim();

		if vocab::PRONOUN_OPENERS.iter().any(|opener| trimmed.starts_with(opener)) {
			return false;
		}
	}

	true
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn v1_rejects_four_sentences() {
		let content = "First point made. Second point made. Third point made. Fourth point made.";

		assert_eq!(validate(content, &[]), Err(ValidationFailure::MultipleQuestions));
		assert!(single_question("Payback is 11 months. Rent excluded."));
	}

	#[test]
	fn v2_rejects_short_content() {
		assert!(!independent_evidence("too short", &[]));
	}

	#[test]
	fn v2_accepts_own_metric_mention() {
		let focus = vec!["financial.payback.base".to_string()];

		assert!(independent_evidence("Payback periods vary by venue quality", &focus));
	}

	#[test]
	fn v2_accepts_digits_and_judgement_terms() {
		assert!(independent_evidence("Operators report roughly 11 months", &[]));
		assert!(independent_evidence("Location quality is the key consideration", &[]));
		assert!(!independent_evidence("Operators sometimes disagree on venues", &[]));
	}

	#[test]
	fn v3_rejects_pronoun_heavy_text() {
		assert!(!context_free("it depends, this varies, that too"));
		assert!(context_free("Payback sits near 11 months in dense areas"));
	}

	#[test]
	fn v3_rejects_short_pronoun_opener() {
		assert!(!context_free("It is much cheaper"));
		assert!(!context_free("This holds in Paris"));
	}
}
