use crate::vocab;

/// Coarse query intent. `Decision` narrows retrieval to decision-grade
/// chunk types; `Explain` is the default for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryIntent {
	Decision,
	Explain,
}
impl QueryIntent {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Decision => "DECISION",
			Self::Explain => "EXPLAIN",
		}
	}
}

pub fn classify_intent(query: &str) -> QueryIntent {
	let query = query.to_lowercase();

	if vocab::DECISION_INTENT_TERMS.iter().any(|term| query.contains(term)) {
		QueryIntent::Decision
	} else {
		QueryIntent::Explain
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decision_terms_match_case_insensitively() {
		assert_eq!(classify_intent("Should we expand to Lyon?"), QueryIntent::Decision);
		assert_eq!(classify_intent("是否值得投资"), QueryIntent::Decision);
		assert_eq!(classify_intent("how does payback work"), QueryIntent::Explain);
	}
}
