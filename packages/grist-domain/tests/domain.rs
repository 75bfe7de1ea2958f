use grist_domain::{
	ChunkType, QueryIntent, TriggerId, ValidationFailure, check_triggers, classify_chunk_type,
	classify_intent, classify_section_by_keywords, section_from_key, validate,
};

#[test]
fn t1_takes_priority_over_t2_across_sentences() {
	let content = "Rent is $3,000 per month. The margin reaches 25%, which is the key factor.";
	let fire = check_triggers(content, &[]).expect("trigger must fire");

	assert_eq!(fire.id, TriggerId::MultipleNumbers);
	assert!(fire.parts.len() >= 2);
}

#[test]
fn cascade_falls_through_a_degenerate_t1_split() {
	// Two numeric shapes in one sentence: T1's predicate matches but its
	// sentence split yields a single part, so T2 handles the cut.
	let content = "ROI is 18% and the machine costs $20k, which is the most critical factor";
	let fire = check_triggers(content, &[]).expect("trigger must fire");

	assert_eq!(fire.id, TriggerId::NumberAndJudgement);
	assert!(fire.parts[0].contains("18%"));
	assert!(fire.parts[0].contains("$20k"));
	assert!(fire.parts[1].contains("most critical factor"));
}

#[test]
fn untriggered_content_stays_whole() {
	assert!(check_triggers("The venue opened last spring.", &[]).is_none());
}

#[test]
fn classification_stays_within_the_enum() {
	let corpus = [
		"Monthly rent is $3,000",
		"Payback is 10-12 months, which is the most important factor",
		"We recommend the compact layout",
		"High failure risk in humid climates",
		"Demand rises because foot traffic concentrates at lunch",
		"Revenue grows 8% month over month",
		"item | base | high",
		"门店位于商圈核心位置",
		"",
	];

	for content in corpus {
		assert!(ChunkType::ALL.contains(&classify_chunk_type(content)), "unexpected type for {content:?}");
	}
}

#[test]
fn decision_intent_in_both_languages() {
	assert_eq!(classify_intent("Should we buy the machine?"), QueryIntent::Decision);
	assert_eq!(classify_intent("这个项目是否值得投资"), QueryIntent::Decision);
	assert_eq!(classify_intent("How does seasonality affect demand?"), QueryIntent::Explain);
}

#[test]
fn pronoun_heavy_content_fails_validation() {
	let focus: Vec<String> = Vec::new();

	assert_eq!(
		validate("it compounds at 3% and this beats that easily", &focus),
		Err(ValidationFailure::NeedsContext)
	);
	assert!(validate("Monthly rent is $3,000 in the downtown district.", &focus).is_ok());
}

#[test]
fn sections_come_from_keys_then_keywords() {
	let (section, subsection) = section_from_key("financial.payback_months.base");

	assert_eq!(section, "financial");
	assert_eq!(subsection.as_deref(), Some("financial.payback_months"));
	assert_eq!(classify_section_by_keywords("设备性能稳定"), "machine");
	assert_eq!(classify_section_by_keywords("nothing matches here"), "conclusion");
}
