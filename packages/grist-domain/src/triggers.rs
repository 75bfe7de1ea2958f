//! Hard split triggers (T1-T4).
//!
//! Evaluated as an ordered cascade: the first trigger whose predicate
//! matches and whose split yields at least two parts fires; a degenerate
//! split falls through to the next trigger. At most one trigger fires per
//! chunk.

use std::collections::HashSet;

use regex::Regex;

use crate::vocab;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerId {
	MultipleNumbers,
	NumberAndJudgement,
	BaseAndElasticity,
	TableAndExplanation,
}
impl TriggerId {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::MultipleNumbers => "T1_MULTIPLE_NUMBERS",
			Self::NumberAndJudgement => "T2_NUMBER_AND_JUDGEMENT",
			Self::BaseAndElasticity => "T3_BASE_AND_ELASTICITY",
			Self::TableAndExplanation => "T4_TABLE_AND_EXPLANATION",
		}
	}
}

#[derive(Debug, Clone)]
pub struct TriggerFire {
	pub id: TriggerId,
	pub parts: Vec<String>,
}

type Predicate = fn(&str, &[String]) -> bool;
type Splitter = fn(&str, &[String]) -> Vec<String>;

/// Priority-ordered (predicate, splitter) table.
const CASCADE: &[(TriggerId, Predicate, Splitter)] = &[
	(TriggerId::MultipleNumbers, t1_fires, t1_split),
	(TriggerId::NumberAndJudgement, t2_fires, t2_split),
	(TriggerId::BaseAndElasticity, t3_fires, t3_split),
	(TriggerId::TableAndExplanation, t4_fires, t4_split),
];

pub fn check_triggers(content: &str, metric_focus: &[String]) -> Option<TriggerFire> {
	for (id, fires, split) in CASCADE {
		if !fires(content, metric_focus) {
			continue;
		}

		let parts = split(content, metric_focus);

		if parts.len() > 1 {
			return Some(TriggerFire { id: *id, parts });
		}
	}

	None
}

// T1: at least two distinct numeric shapes (currency, percentage,
// unit-suffixed amount, range).
fn t1_fires(content: &str, _focus: &[String]) -> bool {
	let mut shapes: HashSet<String> = HashSet::new();

	for pattern in vocab::NUMERIC_SHAPE_PATTERNS {
		let Ok(re) = Regex::new(pattern) else { continue };

		for m in re.find_iter(content) {
			shapes.insert(m.as_str().to_string());
		}
	}

	shapes.len() >= 2
}

fn t1_split(content: &str, _focus: &[String]) -> Vec<String> {
	vocab::split_sentences(content, vocab::TRIGGER_SENTENCE_TERMINATORS)
		.into_iter()
		.filter(|s| vocab::contains_digit(s))
		.collect()
}

// T2: a number and a decisiveness term in the same chunk.
fn t2_fires(content: &str, _focus: &[String]) -> bool {
	vocab::contains_digit(content) && vocab::contains_any(content, vocab::TRIGGER_JUDGEMENT_TERMS)
}

// Cut at the clause boundary immediately before the earliest decisiveness
// term so intensified phrases ("most critical factor") stay intact in the
// judgement segment. The leading segment is kept only when it carries a
// number of its own.
fn t2_split(content: &str, _focus: &[String]) -> Vec<String> {
	let Some(term_pos) = vocab::TRIGGER_JUDGEMENT_TERMS
		.iter()
		.filter_map(|term| content.find(term))
		.min()
	else {
		return vec![content.to_string()];
	};
	let cut = content[..term_pos]
		.char_indices()
		.filter(|(_, c)| vocab::CLAUSE_DELIMITERS.contains(c))
		.map(|(idx, c)| idx + c.len_utf8())
		.next_back()
		.unwrap_or(term_pos);
	let leading = content[..cut]
		.trim()
		.trim_end_matches(|c: char| vocab::CLAUSE_DELIMITERS.contains(&c))
		.trim();
	let judgement = content[cut..].trim();
	let mut parts = Vec::new();

	if !leading.is_empty() && vocab::contains_digit(leading) {
		parts.push(leading.to_string());
	}
	if !judgement.is_empty() {
		parts.push(judgement.to_string());
	}

	if parts.len() > 1 { parts } else { vec![content.to_string()] }
}

// T3: metric focus mixes a base key with an elasticity key.
fn t3_fires(_content: &str, focus: &[String]) -> bool {
	let has_base = focus.iter().any(|key| key.contains(".base"));
	let has_elasticity = focus.iter().any(|key| key.contains("elasticity"));

	has_base && has_elasticity
}

fn t3_split(content: &str, _focus: &[String]) -> Vec<String> {
	let parts: Vec<String> = vocab::split_sentences(content, vocab::TRIGGER_SENTENCE_TERMINATORS)
		.into_iter()
		.filter(|s| vocab::contains_any(s, vocab::GROWTH_TERMS) || vocab::contains_digit(s))
		.collect();

	if parts.is_empty() { vec![content.to_string()] } else { parts }
}

// T4: tabular delimiters plus explanatory vocabulary.
fn t4_fires(content: &str, _focus: &[String]) -> bool {
	let has_table = content.contains('|') || content.contains('\t');

	has_table && vocab::contains_any(content, vocab::EXPLANATION_TERMS)
}

fn t4_split(content: &str, _focus: &[String]) -> Vec<String> {
	let mut table_lines = Vec::new();
	let mut prose_lines = Vec::new();

	for line in content.lines() {
		let line = line.trim();

		if line.is_empty() {
			continue;
		}
		if line.contains('|') || line.contains('\t') {
			table_lines.push(line);
		} else {
			prose_lines.push(line);
		}
	}

	let mut parts = Vec::new();

	if !table_lines.is_empty() {
		parts.push(table_lines.join("\n"));
	}
	if !prose_lines.is_empty() {
		parts.push(prose_lines.join(" "));
	}

	if parts.len() > 1 { parts } else { vec![content.to_string()] }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn t1_needs_two_distinct_shapes() {
		assert!(t1_fires("capex is $20k and margin is 35%", &[]));
		assert!(!t1_fires("capex is $20k and capex is $20k", &[]));
		assert!(!t1_fires("no numbers here", &[]));
	}

	#[test]
	fn t1_split_keeps_digit_sentences() {
		let fire = check_triggers("Capex is $20k. Margin holds at 35%. Sources vary.", &[])
			.expect("trigger");

		assert_eq!(fire.id, TriggerId::MultipleNumbers);
		assert_eq!(fire.parts, vec!["Capex is $20k", "Margin holds at 35%"]);
	}

	#[test]
	fn t2_splits_at_clause_before_term() {
		let fire = check_triggers(
			"ROI is 18% and the machine costs $20k, which is the most critical factor",
			&[],
		)
		.expect("trigger");

		assert_eq!(fire.id, TriggerId::NumberAndJudgement);
		assert_eq!(fire.parts.len(), 2);
		assert!(fire.parts[0].contains("18%"));
		assert!(fire.parts[0].contains("$20k"));
		assert!(fire.parts[1].contains("most critical factor"));
	}

	#[test]
	fn t1_takes_priority_over_t2() {
		// Matches both T1 (two shapes) and T2 (number + "critical"), and
		// both splits are viable; T1 must win.
		let fire = check_triggers("Capex is $20k. Payback is 45%, the critical factor.", &[])
			.expect("trigger");

		assert_eq!(fire.id, TriggerId::MultipleNumbers);
	}

	#[test]
	fn degenerate_t1_falls_through_to_t2() {
		// Two shapes in a single sentence: T1's sentence split yields one
		// part, so T2's clause split applies instead.
		let fire = check_triggers(
			"ROI is 18% and the machine costs $20k, which is the most critical factor",
			&[],
		)
		.expect("trigger");

		assert_eq!(fire.id, TriggerId::NumberAndJudgement);
	}

	#[test]
	fn t3_buckets_by_growth_vocabulary() {
		let focus =
			vec!["financial.revenue.base".to_string(), "financial.revenue.elasticity".to_string()];
		let fire = check_triggers(
			"Base revenue is 3000 per month. Revenue growth accelerates in summer.",
			&focus,
		)
		.expect("trigger");

		assert_eq!(fire.id, TriggerId::BaseAndElasticity);
		assert_eq!(fire.parts.len(), 2);
	}

	#[test]
	fn t4_separates_table_from_prose() {
		let fire = check_triggers(
			"city | payback\nParis | 11 months\nnote: excludes rent deposits",
			&[],
		)
		.expect("trigger");

		assert_eq!(fire.id, TriggerId::TableAndExplanation);
		assert_eq!(fire.parts[0], "city | payback\nParis | 11 months");
		assert_eq!(fire.parts[1], "note: excludes rent deposits");
	}

	#[test]
	fn no_trigger_keeps_chunk_whole() {
		assert!(check_triggers("A quiet qualitative observation.", &[]).is_none());
	}
}
