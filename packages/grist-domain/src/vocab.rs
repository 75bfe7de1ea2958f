//! Vocabulary tables for the rule engines.
//!
//! Vocabularies are data, not code: triggers, validators and classifiers
//! iterate these ordered tables so the terms can be audited and extended
//! without touching the rule logic. Entries mix Chinese and English because
//! the evidence corpus does.

/// Decisiveness terms that arm trigger T2 (number + judgement).
pub const TRIGGER_JUDGEMENT_TERMS: &[&str] = &[
	"最重要",
	"决定性",
	"权重",
	"首要",
	"关键",
	"most important",
	"critical",
	"key factor",
	"primary",
];

/// Decisiveness terms that classify a chunk as a final judgement.
pub const FINAL_JUDGEMENT_TERMS: &[&str] = &[
	"最重要",
	"决定性",
	"权重",
	"首要",
	"关键因素",
	"most important",
	"critical",
	"key factor",
];

pub const STRATEGY_TERMS: &[&str] =
	&["应当", "建议", "适合", "推荐", "recommend", "suggest", "should"];

pub const RISK_TERMS: &[&str] = &["风险", "成本", "回收期", "压缩", "risk", "cost", "payback"];

pub const REASONING_TERMS: &[&str] =
	&["因为", "由于", "导致", "影响", "because", "due to", "affect"];

/// Growth vocabulary used by trigger T3 to bucket elasticity sentences.
pub const GROWTH_TERMS: &[&str] = &["增长", "提升", "变化", "increase", "growth"];

/// Explanatory vocabulary used by trigger T4 alongside tabular delimiters.
pub const EXPLANATION_TERMS: &[&str] =
	&["说明", "解释", "注", "note", "explanation", "表示", "指"];

/// Judgement indicators accepted by validator V2 as independent evidence.
pub const EVIDENCE_JUDGEMENT_TERMS: &[&str] = &[
	"重要",
	"关键",
	"主要",
	"次要",
	"建议",
	"应当",
	"适合",
	"important",
	"key",
	"recommend",
	"suggest",
];

/// Terms that mark a query as decision-seeking. Matched case-insensitively.
pub const DECISION_INTENT_TERMS: &[&str] = &[
	"是否",
	"值不值得",
	"值得",
	"哪个更",
	"决定",
	"影响",
	"应该",
	"建议",
	"推荐",
	"可行",
	"合适",
	"更好",
	"优势",
	"劣势",
	"对比",
	"要不要",
	"该不该",
	"能不能",
	"should",
	"recommend",
	"better",
	"worth",
	"feasible",
];

pub const ZH_PRONOUNS: &[&str] = &["他", "她", "它", "这", "那", "其", "此"];

pub const EN_PRONOUNS: &[&str] = &["it", "this", "that", "these", "those"];

/// Openers that make a short chunk context-dependent (validator V3).
pub const PRONOUN_OPENERS: &[&str] = &["它", "这", "那", "It", "Th"];

/// Keyword buckets for section classification when a chunk carries no
/// metric focus. First bucket whose terms match wins.
pub const SECTION_KEYWORDS: &[(&str, &[&str])] = &[
	("financial", &["成本", "收入", "利润", "投资", "cost", "revenue", "profit", "capex"]),
	("location", &["地点", "客流", "位置", "location", "traffic", "foot"]),
	("machine", &["机器", "设备", "性能", "machine", "equipment", "performance"]),
	("risk", &["风险", "问题", "risk", "challenge"]),
	("market", &["市场", "需求", "market", "demand"]),
];

pub const DEFAULT_SECTION: &str = "conclusion";

/// Numeric-shape patterns for trigger T1: currency, percentage,
/// unit-suffixed amounts, and numeric ranges.
pub const NUMERIC_SHAPE_PATTERNS: &[&str] = &[
	r"\$\s*\d+[\d,]*\.?\d*[kKmMbB]?",
	r"\d+\.?\d*\s*%",
	r"\d+[\d,]*\.?\d*\s*(?:USD|CNY|RMB|美元|元)",
	r"\d+\.?\d*\s*[-–~]\s*\d+\.?\d*",
];

/// Sentence terminators used by trigger splits.
pub const TRIGGER_SENTENCE_TERMINATORS: &[char] = &['。', '.', '!', '！'];

/// Sentence terminators used by validator V1 (also counts questions).
pub const VALIDATOR_SENTENCE_TERMINATORS: &[char] = &['。', '.', '!', '！', '?', '？'];

/// Clause delimiters considered by the T2 cut-point search.
pub const CLAUSE_DELIMITERS: &[char] = &[',', ';', '，', '；', '。', '.', '!', '！'];

pub fn contains_any(text: &str, terms: &[&str]) -> bool {
	terms.iter().any(|term| text.contains(term))
}

pub fn contains_digit(text: &str) -> bool {
	text.chars().any(|c| c.is_ascii_digit())
}

/// Sentence split over an explicit terminator set; keeps trimmed,
/// non-empty segments.
pub fn split_sentences(text: &str, terminators: &[char]) -> Vec<String> {
	text.split(|c: char| terminators.contains(&c))
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(str::to_string)
		.collect()
}
