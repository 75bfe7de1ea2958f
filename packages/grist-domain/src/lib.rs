pub mod chunk;
pub mod intent;
pub mod triggers;
pub mod validators;
pub mod vocab;

pub use chunk::{ChunkType, classify_chunk_type, classify_section_by_keywords, section_from_key};
pub use intent::{QueryIntent, classify_intent};
pub use triggers::{TriggerFire, TriggerId, check_triggers};
pub use validators::{ValidationFailure, validate};
