mod error;
pub mod memory;
pub mod models;
pub mod store;

pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use models::{Metric, Provenance, RegistryEntry, ResearchChunk, SourceKind};
pub use store::{BoxFuture, ChunkFilter, ChunkStore, MetricStore, RegistryStore};
