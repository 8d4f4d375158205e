pub mod record;
pub mod report;

pub use record::{IndexStats, Match, Metadata, MetadataFilter, NamespaceStats, VectorRecord};
pub use report::{MemoryReport, SimilarDeal};
