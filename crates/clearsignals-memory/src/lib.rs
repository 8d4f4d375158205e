pub mod builder;
pub mod client;
pub mod config;
pub mod dbs;
pub mod embedder;
pub mod error;
pub mod models;
pub mod repositories;
pub mod trait_client;

pub use builder::DealMemoryBuilder;
pub use client::DealMemory;
pub use config::MemoryConfig;
pub use dbs::{InMemoryIndex, PineconeIndex};
pub use embedder::OpenAIEmbedder;
pub use error::MemoryError;
pub use models::{IndexStats, Match, MemoryReport, Metadata, MetadataFilter, SimilarDeal, VectorRecord};
pub use repositories::{DealRepository, ProfileRepository};
pub use trait_client::{Embedder, VectorIndex};
