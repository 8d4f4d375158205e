pub mod types;
pub mod traits;
pub mod config;
pub mod error;
pub mod openai;

pub use traits::{
    ChatClient,
    EmbeddingClient,
    ChatRequest, ChatResponse, ChatOptions,
    EmbeddingRequest, EmbeddingResponse,
    TokenUsage,
};

pub use config::{ClientFactory, ProviderConfig, ProviderType};
pub use error::ApiStatusError;
pub use openai::{OpenAIClient, OpenAIClientBuilder};
pub use types::Message;
