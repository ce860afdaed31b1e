mod openai;
mod provider;

pub use openai::{OpenAIConfig, OpenAIProvider};
#[cfg(test)]
pub use provider::MockEmbeddingProvider;
pub use provider::EmbeddingProvider;
