pub mod provider;
pub mod openai;
pub mod router;
pub mod types;
pub mod catalog;

pub use provider::LLMProvider;
pub use router::{create_provider, ProviderSettings};
pub use types::{LLMResponse, Message, Role, TokenUsage};
