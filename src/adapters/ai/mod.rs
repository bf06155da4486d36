//! AI Enhancement Adapters.
//!
//! Implementations of the AIEnhancementClient port.
//!
//! ## Available Adapters
//!
//! - `MockAIEnhancementClient` - Configurable mock for testing
//! - `ChatCompletionsEnhancementClient` - OpenAI-compatible chat API (DeepSeek by default)

mod chat_completions_client;
mod mock_client;

pub use chat_completions_client::{ChatCompletionsConfig, ChatCompletionsEnhancementClient};
pub use mock_client::{MockAIEnhancementClient, MockCallLog, MockOutcome};
