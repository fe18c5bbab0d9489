pub mod provider;
pub mod claude;
pub mod openai;
pub mod gemini;
pub mod local;
pub mod prompts;
pub mod selector;

pub use provider::LLMProvider;
pub use claude::ClaudeProvider;
pub use openai::OpenAIProvider;
pub use gemini::GeminiProvider;
pub use local::LocalProvider;
pub use prompts::{StandupRequest, SYSTEM_PROMPT};
pub use selector::{build_backend, select};
