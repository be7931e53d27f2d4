//! Remote model access: the chat-completions client and the fail-closed rater.

mod chat;
mod rater;

pub use chat::{
    AiError, ChatApi, ChatClient, ChatConfig, ChatMessage, DEFAULT_BASE_URL, DEFAULT_MODEL,
};
pub use rater::Rater;
