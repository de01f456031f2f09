//! Request and response types shared by the engine and the adapters

pub mod message;
pub mod options;
pub mod responses;

pub use message::{
    ChatMessage, MessageRole, assistant_message, system_message, user_message,
};
pub use options::ChatOptions;
pub use responses::{ChatResponse, ChatResult, ItemError, Usage};
