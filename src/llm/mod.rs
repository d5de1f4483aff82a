// LLM provider adapters

pub mod images;
pub mod openai;
pub mod provider;

pub use images::ImageClient;
pub use provider::{LLMAdapter, LLM};
