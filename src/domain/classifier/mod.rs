//! Remote log classification with bounded retries

pub mod client;
pub mod dto;
pub mod prompt;
pub mod retry;
pub mod service;

pub use client::{ChatTransport, DeepSeekClient, SharedChatTransport};
pub use dto::{ChatMessage, ChatRequest, HttpReply};
pub use retry::{decide_status, RetryDecision, RetryPolicy, MAX_ATTEMPTS, RETRY_DELAY};
pub use service::Classifier;
