pub mod generator;
pub mod remote;
pub mod types;

pub use generator::{strip_prompt_echo, GenerationError, ProcessGenerator, TextGenerator};
pub use remote::{RemoteChatClient, RemoteChatError};
pub use types::{ChatMessage, SamplingParams};
