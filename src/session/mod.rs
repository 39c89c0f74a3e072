pub mod chat_loop;
pub mod console;
pub mod error;
pub mod request_generation;
pub mod single_shot;
pub mod thinking;
pub mod transcript;

#[cfg(test)]
pub(crate) mod testing;

pub use chat_loop::ChatSession;
pub use console::Console;
pub use error::SessionError;
pub use thinking::{ModelCheck, ThinkingChat, ThoughtAnswer};
pub use transcript::Transcript;
