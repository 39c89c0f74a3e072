pub mod base;
pub mod chat;
pub mod errors;
pub mod generate;
pub mod tags;

pub use base::*;
pub use chat::*;
pub use errors::*;
pub use generate::*;
pub use tags::*;
