mod chat;
mod core;

pub use chat::complete;
pub use self::core::{Message, completion};
