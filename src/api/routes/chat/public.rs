//! Public types for the chat API
use serde::{Deserialize, Serialize};

use crate::openai::Message;

/// Request body shared by create, update, and completion endpoints.
/// The model is only meaningful for completions and falls back to the
/// configured default when omitted.
#[derive(Deserialize)]
pub struct ChatMessages {
    pub messages: Vec<Message>,
    pub model: Option<String>,
}

#[derive(Serialize)]
pub struct ChatFile {
    pub filename: String,
}

#[derive(Serialize)]
pub struct StatusResponse {
    status: String,
}

impl StatusResponse {
    pub fn new(status: &str) -> Self {
        Self {
            status: status.into(),
        }
    }
}
