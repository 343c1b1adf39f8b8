//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, RwLock};

use axum::{Router, body::Body};

use chatd::api::AppState;
use chatd::api::app;
use chatd::chat::ChatStore;
use chatd::core::AppConfig;

/// Creates a test application router backed by a fresh temporary chat
/// directory. `llm_hostname` points the completion gateway at a mock
/// server for tests that exercise `POST /chat`.
pub fn test_app_with_llm(llm_hostname: &str) -> Router {
    // Keep the directory around for the lifetime of the test run;
    // each call gets its own so tests can run in parallel
    let dir = tempfile::tempdir()
        .expect("Failed to create temp dir")
        .keep();
    let store = ChatStore::new(dir.join("chats")).expect("Failed to open chat store");

    let app_config = AppConfig {
        chat_dir: dir.join("chats").display().to_string(),
        openai_api_hostname: llm_hostname.to_string(),
        openai_api_key: String::from("test-api-key"),
        openai_model: String::from("llama-3.3-70b-versatile"),
    };
    let app_state = AppState::new(store, app_config);
    app(Arc::new(RwLock::new(app_state)))
}

pub fn test_app() -> Router {
    test_app_with_llm("https://api.groq.com/openai")
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("Response body was not utf-8")
}
